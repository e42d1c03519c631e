use crate::key::Key;

/// A machine the frontend can drive: it polls input into the app, asks it to
/// advance one frame and render into an RGB24 screen buffer, then presents
/// the buffer.
pub trait App {
    fn init(&mut self);
    /// Advance one frame and render it into `screen` (`width * height * 3`
    /// bytes). An error is fatal to the run.
    fn update(&mut self, screen: &mut [u8]) -> anyhow::Result<()>;
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn title(&self) -> String;
}
