use chipvm_common::{App, Color, Key};

use crate::machine::Machine;
use crate::{MachineConfig, NUM_KEYS, SCREEN_HEIGHT, SCREEN_WIDTH};

const PIXEL_ON: Color = Color::WHITE;
const PIXEL_OFF: Color = Color::BLACK;

/// Frontend-facing wrapper that runs one machine step per frame.
#[derive(Default)]
pub struct EmulatorApp {
    should_exit: bool,
    pub machine: Machine,
}

impl EmulatorApp {
    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            should_exit: false,
            machine: Machine::with_config(config),
        }
    }
}

impl App for EmulatorApp {
    fn init(&mut self) {
        log::info!("Chip-8 init");
    }

    fn update(&mut self, screen_state: &mut [u8]) -> anyhow::Result<()> {
        if let Err(err) = self.machine.step() {
            log::error!("Chip-8 halted: {}", err);
            self.should_exit = true;
            return Err(err.into());
        }

        for (i, pixel) in self.machine.display().iter().enumerate() {
            let color = if *pixel { PIXEL_ON } else { PIXEL_OFF };
            color.write_rgb24(screen_state, i);
        }
        Ok(())
    }

    /// Terminals only report presses, so a press latches its key and
    /// releases every other one; an explicit release clears just that key.
    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        if key == Key::Escape {
            self.should_exit = true;
            return;
        }
        let Some(idx) = key_to_keypad(key) else {
            log::warn!("Unmapped key {:?}", key);
            return;
        };
        log::debug!("Chip-8 key event: {:?} -> {:X} pressed={}", key, idx, is_down);
        if is_down {
            let mut keys = [false; NUM_KEYS];
            keys[idx] = true;
            self.machine.set_keys(keys);
        } else if let Err(err) = self.machine.set_key(idx, false) {
            log::warn!("{}", err);
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Chip-8 exit");
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn title(&self) -> String {
        "chipvm".to_string()
    }
}

/// Conventional layout: the left-hand 4x4 block of a QWERTY keyboard.
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// Q W E R  ->  4 5 6 D
/// A S D F      7 8 9 E
/// Z X C V      A 0 B F
/// ```
fn key_to_keypad(key: Key) -> Option<usize> {
    match key {
        Key::Num1 => Some(0x1),
        Key::Num2 => Some(0x2),
        Key::Num3 => Some(0x3),
        Key::Num4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        Key::Escape | Key::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::START_ADDRESS;

    fn app_with(rom: &[u8]) -> EmulatorApp {
        let mut app = EmulatorApp::with_config(MachineConfig::builder().seed(1).build());
        app.machine.load_program(rom).unwrap();
        app
    }

    #[test]
    fn press_latches_one_key() {
        let mut app = EmulatorApp::default();
        app.handle_key_event(Key::W, true);
        app.handle_key_event(Key::V, true);
        let mut expected = [false; NUM_KEYS];
        expected[0xF] = true;
        assert_eq!(app.machine.keys(), &expected);

        app.handle_key_event(Key::V, false);
        assert_eq!(app.machine.keys(), &[false; NUM_KEYS]);
    }

    #[test]
    fn escape_requests_exit() {
        let mut app = EmulatorApp::default();
        assert!(!app.should_exit());
        app.handle_key_event(Key::Escape, true);
        assert!(app.should_exit());
    }

    #[test]
    fn update_renders_bitmap_as_rgb() {
        // V0 = V1 = 0; I = glyph 0; DRW V0, V1, 5
        let mut app = app_with(&[0xD0, 0x15]);
        let mut screen = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
        app.update(&mut screen).unwrap();
        assert_eq!(Color::from_rgb24(&screen, 0), PIXEL_ON);
        assert_eq!(Color::from_rgb24(&screen, 4), PIXEL_OFF);
        assert_eq!(Color::from_rgb24(&screen, SCREEN_WIDTH + 3), PIXEL_ON);
        assert_eq!(app.machine.pc(), START_ADDRESS + 2);
    }

    #[test]
    fn update_surfaces_machine_errors() {
        let mut app = app_with(&[0x00, 0xEE]);
        let mut screen = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
        let err = app.update(&mut screen).unwrap_err();
        assert!(err.to_string().contains("stack underflow"));
        assert!(app.should_exit());
    }
}
