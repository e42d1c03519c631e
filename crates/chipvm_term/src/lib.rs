use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use typed_builder::TypedBuilder;

pub use chipvm_common;
pub use chipvm_common::App;

use chipvm_common::{Color, Key};

/// Each terminal cell shows two vertically stacked pixels: the foreground
/// paints the upper half, the background the lower half.
const UPPER_HALF_BLOCK: char = '\u{2580}';

#[derive(TypedBuilder)]
pub struct TermInitInfo {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Time between frames; one `App::update` runs per frame.
    #[builder(default = Duration::from_millis(16))]
    pub frame_interval: Duration,
}

pub struct TermContext;

impl TermContext {
    pub fn run(init_info: TermInitInfo, mut app: impl App) -> Result<()> {
        let TermInitInfo {
            width,
            height,
            title,
            frame_interval,
        } = init_info;
        let (width, height) = (width as usize, height as usize);

        let mut stdout = io::stdout();
        let _guard = TerminalGuard::enter(&mut stdout, &title)?;

        let mut screen_state = vec![0u8; width * height * 3];
        app.init();
        loop {
            if app.should_exit() {
                app.exit();
                break;
            }
            let frame_start = Instant::now();

            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key_event) => {
                        if let Some((key, is_down)) = map_key_event(key_event) {
                            app.handle_key_event(key, is_down);
                        }
                    }
                    Event::Resize(..) => execute!(stdout, terminal::Clear(ClearType::All))?,
                    _ => {}
                }
            }

            let frame = render_frame(
                &mut app,
                &mut stdout,
                &mut screen_state,
                width,
                height,
                &title,
            );
            if let Err(err) = frame {
                app.exit();
                return Err(err);
            }

            if let Some(remaining) = frame_interval.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        Ok(())
    }
}

/// Raw mode plus alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(stdout: &mut io::Stdout, title: &str) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::SetTitle(title),
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)
        {
            log::warn!("Failed to restore terminal screen: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::warn!("Failed to leave raw mode: {}", err);
        }
    }
}

/// Ctrl-C arrives as a key event in raw mode, so it is treated like Escape.
fn map_key_event(event: KeyEvent) -> Option<(Key, bool)> {
    let is_down = match event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => true,
        KeyEventKind::Release => false,
    };
    let key = match event.code {
        KeyCode::Esc => Key::Escape,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::Escape,
        KeyCode::Char(c) => Key::from_char(c),
        _ => return None,
    };
    Some((key, is_down))
}

/// Update the app and present the resulting screen.
fn render_frame(
    app: &mut impl App,
    out: &mut impl Write,
    screen_state: &mut [u8],
    width: usize,
    height: usize,
    title: &str,
) -> Result<()> {
    app.update(screen_state)?;
    draw(out, screen_state, width, height, title)?;
    Ok(())
}

fn draw(
    out: &mut impl Write,
    screen: &[u8],
    width: usize,
    height: usize,
    title: &str,
) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0), ResetColor, Print(title))?;
    for row in 0..(height + 1) / 2 {
        queue!(out, cursor::MoveTo(0, row as u16 + 1))?;
        for x in 0..width {
            let (top, bottom) = cell_colors(screen, width, height, x, row);
            queue!(
                out,
                SetForegroundColor(to_term_color(top)),
                SetBackgroundColor(to_term_color(bottom)),
                Print(UPPER_HALF_BLOCK)
            )?;
        }
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// Colors of the upper and lower pixel behind terminal cell `(x, row)`.
fn cell_colors(screen: &[u8], width: usize, height: usize, x: usize, row: usize) -> (Color, Color) {
    let top_y = row * 2;
    let top = Color::from_rgb24(screen, top_y * width + x);
    let bottom = if top_y + 1 < height {
        Color::from_rgb24(screen, (top_y + 1) * width + x)
    } else {
        Color::BLACK
    };
    (top, bottom)
}

fn to_term_color(color: Color) -> style::Color {
    let (r, g, b) = color.rgb();
    style::Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        let mut event = KeyEvent::new(code, modifiers);
        event.kind = kind;
        event
    }

    struct FrameCounter {
        frames: usize,
        exited: bool,
    }

    impl App for FrameCounter {
        fn init(&mut self) {}
        fn update(&mut self, _screen: &mut [u8]) -> Result<()> {
            self.frames += 1;
            Ok(())
        }
        fn handle_key_event(&mut self, _key: Key, _is_down: bool) {}
        fn should_exit(&self) -> bool {
            self.exited
        }
        fn exit(&mut self) {
            self.exited = true;
        }
        fn width(&self) -> u32 {
            2
        }
        fn height(&self) -> u32 {
            2
        }
        fn title(&self) -> String {
            "counter".to_string()
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn render_frame_updates_then_draws() {
        let mut app = FrameCounter {
            frames: 0,
            exited: false,
        };
        let mut screen = vec![0u8; 2 * 2 * 3];
        let mut out = Vec::new();
        render_frame(&mut app, &mut out, &mut screen, 2, 2, "counter").unwrap();
        assert_eq!(app.frames, 1);
        assert!(String::from_utf8(out).unwrap().contains("counter"));
    }

    #[test]
    fn render_frame_reports_write_failures() {
        let mut app = FrameCounter {
            frames: 0,
            exited: false,
        };
        let mut screen = vec![0u8; 2 * 2 * 3];
        let err =
            render_frame(&mut app, &mut BrokenPipe, &mut screen, 2, 2, "counter").unwrap_err();
        assert_eq!(
            err.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::BrokenPipe)
        );
        assert_eq!(app.frames, 1);
    }

    #[test]
    fn maps_presses_and_releases() {
        let press = key_event(KeyCode::Char('w'), KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(map_key_event(press), Some((Key::W, true)));

        let release = key_event(KeyCode::Char('w'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(map_key_event(release), Some((Key::W, false)));

        let arrow = key_event(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(map_key_event(arrow), None);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let esc = key_event(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(map_key_event(esc), Some((Key::Escape, true)));

        let ctrl_c = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert_eq!(map_key_event(ctrl_c), Some((Key::Escape, true)));

        let plain_c = key_event(KeyCode::Char('c'), KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(map_key_event(plain_c), Some((Key::C, true)));
    }

    #[test]
    fn pairs_rows_into_cells() {
        // 2x3 screen: column 0 white on rows 0 and 2
        let (width, height) = (2, 3);
        let mut screen = vec![0u8; width * height * 3];
        Color::WHITE.write_rgb24(&mut screen, 0);
        Color::WHITE.write_rgb24(&mut screen, 2 * width);

        assert_eq!(
            cell_colors(&screen, width, height, 0, 0),
            (Color::WHITE, Color::BLACK)
        );
        assert_eq!(
            cell_colors(&screen, width, height, 0, 1),
            (Color::WHITE, Color::BLACK)
        );
        assert_eq!(
            cell_colors(&screen, width, height, 1, 0),
            (Color::BLACK, Color::BLACK)
        );
    }

    #[test]
    fn draw_writes_title_and_one_block_per_cell() {
        let (width, height) = (4, 4);
        let screen = vec![0u8; width * height * 3];
        let mut out = Vec::new();
        draw(&mut out, &screen, width, height, "chipvm").unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("chipvm"));
        assert_eq!(text.matches(UPPER_HALF_BLOCK).count(), width * height / 2);
    }
}
