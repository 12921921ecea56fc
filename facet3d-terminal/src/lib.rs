/// Terminal front end: scene loading, ASCII rasterization and the frame loop
use anyhow::Result;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent as TermKeyEvent,
        KeyEventKind, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use facet3d_core::{AppState, Camera, CameraMove, InputMap, Key, KeyAction, KeyEvent};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;
pub mod scene;

pub use config::SceneConfig;
pub use renderer::AsciiRenderer;
pub use scene::Scene;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Rows reserved for the status line
const STATUS_ROWS: u16 = 1;

/// Mouse-look turn per cell dragged, in degrees
const LOOK_DEGREES_PER_CELL: f32 = 2.0;

/// Camera dolly per scroll wheel notch
const SCROLL_ZOOM: f32 = 5.0 * InputMap::CAMERA_STEP;

/// Restores the terminal when dropped, including when entering it fails halfway
struct ScreenGuard<W: Write> {
    out: W,
    raw_mode: bool,
}

impl<W: Write> ScreenGuard<W> {
    fn enter(out: W, raw_mode: bool) -> Result<Self> {
        if raw_mode {
            terminal::enable_raw_mode()?;
        }
        let mut guard = Self { out, raw_mode };
        execute!(
            guard.out,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(guard)
    }
}

impl<W: Write> Drop for ScreenGuard<W> {
    fn drop(&mut self) {
        // Cleanup
        let _ = execute!(
            self.out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Turns mouse drags into look moves and the wheel into zoom
#[derive(Debug, Default)]
pub struct MouseLook {
    last: Option<(u16, u16)>,
}

impl MouseLook {
    pub fn translate(&mut self, event: &MouseEvent) -> Option<CameraMove> {
        let here = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(_) => {
                self.last = Some(here);
                None
            }
            MouseEventKind::Up(_) => {
                self.last = None;
                None
            }
            MouseEventKind::Drag(_) => {
                let (last_column, last_row) = self.last.replace(here).unwrap_or(here);
                let yaw = (event.column as f32 - last_column as f32) * LOOK_DEGREES_PER_CELL;
                // Screen rows grow downward
                let pitch = (last_row as f32 - event.row as f32) * LOOK_DEGREES_PER_CELL;
                (yaw != 0.0 || pitch != 0.0).then_some(CameraMove::Look { yaw, pitch })
            }
            MouseEventKind::ScrollUp => Some(CameraMove::Zoom(SCROLL_ZOOM)),
            MouseEventKind::ScrollDown => Some(CameraMove::Zoom(-SCROLL_ZOOM)),
            _ => None,
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    state: AppState,
    renderer: AsciiRenderer,
    mouse: MouseLook,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, camera: Camera) -> Result<Self> {
        let (width, height) = terminal::size()?;
        let height = height.saturating_sub(STATUS_ROWS);

        let mut state = AppState::new(camera);
        state.camera.set_viewport(width as f32 * CELL_ASPECT, height as f32);

        let mut renderer = AsciiRenderer::new(width as usize, height as usize);
        scene.registry.upload(&mut renderer);

        Ok(Self {
            scene,
            state,
            renderer,
            mouse: MouseLook::default(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let _screen = ScreenGuard::enter(stdout(), true)?;
        self.main_loop()
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.state.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.scene.animate()?;

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> Result<()> {
        match event::read()? {
            Event::Key(key_event) => {
                if let Some(event) = translate_key(&key_event) {
                    self.state
                        .handle(event, &self.scene.input, &mut self.scene.registry)?;
                }
            }
            Event::Mouse(mouse_event) => {
                if let Some(movement) = self.mouse.translate(&mouse_event) {
                    self.state.apply_camera(movement);
                }
            }
            Event::Resize(width, height) => {
                let height = height.saturating_sub(STATUS_ROWS);
                self.renderer.resize(width as usize, height as usize);
                self.state
                    .camera
                    .set_viewport(width as f32 * CELL_ASPECT, height as f32);
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.renderer
            .begin_frame(&self.state.camera, self.state.wireframe);

        // Render every object in load order
        self.scene.registry.draw_all(&mut self.renderer)?;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, STATUS_ROWS))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Facet3D | FPS: {:.1} | Objects: {} | P=Wireframe{} Arrows=Pan +/-=Zoom Drag=Look Q=Quit",
                self.fps,
                self.scene.registry.len(),
                if self.state.wireframe { " (on)" } else { "" },
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Map a crossterm key event onto the core's key model
pub fn translate_key(event: &TermKeyEvent) -> Option<KeyEvent> {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        _ => return None,
    };
    let kind = match event.kind {
        KeyEventKind::Press => KeyAction::Press,
        KeyEventKind::Repeat => KeyAction::Repeat,
        KeyEventKind::Release => KeyAction::Release,
    };
    Some(KeyEvent { key, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers, MouseButton};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_translate_key() {
        let press = TermKeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT);
        assert_eq!(translate_key(&press), Some(KeyEvent::press(Key::Char('w'))));

        let release = TermKeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(
            translate_key(&release),
            Some(KeyEvent {
                key: Key::Escape,
                kind: KeyAction::Release
            })
        );

        let tab = TermKeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(translate_key(&tab), None);
    }

    #[test]
    fn test_mouse_drag_looks() {
        let mut look = MouseLook::default();
        assert_eq!(look.translate(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 10)), None);
        assert_eq!(
            look.translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 13, 8)),
            Some(CameraMove::Look {
                yaw: 3.0 * LOOK_DEGREES_PER_CELL,
                pitch: 2.0 * LOOK_DEGREES_PER_CELL
            })
        );
        // Relative to the previous drag position
        assert_eq!(
            look.translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 12, 8)),
            Some(CameraMove::Look {
                yaw: -LOOK_DEGREES_PER_CELL,
                pitch: 0.0
            })
        );
        assert_eq!(look.translate(&mouse(MouseEventKind::Moved, 0, 0)), None);
    }

    #[test]
    fn test_drag_without_press_starts_in_place() {
        let mut look = MouseLook::default();
        assert_eq!(look.translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 5, 5)), None);
    }

    #[test]
    fn test_scroll_zooms() {
        let mut look = MouseLook::default();
        assert_eq!(
            look.translate(&mouse(MouseEventKind::ScrollUp, 0, 0)),
            Some(CameraMove::Zoom(SCROLL_ZOOM))
        );
        assert_eq!(
            look.translate(&mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(CameraMove::Zoom(-SCROLL_ZOOM))
        );
    }

    /// Fails its first write, then records everything
    #[derive(Default)]
    struct FlakyWriter {
        failed: bool,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "terminal gone"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_screen_restored_when_enter_fails() {
        let mut out = FlakyWriter::default();
        assert!(ScreenGuard::enter(&mut out, false).is_err());
        let text = String::from_utf8(out.written).unwrap();
        assert!(text.contains("\x1b[?1049l"), "alternate screen not left: {:?}", text);
        assert!(text.contains("\x1b[?25h"), "cursor not shown: {:?}", text);
    }

    #[test]
    fn test_screen_restored_on_drop() {
        let mut out = Vec::new();
        {
            let _screen = ScreenGuard::enter(&mut out, false).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let entered = text.find("\x1b[?1049h").unwrap();
        let left = text.find("\x1b[?1049l").unwrap();
        assert!(entered < left);
    }
}
