/// Key bindings and the explicit application state they act on
use std::collections::HashMap;

use crate::error::Result;
use crate::projection::Camera;
use crate::registry::SceneRegistry;
use crate::transform::TransformDelta;

/// Backend-independent key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Escape,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Parse a binding name: a single character, or `esc`/`up`/`down`/`left`/`right`
    pub fn parse(name: &str) -> Option<Key> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
            _ => match name.to_ascii_lowercase().as_str() {
                "esc" | "escape" => Some(Key::Escape),
                "up" => Some(Key::Up),
                "down" => Some(Key::Down),
                "left" => Some(Key::Left),
                "right" => Some(Key::Right),
                "space" => Some(Key::Char(' ')),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub kind: KeyAction,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            kind: KeyAction::Press,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMove {
    Pan { dx: f32, dy: f32 },
    Zoom(f32),
    /// Yaw and pitch deltas in degrees
    Look { yaw: f32, pitch: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Update { object: String, delta: TransformDelta },
    ToggleWireframe,
    Exit,
    Camera(CameraMove),
}

/// Key to action mapping; one key may trigger several actions
#[derive(Debug, Clone, Default)]
pub struct InputMap {
    bindings: HashMap<Key, Vec<Action>>,
}

impl InputMap {
    /// Camera step per key press for panning and zooming
    pub const CAMERA_STEP: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    /// `p` toggles wireframe, `Esc`/`q` exit, arrows pan and `+`/`-` zoom
    pub fn with_global_keys() -> Self {
        let step = Self::CAMERA_STEP;
        let mut map = Self::new();
        map.bind(Key::Char('p'), Action::ToggleWireframe);
        map.bind(Key::Escape, Action::Exit);
        map.bind(Key::Char('q'), Action::Exit);
        map.bind(Key::Up, Action::Camera(CameraMove::Pan { dx: 0.0, dy: step }));
        map.bind(Key::Down, Action::Camera(CameraMove::Pan { dx: 0.0, dy: -step }));
        map.bind(Key::Left, Action::Camera(CameraMove::Pan { dx: -step, dy: 0.0 }));
        map.bind(Key::Right, Action::Camera(CameraMove::Pan { dx: step, dy: 0.0 }));
        map.bind(Key::Char('+'), Action::Camera(CameraMove::Zoom(step)));
        map.bind(Key::Char('-'), Action::Camera(CameraMove::Zoom(-step)));
        map
    }

    pub fn bind(&mut self, key: Key, action: Action) {
        self.bindings.entry(key).or_default().push(action);
    }

    pub fn actions(&self, key: Key) -> &[Action] {
        self.bindings.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Mutable state shared by input handling and rendering
#[derive(Debug, Clone)]
pub struct AppState {
    pub wireframe: bool,
    pub running: bool,
    pub camera: Camera,
}

impl AppState {
    pub fn new(camera: Camera) -> Self {
        Self {
            wireframe: false,
            running: true,
            camera,
        }
    }

    /// Apply every action bound to the event's key.
    ///
    /// Releases are ignored, wireframe toggles only on the initial press, and
    /// all other actions also fire on key repeat.
    pub fn handle(
        &mut self,
        event: KeyEvent,
        input: &InputMap,
        registry: &mut SceneRegistry,
    ) -> Result<()> {
        if event.kind == KeyAction::Release {
            return Ok(());
        }

        for action in input.actions(event.key) {
            match action {
                Action::Update { object, delta } => registry.update_transform(object, delta)?,
                Action::ToggleWireframe => {
                    if event.kind == KeyAction::Press {
                        self.wireframe = !self.wireframe;
                    }
                }
                Action::Exit => self.running = false,
                Action::Camera(movement) => self.apply_camera(*movement),
            }
        }
        Ok(())
    }

    /// Camera moves arrive from bound keys and from the mouse
    pub fn apply_camera(&mut self, movement: CameraMove) {
        match movement {
            CameraMove::Pan { dx, dy } => self.camera.pan(dx, dy),
            CameraMove::Zoom(amount) => self.camera.zoom(amount),
            CameraMove::Look { yaw, pitch } => self.camera.look(yaw, pitch),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}
