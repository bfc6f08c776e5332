//! Input-driven camera control: mouse look, fly movement, scroll speed and
//! the hotkey presets that switch between perspective and orthographic views.

use std::collections::HashSet;
use std::fmt;

use glam::{Mat4, Vec2, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Movement};
use crate::input::{KeyCode, KeyboardState};
use crate::render::{names, UniformSink};

const MOUSE_SENSITIVITY: f32 = 0.1;
/// Fraction of `movement_speed` applied per second of held movement key.
const MOVE_SCALE: f32 = 0.3;
const PRESET_BLEND: f32 = 0.5;
const ORTHO_HALF_EXTENT: f32 = 10.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

const MOVEMENT_KEYS: [(char, Movement); 6] = [
    ('W', Movement::Forward),
    ('S', Movement::Backward),
    ('A', Movement::Left),
    ('D', Movement::Right),
    ('Q', Movement::Up),
    ('E', Movement::Down),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionMode::Perspective => f.write_str("perspective"),
            ProjectionMode::Orthographic => f.write_str("orthographic"),
        }
    }
}

/// Camera configurations bound to hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetView {
    /// `P`: snap back to the default perspective pose.
    Perspective,
    /// `O`: snap to an orthographic view straight down.
    Overhead,
    /// `1`
    Front,
    /// `2`
    Side,
    /// `3`
    Top,
    /// `4`: perspective, blended toward the default pose.
    BlendedPerspective,
}

impl PresetView {
    /// In the order hotkeys are polled each frame.
    pub const ALL: [PresetView; 6] = [
        PresetView::Perspective,
        PresetView::Overhead,
        PresetView::Front,
        PresetView::Side,
        PresetView::Top,
        PresetView::BlendedPerspective,
    ];

    pub fn hotkey(self) -> KeyCode {
        match self {
            PresetView::Perspective => KeyCode::Character('P'),
            PresetView::Overhead => KeyCode::Character('O'),
            PresetView::Front => KeyCode::Digit(1),
            PresetView::Side => KeyCode::Digit(2),
            PresetView::Top => KeyCode::Digit(3),
            PresetView::BlendedPerspective => KeyCode::Digit(4),
        }
    }

    pub fn projection(self) -> ProjectionMode {
        match self {
            PresetView::Perspective | PresetView::BlendedPerspective => {
                ProjectionMode::Perspective
            }
            _ => ProjectionMode::Orthographic,
        }
    }

    /// Moves `camera` into this preset's pose.
    pub fn apply(self, camera: &mut Camera) {
        let default_front = Vec3::new(0.0, -0.3, -1.0);
        let blend = |target: Vec3| camera.position().lerp(target, PRESET_BLEND);
        match self {
            PresetView::Perspective => {
                camera.set_pose(Vec3::new(0.0, 5.0, 8.0), default_front, Vec3::Y);
                camera.zoom = 80.0;
            }
            PresetView::Overhead => {
                camera.set_pose(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, Vec3::NEG_Z);
                camera.zoom = 50.0;
            }
            PresetView::Front => {
                let position = blend(Vec3::new(0.0, 4.0, 10.0));
                camera.set_pose(position, Vec3::NEG_Z, Vec3::Y);
            }
            PresetView::Side => {
                let position = blend(Vec3::new(10.0, 4.0, 0.0));
                camera.set_pose(position, Vec3::NEG_X, Vec3::Y);
            }
            PresetView::Top => {
                let position = blend(Vec3::new(0.0, 10.0, 0.0));
                camera.set_pose(position, Vec3::NEG_Y, Vec3::NEG_Z);
            }
            PresetView::BlendedPerspective => {
                let position = blend(Vec3::new(0.0, 5.0, 8.0));
                camera.set_pose(position, default_front, Vec3::Y);
                camera.zoom = 80.0;
            }
        }
    }
}

/// Where the current view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewState {
    Startup,
    Preset(PresetView),
    FreeLook,
}

/// Edge detector for hotkeys: a key fires once when it goes down and not
/// again until it has been seen released.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyLatch {
    latched: HashSet<KeyCode>,
}

impl KeyLatch {
    /// Returns `true` only on the frame `key` transitions to down.
    pub fn rising_edge(&mut self, key: KeyCode, down: bool) -> bool {
        if down {
            self.latched.insert(key)
        } else {
            self.latched.remove(&key);
            false
        }
    }

    pub fn is_latched(&self, key: KeyCode) -> bool {
        self.latched.contains(&key)
    }

    pub fn reset(&mut self) {
        self.latched.clear();
    }
}

/// Camera, projection mode and the input bookkeeping that drives them.
#[derive(Debug, Clone)]
pub struct Navigation {
    camera: Camera,
    mode: ProjectionMode,
    view: ViewState,
    latch: KeyLatch,
    last_cursor: Option<Vec2>,
    close_requested: bool,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl Navigation {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            mode: ProjectionMode::Perspective,
            view: ViewState::Startup,
            latch: KeyLatch::default(),
            last_cursor: None,
            close_requested: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn latch(&self) -> &KeyLatch {
        &self.latch
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Mouse look. The first sample only seeds the tracker.
    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        let current = Vec2::new(x, y);
        let last = self.last_cursor.replace(current).unwrap_or(current);
        self.on_mouse_delta(current.x - last.x, current.y - last.y);
    }

    /// Mouse look from relative motion in screen pixels (y grows downward).
    pub fn on_mouse_delta(&mut self, dx: f32, dy: f32) {
        let yaw = dx * MOUSE_SENSITIVITY;
        let pitch = -dy * MOUSE_SENSITIVITY;
        if yaw != 0.0 || pitch != 0.0 {
            self.camera.process_mouse_movement(yaw, pitch);
            self.view = ViewState::FreeLook;
        }
    }

    pub fn on_scroll(&mut self, delta_y: f32) {
        self.camera.process_scroll(delta_y);
    }

    /// Polls held movement keys and hotkey edges for one frame.
    pub fn process_keyboard<K>(&mut self, keys: &K, delta_seconds: f32)
    where
        K: KeyboardState + ?Sized,
    {
        if keys.is_down(KeyCode::ESCAPE) && !self.close_requested {
            info!("escape pressed, closing");
            self.close_requested = true;
        }

        let distance = self.camera.movement_speed() * MOVE_SCALE * delta_seconds;
        for (key, movement) in MOVEMENT_KEYS {
            if keys.is_down(KeyCode::Character(key)) {
                self.camera.process_keyboard(movement, distance);
                if distance != 0.0 {
                    self.view = ViewState::FreeLook;
                }
            }
        }

        for preset in PresetView::ALL {
            let key = preset.hotkey();
            if self.latch.rising_edge(key, keys.is_down(key)) {
                self.select_preset(preset);
            }
        }
    }

    /// Applies `preset` as if its hotkey had just been pressed.
    pub fn select_preset(&mut self, preset: PresetView) {
        preset.apply(&mut self.camera);
        let mode = preset.projection();
        if mode != self.mode {
            info!("switching to {mode:?} projection");
        }
        debug!("preset {preset:?} -> camera at {}", self.camera.position());
        self.mode = mode;
        self.view = ViewState::Preset(preset);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        match self.mode {
            ProjectionMode::Orthographic => Mat4::orthographic_rh(
                -ORTHO_HALF_EXTENT,
                ORTHO_HALF_EXTENT,
                -ORTHO_HALF_EXTENT,
                ORTHO_HALF_EXTENT,
                NEAR_PLANE,
                FAR_PLANE,
            ),
            ProjectionMode::Perspective => Mat4::perspective_rh(
                self.camera.zoom.to_radians(),
                aspect,
                NEAR_PLANE,
                FAR_PLANE,
            ),
        }
    }

    /// Pushes view, projection and eye position for the coming frame.
    pub fn prepare_view<S: UniformSink + ?Sized>(&self, sink: &mut S, aspect: f32) {
        sink.set_mat4(names::VIEW, self.view_matrix());
        sink.set_mat4(names::PROJECTION, self.projection_matrix(aspect));
        sink.set_vec3(names::VIEW_POSITION, self.camera.position());
    }
}
