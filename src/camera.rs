use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 20.0;
const SCROLL_STEP: f32 = 0.5;
const PITCH_LIMIT: f32 = 89.0;
/// `|front.y|` above which the view counts as vertical.
const VERTICAL_EPSILON: f32 = 0.9999;

/// Directions the keyboard can move the camera in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Fly-through camera pose.
///
/// `front` and `up` are kept normalized and yaw/pitch always describe
/// `front`, so a pose snapped by a preset and the next mouse-look agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    movement_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.5, 5.5, 10.0),
            Vec3::new(0.0, -0.5, -2.0),
            Vec3::Y,
            80.0,
            10.0,
        )
    }
}

impl Camera {
    pub fn new(position: Vec3, front: Vec3, up: Vec3, zoom: f32, movement_speed: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            yaw: -90.0,
            pitch: 0.0,
            zoom,
            movement_speed: movement_speed.clamp(MIN_SPEED, MAX_SPEED),
        };
        camera.set_pose(position, front, up);
        camera
    }

    /// Places the camera looking along `front` with `up` as its vertical.
    pub fn set_pose(&mut self, position: Vec3, front: Vec3, up: Vec3) {
        self.position = position;
        self.front = front.try_normalize().unwrap_or(Vec3::NEG_Z);
        self.up = up.try_normalize().unwrap_or(Vec3::Y);
        self.right = self
            .front
            .cross(self.up)
            .try_normalize()
            .unwrap_or(Vec3::X);
        // Looking straight up or down, the horizontal heading lives in `up`:
        // screen-up points forward when looking down and backward when looking up.
        let heading = if self.front.y.abs() > VERTICAL_EPSILON {
            self.up * -self.front.y.signum()
        } else {
            self.front
        };
        self.yaw = heading.z.atan2(heading.x).to_degrees();
        self.pitch = self.front.y.clamp(-1.0, 1.0).asin().to_degrees();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Moves `distance` world units along the camera's own axes.
    pub fn process_keyboard(&mut self, movement: Movement, distance: f32) {
        let step = match movement {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
            Movement::Up => self.up,
            Movement::Down => -self.up,
        };
        self.position += step * distance;
    }

    /// Turns by already-scaled yaw/pitch offsets in degrees and re-derives
    /// the basis against world up.
    pub fn process_mouse_movement(&mut self, yaw_offset: f32, pitch_offset: f32) {
        self.yaw += yaw_offset;
        self.pitch = (self.pitch + pitch_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Applies one scroll step and clamps the speed to `[MIN_SPEED, MAX_SPEED]`.
    pub fn process_scroll(&mut self, delta: f32) {
        self.movement_speed =
            (self.movement_speed + delta * SCROLL_STEP).clamp(MIN_SPEED, MAX_SPEED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_clamps_at_both_ends() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.process_scroll(1.0);
            assert!(camera.movement_speed() <= MAX_SPEED);
        }
        assert_eq!(camera.movement_speed(), 20.0);
        for _ in 0..100 {
            camera.process_scroll(-1.0);
            assert!(camera.movement_speed() >= MIN_SPEED);
        }
        assert_eq!(camera.movement_speed(), 0.5);
    }

    #[test]
    fn pose_derives_yaw_and_pitch_from_front() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0), Vec3::Y, 80.0, 10.0);
        assert!((camera.yaw() + 90.0).abs() < 1e-4);
        assert!(camera.pitch().abs() < 1e-4);
        assert_eq!(camera.front(), Vec3::NEG_Z);
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn zero_mouse_offset_keeps_the_view_direction() {
        let mut camera = Camera::default();
        let before = camera.front();
        camera.process_mouse_movement(0.0, 0.0);
        assert!(camera.front().abs_diff_eq(before, 1e-5));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 500.0);
        assert_eq!(camera.pitch(), 89.0);
        camera.process_mouse_movement(0.0, -1000.0);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn movement_follows_camera_axes() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 80.0, 10.0);
        camera.process_keyboard(Movement::Forward, 2.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-6));
        camera.process_keyboard(Movement::Right, 1.0);
        camera.process_keyboard(Movement::Down, 0.5);
        assert!(camera.position().abs_diff_eq(Vec3::new(1.0, -0.5, -2.0), 1e-6));
    }

    #[test]
    fn vertical_pose_takes_heading_from_up() {
        let down = Camera::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, Vec3::NEG_Z, 50.0, 10.0);
        assert!((down.yaw() + 90.0).abs() < 1e-4);
        assert!((down.pitch() + 90.0).abs() < 1e-4);

        let up = Camera::new(Vec3::ZERO, Vec3::Y, Vec3::X, 50.0, 10.0);
        assert!((up.yaw().abs() - 180.0).abs() < 1e-4);
    }

    #[test]
    fn overhead_pose_keeps_a_usable_right_vector() {
        let camera = Camera::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, Vec3::NEG_Z, 50.0, 10.0);
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
        let eye = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    }
}
