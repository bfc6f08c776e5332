use std::path::Path;
use std::time::Instant;

use log::debug;

use crate::composer::FrameStats;
use crate::decoder::ImageDecoder;
use crate::input::{InputState, KeyCode};
use crate::navigation::{Navigation, ProjectionMode};
use crate::render::GraphicsBackend;
use crate::scene::{DeskScene, PrepareReport};

/// Measures time between frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick; `0.0` on the first tick.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        delta
    }
}

/// What one call to [`DeskSession::frame`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// 1-based.
    pub index: u64,
    pub delta_seconds: f32,
    pub mode: ProjectionMode,
    pub stats: FrameStats,
}

/// A running desk scene together with its camera and held keys.
///
/// Window events feed the session; each [`frame`](Self::frame) then polls
/// the keyboard, pushes the view and draws the scene.
#[derive(Debug)]
pub struct DeskSession {
    scene: DeskScene,
    navigation: Navigation,
    input: InputState,
    clock: FrameClock,
    viewport: (u32, u32),
    frames: u64,
}

impl DeskSession {
    pub fn new(scene: DeskScene, navigation: Navigation, width: u32, height: u32) -> Self {
        Self {
            scene,
            navigation,
            input: InputState::new(),
            clock: FrameClock::new(),
            viewport: (width.max(1), height.max(1)),
            frames: 0,
        }
    }

    pub fn scene(&self) -> &DeskScene {
        &self.scene
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn prepare<B>(
        &mut self,
        backend: &mut B,
        decoder: &dyn ImageDecoder,
        asset_dir: &Path,
    ) -> PrepareReport
    where
        B: GraphicsBackend + ?Sized,
    {
        self.scene.prepare(backend, decoder, asset_dir)
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.input.set_key_down(key);
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.input.set_key_up(key);
    }

    /// Forgets held keys, e.g. when the window loses focus.
    pub fn release_keys(&mut self) {
        self.input.release_all();
    }

    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        self.navigation.on_cursor_moved(x, y);
    }

    pub fn on_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.navigation.on_mouse_delta(dx, dy);
    }

    pub fn on_scroll(&mut self, delta_y: f32) {
        self.navigation.on_scroll(delta_y);
    }

    /// Zero-sized viewports (minimized windows) are clamped to 1x1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    pub fn close_requested(&self) -> bool {
        self.navigation.close_requested()
    }

    pub fn frame<B>(&mut self, backend: &mut B, now: Instant) -> FrameSummary
    where
        B: GraphicsBackend + ?Sized,
    {
        let delta_seconds = self.clock.tick(now);
        self.navigation.process_keyboard(&self.input, delta_seconds);
        self.navigation.prepare_view(backend, self.aspect());
        let stats = self.scene.render(backend);
        self.frames += 1;
        debug!(
            "frame {}: {} draws in {:.4}s",
            self.frames, stats.draw_calls, delta_seconds
        );
        FrameSummary {
            index: self.frames,
            delta_seconds,
            mode: self.navigation.mode(),
            stats,
        }
    }

    pub fn teardown<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) {
        self.scene.teardown(backend);
    }
}
