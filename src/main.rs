use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use log::{info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use desk_scene::{
    DeskScene, DeskSession, FileDecoder, FrameSummary, KeyCode, NamedKey, Navigation,
    PrepareReport, RecordingBackend, Renderer, RuntimeConfig,
};

/// Simulated frame time for summary runs.
const SUMMARY_FRAME_STEP: Duration = Duration::from_millis(16);
const PIXELS_PER_SCROLL_LINE: f64 = 100.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = RuntimeConfig::parse()?;
    let session = DeskSession::new(
        DeskScene::default(),
        Navigation::default(),
        config.window_width,
        config.window_height,
    );
    if config.summary_only {
        run_headless(&config, session)
    } else {
        run_interactive(config, session)
    }
}

fn run_headless(config: &RuntimeConfig, mut session: DeskSession) -> Result<()> {
    let mut backend = RecordingBackend::new();
    let report = session.prepare(&mut backend, &FileDecoder, &config.assets_dir);
    print_prepare_report(&report);

    let start = Instant::now();
    let total = config.frames.max(config.presses.len());
    let mut last: Option<FrameSummary> = None;
    for index in 0..total {
        let key = config.presses.get(index).copied();
        if let Some(key) = key {
            session.key_down(key);
        }
        backend.clear();
        let now = start + SUMMARY_FRAME_STEP * index as u32;
        let summary = session.frame(&mut backend, now);
        println!(
            "Frame {}: {} draw calls ({})",
            summary.index, summary.stats.draw_calls, summary.mode
        );
        if let Some(key) = key {
            session.key_up(key);
        }
        last = Some(summary);
        if session.close_requested() {
            println!("Close requested");
            break;
        }
    }

    if let Some(summary) = last {
        println!("Draw calls per group:");
        for (group, draws) in &summary.stats.groups {
            println!(" - {group}: {draws}");
        }
        if summary.stats.lookup_misses > 0 {
            println!("Lookup misses: {}", summary.stats.lookup_misses);
        }
    }

    session.teardown(&mut backend);
    print_final_state(&session);
    Ok(())
}

fn run_interactive(config: RuntimeConfig, session: DeskSession) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DeskApp {
        config,
        session,
        renderer: None,
        last_error: None,
    };
    event_loop.run_app(&mut app)?;

    print_final_state(&app.session);
    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct DeskApp {
    config: RuntimeConfig,
    session: DeskSession,
    renderer: Option<Renderer>,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

impl DeskApp {
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window_width as f64,
                self.config.window_height as f64,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );
        grab_cursor(&window);

        let mut renderer = block_on(Renderer::new(Arc::clone(&window)))?;
        let report = self
            .session
            .prepare(&mut renderer, &FileDecoder, &self.config.assets_dir);
        print_prepare_report(&report);

        let size = renderer.size();
        self.session.resize(size.width, size.height);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        self.session.frame(renderer, Instant::now());
        if let Err(err) = renderer.present() {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = renderer.window().inner_size();
                    renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    self.fail(event_loop, anyhow!("GPU is out of memory"));
                    return;
                }
                other => info!("skipping frame: {other}"),
            }
        }
        if self.session.close_requested() {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for DeskApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.init_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                self.session.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = map_keycode(code) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => self.session.key_down(key),
                    ElementState::Released => self.session.key_up(key),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_SCROLL_LINE) as f32,
                };
                self.session.on_scroll(lines);
            }
            WindowEvent::Focused(false) => self.session.release_keys(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.session.on_mouse_delta(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            renderer.window().request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_mut() {
            self.session.teardown(renderer);
        }
    }
}

fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(err) = grabbed {
        warn!("could not grab the cursor: {err}");
    }
    window.set_cursor_visible(false);
}

fn print_prepare_report(report: &PrepareReport) {
    println!(
        "Loaded {} of {} textures",
        report.textures_loaded, report.textures_expected
    );
    for (tag, err) in &report.failures {
        println!(" - {tag}: {err}");
    }
}

fn print_final_state(session: &DeskSession) {
    let navigation = session.navigation();
    let camera = navigation.camera();
    let position = camera.position();
    let front = camera.front();
    println!(
        "Camera: pos=({:.2}, {:.2}, {:.2}) front=({:.2}, {:.2}, {:.2}) speed={:.2} projection={}",
        position.x,
        position.y,
        position.z,
        front.x,
        front.y,
        front.z,
        camera.movement_speed(),
        navigation.mode()
    );
}

/// Only the keys navigation polls are forwarded.
fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::Escape => KeyCode::Named(NamedKey::Escape),
        WinitKey::Digit1 => KeyCode::Digit(1),
        WinitKey::Digit2 => KeyCode::Digit(2),
        WinitKey::Digit3 => KeyCode::Digit(3),
        WinitKey::Digit4 => KeyCode::Digit(4),
        WinitKey::KeyW => KeyCode::Character('W'),
        WinitKey::KeyA => KeyCode::Character('A'),
        WinitKey::KeyS => KeyCode::Character('S'),
        WinitKey::KeyD => KeyCode::Character('D'),
        WinitKey::KeyQ => KeyCode::Character('Q'),
        WinitKey::KeyE => KeyCode::Character('E'),
        WinitKey::KeyP => KeyCode::Character('P'),
        WinitKey::KeyO => KeyCode::Character('O'),
        _ => return None,
    })
}
