//! Window, fixed-step loop and the shared context every screen receives.
//!
//! The loop is a winit [`ApplicationHandler`]: key events feed an
//! [`InputState`], each redraw advances the screen flow by however many fixed
//! ticks the elapsed time covers, then the flow's draw list is presented.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::assets::Assets;
use crate::audio::AudioContext;
use crate::config::{GameConfig, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::input::InputState;
use crate::renderer::{DrawList, Renderer};
use crate::screens::ScreenFlow;
use crate::stack::Millis;
use crate::store::{StatsDb, StatsStore};

/// Longest frame the loop will try to catch up on.
pub const MAX_FRAME_SECS: f32 = 0.25;

// ── Context ─────────────────────────────────────────────────────────────────

/// Everything screens share: settings, loaded art, the stats store and audio.
pub struct Context {
    pub config: GameConfig,
    pub assets: Assets,
    pub store: Box<dyn StatsStore>,
    pub audio: AudioContext,
}

impl Context {
    pub fn new(config: GameConfig, assets: Assets, store: Box<dyn StatsStore>, audio: AudioContext) -> Self {
        Self { config, assets, store, audio }
    }

    /// Default settings, placeholder art, an in-memory store and no audio.
    pub fn headless() -> Self {
        Self::new(GameConfig::default(), Assets::placeholder(), Box::new(StatsDb::in_memory()), AudioContext::silent())
    }
}

// ── Pacer ───────────────────────────────────────────────────────────────────

/// Fixed-timestep accumulator.
#[derive(Clone, Copy, Debug)]
pub struct Pacer {
    step: f32,
    accumulator: f32,
}

impl Pacer {
    pub fn new(ups: u32) -> Self {
        Self { step: 1.0 / ups.max(1) as f32, accumulator: 0.0 }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add real elapsed time and return how many ticks are due.
    pub fn feed(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_SECS);
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }
}

// ── Clock ───────────────────────────────────────────────────────────────────

/// Wall-clock milliseconds since the loop started. Gameplay timers compare
/// these stamps.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
    last: Millis,
}

impl Clock {
    pub fn new() -> Self {
        Self { start: Instant::now(), last: 0 }
    }

    pub fn now(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }

    /// Record a tick at `now` and return the time since the previous one.
    pub fn stamp(&mut self, now: Millis) -> Millis {
        let dt = now.saturating_sub(self.last);
        self.last = self.last.max(now);
        dt
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

// ── EngineBuilder ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct EngineBuilder {
    config: GameConfig,
    assets: Option<Assets>,
    store: Option<Box<dyn StatsStore>>,
}

impl EngineBuilder {
    pub fn with_config(mut self, config: GameConfig) -> Self { self.config = config; self }
    pub fn with_assets(mut self, assets: Assets) -> Self { self.assets = Some(assets); self }
    pub fn with_store(mut self, store: Box<dyn StatsStore>) -> Self { self.store = Some(store); self }

    /// Open the window and run until the player quits or a screen fails.
    pub fn run(self) -> anyhow::Result<()> {
        let mut config = self.config;
        if std::env::args().any(|arg| arg == "--debug") {
            config.debug = true;
        }

        let assets = self.assets.unwrap_or_else(|| Assets::load(&config.asset_dir));
        let store = self.store.unwrap_or_else(|| open_store(&config));
        let mut audio = AudioContext::new();
        audio.load_all(&assets);

        let mut ctx = Context::new(config, assets, store, audio);
        let flow = ScreenFlow::new(&mut ctx, 0).context("could not start the title screen")?;

        let event_loop = EventLoop::new().context("could not create the event loop")?;
        let mut app = App::new(ctx, flow);
        event_loop.run_app(&mut app).context("event loop failed")?;

        match app.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// File-backed stats when a path resolves and opens, in-memory otherwise.
fn open_store(config: &GameConfig) -> Box<dyn StatsStore> {
    let Some(path) = config.resolved_stats_path() else {
        warn!("no data directory; stats will not be kept");
        return Box::new(StatsDb::in_memory());
    };
    match StatsDb::open(path.clone()) {
        Ok(db) => Box::new(db),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open stats; keeping them in memory");
            Box::new(StatsDb::in_memory())
        }
    }
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    ctx: Context,
    flow: ScreenFlow,
    renderer: Option<Renderer>,
    input: InputState,
    pacer: Pacer,
    clock: Clock,
    last_instant: Option<Instant>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(ctx: Context, flow: ScreenFlow) -> Self {
        let pacer = Pacer::new(ctx.config.ups);
        Self {
            ctx,
            flow,
            renderer: None,
            input: InputState::new(),
            pacer,
            clock: Clock::new(),
            last_instant: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!(error = %e, "shutting down");
        self.failure = Some(e);
        event_loop.exit();
    }

    /// Run due ticks. Returns `false` once the loop should stop.
    fn advance(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let now = Instant::now();
        let elapsed = match self.last_instant {
            Some(prev) => now.duration_since(prev).as_secs_f32(),
            None => self.pacer.step(),
        };
        self.last_instant = Some(now);

        for _ in 0..self.pacer.feed(elapsed) {
            let now = self.clock.now();
            let dt = self.clock.stamp(now);
            if let Err(e) = self.flow.tick(&mut self.ctx, &self.input, now, dt) {
                self.fail(event_loop, e.into());
                return false;
            }
            // Edges and events belong to the first tick that sees them.
            self.input.clear_frame_state();
            if self.flow.is_quit() {
                info!("quit");
                event_loop.exit();
                return false;
            }
        }
        true
    }

    fn present(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else { return };
        let mut list = DrawList::new();
        self.flow.draw(&self.ctx, &mut list);
        match renderer.render(&list) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window.inner_size();
                renderer.resize(size);
            }
            Err(e) => warn!(error = %e, "frame dropped"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(&self.ctx.config.title)
            .with_inner_size(PhysicalSize::new(self.ctx.config.width, self.ctx.config.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, anyhow::anyhow!("could not open the window: {e}")),
        };
        let logical = (SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
        match pollster::block_on(Renderer::new(window, &self.ctx.assets, logical)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("could not start the renderer")),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.advance(event_loop) {
                    self.present();
                }
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, ref text, .. },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.input.press(code);
                    // Printable characters for the text fields.
                    if let Some(t) = text {
                        for ch in t.chars() {
                            self.input.type_char(ch);
                        }
                    }
                }
                ElementState::Released => self.input.release(code),
            },

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        debug!(stack = ?self.flow.stack(), "releasing screens");
        self.flow.shutdown(&mut self.ctx);
        self.ctx.audio.stop_music();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_accumulates_partial_frames() {
        let mut pacer = Pacer::new(4);
        assert_eq!(pacer.feed(0.1), 0);
        assert_eq!(pacer.feed(0.2), 1);
    }

    #[test]
    fn pacer_caps_long_frames() {
        let mut pacer = Pacer::new(4);
        assert_eq!(pacer.feed(10.0), 1);
        assert_eq!(pacer.feed(-1.0), 0);
    }

    #[test]
    fn clock_follows_wall_time() {
        let clock = Clock::new();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(clock.now() >= 20);
    }

    #[test]
    fn clock_reports_the_full_gap_after_a_stall() {
        let mut clock = Clock::new();
        assert_eq!(clock.stamp(16), 16);
        assert_eq!(clock.stamp(1016), 1000);
        assert_eq!(clock.stamp(1016), 0);
    }

    #[test]
    fn headless_context_has_placeholder_roster() {
        let ctx = Context::headless();
        assert!(ctx.assets.roster().next().is_some());
        assert!(!ctx.audio.is_available());
    }
}
