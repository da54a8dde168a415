//! Application event loop.
//!
//! [`App`] implements winit's `ApplicationHandler`. It creates the window on
//! `resumed`, sets up the GPU (blocking natively, through `spawn_local` on the
//! web) and then drives the scene:
//!
//! 1. Window events are routed to the resize handler, the key bindings or the
//!    orbit controls
//! 2. `RedrawRequested` runs the per-frame update, uploads the scene and draws
//! 3. The next redraw is requested right away
//!
//! Async work (GPU setup on the web, the font load everywhere) re-enters the
//! loop as a [`FlowEvent`] through the loop's proxy, so scene state is only
//! ever touched on the loop thread.

use std::{fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::SceneConfig,
    context::Context,
    render::Renderer,
    resources::font::{Font, FontError, load_font},
    scene::Scene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Everything that exists once the window and the GPU are ready.
#[derive(Debug)]
pub struct AppState {
    ctx: Context,
    scene: Scene,
    renderer: Renderer,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let scene = Scene::new(config, size.width, size.height);
        let ctx = Context::new(window, scene.clear_colour()).await?;
        let renderer = Renderer::new(&ctx, &scene);
        Ok(Self {
            ctx,
            scene,
            renderer,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
            if self.scene.resize(width, height) {
                log::debug!("resized to {}x{}", width, height);
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.scene.update();
        self.renderer.sync(&mut self.ctx, &self.scene);
        self.renderer.render(&self.ctx)
    }
}

pub enum FlowEvent {
    /// GPU setup finished on the web.
    #[cfg(target_arch = "wasm32")]
    Initialized { state: AppState },
    /// The one-shot font load resolved.
    FontLoaded(Result<Font, FontError>),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized { .. } => f.write_str("Initialized"),
            Self::FontLoaded(Ok(_)) => f.write_str("FontLoaded(Ok)"),
            Self::FontLoaded(Err(e)) => write!(f, "FontLoaded(Err({}))", e),
        }
    }
}

/// Counts frames and reports the rate once per second.
#[derive(Debug)]
struct FrameTimer {
    last_report: Instant,
    frames: u32,
}

impl FrameTimer {
    fn new() -> Self {
        Self {
            last_report: Instant::now(),
            frames: 0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::debug!("{:.1} fps", self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.last_report = Instant::now();
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    // Taken when the window is created.
    config: Option<SceneConfig>,
    state: Option<AppState>,
    timer: FrameTimer,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            state: None,
            timer: FrameTimer::new(),
        })
    }

    /// Starts the font load. Its result arrives as [`FlowEvent::FontLoaded`].
    fn spawn_font_load(&self, source: String) {
        let proxy = self.proxy.clone();
        let load = async move {
            let result = load_font(&source).await;
            if proxy.send_event(FlowEvent::FontLoaded(result)).is_err() {
                log::warn!("event loop closed before the font arrived");
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }

    fn start(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        self.spawn_font_load(state.scene.config().font_source.clone());
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_window_attributes() -> winit::window::WindowAttributes {
    use winit::platform::web::WindowAttributesExtWebSys;

    let attributes = Window::default_attributes().with_append(true);
    let inner = web_sys::window().and_then(|window| {
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        Some(winit::dpi::LogicalSize::new(width, height))
    });
    match inner {
        Some(size) => attributes.with_inner_size(size),
        None => attributes,
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[cfg(not(target_arch = "wasm32"))]
        let window_attributes = Window::default_attributes()
            .with_title(format!("glyph-glow ({})", config.variant));
        #[cfg(target_arch = "wasm32")]
        let window_attributes = browser_window_attributes();

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window, config)) {
                Ok(state) => self.start(state),
                Err(e) => {
                    log::error!("initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match AppState::new(window, config).await {
                    Ok(state) => {
                        if proxy.send_event(FlowEvent::Initialized { state }).is_err() {
                            log::error!("event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("initialization failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        log::debug!("{:?}", event);
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized { state } => self.start(state),
            FlowEvent::FontLoaded(result) => match &mut self.state {
                Some(state) => {
                    state.scene.on_font_loaded(result);
                    state.ctx.window.request_redraw();
                }
                None => log::warn!("font arrived before the scene existed, dropping it"),
            },
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if state.scene.handle_key(&logical_key) {
                    log::trace!("key {:?}", logical_key);
                }
            }
            WindowEvent::RedrawRequested => {
                self.timer.tick();
                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            other => {
                state.scene.handle_pointer(&other);
            }
        }
    }
}

/// Opens the window and runs `config` until the window is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Variant selected through `?variant=` in the page URL; the default if absent.
#[cfg(target_arch = "wasm32")]
pub fn variant_from_location() -> Result<crate::config::Variant, crate::config::ConfigError> {
    let query = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default();
    Ok(crate::config::Variant::from_query(&query)?.unwrap_or_default())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    let variant = variant_from_location().map_err(|e| JsValue::from_str(&e.to_string()))?;
    run(variant.config()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
