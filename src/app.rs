use {
    crate::{
        config::SnowfallConfig,
        constants::{
            BACKGROUND_TEXTURE_PATH, SCR_HEIGHT, SCR_WIDTH, SNOW_TEXTURE_PATH, WINDOW_TITLE,
        },
        error::AppError,
        renderer::Renderer,
        scene::SceneRenderer,
        snowfall::Snowfall,
        texture::Texture,
        timer::Timer,
    },
    std::sync::Arc,
    winit::{
        application::ApplicationHandler,
        dpi::LogicalSize,
        event::{ElementState, WindowEvent},
        event_loop::ActiveEventLoop,
        keyboard::{KeyCode, PhysicalKey},
        window::{Window, WindowId},
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppState {
    #[default]
    Uninitialized,
    Running,
    Terminating,
}

#[derive(Default)]
pub struct App {
    state: AppState,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Option<SceneRenderer>,
    snowfall: Option<Snowfall>,
    timer: Timer,
    error: Option<AppError>,
}

impl App {
    /// The fatal error that stopped initialization, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(SCR_WIDTH, SCR_HEIGHT))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.window = Some(window.clone());

        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        let background = load_texture(&renderer, BACKGROUND_TEXTURE_PATH);
        let snow = load_texture(&renderer, SNOW_TEXTURE_PATH);

        let config = SnowfallConfig::default();
        let scene = SceneRenderer::new(
            renderer.device(),
            renderer.surface_format(),
            &background,
            &snow,
            config.max_snowflakes,
        );

        let mut snowfall = Snowfall::new(config);
        snowfall.initialize(config.initial_max);

        self.renderer = Some(renderer);
        self.scene = Some(scene);
        self.snowfall = Some(snowfall);
        self.timer = Timer::new();

        window.request_redraw();
        Ok(())
    }

    fn terminate(&mut self, event_loop: &ActiveEventLoop) {
        self.state = AppState::Terminating;
        event_loop.exit();
    }

    // Scene and surface go before the window they draw into.
    fn release(&mut self) {
        self.scene = None;
        self.snowfall = None;
        self.renderer = None;
        self.window = None;
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window: &Window) {
        let current_time = self.timer.elapsed();

        let (Some(renderer), Some(scene), Some(snowfall)) =
            (&mut self.renderer, &mut self.scene, &mut self.snowfall)
        else {
            return;
        };

        let report = snowfall.tick(current_time);
        if report.ramped || report.replenished > 0 {
            log::debug!(
                "Population {}/{} after {:.3}s step",
                snowfall.population(),
                snowfall.current_max(),
                report.dt
            );
        }
        scene.prepare(renderer.device(), renderer.queue(), snowfall.flakes());

        let mut out_of_memory = false;
        match renderer.begin_frame() {
            Ok(mut frame) => {
                scene.render(&mut frame);
                renderer.end_frame(frame);
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                let size = window.inner_size();
                renderer.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                out_of_memory = true;
            }
            Err(e) => {
                log::warn!("Render error: {e:?}");
            }
        }

        if out_of_memory {
            self.terminate(event_loop);
        }
    }
}

fn load_texture(renderer: &Renderer, path: &str) -> Texture {
    match Texture::load(renderer.device(), renderer.queue(), path) {
        Ok(texture) => texture,
        Err(e) => {
            log::error!("Failed to load texture {path}: {e}");
            Texture::placeholder(renderer.device(), renderer.queue(), path)
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state != AppState::Uninitialized {
            return;
        }

        match self.initialize(event_loop) {
            Ok(()) => self.state = AppState::Running,
            Err(e) => {
                self.error = Some(e);
                self.release();
                self.terminate(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => return,
        };

        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.terminate(event_loop);
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    self.terminate(event_loop);
                }
            }
            WindowEvent::RedrawRequested => {
                if self.state != AppState::Running {
                    return;
                }

                self.redraw(event_loop, &window);
                window.request_redraw();
            }
            _ => (),
        }
    }

    fn exiting(&mut self, _: &ActiveEventLoop) {
        self.release();
    }
}
