//! Windowed demo runner implementing winit ApplicationHandler

use crate::commands::LoadedDemo;
use crate::demo::GpuDemo;
use plume_render::{Camera, RenderContext};
use plume_runtime::{DemoAction, InputState, SimClock};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

const LIFETIME_STEP: f32 = 0.25;
const MIN_LIFETIME: f32 = 0.25;
const ACCEL_STEP: f32 = 0.1;
/// Radians per frame while an orbit key is held
const ORBIT_SPEED: f32 = 0.02;
const ZOOM_STEP: f32 = 0.1;

pub struct DemoApp {
    pub clock: SimClock,
    pub input: InputState,

    loaded: LoadedDemo,
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    demo: Option<GpuDemo>,
    camera: Camera,

    /// Set when window or device setup fails; returned once the loop exits
    pub error: Option<anyhow::Error>,
}

impl DemoApp {
    pub fn new(loaded: LoadedDemo) -> Self {
        let camera = Camera::from_params(&loaded.config.camera, 16.0 / 9.0);
        Self {
            clock: SimClock::new(),
            input: InputState::new(),
            loaded,
            window: None,
            render_context: None,
            demo: None,
            camera,
            error: None,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(format!("Plume - {}", self.loaded.config.name))
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let context = pollster::block_on(RenderContext::new(window))?;
        self.camera.aspect = context.aspect_ratio();

        let demo = GpuDemo::new(
            &context.device,
            &context.queue,
            context.format(),
            self.loaded.config.clone(),
            self.loaded.texture.as_deref(),
        );

        self.render_context = Some(context);
        self.demo = Some(demo);
        Ok(())
    }

    fn render(&mut self) {
        let (Some(context), Some(demo)) = (&mut self.render_context, &mut self.demo) else {
            return;
        };

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                return;
            }
            Err(e) => {
                tracing::error!("Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        demo.frame(
            &context.device,
            &context.queue,
            &view,
            &self.camera,
            self.clock.total_time,
            self.clock.delta_time,
        );

        output.present();
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        self.clock.tick();

        for action in self.input.active_actions() {
            self.apply(action, event_loop);
        }

        self.input.end_frame();
    }

    fn apply(&mut self, action: DemoAction, event_loop: &ActiveEventLoop) {
        match action {
            DemoAction::Exit => event_loop.exit(),
            DemoAction::TogglePause => {
                let paused = self.clock.toggle_pause();
                tracing::info!(paused, "simulation pause toggled");
            }
            DemoAction::Reseed => {
                if let (Some(context), Some(demo)) = (&self.render_context, &mut self.demo) {
                    if let Err(e) = demo.reseed(&context.queue) {
                        tracing::error!("Reseed failed: {e}");
                    }
                }
            }
            DemoAction::LifetimeUp | DemoAction::LifetimeDown => {
                let Some(demo) = &mut self.demo else { return };
                let step = if action == DemoAction::LifetimeUp {
                    LIFETIME_STEP
                } else {
                    -LIFETIME_STEP
                };
                let params = demo.coordinator.params_mut();
                params.lifetime = (params.lifetime + step).max(MIN_LIFETIME);
                tracing::info!(lifetime = params.lifetime, "lifetime changed");
            }
            DemoAction::AccelUp | DemoAction::AccelDown => {
                let Some(demo) = &mut self.demo else { return };
                let step = if action == DemoAction::AccelUp {
                    ACCEL_STEP
                } else {
                    -ACCEL_STEP
                };
                let params = demo.coordinator.params_mut();
                params.acceleration.y += step;
                tracing::info!(acceleration_y = params.acceleration.y, "acceleration changed");
            }
            DemoAction::OrbitLeft => self.camera.orbit_horizontal(-ORBIT_SPEED),
            DemoAction::OrbitRight => self.camera.orbit_horizontal(ORBIT_SPEED),
            DemoAction::ZoomIn => self.camera.zoom(ZOOM_STEP),
            DemoAction::ZoomOut => self.camera.zoom(-ZOOM_STEP),
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                    self.camera.aspect = context.aspect_ratio();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.input.process_key_down(key_code),
                        ElementState::Released => self.input.process_key_up(key_code),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick(event_loop);
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
