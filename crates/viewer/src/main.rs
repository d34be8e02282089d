use std::{sync::Arc, time::Instant};

use anyhow::{Context, bail};
use display::Display;
use kernel::Kernel;
use pathtracing::{
    renderer::{ChunkGrid, PassTimer, ProgressiveScheduler},
    sampling::SeedBuffer,
    scene::{Camera, Scene, test_scenes},
    settings::RenderSettings,
};
use pollster::FutureExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

mod display;
mod kernel;

struct Application {
    settings: RenderSettings,
    scene: Scene,
    camera: Camera,

    window: Option<Arc<Window>>,
    wgpu_handles: Option<WgpuHandles<'static>>,

    scheduler: ProgressiveScheduler,
    timer: PassTimer,

    // observed between frames, never while a frame is being recorded
    shutdown_requested: bool,
    error: Option<anyhow::Error>,
}

struct WgpuHandles<'window> {
    surface: wgpu::Surface<'window>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,

    kernel: Kernel,
    display: Display,
}

impl Application {
    fn new(settings: RenderSettings, grid: ChunkGrid, scene: Scene, camera: Camera) -> Self {
        Self {
            settings,
            scene,
            camera,

            window: None,
            wgpu_handles: None,

            scheduler: ProgressiveScheduler::new(grid),
            timer: PassTimer::new(Instant::now()),

            shutdown_requested: false,
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        // stays hidden until the GPU is ready so a failed setup never flashes a garbage window
        let mut window_attributes = Window::default_attributes()
            .with_title("Path Tracing")
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height))
            .with_resizable(false)
            .with_visible(false);
        if self.settings.fullscreen {
            window_attributes = window_attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop.create_window(window_attributes).context("Unable to create window")?;
        let window = Arc::new(window);
        self.window = Some(Arc::clone(&window));

        self.wgpu_handles = Some(self.init_wgpu(Arc::clone(&window))?);

        window.set_visible(true);
        window.request_redraw();

        self.timer = PassTimer::new(Instant::now());
        Ok(())
    }

    fn init_wgpu(&self, window: Arc<Window>) -> anyhow::Result<WgpuHandles<'static>> {
        let instance_descriptor = wgpu::InstanceDescriptor::from_env_or_default();
        let instance = wgpu::Instance::new(&instance_descriptor);

        let window_size = window.inner_size();
        let surface = instance.create_surface(window)
            .context("Unable to create surface")?;

        let request_adapter_options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        };

        let adapter = instance.request_adapter(&request_adapter_options)
            .block_on()
            .context("Unable to create adapter (physical device)")?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let limits = wgpu::Limits {
            max_push_constant_size: 128,
            ..wgpu::Limits::default()
        };

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("Main Device"),
            required_features: wgpu::Features::PUSH_CONSTANTS,
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::default(),
        };

        let (device, queue) = adapter.request_device(&device_descriptor, None)
            .block_on()
            .context("Unable to get device (logical device)")?;

        let surface_config = surface
            .get_default_config(&adapter, window_size.width.max(1), window_size.height.max(1))
            .context("Surface is not supported by the adapter")?;
        info!("Using swapchain format {:?}", surface_config.format);
        surface.configure(&device, &surface_config);

        let seeds = SeedBuffer::from_entropy(self.settings.width, self.settings.height);
        let kernel = Kernel::init(&device, &self.settings, &self.scene, &seeds);
        let display = Display::init(&device, surface_config.format, &kernel);

        // camera is constant for the whole session
        let encoder_descriptor = wgpu::CommandEncoderDescriptor { label: Some("Setup Encoder") };
        let mut encoder = device.create_command_encoder(&encoder_descriptor);
        self.camera.bind(&mut kernel.recorder(&queue, &mut encoder));
        queue.submit(Some(encoder.finish()));

        Ok(WgpuHandles {
            surface,
            surface_config,
            device,
            queue,
            kernel,
            display,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(wgpu_handles) = self.wgpu_handles.as_mut() else {
            return;
        };

        // surface width / height must be nonzero
        if width != 0 && height != 0 {
            wgpu_handles.surface_config.width = width;
            wgpu_handles.surface_config.height = height;
            wgpu_handles.surface.configure(&wgpu_handles.device, &wgpu_handles.surface_config);
        }
    }

    /// Traces one chunk and presents the accumulated image
    fn render(&mut self) -> anyhow::Result<()> {
        let Some(wgpu_handles) = self.wgpu_handles.as_mut() else {
            return Ok(());
        };

        let frame = match wgpu_handles.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                wgpu_handles.surface.configure(&wgpu_handles.device, &wgpu_handles.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out waiting for swapchain image, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err).context("Unable to get next swapchain image"),
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let encoder_descriptor = wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        };
        let mut encoder = wgpu_handles.device.create_command_encoder(&encoder_descriptor);

        let dispatch = {
            let mut recorder = wgpu_handles.kernel.recorder(&wgpu_handles.queue, &mut encoder);
            self.scheduler.step(&mut recorder)
        };

        let surface_size = [wgpu_handles.surface_config.width, wgpu_handles.surface_config.height];
        wgpu_handles.display.render(&mut encoder, &view, surface_size);

        wgpu_handles.queue.submit(Some(encoder.finish()));
        frame.present();

        if dispatch.completes_pass {
            let report = self.timer.record_pass(self.scheduler.completed_passes(), Instant::now());
            info!("{report}");
        }

        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        // prevent segfault by tearing down wgpu first, then closing window
        self.wgpu_handles = None;
        self.window = None;

        event_loop.exit();
    }
}

impl ApplicationHandler for Application {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init_window(event_loop) {
                self.fail(event_loop, err);
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
                info!("Window close requested");
                self.shutdown_requested = true;
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    ..
                },
                ..
            } if matches!(code, KeyCode::Escape | KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter) => {
                info!("Exit requested with {code:?}");
                self.shutdown_requested = true;
            }

            WindowEvent::RedrawRequested if !event_loop.exiting() && !self.shutdown_requested => {
                if let Err(err) = self.render() {
                    self.fail(event_loop, err);
                    return;
                }

                // request redraw for the next frame
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(new_size) => {
                info!("Window resized to: {new_size:?}");
                self.resize(new_size.width, new_size.height);
            }

            _ => ()
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown_requested && !event_loop.exiting() {
            info!("Shutting down after {} passes", self.scheduler.completed_passes());
            self.shutdown(event_loop);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = RenderSettings::default();
    let grid = settings.validate().context("Invalid render settings")?;

    let descriptor = test_scenes::find_test_scene(settings.scene)
        .with_context(|| format!("Unknown scene {:?}", settings.scene))?;
    let scene = (descriptor.scene_func)().context("Unable to build scene")?;
    if scene.is_empty() {
        bail!("Scene {} has no primitives", descriptor.name);
    }
    let camera = (descriptor.camera_func)(settings.aspect()).context("Unable to set up camera")?;

    info!(
        "Rendering {} at {}x{} in {}x{} chunks of {:?}, {} primitives ({} emitters)",
        descriptor.name,
        settings.width,
        settings.height,
        grid.chunks_x(),
        grid.chunks_y(),
        grid.extent(),
        scene.len(),
        scene.emitter_count()
    );

    let event_loop = EventLoop::new().context("Unable to create event loop")?;
    let mut app = Application::new(settings, grid, scene, camera);

    event_loop.run_app(&mut app).context("Unable to run application")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
