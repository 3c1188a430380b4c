//! Starvation Evasion client -- view host and frame loop.
//!
//! winit drives the event loop via `ApplicationHandler`. The host owns the
//! window and a single `CustomLayout`, which owns the globe view. Input is
//! routed in two ways:
//!
//!   - pointer drag and wheel events go to the globe view as they arrive,
//!     once `PointerRouter` has picked them against the large globe;
//!   - key presses are collected by `InputState` and dispatched once per
//!     frame (TAB toggles the view, P spins the large globe).
//!
//! Spin timelines advance on a fixed timestep (see `FrameClock`), then the
//! visible globe is drawn and the egui overlay composited on top.

mod config;
mod host;
mod layout;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use config::{load_client_config, ClientConfig, ConfigWatcher, CONFIG_PATH};
use host::{map_button, map_key, on_key_press, scroll_delta, KeyOutcome, PointerRouter};
use layout::CustomLayout;
use se_core::globe::{Globe, GlobeId};
use se_core::input::{InputState, Key, MouseBtn};
use se_core::time::FrameClock;
use se_devtools::{DebugOverlay, GlobeStats};
use se_platform::window::PlatformConfig;
use se_render::{
    build_uv_sphere, EarthMaterial, GlobePipeline, GpuContext, GpuSphere, ObjectUniform,
    PerspectiveCamera,
};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Per-globe transform uniform and its bind group.
struct GlobeGpu {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GlobeGpu {
    fn new(device: &wgpu::Device, pipeline: &GlobePipeline, globe: &Globe) -> Self {
        let label = match globe.id {
            GlobeId::Mini => "Mini Globe Uniform Buffer",
            GlobeId::Large => "Large Globe Uniform Buffer",
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[ObjectUniform::from_model(globe.model_matrix())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = pipeline.create_object_bind_group(device, &buffer);
        Self { buffer, bind_group }
    }
}

/// Everything that needs a live window and GPU. Built in `resumed`.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputState,
    pointer: PointerRouter,
    camera: PerspectiveCamera,
    pipeline: GlobePipeline,
    debug_overlay: DebugOverlay,
    layout: CustomLayout,
    config: ClientConfig,
    config_watcher: ConfigWatcher,

    // --- GPU resources ----------------------------------------------------------
    sphere: GpuSphere,
    _material: EarthMaterial,
    material_bind_group: wgpu::BindGroup,
    map_memory_bytes: u64,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mini_gpu: GlobeGpu,
    large_gpu: GlobeGpu,
}

impl EngineState {
    fn new(window: Arc<Window>, config: ClientConfig, config_path: PathBuf) -> anyhow::Result<Self> {
        let gpu = GpuContext::new(window.clone()).context("GPU initialisation failed")?;
        let pipeline = GlobePipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        // Missing or unreadable maps abort startup.
        let textures = &config.textures;
        let material = EarthMaterial::load(
            &gpu.device,
            &gpu.queue,
            &textures.material_paths(),
            (textures.map_width, textures.map_height),
        )
        .context("Failed to load earth maps")?;
        let material_bind_group = pipeline.create_material_bind_group(&gpu.device, &material);
        let map_memory_bytes = material.memory_bytes();

        let sphere = GpuSphere::upload(&gpu.device, &build_uv_sphere(config.sphere_divisions));

        let logical = window.inner_size().to_logical::<f32>(window.scale_factor());
        let camera = PerspectiveCamera::new(logical.width, logical.height);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let layout = CustomLayout::new(&config.globe);
        let mini_gpu = GlobeGpu::new(&gpu.device, &pipeline, layout.globe_view().mini_globe());
        let large_gpu = GlobeGpu::new(&gpu.device, &pipeline, layout.globe_view().large_globe());

        log::info!(
            "Globes ready: mini r={}, large r={}",
            config.globe.mini_radius,
            config.globe.large_radius
        );

        Ok(Self {
            window,
            gpu,
            clock: FrameClock::new(),
            input: InputState::new(),
            pointer: PointerRouter::default(),
            camera,
            pipeline,
            debug_overlay,
            layout,
            config,
            config_watcher: ConfigWatcher::new(config_path),
            sphere,
            _material: material,
            material_bind_group,
            map_memory_bytes,
            camera_buffer,
            camera_bind_group,
            mini_gpu,
            large_gpu,
        })
    }

    /// Re-read the config file and apply the interaction tunables.
    /// Radii, maps and mesh resolution only take effect on restart.
    fn reload_interaction(&mut self, reason: &str) {
        match load_client_config(self.config_watcher.path()) {
            Ok(candidate) => {
                if candidate.globe.mini_radius != self.config.globe.mini_radius
                    || candidate.globe.large_radius != self.config.globe.large_radius
                    || candidate.textures != self.config.textures
                    || candidate.sphere_divisions != self.config.sphere_divisions
                {
                    log::warn!("Config reload ({reason}): globe geometry and maps apply on restart");
                }
                self.layout
                    .globe_view_mut()
                    .set_interaction(candidate.globe.interaction);
                self.config.globe.interaction = candidate.globe.interaction;
                log::info!("Interaction config reloaded ({reason})");
            }
            Err(err) => {
                log::error!("Config reload failed ({reason}): {err}");
            }
        }
    }

    fn dispatch_keys(&mut self, event_loop: &ActiveEventLoop) {
        let keys: Vec<Key> = self.input.pressed_keys().collect();
        for key in keys {
            match on_key_press(&mut self.layout, key) {
                KeyOutcome::Exit => {
                    log::info!("Escape pressed, exiting.");
                    event_loop.exit();
                }
                KeyOutcome::ToggleOverlay => self.debug_overlay.toggle(),
                // A grab never outlives the view it started in.
                KeyOutcome::SwitchedView => self.pointer.release(),
                KeyOutcome::Forwarded(_) => {}
            }
        }
        self.input.end_frame();
    }

    fn render(&mut self) {
        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );
        let globe = self.layout.visible_globe();
        let globe_gpu = match globe.id {
            GlobeId::Mini => &self.mini_gpu,
            GlobeId::Large => &self.large_gpu,
        };
        self.gpu.queue.write_buffer(
            &globe_gpu.buffer,
            0,
            bytemuck::cast_slice(&[ObjectUniform::from_model(globe.model_matrix())]),
        );

        let stats = GlobeStats::capture(self.layout.globe_view(), self.map_memory_bytes);
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay
                .prepare(&self.window, &self.clock, &stats);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.material_bind_group, &[]);
            render_pass.set_bind_group(2, &globe_gpu.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.sphere.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.sphere.index_count, 0, 0..1);
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if overlay_actions.switch_view {
            self.layout.switch_earth_view();
            self.pointer.release();
        }
        if overlay_actions.spin_large {
            self.layout.globe_view_mut().on_key(Key::P);
        }
    }
}

/// The view host: one window, one layout, and the input that drives them.
struct App {
    platform: PlatformConfig,
    config_path: PathBuf,
    state: Option<EngineState>,
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn initialize(width: u32, height: u32) -> Self {
        Self {
            platform: PlatformConfig::with_size(width, height),
            config_path: PathBuf::from(CONFIG_PATH),
            state: None,
            startup_error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<EngineState> {
        let config = load_client_config(&self.config_path).map_err(anyhow::Error::msg)?;
        let window = se_platform::window::create_window(event_loop, &self.platform)
            .context("Failed to create window")?;
        log::info!(
            "Window created: {}x{}",
            self.platform.width,
            self.platform.height
        );
        EngineState::new(window, config, self.config_path.clone())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.startup_error.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Startup failed: {err:#}");
                self.startup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let overlay_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    let logical = physical_size.to_logical::<f32>(state.window.scale_factor());
                    state.camera.set_viewport(logical.width, logical.height);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed if !overlay_consumed => {
                                state.input.key_down(engine_key);
                            }
                            ElementState::Pressed => {}
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if let Some(btn) = map_button(button) {
                    match button_state {
                        ElementState::Pressed if !overlay_consumed => {
                            state.input.mouse_down(btn);
                            if btn == MouseBtn::Left {
                                let cursor = state.input.cursor();
                                state.pointer.press(&mut state.layout, &state.camera, cursor);
                            }
                        }
                        ElementState::Pressed => {}
                        // Always release, or a drag could stick under the overlay.
                        ElementState::Released => {
                            state.input.mouse_up(btn);
                            if btn == MouseBtn::Left {
                                state.pointer.release();
                            }
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(state.window.scale_factor());
                state.input.set_cursor(logical.x, logical.y);
                if state.input.is_dragging() && !overlay_consumed {
                    state.pointer.moved(&mut state.layout, (logical.x, logical.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } if !overlay_consumed => {
                let cursor = state.input.cursor();
                state.pointer.wheel(
                    &mut state.layout,
                    &state.camera,
                    cursor,
                    scroll_delta(delta),
                );
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.clock.begin_frame();
                if state.config_watcher.should_reload() {
                    state.reload_interaction("file watcher");
                }

                state.dispatch_keys(event_loop);
                if event_loop.exiting() {
                    return;
                }

                while state.clock.should_step() {
                    let dt_us = state.clock.fixed_dt_us;
                    state.layout.globe_view_mut().tick(dt_us);
                }

                state.render();
            }

            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starvation Evasion starting...");

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::initialize(800, 600);
    event_loop.run_app(&mut app).context("Event loop error")?;

    match app.startup_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
