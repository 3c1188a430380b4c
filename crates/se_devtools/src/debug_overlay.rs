//! Debug overlay rendered via egui on top of the globe.
//!
//! egui needs a three-phase render split because
//! `egui_wgpu::Renderer::render()` takes a `RenderPass<'static>`:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The window only shows when `visible` is true (F3). Event handling is
//! always active so the overlay can swallow clicks while it is shown.

use se_core::globe::{GlobeView, ViewMode};
use se_core::time::FrameClock;
use winit::window::Window;

/// Snapshot of globe state for one frame of the overlay.
#[derive(Debug, Clone, Default)]
pub struct GlobeStats {
    pub view_mode: ViewMode,
    pub zoom_offset: f32,
    pub zoom_range: (f32, f32),
    pub rotation_axis: [f32; 3],
    pub rotation_deg: f32,
    pub drag_angles: (f32, f32),
    pub mini_spinning: bool,
    pub large_spinning: bool,
    /// Texture memory for the three maps, in megabytes.
    pub map_memory_mb: f32,
}

impl GlobeStats {
    pub fn capture(view: &GlobeView, map_memory_bytes: u64) -> Self {
        let active = view.active_globe();
        let (axis, deg) = active.rotation_axis_angle();
        let interaction = view.interaction();
        Self {
            view_mode: view.view_mode(),
            zoom_offset: view.large_globe().zoom_offset(),
            zoom_range: (interaction.zoom_min, interaction.zoom_max),
            rotation_axis: axis.to_array(),
            rotation_deg: deg,
            drag_angles: view.drag_angles(),
            mini_spinning: view.mini_globe().is_spinning(),
            large_spinning: view.large_globe().is_spinning(),
            map_memory_mb: map_memory_bytes as f32 / (1024.0 * 1024.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    /// Same as pressing TAB.
    pub switch_view: bool,
    /// Same as pressing P on the large globe.
    pub spin_large: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        self.visible && response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: &GlobeStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !self.visible {
                return;
            }
            egui::Window::new("Earth")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms));
                    ui.label(format!("Steps this frame: {}", clock.steps_this_frame));

                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.label(format!("View: {}", stats.view_mode));
                        if ui.button("Switch").clicked() {
                            actions.switch_view = true;
                        }
                    });
                    let [x, y, z] = stats.rotation_axis;
                    ui.label(format!(
                        "Rotation: {:.1}° about ({:.2}, {:.2}, {:.2})",
                        stats.rotation_deg, x, y, z
                    ));
                    ui.label(format!(
                        "Auto-rotate: {}",
                        if stats.mini_spinning { "running" } else { "stopped" }
                    ));

                    ui.separator();
                    ui.label(format!(
                        "Zoom offset: {:.0} [{:.0}, {:.0}]",
                        stats.zoom_offset, stats.zoom_range.0, stats.zoom_range.1
                    ));
                    ui.label(format!(
                        "Drag: {:.0}° horizontal, {:.0}° vertical",
                        stats.drag_angles.0, stats.drag_angles.1
                    ));
                    if stats.view_mode == ViewMode::LargeVisible {
                        ui.horizontal(|ui| {
                            ui.label(if stats.large_spinning { "Spinning" } else { "Idle" });
                            if !stats.large_spinning && ui.button("Spin").clicked() {
                                actions.spin_large = true;
                            }
                        });
                    }

                    ui.separator();
                    ui.label(format!("Maps: {:.1} MB", stats.map_memory_mb));
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use se_core::config::GlobeConfig;
    use se_core::input::Key;

    #[test]
    fn stats_follow_view_state() {
        let mut view = GlobeView::new(&GlobeConfig::with_radii(5.0, 50.0));
        view.start_auto_rotate();
        let stats = GlobeStats::capture(&view, 3 * 4096 * 2046 * 4);
        assert_eq!(stats.view_mode, ViewMode::MiniVisible);
        assert!(stats.mini_spinning);
        assert!(!stats.large_spinning);
        assert_eq!(stats.zoom_range, (-840.0, 500.0));
        assert!((stats.map_memory_mb - 95.906).abs() < 0.01);

        view.switch_view();
        view.on_scroll(-1.0);
        view.on_key(Key::P);
        let stats = GlobeStats::capture(&view, 0);
        assert_eq!(stats.view_mode, ViewMode::LargeVisible);
        assert_eq!(stats.zoom_offset, -10.0);
        assert!(stats.large_spinning);
    }
}
