//! The globe view: two renderable globes, which one is on screen, and how
//! pointer, wheel and key input on the large globe turns into rotation and
//! zoom.
//!
//! Both globes live for the whole session. Toggling the view only changes
//! which one the host draws; nothing is rebuilt. The mini globe is a passive
//! spinning preview. The large globe is interactive:
//!
//! - drag rotates it a fixed step per pointer sample,
//! - the wheel moves it along the depth axis within the configured bounds,
//! - `P` starts a continuous spin.
//!
//! Handlers for the large globe only act while it is the visible one.

use glam::{Mat4, Quat, Vec3};

use crate::animation::RotateTransition;
use crate::config::{DragAxisPolicy, GlobeConfig, InteractionConfig};
use crate::input::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobeId {
    Mini,
    Large,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    MiniVisible,
    LargeVisible,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::MiniVisible => Self::LargeVisible,
            Self::LargeVisible => Self::MiniVisible,
        }
    }

    pub fn active(self) -> GlobeId {
        match self {
            Self::MiniVisible => GlobeId::Mini,
            Self::LargeVisible => GlobeId::Large,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MiniVisible => "Mini",
            Self::LargeVisible => "Large",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One renderable sphere and its transform.
#[derive(Debug, Clone)]
pub struct Globe {
    pub id: GlobeId,
    pub radius: f32,
    /// Scene-space position. `z` is the zoom offset.
    pub translate: Vec3,
    rotation: Quat,
    spin: Option<RotateTransition>,
}

impl Globe {
    pub fn zoom_offset(&self) -> f32 {
        self.translate.z
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Rotation as (unit axis, degrees). Identity reports the Y axis at 0°.
    pub fn rotation_axis_angle(&self) -> (Vec3, f32) {
        let (axis, radians) = self.rotation.to_axis_angle();
        if radians.abs() < f32::EPSILON || !axis.is_finite() {
            (Vec3::Y, 0.0)
        } else {
            (axis, radians.to_degrees())
        }
    }

    /// Replace the rotation with `degrees` about `axis`.
    pub fn set_rotate(&mut self, axis: Vec3, degrees: f32) {
        self.rotation = Quat::from_axis_angle(axis.normalize(), degrees.to_radians());
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.as_ref().is_some_and(|s| !s.is_finished())
    }

    pub fn spin(&self) -> Option<&RotateTransition> {
        self.spin.as_ref()
    }

    /// World transform: translate, then rotate, then scale the unit sphere.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translate)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(Vec3::splat(self.radius))
    }

    /// Whether the ray `origin + t * dir` (unit `dir`, `t >= 0`) touches the sphere.
    pub fn hit_by_ray(&self, origin: Vec3, dir: Vec3) -> bool {
        let to_origin = origin - self.translate;
        let b = to_origin.dot(dir);
        let c = to_origin.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return false;
        }
        // Far intersection behind the origin means the sphere is behind it too.
        -b + discriminant.sqrt() >= 0.0
    }

    /// Returns false when a spin is already running.
    fn start_spin(&mut self, period_secs: f64) -> bool {
        if self.is_spinning() {
            return false;
        }
        let spin = RotateTransition::y_axis_spin(period_secs);
        self.set_rotate(spin.axis, spin.from_deg);
        self.spin = Some(spin);
        true
    }

    fn retime_spin(&mut self, period_secs: f64) {
        if let Some(spin) = self.spin.as_mut() {
            spin.retime(period_secs);
        }
    }

    fn stop_spin(&mut self) {
        self.spin = None;
    }

    fn tick(&mut self, dt_us: u64) {
        if let Some(spin) = self.spin.as_mut() {
            let angle = spin.tick(dt_us);
            let axis = spin.axis;
            self.set_rotate(axis, angle);
        }
    }
}

/// Build a globe of `radius` centred on the viewport with no rotation.
pub fn build_globe(id: GlobeId, radius: f32, config: &GlobeConfig) -> Globe {
    let centre = config.viewport_size / 2.0;
    Globe {
        id,
        radius,
        translate: Vec3::new(centre, centre, 0.0),
        rotation: Quat::IDENTITY,
        spin: None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct DragState {
    last_x: f64,
    last_y: f64,
    /// Accumulated degrees about the vertical axis.
    horizontal_deg: f32,
    /// Accumulated degrees about the horizontal axis.
    vertical_deg: f32,
}

pub struct GlobeView {
    mini: Globe,
    large: Globe,
    mode: ViewMode,
    drag: DragState,
    interaction: InteractionConfig,
}

impl GlobeView {
    pub fn new(config: &GlobeConfig) -> Self {
        Self {
            mini: build_globe(GlobeId::Mini, config.mini_radius, config),
            large: build_globe(GlobeId::Large, config.large_radius, config),
            mode: ViewMode::default(),
            drag: DragState::default(),
            interaction: config.interaction,
        }
    }

    pub fn mini_globe(&self) -> &Globe {
        &self.mini
    }

    pub fn large_globe(&self) -> &Globe {
        &self.large
    }

    pub fn globe(&self, id: GlobeId) -> &Globe {
        match id {
            GlobeId::Mini => &self.mini,
            GlobeId::Large => &self.large,
        }
    }

    pub fn active_globe(&self) -> &Globe {
        self.globe(self.mode.active())
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn interaction(&self) -> &InteractionConfig {
        &self.interaction
    }

    /// (horizontal, vertical) accumulated drag angles in degrees.
    pub fn drag_angles(&self) -> (f32, f32) {
        (self.drag.horizontal_deg, self.drag.vertical_deg)
    }

    pub fn switch_view(&mut self) -> ViewMode {
        self.mode = self.mode.toggled();
        log::info!("Earth view: {}", self.mode);
        self.mode
    }

    /// Start the mini globe's continuous spin. A second call while it is
    /// running does nothing.
    pub fn start_auto_rotate(&mut self) -> bool {
        let started = self.mini.start_spin(self.interaction.rotate_period_secs);
        if started {
            log::debug!(
                "Mini globe auto-rotate started ({}s period)",
                self.interaction.rotate_period_secs
            );
        }
        started
    }

    fn large_is_live(&self) -> bool {
        self.mode == ViewMode::LargeVisible
    }

    /// Whether a pointer ray lands on the large globe while it is on screen.
    /// Drag and wheel input only belong to the globe when this holds.
    pub fn large_under_ray(&self, origin: Vec3, dir: Vec3) -> bool {
        self.large_is_live() && self.large.hit_by_ray(origin, dir)
    }

    /// Seed the previous pointer sample at the start of a drag gesture.
    /// Seeds in either view, so a view switch mid-press cannot leave a
    /// stale sample behind.
    pub fn on_drag_start(&mut self, x: f64, y: f64) {
        self.drag.last_x = x;
        self.drag.last_y = y;
    }

    /// Handle one pointer sample of an active drag. Returns true when the
    /// large globe's rotation changed.
    pub fn on_drag(&mut self, x: f64, y: f64) -> bool {
        if !self.large_is_live() {
            return false;
        }
        let step = self.interaction.drag_step_deg;
        let dx = sign(x - self.drag.last_x);
        let dy = sign(y - self.drag.last_y);
        self.drag.last_x = x;
        self.drag.last_y = y;

        let changed = match self.interaction.drag_axis_policy {
            DragAxisPolicy::SingleAxis => {
                if dx != 0.0 {
                    self.drag.horizontal_deg += dx * step;
                    self.large.set_rotate(Vec3::Y, self.drag.horizontal_deg);
                    true
                } else if dy != 0.0 {
                    self.drag.vertical_deg += dy * step;
                    self.large.set_rotate(Vec3::X, self.drag.vertical_deg);
                    true
                } else {
                    false
                }
            }
            DragAxisPolicy::Independent => {
                if dx == 0.0 && dy == 0.0 {
                    false
                } else {
                    self.drag.horizontal_deg += dx * step;
                    self.drag.vertical_deg += dy * step;
                    self.large.rotation = Quat::from_rotation_x(self.drag.vertical_deg.to_radians())
                        * Quat::from_rotation_y(self.drag.horizontal_deg.to_radians());
                    true
                }
            }
        };

        if changed && self.large.spin.is_some() {
            // The spin would overwrite the drag on the next tick.
            self.large.stop_spin();
            log::debug!("Large globe spin cancelled by drag");
        }
        changed
    }

    /// Handle a wheel notch. Negative deltas decrease the zoom offset,
    /// positive deltas increase it. Returns true when the offset moved.
    pub fn on_scroll(&mut self, delta_y: f64) -> bool {
        if !self.large_is_live() {
            return false;
        }
        let cfg = &self.interaction;
        let z = self.large.translate.z;
        let next = if delta_y < 0.0 && z > cfg.zoom_min {
            z - cfg.zoom_step
        } else if delta_y > 0.0 && z < cfg.zoom_max {
            z + cfg.zoom_step
        } else {
            return false;
        };
        self.large.translate.z = cfg.clamp_zoom(next);
        log::debug!("Large globe zoom offset: {}", self.large.translate.z);
        true
    }

    /// Keys addressed to the large globe. Only `P` is recognised.
    pub fn on_key(&mut self, key: Key) -> bool {
        if !self.large_is_live() || key != Key::P {
            return false;
        }
        let started = self.large.start_spin(self.interaction.rotate_period_secs);
        if started {
            log::debug!("Large globe spin started");
        }
        started
    }

    /// Advance running spins on both globes.
    pub fn tick(&mut self, dt_us: u64) {
        self.mini.tick(dt_us);
        self.large.tick(dt_us);
    }

    /// Swap in new tunables. The zoom offset is pulled back inside the new bounds.
    pub fn set_interaction(&mut self, interaction: InteractionConfig) {
        if interaction.rotate_period_secs != self.interaction.rotate_period_secs {
            self.mini.retime_spin(interaction.rotate_period_secs);
            self.large.retime_spin(interaction.rotate_period_secs);
            log::debug!("Spin period now {}s", interaction.rotate_period_secs);
        }
        self.interaction = interaction;
        self.large.translate.z = interaction.clamp_zoom(self.large.translate.z);
    }
}

fn sign(delta: f64) -> f32 {
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> GlobeView {
        GlobeView::new(&GlobeConfig::with_radii(5.0, 50.0))
    }

    fn large_view() -> GlobeView {
        let mut view = view();
        view.switch_view();
        view
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn starts_in_mini_mode() {
        let view = view();
        assert_eq!(view.view_mode(), ViewMode::MiniVisible);
        assert_eq!(view.active_globe().id, GlobeId::Mini);
    }

    #[test]
    fn switch_twice_returns_to_initial() {
        let mut view = view();
        assert_eq!(view.switch_view(), ViewMode::LargeVisible);
        assert_eq!(view.active_globe().id, GlobeId::Large);
        assert_eq!(view.switch_view(), ViewMode::MiniVisible);
    }

    #[test]
    fn globes_are_distinct_with_their_radii() {
        let view = view();
        assert_eq!(view.mini_globe().id, GlobeId::Mini);
        assert_eq!(view.large_globe().id, GlobeId::Large);
        assert_eq!(view.mini_globe().radius, 5.0);
        assert_eq!(view.large_globe().radius, 50.0);
        assert!(!std::ptr::eq(view.mini_globe(), view.large_globe()));
    }

    #[test]
    fn globes_are_viewport_centred() {
        let view = view();
        for globe in [view.mini_globe(), view.large_globe()] {
            assert_eq!(globe.translate, Vec3::new(400.0, 400.0, 0.0));
        }
    }

    #[test]
    fn toggling_keeps_globe_state() {
        let mut view = large_view();
        view.on_scroll(-1.0);
        view.switch_view();
        view.switch_view();
        assert_eq!(view.large_globe().zoom_offset(), -10.0);
    }

    #[test]
    fn model_matrix_scales_by_radius() {
        let view = view();
        let m = view.large_globe().model_matrix();
        let surface = m.transform_point3(Vec3::X);
        assert!(approx(surface.x, 450.0));
        assert!(approx(surface.y, 400.0));
    }

    #[test]
    fn drag_right_adds_one_degree_horizontal() {
        let mut view = large_view();
        view.on_drag_start(100.0, 100.0);
        assert!(view.on_drag(110.0, 100.0));
        assert_eq!(view.drag_angles(), (1.0, 0.0));
        let (axis, deg) = view.large_globe().rotation_axis_angle();
        assert!(approx(axis.y, 1.0));
        assert!(approx(deg, 1.0));
    }

    #[test]
    fn drag_left_and_vertical() {
        let mut view = large_view();
        view.on_drag_start(100.0, 100.0);
        view.on_drag(90.0, 100.0);
        assert_eq!(view.drag_angles(), (-1.0, 0.0));
        view.on_drag(90.0, 120.0);
        assert_eq!(view.drag_angles(), (-1.0, 1.0));
        let (axis, deg) = view.large_globe().rotation_axis_angle();
        assert!(approx(axis.x, 1.0));
        assert!(approx(deg, 1.0));
        view.on_drag(90.0, 110.0);
        assert_eq!(view.drag_angles(), (-1.0, 0.0));
    }

    #[test]
    fn diagonal_drag_single_axis_updates_horizontal_only() {
        let mut view = large_view();
        view.on_drag_start(0.0, 0.0);
        view.on_drag(5.0, 5.0);
        assert_eq!(view.drag_angles(), (1.0, 0.0));
        // The sample was still recorded, so a purely vertical move registers next.
        view.on_drag(5.0, 10.0);
        assert_eq!(view.drag_angles(), (1.0, 1.0));
    }

    #[test]
    fn diagonal_drag_independent_updates_both() {
        let mut config = GlobeConfig::with_radii(5.0, 50.0);
        config.interaction.drag_axis_policy = DragAxisPolicy::Independent;
        let mut view = GlobeView::new(&config);
        view.switch_view();
        view.on_drag_start(0.0, 0.0);
        assert!(view.on_drag(5.0, -5.0));
        assert_eq!(view.drag_angles(), (1.0, -1.0));
    }

    #[test]
    fn stationary_drag_sample_is_ignored() {
        let mut view = large_view();
        view.on_drag_start(30.0, 30.0);
        assert!(!view.on_drag(30.0, 30.0));
        assert_eq!(view.drag_angles(), (0.0, 0.0));
    }

    #[test]
    fn large_handlers_ignored_in_mini_mode() {
        let mut view = view();
        view.on_drag_start(0.0, 0.0);
        assert!(!view.on_drag(50.0, 0.0));
        assert!(!view.on_scroll(-1.0));
        assert!(!view.on_key(Key::P));
        assert_eq!(view.drag_angles(), (0.0, 0.0));
        assert_eq!(view.large_globe().zoom_offset(), 0.0);
        assert!(!view.large_globe().is_spinning());
    }

    #[test]
    fn scroll_steps_by_ten() {
        let mut view = large_view();
        assert!(view.on_scroll(-3.0));
        assert_eq!(view.large_globe().zoom_offset(), -10.0);
        assert!(view.on_scroll(1.0));
        assert!(view.on_scroll(1.0));
        assert_eq!(view.large_globe().zoom_offset(), 10.0);
        assert!(!view.on_scroll(0.0));
    }

    #[test]
    fn scroll_stops_at_bounds() {
        let mut view = large_view();
        for _ in 0..200 {
            view.on_scroll(-1.0);
        }
        assert_eq!(view.large_globe().zoom_offset(), -840.0);
        assert!(!view.on_scroll(-1.0));
        for _ in 0..500 {
            view.on_scroll(1.0);
        }
        assert_eq!(view.large_globe().zoom_offset(), 500.0);
        assert!(!view.on_scroll(1.0));
    }

    #[test]
    fn scroll_near_bound_is_clamped() {
        let mut config = GlobeConfig::with_radii(5.0, 50.0);
        config.interaction.zoom_step = 15.0;
        let mut view = GlobeView::new(&config);
        view.switch_view();
        // 0, -15, ... -825, then -840: the next step from -825 lands exactly on the bound.
        for _ in 0..56 {
            view.on_scroll(-1.0);
        }
        assert_eq!(view.large_globe().zoom_offset(), -840.0);

        view.set_interaction(InteractionConfig {
            zoom_step: 10.0,
            ..config.interaction
        });
        view.on_scroll(1.0);
        view.on_scroll(1.0);
        view.on_scroll(-1.0);
        view.on_scroll(-1.0);
        view.on_scroll(-1.0);
        assert_eq!(view.large_globe().zoom_offset(), -840.0);
    }

    #[test]
    fn scroll_from_minus_835_clamps_to_bound() {
        let mut config = GlobeConfig::with_radii(5.0, 50.0);
        config.interaction.zoom_step = 835.0;
        let mut view = GlobeView::new(&config);
        view.switch_view();
        view.on_scroll(-1.0);
        assert_eq!(view.large_globe().zoom_offset(), -835.0);
        view.set_interaction(InteractionConfig::default());
        assert!(view.on_scroll(-1.0));
        assert_eq!(view.large_globe().zoom_offset(), -840.0);
        assert!(!view.on_scroll(-1.0));
    }

    #[test]
    fn zoom_never_leaves_bounds() {
        let mut view = large_view();
        let pattern = [-1.0, -1.0, 1.0, -1.0, 0.0, 1.0, 1.0, 1.0];
        for i in 0..2_000 {
            let delta = if i % 300 < 150 { -1.0 } else { pattern[i % pattern.len()] };
            view.on_scroll(delta);
            let z = view.large_globe().zoom_offset();
            assert!((-840.0..=500.0).contains(&z), "offset {z} out of bounds");
        }
    }

    #[test]
    fn set_interaction_reclamps_offset() {
        let mut view = large_view();
        for _ in 0..30 {
            view.on_scroll(1.0);
        }
        assert_eq!(view.large_globe().zoom_offset(), 300.0);
        view.set_interaction(InteractionConfig {
            zoom_max: 100.0,
            ..InteractionConfig::default()
        });
        assert_eq!(view.large_globe().zoom_offset(), 100.0);
    }

    #[test]
    fn set_interaction_retimes_running_spins() {
        let mut view = large_view();
        view.start_auto_rotate();
        view.on_key(Key::P);
        view.tick(15_000_000);

        view.set_interaction(InteractionConfig {
            rotate_period_secs: 10.0,
            ..InteractionConfig::default()
        });
        for globe in [view.mini_globe(), view.large_globe()] {
            let spin = globe.spin().expect("spin");
            assert!((spin.period_secs() - 10.0).abs() < 1e-9);
        }

        // Phase is kept: halfway round, then a quarter of the new period.
        view.tick(0);
        assert!(approx(view.mini_globe().rotation_axis_angle().1, 180.0));
        view.tick(2_500_000);
        assert!(approx(view.mini_globe().rotation_axis_angle().1, 90.0));
        assert!(approx(view.large_globe().rotation_axis_angle().1, 90.0));
    }

    #[test]
    fn ray_hits_sphere_head_on_and_misses_beside_it() {
        let globe = build_globe(GlobeId::Large, 50.0, &GlobeConfig::default());
        let origin = Vec3::new(400.0, 400.0, -1000.0);
        assert!(globe.hit_by_ray(origin, Vec3::Z));
        assert!(globe.hit_by_ray(Vec3::new(449.0, 400.0, -1000.0), Vec3::Z));
        assert!(!globe.hit_by_ray(Vec3::new(451.0, 400.0, -1000.0), Vec3::Z));
        // Pointing away from the sphere.
        assert!(!globe.hit_by_ray(origin, Vec3::NEG_Z));
    }

    #[test]
    fn large_under_ray_needs_large_view() {
        let origin = Vec3::new(400.0, 400.0, -1000.0);
        let mut view = view();
        assert!(!view.large_under_ray(origin, Vec3::Z));
        view.switch_view();
        assert!(view.large_under_ray(origin, Vec3::Z));
    }

    #[test]
    fn drag_start_in_mini_view_seeds_sample() {
        let mut view = view();
        view.on_drag_start(100.0, 0.0);
        view.switch_view();
        assert!(view.on_drag(90.0, 0.0));
        assert_eq!(view.drag_angles(), (-1.0, 0.0));
    }

    #[test]
    fn auto_rotate_is_idempotent() {
        let mut view = view();
        assert!(view.start_auto_rotate());
        assert!(!view.start_auto_rotate());
        assert!(view.mini_globe().is_spinning());
        let spin = view.mini_globe().spin().expect("spin");
        assert!((spin.period_secs() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn auto_rotate_spins_mini_about_y() {
        let mut view = view();
        view.start_auto_rotate();
        view.tick(15_000_000);
        let (axis, deg) = view.mini_globe().rotation_axis_angle();
        assert!(approx(axis.y.abs(), 1.0));
        assert!(approx(deg, 180.0));
        // Still running long after the first period.
        view.tick(3_600_000_000);
        assert!(view.mini_globe().is_spinning());
    }

    #[test]
    fn auto_rotate_only_touches_mini() {
        let mut view = view();
        view.start_auto_rotate();
        view.tick(1_000_000);
        assert_eq!(view.large_globe().rotation(), Quat::IDENTITY);
    }

    #[test]
    fn p_key_spins_large_globe() {
        let mut view = large_view();
        assert!(!view.on_key(Key::Tab));
        assert!(view.on_key(Key::P));
        assert!(!view.on_key(Key::P));
        view.tick(7_500_000);
        let (_, deg) = view.large_globe().rotation_axis_angle();
        assert!(approx(deg, 270.0));
    }

    #[test]
    fn drag_cancels_large_spin() {
        let mut view = large_view();
        view.on_key(Key::P);
        view.on_drag_start(0.0, 0.0);
        view.on_drag(1.0, 0.0);
        assert!(!view.large_globe().is_spinning());
        view.tick(1_000_000);
        let (_, deg) = view.large_globe().rotation_axis_angle();
        assert!(approx(deg, 1.0));
        // Spin can be restarted afterwards.
        assert!(view.on_key(Key::P));
    }
}
