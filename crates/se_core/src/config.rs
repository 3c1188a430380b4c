//! Tunables for the globe view. Every field has a default matching the
//! shipped behaviour, so a config file only needs to name what it changes.

use serde::Deserialize;

/// How a diagonal drag sample is turned into rotation.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DragAxisPolicy {
    /// Horizontal motion wins; vertical is only considered when x is unchanged.
    #[default]
    SingleAxis,
    /// Both axes are evaluated on every sample.
    Independent,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    pub drag_step_deg: f32,
    pub rotate_period_secs: f64,
    pub drag_axis_policy: DragAxisPolicy,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            zoom_min: -840.0,
            zoom_max: 500.0,
            zoom_step: 10.0,
            drag_step_deg: 1.0,
            rotate_period_secs: 30.0,
            drag_axis_policy: DragAxisPolicy::SingleAxis,
        }
    }
}

impl InteractionConfig {
    pub fn clamp_zoom(&self, offset: f32) -> f32 {
        offset.clamp(self.zoom_min, self.zoom_max)
    }

    pub fn validate(&self) -> Result<(), String> {
        let finite = [
            self.zoom_min,
            self.zoom_max,
            self.zoom_step,
            self.drag_step_deg,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || !self.rotate_period_secs.is_finite() {
            return Err("Interaction validation failed: non-finite value".to_string());
        }
        if self.zoom_min >= self.zoom_max {
            return Err(format!(
                "Interaction validation failed: zoom_min ({}) must be below zoom_max ({})",
                self.zoom_min, self.zoom_max
            ));
        }
        if !(self.zoom_min..=self.zoom_max).contains(&0.0) {
            return Err(format!(
                "Interaction validation failed: zoom range [{}, {}] must contain 0",
                self.zoom_min, self.zoom_max
            ));
        }
        if self.zoom_step <= 0.0 {
            return Err("Interaction validation failed: zoom_step must be positive".to_string());
        }
        if self.drag_step_deg <= 0.0 {
            return Err(
                "Interaction validation failed: drag_step_deg must be positive".to_string(),
            );
        }
        if self.rotate_period_secs <= 0.0 {
            return Err(
                "Interaction validation failed: rotate_period_secs must be positive".to_string(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    pub mini_radius: f32,
    pub large_radius: f32,
    /// Globes sit at `(viewport_size / 2, viewport_size / 2)` in scene units.
    pub viewport_size: f32,
    pub interaction: InteractionConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            mini_radius: 80.0,
            large_radius: 200.0,
            viewport_size: 800.0,
            interaction: InteractionConfig::default(),
        }
    }
}

impl GlobeConfig {
    pub fn with_radii(mini_radius: f32, large_radius: f32) -> Self {
        Self {
            mini_radius,
            large_radius,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, radius) in [
            ("mini_radius", self.mini_radius),
            ("large_radius", self.large_radius),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(format!(
                    "Globe validation failed: {name} must be a positive number, got {radius}"
                ));
            }
        }
        if !self.viewport_size.is_finite() || self.viewport_size <= 0.0 {
            return Err("Globe validation failed: viewport_size must be positive".to_string());
        }
        self.interaction.validate()
    }
}
