use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    GardenBounds, ZoomScale, BASE_SPEED, DEFAULT_BOUNDARY_MARGIN, DEFAULT_GARDEN_SIZE,
    DEFAULT_INTERACTION_RADIUS, UI_UPDATE_INTERVAL,
};

/// Tunable parameters of a garden session.
///
/// Every field falls back to its default when omitted from a configuration
/// file, so an empty document yields [`GardenConfig::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GardenConfig {
    /// Side length of the square garden in world units.
    pub garden_size: f32,
    /// Distance kept between the play area and the garden edge.
    pub boundary_margin: f32,
    /// Distance travelled per active axis during one nominal frame.
    pub base_speed: f32,
    /// Minimum milliseconds between two published snapshots.
    pub ui_update_interval_ms: u64,
    /// Maximum distance at which a plant counts as nearby.
    pub interaction_radius: f32,
    /// Zoom applied when the session starts.
    pub initial_zoom: f32,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            garden_size: DEFAULT_GARDEN_SIZE,
            boundary_margin: DEFAULT_BOUNDARY_MARGIN,
            base_speed: BASE_SPEED,
            ui_update_interval_ms: UI_UPDATE_INTERVAL.as_millis() as u64,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            initial_zoom: ZoomScale::DEFAULT.get(),
        }
    }
}

impl GardenConfig {
    /// Checks that the configuration describes a usable garden.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.garden_size.is_finite() && self.garden_size > 0.0) {
            return Err(ConfigError::InvalidGardenSize(self.garden_size));
        }
        if !(self.boundary_margin.is_finite()
            && self.boundary_margin >= 0.0
            && self.boundary_margin < self.garden_size / 2.0)
        {
            return Err(ConfigError::InvalidMargin {
                margin: self.boundary_margin,
                garden_size: self.garden_size,
            });
        }
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(self.base_speed));
        }
        if self.ui_update_interval_ms == 0 {
            return Err(ConfigError::ZeroUpdateInterval);
        }
        if !(self.interaction_radius.is_finite() && self.interaction_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.interaction_radius));
        }
        if ZoomScale::from_f32(self.initial_zoom).is_none() {
            return Err(ConfigError::InvalidZoom(self.initial_zoom));
        }
        Ok(())
    }

    /// Play area implied by the garden size and margin.
    #[must_use]
    pub fn bounds(&self) -> GardenBounds {
        GardenBounds::new(self.garden_size, self.boundary_margin)
    }

    /// Throttle interval between published snapshots.
    #[must_use]
    pub const fn ui_update_interval(&self) -> Duration {
        Duration::from_millis(self.ui_update_interval_ms)
    }

    /// Initial zoom, falling back to the default for out-of-range values.
    #[must_use]
    pub fn initial_zoom(&self) -> ZoomScale {
        ZoomScale::from_f32(self.initial_zoom).unwrap_or_default()
    }
}

/// Reasons a [`GardenConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The garden must have a positive, finite size.
    #[error("garden_size must be positive (received {0})")]
    InvalidGardenSize(f32),
    /// The margin must leave a non-empty play area.
    #[error("boundary_margin {margin} leaves no play area in a garden of size {garden_size}")]
    InvalidMargin {
        /// Margin that failed validation.
        margin: f32,
        /// Garden size the margin was checked against.
        garden_size: f32,
    },
    /// The base speed must be positive and finite.
    #[error("base_speed must be positive (received {0})")]
    InvalidSpeed(f32),
    /// The snapshot throttle needs a non-zero interval.
    #[error("ui_update_interval_ms must be greater than zero")]
    ZeroUpdateInterval,
    /// The interaction radius must be positive and finite.
    #[error("interaction_radius must be positive (received {0})")]
    InvalidRadius(f32),
    /// The initial zoom must lie within the permitted range.
    #[error("initial_zoom must lie within [0.5, 2.0] (received {0})")]
    InvalidZoom(f32),
}
