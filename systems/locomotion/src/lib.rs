#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-rate independent locomotion system that proposes player moves.
//!
//! The system integrates once per `TimeAdvanced` event, always starting from
//! the authoritative position passed in by the caller, and answers with a
//! single `MovePlayer` command for the whole batch.

use std::time::Duration;

use garden_core::{
    Command, Event, GardenBounds, GardenConfig, MovementIntent, WorldPosition, BASE_SPEED,
    NOMINAL_FRAME_MS,
};
use log::{debug, trace};

/// Configuration parameters required to construct the locomotion system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    base_speed: f32,
    bounds: GardenBounds,
}

impl Config {
    /// Creates a new configuration from a per-frame speed and the play area.
    #[must_use]
    pub const fn new(base_speed: f32, bounds: GardenBounds) -> Self {
        Self { base_speed, bounds }
    }

    /// Derives the locomotion parameters from a garden configuration.
    #[must_use]
    pub fn from_garden(config: &GardenConfig) -> Self {
        Self::new(config.base_speed, config.bounds())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(BASE_SPEED, GardenBounds::default())
    }
}

/// Pure system that turns elapsed time and movement intent into player moves.
#[derive(Debug, Default)]
pub struct Locomotion {
    config: Config,
    halted: bool,
}

impl Locomotion {
    /// Creates a new locomotion system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            halted: false,
        }
    }

    /// Reports whether the system stopped reacting because the session ended.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Consumes world events and the latest player state to emit move commands.
    ///
    /// `position` and `intent` must be read from the world when this method is
    /// called, not cached from an earlier frame.
    pub fn handle(
        &mut self,
        events: &[Event],
        position: WorldPosition,
        intent: MovementIntent,
        out: &mut Vec<Command>,
    ) {
        if self.halted {
            return;
        }

        let mut current = position;
        for event in events {
            match event {
                Event::SessionEnded => {
                    debug!("locomotion halted");
                    self.halted = true;
                    return;
                }
                Event::TimeAdvanced { dt } => {
                    current = integrate(
                        current,
                        intent,
                        *dt,
                        self.config.base_speed,
                        self.config.bounds,
                    );
                }
                _ => {}
            }
        }

        if current != position {
            trace!("proposing move from {position:?} to {current:?}");
            out.push(Command::MovePlayer { to: current });
        }
    }
}

/// Advances a position by one integration step.
///
/// The step length is `base_speed` scaled by the ratio between `dt` and the
/// nominal 60 fps frame. Axes are integrated independently, so diagonal
/// movement covers more ground than straight movement. A zero `dt` or an
/// empty intent leaves the position untouched.
#[must_use]
pub fn integrate(
    position: WorldPosition,
    intent: MovementIntent,
    dt: Duration,
    base_speed: f32,
    bounds: GardenBounds,
) -> WorldPosition {
    if dt.is_zero() || !intent.is_active() {
        return position;
    }

    let step = base_speed * (dt.as_secs_f32() * 1_000.0 / NOMINAL_FRAME_MS);
    if !step.is_finite() {
        return position;
    }

    let mut x = position.x();
    let mut z = position.z();
    if intent.forward {
        z -= step;
    }
    if intent.back {
        z += step;
    }
    if intent.left {
        x -= step;
    }
    if intent.right {
        x += step;
    }

    bounds.clamp(WorldPosition::new(x, z))
}
