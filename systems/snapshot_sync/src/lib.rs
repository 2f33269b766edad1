#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Throttling system that decides when renderers see a fresh snapshot.
//!
//! Integration runs every frame, but the published snapshot (and the
//! proximity check gated on it) only refreshes once the configured interval
//! has elapsed. Nearby-plant state can therefore trail the true position by
//! up to one interval.

use std::time::Duration;

use garden_core::{Command, Event, GardenConfig, UI_UPDATE_INTERVAL};
use log::debug;

/// Pure system that emits publish commands at a fixed cadence.
#[derive(Debug)]
pub struct SnapshotSync {
    interval: Duration,
    accumulator: Duration,
    halted: bool,
}

impl SnapshotSync {
    /// Creates a new throttle publishing at most once per `interval`.
    ///
    /// A zero interval publishes on every batch that advances time.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            halted: false,
        }
    }

    /// Derives the throttle interval from a garden configuration.
    #[must_use]
    pub const fn from_garden(config: &GardenConfig) -> Self {
        Self::new(config.ui_update_interval())
    }

    /// Time accumulated since the last publish.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Consumes world events and emits at most one publish command per batch.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.halted {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::SessionEnded => {
                    debug!("snapshot sync halted");
                    self.halted = true;
                    self.accumulator = Duration::ZERO;
                    return;
                }
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator >= self.interval {
            self.accumulator = Duration::ZERO;
            out.push(Command::PublishSnapshot);
        }
    }
}

impl Default for SnapshotSync {
    fn default() -> Self {
        Self::new(UI_UPDATE_INTERVAL)
    }
}
