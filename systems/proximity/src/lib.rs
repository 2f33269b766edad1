#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reports which plant the player can interact with.

use garden_core::{
    Command, Event, GardenConfig, PlantEntity, PlantId, WorldPosition,
    DEFAULT_INTERACTION_RADIUS,
};
use log::debug;

/// Proximity system that remembers the last reported plant to suppress
/// redundant updates.
#[derive(Debug)]
pub struct Proximity {
    radius: f32,
    last_reported: Option<PlantId>,
    halted: bool,
}

impl Proximity {
    /// Creates a new proximity system with the provided interaction radius.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            last_reported: None,
            halted: false,
        }
    }

    /// Derives the interaction radius from a garden configuration.
    #[must_use]
    pub const fn from_garden(config: &GardenConfig) -> Self {
        Self::new(config.interaction_radius)
    }

    /// Plant reported by the most recent change, if any.
    #[must_use]
    pub fn last_reported(&self) -> Option<&PlantId> {
        self.last_reported.as_ref()
    }

    /// Re-evaluates proximity for every published snapshot in the batch.
    ///
    /// A command is emitted only when the nearest plant's identity differs
    /// from the previously reported one.
    pub fn handle(&mut self, events: &[Event], plants: &[PlantEntity], out: &mut Vec<Command>) {
        if self.halted {
            return;
        }

        for event in events {
            match event {
                Event::SnapshotPublished { position } => {
                    let nearest = find_nearest(*position, plants, self.radius)
                        .map(|plant| plant.id().clone());
                    if nearest != self.last_reported {
                        debug!("nearest plant is now {nearest:?}");
                        self.last_reported = nearest.clone();
                        out.push(Command::SetNearbyPlant { plant: nearest });
                    }
                }
                Event::SessionEnded => {
                    self.halted = true;
                    return;
                }
                _ => {}
            }
        }
    }
}

impl Default for Proximity {
    fn default() -> Self {
        Self::new(DEFAULT_INTERACTION_RADIUS)
    }
}

/// Finds the plant closest to `position` that lies strictly within `radius`.
///
/// Plants are scanned in order and a later plant only replaces the current
/// best when it is strictly closer, so ties resolve to the earlier plant.
#[must_use]
pub fn find_nearest(
    position: WorldPosition,
    plants: &[PlantEntity],
    radius: f32,
) -> Option<&PlantEntity> {
    let mut best: Option<(&PlantEntity, f32)> = None;

    for plant in plants {
        let distance = position.distance(plant.position());
        let closer = match best {
            Some((_, best_distance)) => distance < best_distance,
            None => true,
        };
        if closer {
            best = Some((plant, distance));
        }
    }

    best.filter(|(_, distance)| *distance < radius)
        .map(|(plant, _)| plant)
}
