#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the herb garden walk.
//!
//! The world is the single writer of the player position. Systems read it
//! through the [`query`] module at the moment they handle events, so they
//! always integrate from the latest value rather than a captured copy.

use std::time::Duration;

use garden_core::{
    Command, Event, GardenBounds, GardenConfig, InputMode, LocomotionState, MovementIntent,
    PlantCatalog, PlantId, PublishedSnapshot, SessionPhase, WorldPosition, ZoomScale,
    WELCOME_BANNER,
};
use log::{debug, trace, warn};

/// Mutable state describing the player avatar.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerState {
    position: WorldPosition,
}

impl PlayerState {
    /// Current authoritative position of the player.
    #[must_use]
    pub const fn position(&self) -> WorldPosition {
        self.position
    }
}

/// Represents the authoritative garden world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    bounds: GardenBounds,
    catalog: PlantCatalog,
    player: PlayerState,
    intent: MovementIntent,
    input_mode: InputMode,
    zoom: ZoomScale,
    nearby: Option<PlantId>,
    published: PublishedSnapshot,
    phase: SessionPhase,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates a new garden session with the player standing at the origin.
    ///
    /// The configuration is expected to have passed
    /// [`GardenConfig::validate`]; an invalid initial zoom falls back to the
    /// default.
    #[must_use]
    pub fn new(config: &GardenConfig, catalog: PlantCatalog) -> Self {
        let zoom = config.initial_zoom();
        let player = PlayerState {
            position: WorldPosition::ORIGIN,
        };
        debug!(
            "garden session created with {} plants, boundary {}",
            catalog.len(),
            config.bounds().boundary()
        );
        Self {
            banner: WELCOME_BANNER,
            bounds: config.bounds(),
            catalog,
            player,
            intent: MovementIntent::NONE,
            input_mode: InputMode::default(),
            zoom,
            nearby: None,
            published: PublishedSnapshot {
                position: player.position,
                zoom,
                sequence: 0,
            },
            phase: SessionPhase::Active,
            tick_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn set_intent(&mut self, intent: MovementIntent, out_events: &mut Vec<Event>) {
        if self.intent == intent {
            return;
        }

        let before = LocomotionState::from_intent(self.intent);
        let after = LocomotionState::from_intent(intent);
        self.intent = intent;
        out_events.push(Event::MovementIntentChanged { intent });

        if before != after {
            debug!("locomotion state changed to {after:?}");
            out_events.push(Event::LocomotionStateChanged { state: after });
        }
    }

    fn move_player(&mut self, to: WorldPosition, out_events: &mut Vec<Event>) {
        if !to.is_finite() {
            warn!("ignoring non-finite player destination {to:?}");
            return;
        }

        let from = self.player.position;
        let clamped = self.bounds.clamp(to);
        if clamped == from {
            return;
        }

        self.player.position = clamped;
        trace!("player moved from {from:?} to {clamped:?}");
        out_events.push(Event::PlayerMoved { from, to: clamped });
    }

    fn publish_snapshot(&mut self, out_events: &mut Vec<Event>) {
        let position = self.player.position;
        self.published = PublishedSnapshot {
            position,
            zoom: self.zoom,
            sequence: self.published.sequence.saturating_add(1),
        };
        trace!(
            "published snapshot {} at {position:?}",
            self.published.sequence
        );
        out_events.push(Event::SnapshotPublished { position });
    }

    fn set_nearby(&mut self, plant: Option<PlantId>, out_events: &mut Vec<Event>) {
        if let Some(id) = &plant {
            if self.catalog.get(id).is_none() {
                warn!("ignoring unknown nearby plant `{id}`");
                return;
            }
        }
        if self.nearby == plant {
            return;
        }

        debug!("nearby plant changed to {plant:?}");
        self.nearby = plant.clone();
        out_events.push(Event::NearbyPlantChanged { plant });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the session has ended every command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase == SessionPhase::Unmounted {
        warn!("ignoring {command:?} after the session ended");
        return;
    }

    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SetMovementIntent { intent } => world.set_intent(intent, out_events),
        Command::SetInputMode { mode } => {
            if world.input_mode != mode {
                world.input_mode = mode;
                debug!("input mode changed to {mode:?}");
                out_events.push(Event::InputModeChanged { mode });
            }
        }
        Command::MovePlayer { to } => world.move_player(to, out_events),
        Command::PublishSnapshot => world.publish_snapshot(out_events),
        Command::SetNearbyPlant { plant } => world.set_nearby(plant, out_events),
        Command::AdjustZoom { step } => {
            let zoom = world.zoom.stepped(step);
            if zoom != world.zoom {
                world.zoom = zoom;
                out_events.push(Event::ZoomChanged { zoom });
            }
        }
        Command::RequestPlantDetail => match &world.nearby {
            Some(plant) => {
                debug!("detail requested for `{plant}`");
                out_events.push(Event::PlantDetailRequested {
                    plant: plant.clone(),
                });
            }
            None => debug!("detail requested with no plant nearby"),
        },
        Command::EndSession => {
            world.phase = SessionPhase::Unmounted;
            world.intent = MovementIntent::NONE;
            debug!(
                "session ended after {} ticks ({:?} simulated)",
                world.tick_index, world.elapsed
            );
            out_events.push(Event::SessionEnded);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{PlayerState, World};
    use garden_core::{
        GardenBounds, InputMode, LocomotionState, MovementIntent, PlantCatalog, PlantEntity,
        PlantId, PublishedSnapshot, SessionPhase, WorldPosition, ZoomScale,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the player state.
    #[must_use]
    pub fn player(world: &World) -> &PlayerState {
        &world.player
    }

    /// Authoritative player position, updated every frame.
    #[must_use]
    pub fn player_position(world: &World) -> WorldPosition {
        world.player.position
    }

    /// Throttled snapshot that renderers should pull from.
    #[must_use]
    pub fn published_snapshot(world: &World) -> PublishedSnapshot {
        world.published
    }

    /// Play area the player is confined to.
    #[must_use]
    pub fn bounds(world: &World) -> GardenBounds {
        world.bounds
    }

    /// Movement intent currently driving the player.
    #[must_use]
    pub fn movement_intent(world: &World) -> MovementIntent {
        world.intent
    }

    /// Whether the player is idle or moving.
    #[must_use]
    pub fn locomotion_state(world: &World) -> LocomotionState {
        LocomotionState::from_intent(world.intent)
    }

    /// Input source currently selected.
    #[must_use]
    pub fn input_mode(world: &World) -> InputMode {
        world.input_mode
    }

    /// Authoritative camera zoom.
    #[must_use]
    pub fn zoom(world: &World) -> ZoomScale {
        world.zoom
    }

    /// Plant reported within interaction range at the last throttled check.
    #[must_use]
    pub fn nearby_plant(world: &World) -> Option<&PlantId> {
        world.nearby.as_ref()
    }

    /// Plant catalog supplied when the session started.
    #[must_use]
    pub fn catalog(world: &World) -> &PlantCatalog {
        &world.catalog
    }

    /// Plants in catalog order.
    #[must_use]
    pub fn plants(world: &World) -> &[PlantEntity] {
        world.catalog.plants()
    }

    /// Lifecycle phase of the session.
    #[must_use]
    pub fn session_phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Total simulated time accumulated from ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}
