#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the herb garden walk engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod catalog;
mod config;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use catalog::{CatalogError, PlantCatalog};
pub use config::{ConfigError, GardenConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the herb garden.";

/// Side length of the square garden measured in world units.
pub const DEFAULT_GARDEN_SIZE: f32 = 50.0;

/// Distance kept between the playable area and the garden edge.
pub const DEFAULT_BOUNDARY_MARGIN: f32 = 5.0;

/// Distance travelled along each active axis during one nominal frame.
pub const BASE_SPEED: f32 = 0.1;

/// Duration of one frame at the nominal 60 frames per second baseline.
pub const NOMINAL_FRAME_MS: f32 = 16.67;

/// Minimum time between two published snapshots.
pub const UI_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum world-space distance at which a plant counts as nearby.
pub const DEFAULT_INTERACTION_RADIUS: f32 = 3.0;

/// Location in garden space expressed on the horizontal `(x, z)` plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    x: f32,
    z: f32,
}

impl WorldPosition {
    /// Centre of the garden where every session starts.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Coordinate along the left/right axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Coordinate along the forward/back axis.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Euclidean distance between two positions on the `(x, z)` plane.
    #[must_use]
    pub fn distance(self, other: WorldPosition) -> f32 {
        (self.x - other.x).hypot(self.z - other.z)
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

/// Rectangular play area centred on the garden origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GardenBounds {
    boundary: f32,
}

impl GardenBounds {
    /// Derives the bounds from a garden size and the margin kept from its edge.
    ///
    /// A margin larger than half the garden collapses the play area to the
    /// origin rather than inverting it.
    #[must_use]
    pub fn new(garden_size: f32, margin: f32) -> Self {
        Self {
            boundary: (garden_size / 2.0 - margin).max(0.0),
        }
    }

    /// Largest absolute coordinate the player may occupy on either axis.
    #[must_use]
    pub const fn boundary(&self) -> f32 {
        self.boundary
    }

    /// Clamps each axis of the position independently into the play area.
    #[must_use]
    pub fn clamp(&self, position: WorldPosition) -> WorldPosition {
        WorldPosition::new(
            position.x().clamp(-self.boundary, self.boundary),
            position.z().clamp(-self.boundary, self.boundary),
        )
    }

    /// Reports whether the position lies inside the play area.
    #[must_use]
    pub fn contains(&self, position: WorldPosition) -> bool {
        position.x().abs() <= self.boundary && position.z().abs() <= self.boundary
    }
}

impl Default for GardenBounds {
    fn default() -> Self {
        Self::new(DEFAULT_GARDEN_SIZE, DEFAULT_BOUNDARY_MARGIN)
    }
}

/// Unique identifier assigned to a plant, stable for the whole session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantId(String);

impl PlantId {
    /// Creates a new plant identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display-only information attached to a plant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantMetadata {
    /// Common name shown to the user.
    pub name: String,
    /// Short description of the plant.
    #[serde(default)]
    pub description: String,
    /// Traditional benefits listed in the detail view.
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// Static plant placed in the garden.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantEntity {
    id: PlantId,
    position: WorldPosition,
    #[serde(default = "default_visual_size")]
    visual_size: f32,
    #[serde(flatten)]
    metadata: PlantMetadata,
}

fn default_visual_size() -> f32 {
    1.0
}

impl PlantEntity {
    /// Creates a new plant entity.
    #[must_use]
    pub fn new(
        id: PlantId,
        position: WorldPosition,
        visual_size: f32,
        metadata: PlantMetadata,
    ) -> Self {
        Self {
            id,
            position,
            visual_size,
            metadata,
        }
    }

    /// Identifier of the plant.
    #[must_use]
    pub const fn id(&self) -> &PlantId {
        &self.id
    }

    /// Fixed position of the plant in garden space.
    #[must_use]
    pub const fn position(&self) -> WorldPosition {
        self.position
    }

    /// Scaling factor applied when drawing the plant.
    #[must_use]
    pub const fn visual_size(&self) -> f32 {
        self.visual_size
    }

    /// Display-only information about the plant.
    #[must_use]
    pub const fn metadata(&self) -> &PlantMetadata {
        &self.metadata
    }
}

/// Directions a movement intent can point towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Movement toward decreasing z.
    Forward,
    /// Movement toward increasing z.
    Back,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl MoveDirection {
    /// Every direction in a stable order.
    pub const ALL: [Self; 4] = [Self::Forward, Self::Back, Self::Left, Self::Right];
}

/// Four independent directional flags derived from raw input.
///
/// Opposite flags may both be set; they cancel out during integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MovementIntent {
    /// Movement toward decreasing z is requested.
    pub forward: bool,
    /// Movement toward increasing z is requested.
    pub back: bool,
    /// Movement toward decreasing x is requested.
    pub left: bool,
    /// Movement toward increasing x is requested.
    pub right: bool,
}

impl MovementIntent {
    /// Intent with every direction released.
    pub const NONE: Self = Self {
        forward: false,
        back: false,
        left: false,
        right: false,
    };

    /// Reports whether at least one direction is requested.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    /// Reports whether the provided direction is requested.
    #[must_use]
    pub const fn is_set(&self, direction: MoveDirection) -> bool {
        match direction {
            MoveDirection::Forward => self.forward,
            MoveDirection::Back => self.back,
            MoveDirection::Left => self.left,
            MoveDirection::Right => self.right,
        }
    }

    /// Sets or clears a single direction.
    pub fn set(&mut self, direction: MoveDirection, active: bool) {
        match direction {
            MoveDirection::Forward => self.forward = active,
            MoveDirection::Back => self.back = active,
            MoveDirection::Left => self.left = active,
            MoveDirection::Right => self.right = active,
        }
    }

    /// Returns a copy of the intent with the provided direction set.
    #[must_use]
    pub fn with(mut self, direction: MoveDirection) -> Self {
        self.set(direction, true);
        self
    }
}

/// Input source that currently drives the movement intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// A virtual joystick anchored where the drag gesture starts.
    #[default]
    Joystick,
    /// Four directional buttons with press-in/press-out semantics.
    Buttons,
}

impl InputMode {
    /// Returns the other input mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Joystick => Self::Buttons,
            Self::Buttons => Self::Joystick,
        }
    }
}

/// Pointer location reported by the platform input layer in screen points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerPosition {
    /// Horizontal coordinate, growing to the right.
    pub x: f32,
    /// Vertical coordinate, growing downward.
    pub y: f32,
}

impl PointerPosition {
    /// Creates a new pointer position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Raw input gestures captured by adapters before normalisation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputGesture {
    /// A joystick drag started at the provided point.
    JoystickGrant {
        /// Point where the drag began; becomes the joystick anchor.
        point: PointerPosition,
    },
    /// The joystick drag moved to the provided point.
    JoystickMove {
        /// Current pointer location.
        point: PointerPosition,
    },
    /// The joystick drag ended.
    JoystickRelease,
    /// A directional button started being pressed.
    ButtonPressIn {
        /// Direction bound to the button.
        direction: MoveDirection,
    },
    /// A directional button stopped being pressed, wherever the pointer is.
    ButtonPressOut {
        /// Direction bound to the button.
        direction: MoveDirection,
    },
    /// The user selected an input mode.
    SelectMode {
        /// Mode that should drive movement from now on.
        mode: InputMode,
    },
}

/// Camera zoom stored in whole tenths so repeated steps stay exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoomScale(u8);

impl ZoomScale {
    /// Smallest permitted zoom (0.5).
    pub const MIN: Self = Self(5);
    /// Largest permitted zoom (2.0).
    pub const MAX: Self = Self(20);
    /// Zoom applied when a session starts (1.0).
    pub const DEFAULT: Self = Self(10);

    /// Converts a floating point zoom into the nearest tenth.
    ///
    /// Returns `None` when the value is not finite or lies outside `[0.5, 2.0]`.
    #[must_use]
    pub fn from_f32(value: f32) -> Option<Self> {
        if !(Self::MIN.get()..=Self::MAX.get()).contains(&value) {
            return None;
        }
        Some(Self((value * 10.0).round() as u8))
    }

    /// Zoom factor applied by the projector.
    #[must_use]
    pub fn get(&self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Applies one zoom step, saturating at the permitted range.
    #[must_use]
    pub fn stepped(self, step: ZoomStep) -> Self {
        let tenths = match step {
            ZoomStep::In => self.0.saturating_add(1),
            ZoomStep::Out => self.0.saturating_sub(1),
        };
        Self(tenths.clamp(Self::MIN.0, Self::MAX.0))
    }
}

impl Default for ZoomScale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Direction of a single zoom adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomStep {
    /// Increase the zoom by one tenth.
    In,
    /// Decrease the zoom by one tenth.
    Out,
}

/// Whether the player is currently travelling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    /// No movement intent is active.
    #[default]
    Idle,
    /// At least one direction is requested.
    Moving,
}

impl LocomotionState {
    /// Derives the locomotion state implied by an intent.
    #[must_use]
    pub const fn from_intent(intent: MovementIntent) -> Self {
        if intent.is_active() {
            Self::Moving
        } else {
            Self::Idle
        }
    }
}

/// Lifecycle of a garden session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// The garden screen is mounted and the simulation accepts commands.
    #[default]
    Active,
    /// The garden screen unmounted; no further transitions occur.
    Unmounted,
}

/// Throttled copy of the player state exposed to renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PublishedSnapshot {
    /// Player position at the time of publishing.
    pub position: WorldPosition,
    /// Camera zoom at the time of publishing.
    pub zoom: ZoomScale,
    /// Number of snapshots published before this one.
    pub sequence: u64,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the movement intent driving the player.
    SetMovementIntent {
        /// Normalised directional flags.
        intent: MovementIntent,
    },
    /// Records which input source drives movement.
    SetInputMode {
        /// Mode that became active.
        mode: InputMode,
    },
    /// Moves the player to a new position; the world clamps it to the play area.
    MovePlayer {
        /// Requested destination in garden space.
        to: WorldPosition,
    },
    /// Copies the authoritative player state into the published snapshot.
    PublishSnapshot,
    /// Records the plant currently within interaction range.
    SetNearbyPlant {
        /// Nearby plant, or `None` when nothing is in range.
        plant: Option<PlantId>,
    },
    /// Adjusts the camera zoom by one step.
    AdjustZoom {
        /// Direction of the adjustment.
        step: ZoomStep,
    },
    /// Requests the detail view for the nearby plant.
    RequestPlantDetail,
    /// Ends the session because the garden screen unmounted.
    EndSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the movement intent changed.
    MovementIntentChanged {
        /// Intent now driving the player.
        intent: MovementIntent,
    },
    /// Announces a transition between idle and moving.
    LocomotionStateChanged {
        /// State that became active.
        state: LocomotionState,
    },
    /// Announces that a different input source drives movement.
    InputModeChanged {
        /// Mode that became active.
        mode: InputMode,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: WorldPosition,
        /// Position after clamping.
        to: WorldPosition,
    },
    /// Confirms that a new snapshot is available to renderers.
    SnapshotPublished {
        /// Player position captured by the snapshot.
        position: WorldPosition,
    },
    /// Announces that the nearby plant changed.
    NearbyPlantChanged {
        /// Plant now within range, or `None`.
        plant: Option<PlantId>,
    },
    /// Announces that the camera zoom changed.
    ZoomChanged {
        /// Zoom now applied by the camera.
        zoom: ZoomScale,
    },
    /// The user asked to see the detail view of a plant.
    PlantDetailRequested {
        /// Plant whose details were requested.
        plant: PlantId,
    },
    /// The session ended; no further events follow.
    SessionEnded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_bounds_leave_twenty_units_each_way() {
        assert_relative_eq!(GardenBounds::default().boundary(), 20.0);
    }

    #[test]
    fn clamp_limits_each_axis_independently() {
        let bounds = GardenBounds::new(50.0, 5.0);
        let clamped = bounds.clamp(WorldPosition::new(25.0, -3.0));

        assert_eq!(clamped, WorldPosition::new(20.0, -3.0));
        assert!(bounds.contains(clamped));
        assert!(!bounds.contains(WorldPosition::new(0.0, -20.5)));
    }

    #[test]
    fn oversized_margin_collapses_play_area() {
        let bounds = GardenBounds::new(10.0, 8.0);
        assert_eq!(bounds.boundary(), 0.0);
        assert_eq!(
            bounds.clamp(WorldPosition::new(3.0, -4.0)),
            WorldPosition::ORIGIN
        );
    }

    #[test]
    fn zoom_saturates_at_both_ends() {
        let mut zoom = ZoomScale::DEFAULT;
        for _ in 0..30 {
            zoom = zoom.stepped(ZoomStep::In);
        }
        assert_eq!(zoom, ZoomScale::MAX);
        assert_relative_eq!(zoom.get(), 2.0);

        for _ in 0..30 {
            zoom = zoom.stepped(ZoomStep::Out);
        }
        assert_eq!(zoom, ZoomScale::MIN);
        assert_relative_eq!(zoom.get(), 0.5);
    }

    #[test]
    fn zoom_steps_are_exact_tenths() {
        let zoom = ZoomScale::DEFAULT
            .stepped(ZoomStep::In)
            .stepped(ZoomStep::In)
            .stepped(ZoomStep::In);
        assert_eq!(ZoomScale::from_f32(1.3), Some(zoom));
    }

    #[test]
    fn zoom_from_f32_rejects_out_of_range_values() {
        assert_eq!(ZoomScale::from_f32(0.4), None);
        assert_eq!(ZoomScale::from_f32(0.46), None);
        assert_eq!(ZoomScale::from_f32(2.04), None);
        assert_eq!(ZoomScale::from_f32(2.1), None);
        assert_eq!(ZoomScale::from_f32(f32::NAN), None);
        assert_eq!(ZoomScale::from_f32(2.0), Some(ZoomScale::MAX));
        assert_eq!(ZoomScale::from_f32(0.5), Some(ZoomScale::MIN));
    }

    #[test]
    fn intent_reports_activity_and_locomotion_state() {
        let intent = MovementIntent::NONE.with(MoveDirection::Left);
        assert!(intent.is_active());
        assert!(intent.is_set(MoveDirection::Left));
        assert!(!intent.is_set(MoveDirection::Right));
        assert_eq!(LocomotionState::from_intent(intent), LocomotionState::Moving);
        assert_eq!(
            LocomotionState::from_intent(MovementIntent::NONE),
            LocomotionState::Idle
        );
    }

    #[test]
    fn plant_entity_reads_from_toml_with_flattened_metadata() {
        let source = r#"
            id = "tulsi"
            position = { x = 1.5, z = -2.0 }
            visual_size = 1.2
            name = "Tulsi"
            benefits = ["Calms the mind"]
        "#;
        let plant: PlantEntity = toml::from_str(source).expect("valid plant");

        assert_eq!(plant.id().as_str(), "tulsi");
        assert_eq!(plant.position(), WorldPosition::new(1.5, -2.0));
        assert_relative_eq!(plant.visual_size(), 1.2);
        assert_eq!(plant.metadata().name, "Tulsi");
        assert!(plant.metadata().description.is_empty());
        assert_eq!(plant.metadata().benefits, vec!["Calms the mind".to_owned()]);
    }

    #[test]
    fn input_mode_toggles_between_sources() {
        assert_eq!(InputMode::Joystick.toggled(), InputMode::Buttons);
        assert_eq!(InputMode::Buttons.toggled(), InputMode::Joystick);
    }
}
