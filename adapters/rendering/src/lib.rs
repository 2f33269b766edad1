#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for herb garden adapters.
//!
//! Backends never read the world directly. The binary pulls the throttled
//! [`PublishedSnapshot`] each frame, projects every plant relative to the
//! player with [`project`], and hands the resulting [`Scene`] to whichever
//! [`RenderingBackend`] is active.

use anyhow::Result as AnyResult;
use garden_core::{
    InputGesture, InputMode, LocomotionState, PlantEntity, PlantId, PublishedSnapshot,
    WorldPosition, ZoomStep,
};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// Screen pixels covered by one world unit at zoom `1.0`.
pub const BASE_SCALE: f32 = 20.0;

/// World-space radius of a plant whose visual size is `1.0`.
pub const PLANT_RADIUS: f32 = 0.5;

/// Projects a world position into screen space relative to the player.
///
/// The player is always drawn at `viewport_center`; everything else is offset
/// by its distance from the player, scaled by [`BASE_SCALE`] and `zoom`.
#[must_use]
pub fn project(
    world: WorldPosition,
    player: WorldPosition,
    zoom: f32,
    viewport_center: Vec2,
) -> Vec2 {
    let scale = BASE_SCALE * zoom;
    viewport_center + Vec2::new(world.x() - player.x(), world.z() - player.z()) * scale
}

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors used to draw every scene element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill of a plant that is out of reach.
    pub plant: Color,
    /// Fill of the plant the player can interact with.
    pub nearby_plant: Color,
    /// Fill of the player marker.
    pub player: Color,
    /// Ring drawn around the joystick anchor.
    pub joystick_base: Color,
    /// Knob drawn at the joystick offset.
    pub joystick_knob: Color,
    /// Heads-up display text.
    pub text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        let leaf = Color::from_rgb_u8(0x3c, 0x8d, 0x2f);
        Self {
            plant: leaf,
            nearby_plant: leaf.lighten(0.45),
            player: Color::from_rgb_u8(0xd9, 0x73, 0x2b),
            joystick_base: Color::from_rgb_u8(0xff, 0xff, 0xff).with_alpha(0.25),
            joystick_knob: Color::from_rgb_u8(0xff, 0xff, 0xff).with_alpha(0.6),
            text: Color::from_rgb_u8(0xf4, 0xf1, 0xe6),
        }
    }
}

/// Drawable area reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport after validating that both dimensions are usable.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        let usable = |value: f32| value.is_finite() && value > 0.0;
        if !usable(width) || !usable(height) {
            return Err(RenderingError::InvalidViewport { width, height });
        }

        Ok(Self { width, height })
    }

    /// Width of the drawable area in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the drawable area in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Point at which the player marker is drawn.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Converts monotonic platform timestamps into frame deltas.
///
/// The first frame, a non-finite timestamp and a timestamp that does not move
/// forward all yield [`Duration::ZERO`], so a clock anomaly skips a tick
/// instead of teleporting the player.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Creates a clock that has not observed any frame yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_ms: None }
    }

    /// Records the timestamp of a new frame and returns the time elapsed since
    /// the previous one.
    pub fn advance(&mut self, timestamp_ms: f64) -> Duration {
        if !timestamp_ms.is_finite() {
            return Duration::ZERO;
        }

        let Some(previous) = self.last_ms.replace(timestamp_ms) else {
            return Duration::ZERO;
        };

        let delta_ms = timestamp_ms - previous;
        if delta_ms <= 0.0 {
            return Duration::ZERO;
        }

        Duration::from_micros((delta_ms * 1000.0).round() as u64)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Raw joystick and button gestures observed this frame, in order.
    pub gestures: Vec<InputGesture>,
    /// Whether the adapter detected an input mode toggle on this frame.
    pub mode_toggle: bool,
    /// Zoom step requested on this frame, if any.
    pub zoom: Option<ZoomStep>,
    /// Whether the user asked for details about the nearby plant.
    pub request_detail: bool,
    /// Whether the user asked to leave the garden.
    pub exit_requested: bool,
}

/// Decision returned by the scene update closure after every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep scheduling frames.
    Continue,
    /// Stop the frame loop and return from [`RenderingBackend::run`].
    Exit,
}

/// Plant drawn at its projected screen position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlantSprite {
    /// Identifier of the plant being drawn.
    pub id: PlantId,
    /// Display name drawn next to the plant.
    pub label: String,
    /// Projected screen-space centre of the plant.
    pub screen_position: Vec2,
    /// Relative size multiplier taken from the catalog.
    pub visual_size: f32,
    /// On-screen radius in pixels at the current zoom.
    pub radius: f32,
    /// Whether this is the plant the player can currently interact with.
    pub nearby: bool,
}

/// Player marker, always drawn at the viewport centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerMarker {
    /// Marker radius in pixels.
    pub radius: f32,
    /// Whether the player is currently walking.
    pub moving: bool,
}

impl Default for PlayerMarker {
    fn default() -> Self {
        Self {
            radius: 8.0,
            moving: false,
        }
    }
}

/// Virtual joystick drawn while a drag is in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoystickVisual {
    /// Screen point where the drag started.
    pub anchor: Vec2,
    /// Knob offset from the anchor, already clamped by the input controller.
    pub offset: Vec2,
    /// Radius of the ring drawn around the anchor.
    pub reach: f32,
}

impl JoystickVisual {
    /// Screen position of the knob.
    #[must_use]
    pub fn knob(&self) -> Vec2 {
        self.anchor + self.offset
    }
}

/// Plant information shown after a detail request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailCard {
    /// Common name of the plant.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Listed benefits, one per line.
    pub benefits: Vec<String>,
}

/// Heads-up display data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    /// Greeting shown at the top of the screen.
    pub banner: String,
    /// Active input source.
    pub input_mode: InputMode,
    /// Current zoom factor.
    pub zoom: f32,
    /// Name of the plant the player can interact with.
    pub nearby_label: Option<String>,
    /// Open detail card, if the user requested one.
    pub detail: Option<DetailCard>,
}

/// Complete description of a frame handed to the backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Drawable area, refreshed by the backend before each update.
    pub viewport: Viewport,
    /// Projected plants in catalog order.
    pub plants: Vec<PlantSprite>,
    /// The player marker.
    pub player: PlayerMarker,
    /// Joystick visual, present only during a drag.
    pub joystick: Option<JoystickVisual>,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene covering the provided viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Rebuilds every plant sprite from the latest published snapshot.
    ///
    /// Uses the throttled snapshot rather than the authoritative position, so
    /// the drawn garden may trail the simulation by one publish interval.
    pub fn populate_plants(
        &mut self,
        plants: &[PlantEntity],
        snapshot: &PublishedSnapshot,
        nearby: Option<&PlantId>,
    ) {
        let zoom = snapshot.zoom.get();
        let center = self.viewport.center();

        self.plants.clear();
        self.plants.extend(plants.iter().map(|plant| PlantSprite {
            id: plant.id().clone(),
            label: plant.metadata().name.clone(),
            screen_position: project(plant.position(), snapshot.position, zoom, center),
            visual_size: plant.visual_size(),
            radius: plant.visual_size() * PLANT_RADIUS * BASE_SCALE * zoom,
            nearby: nearby == Some(plant.id()),
        }));
        self.hud.zoom = zoom;
    }

    /// Screen position of the player marker.
    #[must_use]
    pub fn player_position(&self) -> Vec2 {
        self.viewport.center()
    }
}

/// Static window settings and the initial scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by windowed backends.
    pub window_title: String,
    /// Color used to clear each frame.
    pub clear_color: Color,
    /// Colors for every scene element.
    pub palette: Palette,
    /// Scene shown before the first update.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a presentation with the default palette.
    #[must_use]
    pub fn new(window_title: impl Into<String>, clear_color: Color, scene: Scene) -> Self {
        Self {
            window_title: window_title.into(),
            clear_color,
            palette: Palette::default(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting herb garden scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure asks it to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta produced by
    /// a [`FrameClock`], the per-frame input captured by the adapter, and may
    /// mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Maps a locomotion state onto the marker animation flag.
#[must_use]
pub const fn is_moving(state: LocomotionState) -> bool {
    matches!(state, LocomotionState::Moving)
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Both viewport dimensions must be finite and positive.
    InvalidViewport {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(
                    f,
                    "viewport must have positive finite dimensions (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
