#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input controller that normalises joystick drags and button presses into
//! movement intents.
//!
//! Exactly one source is active at a time. Gestures addressed to the inactive
//! source are dropped, and switching sources clears every held direction so
//! no movement survives the switch.

use garden_core::{
    Command, InputGesture, InputMode, MoveDirection, MovementIntent, PointerPosition,
};
use log::{debug, trace};

/// Largest distance the joystick knob may travel from its anchor.
pub const MAX_JOYSTICK_DISTANCE: f32 = 50.0;

/// Offset along an axis below which the joystick reports no movement.
pub const JOYSTICK_DEAD_ZONE: f32 = 10.0;

/// Visual state of the virtual joystick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JoystickView {
    /// Whether a drag is in progress and the joystick should be drawn.
    pub visible: bool,
    /// Point where the current drag started.
    pub anchor: PointerPosition,
    /// Knob offset from the anchor, clamped to [`MAX_JOYSTICK_DISTANCE`].
    pub offset: PointerPosition,
}

/// Stateful controller that owns the current intent snapshot.
#[derive(Debug, Default)]
pub struct InputController {
    mode: InputMode,
    intent: MovementIntent,
    joystick: JoystickView,
}

impl InputController {
    /// Creates a controller with the provided source active.
    #[must_use]
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Input source currently accepted.
    #[must_use]
    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    /// Current movement intent snapshot.
    #[must_use]
    pub const fn intent(&self) -> MovementIntent {
        self.intent
    }

    /// Current joystick visual state.
    #[must_use]
    pub const fn joystick(&self) -> JoystickView {
        self.joystick
    }

    /// Consumes raw gestures and emits commands describing the resulting state.
    ///
    /// `SetMovementIntent` is emitted once per batch, and only when the
    /// intent differs from the one held before the batch.
    pub fn handle(&mut self, gestures: &[InputGesture], out: &mut Vec<Command>) {
        let before = self.intent;

        for gesture in gestures {
            match *gesture {
                InputGesture::SelectMode { mode } => self.select_mode(mode, out),
                InputGesture::JoystickGrant { point } if self.mode == InputMode::Joystick => {
                    self.joystick = JoystickView {
                        visible: true,
                        anchor: point,
                        offset: PointerPosition::default(),
                    };
                    self.intent = MovementIntent::NONE;
                }
                InputGesture::JoystickMove { point }
                    if self.mode == InputMode::Joystick && self.joystick.visible =>
                {
                    let offset = clamp_offset(self.joystick.anchor, point);
                    self.joystick.offset = offset;
                    self.intent = joystick_intent(offset);
                }
                InputGesture::JoystickRelease if self.mode == InputMode::Joystick => {
                    self.joystick = JoystickView::default();
                    self.intent = MovementIntent::NONE;
                }
                InputGesture::ButtonPressIn { direction } if self.mode == InputMode::Buttons => {
                    self.intent.set(direction, true);
                }
                InputGesture::ButtonPressOut { direction } if self.mode == InputMode::Buttons => {
                    self.intent.set(direction, false);
                }
                other => trace!("dropping {other:?} while in {:?} mode", self.mode),
            }
        }

        if self.intent != before {
            out.push(Command::SetMovementIntent {
                intent: self.intent,
            });
        }
    }

    fn select_mode(&mut self, mode: InputMode, out: &mut Vec<Command>) {
        if self.mode == mode {
            return;
        }

        debug!("switching input from {:?} to {mode:?}", self.mode);
        self.mode = mode;
        self.intent = MovementIntent::NONE;
        self.joystick = JoystickView::default();
        out.push(Command::SetInputMode { mode });
    }
}

/// Offset of `point` from `anchor`, shortened along the drag angle so its
/// length never exceeds [`MAX_JOYSTICK_DISTANCE`].
#[must_use]
pub fn clamp_offset(anchor: PointerPosition, point: PointerPosition) -> PointerPosition {
    let dx = point.x - anchor.x;
    let dy = point.y - anchor.y;
    let distance = dx.hypot(dy);
    if distance <= MAX_JOYSTICK_DISTANCE {
        return PointerPosition::new(dx, dy);
    }

    let angle = dy.atan2(dx);
    PointerPosition::new(
        angle.cos() * MAX_JOYSTICK_DISTANCE,
        angle.sin() * MAX_JOYSTICK_DISTANCE,
    )
}

/// Converts a joystick offset into directional flags using the dead zone.
///
/// Screen y grows downward, so dragging up means forward.
#[must_use]
pub fn joystick_intent(offset: PointerPosition) -> MovementIntent {
    let mut intent = MovementIntent::NONE;
    intent.set(MoveDirection::Forward, offset.y < -JOYSTICK_DEAD_ZONE);
    intent.set(MoveDirection::Back, offset.y > JOYSTICK_DEAD_ZONE);
    intent.set(MoveDirection::Left, offset.x < -JOYSTICK_DEAD_ZONE);
    intent.set(MoveDirection::Right, offset.x > JOYSTICK_DEAD_ZONE);
    intent
}
