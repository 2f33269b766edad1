//! Windowless backend that replays a scripted walk.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use garden_core::{InputGesture, InputMode, MoveDirection, PointerPosition, ZoomStep};
use garden_rendering::{
    FrameClock, FrameControl, FrameInput, Presentation, RenderingBackend, Scene,
};
use log::debug;
use serde::Deserialize;

/// Sequence of timed steps replayed by [`HeadlessBackend`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<ScriptStep>,
}

/// One stretch of time during which the scripted input stays constant.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptStep {
    duration_ms: u64,
    /// Buttons held for the whole step; anything else is released.
    #[serde(default)]
    hold: Vec<MoveDirection>,
    /// Joystick offset held for the whole step; absent means released.
    #[serde(default)]
    joystick: Option<[f32; 2]>,
    /// Input source the step expects; toggled on the first frame if needed.
    #[serde(default)]
    mode: Option<InputMode>,
    #[serde(default)]
    zoom: Option<ZoomStep>,
    /// Requests the detail card on the first frame of the step.
    #[serde(default)]
    detail: bool,
}

/// Reads a walk script from disk.
pub(crate) fn load_script(path: &Path) -> Result<Script> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&source).with_context(|| format!("invalid script {}", path.display()))
}

fn parse_script(source: &str) -> Result<Script> {
    toml::from_str(source).context("malformed walk script")
}

/// Rendering backend that feeds scripted input at a fixed frame rate and
/// never draws anything.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    script: Script,
    frame_ms: f64,
}

impl HeadlessBackend {
    /// Creates a backend that advances the clock by `frame_ms` every frame.
    pub(crate) fn new(script: Script, frame_ms: f64) -> Self {
        Self { script, frame_ms }
    }
}

/// Scripted input state carried between steps.
#[derive(Debug, Default)]
struct ScriptedInput {
    held: Vec<MoveDirection>,
    joystick: Option<[f32; 2]>,
}

impl ScriptedInput {
    /// Produces the input for the first frame of `step`, relative to the
    /// state left behind by the previous step.
    fn enter(&mut self, step: &ScriptStep, scene: &Scene) -> FrameInput {
        let mut gestures = Vec::new();

        // The controller drops held buttons and the joystick when the mode
        // switches, and the switch lands before this frame's gestures.
        let mode_toggle = step.mode.is_some_and(|mode| mode != scene.hud.input_mode);
        if mode_toggle {
            self.held.clear();
            self.joystick = None;
        }

        for direction in MoveDirection::ALL {
            let was_held = self.held.contains(&direction);
            let now_held = step.hold.contains(&direction);
            if was_held && !now_held {
                gestures.push(InputGesture::ButtonPressOut { direction });
            } else if now_held && !was_held {
                gestures.push(InputGesture::ButtonPressIn { direction });
            }
        }
        self.held = step.hold.clone();

        let anchor = scene.player_position();
        match (self.joystick, step.joystick) {
            (None, Some([dx, dy])) => {
                gestures.push(InputGesture::JoystickGrant {
                    point: PointerPosition::new(anchor.x, anchor.y),
                });
                gestures.push(InputGesture::JoystickMove {
                    point: PointerPosition::new(anchor.x + dx, anchor.y + dy),
                });
            }
            (Some(previous), Some([dx, dy])) if previous != [dx, dy] => {
                gestures.push(InputGesture::JoystickMove {
                    point: PointerPosition::new(anchor.x + dx, anchor.y + dy),
                });
            }
            (Some(_), None) => gestures.push(InputGesture::JoystickRelease),
            _ => {}
        }
        self.joystick = step.joystick;

        FrameInput {
            gestures,
            mode_toggle,
            zoom: step.zoom,
            request_detail: step.detail,
            exit_requested: false,
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self { script, frame_ms } = self;
        let mut scene = presentation.scene;
        let mut clock = FrameClock::new();
        let mut timestamp_ms = 0.0;
        let mut scripted = ScriptedInput::default();

        let _ = clock.advance(timestamp_ms);
        if update_scene(Duration::ZERO, FrameInput::default(), &mut scene) == FrameControl::Exit {
            return Ok(());
        }

        for (index, step) in script.steps.iter().enumerate() {
            let frames = frames_for(step.duration_ms, frame_ms);
            debug!("script step {index}: {frames} frames of {step:?}");

            for frame in 0..frames {
                let input = if frame == 0 {
                    scripted.enter(step, &scene)
                } else {
                    FrameInput::default()
                };
                timestamp_ms += frame_ms;
                let dt = clock.advance(timestamp_ms);
                if update_scene(dt, input, &mut scene) == FrameControl::Exit {
                    return Ok(());
                }
            }
        }

        timestamp_ms += frame_ms;
        let exit = FrameInput {
            exit_requested: true,
            ..FrameInput::default()
        };
        let _ = update_scene(clock.advance(timestamp_ms), exit, &mut scene);
        Ok(())
    }
}

/// Number of frames needed to cover `duration_ms`; every step gets at least one.
fn frames_for(duration_ms: u64, frame_ms: f64) -> u64 {
    ((duration_ms as f64 / frame_ms).ceil() as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;
    use garden_core::{
        GardenConfig, PlantCatalog, PlantEntity, PlantId, PlantMetadata, WorldPosition,
    };
    use garden_rendering::{Color, Viewport};
    use std::{cell::RefCell, rc::Rc};

    fn presentation() -> Presentation {
        Presentation::new(
            "test",
            Color::from_rgb_u8(0, 0, 0),
            Scene::new(Viewport::default()),
        )
    }

    #[test]
    fn script_parses_every_field() {
        let script = parse_script(
            r#"
            [[step]]
            duration_ms = 250
            hold = ["forward", "left"]
            mode = "buttons"
            zoom = "out"
            detail = true

            [[step]]
            duration_ms = 100
            joystick = [12.5, -30.0]
            "#,
        )
        .expect("valid script");

        assert_eq!(script.steps.len(), 2);
        assert_eq!(
            script.steps[0].hold,
            vec![MoveDirection::Forward, MoveDirection::Left]
        );
        assert_eq!(script.steps[0].mode, Some(InputMode::Buttons));
        assert_eq!(script.steps[0].zoom, Some(ZoomStep::Out));
        assert!(script.steps[0].detail);
        assert_eq!(script.steps[1].joystick, Some([12.5, -30.0]));
    }

    #[test]
    fn unknown_step_fields_are_rejected() {
        assert!(parse_script("[[step]]\nduration_ms = 1\nsprint = true").is_err());
    }

    #[test]
    fn frame_count_rounds_up() {
        assert_eq!(frames_for(100, 16.67), 6);
        assert_eq!(frames_for(100, 20.0), 5);
        assert_eq!(frames_for(0, 20.0), 1);
    }

    #[test]
    fn step_transitions_press_and_release_buttons() {
        let scene = Scene::default();
        let mut scripted = ScriptedInput::default();
        let first = ScriptStep {
            duration_ms: 10,
            hold: vec![MoveDirection::Forward, MoveDirection::Left],
            ..ScriptStep::default()
        };
        let second = ScriptStep {
            duration_ms: 10,
            hold: vec![MoveDirection::Left],
            ..ScriptStep::default()
        };

        let _ = scripted.enter(&first, &scene);
        let input = scripted.enter(&second, &scene);

        assert_eq!(
            input.gestures,
            vec![InputGesture::ButtonPressOut {
                direction: MoveDirection::Forward
            }]
        );
    }

    #[test]
    fn mode_round_trip_presses_held_buttons_again() {
        let mut scene = Scene::default();
        let mut scripted = ScriptedInput::default();
        let walk = ScriptStep {
            duration_ms: 10,
            hold: vec![MoveDirection::Right],
            mode: Some(InputMode::Buttons),
            ..ScriptStep::default()
        };
        let drag = ScriptStep {
            duration_ms: 10,
            hold: vec![MoveDirection::Right],
            mode: Some(InputMode::Joystick),
            ..ScriptStep::default()
        };

        scene.hud.input_mode = InputMode::Buttons;
        let _ = scripted.enter(&walk, &scene);

        let input = scripted.enter(&drag, &scene);
        assert!(input.mode_toggle);
        scene.hud.input_mode = InputMode::Joystick;

        let input = scripted.enter(&walk, &scene);
        assert!(input.mode_toggle);
        assert_eq!(
            input.gestures,
            vec![InputGesture::ButtonPressIn {
                direction: MoveDirection::Right
            }]
        );
    }

    #[test]
    fn mode_switch_grants_the_joystick_again() {
        let mut scene = Scene::default();
        let mut scripted = ScriptedInput::default();
        let drag = ScriptStep {
            duration_ms: 10,
            joystick: Some([0.0, -40.0]),
            mode: Some(InputMode::Joystick),
            ..ScriptStep::default()
        };
        let buttons = ScriptStep {
            mode: Some(InputMode::Buttons),
            ..drag.clone()
        };

        scene.hud.input_mode = InputMode::Joystick;
        let _ = scripted.enter(&drag, &scene);
        let _ = scripted.enter(&buttons, &scene);
        scene.hud.input_mode = InputMode::Buttons;

        let input = scripted.enter(&drag, &scene);
        assert!(matches!(
            input.gestures.as_slice(),
            [
                InputGesture::JoystickGrant { .. },
                InputGesture::JoystickMove { .. }
            ]
        ));
    }

    #[test]
    fn scripted_walk_reaches_the_plant_and_ends_the_session() {
        let catalog = PlantCatalog::new(vec![PlantEntity::new(
            PlantId::new("tulsi"),
            WorldPosition::new(6.0, 0.0),
            1.0,
            PlantMetadata {
                name: "Tulsi".to_owned(),
                ..PlantMetadata::default()
            },
        )])
        .expect("valid catalog");
        let script = parse_script(
            r#"
            [[step]]
            duration_ms = 20
            mode = "buttons"

            [[step]]
            duration_ms = 1000
            hold = ["right"]

            [[step]]
            duration_ms = 200
            detail = true
            "#,
        )
        .expect("valid script");

        let simulation = Rc::new(RefCell::new(Simulation::new(
            &GardenConfig::default(),
            catalog,
        )));
        let detail_seen = Rc::new(RefCell::new(None));
        let frames = Rc::new(RefCell::new(0_u32));
        let (sim, seen, count) = (
            Rc::clone(&simulation),
            Rc::clone(&detail_seen),
            Rc::clone(&frames),
        );

        HeadlessBackend::new(script, 20.0)
            .run(presentation(), move |dt, input, scene| {
                *count.borrow_mut() += 1;
                let control = sim.borrow_mut().frame(dt, input, scene);
                if let Some(card) = &scene.hud.detail {
                    *seen.borrow_mut() = Some(card.name.clone());
                }
                control
            })
            .expect("headless run succeeds");

        let simulation = simulation.borrow();
        let world = simulation.world();
        assert_eq!(
            garden_world::query::session_phase(world),
            garden_core::SessionPhase::Unmounted
        );
        assert!(garden_world::query::player_position(world).x() > 5.0);
        assert_eq!(detail_seen.borrow().as_deref(), Some("Tulsi"));
        assert_eq!(*frames.borrow(), 1 + 1 + 50 + 10 + 1);
    }
}
