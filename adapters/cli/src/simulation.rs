//! Per-frame pump that wires adapters, the world and every system together.

use std::time::Duration;

use garden_core::{Command, Event, GardenConfig, InputGesture, PlantCatalog, SessionPhase};
use garden_rendering::{is_moving, DetailCard, FrameControl, FrameInput, JoystickVisual, Scene};
use garden_system_input::{InputController, MAX_JOYSTICK_DISTANCE};
use garden_system_locomotion::{Config as LocomotionConfig, Locomotion};
use garden_system_proximity::Proximity;
use garden_system_snapshot_sync::SnapshotSync;
use garden_world::{self as world, query, World};
use glam::Vec2;
use log::{info, trace};

/// Owns the authoritative world and the systems that react to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    input: InputController,
    locomotion: Locomotion,
    snapshot_sync: SnapshotSync,
    proximity: Proximity,
    frame_events: Vec<Event>,
}

impl Simulation {
    /// Builds a fresh session for the provided garden.
    pub(crate) fn new(config: &GardenConfig, catalog: PlantCatalog) -> Self {
        let world = World::new(config, catalog);
        let input = InputController::new(query::input_mode(&world));

        Self {
            world,
            input,
            locomotion: Locomotion::new(LocomotionConfig::from_garden(config)),
            snapshot_sync: SnapshotSync::from_garden(config),
            proximity: Proximity::from_garden(config),
            frame_events: Vec::new(),
        }
    }

    /// Read-only access to the world for inspection.
    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advances the session by one frame and refreshes the scene.
    ///
    /// A mode toggle takes effect before the frame's gestures, and input
    /// commands are applied before the tick so that a press observed this
    /// frame already moves the player this frame. Each system sees every event
    /// produced earlier in the same frame.
    pub(crate) fn frame(
        &mut self,
        dt: Duration,
        input: FrameInput,
        scene: &mut Scene,
    ) -> FrameControl {
        if query::session_phase(&self.world) == SessionPhase::Unmounted {
            return FrameControl::Exit;
        }

        self.frame_events.clear();

        let FrameInput {
            mut gestures,
            mode_toggle,
            zoom,
            request_detail,
            exit_requested,
        } = input;
        if mode_toggle {
            gestures.insert(
                0,
                InputGesture::SelectMode {
                    mode: self.input.mode().toggled(),
                },
            );
        }

        let mut commands = Vec::new();
        self.input.handle(&gestures, &mut commands);
        if let Some(step) = zoom {
            commands.push(Command::AdjustZoom { step });
        }
        if request_detail {
            commands.push(Command::RequestPlantDetail);
        }
        commands.push(Command::Tick { dt });
        if exit_requested {
            commands.push(Command::EndSession);
        }
        self.apply(commands);

        let mut commands = Vec::new();
        self.locomotion.handle(
            &self.frame_events,
            query::player_position(&self.world),
            query::movement_intent(&self.world),
            &mut commands,
        );
        self.apply(commands);

        let mut commands = Vec::new();
        self.snapshot_sync.handle(&self.frame_events, &mut commands);
        self.apply(commands);

        let mut commands = Vec::new();
        self.proximity
            .handle(&self.frame_events, query::plants(&self.world), &mut commands);
        self.apply(commands);

        self.present(scene);

        if query::session_phase(&self.world) == SessionPhase::Unmounted {
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            world::apply(&mut self.world, command, &mut self.frame_events);
        }
    }

    /// Rebuilds the scene from the published snapshot and this frame's events.
    fn present(&self, scene: &mut Scene) {
        for event in &self.frame_events {
            match event {
                Event::NearbyPlantChanged { plant } => {
                    scene.hud.detail = None;
                    match plant.as_ref().and_then(|id| query::catalog(&self.world).get(id)) {
                        Some(plant) => info!("{} is within reach", plant.metadata().name),
                        None => info!("no plant within reach"),
                    }
                }
                Event::PlantDetailRequested { plant } => {
                    if let Some(plant) = query::catalog(&self.world).get(plant) {
                        let metadata = plant.metadata();
                        info!("{}: {}", metadata.name, metadata.description);
                        scene.hud.detail = Some(DetailCard {
                            name: metadata.name.clone(),
                            description: metadata.description.clone(),
                            benefits: metadata.benefits.clone(),
                        });
                    }
                }
                Event::SessionEnded => {
                    let position = query::player_position(&self.world);
                    info!(
                        "left the garden at ({:.2}, {:.2}) after {:?}",
                        position.x(),
                        position.z(),
                        query::elapsed(&self.world)
                    );
                }
                other => trace!("{other:?}"),
            }
        }

        let nearby = query::nearby_plant(&self.world);
        scene.populate_plants(
            query::plants(&self.world),
            &query::published_snapshot(&self.world),
            nearby,
        );
        scene.player.moving = is_moving(query::locomotion_state(&self.world));
        scene.hud.banner = query::welcome_banner(&self.world).to_owned();
        scene.hud.input_mode = query::input_mode(&self.world);
        scene.hud.nearby_label = nearby
            .and_then(|id| query::catalog(&self.world).get(id))
            .map(|plant| plant.metadata().name.clone());

        let joystick = self.input.joystick();
        scene.joystick = joystick.visible.then(|| JoystickVisual {
            anchor: Vec2::new(joystick.anchor.x, joystick.anchor.y),
            offset: Vec2::new(joystick.offset.x, joystick.offset.y),
            reach: MAX_JOYSTICK_DISTANCE,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use garden_core::{
        InputMode, MoveDirection, PlantEntity, PlantId, PlantMetadata, PointerPosition,
        WorldPosition, ZoomScale, ZoomStep,
    };
    use garden_rendering::Viewport;

    const FRAME: Duration = Duration::from_millis(20);

    fn garden() -> Simulation {
        let plants = vec![PlantEntity::new(
            PlantId::new("tulsi"),
            WorldPosition::new(2.0, 0.0),
            1.0,
            PlantMetadata {
                name: "Tulsi".to_owned(),
                description: "Holy basil".to_owned(),
                benefits: vec!["Calms the mind".to_owned()],
            },
        )];
        let catalog = PlantCatalog::new(plants).expect("valid catalog");
        Simulation::new(&GardenConfig::default(), catalog)
    }

    fn scene() -> Scene {
        Scene::new(Viewport::new(400.0, 400.0).expect("valid viewport"))
    }

    fn gestures(gestures: Vec<InputGesture>) -> FrameInput {
        FrameInput {
            gestures,
            ..FrameInput::default()
        }
    }

    #[test]
    fn first_frame_publishes_nothing_and_marks_no_plant() {
        let mut simulation = garden();
        let mut scene = scene();

        let control = simulation.frame(Duration::ZERO, FrameInput::default(), &mut scene);

        assert_eq!(control, FrameControl::Continue);
        assert_eq!(scene.plants.len(), 1);
        assert!(!scene.plants[0].nearby);
        assert_eq!(scene.hud.banner, query::welcome_banner(simulation.world()));
        assert_eq!(scene.hud.zoom, 1.0);
    }

    #[test]
    fn nearby_plant_appears_after_throttle_interval() {
        let mut simulation = garden();
        let mut scene = scene();

        for _ in 0..4 {
            let _ = simulation.frame(FRAME, FrameInput::default(), &mut scene);
        }
        assert!(scene.hud.nearby_label.is_none());

        let _ = simulation.frame(FRAME, FrameInput::default(), &mut scene);

        assert_eq!(scene.hud.nearby_label.as_deref(), Some("Tulsi"));
        assert!(scene.plants[0].nearby);
    }

    #[test]
    fn toggled_buttons_walk_the_player() {
        let mut simulation = garden();
        let mut scene = scene();
        let toggle = FrameInput {
            mode_toggle: true,
            ..FrameInput::default()
        };

        let _ = simulation.frame(FRAME, toggle, &mut scene);
        assert_eq!(scene.hud.input_mode, InputMode::Buttons);

        let press = gestures(vec![InputGesture::ButtonPressIn {
            direction: MoveDirection::Left,
        }]);
        let _ = simulation.frame(FRAME, press, &mut scene);
        assert!(scene.player.moving);

        let position = query::player_position(simulation.world());
        assert_relative_eq!(position.x(), -0.1 * 20.0 / 16.67, epsilon = 1e-5);
        assert_relative_eq!(position.z(), 0.0);
    }

    #[test]
    fn joystick_drag_is_mirrored_in_the_scene() {
        let mut simulation = garden();
        let mut scene = scene();

        let drag = gestures(vec![
            InputGesture::JoystickGrant {
                point: PointerPosition::new(100.0, 300.0),
            },
            InputGesture::JoystickMove {
                point: PointerPosition::new(100.0, 200.0),
            },
        ]);
        let _ = simulation.frame(FRAME, drag, &mut scene);

        let joystick = scene.joystick.expect("joystick visible during drag");
        assert_eq!(joystick.anchor, Vec2::new(100.0, 300.0));
        assert_relative_eq!(joystick.offset.y, -MAX_JOYSTICK_DISTANCE, epsilon = 1e-4);
        assert!(query::player_position(simulation.world()).z() < 0.0);

        let _ = simulation.frame(
            FRAME,
            gestures(vec![InputGesture::JoystickRelease]),
            &mut scene,
        );
        assert!(scene.joystick.is_none());
        assert!(!scene.player.moving);
    }

    #[test]
    fn detail_request_opens_card_for_nearby_plant() {
        let mut simulation = garden();
        let mut scene = scene();
        let detail = FrameInput {
            request_detail: true,
            ..FrameInput::default()
        };

        let _ = simulation.frame(FRAME, detail.clone(), &mut scene);
        assert!(scene.hud.detail.is_none(), "nothing is nearby yet");

        for _ in 0..5 {
            let _ = simulation.frame(FRAME, FrameInput::default(), &mut scene);
        }
        let _ = simulation.frame(FRAME, detail, &mut scene);

        let card = scene.hud.detail.as_ref().expect("detail card is open");
        assert_eq!(card.name, "Tulsi");
        assert_eq!(card.benefits, vec!["Calms the mind".to_owned()]);
    }

    #[test]
    fn zoom_steps_reach_the_published_scene() {
        let mut simulation = garden();
        let mut scene = scene();
        let zoom_in = FrameInput {
            zoom: Some(ZoomStep::In),
            ..FrameInput::default()
        };

        let _ = simulation.frame(FRAME, zoom_in, &mut scene);
        assert_eq!(query::zoom(simulation.world()), ZoomScale::from_f32(1.1).expect("valid"));
        assert_eq!(scene.hud.zoom, 1.0, "scene follows the throttled snapshot");

        for _ in 0..5 {
            let _ = simulation.frame(FRAME, FrameInput::default(), &mut scene);
        }
        assert_relative_eq!(scene.hud.zoom, 1.1);
    }

    #[test]
    fn exit_request_ends_the_session_and_stops_frames() {
        let mut simulation = garden();
        let mut scene = scene();
        let exit = FrameInput {
            gestures: vec![InputGesture::ButtonPressIn {
                direction: MoveDirection::Back,
            }],
            mode_toggle: true,
            exit_requested: true,
            ..FrameInput::default()
        };

        assert_eq!(simulation.frame(FRAME, exit, &mut scene), FrameControl::Exit);
        assert_eq!(
            query::session_phase(simulation.world()),
            SessionPhase::Unmounted
        );
        let position = query::player_position(simulation.world());

        assert_eq!(
            simulation.frame(FRAME, FrameInput::default(), &mut scene),
            FrameControl::Exit
        );
        assert_eq!(query::player_position(simulation.world()), position);
    }
}
