use std::time::Duration;

use garden_core::{
    Command, Event, GardenConfig, PlantCatalog, PlantEntity, PlantId, PlantMetadata,
    WorldPosition,
};
use garden_system_proximity::Proximity;
use garden_system_snapshot_sync::SnapshotSync;
use garden_world::{self as world, query, World};

fn garden() -> World {
    let plants = vec![
        PlantEntity::new(
            PlantId::new("tulsi"),
            WorldPosition::new(5.0, 0.0),
            1.0,
            PlantMetadata {
                name: "Tulsi".to_owned(),
                ..PlantMetadata::default()
            },
        ),
        PlantEntity::new(
            PlantId::new("neem"),
            WorldPosition::new(-8.0, 3.0),
            1.4,
            PlantMetadata {
                name: "Neem".to_owned(),
                ..PlantMetadata::default()
            },
        ),
    ];
    let catalog = PlantCatalog::new(plants).expect("valid catalog");
    World::new(&GardenConfig::default(), catalog)
}

/// Advances one frame: moves the player, lets the throttle decide on a
/// publish, then lets proximity react to whatever was published.
fn frame(
    world: &mut World,
    sync: &mut SnapshotSync,
    proximity: &mut Proximity,
    to: WorldPosition,
    dt: Duration,
) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    world::apply(world, Command::MovePlayer { to }, &mut events);

    let mut commands = Vec::new();
    sync.handle(&events, &mut commands);
    let mut published = Vec::new();
    for command in commands {
        world::apply(world, command, &mut published);
    }

    let mut commands = Vec::new();
    proximity.handle(&published, query::plants(world), &mut commands);
    let mut changes = Vec::new();
    for command in commands {
        world::apply(world, command, &mut changes);
    }

    published.extend(changes);
    published
}

#[test]
fn nearby_plant_is_detected_at_throttled_cadence() {
    let mut world = garden();
    let mut sync = SnapshotSync::default();
    let mut proximity = Proximity::default();
    let next_to_tulsi = WorldPosition::new(4.0, 0.0);

    let first = frame(
        &mut world,
        &mut sync,
        &mut proximity,
        next_to_tulsi,
        Duration::from_millis(50),
    );
    assert!(first.is_empty());
    assert!(
        query::nearby_plant(&world).is_none(),
        "proximity must not run before the throttle interval elapses"
    );

    let second = frame(
        &mut world,
        &mut sync,
        &mut proximity,
        next_to_tulsi,
        Duration::from_millis(50),
    );
    assert!(second.contains(&Event::NearbyPlantChanged {
        plant: Some(PlantId::new("tulsi")),
    }));
    assert_eq!(query::nearby_plant(&world), Some(&PlantId::new("tulsi")));
}

#[test]
fn repeated_publishes_near_same_plant_emit_one_change() {
    let mut world = garden();
    let mut sync = SnapshotSync::default();
    let mut proximity = Proximity::default();
    let mut changes = 0;

    for step in 0..10 {
        let to = WorldPosition::new(-8.0 + step as f32 * 0.1, 2.0);
        let events = frame(
            &mut world,
            &mut sync,
            &mut proximity,
            to,
            Duration::from_millis(100),
        );
        changes += events
            .iter()
            .filter(|event| matches!(event, Event::NearbyPlantChanged { .. }))
            .count();
    }

    assert_eq!(changes, 1);
    assert_eq!(query::nearby_plant(&world), Some(&PlantId::new("neem")));
}

#[test]
fn walking_away_clears_the_nearby_plant() {
    let mut world = garden();
    let mut sync = SnapshotSync::default();
    let mut proximity = Proximity::default();

    let _ = frame(
        &mut world,
        &mut sync,
        &mut proximity,
        WorldPosition::new(5.0, 1.0),
        Duration::from_millis(100),
    );
    assert!(query::nearby_plant(&world).is_some());

    let events = frame(
        &mut world,
        &mut sync,
        &mut proximity,
        WorldPosition::new(15.0, 15.0),
        Duration::from_millis(100),
    );

    assert!(events.contains(&Event::NearbyPlantChanged { plant: None }));
    assert!(query::nearby_plant(&world).is_none());
}
