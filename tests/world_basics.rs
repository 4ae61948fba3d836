use archon_ecs::{EcsError, Id, Phase, RegisterFlag, World};

#[derive(Clone, Copy, PartialEq, Debug)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Velocity {
    x: f32,
    y: f32,
}

struct Setup {
    world: World,
    position: Id,
    velocity: Id,
    entities: Vec<Id>,
}

/// The S1 world: ten entities, each given Velocity then Position.
fn spawn_ten() -> Setup {
    let mut world = World::default();
    let velocity = world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let mut entities = Vec::new();
    for _ in 0..10 {
        let entity = world.create_entity().unwrap();
        world.add(entity, velocity, Velocity { x: 0.0, y: 0.0 }).unwrap();
        world.add(entity, position, Position { x: 0.0, y: 0.0 }).unwrap();
        entities.push(entity);
    }

    Setup { world, position, velocity, entities }
}

#[test]
fn ten_entities_one_system_one_tick() {
    let Setup { mut world, position, velocity, entities } = spawn_ten();

    world
        .register_system2(
            &[position, velocity],
            Phase::Update,
            || {},
            |position: &mut Position, _velocity: &mut Velocity| {
                position.x += 1.0;
                position.y += 1.0;
            },
        )
        .unwrap();

    world.update().unwrap();

    for &entity in &entities {
        assert_eq!(
            *world.get::<Position>(entity, position).unwrap(),
            Position { x: 1.0, y: 1.0 }
        );
        assert_eq!(
            *world.get::<Velocity>(entity, velocity).unwrap(),
            Velocity { x: 0.0, y: 0.0 }
        );
    }

    // All ten rows live in the {Position, Velocity} archetype; the
    // single-kind staging archetype is empty.
    assert_eq!(world.row_count(&[position, velocity]), Some(10));
    assert_eq!(world.row_count(&[velocity]), Some(0));
}

#[test]
fn readding_a_kind_overwrites_in_place() {
    let Setup { mut world, position, entities, .. } = spawn_ten();
    let entity = entities[3];
    let archetypes_before = world.archetype_count();
    let location_before = world.location_of(entity).unwrap();

    world.add(entity, position, Position { x: 5.0, y: 6.0 }).unwrap();

    assert_eq!(
        *world.get::<Position>(entity, position).unwrap(),
        Position { x: 5.0, y: 6.0 }
    );
    assert_eq!(world.archetype_count(), archetypes_before);
    assert_eq!(world.location_of(entity), Some(location_before));
}

#[test]
fn add_then_remove_restores_structure() {
    let Setup { mut world, position, velocity, entities } = spawn_ten();

    #[derive(Clone, Copy)]
    struct Health(f32);
    let health = world.register_component::<Health>(RegisterFlag::None).unwrap();

    let entity = entities[0];
    let set_before = world.set_of(entity).unwrap().clone();
    let rows_before = world.row_count(&[position, velocity]);

    world.add(entity, health, Health(10.0)).unwrap();
    assert!(world.has(entity, health));
    assert_eq!(world.row_count(&[position, velocity, health]), Some(1));

    world.remove(entity, health).unwrap();
    assert!(!world.has(entity, health));
    assert_eq!(world.set_of(entity).unwrap(), &set_before);
    assert_eq!(world.row_count(&[position, velocity]), rows_before);
    assert_eq!(world.row_count(&[position, velocity, health]), Some(0));
}

#[test]
fn removing_the_last_component_leaves_entity_alive() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let entity = world.create_entity().unwrap();
    world.add(entity, position, Position { x: 0.0, y: 0.0 }).unwrap();
    assert!(world.location_of(entity).is_some());

    world.remove(entity, position).unwrap();
    assert!(world.is_alive(entity));
    assert!(world.location_of(entity).is_none());
    assert!(!world.has(entity, position));
    assert_eq!(world.row_count(&[position]), Some(0));

    // The entity can re-enter storage afterwards.
    world.add(entity, position, Position { x: 2.0, y: 2.0 }).unwrap();
    assert_eq!(world.row_count(&[position]), Some(1));
}

#[test]
fn default_kinds_resolve_add_and_get() {
    let mut world = World::default();
    world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let entity = world.create_entity().unwrap();
    world.add_default(entity, Position { x: 3.0, y: 4.0 }).unwrap();
    assert_eq!(
        *world.get_default::<Position>(entity).unwrap(),
        Position { x: 3.0, y: 4.0 }
    );
}

#[test]
fn missing_default_is_a_soft_lookup_and_a_hard_add() {
    let mut world = World::default();
    // Registered, but never as the type default.
    world.register_component::<Position>(RegisterFlag::None).unwrap();

    assert!(world.default_kind_for::<Position>().is_none());

    let entity = world.create_entity().unwrap();
    assert!(matches!(
        world.add_default(entity, Position { x: 0.0, y: 0.0 }),
        Err(EcsError::UnregisteredType { .. })
    ));
}

#[test]
fn later_type_default_registration_re_points_the_default() {
    let mut world = World::default();
    let first = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let second = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(world.default_kind_for::<Position>(), Some(second));
}

#[test]
fn has_is_soft_for_stale_and_foreign_handles() {
    let Setup { mut world, position, entities, .. } = spawn_ten();
    let entity = entities[0];

    assert!(world.has(entity, position));
    world.destroy(entity).unwrap();
    assert!(!world.has(entity, position));

    // A non-component handle is simply "not present".
    assert!(!world.has(entities[1], entities[2]));
}

#[test]
fn get_of_absent_component_is_component_not_present() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let velocity = world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();

    let entity = world.create_entity().unwrap();
    world.add(entity, position, Position { x: 0.0, y: 0.0 }).unwrap();

    assert!(matches!(
        world.get::<Velocity>(entity, velocity),
        Err(EcsError::ComponentNotPresent { .. })
    ));
    assert!(matches!(
        world.remove(entity, velocity),
        Err(EcsError::ComponentNotPresent { .. })
    ));
}

#[test]
fn type_identity_gates_typed_access() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let entity = world.create_entity().unwrap();
    world.add(entity, position, Position { x: 0.0, y: 0.0 }).unwrap();

    // Reading the Position kind as Velocity must fail before touching
    // storage.
    assert!(matches!(
        world.get::<Velocity>(entity, position),
        Err(EcsError::TypeIdentityMismatch(_))
    ));
    assert!(matches!(
        world.add(entity, position, Velocity { x: 0.0, y: 0.0 }),
        Err(EcsError::TypeIdentityMismatch(_))
    ));
}
