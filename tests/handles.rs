use archon_ecs::{
    describe, make_component, make_entity, EcsError, Id, IdKind, RegisterFlag, World,
    GENERATION_MASK, INDEX_MASK, KIND_MASK, KIND_SHIFT,
};

#[derive(Clone, Copy, PartialEq, Debug)]
struct Position {
    x: f32,
    y: f32,
}

#[test]
fn entity_handle_round_trips_fields() {
    let id = make_entity(0x1234_5678, 0x00AB_CDEF);
    assert_eq!(id.index(), 0x1234_5678);
    assert_eq!(id.generation(), 0x00AB_CDEF);
    assert_eq!(id.kind(), Some(IdKind::Entity));
}

#[test]
fn component_handle_carries_no_generation() {
    let id = make_component(42);
    assert_eq!(id.index(), 42);
    assert_eq!(id.generation(), 0);
    assert_eq!(id.kind(), Some(IdKind::Component));
}

#[test]
fn masks_partition_the_handle_space() {
    assert_eq!(INDEX_MASK, 0x0000_0000_FFFF_FFFF);
    assert_eq!(GENERATION_MASK, 0x00FF_FFFF_0000_0000);
    assert_eq!(KIND_MASK, 0xFF00_0000_0000_0000);
    assert_eq!(INDEX_MASK | GENERATION_MASK | KIND_MASK, u64::MAX);
    assert_eq!(INDEX_MASK & GENERATION_MASK, 0);
    assert_eq!(GENERATION_MASK & KIND_MASK, 0);
}

#[test]
fn kind_tags_match_the_abi() {
    assert_eq!(make_entity(0, 1).0 >> KIND_SHIFT, 1);
    assert_eq!(make_component(0).0 >> KIND_SHIFT, 2);
    assert_eq!(IdKind::from_tag(3), Some(IdKind::ParentOf));
    assert_eq!(IdKind::from_tag(0), None);
    assert_eq!(IdKind::from_tag(200), None);
}

#[test]
fn describe_decomposes_handles() {
    let entity = make_entity(7, 3);
    let info = describe(entity);
    assert_eq!(info.kind_name, "entity");
    assert_eq!(info.index, 7);
    assert_eq!(info.generation, 3);
    assert_eq!(info.hex, format!("{:#018x}", entity.0));

    let unknown = describe(Id(0));
    assert_eq!(unknown.kind_name, "unknown");
}

#[test]
fn generations_start_at_one_and_increase_per_index() {
    let mut world = World::default();
    let first = world.create_entity().unwrap();
    assert_eq!(first.generation(), 1);

    world.destroy(first).unwrap();
    let reused = world.create_entity().unwrap();
    assert_eq!(reused.index(), first.index());
    assert!(reused.generation() > first.generation());
}

#[test]
fn stale_handle_fails_after_index_reuse() {
    // S3: destroy the first entity, reuse its index, then read through the
    // old handle.
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let old = world.create_entity().unwrap();
    world.add(old, position, Position { x: 1.0, y: 2.0 }).unwrap();
    world.destroy(old).unwrap();

    let replacement = world.create_entity().unwrap();
    assert_eq!(replacement.index(), old.index());
    world
        .add(replacement, position, Position { x: 9.0, y: 9.0 })
        .unwrap();

    assert!(!world.is_alive(old));
    assert!(matches!(
        world.get::<Position>(old, position),
        Err(EcsError::UnknownEntity { entity }) if entity == old
    ));
    assert_eq!(
        *world.get::<Position>(replacement, position).unwrap(),
        Position { x: 9.0, y: 9.0 }
    );
}

#[test]
fn wrong_handle_kind_is_rejected() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let entity = world.create_entity().unwrap();

    // An entity handle where a component kind is required.
    assert!(matches!(
        world.add(entity, entity, Position { x: 0.0, y: 0.0 }),
        Err(EcsError::WrongHandleKind { expected: IdKind::Component, .. })
    ));

    // A component handle where an entity is required.
    assert!(matches!(
        world.get::<Position>(position, position),
        Err(EcsError::WrongHandleKind { expected: IdKind::Entity, .. })
    ));
}

#[test]
fn unregistered_kind_is_rejected() {
    let mut world = World::default();
    let entity = world.create_entity().unwrap();
    let bogus = make_component(999);
    assert!(matches!(
        world.add(entity, bogus, Position { x: 0.0, y: 0.0 }),
        Err(EcsError::UnregisteredType { .. })
    ));
}
