use std::cell::RefCell;
use std::rc::Rc;

use archon_ecs::{EcsError, Phase, RegisterFlag, World, WorldOptions};

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

#[test]
fn swapped_kinds_fail_registration_and_add_no_system() {
    // S4: value types declared as (Position, Velocity) but handles passed
    // in the opposite order.
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let velocity = world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();

    let result = world.register_system2(
        &[velocity, position],
        Phase::Update,
        || {},
        |_: &mut Position, _: &mut Velocity| {},
    );

    assert!(matches!(result, Err(EcsError::TypeIdentityMismatch(_))));
    assert_eq!(world.system_count(), 0);
}

#[test]
fn superset_queries_visit_exactly_the_matching_archetypes() {
    // S5: e1 carries {A,B}, e2 carries {A,B,C}, e3 carries {A}.
    #[derive(Clone, Copy)]
    struct A(u32);
    #[derive(Clone, Copy)]
    struct B(u32);
    #[derive(Clone, Copy)]
    struct C(u32);

    let mut world = World::default();
    let a = world.register_component::<A>(RegisterFlag::TypeDefault).unwrap();
    let b = world.register_component::<B>(RegisterFlag::TypeDefault).unwrap();
    let c = world.register_component::<C>(RegisterFlag::TypeDefault).unwrap();

    let e1 = world.create_entity().unwrap();
    world.add(e1, a, A(1)).unwrap();
    world.add(e1, b, B(1)).unwrap();

    let e2 = world.create_entity().unwrap();
    world.add(e2, a, A(2)).unwrap();
    world.add(e2, b, B(2)).unwrap();
    world.add(e2, c, C(2)).unwrap();

    let e3 = world.create_entity().unwrap();
    world.add(e3, a, A(3)).unwrap();

    let over_ab = Rc::new(RefCell::new(Vec::new()));
    let over_a = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&over_ab);
    world
        .register_system2(
            &[a, b],
            Phase::Update,
            || {},
            move |a: &mut A, _: &mut B| sink.borrow_mut().push(a.0),
        )
        .unwrap();

    let sink = Rc::clone(&over_a);
    world
        .register_system1(
            &[a],
            Phase::Update,
            || {},
            move |a: &mut A| sink.borrow_mut().push(a.0),
        )
        .unwrap();

    world.update().unwrap();

    // Each matching entity visited exactly once; archetype order is the
    // store's deterministic key order, so a second tick repeats it.
    let mut ab_visits = over_ab.borrow().clone();
    ab_visits.sort_unstable();
    assert_eq!(ab_visits, vec![1, 2]);

    let mut a_visits = over_a.borrow().clone();
    a_visits.sort_unstable();
    assert_eq!(a_visits, vec![1, 2, 3]);

    let first_order = over_a.borrow().clone();
    over_a.borrow_mut().clear();
    over_ab.borrow_mut().clear();
    world.update().unwrap();
    assert_eq!(*over_a.borrow(), first_order);
}

#[test]
fn phases_run_in_order_across_entry_points() {
    // S6: one system per phase, each leaving a marker.
    #[derive(Clone, Copy)]
    struct Marker(u8);

    let mut world = World::default();
    let marker = world
        .register_component::<Marker>(RegisterFlag::TypeDefault)
        .unwrap();
    let entity = world.create_entity().unwrap();
    world.add(entity, marker, Marker(0)).unwrap();

    let order = Rc::new(RefCell::new(Vec::new()));
    for (phase, label) in [
        (Phase::Render, "Render"),
        (Phase::Update, "Update"),
        (Phase::Ui, "Ui"),
        (Phase::PreUpdate, "PreUpdate"),
        (Phase::PreRender, "PreRender"),
    ] {
        let sink = Rc::clone(&order);
        world
            .register_system1(
                &[marker],
                phase,
                || {},
                move |_: &mut Marker| sink.borrow_mut().push(label),
            )
            .unwrap();
    }

    world.update().unwrap();
    world.render().unwrap();
    world.ui().unwrap();

    assert_eq!(
        *order.borrow(),
        vec!["PreUpdate", "Update", "PreRender", "Render", "Ui"]
    );
}

#[test]
fn registration_order_is_preserved_within_a_phase() {
    #[derive(Clone, Copy)]
    struct Marker(u8);

    let mut world = World::default();
    let marker = world
        .register_component::<Marker>(RegisterFlag::TypeDefault)
        .unwrap();
    let entity = world.create_entity().unwrap();
    world.add(entity, marker, Marker(0)).unwrap();

    let order = Rc::new(RefCell::new(Vec::new()));
    for label in ["first", "second", "third"] {
        let sink = Rc::clone(&order);
        world
            .register_system1(
                &[marker],
                Phase::Update,
                || {},
                move |_: &mut Marker| sink.borrow_mut().push(label),
            )
            .unwrap();
    }

    for _ in 0..3 {
        world.update().unwrap();
    }
    assert_eq!(*order.borrow(), ["first", "second", "third"].repeat(3));
}

#[test]
fn preludes_run_once_per_dispatch_even_without_matches() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let prelude_runs = Rc::new(RefCell::new(0));
    let row_visits = Rc::new(RefCell::new(0));

    let preludes = Rc::clone(&prelude_runs);
    let rows = Rc::clone(&row_visits);
    world
        .register_system1(
            &[position],
            Phase::Update,
            move || *preludes.borrow_mut() += 1,
            move |_: &mut Position| *rows.borrow_mut() += 1,
        )
        .unwrap();

    // No entity carries Position yet: prelude still runs, rows do not.
    world.update().unwrap();
    assert_eq!(*prelude_runs.borrow(), 1);
    assert_eq!(*row_visits.borrow(), 0);

    let entity = world.create_entity().unwrap();
    world.add(entity, position, Position { x: 0.0, y: 0.0 }).unwrap();

    world.update().unwrap();
    assert_eq!(*prelude_runs.borrow(), 2);
    assert_eq!(*row_visits.borrow(), 1);
}

#[test]
fn writes_are_visible_to_later_systems_in_the_same_tick() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let entity = world.create_entity().unwrap();
    world.add(entity, position, Position { x: 1.0, y: 0.0 }).unwrap();

    world
        .register_system1(
            &[position],
            Phase::Update,
            || {},
            |position: &mut Position| position.x *= 2.0,
        )
        .unwrap();
    let observed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&observed);
    world
        .register_system1(
            &[position],
            Phase::Update,
            || {},
            move |position: &mut Position| sink.borrow_mut().push(position.x),
        )
        .unwrap();

    world.update().unwrap();
    assert_eq!(*observed.borrow(), vec![2.0]);
}

#[test]
fn auto_fill_completes_omitted_kinds_from_defaults() {
    let mut world = World::new(WorldOptions {
        auto_fill_unspecified_component_kinds: true,
    });
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let velocity = world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();

    let entity = world.create_entity().unwrap();
    world.add(entity, position, Position { x: 0.0, y: 0.0 }).unwrap();
    world.add(entity, velocity, Velocity { x: 2.0, y: 3.0 }).unwrap();

    // No explicit kinds at all: both resolve through type defaults.
    world
        .register_system2(
            &[],
            Phase::Update,
            || {},
            |position: &mut Position, velocity: &mut Velocity| {
                position.x += velocity.x;
                position.y += velocity.y;
            },
        )
        .unwrap();

    // A partial list overrides positionally and fills the tail.
    world
        .register_system2(
            &[position],
            Phase::Update,
            || {},
            |_: &mut Position, _: &mut Velocity| {},
        )
        .unwrap();

    world.update().unwrap();
    assert_eq!(
        *world.get::<Position>(entity, position).unwrap(),
        Position { x: 2.0, y: 3.0 }
    );
}

#[test]
fn auto_fill_is_rejected_when_disabled() {
    let mut world = World::default();
    world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();

    let result = world.register_system2(
        &[],
        Phase::Update,
        || {},
        |_: &mut Position, _: &mut Velocity| {},
    );
    assert!(matches!(result, Err(EcsError::AutoFillDisabled)));
    assert_eq!(world.system_count(), 0);
}

#[test]
fn arity_overflow_is_rejected() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let velocity = world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();

    let result = world.register_system1(
        &[position, velocity],
        Phase::Update,
        || {},
        |_: &mut Position| {},
    );
    assert!(matches!(result, Err(EcsError::SystemArityMismatch(_))));
    assert_eq!(world.system_count(), 0);
}

#[test]
fn duplicate_required_kinds_are_rejected() {
    let mut world = World::default();
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();

    let result = world.register_system2(
        &[position, position],
        Phase::Update,
        || {},
        |_: &mut Position, _: &mut Position| {},
    );
    assert!(matches!(result, Err(EcsError::DuplicateRequiredKind { .. })));
}
