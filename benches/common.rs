#![allow(dead_code)]

use archon_ecs::{EcsResult, Id, RegisterFlag, World, WorldOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const AGENTS_SMALL: usize = 1_000;
pub const AGENTS_MED: usize = 10_000;
pub const AGENTS_LARGE: usize = 100_000;

#[derive(Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy)]
pub struct Wealth {
    pub value: f32,
}

pub struct Bench {
    pub world: World,
    pub position: Id,
    pub velocity: Id,
    pub wealth: Id,
}

pub fn make_world() -> Bench {
    let mut world = World::new(WorldOptions::default());
    let position = world
        .register_component::<Position>(RegisterFlag::TypeDefault)
        .unwrap();
    let velocity = world
        .register_component::<Velocity>(RegisterFlag::TypeDefault)
        .unwrap();
    let wealth = world
        .register_component::<Wealth>(RegisterFlag::TypeDefault)
        .unwrap();
    Bench { world, position, velocity, wealth }
}

/// Populates `count` entities. Roughly a third carry only `Position` and
/// `Velocity`; the rest also carry `Wealth`, so ticks cross two archetypes.
pub fn populate(bench: &mut Bench, count: usize) -> EcsResult<()> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..count {
        let entity = bench.world.create_entity()?;
        bench.world.add(
            entity,
            bench.position,
            Position { x: rng.gen_range(-100.0..100.0), y: rng.gen_range(-100.0..100.0) },
        )?;
        bench.world.add(
            entity,
            bench.velocity,
            Velocity { x: rng.gen_range(-1.0..1.0), y: rng.gen_range(-1.0..1.0) },
        )?;
        if rng.gen_bool(0.66) {
            bench.world.add(entity, bench.wealth, Wealth { value: 100.0 })?;
        }
    }
    Ok(())
}
