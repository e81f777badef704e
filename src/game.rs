use crate::config::{GameConfig, PhysicsConfig};
use crate::error::LevelError;
use crate::level::Level;
use crate::physics::PhysicsWorld;
use crate::ship::{Ship, ShipControls};
use crate::timestep::FixedTimestep;

/// Everything simulated: the world, the level in it, and the ships.
pub struct Game {
    world: PhysicsWorld,
    level: Level,
    ships: Vec<Ship>,
    game_time: f32,
    timestep: FixedTimestep,
    physics: PhysicsConfig,
}

impl Game {
    /// Registers the level's collision and spawns the configured ships.
    pub fn new(mut level: Level, config: &GameConfig) -> Result<Self, LevelError> {
        let physics = config.physics.clone();
        let mut world = PhysicsWorld::new(physics.gravity());

        level.set_tick_rate(physics.tick_rate)?;
        level.register_collision(&mut world)?;

        let ships = config
            .ships
            .iter()
            .map(|spawn| {
                Ship::spawn_triangle(
                    &mut world,
                    spawn.color(),
                    spawn.size(),
                    spawn.position(),
                    spawn.angle,
                    config.ship,
                )
            })
            .collect::<Vec<_>>();
        log::info!(
            "game ready: {} ships, {} bodies, {} Hz",
            ships.len(),
            world.body_count(),
            physics.tick_rate
        );

        Ok(Self {
            world,
            level,
            ships,
            game_time: 0.0,
            timestep: FixedTimestep::new(physics.step(), physics.max_substeps),
            physics,
        })
    }

    /// The physics world.
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// The physics world, mutably.
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// The registered level.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Ships in spawn order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Ships in spawn order, mutably.
    pub fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    /// Both the world and the ships, for callers that edit ship bodies.
    pub fn world_and_ships_mut(&mut self) -> (&mut PhysicsWorld, &mut [Ship]) {
        (&mut self.world, &mut self.ships)
    }

    /// Seconds of simulated time so far.
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// One fixed step. `controls[i]` drives ship `i`; missing entries leave a ship as it was.
    pub fn tick(&mut self, controls: &[ShipControls]) -> Result<(), LevelError> {
        let dt = self.timestep.step();
        self.game_time += dt;

        for (ship, input) in self.ships.iter_mut().zip(controls) {
            input.apply(ship);
        }
        for ship in &self.ships {
            ship.update(&mut self.world);
        }
        self.level.update_animations(&mut self.world, self.game_time)?;
        self.world.step(
            dt,
            self.physics.velocity_iterations,
            self.physics.position_iterations,
        );
        Ok(())
    }

    /// Runs as many fixed steps as `frame_dt` has paid for. Returns how many ran.
    pub fn advance(&mut self, frame_dt: f32, controls: &[ShipControls]) -> Result<u32, LevelError> {
        self.timestep.accumulate(frame_dt);
        let mut ticks = 0;
        while self.timestep.consume() {
            self.tick(controls)?;
            ticks += 1;
        }
        Ok(ticks)
    }
}
