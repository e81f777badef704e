use crate::physics::{BodyDef, BodyKind, PhysicsWorld, RigidBodyHandle, ShapeDef};
use macroquad::color::Color;
use macroquad::math::{vec2, Vec2};
use rapier2d::na as nalgebra;
use rapier2d::prelude::{vector, Rotation};
use serde::{Deserialize, Serialize};

/// One of the four thrusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Turns counter-clockwise.
    Left,
    /// Pushes forward.
    Up,
    /// Turns clockwise.
    Right,
    /// Pushes backward.
    Down,
}

/// Pressed state of each thruster for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShipControls {
    /// Left thruster.
    pub left: bool,
    /// Forward thruster.
    pub up: bool,
    /// Right thruster.
    pub right: bool,
    /// Reverse thruster.
    pub down: bool,
}

impl ShipControls {
    /// Pressed if pressed on either input.
    pub fn or(self, other: Self) -> Self {
        Self {
            left: self.left || other.left,
            up: self.up || other.up,
            right: self.right || other.right,
            down: self.down || other.down,
        }
    }

    /// Copies the pressed state onto the ship's thrusters.
    pub fn apply(self, ship: &mut Ship) {
        ship.set_thruster(Direction::Left, self.left);
        ship.set_thruster(Direction::Up, self.up);
        ship.set_thruster(Direction::Right, self.right);
        ship.set_thruster(Direction::Down, self.down);
    }
}

/// Force-law constants shared by every ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipParams {
    /// Forward/reverse thruster force.
    pub linear_thrust: f32,
    /// Left/right thruster torque.
    pub angular_thrust: f32,
    /// Fluid density in the drag equation.
    pub air_density: f32,
    /// Drag coefficient of the hull.
    pub drag_coefficient: f32,
    /// Reference area facing the flow.
    pub cross_section: f32,
}

impl Default for ShipParams {
    fn default() -> Self {
        Self {
            linear_thrust: 5.0,
            angular_thrust: 1.0,
            air_density: 1.2,
            drag_coefficient: 0.03,
            cross_section: 1.0,
        }
    }
}

/// A thruster-driven body. The physics world owns the body itself.
#[derive(Debug, Clone)]
pub struct Ship {
    color: Color,
    body: RigidBodyHandle,
    thrusters: [bool; 4],
    params: ShipParams,
}

impl Ship {
    /// Wraps an existing body.
    pub fn new(color: Color, body: RigidBodyHandle, params: ShipParams) -> Self {
        Self {
            color,
            body,
            thrusters: [false; 4],
            params,
        }
    }

    /// Spawns an isosceles triangle ship pointing up (towards -y) at `angle` 0.
    pub fn spawn_triangle(
        world: &mut PhysicsWorld,
        color: Color,
        size: Vec2,
        position: Vec2,
        angle: f32,
        params: ShipParams,
    ) -> Self {
        let half = size * 0.5;
        let def = BodyDef {
            kind: BodyKind::Dynamic,
            position,
            angle,
            linear_damping: 1.0,
            angular_damping: 2.0,
            additional_mass: 0.0,
            shape: ShapeDef::Polygon {
                vertices: vec![vec2(0.0, -half.y), vec2(half.x, half.y), vec2(-half.x, half.y)],
            },
            density: 0.6,
            friction: 0.8,
            restitution: 0.01,
        };
        Self::new(color, world.create_body(&def), params)
    }

    /// Handle of the ship's body.
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    /// Hull color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Changes the hull color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Body origin in world units.
    pub fn position(&self, world: &PhysicsWorld) -> Vec2 {
        let t = world.body(self.body).translation();
        vec2(t.x, t.y)
    }

    /// Teleports the ship, keeping its rotation, and wakes it up.
    pub fn set_position(&self, world: &mut PhysicsWorld, position: Vec2) {
        world
            .body_mut(self.body)
            .set_translation(vector![position.x, position.y], true);
    }

    /// Radians.
    pub fn rotation(&self, world: &PhysicsWorld) -> f32 {
        world.body(self.body).rotation().angle()
    }

    /// Turns the ship to `angle` radians and wakes it up.
    pub fn set_rotation(&self, world: &mut PhysicsWorld, angle: f32) {
        world
            .body_mut(self.body)
            .set_rotation(Rotation::new(angle), true);
    }

    /// Center of mass in world units.
    pub fn world_center_of_mass(&self, world: &PhysicsWorld) -> Vec2 {
        let c = world.body(self.body).center_of_mass();
        vec2(c.x, c.y)
    }

    /// Linear velocity.
    pub fn velocity(&self, world: &PhysicsWorld) -> Vec2 {
        let v = world.body(self.body).linvel();
        vec2(v.x, v.y)
    }

    /// Length of the linear velocity.
    pub fn speed(&self, world: &PhysicsWorld) -> f32 {
        self.velocity(world).length()
    }

    /// Switches one thruster on or off.
    pub fn set_thruster(&mut self, dir: Direction, on: bool) {
        self.thrusters[dir as usize] = on;
    }

    /// Whether a thruster is on.
    pub fn thruster(&self, dir: Direction) -> bool {
        self.thrusters[dir as usize]
    }

    /// Quadratic drag opposing the current velocity.
    pub fn air_resistance(&self, world: &PhysicsWorld) -> Vec2 {
        let velocity = self.velocity(world);
        let v_squared = velocity.length_squared();
        if v_squared < 0.00001 {
            return Vec2::ZERO;
        }

        let p = &self.params;
        let drag = 0.5 * p.air_density * v_squared * p.drag_coefficient * p.cross_section;
        -velocity.normalize() * drag
    }

    /// Thrust along the ship's nose direction.
    pub fn linear_thrust(&self, world: &PhysicsWorld) -> Vec2 {
        let forward = match (self.thruster(Direction::Up), self.thruster(Direction::Down)) {
            (true, false) => self.params.linear_thrust,
            (false, true) => -self.params.linear_thrust,
            _ => return Vec2::ZERO,
        };
        let angle = self.rotation(world);
        vec2(angle.sin(), -angle.cos()) * forward
    }

    /// Net torque of the side thrusters.
    pub fn torque(&self) -> f32 {
        let left = if self.thruster(Direction::Left) { -self.params.angular_thrust } else { 0.0 };
        let right = if self.thruster(Direction::Right) { self.params.angular_thrust } else { 0.0 };
        left + right
    }

    /// Replaces the forces acting on the body with this tick's thrust and drag.
    pub fn update(&self, world: &mut PhysicsWorld) {
        let force = self.linear_thrust(world) + self.air_resistance(world);
        let torque = self.torque();

        let body = world.body_mut(self.body);
        body.reset_forces(false);
        body.reset_torques(false);
        body.add_force(vector![force.x, force.y], true);
        body.add_torque(torque, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::color::GREEN;

    fn ship(world: &mut PhysicsWorld) -> Ship {
        Ship::spawn_triangle(
            world,
            GREEN,
            vec2(1.0, 1.4),
            vec2(5.0, 10.0),
            0.0,
            ShipParams::default(),
        )
    }

    #[test]
    fn idle_ship_has_no_forces() {
        let mut world = PhysicsWorld::default();
        let ship = ship(&mut world);
        assert_eq!(ship.linear_thrust(&world), Vec2::ZERO);
        assert_eq!(ship.air_resistance(&world), Vec2::ZERO);
        assert_eq!(ship.torque(), 0.0);
    }

    #[test]
    fn forward_thrust_points_along_the_nose() {
        let mut world = PhysicsWorld::default();
        let mut ship = ship(&mut world);
        ship.set_thruster(Direction::Up, true);
        assert!(ship.linear_thrust(&world).abs_diff_eq(vec2(0.0, -5.0), 1e-5));

        ship.set_rotation(&mut world, std::f32::consts::FRAC_PI_2);
        assert!(ship.linear_thrust(&world).abs_diff_eq(vec2(5.0, 0.0), 1e-5));

        ship.set_thruster(Direction::Down, true);
        assert_eq!(ship.linear_thrust(&world), Vec2::ZERO);
    }

    #[test]
    fn drag_opposes_velocity_quadratically() {
        let mut world = PhysicsWorld::default();
        let ship = ship(&mut world);
        world.body_mut(ship.body()).set_linvel(vector![0.0, 10.0], true);

        let drag = ship.air_resistance(&world);
        // 0.5 * 1.2 * 100 * 0.03 * 1.0
        assert!(drag.abs_diff_eq(vec2(0.0, -1.8), 1e-5));
    }

    #[test]
    fn torque_from_side_thrusters() {
        let mut world = PhysicsWorld::default();
        let mut ship = ship(&mut world);
        ship.set_thruster(Direction::Right, true);
        assert_eq!(ship.torque(), 1.0);
        ship.set_thruster(Direction::Left, true);
        assert_eq!(ship.torque(), 0.0);
        ship.set_thruster(Direction::Right, false);
        assert_eq!(ship.torque(), -1.0);
    }

    #[test]
    fn update_replaces_last_ticks_forces() {
        let mut world = PhysicsWorld::default();
        let mut ship = ship(&mut world);
        world.body_mut(ship.body()).set_linvel(vector![3.0, 4.0], true);
        ShipControls {
            up: true,
            right: true,
            ..Default::default()
        }
        .apply(&mut ship);

        ship.update(&mut world);
        ship.update(&mut world);

        let expected = ship.linear_thrust(&world) + ship.air_resistance(&world);
        let body = world.body(ship.body());
        let force = body.user_force();
        assert!((force.x - expected.x).abs() < 1e-5, "force {force:?}");
        assert!((force.y - expected.y).abs() < 1e-5, "force {force:?}");
        assert_eq!(body.user_torque(), ship.torque());
    }

    #[test]
    fn controls_combine_per_thruster() {
        let keys = ShipControls {
            up: true,
            ..Default::default()
        };
        let pad = ShipControls {
            left: true,
            ..Default::default()
        };
        assert_eq!(
            keys.or(pad),
            ShipControls {
                left: true,
                up: true,
                right: false,
                down: false,
            }
        );
    }

    #[test]
    fn thrusting_ship_accelerates_forward() {
        let mut world = PhysicsWorld::default();
        let mut ship = ship(&mut world);
        ShipControls {
            up: true,
            ..Default::default()
        }
        .apply(&mut ship);

        for _ in 0..30 {
            ship.update(&mut world);
            world.step(1.0 / 60.0, 8, 3);
        }
        let v = ship.velocity(&world);
        assert!(v.y < -0.1, "velocity {v:?}");
        assert!(v.x.abs() < 1e-3);
        assert!(ship.position(&world).y < 10.0);
    }
}
