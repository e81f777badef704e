use super::debug::{DebugColor, DebugDrawCommand, DebugDrawFlags};
use macroquad::math::{vec2, Vec2};
use rapier2d::prelude::*;
use std::num::NonZeroUsize;

/// Whether a body moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves; tiles and plain rects.
    Static,
    /// Simulated; ships and animated rects.
    Dynamic,
}

/// Collider geometry, in physics units.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ShapeDef {
    /// Axis-aligned box given by half extents.
    Box { half_extents: Vec2 },
    /// Convex polygon in body-local coordinates.
    Polygon { vertices: Vec<Vec2> },
}

/// Everything needed to create one body with a single collider.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDef {
    /// Fixed or simulated.
    pub kind: BodyKind,
    /// Body origin in world units.
    pub position: Vec2,
    /// Radians.
    pub angle: f32,
    /// Linear velocity damping.
    pub linear_damping: f32,
    /// Angular velocity damping.
    pub angular_damping: f32,
    /// Mass added on top of what the collider density gives.
    pub additional_mass: f32,
    /// Collider geometry.
    pub shape: ShapeDef,
    /// Collider density.
    pub density: f32,
    /// Collider friction coefficient.
    pub friction: f32,
    /// Collider bounciness.
    pub restitution: f32,
}

impl BodyDef {
    /// A body with a box collider and zero damping/density.
    pub fn boxed(kind: BodyKind, position: Vec2, half_extents: Vec2) -> Self {
        Self {
            kind,
            position,
            angle: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            additional_mass: 0.0,
            shape: ShapeDef::Box { half_extents },
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
        }
    }
}

/// Owns every rigid body and collider. Everything else holds handles.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl PhysicsWorld {
    /// An empty world under constant `gravity`.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vector![gravity.x, gravity.y],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Creates a body and attaches its collider.
    pub fn create_body(&mut self, def: &BodyDef) -> RigidBodyHandle {
        let builder = match def.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = builder
            .translation(vector![def.position.x, def.position.y])
            .rotation(def.angle)
            .linear_damping(def.linear_damping)
            .angular_damping(def.angular_damping)
            .additional_mass(def.additional_mass)
            .build();
        let handle = self.bodies.insert(body);

        let collider = match &def.shape {
            ShapeDef::Box { half_extents } => {
                Some(ColliderBuilder::cuboid(half_extents.x, half_extents.y))
            }
            ShapeDef::Polygon { vertices } => {
                let points: Vec<Point<Real>> = vertices.iter().map(|v| point![v.x, v.y]).collect();
                ColliderBuilder::convex_hull(&points)
            }
        };
        match collider {
            Some(collider) => {
                let collider = collider
                    .density(def.density)
                    .friction(def.friction)
                    .restitution(def.restitution)
                    .build();
                self.colliders
                    .insert_with_parent(collider, handle, &mut self.bodies);
            }
            None => log::warn!("degenerate polygon for body {handle:?}, created without collider"),
        }

        handle
    }

    /// Panics if `handle` was not created by this world.
    pub fn body(&self, handle: RigidBodyHandle) -> &RigidBody {
        &self.bodies[handle]
    }

    /// Panics if `handle` was not created by this world.
    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> &mut RigidBody {
        &mut self.bodies[handle]
    }

    /// Number of bodies, fixed ones included.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize) {
        self.integration_parameters.dt = dt;
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        self.integration_parameters.num_internal_stabilization_iterations = position_iterations;

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// World-space outline of the first collider of a body, if it is a polygon.
    pub fn body_outline(&self, handle: RigidBodyHandle) -> Option<Vec<Vec2>> {
        let collider = self.bodies[handle].colliders().first()?;
        self.collider_outline(*collider)
    }

    fn collider_outline(&self, handle: ColliderHandle) -> Option<Vec<Vec2>> {
        let collider = self.colliders.get(handle)?;
        let shape = collider.shape();
        let local: Vec<Point<Real>> = if let Some(poly) = shape.as_convex_polygon() {
            poly.points().to_vec()
        } else if let Some(cuboid) = shape.as_cuboid() {
            let h = cuboid.half_extents;
            vec![
                point![-h.x, -h.y],
                point![h.x, -h.y],
                point![h.x, h.y],
                point![-h.x, h.y],
            ]
        } else if let Some(tri) = shape.as_triangle() {
            vec![tri.a, tri.b, tri.c]
        } else {
            return None;
        };

        let iso = collider.position();
        Some(
            local
                .iter()
                .map(|p| {
                    let w = iso * p;
                    vec2(w.x, w.y)
                })
                .collect(),
        )
    }

    /// Primitive draw calls describing the current world state.
    pub fn debug_draw_commands(&self, flags: DebugDrawFlags) -> Vec<DebugDrawCommand> {
        let mut commands = Vec::new();

        if flags.shapes {
            for (handle, collider) in self.colliders.iter() {
                let color = collider
                    .parent()
                    .and_then(|parent| self.bodies.get(parent))
                    .map(DebugColor::for_body)
                    .unwrap_or(DebugColor::STATIC);

                if let Some(ball) = collider.shape().as_ball() {
                    let t = collider.position().translation;
                    let axis = collider.position().rotation * vector![1.0, 0.0];
                    commands.push(DebugDrawCommand::SolidCircle {
                        center: vec2(t.x, t.y),
                        radius: ball.radius,
                        axis: vec2(axis.x, axis.y),
                        color,
                    });
                } else if let Some(vertices) = self.collider_outline(handle) {
                    commands.push(DebugDrawCommand::SolidPolygon { vertices, color });
                }
            }
        }

        if flags.center_of_mass {
            for (_, body) in self.bodies.iter() {
                let com = body.center_of_mass();
                commands.push(DebugDrawCommand::Transform {
                    position: vec2(com.x, com.y),
                    angle: body.rotation().angle(),
                });
            }
        }

        commands
    }
}
