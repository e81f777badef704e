//! Rigid-body simulation backed by rapier.

mod debug;
mod world;

pub use debug::{DebugColor, DebugDrawCommand, DebugDrawFlags, DebugRenderer};
pub use world::{BodyDef, BodyKind, PhysicsWorld, ShapeDef};

pub use rapier2d::prelude::{RigidBody, RigidBodyHandle};
