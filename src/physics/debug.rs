use crate::error::DrawError;
use macroquad::prelude::*;
use rapier2d::prelude::RigidBody;

/// Which parts of the world `debug_draw_commands` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugDrawFlags {
    /// Collider outlines.
    pub shapes: bool,
    /// A marker at each body's center of mass.
    pub center_of_mass: bool,
}

impl Default for DebugDrawFlags {
    fn default() -> Self {
        Self {
            shapes: true,
            center_of_mass: true,
        }
    }
}

/// RGBA in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugColor(pub [f32; 4]);

impl DebugColor {
    /// Fixed bodies.
    pub const STATIC: Self = Self([0.5, 0.9, 0.5, 1.0]);
    /// Kinematic bodies.
    pub const KINEMATIC: Self = Self([0.5, 0.5, 0.9, 1.0]);
    /// Dynamic bodies at rest.
    pub const SLEEPING: Self = Self([0.6, 0.6, 0.6, 1.0]);
    /// Moving dynamic bodies.
    pub const AWAKE: Self = Self([0.9, 0.7, 0.7, 1.0]);

    /// Color for a body's current state.
    pub fn for_body(body: &RigidBody) -> Self {
        if body.is_fixed() {
            Self::STATIC
        } else if body.is_kinematic() {
            Self::KINEMATIC
        } else if body.is_sleeping() {
            Self::SLEEPING
        } else {
            Self::AWAKE
        }
    }

    fn to_color(self) -> Color {
        let [r, g, b, a] = self.0;
        Color::new(r, g, b, a)
    }
}

/// One primitive a physics debug view can ask for.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DebugDrawCommand {
    /// Outline through `vertices`.
    Polygon { vertices: Vec<Vec2>, color: DebugColor },
    /// Filled convex polygon.
    SolidPolygon { vertices: Vec<Vec2>, color: DebugColor },
    /// Circle outline.
    Circle { center: Vec2, radius: f32, color: DebugColor },
    /// Filled circle with a line along `axis`.
    SolidCircle { center: Vec2, radius: f32, axis: Vec2, color: DebugColor },
    /// Line from `a` to `b`.
    Segment { a: Vec2, b: Vec2, color: DebugColor },
    /// A body frame.
    Transform { position: Vec2, angle: f32 },
    /// Dot of `size` pixels.
    Point { position: Vec2, size: f32, color: DebugColor },
}

impl DebugDrawCommand {
    /// Short name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Polygon { .. } => "polygon",
            Self::SolidPolygon { .. } => "solid polygon",
            Self::Circle { .. } => "circle",
            Self::SolidCircle { .. } => "solid circle",
            Self::Segment { .. } => "segment",
            Self::Transform { .. } => "transform",
            Self::Point { .. } => "point",
        }
    }
}

const TRANSFORM_MARKER_SIZE: f32 = 0.1;

/// Turns debug draw commands into macroquad draw calls, in world units.
#[derive(Debug, Default)]
pub struct DebugRenderer;

impl DebugRenderer {
    /// Draws one command, or says why it can't.
    pub fn draw(&mut self, command: &DebugDrawCommand) -> Result<(), DrawError> {
        match command {
            DebugDrawCommand::SolidPolygon { vertices, color } => {
                let color = color.to_color();
                if let Some((first, rest)) = vertices.split_first() {
                    for pair in rest.windows(2) {
                        draw_triangle(*first, pair[0], pair[1], color);
                    }
                }
                Ok(())
            }
            DebugDrawCommand::Transform { position, .. } => {
                let half = TRANSFORM_MARKER_SIZE * 0.5;
                draw_rectangle(
                    position.x - half,
                    position.y - half,
                    TRANSFORM_MARKER_SIZE,
                    TRANSFORM_MARKER_SIZE,
                    RED,
                );
                Ok(())
            }
            other => Err(DrawError::UnsupportedPrimitive(other.kind())),
        }
    }
}
