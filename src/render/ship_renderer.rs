use crate::error::DrawError;
use crate::physics::PhysicsWorld;
use crate::ship::Ship;
use macroquad::models::{draw_mesh, Mesh, Vertex};

/// Batches ship hulls into one untextured triangle mesh per frame.
#[derive(Default)]
pub struct ShipRenderer {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl ShipRenderer {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the batch. Call once per frame before `draw_ship`.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Appends the ship's current hull as a triangle fan.
    pub fn draw_ship(&mut self, ship: &Ship, world: &PhysicsWorld) -> Result<(), DrawError> {
        let outline = world
            .body_outline(ship.body())
            .ok_or(DrawError::UnsupportedShape)?;
        let color = ship.color();

        let base = self.vertices.len() as u16;
        self.vertices
            .extend(outline.iter().map(|p| Vertex::new(p.x, p.y, 0.0, 0.0, 0.0, color)));
        for i in 1..outline.len().saturating_sub(1) as u16 {
            self.indices.extend([base, base + i, base + i + 1]);
        }
        Ok(())
    }

    /// Vertices batched so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Triangle indices batched so far.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// The batch as an untextured mesh.
    pub fn mesh(&self) -> Mesh {
        Mesh {
            vertices: self.vertices.clone(),
            indices: self.indices.clone(),
            texture: None,
        }
    }

    /// Draws the batch in the current camera.
    pub fn render(&self) {
        if self.indices.is_empty() {
            return;
        }
        draw_mesh(&self.mesh());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDef, BodyKind};
    use crate::ship::ShipParams;
    use macroquad::color::{GREEN, RED};
    use macroquad::math::vec2;

    #[test]
    fn batches_every_ship_as_a_fan() {
        let mut world = PhysicsWorld::default();
        let a = Ship::spawn_triangle(
            &mut world,
            GREEN,
            vec2(1.0, 1.4),
            vec2(5.0, 10.0),
            0.0,
            ShipParams::default(),
        );
        let b = Ship::spawn_triangle(
            &mut world,
            RED,
            vec2(1.0, 1.5),
            vec2(5.0, 5.0),
            0.0,
            ShipParams::default(),
        );

        let mut renderer = ShipRenderer::new();
        renderer.draw_ship(&a, &world).expect("ship a");
        renderer.draw_ship(&b, &world).expect("ship b");
        assert_eq!(renderer.vertex_count(), 6);
        assert_eq!(renderer.index_count(), 6);

        let mesh = renderer.mesh();
        assert_eq!(&mesh.indices[3..], &[3, 4, 5]);
        let nose_y = mesh.vertices[..3]
            .iter()
            .map(|v| v.position.y)
            .fold(f32::INFINITY, f32::min);
        assert!((nose_y - 9.3).abs() < 1e-4, "nose at {nose_y}");

        renderer.reset();
        assert_eq!(renderer.vertex_count(), 0);
    }

    #[test]
    fn box_hulls_become_two_triangles() {
        let mut world = PhysicsWorld::default();
        let body = world.create_body(&BodyDef::boxed(
            BodyKind::Dynamic,
            vec2(0.0, 0.0),
            vec2(0.5, 0.5),
        ));
        let ship = Ship::new(GREEN, body, ShipParams::default());

        let mut renderer = ShipRenderer::new();
        renderer.draw_ship(&ship, &world).expect("box ship");
        assert_eq!(renderer.vertex_count(), 4);
        assert_eq!(renderer.index_count(), 6);
    }
}
