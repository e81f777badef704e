use crate::error::LevelError;
use crate::level::{Level, TILE_PIXELS};
use crate::spatial::TileTransform;
use macroquad::prelude::*;

/// One tile ready to draw: which tileset, which part of it, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct TileQuad {
    /// Index into `Level::tilesets`.
    pub tileset: usize,
    /// Source rectangle in tileset image pixels.
    pub source: Rect,
    /// Quad center in world units. Quads are one unit square.
    pub center: Vec2,
    /// Flips and rotation of the source image.
    pub transform: TileTransform,
}

/// Resolves every non-empty tile cell of every layer to a quad, layer order first.
pub fn build_tile_quads(level: &Level) -> Result<Vec<TileQuad>, LevelError> {
    let mut quads = Vec::new();
    for chunk in level.tile_layers().iter().flatten() {
        for (x, y, tile) in chunk.cells() {
            let gid = tile.clean();
            let (tileset, local) = level
                .resolve_gid(gid)
                .ok_or(LevelError::UnknownTile { gid })?;
            quads.push(TileQuad {
                tileset,
                source: level.tilesets()[tileset].source_rect(local),
                center: vec2(x as f32, y as f32),
                transform: TileTransform::from_tile(tile)?,
            });
        }
    }
    Ok(quads)
}

const RECT_COLOR: Color = BLUE;

/// Draws a level's tiles and rect objects in world units.
///
/// Tile quads are resolved once up front; rects are read from the level
/// every frame since animations move them.
pub struct LevelRenderer {
    textures: Vec<Texture2D>,
    quads: Vec<TileQuad>,
}

impl LevelRenderer {
    /// Uploads the tileset images. Needs a GL context.
    pub fn new(level: &Level) -> Result<Self, LevelError> {
        let quads = build_tile_quads(level)?;
        let textures = level
            .tilesets()
            .iter()
            .map(|ts| {
                let tex = Texture2D::from_image(&ts.image);
                tex.set_filter(FilterMode::Nearest);
                tex
            })
            .collect();
        log::debug!("level renderer holds {} tile quads", quads.len());
        Ok(Self { textures, quads })
    }

    /// Tile quads drawn per frame.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Draws tiles, then rects, in the current camera.
    pub fn render(&self, level: &Level) {
        for quad in &self.quads {
            let Some(tex) = self.textures.get(quad.tileset) else {
                continue;
            };
            draw_texture_ex(
                tex,
                quad.center.x - 0.5,
                quad.center.y - 0.5,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(1.0, 1.0)),
                    source: Some(quad.source),
                    rotation: quad.transform.rotation,
                    flip_x: quad.transform.flip_x,
                    flip_y: quad.transform.flip_y,
                    pivot: None,
                },
            );
        }

        for rect in level.rect_layers().iter().flatten().map(|r| &r.value) {
            let size = rect.size / TILE_PIXELS;
            let center = rect.position / TILE_PIXELS - vec2(0.5, 0.5) + size * 0.5;
            draw_rectangle_ex(
                center.x,
                center.y,
                size.x,
                size.y,
                DrawRectangleParams {
                    offset: vec2(0.5, 0.5),
                    rotation: rect.rotation,
                    color: RECT_COLOR,
                },
            );
        }
    }
}
