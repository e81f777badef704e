use crate::error::{CollisionPass, LevelError, MapError};
use crate::loader::json_loader::load_level;
use crate::physics::{BodyDef, BodyKind, PhysicsWorld, RigidBodyHandle};
use crate::spatial::TileId;
use macroquad::math::{vec2, Vec2};
use macroquad::texture::Image;
use rapier2d::na as nalgebra;
use rapier2d::prelude::vector;
use std::fmt;
use std::path::Path;

/// Pixels per physics unit; one tile is one unit.
pub const TILE_PIXELS: f32 = 32.0;

/// Physics ticks per second the animation servo assumes unless told otherwise.
pub const DEFAULT_TICK_RATE: f32 = 60.0;

/// A block of tile codes at an integer grid offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Grid column of the first cell.
    pub x: i32,
    /// Grid row of the first cell.
    pub y: i32,
    /// Cells per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Row-major tile codes, `width * height` of them.
    pub data: Vec<u32>,
}

impl Chunk {
    /// Grid position and code of every non-empty cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, TileId)> + '_ {
        let width = self.width.max(1) as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, code)| **code != 0)
            .map(move |(i, code)| {
                let col = (i % width) as i32;
                let row = (i / width) as i32;
                (self.x + col, self.y + row, TileId(*code))
            })
    }
}

/// A placed rectangle object, in map pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Radians; written by animation updates.
    pub rotation: f32,
    /// Id of an animation path in the same layer.
    pub animation: Option<u32>,
}

impl Rect {
    /// An unrotated rect with no animation.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            rotation: 0.0,
            animation: None,
        }
    }

    /// Where the rect's physics body sits, in physics units.
    pub fn body_position(&self) -> Vec2 {
        vec2(
            self.position.x / TILE_PIXELS,
            (self.position.y + 0.5 * self.size.y) / TILE_PIXELS - 0.5,
        )
    }
}

/// A back-and-forth motion between two points, in map pixels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationPath {
    /// Both ends of the path; anything but two points is an error at update time.
    pub points: Vec<Vec2>,
    /// Seconds for a full there-and-back cycle.
    pub duration: f32,
    /// Radians per second.
    pub angular_velocity: f32,
}

impl AnimationPath {
    /// Triangle wave in `0..=1`: 0 at point 0, 1 at point 1.
    ///
    /// A non-positive duration keeps the path at its first point.
    pub fn phase(&self, game_time: f32) -> f32 {
        if self.duration.is_nan() || self.duration <= 0.0 {
            return 0.0;
        }
        let t = 2.0 * (game_time % self.duration) / self.duration;
        if t >= 1.0 {
            2.0 - t
        } else {
            t
        }
    }

    /// Point on the path at `game_time`. Needs exactly two points.
    pub fn sample(&self, game_time: f32) -> Option<Vec2> {
        match self.points.as_slice() {
            [a, b] => Some(a.lerp(*b, self.phase(game_time))),
            _ => None,
        }
    }
}

/// A stable document object id paired with a value.
#[derive(Debug, Clone, PartialEq)]
pub struct IdWrapper<T> {
    /// Object id from the map document.
    pub id: u32,
    /// The wrapped value.
    pub value: T,
}

/// A tileset with its decoded image.
#[derive(Clone)]
pub struct Tileset {
    /// Decoded tileset image.
    pub image: Image,
    /// Global id of the first tile.
    pub first_gid: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Tiles per image row.
    pub columns: u32,
    /// Pixels around the whole image.
    pub margin: u32,
    /// Pixels between tiles.
    pub spacing: u32,
}

impl fmt::Debug for Tileset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tileset")
            .field("first_gid", &self.first_gid)
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("columns", &self.columns)
            .field("image", &(self.image.width, self.image.height))
            .finish_non_exhaustive()
    }
}

impl Tileset {
    /// Source rectangle of a tileset-local tile id, in image pixels.
    pub fn source_rect(&self, local_id: u32) -> macroquad::math::Rect {
        let cols = self.columns.max(1);
        let col = local_id % cols;
        let row = local_id / cols;
        let sx = self.margin + col * (self.tile_width + self.spacing);
        let sy = self.margin + row * (self.tile_height + self.spacing);
        macroquad::math::Rect::new(
            sx as f32,
            sy as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }
}

type IdLayers<T> = Vec<Vec<IdWrapper<T>>>;

fn find_in_layers<'a, T>(
    layers: &'a [Vec<IdWrapper<T>>],
    layer: usize,
    id: u32,
    collection: &'static str,
) -> Result<&'a T, LevelError> {
    layers
        .get(layer)
        .and_then(|entries| entries.iter().find(|e| e.id == id))
        .map(|e| &e.value)
        .ok_or(LevelError::NotFound {
            collection,
            layer,
            id,
        })
}

fn push_layered<T>(layers: &mut Vec<T>, layer: usize, value: impl FnOnce(&mut T))
where
    T: Default,
{
    if layer >= layers.len() {
        layers.resize_with(layer + 1, T::default);
    }
    value(&mut layers[layer]);
}

/// A loaded level: tile layers, rect objects, animation paths and tilesets.
#[derive(Debug, Clone)]
pub struct Level {
    tiles: Vec<Vec<Chunk>>,
    rect_layers: IdLayers<Rect>,
    animation_layers: IdLayers<AnimationPath>,
    tilesets: Vec<Tileset>,
    tile_bodies: Option<Vec<RigidBodyHandle>>,
    rect_bodies: Option<IdLayers<RigidBodyHandle>>,
    tick_rate: f32,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            tiles: Vec::new(),
            rect_layers: Vec::new(),
            animation_layers: Vec::new(),
            tilesets: Vec::new(),
            tile_bodies: None,
            rect_bodies: None,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl Level {
    /// An empty level at the default tick rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a Tiled JSON map and its tilesets.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        load_level(path)
    }

    /// Appends a chunk to tile layer `layer`.
    pub fn add_chunk(&mut self, layer: usize, chunk: Chunk) {
        push_layered(&mut self.tiles, layer, |l| l.push(chunk));
    }

    /// Appends rect `id` to rect layer `layer`.
    pub fn add_rect(&mut self, layer: usize, id: u32, rect: Rect) {
        push_layered(&mut self.rect_layers, layer, |l| {
            l.push(IdWrapper { id, value: rect })
        });
    }

    /// Appends animation path `id` to animation layer `layer`.
    pub fn add_animation(&mut self, layer: usize, id: u32, animation: AnimationPath) {
        push_layered(&mut self.animation_layers, layer, |l| {
            l.push(IdWrapper {
                id,
                value: animation,
            })
        });
    }

    /// Tilesets must arrive in ascending `first_gid` order.
    pub fn add_tileset(&mut self, tileset: Tileset) -> Result<(), LevelError> {
        if let Some(last) = self.tilesets.last() {
            if tileset.first_gid <= last.first_gid {
                return Err(LevelError::TilesetOrder {
                    first_gid: tileset.first_gid,
                    previous: last.first_gid,
                });
            }
        }
        self.tilesets.push(tileset);
        Ok(())
    }

    /// Chunks per tile layer.
    pub fn tile_layers(&self) -> &[Vec<Chunk>] {
        &self.tiles
    }

    /// Rects per layer.
    pub fn rect_layers(&self) -> &[Vec<IdWrapper<Rect>>] {
        &self.rect_layers
    }

    /// Animation paths per layer.
    pub fn animation_layers(&self) -> &[Vec<IdWrapper<AnimationPath>>] {
        &self.animation_layers
    }

    /// Tilesets in ascending `first_gid` order.
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Bodies created for tile cells, once registered.
    pub fn tile_bodies(&self) -> &[RigidBodyHandle] {
        self.tile_bodies.as_deref().unwrap_or_default()
    }

    /// Body created for the rect `id` in `layer`.
    pub fn rect_body(&self, layer: usize, id: u32) -> Result<RigidBodyHandle, LevelError> {
        let layers = self.rect_bodies.as_deref().ok_or(LevelError::NotRegistered)?;
        find_in_layers(layers, layer, id, "Rect Physics Body").copied()
    }

    /// Ticks per second the animation servo assumes.
    pub fn tick_rate(&self) -> f32 {
        self.tick_rate
    }

    /// Tick rate the animation servo closes its position gap in. Must be positive.
    pub fn set_tick_rate(&mut self, hz: f32) -> Result<(), LevelError> {
        if hz.is_nan() || hz <= 0.0 {
            return Err(LevelError::InvalidTickRate(hz));
        }
        self.tick_rate = hz;
        Ok(())
    }

    /// Tileset index and tileset-local id for a (clean) global tile id.
    pub fn resolve_gid(&self, gid: u32) -> Option<(usize, u32)> {
        if gid == 0 {
            return None;
        }
        let idx = self.tilesets.partition_point(|t| t.first_gid <= gid);
        let idx = idx.checked_sub(1)?;
        Some((idx, gid - self.tilesets[idx].first_gid))
    }

    /// Creates the static and animated bodies for this level. Only once.
    pub fn register_collision(&mut self, world: &mut PhysicsWorld) -> Result<(), LevelError> {
        self.register_tile_collision(world)?;
        self.register_rect_collisions(world)?;
        log::debug!(
            "registered {} tile bodies and {} rect bodies",
            self.tile_bodies().len(),
            self.rect_layers.iter().map(Vec::len).sum::<usize>()
        );
        Ok(())
    }

    fn register_tile_collision(&mut self, world: &mut PhysicsWorld) -> Result<(), LevelError> {
        if self.tile_bodies.is_some() {
            return Err(LevelError::AlreadyRegistered(CollisionPass::Tiles));
        }

        let mut bodies = Vec::new();
        for chunk in self.tiles.iter().flatten() {
            for (x, y, _) in chunk.cells() {
                let def = BodyDef::boxed(
                    BodyKind::Static,
                    vec2(x as f32, y as f32),
                    vec2(0.5, 0.5),
                );
                bodies.push(world.create_body(&def));
            }
        }

        self.tile_bodies = Some(bodies);
        Ok(())
    }

    fn register_rect_collisions(&mut self, world: &mut PhysicsWorld) -> Result<(), LevelError> {
        // unreachable through register_collision while the tile guard comes first
        if self.rect_bodies.is_some() {
            return Err(LevelError::AlreadyRegistered(CollisionPass::Rects));
        }

        let mut layers = Vec::with_capacity(self.rect_layers.len());
        for rects in &self.rect_layers {
            let mut handles = Vec::with_capacity(rects.len());
            for IdWrapper { id, value: rect } in rects {
                let kind = if rect.animation.is_some() {
                    BodyKind::Dynamic
                } else {
                    BodyKind::Static
                };
                let mut def = BodyDef::boxed(
                    kind,
                    rect.body_position(),
                    rect.size * 0.5 / TILE_PIXELS,
                );
                // zero-density colliders leave a dynamic body massless
                if kind == BodyKind::Dynamic {
                    def.additional_mass = 1.0;
                }
                handles.push(IdWrapper {
                    id: *id,
                    value: world.create_body(&def),
                });
            }
            layers.push(handles);
        }

        self.rect_bodies = Some(layers);
        Ok(())
    }

    /// Moves every animated rect along its path and steers its body after it.
    pub fn update_animations(
        &mut self,
        world: &mut PhysicsWorld,
        game_time: f32,
    ) -> Result<(), LevelError> {
        let body_layers = self.rect_bodies.as_deref().ok_or(LevelError::NotRegistered)?;
        let tick_rate = self.tick_rate;

        for (layer, rects) in self.rect_layers.iter_mut().enumerate() {
            for IdWrapper { id, value: rect } in rects.iter_mut() {
                let Some(animation_id) = rect.animation else {
                    continue;
                };

                let animation =
                    find_in_layers(&self.animation_layers, layer, animation_id, "Animation")?;
                let target = animation
                    .sample(game_time)
                    .ok_or(LevelError::InvalidAnimationPath {
                        layer,
                        id: animation_id,
                        points: animation.points.len(),
                    })?;
                rect.position = target - rect.size * 0.5;

                let handle = *find_in_layers(body_layers, layer, *id, "Rect Physics Body")?;
                let body = world.body_mut(handle);
                rect.rotation = body.rotation().angle() + animation.angular_velocity / tick_rate;

                let goal = rect.body_position();
                let current = body.translation();
                let velocity = (goal - vec2(current.x, current.y)) * tick_rate;
                body.set_linvel(vector![velocity.x, velocity.y], true);
                body.set_angvel(animation.angular_velocity, true);
            }
        }

        Ok(())
    }
}
