use crate::error::LevelError;
use macroquad::math::{vec2, Vec2};
use std::f32::consts::FRAC_PI_2;

/// Horizontal flip, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip (transpose), bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// Hexagonal 120° rotation, bit 28.
pub const ROTATE_HEX_120: u32 = 0x1000_0000;
/// Global tile id bits.
pub const GID_MASK: u32 = 0x0FFF_FFFF;

/// A packed tile code as stored in chunk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// Code with flags.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// Global tile id without flags.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// No tile in this cell.
    #[inline] pub fn is_empty(self) -> bool { self.0 == 0 }
    /// Mirrored left to right.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Mirrored top to bottom.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Mirrored across the main diagonal.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
    /// Hexagonal 120° rotation; not supported for drawing.
    #[inline] pub fn rotate_hex_120(self) -> bool { (self.0 & ROTATE_HEX_120) != 0 }
}

/// How a tile's source image is placed on its quad.
///
/// The flips act on the source image first, then the result is rotated
/// clockwise (y points down) by `rotation` radians around the quad center.
/// This is the order macroquad's `DrawTextureParams` applies them in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileTransform {
    /// Clockwise radians.
    pub rotation: f32,
    /// Mirror the source horizontally.
    pub flip_x: bool,
    /// Mirror the source vertically.
    pub flip_y: bool,
}

impl TileTransform {
    /// Orientation for a tile code.
    ///
    /// Tiled applies the diagonal flip (a transpose) first, then the
    /// horizontal and vertical flips. A transpose is a quarter turn of the
    /// vertically flipped source, and the remaining flips commute through
    /// the quarter turn as swapped axes.
    pub fn from_tile(id: TileId) -> Result<Self, LevelError> {
        if id.rotate_hex_120() {
            return Err(LevelError::UnsupportedTileFlag { code: id.raw() });
        }

        let (h, v) = (id.flip_h(), id.flip_v());
        if id.flip_d() {
            Ok(Self {
                rotation: FRAC_PI_2,
                flip_x: v,
                flip_y: !h,
            })
        } else {
            Ok(Self {
                rotation: 0.0,
                flip_x: h,
                flip_y: v,
            })
        }
    }

    /// Maps a point relative to the quad center the way the tile image is moved.
    pub fn apply(self, p: Vec2) -> Vec2 {
        let x = if self.flip_x { -p.x } else { p.x };
        let y = if self.flip_y { -p.y } else { p.y };
        let (sin, cos) = self.rotation.sin_cos();
        vec2(x * cos - y * sin, x * sin + y * cos)
    }
}
