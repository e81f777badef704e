use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding a level document and its tilesets.
#[derive(Debug, Error)]
pub enum MapError {
    /// A map, tileset or image file could not be read.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A file was not valid JSON, or did not have the expected shape.
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Structural problem with the document.
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// A chunk's tile array does not match its declared size.
    #[error("chunk at ({x}, {y}) in layer {layer} has {found} tiles, expected {expected}")]
    InvalidChunkSize {
        /// Layer index.
        layer: usize,
        /// Chunk origin x.
        x: i32,
        /// Chunk origin y.
        y: i32,
        /// `width * height`.
        expected: usize,
        /// Length of `data`.
        found: usize,
    },
    /// The object uses a shape the level model cannot represent.
    #[error("object {object_id} in layer {layer}: {shape} objects are not supported")]
    UnsupportedShape {
        /// Layer index.
        layer: usize,
        /// Object id.
        object_id: u32,
        /// Shape key found on the object.
        shape: &'static str,
    },
    /// A custom property with a name the object kind doesn't understand.
    #[error("unsupported property of {owner}: {name}")]
    UnsupportedProperty {
        /// `"rect"` or `"polyline"`.
        owner: &'static str,
        /// Property name.
        name: String,
    },
    /// A known custom property declared or valued with the wrong type.
    #[error("{owner} property {name} needs to be of type {expected}, found {found}")]
    PropertyType {
        /// `"rect"` or `"polyline"`.
        owner: &'static str,
        /// Property name.
        name: String,
        /// Expected Tiled property type.
        expected: &'static str,
        /// What the document declared or contained.
        found: String,
    },
    /// A tileset image could not be decoded.
    #[error("could not read tile image {}: {message}", .path.display())]
    Image {
        /// Image path.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
    /// The decoded data violates a level invariant.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Which half of collision registration an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPass {
    /// Tile cells.
    Tiles,
    /// Rect objects.
    Rects,
}

/// Violations of level invariants at runtime.
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    /// `register_collision` was called more than once.
    #[error("{0:?} collision should only be registered once")]
    AlreadyRegistered(CollisionPass),
    /// Animations were updated before collision was registered.
    #[error("collision must be registered before animations are updated")]
    NotRegistered,
    /// A layered id lookup failed.
    #[error("{collection} in layer {layer} with id {id} could not be found")]
    NotFound {
        /// Collection name.
        collection: &'static str,
        /// Layer index.
        layer: usize,
        /// Object id.
        id: u32,
    },
    /// Animation paths must have exactly two points.
    #[error("animation path {id} in layer {layer} has {points} points, only 2 are supported")]
    InvalidAnimationPath {
        /// Layer index.
        layer: usize,
        /// Path id.
        id: u32,
        /// Number of points found.
        points: usize,
    },
    /// Tilesets have to be added in ascending `first_gid` order.
    #[error("tileset with first gid {first_gid} added after first gid {previous}")]
    TilesetOrder {
        /// Offending first gid.
        first_gid: u32,
        /// First gid of the previous tileset.
        previous: u32,
    },
    /// Tile code with the hexagonal 120° rotation flag set.
    #[error("tile code {code:#010x} uses the unsupported hexagonal 120 rotation")]
    UnsupportedTileFlag {
        /// Raw tile code.
        code: u32,
    },
    /// Tick rates have to be positive and finite.
    #[error("tick rate must be positive, got {0}")]
    InvalidTickRate(f32),
    /// No tileset covers this gid.
    #[error("no tileset contains gid {gid}")]
    UnknownTile {
        /// Cleaned global tile id.
        gid: u32,
    },
}

/// Errors raised by the draw adapters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// Debug draw primitive kind without an implementation.
    #[error("debug draw primitive {0} is not implemented")]
    UnsupportedPrimitive(&'static str),
    /// Collider shape the ship renderer cannot turn into triangles.
    #[error("shape type rendering not implemented")]
    UnsupportedShape,
}
