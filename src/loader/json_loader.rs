// src/loader/json_loader.rs
use crate::error::MapError;
use crate::level::{AnimationPath, Chunk, Level, Rect, Tileset};
use macroquad::math::vec2;
use macroquad::texture::Image;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonMap {
    #[serde(default)]
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize)]
struct JsonLayer {
    id: u32,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    chunks: Vec<JsonChunk>,
    // finite maps keep the tiles on the layer itself
    #[serde(default)]
    data: Option<Vec<u32>>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

#[derive(Deserialize)]
struct JsonChunk {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: Vec<u32>,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    ellipse: Option<JsonValue>,
    #[serde(default)]
    polyline: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    source: String,
}

#[derive(Deserialize)]
struct ExternalTileset {
    tilewidth: u32,
    tileheight: u32,
    columns: u32,
    image: String,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks the declared type and returns the value as a float.
fn float_property(owner: &'static str, prop: &JsonProperty) -> Result<f32, MapError> {
    let mistyped = |found: String| MapError::PropertyType {
        owner,
        name: prop.name.clone(),
        expected: "float",
        found,
    };
    match prop.kind.as_deref() {
        Some("float") => prop
            .value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| mistyped(prop.value.to_string())),
        other => Err(mistyped(other.unwrap_or("none").to_owned())),
    }
}

/// Checks the declared type and returns the referenced object id.
fn object_property(owner: &'static str, prop: &JsonProperty) -> Result<u32, MapError> {
    let mistyped = |found: String| MapError::PropertyType {
        owner,
        name: prop.name.clone(),
        expected: "object",
        found,
    };
    match prop.kind.as_deref() {
        Some("object") => prop
            .value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| mistyped(prop.value.to_string())),
        other => Err(mistyped(other.unwrap_or("none").to_owned())),
    }
}

fn polyline_to_animation(
    obj: &JsonObject,
    points: &[JsonObjectPoint],
) -> Result<AnimationPath, MapError> {
    let mut animation = AnimationPath {
        points: points
            .iter()
            .map(|p| vec2(p.x + obj.x, p.y + obj.y))
            .collect(),
        ..Default::default()
    };

    for prop in &obj.properties {
        match prop.name.as_str() {
            "duration" => animation.duration = float_property("polyline", prop)?,
            "angularVelocity" => animation.angular_velocity = float_property("polyline", prop)?,
            _ => {
                return Err(MapError::UnsupportedProperty {
                    owner: "polyline",
                    name: prop.name.clone(),
                })
            }
        }
    }

    Ok(animation)
}

fn object_to_rect(obj: &JsonObject) -> Result<Rect, MapError> {
    let mut rect = Rect::new(vec2(obj.x, obj.y), vec2(obj.width, obj.height));

    for prop in &obj.properties {
        match prop.name.as_str() {
            "animation" => rect.animation = Some(object_property("rect", prop)?),
            _ => {
                return Err(MapError::UnsupportedProperty {
                    owner: "rect",
                    name: prop.name.clone(),
                })
            }
        }
    }

    Ok(rect)
}

fn chunk_from_json(layer: usize, c: JsonChunk) -> Result<Chunk, MapError> {
    let expected = c.width as usize * c.height as usize;
    if c.data.len() != expected {
        return Err(MapError::InvalidChunkSize {
            layer,
            x: c.x,
            y: c.y,
            expected,
            found: c.data.len(),
        });
    }
    Ok(Chunk {
        x: c.x,
        y: c.y,
        width: c.width,
        height: c.height,
        data: c.data,
    })
}

fn parse_layers(level: &mut Level, layers: Vec<JsonLayer>) -> Result<(), MapError> {
    for l in layers {
        let layer = l.id.checked_sub(1).ok_or_else(|| {
            MapError::InvalidMap(format!("layer '{}' has id 0, ids start at 1", l.name))
        })? as usize;

        match l.kind.as_str() {
            "tilelayer" => {
                for c in l.chunks {
                    level.add_chunk(layer, chunk_from_json(layer, c)?);
                }
                if let Some(data) = l.data {
                    let chunk = JsonChunk {
                        x: 0,
                        y: 0,
                        width: l.width,
                        height: l.height,
                        data,
                    };
                    level.add_chunk(layer, chunk_from_json(layer, chunk)?);
                }
            }
            "objectgroup" => {
                for obj in &l.objects {
                    if obj.ellipse.is_some() {
                        return Err(MapError::UnsupportedShape {
                            layer,
                            object_id: obj.id,
                            shape: "ellipse",
                        });
                    } else if let Some(points) = &obj.polyline {
                        level.add_animation(layer, obj.id, polyline_to_animation(obj, points)?);
                    } else {
                        level.add_rect(layer, obj.id, object_to_rect(obj)?);
                    }
                }
            }
            other => log::debug!("skipping layer '{}' of type {other}", l.name),
        }
    }
    Ok(())
}

fn load_tileset(map_dir: &Path, ts: &JsonTilesetRef) -> Result<Tileset, MapError> {
    if !ts.source.ends_with(".json") {
        return Err(MapError::InvalidMap(format!(
            "External tileset must be JSON: {}",
            ts.source
        )));
    }
    let ts_path = map_dir.join(&ts.source);
    let ext: ExternalTileset = read_json(&ts_path)?;

    let ts_dir = ts_path.parent().unwrap_or(map_dir);
    let img_path = ts_dir.join(&ext.image);
    let bytes = std::fs::read(&img_path).map_err(|source| MapError::Io {
        path: img_path.clone(),
        source,
    })?;
    let image = Image::from_file_with_format(&bytes, None).map_err(|e| MapError::Image {
        path: img_path.clone(),
        message: format!("{e:?}"),
    })?;

    Ok(Tileset {
        image,
        first_gid: ts.firstgid,
        tile_width: ext.tilewidth,
        tile_height: ext.tileheight,
        columns: ext.columns,
        margin: ext.margin,
        spacing: ext.spacing,
    })
}

/// Decodes a Tiled JSON map (and the tilesets and images it references)
/// into a [`Level`]. Either the whole level loads or nothing does.
pub fn load_level(path: impl AsRef<Path>) -> Result<Level, MapError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            p.display()
        )));
    }

    let j: JsonMap = read_json(p)?;
    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let mut level = Level::new();
    parse_layers(&mut level, j.layers)?;
    for ts in &j.tilesets {
        level.add_tileset(load_tileset(&map_dir, ts)?)?;
    }

    log::info!(
        "loaded level {}: {} tile layers, {} rects, {} tilesets",
        p.display(),
        level.tile_layers().len(),
        level.rect_layers().iter().map(Vec::len).sum::<usize>(),
        level.tilesets().len()
    );
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LevelError;
    use macroquad::color::WHITE;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("lumiax_loader_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    fn write_tileset(dir: &Path, name: &str) {
        let tileset_json = r#"{
          "tilewidth":32,
          "tileheight":32,
          "columns":2,
          "image":"tiles.png"
        }"#;
        fs::write(dir.join(name), tileset_json).expect("failed to write tileset");
        Image::gen_image_color(64, 32, WHITE).export_png(
            dir.join("tiles.png").to_str().expect("path utf8"),
        );
    }

    fn load_map(map_json: &str) -> Result<Level, MapError> {
        let dir = temp_dir();
        let map_path = dir.join("map.json");
        fs::write(&map_path, map_json).expect("failed to write map");
        write_tileset(&dir, "tileset.json");
        load_level(&map_path)
    }

    fn object_layer(objects: &str) -> String {
        format!(
            r#"{{
              "layers": [{{"id":2,"type":"objectgroup","name":"objects","objects":[{objects}]}}],
              "tilesets": []
            }}"#
        )
    }

    #[test]
    fn parses_chunks_rects_paths_and_tilesets() {
        let map_json = r#"{
          "infinite": true,
          "layers": [
            {
              "id": 1,
              "type":"tilelayer",
              "name":"ground",
              "chunks":[
                {"x":-16,"y":0,"width":2,"height":1,"data":[0,2]},
                {"x":0,"y":0,"width":1,"height":1,"data":[1]}
              ]
            },
            {
              "id": 3,
              "type":"objectgroup",
              "name":"platforms",
              "objects":[
                {
                  "id": 4, "x": 32, "y": 64, "width": 96, "height": 32,
                  "properties":[{"name":"animation","type":"object","value":5}]
                },
                {
                  "id": 5, "x": 100, "y": 10, "width": 0, "height": 0,
                  "polyline":[{"x":0,"y":0},{"x":50,"y":-10}],
                  "properties":[
                    {"name":"duration","type":"float","value":2.5},
                    {"name":"angularVelocity","type":"float","value":0.5}
                  ]
                },
                {"id": 6, "x": 0, "y": 0, "width": 32, "height": 32}
              ]
            },
            {"id": 4, "type":"imagelayer", "name":"backdrop"}
          ],
          "tilesets":[{"firstgid":1,"source":"tileset.json"}]
        }"#;

        let level = load_map(map_json).expect("decode");

        assert_eq!(level.tile_layers().len(), 1);
        assert_eq!(level.tile_layers()[0].len(), 2);
        assert_eq!(level.tile_layers()[0][0].x, -16);
        assert_eq!(level.tile_layers()[0][0].data, vec![0, 2]);

        let rects = &level.rect_layers()[2];
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].id, 4);
        assert_eq!(rects[0].value.position, vec2(32.0, 64.0));
        assert_eq!(rects[0].value.size, vec2(96.0, 32.0));
        assert_eq!(rects[0].value.animation, Some(5));
        assert_eq!(rects[1].value.animation, None);

        let path = &level.animation_layers()[2][0];
        assert_eq!(path.id, 5);
        assert_eq!(path.value.points, vec![vec2(100.0, 10.0), vec2(150.0, 0.0)]);
        assert_eq!(path.value.duration, 2.5);
        assert_eq!(path.value.angular_velocity, 0.5);

        assert_eq!(level.tilesets().len(), 1);
        let ts = &level.tilesets()[0];
        assert_eq!((ts.first_gid, ts.columns, ts.tile_width), (1, 2, 32));
        assert_eq!((ts.image.width, ts.image.height), (64, 32));
    }

    #[test]
    fn finite_layer_data_becomes_a_chunk_at_origin() {
        let map_json = r#"{
          "layers": [{"id":1,"type":"tilelayer","width":2,"height":2,"data":[1,0,0,1]}],
          "tilesets":[{"firstgid":1,"source":"tileset.json"}]
        }"#;
        let level = load_map(map_json).expect("decode");
        let chunk = &level.tile_layers()[0][0];
        assert_eq!((chunk.x, chunk.y, chunk.width, chunk.height), (0, 0, 2, 2));
        assert_eq!(chunk.cells().count(), 2);
    }

    #[test]
    fn returns_typed_error_for_ellipse() {
        let err = load_map(&object_layer(
            r#"{"id":8,"x":0,"y":0,"width":10,"height":10,"ellipse":true}"#,
        ))
        .err()
        .expect("expected decode error");
        assert!(matches!(
            err,
            MapError::UnsupportedShape { layer: 1, object_id: 8, shape: "ellipse" }
        ));
    }

    #[test]
    fn returns_typed_error_for_unknown_rect_property() {
        let err = load_map(&object_layer(
            r#"{"id":1,"x":0,"y":0,"width":1,"height":1,
                "properties":[{"name":"colour","type":"string","value":"red"}]}"#,
        ))
        .err()
        .expect("expected decode error");
        assert!(matches!(err, MapError::UnsupportedProperty { owner: "rect", name } if name == "colour"));
    }

    #[test]
    fn returns_typed_error_for_mistyped_animation_reference() {
        let err = load_map(&object_layer(
            r#"{"id":1,"x":0,"y":0,"width":1,"height":1,
                "properties":[{"name":"animation","type":"int","value":3}]}"#,
        ))
        .err()
        .expect("expected decode error");
        assert!(matches!(
            err,
            MapError::PropertyType { owner: "rect", expected: "object", ref found, .. } if found == "int"
        ));
    }

    #[test]
    fn returns_typed_error_for_bad_polyline_properties() {
        let err = load_map(&object_layer(
            r#"{"id":1,"x":0,"y":0,"polyline":[{"x":0,"y":0},{"x":1,"y":0}],
                "properties":[{"name":"duration","type":"int","value":3}]}"#,
        ))
        .err()
        .expect("expected decode error");
        assert!(matches!(err, MapError::PropertyType { owner: "polyline", expected: "float", .. }));

        let err = load_map(&object_layer(
            r#"{"id":1,"x":0,"y":0,"polyline":[{"x":0,"y":0},{"x":1,"y":0}],
                "properties":[{"name":"speed","type":"float","value":3}]}"#,
        ))
        .err()
        .expect("expected decode error");
        assert!(matches!(err, MapError::UnsupportedProperty { owner: "polyline", .. }));
    }

    #[test]
    fn returns_typed_error_for_chunk_size_mismatch() {
        let err = load_map(
            r#"{"layers":[{"id":1,"type":"tilelayer",
                "chunks":[{"x":0,"y":0,"width":2,"height":2,"data":[1,2,3]}]}],
                "tilesets":[]}"#,
        )
        .err()
        .expect("expected decode error");
        assert!(matches!(err, MapError::InvalidChunkSize { expected: 4, found: 3, .. }));
    }

    #[test]
    fn returns_typed_error_for_layer_id_zero() {
        let err = load_map(r#"{"layers":[{"id":0,"type":"tilelayer"}],"tilesets":[]}"#)
            .err()
            .expect("expected decode error");
        assert!(matches!(err, MapError::InvalidMap(_)));
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let err = load_map("{ not json").err().expect("expected decode error");
        assert!(matches!(err, MapError::Json { .. }));
    }

    #[test]
    fn returns_typed_error_for_missing_tileset_file() {
        let err = load_map(
            r#"{"layers": [], "tilesets":[{"firstgid":1,"source":"missing_tileset.json"}]}"#,
        )
        .err()
        .expect("expected decode error");
        assert!(matches!(err, MapError::Io { .. }));
    }

    #[test]
    fn returns_typed_error_for_unreadable_image() {
        let dir = temp_dir();
        let map_path = dir.join("map.json");
        fs::write(
            &map_path,
            r#"{"layers": [], "tilesets":[{"firstgid":1,"source":"tileset.json"}]}"#,
        )
        .expect("failed to write map");
        fs::write(
            dir.join("tileset.json"),
            r#"{"tilewidth":32,"tileheight":32,"columns":1,"image":"broken.png"}"#,
        )
        .expect("failed to write tileset");
        fs::write(dir.join("broken.png"), b"not a png").expect("failed to write image");

        let err = load_level(&map_path).err().expect("expected decode error");
        assert!(matches!(err, MapError::Image { .. }));
    }

    #[test]
    fn returns_typed_error_for_tilesets_out_of_order() {
        let err = load_map(
            r#"{"layers": [], "tilesets":[
                {"firstgid":101,"source":"tileset.json"},
                {"firstgid":1,"source":"tileset.json"}
            ]}"#,
        )
        .err()
        .expect("expected decode error");
        assert!(matches!(err, MapError::Level(LevelError::TilesetOrder { .. })));
    }

    #[test]
    fn rejects_non_json_map_path() {
        let err = load_level("level.tmx").err().expect("expected decode error");
        assert!(matches!(err, MapError::InvalidMap(_)));
    }
}
