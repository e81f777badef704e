use lumiax::physics::PhysicsWorld;
use lumiax::{
    build_tile_quads, load_level, AnimationPath, CollisionPass, Game, GameConfig, LevelError,
    MapError,
};
use macroquad::color::WHITE;
use macroquad::math::vec2;
use macroquad::texture::Image;
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("lumiax_{tag}_{nanos}"));
    fs::create_dir_all(dir.join("tilesets")).expect("failed to create temp dir");
    dir
}

/// A map with one tile layer, a platform on a path and a static crate,
/// plus a tileset kept in a subdirectory.
fn write_level(tag: &str) -> PathBuf {
    let dir = temp_dir(tag);

    let tileset_json = r#"{
      "tilewidth":32, "tileheight":32, "columns":4, "image":"tiles.png"
    }"#;
    fs::write(dir.join("tilesets/terrain.json"), tileset_json).expect("write tileset");
    Image::gen_image_color(128, 64, WHITE).export_png(
        dir.join("tilesets/tiles.png")
            .to_str()
            .expect("path utf8"),
    );

    let map_json = r#"{
      "infinite": true,
      "layers": [
        {
          "id": 1, "type": "tilelayer", "name": "ground",
          "chunks": [
            {"x": 16, "y": 0, "width": 2, "height": 2, "data": [0, 0, 0, 2147483649]}
          ]
        },
        {
          "id": 2, "type": "objectgroup", "name": "platforms",
          "objects": [
            {
              "id": 10, "x": 0, "y": 0, "width": 64, "height": 32,
              "properties": [{"name": "animation", "type": "object", "value": 11}]
            },
            {
              "id": 11, "x": 0, "y": 0, "width": 0, "height": 0,
              "polyline": [{"x": 0, "y": 0}, {"x": 10, "y": 0}],
              "properties": [{"name": "duration", "type": "float", "value": 2.0}]
            },
            {"id": 12, "x": 64, "y": 64, "width": 32, "height": 32}
          ]
        }
      ],
      "tilesets": [{"firstgid": 1, "source": "tilesets/terrain.json"}]
    }"#;
    let map_path = dir.join("level.json");
    fs::write(&map_path, map_json).expect("write map");
    map_path
}

#[test]
fn one_tile_cell_gives_one_body_at_its_grid_position() {
    let mut level = load_level(write_level("grid")).expect("load");
    let mut world = PhysicsWorld::default();
    level.register_collision(&mut world).expect("register");

    let tiles = level.tile_bodies();
    assert_eq!(tiles.len(), 1);
    let t = world.body(tiles[0]).translation();
    assert_eq!((t.x, t.y), (17.0, 1.0));
    assert!(world.body(tiles[0]).is_fixed());
}

#[test]
fn animated_rects_are_dynamic_and_plain_rects_static() {
    let mut level = load_level(write_level("kinds")).expect("load");
    let mut world = PhysicsWorld::default();
    level.register_collision(&mut world).expect("register");

    let platform = level.rect_body(1, 10).expect("platform");
    let crate_box = level.rect_body(1, 12).expect("crate");
    assert!(world.body(platform).is_dynamic());
    assert!(world.body(crate_box).is_fixed());
}

#[test]
fn second_registration_is_refused() {
    let mut level = load_level(write_level("twice")).expect("load");
    let mut world = PhysicsWorld::default();
    level.register_collision(&mut world).expect("register");
    let bodies = world.body_count();

    assert_eq!(
        level.register_collision(&mut world),
        Err(LevelError::AlreadyRegistered(CollisionPass::Tiles))
    );
    assert_eq!(world.body_count(), bodies);
}

#[test]
fn platform_follows_a_triangle_wave() {
    let mut level = load_level(write_level("wave")).expect("load");
    let mut world = PhysicsWorld::default();
    level.register_collision(&mut world).expect("register");

    // the rect is 64x32, so its top-left sits half a size before the path point
    for (time, x) in [(0.0, 0.0), (0.5, 5.0), (1.0, 10.0), (1.5, 5.0)] {
        level.update_animations(&mut world, time).expect("update");
        let rect = &level.rect_layers()[1][0].value;
        assert!(
            rect.position.abs_diff_eq(vec2(x - 32.0, -16.0), 1e-4),
            "t={time}: {:?}",
            rect.position
        );
    }
}

#[test]
fn flipped_tile_resolves_through_the_tileset() {
    let level = load_level(write_level("quads")).expect("load");
    let quads = build_tile_quads(&level).expect("quads");
    assert_eq!(quads.len(), 1);
    assert_eq!(quads[0].tileset, 0);
    assert_eq!(quads[0].center, vec2(17.0, 1.0));
    assert!(quads[0].transform.flip_x);
    assert!(!quads[0].transform.flip_y);
}

#[test]
fn game_runs_on_a_loaded_level() {
    let level = load_level(write_level("game")).expect("load");
    let mut game = Game::new(level, &GameConfig::default()).expect("game");
    let ticks = game.advance(0.5, &[]).expect("advance");
    assert_eq!(ticks, 8);
    assert!(game.game_time() > 0.0);
}

#[test]
fn bundled_level_loads() {
    let level = load_level("data/levels/level01.json").expect("bundled level");
    assert_eq!(level.tilesets().len(), 1);
    build_tile_quads(&level).expect("every tile resolves");
    Game::new(level, &GameConfig::default()).expect("bundled level registers");
}

#[test]
fn unsupported_extension_is_an_invalid_map() {
    let err = load_level("level.tmx").expect_err("tmx is not supported");
    assert!(matches!(err, MapError::InvalidMap(_)), "got {err:?}");
}

proptest! {
    #[test]
    fn phase_stays_in_unit_range(time in 0.0f32..1.0e4, duration in 0.01f32..100.0) {
        let path = AnimationPath {
            points: vec![vec2(0.0, 0.0), vec2(1.0, 0.0)],
            duration,
            angular_velocity: 0.0,
        };
        let phase = path.phase(time);
        prop_assert!((0.0..=1.0).contains(&phase), "phase {}", phase);
    }
}
