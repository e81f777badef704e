use anyhow::Context;
use clap::Parser;
use lumiax::physics::{DebugDrawFlags, DebugRenderer};
use lumiax::{Game, GameConfig, Gamepads, Level, LevelRenderer, ShipControls, ShipRenderer};
use macroquad::prelude::*;
use macroquad::ui::{hash, root_ui, widgets};
use std::path::PathBuf;

/// Two thruster ships and a Tiled level.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file; defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Tiled JSON map to play, overriding the settings file.
    #[arg(short, long, value_name = "FILE")]
    level: Option<PathBuf>,
    /// Start with physics debug drawing on.
    #[arg(long)]
    debug_draw: bool,
}

fn window_conf(config: &GameConfig) -> Conf {
    Conf {
        window_title: config.window.title.clone(),
        window_width: config.window.width,
        window_height: config.window.height,
        sample_count: config.window.sample_count,
        high_dpi: true,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(level) = cli.level {
        config.level = level;
    }
    config.debug_draw |= cli.debug_draw;

    let level = Level::load(&config.level)
        .with_context(|| format!("Loading level {}", config.level.display()))?;
    let game = Game::new(level, &config).context("Setting up the level")?;

    macroquad::Window::from_config(window_conf(&config), async move {
        if let Err(e) = run(game, config).await {
            log::error!("{e:#}");
            std::process::exit(1);
        }
    });
    Ok(())
}

fn read_controls(gamepads: &Gamepads, deadzone: f32) -> [ShipControls; 2] {
    let [first, second] = read_keyboard();
    [first, second.or(gamepads.controls(deadzone))]
}

fn read_keyboard() -> [ShipControls; 2] {
    [
        ShipControls {
            left: is_key_down(KeyCode::Left),
            up: is_key_down(KeyCode::Up),
            right: is_key_down(KeyCode::Right),
            down: is_key_down(KeyCode::Down),
        },
        ShipControls {
            left: is_key_down(KeyCode::A),
            up: is_key_down(KeyCode::W),
            right: is_key_down(KeyCode::D),
            down: is_key_down(KeyCode::S),
        },
    ]
}

fn camera(target: Vec2, width: f32) -> Camera2D {
    let height = width * screen_height() / screen_width();
    // y grows downwards, like the map
    Camera2D {
        target,
        zoom: vec2(2.0 / width, 2.0 / height),
        ..Default::default()
    }
}

async fn run(mut game: Game, mut config: GameConfig) -> anyhow::Result<()> {
    let level_renderer = LevelRenderer::new(game.level())?;
    let mut ship_renderer = ShipRenderer::new();
    let mut debug_renderer = DebugRenderer;
    let mut gamepads = Gamepads::new(config.gamepad.enabled);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            log::info!("quitting");
            return Ok(());
        }

        gamepads.poll();
        let controls = read_controls(&gamepads, config.gamepad.deadzone);
        game.advance(get_frame_time(), &controls)?;

        clear_background(BLACK);
        let target = game
            .ships()
            .first()
            .map(|ship| ship.world_center_of_mass(game.world()))
            .unwrap_or_default();
        set_camera(&camera(target, config.camera_width));

        level_renderer.render(game.level());

        ship_renderer.reset();
        for ship in game.ships() {
            ship_renderer.draw_ship(ship, game.world())?;
        }
        ship_renderer.render();

        if config.debug_draw {
            for command in game.world().debug_draw_commands(DebugDrawFlags::default()) {
                if let Err(e) = debug_renderer.draw(&command) {
                    log::debug!("skipped debug primitive: {e}");
                }
            }
        }

        set_default_camera();
        debug_window(&mut game, &gamepads, &mut config.debug_draw);

        next_frame().await;
    }
}

fn debug_window(game: &mut Game, gamepads: &Gamepads, debug_draw: &mut bool) {
    let (world, ships) = game.world_and_ships_mut();

    widgets::Window::new(hash!(), vec2(10.0, 10.0), vec2(320.0, 420.0))
        .label("Debug")
        .ui(&mut *root_ui(), |ui| {
            ui.checkbox(hash!(), "Physics debug draw", debug_draw);
            ui.label(None, &format!("FPS: {}", get_fps()));

            for (i, ship) in ships.iter_mut().enumerate() {
                ui.tree_node(hash!("ship", i), &format!("Ship {i}"), |ui| {
                    let mut position = ship.position(world);
                    let before = position;
                    ui.slider(hash!("ship x", i), "x", -50.0..150.0, &mut position.x);
                    ui.slider(hash!("ship y", i), "y", -50.0..150.0, &mut position.y);
                    if position != before {
                        ship.set_position(world, position);
                    }

                    let mut degrees = ship.rotation(world).to_degrees();
                    let before = degrees;
                    ui.slider(hash!("ship rot", i), "rotation", -180.0..180.0, &mut degrees);
                    if degrees != before {
                        ship.set_rotation(world, degrees.to_radians());
                    }

                    let drag = ship.air_resistance(world);
                    let thrust = ship.linear_thrust(world);
                    ui.label(None, &format!("air resistance: {:.3} {:.3}", drag.x, drag.y));
                    ui.label(None, &format!("thrust: {:.3} {:.3}", thrust.x, thrust.y));
                    ui.label(None, &format!("torque: {:.3}", ship.torque()));
                    ui.label(None, &format!("speed: {:.3}", ship.speed(world)));
                });
            }

            ui.tree_node(hash!("joystick"), "Joystick", |ui| {
                let pads = gamepads.connected();
                if pads.is_empty() {
                    ui.label(None, "no joystick connected");
                }
                for pad in pads.iter().take(4) {
                    let a = pad.axes;
                    ui.label(None, &format!("Joystick {}: {}", pad.index, pad.name));
                    ui.label(None, &format!("X: {:.1}  Y: {:.1}", a.x, a.y));
                    ui.label(None, &format!("Z: {:.1}  R: {:.1}", a.z, a.r));
                    ui.label(None, &format!("U: {:.1}  V: {:.1}", a.u, a.v));
                    ui.label(None, &format!("PovX: {:.0}  PovY: {:.0}", a.pov_x, a.pov_y));
                }
            });
        });
}
