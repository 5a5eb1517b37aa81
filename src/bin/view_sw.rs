//! First-person software view of a text map.
//!
//! ```bash
//! YACAST_LOG=info cargo run --release -- maps/level.map --scale 2
//! YACAST_LOG=info cargo run --release -- --wall wall.png --floor floor.png --ceiling ceil.png
//! ```

use clap::Parser;
use minifb::{KeyRepeat, MouseMode, Scale, Window, WindowOptions};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use yacast_rs::{
    mapfile::load_map,
    renderer::{RendererExt, Scene, SceneTextures, Software},
    sim::{DEFAULT_TICK_RATE, Game, InputCmd, KeyMap, Mobile, PLAYER_RADIUS, TicRunner},
    world::{Camera, Texture, TextureBank, TextureId, Vector, camera::DEFAULT_FOV_DEG},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Map file, one wall per line: `x0 y0 x1 y1 [height]`
    #[arg(value_name = "FILE", default_value = "maps/level.map")]
    map: PathBuf,

    /// Frame-buffer width in pixels
    #[arg(long, default_value_t = 640)]
    width: usize,

    /// Frame-buffer height in pixels
    #[arg(long, default_value_t = 400)]
    height: usize,

    /// Window scale factor (1, 2, 4 or 8)
    #[arg(long, default_value_t = 2)]
    scale: u8,

    /// Horizontal field of view, degrees
    #[arg(long, default_value_t = DEFAULT_FOV_DEG)]
    fov: f64,

    /// Spawn x (defaults to the map centre)
    #[arg(long, allow_hyphen_values = true)]
    x: Option<f64>,

    /// Spawn y (defaults to the map centre)
    #[arg(long, allow_hyphen_values = true)]
    y: Option<f64>,

    /// Player collision radius, map units
    #[arg(long, default_value_t = PLAYER_RADIUS)]
    radius: f64,

    /// Simulation tics per second
    #[arg(long, default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: u32,

    /// Wall texture image (PNG/JPEG); procedural bricks if omitted
    #[arg(long, value_name = "IMAGE")]
    wall: Option<PathBuf>,

    /// Floor texture image; procedural tiles if omitted
    #[arg(long, value_name = "IMAGE")]
    floor: Option<PathBuf>,

    /// Ceiling texture image; procedural tiles if omitted
    #[arg(long, value_name = "IMAGE")]
    ceiling: Option<PathBuf>,
}

fn window_scale(factor: u8) -> Scale {
    match factor {
        0 | 1 => Scale::X1,
        2 | 3 => Scale::X2,
        4..=7 => Scale::X4,
        _ => Scale::X8,
    }
}

/// Load `image` into the bank, keyed by its path so the same file given
/// twice is decoded once; without one, fall back to the procedural texture.
fn add_texture(
    bank: &mut TextureBank,
    image: Option<&Path>,
    fallback: impl FnOnce() -> Texture,
) -> anyhow::Result<TextureId> {
    let (key, tex) = match image {
        Some(path) => {
            let key = path.display().to_string();
            if let Some(id) = bank.id(&key) {
                return Ok(id);
            }
            (key, Texture::load(path)?)
        }
        None => {
            let tex = fallback();
            (tex.name.clone(), tex)
        }
    };
    let id = bank.insert(key, tex)?;
    let tex = bank.texture(id)?;
    log::info!("texture {id}: {} ({}×{})", tex.name, tex.w, tex.h);
    Ok(id)
}

/// Wall, floor and ceiling art: image files when given, procedural
/// stand-ins otherwise.
fn build_textures(bank: &mut TextureBank, opts: &Opts) -> anyhow::Result<SceneTextures> {
    let textures = SceneTextures {
        wall: add_texture(bank, opts.wall.as_deref(), || {
            Texture::bricks("BRICK", 64, 64, 0x00_9C4A32, 0x00_8A8A80)
        })?,
        floor: add_texture(bank, opts.floor.as_deref(), || {
            Texture::checker("FLOOR", 64, 16, 0x00_5A5A5A, 0x00_404040)
        })?,
        ceiling: add_texture(bank, opts.ceiling.as_deref(), || {
            Texture::checker("CEIL", 64, 32, 0x00_3A4A6A, 0x00_30405A)
        })?,
    };
    log::info!("{} textures in bank", bank.len());
    Ok(textures)
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("YACAST_LOG");
    let opts = Opts::parse();
    anyhow::ensure!(opts.width > 0 && opts.height > 0, "empty frame buffer requested");
    anyhow::ensure!(opts.radius > 0.0, "player radius must be positive");

    // ─────────── load map & textures ───────
    let map = load_map(&opts.map)?;
    let centre = map.center();
    let spawn = Vector::new(opts.x.unwrap_or(centre.x), opts.y.unwrap_or(centre.y));
    log::info!("spawning at {spawn:?}");

    let mut bank = TextureBank::default_with_checker();
    let textures = build_textures(&mut bank, &opts)?;

    let camera = Camera::new(opts.fov.to_radians());
    let keymap = KeyMap::default();
    let mut game = Game::new(map, Mobile::new(spawn, Vector::X, opts.radius));
    let mut sim = TicRunner::new(opts.tick_rate);
    let mut renderer = Software::default();

    // ─────────── window ───────
    let (w, h) = (opts.width, opts.height);
    let mut win = Window::new(
        "yacast - software",
        w,
        h,
        WindowOptions {
            scale: window_scale(opts.scale),
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(opts.tick_rate as usize);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_tick = Duration::ZERO;
    let mut acc_draw = Duration::ZERO;
    let mut acc_blit = Duration::ZERO;
    let mut acc_frames = 0u32;
    let mut last_print = Instant::now();

    let mut last_mouse: Option<f32> = None;

    while win.is_open() && !game.should_quit() {
        /* --------------- one-shot commands -------------------------------- */
        for cmd in keymap
            .commands(win.get_keys_pressed(KeyRepeat::No))
            .filter(|c| !c.is_held())
        {
            game.handle(cmd);
            win.set_cursor_visibility(!game.grab_mouse);
        }

        /* --------------- mouse look while grabbed ------------------------- */
        let mouse_x = win.get_mouse_pos(MouseMode::Pass).map(|(x, _)| x);
        let mouse_dx = match (game.grab_mouse, last_mouse, mouse_x) {
            (true, Some(prev), Some(now)) => f64::from(now - prev),
            _ => 0.0,
        };
        last_mouse = mouse_x;

        /* --------------- held commands → tics ----------------------------- */
        let held = keymap.commands(win.get_keys()).filter(|c| c.is_held());
        let cmd = InputCmd::from_held(held, mouse_dx);

        let t0 = Instant::now();
        sim.pump(&mut game, &cmd);
        acc_tick += t0.elapsed();

        /* --------------- draw & present ----------------------------------- */
        let scene = Scene {
            pov: &game.player,
            map: &game.map,
            camera: &camera,
            textures,
        };
        let mut blit = Ok(());
        let t1 = Instant::now();
        let draw = renderer.draw_frame(w, h, &scene, &bank, game.show_map, |fb, w, h| {
            blit = win.update_with_buffer(fb, w, h);
        });
        blit?;
        acc_draw += draw;
        acc_blit += t1.elapsed().saturating_sub(draw);
        acc_frames += 1;

        // ─────────── report every ~3 s ────────────────────
        if last_print.elapsed() >= Duration::from_secs(3) {
            let ms = |d: Duration| d.as_secs_f64() * 1000.0 / f64::from(acc_frames);
            let draw_ms = ms(acc_draw);
            log::info!(
                "avg tick {:.2} ms  draw {:.2} ms ({:.1} FPS)  blit {:.2} ms  seen {}/{} walls",
                ms(acc_tick),
                draw_ms,
                1000.0 / draw_ms.max(f64::EPSILON),
                ms(acc_blit),
                game.map.seen_count(),
                game.map.len(),
            );
            acc_tick = Duration::ZERO;
            acc_draw = Duration::ZERO;
            acc_blit = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }

    log::info!("bye after {} tics", game.tics());
    Ok(())
}
