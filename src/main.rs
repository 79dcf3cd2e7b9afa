use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use log::info;

use arena_runtime::{
    validate_store, DataStore, GameData, GameDataService, GameSession, InputSnapshot,
    StaticViewport,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err:?}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Returns `Ok(false)` when the data directory failed validation.
fn run() -> Result<bool> {
    let options = CliOptions::parse()?;
    let store = DataStore::open(&options.data_dir)
        .with_context(|| format!("failed to open data directory {}", options.data_dir.display()))?;
    let report = validate_store(&store);

    if options.validate_only {
        println!("{report}");
        return Ok(report.is_valid());
    }
    if !report.is_valid() {
        eprintln!("{report}");
        return Ok(false);
    }

    let data = GameData::from_store(&store).context("failed to load game data")?;
    match options.simulate {
        Some(frames) => run_headless(data, frames, &options.keys),
        None => {
            let service = GameDataService::new(&data)?;
            info!(
                "loaded {} character(s) and {} dimension(s)",
                data.characters.len(),
                data.dimensions.len()
            );
            service.serve(&options.addr)?;
        }
    }
    Ok(true)
}

fn run_headless(data: GameData, frames: u32, keys: &str) {
    let mut session = GameSession::new(data, Arc::new(StaticViewport::new(1280, 720)));
    let input = InputSnapshot::from_keys(keys);
    for _ in 0..frames {
        session.update(1.0 / 60.0, &input);
    }

    let scene = session.scene();
    println!("Loaded scene with {} objects", scene.objects.len());
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.kind);
    }
    for dimension in session.dimensions() {
        println!(
            "Dimension {} (difficulty {})",
            dimension.name, dimension.difficulty_level
        );
    }
    print_final_state(&session);
}

fn print_final_state(session: &GameSession) {
    let player = session.player();
    let color = session.player_color();
    println!("Final player state after {} frame(s):", session.frame());
    println!(
        " - pos=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2}) on_ground={} moving={}",
        player.position.x,
        player.position.y,
        player.position.z,
        color.x,
        color.y,
        color.z,
        player.is_on_ground,
        player.is_moving
    );
}

struct CliOptions {
    data_dir: PathBuf,
    addr: String,
    validate_only: bool,
    simulate: Option<u32>,
    keys: String,
}

impl CliOptions {
    const USAGE: &'static str = "Usage: arena-runtime [--validate] [--data-dir DIR] [--addr HOST:PORT] [--simulate FRAMES] [--keys KEYS]";

    fn parse() -> Result<Self> {
        let mut options = Self {
            data_dir: PathBuf::from("data"),
            addr: "127.0.0.1:3000".to_string(),
            validate_only: false,
            simulate: None,
            keys: String::new(),
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--validate" => options.validate_only = true,
                "--data-dir" => options.data_dir = PathBuf::from(value(&mut args, &arg)?),
                "--addr" => options.addr = value(&mut args, &arg)?,
                "--simulate" => {
                    let frames = value(&mut args, &arg)?;
                    let frames = frames
                        .parse::<u32>()
                        .with_context(|| format!("--simulate expects a frame count, got {frames}"))?;
                    options.simulate = Some(frames);
                }
                "--keys" => options.keys = value(&mut args, &arg)?,
                "-h" | "--help" => bail!(Self::USAGE),
                other => return Err(anyhow!("Unknown argument: {other}. {}", Self::USAGE)),
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {}", CliOptions::USAGE))
}
