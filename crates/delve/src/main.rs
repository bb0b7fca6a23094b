//! delve: build a dungeon level from the command line
//!
//! Prints the level as JSON (or as a plain character map with `--ascii`).

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use delve_core::dungeon::{Coord, LayoutKind, Level, Rect, generate};
use delve_core::{GameRng, GenConfig};

/// Procedural dungeon generator
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Generate a dungeon level", long_about = None)]
struct Args {
    /// Layout recipe (cavern, winding, egg, maze, max_maze, pyramid)
    #[arg(short = 'l', long = "layout", default_value = "cavern")]
    layout: LayoutKind,

    /// Level width in tiles
    #[arg(short = 'W', long = "width", default_value_t = 80,
          value_parser = clap::value_parser!(i32).range(6..=1000))]
    width: i32,

    /// Level height in tiles
    #[arg(short = 'H', long = "height", default_value_t = 45,
          value_parser = clap::value_parser!(i32).range(6..=1000))]
    height: i32,

    /// RNG seed; random when omitted
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// JSON file with generation settings
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print the map as characters instead of JSON
    #[arg(long = "ascii")]
    ascii: bool,

    /// Print the default settings as JSON and exit
    #[arg(long = "dump-config")]
    dump_config: bool,

    /// List layout recipes and exit
    #[arg(long = "list")]
    list: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Placement of one stitched feature
#[derive(Serialize)]
struct FeatureSummary<'a> {
    name: &'a str,
    #[serde(flatten)]
    rect: Rect,
}

/// What gets written for a generated level
#[derive(Serialize)]
struct Report<'a> {
    layout: LayoutKind,
    seed: u64,
    width: i32,
    height: i32,
    config: &'a GenConfig,
    entrance: Option<Coord>,
    exit: Option<Coord>,
    stairs: Option<Coord>,
    features: Vec<FeatureSummary<'a>>,
    map: Vec<String>,
}

impl<'a> Report<'a> {
    fn new(layout: LayoutKind, seed: u64, config: &'a GenConfig, level: &'a Level) -> Self {
        Self {
            layout,
            seed,
            width: level.width(),
            height: level.height(),
            config,
            entrance: level.entrance,
            exit: level.exit,
            stairs: level.stairs,
            features: level
                .features
                .iter()
                .map(|f| FeatureSummary {
                    name: &f.name,
                    rect: f.footprint(),
                })
                .collect(),
            map: level.grid.to_ascii().lines().map(str::to_owned).collect(),
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list {
        for kind in LayoutKind::iter() {
            println!("{kind}");
        }
        return Ok(());
    }

    if args.dump_config {
        println!("{}", GenConfig::default().to_json()?);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => GenConfig::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => GenConfig::default(),
    };

    let mut rng = match args.seed {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };
    let seed = rng.seed();
    info!(layout = %args.layout, seed, width = args.width, height = args.height, "generating");

    let level = generate(args.layout, args.width, args.height, &config, &mut rng);

    let mut out = if args.ascii {
        level.grid.to_ascii()
    } else {
        serde_json::to_string_pretty(&Report::new(args.layout, seed, &config, &level))
            .context("serializing level")?
    };
    out.push('\n');

    match &args.output {
        Some(path) => fs::write(path, out)
            .with_context(|| format!("writing level to {}", path.display()))?,
        None => print!("{out}"),
    }

    Ok(())
}
