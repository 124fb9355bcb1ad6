//! # boq CLI
//!
//! Command-line front end for `boq_core`. Reports are printed to stdout as
//! pretty JSON; logs go to stderr.
//!
//! ```text
//! boq report column.json
//! boq report wall.json --openings wall_openings.json
//! boq estimate block_b.boq
//! boq units ft
//! boq openings add W1 D1 --kind door --width 0.9 --height 2.1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use boq_core::elements::{ElementInput, Opening, OpeningKind};
use boq_core::file_io::load_estimate;
use boq_core::openings::OpeningStore;
use boq_core::report::{parse_element, Estimator};
use boq_core::settings::Settings;
use boq_core::units::{resolve, UnitSystem};
use boq_core::TableLibrary;

#[derive(Parser)]
#[command(name = "boq")]
#[command(about = "Bill of quantities for reinforced concrete and masonry elements")]
struct Cli {
    /// Detailing settings (TOML) overriding cover, laps and block size
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report quantities for one element (JSON file)
    Report {
        element: PathBuf,

        /// Merge stored openings into a block wall before reporting
        #[arg(long)]
        openings: Option<PathBuf>,
    },

    /// Report every element of an estimate file
    Estimate { file: PathBuf },

    /// Show the reporting units for a unit token
    Units { token: String },

    /// List bar designations and concrete grades in the reference tables
    Library,

    /// Manage the wall openings store
    Openings {
        /// Store file
        #[arg(long, default_value = "wall_openings.json")]
        store: PathBuf,

        #[command(subcommand)]
        action: OpeningsAction,
    },
}

#[derive(Subcommand)]
enum OpeningsAction {
    /// Add an opening to a wall
    Add {
        wall: String,
        tag: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long, default_value_t = 1)]
        amt: u32,
    },

    /// List openings, optionally for one wall
    List { wall: Option<String> },

    /// Remove all openings of a wall
    Remove { wall: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Window,
    Door,
}

impl From<KindArg> for OpeningKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Window => OpeningKind::Window,
            KindArg::Door => OpeningKind::Door,
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn user_id() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "boq".to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let library = TableLibrary::standard()?;
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { element, openings } => {
            let json = fs::read_to_string(&element)
                .with_context(|| format!("reading {}", element.display()))?;
            let mut input = parse_element(&json)
                .with_context(|| format!("parsing {}", element.display()))?;

            if let Some(store_path) = openings {
                match &mut input {
                    ElementInput::BlockWall(wall) => {
                        let store = OpeningStore::open(store_path, user_id());
                        let attached = store.attach(wall)?;
                        tracing::info!(wall = %wall.tag, attached, "merged stored openings");
                    }
                    other => tracing::warn!(
                        kind = %other.kind(),
                        "--openings only applies to block walls; ignored"
                    ),
                }
            }

            let estimator = Estimator::new(library, settings)?;
            print_json(&estimator.report(&input)?)?;
        }

        Commands::Estimate { file } => {
            let estimate = load_estimate(&file)?;
            tracing::info!(
                title = %estimate.meta.title,
                items = estimate.item_count(),
                "loaded estimate"
            );
            print_json(&estimate.reports(library, &settings)?)?;
        }

        Commands::Units { token } => {
            let system = UnitSystem::from_token(&token)?;
            let names = resolve(&token)?;
            println!("system: {}", system);
            println!("length: {}", names.length);
            println!("area:   {}", names.area);
            println!("volume: {}", names.volume);
            println!("mass:   {}", names.mass);
        }

        Commands::Library => {
            println!("Bar designations:");
            for designation in library.bar_designations() {
                println!("  {}", designation);
            }
            println!("Concrete grades:");
            for grade in library.concrete_grades() {
                println!("  {}", grade);
            }
        }

        Commands::Openings { store, action } => {
            let store = OpeningStore::open(store, user_id());
            match action {
                OpeningsAction::Add {
                    wall,
                    tag,
                    kind,
                    width,
                    height,
                    amt,
                } => {
                    let opening = Opening {
                        tag,
                        kind: kind.into(),
                        width,
                        height,
                        amt,
                    };
                    print_json(&store.save(&wall, opening)?)?;
                }
                OpeningsAction::List { wall } => {
                    let records = match wall {
                        Some(wall) => store.find_by(&wall)?,
                        None => store.list_all()?,
                    };
                    if records.is_empty() {
                        println!("No openings in {}.", store.path().display());
                    } else {
                        print_json(&records)?;
                    }
                }
                OpeningsAction::Remove { wall } => {
                    let removed = store.delete_by(&wall)?;
                    println!("Removed {} opening(s) from {}.", removed, wall);
                }
            }
        }
    }

    Ok(())
}
