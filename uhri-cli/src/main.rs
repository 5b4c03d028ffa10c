//! UHRI CLI - Urban Health Risk Index predictor

#![deny(warnings)]

// Global invariants enforced:
// - Models are loaded once per process, before any request runs
// - A fixed --seed yields byte-for-byte identical output
// - Report output goes to stdout; diagnostics go to the log (stderr)

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use uhri_core::config::{self, ResolvedConfig};
use uhri_core::features::{self, Conditions, Pollutants};
use uhri_core::report::{render_json_batch, render_jsonl};
use uhri_core::zones::MAP_CENTER;
use uhri_core::{assess, assess_batch, render_json, render_text, score};
use uhri_core::{ModelProvider, ZoneRng};

/// Artifact names looked up in the working directory when neither a flag nor
/// the config names a model
const DEFAULT_AQI_MODEL: &str = "aqi_model.json";
const DEFAULT_TRAFFIC_MODEL: &str = "traffic_model.json";

#[derive(Parser)]
#[command(name = "uhri")]
#[command(
    about = "Urban Health Risk Index: combines PM2.5 and traffic congestion predictions into one health risk score"
)]
#[command(version = env!("UHRI_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict PM2.5 and traffic for the given conditions and compute the UHRI
    Assess {
        #[command(flatten)]
        models: ModelArgs,

        /// Date to predict for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Time to predict for (HH:MM or HH:MM:SS, default: now)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,

        /// CO (carbon monoxide)
        #[arg(long, default_value_t = 2.0)]
        co: f64,

        /// NO (nitric oxide)
        #[arg(long, default_value_t = 25.0)]
        no: f64,

        /// NO2 (nitrogen dioxide)
        #[arg(long, default_value_t = 40.0)]
        no2: f64,

        /// O3 (ozone)
        #[arg(long, default_value_t = 35.0)]
        o3: f64,

        /// SO2 (sulphur dioxide)
        #[arg(long, default_value_t = 15.0)]
        so2: f64,

        /// PM10
        #[arg(long, default_value_t = 150.0)]
        pm10: f64,

        /// NH3 (ammonia)
        #[arg(long, default_value_t = 20.0)]
        nh3: f64,

        /// Recent PM2.5 level in µg/m³ (fills every lag/rolling feature)
        #[arg(long, default_value_t = 150.0)]
        recent_pm25: f64,

        /// Current traffic density, 0.0-1.0 (fills every lag feature)
        #[arg(long, default_value_t = 0.4)]
        recent_density: f64,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Compute the UHRI directly from PM2.5 and congestion values (no models)
    Score {
        /// PM2.5 concentration in µg/m³
        #[arg(long)]
        pm25: f64,

        /// Traffic congestion fraction, 0.0-1.0
        #[arg(long)]
        traffic: f64,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Assess a JSON array of conditions in parallel
    Batch {
        /// Path to a JSON file containing an array of conditions
        path: PathBuf,

        #[command(flatten)]
        models: ModelArgs,

        /// Base seed; request N uses seed + N (overrides config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the zone registry used for risk simulation
    Zones {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or inspect a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running a prediction
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ModelArgs {
    /// PM2.5 model artifact (overrides config file)
    #[arg(long)]
    aqi_model: Option<PathBuf>,

    /// Traffic model artifact (overrides config file)
    #[arg(long)]
    traffic_model: Option<PathBuf>,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Seed for zone simulation (overrides config file; default: random)
    #[arg(long)]
    seed: Option<u64>,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            models,
            date,
            time,
            co,
            no,
            no2,
            o3,
            so2,
            pm10,
            nh3,
            recent_pm25,
            recent_density,
            output,
        } => {
            let resolved_config = load_config(output.config.as_deref())?;
            let provider = load_models(&models, &resolved_config)?;

            let now = Local::now().naive_local();
            let timestamp = NaiveDateTime::new(
                date.unwrap_or_else(|| now.date()),
                time.unwrap_or_else(|| now.time()),
            );
            let conditions = Conditions {
                timestamp,
                pollutants: Pollutants {
                    co,
                    no,
                    no2,
                    o3,
                    so2,
                    pm10,
                    nh3,
                },
                recent_pm25,
                recent_density,
            };

            let mut rng = ZoneRng::from_optional_seed(output.seed.or(resolved_config.seed));
            let assessment = assess(&provider, &conditions, &resolved_config, &mut rng.0)
                .context("failed to assess conditions")?;

            print_assessment(&assessment, output.format)?;
        }
        Commands::Score {
            pm25,
            traffic,
            output,
        } => {
            let resolved_config = load_config(output.config.as_deref())?;

            let mut rng = ZoneRng::from_optional_seed(output.seed.or(resolved_config.seed));
            let assessment = score(pm25, traffic, &resolved_config, &mut rng.0);

            print_assessment(&assessment, output.format)?;
        }
        Commands::Batch {
            path,
            models,
            seed,
            format,
            config: config_path,
        } => {
            let resolved_config = load_config(config_path.as_deref())?;
            let provider = load_models(&models, &resolved_config)?;

            let requests = features::load_requests(&path)?;
            log::info!(
                "Assessing {} request(s) from {}",
                requests.len(),
                path.display()
            );

            let assessments = assess_batch(
                &provider,
                &requests,
                &resolved_config,
                seed.or(resolved_config.seed),
            )
            .context("batch assessment failed")?;

            match format {
                OutputFormat::Json => println!("{}", render_json_batch(&assessments)),
                OutputFormat::Jsonl => print!("{}", render_jsonl(&assessments)),
                OutputFormat::Text => {
                    for (i, assessment) in assessments.iter().enumerate() {
                        if i > 0 {
                            println!();
                        }
                        print!("{}", render_text(assessment));
                    }
                }
            }
        }
        Commands::Zones {
            format,
            config: config_path,
        } => {
            let resolved_config = load_config(config_path.as_deref())?;

            match format {
                OutputFormat::Text => {
                    println!("{:<20} {:<9} {}", "ZONE", "LAT", "LON");
                    for zone in &resolved_config.zones {
                        println!(
                            "{:<20} {:<9.4} {:.4}",
                            zone.name, zone.latitude, zone.longitude
                        );
                    }
                    println!();
                    println!("Map center: {:.4}, {:.4}", MAP_CENTER.0, MAP_CENTER.1);
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&resolved_config.zones)
                        .context("failed to serialize zones to JSON")?;
                    println!("{}", json);
                }
                OutputFormat::Jsonl => {
                    anyhow::bail!("JSONL format is not supported for the zone listing");
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let cwd = std::env::current_dir()?;
                match path {
                    Some(p) => {
                        config::load_config_file(&p)?;
                        println!("Config valid: {}", p.display());
                    }
                    None => match config::discover_config(&cwd)? {
                        Some((_, p)) => println!("Config valid: {}", p.display()),
                        None => println!("No config file found. Using defaults."),
                    },
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print_resolved_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Load configuration from an explicit path or the working directory
fn load_config(config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let cwd = std::env::current_dir()?;
    let resolved =
        config::load_and_resolve(&cwd, config_path).context("failed to load configuration")?;
    if let Some(path) = &resolved.config_path {
        log::info!("Using config: {}", path.display());
    }
    Ok(resolved)
}

/// Load both models; any failure here is fatal for the process
fn load_models(args: &ModelArgs, config: &ResolvedConfig) -> anyhow::Result<ModelProvider> {
    let aqi_path = args
        .aqi_model
        .clone()
        .or_else(|| config.aqi_model.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AQI_MODEL));
    let traffic_path = args
        .traffic_model
        .clone()
        .or_else(|| config.traffic_model.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAFFIC_MODEL));

    ModelProvider::load(&aqi_path, &traffic_path).with_context(|| {
        format!(
            "cannot serve predictions without both models (pm2.5: {}, traffic: {})",
            aqi_path.display(),
            traffic_path.display()
        )
    })
}

fn print_assessment(
    assessment: &uhri_core::UhriAssessment,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(assessment)),
        OutputFormat::Json => println!("{}", render_json(assessment)),
        OutputFormat::Jsonl => {
            print!("{}", render_jsonl(std::slice::from_ref(assessment)))
        }
    }
    Ok(())
}

fn print_resolved_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Thresholds (inclusive upper bounds):");
    println!("  low: {}", resolved.thresholds.low);
    println!("  moderate: {}", resolved.thresholds.moderate);
    println!("  high: {}", resolved.thresholds.high);
    println!("  very_high: {}", resolved.thresholds.very_high);
    println!();
    println!("Zone simulation:");
    println!(
        "  perturbation: {} - {}",
        resolved.perturbation.min, resolved.perturbation.max
    );
    println!("  alpha: {}", resolved.alpha);
    println!(
        "  seed: {}",
        resolved
            .seed
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none (random)".to_string())
    );
    println!("  zones: {}", resolved.zones.len());
    println!();
    println!("Models:");
    println!(
        "  aqi: {}",
        resolved
            .aqi_model
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{} (default)", DEFAULT_AQI_MODEL))
    );
    println!(
        "  traffic: {}",
        resolved
            .traffic_model
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{} (default)", DEFAULT_TRAFFIC_MODEL))
    );
}

/// Parse `HH:MM` or `HH:MM:SS`
fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}': expected HH:MM or HH:MM:SS", s))
}
