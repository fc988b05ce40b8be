use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use weatherboard::web::{self, AppState};
use weatherboard::{
    ForecastService, ForecastStore, OpenMeteoClient, PresetLocation, WeatherboardConfig,
    WeeklyForecast, logging,
};

#[derive(Debug, Parser)]
#[command(
    name = "weatherboard",
    version,
    about = "Seven-day weather dashboard for a handful of preset locations"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the dashboard (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch a fresh forecast and store it
    Fetch {
        /// Preset location, defaults to the configured one
        location: Option<String>,
        /// Fetch every preset location
        #[arg(long, conflicts_with = "location")]
        all: bool,
    },
    /// Print the stored forecast for a location
    Show { location: String },
    /// List the preset locations
    Locations,
}

fn build_service(config: &WeatherboardConfig) -> Result<Arc<ForecastService>> {
    let store = ForecastStore::open(&config.store.path)
        .with_context(|| format!("Failed to open forecast store at {}", config.store.path))?;
    let client = OpenMeteoClient::new(&config.weather).context("Failed to build HTTP client")?;
    let deadline = Duration::from_secs(u64::from(config.weather.fetch_deadline_seconds));
    Ok(Arc::new(
        ForecastService::new(Arc::new(client), store).with_fetch_deadline(deadline),
    ))
}

fn print_forecast(forecast: &WeeklyForecast) {
    println!(
        "{} ({}), retrieved {}",
        forecast.location,
        forecast.location.location().format_coordinates(),
        forecast.retrieved_at.format("%Y-%m-%d %H:%M UTC")
    );
    for day in &forecast.days {
        println!(
            "  {}  {} {:<28} {:>5.1}°C .. {:>5.1}°C  wind ≤ {:>5.1} km/h",
            day.tab_label(),
            day.icon().glyph(),
            day.weather_code.description(),
            day.temperature_min_c,
            day.temperature_max_c,
            day.wind_speed_max_kmh
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = WeatherboardConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Locations => {
            for preset in PresetLocation::ALL {
                let location = preset.location();
                println!(
                    "{:<10} {:<10} {:>22}  {}",
                    preset.slug(),
                    location.name,
                    location.format_coordinates(),
                    preset.timezone().name()
                );
            }
        }
        Command::Show { location } => {
            let location: PresetLocation = location.parse()?;
            let service = build_service(&config)?;
            let forecast = service.stored(location).await?;
            print_forecast(&forecast);
        }
        Command::Fetch { location, all } => {
            let service = build_service(&config)?;
            if all {
                let mut failures = 0;
                for (location, result) in service.refresh_all(PresetLocation::today).await {
                    match result {
                        Ok(forecast) => print_forecast(&forecast),
                        Err(e) => {
                            failures += 1;
                            eprintln!("{location}: {}", e.user_message());
                        }
                    }
                }
                if failures > 0 {
                    anyhow::bail!("{failures} location(s) could not be refreshed");
                }
            } else {
                let location: PresetLocation = match location {
                    Some(slug) => slug.parse()?,
                    None => config.default_location()?,
                };
                let forecast = service.refresh(location, location.today()).await?;
                print_forecast(&forecast);
            }
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState {
                service: build_service(&config)?,
                default_location: config.default_location()?,
            };
            web::run(state, &config.server).await?;
        }
    }

    Ok(())
}
