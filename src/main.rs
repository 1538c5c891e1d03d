mod cli;
mod config;
mod datasources;
mod error;
mod export;
mod logic;
mod models;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{CropCatalog, CropDatabase, OpenMeteoClient};
use error::Result;
use logic::IrrigationOrchestrator;
use models::readable_stage;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Commands::Report) {
        Commands::Init => {
            let crops = CropDatabase::bundled()?;
            Config::setup_interactive(&crops)?;
            Ok(())
        }
        Commands::Crops => list_crops(&load_config(&cli)?),
        Commands::Weather => show_weather(&load_config(&cli)?).await,
        Commands::Report => {
            let config = load_config(&cli)?;
            let export_path = cli.field.export_path(&config);
            report(&config, export_path).await
        }
    }
}

/// Config file with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.clone())?;
    cli.field.apply(&mut config);
    Ok(config)
}

fn build_orchestrator(config: &Config) -> Result<IrrigationOrchestrator<OpenMeteoClient>> {
    let crops = CropDatabase::load_or_bundled(config.crops.database.as_deref())?;
    let weather = OpenMeteoClient::new(&config.weather)?;
    IrrigationOrchestrator::new(weather, &crops, config.field_request())
}

async fn report(config: &Config, export_path: Option<std::path::PathBuf>) -> Result<()> {
    let mut orchestrator = build_orchestrator(config)?;
    let efficiency = config.analysis.efficiency;

    println!(
        "Location: {} {}",
        config.location.label(),
        orchestrator.location()
    );
    println!(
        "Crop: {} ({}), Kc {:.2}",
        orchestrator.crop().full_name,
        readable_stage(orchestrator.stage()),
        orchestrator.kc()
    );
    println!(
        "Missing data policy: {} ({})",
        orchestrator.policy(),
        orchestrator.policy().description()
    );

    let summary = orchestrator
        .generate_agronomic_summary(config.analysis.period_days, efficiency)
        .await?;
    ui::print_report(&summary)?;

    if let Some(path) = export_path {
        let record = orchestrator
            .export_record(Some(summary.period_days), efficiency)
            .await?;
        export::write_csv(&path, &[record])?;
        println!("Results exported to {}", path.display());
    }

    Ok(())
}

async fn show_weather(config: &Config) -> Result<()> {
    let mut orchestrator = build_orchestrator(config)?;
    if let Some(days) = config.analysis.period_days {
        orchestrator.fetch_weather_data(days).await?;
    }
    let days = orchestrator.weather_with_etc().await?;

    println!(
        "{} at {} (Kc {:.2}, policy {})",
        orchestrator.crop().full_name,
        orchestrator.location(),
        orchestrator.kc(),
        orchestrator.policy()
    );
    println!(
        "{:<12} {:>8} {:>8} {:>8}",
        "Date", "ET0 mm", "Rain mm", "ETc mm"
    );
    for day in &days {
        println!(
            "{:<12} {:>8.2} {:>8.2} {:>8.2}",
            day.date.format("%Y-%m-%d"),
            day.et0,
            day.precipitation,
            day.etc
        );
    }
    Ok(())
}

fn list_crops(config: &Config) -> Result<()> {
    let crops = CropDatabase::load_or_bundled(config.crops.database.as_deref())?;

    for name in crops.available_crops() {
        let profile = crops.crop(name)?;
        println!(
            "{} ({}) - irrigate every {}, cycle {} days",
            profile.full_name, name, profile.irrigation_interval, profile.total_cycle_days
        );
        if let Some(scientific) = &profile.scientific_name {
            println!("  {}", scientific);
        }
        for stage in profile.stage_names() {
            if let Some(coefficient) = profile.stage(stage) {
                println!(
                    "  {:<14} Kc {:.2}  {:>3} days",
                    readable_stage(stage),
                    coefficient.kc,
                    coefficient.duration_days
                );
            }
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_dispatched_as_its_own_command() {
        let cli = Cli::try_parse_from(["agriwater", "init"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Init));
    }

    #[test]
    fn load_config_layers_flags_over_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "field:\n  crop: maize\n  surface_ha: 4.0\n").unwrap();

        let cli = Cli::try_parse_from([
            "agriwater",
            "weather",
            "--config",
            path.to_str().unwrap(),
            "--crop",
            "wheat",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.field.crop, "wheat");
        assert_eq!(config.field.surface_ha, 4.0);
    }
}
