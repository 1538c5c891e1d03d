use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agriwater",
    version,
    about = "Irrigation needs from FAO-56 crop evapotranspiration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub field: FieldArgs,
}

/// Per-run overrides of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Field latitude in decimal degrees
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Field longitude in decimal degrees
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Crop name (see `agriwater crops`)
    #[arg(long, global = true)]
    pub crop: Option<String>,

    /// Phenological stage (initial, development, mid_season, late_season)
    #[arg(long, global = true)]
    pub stage: Option<String>,

    /// Field surface in hectares
    #[arg(long, global = true)]
    pub surface: Option<f64>,

    /// Days of history in the water balance [default: crop's max irrigation interval]
    #[arg(long, global = true)]
    pub period: Option<u32>,

    /// Irrigation efficiency in (0, 1]
    #[arg(long, global = true)]
    pub efficiency: Option<f64>,

    /// Missing data policy: raise, zero, interpolate or drop
    #[arg(long, global = true)]
    pub policy: Option<String>,

    /// Also write the result as CSV to this file
    #[arg(long, global = true)]
    pub export: Option<PathBuf>,
}

impl FieldArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(latitude) = self.latitude {
            config.location.latitude = latitude;
            config.location.name = None;
        }
        if let Some(longitude) = self.longitude {
            config.location.longitude = longitude;
            config.location.name = None;
        }
        if let Some(crop) = &self.crop {
            config.field.crop = crop.clone();
        }
        if let Some(stage) = &self.stage {
            config.field.stage = stage.clone();
        }
        if let Some(surface) = self.surface {
            config.field.surface_ha = surface;
        }
        if let Some(period) = self.period {
            config.analysis.period_days = Some(period);
        }
        if let Some(efficiency) = self.efficiency {
            config.analysis.efficiency = efficiency;
        }
        if let Some(policy) = &self.policy {
            config.analysis.missing_data_policy = policy.clone();
        }
    }

    /// Bare file names land in the configured output directory.
    pub fn export_path(&self, config: &Config) -> Option<PathBuf> {
        self.export.as_ref().map(|path| {
            let bare = path
                .parent()
                .map_or(true, |parent| parent.as_os_str().is_empty());
            if bare && !path.is_absolute() {
                config.export.output_dir.join(path)
            } else {
                path.clone()
            }
        })
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Compute and display the irrigation recommendation (default)
    Report,
    /// Show the normalized weather series with daily crop ETc
    Weather,
    /// List crops, stages and coefficients
    Crops,
    /// Run interactive setup
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_report() {
        let cli = Cli::try_parse_from(["agriwater"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn flags_override_config_values() {
        let cli = Cli::try_parse_from([
            "agriwater",
            "report",
            "--latitude",
            "48.8566",
            "--longitude",
            "-1.5",
            "--crop",
            "wheat",
            "--surface",
            "3.5",
            "--period",
            "10",
            "--policy",
            "drop",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Report));
        assert_eq!(cli.verbose, 2);

        let mut config = Config::default();
        cli.field.apply(&mut config);
        assert_eq!(config.location.latitude, 48.8566);
        assert_eq!(config.location.longitude, -1.5);
        assert_eq!(config.location.name, None);
        assert_eq!(config.field.crop, "wheat");
        assert_eq!(config.field.stage, "mid_season");
        assert_eq!(config.field.surface_ha, 3.5);
        assert_eq!(config.analysis.period_days, Some(10));
        assert_eq!(config.analysis.efficiency, 0.85);
        assert_eq!(config.analysis.missing_data_policy, "drop");
    }

    #[test]
    fn unset_flags_leave_config_untouched() {
        let mut config = Config::default();
        FieldArgs::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bare_export_names_go_to_the_output_dir() {
        let config = Config::default();
        let args = FieldArgs {
            export: Some(PathBuf::from("results.csv")),
            ..Default::default()
        };
        assert_eq!(
            args.export_path(&config),
            Some(PathBuf::from("output/results.csv"))
        );

        let args = FieldArgs {
            export: Some(PathBuf::from("reports/results.csv")),
            ..Default::default()
        };
        assert_eq!(
            args.export_path(&config),
            Some(PathBuf::from("reports/results.csv"))
        );
    }
}
