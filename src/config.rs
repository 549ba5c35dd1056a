use crate::predictor::Predictor;
use crate::source::FileSource;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "aqi_insights",
    version,
    about = "AQI prediction runner and insights reports"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: AppConfig,

    /// Omit to use the interactive menu.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    #[arg(
        long,
        env = "AQI_PREDICTED_PATH",
        default_value = "temp/predicted.csv",
        help = "File holding the latest predicted dataset"
    )]
    pub predicted: PathBuf,

    #[arg(
        long,
        env = "AQI_SAMPLE_PATH",
        default_value = "data/past_aqi_sample.csv",
        help = "Sample dataset used when no prediction exists, and as the past baseline"
    )]
    pub sample: PathBuf,

    #[arg(
        long,
        env = "AQI_PREDICTOR",
        default_value = "python",
        help = "Program that runs the prediction model"
    )]
    pub predictor: String,

    #[arg(
        long = "predictor-script",
        env = "AQI_PREDICTOR_SCRIPT",
        default_value = "python/predict_aqi.py",
        help = "Script passed as the predictor's first argument (empty to pass none)"
    )]
    pub predictor_script: String,

    #[arg(
        long = "out-dir",
        env = "AQI_OUT_DIR",
        default_value = ".",
        help = "Directory for generated reports"
    )]
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the prediction model on a historical CSV.
    Predict { input: PathBuf },
    /// Summary report with suggestions.
    Insights {
        #[arg(long, help = "Include the detailed action list")]
        enrich: bool,
    },
    /// Dashboard figures, optionally filtered.
    Dashboard {
        #[arg(long)]
        state: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        #[arg(long, help = "Year for the monthly comparison")]
        year: Option<i32>,
    },
}

impl AppConfig {
    pub fn source(&self) -> FileSource {
        FileSource::new(&self.predicted, &self.sample)
    }

    pub fn predictor(&self) -> Predictor {
        let script = Some(self.predictor_script.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Predictor {
            program: self.predictor.clone(),
            script,
            output: self.predicted.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "aqi_insights",
            "--predicted",
            "/tmp/p.csv",
            "--sample",
            "/tmp/s.csv",
            "--predictor",
            "python3",
            "--predictor-script",
            "",
            "--out-dir",
            "/tmp/out",
            "insights",
            "--enrich",
        ])
        .unwrap();
        assert_eq!(cli.config.predicted, PathBuf::from("/tmp/p.csv"));
        assert_eq!(cli.config.out_dir, PathBuf::from("/tmp/out"));
        assert!(matches!(cli.command, Some(Command::Insights { enrich: true })));

        let predictor = cli.config.predictor();
        assert_eq!(predictor.program, "python3");
        assert!(predictor.script.is_none());
        assert_eq!(predictor.output, PathBuf::from("/tmp/p.csv"));

        let source = cli.config.source();
        assert_eq!(source.sample, PathBuf::from("/tmp/s.csv"));
    }

    #[test]
    fn dashboard_month_is_range_checked() {
        let cli = Cli::try_parse_from(["aqi_insights", "dashboard", "--state", "Delhi", "--month", "3"]).unwrap();
        match cli.command {
            Some(Command::Dashboard { state, month, year }) => {
                assert_eq!(state.as_deref(), Some("Delhi"));
                assert_eq!(month, Some(3));
                assert_eq!(year, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["aqi_insights", "dashboard", "--month", "13"]).is_err());
    }

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["aqi_insights", "--predicted", "p.csv"]).unwrap();
        assert!(cli.command.is_none());
    }
}
