// Entry point and high-level CLI flow.
//
// - `predict` runs the external model and replaces the predicted dataset.
// - `insights` and `dashboard` load whatever dataset is current, write their
//   reports, and print markdown previews.
// - With no subcommand, a numbered menu offers the same three actions.
mod aggregate;
mod config;
mod error;
mod insights;
mod loader;
mod output;
mod policy;
mod predictor;
mod source;
mod types;
mod util;

use aggregate::RecordFilter;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{AppConfig, Cli, Command};
use insights::{compute_dashboard, compute_insights, DashboardQuery, InsightsOptions};
use loader::LoadReport;
use source::DatasetSource;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Read a single line of input after printing `prompt`. `None` once the
/// input is closed.
fn read_line(input: &mut impl BufRead, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice(input: &mut impl BufRead) -> Option<String> {
    read_line(input, "Enter choice: ")
}

/// Ask a Y/N question until the user answers one or the other.
fn prompt_yes_no(input: &mut impl BufRead, question: &str) -> Option<bool> {
    loop {
        let resp = read_line(input, &format!("{} (Y/N): ", question))?.to_uppercase();
        match resp.as_str() {
            "Y" => return Some(true),
            "N" => return Some(false),
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(report.total_rows),
        util::format_int(report.loaded_rows)
    );
    if report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to missing state/area or unreadable cells.",
            util::format_int(report.skipped_rows)
        );
    }
    if report.coerced_rows > 0 {
        println!(
            "Warning: {} rows had a missing or invalid aqi_value and were counted as 0.",
            util::format_int(report.coerced_rows)
        );
    }
    println!();
}

fn prepare_out_dir(config: &AppConfig) -> Result<&Path> {
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating {}", config.out_dir.display()))?;
    Ok(config.out_dir.as_path())
}

/// Run the model on `input` and report what landed in the predicted slot.
fn handle_predict(config: &AppConfig, input: &Path) -> Result<()> {
    println!("Running prediction on {}...", input.display());
    let report = config
        .predictor()
        .run(input)
        .context("prediction failed")?;
    println!(
        "Prediction saved to {}.",
        config.predicted.display()
    );
    print_load_report(&report);
    Ok(())
}

fn announce(loaded: &source::Loaded) {
    println!(
        "Using {} dataset: {} ({} records)",
        loaded.origin,
        loaded.path.display(),
        util::format_int(loaded.dataset.len())
    );
    print_load_report(&loaded.report);
    if loaded.dataset.is_empty() {
        println!("Warning: the dataset has no usable rows; all figures will be 0.\n");
    }
}

fn handle_insights(config: &AppConfig, enrich: bool) -> Result<()> {
    let loaded = config.source().load()?;
    announce(&loaded);

    let report = compute_insights(&loaded.dataset, InsightsOptions { enrich });
    let out_dir = prepare_out_dir(config)?;
    let file = out_dir.join("insights.json");
    output::write_json(&file, &report).map_err(|e| anyhow!("writing {}: {}", file.display(), e))?;

    println!("Automated Insights");
    println!("Avg AQI: {}", report.avg_aqi);
    println!("Max AQI: {}", report.max_aqi);
    println!("% Poor/Severe days: {}%", report.percent_poor_severe);
    println!();
    output::preview_table("Most affected states", &report.top_states, insights::TOP_STATES);
    println!("Suggestion: {}", report.suggestion);
    if let Some(detail) = &report.enriched_suggestion {
        println!("\nDetailed suggestion: {}", detail);
    }
    println!("\nState-specific pollutant & purifier suggestion");
    for s in &report.state_summaries {
        let top = s
            .top_pollutants
            .first()
            .map(|p| p.pollutant.as_str())
            .unwrap_or("-");
        println!("- {}: top {} -> {}", s.state, top, s.purifier_suggestion);
    }
    println!("\n(Full report exported to {})\n", file.display());
    Ok(())
}

fn handle_dashboard(config: &AppConfig, query: &DashboardQuery) -> Result<()> {
    let source = config.source();
    let loaded = source.load()?;
    announce(&loaded);

    let baseline = source.baseline();
    let report = compute_dashboard(&loaded.dataset, query, baseline.as_ref());

    let out_dir = prepare_out_dir(config)?;
    let write_err = |path: &PathBuf, e: Box<dyn std::error::Error>| {
        anyhow!("writing {}: {}", path.display(), e)
    };
    let json = out_dir.join("dashboard.json");
    output::write_json(&json, &report).map_err(|e| write_err(&json, e))?;
    let areas = out_dir.join("area_averages.csv");
    output::write_csv(&areas, &report.area_averages).map_err(|e| write_err(&areas, e))?;
    let top = out_dir.join("top_areas.csv");
    output::write_csv(&top, &report.top_areas).map_err(|e| write_err(&top, e))?;
    let monthly = out_dir.join("monthly_comparison.csv");
    output::write_csv(&monthly, &report.monthly_comparison)
        .map_err(|e| write_err(&monthly, e))?;

    println!(
        "Dashboard (state: {}, month: {})",
        report.state.as_deref().unwrap_or("All"),
        report
            .month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "All".to_string())
    );
    println!(
        "Avg AQI {} | Max AQI {} | Days {} | Poor + Severe {}% | Good Days {}%",
        report.avg_aqi,
        report.max_aqi,
        util::format_int(report.total_days),
        report.percent_poor_severe,
        report.percent_good
    );
    if let Some(past) = report.past_avg_aqi {
        println!("Past avg AQI {} vs future avg AQI {}", past, report.avg_aqi);
    }
    println!(
        "Prominent pollutant: {} | Purifier suggestion: {}\n",
        report.top_pollutant.as_deref().unwrap_or("-"),
        report.purifier_suggestion
    );
    output::preview_table("Top 5 Polluted Areas", &report.top_areas, insights::TOP_AREAS);
    output::preview_table("Bottom 5 Cleanest Areas", &report.bottom_areas, insights::TOP_AREAS);
    output::preview_table(
        &format!("Monthly Comparison ({} vs {})", report.year, report.year - 1),
        &report.monthly_comparison,
        12,
    );
    println!("(Full tables exported to {})\n", out_dir.display());
    Ok(())
}

fn run_command(config: &AppConfig, command: Command) -> Result<()> {
    match command {
        Command::Predict { input } => handle_predict(config, &input),
        Command::Insights { enrich } => handle_insights(config, enrich),
        Command::Dashboard { state, month, year } => handle_dashboard(
            config,
            &DashboardQuery {
                filter: RecordFilter { state, month },
                year,
            },
        ),
    }
}

fn read_dashboard_query(input: &mut impl BufRead) -> Option<DashboardQuery> {
    let state = Some(read_line(input, "State (blank for all): ")?).filter(|s| !s.is_empty());
    let month = loop {
        let raw = read_line(input, "Month 1-12 (blank for all): ")?;
        if raw.is_empty() {
            break None;
        }
        match raw.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => break Some(m),
            _ => println!("Invalid month. Please enter 1-12 or leave blank."),
        }
    };
    Some(DashboardQuery {
        filter: RecordFilter { state, month },
        year: None,
    })
}

/// Numbered action menu. Returns when the user picks Exit or the input
/// closes.
fn menu(config: &AppConfig, input: &mut impl BufRead) {
    loop {
        println!("Select an action:");
        println!("[1] Run prediction on a CSV");
        println!("[2] Generate insights report");
        println!("[3] Generate dashboard report");
        println!("[4] Exit\n");
        let Some(choice) = read_choice(input) else {
            break;
        };
        let result = match choice.as_str() {
            "1" => match read_line(input, "Path to historical CSV: ") {
                Some(path) => handle_predict(config, Path::new(&path)),
                None => break,
            },
            "2" => match prompt_yes_no(input, "Include detailed suggestions") {
                Some(enrich) => handle_insights(config, enrich),
                None => break,
            },
            "3" => match read_dashboard_query(input) {
                Some(query) => handle_dashboard(config, &query),
                None => break,
            },
            "4" => break,
            _ => {
                println!("Invalid choice. Please enter 1 to 4.\n");
                continue;
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {:#}\n", e);
        }
    }
    println!("Exiting the program.");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(command) => run_command(&cli.config, command),
        None => {
            menu(&cli.config, &mut io::stdin().lock());
            Ok(())
        }
    }
}
