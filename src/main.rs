use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

mod cli;
mod config;

use cadencer::calendar::{CalendarOutcome, GenerateOptions, PlanSummary, generate_calendar};
use cadencer::domain::parse_question_block;
use cadencer::pipeline::LogPipeline;
use cadencer::scheduler::{RunStatus, WeeklyOptions, run_weekly_auto_schedule};
use cadencer::slots::{assign_slot, detect_schedule_conflicts, fix_all_conflicts, time_slot_label};
use cadencer::store::RosterStore;
use cadencer::{CadencerError, Result as CadencerResult};
use chrono::{Local, NaiveDate};
use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadencer")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("cadencer.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_store(config: &Config) -> CadencerResult<RosterStore> {
    RosterStore::open(&config.storage.data_dir)
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Assign { client } => handle_assign_command(client, config),
        Commands::Conflicts => handle_conflicts_command(config),
        Commands::FixConflicts => handle_fix_conflicts_command(config),
        Commands::Generate {
            client,
            start,
            years,
            max_per_location,
            preview,
        } => handle_generate_command(client, *start, *years, *max_per_location, *preview, config),
        Commands::RunWeekly { date } => handle_run_weekly_command(*date, config).await,
        Commands::ImportQuestions { client, file } => handle_import_questions_command(client, file, config),
    }
}

fn handle_assign_command(client_id: &str, config: &Config) -> Result<()> {
    info!("Assigning slot for client: {}", client_id);
    let mut store = open_store(config)?;

    let slot = assign_slot(&mut store, client_id)?;
    let time = time_slot_label(slot.time_slot).unwrap_or_else(|| format!("slot {}", slot.time_slot));
    println!(
        "{} {} -> {} at {}",
        "Assigned:".green(),
        client_id,
        slot.day_pair.label(),
        time
    );
    Ok(())
}

fn handle_conflicts_command(config: &Config) -> Result<()> {
    info!("Listing schedule conflicts");
    let store = open_store(config)?;

    let conflicts = detect_schedule_conflicts(&store)?;
    if conflicts.is_empty() {
        println!("{}", "No schedule conflicts".green());
        return Ok(());
    }

    println!("{} {}", "Conflicts found:".red(), conflicts.len());
    for conflict in &conflicts {
        println!("  {} at {}:", conflict.day_name.bold(), conflict.time_label);
        for client in &conflict.clients {
            println!("    {} ({}) [{}]", client.client_name, client.client_id, client.day_pair_label);
        }
    }
    Ok(())
}

fn handle_fix_conflicts_command(config: &Config) -> Result<()> {
    info!("Fixing schedule conflicts");
    let mut store = open_store(config)?;

    let report = fix_all_conflicts(&mut store)?;
    if report.conflicts_found == 0 {
        println!("{}", "No schedule conflicts".green());
    } else {
        println!(
            "{} {} conflicts, {} clients reassigned",
            "Fixed:".green(),
            report.conflicts_found,
            report.clients_reassigned
        );
    }
    Ok(())
}

fn handle_generate_command(
    client_id: &str,
    start: Option<NaiveDate>,
    years: Option<u32>,
    max_per_location: Option<usize>,
    preview: bool,
    config: &Config,
) -> Result<()> {
    info!("Generating calendar for client: {} (preview: {})", client_id, preview);
    let mut store = open_store(config)?;

    let configured_cap = match config.calendar.max_per_location {
        0 => None,
        cap => Some(cap),
    };
    let options = GenerateOptions {
        start_date: start,
        years_ahead: years.unwrap_or(config.calendar.years_ahead),
        max_per_location: max_per_location.or(configured_cap),
        preview,
    };

    match generate_calendar(&mut store, client_id, &options)? {
        CalendarOutcome::Preview(summary) => {
            println!("{}", "Preview (nothing written)".yellow());
            print_plan_summary(&summary);
        }
        CalendarOutcome::Persisted { summary, inserted } => {
            println!("{} {} items", "Generated:".green(), inserted);
            print_plan_summary(&summary);
        }
    }
    Ok(())
}

fn print_plan_summary(summary: &PlanSummary) {
    println!(
        "  planned: {}, already on file: {}, without a date: {}",
        summary.planned, summary.skipped_existing, summary.remaining
    );
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("  dates: {} .. {}", first, last);
    }
    for location in &summary.per_location {
        println!("  {}: {} items", location.location_name, location.planned);
    }
    if !summary.sample.is_empty() {
        println!("  sample:");
        for question in &summary.sample {
            println!("    {}", question);
        }
    }
}

async fn handle_run_weekly_command(date: Option<NaiveDate>, config: &Config) -> Result<()> {
    info!("Running weekly auto-schedule (date: {:?})", date);
    let mut store = open_store(config)?;

    let options = WeeklyOptions {
        today: date.unwrap_or_else(|| Local::now().date_naive()),
        client_delay: Duration::from_millis(config.scheduling.client_delay_ms),
        deadline: match config.scheduling.run_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        },
        ctas: config.ctas.clone(),
    };

    let report = run_weekly_auto_schedule(&mut store, &LogPipeline, options).await?;

    println!(
        "{} {} processed, {} successful, {} failed, {} skipped",
        "Weekly run:".green(),
        report.processed,
        report.successful,
        report.failed,
        report.skipped
    );
    for result in &report.results {
        let status = match result.status {
            RunStatus::Success => result.status.as_str().green(),
            RunStatus::Skipped => result.status.as_str().yellow(),
            RunStatus::Failed => result.status.as_str().red(),
        };
        let detail = match result.status {
            RunStatus::Success => format!(
                "{} @ {}",
                result.location.as_deref().unwrap_or("-"),
                result.scheduled_for.map(|d| d.to_string()).unwrap_or_default()
            ),
            _ => result.error.clone().unwrap_or_default(),
        };
        println!("  [{}] {}: {}", status, result.client_name, detail);
    }
    Ok(())
}

fn handle_import_questions_command(client_id: &str, file: &PathBuf, config: &Config) -> Result<()> {
    info!("Importing questions for client: {} from {}", client_id, file.display());
    let mut store = open_store(config)?;

    let text = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let questions = match parse_question_block(client_id, &text) {
        Ok(questions) => questions,
        Err(CadencerError::Validation(errors)) => {
            println!("{}", "Invalid question file:".red());
            for error in &errors {
                println!("  {}", error);
            }
            return Err(eyre::eyre!("{} invalid question lines", errors.len()));
        }
        Err(err) => return Err(err.into()),
    };

    store.require_client(client_id)?;
    store.replace_questions(client_id, &questions)?;
    println!("{} {} questions for {}", "Imported:".green(), questions.len(), client_id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
