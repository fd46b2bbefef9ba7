//! CampusSync CLI entry point

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use campussync::cli::{Cli, Command, EventsCommand, get_log_path};
use campussync::config::Config;
use campussync::domain::{Calendar, CalendarEvent, SummaryArchive};
use campussync::gemini::{GeminiClient, GenerativeClient};
use campussync::planner::{PlanRepl, PlanningSession};
use campussync::prompts::PromptLoader;
use campussync::summarizer::NoteSummarizer;
use campussync::upload::{NoteSource, SyllabusUpload, Upload};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Log to file; stdout belongs to the REPL. Each command is a short run,
    // so append to keep earlier runs visible to `csync logs`.
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "CampusSync loaded config: model={}, max_attempts={}",
        config.llm.model, config.retry.max_attempts
    );

    match cli.command {
        Some(Command::Plan { syllabus }) => cmd_plan(&config, &syllabus).await,
        Some(Command::Summarize { file, text, save }) => cmd_summarize(&config, file, text, save).await,
        Some(Command::Summaries) => cmd_summaries(&config),
        Some(Command::Events { command }) => match command {
            EventsCommand::List {
                file,
                date,
                user,
                course,
            } => cmd_events_list(&file, date, user.as_deref(), course.as_deref()),
            EventsCommand::Add {
                file,
                title,
                date,
                user,
                course,
            } => cmd_events_add(&file, &title, date, user, course),
            EventsCommand::Dates { file } => cmd_events_dates(&file),
        },
        Some(Command::Config) => cmd_config(&config),
        Some(Command::Logs { lines }) => cmd_logs(lines),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn build_client(config: &Config) -> Result<Arc<dyn GenerativeClient>> {
    config.validate()?;
    let client = GeminiClient::from_config(config).context("Failed to create Gemini client")?;
    Ok(Arc::new(client))
}

fn prompt_loader() -> PromptLoader {
    std::env::current_dir()
        .map(PromptLoader::new)
        .unwrap_or_else(|_| PromptLoader::embedded_only())
}

/// Generate a plan and open the refinement chat
async fn cmd_plan(config: &Config, syllabus: &Path) -> Result<()> {
    SyllabusUpload::accept(Some(Upload::read(syllabus)?))?;
    let client = build_client(config)?;
    let session = PlanningSession::new(client, prompt_loader());
    PlanRepl::new(session, syllabus).run().await
}

/// Summarize a file or pasted text
async fn cmd_summarize(config: &Config, file: Option<PathBuf>, text: Option<String>, save: bool) -> Result<()> {
    // Validate the input before touching credentials or the network
    let source = match (file, text) {
        (Some(path), _) => NoteSource::from_upload(Upload::read(&path)?)?,
        (None, Some(text)) => NoteSource::Text(text),
        (None, None) => NoteSource::Text(String::new()),
    };
    if let NoteSource::Text(text) = &source
        && text.trim().is_empty()
    {
        eyre::bail!("No text to summarize.");
    }

    let summarizer = NoteSummarizer::new(build_client(config)?, prompt_loader());
    let record = summarizer.summarize(source).await?;

    println!("{} {}", record.title.bright_cyan().bold(), record.date.to_string().dimmed());
    println!();
    println!("{}", record.summary);

    if save {
        let archive = SummaryArchive::new(config.storage.summaries_path());
        archive.append(&record).context("Failed to save summary")?;
        println!();
        println!("{} {}", "Saved to".dimmed(), archive.path().display());
    }
    Ok(())
}

/// List archived summaries, oldest first
fn cmd_summaries(config: &Config) -> Result<()> {
    let archive = SummaryArchive::new(config.storage.summaries_path());
    let records = archive.list().context("Failed to read summary archive")?;

    if records.is_empty() {
        println!("No saved summaries in {}", archive.path().display());
        return Ok(());
    }

    for record in &records {
        println!("{} {}", record.date.to_string().yellow(), record.title.bright_cyan());
        println!("{}", record.summary);
        println!();
    }
    Ok(())
}

/// Filter a calendar file by date, user and course
fn cmd_events_list(file: &Path, date: Option<NaiveDate>, user: Option<&str>, course: Option<&str>) -> Result<()> {
    let calendar = Calendar::load(file).context(format!("Failed to load events from {}", file.display()))?;

    let mut events: Vec<&CalendarEvent> = match (user, course) {
        (Some(uid), course) => calendar.visible_to(uid, course),
        (None, Some(course)) => calendar.for_course(course),
        (None, None) => calendar.events().iter().collect(),
    };
    if let Some(date) = date {
        events.retain(|e| e.date == date);
    }
    events.sort_by_key(|e| e.date);

    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }

    for event in events {
        let owner = match (&event.for_uid, &event.for_course) {
            (Some(uid), _) => format!("user {}", uid),
            (None, Some(course)) => format!("course {}", course),
            (None, None) => String::new(),
        };
        println!("{}  {}  {}", event.date.to_string().yellow(), event.title, owner.dimmed());
    }
    Ok(())
}

/// Append one event to a calendar file
fn cmd_events_add(
    file: &Path,
    title: &str,
    date: NaiveDate,
    user: Option<String>,
    course: Option<String>,
) -> Result<()> {
    let mut event = CalendarEvent::new(title, date)?;
    if let Some(uid) = user {
        event = event.for_user(uid);
    }
    if let Some(course) = course {
        event = event.for_course(course);
    }

    let mut calendar =
        Calendar::load_or_empty(file).context(format!("Failed to load events from {}", file.display()))?;
    calendar.add(event);
    calendar
        .save(file)
        .context(format!("Failed to save events to {}", file.display()))?;

    println!("Added '{}' on {} ({} event(s) in {})", title, date, calendar.len(), file.display());
    Ok(())
}

/// Days with at least one event, as the dashboard highlights them
fn cmd_events_dates(file: &Path) -> Result<()> {
    let calendar = Calendar::load(file).context(format!("Failed to load events from {}", file.display()))?;
    for date in calendar.busy_dates() {
        println!("{}  {}", date.to_string().yellow(), calendar.events_on(date).len());
    }
    Ok(())
}

/// Print the effective configuration as YAML
fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

/// Show the last N log lines
fn cmd_logs(lines: usize) -> Result<()> {
    let log_path = get_log_path();

    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    let all_lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
    let start = all_lines.len().saturating_sub(lines);

    for line in &all_lines[start..] {
        println!("{}", line);
    }
    Ok(())
}
