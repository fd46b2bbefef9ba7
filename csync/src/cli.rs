//! CLI command definitions and subcommands

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// CampusSync - study planning and note summaries
#[derive(Parser)]
#[command(
    name = "csync",
    about = "Study plans from syllabi, note summaries, and calendar queries",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/campussync/logs/campussync.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Generate a study plan from a syllabus, then refine it by chat
    Plan {
        /// Syllabus file (.pdf, .jpeg or .docx)
        #[arg(value_name = "SYLLABUS")]
        syllabus: PathBuf,
    },

    /// Summarize notes from a PDF or text file, or pasted text
    Summarize {
        /// Notes file (.pdf or .txt)
        #[arg(value_name = "FILE", conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Notes text to summarize
        #[arg(short, long)]
        text: Option<String>,

        /// Append the summary to the local archive
        #[arg(short, long)]
        save: bool,
    },

    /// List archived summaries
    Summaries,

    /// Query or edit a JSON file of calendar events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },

    /// Print the effective configuration
    Config,

    /// Show recent log lines
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Calendar file subcommands
#[derive(Subcommand)]
pub enum EventsCommand {
    /// List events, optionally filtered
    List {
        /// JSON file holding an array of events
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only events on this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Events owned by this user id
        #[arg(short, long)]
        user: Option<String>,

        /// Events for this course
        #[arg(long)]
        course: Option<String>,
    },

    /// Add an event, creating the file if needed
    Add {
        /// JSON file holding an array of events
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Event title
        #[arg(short, long)]
        title: String,

        /// Event day (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Owning user id
        #[arg(short, long, conflicts_with = "course")]
        user: Option<String>,

        /// Owning course
        #[arg(long)]
        course: Option<String>,
    },

    /// List the days that carry at least one event
    Dates {
        /// JSON file holding an array of events
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Path of the log file written by the binary
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("campussync")
        .join("logs")
        .join("campussync.log")
}
