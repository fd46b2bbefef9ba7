//! Interactive plan refinement

use std::path::{Path, PathBuf};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::session::{ChatRole, PlanningSession, TurnOutcome};
use crate::upload::{SyllabusUpload, Upload};

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Regenerate,
    Quit,
}

/// Terminal front end for a [`PlanningSession`]
pub struct PlanRepl {
    session: PlanningSession,
    syllabus_path: PathBuf,
}

impl PlanRepl {
    pub fn new(session: PlanningSession, syllabus_path: impl Into<PathBuf>) -> Self {
        Self {
            session,
            syllabus_path: syllabus_path.into(),
        }
    }

    /// Generate the first plan, then loop on chat input until quit
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        self.regenerate().await;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Regenerate => self.regenerate().await,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.chat(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "CampusSync Study Planner".bright_cyan().bold());
        println!("Syllabus: {}", self.syllabus_path.display());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");
        debug!(%cmd, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/plan" => {
                match self.session.plan() {
                    Some(plan) => println!("\n{}\n", plan),
                    None => println!("{}", "No plan yet.".dimmed()),
                }
                SlashResult::Continue
            }
            "/history" => {
                self.print_history();
                SlashResult::Continue
            }
            "/events" => {
                self.print_events();
                SlashResult::Continue
            }
            "/regenerate" | "/r" => SlashResult::Regenerate,
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the planner", "/quit".yellow());
        println!("  {:14} Show the current plan", "/plan".yellow());
        println!("  {:14} Show the chat history", "/history".yellow());
        println!("  {:14} Show calendar events from the last structured reply", "/events".yellow());
        println!("  {:14} Generate a fresh plan from the syllabus", "/regenerate".yellow());
        println!();
        println!("Anything else is sent to the planner as a request to adjust the plan.");
        println!();
    }

    fn print_history(&self) {
        let history = self.session.history();
        if history.is_empty() {
            println!("{}", "No chat history.".dimmed());
            return;
        }

        println!();
        println!("{}", "Chat History:".bright_cyan());
        for (i, turn) in history.iter().enumerate() {
            let role = match turn.role {
                ChatRole::User => "You".bright_green(),
                ChatRole::Model => "Planner".bright_blue(),
            };
            println!("  {}. {}: {}", i + 1, role, preview(&turn.text, 60));
        }
        println!();
    }

    fn print_events(&self) {
        let calendar = self.session.calendar();
        if calendar.is_empty() {
            println!("{}", "No calendar events yet.".dimmed());
            return;
        }

        println!();
        for event in calendar.events() {
            println!("  {}  {}", event.date.to_string().yellow(), event.title);
        }
        println!();
    }

    async fn regenerate(&mut self) {
        let syllabus = match load_syllabus(&self.syllabus_path) {
            Ok(syllabus) => syllabus,
            Err(e) => {
                println!("{} {}", "Error:".red(), e);
                return;
            }
        };

        println!("{}", "Generating plan...".dimmed());
        match self.session.generate_plan(&syllabus).await {
            Ok(plan) => println!("\n{}\n", plan),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    async fn chat(&mut self, input: &str) {
        match self.session.send_chat(input).await {
            Ok(TurnOutcome::Reply(text)) => println!("\n{}\n", text),
            Ok(TurnOutcome::CalendarUpdated { event_count }) => {
                println!("\n{}", super::CALENDAR_CONFIRMATION.bright_green());
                println!("{}\n", format!("{} event(s) on the calendar. Use /events to view.", event_count).dimmed());
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }
}

/// Read and validate the syllabus file
fn load_syllabus(path: &Path) -> Result<SyllabusUpload, crate::upload::UploadError> {
    let upload = Upload::read(path)?;
    SyllabusUpload::accept(Some(upload))
}

fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        format!("{}...", head)
    } else {
        head
    }
}
