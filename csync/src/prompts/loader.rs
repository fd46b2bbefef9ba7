//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

#[derive(Serialize)]
struct PlanContext<'a> {
    plan: &'a str,
}

#[derive(Serialize)]
struct NotesContext<'a> {
    notes: &'a str,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.campussync/prompts/`)
    user_dir: Option<PathBuf>,
    /// Project default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at `root`
    ///
    /// Looks for `.campussync/prompts/` and `prompts/` under `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".campussync/prompts");
        let repo_dir = root.join("prompts");

        Self {
            hbs: Self::engine(),
            user_dir: user_dir.exists().then_some(user_dir),
            repo_dir: repo_dir.exists().then_some(repo_dir),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Plans and notes are plain text; HTML escaping would mangle quotes and ampersands
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.campussync/prompts/{name}.pmt`
    /// 2. Project default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.repo_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context, trimmed
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|s| s.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Instructions for turning a syllabus into a study plan
    pub fn syllabus_plan(&self) -> Result<String> {
        self.render("syllabus-plan", &serde_json::json!({}))
    }

    /// First chat turn restating the current plan
    pub fn plan_context(&self, plan: &str) -> Result<String> {
        self.render("plan-context", &PlanContext { plan })
    }

    /// Instructions for summarizing an attached PDF
    pub fn note_summary(&self) -> Result<String> {
        self.render("note-summary", &serde_json::json!({}))
    }

    /// Instructions for summarizing pasted notes
    pub fn note_summary_text(&self, notes: &str) -> Result<String> {
        self.render("note-summary-text", &NotesContext { notes })
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}
