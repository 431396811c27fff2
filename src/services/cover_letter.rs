// src/services/cover_letter.rs
//! Cover letter drafting: model-written when possible, template otherwise

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{self, prompts, LanguageModel};
use crate::types::{CoverLetterRequest, CoverLetterResponse, Engine, LetterLength};

const MAX_BULLETS: usize = 4;
const SHORT_BULLETS: usize = 2;
const TOP_SKILLS: usize = 6;

const DEFAULT_BULLETS: [&str; 3] = [
    "Hands-on experience with cloud platforms and containerization.",
    "Proficiency in Python/Golang and modern CI/CD practices.",
    "Strong understanding of infrastructure as code and DevOps culture.",
];

const LONG_PARAGRAPH: &str = "I value collaborative environments, agile delivery, and clear \
communication. I am comfortable owning features end-to-end, writing tests, and documenting decisions.";

#[derive(Debug, Deserialize)]
struct ModelLetter {
    #[serde(default)]
    cover_letter_text: String,
}

#[derive(Clone)]
pub struct CoverLetterWriter {
    model: Option<Arc<dyn LanguageModel>>,
    output_dir: PathBuf,
}

impl CoverLetterWriter {
    pub fn new(model: Option<Arc<dyn LanguageModel>>, output_dir: PathBuf) -> Self {
        Self { model, output_dir }
    }

    /// Draft the letter and, when `as_file` is set, write it to the output
    /// directory. `used_engine` reports what actually produced the text.
    pub async fn generate(&self, request: &CoverLetterRequest, as_file: bool) -> Result<CoverLetterResponse> {
        let (text, engine) = match self.draft_with_model(request).await {
            Some(text) => (text, Engine::Gemini),
            None => {
                let today = chrono::Local::now().date_naive();
                (compose_template_letter(request, today), Engine::Template)
            }
        };

        let file_path = if as_file {
            let path = save_document(&self.output_dir, request.resume.display_name(), &text).await?;
            Some(path.display().to_string())
        } else {
            None
        };

        info!(
            "Drafted cover letter for {} using {:?}",
            request.resume.display_name(),
            engine
        );

        Ok(CoverLetterResponse {
            cover_letter_text: text,
            file_path,
            used_engine: engine,
            degraded: !engine.is_model(),
        })
    }

    async fn draft_with_model(&self, request: &CoverLetterRequest) -> Option<String> {
        let model = self.model.as_ref()?;
        let parts = prompts::cover_letter(request);

        match llm::generate_json::<ModelLetter>(model.as_ref(), &parts).await {
            Ok(letter) if !letter.cover_letter_text.trim().is_empty() => {
                Some(letter.cover_letter_text.trim().to_string())
            }
            Ok(_) => {
                warn!("Model returned an empty cover letter; using template");
                None
            }
            Err(e) => {
                warn!("Cover letter generation failed, using template: {}", e);
                None
            }
        }
    }
}

/// Highlights pulled from the job description: bullet lines, or lines long
/// enough to read as a requirement.
fn description_bullets(description: &str, limit: usize) -> Vec<String> {
    description
        .lines()
        .filter_map(|raw| {
            let line = raw.trim();
            let stripped = line
                .trim_start_matches(['•', '-', '–', ' '])
                .trim_end_matches(['•', '-', '–', ' '])
                .trim();
            let bulleted = line.starts_with(['•', '-', '–']);
            let wordy = stripped.split_whitespace().count() > 5;
            (!stripped.is_empty() && (bulleted || wordy)).then(|| stripped.to_string())
        })
        .take(limit)
        .collect()
}

/// Deterministic letter used when no model is available or it fails.
pub fn compose_template_letter(request: &CoverLetterRequest, today: NaiveDate) -> String {
    let resume = &request.resume;
    let job = &request.job;
    let name = resume.display_name();

    let mut sections: Vec<String> = Vec::new();

    if request.include_contact_header {
        let linkedin = if request.include_links {
            resume.linkedin.as_str()
        } else {
            ""
        };
        let contact: Vec<&str> = [resume.email.as_str(), resume.phone.as_str(), linkedin]
            .into_iter()
            .filter(|item| !item.is_empty())
            .collect();
        if contact.is_empty() {
            sections.push(name.to_string());
        } else {
            sections.push(format!("{}\n{}", name, contact.join(" | ")));
        }
    }

    sections.push(today.format("%B %d, %Y").to_string());

    let company = job.company.as_deref().filter(|c| !c.is_empty()).unwrap_or("your company");
    let title = if job.title.is_empty() { "open position" } else { job.title.as_str() };
    let location = job
        .location
        .as_deref()
        .filter(|l| !l.is_empty())
        .map(|l| format!(" ({})", l))
        .unwrap_or_default();
    sections.push(format!("Hiring Manager\n{}{}", company, location));
    sections.push("Dear Hiring Manager,".to_string());

    let mut opening = format!("I am excited to apply for the {} at {}.", title, company);
    if let Some(first) = resume.experience.first() {
        if !first.role.is_empty() || !first.company.is_empty() {
            opening.push_str(&format!(" I recently worked as {} at {}", first.role, first.company));
            if !first.years.is_empty() {
                opening.push_str(&format!(" ({})", first.years));
            }
            opening.push('.');
        }
    }
    let skills: Vec<&str> = resume.skills.iter().take(TOP_SKILLS).map(String::as_str).collect();
    if !skills.is_empty() {
        opening.push_str(&format!(" My core strengths include {}.", skills.join(", ")));
    }
    if request.length != LetterLength::Short {
        if let Some(project) = resume.projects.first().filter(|p| !p.name.is_empty()) {
            opening.push_str(&format!(" Notably, I built {}", project.name));
            if !project.description.is_empty() {
                opening.push_str(&format!(", {}", project.description.trim_end_matches('.')));
            }
            opening.push('.');
        }
    }
    sections.push(opening);

    let limit = match request.length {
        LetterLength::Short => SHORT_BULLETS,
        LetterLength::Medium | LetterLength::Long => MAX_BULLETS,
    };
    let mut bullets = description_bullets(&job.description, limit);
    if bullets.is_empty() {
        bullets = DEFAULT_BULLETS.iter().take(limit).map(|b| b.to_string()).collect();
    }
    let bullet_block: Vec<String> = bullets.iter().map(|b| format!("- {}", b)).collect();
    sections.push(format!(
        "After reviewing the job description, I believe I offer a strong match in:\n{}",
        bullet_block.join("\n")
    ));

    if request.length == LetterLength::Long {
        sections.push(LONG_PARAGRAPH.to_string());
    }

    sections.push(
        "I would welcome the opportunity to discuss how my background aligns with your goals. \
         Thank you for your time and consideration."
            .to_string(),
    );
    sections.push(format!("Sincerely,\n{}", name));

    sections.join("\n\n")
}

/// Letter file name: the candidate name reduced to `[A-Za-z0-9_-]`, a
/// timestamp and a random suffix so concurrent letters never share a path.
pub fn document_path(output_dir: &Path, candidate: &str) -> PathBuf {
    let safe_name: String = candidate
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let safe_name = if safe_name.is_empty() {
        "Cover_Letter".to_string()
    } else {
        safe_name
    };

    let suffix = Uuid::new_v4().simple().to_string();
    output_dir.join(format!(
        "{}_{}_{}.txt",
        safe_name,
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    ))
}

async fn save_document(output_dir: &Path, candidate: &str, text: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let path = document_path(output_dir, candidate);
    tokio::fs::write(&path, text)
        .await
        .with_context(|| format!("Failed to write cover letter: {}", path.display()))?;

    info!("Saved cover letter to {}", path.display());
    Ok(path)
}
