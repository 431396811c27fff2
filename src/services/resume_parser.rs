// src/services/resume_parser.rs
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{self, prompts, LanguageModel};
use crate::types::{Engine, ParsedResume, Profile};

/// Turns raw resume text into a [`Profile`]. Without a model, or when the
/// model fails, the profile comes back empty and flagged as degraded.
#[derive(Clone)]
pub struct ResumeParser {
    model: Option<Arc<dyn LanguageModel>>,
}

impl ResumeParser {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub async fn parse(&self, raw_text: &str) -> ParsedResume {
        if raw_text.trim().is_empty() {
            info!("Empty resume text; returning empty profile");
            return empty_profile(false);
        }

        let Some(model) = &self.model else {
            info!("Gemini unavailable: returning empty profile");
            return empty_profile(true);
        };

        let parts = prompts::parse_resume(raw_text);
        match llm::generate_json::<Profile>(model.as_ref(), &parts).await {
            Ok(profile) => {
                info!(
                    "Parsed resume with {} skills and {} experience entries",
                    profile.skills.len(),
                    profile.experience.len()
                );
                ParsedResume {
                    profile,
                    engine: Engine::Gemini,
                    degraded: false,
                }
            }
            Err(e) => {
                warn!("Resume parsing via {} failed: {}", model.model_id(), e);
                empty_profile(true)
            }
        }
    }
}

fn empty_profile(degraded: bool) -> ParsedResume {
    ParsedResume {
        profile: Profile::default(),
        engine: Engine::Empty,
        degraded,
    }
}
