// src/types/profile.rs
//! Candidate profile as produced by the resume parser

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub suggested_titles: Vec<String>,
}

/// A work history entry. Parsers sometimes emit plain sentences instead of
/// objects; those land in `description`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExperienceRepr")]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub years: String,
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExperienceRepr {
    Text(String),
    Entry {
        #[serde(default, deserialize_with = "lenient::string")]
        company: String,
        #[serde(default, deserialize_with = "lenient::string")]
        role: String,
        #[serde(default, deserialize_with = "lenient::string")]
        title: String,
        #[serde(default, deserialize_with = "lenient::string")]
        years: String,
        #[serde(default, deserialize_with = "lenient::string")]
        description: String,
    },
}

impl From<ExperienceRepr> for Experience {
    fn from(repr: ExperienceRepr) -> Self {
        match repr {
            ExperienceRepr::Text(description) => Self {
                description,
                ..Self::default()
            },
            ExperienceRepr::Entry {
                company,
                role,
                title,
                years,
                description,
            } => Self {
                company,
                role: if role.is_empty() { title } else { role },
                years,
                description,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "lenient::string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub years: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tech: Vec<String>,
}

impl Profile {
    /// Skills trimmed, lowercased and deduplicated.
    pub fn skill_set(&self) -> BTreeSet<String> {
        self.skills
            .iter()
            .map(|skill| skill.trim().to_lowercase())
            .filter(|skill| !skill.is_empty())
            .collect()
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Candidate")
    }

    /// Every resume field joined into one lowercase blob, used for keyword rules.
    pub fn signal_text(&self) -> String {
        let mut pieces: Vec<&str> = self.skills.iter().map(String::as_str).collect();

        for exp in &self.experience {
            pieces.extend([
                exp.role.as_str(),
                exp.company.as_str(),
                exp.years.as_str(),
                exp.description.as_str(),
            ]);
        }
        for project in &self.projects {
            pieces.extend([project.name.as_str(), project.description.as_str()]);
            pieces.extend(project.tech.iter().map(String::as_str));
        }
        for edu in &self.education {
            pieces.extend([edu.degree.as_str(), edu.institution.as_str()]);
        }

        pieces
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Human-readable rendering handed to the model alongside the JSON form.
    pub fn textual_view(&self) -> String {
        let mut lines = Vec::new();

        if !self.summary.is_empty() {
            lines.push(format!("Summary: {}", self.summary));
        }
        if !self.skills.is_empty() {
            lines.push(format!("Skills: {}", self.skills.join(", ")));
        }
        for exp in &self.experience {
            lines.push(format!(
                "Experience: {}",
                join_present(&[
                    exp.role.as_str(),
                    exp.company.as_str(),
                    exp.years.as_str(),
                    exp.description.as_str(),
                ])
            ));
        }
        for edu in &self.education {
            lines.push(format!(
                "Education: {}",
                join_present(&[
                    edu.degree.as_str(),
                    edu.institution.as_str(),
                    edu.years.as_str(),
                ])
            ));
        }
        for project in &self.projects {
            let tech = project.tech.join(", ");
            lines.push(format!(
                "Project: {}",
                join_present(&[
                    project.name.as_str(),
                    project.description.as_str(),
                    tech.as_str(),
                ])
            ));
        }

        lines.join("\n")
    }
}

fn join_present(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_profile_shape() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Ada Lovelace",
            "summary": "Analyst",
            "skills": ["Python", " ", 42, null],
            "experience": [
                "Built analytical engines",
                {"company": "Babbage & Co", "title": "Engineer", "years": 3},
                17
            ],
            "education": "not a list",
            "projects": [{"name": "Notes", "tech": "rust"}]
        }))
        .unwrap();

        assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.summary, "Analyst");
        assert_eq!(profile.skills, vec!["Python", "42"]);
        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0].description, "Built analytical engines");
        assert_eq!(profile.experience[1].role, "Engineer");
        assert_eq!(profile.experience[1].years, "3");
        assert!(profile.education.is_empty());
        assert!(profile.projects[0].tech.is_empty());
    }

    #[test]
    fn test_empty_object_is_empty_profile() {
        let profile: Profile = serde_json::from_value(json!({})).unwrap();
        assert_eq!(profile, Profile::default());
        assert_eq!(profile.display_name(), "Candidate");
    }

    #[test]
    fn test_skill_set_normalizes() {
        let profile = Profile {
            skills: vec!["AWS".into(), "aws ".into(), "Python".into(), "".into()],
            ..Profile::default()
        };
        let skills: Vec<_> = profile.skill_set().into_iter().collect();
        assert_eq!(skills, vec!["aws", "python"]);
    }

    #[test]
    fn test_signal_text_is_lowercase() {
        let profile = Profile {
            skills: vec!["Terraform".into()],
            projects: vec![Project {
                name: "Infra".into(),
                description: String::new(),
                tech: vec!["GCP".into()],
            }],
            ..Profile::default()
        };
        assert_eq!(profile.signal_text(), "terraform infra gcp");
    }
}
