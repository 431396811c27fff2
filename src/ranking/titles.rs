// src/ranking/titles.rs
//! Rule-based role title suggestions

use crate::types::Profile;

use super::scorer::tokenize;

pub const DEFAULT_TITLE: &str = "Software Engineer";
pub const MAX_SUGGESTIONS: usize = 5;

struct SuggestionRule {
    keywords: &'static [&'static str],
    title: &'static str,
}

const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        keywords: &["cloud", "azure", "aws", "gcp", "terraform"],
        title: "Cloud Engineer",
    },
    SuggestionRule {
        keywords: &["kubernetes", "docker", "devops", "ci/cd"],
        title: "DevOps Engineer",
    },
    SuggestionRule {
        keywords: &["machine learning", "ml", "tensorflow", "pytorch"],
        title: "Machine Learning Engineer",
    },
    SuggestionRule {
        keywords: &["ai", "rag", "langchain", "llm"],
        title: "AI Engineer",
    },
    SuggestionRule {
        keywords: &["data", "analytics", "sql", "etl", "warehouse"],
        title: "Data Engineer",
    },
    SuggestionRule {
        keywords: &["backend", "fastapi", "django", "golang", "go", "python", "api"],
        title: "Backend Engineer",
    },
    SuggestionRule {
        keywords: &["full stack", "react", "next.js", "typescript", "javascript"],
        title: "Full Stack Engineer",
    },
    SuggestionRule {
        keywords: &["frontend", "ui", "ux", "react", "javascript"],
        title: "Frontend Engineer",
    },
    SuggestionRule {
        keywords: &["web3", "blockchain", "solidity", "polygon", "nft"],
        title: "Blockchain Engineer",
    },
    SuggestionRule {
        keywords: &["security", "iam", "cybersecurity"],
        title: "Security Engineer",
    },
    SuggestionRule {
        keywords: &["product", "manager", "roadmap"],
        title: "Product Manager",
    },
];

/// Titles whose keywords occur in the resume, in rule order, capped at `limit`.
/// Falls back to [`DEFAULT_TITLE`].
pub fn suggest_titles(profile: &Profile, limit: usize) -> Vec<String> {
    let blob = profile.signal_text();
    if blob.is_empty() {
        return vec![DEFAULT_TITLE.to_string()];
    }
    let tokens = tokenize(&blob);

    let mut suggestions: Vec<String> = Vec::new();
    for rule in SUGGESTION_RULES {
        if suggestions.len() >= limit {
            break;
        }
        let hit = rule
            .keywords
            .iter()
            .any(|keyword| keyword_present(keyword, &blob, &tokens));
        if hit && !suggestions.iter().any(|title| title == rule.title) {
            suggestions.push(rule.title.to_string());
        }
    }

    if suggestions.is_empty() {
        suggestions.push(DEFAULT_TITLE.to_string());
    }
    suggestions
}

/// Short alphanumeric keywords ("go", "ai", "ml") must match a whole token so
/// that "google" or "email" do not trigger them; phrases match as substrings.
fn keyword_present(keyword: &str, blob: &str, tokens: &[String]) -> bool {
    if keyword.chars().all(char::is_alphanumeric) {
        tokens.iter().any(|token| token == keyword)
    } else {
        blob.contains(keyword)
    }
}

/// Titles already on the profile win; otherwise run the rules.
pub fn titles_for(profile: &Profile) -> Vec<String> {
    if profile.suggested_titles.is_empty() {
        suggest_titles(profile, MAX_SUGGESTIONS)
    } else {
        profile
            .suggested_titles
            .iter()
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(skills: &[&str]) -> Profile {
        Profile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Profile::default()
        }
    }

    #[test]
    fn test_empty_profile_gets_default() {
        assert_eq!(
            suggest_titles(&Profile::default(), MAX_SUGGESTIONS),
            vec![DEFAULT_TITLE]
        );
    }

    #[test]
    fn test_rules_fire_in_order() {
        let titles = suggest_titles(&profile(&["Python", "AWS", "Docker"]), MAX_SUGGESTIONS);
        assert_eq!(
            titles,
            vec!["Cloud Engineer", "DevOps Engineer", "Backend Engineer"]
        );
    }

    #[test]
    fn test_limit_is_respected() {
        let titles = suggest_titles(
            &profile(&["aws", "docker", "pytorch", "llm", "sql", "python", "react"]),
            3,
        );
        assert_eq!(titles.len(), 3);
    }

    #[test]
    fn test_short_keywords_need_whole_tokens() {
        let titles = suggest_titles(&profile(&["Google Sheets", "email"]), MAX_SUGGESTIONS);
        assert_eq!(titles, vec![DEFAULT_TITLE]);
    }

    #[test]
    fn test_phrases_match_as_substrings() {
        let titles = suggest_titles(&profile(&["CI/CD pipelines"]), MAX_SUGGESTIONS);
        assert_eq!(titles, vec!["DevOps Engineer"]);
    }

    #[test]
    fn test_profile_titles_take_precedence() {
        let mut p = profile(&["aws"]);
        p.suggested_titles = vec!["Site Reliability Engineer".to_string()];
        assert_eq!(titles_for(&p), vec!["Site Reliability Engineer"]);
    }
}
