// src/ranking/scorer.rs
//! Deterministic keyword-overlap scoring

use crate::types::{JobPosting, Profile};

/// Result of matching one profile against one posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    /// Number of distinct profile skills found in the posting.
    pub score: usize,
    /// The matched skills, lowercase, in sorted order.
    pub matched: Vec<String>,
}

/// Lowercases and splits on every non-alphanumeric character.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Counts the profile skills that occur in the posting's title, description
/// and requirements, either as a substring of the lowercased text or as an
/// exact token sequence.
pub fn keyword_match(profile: &Profile, job: &JobPosting) -> KeywordMatch {
    let text = job.searchable_text().to_lowercase();
    let tokens = tokenize(&text);

    let matched: Vec<String> = profile
        .skill_set()
        .into_iter()
        .filter(|skill| skill_matches(skill, &text, &tokens))
        .collect();

    KeywordMatch {
        score: matched.len(),
        matched,
    }
}

pub fn score(profile: &Profile, job: &JobPosting) -> usize {
    keyword_match(profile, job).score
}

fn skill_matches(skill: &str, text: &str, tokens: &[String]) -> bool {
    if text.contains(skill) {
        return true;
    }

    // "node js" should still find "Node.js"
    let skill_tokens = tokenize(skill);
    !skill_tokens.is_empty()
        && tokens
            .windows(skill_tokens.len())
            .any(|window| window == skill_tokens.as_slice())
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
    fn test_tokenize() {
        assert_eq!(
            tokenize("Python, AWS & Node.js/TS"),
            vec!["python", "aws", "node", "js", "ts"]
        );
        assert!(tokenize(" -- ").is_empty());
    }

    #[test]
    fn test_python_aws_scores_two() {
        let job = JobPosting::new("Backend Engineer", "Python, AWS");
        let result = keyword_match(&profile(&["python", "aws"]), &job);
        assert_eq!(result.score, 2);
        assert_eq!(result.matched, vec!["aws", "python"]);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let job = JobPosting::new("Frontend", "React, CSS");
        assert_eq!(score(&profile(&["java"]), &job), 0);
    }

    #[test]
    fn test_case_and_duplicates_are_normalized() {
        let job = JobPosting::new("Data Engineer", "We use SQL and Airflow");
        assert_eq!(score(&profile(&["SQL", "sql ", "Airflow"]), &job), 2);
    }

    #[test]
    fn test_token_sequence_match() {
        let job = JobPosting::new("Full Stack", "Node.js services");
        assert_eq!(score(&profile(&["node js"]), &job), 1);
    }

    #[test]
    fn test_requirements_are_searched() {
        let mut job = JobPosting::new("Engineer", "");
        job.requirements = Some("Terraform, GCP".to_string());
        assert_eq!(score(&profile(&["gcp"]), &job), 1);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(score(&profile(&[]), &JobPosting::new("Rust", "Rust")), 0);
        assert_eq!(score(&profile(&["rust"]), &JobPosting::default()), 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let p = profile(&["go", "docker", "kubernetes"]);
        let job = JobPosting::new("Platform", "Docker and Kubernetes with Go");
        let first = keyword_match(&p, &job);
        for _ in 0..10 {
            assert_eq!(keyword_match(&p, &job), first);
        }
    }
}
