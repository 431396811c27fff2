// src/ranking/mod.rs
//! Scoring and ranking of job postings against a candidate profile

pub mod ranker;
pub mod scorer;
pub mod titles;

pub use ranker::{rank, HeuristicFallback, ModelBacked, Ranker, ScoringStrategy};
pub use scorer::{keyword_match, score, KeywordMatch};
pub use titles::{suggest_titles, titles_for};
