// src/services/mod.rs
//! Business logic behind each HTTP service

pub mod cover_letter;
pub mod job_search;
pub mod resume_parser;

pub use cover_letter::CoverLetterWriter;
pub use job_search::{JSearchClient, JobBoard, JobBoardError, JobSearchService};
pub use resume_parser::ResumeParser;
