// src/types/mod.rs
//! Wire and domain types shared by every service

pub mod job;
pub mod lenient;
pub mod profile;
pub mod request;
pub mod response;

pub use job::{JobPosting, RankedJob};
pub use profile::{Education, Experience, Profile, Project};
pub use request::{
    CoverLetterRequest, LetterLength, ParseRequest, ProcessRequest, RankRequest, SearchRequest,
};
pub use response::{CoverLetterResponse, Engine, ParsedResume, RankResponse, SearchResponse};
