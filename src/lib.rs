//! Job application agent: resume parsing, job ranking, job search and cover
//! letter drafting as small HTTP services, plus an orchestrator that chains
//! them.

pub mod config;
pub mod llm;
pub mod orchestrator;
pub mod ranking;
pub mod services;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use web::{start_web_server, ServiceKind};
