use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

use job_agent::config::TransportMode;
use job_agent::ranking;
use job_agent::types::{JobPosting, Profile};
use job_agent::{start_web_server, AppConfig, ServiceKind};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "job_agent=info,rocket::server=off";

#[derive(Parser)]
#[command(name = "job-agent", about = "Resume to cover letter pipeline services")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one of the HTTP services
    Serve {
        #[arg(value_enum)]
        service: ServiceKind,
        /// Defaults to the service's standard port
        #[arg(short, long)]
        port: Option<u16>,
        /// YAML configuration file (defaults to ./config.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Rank a job list against a parsed resume with keyword overlap
    Rank {
        /// Profile JSON
        #[arg(long)]
        resume: PathBuf,
        /// JSON array of job postings
        #[arg(long)]
        jobs: PathBuf,
    },
}

fn init_tracing() -> Result<()> {
    let file_layer = match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();
    Ok(())
}

async fn serve(service: ServiceKind, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let port = port.unwrap_or_else(|| service.default_port());
    let colocated_port = (service == ServiceKind::All).then_some(port);

    let config = AppConfig::load(config_path.as_deref(), colocated_port)?;
    if config.mode == TransportMode::Mcp {
        anyhow::bail!("MODE=mcp is not supported by this build; set MODE=rest");
    }
    config.ensure_directories().await?;

    info!("Output directory: {}", config.output_dir.display());
    start_web_server(config, service, port).await
}

async fn rank_files(resume: PathBuf, jobs: PathBuf) -> Result<()> {
    let resume_text = tokio::fs::read_to_string(&resume)
        .await
        .with_context(|| format!("Failed to read file: {}", resume.display()))?;
    let jobs_text = tokio::fs::read_to_string(&jobs)
        .await
        .with_context(|| format!("Failed to read file: {}", jobs.display()))?;

    let profile: Profile = serde_json::from_str(&resume_text)
        .with_context(|| format!("Invalid profile JSON in {}", resume.display()))?;
    let postings: Vec<JobPosting> = serde_json::from_str(&jobs_text)
        .with_context(|| format!("Invalid job list JSON in {}", jobs.display()))?;

    let ranked = ranking::rank(&profile, &postings);
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Command::Serve {
            service,
            port,
            config,
        } => serve(service, port, config).await,
        Command::Rank { resume, jobs } => rank_files(resume, jobs).await,
    }
}
