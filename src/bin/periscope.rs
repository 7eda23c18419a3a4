//! periscope CLI: ProwJob poller and build history.

use clap::{Parser, Subcommand};
use periscope::config::{Config, PollConfig};
use periscope::db::Db;
use periscope::engine::{Agent, AgentConfig, Poller};
use periscope::kube::KubeConnector;
use periscope::telemetry::{TelemetryConfig, init_telemetry};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "periscope", about = "Record ProwJob builds in Postgres")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll ProwJobs and sync new builds into Postgres
    Poll {
        /// Path to the polling configuration (TOML)
        #[arg(long)]
        config: PathBuf,
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Recorded build operations
    Builds {
        #[command(subcommand)]
        action: BuildsAction,
    },
}

#[derive(Subcommand)]
enum BuildsAction {
    /// List recorded builds, newest first
    List {
        /// Only builds of this job
        #[arg(long)]
        job: Option<String>,
        /// Maximum builds to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Poll { config, once } => cmd_poll(config, once).await,
        Command::Builds { action } => {
            let config = Config::from_env()?;
            let db = Db::connect(config.database_url.expose_secret(), 2).await?;

            match action {
                BuildsAction::List { job, limit } => cmd_builds_list(&db, job, limit).await,
            }
        }
    }
}

async fn cmd_poll(config_path: PathBuf, once: bool) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "periscope".to_string(),
        log_level: config.log_level.clone(),
        json_logs: config.json_logs,
    })?;

    let poll = PollConfig::load(&config_path)?;
    let Some(prow) = poll.prow else {
        warn!(config = %config_path.display(), "no polling driver configured, nothing to do");
        return Ok(());
    };

    let max_connections = u32::try_from(prow.workers).unwrap_or(u32::MAX);
    let db = Db::connect(config.database_url.expose_secret(), max_connections).await?;
    db.health_check().await?;
    info!("connected to postgresql database");

    let agent = Arc::new(Agent::new(
        Arc::new(KubeConnector::new(prow.cluster.clone())),
        Arc::new(db),
        AgentConfig::from(&prow),
    ));

    if once {
        let summary = agent.run_once().await?;
        info!(
            listed = summary.listed,
            changed = summary.changed,
            synced = summary.synced,
            "cycle complete"
        );
        return Ok(());
    }

    let poller = Poller::new(agent, prow.interval());

    let p = poller.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        p.shutdown();
    });

    poller.run().await;
    Ok(())
}

async fn cmd_builds_list(db: &Db, job: Option<String>, limit: i64) -> anyhow::Result<()> {
    let builds = db.list_builds(job.as_deref(), limit).await?;

    if builds.is_empty() {
        println!("No builds found.");
        return Ok(());
    }

    println!(
        "{:<40}  {:<8}  {:<10}  {:<7}  {:<16}  RECORDED",
        "JOB", "BUILD", "TYPE", "RESULT", "FINISHED"
    );
    println!("{}", "-".repeat(100));

    for build in &builds {
        let job_display = build.job.get(..40).unwrap_or(build.job.as_str());
        let result = match build.success {
            Some(true) => "pass",
            Some(false) => "fail",
            None => "-",
        };
        let finished = build
            .finished_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40}  {:<8}  {:<10}  {:<7}  {:<16}  {}",
            job_display,
            build.build,
            build.job_type.as_deref().unwrap_or("-"),
            result,
            finished,
            build.recorded_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!("\n{} build(s)", builds.len());
    Ok(())
}
