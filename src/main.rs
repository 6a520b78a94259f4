use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

mod classify;
mod config;
mod db;
mod error;
mod models;
mod recommend;
mod report;
mod repository;

use config::Config;
use repository::{TaskCatalog, TaskRepository};

#[derive(Parser)]
#[command(name = "task-insight")]
#[command(about = "Rule-based task performance review for company teams", long_about = None)]
struct Cli {
    /// Where task and team records come from
    #[arg(long, value_enum, default_value_t = Source::Sample, global = true)]
    source: Source,
    /// Team CSV file used by the csv source
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Optional TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Source {
    Sample,
    Csv,
    Postgres,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tasks
    Tasks,
    /// Show the team working on a task
    Team {
        #[arg(long)]
        task: String,
    },
    /// Run the performance analysis for a task
    Analyze {
        #[arg(long)]
        task: String,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Create or upgrade the database schema
    InitDb,
    /// Load the built-in sample tasks into Postgres
    Seed,
    /// Import team rows from a CSV file into Postgres
    Import {
        #[arg(long)]
        file: PathBuf,
    },
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config.database_url()?;
    PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_catalog(cli: &Cli, config: &Config) -> anyhow::Result<TaskCatalog> {
    match cli.source {
        Source::Sample => Ok(repository::sample_catalog()?),
        Source::Csv => {
            let path = cli
                .csv
                .as_deref()
                .context("--csv <PATH> is required with --source csv")?;
            repository::load_csv(path)
        }
        Source::Postgres => {
            let pool = connect(config).await?;
            db::load_catalog(&pool).await
        }
    }
}

fn emit(output: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Tasks => {
            let catalog = load_catalog(&cli, &config).await?;
            if catalog.is_empty() {
                println!("No tasks available.");
                return Ok(());
            }
            println!("Available tasks:");
            for name in catalog.task_names() {
                let task = catalog.fetch_task(name)?;
                let quota = match (task.target, task.achieved) {
                    (Some(target), Some(achieved)) if task.category.is_quota() => {
                        format!(", {achieved} of {target} achieved")
                    }
                    _ => String::new(),
                };
                println!(
                    "- {} [{}] team of {}{}",
                    task.name,
                    task.category,
                    task.team.len(),
                    quota
                );
            }
        }
        Commands::Team { task } => {
            let catalog = load_catalog(&cli, &config).await?;
            let task = catalog.fetch_task(task)?;
            print!("{}", report::render_team_table(task));
        }
        Commands::Analyze { task, format, out } => {
            let catalog = load_catalog(&cli, &config).await?;
            let task = catalog.fetch_task(task)?;
            let analysis = recommend::analyze(task)?;
            let output = match format {
                Format::Markdown => {
                    report::build_report(&analysis, chrono::Utc::now(), config.report.disclaimer)
                }
                Format::Json => report::render_json(&analysis)?,
            };
            emit(&output, out.as_deref())?;
        }
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { file } => {
            let pool = connect(&config).await?;
            let imported = db::import_csv(&pool, file).await?;
            println!("Imported {imported} team rows from {}.", file.display());
        }
    }

    Ok(())
}
