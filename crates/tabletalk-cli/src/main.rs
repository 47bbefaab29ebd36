use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use tabletalk_core::schema::{ColumnInfo, TableSchema};
use tabletalk_core::settings::Settings;
use tabletalk_core::UserSkillConfig;
use tabletalk_engine::{CompileOutcome, SkillContext, SkillEngine};
use tabletalk_skill::{build_user_digest, check_digest_budget, digest_stats, DigestOptions};

/// TableTalk - natural-language analytics skill compiler
#[derive(Parser)]
#[command(name = "tabletalk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to settings file (default: tabletalk.toml)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a user skill config file
    Validate {
        /// Path to the skill config JSON
        config: PathBuf,
    },

    /// Render the prompt digest for a table
    Digest {
        /// Path to the skill config JSON
        config: PathBuf,

        /// Active table name
        #[arg(short, long)]
        table: String,
    },

    /// Compile a question into SQL
    Compile {
        /// The question, in natural language
        question: String,

        /// Path to a validated skill config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Active table name
        #[arg(short, long)]
        table: Option<String>,

        /// Comma-separated column names of the live table
        #[arg(long)]
        columns: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = if let Some(path) = &cli.settings {
        Settings::from_file(path)?
    } else if Path::new("tabletalk.toml").exists() {
        Settings::from_file(Path::new("tabletalk.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No settings file found, using defaults".yellow());
        }
        Settings::default()
    };

    match cli.command {
        Commands::Validate { config } => validate_command(&config, cli.verbose),
        Commands::Digest { config, table } => digest_command(&settings, &config, &table),
        Commands::Compile {
            question,
            config,
            table,
            columns,
        } => {
            compile_command(
                &settings,
                &question,
                config.as_deref(),
                table.as_deref(),
                columns.as_deref(),
            )
            .await
        }
    }
}

/// Load and validate a raw config file, printing every violation
fn load_config(path: &Path) -> Result<UserSkillConfig> {
    let raw = std::fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&raw)?;

    match tabletalk_skill::validate(&raw) {
        Ok(config) => Ok(config),
        Err(errors) => {
            for error in &errors {
                eprintln!("  {} {}", "✗".red(), error);
            }
            Err(anyhow::anyhow!(
                "config rejected with {} violation(s)",
                errors.len()
            ))
        }
    }
}

fn validate_command(path: &Path, verbose: bool) -> Result<()> {
    let config = load_config(path)?;

    println!(
        "{} {} table(s) validated",
        "✓".green(),
        config.tables.len()
    );
    if verbose {
        for (name, table) in &config.tables {
            println!(
                "  {} industry={} filters={} metrics={}",
                name.cyan(),
                table.industry,
                table.default_filters.len(),
                table.metrics.len()
            );
        }
    }

    Ok(())
}

fn digest_command(settings: &Settings, path: &Path, table: &str) -> Result<()> {
    let config = load_config(path)?;

    let options = DigestOptions {
        max_filters: settings.digest.max_filters,
        max_metrics: settings.digest.max_metrics,
        max_chars: settings.digest.max_chars,
    };
    let digest = build_user_digest(Some(&config), Some(table), &options);
    println!("{}", digest);

    let stats = digest_stats(&digest);
    let check = check_digest_budget(&digest);
    let status = if check.within_budget {
        "within budget".green()
    } else {
        "over budget".red()
    };
    eprintln!(
        "{} chars, {} lines ({} / {} limit, {})",
        stats.chars, stats.lines, check.chars, check.limit, status
    );

    Ok(())
}

async fn compile_command(
    settings: &Settings,
    question: &str,
    config_path: Option<&Path>,
    table: Option<&str>,
    columns: Option<&str>,
) -> Result<()> {
    let config = config_path.map(load_config).transpose()?;

    let schema = match (table, columns) {
        (Some(table), Some(columns)) => Some(TableSchema::new(
            table,
            columns
                .split(',')
                .map(|c| ColumnInfo::new(c.trim(), "UNKNOWN"))
                .collect(),
        )),
        _ => None,
    };

    let mut ctx = SkillContext::new(question);
    if let Some(table) = table {
        ctx = ctx.with_table(table);
    }
    if let Some(config) = &config {
        ctx = ctx.with_config(config);
    }
    if let Some(schema) = &schema {
        ctx = ctx.with_schema(schema);
    }

    let engine = SkillEngine::new(settings.clone());
    match engine.compile(&ctx).await {
        CompileOutcome::Success(plan) => {
            println!("{} {}", "archetype:".cyan(), plan.archetype);
            println!("{}", plan.sql);
            Ok(())
        }
        CompileOutcome::NeedClarification { message } => {
            println!("{} {}", "needs clarification:".yellow(), message);
            Ok(())
        }
        CompileOutcome::Error { message } => Err(anyhow::anyhow!("compilation failed: {message}")),
    }
}
