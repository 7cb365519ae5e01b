use adprobe_core::config::Config;
use adprobe_core::{ListingsClient, Outcome, RunSummary, Runner, Scenario};
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use prettytable::{Table, row};
use serde::Serialize;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "adprobe", version)]
#[command(about = "Contract checks for the classified-ads listings API")]
struct Cli {
    /// Log every request and response.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios against the configured service
    Run {
        /// Scenario ids to run (e.g. TC-003); all when omitted.
        #[arg(long = "scenario", value_parser = parse_scenario)]
        scenarios: Vec<Scenario>,
        /// Seed for generated seller ids.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List known scenarios
    Scenarios {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print current configuration.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective config
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Serialize)]
struct ScenarioInfo {
    id: &'static str,
    title: &'static str,
}

fn parse_scenario(raw: &str) -> std::result::Result<Scenario, String> {
    Scenario::from_str(raw.trim()).map_err(|_| {
        let known = Scenario::all()
            .into_iter()
            .map(Scenario::id)
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown scenario {raw:?} (known: {known})")
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    execute(cli.command).await
}

/// Config is resolved only by the subcommands that use it, so a broken
/// config file or environment never blocks `scenarios`.
async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Doctor => {
                let report = Config::load()?.doctor();
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        },
        Commands::Scenarios { format } => {
            let infos: Vec<ScenarioInfo> = Scenario::all()
                .into_iter()
                .map(|s| ScenarioInfo {
                    id: s.id(),
                    title: s.title(),
                })
                .collect();
            emit_json_or_table(format, &infos, |items| {
                let mut table = Table::new();
                table.add_row(row!["id", "scenario"]);
                for item in items {
                    table.add_row(row![item.id, item.title]);
                }
                table
            })?;
        }
        Commands::Run {
            scenarios,
            seed,
            format,
        } => {
            let client = ListingsClient::new(Config::load()?)?;
            let mut runner = match seed {
                Some(seed) => Runner::seeded(client, seed),
                None => Runner::new(client),
            };
            let selected = if scenarios.is_empty() {
                Scenario::all()
            } else {
                scenarios
            };

            let summary = runner.run(&selected).await;
            emit_json_or_table(format, &summary, summary_table)?;

            if !summary.is_success() {
                return Err(anyhow!(
                    "{} of {} scenarios failed",
                    summary.failed(),
                    summary.reports.len()
                ));
            }
        }
    }

    Ok(())
}

fn emit_json_or_table<T: Serialize>(
    format: OutputFormat,
    value: &T,
    table_builder: impl FnOnce(&T) -> Table,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Table => {
            let table = table_builder(value);
            table.printstd();
        }
    }
    Ok(())
}

fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.add_row(row!["id", "scenario", "result", "elapsed", "detail"]);
    for report in &summary.reports {
        let (result, detail) = match &report.outcome {
            Outcome::Passed => ("PASS", String::new()),
            Outcome::Failed { message } => ("FAIL", message.clone()),
        };
        table.add_row(row![
            report.id,
            report.title,
            result,
            humantime::format_duration(report.elapsed()),
            detail
        ]);
    }
    table.add_row(row![
        "",
        "",
        format!("{}/{}", summary.passed(), summary.reports.len()),
        "",
        ""
    ]);
    table
}
