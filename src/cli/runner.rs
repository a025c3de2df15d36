//! Command dispatch: wires importer -> classifier -> engine -> output

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::cli::{formatters, Cli, Commands, ConfigCommands, SimulationsCommands};
use crate::config::{default_config_path, SimulatorConfig};
use crate::db;
use crate::error::SimulatorError;
use crate::importers::parse_ledger_csv;
use crate::ledger::{classify_lines, summarize};
use crate::regimes::Activity;
use crate::reports::{export_to_csv, run_comparison};

/// Run the parsed CLI command
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Simulate {
            file,
            activity,
            config,
            save,
            export,
        } => handle_simulate(&file, &activity, config.as_deref(), save.as_deref(), export, cli.json),

        Commands::Classify { file } => handle_classify(&file, cli.json),

        Commands::Simulations { action } => match action {
            SimulationsCommands::List => handle_simulations_list(cli.json),
            SimulationsCommands::Show { name } => handle_simulations_show(&name, cli.json),
            SimulationsCommands::Remove { name } => handle_simulations_remove(&name),
        },

        Commands::Config { action } => match action {
            ConfigCommands::Init { path, force } => handle_config_init(path, force),
            ConfigCommands::Show { path } => handle_config_show(path, cli.json),
        },
    }
}

fn parse_activity(text: &str) -> Result<Activity> {
    Activity::from_str(text).map_err(|_| {
        SimulatorError::ValidationError(format!(
            "unknown activity {:?} (expected: comercio, industria, servicos, anexo-iv, anexo-v)",
            text
        ))
        .into()
    })
}

fn handle_simulate(
    file: &str,
    activity: &str,
    config_path: Option<&Path>,
    save: Option<&str>,
    export: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let activity = parse_activity(activity)?;
    let config = SimulatorConfig::load_or_default(config_path)?;

    let raw_lines = parse_ledger_csv(file)?;
    if raw_lines.is_empty() {
        return Err(anyhow!("no ledger lines found in {:?}", file));
    }
    info!("Simulating {} lines as {}", raw_lines.len(), activity.as_str());

    let report = run_comparison(&raw_lines, activity, &config);

    if json {
        println!("{}", formatters::format_comparison_json(&report));
    } else {
        println!("{}", formatters::format_comparison_table(&report));
    }

    if let Some(path) = export {
        std::fs::write(&path, export_to_csv(&report))
            .with_context(|| format!("Failed to write CSV export to {:?}", path))?;
        println!("{} Comparativo exportado para {:?}", "✓".green().bold(), path);
    }

    if let Some(name) = save {
        db::init_database(None)?;
        let conn = db::open_db(None)?;
        db::save_simulation(&conn, name, &raw_lines, &config, &report)?;
        println!("{} Simulação salva como {:?}", "✓".green().bold(), name);
    }

    Ok(())
}

fn handle_classify(file: &str, json: bool) -> Result<()> {
    let raw_lines = parse_ledger_csv(file)?;
    let classified = classify_lines(&raw_lines);
    let summary = summarize(&classified);

    if json {
        let payload = serde_json::json!({
            "lines": classified,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", formatters::format_classified_table(&classified, &summary));
    }

    Ok(())
}

fn handle_simulations_list(json: bool) -> Result<()> {
    db::init_database(None)?;
    let conn = db::open_db(None)?;
    let listings = db::list_simulations(&conn)?;

    if json {
        let payload: Vec<serde_json::Value> = listings
            .iter()
            .map(|l| {
                serde_json::json!({
                    "name": l.name,
                    "activity": l.activity.as_str(),
                    "best_regime": l.best_regime.as_str(),
                    "best_total": l.best_total.to_string(),
                    "reform_total": l.reform_total.to_string(),
                    "created_at": l.created_at.to_rfc3339(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", formatters::format_listings_table(&listings));
    }

    Ok(())
}

fn handle_simulations_show(name: &str, json: bool) -> Result<()> {
    db::init_database(None)?;
    let conn = db::open_db(None)?;

    let saved = db::load_simulation(&conn, name)?
        .ok_or_else(|| anyhow!("simulation {:?} not found", name))?;

    // Deterministic re-derivation from the stored inputs
    let report = run_comparison(&saved.lines, saved.activity, &saved.config);

    if json {
        println!("{}", formatters::format_comparison_json(&report));
    } else {
        println!(
            "\n{} Simulação {:?} (criada em {})",
            "▸".cyan().bold(),
            saved.name,
            saved.created_at.format("%d/%m/%Y %H:%M")
        );
        println!("{}", formatters::format_comparison_table(&report));
    }

    Ok(())
}

fn handle_simulations_remove(name: &str) -> Result<()> {
    db::init_database(None)?;
    let conn = db::open_db(None)?;

    if db::remove_simulation(&conn, name)? {
        println!("{} Simulação {:?} removida", "✓".green().bold(), name);
    } else {
        println!("{} Simulação {:?} não encontrada", "ℹ".blue().bold(), name);
    }

    Ok(())
}

fn handle_config_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => default_config_path()?,
    };

    if path.exists() && !force {
        return Err(anyhow!(
            "config file {:?} already exists (use --force to overwrite)",
            path
        ));
    }

    SimulatorConfig::default().save(&path)?;
    println!("{} Configuração padrão gravada em {:?}", "✓".green().bold(), path);
    Ok(())
}

fn handle_config_show(path: Option<PathBuf>, json: bool) -> Result<()> {
    let config = SimulatorConfig::load_or_default(path.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}
