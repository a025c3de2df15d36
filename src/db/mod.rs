// Database module - SQLite persistence of named simulations
//
// A saved simulation stores its full inputs (line set + configuration)
// as JSON and is re-run through the engine when shown again; only the
// headline totals are denormalized into columns for listing.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::config::SimulatorConfig;
use crate::ledger::LineItem;
use crate::regimes::{Activity, Regime};
use crate::reports::ComparisonReport;

/// Get the default database path (~/.tributo/simulations.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let tributo_dir = PathBuf::from(home).join(".tributo");

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&tributo_dir).context("Failed to create .tributo directory")?;

    Ok(tributo_dir.join("simulations.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = db_path.unwrap_or(get_default_db_path()?);
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Initialize the database with schema
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let path = db_path.unwrap_or(get_default_db_path()?);

    info!("Initializing database at: {:?}", path);

    let conn = open_db(Some(path))?;

    let schema_sql = include_str!("schema.sql");
    conn.execute_batch(schema_sql)
        .context("Failed to execute schema")?;

    Ok(())
}

/// Saved simulation inputs, as stored
#[derive(Debug, Clone)]
pub struct SavedSimulation {
    #[allow(dead_code)]
    pub id: i64,
    pub name: String,
    pub activity: Activity,
    pub lines: Vec<LineItem>,
    pub config: SimulatorConfig,
    pub created_at: DateTime<Utc>,
}

/// Listing row: no payloads, just the headline figures
#[derive(Debug, Clone)]
pub struct SimulationListing {
    #[allow(dead_code)]
    pub id: i64,
    pub name: String,
    pub activity: Activity,
    pub best_regime: Regime,
    pub best_total: Decimal,
    pub reform_total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Persist a simulation under a unique name
pub fn save_simulation(
    conn: &Connection,
    name: &str,
    lines: &[LineItem],
    config: &SimulatorConfig,
    report: &ComparisonReport,
) -> Result<i64> {
    let lines_json = serde_json::to_string(lines).context("Failed to serialize lines")?;
    let config_json = serde_json::to_string(config).context("Failed to serialize config")?;

    conn.execute(
        "INSERT INTO simulations (
            name, activity, lines_json, config_json,
            best_regime, best_total, reform_total, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            name,
            report.activity.as_str(),
            lines_json,
            config_json,
            report.best_current.as_str(),
            report.best_result().total_tax.to_string(),
            report.reforma.result.total_tax.to_string(),
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to save simulation {:?}", name))?;

    info!("Saved simulation {:?}", name);
    Ok(conn.last_insert_rowid())
}

/// List saved simulations, newest first
pub fn list_simulations(conn: &Connection) -> Result<Vec<SimulationListing>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, activity, best_regime, best_total, reform_total, created_at
         FROM simulations
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut listings = Vec::with_capacity(rows.len());
    for (id, name, activity, best_regime, best_total, reform_total, created_at) in rows {
        listings.push(SimulationListing {
            id,
            name,
            activity: Activity::from_str(&activity)
                .map_err(|_| anyhow!("corrupt activity value {:?}", activity))?,
            best_regime: Regime::from_str(&best_regime)
                .map_err(|_| anyhow!("corrupt regime value {:?}", best_regime))?,
            best_total: Decimal::from_str(&best_total).context("corrupt best_total")?,
            reform_total: Decimal::from_str(&reform_total).context("corrupt reform_total")?,
            created_at: parse_timestamp(&created_at)?,
        });
    }

    Ok(listings)
}

/// Load a saved simulation by name
pub fn load_simulation(conn: &Connection, name: &str) -> Result<Option<SavedSimulation>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, activity, lines_json, config_json, created_at
         FROM simulations
         WHERE name = ?1",
    )?;

    let row = stmt
        .query_row([name], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .optional()?;

    let Some((id, name, activity, lines_json, config_json, created_at)) = row else {
        return Ok(None);
    };

    Ok(Some(SavedSimulation {
        id,
        name,
        activity: Activity::from_str(&activity)
            .map_err(|_| anyhow!("corrupt activity value {:?}", activity))?,
        lines: serde_json::from_str(&lines_json).context("corrupt lines payload")?,
        config: serde_json::from_str(&config_json).context("corrupt config payload")?,
        created_at: parse_timestamp(&created_at)?,
    }))
}

/// Remove a saved simulation; returns whether it existed
pub fn remove_simulation(conn: &Connection, name: &str) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM simulations WHERE name = ?1", [name])
        .with_context(|| format!("Failed to remove simulation {:?}", name))?;
    Ok(affected > 0)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("corrupt timestamp {:?}", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Classification;
    use crate::regimes::Activity;
    use crate::reports::run_comparison;
    use rust_decimal_macros::dec;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("schema.sql")).unwrap();
        conn
    }

    fn sample() -> (Vec<LineItem>, SimulatorConfig, ComparisonReport) {
        let lines = vec![
            LineItem::tagged("Receita bruta", dec!(500000), Classification::Revenue),
            LineItem::tagged("Folha", dec!(-80000), Classification::Payroll),
        ];
        let config = SimulatorConfig::default();
        let report = run_comparison(&lines, Activity::Servicos, &config);
        (lines, config, report)
    }

    #[test]
    fn test_save_list_round_trip() {
        let conn = memory_db();
        let (lines, config, report) = sample();

        save_simulation(&conn, "cenario-base", &lines, &config, &report).unwrap();
        let listings = list_simulations(&conn).unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "cenario-base");
        assert_eq!(listings[0].activity, Activity::Servicos);
        assert_eq!(listings[0].best_regime, report.best_current);
        assert_eq!(listings[0].best_total, report.best_result().total_tax);
    }

    #[test]
    fn test_load_reruns_to_identical_report() {
        let conn = memory_db();
        let (lines, config, report) = sample();
        save_simulation(&conn, "cenario-base", &lines, &config, &report).unwrap();

        let saved = load_simulation(&conn, "cenario-base").unwrap().unwrap();
        let rerun = run_comparison(&saved.lines, saved.activity, &saved.config);

        assert_eq!(rerun.best_current, report.best_current);
        assert_eq!(rerun.best_result().total_tax, report.best_result().total_tax);
        assert_eq!(
            rerun.reforma.result.total_tax,
            report.reforma.result.total_tax
        );
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let conn = memory_db();
        let (lines, config, report) = sample();
        save_simulation(&conn, "dup", &lines, &config, &report).unwrap();
        assert!(save_simulation(&conn, "dup", &lines, &config, &report).is_err());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let conn = memory_db();
        assert!(load_simulation(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_remove_simulation() {
        let conn = memory_db();
        let (lines, config, report) = sample();
        save_simulation(&conn, "tmp", &lines, &config, &report).unwrap();

        assert!(remove_simulation(&conn, "tmp").unwrap());
        assert!(!remove_simulation(&conn, "tmp").unwrap());
        assert!(list_simulations(&conn).unwrap().is_empty());
    }
}
