//! Ledger CSV importer
//!
//! Reads semicolon-delimited income-statement exports (Brazilian
//! accounting systems commonly emit Windows-1252 with `;` separators and
//! comma decimals). Columns are located by header keywords, rows that
//! fail to parse are warned and skipped, and untagged rows enter as
//! `Other` for the classifier to resolve.

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::SimulatorError;
use crate::ledger::{Classification, FiscalAdjustment, LineItem, LineKind, Section};

/// Parse a ledger CSV file into line items
pub fn parse_ledger_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<LineItem>> {
    let path = file_path.as_ref();
    info!("Parsing ledger CSV file: {:?}", path);

    let bytes = std::fs::read(path).context("Failed to open CSV file")?;
    let text = decode_text(&bytes);

    let mut reader = ReaderBuilder::new()
        .delimiter(b';') // Brazilian CSV often uses semicolon
        .flexible(true) // Allow variable number of columns
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    debug!("CSV headers: {:?}", headers);

    let columns = find_columns(&headers)?;
    debug!("Column mapping: {:?}", columns);

    let mut lines = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;

        match parse_csv_row(&record, &columns) {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping row {}: {}", idx + 2, e);
                continue;
            }
        }
    }

    info!("Successfully parsed {} ledger lines from CSV", lines.len());
    Ok(lines)
}

/// Accounting exports are frequently Windows-1252; fall back to it when
/// the bytes are not valid UTF-8
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

#[derive(Debug)]
struct CsvColumnMapping {
    description: usize,
    value: usize,
    section: Option<usize>,
    kind: Option<usize>,
    classification: Option<usize>,
    level: Option<usize>,
    pis_cofins_credit: Option<usize>,
    vat_credit_pct: Option<usize>,
    fiscal_adjustment: Option<usize>,
}

fn find_columns(headers: &csv::StringRecord) -> Result<CsvColumnMapping> {
    let mut description_idx = None;
    let mut value_idx = None;
    let mut section_idx = None;
    let mut kind_idx = None;
    let mut classification_idx = None;
    let mut level_idx = None;
    let mut credit_idx = None;
    let mut vat_idx = None;
    let mut adjustment_idx = None;

    for (idx, header) in headers.iter().enumerate() {
        let text = header.to_lowercase();

        if text.contains("descri") || text.contains("conta") || text.contains("historico") {
            description_idx.get_or_insert(idx);
        }

        if text.contains("valor") || text.contains("saldo") {
            value_idx.get_or_insert(idx);
        }

        if text.contains("secao") || text.contains("seção") || text.contains("demonstra") {
            section_idx = Some(idx);
        }

        // ANALYTICAL vs SYNTHETIC
        if text.contains("tipo") || text.contains("natureza") {
            kind_idx = Some(idx);
        }

        if text.contains("classifica") || text.contains("categoria") {
            classification_idx = Some(idx);
        }

        if text.contains("nivel") || text.contains("nível") {
            level_idx = Some(idx);
        }

        if text.contains("credito pis") || text.contains("crédito pis") || text.contains("pis_cofins")
        {
            credit_idx = Some(idx);
        }

        if text.contains("iva") || text.contains("ibs") || text.contains("credito_reforma") {
            vat_idx = Some(idx);
        }

        if text.contains("ajuste") || text.contains("lalur") {
            adjustment_idx = Some(idx);
        }
    }

    Ok(CsvColumnMapping {
        description: description_idx.ok_or_else(|| {
            SimulatorError::ParseError("Could not find description column in CSV headers".into())
        })?,
        value: value_idx.ok_or_else(|| {
            SimulatorError::ParseError("Could not find value column in CSV headers".into())
        })?,
        section: section_idx,
        kind: kind_idx,
        classification: classification_idx,
        level: level_idx,
        pis_cofins_credit: credit_idx,
        vat_credit_pct: vat_idx,
        fiscal_adjustment: adjustment_idx,
    })
}

fn field<'a>(record: &'a csv::StringRecord, idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| record.get(i)).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_csv_row(
    record: &csv::StringRecord,
    columns: &CsvColumnMapping,
) -> Result<Option<LineItem>> {
    let description = record
        .get(columns.description)
        .map(str::trim)
        .unwrap_or_default();
    if description.is_empty() {
        return Ok(None); // blank separator row
    }

    let raw_value = record
        .get(columns.value)
        .map(str::trim)
        .unwrap_or_default();
    let value = parse_brl_number(raw_value)
        .with_context(|| format!("invalid value {:?} for line {:?}", raw_value, description))?;

    let mut line = LineItem::new(description, value);

    if let Some(text) = field(record, columns.section) {
        line.section = Section::from_str(text)
            .map_err(|_| anyhow!("unknown section {:?}", text))?;
    }

    if let Some(text) = field(record, columns.kind) {
        line.kind = LineKind::from_str(text).map_err(|_| anyhow!("unknown line kind {:?}", text))?;
    }

    if let Some(text) = field(record, columns.classification) {
        line.classification = Classification::from_str(text)
            .map_err(|_| anyhow!("unknown classification {:?}", text))?;
    }

    if let Some(text) = field(record, columns.level) {
        line.level = text
            .parse()
            .with_context(|| format!("invalid level {:?}", text))?;
    }

    if let Some(text) = field(record, columns.pis_cofins_credit) {
        line.pis_cofins_credit = parse_flag(text);
    }

    if let Some(text) = field(record, columns.vat_credit_pct) {
        let pct = parse_brl_number(text)
            .with_context(|| format!("invalid VAT credit rate {:?}", text))?;
        if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
            return Err(anyhow!("VAT credit rate {} outside 0-100", pct));
        }
        line.vat_credit_pct = Some(pct);
    }

    if let Some(text) = field(record, columns.fiscal_adjustment) {
        line.fiscal_adjustment = Some(
            FiscalAdjustment::from_str(text)
                .map_err(|_| anyhow!("unknown fiscal adjustment {:?}", text))?,
        );
    }

    Ok(Some(line))
}

fn parse_flag(text: &str) -> bool {
    matches!(
        text.to_lowercase().as_str(),
        "1" | "x" | "s" | "sim" | "true" | "yes"
    )
}

/// Parse a number in Brazilian or plain format: "1.234,56", "1234.56",
/// "R$ -500,00" all work
pub fn parse_brl_number(text: &str) -> Result<Decimal> {
    let cleaned = text
        .replace("R$", "")
        .replace('\u{a0}', "")
        .replace(' ', "");
    if cleaned.is_empty() {
        return Err(anyhow!("empty number"));
    }

    let normalized = if cleaned.contains(',') {
        // Comma decimal: dots are thousands separators
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).map_err(|e| anyhow!("invalid number {:?}: {}", text, e))
}
