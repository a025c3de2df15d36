//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::db::SimulationListing;
use crate::ledger::{FinancialSummary, LineItem};
use crate::reports::ComparisonReport;
use crate::utils::{format_currency, format_rate_pct};

/// Format the four-way comparison for JSON output
pub fn format_comparison_json(report: &ComparisonReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the four-way comparison for terminal output
pub fn format_comparison_table(report: &ComparisonReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} Comparativo de regimes tributários\n\n",
        "⚖".cyan().bold()
    ));

    #[derive(Tabled)]
    struct RegimeRow {
        #[tabled(rename = "Regime")]
        regime: String,
        #[tabled(rename = "Carga Total")]
        total: String,
        #[tabled(rename = "Alíquota Efetiva")]
        effective: String,
        #[tabled(rename = "Situação")]
        status: String,
    }

    let rows: Vec<RegimeRow> = report
        .current_results()
        .into_iter()
        .chain([&report.reforma.result])
        .map(|result| {
            let status = if result.is_blocked {
                "Inaplicável".red().to_string()
            } else if result.regime == report.best_current {
                "Melhor regime atual".green().bold().to_string()
            } else {
                String::new()
            };
            RegimeRow {
                regime: result.regime.label().to_string(),
                total: if result.is_blocked {
                    "—".to_string()
                } else {
                    format_currency(result.total_tax)
                },
                effective: if result.is_blocked {
                    "—".to_string()
                } else {
                    format_rate_pct(result.effective_rate)
                },
                status,
            }
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .modify(Columns::new(1..3), Alignment::right())
        .to_string();
    output.push_str(&table);
    output.push('\n');

    // Detail of the best current regime
    let best = report.best_result();
    output.push_str(&format!(
        "\n{} Detalhamento - {}\n\n",
        "▸".cyan().bold(),
        best.regime.label()
    ));
    output.push_str(&format_tax_lines(best));

    // Reform detail with the credit audit figures
    let reform = &report.reforma;
    output.push_str(&format!(
        "\n{} Detalhamento - {}\n\n",
        "▸".cyan().bold(),
        reform.result.regime.label()
    ));
    output.push_str(&format_tax_lines(&reform.result));
    output.push_str(&format!(
        "\n  Débito IBS: {}   Crédito IBS: {}\n  Débito CBS: {}   Crédito CBS: {}\n  Créditos totais: {}\n",
        format_currency(reform.ibs_debit),
        format_currency(reform.ibs_credit),
        format_currency(reform.cbs_debit),
        format_currency(reform.cbs_credit),
        format_currency(reform.total_credits).green()
    ));

    let delta = report.reform_delta();
    let delta_text = if delta <= Decimal::ZERO {
        format!(
            "Reforma projeta redução de {} frente ao melhor regime atual",
            format_currency(-delta)
        )
        .green()
        .to_string()
    } else {
        format!(
            "Reforma projeta aumento de {} frente ao melhor regime atual",
            format_currency(delta)
        )
        .yellow()
        .to_string()
    };
    output.push_str(&format!("\n{}\n", delta_text));

    // Notes from every regime, in display order
    let notes: Vec<&String> = report
        .current_results()
        .into_iter()
        .chain([&report.reforma.result])
        .flat_map(|r| r.notes.iter())
        .collect();
    if !notes.is_empty() {
        output.push('\n');
        for note in notes {
            output.push_str(&format!("  {} {}\n", "ℹ".blue(), note));
        }
    }

    output
}

fn format_tax_lines(result: &crate::regimes::SimulationResult) -> String {
    #[derive(Tabled)]
    struct DetailRow {
        #[tabled(rename = "Tributo")]
        name: String,
        #[tabled(rename = "Valor")]
        amount: String,
    }

    let rows: Vec<DetailRow> = result
        .lines
        .iter()
        .map(|line| DetailRow {
            name: line.name.clone(),
            amount: format_currency(line.amount),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .modify(Columns::new(1..2), Alignment::right())
        .to_string()
        + "\n"
}

/// Format classified ledger lines and their summary for terminal output
pub fn format_classified_table(lines: &[LineItem], summary: &FinancialSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {} linhas classificadas\n\n",
        "✓".green().bold(),
        lines.len()
    ));

    #[derive(Tabled)]
    struct LineRow {
        #[tabled(rename = "Descrição")]
        description: String,
        #[tabled(rename = "Valor")]
        value: String,
        #[tabled(rename = "Classificação")]
        classification: String,
        #[tabled(rename = "Tipo")]
        kind: String,
    }

    let rows: Vec<LineRow> = lines
        .iter()
        .map(|line| LineRow {
            description: line.description.clone(),
            value: format_currency(line.value),
            classification: line.classification.label().to_string(),
            kind: line.kind.as_str().to_string(),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .modify(Columns::new(1..2), Alignment::right())
        .to_string();
    output.push_str(&table);

    output.push_str(&format!(
        "\n\nReceita anual: {}\nDeduções: {}\nFolha: {}\nCustos: {}\nDespesas: {}\n",
        format_currency(summary.annual_revenue),
        format_currency(summary.deductions),
        format_currency(summary.payroll_base),
        format_currency(summary.cost_of_goods),
        format_currency(summary.operating_expenses),
    ));
    if let Some(base) = summary.credit_base_override {
        output.push_str(&format!(
            "Base de créditos PIS/COFINS marcada: {}\n",
            format_currency(base)
        ));
    }

    output
}

/// Format saved-simulation listings for terminal output
pub fn format_listings_table(listings: &[SimulationListing]) -> String {
    if listings.is_empty() {
        return "Nenhuma simulação salva".to_string();
    }

    #[derive(Tabled)]
    struct ListingRow {
        #[tabled(rename = "Nome")]
        name: String,
        #[tabled(rename = "Atividade")]
        activity: String,
        #[tabled(rename = "Melhor Regime")]
        best: String,
        #[tabled(rename = "Carga Atual")]
        best_total: String,
        #[tabled(rename = "Carga Reforma")]
        reform_total: String,
        #[tabled(rename = "Criada em")]
        created_at: String,
    }

    let rows: Vec<ListingRow> = listings
        .iter()
        .map(|listing| ListingRow {
            name: listing.name.clone(),
            activity: listing.activity.as_str().to_string(),
            best: listing.best_regime.label().to_string(),
            best_total: format_currency(listing.best_total),
            reform_total: format_currency(listing.reform_total),
            created_at: listing.created_at.format("%d/%m/%Y %H:%M").to_string(),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .modify(Columns::new(3..5), Alignment::right())
        .to_string()
}
