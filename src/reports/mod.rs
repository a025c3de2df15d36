//! Four-way regime comparison: runs the calculators over a classified
//! line set and assembles the result the CLI renders and the database
//! stores.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SimulatorConfig;
use crate::ledger::{classify_lines, summarize, FinancialSummary, LineItem};
use crate::regimes::{
    presumido, real, reforma, select_best, simples, Activity, ReformResult, Regime,
    SimulationResult,
};
use crate::utils::format_amount;

/// Full output of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub activity: Activity,
    pub summary: FinancialSummary,
    pub simples: SimulationResult,
    pub presumido: SimulationResult,
    pub real: SimulationResult,
    /// Lowest-tax non-blocked current regime, baseline for the reform
    pub best_current: Regime,
    pub reforma: ReformResult,
}

impl ComparisonReport {
    pub fn current_results(&self) -> [&SimulationResult; 3] {
        [&self.simples, &self.presumido, &self.real]
    }

    pub fn best_result(&self) -> &SimulationResult {
        match self.best_current {
            Regime::SimplesNacional => &self.simples,
            Regime::LucroPresumido => &self.presumido,
            _ => &self.real,
        }
    }

    /// Reform total minus the best current-regime total; negative means
    /// the reform projects a lower burden
    pub fn reform_delta(&self) -> Decimal {
        self.reforma.result.total_tax - self.best_result().total_tax
    }
}

/// Classify, aggregate and run all four regime calculators
///
/// The line set is re-classified and re-aggregated on every call;
/// callers that edit lines simply call this again.
pub fn run_comparison(
    lines: &[LineItem],
    activity: Activity,
    config: &SimulatorConfig,
) -> ComparisonReport {
    let classified = classify_lines(lines);
    let summary = summarize(&classified);

    let simples = simples::calculate(&summary, activity, &config.presumido);
    let presumido = presumido::calculate(&summary, activity, &config.presumido);
    let real = real::calculate(&summary, &classified, activity, &config.real.0);

    let results = [simples, presumido, real];
    let best = select_best(&results);
    let best_current = best.regime;

    let reforma = reforma::calculate(&summary, &classified, best, &config.reforma);

    let [simples, presumido, real] = results;
    ComparisonReport {
        activity,
        summary,
        simples,
        presumido,
        real,
        best_current,
        reforma,
    }
}

/// Export the comparison to CSV (semicolon-delimited, Brazilian locale)
pub fn export_to_csv(report: &ComparisonReport) -> String {
    let mut csv = String::new();

    csv.push_str("Regime;Carga Total;Alíquota Efetiva;Situação\n");

    for result in report
        .current_results()
        .into_iter()
        .chain([&report.reforma.result])
    {
        let status = if result.is_blocked {
            "Inaplicável"
        } else if result.regime == report.best_current {
            "Melhor regime atual"
        } else {
            ""
        };
        csv.push_str(&format!(
            "{};{};{};{}\n",
            result.regime.label(),
            format_amount(result.total_tax),
            format_amount(result.effective_rate * Decimal::ONE_HUNDRED),
            status
        ));
    }

    csv.push_str("\nDetalhamento do melhor regime\n");
    for line in &report.best_result().lines {
        csv.push_str(&format!("{};{}\n", line.name, format_amount(line.amount)));
    }

    csv
}
