//! Dual-VAT reform projection (IBS/CBS + Imposto Seletivo)
//!
//! Consumption taxes are recomputed under the reform model with full
//! input-credit offsetting; income tax, payroll tax and employer charges
//! are carried over unchanged from the best current-regime baseline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ReformConfig;
use crate::ledger::{Classification, FinancialSummary, LineItem};

use super::{
    apply_rate, effective_rate, floor_zero, Regime, SimulationResult, TaxBreakdown, TaxLine,
};

/// Reform result: the regular simulation record plus the audit figures
/// for the two VAT legs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReformResult {
    pub result: SimulationResult,
    pub total_credits: Decimal,
    pub ibs_debit: Decimal,
    pub ibs_credit: Decimal,
    pub cbs_debit: Decimal,
    pub cbs_credit: Decimal,
}

/// Credit percentage for a line: the explicit per-line rate when present,
/// else the configured default
fn line_credit_pct(line: &LineItem, config: &ReformConfig) -> Decimal {
    line.vat_credit_pct.unwrap_or(config.default_credit_pct)
}

/// Compute the reform projection on top of the selected baseline
pub fn calculate(
    summary: &FinancialSummary,
    lines: &[LineItem],
    baseline: &SimulationResult,
    config: &ReformConfig,
) -> ReformResult {
    let revenue = summary.annual_revenue;
    // Deductions reduce the base uniformly for both VAT legs
    let base = revenue - summary.deductions;

    let ibs_debit = apply_rate(base, config.ibs);
    let cbs_debit = apply_rate(base, config.cbs);
    let seletivo = apply_rate(base, config.seletivo);

    // Per-line input credits: cost/expense analytical lines with a
    // non-zero credit percentage
    let mut ibs_credit = Decimal::ZERO;
    let mut cbs_credit = Decimal::ZERO;
    for line in lines.iter().filter(|l| {
        l.counts_in_totals()
            && matches!(
                l.classification,
                Classification::Cost | Classification::Expense
            )
    }) {
        let pct = line_credit_pct(line, config);
        if pct <= Decimal::ZERO {
            continue;
        }
        let eligible = apply_rate(line.magnitude(), pct);
        ibs_credit += apply_rate(eligible, config.ibs);
        cbs_credit += apply_rate(eligible, config.cbs);
    }

    let ibs_payable = floor_zero(ibs_debit - ibs_credit);
    let cbs_payable = floor_zero(cbs_debit - cbs_credit);
    let vat_total = ibs_payable + cbs_payable + seletivo;

    // Income taxation is assumed unaffected by the consumption-tax
    // reform: carry the baseline's non-consumption buckets unchanged
    let income_tax = baseline.breakdown.income_tax;
    let payroll_tax = baseline.breakdown.payroll_tax;
    let employer_charges = baseline.breakdown.employer_charges;

    let total = vat_total + income_tax + payroll_tax + employer_charges;

    let mut lines_out = vec![
        TaxLine::new("IBS", ibs_payable),
        TaxLine::new("CBS", cbs_payable),
    ];
    if seletivo > Decimal::ZERO {
        lines_out.push(TaxLine::new("Imposto Seletivo", seletivo));
    }
    lines_out.extend([
        TaxLine::new("IRPJ/CSLL (regime atual)", income_tax),
        TaxLine::new("Tributos s/ folha (regime atual)", payroll_tax),
        TaxLine::new("Encargos (regime atual)", employer_charges),
    ]);

    let notes = vec![format!(
        "Tributos sobre a renda e folha mantidos do regime base: {}",
        baseline.regime.label()
    )];

    ReformResult {
        result: SimulationResult {
            regime: Regime::ReformaTributaria,
            total_tax: total,
            effective_rate: effective_rate(total, revenue),
            breakdown: TaxBreakdown {
                sales_tax: vat_total,
                income_tax,
                payroll_tax,
                employer_charges,
            },
            lines: lines_out,
            notes,
            is_blocked: false,
        },
        total_credits: ibs_credit + cbs_credit,
        ibs_debit,
        ibs_credit,
        cbs_debit,
        cbs_credit,
    }
}
