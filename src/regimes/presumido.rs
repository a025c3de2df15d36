//! Lucro Presumido calculator (income taxed on a statutory margin)

use rust_decimal::Decimal;

use crate::config::RateConfig;
use crate::ledger::FinancialSummary;
use crate::utils::format_currency;

use super::{
    apply_rate, effective_rate, floor_zero, irpj_surtax_threshold, Activity, Regime,
    SimulationResult, TaxBreakdown, TaxLine,
};

/// Compute the Lucro Presumido result for the classified summary
pub fn calculate(
    summary: &FinancialSummary,
    activity: Activity,
    rates: &RateConfig,
) -> SimulationResult {
    let revenue = summary.annual_revenue;
    let payroll = summary.payroll_base;
    let mut notes = Vec::new();

    // Employer charges over the payroll base
    let inss = apply_rate(payroll, rates.inss_patronal);
    let rat = apply_rate(payroll, rates.rat);
    let terceiros = apply_rate(payroll, rates.terceiros);
    let fgts = apply_rate(payroll, rates.fgts);

    // Presumed bases; financial revenue is added in full, no exclusion
    let base_irpj = apply_rate(revenue, rates.presumption_irpj) + summary.financial_revenue;
    let base_csll = apply_rate(revenue, rates.presumption_csll) + summary.financial_revenue;

    let irpj = apply_rate(base_irpj, rates.irpj);
    // Surtax applies to the IRPJ base only, not the CSLL base
    let adicional = apply_rate(
        floor_zero(base_irpj - irpj_surtax_threshold()),
        rates.irpj_surtax,
    );
    let csll = apply_rate(base_csll, rates.csll);

    if adicional > Decimal::ZERO {
        notes.push(format!(
            "Adicional de IRPJ sobre a base presumida que excede {}",
            format_currency(irpj_surtax_threshold())
        ));
    }

    // Cumulative PIS/COFINS, no credits under this regime
    let pis = apply_rate(revenue, rates.pis);
    let cofins = apply_rate(revenue, rates.cofins);

    let (iss, icms) = if activity.is_goods_based() {
        (Decimal::ZERO, apply_rate(revenue, rates.icms))
    } else {
        (apply_rate(revenue, rates.iss), Decimal::ZERO)
    };
    let ipi = apply_rate(revenue, rates.ipi);

    let sales_taxes = pis + cofins + iss + icms + ipi;
    let income_taxes = irpj + adicional + csll;
    let charges = rat + terceiros + fgts;
    let total = income_taxes + sales_taxes + inss + charges;

    let mut lines = vec![
        TaxLine::new("PIS", pis),
        TaxLine::new("COFINS", cofins),
    ];
    if activity.is_goods_based() {
        lines.push(TaxLine::new("ICMS", icms));
    } else {
        lines.push(TaxLine::new("ISS", iss));
    }
    if ipi > Decimal::ZERO {
        lines.push(TaxLine::new("IPI", ipi));
    }
    lines.extend([
        TaxLine::new("IRPJ", irpj),
        TaxLine::new("Adicional de IRPJ", adicional),
        TaxLine::new("CSLL", csll),
        TaxLine::new("INSS patronal", inss),
        TaxLine::new("RAT", rat),
        TaxLine::new("Terceiros", terceiros),
        TaxLine::new("FGTS", fgts),
    ]);

    SimulationResult {
        regime: Regime::LucroPresumido,
        total_tax: total,
        effective_rate: effective_rate(total, revenue),
        breakdown: TaxBreakdown {
            sales_tax: sales_taxes,
            income_tax: income_taxes,
            payroll_tax: inss,
            employer_charges: charges,
        },
        lines,
        notes,
        is_blocked: false,
    }
}
