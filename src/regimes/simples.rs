//! Simples Nacional calculator (unified flat-bracket collection)

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::RateConfig;
use crate::ledger::FinancialSummary;
use crate::utils::{format_currency, format_rate_pct};

use super::tables::{find_bracket, Annex, SIMPLES_CEILING};
use super::{apply_rate, effective_rate, floor_zero, Activity, Regime, SimulationResult, TaxBreakdown, TaxLine};

/// Statutory-charges uplift applied to the payroll base for the Factor R
/// estimate (FGTS 8% + INSS patronal 20% over gross payroll)
fn factor_r_uplift() -> Decimal {
    Decimal::from_str("1.28").expect("static literal")
}

/// Payroll-to-revenue ratio at or above which qualified services fall
/// into Anexo III instead of Anexo V
fn factor_r_threshold() -> Decimal {
    Decimal::from_str("0.28").expect("static literal")
}

/// Annex for the activity; qualified services run the Factor R test
fn select_annex(
    activity: Activity,
    summary: &FinancialSummary,
    notes: &mut Vec<String>,
) -> Annex {
    match activity {
        Activity::Comercio => Annex::I,
        Activity::Industria => Annex::II,
        Activity::Servicos => Annex::III,
        Activity::ServicosAnexoIv => Annex::IV,
        Activity::ServicosAnexoV => {
            let revenue = summary.annual_revenue;
            let ratio = if revenue > Decimal::ZERO {
                summary.payroll_base * factor_r_uplift() / revenue
            } else {
                Decimal::ZERO
            };

            let annex = if ratio >= factor_r_threshold() {
                Annex::III
            } else {
                Annex::V
            };
            notes.push(format!(
                "Fator R de {} => tributação pelo {}",
                format_rate_pct(ratio),
                annex.label()
            ));
            annex
        }
    }
}

/// Compute the Simples Nacional result for the classified summary
pub fn calculate(
    summary: &FinancialSummary,
    activity: Activity,
    rates: &RateConfig,
) -> SimulationResult {
    let revenue = summary.annual_revenue;

    if revenue > *SIMPLES_CEILING {
        return SimulationResult::blocked(
            Regime::SimplesNacional,
            format!(
                "Receita bruta anual de {} excede o teto do Simples Nacional ({})",
                format_currency(revenue),
                format_currency(*SIMPLES_CEILING)
            ),
        );
    }

    let mut notes = Vec::new();
    let annex = select_annex(activity, summary, &mut notes);
    let bracket = find_bracket(annex, revenue);

    // Effective rate = (revenue x nominal - fixed deduction) / revenue,
    // floored at zero and guarded for zero revenue
    let das_rate = if revenue > Decimal::ZERO {
        floor_zero((apply_rate(revenue, bracket.rate) - bracket.deduction) / revenue)
    } else {
        Decimal::ZERO
    };
    let das = revenue * das_rate;

    // Anexo IV collects the CPP outside the unified document
    let cpp = if annex.cpp_outside_das() {
        apply_rate(summary.payroll_base, rates.inss_patronal)
    } else {
        Decimal::ZERO
    };

    // FGTS is always due outside the DAS, whatever the annex
    let fgts = apply_rate(summary.payroll_base, rates.fgts);

    let total = das + cpp + fgts;

    notes.push(format!(
        "{}: alíquota nominal de {} com parcela a deduzir de {}",
        annex.label(),
        format_rate_pct(bracket.rate / Decimal::ONE_HUNDRED),
        format_currency(bracket.deduction)
    ));

    let mut lines = vec![TaxLine::new("DAS (Simples Nacional)", das)];
    if cpp > Decimal::ZERO {
        lines.push(TaxLine::new("CPP (INSS patronal fora do DAS)", cpp));
    }
    lines.push(TaxLine::new("FGTS", fgts));

    SimulationResult {
        regime: Regime::SimplesNacional,
        total_tax: total,
        effective_rate: effective_rate(total, revenue),
        breakdown: TaxBreakdown {
            sales_tax: das,
            income_tax: Decimal::ZERO,
            payroll_tax: cpp,
            employer_charges: fgts,
        },
        lines,
        notes,
        is_blocked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn summary(revenue: Decimal, payroll: Decimal) -> FinancialSummary {
        FinancialSummary {
            annual_revenue: revenue,
            payroll_base: payroll,
            ..FinancialSummary::default()
        }
    }

    #[test]
    fn test_revenue_above_ceiling_blocks_regime() {
        let s = summary(dec!(4800001), dec!(0));
        let result = calculate(&s, Activity::Comercio, &RateConfig::presumido_default());
        assert!(result.is_blocked);
        assert_eq!(result.total_tax, Decimal::ZERO);
        assert!(result.notes[0].contains("teto"));
    }

    #[test]
    fn test_revenue_exactly_at_ceiling_is_allowed() {
        let s = summary(dec!(4800000), dec!(0));
        let result = calculate(&s, Activity::Comercio, &RateConfig::presumido_default());
        assert!(!result.is_blocked);
    }

    #[test]
    fn test_first_bracket_has_no_deduction() {
        // 100.000 x 4% = 4.000, no deduction in the first bracket
        let s = summary(dec!(100000), dec!(0));
        let result = calculate(&s, Activity::Comercio, &RateConfig::presumido_default());
        assert_eq!(result.breakdown.sales_tax, dec!(4000));
        assert_eq!(result.total_tax, dec!(4000));
    }

    #[test]
    fn test_effective_rate_applies_bracket_deduction() {
        // 1.000.000: Anexo I bracket 4 => (1M x 10,7% - 22.500) / 1M = 8,45%
        let s = summary(dec!(1000000), dec!(0));
        let result = calculate(&s, Activity::Comercio, &RateConfig::presumido_default());
        assert_eq!(result.breakdown.sales_tax, dec!(84500));
        assert_eq!(result.effective_rate, dec!(0.0845));
    }

    #[test]
    fn test_factor_r_above_threshold_uses_anexo_iii() {
        // payroll 250.000 x 1,28 / 1.000.000 = 0,32 >= 0,28
        let s = summary(dec!(1000000), dec!(250000));
        let result = calculate(&s, Activity::ServicosAnexoV, &RateConfig::presumido_default());
        assert!(result.notes.iter().any(|n| n.contains("Anexo III")));

        // Anexo III bracket 4: (1M x 16% - 35.640) / 1M
        assert_eq!(result.breakdown.sales_tax, dec!(124360));
    }

    #[test]
    fn test_factor_r_below_threshold_uses_anexo_v() {
        // payroll 100.000 x 1,28 / 1.000.000 = 0,128 < 0,28
        let s = summary(dec!(1000000), dec!(100000));
        let result = calculate(&s, Activity::ServicosAnexoV, &RateConfig::presumido_default());
        assert!(result.notes.iter().any(|n| n.contains("Anexo V")));

        // Anexo V bracket 4: (1M x 20,5% - 17.100) / 1M
        assert_eq!(result.breakdown.sales_tax, dec!(187900));
    }

    #[test]
    fn test_anexo_iv_adds_cpp_outside_das() {
        let rates = RateConfig::presumido_default();
        let s = summary(dec!(500000), dec!(120000));
        let result = calculate(&s, Activity::ServicosAnexoIv, &rates);

        // CPP = 120.000 x 20%, FGTS = 120.000 x 8%
        assert_eq!(result.breakdown.payroll_tax, dec!(24000));
        assert_eq!(result.breakdown.employer_charges, dec!(9600));

        // Anexo IV bracket 3: (500k x 10,2% - 12.420) = 38.580
        assert_eq!(result.breakdown.sales_tax, dec!(38580));
        assert_eq!(result.total_tax, dec!(38580) + dec!(24000) + dec!(9600));
    }

    #[test]
    fn test_other_annexes_do_not_add_cpp() {
        let rates = RateConfig::presumido_default();
        let s = summary(dec!(500000), dec!(120000));
        let result = calculate(&s, Activity::Servicos, &rates);
        assert_eq!(result.breakdown.payroll_tax, Decimal::ZERO);
        // FGTS still applies outside the DAS
        assert_eq!(result.breakdown.employer_charges, dec!(9600));
    }

    #[test]
    fn test_zero_revenue_yields_zero_das_but_keeps_payroll_charges() {
        let rates = RateConfig::presumido_default();
        let s = summary(dec!(0), dec!(50000));
        let result = calculate(&s, Activity::Servicos, &rates);
        assert_eq!(result.breakdown.sales_tax, Decimal::ZERO);
        assert_eq!(result.effective_rate, Decimal::ZERO);
        assert_eq!(result.breakdown.employer_charges, dec!(4000));
    }

    #[test]
    fn test_breakdown_buckets_sum_to_total() {
        let s = summary(dec!(2500000), dec!(400000));
        let result = calculate(&s, Activity::ServicosAnexoIv, &RateConfig::presumido_default());
        assert_eq!(result.breakdown.total(), result.total_tax);
    }
}
