//! Lucro Real calculator (income taxed on adjusted accounting profit)
//!
//! The profit derivation follows the statutory order: net revenue after
//! consumption taxes, operating result, financial result, then the LALUR
//! additions/exclusions before IRPJ/CSLL.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::RateConfig;
use crate::ledger::{FiscalAdjustment, FinancialSummary, LineItem};
use crate::utils::format_currency;

use super::{
    apply_rate, effective_rate, floor_zero, irpj_surtax_threshold, Activity, Regime,
    SimulationResult, TaxBreakdown, TaxLine,
};

/// Share of operating expenses presumed creditable when no explicit
/// credit base exists and the activity is not goods-based
fn default_expense_credit_share() -> Decimal {
    Decimal::from_str("0.20").expect("static literal")
}

/// PIS/COFINS credit base: explicit override, else COGS for goods and
/// industry, else 20% of operating expenses
fn credit_base(summary: &FinancialSummary, activity: Activity) -> Decimal {
    if let Some(base) = summary.credit_base_override {
        return base;
    }
    if activity.is_goods_based() {
        summary.cost_of_goods
    } else {
        summary.operating_expenses * default_expense_credit_share()
    }
}

/// Sum of magnitudes of analytical lines carrying the given LALUR flag
fn adjustment_total(lines: &[LineItem], flag: FiscalAdjustment) -> Decimal {
    lines
        .iter()
        .filter(|l| l.counts_in_totals() && l.fiscal_adjustment == Some(flag))
        .map(|l| l.magnitude())
        .sum()
}

/// Compute the Lucro Real result for the classified summary and line set
pub fn calculate(
    summary: &FinancialSummary,
    lines: &[LineItem],
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
    let charges_total = inss + rat + terceiros + fgts;

    // Non-cumulative PIS/COFINS: debit on net-of-deductions revenue,
    // credit on the credit base, floored independently per tax
    let debit_base = revenue - summary.deductions;
    let credits_on = credit_base(summary, activity);

    let pis_payable = floor_zero(apply_rate(debit_base, rates.pis) - apply_rate(credits_on, rates.pis));
    let cofins_payable =
        floor_zero(apply_rate(debit_base, rates.cofins) - apply_rate(credits_on, rates.cofins));

    notes.push(format!(
        "Base de créditos de PIS/COFINS considerada: {}",
        format_currency(credits_on)
    ));

    // Financial-revenue PIS/COFINS: separate rates, flat, no credit
    let pis_financial = apply_rate(summary.financial_revenue, rates.pis_financial);
    let cofins_financial = apply_rate(summary.financial_revenue, rates.cofins_financial);

    let (iss, icms) = if activity.is_goods_based() {
        (Decimal::ZERO, apply_rate(revenue, rates.icms))
    } else {
        (apply_rate(revenue, rates.iss), Decimal::ZERO)
    };
    let ipi = apply_rate(revenue, rates.ipi);

    // Profit derivation, in statutory order
    let net_revenue =
        revenue - summary.deductions - (pis_payable + cofins_payable + iss + icms + ipi);
    let operating_result = net_revenue
        - (summary.cost_of_goods + summary.operating_expenses + payroll + charges_total);
    let financial_result =
        summary.financial_revenue - pis_financial - cofins_financial - summary.financial_expense;
    let pre_tax_profit = operating_result + financial_result;

    // LALUR additions/exclusions over accounting profit
    let additions = adjustment_total(lines, FiscalAdjustment::Addition);
    let exclusions = adjustment_total(lines, FiscalAdjustment::Exclusion);
    if additions > Decimal::ZERO {
        notes.push(format!("Adições ao lucro real: {}", format_currency(additions)));
    }
    if exclusions > Decimal::ZERO {
        notes.push(format!("Exclusões do lucro real: {}", format_currency(exclusions)));
    }

    let adjusted = pre_tax_profit + additions - exclusions;
    let taxable_income = floor_zero(adjusted);
    if adjusted < Decimal::ZERO {
        notes.push("Prejuízo fiscal projetado: IRPJ/CSLL zerados no período".to_string());
    }

    let irpj = apply_rate(taxable_income, rates.irpj);
    let adicional = apply_rate(
        floor_zero(taxable_income - irpj_surtax_threshold()),
        rates.irpj_surtax,
    );
    let csll = apply_rate(taxable_income, rates.csll);

    let sales_taxes = pis_payable + cofins_payable + iss + icms + ipi + pis_financial + cofins_financial;
    let income_taxes = irpj + adicional + csll;
    let total = income_taxes + sales_taxes + inss + rat + terceiros + fgts;

    let mut lines_out = vec![
        TaxLine::new("PIS não cumulativo", pis_payable),
        TaxLine::new("COFINS não cumulativo", cofins_payable),
    ];
    if activity.is_goods_based() {
        lines_out.push(TaxLine::new("ICMS", icms));
    } else {
        lines_out.push(TaxLine::new("ISS", iss));
    }
    if ipi > Decimal::ZERO {
        lines_out.push(TaxLine::new("IPI", ipi));
    }
    lines_out.extend([
        TaxLine::new("PIS s/ receitas financeiras", pis_financial),
        TaxLine::new("COFINS s/ receitas financeiras", cofins_financial),
        TaxLine::new("IRPJ", irpj),
        TaxLine::new("Adicional de IRPJ", adicional),
        TaxLine::new("CSLL", csll),
        TaxLine::new("INSS patronal", inss),
        TaxLine::new("RAT", rat),
        TaxLine::new("Terceiros", terceiros),
        TaxLine::new("FGTS", fgts),
    ]);

    SimulationResult {
        regime: Regime::LucroReal,
        total_tax: total,
        effective_rate: effective_rate(total, revenue),
        breakdown: TaxBreakdown {
            sales_tax: sales_taxes,
            income_tax: income_taxes,
            payroll_tax: inss,
            employer_charges: rat + terceiros + fgts,
        },
        lines: lines_out,
        notes,
        is_blocked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Classification;
    use rust_decimal_macros::dec;

    fn base_summary() -> FinancialSummary {
        FinancialSummary {
            annual_revenue: dec!(1000000),
            cost_of_goods: dec!(300000),
            operating_expenses: dec!(200000),
            payroll_base: dec!(150000),
            ..FinancialSummary::default()
        }
    }

    fn rates() -> RateConfig {
        RateConfig::real_default()
    }

    #[test]
    fn test_credit_base_prefers_override() {
        let mut s = base_summary();
        s.credit_base_override = Some(dec!(123456));
        assert_eq!(credit_base(&s, Activity::Comercio), dec!(123456));
    }

    #[test]
    fn test_credit_base_uses_cogs_for_goods_and_expense_share_for_services() {
        let s = base_summary();
        assert_eq!(credit_base(&s, Activity::Industria), dec!(300000));
        // 20% of 200.000 operating expenses
        assert_eq!(credit_base(&s, Activity::Servicos), dec!(40000));
    }

    #[test]
    fn test_pis_cofins_payable_never_negative() {
        // Credit base equal to revenue - deductions drives payable to zero
        let mut s = base_summary();
        s.deductions = dec!(50000);
        s.credit_base_override = Some(dec!(950000));
        let result = calculate(&s, &[], Activity::Servicos, &rates());

        let pis = result
            .lines
            .iter()
            .find(|l| l.name.starts_with("PIS não"))
            .unwrap();
        let cofins = result
            .lines
            .iter()
            .find(|l| l.name.starts_with("COFINS não"))
            .unwrap();
        assert_eq!(pis.amount, Decimal::ZERO);
        assert_eq!(cofins.amount, Decimal::ZERO);
    }

    #[test]
    fn test_credit_larger_than_debit_floors_per_tax() {
        let mut s = base_summary();
        s.credit_base_override = Some(dec!(2000000));
        let result = calculate(&s, &[], Activity::Servicos, &rates());
        assert!(result
            .lines
            .iter()
            .filter(|l| l.name.starts_with("PIS não") || l.name.starts_with("COFINS não"))
            .all(|l| l.amount == Decimal::ZERO));
    }

    #[test]
    fn test_profit_derivation_order() {
        // Services, no deductions, no financial items, default rates.
        // credit base = 40.000 => PIS = (1M - 40k) x 1,65% = 15.840
        //                          COFINS = 960k x 7,6% = 72.960
        // ISS = 50.000
        // net revenue = 1M - (15.840 + 72.960 + 50.000) = 861.200
        // charges = 150k x (20% + 2% + 5,8% + 8%) = 53.700
        // operating = 861.200 - (300k + 200k + 150k + 53.700) = 157.500
        let s = base_summary();
        let result = calculate(&s, &[], Activity::Servicos, &rates());

        let irpj = result.lines.iter().find(|l| l.name == "IRPJ").unwrap();
        assert_eq!(irpj.amount, dec!(23625)); // 157.500 x 15%

        // taxable 157.500 < 240.000: no surtax
        let adicional = result
            .lines
            .iter()
            .find(|l| l.name == "Adicional de IRPJ")
            .unwrap();
        assert_eq!(adicional.amount, Decimal::ZERO);

        let csll = result.lines.iter().find(|l| l.name == "CSLL").unwrap();
        assert_eq!(csll.amount, dec!(14175)); // 157.500 x 9%
    }

    #[test]
    fn test_financial_subtax_hits_financial_result_not_sales_base() {
        let mut s = base_summary();
        s.financial_revenue = dec!(100000);
        s.financial_expense = dec!(20000);
        let result = calculate(&s, &[], Activity::Servicos, &rates());

        // PIS fin = 650, COFINS fin = 4.000
        let pis_fin = result
            .lines
            .iter()
            .find(|l| l.name == "PIS s/ receitas financeiras")
            .unwrap();
        assert_eq!(pis_fin.amount, dec!(650));
        let cofins_fin = result
            .lines
            .iter()
            .find(|l| l.name == "COFINS s/ receitas financeiras")
            .unwrap();
        assert_eq!(cofins_fin.amount, dec!(4000));

        // financial result = 100.000 - 650 - 4.000 - 20.000 = 75.350
        // taxable = 157.500 + 75.350 = 232.850 => IRPJ 34.927,50
        let irpj = result.lines.iter().find(|l| l.name == "IRPJ").unwrap();
        assert_eq!(irpj.amount, dec!(34927.50));
    }

    #[test]
    fn test_lalur_additions_and_exclusions() {
        let mut addition = LineItem::tagged("Multas indedutíveis", dec!(-10000), Classification::Expense);
        addition.fiscal_adjustment = Some(FiscalAdjustment::Addition);

        let mut exclusion =
            LineItem::tagged("Dividendos recebidos", dec!(5000), Classification::Other);
        exclusion.fiscal_adjustment = Some(FiscalAdjustment::Exclusion);

        let s = base_summary();
        let plain = calculate(&s, &[], Activity::Servicos, &rates());
        let adjusted = calculate(&s, &[addition, exclusion], Activity::Servicos, &rates());

        // taxable moves by +10.000 - 5.000 = +5.000 => IRPJ +750
        let irpj_plain = plain.lines.iter().find(|l| l.name == "IRPJ").unwrap().amount;
        let irpj_adjusted = adjusted.lines.iter().find(|l| l.name == "IRPJ").unwrap().amount;
        assert_eq!(irpj_adjusted - irpj_plain, dec!(750.00));
        assert!(adjusted.notes.iter().any(|n| n.contains("Adições")));
        assert!(adjusted.notes.iter().any(|n| n.contains("Exclusões")));
    }

    #[test]
    fn test_fiscal_loss_floors_taxable_income_to_zero() {
        let mut s = base_summary();
        s.operating_expenses = dec!(2000000);
        let result = calculate(&s, &[], Activity::Servicos, &rates());

        assert!(result.notes.iter().any(|n| n.contains("Prejuízo fiscal")));
        let irpj = result.lines.iter().find(|l| l.name == "IRPJ").unwrap();
        assert_eq!(irpj.amount, Decimal::ZERO);
        let csll = result.lines.iter().find(|l| l.name == "CSLL").unwrap();
        assert_eq!(csll.amount, Decimal::ZERO);
        // Consumption taxes and charges still apply
        assert!(result.total_tax > Decimal::ZERO);
    }

    #[test]
    fn test_surtax_on_taxable_income_above_threshold() {
        let mut s = base_summary();
        s.cost_of_goods = dec!(100000);
        // operating = 861.200 - (100k + 200k + 150k + 53.700) = 357.500
        let result = calculate(&s, &[], Activity::Servicos, &rates());
        let adicional = result
            .lines
            .iter()
            .find(|l| l.name == "Adicional de IRPJ")
            .unwrap();
        // (357.500 - 240.000) x 10% = 11.750
        assert_eq!(adicional.amount, dec!(11750.0));
    }

    #[test]
    fn test_total_is_monotone_in_rates() {
        let s = base_summary();
        let base = calculate(&s, &[], Activity::Comercio, &rates());

        let mut higher = rates();
        higher.icms = dec!(20);
        let bumped = calculate(&s, &[], Activity::Comercio, &higher);
        assert!(bumped.total_tax > base.total_tax);
    }

    #[test]
    fn test_breakdown_buckets_sum_to_total() {
        let mut s = base_summary();
        s.financial_revenue = dec!(30000);
        s.financial_expense = dec!(10000);
        s.deductions = dec!(40000);
        let result = calculate(&s, &[], Activity::Industria, &rates());
        assert_eq!(result.breakdown.total(), result.total_tax);
    }
}
