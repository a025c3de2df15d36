//! Best-effort semantic classification of ledger lines and aggregation
//! into the financial summary consumed by the regime calculators.
//!
//! Classification is a pure transform: untagged analytical lines get a
//! keyword-derived tag, everything else passes through unchanged. Lines
//! that match nothing keep `Other` and feed no downstream aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::{Classification, LineItem};

/// Aggregated inputs for the regime calculators
///
/// Every field is the sum of absolute values of analytical lines carrying
/// the corresponding tag. Re-deriving from the same line set is idempotent
/// and order-independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub annual_revenue: Decimal,
    pub deductions: Decimal,
    /// Sales-tax expense as reported in the ledger (not recomputed)
    pub sales_tax_reported: Decimal,
    /// Income-tax expense as reported in the ledger (not recomputed)
    pub income_tax_reported: Decimal,
    pub payroll_base: Decimal,
    pub cost_of_goods: Decimal,
    pub operating_expenses: Decimal,
    pub financial_revenue: Decimal,
    pub financial_expense: Decimal,
    /// Explicit PIS/COFINS credit base from credit-flagged cost/expense
    /// lines; None when no line carries the flag
    pub credit_base_override: Option<Decimal>,
}

/// Lowercase and strip combining marks so "Devoluções" matches "devolucoes"
fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Word-boundary match for short tax acronyms ("iss" must not hit "comissoes")
fn has_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn any_word(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| has_word(haystack, w))
}

fn any_phrase(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| haystack.contains(p))
}

/// Keyword-derived tag for a single description, or None when nothing matches
fn classify_description(description: &str, value: Decimal) -> Option<Classification> {
    let text = normalize(description);

    // Financial lines first: "receitas financeiras" would otherwise hit the
    // revenue keywords below
    if any_phrase(&text, &["financeir", "rendimento de aplicac", "variacao cambial"])
        || any_word(&text, &["juros"])
    {
        return if value > Decimal::ZERO {
            Some(Classification::FinancialRevenue)
        } else {
            Some(Classification::FinancialExpense)
        };
    }

    // Returns and cancellations before revenue: "devolucao de vendas"
    if any_phrase(
        &text,
        &["devoluc", "cancelament", "abatiment", "desconto incondicional", "deducoes"],
    ) {
        return Some(Classification::Deduction);
    }

    if any_word(&text, &["irpj", "csll"])
        || any_phrase(&text, &["imposto de renda", "contribuicao social sobre o lucro"])
    {
        return Some(Classification::IncomeTax);
    }

    if any_word(&text, &["icms", "iss", "issqn", "pis", "cofins", "ipi"])
        || any_phrase(&text, &["simples nacional", "impostos sobre venda", "tributos sobre venda"])
    {
        return Some(Classification::SalesTax);
    }

    if any_word(&text, &["folha", "salarios", "salario", "fgts", "inss", "ferias"])
        || any_phrase(&text, &["pro-labore", "pro labore", "encargos trabalhistas", "13o salario"])
    {
        return Some(Classification::Payroll);
    }

    if any_word(&text, &["custo", "custos", "cmv", "cpv", "csp", "insumos"])
        || any_phrase(&text, &["materia-prima", "materia prima"])
    {
        return Some(Classification::Cost);
    }

    if any_phrase(
        &text,
        &[
            "receita bruta",
            "receita de venda",
            "receita operacional",
            "venda de mercadorias",
            "venda de produtos",
            "prestacao de servicos",
        ],
    ) || any_word(&text, &["faturamento", "receitas", "receita"])
    {
        return Some(Classification::Revenue);
    }

    // Any remaining negative, non-aggregate line reads as an expense
    if value < Decimal::ZERO {
        return Some(Classification::Expense);
    }

    None
}

/// Fill in a best-effort tag for untagged analytical lines
///
/// Already-tagged lines pass through untouched, so re-running over an
/// already-classified set is a no-op.
pub fn classify_lines(lines: &[LineItem]) -> Vec<LineItem> {
    lines
        .iter()
        .map(|line| {
            let mut line = line.clone();
            if line.classification == Classification::Other && line.counts_in_totals() {
                if let Some(tag) = classify_description(&line.description, line.value) {
                    line.classification = tag;
                }
            }
            line
        })
        .collect()
}

/// Sum analytical-line magnitudes per tag into the calculator inputs
pub fn summarize(lines: &[LineItem]) -> FinancialSummary {
    let mut summary = FinancialSummary::default();
    let mut credit_base = Decimal::ZERO;
    let mut has_credit_flag = false;

    for line in lines.iter().filter(|l| l.counts_in_totals()) {
        let amount = line.magnitude();
        match line.classification {
            Classification::Revenue => summary.annual_revenue += amount,
            Classification::Deduction => summary.deductions += amount,
            Classification::SalesTax => summary.sales_tax_reported += amount,
            Classification::IncomeTax => summary.income_tax_reported += amount,
            Classification::Payroll => summary.payroll_base += amount,
            Classification::Cost => summary.cost_of_goods += amount,
            Classification::Expense => summary.operating_expenses += amount,
            Classification::FinancialRevenue => summary.financial_revenue += amount,
            Classification::FinancialExpense => summary.financial_expense += amount,
            Classification::Other | Classification::Ignore => {}
        }

        if line.pis_cofins_credit
            && matches!(
                line.classification,
                Classification::Cost | Classification::Expense
            )
        {
            has_credit_flag = true;
            credit_base += amount;
        }
    }

    summary.credit_base_override = has_credit_flag.then_some(credit_base);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LineKind, Section};
    use rust_decimal_macros::dec;

    fn line(description: &str, value: Decimal) -> LineItem {
        LineItem::new(description, value)
    }

    #[test]
    fn test_keyword_classification_portuguese_accents() {
        let lines = vec![
            line("Receita Bruta de Vendas", dec!(100000)),
            line("Devoluções e Cancelamentos", dec!(-2000)),
            line("ICMS sobre Vendas", dec!(-18000)),
            line("Provisão para Imposto de Renda", dec!(-4000)),
            line("Salários e Ordenados", dec!(-30000)),
            line("Custo das Mercadorias Vendidas", dec!(-40000)),
            line("Receitas Financeiras", dec!(500)),
            line("Despesas Financeiras", dec!(-800)),
            line("Aluguel do galpão", dec!(-5000)),
        ];

        let classified = classify_lines(&lines);
        let tags: Vec<Classification> = classified.iter().map(|l| l.classification).collect();

        assert_eq!(
            tags,
            vec![
                Classification::Revenue,
                Classification::Deduction,
                Classification::SalesTax,
                Classification::IncomeTax,
                Classification::Payroll,
                Classification::Cost,
                Classification::FinancialRevenue,
                Classification::FinancialExpense,
                Classification::Expense,
            ]
        );
    }

    #[test]
    fn test_short_acronyms_require_word_boundaries() {
        // "Comissões" contains "iss" but is not a service tax line
        let classified = classify_lines(&[line("Comissões sobre vendas", dec!(-1000))]);
        assert_ne!(classified[0].classification, Classification::SalesTax);
    }

    #[test]
    fn test_positive_unmatched_line_stays_other() {
        let classified = classify_lines(&[line("Ajuste diverso", dec!(300))]);
        assert_eq!(classified[0].classification, Classification::Other);
    }

    #[test]
    fn test_already_tagged_lines_pass_through() {
        let tagged = LineItem::tagged("ICMS", dec!(-100), Classification::Expense);
        let classified = classify_lines(&[tagged]);
        // User override wins over the keyword match
        assert_eq!(classified[0].classification, Classification::Expense);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let lines = vec![
            line("Receita Bruta", dec!(50000)),
            line("Despesas gerais", dec!(-3000)),
        ];
        let once = classify_lines(&lines);
        let twice = classify_lines(&once);
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.classification, b.classification);
        }
    }

    #[test]
    fn test_summary_ignores_synthetic_and_aggregate_lines() {
        let mut subtotal = LineItem::tagged("Receita líquida", dec!(90000), Classification::Revenue);
        subtotal.kind = LineKind::Synthetic;

        let mut group = LineItem::tagged("Total de custos", dec!(-40000), Classification::Cost);
        group.is_aggregate = true;

        let lines = vec![
            LineItem::tagged("Receita bruta", dec!(100000), Classification::Revenue),
            subtotal,
            group,
            LineItem::tagged("CMV", dec!(-35000), Classification::Cost),
        ];

        let summary = summarize(&lines);
        assert_eq!(summary.annual_revenue, dec!(100000));
        assert_eq!(summary.cost_of_goods, dec!(35000));
    }

    #[test]
    fn test_summary_is_order_independent() {
        let mut lines = vec![
            LineItem::tagged("Receita bruta", dec!(70000), Classification::Revenue),
            LineItem::tagged("Receita de serviços", dec!(30000), Classification::Revenue),
            LineItem::tagged("Folha", dec!(-20000), Classification::Payroll),
        ];
        let forward = summarize(&lines);
        lines.reverse();
        let backward = summarize(&lines);
        assert_eq!(forward, backward);
        assert_eq!(forward.annual_revenue, dec!(100000));
    }

    #[test]
    fn test_credit_base_override_only_from_flagged_lines() {
        let mut flagged = LineItem::tagged("Insumos", dec!(-10000), Classification::Cost);
        flagged.pis_cofins_credit = true;

        let plain = LineItem::tagged("CMV", dec!(-25000), Classification::Cost);

        let summary = summarize(&[flagged.clone(), plain.clone()]);
        assert_eq!(summary.credit_base_override, Some(dec!(10000)));

        let none = summarize(&[plain]);
        assert_eq!(none.credit_base_override, None);

        // A flagged line outside cost/expense contributes nothing
        let mut revenue_flagged =
            LineItem::tagged("Receita", dec!(5000), Classification::Revenue);
        revenue_flagged.pis_cofins_credit = true;
        let summary = summarize(&[revenue_flagged]);
        assert_eq!(summary.credit_base_override, None);
    }

    #[test]
    fn test_balance_sheet_section_still_sums_by_tag() {
        let mut item = LineItem::tagged("Folha", dec!(-1000), Classification::Payroll);
        item.section = Section::BalanceSheet;
        let summary = summarize(&[item]);
        assert_eq!(summary.payroll_base, dec!(1000));
    }
}
