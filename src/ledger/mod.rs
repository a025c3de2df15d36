// Ledger module - line items, semantic classification and aggregation

pub mod classifier;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use classifier::{classify_lines, summarize, FinancialSummary};

/// Statement a line belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Section {
    Dre,
    BalanceSheet,
    Ebitda,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Dre => "DRE",
            Section::BalanceSheet => "BALANCE_SHEET",
            Section::Ebitda => "EBITDA",
        }
    }
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DRE" => Ok(Section::Dre),
            "BALANCE_SHEET" | "BALANCO" | "BALANÇO" => Ok(Section::BalanceSheet),
            "EBITDA" => Ok(Section::Ebitda),
            _ => Err(()),
        }
    }
}

/// Postable leaf account vs structural subtotal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineKind {
    /// Postable leaf account, included in sums
    Analytical,
    /// Subtotal/group row, excluded from sums
    Synthetic,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Analytical => "ANALYTICAL",
            LineKind::Synthetic => "SYNTHETIC",
        }
    }
}

impl FromStr for LineKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ANALYTICAL" | "ANALITICA" | "ANALÍTICA" => Ok(LineKind::Analytical),
            "SYNTHETIC" | "SINTETICA" | "SINTÉTICA" => Ok(LineKind::Synthetic),
            _ => Err(()),
        }
    }
}

/// Semantic tag assigned to a ledger line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Classification {
    Revenue,
    Deduction,
    SalesTax,
    IncomeTax,
    Payroll,
    Cost,
    Expense,
    FinancialRevenue,
    FinancialExpense,
    Other,
    Ignore,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Revenue => "REVENUE",
            Classification::Deduction => "DEDUCTION",
            Classification::SalesTax => "SALES_TAX",
            Classification::IncomeTax => "INCOME_TAX",
            Classification::Payroll => "PAYROLL",
            Classification::Cost => "COST",
            Classification::Expense => "EXPENSE",
            Classification::FinancialRevenue => "FINANCIAL_REVENUE",
            Classification::FinancialExpense => "FINANCIAL_EXPENSE",
            Classification::Other => "OTHER",
            Classification::Ignore => "IGNORE",
        }
    }

    /// Portuguese label for terminal display
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Revenue => "Receita",
            Classification::Deduction => "Dedução",
            Classification::SalesTax => "Imposto s/ venda",
            Classification::IncomeTax => "Imposto s/ renda",
            Classification::Payroll => "Folha",
            Classification::Cost => "Custo",
            Classification::Expense => "Despesa",
            Classification::FinancialRevenue => "Receita financeira",
            Classification::FinancialExpense => "Despesa financeira",
            Classification::Other => "Outros",
            Classification::Ignore => "Ignorado",
        }
    }
}

impl FromStr for Classification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REVENUE" => Ok(Classification::Revenue),
            "DEDUCTION" => Ok(Classification::Deduction),
            "SALES_TAX" => Ok(Classification::SalesTax),
            "INCOME_TAX" => Ok(Classification::IncomeTax),
            "PAYROLL" => Ok(Classification::Payroll),
            "COST" => Ok(Classification::Cost),
            "EXPENSE" => Ok(Classification::Expense),
            "FINANCIAL_REVENUE" => Ok(Classification::FinancialRevenue),
            "FINANCIAL_EXPENSE" => Ok(Classification::FinancialExpense),
            "OTHER" => Ok(Classification::Other),
            "IGNORE" => Ok(Classification::Ignore),
            _ => Err(()),
        }
    }
}

/// Taxable-income adjustment flag (Lucro Real only)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FiscalAdjustment {
    /// LALUR addition to accounting profit
    Addition,
    /// LALUR exclusion from accounting profit
    Exclusion,
}

impl FiscalAdjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalAdjustment::Addition => "ADDITION",
            FiscalAdjustment::Exclusion => "EXCLUSION",
        }
    }
}

impl FromStr for FiscalAdjustment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADDITION" | "ADICAO" | "ADIÇÃO" => Ok(FiscalAdjustment::Addition),
            "EXCLUSION" | "EXCLUSAO" | "EXCLUSÃO" => Ok(FiscalAdjustment::Exclusion),
            _ => Err(()),
        }
    }
}

/// One ledger row
///
/// The value keeps the ledger sign convention; its absolute value is the
/// economic magnitude used by every aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub value: Decimal,
    /// Subtotal/group row, excluded from sums
    #[serde(default)]
    pub is_aggregate: bool,
    pub section: Section,
    /// Nesting depth, display only
    #[serde(default)]
    pub level: u8,
    pub classification: Classification,
    pub kind: LineKind,
    /// Eligible for PIS/COFINS credit (Lucro Real only)
    #[serde(default)]
    pub pis_cofins_credit: bool,
    /// Per-line VAT credit rate 0-100 (reform only)
    #[serde(default)]
    pub vat_credit_pct: Option<Decimal>,
    /// LALUR addition/exclusion flag (Lucro Real only)
    #[serde(default)]
    pub fiscal_adjustment: Option<FiscalAdjustment>,
}

impl LineItem {
    /// Plain analytical DRE line, untagged
    pub fn new(description: impl Into<String>, value: Decimal) -> Self {
        LineItem {
            description: description.into(),
            value,
            is_aggregate: false,
            section: Section::Dre,
            level: 0,
            classification: Classification::Other,
            kind: LineKind::Analytical,
            pis_cofins_credit: false,
            vat_credit_pct: None,
            fiscal_adjustment: None,
        }
    }

    /// Same, with a known classification
    pub fn tagged(
        description: impl Into<String>,
        value: Decimal,
        classification: Classification,
    ) -> Self {
        LineItem {
            classification,
            ..LineItem::new(description, value)
        }
    }

    /// Economic magnitude of the line
    pub fn magnitude(&self) -> Decimal {
        self.value.abs()
    }

    /// Only analytical, non-aggregate lines enter sums
    pub fn counts_in_totals(&self) -> bool {
        self.kind == LineKind::Analytical && !self.is_aggregate
    }
}
