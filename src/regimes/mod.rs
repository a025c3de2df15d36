// Regime calculators - Simples Nacional, Lucro Presumido, Lucro Real and
// the dual-VAT reform projection, plus the best-regime selector.
//
// Every calculator is a pure function over the classified ledger summary
// and a rate configuration, returning a result record. Nothing here does
// I/O and nothing ever fails: inapplicable regimes come back blocked.

pub mod presumido;
pub mod real;
pub mod reforma;
pub mod selector;
pub mod simples;
pub mod tables;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use reforma::ReformResult;
pub use selector::select_best;

/// Business activity of the simulated company
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Activity {
    /// Goods trade (Anexo I)
    Comercio,
    /// Manufacturing (Anexo II)
    Industria,
    /// General services (Anexo III)
    Servicos,
    /// Services taxed under Anexo IV - CPP collected outside the DAS
    ServicosAnexoIv,
    /// Qualified services - Factor R decides between Anexos III and V
    ServicosAnexoV,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Comercio => "COMERCIO",
            Activity::Industria => "INDUSTRIA",
            Activity::Servicos => "SERVICOS",
            Activity::ServicosAnexoIv => "SERVICOS_ANEXO_IV",
            Activity::ServicosAnexoV => "SERVICOS_ANEXO_V",
        }
    }

    /// Goods/industrial activities pay ICMS; service activities pay ISS
    pub fn is_goods_based(&self) -> bool {
        matches!(self, Activity::Comercio | Activity::Industria)
    }
}

impl FromStr for Activity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "COMERCIO" | "COMÉRCIO" => Ok(Activity::Comercio),
            "INDUSTRIA" | "INDÚSTRIA" => Ok(Activity::Industria),
            "SERVICOS" | "SERVIÇOS" => Ok(Activity::Servicos),
            "SERVICOS_ANEXO_IV" | "ANEXO_IV" => Ok(Activity::ServicosAnexoIv),
            "SERVICOS_ANEXO_V" | "ANEXO_V" => Ok(Activity::ServicosAnexoV),
            _ => Err(()),
        }
    }
}

/// Tax regime identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Regime {
    SimplesNacional,
    LucroPresumido,
    LucroReal,
    ReformaTributaria,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::SimplesNacional => "SIMPLES_NACIONAL",
            Regime::LucroPresumido => "LUCRO_PRESUMIDO",
            Regime::LucroReal => "LUCRO_REAL",
            Regime::ReformaTributaria => "REFORMA_TRIBUTARIA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regime::SimplesNacional => "Simples Nacional",
            Regime::LucroPresumido => "Lucro Presumido",
            Regime::LucroReal => "Lucro Real",
            Regime::ReformaTributaria => "Reforma Tributária (IVA Dual)",
        }
    }
}

impl FromStr for Regime {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SIMPLES_NACIONAL" => Ok(Regime::SimplesNacional),
            "LUCRO_PRESUMIDO" => Ok(Regime::LucroPresumido),
            "LUCRO_REAL" => Ok(Regime::LucroReal),
            "REFORMA_TRIBUTARIA" => Ok(Regime::ReformaTributaria),
            _ => Err(()),
        }
    }
}

/// Per-bucket tax totals; buckets always sum to the result's total tax
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaxBreakdown {
    pub sales_tax: Decimal,
    pub income_tax: Decimal,
    pub payroll_tax: Decimal,
    pub employer_charges: Decimal,
}

impl TaxBreakdown {
    pub fn total(&self) -> Decimal {
        self.sales_tax + self.income_tax + self.payroll_tax + self.employer_charges
    }
}

/// One named amount in the per-tax detail map, in display order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxLine {
    pub name: String,
    pub amount: Decimal,
}

impl TaxLine {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        TaxLine {
            name: name.into(),
            amount,
        }
    }
}

/// Outcome of one regime calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub regime: Regime,
    pub total_tax: Decimal,
    /// total_tax / annual revenue, zero when revenue is zero or negative
    pub effective_rate: Decimal,
    pub breakdown: TaxBreakdown,
    pub lines: Vec<TaxLine>,
    pub notes: Vec<String>,
    /// Regime inapplicable (e.g. revenue above the Simples ceiling)
    pub is_blocked: bool,
}

impl SimulationResult {
    /// Blocked result: zero tax, explanatory note, excluded by the selector
    pub fn blocked(regime: Regime, note: impl Into<String>) -> Self {
        SimulationResult {
            regime,
            total_tax: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            breakdown: TaxBreakdown::default(),
            lines: Vec::new(),
            notes: vec![note.into()],
            is_blocked: true,
        }
    }
}

/// Apply a percentage rate (e.g. 7.6 meaning 7.6%) to an amount
pub(crate) fn apply_rate(amount: Decimal, rate_pct: Decimal) -> Decimal {
    amount * rate_pct / Decimal::ONE_HUNDRED
}

/// total / revenue, guarded: revenue <= 0 yields rate zero, never an error
pub(crate) fn effective_rate(total_tax: Decimal, revenue: Decimal) -> Decimal {
    if revenue <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        total_tax / revenue
    }
}

/// Floor a tax base or payable amount at zero
pub(crate) fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Annual threshold above which the IRPJ surtax applies
pub(crate) fn irpj_surtax_threshold() -> Decimal {
    Decimal::from(240_000)
}
