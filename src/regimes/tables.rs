//! Simples Nacional bracket tables (Anexos I-V, LC 123/2006)
//!
//! Each annex is an ordered sequence of six brackets with an inclusive
//! upper revenue limit, a nominal rate and a fixed deduction, exhaustive
//! up to the R$ 4.800.000,00 ceiling.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One Simples Nacional bracket
#[derive(Debug, Clone, PartialEq)]
pub struct Bracket {
    /// Inclusive upper trailing-12-month revenue limit
    pub limit: Decimal,
    /// Nominal rate, percent
    pub rate: Decimal,
    /// Fixed deduction, R$
    pub deduction: Decimal,
}

/// Simples Nacional annex
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Annex {
    I,
    II,
    III,
    IV,
    V,
}

impl Annex {
    pub fn label(&self) -> &'static str {
        match self {
            Annex::I => "Anexo I",
            Annex::II => "Anexo II",
            Annex::III => "Anexo III",
            Annex::IV => "Anexo IV",
            Annex::V => "Anexo V",
        }
    }

    /// The annex whose CPP (INSS patronal) is collected outside the DAS
    pub fn cpp_outside_das(&self) -> bool {
        matches!(self, Annex::IV)
    }

    pub fn table(&self) -> &'static [Bracket] {
        match self {
            Annex::I => ANEXO_I.as_slice(),
            Annex::II => ANEXO_II.as_slice(),
            Annex::III => ANEXO_III.as_slice(),
            Annex::IV => ANEXO_IV.as_slice(),
            Annex::V => ANEXO_V.as_slice(),
        }
    }
}

/// Hard revenue ceiling; above it the Simples Nacional is inapplicable
pub static SIMPLES_CEILING: Lazy<Decimal> = Lazy::new(|| Decimal::from(4_800_000));

fn bracket(limit: i64, rate: &str, deduction: i64) -> Bracket {
    Bracket {
        limit: Decimal::from(limit),
        rate: Decimal::from_str(rate).expect("static rate literal"),
        deduction: Decimal::from(deduction),
    }
}

fn table(rows: [(i64, &str, i64); 6]) -> Vec<Bracket> {
    rows.into_iter()
        .map(|(limit, rate, deduction)| bracket(limit, rate, deduction))
        .collect()
}

static ANEXO_I: Lazy<Vec<Bracket>> = Lazy::new(|| {
    // Comércio
    table([
        (180_000, "4.00", 0),
        (360_000, "7.30", 5_940),
        (720_000, "9.50", 13_860),
        (1_800_000, "10.70", 22_500),
        (3_600_000, "14.30", 87_300),
        (4_800_000, "19.00", 378_000),
    ])
});

static ANEXO_II: Lazy<Vec<Bracket>> = Lazy::new(|| {
    // Indústria
    table([
        (180_000, "4.50", 0),
        (360_000, "7.80", 5_940),
        (720_000, "10.00", 13_860),
        (1_800_000, "11.20", 22_500),
        (3_600_000, "14.70", 85_500),
        (4_800_000, "30.00", 720_000),
    ])
});

static ANEXO_III: Lazy<Vec<Bracket>> = Lazy::new(|| {
    // Serviços gerais
    table([
        (180_000, "6.00", 0),
        (360_000, "11.20", 9_360),
        (720_000, "13.50", 17_640),
        (1_800_000, "16.00", 35_640),
        (3_600_000, "21.00", 125_640),
        (4_800_000, "33.00", 648_000),
    ])
});

static ANEXO_IV: Lazy<Vec<Bracket>> = Lazy::new(|| {
    // Serviços do Anexo IV (CPP fora do DAS)
    table([
        (180_000, "4.50", 0),
        (360_000, "9.00", 8_100),
        (720_000, "10.20", 12_420),
        (1_800_000, "14.00", 39_780),
        (3_600_000, "22.00", 183_780),
        (4_800_000, "33.00", 828_000),
    ])
});

static ANEXO_V: Lazy<Vec<Bracket>> = Lazy::new(|| {
    // Serviços qualificados
    table([
        (180_000, "15.50", 0),
        (360_000, "18.00", 4_500),
        (720_000, "19.50", 9_900),
        (1_800_000, "20.50", 17_100),
        (3_600_000, "23.00", 62_100),
        (4_800_000, "30.50", 540_000),
    ])
});

/// First bracket whose limit is >= revenue (inclusive upper bound);
/// falls back to the last bracket when none matches
pub fn find_bracket(annex: Annex, revenue: Decimal) -> &'static Bracket {
    let rows = annex.table();
    rows.iter()
        .find(|b| revenue <= b.limit)
        .unwrap_or_else(|| rows.last().expect("annex tables are non-empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tables_are_ordered_and_exhaustive() {
        for annex in [Annex::I, Annex::II, Annex::III, Annex::IV, Annex::V] {
            let rows = annex.table();
            assert_eq!(rows.len(), 6, "{} must have six brackets", annex.label());
            for pair in rows.windows(2) {
                assert!(pair[0].limit < pair[1].limit);
            }
            assert_eq!(rows.last().unwrap().limit, *SIMPLES_CEILING);
        }
    }

    #[test]
    fn test_bracket_boundary_is_inclusive() {
        // Revenue exactly at a bracket limit selects that bracket
        let b = find_bracket(Annex::I, dec!(180000));
        assert_eq!(b.rate, dec!(4.00));

        let next = find_bracket(Annex::I, dec!(180000.01));
        assert_eq!(next.rate, dec!(7.30));
    }

    #[test]
    fn test_revenue_above_ceiling_falls_back_to_last_bracket() {
        let b = find_bracket(Annex::III, dec!(9000000));
        assert_eq!(b.rate, dec!(33.00));
    }

    #[test]
    fn test_only_anexo_iv_pays_cpp_outside_das() {
        assert!(Annex::IV.cpp_outside_das());
        for annex in [Annex::I, Annex::II, Annex::III, Annex::V] {
            assert!(!annex.cpp_outside_das());
        }
    }
}
