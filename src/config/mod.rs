//! Rate configuration for the regime calculators
//!
//! All rates are percentage numbers (7.6 means 7.6%), immutable per
//! calculation and supplied externally. The engine assumes well-formed
//! numeric configuration; validation stops at what TOML/serde enforce.

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

fn pct(value: &str) -> Decimal {
    value.parse().expect("static rate literal")
}

/// Percentage rates for Lucro Presumido / Lucro Real calculations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateConfig {
    pub pis: Decimal,
    pub cofins: Decimal,
    pub irpj: Decimal,
    pub irpj_surtax: Decimal,
    pub csll: Decimal,
    pub ipi: Decimal,
    pub iss: Decimal,
    pub icms: Decimal,
    /// Workplace-accident insurance (RAT)
    pub rat: Decimal,
    /// Employer social-security contribution (INSS patronal / CPP)
    pub inss_patronal: Decimal,
    /// Third-party contributions (sistema S)
    pub terceiros: Decimal,
    /// Severance fund (FGTS)
    pub fgts: Decimal,
    /// Presumption margin for the IRPJ base (Lucro Presumido only)
    pub presumption_irpj: Decimal,
    /// Presumption margin for the CSLL base (Lucro Presumido only)
    pub presumption_csll: Decimal,
    /// PIS on financial revenue (Lucro Real only)
    pub pis_financial: Decimal,
    /// COFINS on financial revenue (Lucro Real only)
    pub cofins_financial: Decimal,
}

impl Default for RateConfig {
    fn default() -> Self {
        RateConfig::presumido_default()
    }
}

impl RateConfig {
    /// Documented Lucro Presumido defaults (cumulative PIS/COFINS)
    pub fn presumido_default() -> Self {
        RateConfig {
            pis: pct("0.65"),
            cofins: pct("3.00"),
            irpj: pct("15"),
            irpj_surtax: pct("10"),
            csll: pct("9"),
            ipi: Decimal::ZERO,
            iss: pct("5"),
            icms: pct("18"),
            rat: pct("2"),
            inss_patronal: pct("20"),
            terceiros: pct("5.80"),
            fgts: pct("8"),
            presumption_irpj: pct("32"),
            presumption_csll: pct("32"),
            pis_financial: pct("0.65"),
            cofins_financial: pct("4.00"),
        }
    }

    /// Documented Lucro Real defaults (non-cumulative PIS/COFINS)
    pub fn real_default() -> Self {
        RateConfig {
            pis: pct("1.65"),
            cofins: pct("7.60"),
            // Presumption margins are not used under Lucro Real
            presumption_irpj: Decimal::ZERO,
            presumption_csll: Decimal::ZERO,
            ..RateConfig::presumido_default()
        }
    }
}

/// Rates for the dual-VAT reform projection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReformConfig {
    /// VAT on goods leg (IBS)
    pub ibs: Decimal,
    /// VAT services federal share (CBS)
    pub cbs: Decimal,
    /// Selective (sin) tax - no credit mechanism
    pub seletivo: Decimal,
    /// Credit percentage applied to cost/expense lines without an
    /// explicit per-line rate
    pub default_credit_pct: Decimal,
}

impl Default for ReformConfig {
    fn default() -> Self {
        ReformConfig {
            ibs: pct("17.5"),
            cbs: pct("9.0"),
            seletivo: Decimal::ZERO,
            default_credit_pct: pct("100"),
        }
    }
}

/// Top-level TOML document: one rate table per regime plus the reform rates
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub presumido: RateConfig,
    pub real: RealSection,
    pub reforma: ReformConfig,
}

/// Wrapper so `[real]` gets Lucro Real defaults instead of Presumido ones
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RealSection(pub RateConfig);

impl Default for RealSection {
    fn default() -> Self {
        RealSection(RateConfig::real_default())
    }
}

impl SimulatorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: SimulatorConfig =
            toml::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        info!("Config written to {:?}", path);
        Ok(())
    }

    /// Load from the given path, or from the default location, or fall
    /// back to the documented defaults when no file exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => SimulatorConfig::load(p),
            None => {
                let default = default_config_path()?;
                if default.exists() {
                    SimulatorConfig::load(&default)
                } else {
                    Ok(SimulatorConfig::default())
                }
            }
        }
    }
}

/// Default config file location (~/.config/tributo/config.toml on Linux)
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("tributo").join("config.toml"))
}
