//! Best-regime selection among the current-law calculators

use super::{Regime, SimulationResult};

/// Pick the lowest-tax non-blocked result; ties keep the first
/// encountered. When every result is blocked, fall back to the Lucro
/// Real one (it is never subject to a revenue ceiling).
pub fn select_best(results: &[SimulationResult]) -> &SimulationResult {
    let candidates: Vec<&SimulationResult> = results.iter().filter(|r| !r.is_blocked).collect();

    if let Some(best) = candidates
        .into_iter()
        .reduce(|best, r| if r.total_tax < best.total_tax { r } else { best })
    {
        return best;
    }

    results
        .iter()
        .find(|r| r.regime == Regime::LucroReal)
        .unwrap_or_else(|| &results[0])
}
