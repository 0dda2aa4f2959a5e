//! Hotspot scoring, ranking and centrality classification.

use tangle_core::constants::CENTRAL_MULTIPLIER;
use tangle_core::types::SymbolId;

use super::types::{Centrality, Hotspot};

/// `complexity_score * call_frequency`.
pub fn hotspot_score(complexity_score: f64, call_frequency: u64) -> f64 {
    complexity_score * call_frequency as f64
}

/// Highest score first; equal scores ordered by ascending symbol id.
pub fn rank_hotspots(scores: impl IntoIterator<Item = (SymbolId, f64)>, limit: usize) -> Vec<Hotspot> {
    let mut ranked: Vec<Hotspot> = scores
        .into_iter()
        .map(|(symbol, score)| Hotspot { symbol, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.symbol.cmp(&b.symbol)));
    ranked.truncate(limit);
    ranked
}

/// Checked in order: central, hub, utility.
pub fn classify_centrality(callers: u32, callees: u32, threshold: u32) -> Centrality {
    let threshold_f = threshold as f64;
    if (callers as f64 + callees as f64) > threshold_f * CENTRAL_MULTIPLIER {
        Centrality::Central
    } else if callers > threshold {
        Centrality::Hub
    } else if callees > threshold {
        Centrality::Utility
    } else {
        Centrality::Peripheral
    }
}
