//! Analysis engine configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHAIN_CACHE_CAPACITY, DEFAULT_HOTSPOT_THRESHOLD, DEFAULT_HUB_THRESHOLD,
    DEFAULT_MAINTAINABILITY_FLOOR, DEFAULT_MAX_CALL_PATHS, DEFAULT_MAX_TRAVERSAL_DEPTH,
    DEFAULT_RECOMPUTE_BATCH_SIZE,
};

/// Options recognized by the cycle detector, metrics engine, call-path engine
/// and recomputation scheduler. Unset options fall back to compiled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard bound for every depth-limited traversal. Default: 50.
    pub max_traversal_depth: Option<u32>,
    /// Caller/callee count threshold for centrality. Default: 10.
    pub hub_threshold: Option<u32>,
    /// Lower clamp of the maintainability index. Default: 0.
    pub maintainability_floor: Option<f64>,
    /// Dirty symbols drained per scheduler pass. Default: 256.
    pub recompute_batch_size: Option<usize>,
    /// Hotspot score counted as a hotspot in health summaries. Default: 100.
    pub hotspot_threshold: Option<f64>,
    /// Cap on paths enumerated per call-chain query. Default: 10 000.
    pub max_call_paths: Option<usize>,
    /// Cached call-chain query results. Default: 1 024.
    pub chain_cache_capacity: Option<u64>,
}

impl EngineConfig {
    pub fn effective_max_traversal_depth(&self) -> u32 {
        self.max_traversal_depth.unwrap_or(DEFAULT_MAX_TRAVERSAL_DEPTH)
    }

    pub fn effective_hub_threshold(&self) -> u32 {
        self.hub_threshold.unwrap_or(DEFAULT_HUB_THRESHOLD)
    }

    pub fn effective_maintainability_floor(&self) -> f64 {
        self.maintainability_floor.unwrap_or(DEFAULT_MAINTAINABILITY_FLOOR)
    }

    pub fn effective_recompute_batch_size(&self) -> usize {
        self.recompute_batch_size.unwrap_or(DEFAULT_RECOMPUTE_BATCH_SIZE)
    }

    pub fn effective_hotspot_threshold(&self) -> f64 {
        self.hotspot_threshold.unwrap_or(DEFAULT_HOTSPOT_THRESHOLD)
    }

    pub fn effective_max_call_paths(&self) -> usize {
        self.max_call_paths.unwrap_or(DEFAULT_MAX_CALL_PATHS)
    }

    pub fn effective_chain_cache_capacity(&self) -> u64 {
        self.chain_cache_capacity.unwrap_or(DEFAULT_CHAIN_CACHE_CAPACITY)
    }

    /// Overlay every `Some` field of `other` onto `self`.
    pub fn merge_from(&mut self, other: &EngineConfig) {
        if other.max_traversal_depth.is_some() {
            self.max_traversal_depth = other.max_traversal_depth;
        }
        if other.hub_threshold.is_some() {
            self.hub_threshold = other.hub_threshold;
        }
        if other.maintainability_floor.is_some() {
            self.maintainability_floor = other.maintainability_floor;
        }
        if other.recompute_batch_size.is_some() {
            self.recompute_batch_size = other.recompute_batch_size;
        }
        if other.hotspot_threshold.is_some() {
            self.hotspot_threshold = other.hotspot_threshold;
        }
        if other.max_call_paths.is_some() {
            self.max_call_paths = other.max_call_paths;
        }
        if other.chain_cache_capacity.is_some() {
            self.chain_cache_capacity = other.chain_cache_capacity;
        }
    }
}
