//! Executes one planned pass: components in parallel, each under its lock.

use std::sync::PoisonError;

use rayon::prelude::*;
use tangle_core::errors::TraversalError;
use tangle_core::traits::Cancellable;
use tangle_core::types::SymbolId;

use super::controller::ComponentWork;
use super::locks::ComponentLocks;
use crate::cycles::{CycleDetector, CycleReport};
use crate::graph::{ComponentId, GraphIndex};
use crate::metrics::{DepthCalculator, MetricsEngine, SymbolMetrics};

/// Shared, read-only inputs of a pass.
pub struct PassContext<'a> {
    pub index: &'a GraphIndex,
    pub metrics: &'a MetricsEngine,
    pub detector: &'a CycleDetector,
    pub locks: &'a ComponentLocks,
    pub cancel: &'a (dyn Cancellable + Sync),
}

#[derive(Debug, Clone)]
pub struct ComponentOutcome {
    pub component: ComponentId,
    /// Present when the component's cycles were re-detected.
    pub cycles: Option<Vec<CycleReport>>,
    /// Re-detection was requested but skipped by cancellation.
    pub cycles_deferred: bool,
    pub computed: Vec<SymbolMetrics>,
    /// Not attempted because the run was cancelled.
    pub skipped: Vec<SymbolId>,
    pub diagnostics: Vec<TraversalError>,
}

pub fn run_pass(ctx: &PassContext<'_>, work: Vec<ComponentWork>) -> Vec<ComponentOutcome> {
    work.into_par_iter()
        .map(|unit| run_component(ctx, unit))
        .collect()
}

fn run_component(ctx: &PassContext<'_>, work: ComponentWork) -> ComponentOutcome {
    let lock = ctx.locks.lock_for(work.component);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    let mut outcome = ComponentOutcome {
        component: work.component,
        cycles: None,
        cycles_deferred: false,
        computed: Vec::with_capacity(work.symbols.len()),
        skipped: Vec::new(),
        diagnostics: Vec::new(),
    };

    if work.redetect_cycles {
        if ctx.cancel.is_cancelled() {
            outcome.cycles_deferred = true;
        } else {
            let members = ctx.index.component_members(work.component);
            let detected = ctx.detector.detect_from(ctx.index, members);
            outcome.diagnostics.extend(detected.diagnostics);
            outcome.cycles = Some(detected.cycles);
        }
    }

    let mut depths = DepthCalculator::new(ctx.index, ctx.metrics.policy().max_depth);
    for symbol in work.symbols {
        if ctx.cancel.is_cancelled() {
            outcome.skipped.push(symbol);
            continue;
        }
        let (depth, diagnostic) = depths.depth(symbol);
        outcome.diagnostics.extend(diagnostic);
        outcome.computed.push(ctx.metrics.compute_one(ctx.index, symbol, depth));
    }

    tracing::trace!(
        component = %outcome.component,
        computed = outcome.computed.len(),
        skipped = outcome.skipped.len(),
        cycles = outcome.cycles.as_ref().map(|c| c.len()),
        "component pass finished"
    );
    outcome
}
