//! The rebuild pipeline: indexing, resolution, per-call-site assembly,
//! statistics.

use std::time::Instant;

use native_body_rebuilder_model::Model;

use crate::assemble::{ensure_synthetic_class, rebuild_call_site, AssembleOptions};
use crate::declarations::index_declarations;
use crate::diagnostics::{DiagnosticReason, DiagnosticsCollector};
use crate::infer::DEFAULT_MAX_PASSES;
use crate::loader::SummaryStore;
use crate::resolve::resolve_call_sites;
use crate::stats::RebuildStats;

/// Rebuild configuration.
#[derive(Debug, Clone)]
pub struct RebuildConfig {
    /// Also convert each original invoke to a static invoke of its
    /// synthetic method (the optional post-step).
    pub rewrite_call_sites: bool,
    pub max_inference_passes: usize,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            rewrite_call_sites: false,
            max_inference_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// What a rebuild produced: the statistics snapshot plus every diagnostic
/// collected along the way.
#[derive(Debug)]
pub struct RebuildOutcome {
    pub stats: RebuildStats,
    pub diagnostics: Vec<DiagnosticReason>,
}

/// Drives one whole rebuild over a host model and a set of loaded summary
/// modules.
#[derive(Debug)]
pub struct NativeBodyRebuilder<'a> {
    model: &'a mut Model,
    store: &'a SummaryStore,
    config: RebuildConfig,
}

impl<'a> NativeBodyRebuilder<'a> {
    pub fn new(model: &'a mut Model, store: &'a SummaryStore) -> Self {
        Self {
            model,
            store,
            config: RebuildConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RebuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline: index declarations, resolve call sites,
    /// rebuild each one, publish statistics and diagnostics.
    pub fn rebuild(self) -> RebuildOutcome {
        DiagnosticsCollector::enable();
        let total_start = Instant::now();

        let declared = index_declarations(self.model);

        let resolution_start = Instant::now();
        let sites = resolve_call_sites(self.model, &declared, self.store);
        let resolution_time = resolution_start.elapsed();
        let (instance_call_sites, static_call_sites, pointer_call_sites) = sites.counts_by_kind();

        let options = AssembleOptions {
            rewrite_call_sites: self.config.rewrite_call_sites,
            max_inference_passes: self.config.max_inference_passes,
        };

        let lowering_start = Instant::now();
        let mut counter = 0usize;
        let mut rebuilt_methods = 0usize;
        for (library, bucket) in sites.libraries() {
            let Some(module) = self.store.resolve(library) else {
                continue;
            };
            let class_sig = ensure_synthetic_class(self.model, module);
            for site in bucket {
                if rebuild_call_site(
                    self.model,
                    module,
                    &class_sig,
                    site,
                    &mut counter,
                    &options,
                ) {
                    rebuilt_methods += 1;
                }
            }
        }
        let lowering_time = lowering_start.elapsed();

        let stats = RebuildStats {
            summary_functions: self.store.modules().map(|m| m.function_count()).sum(),
            summary_instructions: self.store.modules().map(|m| m.instruction_count()).sum(),
            rebuilt_methods,
            total_call_sites: sites.total(),
            instance_call_sites,
            static_call_sites,
            pointer_call_sites,
            resolution_time,
            lowering_time,
            total_time: total_start.elapsed(),
        };

        let diagnostics = DiagnosticsCollector::take();
        DiagnosticsCollector::disable();
        RebuildOutcome { stats, diagnostics }
    }
}
