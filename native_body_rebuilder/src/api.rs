//! One-call entry points for embedding the rebuilder.

use std::path::Path;

use native_body_rebuilder_model::Model;

use crate::loader::{LoadError, SummaryStore};
use crate::pipeline::{NativeBodyRebuilder, RebuildConfig, RebuildOutcome};

/// Run a rebuild with the default configuration.
pub fn rebuild_native_bodies(model: &mut Model, store: &SummaryStore) -> RebuildOutcome {
    NativeBodyRebuilder::new(model, store).rebuild()
}

/// Run a rebuild with an explicit configuration.
pub fn rebuild_native_bodies_with(
    model: &mut Model,
    store: &SummaryStore,
    config: RebuildConfig,
) -> RebuildOutcome {
    NativeBodyRebuilder::new(model, store)
        .with_config(config)
        .rebuild()
}

/// Load every summary document in a directory into a fresh store.
pub fn load_summary_dir(dir: &Path) -> Result<SummaryStore, LoadError> {
    let mut store = SummaryStore::new();
    store.load_dir(dir)?;
    Ok(store)
}
