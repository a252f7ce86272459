use crate::sim::Simulation;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum
/// extractors. The store is the only shared mutable resource; handlers
/// never mutate collections by any other path.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sim: Simulation,
}
