use crate::pipeline::{DiscoveryPipeline, FixedDelay, HttpOsmSource};
use std::sync::Mutex;

/// Runs are serialized behind the mutex: the courtesy-delay discipline
/// assumes a single caller toward the upstream services.
pub struct AppState {
    pub pipeline: Mutex<DiscoveryPipeline<HttpOsmSource, FixedDelay>>,
}
