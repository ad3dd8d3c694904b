//! Host lifecycle hooks.

use tracing::debug;

use crate::file_helper::register_file_io;

/// Lifecycle glue for hosts that load the bridge as a module.
///
/// Starting the module registers the file shim. Registration is process-wide
/// and happens at most once, so starting several modules is harmless.
#[derive(Debug, Default)]
pub struct BridgeModule {
    started: bool,
}

impl BridgeModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn startup_module(&mut self) {
        let registered = register_file_io();
        debug!(registered, "bridge module started");
        self.started = true;
    }

    /// Nothing to release; the factories keep the shim until the process exits.
    pub fn shutdown_module(&mut self) {
        self.started = false;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
