//! Supervises provider launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::{info, warn};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::sample_device;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the provider with the production collaborators and the sample device.
///
/// # Errors
///
/// Returns [`LaunchError`] when any launch step fails.
pub fn run_provider() -> Result<(), LaunchError> {
    let reporter = Arc::new(StructuredHealthReporter::new());
    run_provider_with(&SystemConfigLoader, reporter, &SystemShutdownSignal)
}

/// Runs the provider with injected collaborators.
///
/// Serves the sample device until `shutdown` returns, then stops the listener
/// and closes every session.
///
/// # Errors
///
/// Returns [`LaunchError`] when the model, bootstrap, listener, or signal
/// setup fails.
pub fn run_provider_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let model = sample_device::build()?;
    let provider = bootstrap_with(loader, reporter, model)?;
    let serving = provider.serve()?;
    info!(
        target: PROCESS_TARGET,
        local_addr = %serving.local_addr(),
        "provider serving"
    );

    let waited = shutdown.wait();
    if let Err(error) = &waited {
        warn!(target: PROCESS_TARGET, error = %error, "shutdown signal unavailable");
    }
    serving.shutdown()?;
    waited?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
