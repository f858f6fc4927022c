//! Unit tests for bootstrap and process supervision.

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use ember_config::{Config, ProviderEndpoint};
use ortho_config::{OrthoConfig, OrthoError};
use rstest::{fixture, rstest};

use crate::bootstrap::{BootstrapError, ConfigLoader, StaticConfigLoader, bootstrap_with};
use crate::process::{LaunchError, ShutdownError, ShutdownSignal, run_provider_with};
use crate::sample_device;

use super::support::{HealthEvent, RecordingHealthReporter};

/// Loader that fails by passing an invalid listener endpoint.
struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("emberd"),
            OsString::from("--listen"),
            OsString::from("udp://127.0.0.1:9000"),
        ];
        Config::load_from_iter(args)
    }
}

/// Shutdown signal that fires as soon as it is awaited.
struct ImmediateShutdown;

impl ShutdownSignal for ImmediateShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        Ok(())
    }
}

/// Shutdown signal whose handlers cannot be installed.
struct BrokenShutdown;

impl ShutdownSignal for BrokenShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        Err(ShutdownError::Install {
            source: io::Error::other("signals unavailable"),
        })
    }
}

#[fixture]
fn loader() -> StaticConfigLoader {
    StaticConfigLoader::new(Config {
        listen: ProviderEndpoint::tcp("127.0.0.1", 0),
        log_filter: "warn".to_owned(),
        ..Config::default()
    })
}

#[rstest]
fn bootstrap_reports_success(loader: StaticConfigLoader) {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let model = sample_device::build().expect("sample device");

    let provider = bootstrap_with(&loader, reporter.clone(), model).expect("bootstrap");

    assert_eq!(
        reporter.events(),
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
    assert_eq!(provider.config().listen().port, 0);
    assert!(provider.dispatcher().sessions().is_empty());
}

#[rstest]
fn bootstrap_reports_configuration_failures() {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let model = sample_device::build().expect("sample device");

    let error = bootstrap_with(&FailingConfigLoader, reporter.clone(), model)
        .expect_err("bootstrap should fail");

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    let events = reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::BootstrapStarting));
    assert!(matches!(events.last(), Some(HealthEvent::BootstrapFailed(_))));
}

#[rstest]
fn provider_serves_until_shutdown(loader: StaticConfigLoader) {
    let reporter = Arc::new(RecordingHealthReporter::default());

    run_provider_with(&loader, reporter.clone(), &ImmediateShutdown).expect("provider run");

    let events = reporter.events();
    assert!(events.contains(&HealthEvent::BootstrapSucceeded));
    assert!(events.contains(&HealthEvent::ListenerReady));
}

#[rstest]
fn missing_signal_handlers_still_stop_the_listener(loader: StaticConfigLoader) {
    let reporter = Arc::new(RecordingHealthReporter::default());

    let error = run_provider_with(&loader, reporter, &BrokenShutdown)
        .expect_err("signal installation should fail");

    assert!(matches!(error, LaunchError::Shutdown { .. }));
}

#[rstest]
fn launch_surfaces_bootstrap_failures() {
    let reporter = Arc::new(RecordingHealthReporter::default());

    let error = run_provider_with(&FailingConfigLoader, reporter, &ImmediateShutdown)
        .expect_err("bootstrap should fail");

    assert!(matches!(error, LaunchError::Bootstrap { .. }));
}
