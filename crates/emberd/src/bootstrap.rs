//! Provider bootstrap orchestration.

use std::net::SocketAddr;
use std::sync::Arc;

use ember_config::Config;
use ember_glow::{Codec, JsonLinesCodec};
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::model::Element;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ListenerError, ListenerHandle, ProviderConnectionHandler, SocketListener};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when no valid configuration is available.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap: configuration, telemetry and a
/// dispatcher owning the control model.
pub struct Provider {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Provider {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatcher serving the control model. Device code uses it to push
    /// value changes.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Binds the configured endpoint and serves controllers with the
    /// JSON-lines codec.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the endpoint cannot be bound or the
    /// accept thread cannot be started.
    pub fn serve(&self) -> Result<ServingHandle, ListenerError> {
        self.serve_with(Arc::new(JsonLinesCodec))
    }

    /// Like [`Provider::serve`] with a caller-supplied codec.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the endpoint cannot be bound or the
    /// accept thread cannot be started.
    pub fn serve_with(&self, codec: Arc<dyn Codec>) -> Result<ServingHandle, ListenerError> {
        let listener = SocketListener::bind(self.config.listen())?;
        let handler = Arc::new(ProviderConnectionHandler::new(
            Arc::clone(&self.dispatcher),
            codec,
            Arc::clone(&self.reporter),
            self.config.max_frame_bytes(),
        ));
        let listener = listener.start(handler)?;
        self.reporter.listener_ready(listener.local_addr());
        Ok(ServingHandle {
            listener,
            dispatcher: Arc::clone(&self.dispatcher),
        })
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Provider")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Running listener; dropping it stops accepting without closing sessions.
pub struct ServingHandle {
    listener: ListenerHandle,
    dispatcher: Arc<Dispatcher>,
}

impl ServingHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Stops accepting connections, waits for the accept thread, and closes
    /// every session.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the accept thread panicked.
    pub fn shutdown(self) -> Result<(), ListenerError> {
        self.listener.shutdown();
        let joined = self.listener.join();
        self.dispatcher.sessions().close_all();
        joined
    }
}

/// Bootstraps the provider using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration loading or telemetry
/// initialisation fails. The reporter is told about the failure first.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    model: Element,
) -> Result<Provider, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(model));
    reporter.bootstrap_succeeded(&config);

    Ok(Provider {
        config,
        dispatcher,
        telemetry,
        reporter,
    })
}
