//! Host-facing entry point: query parsing, the reserved prefix key and the
//! cacheability hint around a [`DirectiveProcessor`].

use crate::config::{BaggageConfig, LoaderOptions};
use crate::diagnostics::DiagnosticHandler;
use crate::errors::Result;
use crate::processor::{DirectiveProcessor, Directives, Invocation, LoaderOutput};
use crate::query::parse_query;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Query key holding the require prefix for one invocation; never a directive
pub const PREFIX_QUERY_KEY: &str = "reqPrefix";

/// Capabilities the bundler exposes to a loader
pub trait LoaderHost {
    /// Hint whether the result may be cached. Hosts without a cache ignore it.
    fn cacheable(&mut self, _cacheable: bool) {}
}

/// Host with no optional capabilities
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl LoaderHost for NoopHost {}

/// What the host knows about the resource being loaded
#[derive(Debug, Clone, Copy)]
pub struct LoaderRequest<'a> {
    /// Absolute path of the resource
    pub resource_path: &'a Path,
    /// Loader query string, e.g. `?./log=dbg#logger`
    pub query: &'a str,
    /// Full request string, used as the `file` of an emitted map
    pub request: Option<&'a str>,
}

impl<'a> LoaderRequest<'a> {
    pub fn new(resource_path: &'a Path, query: &'a str) -> Self {
        Self {
            resource_path,
            query,
            request: None,
        }
    }

    pub fn with_request(mut self, request: &'a str) -> Self {
        self.request = Some(request);
        self
    }
}

pub struct BaggageLoader {
    processor: DirectiveProcessor,
}

impl BaggageLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            processor: DirectiveProcessor::new(options),
        }
    }

    pub fn with_diagnostics(options: LoaderOptions, diagnostics: Arc<dyn DiagnosticHandler>) -> Self {
        Self {
            processor: DirectiveProcessor::with_diagnostics(options, diagnostics),
        }
    }

    pub fn from_config(config: &BaggageConfig) -> Self {
        Self::new(config.loader_options.clone())
    }

    pub fn processor(&self) -> &DirectiveProcessor {
        &self.processor
    }

    /// Run the loader over one resource.
    pub fn run(
        &self,
        request: &LoaderRequest<'_>,
        source: &str,
        source_map: Option<&Value>,
        host: &mut dyn LoaderHost,
    ) -> Result<LoaderOutput> {
        host.cacheable(self.processor.options().cacheable);

        let mut directives = parse_query(request.query)?;
        let resource = request.resource_path.to_string_lossy();
        let prefix = self.take_prefix(&mut directives, &resource);

        debug!(
            "Running {} directive(s) for {}",
            directives.len(),
            request.resource_path.display()
        );

        let invocation = Invocation::new(request.resource_path, source, &directives)
            .with_source_map(source_map)
            .with_request(request.request)
            .with_require_prefix(prefix.as_deref());

        self.processor.process(&invocation)
    }

    /// Remove the reserved prefix key from `directives`, returning its value
    /// when it is a string.
    fn take_prefix(&self, directives: &mut Directives, resource: &str) -> Option<String> {
        match directives.shift_remove(PREFIX_QUERY_KEY)? {
            Value::String(prefix) => Some(prefix),
            other => {
                self.processor.diagnostics().warning(
                    resource,
                    &format!(
                        "Ignoring '{}': expected a string, got {}",
                        PREFIX_QUERY_KEY, other
                    ),
                );
                None
            }
        }
    }
}
