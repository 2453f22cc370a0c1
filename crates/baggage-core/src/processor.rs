//! The directive processor: turns one resource plus its directives into
//! transformed output.

use crate::config::LoaderOptions;
use crate::diagnostics::{ConsoleDiagnosticHandler, DiagnosticHandler};
use crate::directive::Directive;
use crate::errors::Result;
use crate::inject::InjectBuffer;
use crate::placeholder::PathInfo;
use crate::query::Query;
use crate::sourcemap::SourceMap;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Ordered directive key to value mapping
pub type Directives = Query;

/// Everything one transformation needs; nothing outlives the call
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub resource_path: &'a Path,
    pub source: &'a str,
    pub source_map: Option<&'a Value>,
    pub directives: &'a Directives,
    /// `file` of the emitted source map (default: the resource path)
    pub request: Option<&'a str>,
    /// Overrides `LoaderOptions::require_prefix` for this call only
    pub require_prefix: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub fn new(resource_path: &'a Path, source: &'a str, directives: &'a Directives) -> Self {
        Self {
            resource_path,
            source,
            source_map: None,
            directives,
            request: None,
            require_prefix: None,
        }
    }

    pub fn with_source_map(mut self, source_map: Option<&'a Value>) -> Self {
        self.source_map = source_map;
        self
    }

    pub fn with_request(mut self, request: Option<&'a str>) -> Self {
        self.request = request;
        self
    }

    pub fn with_require_prefix(mut self, require_prefix: Option<&'a str>) -> Self {
        self.require_prefix = require_prefix;
        self
    }

    fn resource(&self) -> String {
        self.resource_path.to_string_lossy().into_owned()
    }
}

/// Result of one transformation.
///
/// Hosts without source maps can hand `Source` back synchronously; the map
/// variant carries the updated map as a plain JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderOutput {
    Source(String),
    SourceWithMap { code: String, map: Value },
}

impl LoaderOutput {
    pub fn code(&self) -> &str {
        match self {
            LoaderOutput::Source(code) => code,
            LoaderOutput::SourceWithMap { code, .. } => code,
        }
    }

    pub fn map(&self) -> Option<&Value> {
        match self {
            LoaderOutput::Source(_) => None,
            LoaderOutput::SourceWithMap { map, .. } => Some(map),
        }
    }

    pub fn into_parts(self) -> (String, Option<Value>) {
        match self {
            LoaderOutput::Source(code) => (code, None),
            LoaderOutput::SourceWithMap { code, map } => (code, Some(map)),
        }
    }

    fn pass_through(source: &str, source_map: Option<&Value>) -> Self {
        match source_map {
            Some(map) => LoaderOutput::SourceWithMap {
                code: source.to_string(),
                map: map.clone(),
            },
            None => LoaderOutput::Source(source.to_string()),
        }
    }
}

pub struct DirectiveProcessor {
    options: LoaderOptions,
    diagnostics: Arc<dyn DiagnosticHandler>,
}

impl DirectiveProcessor {
    /// Create a processor that reports diagnostics to stderr
    pub fn new(options: LoaderOptions) -> Self {
        let diagnostics = Arc::new(ConsoleDiagnosticHandler::new(options.pretty));
        Self {
            options,
            diagnostics,
        }
    }

    /// Create a processor with a custom diagnostic handler (for testing)
    pub fn with_diagnostics(options: LoaderOptions, diagnostics: Arc<dyn DiagnosticHandler>) -> Self {
        Self {
            options,
            diagnostics,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticHandler> {
        &self.diagnostics
    }

    /// Transform one resource.
    ///
    /// With no directives the source and map are returned untouched. Otherwise
    /// the inject block is prepended and, when a map was supplied, the map is
    /// shifted to match. A malformed map is an error.
    pub fn process(&self, invocation: &Invocation<'_>) -> Result<LoaderOutput> {
        if invocation.directives.is_empty() {
            debug!(
                "No directives for {}, passing through",
                invocation.resource_path.display()
            );
            return Ok(LoaderOutput::pass_through(
                invocation.source,
                invocation.source_map,
            ));
        }

        let inject = self.build_inject(invocation);

        let Some(raw_map) = invocation.source_map else {
            return Ok(LoaderOutput::Source(inject + invocation.source));
        };

        let mut map = SourceMap::from_value(raw_map)?;
        map.prepend(&inject)?;
        map.set_file(
            invocation
                .request
                .map(str::to_string)
                .unwrap_or_else(|| invocation.resource()),
        );
        debug!(
            "Shifted source map for {} by {} line(s)",
            invocation.resource_path.display(),
            inject.matches('\n').count()
        );

        let mut code = inject;
        code.push_str(invocation.source);

        Ok(LoaderOutput::SourceWithMap {
            code,
            map: map.to_value()?,
        })
    }

    /// Build the inject block for every directive that applies to the source.
    pub fn build_inject(&self, invocation: &Invocation<'_>) -> String {
        let paths = PathInfo::from_resource(invocation.resource_path);
        let prefix = invocation
            .require_prefix
            .unwrap_or(&self.options.require_prefix);
        let mut buffer = InjectBuffer::new(&self.options.banner, prefix);

        for (key, value) in invocation.directives {
            let Some(directive) = Directive::parse(key, value, &paths) else {
                self.diagnostics.warning(
                    &invocation.resource(),
                    &format!(
                        "Skipping directive '{}': value must be a string or true, got {}",
                        key, value
                    ),
                );
                continue;
            };

            if directive.is_included(invocation.source) {
                debug!("Injecting {}", buffer.statement(&directive));
                buffer.push(&directive);
            } else {
                debug!(
                    "Skipping '{}' for {} (flag marker check)",
                    directive.module_path,
                    invocation.resource_path.display()
                );
            }
        }

        debug!(
            "{} statement(s) injected into {}",
            buffer.statement_count(),
            invocation.resource_path.display()
        );

        buffer.finish()
    }
}
