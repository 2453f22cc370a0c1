pub mod config;
pub mod diagnostics;
pub mod directive;
pub mod errors;
pub mod inject;
pub mod loader;
pub mod placeholder;
pub mod processor;
pub mod query;
pub mod sourcemap;

pub use config::{BaggageConfig, CliOverrides, LoaderOptions};
pub use diagnostics::{
    CollectingDiagnosticHandler, ConsoleDiagnosticHandler, Diagnostic, DiagnosticHandler,
};
pub use directive::Directive;
pub use errors::BaggageError;
pub use loader::{BaggageLoader, LoaderHost, LoaderRequest, NoopHost};
pub use processor::{DirectiveProcessor, Directives, Invocation, LoaderOutput};
pub use sourcemap::{SourceMap, SourceMapError};
