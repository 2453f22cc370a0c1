//! Builds the block of `require` statements prepended to a module.

use crate::directive::Directive;

pub const DEFAULT_BANNER: &str = "/* injects from baggage-loader */";

/// Accumulates injected statements in directive order
#[derive(Debug, Clone)]
pub struct InjectBuffer {
    output: String,
    require_prefix: String,
    statement_count: usize,
}

impl InjectBuffer {
    pub fn new(banner: &str, require_prefix: impl Into<String>) -> Self {
        let mut output = String::from("\n");
        if !banner.is_empty() {
            output.push_str(banner);
            output.push('\n');
        }

        Self {
            output,
            require_prefix: require_prefix.into(),
            statement_count: 0,
        }
    }

    /// Append the statement for `directive`.
    pub fn push(&mut self, directive: &Directive) {
        let statement = self.statement(directive);
        self.output.push_str(&statement);
        self.output.push('\n');
        self.statement_count += 1;
    }

    /// `var name = require('prefix/module');` or `require('prefix/module');`
    pub fn statement(&self, directive: &Directive) -> String {
        let require = format!(
            "require('{}{}');",
            self.require_prefix, directive.module_path
        );

        match &directive.variable_name {
            Some(name) => format!("var {} = {}", name, require),
            None => require,
        }
    }

    pub fn statement_count(&self) -> usize {
        self.statement_count
    }

    /// Close the block with a blank line and return its text.
    pub fn finish(mut self) -> String {
        self.output.push('\n');
        self.output
    }
}
