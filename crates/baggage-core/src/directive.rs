//! Directive parsing and the inclusion policy.
//!
//! A directive is one `module => binding` pair from the loader query. The
//! binding is a small language of its own:
//!
//! ```text
//! value := [ignoreFlag] '#' [addFlag] '*' [variableName] | variableName | "" | true
//! ```
//!
//! An ignore flag suppresses the require when `@flag` occurs in the source,
//! an add flag requires `@flag` to occur for the require to be emitted.

use crate::placeholder::PathInfo;
use serde_json::Value;

pub const IGNORE_SEPARATOR: char = '#';
pub const ADD_SEPARATOR: char = '*';
pub const MARKER_SENTINEL: char = '@';

/// A directive with its flags extracted and placeholders applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub module_path: String,
    pub ignore_flag: Option<String>,
    pub add_flag: Option<String>,
    /// `None` means the module is required for its side effects only
    pub variable_name: Option<String>,
}

impl Directive {
    /// Parse a directive from its query key and value.
    ///
    /// Returns `None` when the value is neither a string nor `true`; such
    /// directives are skipped by the processor.
    pub fn parse(key: &str, value: &Value, paths: &PathInfo) -> Option<Self> {
        let module_path = paths.expand(key);

        match value {
            Value::Bool(true) => Some(Self {
                module_path,
                ignore_flag: None,
                add_flag: None,
                variable_name: None,
            }),
            Value::String(binding) => Some(Self::parse_binding(module_path, binding, paths)),
            _ => None,
        }
    }

    fn parse_binding(module_path: String, binding: &str, paths: &PathInfo) -> Self {
        let (ignore_flag, rest) = split_flag(binding, IGNORE_SEPARATOR);
        let (add_flag, rest) = split_flag(rest, ADD_SEPARATOR);

        let variable_name = if rest.is_empty() {
            None
        } else {
            Some(paths.expand(rest))
        };

        Self {
            module_path,
            ignore_flag: ignore_flag.map(str::to_string),
            add_flag: add_flag.map(str::to_string),
            variable_name,
        }
    }

    /// Decide whether this directive contributes a statement for `source`.
    ///
    /// The add flag is consulted first; when it is set the ignore flag has no
    /// effect.
    pub fn is_included(&self, source: &str) -> bool {
        if let Some(flag) = &self.add_flag {
            return contains_marker(source, flag);
        }

        if let Some(flag) = &self.ignore_flag {
            return !contains_marker(source, flag);
        }

        true
    }
}

/// Split `value` once at `separator`.
///
/// The part before the separator becomes the flag when non-empty; the part
/// after is the remainder. Without a separator the whole value is the
/// remainder.
pub fn split_flag(value: &str, separator: char) -> (Option<&str>, &str) {
    match value.split_once(separator) {
        Some((flag, rest)) if flag.is_empty() => (None, rest),
        Some((flag, rest)) => (Some(flag), rest),
        None => (None, value),
    }
}

/// `@flag`
pub fn marker(flag: &str) -> String {
    format!("{}{}", MARKER_SENTINEL, flag)
}

fn contains_marker(source: &str, flag: &str) -> bool {
    source.contains(&marker(flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn paths() -> PathInfo {
        PathInfo::from_resource(Path::new("/a/b/widget.js"))
    }

    fn parse(key: &str, value: Value) -> Directive {
        Directive::parse(key, &value, &paths()).unwrap()
    }

    #[test]
    fn test_plain_variable() {
        let directive = parse("./log", json!("logger"));
        assert_eq!(directive.module_path, "./log");
        assert_eq!(directive.variable_name.as_deref(), Some("logger"));
        assert_eq!(directive.ignore_flag, None);
        assert_eq!(directive.add_flag, None);
    }

    #[test]
    fn test_true_is_require_only() {
        let directive = parse("./polyfill", json!(true));
        assert_eq!(directive.variable_name, None);
        assert!(directive.is_included(""));
    }

    #[test]
    fn test_empty_string_is_require_only() {
        let directive = parse("./polyfill", json!(""));
        assert_eq!(directive.variable_name, None);
    }

    #[test]
    fn test_ignore_flag() {
        let directive = parse("./log", json!("dbg#logger"));
        assert_eq!(directive.ignore_flag.as_deref(), Some("dbg"));
        assert_eq!(directive.add_flag, None);
        assert_eq!(directive.variable_name.as_deref(), Some("logger"));
    }

    #[test]
    fn test_empty_ignore_flag_still_splits() {
        let directive = parse("./log", json!("#logger"));
        assert_eq!(directive.ignore_flag, None);
        assert_eq!(directive.variable_name.as_deref(), Some("logger"));
    }

    #[test]
    fn test_ignore_flag_without_variable() {
        let directive = parse("./styles.css", json!("nostyle#"));
        assert_eq!(directive.ignore_flag.as_deref(), Some("nostyle"));
        assert_eq!(directive.variable_name, None);
    }

    #[test]
    fn test_add_flag() {
        let directive = parse("./feat", json!("on*feature"));
        assert_eq!(directive.add_flag.as_deref(), Some("on"));
        assert_eq!(directive.ignore_flag, None);
        assert_eq!(directive.variable_name.as_deref(), Some("feature"));
    }

    #[test]
    fn test_both_flags() {
        let directive = parse("./feat", json!("off#on*feature"));
        assert_eq!(directive.ignore_flag.as_deref(), Some("off"));
        assert_eq!(directive.add_flag.as_deref(), Some("on"));
        assert_eq!(directive.variable_name.as_deref(), Some("feature"));
    }

    #[test]
    fn test_split_at_first_separator_only() {
        let directive = parse("./x", json!("a#b#c"));
        assert_eq!(directive.ignore_flag.as_deref(), Some("a"));
        assert_eq!(directive.variable_name.as_deref(), Some("b#c"));
    }

    #[test]
    fn test_placeholders_in_key_and_variable() {
        let directive = parse("./[dirname]-helper", json!("[filename]Helper"));
        assert_eq!(directive.module_path, "./b-helper");
        assert_eq!(directive.variable_name.as_deref(), Some("widgetHelper"));
    }

    #[test]
    fn test_flags_are_not_expanded() {
        let directive = parse("./x", json!("[filename]#y"));
        assert_eq!(directive.ignore_flag.as_deref(), Some("[filename]"));
    }

    #[test]
    fn test_malformed_values_rejected() {
        let info = paths();
        assert!(Directive::parse("./x", &json!(false), &info).is_none());
        assert!(Directive::parse("./x", &Value::Null, &info).is_none());
        assert!(Directive::parse("./x", &json!(42), &info).is_none());
        assert!(Directive::parse("./x", &json!(["a", "b"]), &info).is_none());
        assert!(Directive::parse("./x", &json!({"a": 1}), &info).is_none());
    }

    #[test]
    fn test_ignore_policy() {
        let directive = parse("./log", json!("dbg#logger"));
        assert!(directive.is_included("var x = 1;"));
        assert!(!directive.is_included("// @dbg\nvar x = 1;"));
    }

    #[test]
    fn test_add_policy() {
        let directive = parse("./feat", json!("on*feature"));
        assert!(!directive.is_included("var x = 1;"));
        assert!(directive.is_included("/* @on */ var x = 1;"));
    }

    #[test]
    fn test_add_flag_takes_precedence() {
        let directive = parse("./feat", json!("off#on*feature"));
        assert!(directive.is_included("@on @off"));
        assert!(!directive.is_included("@off"));
        assert!(!directive.is_included(""));
    }

    #[test]
    fn test_marker_needs_sentinel() {
        let directive = parse("./log", json!("dbg#logger"));
        assert!(directive.is_included("dbg"));
        assert!(!directive.is_included("@dbgExtra"));
    }

    #[test]
    fn test_split_flag() {
        assert_eq!(split_flag("a#b", '#'), (Some("a"), "b"));
        assert_eq!(split_flag("#b", '#'), (None, "b"));
        assert_eq!(split_flag("b", '#'), (None, "b"));
        assert_eq!(split_flag("a#", '#'), (Some("a"), ""));
    }
}
