//! Path placeholders accepted in directive keys and variable names.

use std::path::Path;

/// Replaced with the name of the directory containing the resource.
pub const DIRNAME_TOKEN: &str = "[dirname]";

/// Replaced with the resource's file name minus its extension.
pub const FILENAME_TOKEN: &str = "[filename]";

/// Path values derived from the resource being transformed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathInfo {
    /// `/foo/bar/file.js` -> `bar`
    pub dir_name: String,
    /// `/foo/bar/file.js` -> `file`
    pub file_stem: String,
}

impl PathInfo {
    pub fn from_resource(resource_path: &Path) -> Self {
        let file_stem = resource_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let dir_name = resource_path
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            dir_name,
            file_stem,
        }
    }

    /// Substitute every placeholder token in `template`.
    pub fn expand(&self, template: &str) -> String {
        apply_placeholders(template, &self.dir_name, &self.file_stem)
    }
}

/// Replace all `[dirname]` and `[filename]` tokens. Anything else is left as is.
///
/// Substitution is a single left-to-right pass, so substituted values are
/// never scanned for tokens again.
pub fn apply_placeholders(template: &str, dir_name: &str, file_stem: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('[') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix(DIRNAME_TOKEN) {
            result.push_str(dir_name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(FILENAME_TOKEN) {
            result.push_str(file_stem);
            rest = after;
        } else {
            result.push('[');
            rest = &tail[1..];
        }
    }

    result.push_str(rest);
    result
}
