//! Source Map v3 support for prepending generated text to a mapped file.
//! Format reference: https://sourcemaps.info/spec.html

pub mod error;
pub mod mappings;
pub mod vlq;

pub use error::SourceMapError;
pub use mappings::{Mappings, OriginalPosition, Segment};

use error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON structure for source maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Interpret a host-supplied map: a JSON object, or its JSON text.
    pub fn from_value(value: &Value) -> Result<Self> {
        if let Value::String(json) = value {
            return Self::from_json(json);
        }

        let map = Self::deserialize(value)?;
        map.validate()?;
        Ok(map)
    }

    /// Parse a source map from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: Self = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<()> {
        if self.version != 3 {
            return Err(SourceMapError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    pub fn decode_mappings(&self) -> Result<Mappings> {
        Mappings::decode(&self.mappings, self.sources.len(), self.names.len())
    }

    /// Rewrite this map for output that has `text` inserted in front of the
    /// code it describes. The inserted text is left unmapped.
    pub fn prepend(&mut self, text: &str) -> Result<()> {
        let mut mappings = self.decode_mappings()?;

        let line_count = text.matches('\n').count();
        let last_line = text.rsplit('\n').next().unwrap_or(text);
        // Columns count UTF-16 code units
        let column_offset = last_line.encode_utf16().count() as u32;

        mappings.shift(line_count, column_offset);
        self.mappings = mappings.encode();
        Ok(())
    }

    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = Some(file.into());
    }

    /// Convert to the plain JSON object handed back to hosts.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Generate the inline source map data URI
    pub fn to_data_uri(&self) -> std::result::Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        let encoded =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, json.as_bytes());
        Ok(format!(
            "data:application/json;charset=utf-8;base64,{}",
            encoded
        ))
    }

    /// Generate the source mapping URL comment for JavaScript output
    pub fn to_comment(&self) -> std::result::Result<String, serde_json::Error> {
        let data_uri = self.to_data_uri()?;
        Ok(format!("//# sourceMappingURL={}", data_uri))
    }
}
