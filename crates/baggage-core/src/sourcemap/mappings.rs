//! Decoded form of the `mappings` field.

use super::error::{Result, SourceMapError};
use super::vlq::{decode_segment, encode_vlq};

/// Position in an original source that a generated column maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source_index: u32,
    pub line: u32,
    pub column: u32,
    pub name_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub generated_column: u32,
    /// `None` for segments that only mark a generated column
    pub original: Option<OriginalPosition>,
}

/// Mappings grouped by generated line, all values absolute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mappings {
    pub lines: Vec<Vec<Segment>>,
}

impl Mappings {
    /// Decode a mappings string, checking source and name indices against
    /// the lengths of the map's `sources` and `names`.
    pub fn decode(mappings: &str, source_count: usize, name_count: usize) -> Result<Self> {
        let mut lines = Vec::new();
        let mut source_index: i64 = 0;
        let mut source_line: i64 = 0;
        let mut source_column: i64 = 0;
        let mut name_index: i64 = 0;

        if mappings.is_empty() {
            return Ok(Self { lines });
        }

        for (line_number, line) in mappings.split(';').enumerate() {
            let mut segments = Vec::new();
            let mut column: i64 = 0;

            for raw in line.split(',').filter(|s| !s.is_empty()) {
                let fields = decode_segment(raw)?;

                if !matches!(fields.len(), 1 | 4 | 5) {
                    return Err(SourceMapError::InvalidSegment {
                        line: line_number,
                        fields: fields.len(),
                    });
                }

                column += fields[0];
                let generated_column = check_range(
                    "generated column",
                    column,
                    u32::MAX as usize,
                    line_number,
                )?;

                let original = if fields.len() >= 4 {
                    source_index += fields[1];
                    source_line += fields[2];
                    source_column += fields[3];

                    let name = if fields.len() == 5 {
                        name_index += fields[4];
                        Some(check_range(
                            "name index",
                            name_index,
                            name_count,
                            line_number,
                        )?)
                    } else {
                        None
                    };

                    Some(OriginalPosition {
                        source_index: check_range(
                            "source index",
                            source_index,
                            source_count,
                            line_number,
                        )?,
                        line: check_range(
                            "original line",
                            source_line,
                            u32::MAX as usize,
                            line_number,
                        )?,
                        column: check_range(
                            "original column",
                            source_column,
                            u32::MAX as usize,
                            line_number,
                        )?,
                        name_index: name,
                    })
                } else {
                    None
                };

                segments.push(Segment {
                    generated_column,
                    original,
                });
            }

            lines.push(segments);
        }

        Ok(Self { lines })
    }

    /// Encode back into the delta-compressed mappings string.
    pub fn encode(&self) -> String {
        let mut result = String::new();
        let mut prev_source_index: i64 = 0;
        let mut prev_source_line: i64 = 0;
        let mut prev_source_col: i64 = 0;
        let mut prev_name_index: i64 = 0;

        for (line_number, segments) in self.lines.iter().enumerate() {
            if line_number > 0 {
                result.push(';');
            }

            let mut prev_generated_col: i64 = 0;

            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    result.push(',');
                }

                let generated_col = segment.generated_column as i64;
                encode_vlq(generated_col - prev_generated_col, &mut result);
                prev_generated_col = generated_col;

                let Some(original) = segment.original else {
                    continue;
                };

                encode_vlq(original.source_index as i64 - prev_source_index, &mut result);
                prev_source_index = original.source_index as i64;

                encode_vlq(original.line as i64 - prev_source_line, &mut result);
                prev_source_line = original.line as i64;

                encode_vlq(original.column as i64 - prev_source_col, &mut result);
                prev_source_col = original.column as i64;

                if let Some(name_index) = original.name_index {
                    encode_vlq(name_index as i64 - prev_name_index, &mut result);
                    prev_name_index = name_index as i64;
                }
            }
        }

        result
    }

    /// Account for `line_count` new lines inserted before the first generated
    /// line, the last of which leaves the old first line starting at
    /// `column_offset`.
    pub fn shift(&mut self, line_count: usize, column_offset: u32) {
        if let Some(first) = self.lines.first_mut() {
            for segment in first.iter_mut() {
                segment.generated_column += column_offset;
            }
        }

        if line_count > 0 {
            self.lines
                .splice(0..0, std::iter::repeat_with(Vec::new).take(line_count));
        }
    }

    /// Number of segments carrying an original position.
    pub fn mapped_segment_count(&self) -> usize {
        self.lines
            .iter()
            .flatten()
            .filter(|segment| segment.original.is_some())
            .count()
    }
}

fn check_range(kind: &'static str, value: i64, limit: usize, line: usize) -> Result<u32> {
    if value < 0 || value as u64 >= limit as u64 {
        return Err(SourceMapError::OutOfRange { kind, value, line });
    }
    Ok(value as u32)
}
