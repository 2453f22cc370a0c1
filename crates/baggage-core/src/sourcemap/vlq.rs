//! Base64 VLQ as used by the `mappings` field of Source Map v3.

use super::error::{Result, SourceMapError};

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: u32 = 0x20;
const VALUE_MASK: u32 = 0x1F;

/// Encode a single value using VLQ (Variable Length Quantity) Base64 encoding
pub fn encode_vlq(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };

    loop {
        let mut digit = (vlq & VALUE_MASK as i64) as u8;
        vlq >>= 5;

        if vlq > 0 {
            digit |= CONTINUATION_BIT as u8;
        }

        out.push(BASE64_CHARS[digit as usize] as char);

        if vlq == 0 {
            break;
        }
    }
}

/// Decode every VLQ value in one segment of the mappings string.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>> {
    let mut values = Vec::with_capacity(5);
    let mut accumulator: i64 = 0;
    let mut shift = 0u32;
    let mut in_value = false;

    for character in segment.chars() {
        let digit = base64_value(character)?;
        in_value = true;

        if shift > 32 {
            return Err(SourceMapError::VlqOverflow);
        }
        accumulator |= ((digit & VALUE_MASK) as i64) << shift;

        if digit & CONTINUATION_BIT != 0 {
            shift += 5;
            continue;
        }

        let negative = accumulator & 1 == 1;
        let magnitude = accumulator >> 1;
        values.push(if negative { -magnitude } else { magnitude });

        accumulator = 0;
        shift = 0;
        in_value = false;
    }

    if in_value {
        return Err(SourceMapError::UnterminatedVlq);
    }

    Ok(values)
}

fn base64_value(character: char) -> Result<u32> {
    let value = match character {
        'A'..='Z' => character as u32 - 'A' as u32,
        'a'..='z' => character as u32 - 'a' as u32 + 26,
        '0'..='9' => character as u32 - '0' as u32 + 52,
        '+' => 62,
        '/' => 63,
        _ => return Err(SourceMapError::InvalidBase64 { character }),
    };
    Ok(value)
}
