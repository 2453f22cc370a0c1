//! Loader query strings (`?./log=dbg#logger&./styles.css`).
//!
//! Parsing follows the conventions bundler hosts use for loader queries:
//! a `?{...}` query is a JSON object, anything else is a list of arguments
//! separated by `&` or `,`.

use crate::errors::{BaggageError, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// Ordered directive key to value mapping
pub type Query = IndexMap<String, Value>;

/// Parse a loader query. The empty string yields an empty mapping.
pub fn parse_query(query: &str) -> Result<Query> {
    if query.is_empty() {
        return Ok(Query::new());
    }

    let Some(body) = query.strip_prefix('?') else {
        return Err(BaggageError::InvalidQuery(format!(
            "query must begin with '?', got {:?}",
            query
        )));
    };

    if body.starts_with('{') && body.ends_with('}') {
        return parse_json_query(body);
    }

    let mut result = Query::new();

    for arg in body.split(['&', ',']) {
        if arg.is_empty() {
            continue;
        }

        match arg.split_once('=') {
            Some((name, value)) => {
                let value = special_value(decode(value)?);

                if let Some(name) = name.strip_suffix("[]") {
                    let entry = result
                        .entry(decode(name)?)
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if !entry.is_array() {
                        *entry = Value::Array(Vec::new());
                    }
                    if let Value::Array(items) = entry {
                        items.push(value);
                    }
                } else {
                    result.insert(decode(name)?, value);
                }
            }
            None => {
                if let Some(name) = arg.strip_prefix('-') {
                    result.insert(decode(name)?, Value::Bool(false));
                } else if let Some(name) = arg.strip_prefix('+') {
                    result.insert(decode(name)?, Value::Bool(true));
                } else {
                    result.insert(decode(arg)?, Value::Bool(true));
                }
            }
        }
    }

    Ok(result)
}

fn parse_json_query(body: &str) -> Result<Query> {
    let object: serde_json::Map<String, Value> = serde_json::from_str(body)
        .map_err(|e| BaggageError::InvalidQuery(format!("invalid JSON query: {}", e)))?;
    Ok(object.into_iter().collect())
}

fn decode(component: &str) -> Result<String> {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            BaggageError::InvalidQuery(format!("cannot decode {:?}: {}", component, e))
        })
}

fn special_value(value: String) -> Value {
    match value.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_query() {
        assert!(parse_query("").unwrap().is_empty());
        assert!(parse_query("?").unwrap().is_empty());
    }

    #[test]
    fn test_requires_question_mark() {
        assert!(matches!(
            parse_query("./log=logger"),
            Err(BaggageError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_key_value_pairs_keep_order() {
        let query = parse_query("?./b=bee&./a=ay,./c=see").unwrap();
        let keys: Vec<&str> = query.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["./b", "./a", "./c"]);
        assert_eq!(query["./a"], json!("ay"));
    }

    #[test]
    fn test_flags_in_values_survive() {
        let query = parse_query("?./log=dbg#logger&./feat=on*feature").unwrap();
        assert_eq!(query["./log"], json!("dbg#logger"));
        assert_eq!(query["./feat"], json!("on*feature"));
    }

    #[test]
    fn test_bare_and_signed_names() {
        let query = parse_query("?./polyfill&+./shim&-./off").unwrap();
        assert_eq!(query["./polyfill"], json!(true));
        assert_eq!(query["./shim"], json!(true));
        assert_eq!(query["./off"], json!(false));
    }

    #[test]
    fn test_special_values() {
        let query = parse_query("?a=true&b=false&c=null&d=").unwrap();
        assert_eq!(query["a"], json!(true));
        assert_eq!(query["b"], json!(false));
        assert_eq!(query["c"], Value::Null);
        assert_eq!(query["d"], json!(""));
    }

    #[test]
    fn test_percent_decoding() {
        let query = parse_query("?.%2Fstyles%2F%5Bfilename%5D.css=%5Bfilename%5DStyles").unwrap();
        assert_eq!(query["./styles/[filename].css"], json!("[filename]Styles"));
    }

    #[test]
    fn test_array_values() {
        let query = parse_query("?list[]=a&list[]=b").unwrap();
        assert_eq!(query["list"], json!(["a", "b"]));
    }

    #[test]
    fn test_reassignment_keeps_first_position() {
        let query = parse_query("?a=1&b=2&a=3").unwrap();
        let keys: Vec<&str> = query.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(query["a"], json!("3"));
    }

    #[test]
    fn test_json_query() {
        let query = parse_query(r##"?{"./z":"zed","./a":true,"reqPrefix":"#"}"##).unwrap();
        let keys: Vec<&str> = query.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["./z", "./a", "reqPrefix"]);
        assert_eq!(query["./a"], json!(true));
    }

    #[test]
    fn test_invalid_json_query() {
        assert!(matches!(
            parse_query("?{not json}"),
            Err(BaggageError::InvalidQuery(_))
        ));
    }
}
