use baggage_core::sourcemap::{Mappings, SourceMap, SourceMapError};
use baggage_core::{
    BaggageError, BaggageLoader, CollectingDiagnosticHandler, LoaderOptions, LoaderOutput,
    LoaderRequest, NoopHost,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn loader() -> BaggageLoader {
    BaggageLoader::with_diagnostics(
        LoaderOptions::default(),
        Arc::new(CollectingDiagnosticHandler::new()),
    )
}

fn input_map() -> Value {
    json!({
        "version": 3,
        "file": "app.js",
        "sources": ["app.ts", "util.ts"],
        "sourcesContent": ["const a = 1;\nconst b = a;\n", null],
        "names": ["a", "b"],
        "mappings": "AAAA,MAAMA,IAAI;AACN,MAAMC;ACDN"
    })
}

#[test]
fn test_map_passes_through_without_directives() {
    let map = input_map();
    let request = LoaderRequest::new(Path::new("/src/app.js"), "");
    let output = loader()
        .run(&request, "const a = 1;", Some(&map), &mut NoopHost)
        .unwrap();

    assert_eq!(
        output,
        LoaderOutput::SourceWithMap {
            code: "const a = 1;".to_string(),
            map,
        }
    );
}

#[test]
fn test_original_mappings_shift_by_injected_lines() {
    let map = input_map();
    let request = LoaderRequest::new(Path::new("/src/app.js"), "?./log=logger&./polyfill");
    let output = loader()
        .run(&request, "const a = 1;\nconst b = a;\n", Some(&map), &mut NoopHost)
        .unwrap();

    let (code, new_map) = output.into_parts();
    let new_map = SourceMap::from_value(&new_map.unwrap()).unwrap();
    let before = SourceMap::from_value(&map).unwrap().decode_mappings().unwrap();
    let after = new_map.decode_mappings().unwrap();

    let injected = code.find("const a").map(|i| code[..i].matches('\n').count()).unwrap();
    assert_eq!(injected, 5);
    assert_eq!(after.lines.len(), before.lines.len() + injected);
    assert!(after.lines[..injected].iter().all(Vec::is_empty));
    assert_eq!(&after.lines[injected..], &before.lines[..]);
    assert_eq!(after.mapped_segment_count(), before.mapped_segment_count());
}

#[test]
fn test_map_given_as_json_text() {
    let text = Value::String(input_map().to_string());
    let request = LoaderRequest::new(Path::new("/src/app.js"), "?./log=logger");
    let output = loader()
        .run(&request, "const a = 1;", Some(&text), &mut NoopHost)
        .unwrap();

    let new_map = output.map().unwrap();
    assert!(new_map.is_object());
    assert_eq!(new_map["sources"], json!(["app.ts", "util.ts"]));
    assert!(new_map["mappings"]
        .as_str()
        .unwrap()
        .starts_with(";;;;AAAA,MAAMA"));
}

#[test]
fn test_map_metadata_preserved() {
    let map = input_map();
    let request = LoaderRequest::new(Path::new("/src/app.js"), "?./log=logger")
        .with_request("/node_modules/baggage/index.js?./log=logger!/src/app.js");
    let output = loader()
        .run(&request, "const a = 1;", Some(&map), &mut NoopHost)
        .unwrap();

    let new_map = output.map().unwrap();
    assert_eq!(new_map["version"], json!(3));
    assert_eq!(
        new_map["file"],
        json!("/node_modules/baggage/index.js?./log=logger!/src/app.js")
    );
    assert_eq!(new_map["sources"], map["sources"]);
    assert_eq!(new_map["sourcesContent"], map["sourcesContent"]);
    assert_eq!(new_map["names"], map["names"]);
}

#[test]
fn test_unsupported_version_propagates() {
    let mut map = input_map();
    map["version"] = json!(2);
    let request = LoaderRequest::new(Path::new("/src/app.js"), "?./log=logger");
    let result = loader().run(&request, "x", Some(&map), &mut NoopHost);

    assert!(matches!(
        result,
        Err(BaggageError::SourceMap(SourceMapError::UnsupportedVersion(2)))
    ));
}

#[test]
fn test_corrupt_mappings_propagate() {
    let mut map = input_map();
    map["mappings"] = json!("AAAA;A$");
    let request = LoaderRequest::new(Path::new("/src/app.js"), "?./log=logger");
    let result = loader().run(&request, "x", Some(&map), &mut NoopHost);

    assert!(matches!(
        result,
        Err(BaggageError::SourceMap(SourceMapError::InvalidBase64 { character: '$' }))
    ));
}

#[test]
fn test_non_object_map_propagates() {
    let map = json!([1, 2, 3]);
    let request = LoaderRequest::new(Path::new("/src/app.js"), "?./log=logger");
    let result = loader().run(&request, "x", Some(&map), &mut NoopHost);

    assert!(matches!(
        result,
        Err(BaggageError::SourceMap(SourceMapError::Json(_)))
    ));
}

#[test]
fn test_mappings_encode_is_stable() {
    let map = SourceMap::from_value(&input_map()).unwrap();
    let mappings = map.decode_mappings().unwrap();
    assert_eq!(mappings.encode(), map.mappings);

    let reparsed = Mappings::decode(&mappings.encode(), 2, 2).unwrap();
    assert_eq!(reparsed, mappings);
}
