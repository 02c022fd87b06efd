//! End-to-end conversion scenarios through the library entry point.

use confconv_core::{
    convert, encode, ConvertError, EncodeError, EncodeOptions, Format, Mapping, UnknownFormat, Value,
};

fn run(input: &str, from: Format, to: Format) -> Result<String, ConvertError> {
    convert(input.as_bytes(), from, to, EncodeOptions::default())
}

#[test]
fn yaml_service_definition_to_json() {
    let out = run("name: svc\nport: 8080\ntags: [a, b]\n", Format::Yaml, Format::Json).unwrap();
    assert_eq!(out, r#"{"name":"svc","port":8080,"tags":["a","b"]}"#);
}

#[test]
fn json_key_order_is_not_sorted() {
    let out = run(r#"{"b":1,"a":2}"#, Format::Json, Format::Json).unwrap();
    assert_eq!(out, r#"{"b":1,"a":2}"#);
}

#[test]
fn json_null_to_toml_is_an_encode_error() {
    let err = run(r#"{"enabled": null}"#, Format::Json, Format::Toml).unwrap_err();
    match &err {
        ConvertError::Encode(EncodeError::UnsupportedNull { path, .. }) => {
            assert_eq!(path.to_string(), "$.enabled");
        }
        other => panic!("expected unsupported null, got {:?}", other),
    }
    assert!(err.to_string().contains("unsupported null"));
}

#[test]
fn json_array_to_toml_is_an_encode_error() {
    let err = run("[1, 2]", Format::Json, Format::Toml).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Encode(EncodeError::NonMappingRoot { found: "sequence", .. })
    ));
}

#[test]
fn malformed_input_is_a_decode_error() {
    let err = run("a = [1,", Format::Toml, Format::Json).unwrap_err();
    assert!(matches!(err, ConvertError::Decode(_)));
    assert!(err.to_string().starts_with("invalid toml input"));
}

#[test]
fn yaml_nan_to_json_is_an_encode_error() {
    let err = run("x: .nan\n", Format::Yaml, Format::Json).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Encode(EncodeError::NonFiniteFloat { .. })
    ));
}

#[test]
fn toml_config_to_yaml() {
    let toml = "\
[package]
name = \"demo\"
edition = \"2021\"
keywords = [\"a\", \"b\"]

[dependencies]
serde = \"1\"
";
    let out = run(toml, Format::Toml, Format::Yaml).unwrap();
    let expected = "\
package:
  name: demo
  edition: \"2021\"
  keywords:
    - a
    - b
dependencies:
  serde: \"1\"
";
    assert_eq!(out, expected);
}

#[test]
fn yaml_booleans_survive_into_toml() {
    let out = run("enabled: yes\nmode: \"yes\"\n", Format::Yaml, Format::Toml).unwrap();
    assert_eq!(out, "enabled = true\nmode = \"yes\"\n");
}

#[test]
fn format_names_parse_case_insensitively() {
    assert_eq!("yaml".parse::<Format>(), Ok(Format::Yaml));
    assert_eq!("YML".parse::<Format>(), Ok(Format::Yaml));
    assert_eq!("Toml".parse::<Format>(), Ok(Format::Toml));
    assert_eq!("JSON".parse::<Format>(), Ok(Format::Json));
    for format in Format::ALL {
        assert_eq!(format.to_string().parse::<Format>(), Ok(format));
    }
}

#[test]
fn unknown_format_names_the_accepted_set() {
    let err = "xml".parse::<Format>().unwrap_err();
    assert_eq!(err, UnknownFormat("xml".to_string()));
    assert_eq!(
        err.to_string(),
        "unknown format 'xml' (expected one of: yaml, toml, json)"
    );
}

#[test]
fn null_location_is_reported_as_a_path() {
    let mut inner = Mapping::new();
    inner.insert("odd key", Value::Null);
    let mut server = Mapping::new();
    server.insert("meta", Value::Mapping(inner));
    let mut root = Mapping::new();
    root.insert("servers", Value::Sequence(vec![Value::Mapping(server)]));

    let err = encode(&Value::Mapping(root), Format::Toml).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"unsupported null at $.servers[0].meta["odd key"]: toml has no null value"#
    );
}
