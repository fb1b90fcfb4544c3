//! Value Codec Tests
//!
//! Round trips for every supported value kind, serializer selection and
//! compression handling.

use cachewire::options::{ClientOptions, OptionValue, Serializer, OPT_COMPRESSION, OPT_SERIALIZER};
use cachewire::value::{decode, encode, Value, FLAG_COMPRESSED, TYPE_MASK};

fn options_with_compression() -> ClientOptions {
    let mut options = ClientOptions::new();
    options.set(OPT_COMPRESSION, OptionValue::Bool(true));
    options
}

fn round_trip(value: Value, options: &ClientOptions) -> Value {
    let (flags, payload) = encode(&value, options).unwrap();
    decode(flags, &payload, options).unwrap()
}

// =============================================================================
// Primitive Round Trips
// =============================================================================

#[test]
fn test_round_trip_text() {
    let options = ClientOptions::new();
    let value = Value::Text("hello world".to_string());
    assert_eq!(round_trip(value.clone(), &options), value);
}

#[test]
fn test_round_trip_integer() {
    let options = ClientOptions::new();
    for n in [0i64, 1, -1, 42, i64::MAX, i64::MIN] {
        assert_eq!(round_trip(Value::Integer(n), &options), Value::Integer(n));
    }
}

#[test]
fn test_round_trip_double() {
    let options = ClientOptions::new();
    for n in [0.0f64, 1.5, -273.15, 1e300] {
        assert_eq!(round_trip(Value::Double(n), &options), Value::Double(n));
    }
}

#[test]
fn test_round_trip_boolean() {
    let options = ClientOptions::new();
    assert_eq!(
        round_trip(Value::Boolean(true), &options),
        Value::Boolean(true)
    );
    assert_eq!(
        round_trip(Value::Boolean(false), &options),
        Value::Boolean(false)
    );
}

#[test]
fn test_boolean_false_is_empty_payload() {
    let options = ClientOptions::new();
    let (_, payload) = encode(&Value::Boolean(false), &options).unwrap();
    assert!(payload.is_empty());
}

#[test]
fn test_boolean_zero_payload_decodes_false() {
    let options = ClientOptions::new();
    // flags 3 = boolean type tag
    assert_eq!(decode(3, b"0", &options).unwrap(), Value::Boolean(false));
    assert_eq!(decode(3, b"1", &options).unwrap(), Value::Boolean(true));
}

#[test]
fn test_integer_payload_is_ascii_decimal() {
    let options = ClientOptions::new();
    let (flags, payload) = encode(&Value::Integer(12345), &options).unwrap();
    assert_eq!(flags & TYPE_MASK, 1);
    assert_eq!(payload, b"12345");
}

// =============================================================================
// Structured Round Trips
// =============================================================================

#[test]
fn test_round_trip_structured_binary_serializer() {
    let options = ClientOptions::new();
    let value = Value::Structured(serde_json::json!({
        "name": "widget",
        "count": 3,
        "tags": ["a", "b"],
    }));
    assert_eq!(round_trip(value.clone(), &options), value);
}

#[test]
fn test_round_trip_structured_json_serializer() {
    let mut options = ClientOptions::new();
    options.set(OPT_SERIALIZER, OptionValue::Serializer(Serializer::Json));

    let value = Value::Structured(serde_json::json!([1, 2, {"nested": true}]));
    assert_eq!(round_trip(value.clone(), &options), value);
}

#[test]
fn test_structured_flags_carry_serialized_tag() {
    let options = ClientOptions::new();
    let (flags, _) = encode(&Value::Structured(serde_json::json!(null)), &options).unwrap();
    assert_eq!(flags & TYPE_MASK, 4);
}

#[test]
fn test_serializer_mismatch_fails() {
    let mut json_options = ClientOptions::new();
    json_options.set(OPT_SERIALIZER, OptionValue::Serializer(Serializer::Json));

    let binary_options = ClientOptions::new();
    let value = Value::Structured(serde_json::json!({"k": "v"}));
    let (flags, payload) = encode(&value, &json_options).unwrap();

    // Decoding JSON bytes with the binary serializer is a caller error;
    // there is no self-describing marker to catch it earlier.
    assert!(decode(flags, &payload, &binary_options).is_err());
}

// =============================================================================
// Compression Tests
// =============================================================================

#[test]
fn test_compression_round_trip_carries_flag() {
    let options = options_with_compression();
    let value = Value::Text("a".repeat(4096));

    let (flags, payload) = encode(&value, &options).unwrap();
    assert_ne!(flags & FLAG_COMPRESSED, 0);
    assert!(payload.len() < 4096); // highly repetitive input must shrink

    assert_eq!(decode(flags, &payload, &options).unwrap(), value);
}

#[test]
fn test_compression_applies_to_every_kind() {
    let options = options_with_compression();
    let values = [
        Value::Text("text".to_string()),
        Value::Integer(-99),
        Value::Double(2.5),
        Value::Boolean(true),
        Value::Structured(serde_json::json!({"deep": [1, 2, 3]})),
    ];

    for value in values {
        let (flags, payload) = encode(&value, &options).unwrap();
        assert_ne!(flags & FLAG_COMPRESSED, 0);
        assert_eq!(decode(flags, &payload, &options).unwrap(), value);
    }
}

#[test]
fn test_no_compression_flag_when_disabled() {
    let options = ClientOptions::new();
    let (flags, _) = encode(&Value::Text("plain".to_string()), &options).unwrap();
    assert_eq!(flags & FLAG_COMPRESSED, 0);
}

#[test]
fn test_compressed_flag_and_type_tag_are_orthogonal() {
    let options = options_with_compression();
    let (flags, _) = encode(&Value::Integer(7), &options).unwrap();
    assert_eq!(flags & TYPE_MASK, 1);
    assert_ne!(flags & FLAG_COMPRESSED, 0);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_garbage_integer_payload_is_protocol_error() {
    let options = ClientOptions::new();
    let err = decode(1, b"not-a-number", &options).unwrap_err();
    assert!(err.to_string().contains("Invalid integer"));
}

#[test]
fn test_garbage_double_payload_is_protocol_error() {
    let options = ClientOptions::new();
    assert!(decode(2, b"x", &options).is_err());
}

#[test]
fn test_unknown_type_tag_is_protocol_error() {
    let options = ClientOptions::new();
    let err = decode(9, b"payload", &options).unwrap_err();
    assert!(err.to_string().contains("Unknown value type tag"));
}

#[test]
fn test_corrupt_compressed_payload_fails() {
    let options = options_with_compression();
    // compressed bit set over bytes that are not a zlib stream
    assert!(decode(FLAG_COMPRESSED, b"definitely not zlib", &options).is_err());
}
