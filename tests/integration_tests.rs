use ciborium::value::Value;
use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize};
use serde_cbor_writer::{
    cbor, to_vec, to_writer, BignumPolicy, CborValue, CheckedEncoder, Encoder, EncoderOptions,
    Error,
};
use std::io;

fn decode(bytes: &[u8]) -> Value {
    ciborium::de::from_reader::<Value, _>(bytes).unwrap()
}

fn decode_int(bytes: &[u8]) -> i128 {
    match decode(bytes) {
        Value::Integer(i) => i128::from(i),
        other => panic!("Expected integer, got {:?}", other),
    }
}

fn encode_u64(value: u64) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_u64(value).unwrap();
    encoder.into_inner()
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
    manager: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Event {
    Ping,
    Login(User),
    Move { dx: i64, dy: i64 },
    Pair(u8, String),
}

#[test]
fn test_unsigned_boundaries_roundtrip() {
    let cases: &[(u64, usize)] = &[
        (0, 1),
        (23, 1),
        (24, 2),
        (255, 2),
        (256, 3),
        (65_535, 3),
        (65_536, 5),
        (u32::MAX as u64, 5),
        (u32::MAX as u64 + 1, 9),
        (u64::MAX, 9),
    ];

    for &(value, len) in cases {
        let bytes = encode_u64(value);
        assert_eq!(bytes.len(), len, "encoded length of {}", value);
        assert_eq!(decode_int(&bytes), value as i128);
    }
}

#[test]
fn test_documented_byte_sequences() {
    assert_eq!(encode_u64(23), [0x17]);
    assert_eq!(encode_u64(24), [0x18, 0x18]);
    assert_eq!(encode_u64(256), [0x19, 0x01, 0x00]);
    assert_eq!(encode_u64(65_536), [0x1a, 0x00, 0x01, 0x00, 0x00]);
}

#[test]
fn test_negative_integers_decode_as_negative() {
    for value in [-1i64, -10, -24, -25, -100, -1000, -65_537, i64::MIN] {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_i64(value).unwrap();
        assert_eq!(decode_int(encoder.get_ref()), value as i128);
    }

    // -2^64 is the most negative value a plain header can carry
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_i128(-(1i128 << 64)).unwrap();
    assert_eq!(decode_int(encoder.get_ref()), -(1i128 << 64));
}

#[test]
fn test_all_integer_domains_decode_identically() {
    for value in [0u32, 1, 24, 1000, 1_000_000, u32::MAX] {
        let mut narrow = Encoder::new(Vec::new());
        narrow.write_u32(value).unwrap();
        let mut wide = Encoder::new(Vec::new());
        wide.write_u128(value as u128).unwrap();
        let mut big = Encoder::new(Vec::new());
        big.write_biguint(&BigUint::from(value)).unwrap();

        assert_eq!(narrow.get_ref(), wide.get_ref());
        assert_eq!(narrow.get_ref(), big.get_ref());
        assert_eq!(decode_int(narrow.get_ref()), value as i128);

        let mut negative = Encoder::new(Vec::new());
        negative.write_bigint(&-BigInt::from(value)).unwrap();
        assert_eq!(decode_int(negative.get_ref()), -(value as i128));
    }
}

#[test]
fn test_bignums_decode_with_compliant_reader() {
    let big = (u64::MAX as u128) * 3;
    let bytes = to_vec(&big).unwrap();
    assert_eq!(bytes[0], 0xc2);
    let back: u128 = ciborium::de::from_reader(bytes.as_slice()).unwrap();
    assert_eq!(back, big);

    let small = -(big as i128);
    let bytes = to_vec(&small).unwrap();
    assert_eq!(bytes[0], 0xc3);
    let back: i128 = ciborium::de::from_reader(bytes.as_slice()).unwrap();
    assert_eq!(back, small);
}

#[test]
fn test_bignum_beyond_u128_is_deterministic() {
    let huge = BigUint::from(1u8) << 200;
    let mut first = Encoder::new(Vec::new());
    first.write_biguint(&huge).unwrap();
    let mut second = Encoder::new(Vec::new());
    second.write_biguint(&huge).unwrap();

    let bytes = first.into_inner();
    assert_eq!(bytes, second.into_inner());
    // tag 2, byte string of 26 bytes (0x58 0x1a), leading 0x01
    assert_eq!(&bytes[..4], &[0xc2, 0x58, 0x1a, 0x01]);
    assert!(bytes[4..].iter().all(|b| *b == 0));

    let options = EncoderOptions::new().with_bignum(BignumPolicy::Reject);
    let mut rejecting = Encoder::with_options(Vec::new(), options);
    let err = rejecting.write_biguint(&huge).unwrap_err();
    assert!(matches!(err, Error::MagnitudeOverflow { major: 0 }));
    assert!(rejecting.into_inner().is_empty());
}

#[test]
fn test_strings_and_headers() {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_bytes(b"abc").unwrap();
    assert_eq!(encoder.get_ref()[..], [0x43, b'a', b'b', b'c']);
    assert_eq!(decode(encoder.get_ref()), Value::Bytes(b"abc".to_vec()));

    let mut encoder = Encoder::new(Vec::new());
    encoder.write_str("abc").unwrap();
    assert_eq!(encoder.get_ref()[..], [0x63, b'a', b'b', b'c']);

    let mut encoder = Encoder::new(Vec::new());
    encoder.write_array(2u32).unwrap();
    assert_eq!(encoder.get_ref()[..], [0x82]);

    let mut encoder = Encoder::new(Vec::new());
    encoder.write_map(1u32).unwrap();
    assert_eq!(encoder.get_ref()[..], [0xa1]);
}

#[test]
fn test_struct_roundtrip() {
    let user = User {
        id: 70_000,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "ops".to_string()],
        manager: None,
    };

    let bytes = to_vec(&user).unwrap();
    let back: User = ciborium::de::from_reader(bytes.as_slice()).unwrap();
    assert_eq!(user, back);
}

#[test]
fn test_enum_roundtrip() {
    let events = vec![
        Event::Ping,
        Event::Login(User {
            id: 1,
            name: "Bob".to_string(),
            active: false,
            tags: vec![],
            manager: Some(u64::MAX),
        }),
        Event::Move { dx: -3, dy: 500 },
        Event::Pair(9, "nine".to_string()),
    ];

    let bytes = to_vec(&events).unwrap();
    let back: Vec<Event> = ciborium::de::from_reader(bytes.as_slice()).unwrap();
    assert_eq!(events, back);
}

#[test]
fn test_matches_ciborium_output_for_integer_documents() {
    let doc = serde_json::json!({
        "count": 65_536,
        "delta": -500,
        "items": [0, 23, 24, 255, 256, "x", null, true],
        "name": "héllo"
    });

    let ours = to_vec(&doc).unwrap();
    let mut theirs = Vec::new();
    ciborium::ser::into_writer(&doc, &mut theirs).unwrap();
    assert_eq!(ours, theirs);
}

#[test]
fn test_dynamic_value_tree() {
    let value = cbor!({
        "uri": (CborValue::tagged(32, "https://example.com")),
        "raw": (vec![1u8, 2, 3]),
        "n": (-7),
        "missing": null
    });

    let mut encoder = Encoder::new(Vec::new());
    encoder.write_value(&value).unwrap();

    let decoded = decode(encoder.get_ref());
    let entries = match decoded {
        Value::Map(entries) => entries,
        other => panic!("Expected map, got {:?}", other),
    };
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].0, Value::Text("uri".to_string()));
    assert_eq!(
        entries[0].1,
        Value::Tag(32, Box::new(Value::Text("https://example.com".to_string())))
    );
    assert_eq!(entries[1].1, Value::Bytes(vec![1, 2, 3]));
    assert_eq!(entries[2].1, Value::Integer((-7).into()));
    assert_eq!(entries[3].1, Value::Null);
}

#[test]
fn test_checked_encoder_output_decodes() {
    let mut encoder = CheckedEncoder::new(Vec::new());
    encoder.write_map_indefinite().unwrap();
    encoder.write_str("list").unwrap();
    encoder.write_array(3u32).unwrap();
    encoder.write_i64(-1).unwrap();
    encoder.write_f64(0.5).unwrap();
    encoder.write_str_indefinite().unwrap();
    encoder.write_str("ab").unwrap();
    encoder.write_str("cd").unwrap();
    encoder.write_break().unwrap();
    encoder.write_break().unwrap();

    let bytes = encoder.finish().unwrap();
    let expected = Value::Map(vec![(
        Value::Text("list".to_string()),
        Value::Array(vec![
            Value::Integer((-1).into()),
            Value::Float(0.5),
            Value::Text("abcd".to_string()),
        ]),
    )]);
    assert_eq!(decode(&bytes), expected);
}

struct ClosedSink;

impl io::Write for ClosedSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_sink_failure_reaches_caller() {
    let err = to_writer(ClosedSink, &vec![1, 2, 3]).unwrap_err();
    match err {
        Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("Expected Io error, got {:?}", other),
    }
}
