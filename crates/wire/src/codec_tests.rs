// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn encode_returns_json_without_length_prefix() {
    let value = serde_json::json!({"type": "ping"});
    let encoded = encode(&value).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {}", json_str);
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    assert_eq!(buffer.len(), HEADER_LEN + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_eight_byte_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&buffer[..HEADER_LEN]);
    let len = u64::from_be_bytes(header);

    assert_eq!(len, data.len() as u64);
    assert_eq!(&buffer[HEADER_LEN..], data);
}

#[tokio::test]
async fn read_message_rejects_oversized_length() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_MESSAGE_LEN + 1).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge(_)));
}

#[tokio::test]
async fn read_decoded_and_write_encoded_roundtrip() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Sample {
        n: u32,
        s: String,
    }

    let value = Sample { n: 7, s: "hi".into() };
    let mut buffer = Vec::new();
    write_encoded(&mut buffer, &value).await.unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    let back: Sample = read_decoded(&mut cursor).await.unwrap();
    assert_eq!(value, back);
}

#[test]
fn sync_read_write_message_roundtrip() {
    let original = b"blocking worker payload";
    let mut buffer = Vec::new();
    write_message_sync(&mut buffer, original).expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message_sync(&mut cursor).expect("read failed");
    assert_eq!(read_back, original);
}

#[test]
fn sync_read_decoded_and_write_encoded_roundtrip() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Sample {
        n: u32,
    }

    let value = Sample { n: 99 };
    let mut buffer = Vec::new();
    write_encoded_sync(&mut buffer, &value).unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    let back: Sample = read_decoded_sync(&mut cursor).unwrap();
    assert_eq!(value, back);
}
