//! Read-Loop Tests
//!
//! The response reader must reassemble a full frame no matter how the
//! underlying stream fragments it, and must distinguish a clean
//! "no response" from a frame truncated mid-stream.

use std::io::{Cursor, Read};

use cachewire::protocol::{read_response, STATUS_OK};

/// A reader that hands out at most `chunk` bytes per read call
struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedReader {
    fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk,
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn response_bytes(status: u16, extra: &[u8], key: &[u8], value: &[u8]) -> Vec<u8> {
    let body_length = (extra.len() + key.len() + value.len()) as u32;
    let mut out = Vec::with_capacity(24 + body_length as usize);
    out.push(0x81);
    out.push(0x00);
    out.extend_from_slice(&(key.len() as u16).to_be_bytes());
    out.push(extra.len() as u8);
    out.push(0);
    out.extend_from_slice(&status.to_be_bytes());
    out.extend_from_slice(&body_length.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&0u64.to_be_bytes());
    out.extend_from_slice(extra);
    out.extend_from_slice(key);
    out.extend_from_slice(value);
    out
}

// =============================================================================
// Reassembly Tests
// =============================================================================

#[test]
fn test_single_chunk_read() {
    let bytes = response_bytes(STATUS_OK, &[0, 0, 0, 0], b"k", b"hello");
    let frame = read_response(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(frame.header.status, STATUS_OK);
    assert_eq!(&frame.key[..], b"k");
    assert_eq!(&frame.value[..], b"hello");
}

#[test]
fn test_one_byte_chunks_reassemble_identically() {
    let bytes = response_bytes(STATUS_OK, &[0, 0, 0, 0], b"key", b"fragmented body payload");

    let whole = read_response(&mut Cursor::new(bytes.clone())).unwrap();
    let chunked = read_response(&mut ChunkedReader::new(bytes, 1)).unwrap();

    assert_eq!(chunked.header, whole.header);
    assert_eq!(chunked.extra, whole.extra);
    assert_eq!(chunked.key, whole.key);
    assert_eq!(chunked.value, whole.value);
}

#[test]
fn test_odd_chunk_sizes() {
    let bytes = response_bytes(STATUS_OK, &[0, 0, 0, 0], b"", &vec![0xAB; 1000]);

    for chunk in [2, 3, 7, 24, 25, 999] {
        let frame = read_response(&mut ChunkedReader::new(bytes.clone(), chunk)).unwrap();
        assert_eq!(frame.value.len(), 1000, "chunk size {}", chunk);
        assert!(frame.value.iter().all(|&b| b == 0xAB));
    }
}

#[test]
fn test_empty_body_response() {
    let bytes = response_bytes(STATUS_OK, &[], b"", b"");
    let frame = read_response(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(frame.header.body_length, 0);
    assert!(frame.value.is_empty());
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_no_bytes_is_no_response() {
    let err = read_response(&mut Cursor::new(Vec::new())).unwrap_err();
    assert!(err.to_string().contains("no response"));
}

#[test]
fn test_truncated_header_is_distinct_from_no_response() {
    let bytes = response_bytes(STATUS_OK, &[], b"", b"")[..10].to_vec();
    let err = read_response(&mut Cursor::new(bytes)).unwrap_err();
    assert!(err.to_string().contains("mid-header"));
}

#[test]
fn test_truncated_body() {
    let mut bytes = response_bytes(STATUS_OK, &[0, 0, 0, 0], b"", b"full value");
    bytes.truncate(bytes.len() - 4);
    let err = read_response(&mut Cursor::new(bytes)).unwrap_err();
    assert!(err.to_string().contains("mid-body"));
}
