//! Protocol codec
//!
//! Builds request frames, parses response headers, splits response bodies,
//! and provides the stream-based read loop that reassembles a full frame
//! from a transport that may deliver it in arbitrary chunks.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CacheError, Result};
use super::frame::{
    join_cas, split_cas, RequestFrame, ResponseFrame, ResponseHeader, HEADER_SIZE, MAGIC_REQUEST,
};

/// Maximum accepted response body (16 MB)
pub const MAX_BODY_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Request Building
// =============================================================================

/// Serialize a request frame to wire bytes
///
/// Fixed-order pack of the 24-byte header followed by `extra ++ key ++ value`.
/// Segment lengths are validated against their header field widths first: a
/// key or extra too long for its field would wrap and desynchronize the
/// stream.
pub fn build_request(frame: &RequestFrame) -> Result<Bytes> {
    if frame.key.len() > u16::MAX as usize {
        return Err(CacheError::Protocol(format!(
            "Key too long for header field: {} bytes (max {})",
            frame.key.len(),
            u16::MAX
        )));
    }
    if frame.extra.len() > u8::MAX as usize {
        return Err(CacheError::Protocol(format!(
            "Extra too long for header field: {} bytes (max {})",
            frame.extra.len(),
            u8::MAX
        )));
    }

    let body_length = frame.body_length();
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_length as usize);

    let (cas_high, cas_low) = split_cas(frame.cas);

    buf.put_u8(MAGIC_REQUEST);
    buf.put_u8(frame.opcode as u8);
    buf.put_u16(frame.key.len() as u16);
    buf.put_u8(frame.extra.len() as u8);
    buf.put_u8(0); // data type (reserved)
    buf.put_u16(0); // vbucket (reserved)
    buf.put_u32(body_length);
    buf.put_u32(frame.opaque);
    buf.put_u32(cas_high);
    buf.put_u32(cas_low);

    buf.extend_from_slice(&frame.extra);
    buf.extend_from_slice(&frame.key);
    buf.extend_from_slice(&frame.value);

    Ok(buf.freeze())
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Parse a 24-byte response header
///
/// An empty input is the codec's explicit "no response" signal (the peer
/// closed the connection or sent nothing).
pub fn parse_header(bytes: &[u8]) -> Result<ResponseHeader> {
    if bytes.is_empty() {
        return Err(CacheError::Protocol("no response from server".to_string()));
    }

    if bytes.len() < HEADER_SIZE {
        return Err(CacheError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut buf = &bytes[..HEADER_SIZE];
    let magic = buf.get_u8();
    let opcode = buf.get_u8();
    let key_length = buf.get_u16();
    let extra_length = buf.get_u8();
    let data_type = buf.get_u8();
    let status = buf.get_u16();
    let body_length = buf.get_u32();
    let opaque = buf.get_u32();
    let cas_high = buf.get_u32();
    let cas_low = buf.get_u32();

    Ok(ResponseHeader {
        magic,
        opcode,
        key_length,
        extra_length,
        data_type,
        status,
        body_length,
        opaque,
        cas: join_cas(cas_high, cas_low),
    })
}

/// Split a response body into its extra, key and value segments
///
/// Extra occupies the first `extra_length` bytes, key the next `key_length`
/// bytes, and the remainder is the value payload.
pub fn split_body(header: &ResponseHeader, body: Bytes) -> Result<ResponseFrame> {
    let extra_len = header.extra_length as usize;
    let key_len = header.key_length as usize;

    if body.len() < extra_len + key_len {
        return Err(CacheError::Protocol(format!(
            "Body too short for declared segments: {} bytes, extra {} + key {}",
            body.len(),
            extra_len,
            key_len
        )));
    }

    let extra = body.slice(..extra_len);
    let key = body.slice(extra_len..extra_len + key_len);
    let value = body.slice(extra_len + key_len..);

    Ok(ResponseFrame {
        header: *header,
        extra,
        key,
        value,
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a request frame to a stream, returning the number of bytes written
pub fn write_frame<W: Write>(writer: &mut W, frame: &RequestFrame) -> Result<usize> {
    let bytes = build_request(frame)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}

/// Read a complete response from a stream
///
/// Blocks until the 24-byte header and the full declared body have been
/// received. The underlying stream may deliver the frame in arbitrary
/// chunks; reads are accumulated until the byte counts are satisfied.
pub fn read_response<R: Read>(reader: &mut R) -> Result<ResponseFrame> {
    // Header first
    let mut header_bytes = [0u8; HEADER_SIZE];
    let got = read_accumulate(reader, &mut header_bytes)?;
    if got == 0 {
        return Err(CacheError::Protocol("no response from server".to_string()));
    }
    if got < HEADER_SIZE {
        return Err(CacheError::Protocol(format!(
            "Connection closed mid-header: expected {} bytes, got {}",
            HEADER_SIZE, got
        )));
    }

    let header = parse_header(&header_bytes)?;

    if header.body_length > MAX_BODY_SIZE {
        return Err(CacheError::Protocol(format!(
            "Response body too large: {} bytes (max {})",
            header.body_length, MAX_BODY_SIZE
        )));
    }

    // Then exactly body_length bytes of body
    let body_length = header.body_length as usize;
    let mut body = vec![0u8; body_length];
    if body_length > 0 {
        let got = read_accumulate(reader, &mut body)?;
        if got < body_length {
            return Err(CacheError::Protocol(format!(
                "Connection closed mid-body: expected {} bytes, got {}",
                body_length, got
            )));
        }
    }

    split_body(&header, Bytes::from(body))
}

/// Keep reading until the buffer is full or the stream reports end-of-file
///
/// Returns the number of bytes actually collected; callers decide whether a
/// short count is a clean "no response" or a truncated frame.
fn read_accumulate<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CacheError::Io(e)),
        }
    }
    Ok(filled)
}
