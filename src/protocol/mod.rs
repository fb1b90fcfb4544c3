//! Protocol Module
//!
//! Defines the memcached binary wire protocol used between client and server.
//!
//! ## Frame Format (big-endian throughout)
//!
//! ### Request Header (24 bytes)
//! ```text
//! ┌─────────┬─────────┬──────────┬──────────┬──────────┬──────────┐
//! │Magic (1)│Opcode(1)│ KeyLen(2)│ExtraLen(1)│DataTyp(1)│Reserved(2)│
//! ├─────────┴─────────┴──────────┼──────────┴──────────┴──────────┤
//! │        BodyLen (4)           │          Opaque (4)             │
//! ├──────────────────────────────┼─────────────────────────────────┤
//! │        CAS high (4)          │          CAS low (4)            │
//! └──────────────────────────────┴─────────────────────────────────┘
//! ```
//! followed by `extra ++ key ++ value`. Magic is `0x80` for requests and
//! `0x81` for responses; the response header carries a 16-bit status code
//! in place of the reserved field.
//!
//! ### Body Layout
//! `BodyLen == extra.len() + key.len() + value.len()`. On a response the
//! first `ExtraLen` bytes of the body are the extra field, the next
//! `KeyLen` bytes the key, and the remainder the value payload.
//!
//! ### CAS Tokens
//! A CAS token is a single unsigned 64-bit value carried as two 32-bit
//! wire fields: `high = token >> 32`, `low = token & 0xFFFF_FFFF`.

mod codec;
mod frame;
mod opcode;

pub use codec::{build_request, parse_header, read_response, split_body, write_frame};
pub use frame::{
    join_cas, split_cas, RequestFrame, ResponseFrame, ResponseHeader, HEADER_SIZE,
    MAGIC_REQUEST, MAGIC_RESPONSE, STATUS_KEY_EXISTS, STATUS_KEY_NOT_FOUND, STATUS_OK,
};
pub use opcode::Opcode;
