//! Opcode definitions
//!
//! One-byte command identifiers of the binary protocol.

/// Binary protocol opcodes
///
/// A CAS store reuses [`Opcode::Set`]; the server distinguishes it by the
/// presence of a non-zero CAS token in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Get = 0x00,
    Set = 0x01,
    Add = 0x02,
    Replace = 0x03,
    Delete = 0x04,
    Increment = 0x05,
    Decrement = 0x06,
    Quit = 0x07,
    Flush = 0x08,
    Version = 0x0b,
    Append = 0x0e,
    Prepend = 0x0f,
    Touch = 0x1c,
    SaslListMechanisms = 0x20,
    SaslAuth = 0x21,
}
