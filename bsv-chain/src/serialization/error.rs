use std::io;

use thiserror::Error;

/// A serialization error.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// An io error that prevented deserialization
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The data to be deserialized was malformed.
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// A VarInt tag byte promised more trailing bytes than the input carries.
    #[error("invalid varint encoding")]
    InvalidVarInt,
    /// A script chunk referenced an opcode outside the closed opcode set.
    #[error("invalid opcode: {0:#x}")]
    InvalidOpcode(u8),
}
