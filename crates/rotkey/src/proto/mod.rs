//! Protobuf definitions and serialization for BGV types.

/// Protobuf for the BGV encryption scheme.
pub mod bgv;
