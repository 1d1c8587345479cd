//! Protobuf definitions for polynomials.

/// Protobuf for polynomials in rq.
pub(crate) mod rq;
