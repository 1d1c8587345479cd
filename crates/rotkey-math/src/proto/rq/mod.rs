#[allow(clippy::all, dead_code)]
mod generated;

pub use generated::*;
