// Frame, info and Env definitions live in the single-source `core.rs` at the
// crate root; this file exposes them as `crate::core`.
include!(concat!(env!("CARGO_MANIFEST_DIR"), "/core.rs"));
