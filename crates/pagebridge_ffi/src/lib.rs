//! Host-facing FFI surface for the injection bridge.

pub mod api;
