//! Object-binding decoder for JSON text and JSONB binary streams.

/// Shape-driven readers, token cursors, auto-type resolution and input loading.
pub mod bind;
