/// Marker byte table.
pub mod constants;
pub(crate) mod reader;
mod writer;

/// Token cursor over JSONB bytes.
pub use reader::JsonbCursor;
/// Low-level JSONB value writer.
pub use writer::JsonbWriter;

#[cfg(test)]
mod tests;
