mod reader;

/// Token cursor over JSON text.
pub use reader::JsonCursor;

#[cfg(test)]
mod tests;
