/// Shape-bound decode command.
pub mod decode;
/// JSON to JSONB conversion command.
pub mod encode;
/// Decoded value tree printer.
pub mod print;
/// Shape definition file loading.
pub mod shape_file;
/// Shape listing command.
pub mod shapes;
/// Shared CLI helpers.
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
