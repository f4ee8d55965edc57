use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::bind::{BindError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;
/// zstd frame magic used by compressed inputs.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Compression mode detected for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Raw uncompressed stream.
	None,
	/// zstd-compressed stream.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Wire format of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	/// UTF-8 JSON text.
	Json,
	/// Binary JSONB.
	Jsonb,
}

impl Encoding {
	/// Render encoding as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Jsonb => "jsonb",
		}
	}

	/// Guess the encoding from the first non-whitespace byte; bytes `>= 0x80` mean JSONB.
	pub fn detect(bytes: &[u8]) -> Self {
		let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
		match body.iter().find(|byte| !byte.is_ascii_whitespace()) {
			Some(&byte) if byte >= 0x80 => Self::Jsonb,
			_ => Self::Json,
		}
	}
}

impl fmt::Display for Encoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Encoding {
	type Err = BindError;

	fn from_str(value: &str) -> Result<Self> {
		match value {
			"json" => Ok(Self::Json),
			"jsonb" => Ok(Self::Jsonb),
			other => Err(BindError::Syntax {
				at: 0,
				detail: format!("unknown encoding {other}"),
			}),
		}
	}
}

/// Input bytes after decompression, with their detected or forced encoding.
#[derive(Debug, Clone)]
pub struct Source {
	/// Compression found on the raw input.
	pub compression: Compression,
	/// Wire format used for decoding.
	pub encoding: Encoding,
	bytes: Vec<u8>,
}

impl Source {
	/// Read and decompress a file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::from_bytes(fs::read(path)?)
	}

	/// Decompress in-memory input and detect its encoding.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let (compression, bytes) = decode_bytes(raw)?;
		Ok(Self {
			compression,
			encoding: Encoding::detect(&bytes),
			bytes,
		})
	}

	/// Override the detected encoding.
	pub fn with_encoding(mut self, encoding: Encoding) -> Self {
		self.encoding = encoding;
		self
	}

	/// Decompressed payload.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}
}

/// Detect and decode compression, returning `(mode, decoded_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw)?;
		return Ok((Compression::Zstd, out));
	}
	Ok((Compression::None, raw))
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > MAX_DECOMPRESSED_BYTES {
			return Err(BindError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::{Compression, Encoding, Source};

	#[test]
	fn detects_text_and_binary() {
		assert_eq!(Encoding::detect(b"  {\"a\":1}"), Encoding::Json);
		assert_eq!(Encoding::detect(b"\xef\xbb\xbf[1]"), Encoding::Json);
		assert_eq!(Encoding::detect(&[0xa6, 0xa5]), Encoding::Jsonb);
		assert_eq!(Encoding::detect(b""), Encoding::Json);
	}

	#[test]
	fn zstd_input_is_decompressed() {
		let payload = br#"{"x": 1}"#;
		let compressed = zstd::stream::encode_all(&payload[..], 3).expect("zstd encodes");
		let source = Source::from_bytes(compressed).expect("source loads");
		assert_eq!(source.compression, Compression::Zstd);
		assert_eq!(source.encoding, Encoding::Json);
		assert_eq!(source.bytes(), payload);
	}

	#[test]
	fn forced_encoding_wins() {
		let source = Source::from_bytes(b"{}".to_vec()).expect("source loads").with_encoding(Encoding::Jsonb);
		assert_eq!(source.encoding, Encoding::Jsonb);
		assert_eq!(source.compression.as_str(), "none");
	}
}
