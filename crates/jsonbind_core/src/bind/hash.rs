//! FNV-1a 64-bit name identities used for field and type dispatch.

const MAGIC_HASH_CODE: u64 = 0xcbf2_9ce4_8422_2325;
const MAGIC_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash of the reserved `@type` key that introduces a type hint in JSON text.
pub const HASH_TYPE: u64 = fnv64("@type");

/// Exact-case FNV-1a hash over the name's characters.
pub const fn fnv64(name: &str) -> u64 {
	let bytes = name.as_bytes();
	let mut hash = MAGIC_HASH_CODE;
	let mut i = 0;
	while i < bytes.len() {
		let (ch, width) = decode_char(bytes, i);
		hash ^= ch as u64;
		hash = hash.wrapping_mul(MAGIC_PRIME);
		i += width;
	}
	hash
}

/// Smart-match hash: ASCII letters folded to lowercase, `_`, `-` and spaces dropped.
///
/// `userName`, `user_name`, `USER-NAME` and `username` share one value.
pub fn fnv64_lcase(name: &str) -> u64 {
	let mut hash = MAGIC_HASH_CODE;
	for ch in name.chars() {
		if matches!(ch, '_' | '-' | ' ') {
			continue;
		}
		let ch = ch.to_ascii_lowercase();
		hash ^= u64::from(u32::from(ch));
		hash = hash.wrapping_mul(MAGIC_PRIME);
	}
	hash
}

/// Incremental exact-case hasher for names read character by character.
#[derive(Debug, Clone, Copy)]
pub struct NameHasher {
	exact: u64,
	lcase: u64,
}

impl Default for NameHasher {
	fn default() -> Self {
		Self {
			exact: MAGIC_HASH_CODE,
			lcase: MAGIC_HASH_CODE,
		}
	}
}

impl NameHasher {
	/// Feed one character.
	pub fn push(&mut self, ch: char) {
		self.exact ^= u64::from(u32::from(ch));
		self.exact = self.exact.wrapping_mul(MAGIC_PRIME);
		if matches!(ch, '_' | '-' | ' ') {
			return;
		}
		self.lcase ^= u64::from(u32::from(ch.to_ascii_lowercase()));
		self.lcase = self.lcase.wrapping_mul(MAGIC_PRIME);
	}

	/// Feed a whole string.
	pub fn push_str(&mut self, text: &str) {
		for ch in text.chars() {
			self.push(ch);
		}
	}

	/// Return `(exact, lcase)` hashes.
	pub fn finish(self) -> (u64, u64) {
		(self.exact, self.lcase)
	}
}

const fn decode_char(bytes: &[u8], i: usize) -> (u32, usize) {
	let b0 = bytes[i] as u32;
	if b0 < 0x80 {
		(b0, 1)
	} else if b0 < 0xe0 {
		(((b0 & 0x1f) << 6) | (bytes[i + 1] as u32 & 0x3f), 2)
	} else if b0 < 0xf0 {
		(((b0 & 0x0f) << 12) | ((bytes[i + 1] as u32 & 0x3f) << 6) | (bytes[i + 2] as u32 & 0x3f), 3)
	} else {
		(
			((b0 & 0x07) << 18) | ((bytes[i + 1] as u32 & 0x3f) << 12) | ((bytes[i + 2] as u32 & 0x3f) << 6) | (bytes[i + 3] as u32 & 0x3f),
			4,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::{HASH_TYPE, NameHasher, fnv64, fnv64_lcase};

	#[test]
	fn empty_name_is_offset_basis() {
		assert_eq!(fnv64(""), 0xcbf2_9ce4_8422_2325);
	}

	#[test]
	fn lcase_folds_case_and_separators() {
		let base = fnv64_lcase("username");
		assert_eq!(fnv64_lcase("userName"), base);
		assert_eq!(fnv64_lcase("user_name"), base);
		assert_eq!(fnv64_lcase("USER-NAME"), base);
		assert_ne!(fnv64("userName"), fnv64("username"));
	}

	#[test]
	fn incremental_hasher_matches_one_shot() {
		let mut hasher = NameHasher::default();
		hasher.push_str("Größe_x");
		let (exact, lcase) = hasher.finish();
		assert_eq!(exact, fnv64("Größe_x"));
		assert_eq!(lcase, fnv64_lcase("Größe_x"));
	}

	#[test]
	fn type_key_hash_is_stable() {
		assert_eq!(HASH_TYPE, fnv64("@type"));
		assert_ne!(HASH_TYPE, fnv64("type"));
	}
}
