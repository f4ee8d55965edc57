use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::bind::BindError;

/// Decode feature bitmask.
///
/// The effective mask of one decode call is the union of the reader's own features, the
/// call-site features and the cursor context features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Features(u64);

impl Features {
	/// No features.
	pub const NONE: Self = Self(0);
	/// Allow raw allocation of instances when the shape has no creator.
	pub const FIELD_BASED: Self = Self(1);
	/// Accept a JSON array as positional encoding of an object.
	pub const SUPPORT_ARRAY_TO_BEAN: Self = Self(1 << 1);
	/// Fall back to case- and separator-insensitive field name matching.
	pub const SUPPORT_SMART_MATCH: Self = Self(1 << 2);
	/// Reject fields that match no binding instead of skipping them.
	pub const ERROR_ON_UNKNOWN_PROPERTIES: Self = Self(1 << 3);
	/// Trim surrounding whitespace from decoded string values.
	pub const TRIM_STRING: Self = Self(1 << 4);
	/// Zero value of string fields is `""` instead of null.
	pub const INIT_STRING_FIELD_AS_EMPTY: Self = Self(1 << 5);

	const NAMED: [(&'static str, Self); 6] = [
		("field_based", Self::FIELD_BASED),
		("support_array_to_bean", Self::SUPPORT_ARRAY_TO_BEAN),
		("support_smart_match", Self::SUPPORT_SMART_MATCH),
		("error_on_unknown_properties", Self::ERROR_ON_UNKNOWN_PROPERTIES),
		("trim_string", Self::TRIM_STRING),
		("init_string_field_as_empty", Self::INIT_STRING_FIELD_AS_EMPTY),
	];

	/// Build from raw mask bits.
	pub const fn from_bits(bits: u64) -> Self {
		Self(bits)
	}

	/// Return raw mask bits.
	pub const fn bits(self) -> u64 {
		self.0
	}

	/// Return whether every bit of `other` is set.
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	/// Return whether no bit is set.
	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// Return the union of both masks.
	pub const fn union(self, other: Self) -> Self {
		Self(self.0 | other.0)
	}

	/// Parse a list of feature names into one mask.
	pub fn parse_list<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, BindError> {
		names.into_iter().try_fold(Self::NONE, |acc, name| Ok(acc | name.parse::<Self>()?))
	}

	/// Iterate names of the set bits.
	pub fn names(self) -> impl Iterator<Item = &'static str> {
		Self::NAMED.into_iter().filter(move |(_, flag)| self.contains(*flag)).map(|(name, _)| name)
	}
}

impl BitOr for Features {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		self.union(rhs)
	}
}

impl BitOrAssign for Features {
	fn bitor_assign(&mut self, rhs: Self) {
		*self = self.union(rhs);
	}
}

impl FromStr for Features {
	type Err = BindError;

	/// Accepts snake_case names; the `support_` prefix may be omitted.
	fn from_str(name: &str) -> Result<Self, Self::Err> {
		let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
		Self::NAMED
			.iter()
			.find(|(label, _)| *label == normalized || label.strip_prefix("support_") == Some(normalized.as_str()))
			.map(|(_, flag)| *flag)
			.ok_or_else(|| BindError::InvalidFeature { name: name.to_owned() })
	}
}

impl fmt::Display for Features {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for name in self.names() {
			if !first {
				f.write_str("|")?;
			}
			f.write_str(name)?;
			first = false;
		}
		if first {
			f.write_str("none")?;
		}
		Ok(())
	}
}
