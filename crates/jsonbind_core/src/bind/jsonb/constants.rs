//! JSONB marker bytes.
//!
//! Values follow the JSONB marker table (signed markers stored as their `u8` bit pattern).
//! Multi-byte integers and doubles are big-endian.

/// Binary payload: int32 length, then raw bytes.
pub const BC_BINARY: u8 = 0x91;
/// Typed-value prefix: type name string, then the value.
pub const BC_TYPED_ANY: u8 = 0x92;
/// Array with inline count 0.
pub const BC_ARRAY_FIX_0: u8 = 0x94;
/// Array with inline count 15.
pub const BC_ARRAY_FIX_MAX: u8 = 0xa3;
/// Array with int32 count.
pub const BC_ARRAY: u8 = 0xa4;
/// Object end.
pub const BC_OBJECT_END: u8 = 0xa5;
/// Object start.
pub const BC_OBJECT: u8 = 0xa6;
/// Null.
pub const BC_NULL: u8 = 0xaf;
/// `false`.
pub const BC_FALSE: u8 = 0xb0;
/// `true`.
pub const BC_TRUE: u8 = 0xb1;
/// Double `0.0`.
pub const BC_DOUBLE_NUM_0: u8 = 0xb2;
/// Double `1.0`.
pub const BC_DOUBLE_NUM_1: u8 = 0xb3;
/// Double, 8 bytes.
pub const BC_DOUBLE: u8 = 0xb5;
/// Int64, 8 bytes.
pub const BC_INT64: u8 = 0xbe;

/// Smallest single-byte int32 (the marker byte is the value).
pub const INT32_NUM_MIN: i32 = -16;
/// Largest single-byte int32.
pub const INT32_NUM_MAX: i32 = 47;
/// First marker of the two-byte int32 form.
pub const BC_INT32_BYTE_MIN: u8 = 0x30;
/// Marker of the two-byte form whose high part is zero.
pub const BC_INT32_BYTE_ZERO: u8 = 0x38;
/// Last marker of the two-byte int32 form.
pub const BC_INT32_BYTE_MAX: u8 = 0x3f;
/// First marker of the three-byte int32 form.
pub const BC_INT32_SHORT_MIN: u8 = 0x40;
/// Marker of the three-byte form whose high part is zero.
pub const BC_INT32_SHORT_ZERO: u8 = 0x44;
/// Last marker of the three-byte int32 form.
pub const BC_INT32_SHORT_MAX: u8 = 0x47;
/// Int32, 4 bytes.
pub const BC_INT32: u8 = 0x48;

/// ASCII string with inline length 0.
pub const BC_STR_ASCII_FIX_MIN: u8 = 0x49;
/// ASCII string with inline length 47.
pub const BC_STR_ASCII_FIX_MAX: u8 = 0x78;
/// ASCII string with int32 length.
pub const BC_STR_ASCII: u8 = 0x79;
/// UTF-8 string with int32 length.
pub const BC_STR_UTF8: u8 = 0x7a;

/// Largest array count encoded inline in the marker.
pub const ARRAY_FIX_MAX_LEN: usize = (BC_ARRAY_FIX_MAX - BC_ARRAY_FIX_0) as usize;
/// Largest string length encoded inline in the marker.
pub const STR_ASCII_FIX_MAX_LEN: usize = (BC_STR_ASCII_FIX_MAX - BC_STR_ASCII_FIX_MIN) as usize;

/// Return whether `byte` is a single-byte int32.
pub const fn is_int32_num(byte: u8) -> bool {
	byte >= 0xf0 || byte <= 0x2f
}

/// Return whether `byte` starts any numeric value.
pub const fn is_number(byte: u8) -> bool {
	is_int32_num(byte) || (byte >= BC_INT32_BYTE_MIN && byte <= BC_INT32) || matches!(byte, BC_INT64 | BC_DOUBLE | BC_DOUBLE_NUM_0 | BC_DOUBLE_NUM_1)
}

/// Return whether `byte` starts a string.
pub const fn is_string(byte: u8) -> bool {
	byte >= BC_STR_ASCII_FIX_MIN && byte <= BC_STR_UTF8
}

/// Return whether `byte` starts an array.
pub const fn is_array(byte: u8) -> bool {
	byte >= BC_ARRAY_FIX_0 && byte <= BC_ARRAY
}
