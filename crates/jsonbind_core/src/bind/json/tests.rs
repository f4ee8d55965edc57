use crate::bind::{ArrayLen, BindError, DecodeContext, JsonCursor, Marker, Token, TokenCursor, Value, fnv64, fnv64_lcase};

fn cursor(text: &str) -> JsonCursor<'_> {
	JsonCursor::new(text, DecodeContext::default())
}

#[test]
fn keys_hash_and_separators_are_consumed() {
	let mut cursor = cursor(" { \"user_name\" : \"ada\" , \"id\": 7 } ");
	assert!(cursor.next_if_match(Marker::ObjectStart).expect("object starts"));
	assert_eq!(cursor.read_field_name_hash().expect("key reads"), fnv64("user_name"));
	assert_eq!(cursor.name_hash_lcase(), fnv64_lcase("userName"));
	assert_eq!(cursor.read_string().expect("value reads").as_deref(), Some("ada"));
	assert_eq!(cursor.token(), Token::String);
	assert_eq!(cursor.read_field_name_hash().expect("key reads"), fnv64("id"));
	assert_eq!(cursor.read_i64().expect("value reads"), Some(7));
	assert!(cursor.next_if_match(Marker::ObjectEnd).expect("object ends"));
	assert!(cursor.is_end());
}

#[test]
fn escapes_and_surrogate_pairs_decode() {
	let mut cursor = cursor(r#""tab\tquote\"slash\/ é 😀""#);
	assert_eq!(cursor.read_string().expect("string reads").as_deref(), Some("tab\tquote\"slash/ é 😀"));
}

#[test]
fn unpaired_surrogate_is_rejected() {
	let err = cursor(r#""\ud83d x""#).read_string().expect_err("lone surrogate should fail");
	assert!(matches!(err, BindError::Syntax { .. }));
}

#[test]
fn numbers_keep_integer_and_float_forms() {
	let mut cursor = cursor("[-12, 3.5, 1e3, 9223372036854775808]");
	assert_eq!(
		cursor.read_any().expect("array reads"),
		Value::Array(vec![Value::I64(-12), Value::F64(3.5), Value::F64(1000.0), Value::F64(9_223_372_036_854_775_808.0)])
	);
}

#[test]
fn coercions_follow_field_kind() {
	let mut cursor = cursor(r#"["42", 1, 0, 3.9, "2.5", true, null]"#);
	assert_eq!(cursor.start_array().expect("array starts"), ArrayLen::Delimited);
	assert_eq!(cursor.read_i64().expect("numeric string"), Some(42));
	assert_eq!(cursor.read_bool().expect("one as bool"), Some(true));
	assert_eq!(cursor.read_bool().expect("zero as bool"), Some(false));
	assert_eq!(cursor.read_i64().expect("float truncates"), Some(3));
	assert_eq!(cursor.read_f64().expect("float string"), Some(2.5));
	assert_eq!(cursor.read_string().expect("bool as string").as_deref(), Some("true"));
	assert_eq!(cursor.read_string().expect("null string"), None);
	assert!(cursor.next_if_match(Marker::ArrayEnd).expect("array ends"));
}

#[test]
fn bytes_accept_base64_and_numeric_arrays() {
	let mut cursor = cursor(r#"["AQID", [4, 5]]"#);
	cursor.start_array().expect("array starts");
	assert_eq!(cursor.read_bytes().expect("base64 reads"), Some(vec![1, 2, 3]));
	assert_eq!(cursor.read_bytes().expect("array reads"), Some(vec![4, 5]));
}

#[test]
fn skip_value_stops_after_separator() {
	let mut cursor = cursor(r#"[{"a": [1, {"b": null}], "c": "}"}, 5]"#);
	cursor.start_array().expect("array starts");
	cursor.skip_value().expect("skip succeeds");
	assert_eq!(cursor.read_i64().expect("next reads"), Some(5));
	assert!(cursor.next_if_match(Marker::ArrayEnd).expect("array ends"));
}

#[test]
fn missing_colon_is_a_syntax_error() {
	let mut cursor = cursor(r#"{"a" 1}"#);
	cursor.next_if_match(Marker::ObjectStart).expect("object starts");
	let err = cursor.read_field_name_hash().expect_err("missing colon should fail");
	assert!(matches!(err, BindError::Syntax { at: 5, .. }));
}

#[test]
fn truncated_input_reports_eof() {
	let err = cursor(r#"{"a": [1, 2"#).read_any().expect_err("truncated input should fail");
	assert!(matches!(err, BindError::UnexpectedEof { .. }));
}

#[test]
fn nesting_limit_applies_to_skips() {
	let text = "[".repeat(10) + &"]".repeat(10);
	let mut cursor = JsonCursor::new(&text, DecodeContext::default().max_level(3));
	let err = cursor.skip_value().expect_err("depth limit should trip");
	assert!(matches!(err, BindError::DepthExceeded { max_level: 3, .. }));
}

#[test]
fn literals_require_word_boundary() {
	let err = cursor("nullx").read_any().expect_err("bad literal should fail");
	assert!(matches!(err, BindError::Syntax { .. }));
}

#[test]
fn type_name_reads_as_string() {
	let mut cursor = cursor(r#"{"@type": "demo.Circle"}"#);
	cursor.next_if_match(Marker::ObjectStart).expect("object starts");
	cursor.read_field_name_hash().expect("key reads");
	assert_eq!(cursor.read_type_hash().expect("type reads"), fnv64("demo.Circle"));
	assert_eq!(cursor.string(), "demo.Circle");
	assert_eq!(cursor.next_if_type_marker().expect("text has no marker"), None);
}

#[test]
fn int_reads_reject_floats_outside_range() {
	let mut cursor = cursor(r#"[1e300, "-1e19", -9.2e18]"#);
	cursor.start_array().expect("array starts");
	let err = cursor.read_i64().expect_err("too large");
	assert!(matches!(err, BindError::TypeMismatch { expected: "int", at: 1, .. }));
	let err = cursor.read_i64().expect_err("too small");
	assert!(matches!(err, BindError::TypeMismatch { expected: "int", at: 8, .. }));
	assert_eq!(cursor.read_i64().expect("in range"), Some(-9_200_000_000_000_000_000));
	assert!(cursor.next_if_match(Marker::ArrayEnd).expect("array ends"));
}

#[test]
fn separators_are_required_inside_brackets() {
	let mut items = cursor("[1 2]");
	items.start_array().expect("array starts");
	let err = items.read_i64().expect_err("missing comma");
	assert!(matches!(err, BindError::Syntax { at: 3, .. }));

	let err = cursor("[1, ]").read_any().expect_err("comma before close");
	assert!(matches!(err, BindError::Syntax { .. }));

	let mut top = cursor("7, 8");
	assert_eq!(top.read_i64().expect("top value reads"), Some(7));
	assert_eq!(top.offset(), 1);
}
