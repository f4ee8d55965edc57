use crate::bind::jsonb::constants::{BC_NULL, BC_OBJECT, BC_OBJECT_END};
use crate::bind::{ArrayLen, BindError, DecodeContext, JsonbCursor, JsonbWriter, Marker, Token, TokenCursor, Value, fnv64};

fn cursor(bytes: &[u8]) -> JsonbCursor<'_> {
	JsonbCursor::new(bytes, DecodeContext::default())
}

#[test]
fn integers_survive_every_width() {
	let samples = [0_i64, -16, 47, 48, -17, 2047, -2048, 2048, 262_143, -262_144, 262_144, i64::from(i32::MIN), i64::from(i32::MAX), i64::MAX, i64::MIN];
	let mut writer = JsonbWriter::new();
	for sample in samples {
		writer.write_i64(sample);
	}
	let bytes = writer.into_bytes();
	let mut cursor = cursor(&bytes);
	for sample in samples {
		assert_eq!(cursor.token(), Token::Number);
		assert_eq!(cursor.read_i64().expect("int reads"), Some(sample));
	}
	assert!(cursor.is_end());
}

#[test]
fn single_byte_ints_use_one_byte() {
	let mut writer = JsonbWriter::new();
	writer.write_i64(-16);
	writer.write_i64(47);
	assert_eq!(writer.as_bytes(), &[0xf0, 0x2f]);
}

#[test]
fn strings_cover_fixed_long_and_utf8_forms() {
	let long = "x".repeat(200);
	let mut writer = JsonbWriter::new();
	writer.write_str("id");
	writer.write_str(&long);
	writer.write_str("größe");
	let bytes = writer.into_bytes();

	let mut cursor = cursor(&bytes);
	assert_eq!(cursor.read_string().expect("fixed string reads").as_deref(), Some("id"));
	assert_eq!(cursor.read_string().expect("long string reads").as_deref(), Some(long.as_str()));
	assert_eq!(cursor.read_string().expect("utf8 string reads").as_deref(), Some("größe"));
}

#[test]
fn read_any_rebuilds_nested_containers() {
	let value = Value::Map(vec![
		("name".into(), Value::String("probe".into())),
		("tags".into(), Value::Array(vec![Value::I64(1), Value::Bool(true), Value::Null])),
		("ratio".into(), Value::F64(0.25)),
		("blob".into(), Value::Bytes(vec![1, 2, 3])),
	]);
	let mut writer = JsonbWriter::new();
	writer.write_value(&value);
	let bytes = writer.into_bytes();

	let decoded = cursor(&bytes).read_any().expect("value reads");
	assert_eq!(decoded, value);
}

#[test]
fn skip_value_consumes_nested_structure() {
	let mut writer = JsonbWriter::new();
	writer.write_value(&Value::Array(vec![Value::Map(vec![("a".into(), Value::Array(vec![Value::I64(9); 20]))])]));
	writer.write_i64(5);
	let bytes = writer.into_bytes();

	let mut cursor = cursor(&bytes);
	cursor.skip_value().expect("skip succeeds");
	assert_eq!(cursor.read_i64().expect("next value reads"), Some(5));
}

#[test]
fn null_key_yields_zero_hash_and_drops_value() {
	let mut writer = JsonbWriter::new();
	writer.start_object();
	writer.write_null();
	writer.write_str("ignored");
	writer.write_str("b");
	writer.write_i64(2);
	writer.end_object();
	let bytes = writer.into_bytes();

	let mut cursor = cursor(&bytes);
	assert!(cursor.next_if_match(Marker::ObjectStart).expect("object starts"));
	assert_eq!(cursor.read_field_name_hash().expect("null key reads"), 0);
	assert_eq!(cursor.read_field_name_hash().expect("named key reads"), fnv64("b"));
	assert_eq!(cursor.field_name(), "b");
	assert_eq!(cursor.read_i64().expect("value reads"), Some(2));
	assert!(cursor.next_if_match(Marker::ObjectEnd).expect("object ends"));
}

#[test]
fn typed_marker_exposes_type_name() {
	let mut writer = JsonbWriter::new();
	writer.write_type_name("demo.Circle");
	writer.start_object();
	writer.end_object();
	let bytes = writer.into_bytes();

	let mut cursor = cursor(&bytes);
	assert_eq!(cursor.token(), Token::TypeMarker);
	let hash = cursor.next_if_type_marker().expect("marker reads");
	assert_eq!(hash, Some(fnv64("demo.Circle")));
	assert_eq!(cursor.string(), "demo.Circle");
	assert_eq!(cursor.token(), Token::ObjectStart);
	assert_eq!(cursor.next_if_type_marker().expect("no second marker"), None);
}

#[test]
fn counted_arrays_report_length() {
	let mut writer = JsonbWriter::new();
	writer.start_array(3);
	writer.start_array(40);
	let bytes = writer.into_bytes();

	let mut cursor = cursor(&bytes);
	assert_eq!(cursor.start_array().expect("fixed array"), ArrayLen::Counted(3));
	assert_eq!(cursor.start_array().expect("long array"), ArrayLen::Counted(40));
	assert!(!cursor.next_if_match(Marker::ArrayEnd).expect("binary arrays have no end marker"));
}

#[test]
fn deep_nesting_is_rejected() {
	let mut bytes = vec![BC_OBJECT; 8];
	bytes.extend_from_slice(&[BC_OBJECT_END; 8]);
	let mut cursor = JsonbCursor::new(&bytes, DecodeContext::default().max_level(4));
	let err = cursor.skip_value().expect_err("depth limit should trip");
	assert!(matches!(err, BindError::DepthExceeded { max_level: 4, .. }));
}

#[test]
fn null_and_string_coercions() {
	let mut writer = JsonbWriter::new();
	writer.write_str(" 42 ");
	writer.write_i64(7);
	writer.write_bool(true);
	let bytes = [writer.into_bytes(), vec![BC_NULL]].concat();

	let mut cursor = cursor(&bytes);
	assert_eq!(cursor.read_i64().expect("numeric string reads"), Some(42));
	assert_eq!(cursor.read_string().expect("number as string"), Some("7".to_owned()));
	assert_eq!(cursor.read_i64().expect("bool as int"), Some(1));
	assert_eq!(cursor.read_f64().expect("null float"), None);
}
