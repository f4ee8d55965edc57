use jsonbind::bind::{FieldValue, ObjectValue, Value};

use super::{PrintOptions, render_value};

fn point() -> Value {
	Value::Object(ObjectValue {
		type_name: "demo.Point".into(),
		fields: vec![
			FieldValue {
				name: "x".into(),
				value: Value::I64(1),
			},
			FieldValue {
				name: "tags".into(),
				value: Value::Array(vec![Value::String("a".into())]),
			},
		],
	})
}

#[test]
fn objects_render_as_indented_tree() {
	let mut out = String::new();
	render_value(&mut out, &point(), 0, 0, PrintOptions::default());
	assert_eq!(out, "demo.Point {\n  x = 1\n  tags = \n    [\n      \"a\"\n    ]\n}\n");
}

#[test]
fn limits_truncate_output() {
	let options = PrintOptions {
		max_fields_per_object: 1,
		max_string_len: 3,
		max_array_items: 1,
		max_print_depth: 1,
	};
	let mut out = String::new();
	render_value(&mut out, &point(), 0, 0, options);
	assert!(out.contains("... 1 more fields"));

	let mut out = String::new();
	render_value(&mut out, &Value::String("abcdef".into()), 0, 0, options);
	assert_eq!(out, "\"abc...\"\n");

	let mut out = String::new();
	render_value(&mut out, &Value::Array(vec![Value::Array(vec![Value::Null; 4])]), 0, 0, options);
	assert_eq!(out, "[\n  [... 4 items]\n]\n");
}
