use jsonbind_testkit::scratch_dir;

use crate::cmd::test_support::{fixture_path, run_jsonbind, run_jsonbind_failure, run_jsonbind_json};

fn path_arg(name: &str) -> String {
	fixture_path(name).to_str().expect("fixture path is utf-8").to_owned()
}

fn decode_json(input: &str, root: &str, extra: &[&str]) -> serde_json::Value {
	let input = path_arg(input);
	let shapes = path_arg("shapes.json");
	let mut args = vec!["decode", input.as_str(), "--shapes", shapes.as_str(), "--root", root, "--json"];
	args.extend_from_slice(extra);
	run_jsonbind_json(&args)
}

#[test]
fn decodes_point_in_any_key_order() {
	for input in ["point.json", "point_reversed.json"] {
		let json = decode_json(input, "demo.Point", &[]);
		assert_eq!(json["encoding"].as_str(), Some("json"));
		assert_eq!(json["compression"].as_str(), Some("none"));
		assert_eq!(json["value"]["@type"].as_str(), Some("demo.Point"));
		assert_eq!(json["value"]["x"].as_i64(), Some(3));
		assert_eq!(json["value"]["y"].as_i64(), Some(4));
	}
}

#[test]
fn array_input_needs_array_to_bean() {
	let json = decode_json("point_array.json", "demo.Point", &["--feature", "support_array_to_bean"]);
	assert_eq!(json["features"].as_str(), Some("support_array_to_bean"));
	assert_eq!(json["value"]["x"].as_i64(), Some(3));
	assert_eq!(json["value"]["y"].as_i64(), Some(4));

	let input = path_arg("point_array.json");
	let shapes = path_arg("shapes.json");
	let stderr = run_jsonbind_failure(&["decode", &input, "--shapes", &shapes, "--root", "demo.Point"]);
	assert!(stderr.contains("expect {"), "{stderr}");
}

#[test]
fn type_key_selects_registered_subtype() {
	let json = decode_json("circle_typed.json", "demo.Figure", &[]);
	let value = &json["value"];
	assert_eq!(value["@type"].as_str(), Some("demo.Circle"));
	assert_eq!(value["name"].as_str(), Some("unit"));
	assert_eq!(value["center"]["@type"].as_str(), Some("demo.Point"));
	assert_eq!(value["center"]["y"].as_i64(), Some(2));
	assert_eq!(value["radius"].as_f64(), Some(1.0));
	assert_eq!(value["tags"][1].as_str(), Some("small"));
	assert_eq!(value["extra"]["color"].as_str(), Some("red"));
}

#[test]
fn smart_match_and_defaults_apply() {
	let json = decode_json("config_smart.json", "demo.Config", &[]);
	let value = &json["value"];
	assert_eq!(value["userName"].as_str(), Some("ada"));
	assert_eq!(value["retries"].as_i64(), Some(3));
	assert_eq!(value["verbose"].as_bool(), Some(true));
}

#[test]
fn denied_type_key_fails() {
	let input = path_arg("figure_denied.json");
	let shapes = path_arg("shapes.json");
	let stderr = run_jsonbind_failure(&["decode", &input, "--shapes", &shapes, "--root", "demo.Figure"]);
	assert!(stderr.contains("not allowed"), "{stderr}");
}

#[test]
fn unknown_root_fails() {
	let input = path_arg("point.json");
	let shapes = path_arg("shapes.json");
	let stderr = run_jsonbind_failure(&["decode", &input, "--shapes", &shapes, "--root", "demo.Missing"]);
	assert!(stderr.contains("demo.Missing"), "{stderr}");
}

#[test]
fn encoded_jsonb_decodes_like_text() {
	let dir = scratch_dir("encode-decode");
	let out = dir.join("circle.jsonb.zst");
	let out = out.to_str().expect("scratch path is utf-8");
	let input = path_arg("circle_typed.json");

	let output = run_jsonbind(&["encode", &input, "--out", out, "--type-name", "demo.Circle", "--zstd"]);
	assert!(output.status.success(), "encode failed: {}", String::from_utf8_lossy(&output.stderr));

	let shapes = path_arg("shapes.json");
	let json = run_jsonbind_json(&["decode", out, "--shapes", &shapes, "--root", "demo.Figure", "--json"]);
	assert_eq!(json["encoding"].as_str(), Some("jsonb"));
	assert_eq!(json["compression"].as_str(), Some("zstd"));
	assert_eq!(json["value"]["@type"].as_str(), Some("demo.Circle"));
	assert_eq!(json["value"]["center"]["x"].as_i64(), Some(1));
	assert_eq!(json["value"]["extra"]["color"].as_str(), Some("red"));
	// binary objects carry no type key; the text key lands with the other extras
	assert_eq!(json["value"]["extra"]["@type"].as_str(), Some("demo.Circle"));
}

#[test]
fn typed_prefix_delegates_binary_root() {
	let dir = scratch_dir("typed-prefix");
	let out = dir.join("point.jsonb");
	let out = out.to_str().expect("scratch path is utf-8");
	let input = path_arg("point.json");

	let output = run_jsonbind(&["encode", &input, "--out", out, "--type-name", "demo.Point"]);
	assert!(output.status.success(), "encode failed: {}", String::from_utf8_lossy(&output.stderr));

	let shapes = path_arg("shapes.json");
	let json = run_jsonbind_json(&["decode", out, "--shapes", &shapes, "--root", "demo.Point", "--format", "jsonb", "--json"]);
	assert_eq!(json["compression"].as_str(), Some("none"));
	assert_eq!(json["value"]["x"].as_i64(), Some(3));
}
