use std::path::PathBuf;

use jsonbind::bind::{ObjectReader, Result};
use serde::Serialize;

use crate::cmd::shape_file::ShapeSet;
use crate::cmd::util::{emit_json, hash_hex, value_json};

#[derive(clap::Args)]
pub struct Args {
	#[arg(long)]
	pub shapes: PathBuf,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct ShapesJson {
	shapes: Vec<ShapeJson>,
}

#[derive(Serialize)]
struct ShapeJson {
	name: String,
	type_hash: String,
	supertypes: Vec<String>,
	has_layout: bool,
	serializable: bool,
	has_creator: bool,
	has_build_fn: bool,
	features: String,
	fields: Vec<FieldJson>,
}

#[derive(Serialize)]
struct FieldJson {
	name: String,
	kind: String,
	exact_hash: String,
	lower_hash: String,
	default: Option<serde_json::Value>,
	unwrapped: bool,
}

/// List the readers built from a shape file.
pub fn run(args: Args) -> Result<()> {
	let Args { shapes, json } = args;
	let set = ShapeSet::load(&shapes)?;
	let rows: Vec<ShapeJson> = set.readers().map(|reader| shape_json(reader)).collect();

	if json {
		return emit_json(&ShapesJson { shapes: rows });
	}

	println!("shapes: {}", shapes.display());
	println!("count: {}", rows.len());
	for row in &rows {
		println!(
			"{} {} layout={} creator={} features={}",
			row.type_hash, row.name, row.has_layout, row.has_creator, row.features
		);
		if !row.supertypes.is_empty() {
			println!("  supertypes: {}", row.supertypes.join(", "));
		}
		for field in &row.fields {
			let default = field.default.as_ref().map(|value| format!(" default={value}")).unwrap_or_default();
			let unwrapped = if field.unwrapped { " unwrapped" } else { "" };
			println!("  {} {}: {}{default}{unwrapped}", field.exact_hash, field.name, field.kind);
		}
	}
	Ok(())
}

fn shape_json(reader: &ObjectReader) -> ShapeJson {
	let shape = reader.shape();
	ShapeJson {
		name: shape.type_name().to_string(),
		type_hash: hash_hex(shape.type_hash()),
		supertypes: shape.supertypes().iter().map(ToString::to_string).collect(),
		has_layout: shape.has_layout(),
		serializable: shape.is_serializable(),
		has_creator: reader.has_creator(),
		has_build_fn: reader.has_build_fn(),
		features: reader.features().to_string(),
		fields: reader
			.fields()
			.iter()
			.map(|field| FieldJson {
				name: field.name().to_string(),
				kind: field.kind().label(),
				exact_hash: hash_hex(field.exact_hash()),
				lower_hash: hash_hex(field.lower_hash()),
				default: field.default_value().map(value_json),
				unwrapped: field.is_unwrapped(),
			})
			.collect(),
	}
}

#[cfg(test)]
mod tests {
	use jsonbind::bind::{fnv64, fnv64_lcase};

	use crate::cmd::test_support::{fixture_path, run_jsonbind_failure, run_jsonbind_json};
	use crate::cmd::util::hash_hex;

	#[test]
	fn lists_fixture_shapes_as_json() {
		let shapes = fixture_path("shapes.json");
		let shapes = shapes.to_str().expect("fixture path is utf-8");
		let json = run_jsonbind_json(&["shapes", "--shapes", shapes, "--json"]);

		let rows = json["shapes"].as_array().expect("shapes array");
		let names: Vec<&str> = rows.iter().filter_map(|row| row["name"].as_str()).collect();
		assert_eq!(names, ["demo.Point", "demo.Figure", "demo.Circle", "demo.Config"]);

		let point = &rows[0];
		assert_eq!(point["type_hash"].as_str(), Some(hash_hex(fnv64("demo.Point")).as_str()));
		assert_eq!(point["fields"][0]["exact_hash"].as_str(), Some(hash_hex(fnv64("x")).as_str()));
		assert_eq!(point["has_creator"].as_bool(), Some(true));

		let figure = &rows[1];
		assert_eq!(figure["has_layout"].as_bool(), Some(false));
		assert_eq!(figure["has_creator"].as_bool(), Some(false));

		let circle = &rows[2];
		assert_eq!(circle["supertypes"][0].as_str(), Some("demo.Figure"));
		assert_eq!(circle["fields"][2]["default"].as_f64(), Some(1.0));
		assert_eq!(circle["fields"][4]["unwrapped"].as_bool(), Some(true));

		let config = &rows[3];
		assert_eq!(config["fields"][0]["lower_hash"].as_str(), Some(hash_hex(fnv64_lcase("user_name")).as_str()));
	}

	#[test]
	fn missing_shape_file_fails() {
		let stderr = run_jsonbind_failure(&["shapes", "--shapes", "does-not-exist.json"]);
		assert!(stderr.contains("error: io"), "{stderr}");
	}
}
