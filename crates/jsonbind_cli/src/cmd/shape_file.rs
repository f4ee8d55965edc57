use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use jsonbind::bind::{AutoTypeRegistry, BindError, Features, FieldBinding, FieldKind, ObjectReader, ObjectSchema, Result, Shape, Value};
use serde::Deserialize;

/// Top-level shape definition document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeFile {
	/// Extra auto-type deny entries; a trailing `.` or `::` marks a prefix.
	#[serde(default)]
	pub deny: Vec<String>,
	/// Shape definitions.
	pub shapes: Vec<ShapeDef>,
}

/// One shape definition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDef {
	pub name: String,
	#[serde(default)]
	pub supertypes: Vec<String>,
	#[serde(default, rename = "abstract")]
	pub is_abstract: bool,
	#[serde(default = "default_true")]
	pub serializable: bool,
	#[serde(default)]
	pub creator: CreatorDef,
	#[serde(default)]
	pub features: Vec<String>,
	#[serde(default)]
	pub required: Vec<String>,
	#[serde(default)]
	pub fields: Vec<FieldDef>,
}

/// Instance strategy of a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorDef {
	/// Zero-valued default instance.
	#[default]
	Default,
	/// No creator; decoding needs `field_based`.
	None,
}

/// One field definition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
	pub name: String,
	pub kind: KindDef,
	#[serde(default)]
	pub default: Option<serde_json::Value>,
	#[serde(default)]
	pub unwrapped: bool,
}

/// Field kind as written in shape files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindDef {
	Bool,
	Int,
	Float,
	String,
	Bytes,
	Any,
	Map,
	List(Box<KindDef>),
	Object(String),
}

fn default_true() -> bool {
	true
}

fn invalid(detail: impl Into<String>) -> BindError {
	BindError::InvalidShapeFile { detail: detail.into() }
}

/// Readers built from a shape file, all registered for auto-type.
pub struct ShapeSet {
	readers: HashMap<String, Arc<ObjectReader>>,
	order: Vec<String>,
	defs: HashMap<String, ShapeDef>,
	registry: Arc<AutoTypeRegistry>,
}

impl ShapeSet {
	/// Load and build a shape file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let text = fs::read_to_string(path.as_ref())?;
		Self::parse(&text)
	}

	/// Build shapes from shape file text.
	pub fn parse(text: &str) -> Result<Self> {
		let file: ShapeFile = serde_json::from_str(text).map_err(|err| invalid(err.to_string()))?;
		Self::build(file)
	}

	fn build(file: ShapeFile) -> Result<Self> {
		let registry = Arc::new(AutoTypeRegistry::new());
		for entry in &file.deny {
			registry.deny(entry);
		}

		let order: Vec<String> = file.shapes.iter().map(|shape| shape.name.clone()).collect();
		let mut defs = HashMap::with_capacity(file.shapes.len());
		for shape in file.shapes {
			if defs.contains_key(&shape.name) {
				return Err(invalid(format!("duplicate shape {}", shape.name)));
			}
			defs.insert(shape.name.clone(), shape);
		}

		let mut set = Self {
			readers: HashMap::with_capacity(defs.len()),
			order,
			defs,
			registry,
		};
		let mut visiting = HashSet::new();
		for name in set.order.clone() {
			let reader = set.build_reader(&name, &mut visiting)?;
			set.registry
				.register(reader)
				.map_err(|err| invalid(format!("cannot register {name}: {err}")))?;
		}
		tracing::debug!(shapes = set.order.len(), "shape file loaded");
		Ok(set)
	}

	fn build_reader(&mut self, name: &str, visiting: &mut HashSet<String>) -> Result<Arc<ObjectReader>> {
		if let Some(reader) = self.readers.get(name) {
			return Ok(Arc::clone(reader));
		}
		if !visiting.insert(name.to_owned()) {
			return Err(invalid(format!("cyclic shape reference through {name}")));
		}
		let Some(def) = self.defs.get(name) else {
			return Err(invalid(format!("unknown shape {name}")));
		};

		let mut shape = Shape::new(def.name.as_str());
		for supertype in &def.supertypes {
			shape = shape.with_supertype(supertype.as_str());
		}
		if def.is_abstract {
			shape = shape.without_layout();
		}
		if !def.serializable {
			shape = shape.non_serializable();
		}
		let features = Features::parse_list(def.features.iter().map(String::as_str))?;
		let creator = def.creator;
		let is_abstract = def.is_abstract;
		let required = def.required.clone();
		let fields: Vec<(String, KindDef, Option<serde_json::Value>, bool)> = def
			.fields
			.iter()
			.map(|field| (field.name.clone(), field.kind.clone(), field.default.clone(), field.unwrapped))
			.collect();

		let mut builder = ObjectReader::builder(shape).features(features);
		if creator == CreatorDef::Default && !is_abstract {
			builder = builder.default_creator();
		}
		for (field_name, kind, default, unwrapped) in fields {
			let kind = self.field_kind(&kind, visiting)?;
			let mut binding = FieldBinding::new(field_name.as_str(), kind.clone());
			if let Some(default) = default {
				binding = binding.with_default(default_value(&kind, &default).ok_or_else(|| invalid(format!("default of {name}.{field_name} does not fit {}", kind.label())))?);
			}
			if unwrapped {
				binding = binding.unwrapped();
			}
			builder = builder.field(binding);
		}
		if !required.is_empty() {
			let schema = required.into_iter().fold(ObjectSchema::new(), ObjectSchema::required);
			builder = builder.schema(Arc::new(schema));
		}

		let reader = Arc::new(builder.build()?);
		visiting.remove(name);
		self.readers.insert(name.to_owned(), Arc::clone(&reader));
		Ok(reader)
	}

	fn field_kind(&mut self, kind: &KindDef, visiting: &mut HashSet<String>) -> Result<FieldKind> {
		Ok(match kind {
			KindDef::Bool => FieldKind::Bool,
			KindDef::Int => FieldKind::Int,
			KindDef::Float => FieldKind::Float,
			KindDef::String => FieldKind::String,
			KindDef::Bytes => FieldKind::Bytes,
			KindDef::Any => FieldKind::Any,
			KindDef::Map => FieldKind::Map,
			KindDef::List(item) => FieldKind::List(Box::new(self.field_kind(item, visiting)?)),
			KindDef::Object(type_name) => FieldKind::Object(self.build_reader(type_name, visiting)?),
		})
	}

	/// Reader for a shape name.
	pub fn reader(&self, name: &str) -> Result<Arc<ObjectReader>> {
		self.readers.get(name).cloned().ok_or_else(|| BindError::ShapeNotFound { name: name.to_owned() })
	}

	/// Readers in file order.
	pub fn readers(&self) -> impl Iterator<Item = &Arc<ObjectReader>> {
		self.order.iter().filter_map(|name| self.readers.get(name))
	}

	/// Auto-type registry holding every shape.
	pub fn registry(&self) -> Arc<AutoTypeRegistry> {
		Arc::clone(&self.registry)
	}
}

/// Convert a JSON default into a value of `kind`.
fn default_value(kind: &FieldKind, json: &serde_json::Value) -> Option<Value> {
	match (kind, json) {
		(_, serde_json::Value::Null) => Some(Value::Null),
		(FieldKind::Bool, serde_json::Value::Bool(v)) => Some(Value::Bool(*v)),
		(FieldKind::Int, serde_json::Value::Number(v)) => v.as_i64().map(Value::I64),
		(FieldKind::Float, serde_json::Value::Number(v)) => v.as_f64().map(Value::F64),
		(FieldKind::String, serde_json::Value::String(v)) => Some(Value::String(v.as_str().into())),
		(FieldKind::Any, json) => Some(json_value(json)),
		(FieldKind::Map, serde_json::Value::Object(_)) => Some(json_value(json)),
		(FieldKind::List(_), serde_json::Value::Array(_)) => Some(json_value(json)),
		_ => None,
	}
}

fn json_value(json: &serde_json::Value) -> Value {
	match json {
		serde_json::Value::Null => Value::Null,
		serde_json::Value::Bool(v) => Value::Bool(*v),
		serde_json::Value::Number(v) => v.as_i64().map_or_else(|| Value::F64(v.as_f64().unwrap_or(f64::NAN)), Value::I64),
		serde_json::Value::String(v) => Value::String(v.as_str().into()),
		serde_json::Value::Array(items) => Value::Array(items.iter().map(json_value).collect()),
		serde_json::Value::Object(entries) => Value::Map(entries.iter().map(|(key, item)| (key.as_str().into(), json_value(item))).collect()),
	}
}

#[cfg(test)]
mod tests {
	use jsonbind::bind::{BindError, FieldKind, Value};

	use super::ShapeSet;
	use crate::cmd::test_support::fixture_path;

	#[test]
	fn fixture_shapes_build_and_register() {
		let set = ShapeSet::load(fixture_path("shapes.json")).expect("fixture shapes load");
		let names: Vec<_> = set.readers().map(|reader| reader.shape().type_name().to_string()).collect();
		assert_eq!(names, ["demo.Point", "demo.Figure", "demo.Circle", "demo.Config"]);
		assert_eq!(set.registry().len(), 4);

		let circle = set.reader("demo.Circle").expect("circle exists");
		let radius = &circle.fields()[2];
		assert_eq!(radius.default_value(), Some(&Value::F64(1.0)));
		assert!(matches!(circle.fields()[1].kind(), FieldKind::Object(point) if point.shape().type_name().as_ref() == "demo.Point"));
		assert!(circle.fields()[4].is_unwrapped());
		assert!(!set.reader("demo.Figure").expect("figure exists").has_creator());
	}

	#[test]
	fn cyclic_references_are_rejected() {
		let text = r#"{"shapes": [
			{"name": "a.A", "fields": [{"name": "b", "kind": {"object": "a.B"}}]},
			{"name": "a.B", "fields": [{"name": "a", "kind": {"list": {"object": "a.A"}}}]}
		]}"#;
		let err = ShapeSet::parse(text).err().expect("cycle should fail");
		assert!(matches!(err, BindError::InvalidShapeFile { ref detail } if detail.contains("cyclic")));
	}

	#[test]
	fn bad_definitions_are_reported() {
		let unknown_kind = r#"{"shapes": [{"name": "a.A", "fields": [{"name": "x", "kind": "decimal"}]}]}"#;
		assert!(matches!(ShapeSet::parse(unknown_kind), Err(BindError::InvalidShapeFile { .. })));

		let bad_default = r#"{"shapes": [{"name": "a.A", "fields": [{"name": "x", "kind": "int", "default": "seven"}]}]}"#;
		assert!(matches!(ShapeSet::parse(bad_default), Err(BindError::InvalidShapeFile { .. })));

		let denied = r#"{"shapes": [{"name": "java.util.Evil"}]}"#;
		assert!(matches!(ShapeSet::parse(denied), Err(BindError::InvalidShapeFile { ref detail }) if detail.contains("java.util.Evil")));

		let bad_feature = r#"{"shapes": [{"name": "a.A", "features": ["turbo"]}]}"#;
		assert!(matches!(ShapeSet::parse(bad_feature), Err(BindError::InvalidFeature { .. })));

		let set = ShapeSet::parse(r#"{"shapes": []}"#).expect("empty file loads");
		assert!(matches!(set.reader("a.Missing"), Err(BindError::ShapeNotFound { .. })));
	}
}
