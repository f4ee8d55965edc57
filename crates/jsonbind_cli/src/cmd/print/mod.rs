use std::fmt::Write as _;

use jsonbind::bind::Value;

/// Output truncation and formatting limits for decoded values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of fields printed for a single object or map.
	pub max_fields_per_object: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for arrays.
	pub max_array_items: usize,
	/// Maximum recursive print depth for nested containers.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_fields_per_object: 80,
			max_string_len: 200,
			max_array_items: 16,
			max_print_depth: 6,
		}
	}
}

/// Print one decoded value tree.
pub fn print_value(value: &Value, options: PrintOptions) {
	let mut out = String::new();
	render_value(&mut out, value, 0, 0, options);
	print!("{out}");
}

/// Render one decoded value tree into `out`, one node per line.
pub fn render_value(out: &mut String, value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Null => line(out, &pad, "null"),
		Value::Bool(v) => line(out, &pad, &v.to_string()),
		Value::I64(v) => line(out, &pad, &v.to_string()),
		Value::F64(v) => line(out, &pad, &v.to_string()),
		Value::Bytes(v) => line(out, &pad, &format!("bytes[{}]", v.len())),
		Value::String(v) => line(out, &pad, &format!("\"{}\"", truncate(v, options.max_string_len))),
		Value::Array(items) => {
			if depth >= options.max_print_depth {
				line(out, &pad, &format!("[... {} items]", items.len()));
				return;
			}
			line(out, &pad, "[");
			for item in items.iter().take(options.max_array_items) {
				render_value(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_array_items {
				line(out, &pad, &format!("  ... {} more", items.len() - options.max_array_items));
			}
			line(out, &pad, "]");
		}
		Value::Map(entries) => {
			let entries = entries.iter().map(|(key, item)| (key.as_ref(), item));
			render_fields(out, "map", entries, value_len(value), indent, depth, options);
		}
		Value::Object(object) => {
			let fields = object.fields.iter().map(|field| (field.name.as_ref(), &field.value));
			render_fields(out, &object.type_name, fields, object.fields.len(), indent, depth, options);
		}
	}
}

fn render_fields<'a>(out: &mut String, label: &str, fields: impl Iterator<Item = (&'a str, &'a Value)>, len: usize, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	if depth >= options.max_print_depth {
		line(out, &pad, &format!("{label} {{ ... }}"));
		return;
	}
	line(out, &pad, &format!("{label} {{"));
	for (name, value) in fields.take(options.max_fields_per_object) {
		let _ = write!(out, "{pad}  {name} = ");
		if matches!(value, Value::Object(_) | Value::Map(_) | Value::Array(_)) {
			out.push('\n');
			render_value(out, value, indent + 4, depth + 1, options);
		} else {
			render_value(out, value, 0, depth + 1, options);
		}
	}
	if len > options.max_fields_per_object {
		line(out, &pad, &format!("  ... {} more fields", len - options.max_fields_per_object));
	}
	line(out, &pad, "}");
}

fn value_len(value: &Value) -> usize {
	match value {
		Value::Map(entries) => entries.len(),
		Value::Array(items) => items.len(),
		Value::Object(object) => object.fields.len(),
		_ => 0,
	}
}

fn line(out: &mut String, pad: &str, text: &str) {
	out.push_str(pad);
	out.push_str(text);
	out.push('\n');
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}

#[cfg(test)]
mod tests;
