use std::path::PathBuf;

use jsonbind::bind::{DecodeContext, Encoding, Features, Result, Source, decode_source};
use serde::Serialize;

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::shape_file::ShapeSet;
use crate::cmd::util::{emit_json, value_json};

/// Input format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
	/// Detect from the first non-whitespace byte.
	Auto,
	/// JSON text.
	Json,
	/// JSONB binary.
	Jsonb,
}

#[derive(clap::Args)]
pub struct Args {
	pub input: PathBuf,
	#[arg(long)]
	pub shapes: PathBuf,
	#[arg(long)]
	pub root: String,
	#[arg(long, value_enum, default_value_t = Format::Auto)]
	pub format: Format,
	#[arg(long = "feature")]
	pub features: Vec<String>,
	#[arg(long)]
	pub max_level: Option<u32>,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct DecodeJson {
	input: String,
	root: String,
	encoding: &'static str,
	compression: &'static str,
	features: String,
	value: serde_json::Value,
}

/// Decode one input against the root shape and print the result.
pub fn run(args: Args) -> Result<()> {
	let Args {
		input,
		shapes,
		root,
		format,
		features,
		max_level,
		json,
	} = args;

	let set = ShapeSet::load(&shapes)?;
	let reader = set.reader(&root)?;
	let mut source = Source::open(&input)?;
	match format {
		Format::Auto => {}
		Format::Json => source = source.with_encoding(Encoding::Json),
		Format::Jsonb => source = source.with_encoding(Encoding::Jsonb),
	}
	let features = Features::parse_list(features.iter().map(String::as_str))?;
	let mut context = DecodeContext::with_features(features).resolver(set.registry());
	if let Some(max_level) = max_level {
		context = context.max_level(max_level);
	}

	let value = decode_source(&reader, &source, context)?;

	if json {
		return emit_json(&DecodeJson {
			input: input.display().to_string(),
			root,
			encoding: source.encoding.as_str(),
			compression: source.compression.as_str(),
			features: features.to_string(),
			value: value_json(&value),
		});
	}

	println!("input: {}", input.display());
	println!("root: {root}");
	println!("encoding: {}", source.encoding);
	println!("compression: {}", source.compression.as_str());
	println!("features: {features}");
	println!("decoded:");
	print_value(&value, PrintOptions::default());
	Ok(())
}

#[cfg(test)]
mod tests;
