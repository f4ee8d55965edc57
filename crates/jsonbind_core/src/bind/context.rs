use std::fmt;
use std::sync::Arc;

use crate::bind::{Features, TypeResolver};

/// Stream-level decode configuration owned by a cursor.
#[derive(Clone)]
pub struct DecodeContext {
	/// Features merged into every decode call on this stream.
	pub features: Features,
	/// Auto-type resolver; `None` disables type hints.
	pub resolver: Option<Arc<dyn TypeResolver>>,
	/// Maximum object/array nesting level.
	pub max_level: u32,
}

impl Default for DecodeContext {
	fn default() -> Self {
		Self {
			features: Features::NONE,
			resolver: None,
			max_level: 2048,
		}
	}
}

impl DecodeContext {
	/// Context with the given stream features.
	pub fn with_features(features: Features) -> Self {
		Self {
			features,
			..Self::default()
		}
	}

	/// Attach an auto-type resolver.
	pub fn resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
		self.resolver = Some(resolver);
		self
	}

	/// Override the nesting limit.
	pub fn max_level(mut self, max_level: u32) -> Self {
		self.max_level = max_level;
		self
	}
}

impl fmt::Debug for DecodeContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DecodeContext")
			.field("features", &self.features)
			.field("resolver", &self.resolver.is_some())
			.field("max_level", &self.max_level)
			.finish()
	}
}
