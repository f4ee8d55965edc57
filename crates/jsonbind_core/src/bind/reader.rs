use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use crate::bind::hash::HASH_TYPE;
use crate::bind::{
	ArrayLen, BindError, BuildFailure, Features, FieldBinding, Instance, Marker, ObjectValue, Resolution, ResolveError, Result, SchemaValidator, Shape,
	TokenCursor, Value,
};

/// Default-instance factory; values are assigned to slots in declaration order.
pub type CreatorFn = Arc<dyn Fn() -> Vec<Value> + Send + Sync>;

/// Finalizer converting the intermediate object into the value returned to the caller.
pub type BuildFn = Arc<dyn Fn(ObjectValue) -> std::result::Result<Value, BuildFailure> + Send + Sync>;

/// Arity up to which field dispatch compares hashes inline instead of using a table.
const INLINE_DISPATCH_MAX: usize = 4;

#[derive(Clone)]
enum Creator {
	/// Every slot starts at its default or zero value.
	Zero,
	Custom(CreatorFn),
}

enum FieldIndex {
	Inline,
	Table { exact: HashMap<u64, usize>, lower: HashMap<u64, usize> },
}

/// Mutable state of one decode call.
struct DecodeFrame {
	instance: Instance,
	features: Features,
	consumed: usize,
}

/// Per-shape reader converting a token stream into a populated object.
///
/// Built once by [`ObjectReaderBuilder`], immutable afterwards, and shared across threads.
pub struct ObjectReader {
	shape: Shape,
	fields: Vec<FieldBinding>,
	index: FieldIndex,
	features: Features,
	creator: Option<Creator>,
	build: Option<BuildFn>,
	schema: Option<Arc<dyn SchemaValidator>>,
	unwrapped: Option<usize>,
	has_defaults: bool,
}

impl fmt::Debug for ObjectReader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectReader")
			.field("shape", &self.shape)
			.field("fields", &self.fields)
			.field("features", &self.features)
			.field("creator", &self.creator.is_some())
			.field("build", &self.build.is_some())
			.field("schema", &self.schema.is_some())
			.finish()
	}
}

impl ObjectReader {
	/// Start building a reader for `shape`.
	pub fn builder(shape: Shape) -> ObjectReaderBuilder {
		ObjectReaderBuilder::new(shape)
	}

	/// Target shape.
	pub fn shape(&self) -> &Shape {
		&self.shape
	}

	/// Reader-level features.
	pub fn features(&self) -> Features {
		self.features
	}

	/// Field bindings in declaration order.
	pub fn fields(&self) -> &[FieldBinding] {
		&self.fields
	}

	/// Return whether a creator is bound.
	pub fn has_creator(&self) -> bool {
		self.creator.is_some()
	}

	/// Return whether a build function is bound.
	pub fn has_build_fn(&self) -> bool {
		self.build.is_some()
	}

	/// Binding whose exact name hash is `hash`.
	pub fn field_reader(&self, hash: u64) -> Option<&FieldBinding> {
		match &self.index {
			FieldIndex::Inline => self.fields.iter().find(|field| field.exact_hash() == hash),
			FieldIndex::Table { exact, .. } => exact.get(&hash).map(|&slot| &self.fields[slot]),
		}
	}

	/// Binding whose smart-match hash is `hash`; the first declared binding wins on collision.
	pub fn field_reader_lcase(&self, hash: u64) -> Option<&FieldBinding> {
		match &self.index {
			FieldIndex::Inline => self.fields.iter().find(|field| field.lower_hash() == hash),
			FieldIndex::Table { lower, .. } => lower.get(&hash).map(|&slot| &self.fields[slot]),
		}
	}

	/// Decode one object from JSON text; a JSONB cursor is routed to [`Self::read_jsonb_object`].
	pub fn read_object(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		if !self.shape.is_serializable() {
			return Err(cursor.error_on_non_serializable(self.shape.type_name()));
		}
		if cursor.is_jsonb() {
			return self.read_jsonb_object(cursor, features);
		}
		if cursor.next_if_null()? {
			return Ok(Value::Null);
		}
		if cursor.is_array() {
			if self.effective(cursor, features).contains(Features::SUPPORT_ARRAY_TO_BEAN) {
				return self.read_array_mapping_object(cursor, features);
			}
			return self.read_single_item_array(cursor, features);
		}
		if !cursor.next_if_match(Marker::ObjectStart)? {
			return Err(cursor.framing_error("{"));
		}
		cursor.enter_level()?;
		let result = self.read_object_fields(cursor, features, true);
		cursor.leave_level();
		result
	}

	/// Decode one object from JSONB, in keyed or array-mapping form.
	pub fn read_jsonb_object(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		if !self.shape.is_serializable() {
			return Err(cursor.error_on_non_serializable(self.shape.type_name()));
		}
		if let Some(hash) = cursor.next_if_type_marker()?
			&& let Resolution::Delegate(reader) = self.resolve_auto_type(cursor, hash, features)?
		{
			return reader.read_jsonb_object(cursor, features);
		}
		if cursor.is_array() {
			return self.read_array_mapping_body(cursor, features);
		}
		if cursor.next_if_null()? {
			return Ok(Value::Null);
		}
		if !cursor.next_if_match(Marker::ObjectStart)? {
			return Err(cursor.framing_error("object"));
		}
		cursor.enter_level()?;
		let result = self.read_jsonb_fields(cursor, features);
		cursor.leave_level();
		result
	}

	/// Decode one JSONB object encoded positionally.
	pub fn read_array_mapping_jsonb_object(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		if !self.shape.is_serializable() {
			return Err(cursor.error_on_non_serializable(self.shape.type_name()));
		}
		if let Some(hash) = cursor.next_if_type_marker()?
			&& let Resolution::Delegate(reader) = self.resolve_auto_type(cursor, hash, features)?
		{
			return reader.read_array_mapping_jsonb_object(cursor, features);
		}
		if cursor.next_if_null()? {
			return Ok(Value::Null);
		}
		self.read_array_mapping_body(cursor, features)
	}

	/// Decode one JSON text object encoded positionally.
	pub fn read_array_mapping_object(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		if !self.shape.is_serializable() {
			return Err(cursor.error_on_non_serializable(self.shape.type_name()));
		}
		if cursor.next_if_null()? {
			return Ok(Value::Null);
		}
		self.read_array_mapping_body(cursor, features)
	}

	fn effective(&self, cursor: &dyn TokenCursor, features: Features) -> Features {
		self.features | cursor.features(features)
	}

	/// `[]` is null, `[{..}]` is the one object; more elements are rejected.
	fn read_single_item_array(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		cursor.start_array()?;
		if cursor.next_if_match(Marker::ArrayEnd)? {
			return Ok(Value::Null);
		}
		cursor.enter_level()?;
		let result = self.read_object(cursor, features);
		cursor.leave_level();
		let value = result?;
		if !cursor.next_if_match(Marker::ArrayEnd)? {
			return Err(cursor.framing_error("]"));
		}
		Ok(value)
	}

	fn read_array_mapping_body(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		let len = cursor.start_array()?;
		cursor.enter_level()?;
		let result = self.read_array_elements(cursor, features, len);
		cursor.leave_level();
		result
	}

	fn read_array_elements(&self, cursor: &mut dyn TokenCursor, features: Features, len: ArrayLen) -> Result<Value> {
		let mut frame = self.begin(cursor, features)?;
		let jsonb = cursor.is_jsonb();
		match len {
			ArrayLen::Counted(count) => {
				for _ in 0..count {
					self.read_element(cursor, &mut frame, jsonb)?;
				}
			}
			ArrayLen::Delimited => {
				while !cursor.next_if_match(Marker::ArrayEnd)? {
					if cursor.is_end() {
						return Err(cursor.framing_error("]"));
					}
					self.read_element(cursor, &mut frame, jsonb)?;
				}
			}
		}
		self.finish(cursor, frame)
	}

	fn read_element(&self, cursor: &mut dyn TokenCursor, frame: &mut DecodeFrame, jsonb: bool) -> Result<()> {
		let position = frame.consumed;
		frame.consumed += 1;
		let Some(binding) = self.fields.get(position) else {
			return cursor.skip_value();
		};
		if jsonb {
			binding.read_field_value_jsonb(cursor, &mut frame.instance, frame.features)
		} else {
			binding.read_field_value(cursor, &mut frame.instance, frame.features)
		}
	}

	/// Field loop over an object whose `{` is already consumed.
	///
	/// Only the first key may be `@type`; a delegate reads the rest of the same object with the
	/// check disabled, which bounds substitution to one per call.
	fn read_object_fields(&self, cursor: &mut dyn TokenCursor, features: Features, check_type_key: bool) -> Result<Value> {
		let mut first = None;
		if check_type_key {
			if cursor.next_if_match(Marker::ObjectEnd)? {
				let frame = self.begin(cursor, features)?;
				return self.finish(cursor, frame);
			}
			if cursor.is_end() {
				return Err(cursor.framing_error("}"));
			}
			let hash = cursor.read_field_name_hash()?;
			if hash == HASH_TYPE {
				let type_hash = cursor.read_type_hash()?;
				if let Resolution::Delegate(reader) = self.resolve_auto_type(cursor, type_hash, features)? {
					if !reader.shape.is_serializable() {
						return Err(cursor.error_on_non_serializable(reader.shape.type_name()));
					}
					return reader.read_object_fields(cursor, features, false);
				}
			} else {
				first = Some(hash);
			}
		}

		let mut frame = self.begin(cursor, features)?;
		if let Some(hash) = first {
			self.read_field(cursor, &mut frame, hash, false)?;
		}
		while !cursor.next_if_match(Marker::ObjectEnd)? {
			if cursor.is_end() {
				return Err(cursor.framing_error("}"));
			}
			let hash = cursor.read_field_name_hash()?;
			self.read_field(cursor, &mut frame, hash, false)?;
		}
		self.finish(cursor, frame)
	}

	fn read_jsonb_fields(&self, cursor: &mut dyn TokenCursor, features: Features) -> Result<Value> {
		let mut frame = self.begin(cursor, features)?;
		while !cursor.next_if_match(Marker::ObjectEnd)? {
			if cursor.is_end() {
				return Err(cursor.framing_error("object end"));
			}
			let hash = cursor.read_field_name_hash()?;
			self.read_field(cursor, &mut frame, hash, true)?;
		}
		self.finish(cursor, frame)
	}

	fn read_field(&self, cursor: &mut dyn TokenCursor, frame: &mut DecodeFrame, hash: u64, jsonb: bool) -> Result<()> {
		if hash == 0 {
			return Ok(());
		}
		let binding = self.field_reader(hash).or_else(|| {
			frame
				.features
				.contains(Features::SUPPORT_SMART_MATCH)
				.then(|| self.field_reader_lcase(cursor.name_hash_lcase()))
				.flatten()
		});
		match binding {
			Some(binding) if jsonb => binding.read_field_value_jsonb(cursor, &mut frame.instance, frame.features),
			Some(binding) => binding.read_field_value(cursor, &mut frame.instance, frame.features),
			None => self.process_extra(cursor, frame),
		}
	}

	fn process_extra(&self, cursor: &mut dyn TokenCursor, frame: &mut DecodeFrame) -> Result<()> {
		if let Some(slot) = self.unwrapped {
			return self.fields[slot].absorb_extra(cursor, &mut frame.instance, frame.features);
		}
		if frame.features.contains(Features::ERROR_ON_UNKNOWN_PROPERTIES) {
			return Err(BindError::UnknownField {
				field: cursor.field_name().to_owned(),
				type_name: self.shape.type_name().to_string(),
				at: cursor.offset(),
				detail: cursor.info(&format!("Unknown field {}", cursor.field_name())),
			});
		}
		tracing::trace!(type_name = %self.shape.type_name(), field = cursor.field_name(), "skipping unknown field");
		cursor.skip_value()
	}

	/// Obtain an instance (creator, raw allocation, or deferred) and apply defaults.
	fn begin(&self, cursor: &dyn TokenCursor, features: Features) -> Result<DecodeFrame> {
		let features = self.effective(cursor, features);
		let len = self.fields.len();
		let mut instance = match &self.creator {
			Some(Creator::Custom(creator)) => Instance::from_created(creator(), len),
			Some(Creator::Zero) => Instance::allocate(len),
			None if features.contains(Features::FIELD_BASED) => {
				if !self.shape.has_layout() {
					return Err(BindError::UnsafeAllocation {
						type_name: self.shape.type_name().to_string(),
						at: cursor.offset(),
						detail: cursor.info(&format!("create instance error, {}", self.shape.type_name())),
					});
				}
				tracing::trace!(type_name = %self.shape.type_name(), "raw allocation");
				Instance::allocate(len)
			}
			None if self.build.is_some() => Instance::deferred(len),
			None => {
				return Err(BindError::CreateInstance {
					type_name: self.shape.type_name().to_string(),
					at: cursor.offset(),
					detail: cursor.info(&format!("create instance error, {}", self.shape.type_name())),
				});
			}
		};
		if self.has_defaults {
			for binding in &self.fields {
				binding.accept_default_value(&mut instance);
			}
		}
		Ok(DecodeFrame {
			instance,
			features,
			consumed: 0,
		})
	}

	/// Convert the frame into the returned value: zero-fill, build function, schema.
	fn finish(&self, cursor: &dyn TokenCursor, frame: DecodeFrame) -> Result<Value> {
		let object = frame.instance.finish(self.shape.type_name(), &self.fields, frame.features);
		let value = match &self.build {
			Some(build) => build(object).map_err(|source| BindError::Build {
				type_name: self.shape.type_name().to_string(),
				at: cursor.offset(),
				detail: cursor.info(&format!("build object error, {}", self.shape.type_name())),
				source,
			})?,
			None => Value::Object(object),
		};
		if let Some(schema) = &self.schema {
			schema.assert_validate(&value)?;
		}
		Ok(value)
	}

	/// Resolve a type hint whose text the cursor holds in [`TokenCursor::string`].
	fn resolve_auto_type(&self, cursor: &dyn TokenCursor, hash: u64, features: Features) -> Result<Resolution> {
		let Some(resolver) = cursor.context().resolver.clone() else {
			tracing::debug!(type_name = cursor.string(), "type hint ignored, no resolver");
			return Ok(Resolution::Unresolved);
		};
		let features = self.effective(cursor, features);
		let resolved = resolver
			.resolve_hash(hash, Some(&self.shape), features)
			.and_then(|found| match found {
				Some(reader) => Ok(Some(reader)),
				None => resolver.resolve_name(cursor.string(), Some(&self.shape), features),
			})
			.map_err(|err| self.resolve_error(cursor, err))?;
		Ok(match resolved {
			None => {
				tracing::debug!(type_name = cursor.string(), declared = %self.shape.type_name(), "type hint unresolved");
				Resolution::Unresolved
			}
			Some(reader) if reader.shape.type_hash() == self.shape.type_hash() => Resolution::SameShape,
			Some(reader) => {
				tracing::debug!(type_name = %reader.shape.type_name(), declared = %self.shape.type_name(), "auto type delegation");
				Resolution::Delegate(reader)
			}
		})
	}

	fn resolve_error(&self, cursor: &dyn TokenCursor, err: ResolveError) -> BindError {
		let type_name = cursor.string().to_owned();
		match err {
			ResolveError::NotAllowed { .. } => BindError::TypeNotAllowed {
				detail: cursor.info(&format!("autoType is not support. {type_name}")),
				type_name,
				reason: "denied",
				at: cursor.offset(),
			},
			ResolveError::NotInstantiable { .. } => BindError::TypeNotAllowed {
				detail: cursor.info(&format!("autoType is not instantiable. {type_name}")),
				type_name,
				reason: "not instantiable",
				at: cursor.offset(),
			},
			ResolveError::NotAssignable { expected, .. } => BindError::AutoTypeMismatch {
				detail: cursor.info(&format!("type not match. {type_name} -> {expected}")),
				type_name,
				expected,
				at: cursor.offset(),
			},
		}
	}

	/// Embedded object with every field at its default or zero value.
	pub(crate) fn zero_object(&self, features: Features) -> ObjectValue {
		let mut instance = Instance::allocate(self.fields.len());
		for binding in &self.fields {
			binding.accept_default_value(&mut instance);
		}
		instance.finish(self.shape.type_name(), &self.fields, features | self.features)
	}
}

/// Assembles an [`ObjectReader`] for one shape.
pub struct ObjectReaderBuilder {
	shape: Shape,
	fields: Vec<FieldBinding>,
	features: Features,
	creator: Option<Creator>,
	build: Option<BuildFn>,
	schema: Option<Arc<dyn SchemaValidator>>,
}

impl ObjectReaderBuilder {
	/// Builder with no fields, no creator and no finalizer.
	pub fn new(shape: Shape) -> Self {
		Self {
			shape,
			fields: Vec::new(),
			features: Features::NONE,
			creator: None,
			build: None,
			schema: None,
		}
	}

	/// Append a field binding; declaration order is slot order.
	pub fn field(mut self, binding: FieldBinding) -> Self {
		self.fields.push(binding);
		self
	}

	/// Reader-level features.
	pub fn features(mut self, features: Features) -> Self {
		self.features = features;
		self
	}

	/// Bind a default-instance factory.
	pub fn creator(mut self, creator: impl Fn() -> Vec<Value> + Send + Sync + 'static) -> Self {
		self.creator = Some(Creator::Custom(Arc::new(creator)));
		self
	}

	/// Bind a factory producing every field at its zero value.
	pub fn default_creator(mut self) -> Self {
		self.creator = Some(Creator::Zero);
		self
	}

	/// Bind a finalizer whose output replaces the intermediate object.
	pub fn build_fn(mut self, build: impl Fn(ObjectValue) -> std::result::Result<Value, BuildFailure> + Send + Sync + 'static) -> Self {
		self.build = Some(Arc::new(build));
		self
	}

	/// Bind a post-construction validator.
	pub fn schema(mut self, schema: Arc<dyn SchemaValidator>) -> Self {
		self.schema = Some(schema);
		self
	}

	/// Assign slots, build the hash index and validate the field set.
	pub fn build(self) -> Result<ObjectReader> {
		let mut fields = self.fields;
		let mut exact = HashMap::with_capacity(fields.len());
		let mut lower = HashMap::with_capacity(fields.len());
		let mut unwrapped = None;
		for (slot, binding) in fields.iter_mut().enumerate() {
			binding.set_slot(slot);
			if exact.insert(binding.exact_hash(), slot).is_some() {
				return Err(BindError::DuplicateField {
					type_name: self.shape.type_name().to_string(),
					field: binding.name().to_string(),
				});
			}
			if let Entry::Vacant(entry) = lower.entry(binding.lower_hash()) {
				entry.insert(slot);
			}
			if binding.is_unwrapped() {
				unwrapped = Some(slot);
			}
		}
		let index = if fields.len() <= INLINE_DISPATCH_MAX {
			FieldIndex::Inline
		} else {
			FieldIndex::Table { exact, lower }
		};
		let has_defaults = fields.iter().any(|field| field.default_value().is_some());
		Ok(ObjectReader {
			shape: self.shape,
			fields,
			index,
			features: self.features,
			creator: self.creator,
			build: self.build,
			schema: self.schema,
			unwrapped,
			has_defaults,
		})
	}
}
