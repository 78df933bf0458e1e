//! Runtime discovery of ID types and converter registration.
//!
//! Every generated ID type submits a [`Registration`] at link time. At
//! startup an application calls [`configure`] with a [`ConverterSet`] it owns;
//! the registry walks the registrations, keeps those whose module falls in the
//! requested [`ModuleSet`], and inserts one [`JsonConverter`] per type that the
//! set does not already hold.
//!
//! Only modules in the set are considered. ID types generated in another
//! crate are skipped unless that crate (or one of its modules) is added:
//!
//! ```ignore
//! let mut converters = ConverterSet::new();
//! configure(
//!     &mut converters,
//!     &ModuleSet::new().with("billing").with("accounts::ids"),
//! );
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::{IdError, PrefixedId};

/// A link-time record describing one generated ID type.
pub struct Registration {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    module_path: &'static str,
    prefix: &'static str,
    make: fn() -> Arc<dyn IdConverter>,
}

inventory::collect!(Registration);

impl Registration {
    /// Describes `T`, declared in `module_path`.
    pub const fn of<T: PrefixedId>(module_path: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>,
            type_name: type_name::<T>,
            module_path,
            prefix: T::PREFIX,
            make: make_converter::<T>,
        }
    }

    /// The registered type's `TypeId`.
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// The registered type's name.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// The module the type was declared in.
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// The type's ID prefix.
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Builds a fresh converter for the type.
    pub fn converter(&self) -> Arc<dyn IdConverter> {
        (self.make)()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("type_name", &self.type_name())
            .field("module_path", &self.module_path)
            .field("prefix", &self.prefix)
            .finish()
    }
}

fn make_converter<T: PrefixedId>() -> Arc<dyn IdConverter> {
    Arc::new(JsonConverter::<T>::new())
}

/// Returns every registration linked into the process.
pub fn registrations() -> impl Iterator<Item = &'static Registration> {
    inventory::iter::<Registration>.into_iter()
}

/// A type-erased converter between one ID type and its text/JSON forms.
pub trait IdConverter: Send + Sync {
    /// The `TypeId` of the ID type this converter handles.
    fn id_type(&self) -> TypeId;

    /// The name of the ID type this converter handles.
    fn type_name(&self) -> &'static str;

    /// The ID type's prefix.
    fn prefix(&self) -> &'static str;

    /// Parses text into a boxed ID.
    fn read(&self, text: &str) -> Result<Box<dyn Any + Send + Sync>, IdError>;

    /// Formats a boxed ID. Fails if `value` is not this converter's type.
    fn write(&self, value: &dyn Any) -> Result<String, IdError>;

    /// Deserializes a JSON value into a boxed ID.
    ///
    /// Errors surface as `serde_json::Error`, including for `null`.
    fn read_json(
        &self,
        value: serde_json::Value,
    ) -> Result<Box<dyn Any + Send + Sync>, serde_json::Error>;

    /// Serializes a boxed ID to JSON.
    fn write_json(&self, value: &dyn Any) -> Result<serde_json::Value, IdError>;
}

/// The [`IdConverter`] for a concrete ID type.
pub struct JsonConverter<T>(PhantomData<fn() -> T>);

impl<T: PrefixedId> JsonConverter<T> {
    /// Creates a converter for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    fn downcast<'a>(&self, value: &'a dyn Any) -> Result<&'a T, IdError> {
        value.downcast_ref::<T>().ok_or(IdError::IncompatibleType {
            expected: type_name::<T>(),
        })
    }
}

impl<T: PrefixedId> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PrefixedId> IdConverter for JsonConverter<T> {
    fn id_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn prefix(&self) -> &'static str {
        T::PREFIX
    }

    fn read(&self, text: &str) -> Result<Box<dyn Any + Send + Sync>, IdError> {
        Ok(Box::new(T::parse(text)?))
    }

    fn write(&self, value: &dyn Any) -> Result<String, IdError> {
        self.downcast(value).map(PrefixedId::format)
    }

    fn read_json(
        &self,
        value: serde_json::Value,
    ) -> Result<Box<dyn Any + Send + Sync>, serde_json::Error> {
        Ok(Box::new(serde_json::from_value::<T>(value)?))
    }

    fn write_json(&self, value: &dyn Any) -> Result<serde_json::Value, IdError> {
        self.downcast(value)
            .map(|id| serde_json::Value::String(id.format()))
    }
}

/// A caller-owned collection of converters, at most one per ID type.
///
/// Mutation goes through `&mut self`; share a set between threads behind a
/// `Mutex` or `RwLock`.
#[derive(Default, Clone)]
pub struct ConverterSet {
    converters: Vec<Arc<dyn IdConverter>>,
    by_type: HashMap<TypeId, usize>,
}

impl ConverterSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a converter. Returns false, leaving the set unchanged, if a
    /// converter for the same type is already present.
    pub fn insert(&mut self, converter: Arc<dyn IdConverter>) -> bool {
        let id_type = converter.id_type();
        if self.by_type.contains_key(&id_type) {
            return false;
        }
        self.by_type.insert(id_type, self.converters.len());
        self.converters.push(converter);
        true
    }

    /// Returns true if the set holds a converter for the given type.
    pub fn contains_type(&self, id_type: TypeId) -> bool {
        self.by_type.contains_key(&id_type)
    }

    /// Returns true if the set holds a converter for `T`.
    pub fn contains<T: PrefixedId>(&self) -> bool {
        self.contains_type(TypeId::of::<T>())
    }

    /// Returns the converter for `T`.
    pub fn get<T: PrefixedId>(&self) -> Option<&Arc<dyn IdConverter>> {
        self.get_by_type(TypeId::of::<T>())
    }

    /// Returns the converter for the given type.
    pub fn get_by_type(&self, id_type: TypeId) -> Option<&Arc<dyn IdConverter>> {
        self.by_type.get(&id_type).map(|&i| &self.converters[i])
    }

    /// Returns the first converter whose type uses `prefix`.
    pub fn get_by_prefix(&self, prefix: &str) -> Option<&Arc<dyn IdConverter>> {
        self.converters
            .iter()
            .find(|c| c.prefix().eq_ignore_ascii_case(prefix))
    }

    /// Counts converters registered for the given type. Always 0 or 1.
    pub fn count_of(&self, id_type: TypeId) -> usize {
        self.converters
            .iter()
            .filter(|c| c.id_type() == id_type)
            .count()
    }

    /// Iterates converters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn IdConverter>> {
        self.converters.iter()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.converters.iter().map(|c| c.type_name()))
            .finish()
    }
}

/// The modules whose ID types [`configure`] will register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSet {
    modules: Option<Vec<String>>,
}

impl ModuleSet {
    /// An empty set. Add modules with [`ModuleSet::with`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Some(Vec::new()),
        }
    }

    /// A set matching every linked module.
    #[must_use]
    pub fn all() -> Self {
        Self { modules: None }
    }

    /// A set holding the crate that `module_path` belongs to.
    #[must_use]
    pub fn crate_of(module_path: &str) -> Self {
        let krate = module_path.split("::").next().unwrap_or(module_path);
        Self::new().with(krate)
    }

    /// Adds a module (and everything nested below it) to the set.
    #[must_use]
    pub fn with(mut self, module: impl Into<String>) -> Self {
        if let Some(modules) = self.modules.as_mut() {
            let module = module.into();
            if !modules.contains(&module) {
                modules.push(module);
            }
        }
        self
    }

    /// Returns true if `module_path` is one of the modules or nested in one.
    pub fn contains(&self, module_path: &str) -> bool {
        let Some(modules) = &self.modules else {
            return true;
        };
        modules.iter().any(|m| {
            module_path == m
                || module_path
                    .strip_prefix(m.as_str())
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

impl Default for ModuleSet {
    /// The crate that defines the capability trait.
    fn default() -> Self {
        Self::crate_of(module_path!())
    }
}

/// Inserts a converter for every registered ID type in `modules` that
/// `target` does not already hold. Returns the number of converters added.
///
/// Safe to call repeatedly on the same set.
pub fn configure(target: &mut ConverterSet, modules: &ModuleSet) -> usize {
    let mut added = 0;

    for registration in registrations() {
        if !modules.contains(registration.module_path()) {
            trace!(
                type_name = registration.type_name(),
                module = registration.module_path(),
                "ID type outside module set"
            );
            continue;
        }

        if target.contains_type(registration.type_id()) {
            trace!(
                type_name = registration.type_name(),
                "converter already registered"
            );
            continue;
        }

        target.insert(registration.converter());
        added += 1;
        debug!(
            type_name = registration.type_name(),
            prefix = registration.prefix(),
            "registered ID converter"
        );
    }

    added
}
