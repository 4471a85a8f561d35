// Copyright 2025 Cowboy AI, LLC.

//! Template factory
//!
//! A [`Template`] owns one folded [`Descriptor`] and everything derived from
//! it at construction time: the method dispatch table, the static record and
//! the shared prop cells handed to every instance. Templates are cheap to
//! clone and copy-on-write, so a composer can modify the template it owns
//! without affecting any other holder.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::callable::Method;
use crate::composable::Composable;
use crate::compose::compose;
use crate::descriptor::{Descriptor, Field, INIT_SHORTHAND};
use crate::errors::ComposeResult;
use crate::instance::SharedValue;
use crate::merge::{assign, deep_copy};
use crate::value::{Record, Value};

const ANONYMOUS: &str = "anonymous";

/// The composable, instantiable product of merging descriptors
#[derive(Clone)]
pub struct Template {
    inner: Arc<TemplateInner>,
}

#[derive(Clone)]
struct TemplateInner {
    id: Uuid,
    descriptor: Descriptor,
    statics: Record,
    shared_props: IndexMap<String, SharedValue>,
}

/// Result of looking a name up on a template
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'a> {
    /// An authored static or deep static
    Static(&'a Value),
    /// A generated chain helper, by record key
    Helper(&'static str),
}

/// Check whether a value is a template
pub fn is_template(value: &Value) -> bool {
    matches!(value, Value::Template(_))
}

impl Template {
    pub(crate) fn from_descriptor(descriptor: Descriptor) -> Self {
        let statics = attach_statics(&descriptor);
        let shared_props = share_props(&descriptor.props);
        Template {
            inner: Arc::new(TemplateInner {
                id: Uuid::new_v4(),
                descriptor,
                statics,
                shared_props,
            }),
        }
    }

    /// Unique identity of this template
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Snapshot of the folded descriptor
    ///
    /// `props` are read from the shared cells, so a default mutated in place
    /// through an instance is reported here and carried into any template
    /// composed from this one.
    pub fn descriptor(&self) -> Descriptor {
        let mut descriptor = self.inner.descriptor.clone();
        for (key, cell) in &self.inner.shared_props {
            descriptor.props.insert(key.clone(), cell.read().clone());
        }
        descriptor
    }

    /// The descriptor as folded, with prop defaults as authored
    pub(crate) fn folded(&self) -> &Descriptor {
        &self.inner.descriptor
    }

    /// Current value of a shared prop default
    pub fn prop(&self, key: &str) -> Option<Value> {
        self.inner.shared_props.get(key).map(|cell| cell.read().clone())
    }

    /// Descriptor name, or `anonymous`
    pub fn display_name(&self) -> &str {
        self.inner.descriptor.name.as_deref().unwrap_or(ANONYMOUS)
    }

    /// Dispatch table lookup
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.inner.descriptor.methods.get(name)
    }

    /// Statics attached to the template, deep statics included
    pub fn static_values(&self) -> &Record {
        &self.inner.statics
    }

    /// A single static
    pub fn get_static(&self, key: &str) -> Option<&Value> {
        self.inner.statics.get(key)
    }

    /// Resolve a name on the template
    ///
    /// Statics are attached after the chain helpers, so an authored static
    /// shadows a helper of the same name.
    pub fn member(&self, key: &str) -> Option<Member<'_>> {
        if let Some(value) = self.get_static(key) {
            return Some(Member::Static(value));
        }
        CHAIN_HELPERS
            .iter()
            .copied()
            .find(|helper| *helper == key)
            .map(Member::Helper)
    }

    pub(crate) fn shared_props(&self) -> &IndexMap<String, SharedValue> {
        &self.inner.shared_props
    }

    /// Compose this template with others, this template first
    pub fn compose<I>(&self, others: I) -> ComposeResult<Template>
    where
        I: IntoIterator,
        I::Item: Into<Composable>,
    {
        let composables = std::iter::once(Composable::Template(self.clone()))
            .chain(others.into_iter().map(Into::into));
        compose(composables)
    }

    /// Compose a single descriptor field, `compose(self, { key: value })`
    pub fn chain(&self, key: &str, value: impl Into<Value>) -> ComposeResult<Template> {
        let mut record = Record::new();
        record.insert(key.to_string(), value.into());
        self.compose([Composable::Value(Value::Record(record))])
    }

    /// Check whether two handles refer to the same template
    pub fn ptr_eq(a: &Template, b: &Template) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Replace or add a method in the dispatch table
    pub fn set_method(&mut self, name: impl Into<String>, method: Method) {
        self.inner_mut().descriptor.methods.insert(name.into(), method);
    }

    /// Remove a method from the dispatch table
    pub fn remove_method(&mut self, name: &str) -> Option<Method> {
        self.inner_mut().descriptor.methods.shift_remove(name)
    }

    /// Replace or add a static
    pub fn set_static(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let inner = self.inner_mut();
        inner.descriptor.statics.insert(key.clone(), deep_copy(&value));
        inner.statics.insert(key, value);
    }

    /// Unique access to the template's state
    ///
    /// A handle that shares its state is detached first. The detached copy is
    /// a distinct template with its own id and its own prop cells.
    fn inner_mut(&mut self) -> &mut TemplateInner {
        if Arc::get_mut(&mut self.inner).is_none() {
            let descriptor = self.descriptor();
            self.inner = Arc::new(TemplateInner {
                id: Uuid::new_v4(),
                statics: self.inner.statics.clone(),
                shared_props: share_props(&descriptor.props),
                descriptor,
            });
        }
        Arc::make_mut(&mut self.inner)
    }
}

fn attach_statics(descriptor: &Descriptor) -> Record {
    let mut statics = Record::new();
    assign(&mut statics, [&descriptor.deep_statics, &descriptor.statics]);
    statics
}

fn share_props(props: &Record) -> IndexMap<String, SharedValue> {
    props
        .iter()
        .filter(|(_, value)| !value.is_nil())
        .map(|(key, value)| (key.clone(), Arc::new(RwLock::new(value.clone()))))
        .collect()
}

macro_rules! chain_helpers {
    ($($(#[$meta:meta])* $helper:ident => $key:expr;)+) => {
        /// Record keys of the generated chain helpers
        pub const CHAIN_HELPERS: &[&str] = &[$($key),+];

        impl Template {
            $(
                $(#[$meta])*
                pub fn $helper(&self, value: impl Into<Value>) -> ComposeResult<Template> {
                    self.chain($key, value)
                }
            )+
        }
    };
}

chain_helpers! {
    /// Compose a new name
    name => Field::Name.key();
    /// Compose methods, from a record or a method table
    methods => Field::Methods.key();
    /// Compose shared defaults
    props => Field::Props.key();
    /// Compose deep-copied defaults
    deep_props => Field::DeepProps.key();
    /// Compose statics
    statics => Field::Statics.key();
    /// Compose deep statics
    deep_statics => Field::DeepStatics.key();
    /// Compose a list of initializers
    initializers => Field::Initializers.key();
    /// Compose a list of composers
    composers => Field::Composers.key();
    /// Compose one initializer
    init => INIT_SHORTHAND;
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptor = &self.inner.descriptor;
        f.debug_struct("Template")
            .field("id", &self.inner.id)
            .field("name", &descriptor.name)
            .field("methods", &descriptor.methods.keys().collect::<Vec<_>>())
            .field("props", &descriptor.props.keys().collect::<Vec<_>>())
            .field("deep_props", &descriptor.deep_props.keys().collect::<Vec<_>>())
            .field("statics", &self.inner.statics.keys().collect::<Vec<_>>())
            .field("initializers", &descriptor.initializers.len())
            .field("composers", &descriptor.composers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::{Initializer, MethodTable};
    use crate::record;
    use pretty_assertions::assert_eq;

    fn base() -> Template {
        compose([Descriptor::new().named("Unit")]).unwrap()
    }

    #[test]
    fn test_chain_helpers_compose_single_fields() {
        let template = base()
            .name("Knight")
            .unwrap()
            .props(record! { "Health" => 100 })
            .unwrap()
            .deep_props(record! { "Inventory" => vec!["sword"] })
            .unwrap()
            .statics(record! { "Faction" => "north" })
            .unwrap()
            .deep_statics(record! { "Meta" => record! { "tier" => 1 } })
            .unwrap()
            .methods(record! { "Attack" => Method::new(|_, _| Ok(Value::Int(7))) })
            .unwrap()
            .init(Initializer::new(|_, _| Ok(None)))
            .unwrap();

        let descriptor = template.descriptor();
        assert_eq!(template.to_string(), "Knight");
        assert_eq!(descriptor.props, record! { "Health" => 100 });
        assert_eq!(descriptor.deep_props, record! { "Inventory" => vec!["sword"] });
        assert!(template.method("Attack").is_some());
        assert_eq!(descriptor.initializers.len(), 1);
        assert_eq!(template.get_static("Faction"), Some(&Value::from("north")));
        assert_eq!(
            template.get_static("Meta"),
            Some(&Value::Record(record! { "tier" => 1 }))
        );
    }

    #[test]
    fn test_chain_helpers_do_not_touch_receiver() {
        let original = base();
        let renamed = original.name("Other").unwrap();

        assert_eq!(original.to_string(), "Unit");
        assert_eq!(renamed.to_string(), "Other");
    }

    #[test]
    fn test_methods_helper_accepts_method_table() {
        let template = base()
            .methods(MethodTable::new(|sink| {
                sink.define("Greet", |_, _| Ok(Value::from("hello")));
                Ok(())
            }))
            .unwrap();
        assert!(template.method("Greet").is_some());
    }

    #[test]
    fn test_chain_rejects_unknown_key() {
        let err = base().chain("prop", record! {}).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_every_field_has_a_helper() {
        for field in Field::ALL {
            assert!(CHAIN_HELPERS.contains(&field.key()), "{field} has no helper");
        }
        assert!(CHAIN_HELPERS.contains(&INIT_SHORTHAND));
    }

    #[test]
    fn test_statics_shadow_chain_helpers() {
        let template = base()
            .statics(record! { "name" => "shadowed" })
            .unwrap();

        assert_eq!(
            template.member("name"),
            Some(Member::Static(&Value::from("shadowed")))
        );
        assert_eq!(template.member("props"), Some(Member::Helper("props")));
        assert_eq!(template.member("missing"), None);
    }

    #[test]
    fn test_statics_win_over_deep_statics() {
        let template = compose([Descriptor::new()
            .with_deep_static("Level", 1)
            .with_static("Level", 2)])
        .unwrap();
        assert_eq!(template.get_static("Level"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_display_and_is_template() {
        let anonymous = compose(Vec::<Composable>::new()).unwrap();
        assert_eq!(anonymous.to_string(), "anonymous");

        assert!(is_template(&Value::Template(anonymous)));
        assert!(!is_template(&Value::Record(record! {})));
    }

    #[test]
    fn test_mutation_is_copy_on_write() {
        let original = base();
        let mut copy = original.clone();
        copy.set_method("Jump", Method::new(|_, _| Ok(Value::Nil)));
        copy.set_static("Tag", "copied");

        assert!(original.method("Jump").is_none());
        assert!(original.get_static("Tag").is_none());
        assert!(copy.method("Jump").is_some());
        assert!(copy.remove_method("Jump").is_some());
        assert!(copy.method("Jump").is_none());
    }

    #[test]
    fn test_detached_copy_has_its_own_identity() {
        let original = base();
        let mut copy = original.clone();
        assert_eq!(copy.id(), original.id());

        copy.set_static("Tag", "copied");
        assert_ne!(copy.id(), original.id());

        let id = copy.id();
        copy.set_static("Tag", "again");
        assert_eq!(copy.id(), id);
    }

    /// Test that a prop default mutated through an instance is the template's default
    ///
    /// ```mermaid
    /// graph LR
    ///     I[Instance] -->|update Party| C[shared cell]
    ///     C --> D[descriptor props]
    ///     C --> N[next instance]
    ///     D -->|compose| T[derived template]
    /// ```
    #[test]
    fn test_prop_defaults_read_through_shared_cells() {
        let template = base().props(record! { "Party" => record! { "size" => 1 } }).unwrap();
        let mut first = template.instantiate().unwrap();
        first.update("Party", |party| {
            party.as_record_mut().unwrap().insert("size".into(), Value::Int(2));
        });

        let expected = Value::Record(record! { "size" => 2 });
        assert_eq!(template.prop("Party"), Some(expected.clone()));
        assert_eq!(template.descriptor().props["Party"], expected);
        assert_eq!(template.instantiate().unwrap().get("Party"), Some(expected.clone()));

        let derived = template.name("Band").unwrap();
        assert_eq!(derived.instantiate().unwrap().get("Party"), Some(expected.clone()));

        let mut detached = template.clone();
        detached.set_static("Tag", "copied");
        assert_eq!(detached.prop("Party"), Some(expected));
    }
}
