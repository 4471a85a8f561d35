// Copyright 2025 Cowboy AI, LLC.

//! Instances and the construction protocol
//!
//! Each instance field is either owned or shared. `deepProps` seed owned
//! deep copies; `props` seed shared cells, so an in-place mutation of a prop
//! is observed by every instance of the same template until an instance
//! replaces the field with its own value.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::callable::Method;
use crate::errors::{ComposeError, ComposeResult};
use crate::merge::deep_copy;
use crate::template::Template;
use crate::value::{Record, Value};

/// A value cell shared between the instances of one template
pub type SharedValue = Arc<RwLock<Value>>;

#[derive(Debug, Clone)]
enum Slot {
    Owned(Value),
    Shared(SharedValue),
}

impl Slot {
    fn read(&self) -> Value {
        match self {
            Slot::Owned(value) => value.clone(),
            Slot::Shared(cell) => cell.read().clone(),
        }
    }

    fn method(&self) -> Option<Method> {
        match self {
            Slot::Owned(Value::Method(method)) => Some(method.clone()),
            Slot::Owned(_) => None,
            Slot::Shared(cell) => cell.read().as_method().cloned(),
        }
    }
}

/// A concrete object produced from a template
#[derive(Debug, Clone)]
pub struct Instance {
    template: Template,
    origin: Template,
    fields: IndexMap<String, Slot>,
}

impl Instance {
    fn blank(template: Template) -> Self {
        Instance {
            origin: template.clone(),
            template,
            fields: IndexMap::new(),
        }
    }

    /// The template this instance was built from
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The template whose construction produced this instance
    ///
    /// Differs from [`Instance::template`] when an initializer substituted an
    /// instance of another template.
    pub fn origin(&self) -> &Template {
        &self.origin
    }

    /// Read a field
    pub fn get(&self, key: &str) -> Option<Value> {
        self.fields.get(key).map(Slot::read)
    }

    /// Check whether a field is present
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Check whether a field still refers to the template's shared default
    pub fn is_shared(&self, key: &str) -> bool {
        matches!(self.fields.get(key), Some(Slot::Shared(_)))
    }

    /// Set a field to an owned value; `Nil` removes the field
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match value.into() {
            Value::Nil => {
                self.fields.shift_remove(&key);
            }
            value => {
                self.fields.insert(key, Slot::Owned(value));
            }
        }
    }

    /// Remove a field, returning its last value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key).map(|slot| slot.read())
    }

    /// Mutate a field in place
    ///
    /// A shared field is mutated through its cell and the change is visible
    /// to every instance still sharing it.
    pub fn update<R>(&mut self, key: &str, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        match self.fields.get_mut(key)? {
            Slot::Owned(value) => Some(f(value)),
            Slot::Shared(cell) => Some(f(&mut cell.write())),
        }
    }

    /// Resolve a method: own fields first, then the template's dispatch table
    ///
    /// An own field shadows the template method of the same name even when it
    /// does not hold a method.
    ///
    /// # Errors
    ///
    /// - `InvalidMethodValue` if the own field is not a method
    /// - `UnknownMethod` if neither the instance nor its template defines it
    pub fn resolve_method(&self, name: &str) -> ComposeResult<Method> {
        if let Some(slot) = self.fields.get(name) {
            return slot.method().ok_or_else(|| ComposeError::InvalidMethodValue {
                name: name.to_string(),
                kind: slot.read().type_name(),
            });
        }
        self.template
            .method(name)
            .cloned()
            .ok_or_else(|| ComposeError::UnknownMethod {
                method: name.to_string(),
                template: self.template.to_string(),
            })
    }

    /// Call a method by name
    ///
    /// # Errors
    ///
    /// Fails as [`Instance::resolve_method`] does, otherwise returns whatever
    /// the method returns.
    pub fn call(&mut self, name: &str, args: &[Value]) -> ComposeResult<Value> {
        let method = self.resolve_method(name)?;
        method.call(self, args)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.template, f)
    }
}

impl Template {
    /// Construct an instance from positional arguments
    ///
    /// Accepts no argument, `Nil`, or one options record.
    ///
    /// # Errors
    ///
    /// - `TooManyArguments` for more than one argument
    /// - `BadArgument` if the argument is not a record
    /// - any error raised by an initializer, unchanged
    pub fn new_instance(&self, args: &[Value]) -> ComposeResult<Instance> {
        let options = match args {
            [] | [Value::Nil] => Record::new(),
            [Value::Record(options)] => options.clone(),
            [other] => {
                return Err(ComposeError::BadArgument {
                    kind: other.type_name(),
                })
            }
            _ => return Err(ComposeError::TooManyArguments { count: args.len() }),
        };
        self.instantiate_with(options)
    }

    /// Construct an instance without options
    pub fn instantiate(&self) -> ComposeResult<Instance> {
        self.instantiate_with(Record::new())
    }

    /// Construct an instance with an options record
    ///
    /// Fields are seeded from deep copies of `deep_props`, then from the
    /// shared `props` cells. Initializers then run in composition order; one
    /// returning `Some` replaces the working instance, whose
    /// [`origin`](Instance::origin) stays this template.
    pub fn instantiate_with(&self, options: Record) -> ComposeResult<Instance> {
        let descriptor = self.folded();
        let mut instance = Instance::blank(self.clone());

        for (key, value) in &descriptor.deep_props {
            if !value.is_nil() {
                instance.fields.insert(key.clone(), Slot::Owned(deep_copy(value)));
            }
        }
        for (key, cell) in self.shared_props() {
            instance.fields.insert(key.clone(), Slot::Shared(Arc::clone(cell)));
        }

        for (index, initializer) in descriptor.initializers.iter().enumerate() {
            trace!(template = %self, initializer = index, "running initializer");
            if let Some(replacement) = initializer.call(&mut instance, &options)? {
                instance = replacement;
                instance.origin = self.clone();
            }
        }

        debug!(
            template = %self,
            template_id = %self.id(),
            fields = instance.fields.len(),
            "instantiated template"
        );
        Ok(instance)
    }
}
