// Copyright 2025 Cowboy AI, LLC.

//! Callables stored in descriptors
//!
//! Every callable is an `Arc`-backed closure compared by identity, so the
//! same hook composed in through several paths de-duplicates to one entry.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::compose::Provenance;
use crate::errors::{ComposeError, ComposeResult};
use crate::instance::Instance;
use crate::template::Template;
use crate::value::{Record, Value};

type MethodFn = dyn Fn(&mut Instance, &[Value]) -> ComposeResult<Value> + Send + Sync;
type InitializerFn =
    dyn Fn(&mut Instance, &Record) -> ComposeResult<Option<Instance>> + Send + Sync;
type ComposerFn = dyn Fn(Template, &Provenance<'_>) -> ComposeResult<Template> + Send + Sync;
type MethodTableFn = dyn Fn(&mut MethodSink) -> ComposeResult<()> + Send + Sync;

macro_rules! identity_callable {
    ($name:ident) => {
        impl Clone for $name {
            fn clone(&self) -> Self {
                Self(Arc::clone(&self.0))
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&Arc::as_ptr(&self.0).cast::<()>())
                    .finish()
            }
        }

        impl $name {
            /// Check whether two handles refer to the same callable
            pub fn ptr_eq(a: &Self, b: &Self) -> bool {
                Arc::ptr_eq(&a.0, &b.0)
            }
        }
    };
}

/// A method callable on instances
///
/// The returned value is the method's result. Multiple results are returned
/// as a [`Value::List`].
pub struct Method(Arc<MethodFn>);

identity_callable!(Method);

impl Method {
    /// Wrap a closure as a method
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> ComposeResult<Value> + Send + Sync + 'static,
    {
        Method(Arc::new(f))
    }

    /// Invoke the method on an instance
    pub fn call(&self, instance: &mut Instance, args: &[Value]) -> ComposeResult<Value> {
        (self.0)(instance, args)
    }
}

/// An instance initializer
///
/// Runs once per construction with the instance and the options record.
/// Returning `Some` replaces the working instance.
pub struct Initializer(Arc<InitializerFn>);

identity_callable!(Initializer);

impl Initializer {
    /// Wrap a closure as an initializer
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, &Record) -> ComposeResult<Option<Instance>> + Send + Sync + 'static,
    {
        Initializer(Arc::new(f))
    }

    /// Run the initializer
    pub fn call(
        &self,
        instance: &mut Instance,
        options: &Record,
    ) -> ComposeResult<Option<Instance>> {
        (self.0)(instance, options)
    }
}

/// A composition hook, one step of the `Template -> Template` pipeline
pub struct Composer(Arc<ComposerFn>);

identity_callable!(Composer);

impl Composer {
    /// Wrap a closure as a composer
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Template, &Provenance<'_>) -> ComposeResult<Template> + Send + Sync + 'static,
    {
        Composer(Arc::new(f))
    }

    /// Apply the composer to a freshly built template
    pub fn apply(
        &self,
        template: Template,
        provenance: &Provenance<'_>,
    ) -> ComposeResult<Template> {
        (self.0)(template, provenance)
    }
}

/// Builder for the functional `methods` shorthand
///
/// Invoked once at composition time with an empty [`MethodSink`].
pub struct MethodTable(Arc<MethodTableFn>);

identity_callable!(MethodTable);

impl MethodTable {
    /// Wrap a closure as a method table builder
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut MethodSink) -> ComposeResult<()> + Send + Sync + 'static,
    {
        MethodTable(Arc::new(f))
    }

    /// Run the builder and collect the methods it wrote
    pub fn build(&self) -> ComposeResult<IndexMap<String, Method>> {
        let mut sink = MethodSink::default();
        (self.0)(&mut sink)?;
        Ok(sink.methods)
    }
}

/// Write-only record that only accepts methods
#[derive(Default)]
pub struct MethodSink {
    methods: IndexMap<String, Method>,
}

impl MethodSink {
    /// Write a value, failing unless it is a method
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ComposeResult<()> {
        let name = name.into();
        match value.into() {
            Value::Method(method) => {
                self.methods.insert(name, method);
                Ok(())
            }
            other => Err(ComposeError::InvalidMethodValue {
                name,
                kind: other.type_name(),
            }),
        }
    }

    /// Define a method from a closure
    pub fn define<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut Instance, &[Value]) -> ComposeResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Method::new(f));
    }
}

/// Hooks that may appear as values inside a raw descriptor record
#[derive(Debug, Clone, PartialEq)]
pub enum Hook {
    /// Entry for `initializers` or the `init` shorthand
    Initializer(Initializer),
    /// Entry for `composers`
    Composer(Composer),
    /// The functional `methods` shorthand
    MethodTable(MethodTable),
}

impl Hook {
    /// Human readable name of the hook, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Hook::Initializer(_) => "initializer",
            Hook::Composer(_) => "composer",
            Hook::MethodTable(_) => "method table",
        }
    }
}

impl From<Initializer> for Value {
    fn from(initializer: Initializer) -> Self {
        Value::Hook(Hook::Initializer(initializer))
    }
}

impl From<Composer> for Value {
    fn from(composer: Composer) -> Self {
        Value::Hook(Hook::Composer(composer))
    }
}

impl From<MethodTable> for Value {
    fn from(table: MethodTable) -> Self {
        Value::Hook(Hook::MethodTable(table))
    }
}
