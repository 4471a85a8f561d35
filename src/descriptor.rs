// Copyright 2025 Cowboy AI, LLC.

//! Descriptor model
//!
//! A [`Descriptor`] is the canonical shape of a trait fragment. Descriptors
//! are either built with the typed builder methods or parsed from a raw
//! [`Record`] with [`Descriptor::from_record`], which validates every key
//! against the fixed [`Field`] schema.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::callable::{Composer, Hook, Initializer, Method};
use crate::errors::{ComposeError, ComposeResult};
use crate::merge::{assign, concat_dedup, merge_structural};
use crate::value::{Record, Value};

/// Key of the `init` functional shorthand
pub const INIT_SHORTHAND: &str = "init";

/// The declared descriptor fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Template name, last writer wins
    Name,
    /// Instance methods, shallow overwrite
    Methods,
    /// Shared-by-reference instance defaults, shallow overwrite
    Props,
    /// Deep-copied instance defaults, structural merge
    DeepProps,
    /// Template-level values, shallow overwrite
    Statics,
    /// Template-level values, structural merge
    DeepStatics,
    /// Construction hooks, concatenated
    Initializers,
    /// Composition hooks, concatenated
    Composers,
}

impl Field {
    /// Every field, in schema order
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Methods,
        Field::Props,
        Field::DeepProps,
        Field::Statics,
        Field::DeepStatics,
        Field::Initializers,
        Field::Composers,
    ];

    /// Record key of this field
    pub const fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Methods => "methods",
            Field::Props => "props",
            Field::DeepProps => "deepProps",
            Field::Statics => "statics",
            Field::DeepStatics => "deepStatics",
            Field::Initializers => "initializers",
            Field::Composers => "composers",
        }
    }

    /// Look a field up by its record key
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Whether the field holds named members
    pub fn is_keyed(self) -> bool {
        !matches!(self, Field::Name | Field::Initializers | Field::Composers)
    }

    /// Kind of value the schema expects, as shown in errors
    pub fn expected(self) -> &'static str {
        match self {
            Field::Name => "string",
            Field::Initializers => "list of initializers",
            Field::Composers => "list of composers",
            Field::Methods => "record of methods",
            _ => "record",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The merged specification of a trait fragment
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    /// Template name
    pub name: Option<String>,
    /// Methods dispatched from instances
    pub methods: IndexMap<String, Method>,
    /// Defaults shared by reference into every instance
    pub props: Record,
    /// Defaults deep-copied into every instance
    pub deep_props: Record,
    /// Values attached to the template
    pub statics: Record,
    /// Nested values attached to the template
    pub deep_statics: Record,
    /// Construction hooks in composition order
    pub initializers: Vec<Initializer>,
    /// Composition hooks in composition order
    pub composers: Vec<Composer>,
}

impl Descriptor {
    /// Create an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a method
    pub fn with_method(mut self, name: impl Into<String>, method: Method) -> Self {
        self.methods.insert(name.into(), method);
        self
    }

    /// Add a shared default
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Add a deep-copied default
    pub fn with_deep_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.deep_props.insert(key.into(), value.into());
        self
    }

    /// Add a static
    pub fn with_static(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(key.into(), value.into());
        self
    }

    /// Add a deep static
    pub fn with_deep_static(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.deep_statics.insert(key.into(), value.into());
        self
    }

    /// Append an initializer
    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        if !self.initializers.contains(&initializer) {
            self.initializers.push(initializer);
        }
        self
    }

    /// Append a composer
    pub fn with_composer(mut self, composer: Composer) -> Self {
        if !self.composers.contains(&composer) {
            self.composers.push(composer);
        }
        self
    }

    /// Parse and validate a raw descriptor record
    ///
    /// Functional shorthands are expanded here: an `init` hook is appended to
    /// the initializers and a method-table hook under `methods` is invoked
    /// once to produce the methods record.
    ///
    /// # Errors
    ///
    /// - `UnknownDescriptorKey` for keys outside the schema
    /// - `DescriptorTypeMismatch` for values of the wrong kind
    /// - `InvalidMethodValue` for non-method entries under `methods`
    pub fn from_record(record: &Record) -> ComposeResult<Descriptor> {
        let mut descriptor = Descriptor::default();
        let mut init = None;

        for (key, value) in record {
            if value.is_nil() {
                continue;
            }
            if key == INIT_SHORTHAND {
                match value {
                    Value::Hook(Hook::Initializer(initializer)) => init = Some(initializer.clone()),
                    other => {
                        return Err(ComposeError::DescriptorTypeMismatch {
                            field: key.clone(),
                            expected: "initializer",
                            actual: other.type_name(),
                        })
                    }
                }
                continue;
            }

            let field = Field::from_key(key).ok_or_else(|| ComposeError::UnknownDescriptorKey {
                key: key.clone(),
            })?;
            descriptor.set_field(field, value)?;
        }

        if let Some(initializer) = init {
            descriptor = descriptor.with_initializer(initializer);
        }
        Ok(descriptor)
    }

    fn set_field(&mut self, field: Field, value: &Value) -> ComposeResult<()> {
        let mismatch = || ComposeError::DescriptorTypeMismatch {
            field: field.key().to_string(),
            expected: field.expected(),
            actual: value.type_name(),
        };

        match (field, value) {
            (Field::Name, Value::Str(name)) => self.name = Some(name.clone()),
            (Field::Methods, Value::Record(methods)) => {
                for (name, method) in methods {
                    match method {
                        Value::Method(method) => {
                            self.methods.insert(name.clone(), method.clone());
                        }
                        other => {
                            return Err(ComposeError::InvalidMethodValue {
                                name: name.clone(),
                                kind: other.type_name(),
                            })
                        }
                    }
                }
            }
            (Field::Methods, Value::Hook(Hook::MethodTable(table))) => {
                self.methods = table.build()?;
            }
            (Field::Props, Value::Record(record)) => self.props = record.clone(),
            (Field::DeepProps, Value::Record(record)) => self.deep_props = record.clone(),
            (Field::Statics, Value::Record(record)) => self.statics = record.clone(),
            (Field::DeepStatics, Value::Record(record)) => self.deep_statics = record.clone(),
            (Field::Initializers, Value::List(items)) => {
                for item in items {
                    match item {
                        Value::Hook(Hook::Initializer(initializer)) => {
                            self.initializers.push(initializer.clone())
                        }
                        _ => return Err(mismatch()),
                    }
                }
            }
            (Field::Composers, Value::List(items)) => {
                for item in items {
                    match item {
                        Value::Hook(Hook::Composer(composer)) => {
                            self.composers.push(composer.clone())
                        }
                        _ => return Err(mismatch()),
                    }
                }
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// Fold another descriptor into this one
    ///
    /// `name` is last-writer-wins, `methods`/`props`/`statics` overwrite per
    /// key, `deep_props`/`deep_statics` merge structurally and the hook
    /// sequences concatenate with identity de-duplication.
    pub fn merge(&mut self, other: &Descriptor) {
        if let Some(name) = &other.name {
            self.name = Some(name.clone());
        }
        for (name, method) in &other.methods {
            self.methods.insert(name.clone(), method.clone());
        }
        assign(&mut self.props, [&other.props]);
        assign(&mut self.statics, [&other.statics]);
        merge_structural(&mut self.deep_props, &other.deep_props);
        merge_structural(&mut self.deep_statics, &other.deep_statics);
        self.initializers =
            concat_dedup([self.initializers.as_slice(), other.initializers.as_slice()]);
        self.composers = concat_dedup([self.composers.as_slice(), other.composers.as_slice()]);
    }

    /// Whether a keyed field defines `member` with a non-absent value
    pub fn defines(&self, field: Field, member: &str) -> bool {
        let present = |record: &Record| record.get(member).is_some_and(|v| !v.is_nil());
        match field {
            Field::Methods => self.methods.contains_key(member),
            Field::Props => present(&self.props),
            Field::DeepProps => present(&self.deep_props),
            Field::Statics => present(&self.statics),
            Field::DeepStatics => present(&self.deep_statics),
            Field::Name | Field::Initializers | Field::Composers => false,
        }
    }
}
