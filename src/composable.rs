// Copyright 2025 Cowboy AI, LLC.

//! Inputs accepted by [`compose`](crate::compose())

use crate::descriptor::Descriptor;
use crate::errors::{ComposeError, ComposeResult};
use crate::template::Template;
use crate::value::{Record, Value};

/// Anything that reduces to a descriptor
#[derive(Debug, Clone)]
pub enum Composable {
    /// An existing template, contributing its folded descriptor and current prop defaults
    Template(Template),
    /// A typed descriptor
    Descriptor(Descriptor),
    /// Shorthand for a descriptor with only a name
    Name(String),
    /// A raw value, which must be a descriptor record, a template or a name
    Value(Value),
}

impl Composable {
    /// Resolve to a descriptor, expanding shorthands and validating raw records
    ///
    /// # Errors
    ///
    /// Returns `InvalidComposable` for values of any other kind, and the
    /// schema errors of [`Descriptor::from_record`] for bad records.
    pub fn resolve(&self) -> ComposeResult<Descriptor> {
        match self {
            Composable::Template(template) => Ok(template.descriptor()),
            Composable::Descriptor(descriptor) => Ok(descriptor.clone()),
            Composable::Name(name) => Ok(Descriptor::new().named(name.clone())),
            Composable::Value(value) => match value {
                Value::Record(record) => Descriptor::from_record(record),
                Value::Template(template) => Ok(template.descriptor()),
                Value::Str(name) => Ok(Descriptor::new().named(name.clone())),
                other => Err(ComposeError::InvalidComposable {
                    kind: other.type_name(),
                }),
            },
        }
    }

    /// The template this composable wraps, if any
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Composable::Template(template) | Composable::Value(Value::Template(template)) => {
                Some(template)
            }
            _ => None,
        }
    }
}

impl From<Template> for Composable {
    fn from(template: Template) -> Self {
        Composable::Template(template)
    }
}

impl From<&Template> for Composable {
    fn from(template: &Template) -> Self {
        Composable::Template(template.clone())
    }
}

impl From<Descriptor> for Composable {
    fn from(descriptor: Descriptor) -> Self {
        Composable::Descriptor(descriptor)
    }
}

impl From<&str> for Composable {
    fn from(name: &str) -> Self {
        Composable::Name(name.to_string())
    }
}

impl From<String> for Composable {
    fn from(name: String) -> Self {
        Composable::Name(name)
    }
}

impl From<Record> for Composable {
    fn from(record: Record) -> Self {
        Composable::Value(Value::Record(record))
    }
}

impl From<Value> for Composable {
    fn from(value: Value) -> Self {
        Composable::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn test_name_shorthand() {
        let descriptor = Composable::from("Knight").resolve().unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("Knight"));

        let descriptor = Composable::from(Value::from("Mage")).resolve().unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("Mage"));
    }

    #[test]
    fn test_invalid_composable_names_kind() {
        let err = Composable::from(Value::Int(42)).resolve().unwrap_err();
        assert_eq!(err, ComposeError::InvalidComposable { kind: "integer" });

        let err = Composable::from(Value::from(vec![1, 2])).resolve().unwrap_err();
        assert_eq!(err, ComposeError::InvalidComposable { kind: "list" });
    }

    #[test]
    fn test_record_resolves_through_schema() {
        let descriptor = Composable::from(record! { "props" => record! { "Health" => 100 } })
            .resolve()
            .unwrap();
        assert_eq!(descriptor.props, record! { "Health" => 100 });

        let err = Composable::from(record! { "health" => 100 }).resolve().unwrap_err();
        assert!(err.is_schema_error());
    }
}
