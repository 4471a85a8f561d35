// Copyright 2025 Cowboy AI, LLC.

//! Required members
//!
//! `_required` is a deep static shaped like a partial descriptor whose leaves
//! are presence markers, e.g. `{ methods: { Destroy: true } }`. The check runs
//! as an initializer, so a template may be composed without a promised member
//! and only fails when instantiated before a later composition supplies it.

use std::sync::LazyLock;

use crate::callable::Initializer;
use crate::descriptor::{Descriptor, Field};
use crate::errors::{ComposeError, ComposeResult};
use crate::instance::Instance;
use crate::record;
use crate::template::Template;
use crate::value::{Record, Value};

/// Deep static key holding the requirements
pub const REQUIRED_KEY: &str = "_required";

static BASE: LazyLock<Template> = LazyLock::new(|| {
    Template::from_descriptor(
        Descriptor::new()
            .with_deep_static(REQUIRED_KEY, Record::new())
            .with_initializer(Initializer::new(check_required)),
    )
});

/// The base required-member extension, with no requirements
pub fn required() -> Template {
    BASE.clone()
}

/// Required-member extension promising the members in `wanted`
///
/// `wanted` is a record of descriptor categories to member markers, usually
/// built with [`Requirements`].
pub fn require(wanted: impl Into<Value>) -> ComposeResult<Template> {
    required().deep_statics(record! { REQUIRED_KEY => wanted.into() })
}

/// Builder for a set of required members
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requirements {
    members: Record,
}

impl Requirements {
    /// Create an empty requirement set
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a member in any keyed descriptor field
    pub fn member(mut self, field: Field, name: impl Into<String>) -> Self {
        let category = self
            .members
            .entry(field.key().to_string())
            .or_insert_with(|| Value::Record(Record::new()));
        if let Value::Record(members) = category {
            members.insert(name.into(), Value::Bool(true));
        }
        self
    }

    /// Require a method
    pub fn method(self, name: impl Into<String>) -> Self {
        self.member(Field::Methods, name)
    }

    /// Require a prop
    pub fn prop(self, name: impl Into<String>) -> Self {
        self.member(Field::Props, name)
    }

    /// Require a deep prop
    pub fn deep_prop(self, name: impl Into<String>) -> Self {
        self.member(Field::DeepProps, name)
    }
}

impl From<Requirements> for Value {
    fn from(requirements: Requirements) -> Self {
        Value::Record(requirements.members)
    }
}

fn check_required(instance: &mut Instance, _options: &Record) -> ComposeResult<Option<Instance>> {
    // An earlier initializer may have substituted the working instance
    let descriptor = instance.origin().descriptor();
    let Some(Value::Record(wanted)) = descriptor.deep_statics.get(REQUIRED_KEY) else {
        return Ok(None);
    };

    for (category, members) in wanted {
        let field = Field::from_key(category).ok_or_else(|| ComposeError::UnknownDescriptorKey {
            key: category.clone(),
        })?;
        if !field.is_keyed() {
            return Err(ComposeError::DescriptorTypeMismatch {
                field: category.clone(),
                expected: "keyed field",
                actual: field.expected(),
            });
        }
        let Value::Record(members) = members else {
            return Err(ComposeError::DescriptorTypeMismatch {
                field: category.clone(),
                expected: "record",
                actual: members.type_name(),
            });
        };

        for (member, marker) in members {
            if marker.is_truthy() && !descriptor.defines(field, member) {
                return Err(ComposeError::MissingRequiredMember {
                    member: member.clone(),
                    category: category.clone(),
                });
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Method;
    use crate::composable::Composable;
    use crate::compose::compose;
    use pretty_assertions::assert_eq;

    fn destroy() -> Composable {
        Descriptor::new()
            .with_method("Destroy", Method::new(|_, _| Ok(Value::Nil)))
            .into()
    }

    /// Test that requirements are checked at instantiation, not composition
    ///
    /// ```mermaid
    /// graph LR
    ///     A[require Destroy] -->|compose| B[Template]
    ///     B -->|new| C[MissingRequiredMember]
    ///     B -->|compose Destroy| D[Template']
    ///     D -->|new| E[Instance]
    /// ```
    #[test]
    fn test_requirement_deferred_to_instantiation() {
        let promised =
            compose([require(Requirements::new().method("Destroy")).unwrap()]).unwrap();

        assert_eq!(
            promised.instantiate().unwrap_err(),
            ComposeError::MissingRequiredMember {
                member: "Destroy".to_string(),
                category: "methods".to_string(),
            }
        );

        let fulfilled = promised.compose([destroy()]).unwrap();
        assert!(fulfilled.instantiate().is_ok());
    }

    #[test]
    fn test_requirement_checks_the_template_being_built() {
        let stand_in = compose(["StandIn"]).unwrap().compose([destroy()]).unwrap();
        let swap = Initializer::new(move |_, _| Ok(Some(stand_in.instantiate()?)));

        let door = compose(["Door"])
            .unwrap()
            .init(swap)
            .unwrap()
            .compose([require(Requirements::new().method("Destroy")).unwrap()])
            .unwrap();

        assert!(!door.descriptor().defines(Field::Methods, "Destroy"));
        assert_eq!(
            door.instantiate().unwrap_err(),
            ComposeError::MissingRequiredMember {
                member: "Destroy".to_string(),
                category: "methods".to_string(),
            }
        );
    }

    #[test]
    fn test_prop_requirement() {
        let promised = require(Requirements::new().prop("Health")).unwrap();
        assert!(matches!(
            promised.instantiate(),
            Err(ComposeError::MissingRequiredMember { member, category })
                if member == "Health" && category == "props"
        ));

        let absent = promised.props(record! { "Health" => Value::Nil }).unwrap();
        assert!(absent.instantiate().is_err());

        let present = promised.props(record! { "Health" => 100 }).unwrap();
        let instance = present.instantiate().unwrap();
        assert_eq!(instance.get("Health"), Some(Value::Int(100)));
    }

    #[test]
    fn test_requirements_accumulate() {
        let template = compose([
            require(Requirements::new().method("Destroy")).unwrap(),
            require(Requirements::new().deep_prop("Inventory")).unwrap(),
        ])
        .unwrap();

        assert_eq!(template.descriptor().initializers.len(), 1);
        let err = template.compose([destroy()]).unwrap().instantiate().unwrap_err();
        assert!(matches!(
            err,
            ComposeError::MissingRequiredMember { category, .. } if category == "deepProps"
        ));
    }

    #[test]
    fn test_false_marker_is_not_required() {
        let template = require(record! { "methods" => record! { "Destroy" => false } }).unwrap();
        assert!(template.instantiate().is_ok());
    }

    #[test]
    fn test_invalid_categories() {
        let err = require(record! { "method" => record! { "Destroy" => true } })
            .unwrap()
            .instantiate()
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::UnknownDescriptorKey {
                key: "method".to_string()
            }
        );

        let err = require(record! { "initializers" => record! { "x" => true } })
            .unwrap()
            .instantiate()
            .unwrap_err();
        assert!(matches!(err, ComposeError::DescriptorTypeMismatch { .. }));
    }

    #[test]
    fn test_requirements_builder() {
        let wanted = Value::from(Requirements::new().method("A").method("B").prop("C"));
        assert_eq!(
            wanted,
            Value::Record(record! {
                "methods" => record! { "A" => true, "B" => true },
                "props" => record! { "C" => true },
            })
        );
    }
}
