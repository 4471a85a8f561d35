// Copyright 2025 Cowboy AI, LLC.

//! Method collision policy
//!
//! The policy lives in the `_collision` deep static as
//! `{ forbid: [name...], defer: [name...] }` and accumulates structurally
//! across compositions. One composer enforces it, attributing each method
//! to the composable that defined it:
//! - a forbidden name defined by two sources fails the composition
//! - a deferred name defined by two or more sources is replaced by a
//!   dispatcher that calls every definition in composition order and returns
//!   their results most-recently-composed first

use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use tracing::trace;

use crate::callable::{Composer, Method};
use crate::compose::Provenance;
use crate::descriptor::Descriptor;
use crate::errors::{ComposeError, ComposeResult};
use crate::record;
use crate::template::Template;
use crate::value::{Record, Value};

/// Deep static key holding the policy
pub const COLLISION_KEY: &str = "_collision";

const FORBID: &str = "forbid";
const DEFER: &str = "defer";

static BASE: LazyLock<Template> = LazyLock::new(|| {
    Template::from_descriptor(
        Descriptor::new()
            .with_deep_static(
                COLLISION_KEY,
                record! { FORBID => Vec::<Value>::new(), DEFER => Vec::<Value>::new() },
            )
            .with_composer(Composer::new(resolve_collisions)),
    )
});

/// The base collision extension, with an empty policy
pub fn collision() -> Template {
    BASE.clone()
}

/// Collision extension forbidding the given method names
pub fn forbid_collision<I, S>(names: I) -> ComposeResult<Template>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    with_policy(FORBID, names)
}

/// Collision extension deferring the given method names
pub fn defer_collision<I, S>(names: I) -> ComposeResult<Template>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    with_policy(DEFER, names)
}

fn with_policy<I, S>(list: &str, names: I) -> ComposeResult<Template>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<Value> = names.into_iter().map(|name| Value::Str(name.into())).collect();
    collision().deep_statics(record! { COLLISION_KEY => record! { list => names } })
}

/// The collision policy folded into a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionPolicy {
    forbid: HashSet<String>,
    defer: HashSet<String>,
}

impl CollisionPolicy {
    /// Read the policy from a template's deep statics
    pub fn of(template: &Template) -> Self {
        let Some(Value::Record(policy)) = template.folded().deep_statics.get(COLLISION_KEY)
        else {
            return Self::default();
        };
        CollisionPolicy {
            forbid: names(policy, FORBID),
            defer: names(policy, DEFER),
        }
    }

    /// Whether redefining `name` is an error
    pub fn forbids(&self, name: &str) -> bool {
        self.forbid.contains(name)
    }

    /// Whether redefinitions of `name` are combined
    pub fn defers(&self, name: &str) -> bool {
        self.defer.contains(name)
    }

    /// Check if the policy names no methods
    pub fn is_empty(&self) -> bool {
        self.forbid.is_empty() && self.defer.is_empty()
    }
}

fn names(policy: &Record, list: &str) -> HashSet<String> {
    policy
        .get(list)
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn resolve_collisions(
    mut template: Template,
    provenance: &Provenance<'_>,
) -> ComposeResult<Template> {
    let policy = CollisionPolicy::of(&template);
    if policy.is_empty() {
        return Ok(template);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut deferred: IndexMap<&str, Vec<Method>> = IndexMap::new();

    for descriptor in provenance.descriptors() {
        for (name, method) in &descriptor.methods {
            let repeated = !seen.insert(name.as_str());
            if repeated && policy.forbids(name) {
                return Err(ComposeError::ForbiddenCollision {
                    method: name.clone(),
                    template: template.to_string(),
                });
            }
            if policy.defers(name) {
                deferred.entry(name.as_str()).or_default().push(method.clone());
            }
        }
    }

    for (name, methods) in deferred {
        if methods.len() > 1 {
            trace!(
                template = %template,
                method = name,
                definitions = methods.len(),
                "deferring collision"
            );
            template.set_method(name, deferred_dispatcher(methods));
        }
    }
    Ok(template)
}

fn deferred_dispatcher(methods: Vec<Method>) -> Method {
    Method::new(move |instance, args| {
        let mut results = Vec::with_capacity(methods.len());
        for method in &methods {
            results.push(method.call(instance, args)?);
        }
        results.reverse();
        Ok(Value::List(results))
    })
}
