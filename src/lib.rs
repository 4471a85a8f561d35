// Copyright 2025 Cowboy AI, LLC.

//! # CIM Compose
//!
//! Trait composition engine for the Composable Information Machine.
//!
//! Instead of single-parent inheritance, independent trait fragments
//! (descriptors) are merged at composition time into a new [`Template`],
//! which can itself be composed again:
//! - **Merge Utilities**: deep copy, shallow assign, de-duplicating concat and structural merge
//! - **Descriptor**: the canonical shape of a trait fragment and its merge rules
//! - **Compose**: folds composables into a template and runs composer hooks
//! - **Template**: method dispatch, statics and generated chain helpers
//! - **Instance**: built by running initializers over seeded defaults
//! - **Extensions**: collision policy and required members
//!
//! ## Example
//!
//! ```rust
//! use cim_compose::{compose, record, Descriptor, Method, Value};
//!
//! let mortal = compose([Descriptor::new()
//!     .named("Mortal")
//!     .with_prop("Health", 100)
//!     .with_method("IsAlive", Method::new(|this, _| {
//!         let health = this.get("Health").and_then(|h| h.as_int()).unwrap_or(0);
//!         Ok(Value::Bool(health > 0))
//!     }))])
//! .unwrap();
//!
//! let knight = mortal
//!     .name("Knight")
//!     .unwrap()
//!     .deep_props(record! { "Inventory" => vec!["sword"] })
//!     .unwrap();
//!
//! let mut arthur = knight.instantiate().unwrap();
//! assert_eq!(arthur.call("IsAlive", &[]).unwrap(), Value::Bool(true));
//! assert_eq!(arthur.to_string(), "Knight");
//! ```

#![warn(missing_docs)]

mod callable;
mod composable;
mod compose;
mod descriptor;
mod errors;
mod instance;
pub mod merge;
mod template;
mod value;

#[cfg(feature = "extensions")]
pub mod extensions;

pub use callable::{Composer, Hook, Initializer, Method, MethodSink, MethodTable};
pub use composable::Composable;
pub use compose::{compose, Provenance};
pub use descriptor::{Descriptor, Field, INIT_SHORTHAND};
pub use errors::{ComposeError, ComposeResult};
pub use instance::{Instance, SharedValue};
pub use template::{is_template, Member, Template, CHAIN_HELPERS};
pub use value::{Kind, Record, Value};

#[cfg(feature = "extensions")]
pub use extensions::{
    collision, defer_collision, forbid_collision, require, required, CollisionPolicy,
    Requirements,
};
