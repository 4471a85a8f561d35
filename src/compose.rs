// Copyright 2025 Cowboy AI, LLC.

//! Composition pipeline
//!
//! `compose` resolves every composable to a descriptor, folds them left to
//! right, builds a template from the fold and threads that template through
//! every composer in order. Inputs are never modified.

use tracing::{debug, trace};

use crate::composable::Composable;
use crate::descriptor::Descriptor;
use crate::errors::ComposeResult;
use crate::template::Template;

/// The inputs of one composition, handed to every composer
///
/// `composables()` and `descriptors()` are index-aligned: the descriptor at
/// position `i` is what the composable at position `i` resolved to.
#[derive(Debug, Clone, Copy)]
pub struct Provenance<'a> {
    composables: &'a [Composable],
    descriptors: &'a [Descriptor],
}

impl<'a> Provenance<'a> {
    /// The original composables, in composition order
    pub fn composables(&self) -> &'a [Composable] {
        self.composables
    }

    /// Each composable's own descriptor, in composition order
    pub fn descriptors(&self) -> &'a [Descriptor] {
        self.descriptors
    }

    /// Pairs of composable and resolved descriptor
    pub fn iter(&self) -> impl Iterator<Item = (&'a Composable, &'a Descriptor)> {
        self.composables.iter().zip(self.descriptors.iter())
    }

    /// Number of composables
    pub fn len(&self) -> usize {
        self.composables.len()
    }

    /// Check if the composition had no inputs
    pub fn is_empty(&self) -> bool {
        self.composables.is_empty()
    }
}

/// Compose any number of composables into a new template
///
/// # Errors
///
/// Fails if a composable does not resolve to a valid descriptor, or if a
/// composer fails. No template is produced on failure.
///
/// # Example
///
/// ```rust
/// use cim_compose::{compose, Descriptor, Value};
///
/// let named = compose(["Knight"]).unwrap();
/// let armored = compose([
///     named.into(),
///     cim_compose::Composable::from(Descriptor::new().with_prop("Armor", 5)),
/// ])
/// .unwrap();
///
/// let knight = armored.instantiate().unwrap();
/// assert_eq!(knight.get("Armor"), Some(Value::Int(5)));
/// assert_eq!(armored.to_string(), "Knight");
/// ```
pub fn compose<I>(composables: I) -> ComposeResult<Template>
where
    I: IntoIterator,
    I::Item: Into<Composable>,
{
    let composables: Vec<Composable> = composables.into_iter().map(Into::into).collect();
    let descriptors = composables
        .iter()
        .map(Composable::resolve)
        .collect::<ComposeResult<Vec<_>>>()?;

    let mut folded = Descriptor::default();
    for descriptor in &descriptors {
        folded.merge(descriptor);
    }

    let composers = folded.composers.clone();
    let mut template = Template::from_descriptor(folded);
    let provenance = Provenance {
        composables: &composables,
        descriptors: &descriptors,
    };

    for (index, composer) in composers.iter().enumerate() {
        trace!(template = %template, composer = index, "running composer");
        template = composer.apply(template, &provenance)?;
    }

    debug!(
        template = %template,
        template_id = %template.id(),
        sources = composables.len(),
        composers = composers.len(),
        "composed template"
    );
    Ok(template)
}
