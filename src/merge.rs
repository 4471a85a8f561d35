// Copyright 2025 Cowboy AI, LLC.

//! Merge utilities
//!
//! Pure functions used by the descriptor fold:
//! - [`deep_copy`] copies structural values element-wise
//! - [`assign`] overwrites keys shallowly, deep-copying each value
//! - [`concat_dedup`] concatenates sequences keeping first occurrences
//! - [`merge_structural`] merges nested records by [`Kind`]

use crate::value::{Kind, Record, Value};

/// Structural kind of a value
pub fn classify(value: &Value) -> Kind {
    value.kind()
}

/// Copy a value, recursing into lists and records
///
/// Scalars, callables and templates are returned as handles to the same
/// value. Structural values never share storage with their source.
pub fn deep_copy(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.iter().map(deep_copy).collect()),
        Value::Record(record) => Value::Record(
            record
                .iter()
                .map(|(key, value)| (key.clone(), deep_copy(value)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Copy every key of every source into `target`, later sources winning
pub fn assign<'a, I>(target: &mut Record, sources: I)
where
    I: IntoIterator<Item = &'a Record>,
{
    for source in sources {
        for (key, value) in source {
            target.insert(key.clone(), deep_copy(value));
        }
    }
}

/// Concatenate sequences in order, keeping only the first occurrence of each value
pub fn concat_dedup<'a, T, I>(sequences: I) -> Vec<T>
where
    T: PartialEq + Clone + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut out: Vec<T> = Vec::new();
    for sequence in sequences {
        for item in sequence {
            if !out.contains(item) {
                out.push(item.clone());
            }
        }
    }
    out
}

/// Merge `source` into `target` key by key
///
/// Records merge recursively and lists concatenate with de-duplication.
/// A scalar, or a value whose kind differs from the existing one, replaces
/// the existing value.
pub fn merge_structural(target: &mut Record, source: &Record) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Record(existing)), Value::Record(incoming)) => {
                merge_structural(existing, incoming);
            }
            (Some(Value::List(existing)), Value::List(incoming)) => {
                let merged = concat_dedup([existing.as_slice(), incoming.as_slice()]);
                *existing = merged;
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deep_copy_is_independent() {
        let original = Value::Record(record! {
            "Stats" => record! { "Health" => 100 },
            "Tags" => vec!["a"],
        });

        let mut copy = deep_copy(&original);
        copy.as_record_mut()
            .and_then(|r| r.get_mut("Stats"))
            .and_then(Value::as_record_mut)
            .unwrap()
            .insert("Health".to_string(), Value::Int(1));

        assert_eq!(
            original.as_record().unwrap()["Stats"],
            Value::Record(record! { "Health" => 100 })
        );
        assert_ne!(original, copy);
    }

    #[test]
    fn test_assign_later_sources_win() {
        let mut target = record! { "a" => 1, "b" => 1 };
        let first = record! { "b" => 2, "c" => 2 };
        let second = record! { "c" => 3 };

        assign(&mut target, [&first, &second]);

        assert_eq!(target, record! { "a" => 1, "b" => 2, "c" => 3 });
    }

    #[test]
    fn test_concat_dedup_keeps_first_occurrence() {
        let a = vec![1, 2, 3];
        let b = vec![3, 4, 1, 5];
        assert_eq!(concat_dedup([a.as_slice(), b.as_slice()]), vec![1, 2, 3, 4, 5]);
    }

    /// Test structural merge of nested records
    ///
    /// ```mermaid
    /// graph LR
    ///     A[target.Stats] -->|record + record| B[merged key by key]
    ///     C[target.Tags] -->|list + list| D[concat dedup]
    /// ```
    #[test]
    fn test_merge_structural_nested() {
        let mut target = record! {
            "Stats" => record! { "Health" => 100, "Armor" => 5 },
            "Tags" => vec!["hero"],
        };
        let source = record! {
            "Stats" => record! { "Armor" => 10, "Speed" => 2 },
            "Tags" => vec!["hero", "melee"],
        };

        merge_structural(&mut target, &source);

        assert_eq!(
            target,
            record! {
                "Stats" => record! { "Health" => 100, "Armor" => 10, "Speed" => 2 },
                "Tags" => vec!["hero", "melee"],
            }
        );
    }

    #[test]
    fn test_merge_structural_kind_mismatch_takes_incoming() {
        let mut target = record! { "Loot" => vec![1, 2] };
        merge_structural(&mut target, &record! { "Loot" => 7 });
        assert_eq!(target["Loot"], Value::Int(7));

        merge_structural(&mut target, &record! { "Loot" => vec![3] });
        assert_eq!(target["Loot"], Value::from(vec![3]));

        merge_structural(&mut target, &record! { "Loot" => record! { "gold" => 1 } });
        assert_eq!(target["Loot"], Value::Record(record! { "gold" => 1 }));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&Value::Bool(true)), Kind::Scalar);
        assert_eq!(classify(&Value::from(vec![1])), Kind::Sequence);
        assert_eq!(classify(&Value::Record(record! {})), Kind::Record);
    }
}
