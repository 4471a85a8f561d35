// Copyright 2025 Cowboy AI, LLC.

//! Error types for composition and construction

use thiserror::Error;

/// Errors that can occur while composing templates or building instances
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    /// A composable is neither a template, a descriptor record, nor a name
    #[error("Invalid composable: expected a template, descriptor or name, got {kind}")]
    InvalidComposable {
        /// Kind of value that was received
        kind: &'static str,
    },

    /// A non-callable value was written where a method is expected
    #[error("Invalid method value for {name}: expected a method, got {kind}")]
    InvalidMethodValue {
        /// Method name being written
        name: String,
        /// Kind of value that was received
        kind: &'static str,
    },

    /// A descriptor record contains a key outside the schema
    #[error("Unknown descriptor key: {key}")]
    UnknownDescriptorKey {
        /// The offending key
        key: String,
    },

    /// A descriptor field holds a value of the wrong kind
    #[error("Descriptor type mismatch for {field}: expected {expected}, got {actual}")]
    DescriptorTypeMismatch {
        /// Descriptor field key
        field: String,
        /// Kind the schema declares
        expected: &'static str,
        /// Kind that was supplied
        actual: &'static str,
    },

    /// `new` received an options value that is not a record
    #[error("Bad argument: expected an options record, got {kind}")]
    BadArgument {
        /// Kind of value that was received
        kind: &'static str,
    },

    /// `new` received more than one positional argument
    #[error("Too many arguments: expected at most 1, got {count}")]
    TooManyArguments {
        /// Number of arguments supplied
        count: usize,
    },

    /// A forbidden method name was defined by more than one source
    #[error("Forbidden collision: method {method} defined more than once in {template}")]
    ForbiddenCollision {
        /// Colliding method name
        method: String,
        /// Name of the template being composed
        template: String,
    },

    /// A promised member was never supplied by any composition
    #[error("Missing required member: {member} in {category}")]
    MissingRequiredMember {
        /// Member name
        member: String,
        /// Descriptor category the member was promised in
        category: String,
    },

    /// Method dispatch found neither an own field nor a template method
    #[error("Unknown method: {method} on {template}")]
    UnknownMethod {
        /// Method name that was called
        method: String,
        /// Name of the instance's template
        template: String,
    },

    /// Failure raised by user code inside a method, initializer or composer
    #[error("Compose error: {0}")]
    Generic(String),
}

/// Result type for composition operations
pub type ComposeResult<T> = Result<T, ComposeError>;

impl ComposeError {
    /// Create a generic error, typically from inside a user callable
    pub fn generic(msg: impl Into<String>) -> Self {
        ComposeError::Generic(msg.into())
    }

    /// Check if this error comes from descriptor schema validation
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            ComposeError::InvalidComposable { .. }
                | ComposeError::InvalidMethodValue { .. }
                | ComposeError::UnknownDescriptorKey { .. }
                | ComposeError::DescriptorTypeMismatch { .. }
        )
    }

    /// Check if this error was raised by a malformed `new` call
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            ComposeError::BadArgument { .. } | ComposeError::TooManyArguments { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[ComposeError] -->|Display| B[Error Message]
    ///     A -->|Clone| C[Cloned Error]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = ComposeError::InvalidComposable { kind: "integer" };
        assert_eq!(
            err.to_string(),
            "Invalid composable: expected a template, descriptor or name, got integer"
        );

        let err = ComposeError::UnknownDescriptorKey {
            key: "prop".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown descriptor key: prop");

        let err = ComposeError::DescriptorTypeMismatch {
            field: "methods".to_string(),
            expected: "record",
            actual: "integer",
        };
        assert_eq!(
            err.to_string(),
            "Descriptor type mismatch for methods: expected record, got integer"
        );

        let err = ComposeError::ForbiddenCollision {
            method: "Destroy".to_string(),
            template: "Player".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Forbidden collision: method Destroy defined more than once in Player"
        );

        let err = ComposeError::MissingRequiredMember {
            member: "Destroy".to_string(),
            category: "methods".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required member: Destroy in methods");

        let err = ComposeError::TooManyArguments { count: 2 };
        assert_eq!(err.to_string(), "Too many arguments: expected at most 1, got 2");
    }

    #[test]
    fn test_error_predicates() {
        assert!(ComposeError::UnknownDescriptorKey { key: "x".into() }.is_schema_error());
        assert!(ComposeError::InvalidMethodValue {
            name: "f".into(),
            kind: "integer"
        }
        .is_schema_error());
        assert!(!ComposeError::BadArgument { kind: "string" }.is_schema_error());

        assert!(ComposeError::BadArgument { kind: "string" }.is_construction_error());
        assert!(ComposeError::TooManyArguments { count: 3 }.is_construction_error());
        assert!(!ComposeError::generic("boom").is_construction_error());
    }

    #[test]
    fn test_generic_error() {
        let err = ComposeError::generic("initializer failed");
        assert_eq!(err, ComposeError::Generic("initializer failed".to_string()));
        assert_eq!(err.to_string(), "Compose error: initializer failed");
    }
}
