//! Path argument binding errors.

use thiserror::Error;

/// Errors raised while binding call arguments into a path template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The number of supplied arguments does not match the placeholders,
    /// or a named argument matched no placeholder.
    #[error("Path {template} expects {expected} argument(s) but {supplied} were supplied")]
    Arity {
        /// The path template being resolved.
        template: String,
        /// Number of placeholders in the template.
        expected: usize,
        /// Number of arguments supplied by the caller.
        supplied: usize,
        /// Placeholders left without a value.
        unresolved: Vec<String>,
    },

    /// An argument cannot be written into a path segment.
    #[error("Path argument for :{placeholder}: must be a string, number or boolean, got {kind}")]
    UnsupportedArgument {
        /// The placeholder the argument was bound to.
        placeholder: String,
        /// JSON kind of the rejected value.
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_display() {
        let err = PathError::Arity {
            template: "/a/:x:/b/:y:".to_string(),
            expected: 2,
            supplied: 3,
            unresolved: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Path /a/:x:/b/:y: expects 2 argument(s) but 3 were supplied"
        );
    }

    #[test]
    fn test_unsupported_argument_display() {
        let err = PathError::UnsupportedArgument {
            placeholder: "id".to_string(),
            kind: "object",
        };
        assert!(err.to_string().contains(":id:"));
        assert!(err.to_string().ends_with("got object"));
    }
}
