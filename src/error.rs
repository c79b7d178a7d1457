use swc_common::Span;
use thiserror::Error;

use crate::node::NodeKind;
use crate::parse::ParseError;

/// A node that cannot be converted. Conversion stops at the first one.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// No conversion exists for this kind of node.
    #[error("type not understood: `{kind}`")]
    NotUnderstood { kind: NodeKind, span: Span },

    /// A name was passed where a type is required.
    #[error("`{kind}` is a name, not a type; wrap it in a type reference first")]
    BareName { kind: NodeKind, span: Span },

    /// Interfaces cannot spread other object types.
    #[error("spreads in interfaces are unsupported")]
    SpreadInInterface { span: Span },

    /// `typeof` applied to something without a name.
    #[error("typeof query must reference a node that has a name, found `{kind}`")]
    TypeofWithoutId { kind: NodeKind, span: Span },

    /// A function return type that did not convert to a type.
    #[error("could not convert return type `{kind}`")]
    ReturnType { kind: NodeKind, span: Span },

    /// A function parameter type that did not convert to a type.
    #[error("could not convert parameter type `{kind}`")]
    ParamType { kind: NodeKind, span: Span },

    /// A child of the wrong kind.
    #[error("expected {expected}, found `{found}`")]
    Unexpected {
        expected: &'static str,
        found: NodeKind,
        span: Span,
    },

    /// A utility type used without its type argument.
    #[error("`{name}` requires a type argument")]
    MissingTypeArgument { name: String, span: Span },
}

impl ConvertError {
    /// The location in the file of the node that failed.
    pub fn span(&self) -> Span {
        match self {
            ConvertError::NotUnderstood { span, .. }
            | ConvertError::BareName { span, .. }
            | ConvertError::SpreadInInterface { span }
            | ConvertError::TypeofWithoutId { span, .. }
            | ConvertError::ReturnType { span, .. }
            | ConvertError::ParamType { span, .. }
            | ConvertError::Unexpected { span, .. }
            | ConvertError::MissingTypeArgument { span, .. } => *span,
        }
    }
}

/// Errors raised while building a [`crate::registry::RuleRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Rule names are unique.
    #[error("a rule with the name \"{name}\" is already defined")]
    Duplicate { name: String },
}

/// Everything that can stop a file from being compiled.
#[derive(Debug, Error)]
pub enum Error {
    /// The file is not valid Flow.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A node had no TypeScript equivalent.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// The rule set could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A Flow node that no rule rewrote.
    #[error("no rule converted `{kind}`")]
    Unconverted { kind: NodeKind, span: Span },

    /// The blocking task running the compilation panicked or was cancelled.
    #[error("compilation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// The location in the file of the failure, when there is one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Parse(err) => Some(err.span()),
            Error::Convert(err) => Some(err.span()),
            Error::Unconverted { span, .. } => Some(*span),
            Error::Registry(_) | Error::Join(_) => None,
        }
    }
}

/// An [`Error`] together with the file and position it happened at.
#[derive(Debug, Error)]
#[error("{filename}:{line}:{column}: {error}")]
pub struct CompileError {
    /// The name the file was compiled under.
    pub filename: String,

    /// 1-based line, or 0 when the error has no location.
    pub line: usize,

    /// 1-based column, or 0 when the error has no location.
    pub column: usize,

    /// What went wrong.
    #[source]
    pub error: Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::DUMMY_SP;

    #[test]
    fn messages() {
        let err = RegistryError::Duplicate {
            name: "Casting".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "a rule with the name \"Casting\" is already defined"
        );

        let err = ConvertError::NotUnderstood {
            kind: NodeKind::FunctionTypeParam,
            span: DUMMY_SP,
        };
        assert_eq!(err.to_string(), "type not understood: `FunctionTypeParam`");
    }

    #[test]
    fn compile_error_display() {
        let err = CompileError {
            filename: "a.js".to_string(),
            line: 3,
            column: 7,
            error: Error::Convert(ConvertError::SpreadInInterface { span: DUMMY_SP }),
        };
        assert_eq!(err.to_string(), "a.js:3:7: spreads in interfaces are unsupported");
        assert_eq!(err.error.span(), Some(DUMMY_SP));
    }
}
