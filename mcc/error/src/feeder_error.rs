use std::{borrow::Cow, fmt};

use mcc_common::{CompileContext, Span};

use crate::{snippet::AnnotationOwned, AsAnnotationSnippet, SnippetOwned};

/// Thrown when a directive reads more tokens from its statement than available,
/// or a token of the wrong type
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct FeederError {
    pub kind: FeederErrorKind,
    /// The span of the offending token, or of the whole statement if exhausted
    pub span: Span,
    pub line: usize,
    /// The rendered source of the statement that was read from
    pub source: String,
    /// The index of the token that could not be read
    pub position: usize,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum FeederErrorKind {
    Exhausted { expected: String },
    UnexpectedToken { expected: String, got: String },
}

impl fmt::Display for FeederErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeederErrorKind::Exhausted { expected } => {
                write!(f, "Expected {expected}, but the statement ended")
            }
            FeederErrorKind::UnexpectedToken { expected, got } => {
                write!(f, "Expected {expected}, but got '{got}'")
            }
        }
    }
}

impl<'a> AsAnnotationSnippet<'a> for FeederError {
    fn as_annotation_snippet(&self, ctx: &'a CompileContext) -> SnippetOwned<'a> {
        crate::single_slice_snippet(
            ctx,
            Cow::Borrowed("Feeder"),
            self.kind.to_string(),
            self.span,
            format!("Argument {} of this statement", self.position + 1),
            vec![AnnotationOwned::info(format!("Statement: {}", self.source))],
        )
    }
}
