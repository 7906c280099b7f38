//! Compilation error handling
//!
//! Exports the default Result type which is used everywhere in the compiler where errors can happen.
//! Errors never get printed by the compiler itself, the caller can render them with
//! [`CompileError::format`].
use std::borrow::Cow;
use std::fmt;
use std::fmt::{Display, Formatter};

use annotate_snippets::{display_list::DisplayList, snippet::AnnotationType};
use mcc_common::{CompileContext, Span};

pub use feeder_error::{FeederError, FeederErrorKind};
pub use lex_error::{LexError, LexErrorKind};
pub use snippet::{AnnotationOwned, SliceOwned, SnippetOwned, SourceAnnotationOwned};
pub use statement_error::{StatementError, StatementErrorKind};

mod utils;
pub use utils::{display_expected_of, display_expected_of_all, display_expected_of_any};

mod feeder_error;
mod lex_error;
mod snippet;
mod statement_error;

/// Used to determine whether the error messages should use console colors
/// Or be plain text
pub const COLORED: bool = cfg!(feature = "colored_errors");

/// The result type used by most of the compiler functions
pub type Result<T> = std::result::Result<T, CompileError>;

pub trait AsAnnotationSnippet<'a> {
    fn as_annotation_snippet(&self, ctx: &'a CompileContext) -> SnippetOwned<'a>;

    fn to_string(&self, ctx: &'a CompileContext) -> String {
        let snippet = self.as_annotation_snippet(ctx);
        let display_list = DisplayList::from(snippet.as_snippet(&ctx.input_files));
        display_list.to_string()
    }
}

/// A Compile Error
///
/// This type is the Err value for most of this crate.
/// It is compatible with the `annotate_snippets` library.
/// That means that nice rust-style error messages can be printed.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum CompileError {
    /// An error which happens when tokenizing or assembling the input
    Lex(LexError),
    /// An error which happens when a statement gets validated or executed
    Statement(StatementError),
    /// An error which happens when a directive reads its arguments
    Feeder(FeederError),
    /// Statement sequences were nested deeper than allowed.
    ///
    /// This is not a mistake in the program text but exhausted resources,
    /// usually caused by a macro that calls itself.
    RecursionLimit { depth: usize, span: Span, line: usize },
}

impl CompileError {
    pub fn format(&self, ctx: &CompileContext) -> String {
        <Self as AsAnnotationSnippet>::to_string(self, ctx)
    }

    /// The line at which this error occurred
    pub fn line(&self) -> usize {
        match self {
            CompileError::Lex(error) => error.line,
            CompileError::Statement(error) => error.line,
            CompileError::Feeder(error) => error.line,
            CompileError::RecursionLimit { line, .. } => *line,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(error) => error.span,
            CompileError::Statement(error) => error.span,
            CompileError::Feeder(error) => error.span,
            CompileError::RecursionLimit { span, .. } => *span,
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(error) => {
                write!(f, "Could not tokenize line {}: {}", error.line, error.kind)
            }
            CompileError::Statement(error) => {
                write!(f, "Error at line {}: {}", error.line, error.kind)
            }
            CompileError::Feeder(error) => {
                write!(f, "Invalid arguments at line {}: {}", error.line, error.kind)
            }
            CompileError::RecursionLimit { depth, line, .. } => write!(
                f,
                "Exceeded the maximum nesting depth of {depth} at line {line}"
            ),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(error: LexError) -> Self {
        CompileError::Lex(error)
    }
}

impl From<StatementError> for CompileError {
    fn from(error: StatementError) -> Self {
        CompileError::Statement(error)
    }
}

impl From<FeederError> for CompileError {
    fn from(error: FeederError) -> Self {
        CompileError::Feeder(error)
    }
}

impl<'a> AsAnnotationSnippet<'a> for CompileError {
    fn as_annotation_snippet(&self, ctx: &'a CompileContext) -> SnippetOwned<'a> {
        match self {
            CompileError::Lex(error) => error.as_annotation_snippet(ctx),
            CompileError::Statement(error) => error.as_annotation_snippet(ctx),
            CompileError::Feeder(error) => error.as_annotation_snippet(ctx),
            CompileError::RecursionLimit { depth, span, .. } => single_slice_snippet(
                ctx,
                Cow::Borrowed("Fatal"),
                format!("Exceeded the maximum nesting depth of {depth}"),
                *span,
                "While running this statement".to_string(),
                vec![AnnotationOwned::help(
                    "Check for macros or functions that expand themselves",
                )],
            ),
        }
    }
}

/// Creates a snippet that annotates exactly one span
fn single_slice_snippet<'a>(
    ctx: &'a CompileContext,
    id: Cow<'a, str>,
    title: String,
    span: Span,
    label: String,
    footer: Vec<AnnotationOwned<'a>>,
) -> SnippetOwned<'a> {
    let code = ctx.input_files.get_span_code(span);
    SnippetOwned {
        id: Some(id),
        annotation_type: AnnotationType::Error,
        title: Cow::Owned(title),
        slices: vec![SliceOwned {
            origin: code.get_code().path.as_deref(),
            source: &code.get_code().source,
            annotations: vec![SourceAnnotationOwned {
                annotation_type: AnnotationType::Error,
                label,
                range: span,
            }],
        }],
        footer,
    }
}

#[cfg(test)]
mod tests {
    use mcc_common::{Code, CompileContext, Span};

    use crate::{CompileError, LexError, LexErrorKind, StatementError, StatementErrorKind};

    fn context() -> CompileContext {
        let mut ctx = CompileContext::default();
        ctx.add_input_file(Code {
            source: "define int x\nx = \"a\"\n".into(),
            path: Some("test.mcc".into()),
        });
        ctx
    }

    #[test]
    fn formats_lex_error() {
        let ctx = context();
        let error: CompileError =
            LexError::new(LexErrorKind::UnterminatedString, Span::new(17, 3), 2).into();
        let formatted = error.format(&ctx);
        assert!(formatted.contains("Unterminated string literal"));
        assert!(formatted.contains("test.mcc"));
        assert_eq!(error.line(), 2);
    }

    #[test]
    fn formats_statement_error() {
        let ctx = context();
        let error: CompileError = StatementError::new(
            StatementErrorKind::MissingArguments {
                directive: "define".to_string(),
                missing: vec!["name".to_string()],
            },
            Span::new(0, 12),
            1,
            "define int x".to_string(),
        )
        .into();
        let formatted = error.format(&ctx);
        assert!(formatted.contains("Missing arguments for 'define'"));
        assert!(formatted.contains("Expected name"));
        assert_eq!(
            error.to_string(),
            "Error at line 1: Missing arguments for 'define'"
        );
    }
}
