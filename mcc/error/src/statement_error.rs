#[cfg(debug_assertions)]
use std::panic::Location;
use std::{borrow::Cow, fmt};

use itertools::Itertools;
use mcc_common::{CompileContext, Span};

use crate::{
    snippet::AnnotationOwned,
    utils::{display_expected_of_all, display_expected_of_any},
    AsAnnotationSnippet, SnippetOwned,
};

/// Thrown while a statement gets validated or executed
///
/// Carries a snapshot of the offending statement, so it can be reported without
/// access to the statement itself.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct StatementError {
    pub kind: StatementErrorKind,
    pub span: Span,
    pub line: usize,
    /// The rendered source of the statement
    pub source: String,
    #[cfg(debug_assertions)]
    caller: &'static Location<'static>,
}

impl StatementError {
    #[cfg(not(debug_assertions))]
    pub fn new(kind: StatementErrorKind, span: Span, line: usize, source: String) -> Self {
        StatementError {
            kind,
            span,
            line,
            source,
        }
    }

    #[cfg(debug_assertions)]
    #[track_caller]
    pub fn new(kind: StatementErrorKind, span: Span, line: usize, source: String) -> Self {
        StatementError {
            kind,
            span,
            line,
            source,
            caller: Location::caller(),
        }
    }
}

/// Specifies a specific error reason
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum StatementErrorKind {
    MissingArguments {
        directive: String,
        missing: Vec<String>,
    },
    UndefinedPreprocessorVariable {
        name: String,
    },
    UndefinedValue {
        name: String,
    },
    ValueAlreadyDefined {
        name: String,
        existing: String,
    },
    InvalidAssignmentTarget {
        got: String,
    },
    InvalidOperands {
        operator: String,
        lhs: String,
        rhs: String,
    },
    UnsupportedOperation {
        operator: String,
        lhs: String,
        rhs: String,
    },
    UnresolvedOverload {
        function: String,
        arguments: Vec<String>,
        expected: Vec<String>,
    },
    AmbiguousOverload {
        function: String,
        candidates: usize,
    },
    ElseWithoutIf {
        keyword: String,
    },
    ExpectedBody {
        directive: String,
    },
    InvalidComparison {
        got: String,
    },
    LeftoverTokens {
        tokens: Vec<String>,
    },
    ReturnOutsideFunction,
    MacroArity {
        name: String,
        expected: usize,
        got: usize,
    },
    InvalidMacroArgument {
        argument: String,
    },
    InvalidIndex {
        value: String,
        index: String,
    },
    InvalidJson {
        message: String,
    },
    TypeMismatch {
        expected: Vec<String>,
        got: String,
    },
    DivisionByZero,
    NotYetImplemented {
        msg: String,
    },
}

impl std::error::Error for StatementErrorKind {}

impl fmt::Display for StatementErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementErrorKind::MissingArguments { directive, .. } => {
                write!(f, "Missing arguments for '{directive}'")
            }
            StatementErrorKind::UndefinedPreprocessorVariable { name } => {
                write!(f, "Preprocessor variable '${name}' is not defined")
            }
            StatementErrorKind::UndefinedValue { name } => {
                write!(f, "Value '{name}' is not defined")
            }
            StatementErrorKind::ValueAlreadyDefined { name, existing } => {
                write!(f, "Value '{name}' is already defined as {existing}")
            }
            StatementErrorKind::InvalidAssignmentTarget { got } => {
                write!(f, "Cannot assign to '{got}'")
            }
            StatementErrorKind::InvalidOperands { operator, lhs, rhs } => write!(
                f,
                "Operator {operator} cannot be applied to '{lhs}' and '{rhs}'"
            ),
            StatementErrorKind::UnsupportedOperation { operator, lhs, rhs } => write!(
                f,
                "Operator {operator} is not defined between {lhs} and {rhs}"
            ),
            StatementErrorKind::UnresolvedOverload {
                function,
                arguments,
                ..
            } => write!(
                f,
                "No overload of '{function}' accepts ({})",
                arguments.iter().join(", ")
            ),
            StatementErrorKind::AmbiguousOverload {
                function,
                candidates,
            } => write!(
                f,
                "Call to '{function}' is ambiguous between {candidates} overloads"
            ),
            StatementErrorKind::ElseWithoutIf { keyword } => {
                write!(f, "'{keyword}' has no preceding if in this scope")
            }
            StatementErrorKind::ExpectedBody { directive } => {
                write!(f, "'{directive}' must be followed by a statement or block")
            }
            StatementErrorKind::InvalidComparison { got } => {
                write!(f, "Cannot compare '{got}'")
            }
            StatementErrorKind::LeftoverTokens { tokens } => {
                write!(f, "Unexpected trailing tokens: {}", tokens.iter().join(" "))
            }
            StatementErrorKind::ReturnOutsideFunction => {
                write!(f, "Cannot return outside of a function")
            }
            StatementErrorKind::MacroArity {
                name,
                expected,
                got,
            } => write!(
                f,
                "Macro '{name}' takes {expected} arguments, but got {got}"
            ),
            StatementErrorKind::InvalidMacroArgument { argument } => {
                write!(f, "'{argument}' cannot be passed to a macro")
            }
            StatementErrorKind::InvalidIndex { value, index } => {
                write!(f, "Cannot index '{value}' with '{index}'")
            }
            StatementErrorKind::InvalidJson { message } => write!(f, "Invalid json: {message}"),
            StatementErrorKind::TypeMismatch { got, .. } => {
                write!(f, "Received unexpected type {got}")
            }
            StatementErrorKind::DivisionByZero => write!(f, "Division by zero"),
            StatementErrorKind::NotYetImplemented { msg } => {
                write!(f, "This feature is not yet implemented: {msg}")
            }
        }
    }
}

impl StatementErrorKind {
    fn footer(&self) -> Vec<AnnotationOwned<'static>> {
        match self {
            StatementErrorKind::MissingArguments { missing, .. } => {
                vec![AnnotationOwned::help(display_expected_of_all(missing))]
            }
            StatementErrorKind::UnresolvedOverload { expected, .. } => expected
                .iter()
                .map(|overload| AnnotationOwned::info(format!("Candidate: {overload}")))
                .collect(),
            StatementErrorKind::TypeMismatch { expected, .. } => {
                vec![AnnotationOwned::help(display_expected_of_any(expected))]
            }
            StatementErrorKind::ElseWithoutIf { .. } => vec![AnnotationOwned::help(
                "else and elif must directly follow an if or elif",
            )],
            _ => Vec::new(),
        }
    }
}

impl<'a> AsAnnotationSnippet<'a> for StatementError {
    fn as_annotation_snippet(&self, ctx: &'a CompileContext) -> SnippetOwned<'a> {
        #[allow(unused_mut)]
        let mut footer = self.kind.footer();

        #[cfg(debug_assertions)]
        footer.push(AnnotationOwned::info(format!(
            "Error thrown at {}",
            self.caller
        )));

        crate::single_slice_snippet(
            ctx,
            Cow::Borrowed("Statement"),
            self.kind.to_string(),
            self.span,
            format!("In statement at line {}", self.line),
            footer,
        )
    }
}
