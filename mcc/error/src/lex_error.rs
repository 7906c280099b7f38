#[cfg(debug_assertions)]
use std::panic::Location;
use std::{borrow::Cow, fmt};

use mcc_common::{CompileContext, Span};

use crate::{snippet::AnnotationOwned, AsAnnotationSnippet, SnippetOwned};

/// Thrown by the tokenizer and the assembler
///
/// Contains the location in the source where the error occurred and the 1-based line.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub line: usize,
    #[cfg(debug_assertions)]
    caller: &'static Location<'static>,
}

impl LexError {
    #[cfg(not(debug_assertions))]
    pub fn new(kind: LexErrorKind, span: Span, line: usize) -> Self {
        LexError { kind, span, line }
    }

    #[cfg(debug_assertions)]
    #[track_caller]
    pub fn new(kind: LexErrorKind, span: Span, line: usize) -> Self {
        LexError {
            kind,
            span,
            line,
            caller: Location::caller(),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum LexErrorKind {
    UnexpectedCharacter { character: String },
    UnterminatedString,
    UnterminatedComment,
    UnterminatedSelector,
    UnterminatedIndexer,
    InvalidSelectorCore { core: char },
    InvalidNumber { literal: String },
    InvalidUnit { literal: String, unit: String },
    InvalidIndexer { content: String },
    UnusedClosingBracket,
    UnclosedBlock,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnexpectedCharacter { character } => {
                write!(f, "Unexpected character '{character}'")
            }
            LexErrorKind::UnterminatedString => write!(f, "Unterminated string literal"),
            LexErrorKind::UnterminatedComment => write!(f, "Unterminated block comment"),
            LexErrorKind::UnterminatedSelector => write!(f, "Unterminated selector arguments"),
            LexErrorKind::UnterminatedIndexer => write!(f, "Unterminated indexer"),
            LexErrorKind::InvalidSelectorCore { core } => {
                write!(f, "Invalid selector '@{core}'")
            }
            LexErrorKind::InvalidNumber { literal } => {
                write!(f, "Could not parse number literal '{literal}'")
            }
            LexErrorKind::InvalidUnit { literal, unit } => {
                write!(f, "Unknown unit '{unit}' in literal '{literal}'")
            }
            LexErrorKind::InvalidIndexer { content } => {
                write!(f, "Invalid indexer contents '{content}'")
            }
            LexErrorKind::UnusedClosingBracket => write!(f, "Unused closing bracket"),
            LexErrorKind::UnclosedBlock => write!(f, "Block is never closed"),
        }
    }
}

impl LexErrorKind {
    fn help(&self) -> Option<&'static str> {
        let help = match self {
            LexErrorKind::InvalidSelectorCore { .. } => "Valid selectors are @p, @a, @r, @e and @s",
            LexErrorKind::InvalidUnit { .. } => "Valid units are t, s, m and h",
            LexErrorKind::UnusedClosingBracket => "Try removing this bracket",
            LexErrorKind::UnclosedBlock => "Add a '}' to close this block",
            _ => return None,
        };
        Some(help)
    }
}

impl<'a> AsAnnotationSnippet<'a> for LexError {
    fn as_annotation_snippet(&self, ctx: &'a CompileContext) -> SnippetOwned<'a> {
        let mut footer = vec![AnnotationOwned::info(format!("At line {}", self.line))];
        if let Some(help) = self.kind.help() {
            footer.push(AnnotationOwned::help(help));
        }

        #[cfg(debug_assertions)]
        footer.push(AnnotationOwned::info(format!(
            "Error thrown at {}",
            self.caller
        )));

        crate::single_slice_snippet(
            ctx,
            Cow::Borrowed("Lex"),
            self.kind.to_string(),
            self.span,
            "Error here".to_string(),
            footer,
        )
    }
}
