use itertools::Itertools;
use mcc_common::Span;
use mcc_error::{CompileError, StatementError, StatementErrorKind};

use crate::token::{DirectiveId, Token, TokenKind};

/// A single logical line of the program, or one side of a block
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub tokens: Vec<Token>,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A line led by a directive keyword
    Directive(DirectiveId),
    Comment,
    /// `{`, the matching closer is found at `index + statements_inside + 1`
    OpenBlock { statements_inside: usize },
    /// `}`, the matching opener is found at `index - opener_offset`
    CloseBlock { opener_offset: usize },
    /// `target [indexer] <assign-op> expression`
    Operation,
    /// `name(arguments)`
    FunctionCall,
    /// A line with no effect
    Unknown,
}

impl Statement {
    /// Creates a statement which spans all of its tokens
    ///
    /// `tokens` must not be empty.
    pub fn new(kind: StatementKind, tokens: Vec<Token>) -> Self {
        let first = &tokens[0];
        let span = first.span.until(tokens[tokens.len() - 1].span);
        let line = first.line;
        Statement {
            kind,
            tokens,
            span,
            line,
        }
    }

    /// Whether the executor ignores this statement
    pub fn is_skipped(&self) -> bool {
        matches!(self.kind, StatementKind::Comment | StatementKind::Unknown)
    }

    /// Returns the same statement with different tokens, as produced by resolution
    pub fn with_tokens(&self, tokens: Vec<Token>) -> Self {
        Statement {
            kind: self.kind,
            tokens,
            span: self.span,
            line: self.line,
        }
    }

    /// Returns the tokens after the directive keyword, or all tokens for other statements
    pub fn arguments(&self) -> &[Token] {
        match self.kind {
            StatementKind::Directive(_) => &self.tokens[1..],
            _ => &self.tokens,
        }
    }

    /// Returns the keyword of a directive statement
    pub fn keyword(&self) -> Option<&str> {
        match &self.tokens.first()?.kind {
            TokenKind::Directive { keyword, .. } => Some(keyword),
            _ => None,
        }
    }

    /// Renders the tokens of this statement
    pub fn source(&self) -> String {
        self.tokens.iter().join(" ")
    }

    /// Creates an error which points at this statement
    #[track_caller]
    pub fn error(&self, kind: StatementErrorKind) -> CompileError {
        StatementError::new(kind, self.span, self.line, self.source()).into()
    }
}
