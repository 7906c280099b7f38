//! The raw lexer, which only splits the input into lexemes
//!
//! Classification of words and literals happens in [`crate::tokenizer`].
use logos::{Lexer, Logos};

#[derive(Logos, Debug, Eq, PartialEq, Clone, Copy)]
pub(crate) enum RawToken {
    #[token("\n")]
    Newline,

    #[regex("//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("\"", string)]
    String,

    #[regex(r"[0-9]+(\.[0-9]+)?[a-zA-Z_]*")]
    Number,

    #[regex(r"[0-9]+\.\.-?[0-9]*")]
    #[regex(r"\.\.-?[0-9]+")]
    Range,

    #[regex(r"[~^](-?[0-9]+(\.[0-9]+)?)?")]
    Coordinate,

    #[regex(r"@[a-zA-Z_]+", selector)]
    Selector,

    #[token("[", indexer)]
    Indexer,

    #[regex(r"\$?[a-zA-Z_][a-zA-Z0-9_]*:?")]
    Word,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("{")]
    OpenBlock,

    #[token("}")]
    CloseBlock,

    #[token(",")]
    Comma,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Times,

    #[token("/")]
    Divide,

    #[token("%")]
    Modulo,

    #[token("=")]
    Assign,

    #[token("+=")]
    AssignPlus,

    #[token("-=")]
    AssignMinus,

    #[token("*=")]
    AssignTimes,

    #[token("/=")]
    AssignDivide,

    #[token("%=")]
    AssignModulo,

    #[token("==")]
    Equal,

    #[token("!=")]
    NotEqual,

    #[token("<")]
    Less,

    #[token("<=")]
    LessOrEqual,

    #[token(">")]
    Greater,

    #[token(">=")]
    GreaterOrEqual,

    #[token("!")]
    Not,

    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[error]
    Error,
}

fn block_comment(lex: &mut Lexer<RawToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(index) => {
            lex.bump(index + 2);
            true
        }
        None => false,
    }
}

/// Consumes a string literal up to the first unescaped quote
fn string(lex: &mut Lexer<RawToken>) -> bool {
    let mut escaped = false;
    for (index, char) in lex.remainder().char_indices() {
        match char {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                lex.bump(index + 1);
                return true;
            }
            _ => escaped = false,
        }
    }
    false
}

/// Consumes the argument list of a selector, if there is one
fn selector(lex: &mut Lexer<RawToken>) -> bool {
    if !lex.remainder().starts_with('[') {
        return true;
    }
    match closing_bracket(&lex.remainder()[1..]) {
        Some(index) => {
            lex.bump(index + 2);
            true
        }
        None => false,
    }
}

fn indexer(lex: &mut Lexer<RawToken>) -> bool {
    match closing_bracket(lex.remainder()) {
        Some(index) => {
            lex.bump(index + 1);
            true
        }
        None => false,
    }
}

/// Returns the index of the `]` which closes an already opened bracket,
/// skipping nested brackets and quoted strings.
fn closing_bracket(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    for (index, char) in text.char_indices() {
        if in_string {
            match char {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match char {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            '\n' => return None,
            _ => {}
        }
    }
    None
}
