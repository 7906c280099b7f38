use logos::Logos;
use mcc_common::{CodeRef, SmolStr, Span};
use mcc_error::{LexError, LexErrorKind, Result};

use crate::{
    lexer::RawToken,
    token::{
        ArithmeticOp, AssignOp, CompareOp, Coordinate, CoordinateKind, DirectiveId, EnumConstant,
        Range, Selector, SelectorCore, Token, TokenKind, TokenType, Unit,
    },
};

/// The words which have a special meaning in a compilation unit
///
/// Implemented by the directive registry.
pub trait Keywords {
    /// Looks up a directive by its keyword, ignoring the case
    fn directive(&self, keyword: &str) -> Option<DirectiveId>;

    /// Looks up a registered enum constant
    fn enum_constant(&self, word: &str) -> Option<EnumConstant>;
}

/// Keywords of an empty registry
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKeywords;

impl Keywords for NoKeywords {
    fn directive(&self, _keyword: &str) -> Option<DirectiveId> {
        None
    }

    fn enum_constant(&self, _word: &str) -> Option<EnumConstant> {
        None
    }
}

/// Tokenizes a whole input file
pub fn tokenize(code: CodeRef, keywords: &dyn Keywords) -> Result<Vec<Token>> {
    Tokenizer::new(&code.get_code().source, code.get_offset(), 1, keywords).run()
}

struct Tokenizer<'a> {
    source: &'a str,
    /// The global offset of `source`
    offset: usize,
    line: usize,
    keywords: &'a dyn Keywords,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str, offset: usize, line: usize, keywords: &'a dyn Keywords) -> Self {
        Tokenizer {
            source,
            offset,
            line,
            keywords,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut lexer = RawToken::lexer(self.source);
        let mut last_end = 0;

        while let Some(raw) = lexer.next() {
            let range = lexer.span();
            self.line += self.source[last_end..range.start].matches('\n').count();
            last_end = range.start;

            let slice = lexer.slice();
            let span = Span::new(self.offset + range.start, range.len());
            self.next_token(raw, slice, span)?;
        }

        // Trailing newlines carry no information
        while matches!(self.tokens.last(), Some(token) if token.kind == TokenKind::Newline) {
            self.tokens.pop();
        }
        Ok(self.tokens)
    }

    fn next_token(&mut self, raw: RawToken, slice: &str, span: Span) -> Result<()> {
        let kind = match raw {
            RawToken::Newline => {
                let collapse = self
                    .tokens
                    .last()
                    .map_or(true, |token| token.kind == TokenKind::Newline);
                if !collapse {
                    self.push(TokenKind::Newline, span);
                }
                return Ok(());
            }
            RawToken::LineComment => TokenKind::Comment(slice[2..].trim().into()),
            RawToken::BlockComment => TokenKind::Comment(slice[2..slice.len() - 2].trim().into()),
            RawToken::String => TokenKind::String(unescape(&slice[1..slice.len() - 1])),
            RawToken::Number => {
                let kind = self.number(slice, span)?;
                return self.push_literal(kind, span);
            }
            RawToken::Range => {
                let kind = self.range(slice, span)?;
                return self.push_literal(kind, span);
            }
            RawToken::Coordinate => self.coordinate(slice, span)?,
            RawToken::Selector => self.selector(slice, span)?,
            RawToken::Indexer => self.indexer(slice, span)?,
            RawToken::Word => self.word(slice),
            RawToken::OpenParen => TokenKind::OpenParen,
            RawToken::CloseParen => TokenKind::CloseParen,
            RawToken::OpenBlock => TokenKind::OpenBlock,
            RawToken::CloseBlock => TokenKind::CloseBlock,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Plus => TokenKind::Arithmetic(ArithmeticOp::Add),
            RawToken::Minus => TokenKind::Arithmetic(ArithmeticOp::Sub),
            RawToken::Times => TokenKind::Arithmetic(ArithmeticOp::Mul),
            RawToken::Divide => TokenKind::Arithmetic(ArithmeticOp::Div),
            RawToken::Modulo => TokenKind::Arithmetic(ArithmeticOp::Mod),
            RawToken::Assign => TokenKind::Assign(AssignOp::Set),
            RawToken::AssignPlus => TokenKind::Assign(AssignOp::Add),
            RawToken::AssignMinus => TokenKind::Assign(AssignOp::Sub),
            RawToken::AssignTimes => TokenKind::Assign(AssignOp::Mul),
            RawToken::AssignDivide => TokenKind::Assign(AssignOp::Div),
            RawToken::AssignModulo => TokenKind::Assign(AssignOp::Mod),
            RawToken::Equal => TokenKind::Compare(CompareOp::Equal),
            RawToken::NotEqual => TokenKind::Compare(CompareOp::NotEqual),
            RawToken::Less => TokenKind::Compare(CompareOp::Less),
            RawToken::LessOrEqual => TokenKind::Compare(CompareOp::LessOrEqual),
            RawToken::Greater => TokenKind::Compare(CompareOp::Greater),
            RawToken::GreaterOrEqual => TokenKind::Compare(CompareOp::GreaterOrEqual),
            RawToken::Not => TokenKind::Not,
            RawToken::Error => return Err(self.error(slice, span).into()),
        };

        self.push(kind, span);
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span, self.line));
    }

    /// Pushes a number or range, merging it with a directly preceding unary minus
    fn push_literal(&mut self, kind: TokenKind, span: Span) -> Result<()> {
        let len = self.tokens.len();
        let is_unary_minus = match self.tokens.as_slice() {
            [.., before, minus]
                if minus.kind == TokenKind::Arithmetic(ArithmeticOp::Sub)
                    && minus.span.end() == span.start() =>
            {
                !before.is_operand()
            }
            [minus] => {
                minus.kind == TokenKind::Arithmetic(ArithmeticOp::Sub)
                    && minus.span.end() == span.start()
            }
            _ => false,
        };

        if is_unary_minus {
            let minus = self.tokens.remove(len - 1);
            let negated = match kind {
                TokenKind::Integer { value, unit } => TokenKind::Integer {
                    value: -value,
                    unit,
                },
                TokenKind::Decimal { value, unit } => TokenKind::Decimal {
                    value: -value,
                    unit,
                },
                TokenKind::Range(Range { min, max }) => TokenKind::Range(Range {
                    min: min.map(|min| -min),
                    max,
                }),
                other => other,
            };
            self.tokens.push(Token::new(negated, minus.span.until(span), minus.line));
        } else {
            self.push(kind, span);
        }
        Ok(())
    }

    fn number(&self, slice: &str, span: Span) -> Result<TokenKind> {
        let split = slice
            .find(|char: char| char.is_ascii_alphabetic() || char == '_')
            .unwrap_or(slice.len());
        let (digits, suffix) = slice.split_at(split);

        let unit = if suffix.is_empty() {
            None
        } else {
            let unit = Unit::from_suffix(suffix).ok_or_else(|| {
                LexError::new(
                    LexErrorKind::InvalidUnit {
                        literal: slice.to_string(),
                        unit: suffix.to_string(),
                    },
                    span,
                    self.line,
                )
            })?;
            Some(unit)
        };
        let scale = unit.map_or(1, Unit::scale);
        let invalid = || {
            LexError::new(
                LexErrorKind::InvalidNumber {
                    literal: slice.to_string(),
                },
                span,
                self.line,
            )
        };

        let kind = if digits.contains('.') {
            let value: f64 = digits.parse().map_err(|_| invalid())?;
            #[allow(clippy::cast_precision_loss)]
            let value = value * scale as f64;
            TokenKind::Decimal { value, unit }
        } else {
            let value = digits
                .parse::<i64>()
                .ok()
                .and_then(|value| value.checked_mul(scale))
                .ok_or_else(invalid)?;
            TokenKind::Integer { value, unit }
        };
        Ok(kind)
    }

    fn range(&self, slice: &str, span: Span) -> Result<TokenKind> {
        let parse = |text: &str| -> Result<Option<i64>> {
            if text.is_empty() {
                return Ok(None);
            }
            text.parse().map(Some).map_err(|_| {
                LexError::new(
                    LexErrorKind::InvalidNumber {
                        literal: slice.to_string(),
                    },
                    span,
                    self.line,
                )
                .into()
            })
        };
        let (min, max) = slice.split_once("..").unwrap_or((slice, ""));
        Ok(TokenKind::Range(Range {
            min: parse(min)?,
            max: parse(max)?,
        }))
    }

    fn coordinate(&self, slice: &str, span: Span) -> Result<TokenKind> {
        let kind = if slice.starts_with('~') {
            CoordinateKind::Relative
        } else {
            CoordinateKind::Local
        };
        let offset = &slice[1..];
        let value = if offset.is_empty() {
            0.0
        } else {
            offset.parse::<f64>().map_err(|_| {
                LexError::new(
                    LexErrorKind::InvalidNumber {
                        literal: slice.to_string(),
                    },
                    span,
                    self.line,
                )
            })?
        };
        Ok(TokenKind::Coordinate(Coordinate { kind, value }))
    }

    fn selector(&self, slice: &str, span: Span) -> Result<TokenKind> {
        let (head, arguments) = match slice.find('[') {
            Some(index) => (&slice[..index], Some(&slice[index + 1..slice.len() - 1])),
            None => (slice, None),
        };

        let mut chars = head[1..].chars();
        let core = match (chars.next(), chars.next()) {
            (Some(char), None) => SelectorCore::from_char(char),
            _ => None,
        };
        let core = core.ok_or_else(|| {
            LexError::new(
                LexErrorKind::InvalidSelectorCore {
                    core: head[1..].chars().next().unwrap_or('@'),
                },
                span,
                self.line,
            )
        })?;

        Ok(TokenKind::Selector(Selector {
            core,
            arguments: arguments.map(SmolStr::from),
        }))
    }

    /// Tokenizes the contents of an indexer, which must be exactly one token
    fn indexer(&self, slice: &str, span: Span) -> Result<TokenKind> {
        let content = &slice[1..slice.len() - 1];
        let invalid = || {
            LexError::new(
                LexErrorKind::InvalidIndexer {
                    content: content.to_string(),
                },
                span,
                self.line,
            )
        };

        let mut tokens =
            Tokenizer::new(content, span.start() + 1, self.line, self.keywords).run()?;
        if tokens.len() != 1 {
            return Err(invalid().into());
        }
        let token = tokens.remove(0);
        match token.token_type() {
            TokenType::Integer
            | TokenType::String
            | TokenType::Selector
            | TokenType::Range
            | TokenType::Identifier
            | TokenType::EnumConstant
            | TokenType::UnresolvedPpv => Ok(TokenKind::Indexer(Box::new(token))),
            _ => Err(invalid().into()),
        }
    }

    fn word(&self, word: &str) -> TokenKind {
        match word {
            "true" => return TokenKind::Bool(true),
            "false" => return TokenKind::Bool(false),
            "and" => return TokenKind::And,
            "or" => return TokenKind::Or,
            "not" => return TokenKind::Not,
            _ => {}
        }

        if let Some(field) = word.strip_suffix(':') {
            return TokenKind::BuilderField(field.into());
        }
        if let Some(id) = self.keywords.directive(word) {
            return TokenKind::Directive {
                id,
                keyword: word.into(),
            };
        }
        if let Some(constant) = self.keywords.enum_constant(word) {
            return TokenKind::EnumConstant(constant);
        }
        if let Some(name) = word.strip_prefix('$') {
            return TokenKind::UnresolvedPpv(name.into());
        }
        TokenKind::Identifier(word.into())
    }

    fn error(&self, slice: &str, span: Span) -> LexError {
        let kind = if slice.starts_with('"') {
            LexErrorKind::UnterminatedString
        } else if slice.starts_with("/*") {
            LexErrorKind::UnterminatedComment
        } else if slice.starts_with('@') {
            LexErrorKind::UnterminatedSelector
        } else if slice.starts_with('[') {
            LexErrorKind::UnterminatedIndexer
        } else {
            LexErrorKind::UnexpectedCharacter {
                character: slice.to_string(),
            }
        };
        LexError::new(kind, span, self.line)
    }
}

fn unescape(text: &str) -> SmolStr {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(char) = chars.next() {
        if char != '\\' {
            result.push(char);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some(escaped @ ('"' | '\\')) => result.push(escaped),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result.into()
}

#[cfg(test)]
mod tests {
    use expect_test::{expect, Expect};
    use itertools::Itertools;
    use mcc_common::{Code, InputFiles};
    use mcc_error::{CompileError, LexErrorKind};

    use super::{tokenize, Keywords};
    use crate::token::{DirectiveId, EnumConstant, Token, TokenKind};

    struct TestKeywords;

    impl Keywords for TestKeywords {
        fn directive(&self, keyword: &str) -> Option<DirectiveId> {
            match keyword.to_ascii_lowercase().as_str() {
                "mc" => Some(DirectiveId(0)),
                "$var" => Some(DirectiveId(1)),
                _ => None,
            }
        }

        fn enum_constant(&self, word: &str) -> Option<EnumConstant> {
            (word == "creative").then(|| EnumConstant {
                enum_name: "GameMode".into(),
                value: word.into(),
            })
        }
    }

    fn lex(input: &str) -> Result<Vec<Token>, CompileError> {
        let mut files = InputFiles::default();
        let id = files.add_input(Code {
            source: input.into(),
            path: None,
        });
        tokenize(files.get_code_ref(id), &TestKeywords)
    }

    fn check(input: &str, expect: Expect) {
        let tokens = lex(input).expect("Tokenizing failed");
        let rendered = tokens
            .iter()
            .map(|token| format!("{}:{}", token.line, token))
            .join(" ");
        expect.assert_eq(&rendered);
    }

    fn lex_error(input: &str) -> LexErrorKind {
        match lex(input) {
            Err(CompileError::Lex(error)) => error.kind,
            other => panic!("Expected a lex error, got {other:?}"),
        }
    }

    #[test]
    fn classifies_words() {
        check(
            "MC \"say hi\"\n$var x true and creative $y name:",
            expect![[r#"1:MC 1:"say hi" 1:\n 2:$var 2:x 2:true 2:and 2:creative 2:$y 2:name:"#]],
        );
    }

    #[test]
    fn newlines_collapse() {
        check(
            "\n\na = 1\n\n\n// note\nb\n\n",
            expect![[r#"3:a 3:= 3:1 3:\n 6:// note 6:\n 7:b"#]],
        );
    }

    #[test]
    fn units_scale_values() {
        let tokens = lex("5 5t 5s 2m 1h 1.5s").unwrap();
        let values = tokens.iter().map(ToString::to_string).collect_vec();
        assert_eq!(values, ["5", "5", "100", "2400", "72000", "30"]);
    }

    #[test]
    fn negative_literals() {
        check(
            "x = -5 - 3\ny = a-1\nz = (-2..4)",
            expect![[r#"1:x 1:= 1:-5 1:- 1:3 1:\n 2:y 2:= 2:a 2:- 2:1 2:\n 3:z 3:= 3:( 3:-2..4 3:)"#]],
        );
    }

    #[test]
    fn literals() {
        check(
            r#"tp @e[type=cow,name="a b"] ~ ~1 ^-2.5 "esc\"aped" 1.. ..4"#,
            expect![[r#"1:tp 1:@e[type=cow,name="a b"] 1:~ 1:~1 1:^-2.5 1:"esc\"aped" 1:1.. 1:..4"#]],
        );
    }

    #[test]
    fn indexers() {
        let tokens = lex("score[@a] $list[2]").unwrap();
        assert!(matches!(
            &tokens[1].kind,
            TokenKind::Indexer(inner) if matches!(inner.kind, TokenKind::Selector(_))
        ));
        assert!(matches!(tokens[2].kind, TokenKind::UnresolvedPpv(_)));
        assert_eq!(tokens[3].to_string(), "[2]");
    }

    #[test]
    fn block_comment_lines() {
        check(
            "/* multi\nline */ a\nb",
            expect![[r#"1:// multi
line 2:a 2:\n 3:b"#]],
        );
    }

    #[test]
    fn errors() {
        assert_eq!(lex_error("mc \"abc"), LexErrorKind::UnterminatedString);
        assert_eq!(lex_error("/* abc"), LexErrorKind::UnterminatedComment);
        assert_eq!(lex_error("@e[type=cow"), LexErrorKind::UnterminatedSelector);
        assert_eq!(
            lex_error("@x"),
            LexErrorKind::InvalidSelectorCore { core: 'x' }
        );
        assert_eq!(
            lex_error("5y"),
            LexErrorKind::InvalidUnit {
                literal: "5y".to_string(),
                unit: "y".to_string()
            }
        );
        assert_eq!(
            lex_error("a[1 2]"),
            LexErrorKind::InvalidIndexer {
                content: "1 2".to_string()
            }
        );
        assert_eq!(
            lex_error("a ; b"),
            LexErrorKind::UnexpectedCharacter {
                character: ";".to_string()
            }
        );
    }

    #[test]
    fn error_line() {
        match lex("a\nb\n\"open") {
            Err(CompileError::Lex(error)) => assert_eq!(error.line, 3),
            other => panic!("Expected a lex error, got {other:?}"),
        }
    }
}
