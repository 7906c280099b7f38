//! Reads the arguments of a statement one token at a time
use mcc_common::SmolStr;
use mcc_error::{CompileError, FeederError, FeederErrorKind, Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{Selector, Token, TokenKind, TokenType},
};

/// A cursor over the arguments of a single statement
///
/// Directives use this to pull their arguments in order. Reading past the end or reading a
/// token of the wrong type is a [`FeederError`].
#[derive(Debug, Clone)]
pub struct Feeder<'s> {
    statement: &'s Statement,
    tokens: &'s [Token],
    position: usize,
}

impl<'s> Feeder<'s> {
    /// Creates a feeder over the arguments of `statement`
    pub fn new(statement: &'s Statement) -> Self {
        Feeder::over(statement, statement.arguments())
    }

    /// Creates a feeder over a subset of the tokens of `statement`
    pub fn over(statement: &'s Statement, tokens: &'s [Token]) -> Self {
        Feeder {
            statement,
            tokens,
            position: 0,
        }
    }

    pub fn statement(&self) -> &'s Statement {
        self.statement
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'s Token> {
        self.tokens.get(self.position)
    }

    /// Looks `n` tokens ahead, `peek_n(0)` is the same as `peek`
    pub fn peek_n(&self, n: usize) -> Option<&'s Token> {
        self.tokens.get(self.position + n)
    }

    pub fn next_is(&self, ty: TokenType) -> bool {
        self.peek()
            .is_some_and(|token| token.token_type().is_assignable_to(ty))
    }

    pub fn next(&mut self) -> Result<&'s Token> {
        self.next_described("an argument")
    }

    fn next_described(&mut self, expected: &str) -> Result<&'s Token> {
        let token = self.tokens.get(self.position).ok_or_else(|| {
            self.error(FeederErrorKind::Exhausted {
                expected: expected.to_string(),
            })
        })?;
        self.position += 1;
        Ok(token)
    }

    /// Consumes the next token if it satisfies `predicate`
    pub fn next_if(&mut self, predicate: impl FnOnce(&Token) -> bool) -> Option<&'s Token> {
        let token = self.peek().filter(|token| predicate(token))?;
        self.position += 1;
        Some(token)
    }

    /// Consumes the next token if it has the type `ty`, or can be converted to it
    pub fn next_if_type(&mut self, ty: TokenType) -> Option<Token> {
        let token = self.peek()?.coerce(ty)?;
        self.position += 1;
        Some(token)
    }

    /// Reads the next token as `ty`, converting it implicitly if needed
    pub fn next_as(&mut self, ty: TokenType) -> Result<Token> {
        let token = self.next_described(ty.name())?;
        token.coerce(ty).ok_or_else(|| {
            self.position -= 1;
            self.unexpected(ty.name(), token)
        })
    }

    pub fn next_integer(&mut self) -> Result<i64> {
        let token = self.next_described(TokenType::Integer.name())?;
        token.as_integer().ok_or_else(|| {
            self.position -= 1;
            self.unexpected(TokenType::Integer.name(), token)
        })
    }

    pub fn next_text(&mut self) -> Result<SmolStr> {
        let token = self.next_described(TokenType::String.name())?;
        token.as_text().ok_or_else(|| {
            self.position -= 1;
            self.unexpected(TokenType::String.name(), token)
        })
    }

    /// Reads the name of any identifier, whether or not it refers to something
    pub fn next_identifier(&mut self) -> Result<SmolStr> {
        let token = self.next_described(TokenType::Identifier.name())?;
        match token.as_identifier() {
            Some(name) => Ok(name.clone()),
            None => {
                self.position -= 1;
                Err(self.unexpected(TokenType::Identifier.name(), token))
            }
        }
    }

    pub fn next_selector(&mut self) -> Result<Selector> {
        match self.next_as(TokenType::Selector)?.kind {
            TokenKind::Selector(selector) => Ok(selector),
            _ => unreachable!("Coerced to a selector"),
        }
    }

    /// Reads a constant of the enum `enum_name`
    pub fn next_enum(&mut self, enum_name: &str) -> Result<SmolStr> {
        let token = self.next_described(enum_name)?;
        match &token.kind {
            TokenKind::EnumConstant(constant) if constant.enum_name == enum_name => {
                Ok(constant.value.clone())
            }
            _ => {
                self.position -= 1;
                Err(self.unexpected(enum_name, token))
            }
        }
    }

    /// Consumes a constant of the enum `enum_name` if it comes next
    pub fn next_enum_if(&mut self, enum_name: &str) -> Option<SmolStr> {
        match &self.peek()?.kind {
            TokenKind::EnumConstant(constant) if constant.enum_name == enum_name => {
                self.position += 1;
                Some(constant.value.clone())
            }
            _ => None,
        }
    }

    /// Consumes every remaining token
    pub fn rest(&mut self) -> &'s [Token] {
        let rest = &self.tokens[self.position.min(self.tokens.len())..];
        self.position = self.tokens.len();
        rest
    }

    /// Fails if any token was not read
    pub fn expect_end(&self) -> Result<()> {
        if self.has_next() {
            let tokens = self.tokens[self.position..]
                .iter()
                .map(ToString::to_string)
                .collect();
            return Err(self
                .statement
                .error(StatementErrorKind::LeftoverTokens { tokens }));
        }
        Ok(())
    }

    fn unexpected(&self, expected: &str, got: &Token) -> CompileError {
        let mut error = self.error(FeederErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            got: got.to_string(),
        });
        if let CompileError::Feeder(error) = &mut error {
            error.span = got.span;
            error.line = got.line;
        }
        error
    }

    fn error(&self, kind: FeederErrorKind) -> CompileError {
        FeederError {
            kind,
            span: self.statement.span,
            line: self.statement.line,
            source: self.statement.source(),
            position: self.position,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use mcc_common::Span;
    use mcc_error::{CompileError, FeederErrorKind, StatementErrorKind};
    use mcc_parser::{
        statement::{Statement, StatementKind},
        token::{DirectiveId, Token, TokenKind, TokenType},
    };

    use super::Feeder;

    fn statement(kinds: Vec<TokenKind>) -> Statement {
        let mut tokens = vec![Token::new(
            TokenKind::Directive {
                id: DirectiveId(0),
                keyword: "tp".into(),
            },
            Span::new(0, 2),
            1,
        )];
        tokens.extend(
            kinds
                .into_iter()
                .enumerate()
                .map(|(index, kind)| Token::new(kind, Span::new(3 + index * 2, 1), 1)),
        );
        Statement::new(StatementKind::Directive(DirectiveId(0)), tokens)
    }

    fn int(value: i64) -> TokenKind {
        TokenKind::Integer { value, unit: None }
    }

    #[test]
    fn reads_in_order() {
        let statement = statement(vec![int(1), TokenKind::String("a".into()), int(3)]);
        let mut feeder = Feeder::new(&statement);
        assert_eq!(feeder.next_integer().unwrap(), 1);
        assert_eq!(feeder.next_text().unwrap(), "a");
        assert!(feeder.next_is(TokenType::Number));
        assert!(feeder.expect_end().is_err());
        assert_eq!(
            feeder.next_as(TokenType::Coordinate).unwrap().to_string(),
            "3"
        );
        assert!(feeder.expect_end().is_ok());
    }

    #[test]
    fn exhausted() {
        let statement = statement(vec![int(1)]);
        let mut feeder = Feeder::new(&statement);
        feeder.next().unwrap();
        match feeder.next_selector() {
            Err(CompileError::Feeder(error)) => {
                assert_eq!(
                    error.kind,
                    FeederErrorKind::Exhausted {
                        expected: "selector".to_string()
                    }
                );
                assert_eq!(error.position, 1);
            }
            other => panic!("Expected a feeder error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_does_not_advance() {
        let statement = statement(vec![TokenKind::String("x".into())]);
        let mut feeder = Feeder::new(&statement);
        match feeder.next_integer() {
            Err(CompileError::Feeder(error)) => {
                assert!(matches!(error.kind, FeederErrorKind::UnexpectedToken { .. }));
                assert_eq!(error.span, Span::new(3, 1));
            }
            other => panic!("Expected a feeder error, got {other:?}"),
        }
        assert_eq!(feeder.position(), 0);
        assert_eq!(feeder.rest().len(), 1);
        assert!(!feeder.has_next());
    }

    #[test]
    fn leftover_tokens() {
        let statement = statement(vec![int(1), int(2)]);
        let mut feeder = Feeder::new(&statement);
        feeder.next().unwrap();
        match feeder.expect_end() {
            Err(CompileError::Statement(error)) => assert_eq!(
                error.kind,
                StatementErrorKind::LeftoverTokens {
                    tokens: vec!["2".to_string()]
                }
            ),
            other => panic!("Expected leftover tokens, got {other:?}"),
        }
    }
}
