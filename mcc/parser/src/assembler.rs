use mcc_error::{LexError, LexErrorKind, Result};

use crate::{
    statement::{Statement, StatementKind},
    token::{Token, TokenKind},
};

/// Groups tokens into statements and links the blocks
pub fn assemble(tokens: Vec<Token>) -> Result<Vec<Statement>> {
    let mut assembler = Assembler::default();
    for token in tokens {
        assembler.next_token(token)?;
    }
    assembler.finish()
}

#[derive(Debug, Default)]
struct Assembler {
    statements: Vec<Statement>,
    line: Vec<Token>,
    /// Indices of the currently open blocks, outermost first
    open_blocks: Vec<usize>,
}

impl Assembler {
    fn next_token(&mut self, token: Token) -> Result<()> {
        match token.kind {
            TokenKind::Newline => self.flush(),
            TokenKind::Comment(_) => {
                self.flush();
                self.statements
                    .push(Statement::new(StatementKind::Comment, vec![token]));
            }
            TokenKind::OpenBlock => {
                self.flush();
                self.open_blocks.push(self.statements.len());
                self.statements.push(Statement::new(
                    StatementKind::OpenBlock {
                        statements_inside: 0,
                    },
                    vec![token],
                ));
            }
            TokenKind::CloseBlock => {
                self.flush();
                let Some(opener) = self.open_blocks.pop() else {
                    return Err(
                        LexError::new(LexErrorKind::UnusedClosingBracket, token.span, token.line)
                            .into(),
                    );
                };
                let index = self.statements.len();
                self.statements[opener].kind = StatementKind::OpenBlock {
                    statements_inside: index - opener - 1,
                };
                self.statements.push(Statement::new(
                    StatementKind::CloseBlock {
                        opener_offset: index - opener,
                    },
                    vec![token],
                ));
            }
            _ => self.line.push(token),
        }
        Ok(())
    }

    fn flush(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let tokens = std::mem::take(&mut self.line);
        let kind = classify(&tokens);
        self.statements.push(Statement::new(kind, tokens));
    }

    fn finish(mut self) -> Result<Vec<Statement>> {
        self.flush();
        if let Some(&outermost) = self.open_blocks.first() {
            let opener = &self.statements[outermost];
            return Err(LexError::new(LexErrorKind::UnclosedBlock, opener.span, opener.line).into());
        }
        Ok(self.statements)
    }
}

fn classify(tokens: &[Token]) -> StatementKind {
    match &tokens[0].kind {
        TokenKind::Directive { id, .. } => return StatementKind::Directive(*id),
        TokenKind::Identifier(_) if tokens.len() > 1 => {}
        _ => return StatementKind::Unknown,
    }

    let second = tokens[1..]
        .iter()
        .find(|token| !matches!(token.kind, TokenKind::Indexer(_)));
    match second.map(|token| &token.kind) {
        Some(TokenKind::Assign(_)) => StatementKind::Operation,
        Some(TokenKind::OpenParen) => StatementKind::FunctionCall,
        _ => StatementKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use mcc_error::{CompileError, LexErrorKind};

    use crate::{
        statement::StatementKind,
        test_utils::{statements, try_statements},
    };

    fn kinds(input: &str) -> Vec<StatementKind> {
        statements(input).into_iter().map(|s| s.kind).collect()
    }

    fn structural_error(input: &str) -> (LexErrorKind, usize) {
        match try_statements(input) {
            Err(CompileError::Lex(error)) => (error.kind, error.line),
            other => panic!("Expected a structural error, got {other:?}"),
        }
    }

    #[test]
    fn classifies_lines() {
        assert_eq!(
            kinds("mc \"say\"\n// note\nx = 1\nx[@a] += 2\nfoo(1)\nfoo\n1 + 2\nx y"),
            vec![
                StatementKind::Directive(crate::token::DirectiveId(0)),
                StatementKind::Comment,
                StatementKind::Operation,
                StatementKind::Operation,
                StatementKind::FunctionCall,
                StatementKind::Unknown,
                StatementKind::Unknown,
                StatementKind::Unknown,
            ]
        );
    }

    #[test]
    fn block_counts_match_contents() {
        let statements = statements("if x {\n a = 1\n {\n b = 2\n }\n c = 3 }\nd = 4");
        let blocks: Vec<_> = statements
            .iter()
            .enumerate()
            .filter_map(|(index, statement)| match statement.kind {
                StatementKind::OpenBlock { statements_inside } => Some((index, statements_inside)),
                _ => None,
            })
            .collect();
        assert_eq!(blocks, vec![(1, 5), (3, 1)]);

        for (opener, inside) in blocks {
            let closer = opener + inside + 1;
            assert_eq!(
                statements[closer].kind,
                StatementKind::CloseBlock {
                    opener_offset: inside + 1
                }
            );
        }
        assert_eq!(statements.len(), 9);
    }

    #[test]
    fn inline_blocks() {
        assert_eq!(
            kinds("{ a = 1 }"),
            vec![
                StatementKind::OpenBlock {
                    statements_inside: 1
                },
                StatementKind::Operation,
                StatementKind::CloseBlock { opener_offset: 2 },
            ]
        );
    }

    #[test]
    fn unused_closing_bracket() {
        assert_eq!(
            structural_error("a = 1\n{\n}\n}"),
            (LexErrorKind::UnusedClosingBracket, 4)
        );
    }

    #[test]
    fn unclosed_block_names_outermost() {
        assert_eq!(
            structural_error("a = 1\n{\n {\n }\n{"),
            (LexErrorKind::UnclosedBlock, 2)
        );
    }
}
