//! Resolution of a statement against the current program state
//!
//! Runs right before a statement executes, so preprocessor variables and declarations
//! made by earlier statements are visible.
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{Token, TokenKind},
};

use crate::{executor::Executor, ppv::PreprocessorValue};

/// Returns a copy of `statement` with resolved tokens
///
/// * `$name` inside of strings is replaced by the value of the variable
/// * `$name` tokens are replaced by the literal of their value, indexers that follow are applied
/// * identifiers become references to values, macros or functions
/// * `value[holder]` binds the value to another holder
pub fn resolve(executor: &Executor, statement: &Statement) -> Result<Statement> {
    let mut resolved = Vec::with_capacity(statement.tokens.len());
    let mut tokens = statement.tokens.iter().peekable();

    while let Some(token) = tokens.next() {
        let token = match &token.kind {
            TokenKind::String(text) if text.contains('$') => {
                token.replaced(TokenKind::String(substitute(executor, text).into()))
            }
            TokenKind::UnresolvedPpv(name) => {
                let mut value = variable(executor, statement, name)?.clone();
                while let Some(Token {
                    kind: TokenKind::Indexer(inner),
                    ..
                }) = tokens.peek()
                {
                    let index = indexer_value(executor, statement, inner)?;
                    tokens.next();
                    value = value
                        .index(&index)
                        .map_err(|kind| statement.error(kind))?;
                }
                value.to_token(token)
            }
            TokenKind::Identifier(name) => token.replaced(classify(executor, name)),
            _ => token.clone(),
        };

        let token = match token.kind {
            TokenKind::ValueRef { name, holder: None } => {
                let holder = match tokens.peek() {
                    Some(Token {
                        kind: TokenKind::Indexer(inner),
                        ..
                    }) => {
                        let holder = indexer_value(executor, statement, inner)?;
                        tokens.next();
                        Some(holder.to_string().into())
                    }
                    _ => None,
                };
                Token {
                    kind: TokenKind::ValueRef { name, holder },
                    ..token
                }
            }
            _ => token,
        };
        resolved.push(token);
    }

    Ok(statement.with_tokens(resolved))
}

fn variable<'a>(
    executor: &'a Executor,
    statement: &Statement,
    name: &str,
) -> Result<&'a PreprocessorValue> {
    executor.preprocessor_variable(name).ok_or_else(|| {
        statement.error(StatementErrorKind::UndefinedPreprocessorVariable {
            name: name.to_string(),
        })
    })
}

/// Reads the content of an indexer as a preprocessor value
fn indexer_value(executor: &Executor, statement: &Statement, inner: &Token) -> Result<PreprocessorValue> {
    match &inner.kind {
        TokenKind::UnresolvedPpv(name) => variable(executor, statement, name).cloned(),
        TokenKind::Selector(selector) => Ok(PreprocessorValue::String(selector.to_string().into())),
        TokenKind::Range(range) => Ok(PreprocessorValue::String(range.to_string().into())),
        _ => PreprocessorValue::from_token(inner).map_err(|kind| statement.error(kind)),
    }
}

fn classify(executor: &Executor, name: &str) -> TokenKind {
    if executor.values().contains(name) {
        TokenKind::ValueRef {
            name: name.into(),
            holder: None,
        }
    } else if executor.macro_named(name).is_some() {
        TokenKind::MacroRef(name.into())
    } else if executor.functions().contains(name) {
        TokenKind::FunctionRef(name.into())
    } else {
        TokenKind::Identifier(name.into())
    }
}

/// Replaces `$name` with the value of the variable, unknown names stay as written
fn substitute(executor: &Executor, text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('$') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let len = after
            .find(|char: char| !(char.is_ascii_alphanumeric() || char == '_'))
            .unwrap_or(after.len());
        let name = &after[..len];

        match executor.preprocessor_variable(name) {
            Some(value) if !name.is_empty() => result.push_str(&value.to_string()),
            _ => {
                result.push('$');
                result.push_str(name);
            }
        }
        rest = &after[len..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use mcc_error::{CompileError, StatementErrorKind};
    use mcc_parser::token::TokenKind;

    use super::resolve;
    use crate::{
        ppv::PreprocessorValue,
        test_utils::{executor, statements},
        values::{ScoreboardValue, ValueScope, ValueType},
    };

    #[test]
    fn substitutes_strings() {
        let mut executor = executor();
        executor.set_preprocessor_variable("name".into(), PreprocessorValue::String("Steve".into()));
        let statement = &statements("mc \"say hi $name, $unknown costs $5\"")[0];
        let resolved = resolve(&executor, statement).unwrap();
        assert_eq!(
            resolved.tokens[1].kind,
            TokenKind::String("say hi Steve, $unknown costs $5".into())
        );
    }

    #[test]
    fn replaces_variables() {
        let mut executor = executor();
        executor.set_preprocessor_variable(
            "list".into(),
            PreprocessorValue::Json(serde_json::json!([1, [2, 3]])),
        );
        executor.set_preprocessor_variable("i".into(), PreprocessorValue::Integer(1));
        let statement = &statements("mc $list[$i][0] $i")[0];
        let resolved = resolve(&executor, statement).unwrap();
        assert_eq!(resolved.source(), "mc 2 1");

        let statement = &statements("mc $missing")[0];
        let error = resolve(&executor, statement).unwrap_err();
        assert!(matches!(
            error,
            CompileError::Statement(error)
                if error.kind == StatementErrorKind::UndefinedPreprocessorVariable { name: "missing".to_string() }
        ));
    }

    #[test]
    fn classifies_identifiers() {
        let mut executor = executor();
        executor
            .define_value(ScoreboardValue {
                name: "score".into(),
                ty: ValueType::Int,
                scope: ValueScope::Entity,
            })
            .unwrap();
        let statement = &statements("score[@a] = other + score")[0];
        let resolved = resolve(&executor, statement).unwrap();
        assert_eq!(
            resolved.tokens[0].kind,
            TokenKind::ValueRef {
                name: "score".into(),
                holder: Some("@a".into())
            }
        );
        assert_eq!(resolved.tokens[2].kind, TokenKind::Identifier("other".into()));
        assert_eq!(
            resolved.tokens[4].kind,
            TokenKind::ValueRef {
                name: "score".into(),
                holder: None
            }
        );
    }
}
