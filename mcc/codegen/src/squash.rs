//! Expression squashing
//!
//! Reduces the tokens of a statement until only operands without operators are left. Every
//! operation on scoreboard values is lowered into commands on temporary values, operations on
//! literals are folded at compile time.
use itertools::Itertools;
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{ArithmeticOp, Token, TokenKind, TokenType},
};
use tracing::trace;

use crate::{
    commands::{MinecraftCommand, ScoreboardOperation, ScoreboardPlayer},
    executor::Executor,
    functions::{Overload, OverloadKind},
    ppv::PreprocessorValue,
};

/// Squashes `tokens`, which are part of `statement`
pub fn squash(executor: &mut Executor, statement: &Statement, tokens: Vec<Token>) -> Result<Vec<Token>> {
    squash_tokens(executor, statement, tokens, true)
}

/// Squashes `tokens` into exactly one token
pub fn squash_single(executor: &mut Executor, statement: &Statement, tokens: Vec<Token>) -> Result<Token> {
    let mut tokens = squash(executor, statement, tokens)?;
    match tokens.len() {
        0 => Err(statement.error(StatementErrorKind::MissingArguments {
            directive: statement.keyword().unwrap_or("=").to_string(),
            missing: vec!["value".to_string()],
        })),
        1 => Ok(tokens.remove(0)),
        _ => Err(statement.error(StatementErrorKind::LeftoverTokens {
            tokens: tokens[1..].iter().map(ToString::to_string).collect(),
        })),
    }
}

/// `top` is false for the contents of parentheses. A call that makes up all tokens at the top
/// level may return the return value of the function directly, everywhere else it is copied,
/// so a second call to the same function can't overwrite it.
fn squash_tokens(
    executor: &mut Executor,
    statement: &Statement,
    tokens: Vec<Token>,
    top: bool,
) -> Result<Vec<Token>> {
    let tokens = squash_parentheses(executor, statement, tokens)?;
    let tokens = squash_calls(executor, statement, tokens, top)?;
    squash_arithmetic(executor, statement, tokens)
}

/// Splits a list of arguments at the commas which are not nested in parentheses
pub fn split_arguments(tokens: &[Token]) -> Vec<Vec<Token>> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut arguments = vec![Vec::new()];
    let mut depth = 0usize;
    for token in tokens {
        match token.kind {
            TokenKind::Comma if depth == 0 => {
                arguments.push(Vec::new());
                continue;
            }
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => depth = depth.saturating_sub(1),
            _ => {}
        }
        if let Some(argument) = arguments.last_mut() {
            argument.push(token.clone());
        }
    }
    arguments
}

/// Returns the index of the parenthesis which closes the one at `open`
fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn unclosed(statement: &Statement, tokens: &[Token]) -> mcc_error::CompileError {
    statement.error(StatementErrorKind::LeftoverTokens {
        tokens: tokens.iter().map(ToString::to_string).collect(),
    })
}

fn squash_parentheses(
    executor: &mut Executor,
    statement: &Statement,
    mut tokens: Vec<Token>,
) -> Result<Vec<Token>> {
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].kind != TokenKind::OpenParen {
            index += 1;
            continue;
        }
        let close =
            matching_paren(&tokens, index).ok_or_else(|| unclosed(statement, &tokens[index..]))?;
        let inner = tokens[index + 1..close].to_vec();
        let is_call = index > 0
            && matches!(
                tokens[index - 1].kind,
                TokenKind::FunctionRef(_) | TokenKind::MacroRef(_)
            );

        if is_call {
            // Each argument gets squashed on its own, the call itself stays
            let comma = tokens[index].replaced(TokenKind::Comma);
            let mut arguments = Vec::with_capacity(inner.len());
            for (position, argument) in split_arguments(&inner).into_iter().enumerate() {
                if position > 0 {
                    arguments.push(comma.clone());
                }
                arguments.extend(squash_tokens(executor, statement, argument, false)?);
            }
            let len = arguments.len();
            tokens.splice(index + 1..close, arguments);
            index += len + 2;
        } else {
            let squashed = squash_tokens(executor, statement, inner, false)?;
            let len = squashed.len();
            tokens.splice(index..=close, squashed);
            index += len;
        }
    }
    Ok(tokens)
}

fn squash_calls(
    executor: &mut Executor,
    statement: &Statement,
    mut tokens: Vec<Token>,
    top: bool,
) -> Result<Vec<Token>> {
    let mut index = 0;
    while index < tokens.len() {
        let TokenKind::FunctionRef(name) = &tokens[index].kind else {
            index += 1;
            continue;
        };
        let name = name.clone();

        // Functions without parameters can be called without parentheses
        let (arguments, end) = match tokens.get(index + 1) {
            Some(Token {
                kind: TokenKind::OpenParen,
                ..
            }) => {
                let close = matching_paren(&tokens, index + 1)
                    .ok_or_else(|| unclosed(statement, &tokens[index..]))?;
                let arguments = split_arguments(&tokens[index + 2..close])
                    .into_iter()
                    .map(|mut argument| match argument.len() {
                        1 => Ok(argument.remove(0)),
                        _ => Err(statement.error(StatementErrorKind::InvalidOperands {
                            operator: ",".to_string(),
                            lhs: name.to_string(),
                            rhs: argument.iter().join(" "),
                        })),
                    })
                    .collect::<Result<Vec<_>>>()?;
                (arguments, close + 1)
            }
            _ => (Vec::new(), index + 1),
        };

        let overload = executor
            .functions()
            .resolve(&name, &arguments, |token| executor.value_type(token))
            .cloned()
            .map_err(|kind| statement.error(kind))?;
        trace!(%overload, "Calling function");

        let whole = top && index == 0 && end == tokens.len();
        let result = call(executor, statement, &tokens[index], &overload, &arguments, whole)?;
        tokens.splice(index..end, [result]);
        index += 1;
    }
    Ok(tokens)
}

/// Calls `overload` and returns the token that holds the result
fn call(
    executor: &mut Executor,
    statement: &Statement,
    at: &Token,
    overload: &Overload,
    arguments: &[Token],
    whole: bool,
) -> Result<Token> {
    let (path, return_holder) = match &overload.kind {
        OverloadKind::Native(run) => return run(executor, statement, arguments),
        OverloadKind::User {
            path,
            return_holder,
        } => (path.clone(), return_holder.clone()),
    };

    for (index, parameter) in overload.parameters.iter().enumerate() {
        let argument = match (arguments.get(index), &parameter.default) {
            (Some(argument), _) => argument.clone(),
            (None, Some(default)) => default.clone(),
            // Overload resolution only accepts omitted parameters with a default
            (None, None) => continue,
        };
        let target = executor.expect_player(
            statement,
            &at.replaced(TokenKind::ValueRef {
                name: parameter.name.clone(),
                holder: None,
            }),
        )?;
        assign(executor, statement, target, &argument)?;
    }

    let function = executor.function_ident(path);
    executor.emit(&MinecraftCommand::Function { function });

    let player = executor.temp_player(return_holder);
    let returned = at.replaced(TokenKind::ValueRef {
        name: player.scoreboard.clone(),
        holder: Some(player.player.clone()),
    });
    if whole {
        return Ok(returned);
    }
    let temp = executor.alloc_temp(at);
    let target = executor.expect_player(statement, &temp)?;
    executor.emit(&MinecraftCommand::ScoreboardOperation {
        target,
        operation: ScoreboardOperation::Copy,
        source: player,
    });
    Ok(temp)
}

/// Sets `target` to the value of `source`, which is either a literal or a value
pub fn assign(
    executor: &mut Executor,
    statement: &Statement,
    target: ScoreboardPlayer,
    source: &Token,
) -> Result<()> {
    if let Some(player) = executor.player_of(source) {
        if player != target {
            executor.emit(&MinecraftCommand::ScoreboardOperation {
                target,
                operation: ScoreboardOperation::Copy,
                source: player,
            });
        }
        return Ok(());
    }

    let value = integer(statement, source)?;
    executor.emit(&MinecraftCommand::ScoreboardSet {
        player: target,
        value,
    });
    Ok(())
}

/// Reads a literal that can be stored in a score
pub fn integer(statement: &Statement, token: &Token) -> Result<i64> {
    token.as_integer().ok_or_else(|| {
        statement.error(StatementErrorKind::TypeMismatch {
            expected: vec!["integer".to_string(), "bool".to_string()],
            got: token.to_string(),
        })
    })
}

/// Whether `token` is a literal that can be folded at compile time
fn is_foldable(token: &Token) -> bool {
    let ty = token.token_type();
    ty.is_assignable_to(TokenType::Number) || matches!(ty, TokenType::Bool | TokenType::String)
}

fn squash_arithmetic(
    executor: &mut Executor,
    statement: &Statement,
    mut tokens: Vec<Token>,
) -> Result<Vec<Token>> {
    for tier in [0, 1] {
        // Start over after every replacement, the indices have shifted
        while let Some(index) = tokens.iter().enumerate().position(|(index, token)| {
            index > 0
                && index + 1 < tokens.len()
                && matches!(token.kind, TokenKind::Arithmetic(op) if op.tier() == tier)
        }) {
            let TokenKind::Arithmetic(op) = tokens[index].kind else {
                break;
            };
            let result = combine(executor, statement, &tokens[index - 1], op, &tokens[index + 1])?;
            tokens.splice(index - 1..=index + 1, [result]);
        }
    }
    Ok(tokens)
}

/// Lowers `lhs op rhs` and returns the token of the result
fn combine(
    executor: &mut Executor,
    statement: &Statement,
    lhs: &Token,
    op: ArithmeticOp,
    rhs: &Token,
) -> Result<Token> {
    let invalid = || {
        statement.error(StatementErrorKind::InvalidOperands {
            operator: op.symbol().to_string(),
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        })
    };

    if is_foldable(lhs) && is_foldable(rhs) {
        let lhs_value = PreprocessorValue::from_token(lhs).map_err(|kind| statement.error(kind))?;
        let rhs_value = PreprocessorValue::from_token(rhs).map_err(|kind| statement.error(kind))?;
        let folded = lhs_value
            .apply(op, &rhs_value)
            .map_err(|kind| statement.error(kind))?;
        trace!(%lhs, op = op.symbol(), %rhs, %folded, "Folded");
        return Ok(folded.to_token(lhs));
    }

    let operation = ScoreboardOperation::from(op);
    match (executor.player_of(lhs), executor.player_of(rhs)) {
        (Some(_), Some(source)) => {
            let (result, target) = writable_copy(executor, statement, lhs)?;
            executor.emit(&MinecraftCommand::ScoreboardOperation {
                target,
                operation,
                source,
            });
            Ok(result)
        }
        (Some(_), None) => {
            let value = rhs.as_integer().ok_or_else(invalid)?;
            let (result, target) = writable_copy(executor, statement, lhs)?;
            match op {
                ArithmeticOp::Add | ArithmeticOp::Sub => {
                    let value = if op == ArithmeticOp::Sub {
                        value.wrapping_neg()
                    } else {
                        value
                    };
                    executor.emit(&MinecraftCommand::ScoreboardAdd {
                        player: target,
                        value,
                    });
                }
                _ => {
                    let source = literal_temp(executor, statement, rhs, value)?;
                    executor.emit(&MinecraftCommand::ScoreboardOperation {
                        target,
                        operation,
                        source,
                    });
                }
            }
            Ok(result)
        }
        (None, Some(source)) => {
            // The literal gets its own temp, so the value on the right is never modified
            let value = lhs.as_integer().ok_or_else(invalid)?;
            let temp = executor.alloc_temp(lhs);
            let target = executor.expect_player(statement, &temp)?;
            executor.emit(&MinecraftCommand::ScoreboardSet {
                player: target.clone(),
                value,
            });
            executor.emit(&MinecraftCommand::ScoreboardOperation {
                target,
                operation,
                source,
            });
            Ok(temp)
        }
        (None, None) => Err(invalid()),
    }
}

/// Returns a temp which holds the value of `token`, reusing it if it already is a temp
fn writable_copy(
    executor: &mut Executor,
    statement: &Statement,
    token: &Token,
) -> Result<(Token, ScoreboardPlayer)> {
    let source = executor.expect_player(statement, token)?;
    if executor.is_temp(token) {
        return Ok((token.clone(), source));
    }
    let temp = executor.alloc_temp(token);
    let target = executor.expect_player(statement, &temp)?;
    executor.emit(&MinecraftCommand::ScoreboardOperation {
        target: target.clone(),
        operation: ScoreboardOperation::Copy,
        source,
    });
    Ok((temp, target))
}

fn literal_temp(
    executor: &mut Executor,
    statement: &Statement,
    at: &Token,
    value: i64,
) -> Result<ScoreboardPlayer> {
    let temp = executor.alloc_temp(at);
    let player = executor.expect_player(statement, &temp)?;
    executor.emit(&MinecraftCommand::ScoreboardSet {
        player: player.clone(),
        value,
    });
    Ok(player)
}
