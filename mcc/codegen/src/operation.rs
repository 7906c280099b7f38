//! Assignments like `x = y * 2` and `x += 1`
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{ArithmeticOp, Token, TokenKind},
};

use crate::{
    commands::{MinecraftCommand, ScoreboardOperation, ScoreboardPlayer},
    executor::Executor,
    squash::{assign, integer, squash_single},
};

pub fn run_operation(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let [target, operator, value @ ..] = statement.tokens.as_slice() else {
        return Err(statement.error(StatementErrorKind::InvalidAssignmentTarget {
            got: statement.source(),
        }));
    };

    let target = match &target.kind {
        TokenKind::ValueRef { .. } => executor.expect_player(statement, target)?,
        TokenKind::Identifier(name) => {
            return Err(statement.error(StatementErrorKind::UndefinedValue {
                name: name.to_string(),
            }))
        }
        _ => {
            return Err(statement.error(StatementErrorKind::InvalidAssignmentTarget {
                got: target.to_string(),
            }))
        }
    };
    let TokenKind::Assign(operator) = operator.kind else {
        return Err(statement.error(StatementErrorKind::LeftoverTokens {
            tokens: statement.tokens[1..].iter().map(ToString::to_string).collect(),
        }));
    };

    let value = squash_single(executor, statement, value.to_vec())?;
    match operator.arithmetic() {
        None => assign(executor, statement, target, &value),
        Some(op) => apply(executor, statement, target, op, &value),
    }
}

/// Applies `target op= value`
pub fn apply(
    executor: &mut Executor,
    statement: &Statement,
    target: ScoreboardPlayer,
    op: ArithmeticOp,
    value: &Token,
) -> Result<()> {
    let operation = ScoreboardOperation::from(op);
    if let Some(source) = executor.player_of(value) {
        executor.emit(&MinecraftCommand::ScoreboardOperation {
            target,
            operation,
            source,
        });
        return Ok(());
    }

    let literal = integer(statement, value)?;
    match op {
        ArithmeticOp::Add => executor.emit(&MinecraftCommand::ScoreboardAdd {
            player: target,
            value: literal,
        }),
        ArithmeticOp::Sub => executor.emit(&MinecraftCommand::ScoreboardAdd {
            player: target,
            value: literal.wrapping_neg(),
        }),
        _ => {
            let temp = executor.alloc_temp(value);
            let source = executor.expect_player(statement, &temp)?;
            executor.emit(&MinecraftCommand::ScoreboardSet {
                player: source.clone(),
                value: literal,
            });
            executor.emit(&MinecraftCommand::ScoreboardOperation {
                target,
                operation,
                source,
            });
        }
    }
    Ok(())
}
