//! Compile time macros
//!
//! A macro captures a section of statements. Calling it binds the arguments to preprocessor
//! variables named after the parameters and runs the section in place.
use itertools::Itertools;
use mcc_common::SmolStr;
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{Token, TokenKind},
};
use tracing::debug;

use crate::{
    executor::{Executor, Section},
    ppv::PreprocessorValue,
    squash::split_arguments,
};

#[derive(Debug, Clone)]
pub struct Macro {
    pub name: SmolStr,
    pub parameters: Vec<SmolStr>,
    pub body: Section,
}

/// Calls the macro named by the first token of `tokens`, which must be followed by the
/// parenthesized arguments
pub fn call_macro(executor: &mut Executor, statement: &Statement, tokens: &[Token]) -> Result<()> {
    let name = match tokens.first() {
        Some(Token {
            kind: TokenKind::MacroRef(name),
            ..
        }) => name,
        other => {
            return Err(statement.error(StatementErrorKind::UndefinedValue {
                name: other.map(ToString::to_string).unwrap_or_default(),
            }))
        }
    };
    let Some(called) = executor.macro_named(name).cloned() else {
        return Err(statement.error(StatementErrorKind::UndefinedValue {
            name: name.to_string(),
        }));
    };

    let arguments = parenthesized(statement, &tokens[1..])?;
    if arguments.len() != called.parameters.len() {
        return Err(statement.error(StatementErrorKind::MacroArity {
            name: called.name.to_string(),
            expected: called.parameters.len(),
            got: arguments.len(),
        }));
    }

    let values = arguments
        .iter()
        .map(|argument| match argument.as_slice() {
            [token] => PreprocessorValue::from_token(token).map_err(|_| {
                statement.error(StatementErrorKind::InvalidMacroArgument {
                    argument: token.to_string(),
                })
            }),
            tokens => Err(statement.error(StatementErrorKind::InvalidMacroArgument {
                argument: tokens.iter().join(" "),
            })),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(name = %called.name, "Expanding macro");
    let previous = called
        .parameters
        .iter()
        .zip(values)
        .map(|(parameter, value)| {
            let previous = executor.set_preprocessor_variable(parameter.clone(), value);
            (parameter.clone(), previous)
        })
        .collect_vec();

    let result = executor.execute_subsection(called.body);

    // Parameters shadow variables of the same name only for the duration of the call
    for (parameter, previous) in previous.into_iter().rev() {
        match previous {
            Some(value) => {
                executor.set_preprocessor_variable(parameter, value);
            }
            None => {
                executor.remove_preprocessor_variable(&parameter);
            }
        }
    }
    result
}

/// Splits `( a, b, ... )` into its arguments
fn parenthesized(statement: &Statement, tokens: &[Token]) -> Result<Vec<Vec<Token>>> {
    match tokens {
        [open, inner @ .., close]
            if open.kind == TokenKind::OpenParen && close.kind == TokenKind::CloseParen =>
        {
            Ok(split_arguments(inner))
        }
        _ => Err(statement.error(StatementErrorKind::LeftoverTokens {
            tokens: tokens.iter().map(ToString::to_string).collect(),
        })),
    }
}
