//! Directives which only run at compile time
use itertools::Itertools;
use mcc_codegen::{
    executor::Executor, feeder::Feeder, macros::Macro, ppv::PreprocessorValue, Directive, Registry,
};
use mcc_common::SmolStr;
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{ArithmeticOp, Range, Token, TokenKind, TokenType},
    type_pattern::TypePattern,
};
use tracing::{debug, info, trace};

use mcc_codegen::directive::Chain;

fn name_and_value() -> TypePattern {
    TypePattern::new()
        .required(TokenType::Identifier, "name")
        .required(TokenType::Any, "value")
}

fn name_only() -> TypePattern {
    TypePattern::new().required(TokenType::Identifier, "name")
}

macro_rules! arithmetic_directives {
    ($registry:ident, $($keyword:literal => $op:ident),*) => {{
        $(
            $registry.register(
                Directive::new($keyword, |executor, statement| {
                    arithmetic(executor, statement, ArithmeticOp::$op)
                })
                .pattern(name_and_value()),
            );
        )*
    }};
}

pub fn register(registry: &mut Registry) {
    registry.register(Directive::new("$var", var).pattern(name_and_value()));
    registry.register(Directive::new("$inc", increment).pattern(name_only()));
    registry.register(Directive::new("$dec", decrement).pattern(name_only()));
    arithmetic_directives! {registry,
        "$add" => Add,
        "$sub" => Sub,
        "$mul" => Mul,
        "$div" => Div,
        "$mod" => Mod
    };
    registry.register(
        Directive::new("$json", json).pattern(
            TypePattern::new()
                .required(TokenType::Identifier, "name")
                .required(TokenType::String, "json"),
        ),
    );
    registry.register(
        Directive::new("$if", preprocessor_if)
            .with_body()
            .pattern(TypePattern::new().required(TokenType::Any, "condition")),
    );
    registry.register(
        Directive::new("$else", preprocessor_else)
            .continues(Chain::Preprocessor)
            .with_body(),
    );
    registry.register(
        Directive::new("$repeat", repeat).with_body().pattern(
            TypePattern::new()
                .required(TokenType::Literal, "count")
                .optional(TokenType::Identifier, "name"),
        ),
    );
    registry.register(Directive::new("$log", log));
    registry.register(
        Directive::new("$macro", define_macro)
            .dont_resolve()
            .with_body()
            .pattern(name_only()),
    );
}

fn literal(statement: &Statement, token: &Token) -> Result<PreprocessorValue> {
    PreprocessorValue::from_token(token).map_err(|kind| statement.error(kind))
}

fn var(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let name = feeder.next_identifier()?;
    let value = literal(statement, feeder.next()?)?;
    feeder.expect_end()?;

    executor.set_preprocessor_variable(name, value);
    Ok(())
}

fn increment(executor: &mut Executor, statement: &Statement) -> Result<()> {
    step(executor, statement, ArithmeticOp::Add)
}

fn decrement(executor: &mut Executor, statement: &Statement) -> Result<()> {
    step(executor, statement, ArithmeticOp::Sub)
}

fn step(executor: &mut Executor, statement: &Statement, op: ArithmeticOp) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let name = feeder.next_identifier()?;
    feeder.expect_end()?;
    update(executor, statement, name, op, &PreprocessorValue::Integer(1))
}

fn arithmetic(executor: &mut Executor, statement: &Statement, op: ArithmeticOp) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let name = feeder.next_identifier()?;
    let operand = literal(statement, feeder.next()?)?;
    feeder.expect_end()?;
    update(executor, statement, name, op, &operand)
}

/// Replaces the variable `name` with `name op operand`
fn update(
    executor: &mut Executor,
    statement: &Statement,
    name: SmolStr,
    op: ArithmeticOp,
    operand: &PreprocessorValue,
) -> Result<()> {
    let current = executor.preprocessor_variable(&name).ok_or_else(|| {
        statement.error(StatementErrorKind::UndefinedPreprocessorVariable {
            name: name.to_string(),
        })
    })?;
    let value = current
        .apply(op, operand)
        .map_err(|kind| statement.error(kind))?;
    executor.set_preprocessor_variable(name, value);
    Ok(())
}

fn json(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let name = feeder.next_identifier()?;
    let text = feeder.next_text()?;
    feeder.expect_end()?;

    let value = serde_json::from_str(&text).map_err(|error| {
        statement.error(StatementErrorKind::InvalidJson {
            message: error.to_string(),
        })
    })?;
    executor.set_preprocessor_variable(name, PreprocessorValue::Json(value));
    Ok(())
}

/// Evaluates `value` or `lhs <op> rhs`
fn evaluate(statement: &Statement) -> Result<bool> {
    match statement.arguments() {
        [value] => Ok(literal(statement, value)?.truthy()),
        [lhs, Token {
            kind: TokenKind::Compare(op),
            ..
        }, rhs] => literal(statement, lhs)?
            .compare(*op, &literal(statement, rhs)?)
            .map_err(|kind| statement.error(kind)),
        tokens => Err(statement.error(StatementErrorKind::InvalidComparison {
            got: tokens.iter().join(" "),
        })),
    }
}

fn preprocessor_if(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let passed = evaluate(statement)?;
    let body = executor.next_body(statement)?;
    if passed {
        executor.execute_subsection(body)?;
    } else {
        trace!(line = statement.line, "Skipping $if body");
    }
    executor.set_last_if(Some(passed));
    Ok(())
}

fn preprocessor_else(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let passed = executor.take_last_if().ok_or_else(|| {
        statement.error(StatementErrorKind::ElseWithoutIf {
            keyword: "$else".to_string(),
        })
    })?;
    let body = executor.next_body(statement)?;
    if !passed {
        executor.execute_subsection(body)?;
    }
    Ok(())
}

/// Unrolls the body, either `count` times or once for every value of an inclusive range
fn repeat(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let count = feeder.next()?;
    let (from, to) = match &count.kind {
        TokenKind::Integer { value, .. } => (0, value.saturating_sub(1)),
        TokenKind::Range(Range {
            min: Some(min),
            max: Some(max),
        }) => (*min, *max),
        _ => {
            return Err(statement.error(StatementErrorKind::TypeMismatch {
                expected: vec!["integer".to_string(), "closed range".to_string()],
                got: count.to_string(),
            }))
        }
    };
    let name = if feeder.has_next() {
        Some(feeder.next_identifier()?)
    } else {
        None
    };
    feeder.expect_end()?;

    let body = executor.next_body(statement)?;
    debug!(from, to, "Unrolling $repeat");
    for value in from..=to {
        if let Some(name) = &name {
            executor.set_preprocessor_variable(name.clone(), PreprocessorValue::Integer(value));
        }
        executor.execute_subsection(body.clone())?;
    }
    Ok(())
}

fn log(_executor: &mut Executor, statement: &Statement) -> Result<()> {
    let message = statement
        .arguments()
        .iter()
        .map(|token| match &token.kind {
            TokenKind::String(text) => text.to_string(),
            _ => token.to_string(),
        })
        .join(" ");
    info!(line = statement.line, "{message}");
    Ok(())
}

/// `$macro name param...`, the parameters may also be written as `$param` or in parentheses
fn define_macro(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let name = feeder.next_identifier()?;

    let mut parameters = Vec::new();
    for token in feeder.rest() {
        match &token.kind {
            TokenKind::Identifier(parameter) | TokenKind::UnresolvedPpv(parameter) => {
                parameters.push(parameter.clone());
            }
            TokenKind::OpenParen | TokenKind::CloseParen | TokenKind::Comma => {}
            _ => {
                return Err(statement.error(StatementErrorKind::InvalidMacroArgument {
                    argument: token.to_string(),
                }))
            }
        }
    }

    let body = executor.next_body(statement)?;
    executor.define_macro(Macro {
        name,
        parameters,
        body,
    });
    Ok(())
}
