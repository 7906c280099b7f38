//! User defined functions, `return` and the native functions
use mcc_codegen::{
    command_file::CommandFile,
    commands::{MinecraftCommand, ScoreboardOperation},
    directive::NativeFunction,
    executor::{Executor, FunctionContext},
    feeder::Feeder,
    functions::{Overload, OverloadKind, Parameter},
    squash::assign,
    values::{ScoreboardValue, ValueScope, ValueType},
    Directive, Registry,
};
use mcc_common::SmolStr;
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{AssignOp, Token, TokenKind, TokenType},
    type_pattern::TypePattern,
};
use tracing::debug;

use crate::values::value_type;

pub fn register(registry: &mut Registry) {
    registry.register(
        Directive::new("function", define_function)
            .dont_resolve()
            .with_body()
            .pattern(TypePattern::new().required(TokenType::Identifier, "name")),
    );
    registry.register(
        Directive::new("return", run_return)
            .pattern(TypePattern::new().required(TokenType::Any, "value")),
    );

    let operands = || {
        vec![
            Parameter {
                name: "a".into(),
                ty: ValueType::Int,
                default: None,
            },
            Parameter {
                name: "b".into(),
                ty: ValueType::Int,
                default: None,
            },
        ]
    };
    registry.register_native(NativeFunction {
        name: "min".into(),
        parameters: operands(),
        run: min,
    });
    registry.register_native(NativeFunction {
        name: "max".into(),
        parameters: operands(),
        run: max,
    });
}

/// `function name(type param = default, ...)` followed by the body
///
/// Every overload gets its own file. Parameters are global values named after the parameter,
/// the return value is held by a fake player on the temp objective.
fn define_function(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let name = feeder.next_identifier()?;
    let parameters = if feeder
        .next_if(|token| token.kind == TokenKind::OpenParen)
        .is_some()
    {
        parse_parameters(statement, &mut feeder)?
    } else {
        Vec::new()
    };
    feeder.expect_end()?;
    let body = executor.next_body(statement)?;

    for parameter in &parameters {
        executor
            .define_value(ScoreboardValue {
                name: parameter.name.clone(),
                ty: parameter.ty,
                scope: ValueScope::Global,
            })
            .map_err(|existing| {
                statement.error(StatementErrorKind::ValueAlreadyDefined {
                    name: parameter.name.to_string(),
                    existing: existing.to_string(),
                })
            })?;
    }

    let file_name = match executor.functions().overloads(&name).len() {
        0 => name.to_string(),
        index => format!("{name}{index}"),
    };
    let return_holder: SmolStr = format!("#ret_{file_name}").into();

    // Registered before the body runs, so the function can call itself
    let overload = Overload {
        name: name.clone(),
        parameters,
        kind: OverloadKind::User {
            path: file_name.clone(),
            return_holder: return_holder.clone(),
        },
    };
    debug!(%overload, "Defined function");
    executor.functions_mut().define(overload);

    let context = FunctionContext {
        name: file_name.as_str().into(),
        return_holder,
    };
    executor.push_file(CommandFile::new(file_name, None));
    let result = executor.in_function(context, |executor| executor.execute_subsection(body));
    let file = executor.pop_file();
    result?;
    executor.finish_file(file);
    Ok(())
}

/// Reads parameters up to and including the closing parenthesis
fn parse_parameters(statement: &Statement, feeder: &mut Feeder) -> Result<Vec<Parameter>> {
    let mut parameters = Vec::new();
    loop {
        if feeder
            .next_if(|token| token.kind == TokenKind::CloseParen)
            .is_some()
        {
            return Ok(parameters);
        }

        let ty = match feeder.next_enum_if("ValueType") {
            Some(ty) => value_type(statement, &ty)?,
            None => ValueType::Int,
        };
        let name = feeder.next_identifier()?;
        let default = if feeder
            .next_if(|token| token.kind == TokenKind::Assign(AssignOp::Set))
            .is_some()
        {
            Some(default_value(statement, feeder.next()?)?)
        } else {
            None
        };
        parameters.push(Parameter { name, ty, default });

        if feeder
            .next_if(|token| token.kind == TokenKind::Comma)
            .is_none()
        {
            feeder.next_as(TokenType::CloseParen)?;
            return Ok(parameters);
        }
    }
}

fn default_value(statement: &Statement, token: &Token) -> Result<Token> {
    if token.as_integer().is_some() {
        Ok(token.clone())
    } else {
        Err(statement.error(StatementErrorKind::TypeMismatch {
            expected: vec!["integer".to_string(), "bool".to_string()],
            got: token.to_string(),
        }))
    }
}

fn run_return(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let Some(function) = executor.current_function().cloned() else {
        return Err(statement.error(StatementErrorKind::ReturnOutsideFunction));
    };

    let mut feeder = Feeder::new(statement);
    let value = feeder.next()?;
    feeder.expect_end()?;

    let target = executor.temp_player(function.return_holder);
    assign(executor, statement, target, value)
}

fn min(executor: &mut Executor, statement: &Statement, arguments: &[Token]) -> Result<Token> {
    extremum(executor, statement, arguments, ScoreboardOperation::Min)
}

fn max(executor: &mut Executor, statement: &Statement, arguments: &[Token]) -> Result<Token> {
    extremum(executor, statement, arguments, ScoreboardOperation::Max)
}

/// Folds two literals, otherwise lowers into `<` or `>` on a temp
fn extremum(
    executor: &mut Executor,
    statement: &Statement,
    arguments: &[Token],
    operation: ScoreboardOperation,
) -> Result<Token> {
    let [lhs, rhs] = arguments else {
        return Err(statement.error(StatementErrorKind::MissingArguments {
            directive: operation.str_value().to_string(),
            missing: vec!["a".to_string(), "b".to_string()],
        }));
    };

    let literal = |token: &Token| {
        executor
            .player_of(token)
            .is_none()
            .then(|| token.as_integer())
            .flatten()
    };
    if let (Some(lhs_value), Some(rhs_value)) = (literal(lhs), literal(rhs)) {
        return Ok(lhs.replaced(TokenKind::Integer {
            value: operation.evaluate(lhs_value, rhs_value),
            unit: None,
        }));
    }

    let result = executor.alloc_temp(lhs);
    let target = executor.expect_player(statement, &result)?;
    assign(executor, statement, target.clone(), lhs)?;

    let source = match executor.player_of(rhs) {
        Some(source) => source,
        None => {
            let temp = executor.alloc_temp(rhs);
            let source = executor.expect_player(statement, &temp)?;
            assign(executor, statement, source.clone(), rhs)?;
            source
        }
    };
    executor.emit(&MinecraftCommand::ScoreboardOperation {
        target,
        operation,
        source,
    });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use mcc_error::{CompileError, StatementErrorKind};

    use crate::test_utils::{compile, render};

    #[test]
    fn functions_and_calls() {
        expect![[r#"
            [main]
            scoreboard objectives add a dummy
            scoreboard objectives add b dummy
            scoreboard objectives add mcc_temp dummy
            scoreboard objectives add x dummy
            scoreboard players set #global a 4
            scoreboard players set #global b 2
            function mcc:add
            scoreboard players operation @s x = #ret_add mcc_temp
            scoreboard players set #global a 1
            scoreboard players set #global b 5
            function mcc:add
            scoreboard players operation #tmp0 mcc_temp = #ret_add mcc_temp
            scoreboard players add #tmp0 mcc_temp 1
            scoreboard players operation @s x = #tmp0 mcc_temp
            [add]
            scoreboard players operation #add_tmp0 mcc_temp = #global a
            scoreboard players operation #add_tmp0 mcc_temp += #global b
            scoreboard players operation #ret_add mcc_temp = #add_tmp0 mcc_temp
        "#]]
        .assert_eq(&render(
            "function add(int a, b = 2) {\n  return a + b\n}\n\
             define int x\nx = add(4)\nx = add(1, 5) + 1",
        ));
    }

    #[test]
    fn natives() {
        expect![[r#"
            [main]
            scoreboard objectives add x dummy
            scoreboard objectives add mcc_temp dummy
            scoreboard players set @s x 3
            scoreboard players operation #tmp0 mcc_temp = @s x
            scoreboard players set #tmp1 mcc_temp 10
            scoreboard players operation #tmp0 mcc_temp > #tmp1 mcc_temp
            scoreboard players operation @s x = #tmp0 mcc_temp
        "#]]
        .assert_eq(&render("define int x\nx = min(3, 7)\nx = max(x, 10)"));
    }

    #[test]
    fn overloads_get_their_own_files() {
        let compilation =
            compile("function f(int a) {\n}\nfunction f(bool a2, int c) {\n}\nf(1, 2)").unwrap();
        assert_eq!(compilation.paths(), vec!["main", "f", "f1"]);
        assert_eq!(
            compilation.root().commands().last().map(String::as_str),
            Some("function mcc:f1")
        );
    }

    #[test]
    fn return_outside_of_function() {
        let error = compile("return 1").unwrap_err();
        assert!(matches!(
            error,
            CompileError::Statement(error) if error.kind == StatementErrorKind::ReturnOutsideFunction
        ));
    }
}
