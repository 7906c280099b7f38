//! Declaration of scoreboard values
use mcc_codegen::{
    executor::Executor,
    feeder::Feeder,
    squash::{assign, squash_single},
    values::{ScoreboardValue, ValueScope, ValueType},
    Directive, Registry,
};
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{AssignOp, TokenKind, TokenType},
    type_pattern::TypePattern,
};

pub fn register(registry: &mut Registry) {
    registry.register(
        Directive::new("define", define)
            .dont_squash()
            .pattern(
                TypePattern::new()
                    .required(TokenType::EnumConstant, "type")
                    .required(TokenType::Identifier, "name"),
            )
            .pattern(
                TypePattern::new()
                    .required(TokenType::EnumConstant, "scope")
                    .required(TokenType::EnumConstant, "type")
                    .required(TokenType::Identifier, "name"),
            ),
    );
}

/// Reads the name of a value type
pub fn value_type(statement: &Statement, name: &str) -> Result<ValueType> {
    ValueType::from_name(name).ok_or_else(|| {
        statement.error(StatementErrorKind::TypeMismatch {
            expected: vec!["int".to_string(), "bool".to_string(), "time".to_string()],
            got: name.to_string(),
        })
    })
}

/// `define [global] type name [= value]`
fn define(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let scope = match feeder.next_enum_if("Scope") {
        Some(_) => ValueScope::Global,
        None => ValueScope::Entity,
    };
    let ty = value_type(statement, &feeder.next_enum("ValueType")?)?;
    let name_token = feeder.next()?;
    let name = name_token
        .as_identifier()
        .filter(|_| name_token.token_type().is_assignable_to(TokenType::Identifier))
        .cloned()
        .ok_or_else(|| {
            statement.error(StatementErrorKind::InvalidAssignmentTarget {
                got: name_token.to_string(),
            })
        })?;
    let initial = if feeder
        .next_if(|token| token.kind == TokenKind::Assign(AssignOp::Set))
        .is_some()
    {
        Some(feeder.rest())
    } else {
        None
    };
    feeder.expect_end()?;

    executor
        .define_value(ScoreboardValue {
            name: name.clone(),
            ty,
            scope,
        })
        .map_err(|existing| {
            statement.error(StatementErrorKind::ValueAlreadyDefined {
                name: name.to_string(),
                existing: existing.to_string(),
            })
        })?;

    if let Some(tokens) = initial {
        let value = squash_single(executor, statement, tokens.to_vec())?;
        let reference = name_token.replaced(TokenKind::ValueRef { name, holder: None });
        let target = executor.expect_player(statement, &reference)?;
        assign(executor, statement, target, &value)?;
    }
    Ok(())
}
