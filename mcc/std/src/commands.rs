//! Directives which emit a single command
use itertools::Itertools;
use mcc_codegen::{executor::Executor, feeder::Feeder, Directive, Registry};
use mcc_common::SmolStr;
use mcc_error::Result;
use mcc_parser::{statement::Statement, token::TokenType, type_pattern::TypePattern};

pub fn register(registry: &mut Registry) {
    registry.register(
        Directive::new("mc", raw).pattern(TypePattern::new().required(TokenType::String, "command")),
    );
    registry.register(
        Directive::new("say", say).pattern(TypePattern::new().required(TokenType::String, "text")),
    );
    registry.register(
        Directive::new("print", print)
            .pattern(TypePattern::new().required(TokenType::String, "text"))
            .pattern(
                TypePattern::new()
                    .required(TokenType::Selector, "target")
                    .required(TokenType::String, "text"),
            ),
    );
    registry.register(Directive::new("kill", kill));
    registry.register(
        Directive::new("tp", teleport)
            .pattern(TypePattern::new().required(TokenType::Selector, "destination"))
            .pattern(
                TypePattern::new()
                    .optional(TokenType::Selector, "target")
                    .required(TokenType::Coordinate, "x")
                    .required(TokenType::Coordinate, "y")
                    .required(TokenType::Coordinate, "z"),
            ),
    );
    registry.register(
        Directive::new("gamemode", gamemode).pattern(
            TypePattern::new()
                .required(TokenType::EnumConstant, "mode")
                .optional(TokenType::Selector, "target"),
        ),
    );
}

fn raw(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let command = feeder.next_text()?;
    feeder.expect_end()?;
    executor.add_command(command.as_str());
    Ok(())
}

fn say(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let text = feeder.next_text()?;
    feeder.expect_end()?;
    executor.add_command(format!("say {text}"));
    Ok(())
}

/// `print [target] text`, sends the text to the chat of every player by default
fn print(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let target = if feeder.next_is(TokenType::Selector) {
        feeder.next_selector()?.to_string()
    } else {
        "@a".to_string()
    };
    let text = feeder.next_text()?;
    feeder.expect_end()?;

    let message = serde_json::json!({ "text": text.as_str() });
    executor.add_command(format!("tellraw {target} {message}"));
    Ok(())
}

/// The selector that comes next, or the active selector
fn target(executor: &Executor, feeder: &mut Feeder) -> Result<SmolStr> {
    if feeder.next_is(TokenType::Selector) {
        Ok(feeder.next_selector()?.to_string().into())
    } else {
        Ok(executor.active_selector().clone())
    }
}

fn kill(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let target = target(executor, &mut feeder)?;
    feeder.expect_end()?;
    executor.add_command(format!("kill {target}"));
    Ok(())
}

/// `tp [target] destination`, the destination is a selector or three coordinates
fn teleport(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let has_target = feeder.next_is(TokenType::Selector) && feeder.peek_n(1).is_some();
    let target = if has_target {
        feeder.next_selector()?.to_string().into()
    } else {
        executor.active_selector().clone()
    };

    let destination = if feeder.next_is(TokenType::Selector) {
        feeder.next_selector()?.to_string()
    } else {
        (0..3)
            .map(|_| feeder.next_as(TokenType::Coordinate))
            .collect::<Result<Vec<_>>>()?
            .iter()
            .join(" ")
    };
    feeder.expect_end()?;

    executor.add_command(format!("tp {target} {destination}"));
    Ok(())
}

fn gamemode(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let mode = feeder.next_enum("GameMode")?;
    let target = target(executor, &mut feeder)?;
    feeder.expect_end()?;
    executor.add_command(format!("gamemode {mode} {target}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use mcc_error::CompileError;

    use crate::test_utils::{compile, render};

    #[test]
    fn simple_commands() {
        expect![[r#"
            [main]
            say hi
            tellraw @a {"text":"hello \"there\""}
            tellraw @p {"text":"psst"}
            time set day
            kill @s
            kill @e[type=cow]
            tp @s ~ ~10 ~
            tp @a[tag=x] 1 2.5 ~-3
            tp @s @p
            tp @a @r
            gamemode creative @s
            gamemode survival @a
        "#]]
        .assert_eq(&render(
            "say \"hi\"\nprint \"hello \\\"there\\\"\"\nprint @p \"psst\"\nmc \"time set day\"\n\
             kill\nkill @e[type=cow]\n\
             tp ~ ~10 ~\ntp @a[tag=x] 1 2.5 ~-3\ntp @p\ntp @a @r\n\
             gamemode creative\ngamemode survival @a",
        ));
    }

    #[test]
    fn missing_arguments() {
        let error = compile("tp @a ~ ~").unwrap_err();
        assert!(matches!(error, CompileError::Feeder(_)), "{error:?}");
        let error = compile("gamemode").unwrap_err();
        assert!(matches!(error, CompileError::Statement(_)), "{error:?}");
    }
}
