//! Conditions and execution contexts
use mcc_codegen::{
    commands::{execute_prefix, ExecuteComponent},
    comparison::{run_elif, run_else, run_if},
    directive::Chain,
    executor::Executor,
    feeder::Feeder,
    Directive, Registry,
};
use mcc_error::Result;
use mcc_parser::{statement::Statement, token::TokenType, type_pattern::TypePattern};

pub fn register(registry: &mut Registry) {
    let condition = || TypePattern::new().required(TokenType::Any, "condition");
    registry.register(Directive::new("if", run_if).with_body().pattern(condition()));
    registry.register(
        Directive::new("elif", run_elif)
            .continues(Chain::If)
            .with_body()
            .pattern(condition()),
    );
    registry.register(Directive::new("else", run_else).continues(Chain::If).with_body());

    let selector = || TypePattern::new().required(TokenType::Selector, "selector");
    registry.register(Directive::new("as", run_as).with_body().pattern(selector()));
    registry.register(Directive::new("at", run_at).with_body().pattern(selector()));
}

/// Runs the body as every entity of the selector, which then becomes `@s`
fn run_as(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let selector = feeder.next_selector()?.to_string().into();
    feeder.expect_end()?;
    let body = executor.next_body(statement)?;

    let prefix = execute_prefix(&[ExecuteComponent::As { selector }]);
    executor.push_selector(true);
    let result = executor.run_guarded(Some(&prefix), body);
    executor.pop_selector();
    result
}

/// Runs the body at the position of every entity of the selector
fn run_at(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let mut feeder = Feeder::new(statement);
    let selector = feeder.next_selector()?.to_string().into();
    feeder.expect_end()?;
    let body = executor.next_body(statement)?;

    let prefix = execute_prefix(&[ExecuteComponent::At { selector }]);
    executor.push_selector(false);
    let result = executor.run_guarded(Some(&prefix), body);
    executor.pop_selector();
    result
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use mcc_common::Config;
    use mcc_error::{CompileError, StatementErrorKind};

    use crate::test_utils::{compile, compile_with, render};

    #[test]
    fn single_commands_are_prefixed() {
        expect![[r#"
            [main]
            scoreboard objectives add x dummy
            execute if score @s x matches 4.. run say big
            execute as @a run kill @s
            execute at @p run tp @s ~ ~1 ~
        "#]]
        .assert_eq(&render(
            "define int x\nif x > 3\n  say \"big\"\nas @a\n  kill\nat @p {\n  tp ~ ~1 ~\n}",
        ));
    }

    #[test]
    fn else_chains_use_result_stores() {
        expect![[r#"
            [main]
            scoreboard objectives add x dummy
            scoreboard objectives add mcc_temp dummy
            function mcc:__generated/comparisonSetup0
            execute if score #if0 mcc_temp matches 1 run say one
            function mcc:__generated/comparisonSetup1
            execute if score #if1 mcc_temp matches 1 run say two
            execute if score #if0 mcc_temp matches 0 if score #if1 mcc_temp matches 0 run say other
            [__generated/comparisonSetup0]
            scoreboard players set #if0 mcc_temp 0
            execute if score @s x matches 1 run scoreboard players set #if0 mcc_temp 1
            [__generated/comparisonSetup1]
            scoreboard players set #if1 mcc_temp 0
            execute if score #if0 mcc_temp matches 0 if score @s x matches 2 run scoreboard players set #if1 mcc_temp 1
        "#]]
        .assert_eq(&render(
            "define int x\nif x == 1\n  say \"one\"\nelif x == 2\n  say \"two\"\nelse\n  say \"other\"",
        ));
    }

    #[test]
    fn static_conditions() {
        expect![[r#"
            [main]
            say always
            say fallback
        "#]]
        .assert_eq(&render(
            "if 1 < 2\n  say \"always\"\nelse\n  say \"never\"\n\
             if \"a\" == \"b\" {\n  say \"never\"\n}\nelse {\n  say \"fallback\"\n}",
        ));
    }

    #[test]
    fn bodies_with_several_commands_get_a_branch_file() {
        expect![[r#"
            [main]
            scoreboard objectives add x dummy
            execute unless score @s x matches 0 run function mcc:__generated/branch0
            execute as @e[type=cow] run function mcc:__generated/branch1
            [__generated/branch0]
            say a
            say b
            [__generated/branch1]
            say moo
            kill @s
        "#]]
        .assert_eq(&render(
            "define int x\nif x {\n  say \"a\"\n  say \"b\"\n}\nas @e[type=cow] {\n  say \"moo\"\n  kill\n}",
        ));
    }

    #[test]
    fn nested_bodies_without_braces() {
        expect![[r#"
            [main]
            scoreboard objectives add x dummy
            execute if score @s x matches 1 run execute if score @s x matches 2 run say a
            execute as @a run execute as @p run kill @s
            say after
        "#]]
        .assert_eq(&render(
            "define int x\nif x == 1\n  if x == 2\n    say \"a\"\nas @a\n  as @p\n    kill\nsay \"after\"",
        ));
    }

    #[test]
    fn decorations_stay_outside_of_the_guard() {
        let config = Config {
            decorate: true,
            ..Config::default()
        };
        let compilation =
            compile_with(config, "define int x\nif x == 1 {\n  // greet\n  say \"a\"\n}").unwrap();
        assert_eq!(compilation.files.len(), 1);

        let commands = compilation.root().commands();
        assert_eq!(
            commands[commands.len() - 2..],
            ["# greet", "execute if score @s x matches 1 run say a"]
        );
    }

    #[test]
    fn else_without_if() {
        let error = compile("say \"a\"\nelse\n  say \"b\"").unwrap_err();
        assert!(matches!(
            error,
            CompileError::Statement(error)
                if error.kind == StatementErrorKind::ElseWithoutIf { keyword: "else".to_string() }
        ));
    }
}
