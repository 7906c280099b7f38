use std::fs;

use expect_test::expect;
use mcc_lang::{codegen::Compilation, common::Config, write_files};

mod common;
use common::{compile, compile_string, render};

fn commands(compilation: &Compilation) -> impl Iterator<Item = &String> {
    compilation
        .files
        .iter()
        .flat_map(|file| file.commands().iter())
}

#[test]
fn literal_arithmetic_is_folded() {
    expect![[r#"
        [main]
        scoreboard objectives add x dummy
        scoreboard players set @s x 11
        scoreboard players set @s x 14
    "#]]
    .assert_eq(&render(&compile(
        "define int x\nx = 3 + 4 * 2\nx = (3 + 4) * 2",
    )));
}

#[test]
fn single_statement_bodies_are_prefixed() {
    let compilation = compile("define int x\nif x == 1 {\n  mc \"say hi\"\n}");
    assert_eq!(compilation.paths(), vec!["main"]);
    assert_eq!(
        compilation.root().commands().last().map(String::as_str),
        Some("execute if score @s x matches 1 run say hi")
    );
}

#[test]
fn multi_statement_bodies_get_one_branch_file() {
    expect![[r#"
        [main]
        scoreboard objectives add x dummy
        execute if score @s x matches 1 run function mcc:__generated/branch0
        [__generated/branch0]
        say hi
        say there
    "#]]
    .assert_eq(&render(&compile(
        "define int x\nif x == 1 {\n  mc \"say hi\"\n  mc \"say there\"\n}",
    )));
}

#[test]
fn false_conditions_are_elided() {
    let compilation = compile(
        "define int x\nif 1 == 2 {\n  mc \"say never\"\n  x = 5\n}\nif 2 < 1\n  mc \"say never\"\nmc \"say after\"",
    );
    assert_eq!(compilation.paths(), vec!["main"]);
    assert!(commands(&compilation).all(|command| !command.starts_with("execute")));
    assert!(commands(&compilation).all(|command| !command.contains("never")));
    assert_eq!(
        compilation.root().commands().last().map(String::as_str),
        Some("say after")
    );
}

#[test]
fn if_else_shares_one_result_store() {
    let compilation = compile(
        "define int x\nif x == 1 {\n  say \"a\"\n  say \"b\"\n}\nelse {\n  say \"c\"\n  say \"d\"\n  say \"e\"\n}",
    );

    let setup = compilation
        .file("__generated/comparisonSetup0")
        .expect("the condition needs a setup file");
    assert_eq!(
        setup.commands(),
        [
            "scoreboard players set #if0 mcc_temp 0",
            "execute if score @s x matches 1 run scoreboard players set #if0 mcc_temp 1",
        ]
    );

    let root = compilation.root().commands();
    assert!(root.contains(&"function mcc:__generated/comparisonSetup0".to_string()));
    assert!(root.contains(
        &"execute if score #if0 mcc_temp matches 1 run function mcc:__generated/branch0".to_string()
    ));
    assert!(root.contains(
        &"execute if score #if0 mcc_temp matches 0 run function mcc:__generated/branch1".to_string()
    ));
    assert!(commands(&compilation).all(|command| !command.contains("#if1")));
}

#[test]
fn elif_chains() {
    expect![[r#"
        [main]
        scoreboard objectives add x dummy
        scoreboard objectives add mcc_temp dummy
        function mcc:__generated/comparisonSetup0
        execute if score #if0 mcc_temp matches 1 run say low
        execute if score #if0 mcc_temp matches 0 if score @s x matches 10.. run say high
        [__generated/comparisonSetup0]
        scoreboard players set #if0 mcc_temp 0
        execute if score @s x matches ..4 run scoreboard players set #if0 mcc_temp 1
    "#]]
    .assert_eq(&render(&compile(
        "define int x\nif x < 5\n  say \"low\"\nelif x >= 10\n  say \"high\"",
    )));
}

#[test]
fn macro_parameters_are_restored() {
    let compilation = compile(
        "$var name \"outer\"\n$macro greet name {\n  say \"hi $name\"\n}\ngreet(\"inner\")\nsay \"$name\"",
    );
    assert_eq!(
        compilation.root().commands(),
        ["say hi inner", "say outer"]
    );
    assert_eq!(compilation.macros, vec!["greet"]);
    assert!(compilation.preprocessor_variables.iter().any(|name| name == "name"));
}

#[test]
fn unrolled_loops_with_runtime_values() {
    expect![[r#"
        [main]
        scoreboard objectives add total dummy
        scoreboard players set #global total 0
        scoreboard players add #global total 1
        scoreboard players add #global total 2
        scoreboard players add #global total 3
    "#]]
    .assert_eq(&render(&compile(
        "define global int total = 0\n$repeat 1..3 i {\n  total += $i\n}",
    )));
}

#[test]
fn config_changes_the_output() {
    let config = Config {
        namespace: "game".to_string(),
        temp_objective: "tmp".to_string(),
        ..Config::default()
    };
    let (result, _) = compile_string(
        "define int x\nif x == 1\n  say \"a\"\nelse {\n  say \"b\"\n  say \"c\"\n}",
        config,
    );
    let compilation = result.unwrap();
    let root = compilation.root().commands();
    assert!(root.contains(&"function game:__generated/comparisonSetup0".to_string()));
    assert!(root.contains(
        &"execute if score #if0 tmp matches 0 run function game:__generated/branch0".to_string()
    ));
}

#[test]
fn decoration_adds_comments() {
    let config = Config {
        decorate: true,
        ..Config::default()
    };
    let (result, _) = compile_string("// greets everyone\nsay \"hi\"", config);
    assert_eq!(
        result.unwrap().root().commands(),
        ["# greets everyone", "say hi"]
    );

    let (result, _) = compile_string("// greets everyone\nsay \"hi\"", Config::default());
    assert_eq!(result.unwrap().root().commands(), ["say hi"]);
}

#[test]
fn files_are_written_into_their_folders() {
    let compilation = compile(
        "define int x\nfunction reset() {\n  x = 0\n}\nif x == 1 {\n  reset()\n  say \"reset\"\n}",
    );
    let directory = tempfile::tempdir().unwrap();
    let written = write_files(&compilation, directory.path()).unwrap();

    assert_eq!(written.len(), compilation.files.len());
    assert_eq!(written[0], directory.path().join("main.mcfunction"));

    let branch = directory
        .path()
        .join("__generated")
        .join("branch0.mcfunction");
    assert_eq!(
        fs::read_to_string(branch).unwrap(),
        "function mcc:reset\nsay reset\n"
    );
    assert_eq!(
        fs::read_to_string(directory.path().join("reset.mcfunction")).unwrap(),
        "scoreboard players set @s x 0\n"
    );
}
