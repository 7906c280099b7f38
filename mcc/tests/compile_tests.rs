use std::path::Path;

use mcc_lang::error::{
    AsAnnotationSnippet, CompileError, FeederErrorKind, LexErrorKind, StatementErrorKind,
};

mod common;
use common::{compile_file, compile_string};

macro_rules! expect_error {
    ($file:literal, $variant:ident, $error:pat) => {{
        let (result, config) = compile_file($file, Path::new("tests/compile_test_fail"));
        match result {
            Ok(_) => panic!("Expected {} but compiled successfully", stringify!($error)),
            Err(CompileError::$variant(error)) => {
                if !matches!(error.kind, $error) {
                    panic!(
                        "Expected {} but got:\n{}",
                        stringify!($error),
                        AsAnnotationSnippet::to_string(&error, &config.compile_context)
                    );
                }
            }
            Err(other) => panic!(
                "Expected {} but got:\n{}",
                stringify!($error),
                other.format(&config.compile_context)
            ),
        }
    }};
}

#[test]
fn test_compile_fails() {
    expect_error!(
        "unused_closing_bracket.mcc",
        Lex,
        LexErrorKind::UnusedClosingBracket
    );
    expect_error!("unclosed_block.mcc", Lex, LexErrorKind::UnclosedBlock);
    expect_error!(
        "unterminated_string.mcc",
        Lex,
        LexErrorKind::UnterminatedString
    );
    expect_error!(
        "invalid_selector.mcc",
        Lex,
        LexErrorKind::InvalidSelectorCore { core: 'x' }
    );
    expect_error!("invalid_unit.mcc", Lex, LexErrorKind::InvalidUnit { .. });

    expect_error!(
        "else_without_if.mcc",
        Statement,
        StatementErrorKind::ElseWithoutIf { .. }
    );
    expect_error!(
        "elif_without_if.mcc",
        Statement,
        StatementErrorKind::ElseWithoutIf { .. }
    );
    expect_error!(
        "else_in_other_scope.mcc",
        Statement,
        StatementErrorKind::ElseWithoutIf { .. }
    );
    expect_error!(
        "undefined_preprocessor_variable.mcc",
        Statement,
        StatementErrorKind::UndefinedPreprocessorVariable { .. }
    );
    expect_error!(
        "value_already_defined.mcc",
        Statement,
        StatementErrorKind::ValueAlreadyDefined { .. }
    );
    expect_error!(
        "return_outside_function.mcc",
        Statement,
        StatementErrorKind::ReturnOutsideFunction
    );
    expect_error!(
        "unresolved_overload.mcc",
        Statement,
        StatementErrorKind::UnresolvedOverload { .. }
    );
    expect_error!(
        "macro_arity.mcc",
        Statement,
        StatementErrorKind::MacroArity { expected: 1, got: 2, .. }
    );
    expect_error!(
        "invalid_json.mcc",
        Statement,
        StatementErrorKind::InvalidJson { .. }
    );

    expect_error!(
        "missing_coordinate.mcc",
        Feeder,
        FeederErrorKind::Exhausted { .. }
    );
}

#[test]
fn structural_errors_report_their_line() {
    let (result, _) = compile_file(
        "unused_closing_bracket.mcc",
        Path::new("tests/compile_test_fail"),
    );
    assert_eq!(result.unwrap_err().line(), 3);

    let (result, _) = compile_file("unclosed_block.mcc", Path::new("tests/compile_test_fail"));
    assert_eq!(result.unwrap_err().line(), 2);
}

#[test]
fn runaway_macros_hit_the_recursion_limit() {
    let (result, config) = compile_file(
        "recursive_macro.mcc",
        Path::new("tests/compile_test_fail"),
    );
    match result {
        Err(CompileError::RecursionLimit { depth, .. }) => {
            assert_eq!(depth, config.compile_context.config.max_depth);
        }
        Err(other) => panic!("{}", other.format(&config.compile_context)),
        Ok(_) => panic!("Expected the recursion limit to be hit"),
    }
}

#[test]
fn errors_render_as_snippets() {
    let (result, config) = compile_string("say \"a\"\n$inc nope", Default::default());
    let rendered = config.format_error(&result.unwrap_err());
    assert!(rendered.contains("'$nope' is not defined"), "{rendered}");
    assert!(rendered.contains("$inc nope"), "{rendered}");
}
