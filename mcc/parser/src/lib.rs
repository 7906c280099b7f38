//! Turns source text into statements
//!
//! The [`tokenizer`] splits the input into [`Token`](token::Token)s, the
//! [`assembler`] groups them into [`Statement`](statement::Statement)s and links
//! the blocks. [`TypePattern`](type_pattern::TypePattern)s describe the argument
//! shapes that statements are checked against.

mod lexer;

pub mod assembler;
pub mod statement;
pub mod token;
pub mod tokenizer;
pub mod type_pattern;

pub use assembler::assemble;
pub use tokenizer::{tokenize, Keywords, NoKeywords};

#[cfg(test)]
pub(crate) mod test_utils {
    use mcc_common::{Code, InputFiles};
    use mcc_error::Result;

    use crate::{
        assemble,
        statement::Statement,
        token::{DirectiveId, EnumConstant},
        tokenize, Keywords,
    };

    /// Knows the directive `mc` with the id 0
    pub struct TestKeywords;

    impl Keywords for TestKeywords {
        fn directive(&self, keyword: &str) -> Option<DirectiveId> {
            keyword.eq_ignore_ascii_case("mc").then_some(DirectiveId(0))
        }

        fn enum_constant(&self, _word: &str) -> Option<EnumConstant> {
            None
        }
    }

    pub fn try_statements(input: &str) -> Result<Vec<Statement>> {
        let mut files = InputFiles::default();
        let id = files.add_input(Code {
            source: input.into(),
            path: None,
        });
        let tokens = tokenize(files.get_code_ref(id), &TestKeywords)?;
        assemble(tokens)
    }

    pub fn statements(input: &str) -> Vec<Statement> {
        try_statements(input).expect("Assembling failed")
    }
}
