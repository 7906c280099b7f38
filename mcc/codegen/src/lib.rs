//! Generates command files from statements
//!
//! The [`Executor`](executor::Executor) runs the statements produced by the parser. Directives
//! come from a [`Registry`](directive::Registry), the standard one lives in `mcc-std`.
use std::rc::Rc;

use mcc_common::{CodeRef, Config};
use mcc_error::Result;
use mcc_parser::{assemble, tokenize};

pub mod command_file;
pub mod commands;
pub mod comparison;
mod compilation;
pub mod directive;
pub mod executor;
pub mod feeder;
pub mod functions;
pub mod macros;
mod operation;
pub mod ppv;
mod resolve;
pub mod squash;
pub mod values;

pub use compilation::Compilation;
pub use directive::{Directive, Registry};
pub use executor::Executor;
pub use feeder::Feeder;
pub use operation::apply;

/// Compiles a single file
pub fn compile(config: Config, registry: Rc<Registry>, code: CodeRef) -> Result<Compilation> {
    let tokens = tokenize(code, &*registry)?;
    let statements = assemble(tokens)?;
    Executor::new(config, registry).run(statements)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::rc::Rc;

    use mcc_common::{Code, Config, InputFiles};
    use mcc_error::Result;
    use mcc_parser::{assemble, statement::Statement, token::TokenType, tokenize, type_pattern::TypePattern};

    use crate::{
        compilation::Compilation,
        directive::{Directive, Registry},
        executor::Executor,
        feeder::Feeder,
        values::{ScoreboardValue, ValueScope, ValueType},
    };

    /// Knows `mc`, which emits its string argument
    pub fn registry() -> Rc<Registry> {
        let mut registry = Registry::default();
        registry.register(
            Directive::new("mc", |executor, statement| {
                let mut feeder = Feeder::new(statement);
                let command = feeder.next_text()?;
                executor.add_command(command.as_str());
                Ok(())
            })
            .pattern(TypePattern::new().required(TokenType::Any, "command")),
        );
        Rc::new(registry)
    }

    pub fn executor() -> Executor {
        Executor::new(Config::default(), registry())
    }

    pub fn statements(input: &str) -> Vec<Statement> {
        let mut files = InputFiles::default();
        let id = files.add_input(Code {
            source: input.into(),
            path: None,
        });
        let tokens = tokenize(files.get_code_ref(id), &*registry()).expect("Tokenizing failed");
        assemble(tokens).expect("Assembling failed")
    }

    /// Runs `input` with `executor`
    pub fn run(executor: Executor, input: &str) -> Result<Compilation> {
        executor.run(statements(input))
    }

    fn define(executor: &mut Executor, name: &str, ty: ValueType, scope: ValueScope) {
        executor
            .define_value(ScoreboardValue {
                name: name.into(),
                ty,
                scope,
            })
            .expect("Value already defined");
    }

    pub fn define_global(executor: &mut Executor, name: &str, ty: ValueType) {
        define(executor, name, ty, ValueScope::Global);
    }

    pub fn define_entity(executor: &mut Executor, name: &str, ty: ValueType) {
        define(executor, name, ty, ValueScope::Entity);
    }
}
