//! The built-in directives of the mcc language
//!
//! [`load`] creates a [`Registry`] that knows every directive, enum constant and native
//! function a program can use. Preprocessor directives start with `$` and only run at
//! compile time, all other directives generate commands.
use mcc_codegen::Registry;

mod commands;
mod control;
mod functions;
mod preprocessor;
mod values;

/// Creates the registry with every built-in
pub fn load() -> Registry {
    let mut registry = Registry::default();

    register_enums(&mut registry);
    preprocessor::register(&mut registry);
    commands::register(&mut registry);
    values::register(&mut registry);
    control::register(&mut registry);
    functions::register(&mut registry);

    registry
}

macro_rules! register_enums {
    ($registry:ident, $($name:literal => [$($value:literal),+]),*) => {{
        $(
            $registry.register_enum($name, &[$($value),+]);
        )*
    }};
}

fn register_enums(registry: &mut Registry) {
    register_enums! {registry,
        "GameMode" => ["survival", "creative", "adventure", "spectator"],
        "ValueType" => ["int", "bool", "time"],
        "Scope" => ["global"],
        "BlocksMode" => ["all", "masked"]
    };
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::rc::Rc;

    use mcc_codegen::Compilation;
    use mcc_common::{Code, Config, InputFiles};
    use mcc_error::Result;

    pub fn compile_with(config: Config, input: &str) -> Result<Compilation> {
        let mut files = InputFiles::default();
        let id = files.add_input(Code {
            source: input.into(),
            path: None,
        });
        mcc_codegen::compile(config, Rc::new(super::load()), files.get_code_ref(id))
    }

    pub fn compile(input: &str) -> Result<Compilation> {
        compile_with(Config::default(), input)
    }

    /// Compiles `input` and renders every output file with its path
    pub fn render(input: &str) -> String {
        let compilation = compile(input).unwrap();
        compilation
            .files
            .iter()
            .map(|file| format!("[{}]\n{file}", file.path()))
            .collect()
    }
}
