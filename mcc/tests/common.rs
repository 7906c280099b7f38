use std::path::Path;

use mcc_lang::{codegen::Compilation, common::Config, error::Result, CompileConfig};

/// Compiles the file `name` inside of `root`
pub fn compile_file(name: &str, root: &Path) -> (Result<Compilation>, CompileConfig) {
    let mut config = CompileConfig::new(Config::default());
    let id = config
        .add_file(&root.join(name))
        .unwrap_or_else(|error| panic!("Could not read {name}: {error}"));
    (config.compile(id), config)
}

pub fn compile_string(source: &str, config: Config) -> (Result<Compilation>, CompileConfig) {
    let mut config = CompileConfig::new(config);
    let id = config.add_source(source);
    (config.compile(id), config)
}

/// Compiles `source` with the default config and panics with the rendered error on failure
pub fn compile(source: &str) -> Compilation {
    let (result, config) = compile_string(source, Config::default());
    result.unwrap_or_else(|error| panic!("{}", config.format_error(&error)))
}

/// Every output file, preceded by its path
pub fn render(compilation: &Compilation) -> String {
    compilation
        .files
        .iter()
        .map(|file| format!("[{}]\n{file}", file.path()))
        .collect()
}
