use std::{fs, io, path::Path, rc::Rc};

use mcc_codegen::{Compilation, Registry};
use mcc_common::{Code, CodeId, CompileContext, Config};
use mcc_error::{CompileError, Result};
use tracing::debug;

/// Holds the input files of a compilation and the directives they can use
pub struct CompileConfig {
    pub compile_context: CompileContext,
    registry: Rc<Registry>,
}

impl CompileConfig {
    /// Creates a config which knows every built-in directive
    pub fn new(config: Config) -> Self {
        CompileConfig {
            compile_context: CompileContext::new(config),
            registry: Rc::new(mcc_std::load()),
        }
    }

    /// Reads the file at `path` and adds it as an input file
    pub fn add_file(&mut self, path: &Path) -> io::Result<CodeId> {
        let source = fs::read_to_string(path)?;
        debug!(path = %path.display(), "Added input file");
        Ok(self.compile_context.add_input_file(Code {
            source: source.into(),
            path: Some(path.display().to_string()),
        }))
    }

    /// Adds source code which does not belong to any file
    pub fn add_source(&mut self, source: impl Into<Box<str>>) -> CodeId {
        self.compile_context.add_input_file(Code {
            source: source.into(),
            path: None,
        })
    }

    pub fn compile(&self, id: CodeId) -> Result<Compilation> {
        mcc_codegen::compile(
            self.compile_context.config.clone(),
            Rc::clone(&self.registry),
            self.compile_context.input_files.get_code_ref(id),
        )
    }

    /// Renders `error` as an annotated snippet of the input that caused it
    pub fn format_error(&self, error: &CompileError) -> String {
        error.format(&self.compile_context)
    }
}
