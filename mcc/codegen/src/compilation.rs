use mcc_common::SmolStr;

use crate::{command_file::CommandFile, values::ScoreboardValue};

/// Everything a compilation produced
#[derive(Debug)]
pub struct Compilation {
    /// The output files, the root file is always the first one
    pub files: Vec<CommandFile>,
    pub values: Vec<ScoreboardValue>,
    pub macros: Vec<SmolStr>,
    pub preprocessor_variables: Vec<SmolStr>,
    pub functions: Vec<SmolStr>,
}

impl Compilation {
    pub fn root(&self) -> &CommandFile {
        &self.files[0]
    }

    /// Finds a file by its path, like `__generated/branch0`
    pub fn file(&self, path: &str) -> Option<&CommandFile> {
        self.files.iter().find(|file| file.path() == path)
    }

    /// Returns the paths of every file, in the order they were finished
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(CommandFile::path).collect()
    }
}
