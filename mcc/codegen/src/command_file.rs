use std::fmt;

/// One output function, a list of command lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFile {
    pub name: String,
    /// The folder relative to the namespace root, `None` for top level files
    pub folder: Option<String>,
    commands: Vec<String>,
    /// The amount of commands at the start which were added with [`CommandFile::add_top`]
    top_count: usize,
}

impl CommandFile {
    pub fn new(name: impl Into<String>, folder: Option<String>) -> Self {
        CommandFile {
            name: name.into(),
            folder,
            commands: Vec::new(),
            top_count: 0,
        }
    }

    /// Appends a command at the end of this file
    pub fn add(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Adds a command after every other command that was added to the top,
    /// but before all regular commands
    pub fn add_top(&mut self, command: impl Into<String>) {
        self.commands.insert(self.top_count, command.into());
        self.top_count += 1;
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<String> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The path of this function inside of its namespace, like `__generated/branch0`
    pub fn path(&self) -> String {
        match &self.folder {
            Some(folder) => format!("{folder}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for CommandFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CommandFile;

    #[test]
    fn top_commands_keep_their_order() {
        let mut file = CommandFile::new("main", None);
        file.add("say a");
        file.add_top("scoreboard objectives add x dummy");
        file.add("say b");
        file.add_top("scoreboard objectives add y dummy");

        assert_eq!(
            file.commands(),
            &[
                "scoreboard objectives add x dummy",
                "scoreboard objectives add y dummy",
                "say a",
                "say b"
            ]
        );
        assert_eq!(file.to_string().lines().count(), 4);
    }

    #[test]
    fn paths() {
        assert_eq!(CommandFile::new("main", None).path(), "main");
        assert_eq!(
            CommandFile::new("branch3", Some("__generated".to_string())).path(),
            "__generated/branch3"
        );
    }
}
