/// Specifies how a compilation unit is lowered into command files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The namespace of every generated function
    pub namespace: String,
    /// The name of the file which receives all top level commands
    pub root_function: String,
    /// The folder which contains branch and comparison setup files
    pub generated_folder: String,
    /// The objective which holds temporary values, result stores and return values
    pub temp_objective: String,
    /// The fake player which holds global values
    pub global_holder: String,
    /// The selector which is active at the top level
    pub default_selector: String,
    /// Whether comments and condition descriptions get emitted into the output
    pub decorate: bool,
    /// The maximum amount of nested statement sequences (macro calls, loops, branches)
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            namespace: "mcc".to_string(),
            root_function: "main".to_string(),
            generated_folder: "__generated".to_string(),
            temp_objective: "mcc_temp".to_string(),
            global_holder: "#global".to_string(),
            default_selector: "@s".to_string(),
            decorate: false,
            max_depth: 64,
        }
    }
}
