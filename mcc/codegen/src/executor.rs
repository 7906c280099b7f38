//! The statement interpreter
//!
//! The [`Executor`] walks the statements of a program with a cursor and generates the
//! commands for each of them. Directives can read the statements that follow them, run
//! nested sections of statements and redirect the output into other files.
use std::{fmt, rc::Rc};

use mcc_common::{Config, FxIndexMap, SmolStr, Span};
use mcc_error::{CompileError, Result, StatementErrorKind};
use mcc_parser::{
    statement::{Statement, StatementKind},
    token::{DirectiveId, Token, TokenKind},
    type_pattern::match_alternatives,
};
use tracing::{debug, trace, warn};

use crate::{
    command_file::CommandFile,
    commands::{FunctionIdent, MinecraftCommand, ScoreboardPlayer},
    compilation::Compilation,
    directive::{Chain, Registry},
    functions::{FunctionRegistry, Overload, OverloadKind},
    macros::{call_macro, Macro},
    operation::run_operation,
    ppv::PreprocessorValue,
    resolve::resolve,
    squash::squash,
    values::{ScoreboardValue, Temps, ValueScope, ValueTable, ValueType},
};

/// A range of statements that runs as a unit
///
/// Sections share the statement array they were cut from.
#[derive(Debug, Clone)]
pub struct Section {
    statements: Rc<[Statement]>,
    start: usize,
    end: usize,
}

impl Section {
    pub fn new(statements: Vec<Statement>) -> Self {
        let end = statements.len();
        Section {
            statements: statements.into(),
            start: 0,
            end,
        }
    }

    fn sub(&self, start: usize, end: usize) -> Self {
        debug_assert!(self.start <= start && end <= self.end);
        Section {
            statements: Rc::clone(&self.statements),
            start,
            end,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Counts the statements that do something, the body of a directive counts as part
    /// of that directive
    fn shape(&self, registry: &Registry) -> BodyShape {
        let statements = self.statements();
        let mut count = 0;
        let mut index = 0;
        while let Some(statement) = statements.get(index) {
            match statement.kind {
                StatementKind::OpenBlock { .. } => return BodyShape::Multiple,
                _ if statement.is_skipped() => index += 1,
                _ => {
                    count += 1;
                    index = extent(registry, statements, index, statements.len());
                }
            }
        }

        match count {
            0 => BodyShape::Empty,
            1 => BodyShape::Single,
            _ => BodyShape::Multiple,
        }
    }
}

/// The index after `statements[index]` and everything it owns
///
/// A block owns its content. A directive that takes a body owns the following block or,
/// without braces, the next statement along with whatever that statement owns.
fn extent(registry: &Registry, statements: &[Statement], index: usize, end: usize) -> usize {
    let owned = match statements[index].kind {
        StatementKind::OpenBlock { statements_inside } => index + statements_inside + 2,
        StatementKind::Directive(id) if registry.directive(id).takes_body => {
            let mut body = index + 1;
            while body < end && statements[body].kind == StatementKind::Comment {
                body += 1;
            }
            match statements.get(body).map(|next| next.kind) {
                Some(StatementKind::CloseBlock { .. }) | None => index + 1,
                Some(_) if body >= end => index + 1,
                Some(_) => extent(registry, statements, body, end),
            }
        }
        _ => index + 1,
    };
    owned.min(end)
}

enum BodyShape {
    Empty,
    Single,
    Multiple,
}

#[derive(Debug)]
struct Frame {
    section: Section,
    /// The index of the next statement in `section.statements`
    cursor: usize,
}

/// How a previous `if` or `elif` ended, consumed by a following `else` or `elif`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousComparison {
    /// The outcome was known at compile time, `true` if a branch was taken
    Static(bool),
    /// Every result store of the chain so far, a branch was taken if any of them is 1
    Runtime {
        stores: Vec<ScoreboardPlayer>,
        description: String,
    },
}

/// The function whose body is currently generated
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub name: SmolStr,
    pub return_holder: SmolStr,
}

#[derive(Debug, Default)]
struct Counters {
    branch: usize,
    setup: usize,
    result_store: usize,
}

pub struct Executor {
    config: Config,
    registry: Rc<Registry>,
    frames: Vec<Frame>,
    /// The files that are currently written to, the root file is always at the bottom
    files: Vec<CommandFile>,
    finished: Vec<CommandFile>,
    selectors: Vec<SmolStr>,
    preprocessor_variables: FxIndexMap<SmolStr, PreprocessorValue>,
    macros: FxIndexMap<SmolStr, Macro>,
    functions: FunctionRegistry,
    values: ValueTable,
    temps: Temps,
    temp_objective_added: bool,
    /// The result of the last `$if`, per scope level
    last_if: Vec<Option<bool>>,
    /// The last runtime comparison, per scope level
    last_compare: Vec<Option<PreviousComparison>>,
    prepend: String,
    counters: Counters,
    current_function: Option<FunctionContext>,
    /// The statement that runs right now, for errors which are not caused by the statement itself
    position: (Span, usize),
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("depth", &self.frames.len())
            .field("files", &self.files)
            .field("selectors", &self.selectors)
            .field("preprocessor_variables", &self.preprocessor_variables)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(config: Config, registry: Rc<Registry>) -> Self {
        let mut functions = FunctionRegistry::default();
        for native in registry.natives() {
            functions.define(Overload {
                name: native.name.clone(),
                parameters: native.parameters.clone(),
                kind: OverloadKind::Native(native.run),
            });
        }

        Executor {
            files: vec![CommandFile::new(config.root_function.clone(), None)],
            selectors: vec![config.default_selector.as_str().into()],
            config,
            registry,
            frames: Vec::new(),
            finished: Vec::new(),
            preprocessor_variables: FxIndexMap::default(),
            macros: FxIndexMap::default(),
            functions,
            values: ValueTable::default(),
            temps: Temps::default(),
            temp_objective_added: false,
            last_if: vec![None],
            last_compare: vec![None],
            prepend: String::new(),
            counters: Counters::default(),
            current_function: None,
            position: (Span::empty(0), 1),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs a whole program
    pub fn run(mut self, statements: Vec<Statement>) -> Result<Compilation> {
        self.execute_subsection(Section::new(statements))?;
        Ok(self.finish())
    }

    fn finish(mut self) -> Compilation {
        debug_assert_eq!(self.files.len(), 1, "Unbalanced file stack");
        let mut files = Vec::with_capacity(self.finished.len() + 1);
        files.append(&mut self.files);
        files.append(&mut self.finished);

        Compilation {
            files,
            values: self.values.iter().cloned().collect(),
            macros: self.macros.keys().cloned().collect(),
            preprocessor_variables: self.preprocessor_variables.keys().cloned().collect(),
            functions: self.functions.names().cloned().collect(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Statement cursor

    pub fn has_next(&self) -> bool {
        self.peek().is_some()
    }

    pub fn peek(&self) -> Option<&Statement> {
        self.peek_n(0)
    }

    /// Looks `n` statements ahead in the current section
    pub fn peek_n(&self, n: usize) -> Option<&Statement> {
        let frame = self.frames.last()?;
        let index = frame.cursor + n;
        (index < frame.section.end).then(|| &frame.section.statements[index])
    }

    pub fn next(&mut self) -> Option<Statement> {
        let frame = self.frames.last_mut()?;
        if frame.cursor >= frame.section.end {
            return None;
        }
        let statement = frame.section.statements[frame.cursor].clone();
        frame.cursor += 1;
        Some(statement)
    }

    pub fn next_is(&self, predicate: impl FnOnce(&Statement) -> bool) -> bool {
        self.peek().is_some_and(predicate)
    }

    pub fn next_if(&mut self, predicate: impl FnOnce(&Statement) -> bool) -> Option<Statement> {
        if self.next_is(predicate) {
            self.next()
        } else {
            None
        }
    }

    /// Consumes the body of `statement`, either a block or the single next statement
    pub fn next_body(&mut self, statement: &Statement) -> Result<Section> {
        while self
            .next_if(|next| next.kind == StatementKind::Comment)
            .is_some()
        {}

        let expected_body = || {
            statement.error(StatementErrorKind::ExpectedBody {
                directive: statement.keyword().unwrap_or_default().to_string(),
            })
        };
        let frame = self.frames.last_mut().ok_or_else(expected_body)?;
        if frame.cursor >= frame.section.end {
            return Err(expected_body());
        }

        let start = frame.cursor;
        let section = match frame.section.statements[start].kind {
            StatementKind::OpenBlock { statements_inside } => {
                frame.cursor = start + statements_inside + 2;
                frame.section.sub(start + 1, start + 1 + statements_inside)
            }
            StatementKind::CloseBlock { .. } => return Err(expected_body()),
            // A single statement, which takes its own body along
            _ => {
                let end = extent(
                    &self.registry,
                    &frame.section.statements,
                    start,
                    frame.section.end,
                );
                frame.cursor = end;
                frame.section.sub(start, end)
            }
        };
        Ok(section)
    }

    /// Whether the next statement, ignoring comments, is an `else` or `elif`
    pub fn next_is_else_chain(&self) -> bool {
        let mut n = 0;
        while let Some(statement) = self.peek_n(n) {
            match statement.kind {
                StatementKind::Comment => n += 1,
                StatementKind::Directive(id) => {
                    return self.registry.directive(id).chain == Some(Chain::If)
                }
                _ => return false,
            }
        }
        false
    }

    /// Runs every statement of `section`, then continues after the current statement
    pub fn execute_subsection(&mut self, section: Section) -> Result<()> {
        if self.frames.len() >= self.config.max_depth {
            let (span, line) = self.position;
            return Err(CompileError::RecursionLimit {
                depth: self.config.max_depth,
                span,
                line,
            });
        }

        self.frames.push(Frame {
            cursor: section.start,
            section,
        });
        let result = self.run_frame();
        self.frames.pop();
        result
    }

    fn run_frame(&mut self) -> Result<()> {
        while let Some(statement) = self.next() {
            self.run_statement(&statement)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // Statements

    fn run_statement(&mut self, statement: &Statement) -> Result<()> {
        self.position = (statement.span, statement.line);
        trace!(line = statement.line, "{}", statement.source());

        match statement.kind {
            StatementKind::Comment => {
                if let Some(TokenKind::Comment(text)) = statement.tokens.first().map(|t| &t.kind) {
                    self.decorate(text.trim());
                }
                return Ok(());
            }
            StatementKind::Unknown => {
                warn!(
                    line = statement.line,
                    "Statement has no effect: {}",
                    statement.source()
                );
                self.clear_chains(None);
                return Ok(());
            }
            _ => {}
        }

        let mark = self.temps.mark();
        let result = match statement.kind {
            StatementKind::Directive(id) => self.run_directive(id, statement),
            StatementKind::Operation => {
                self.clear_chains(None);
                let statement = resolve(self, statement)?;
                run_operation(self, &statement)
            }
            StatementKind::FunctionCall => {
                self.clear_chains(None);
                let statement = resolve(self, statement)?;
                self.run_call(&statement)
            }
            // Blocks which don't belong to a directive only group statements
            StatementKind::OpenBlock { .. } | StatementKind::CloseBlock { .. } => {
                self.clear_chains(None);
                Ok(())
            }
            StatementKind::Comment | StatementKind::Unknown => Ok(()),
        };
        self.temps.release(mark);
        result
    }

    fn run_directive(&mut self, id: DirectiveId, statement: &Statement) -> Result<()> {
        let registry = Rc::clone(&self.registry);
        let directive = registry.directive(id);
        self.clear_chains(directive.chain);

        let mut statement = if directive.resolve {
            resolve(self, statement)?
        } else {
            statement.clone()
        };
        if directive.squash {
            let arguments = squash(self, &statement, statement.arguments().to_vec())?;
            statement.tokens.truncate(1);
            statement.tokens.extend(arguments);
        }

        if !directive.patterns.is_empty() {
            match_alternatives(&directive.patterns, statement.arguments()).map_err(|missing| {
                statement.error(StatementErrorKind::MissingArguments {
                    directive: directive.keyword.to_string(),
                    missing: missing.iter().map(ToString::to_string).collect(),
                })
            })?;
        }

        (directive.run)(self, &statement)
    }

    fn run_call(&mut self, statement: &Statement) -> Result<()> {
        match &statement.tokens[0].kind {
            TokenKind::MacroRef(_) => {
                let tokens = squash(self, statement, statement.tokens.clone())?;
                call_macro(self, statement, &tokens)
            }
            TokenKind::FunctionRef(_) => {
                let tokens = squash(self, statement, statement.tokens.clone())?;
                if tokens.len() > 1 {
                    return Err(statement.error(StatementErrorKind::LeftoverTokens {
                        tokens: tokens[1..].iter().map(ToString::to_string).collect(),
                    }));
                }
                Ok(())
            }
            _ => Err(statement.error(StatementErrorKind::UndefinedValue {
                name: statement.tokens[0].to_string(),
            })),
        }
    }

    /// Forgets the records of preceding statements, except the one `continues` refers to
    fn clear_chains(&mut self, continues: Option<Chain>) {
        let level = self.scope_level();
        if continues != Some(Chain::If) {
            self.last_compare[level] = None;
        }
        if continues != Some(Chain::Preprocessor) {
            self.last_if[level] = None;
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Output files

    /// The nesting depth of the current output file, the root file has level 0
    pub fn scope_level(&self) -> usize {
        self.files.len() - 1
    }

    pub fn push_file(&mut self, file: CommandFile) {
        debug!(path = %file.path(), level = self.files.len(), "Entering file");
        self.files.push(file);
        self.last_if.push(None);
        self.last_compare.push(None);
    }

    /// Leaves the current file and returns it
    ///
    /// # Panics
    /// Panics if the current file is the root file.
    pub fn pop_file(&mut self) -> CommandFile {
        let file = match self.files.pop() {
            Some(file) if !self.files.is_empty() => file,
            _ => panic!("Popped the root file"),
        };
        self.last_if.truncate(self.files.len());
        self.last_compare.truncate(self.files.len());
        debug!(path = %file.path(), "Leaving file");
        file
    }

    /// Adds `file` to the output and returns the identifier which calls it
    pub fn finish_file(&mut self, file: CommandFile) -> FunctionIdent {
        debug!(path = %file.path(), commands = file.len(), "Finished file");
        let ident = self.function_ident(file.path());
        self.finished.push(file);
        ident
    }

    pub fn function_ident(&self, path: String) -> FunctionIdent {
        FunctionIdent {
            namespace: self.config.namespace.as_str().into(),
            path,
        }
    }

    fn generated_file(&self, name: String) -> CommandFile {
        CommandFile::new(name, Some(self.config.generated_folder.clone()))
    }

    /// Creates a new file for the body of a branch
    pub fn new_branch_file(&mut self) -> CommandFile {
        let id = self.counters.branch;
        self.counters.branch += 1;
        self.generated_file(format!("branch{id}"))
    }

    /// Creates a new file for the setup commands of a comparison
    pub fn new_setup_file(&mut self) -> CommandFile {
        let id = self.counters.setup;
        self.counters.setup += 1;
        self.generated_file(format!("comparisonSetup{id}"))
    }

    fn current_file_mut(&mut self) -> &mut CommandFile {
        let index = self.files.len() - 1;
        &mut self.files[index]
    }

    /// Adds a command to the current file, prefixed by the prepend buffer
    pub fn add_command(&mut self, command: impl Into<String>) {
        let command = command.into();
        let command = if self.prepend.is_empty() {
            command
        } else {
            let mut prefixed = std::mem::take(&mut self.prepend);
            prefixed.push_str(&command);
            prefixed
        };
        self.current_file_mut().add(command);
    }

    /// Adds a command to the current file and leaves the prepend buffer alone
    pub fn add_command_clean(&mut self, command: impl Into<String>) {
        self.current_file_mut().add(command);
    }

    pub fn emit(&mut self, command: &MinecraftCommand) {
        self.add_command(command.to_string());
    }

    /// Queues text in front of the next command
    pub fn prepend(&mut self, prefix: &str) {
        self.prepend.push_str(prefix);
    }

    /// Adds a command to the top of the root file, which runs before anything else
    pub fn add_top_root(&mut self, command: impl Into<String>) {
        self.files[0].add_top(command);
    }

    /// Adds a comment, if decoration is enabled
    pub fn decorate(&mut self, text: impl fmt::Display) {
        if self.config.decorate {
            self.add_command_clean(format!("# {text}"));
        }
    }

    /// Runs `body` such that it only has an effect if `prefix` passes
    ///
    /// Without a prefix the body runs inline. A body of a single statement which
    /// generates a single command is prefixed directly, everything else is moved into a
    /// branch file that is called with the prefix.
    pub fn run_guarded(&mut self, prefix: Option<&str>, body: Section) -> Result<()> {
        let Some(prefix) = prefix else {
            return self.execute_subsection(body);
        };

        match body.shape(&self.registry) {
            BodyShape::Empty => Ok(()),
            BodyShape::Single => {
                self.push_file(CommandFile::new("capture", None));
                let result = self.execute_subsection(body);
                let mut file = self.pop_file();
                result?;

                // Decorations stay outside of the guard
                let commands = file
                    .commands()
                    .iter()
                    .filter(|command| !command.starts_with("# "))
                    .count();
                match commands {
                    0 | 1 => {
                        for command in file.into_commands() {
                            if command.starts_with("# ") {
                                self.add_command_clean(command);
                            } else {
                                self.prepend(prefix);
                                self.add_command(command);
                            }
                        }
                    }
                    _ => {
                        let branch = self.new_branch_file();
                        file.name = branch.name;
                        file.folder = branch.folder;
                        self.call_guarded(prefix, file);
                    }
                }
                Ok(())
            }
            BodyShape::Multiple => {
                let file = self.new_branch_file();
                self.push_file(file);
                let result = self.execute_subsection(body);
                let file = self.pop_file();
                result?;
                self.call_guarded(prefix, file);
                Ok(())
            }
        }
    }

    fn call_guarded(&mut self, prefix: &str, file: CommandFile) {
        let function = self.finish_file(file);
        self.add_command(format!(
            "{prefix}{}",
            MinecraftCommand::Function { function }
        ));
    }

    // ---------------------------------------------------------------------------------------------
    // Selectors

    /// Enters a new execution context
    ///
    /// An aligned context executes as the entity that runs the commands (`@s`), otherwise
    /// the current selector is inherited.
    pub fn push_selector(&mut self, aligned: bool) {
        let selector = if aligned {
            "@s".into()
        } else {
            self.active_selector().clone()
        };
        self.selectors.push(selector);
    }

    pub fn pop_selector(&mut self) {
        assert!(self.selectors.len() > 1, "Popped the root selector");
        self.selectors.pop();
    }

    pub fn active_selector(&self) -> &SmolStr {
        &self.selectors[self.selectors.len() - 1]
    }

    // ---------------------------------------------------------------------------------------------
    // Records for else chains

    pub fn set_last_if(&mut self, result: Option<bool>) {
        let level = self.scope_level();
        self.last_if[level] = result;
    }

    pub fn take_last_if(&mut self) -> Option<bool> {
        let level = self.scope_level();
        self.last_if[level].take()
    }

    pub fn set_last_compare(&mut self, comparison: Option<PreviousComparison>) {
        let level = self.scope_level();
        self.last_compare[level] = comparison;
    }

    pub fn take_last_compare(&mut self) -> Option<PreviousComparison> {
        let level = self.scope_level();
        self.last_compare[level].take()
    }

    // ---------------------------------------------------------------------------------------------
    // Values

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Declares a value, the objective is created at the top of the root file
    ///
    /// Returns the existing value if a different value with that name exists.
    pub fn define_value(&mut self, value: ScoreboardValue) -> std::result::Result<(), ScoreboardValue> {
        let name = value.name.clone();
        match self.values.define(value) {
            Ok(true) => {
                debug!(%name, "Defined value");
                self.add_top_root(
                    MinecraftCommand::ObjectiveAdd {
                        name,
                        criterion: "dummy".into(),
                    }
                    .to_string(),
                );
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(existing) => Err(existing.clone()),
        }
    }

    fn ensure_temp_objective(&mut self) {
        if !self.temp_objective_added {
            self.temp_objective_added = true;
            self.add_top_root(
                MinecraftCommand::ObjectiveAdd {
                    name: self.config.temp_objective.as_str().into(),
                    criterion: "dummy".into(),
                }
                .to_string(),
            );
        }
    }

    /// A fake player on the objective for temporary values
    pub fn temp_player(&mut self, holder: impl Into<SmolStr>) -> ScoreboardPlayer {
        self.ensure_temp_objective();
        ScoreboardPlayer::new(holder, self.config.temp_objective.as_str())
    }

    /// Allocates a temporary value and returns a token which refers to it
    pub fn alloc_temp(&mut self, at: &Token) -> Token {
        let id = self.temps.alloc();
        let holder = match &self.current_function {
            Some(function) => format!("#{}_tmp{id}", function.name),
            None => format!("#tmp{id}"),
        };
        trace!(%holder, "Allocated temp");
        let player = self.temp_player(holder);
        at.replaced(TokenKind::ValueRef {
            name: player.scoreboard,
            holder: Some(player.player),
        })
    }

    /// Allocates a boolean which remembers the outcome of a comparison
    pub fn alloc_result_store(&mut self) -> ScoreboardPlayer {
        let id = self.counters.result_store;
        self.counters.result_store += 1;
        self.temp_player(format!("#if{id}"))
    }

    /// Whether `token` refers to a temporary value
    pub fn is_temp(&self, token: &Token) -> bool {
        matches!(&token.kind, TokenKind::ValueRef { name, .. } if name.as_str() == self.config.temp_objective)
    }

    /// Returns the score a value token refers to
    pub fn player_of(&self, token: &Token) -> Option<ScoreboardPlayer> {
        let TokenKind::ValueRef { name, holder } = &token.kind else {
            return None;
        };
        if name.as_str() == self.config.temp_objective {
            return Some(ScoreboardPlayer::new(holder.clone()?, name.clone()));
        }

        let value = self.values.get(name)?;
        let player = match (holder, value.scope) {
            (Some(holder), _) => holder.clone(),
            (None, ValueScope::Entity) => self.active_selector().clone(),
            (None, ValueScope::Global) => self.config.global_holder.as_str().into(),
        };
        Some(ScoreboardPlayer::new(player, name.clone()))
    }

    /// Like [`Executor::player_of`], but fails with an error that points at `statement`
    pub fn expect_player(&self, statement: &Statement, token: &Token) -> Result<ScoreboardPlayer> {
        self.player_of(token).ok_or_else(|| {
            statement.error(StatementErrorKind::UndefinedValue {
                name: token.to_string(),
            })
        })
    }

    /// The type of the value `token` refers to, temporaries are integers
    pub fn value_type(&self, token: &Token) -> Option<ValueType> {
        let TokenKind::ValueRef { name, .. } = &token.kind else {
            return None;
        };
        if name.as_str() == self.config.temp_objective {
            return Some(ValueType::Int);
        }
        self.values.get(name).map(|value| value.ty)
    }

    // ---------------------------------------------------------------------------------------------
    // Preprocessor variables, macros and functions

    pub fn preprocessor_variable(&self, name: &str) -> Option<&PreprocessorValue> {
        self.preprocessor_variables.get(name)
    }

    /// Sets a variable and returns its previous value
    pub fn set_preprocessor_variable(
        &mut self,
        name: SmolStr,
        value: PreprocessorValue,
    ) -> Option<PreprocessorValue> {
        trace!(%name, %value, "Set preprocessor variable");
        self.preprocessor_variables.insert(name, value)
    }

    pub fn remove_preprocessor_variable(&mut self, name: &str) -> Option<PreprocessorValue> {
        self.preprocessor_variables.shift_remove(name)
    }

    pub fn define_macro(&mut self, definition: Macro) {
        debug!(name = %definition.name, parameters = definition.parameters.len(), "Defined macro");
        self.macros.insert(definition.name.clone(), definition);
    }

    pub fn macro_named(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    pub fn current_function(&self) -> Option<&FunctionContext> {
        self.current_function.as_ref()
    }

    /// Runs `body` while generating the function `function`
    ///
    /// Temporaries of the function are separate from those of the caller.
    pub fn in_function<T>(
        &mut self,
        function: FunctionContext,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let previous_function = self.current_function.replace(function);
        let previous_temps = std::mem::take(&mut self.temps);
        let result = body(self);
        self.temps = previous_temps;
        self.current_function = previous_function;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use mcc_common::{Code, Config, InputFiles};
    use mcc_error::CompileError;
    use mcc_parser::{assemble, statement::Statement, tokenize};

    use super::{BodyShape, Executor, PreviousComparison, Section};
    use crate::{
        command_file::CommandFile,
        directive::{Directive, Registry},
        feeder::Feeder,
        test_utils::{executor, registry, statements},
    };

    /// Knows `nest`, which runs its body as a subsection
    fn nesting(config: Config) -> (Executor, Vec<Statement>) {
        let mut registry = Registry::default();
        registry.register(
            Directive::new("nest", |executor, statement| {
                let body = executor.next_body(statement)?;
                executor.execute_subsection(body)
            })
            .with_body(),
        );
        registry.register(Directive::new("mc", |executor, statement| {
            let text = Feeder::new(statement).next_text()?;
            executor.add_command(text.as_str());
            Ok(())
        }));
        let registry = Rc::new(registry);

        let mut files = InputFiles::default();
        let id = files.add_input(Code {
            source: "nest\n  nest\n    nest\n      mc \"hi\"".into(),
            path: None,
        });
        let tokens = tokenize(files.get_code_ref(id), &*registry).unwrap();
        (Executor::new(config, registry), assemble(tokens).unwrap())
    }

    #[test]
    fn subsections_resume_the_caller() {
        let mut executor = executor();
        let section = Section::new(statements("mc \"say a\"\nmc \"say b\""));
        executor.execute_subsection(section.clone()).unwrap();
        executor.execute_subsection(section).unwrap();
        assert!(!executor.has_next());

        let compilation = executor.run(Vec::new()).unwrap();
        assert_eq!(
            compilation.root().commands(),
            ["say a", "say b", "say a", "say b"]
        );
    }

    #[test]
    fn depth_is_limited() {
        let config = Config {
            max_depth: 3,
            ..Config::default()
        };
        let (executor, statements) = nesting(config);
        assert!(matches!(
            executor.run(statements),
            Err(CompileError::RecursionLimit { depth: 3, line: 3, .. })
        ));

        let config = Config {
            max_depth: 4,
            ..Config::default()
        };
        let (executor, statements) = nesting(config);
        assert_eq!(executor.run(statements).unwrap().root().commands(), ["hi"]);
    }

    #[test]
    fn bodies_without_braces_own_nested_bodies() {
        let (executor, nested) = nesting(Config::default());
        let section = Section::new(nested);
        assert!(matches!(section.shape(&executor.registry), BodyShape::Single));

        let section = Section::new(statements("mc \"say a\"\n// note\nmc \"say b\""));
        assert!(matches!(section.shape(&registry()), BodyShape::Multiple));
        let section = Section::new(statements("// note"));
        assert!(matches!(section.shape(&registry()), BodyShape::Empty));
    }

    #[test]
    fn prepend_applies_to_the_next_command() {
        let mut executor = executor();
        executor.prepend("execute as @a run ");
        executor.add_command("say a");
        executor.add_command("say b");

        let compilation = executor.run(Vec::new()).unwrap();
        assert_eq!(
            compilation.root().commands(),
            ["execute as @a run say a", "say b"]
        );
    }

    #[test]
    fn records_belong_to_their_scope() {
        let mut executor = executor();
        executor.set_last_if(Some(true));
        executor.push_file(CommandFile::new("inner", None));
        assert_eq!(executor.scope_level(), 1);
        assert_eq!(executor.take_last_if(), None);
        executor.set_last_compare(Some(PreviousComparison::Static(false)));

        executor.pop_file();
        assert_eq!(executor.scope_level(), 0);
        assert_eq!(executor.take_last_compare(), None);
        assert_eq!(executor.take_last_if(), Some(true));
        assert_eq!(executor.take_last_if(), None);
    }

    #[test]
    #[should_panic(expected = "Popped the root file")]
    fn root_file_stays() {
        executor().pop_file();
    }

    #[test]
    fn selectors() {
        let config = Config {
            default_selector: "@a".to_string(),
            ..Config::default()
        };
        let mut executor = Executor::new(config, registry());
        assert_eq!(executor.active_selector(), "@a");
        executor.push_selector(false);
        assert_eq!(executor.active_selector(), "@a");
        executor.push_selector(true);
        assert_eq!(executor.active_selector(), "@s");
        executor.pop_selector();
        executor.pop_selector();
        assert_eq!(executor.active_selector(), "@a");
    }
}
