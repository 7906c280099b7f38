//! Directives, enum constants and native functions known to the compiler
use std::fmt;

use mcc_common::SmolStr;
use mcc_error::Result;
use mcc_parser::{
    statement::Statement,
    token::{DirectiveId, EnumConstant, Token},
    type_pattern::TypePattern,
    Keywords,
};
use rustc_hash::FxHashMap;

use crate::{executor::Executor, functions::Parameter};

/// The behaviour of a directive
pub type DirectiveFn = fn(&mut Executor, &Statement) -> Result<()>;

/// A function that is implemented by the compiler itself
pub type NativeFn = fn(&mut Executor, &Statement, &[Token]) -> Result<Token>;

/// Which record of a preceding statement a directive continues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// `else` and `elif`, continue a runtime `if`
    If,
    /// `$else`, continues a `$if`
    Preprocessor,
}

/// A registered keyword with its argument shapes and behaviour
#[derive(Clone)]
pub struct Directive {
    pub keyword: SmolStr,
    /// Alternative argument shapes, an empty list accepts anything
    pub patterns: Vec<TypePattern>,
    pub run: DirectiveFn,
    /// Whether identifiers and preprocessor variables are resolved before running
    pub resolve: bool,
    /// Whether expressions are squashed before running
    pub squash: bool,
    pub chain: Option<Chain>,
    /// Whether the directive owns the following block or brace-less statement
    pub takes_body: bool,
}

impl Directive {
    pub fn new(keyword: &str, run: DirectiveFn) -> Self {
        Directive {
            keyword: keyword.into(),
            patterns: Vec::new(),
            run,
            resolve: true,
            squash: true,
            chain: None,
            takes_body: false,
        }
    }

    pub fn pattern(mut self, pattern: TypePattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Keeps the tokens exactly as written, which also disables squashing
    pub fn dont_resolve(mut self) -> Self {
        self.resolve = false;
        self.squash = false;
        self
    }

    pub fn dont_squash(mut self) -> Self {
        self.squash = false;
        self
    }

    pub fn continues(mut self, chain: Chain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_body(mut self) -> Self {
        self.takes_body = true;
        self
    }
}

/// A function implemented by the compiler, like `min`
#[derive(Clone)]
pub struct NativeFunction {
    pub name: SmolStr,
    pub parameters: Vec<Parameter>,
    pub run: NativeFn,
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("keyword", &self.keyword)
            .field("patterns", &self.patterns)
            .field("resolve", &self.resolve)
            .field("squash", &self.squash)
            .field("chain", &self.chain)
            .field("takes_body", &self.takes_body)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Every directive, enum and native function a compilation can use
#[derive(Debug, Default)]
pub struct Registry {
    directives: Vec<Directive>,
    /// Maps lowercase keywords to directives
    keywords: FxHashMap<SmolStr, DirectiveId>,
    enum_constants: FxHashMap<SmolStr, EnumConstant>,
    natives: Vec<NativeFunction>,
}

impl Registry {
    /// Registers a directive, a later directive with the same keyword replaces the earlier one
    pub fn register(&mut self, directive: Directive) -> DirectiveId {
        let id = DirectiveId(self.directives.len());
        self.keywords
            .insert(directive.keyword.to_lowercase().into(), id);
        self.directives.push(directive);
        id
    }

    pub fn register_enum(&mut self, enum_name: &str, values: &[&str]) {
        for value in values {
            self.enum_constants.insert(
                (*value).into(),
                EnumConstant {
                    enum_name: enum_name.into(),
                    value: (*value).into(),
                },
            );
        }
    }

    pub fn register_native(&mut self, function: NativeFunction) {
        self.natives.push(function);
    }

    pub fn directive(&self, id: DirectiveId) -> &Directive {
        &self.directives[id.0]
    }

    pub fn find(&self, keyword: &str) -> Option<&Directive> {
        let id = self.directive_id(keyword)?;
        Some(self.directive(id))
    }

    fn directive_id(&self, keyword: &str) -> Option<DirectiveId> {
        if let Some(id) = self.keywords.get(keyword) {
            return Some(*id);
        }
        self.keywords.get(keyword.to_lowercase().as_str()).copied()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn natives(&self) -> &[NativeFunction] {
        &self.natives
    }
}

impl Keywords for Registry {
    fn directive(&self, keyword: &str) -> Option<DirectiveId> {
        self.directive_id(keyword)
    }

    fn enum_constant(&self, word: &str) -> Option<EnumConstant> {
        self.enum_constants.get(word).cloned()
    }
}

#[cfg(test)]
mod tests {
    use mcc_parser::Keywords;

    use super::{Directive, Registry};

    #[test]
    fn keywords_are_case_insensitive() {
        let mut registry = Registry::default();
        let id = registry.register(Directive::new("$var", |_, _| Ok(())));
        assert_eq!(Keywords::directive(&registry, "$VAR"), Some(id));
        assert_eq!(Keywords::directive(&registry, "$var"), Some(id));
        assert!(registry.find("var").is_none());
        assert_eq!(registry.directive(id).keyword, "$var");
    }

    #[test]
    fn enum_constants() {
        let mut registry = Registry::default();
        registry.register_enum("GameMode", &["survival", "creative"]);
        let constant = registry.enum_constant("creative").unwrap();
        assert_eq!(constant.enum_name, "GameMode");
        assert!(registry.enum_constant("Creative").is_none());
    }
}
