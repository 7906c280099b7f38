//! User defined functions, native functions and overload resolution
use std::fmt;

use itertools::Itertools;
use mcc_common::{FxIndexMap, SmolStr};
use mcc_error::StatementErrorKind;
use mcc_parser::{
    token::{Token, TokenType},
    type_pattern::{Slot, TypePattern},
};

use crate::{directive::NativeFn, values::ValueType};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: SmolStr,
    pub ty: ValueType,
    /// The literal that is used if the argument is omitted
    pub default: Option<Token>,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub enum OverloadKind {
    /// A function with its own output file
    User {
        /// The path of the output file
        path: String,
        /// The fake player that receives the return value
        return_holder: SmolStr,
    },
    Native(NativeFn),
}

impl fmt::Debug for OverloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverloadKind::User {
                path,
                return_holder,
            } => f
                .debug_struct("User")
                .field("path", path)
                .field("return_holder", return_holder)
                .finish(),
            OverloadKind::Native(_) => f.write_str("Native"),
        }
    }
}

/// One signature of a function
#[derive(Debug, Clone)]
pub struct Overload {
    pub name: SmolStr,
    pub parameters: Vec<Parameter>,
    pub kind: OverloadKind,
}

impl Overload {
    /// The shape a call must have, independent of the argument types
    fn shape(&self) -> TypePattern {
        self.parameters
            .iter()
            .fold(TypePattern::new(), |pattern, parameter| {
                if parameter.default.is_some() {
                    pattern.optional(TokenType::Any, parameter.name.clone())
                } else {
                    pattern.required(TokenType::Any, parameter.name.clone())
                }
            })
    }

    /// Scores how well `arguments` fit, `None` if they don't fit at all
    fn score(
        &self,
        arguments: &[Token],
        value_type: &impl Fn(&Token) -> Option<ValueType>,
    ) -> Option<u32> {
        if arguments.len() > self.parameters.len() || !self.shape().check(arguments).matched {
            return None;
        }

        let mut score = 0;
        for (argument, parameter) in arguments.iter().zip(&self.parameters) {
            score += match value_type(argument) {
                Some(ty) if ty == parameter.ty => 3,
                // Scoreboard values can always be copied into each other
                Some(_) => 1,
                None => Slot {
                    constraint: parameter.ty.token_type(),
                    optional: false,
                    name: parameter.name.clone(),
                }
                .score(argument)?,
            };
        }
        Some(score)
    }
}

impl fmt::Display for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameters.iter().join(", "))
    }
}

/// Every function that can be called, by name
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: FxIndexMap<SmolStr, Vec<Overload>>,
}

impl FunctionRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn overloads(&self, name: &str) -> &[Overload] {
        self.functions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Adds an overload and returns how many overloads of that name existed before
    pub fn define(&mut self, overload: Overload) -> usize {
        let overloads = self.functions.entry(overload.name.clone()).or_default();
        overloads.push(overload);
        overloads.len() - 1
    }

    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.functions.keys()
    }

    /// Selects the overload of `name` that fits `arguments` best
    ///
    /// `value_type` returns the type of arguments that refer to scoreboard values.
    pub fn resolve(
        &self,
        name: &str,
        arguments: &[Token],
        value_type: impl Fn(&Token) -> Option<ValueType>,
    ) -> Result<&Overload, StatementErrorKind> {
        let overloads = self.overloads(name);
        let scored = overloads
            .iter()
            .filter_map(|overload| Some((overload.score(arguments, &value_type)?, overload)))
            .collect_vec();

        let Some(best) = scored.iter().map(|(score, _)| *score).max() else {
            return Err(StatementErrorKind::UnresolvedOverload {
                function: name.to_string(),
                arguments: arguments.iter().map(ToString::to_string).collect(),
                expected: overloads.iter().map(ToString::to_string).collect(),
            });
        };

        let mut winners = scored.into_iter().filter(|(score, _)| *score == best);
        let (_, winner) = winners.next().ok_or(StatementErrorKind::AmbiguousOverload {
            function: name.to_string(),
            candidates: 0,
        })?;
        let others = winners.count();
        if others > 0 {
            return Err(StatementErrorKind::AmbiguousOverload {
                function: name.to_string(),
                candidates: others + 1,
            });
        }
        Ok(winner)
    }
}
