//! Scoreboard values declared by the program and the temporary value allocator
use std::fmt;

use mcc_common::{FxIndexMap, SmolStr};
use mcc_parser::token::TokenType;

/// The type of a declared scoreboard value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Bool,
    /// An integer which counts game ticks
    Time,
}

impl ValueType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "int" => ValueType::Int,
            "bool" => ValueType::Bool,
            "time" => ValueType::Time,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Time => "time",
        }
    }

    /// The literal type that fits into a value of this type without conversion
    pub fn token_type(self) -> TokenType {
        match self {
            ValueType::Int | ValueType::Time => TokenType::Integer,
            ValueType::Bool => TokenType::Bool,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who holds the score of a value by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueScope {
    /// Every entity has its own score, the active selector is used
    Entity,
    /// A single fake player holds the score
    Global,
}

/// A value declared with `define`, backed by an objective of the same name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardValue {
    pub name: SmolStr,
    pub ty: ValueType,
    pub scope: ValueScope,
}

impl fmt::Display for ScoreboardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            ValueScope::Entity => write!(f, "{} {}", self.ty, self.name),
            ValueScope::Global => write!(f, "global {} {}", self.ty, self.name),
        }
    }
}

/// All values that were declared so far, in declaration order
#[derive(Debug, Default)]
pub struct ValueTable {
    values: FxIndexMap<SmolStr, ScoreboardValue>,
}

impl ValueTable {
    /// Declares a new value
    ///
    /// Declaring the exact same value again is allowed and returns `Ok(false)`,
    /// a conflicting declaration returns the existing value.
    pub fn define(&mut self, value: ScoreboardValue) -> Result<bool, &ScoreboardValue> {
        // Two lookups, because returning the borrow from `get` conflicts with the insert
        if self.values.contains_key(&value.name) {
            let existing = &self.values[&value.name];
            return if *existing == value {
                Ok(false)
            } else {
                Err(existing)
            };
        }
        self.values.insert(value.name.clone(), value);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&ScoreboardValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreboardValue> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Hands out temporary values like registers
///
/// Temporaries are numbered, a [`Temps::mark`] remembers the current allocation state and
/// [`Temps::release`] frees everything allocated since then.
#[derive(Debug, Default, Clone)]
pub struct Temps {
    next: usize,
    /// The highest amount of temps that were alive at once
    peak: usize,
}

impl Temps {
    pub fn alloc(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        self.peak = self.peak.max(self.next);
        id
    }

    pub fn mark(&self) -> usize {
        self.next
    }

    pub fn release(&mut self, mark: usize) {
        debug_assert!(mark <= self.next, "Released temps that were never allocated");
        self.next = mark;
    }

    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreboardValue, Temps, ValueScope, ValueTable, ValueType};

    fn value(name: &str, ty: ValueType) -> ScoreboardValue {
        ScoreboardValue {
            name: name.into(),
            ty,
            scope: ValueScope::Entity,
        }
    }

    #[test]
    fn redefinition() {
        let mut table = ValueTable::default();
        assert_eq!(table.define(value("x", ValueType::Int)), Ok(true));
        assert_eq!(table.define(value("x", ValueType::Int)), Ok(false));
        assert_eq!(
            table.define(value("x", ValueType::Bool)),
            Err(&value("x", ValueType::Int))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn temps_are_reused_after_release() {
        let mut temps = Temps::default();
        assert_eq!(temps.alloc(), 0);
        let mark = temps.mark();
        assert_eq!(temps.alloc(), 1);
        assert_eq!(temps.alloc(), 2);
        temps.release(mark);
        assert_eq!(temps.alloc(), 1);
        assert_eq!(temps.peak(), 3);
    }

    #[test]
    fn display() {
        let mut global = value("points", ValueType::Time);
        global.scope = ValueScope::Global;
        assert_eq!(global.to_string(), "global time points");
        assert_eq!(value("x", ValueType::Bool).to_string(), "bool x");
    }
}
