use std::fmt;

use itertools::Itertools;
use mcc_common::SmolStr;

use crate::token::{ImplicitConversion, Token, TokenType};

/// One position of a [`TypePattern`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub constraint: TokenType,
    pub optional: bool,
    /// The name of this argument, used in diagnostics
    pub name: SmolStr,
}

impl Slot {
    /// Returns how well `token` fits into this slot, or `None` if it does not fit at all
    ///
    /// An exact type match scores 3, a subtype 2 and an implicit conversion 1.
    pub fn score(&self, token: &Token) -> Option<u32> {
        let ty = token.token_type();
        if ty == self.constraint {
            Some(3)
        } else if ty.is_assignable_to(self.constraint) {
            Some(2)
        } else if token
            .conversion_targets()
            .iter()
            .any(|target| target.is_assignable_to(self.constraint))
        {
            Some(1)
        } else {
            None
        }
    }
}

/// The parameter shape of a directive or function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePattern {
    slots: Vec<Slot>,
}

/// The result of checking tokens against a [`TypePattern`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub matched: bool,
    /// The amount of slots which were satisfied before the check stopped
    pub accuracy: usize,
    /// The sum of all slot scores
    pub score: u32,
    /// The names of the required slots that could not be satisfied
    pub missing: Vec<SmolStr>,
    /// For every slot, the index of the token that was bound to it
    pub bindings: Vec<Option<usize>>,
}

impl TypePattern {
    pub fn new() -> Self {
        TypePattern::default()
    }

    pub fn required(mut self, constraint: TokenType, name: impl Into<SmolStr>) -> Self {
        self.slots.push(Slot {
            constraint,
            optional: false,
            name: name.into(),
        });
        self
    }

    pub fn optional(mut self, constraint: TokenType, name: impl Into<SmolStr>) -> Self {
        self.slots.push(Slot {
            constraint,
            optional: true,
            name: name.into(),
        });
        self
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Checks `tokens` against this pattern
    ///
    /// Tokens left over after the last slot do not affect the result.
    pub fn check(&self, tokens: &[Token]) -> PatternMatch {
        let mut token_index = 0;
        let mut accuracy = 0;
        let mut score = 0;
        let mut bindings = Vec::with_capacity(self.slots.len());

        for (slot_index, slot) in self.slots.iter().enumerate() {
            let Some(token) = tokens.get(token_index) else {
                return self.failed_at(slot_index, accuracy, score, bindings);
            };

            match slot.score(token) {
                Some(slot_score) => {
                    accuracy += 1;
                    score += slot_score;
                    bindings.push(Some(token_index));
                    token_index += 1;
                }
                None if slot.optional => bindings.push(None),
                None => return self.failed_at(slot_index, accuracy, score, bindings),
            }
        }

        PatternMatch {
            matched: true,
            accuracy,
            score,
            missing: Vec::new(),
            bindings,
        }
    }

    fn failed_at(
        &self,
        slot_index: usize,
        accuracy: usize,
        score: u32,
        mut bindings: Vec<Option<usize>>,
    ) -> PatternMatch {
        let remaining = &self.slots[slot_index..];
        let missing = remaining
            .iter()
            .filter(|slot| !slot.optional)
            .map(|slot| slot.name.clone())
            .collect_vec();
        bindings.resize(self.slots.len(), None);
        PatternMatch {
            matched: missing.is_empty(),
            accuracy,
            score,
            missing,
            bindings,
        }
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.iter().format_with(" ", |slot, f| {
            if slot.optional {
                f(&format_args!("[{}: {}]", slot.name, slot.constraint))
            } else {
                f(&format_args!("{}: {}", slot.name, slot.constraint))
            }
        });
        write!(f, "{slots}")
    }
}

/// Checks `tokens` against alternative patterns
///
/// Returns the index of the first matching pattern, or the missing arguments of the
/// pattern which came closest.
pub fn match_alternatives(
    patterns: &[TypePattern],
    tokens: &[Token],
) -> Result<usize, Vec<SmolStr>> {
    let mut best: Option<PatternMatch> = None;
    for (index, pattern) in patterns.iter().enumerate() {
        let result = pattern.check(tokens);
        if result.matched {
            return Ok(index);
        }
        if best
            .as_ref()
            .map_or(true, |best| result.accuracy > best.accuracy)
        {
            best = Some(result);
        }
    }
    Err(best.map(|best| best.missing).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use mcc_common::Span;

    use super::{match_alternatives, TypePattern};
    use crate::token::{Selector, SelectorCore, Token, TokenKind, TokenType};

    fn int(value: i64) -> Token {
        Token::new(TokenKind::Integer { value, unit: None }, Span::new(0, 1), 1)
    }

    fn selector() -> Token {
        Token::new(
            TokenKind::Selector(Selector::new(SelectorCore::AllPlayers)),
            Span::new(0, 2),
            1,
        )
    }

    fn tp_pattern() -> TypePattern {
        TypePattern::new()
            .optional(TokenType::Selector, "entity")
            .required(TokenType::Coordinate, "x")
            .required(TokenType::Coordinate, "y")
            .required(TokenType::Coordinate, "z")
    }

    #[test]
    fn optional_slots_can_be_skipped() {
        let pattern = tp_pattern();
        let result = pattern.check(&[int(1), int(2), int(3)]);
        assert!(result.matched);
        assert_eq!(result.bindings, vec![None, Some(0), Some(1), Some(2)]);
        // three implicit conversions
        assert_eq!(result.score, 3);

        let result = pattern.check(&[selector(), int(1), int(2), int(3)]);
        assert!(result.matched);
        assert_eq!(result.accuracy, 4);
    }

    #[test]
    fn missing_arguments_are_reported() {
        let result = tp_pattern().check(&[selector(), int(1)]);
        assert!(!result.matched);
        assert_eq!(result.accuracy, 2);
        assert_eq!(result.missing, vec!["y", "z"]);
    }

    #[test]
    fn leftover_tokens_are_allowed() {
        let pattern = TypePattern::new().required(TokenType::Number, "count");
        assert!(pattern.check(&[int(1), int(2)]).matched);
        assert!(TypePattern::new().check(&[]).matched);
    }

    #[test]
    fn closest_alternative_wins() {
        let patterns = [
            TypePattern::new().required(TokenType::Selector, "target"),
            tp_pattern(),
        ];
        assert_eq!(match_alternatives(&patterns, &[selector()]), Ok(0));
        assert_eq!(
            match_alternatives(&patterns, &[int(1), int(1)]),
            Err(vec!["z".into()])
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            tp_pattern().to_string(),
            "[entity: selector] x: coordinate y: coordinate z: coordinate"
        );
    }
}
