use std::fmt;

use mcc_common::SmolStr;

use crate::commands::{ExecuteComponent, MinecraftCommand, MinecraftRange, ScoreboardComparison, ScoreboardPlayer};

/// A single test of a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// The outcome is known at compile time
    Static(bool),
    /// A score lies in a range, `negated` if the range describes the failing scores
    Range {
        player: ScoreboardPlayer,
        range: MinecraftRange,
        negated: bool,
    },
    /// Two scores compared with each other
    Scores {
        lhs: ScoreboardPlayer,
        comparison: ScoreboardComparison,
        rhs: ScoreboardPlayer,
    },
    /// At least one entity matches
    Entity { selector: SmolStr },
    /// The amount of matching entities, counted into `store` before the test
    Count {
        selector: SmolStr,
        store: ScoreboardPlayer,
        range: MinecraftRange,
        negated: bool,
    },
    Block { position: SmolStr, block: SmolStr },
    Blocks {
        begin: SmolStr,
        end: SmolStr,
        destination: SmolStr,
        mode: SmolStr,
    },
}

/// A term which can be inverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub term: Term,
    inverted: bool,
}

impl Comparison {
    pub fn new(term: Term) -> Self {
        Comparison {
            term,
            inverted: false,
        }
    }

    pub fn set_inversion(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The outcome, if it is known at compile time
    pub fn static_value(&self) -> Option<bool> {
        match self.term {
            Term::Static(value) => Some(value != self.inverted),
            _ => None,
        }
    }

    /// Commands which have to run before the fragment is tested
    pub fn setup(&self) -> Option<MinecraftCommand> {
        match &self.term {
            Term::Count {
                selector, store, ..
            } => Some(MinecraftCommand::raw(format!(
                "execute store result score {store} if entity {selector}"
            ))),
            _ => None,
        }
    }

    /// The part of an execute command which tests this comparison, `None` for static terms
    pub fn fragment(&self) -> Option<ExecuteComponent> {
        let inverted = self.inverted;
        let fragment = match &self.term {
            Term::Static(_) => return None,
            Term::Range {
                player,
                range,
                negated,
            } => ExecuteComponent::IfScoreRange {
                player: player.clone(),
                range: *range,
                inverted: inverted != *negated,
            },
            Term::Scores {
                lhs,
                comparison,
                rhs,
            } => ExecuteComponent::IfScore {
                lhs: lhs.clone(),
                comparison: *comparison,
                rhs: rhs.clone(),
                inverted,
            },
            Term::Entity { selector } => ExecuteComponent::IfEntity {
                selector: selector.clone(),
                inverted,
            },
            Term::Count {
                store,
                range,
                negated,
                ..
            } => ExecuteComponent::IfScoreRange {
                player: store.clone(),
                range: *range,
                inverted: inverted != *negated,
            },
            Term::Block { position, block } => ExecuteComponent::IfBlock {
                position: position.clone(),
                block: block.clone(),
                inverted,
            },
            Term::Blocks {
                begin,
                end,
                destination,
                mode,
            } => ExecuteComponent::IfBlocks {
                begin: begin.clone(),
                end: end.clone(),
                destination: destination.clone(),
                mode: mode.clone(),
                inverted,
            },
        };
        Some(fragment)
    }
}

fn describe_range(f: &mut fmt::Formatter<'_>, range: &MinecraftRange, negated: bool) -> fmt::Result {
    match (range, negated) {
        (MinecraftRange::Equal(value), false) => write!(f, "== {value}"),
        (MinecraftRange::Equal(value), true) => write!(f, "!= {value}"),
        (range, false) => write!(f, "in {range}"),
        (range, true) => write!(f, "not in {range}"),
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            f.write_str("not ")?;
        }
        match &self.term {
            Term::Static(value) => write!(f, "{value}"),
            Term::Range {
                player,
                range,
                negated,
            } => {
                write!(f, "{} ", player.scoreboard)?;
                describe_range(f, range, *negated)
            }
            Term::Scores {
                lhs,
                comparison,
                rhs,
            } => write!(
                f,
                "{} {} {}",
                lhs.scoreboard,
                comparison.str_value(),
                rhs.scoreboard
            ),
            Term::Entity { selector } => write!(f, "any {selector}"),
            Term::Count {
                selector,
                range,
                negated,
                ..
            } => {
                write!(f, "count {selector} ")?;
                describe_range(f, range, *negated)
            }
            Term::Block { position, block } => write!(f, "block {position} {block}"),
            Term::Blocks {
                begin,
                end,
                destination,
                ..
            } => write!(f, "blocks {begin} {end} {destination}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Comparison, Term};
    use crate::commands::{MinecraftRange, ScoreboardPlayer};

    #[test]
    fn inversion_is_reversible() {
        let mut comparison = Comparison::new(Term::Range {
            player: ScoreboardPlayer::new("@s", "x"),
            range: MinecraftRange::Equal(3),
            negated: true,
        });
        let fragment = comparison.fragment().unwrap();
        assert_eq!(fragment.to_string(), "unless score @s x matches 3");
        assert_eq!(comparison.to_string(), "x != 3");

        comparison.set_inversion(true);
        assert_eq!(
            comparison.fragment().unwrap().to_string(),
            "if score @s x matches 3"
        );
        comparison.set_inversion(false);
        assert_eq!(comparison.fragment(), Some(fragment));
    }

    #[test]
    fn static_terms() {
        let mut comparison = Comparison::new(Term::Static(true));
        assert_eq!(comparison.static_value(), Some(true));
        assert_eq!(comparison.fragment(), None);
        comparison.set_inversion(true);
        assert_eq!(comparison.static_value(), Some(false));
    }
}
