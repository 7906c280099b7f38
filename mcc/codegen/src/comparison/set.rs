use std::fmt;

use itertools::Itertools;
use mcc_common::SmolStr;
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::{
    statement::Statement,
    token::{CompareOp, Token, TokenKind, TokenType},
};

use super::term::{Comparison, Term};
use crate::{
    commands::{
        ExecuteComponent, MinecraftCommand, MinecraftRange, ScoreboardComparison, ScoreboardPlayer,
    },
    executor::Executor,
    feeder::Feeder,
    ppv::PreprocessorValue,
    values::ValueType,
};

/// Comparisons which all have to pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSet {
    comparisons: Vec<Comparison>,
}

impl ComparisonSet {
    /// Parses terms joined by `and`, each optionally preceded by any amount of `not`
    pub fn parse(executor: &mut Executor, statement: &Statement, tokens: &[Token]) -> Result<Self> {
        let mut feeder = Feeder::over(statement, tokens);
        let mut comparisons = Vec::new();

        loop {
            let mut inverted = false;
            while feeder.next_if(|token| token.kind == TokenKind::Not).is_some() {
                inverted = !inverted;
            }

            let mut comparison = Comparison::new(parse_term(executor, statement, &mut feeder)?);
            comparison.set_inversion(inverted);
            comparisons.push(comparison);

            match feeder.peek().map(|token| &token.kind) {
                Some(TokenKind::And) => {
                    feeder.next()?;
                }
                Some(TokenKind::Or) => {
                    return Err(statement.error(StatementErrorKind::InvalidComparison {
                        got: "or".to_string(),
                    }))
                }
                _ => break,
            }
        }
        feeder.expect_end()?;

        Ok(ComparisonSet { comparisons })
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    /// Evaluates the terms that are known at compile time
    ///
    /// Returns the outcome if it does not depend on any runtime term, otherwise the static
    /// terms are removed.
    pub fn fold(&mut self) -> Option<bool> {
        if self
            .comparisons
            .iter()
            .any(|comparison| comparison.static_value() == Some(false))
        {
            return Some(false);
        }
        self.comparisons
            .retain(|comparison| comparison.static_value().is_none());
        self.comparisons.is_empty().then_some(true)
    }

    pub fn setup(&self) -> Vec<MinecraftCommand> {
        self.comparisons
            .iter()
            .filter_map(Comparison::setup)
            .collect()
    }

    pub fn fragments(&self) -> Vec<ExecuteComponent> {
        self.comparisons
            .iter()
            .filter_map(Comparison::fragment)
            .collect()
    }
}

impl fmt::Display for ComparisonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.comparisons.iter().format(" and "))
    }
}

fn parse_term(executor: &mut Executor, statement: &Statement, feeder: &mut Feeder) -> Result<Term> {
    let token = feeder.next()?;
    let term = match &token.kind {
        TokenKind::Selector(selector) => Term::Entity {
            selector: selector.to_string().into(),
        },
        TokenKind::Identifier(word) if word == "any" => Term::Entity {
            selector: feeder.next_selector()?.to_string().into(),
        },
        TokenKind::Identifier(word) if word == "count" => {
            let selector = feeder.next_selector()?.to_string().into();
            let (range, negated) = parse_range(statement, feeder)?;
            let temp = executor.alloc_temp(token);
            let store = executor.expect_player(statement, &temp)?;
            Term::Count {
                selector,
                store,
                range,
                negated,
            }
        }
        TokenKind::Identifier(word) if word == "block" => Term::Block {
            position: position(feeder)?,
            block: feeder.next_text()?,
        },
        TokenKind::Identifier(word) if word == "blocks" => Term::Blocks {
            begin: position(feeder)?,
            end: position(feeder)?,
            destination: position(feeder)?,
            mode: feeder
                .next_enum_if("BlocksMode")
                .unwrap_or_else(|| "all".into()),
        },
        _ => match feeder.peek().map(|next| &next.kind) {
            Some(TokenKind::Compare(op)) => {
                let op = *op;
                feeder.next()?;
                let rhs = feeder.next()?;
                compare(executor, statement, token, op, rhs)?
            }
            _ => bare(executor, statement, token)?,
        },
    };
    Ok(term)
}

/// Reads three coordinates
fn position(feeder: &mut Feeder) -> Result<SmolStr> {
    let coordinates = (0..3)
        .map(|_| feeder.next_as(TokenType::Coordinate))
        .collect::<Result<Vec<_>>>()?;
    Ok(coordinates.iter().join(" ").into())
}

/// Reads `<operator> <integer>` or a range literal
fn parse_range(statement: &Statement, feeder: &mut Feeder) -> Result<(MinecraftRange, bool)> {
    if let Some(TokenKind::Range(range)) = feeder.next_if_type(TokenType::Range).map(|t| t.kind) {
        return Ok((
            MinecraftRange::Range {
                from: range.min,
                to: range.max,
            },
            false,
        ));
    }
    let operator = feeder.next()?;
    let TokenKind::Compare(op) = operator.kind else {
        return Err(statement.error(StatementErrorKind::InvalidComparison {
            got: operator.to_string(),
        }));
    };
    let value = feeder.next_integer()?;
    Ok(MinecraftRange::from_operator(value, op.into()))
}

/// A single value or literal without an operator
fn bare(executor: &Executor, statement: &Statement, token: &Token) -> Result<Term> {
    if let Some(player) = executor.player_of(token) {
        let term = match executor.value_type(token) {
            Some(ValueType::Bool) => Term::Range {
                player,
                range: MinecraftRange::Equal(1),
                negated: false,
            },
            _ => Term::Range {
                player,
                range: MinecraftRange::Equal(0),
                negated: true,
            },
        };
        return Ok(term);
    }

    match &token.kind {
        TokenKind::Identifier(name) => Err(statement.error(StatementErrorKind::UndefinedValue {
            name: name.to_string(),
        })),
        _ if is_literal(token) => {
            let value = PreprocessorValue::from_token(token).map_err(|kind| statement.error(kind))?;
            Ok(Term::Static(value.truthy()))
        }
        _ => Err(statement.error(StatementErrorKind::InvalidComparison {
            got: token.to_string(),
        })),
    }
}

/// Whether `token` is a literal which can be compared at compile time
fn is_literal(token: &Token) -> bool {
    let ty = token.token_type();
    ty.is_assignable_to(TokenType::Number) || matches!(ty, TokenType::Bool | TokenType::String)
}

/// Builds the term for `lhs op rhs`
fn compare(
    executor: &Executor,
    statement: &Statement,
    lhs: &Token,
    op: CompareOp,
    rhs: &Token,
) -> Result<Term> {
    let invalid = || {
        statement.error(StatementErrorKind::InvalidComparison {
            got: format!("{lhs} {} {rhs}", op.symbol()),
        })
    };

    if is_literal(lhs) && is_literal(rhs) {
        let lhs = PreprocessorValue::from_token(lhs).map_err(|kind| statement.error(kind))?;
        let rhs = PreprocessorValue::from_token(rhs).map_err(|kind| statement.error(kind))?;
        let value = lhs.compare(op, &rhs).map_err(|kind| statement.error(kind))?;
        return Ok(Term::Static(value));
    }

    let comparison = ScoreboardComparison::from(op);
    match (executor.player_of(lhs), executor.player_of(rhs)) {
        (Some(lhs), Some(rhs)) => Ok(Term::Scores {
            lhs,
            comparison,
            rhs,
        }),
        (Some(player), None) => constant_term(player, comparison, rhs).ok_or_else(invalid),
        // Constants go to the right side
        (None, Some(player)) => {
            constant_term(player, comparison.flip_sides(), lhs).ok_or_else(invalid)
        }
        (None, None) => Err(invalid()),
    }
}

fn constant_term(
    player: ScoreboardPlayer,
    comparison: ScoreboardComparison,
    constant: &Token,
) -> Option<Term> {
    if let TokenKind::Range(range) = constant.kind {
        let negated = match comparison {
            ScoreboardComparison::Equal => false,
            ScoreboardComparison::NotEqual => true,
            _ => return None,
        };
        return Some(Term::Range {
            player,
            range: MinecraftRange::Range {
                from: range.min,
                to: range.max,
            },
            negated,
        });
    }

    let value = constant.as_integer()?;
    let (range, negated) = MinecraftRange::from_operator(value, comparison);
    Some(Term::Range {
        player,
        range,
        negated,
    })
}

#[cfg(test)]
mod tests {
    use mcc_error::{CompileError, StatementErrorKind};

    use super::ComparisonSet;
    use crate::{
        test_utils::{define_entity, executor, statements},
        values::ValueType,
    };

    fn parse(input: &str) -> Result<ComparisonSet, CompileError> {
        let mut executor = executor();
        define_entity(&mut executor, "score", ValueType::Int);
        define_entity(&mut executor, "flag", ValueType::Bool);
        let statement = crate::resolve::resolve(&executor, &statements(input)[0])?;
        ComparisonSet::parse(&mut executor, &statement, statement.arguments())
    }

    fn fragments(input: &str) -> Vec<String> {
        let set = parse(input).unwrap();
        set.fragments().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn constants_move_to_the_right() {
        assert_eq!(
            fragments("mc 5 < score and not flag"),
            vec![
                "if score @s score matches 6..",
                "unless score @s flag matches 1"
            ]
        );
        assert_eq!(
            fragments("mc score != 2 and score == 1..4"),
            vec![
                "unless score @s score matches 2",
                "if score @s score matches 1..4"
            ]
        );
        assert_eq!(
            fragments("mc score >= flag and score"),
            vec![
                "if score @s score >= @s flag",
                "unless score @s score matches 0"
            ]
        );
    }

    #[test]
    fn entity_terms() {
        assert_eq!(
            fragments("mc any @e[type=cow] and not @a and block ~ ~-1 ~ \"stone\""),
            vec![
                "if entity @e[type=cow]",
                "unless entity @a",
                "if block ~ ~-1 ~ stone"
            ]
        );
        let set = parse("mc count @e > 3").unwrap();
        assert_eq!(
            set.setup()[0].to_string(),
            "execute store result score #tmp0 mcc_temp if entity @e"
        );
        assert_eq!(set.to_string(), "count @e in 4..");
    }

    #[test]
    fn literals_fold() {
        let mut set = parse("mc 1 == 2 and score").unwrap();
        assert_eq!(set.fold(), Some(false));
        let mut set = parse("mc not false and \"a\" == \"a\" and score > 1").unwrap();
        assert_eq!(set.fold(), None);
        assert_eq!(set.comparisons().len(), 1);
        let mut set = parse("mc not false").unwrap();
        assert_eq!(set.fold(), Some(true));
    }

    #[test]
    fn rejects_or() {
        let error = parse("mc score or flag").unwrap_err();
        assert!(matches!(
            error,
            CompileError::Statement(error)
                if matches!(error.kind, StatementErrorKind::InvalidComparison { .. })
        ));
    }
}
