//! The command text library
//!
//! Everything that ends up in an output file is built from [`MinecraftCommand`]s.
use std::fmt;

use itertools::Itertools;
use mcc_common::SmolStr;
use mcc_parser::token::{ArithmeticOp, CompareOp};

/// A score of a specific player (or entity) on a specific objective
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreboardPlayer {
    pub player: SmolStr,
    pub scoreboard: SmolStr,
}

impl ScoreboardPlayer {
    pub fn new(player: impl Into<SmolStr>, scoreboard: impl Into<SmolStr>) -> Self {
        ScoreboardPlayer {
            player: player.into(),
            scoreboard: scoreboard.into(),
        }
    }
}

impl fmt::Display for ScoreboardPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.player, self.scoreboard)
    }
}

/// Any operation that can be executed between two scores
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ScoreboardOperation {
    Copy,
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Min,
    Max,
}

impl ScoreboardOperation {
    pub fn str_value(&self) -> &'static str {
        use ScoreboardOperation::*;

        match self {
            Copy => "=",
            Plus => "+=",
            Minus => "-=",
            Times => "*=",
            Divide => "/=",
            Modulo => "%=",
            Min => "<",
            Max => ">",
        }
    }

    /// Evaluates this operation the same way the game does
    pub fn evaluate(&self, lhs: i64, rhs: i64) -> i64 {
        use ScoreboardOperation::*;
        match self {
            Copy => rhs,
            Min => i64::min(lhs, rhs),
            Max => i64::max(lhs, rhs),
            Plus => lhs.wrapping_add(rhs),
            Minus => lhs.wrapping_sub(rhs),
            Times => lhs.wrapping_mul(rhs),
            Divide => {
                // The game does not modify the lhs value on division by zero
                if rhs == 0 {
                    lhs
                } else {
                    // Minecraft rounds towards -infinity, while rust rounds towards 0
                    let nat_div = lhs.wrapping_div(rhs);
                    if lhs.wrapping_rem(rhs) != 0 && (lhs >= 0) != (rhs >= 0) {
                        nat_div.wrapping_sub(1)
                    } else {
                        nat_div
                    }
                }
            }
            Modulo => {
                if rhs == 0 {
                    lhs
                } else {
                    // The result has the sign of the divisor
                    let rem = lhs.wrapping_rem(rhs);
                    if rem != 0 && (rem >= 0) != (rhs >= 0) {
                        rem.wrapping_add(rhs)
                    } else {
                        rem
                    }
                }
            }
        }
    }
}

impl From<ArithmeticOp> for ScoreboardOperation {
    fn from(op: ArithmeticOp) -> Self {
        match op {
            ArithmeticOp::Add => ScoreboardOperation::Plus,
            ArithmeticOp::Sub => ScoreboardOperation::Minus,
            ArithmeticOp::Mul => ScoreboardOperation::Times,
            ArithmeticOp::Div => ScoreboardOperation::Divide,
            ArithmeticOp::Mod => ScoreboardOperation::Modulo,
        }
    }
}

/// Any comparison that can be executed on two scoreboard values
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ScoreboardComparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl ScoreboardComparison {
    /// Flips the comparison (converts OP such that `a OP b == b OP.flip_sides() a`)
    pub fn flip_sides(&self) -> ScoreboardComparison {
        use ScoreboardComparison::*;
        match self {
            Equal => Equal,
            NotEqual => NotEqual,
            Greater => Less,
            GreaterOrEqual => LessOrEqual,
            Less => Greater,
            LessOrEqual => GreaterOrEqual,
        }
    }

    /// Inverts the comparison, such that it is exactly and only then true
    /// when the original comparison is false
    pub fn invert(&self) -> ScoreboardComparison {
        use ScoreboardComparison::*;
        match self {
            Equal => NotEqual,
            NotEqual => Equal,
            Greater => LessOrEqual,
            GreaterOrEqual => Less,
            Less => GreaterOrEqual,
            LessOrEqual => Greater,
        }
    }

    pub fn evaluate(&self, lhs: i64, rhs: i64) -> bool {
        use ScoreboardComparison::*;
        match self {
            Equal => lhs == rhs,
            NotEqual => lhs != rhs,
            Greater => lhs > rhs,
            GreaterOrEqual => lhs >= rhs,
            Less => lhs < rhs,
            LessOrEqual => lhs <= rhs,
        }
    }

    pub fn str_value(&self) -> &'static str {
        match self {
            ScoreboardComparison::Equal => "==",
            ScoreboardComparison::NotEqual => "!=",
            ScoreboardComparison::Greater => ">",
            ScoreboardComparison::GreaterOrEqual => ">=",
            ScoreboardComparison::Less => "<",
            ScoreboardComparison::LessOrEqual => "<=",
        }
    }
}

impl From<CompareOp> for ScoreboardComparison {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Equal => ScoreboardComparison::Equal,
            CompareOp::NotEqual => ScoreboardComparison::NotEqual,
            CompareOp::Less => ScoreboardComparison::Less,
            CompareOp::LessOrEqual => ScoreboardComparison::LessOrEqual,
            CompareOp::Greater => ScoreboardComparison::Greater,
            CompareOp::GreaterOrEqual => ScoreboardComparison::GreaterOrEqual,
        }
    }
}

/// An inclusive range of scores, as used by `if score ... matches`
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum MinecraftRange {
    Equal(i64),
    Range { from: Option<i64>, to: Option<i64> },
}

impl MinecraftRange {
    /// Returns the range and whether it has to be tested with `unless`,
    /// such that `score OP value` holds exactly for the matched scores
    pub fn from_operator(value: i64, operator: ScoreboardComparison) -> (Self, bool) {
        use ScoreboardComparison::*;
        let range = |from, to| MinecraftRange::Range { from, to };
        match operator {
            Equal => (MinecraftRange::Equal(value), false),
            NotEqual => (MinecraftRange::Equal(value), true),
            Greater => (range(Some(value.saturating_add(1)), None), false),
            GreaterOrEqual => (range(Some(value), None), false),
            Less => (range(None, Some(value.saturating_sub(1))), false),
            LessOrEqual => (range(None, Some(value)), false),
        }
    }
}

impl fmt::Display for MinecraftRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinecraftRange::Equal(value) => write!(f, "{value}"),
            MinecraftRange::Range { from, to } => {
                if let Some(from) = from {
                    write!(f, "{from}")?;
                }
                f.write_str("..")?;
                if let Some(to) = to {
                    write!(f, "{to}")?;
                }
                Ok(())
            }
        }
    }
}

/// A single subcommand of an `execute` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteComponent {
    As {
        selector: SmolStr,
    },
    At {
        selector: SmolStr,
    },
    IfScoreRange {
        player: ScoreboardPlayer,
        range: MinecraftRange,
        inverted: bool,
    },
    IfScore {
        lhs: ScoreboardPlayer,
        comparison: ScoreboardComparison,
        rhs: ScoreboardPlayer,
        inverted: bool,
    },
    IfEntity {
        selector: SmolStr,
        inverted: bool,
    },
    IfBlock {
        position: SmolStr,
        block: SmolStr,
        inverted: bool,
    },
    IfBlocks {
        begin: SmolStr,
        end: SmolStr,
        destination: SmolStr,
        mode: SmolStr,
        inverted: bool,
    },
}

impl ExecuteComponent {
    pub fn is_condition(&self) -> bool {
        !matches!(
            self,
            ExecuteComponent::As { .. } | ExecuteComponent::At { .. }
        )
    }
}

fn condition_keyword(inverted: bool) -> &'static str {
    if inverted {
        "unless"
    } else {
        "if"
    }
}

impl fmt::Display for ExecuteComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteComponent::As { selector } => write!(f, "as {selector}"),
            ExecuteComponent::At { selector } => write!(f, "at {selector}"),
            ExecuteComponent::IfScoreRange {
                player,
                range,
                inverted,
            } => write!(
                f,
                "{} score {player} matches {range}",
                condition_keyword(*inverted)
            ),
            ExecuteComponent::IfScore {
                lhs,
                comparison,
                rhs,
                inverted,
            } => {
                // There is no `!=` in the game, so test the inverse of `=`
                let (operator, inverted) = match comparison {
                    ScoreboardComparison::Equal => ("=", *inverted),
                    ScoreboardComparison::NotEqual => ("=", !*inverted),
                    other => (other.str_value(), *inverted),
                };
                write!(
                    f,
                    "{} score {lhs} {operator} {rhs}",
                    condition_keyword(inverted)
                )
            }
            ExecuteComponent::IfEntity { selector, inverted } => {
                write!(f, "{} entity {selector}", condition_keyword(*inverted))
            }
            ExecuteComponent::IfBlock {
                position,
                block,
                inverted,
            } => write!(
                f,
                "{} block {position} {block}",
                condition_keyword(*inverted)
            ),
            ExecuteComponent::IfBlocks {
                begin,
                end,
                destination,
                mode,
                inverted,
            } => write!(
                f,
                "{} blocks {begin} {end} {destination} {mode}",
                condition_keyword(*inverted)
            ),
        }
    }
}

/// Identifies a function of a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionIdent {
    pub namespace: SmolStr,
    pub path: String,
}

impl fmt::Display for FunctionIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Enumerates all commands the compiler emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinecraftCommand {
    /// Sets the score to a specific integer
    ScoreboardSet {
        player: ScoreboardPlayer,
        value: i64,
    },
    /// Adds a constant to the score, negative values are removed
    ScoreboardAdd {
        player: ScoreboardPlayer,
        value: i64,
    },
    ScoreboardOperation {
        target: ScoreboardPlayer,
        operation: ScoreboardOperation,
        source: ScoreboardPlayer,
    },
    /// Sets the score to the result of the other command
    ScoreboardSetFromResult {
        player: ScoreboardPlayer,
        command: Box<MinecraftCommand>,
    },
    ObjectiveAdd {
        name: SmolStr,
        criterion: SmolStr,
    },
    Execute {
        parts: Vec<ExecuteComponent>,
        and_then: Option<Box<MinecraftCommand>>,
    },
    /// Calls another function
    Function {
        function: FunctionIdent,
    },
    Comment {
        text: String,
    },
    RawCommand {
        command: String,
    },
}

impl MinecraftCommand {
    pub fn raw(command: impl Into<String>) -> Self {
        MinecraftCommand::RawCommand {
            command: command.into(),
        }
    }
}

impl fmt::Display for MinecraftCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinecraftCommand::ScoreboardSet { player, value } => {
                write!(f, "scoreboard players set {player} {value}")
            }
            MinecraftCommand::ScoreboardAdd { player, value } => {
                if *value < 0 {
                    write!(f, "scoreboard players remove {player} {}", value.unsigned_abs())
                } else {
                    write!(f, "scoreboard players add {player} {value}")
                }
            }
            MinecraftCommand::ScoreboardOperation {
                target,
                operation,
                source,
            } => write!(
                f,
                "scoreboard players operation {target} {} {source}",
                operation.str_value()
            ),
            MinecraftCommand::ScoreboardSetFromResult { player, command } => {
                write!(f, "execute store result score {player} run {command}")
            }
            MinecraftCommand::ObjectiveAdd { name, criterion } => {
                write!(f, "scoreboard objectives add {name} {criterion}")
            }
            MinecraftCommand::Execute { parts, and_then } => {
                write!(f, "execute {}", parts.iter().join(" "))?;
                if let Some(command) = and_then {
                    write!(f, " run {command}")?;
                }
                Ok(())
            }
            MinecraftCommand::Function { function } => write!(f, "function {function}"),
            MinecraftCommand::Comment { text } => write!(f, "# {text}"),
            MinecraftCommand::RawCommand { command } => f.write_str(command),
        }
    }
}

/// Builds the prefix which runs a command only if all `parts` pass
pub fn execute_prefix(parts: &[ExecuteComponent]) -> String {
    format!("execute {} run ", parts.iter().join(" "))
}
