//! Preprocessor values, which only exist at compile time
use std::fmt;

use mcc_common::SmolStr;
use mcc_error::StatementErrorKind;
use mcc_parser::token::{ArithmeticOp, CompareOp, Token, TokenKind};

use crate::commands::ScoreboardOperation;

/// The value of a preprocessor variable
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessorValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(SmolStr),
    Json(serde_json::Value),
}

impl PreprocessorValue {
    /// Reads the value of a literal token
    ///
    /// Identifiers and enum constants are read as their text.
    pub fn from_token(token: &Token) -> Result<Self, StatementErrorKind> {
        let value = match &token.kind {
            TokenKind::Integer { value, .. } => PreprocessorValue::Integer(*value),
            TokenKind::Decimal { value, .. } => PreprocessorValue::Float(*value),
            TokenKind::Bool(value) => PreprocessorValue::Bool(*value),
            TokenKind::String(value) => PreprocessorValue::String(value.clone()),
            TokenKind::EnumConstant(constant) => PreprocessorValue::String(constant.value.clone()),
            TokenKind::Identifier(name)
            | TokenKind::ValueRef { name, holder: None }
            | TokenKind::MacroRef(name)
            | TokenKind::FunctionRef(name) => PreprocessorValue::String(name.clone()),
            _ => {
                return Err(StatementErrorKind::TypeMismatch {
                    expected: vec![
                        "integer".to_string(),
                        "decimal".to_string(),
                        "bool".to_string(),
                        "string".to_string(),
                    ],
                    got: token.to_string(),
                })
            }
        };
        Ok(value)
    }

    /// Creates a literal token of this value at the position of `at`
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_token(&self, at: &Token) -> Token {
        let kind = match self {
            PreprocessorValue::Integer(value) => TokenKind::Integer {
                value: *value,
                unit: None,
            },
            PreprocessorValue::Float(value) => TokenKind::Decimal {
                value: *value,
                unit: None,
            },
            PreprocessorValue::Bool(value) => TokenKind::Bool(*value),
            PreprocessorValue::String(value) => TokenKind::String(value.clone()),
            PreprocessorValue::Json(json) => match json {
                serde_json::Value::Bool(value) => TokenKind::Bool(*value),
                serde_json::Value::Number(number) => match number.as_i64() {
                    Some(value) => TokenKind::Integer { value, unit: None },
                    None => TokenKind::Decimal {
                        value: number.as_f64().unwrap_or_default(),
                        unit: None,
                    },
                },
                serde_json::Value::String(text) => TokenKind::String(text.into()),
                other => TokenKind::String(other.to_string().into()),
            },
        };
        at.replaced(kind)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PreprocessorValue::Integer(_) => "integer",
            PreprocessorValue::Float(_) => "decimal",
            PreprocessorValue::Bool(_) => "bool",
            PreprocessorValue::String(_) => "string",
            PreprocessorValue::Json(_) => "json",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            PreprocessorValue::Integer(value) => *value != 0,
            PreprocessorValue::Float(value) => *value != 0.0,
            PreprocessorValue::Bool(value) => *value,
            PreprocessorValue::String(value) => !value.is_empty(),
            PreprocessorValue::Json(json) => !matches!(
                json,
                serde_json::Value::Null | serde_json::Value::Bool(false)
            ),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_float(&self) -> Option<f64> {
        match self {
            PreprocessorValue::Integer(value) => Some(*value as f64),
            PreprocessorValue::Float(value) => Some(*value),
            PreprocessorValue::Json(json) => json.as_f64(),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            PreprocessorValue::Integer(value) => Some(*value),
            PreprocessorValue::Bool(value) => Some(i64::from(*value)),
            PreprocessorValue::Json(json) => json.as_i64(),
            _ => None,
        }
    }

    fn unsupported(&self, operator: &str, rhs: &Self) -> StatementErrorKind {
        StatementErrorKind::UnsupportedOperation {
            operator: operator.to_string(),
            lhs: self.type_name().to_string(),
            rhs: rhs.type_name().to_string(),
        }
    }

    /// Applies an arithmetic operator
    ///
    /// Integers use the same floored division as the game, a mixed operation produces a float.
    pub fn apply(&self, op: ArithmeticOp, rhs: &Self) -> Result<Self, StatementErrorKind> {
        use PreprocessorValue::*;

        match (self, rhs) {
            (String(lhs), String(rhs)) if op == ArithmeticOp::Add => {
                Ok(String(format!("{lhs}{rhs}").into()))
            }
            (String(lhs), other) | (other, String(lhs))
                if op == ArithmeticOp::Add && !matches!(other, Json(_)) =>
            {
                // Keep the operand order
                let text = if matches!(self, String(_)) {
                    format!("{lhs}{other}")
                } else {
                    format!("{other}{lhs}")
                };
                Ok(String(text.into()))
            }
            _ => {
                if let (Some(lhs_int), Some(rhs_int)) = (self.as_integer(), rhs.as_integer()) {
                    if self.is_integral() && rhs.is_integral() {
                        return integer_op(op, lhs_int, rhs_int);
                    }
                }
                match (self.as_float(), rhs.as_float()) {
                    (Some(lhs), Some(rhs)) => float_op(op, lhs, rhs).map(Float),
                    _ => Err(self.unsupported(op.symbol(), rhs)),
                }
            }
        }
    }

    fn is_integral(&self) -> bool {
        match self {
            PreprocessorValue::Integer(_) | PreprocessorValue::Bool(_) => true,
            PreprocessorValue::Json(json) => json.is_i64(),
            _ => false,
        }
    }

    /// Compares two values
    ///
    /// Numbers compare by value, strings lexicographically, everything else only supports
    /// equality.
    pub fn compare(&self, op: CompareOp, rhs: &Self) -> Result<bool, StatementErrorKind> {
        use std::cmp::Ordering;

        let ordering = match (self, rhs) {
            (PreprocessorValue::String(lhs), PreprocessorValue::String(rhs)) => Some(lhs.cmp(rhs)),
            (PreprocessorValue::Bool(lhs), PreprocessorValue::Bool(rhs)) => Some(lhs.cmp(rhs)),
            _ => match (self.as_float(), rhs.as_float()) {
                (Some(lhs), Some(rhs)) => lhs.partial_cmp(&rhs),
                _ => None,
            },
        };

        let result = match (op, ordering) {
            (CompareOp::Equal, Some(ordering)) => ordering == Ordering::Equal,
            (CompareOp::NotEqual, Some(ordering)) => ordering != Ordering::Equal,
            (CompareOp::Less, Some(ordering)) => ordering == Ordering::Less,
            (CompareOp::LessOrEqual, Some(ordering)) => ordering != Ordering::Greater,
            (CompareOp::Greater, Some(ordering)) => ordering == Ordering::Greater,
            (CompareOp::GreaterOrEqual, Some(ordering)) => ordering != Ordering::Less,
            (CompareOp::Equal, None) => self == rhs,
            (CompareOp::NotEqual, None) => self != rhs,
            (_, None) => return Err(self.unsupported(op.symbol(), rhs)),
        };
        Ok(result)
    }

    /// Indexes into a json array or object, or selects a character of a string
    pub fn index(&self, index: &Self) -> Result<Self, StatementErrorKind> {
        let invalid = || StatementErrorKind::InvalidIndex {
            value: self.to_string(),
            index: index.to_string(),
        };

        match (self, index) {
            (PreprocessorValue::Json(json), PreprocessorValue::Integer(position)) => {
                let position = usize::try_from(*position).map_err(|_| invalid())?;
                json.get(position)
                    .map(|value| PreprocessorValue::Json(value.clone()))
                    .ok_or_else(invalid)
            }
            (PreprocessorValue::Json(json), PreprocessorValue::String(key)) => json
                .get(key.as_str())
                .map(|value| PreprocessorValue::Json(value.clone()))
                .ok_or_else(invalid),
            (PreprocessorValue::String(text), PreprocessorValue::Integer(position)) => {
                let position = usize::try_from(*position).map_err(|_| invalid())?;
                text.chars()
                    .nth(position)
                    .map(|char| PreprocessorValue::String(char.to_string().into()))
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

fn integer_op(op: ArithmeticOp, lhs: i64, rhs: i64) -> Result<PreprocessorValue, StatementErrorKind> {
    if matches!(op, ArithmeticOp::Div | ArithmeticOp::Mod) && rhs == 0 {
        return Err(StatementErrorKind::DivisionByZero);
    }
    let value = ScoreboardOperation::from(op).evaluate(lhs, rhs);
    Ok(PreprocessorValue::Integer(value))
}

fn float_op(op: ArithmeticOp, lhs: f64, rhs: f64) -> Result<f64, StatementErrorKind> {
    if matches!(op, ArithmeticOp::Div | ArithmeticOp::Mod) && rhs == 0.0 {
        return Err(StatementErrorKind::DivisionByZero);
    }
    let value = match op {
        ArithmeticOp::Add => lhs + rhs,
        ArithmeticOp::Sub => lhs - rhs,
        ArithmeticOp::Mul => lhs * rhs,
        ArithmeticOp::Div => lhs / rhs,
        ArithmeticOp::Mod => lhs.rem_euclid(rhs),
    };
    Ok(value)
}

impl fmt::Display for PreprocessorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessorValue::Integer(value) => write!(f, "{value}"),
            PreprocessorValue::Float(value) => write!(f, "{value}"),
            PreprocessorValue::Bool(value) => write!(f, "{value}"),
            PreprocessorValue::String(value) => f.write_str(value),
            PreprocessorValue::Json(serde_json::Value::String(text)) => f.write_str(text),
            PreprocessorValue::Json(json) => write!(f, "{json}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use mcc_error::StatementErrorKind;
    use mcc_parser::token::{ArithmeticOp, CompareOp};

    use super::PreprocessorValue::{self, *};

    fn json(text: &str) -> PreprocessorValue {
        Json(serde_json::from_str(text).unwrap())
    }

    #[test]
    fn integer_arithmetic_is_floored() {
        assert_eq!(Integer(-7).apply(ArithmeticOp::Div, &Integer(2)), Ok(Integer(-4)));
        assert_eq!(Integer(-7).apply(ArithmeticOp::Mod, &Integer(2)), Ok(Integer(1)));
        assert_eq!(
            Integer(1).apply(ArithmeticOp::Div, &Integer(0)),
            Err(StatementErrorKind::DivisionByZero)
        );
        assert_eq!(
            Integer(i64::MIN).apply(ArithmeticOp::Div, &Integer(-1)),
            Ok(Integer(i64::MIN))
        );
        assert_eq!(
            Integer(i64::MIN).apply(ArithmeticOp::Mod, &Integer(-1)),
            Ok(Integer(0))
        );
        assert_eq!(Bool(true).apply(ArithmeticOp::Add, &Integer(2)), Ok(Integer(3)));
    }

    #[test]
    fn mixed_arithmetic() {
        assert_eq!(Integer(1).apply(ArithmeticOp::Add, &Float(0.5)), Ok(Float(1.5)));
        assert_eq!(
            String("a".into()).apply(ArithmeticOp::Add, &Integer(1)),
            Ok(String("a1".into()))
        );
        assert_eq!(
            Integer(1).apply(ArithmeticOp::Add, &String("a".into())),
            Ok(String("1a".into()))
        );
        assert!(matches!(
            String("a".into()).apply(ArithmeticOp::Mul, &Integer(2)),
            Err(StatementErrorKind::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn comparisons() {
        assert_eq!(Integer(1).compare(CompareOp::Less, &Float(1.5)), Ok(true));
        assert_eq!(Integer(2).compare(CompareOp::Equal, &Integer(2)), Ok(true));
        assert_eq!(
            String("b".into()).compare(CompareOp::Greater, &String("a".into())),
            Ok(true)
        );
        assert_eq!(Bool(true).compare(CompareOp::NotEqual, &String("x".into())), Ok(true));
        assert!(Bool(true).compare(CompareOp::Less, &String("x".into())).is_err());
    }

    #[test]
    fn json_indexing() {
        let value = json(r#"{"list": [1, 2.5, "three"]}"#);
        let list = value.index(&String("list".into())).unwrap();
        assert_eq!(list.index(&Integer(0)).unwrap().to_string(), "1");
        assert_eq!(list.index(&Integer(2)).unwrap().to_string(), "three");
        assert!(matches!(
            list.index(&Integer(3)),
            Err(StatementErrorKind::InvalidIndex { .. })
        ));
        assert_eq!(
            String("abc".into()).index(&Integer(1)),
            Ok(String("b".into()))
        );
    }
}
