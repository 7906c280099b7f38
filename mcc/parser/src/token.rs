use core::fmt;

use mcc_common::{SmolStr, Span};

/// A single lexical unit of a source file
///
/// Tokens are immutable. Resolution does not change a token, it replaces it with a new one
/// which keeps the span and line of the original.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub span: Span,
    /// The 1-based line at which this token starts
    pub line: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, line: usize) -> Self {
        Token { span, line, kind }
    }

    /// Creates a token of `kind` at the same position as this token
    pub fn replaced(&self, kind: TokenKind) -> Self {
        Token {
            span: self.span,
            line: self.line,
            kind,
        }
    }

    pub fn token_type(&self) -> TokenType {
        self.kind.token_type()
    }

    /// Returns whether this token can stand on either side of a binary operator
    pub fn is_operand(&self) -> bool {
        matches!(
            self.token_type().category(),
            TokenType::Literal | TokenType::Identifier
        ) || matches!(
            self.kind,
            TokenKind::CloseParen | TokenKind::Indexer(_) | TokenKind::UnresolvedPpv(_)
        )
    }

    /// Converts this token into a token which is assignable to `target`,
    /// either because it already is or through an implicit conversion.
    pub fn coerce(&self, target: TokenType) -> Option<Token> {
        if self.token_type().is_assignable_to(target) {
            return Some(self.clone());
        }
        let index = self
            .conversion_targets()
            .iter()
            .position(|ty| ty.is_assignable_to(target))?;
        self.convert_to(index)
    }

    /// Returns the integer value of this token, converting implicitly if needed
    pub fn as_integer(&self) -> Option<i64> {
        match self.coerce(TokenType::Integer)?.kind {
            TokenKind::Integer { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the text of this token if it is string-like
    pub fn as_text(&self) -> Option<SmolStr> {
        match self.coerce(TokenType::String)?.kind {
            TokenKind::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the name if this token is an identifier of any kind
    pub fn as_identifier(&self) -> Option<&SmolStr> {
        match &self.kind {
            TokenKind::Identifier(name)
            | TokenKind::ValueRef { name, .. }
            | TokenKind::MacroRef(name)
            | TokenKind::FunctionRef(name) => Some(name),
            TokenKind::EnumConstant(constant) => Some(&constant.value),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    Newline,
    Comment(SmolStr),

    Integer { value: i64, unit: Option<Unit> },
    Decimal { value: f64, unit: Option<Unit> },
    String(SmolStr),
    Bool(bool),
    Coordinate(Coordinate),
    Selector(Selector),
    Range(Range),
    EnumConstant(EnumConstant),

    Identifier(SmolStr),
    /// A reference to a defined scoreboard value, optionally evaluated for another holder
    ValueRef {
        name: SmolStr,
        holder: Option<SmolStr>,
    },
    MacroRef(SmolStr),
    FunctionRef(SmolStr),
    /// `name:`
    BuilderField(SmolStr),
    /// `$name`, replaced by the value of the preprocessor variable before execution
    UnresolvedPpv(SmolStr),

    Directive {
        id: DirectiveId,
        keyword: SmolStr,
    },

    OpenParen,
    CloseParen,
    OpenBlock,
    CloseBlock,
    Comma,

    Arithmetic(ArithmeticOp),
    Compare(CompareOp),
    Assign(AssignOp),
    And,
    Or,
    Not,

    /// `[...]`, the contents are always exactly one token
    Indexer(Box<Token>),
}

impl TokenKind {
    pub fn token_type(&self) -> TokenType {
        match self {
            TokenKind::Newline => TokenType::Newline,
            TokenKind::Comment(_) => TokenType::Comment,
            TokenKind::Integer { .. } => TokenType::Integer,
            TokenKind::Decimal { .. } => TokenType::Decimal,
            TokenKind::String(_) => TokenType::String,
            TokenKind::Bool(_) => TokenType::Bool,
            TokenKind::Coordinate(_) => TokenType::Coordinate,
            TokenKind::Selector(_) => TokenType::Selector,
            TokenKind::Range(_) => TokenType::Range,
            TokenKind::EnumConstant(_) => TokenType::EnumConstant,
            TokenKind::Identifier(_) => TokenType::Identifier,
            TokenKind::ValueRef { .. } => TokenType::ValueRef,
            TokenKind::MacroRef(_) => TokenType::MacroRef,
            TokenKind::FunctionRef(_) => TokenType::FunctionRef,
            TokenKind::BuilderField(_) => TokenType::BuilderField,
            TokenKind::UnresolvedPpv(_) => TokenType::UnresolvedPpv,
            TokenKind::Directive { .. } => TokenType::Directive,
            TokenKind::OpenParen => TokenType::OpenParen,
            TokenKind::CloseParen => TokenType::CloseParen,
            TokenKind::OpenBlock => TokenType::OpenBlock,
            TokenKind::CloseBlock => TokenType::CloseBlock,
            TokenKind::Comma => TokenType::Comma,
            TokenKind::Arithmetic(_) => TokenType::Arithmetic,
            TokenKind::Compare(_) => TokenType::Compare,
            TokenKind::Assign(_) => TokenType::Assign,
            TokenKind::And | TokenKind::Or | TokenKind::Not => TokenType::Logical,
            TokenKind::Indexer(_) => TokenType::Indexer,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Newline => f.write_str("\\n"),
            TokenKind::Comment(text) => write!(f, "// {text}"),
            TokenKind::Integer { value, .. } => write!(f, "{value}"),
            TokenKind::Decimal { value, .. } => write!(f, "{value}"),
            TokenKind::String(text) => {
                f.write_str("\"")?;
                for char in text.chars() {
                    match char {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
            TokenKind::Bool(value) => write!(f, "{value}"),
            TokenKind::Coordinate(coordinate) => coordinate.fmt(f),
            TokenKind::Selector(selector) => selector.fmt(f),
            TokenKind::Range(range) => range.fmt(f),
            TokenKind::EnumConstant(constant) => f.write_str(&constant.value),
            TokenKind::Identifier(name)
            | TokenKind::MacroRef(name)
            | TokenKind::FunctionRef(name) => f.write_str(name),
            TokenKind::ValueRef { name, holder } => match holder {
                Some(holder) => write!(f, "{name}[{holder}]"),
                None => f.write_str(name),
            },
            TokenKind::BuilderField(name) => write!(f, "{name}:"),
            TokenKind::UnresolvedPpv(name) => write!(f, "${name}"),
            TokenKind::Directive { keyword, .. } => f.write_str(keyword),
            TokenKind::OpenParen => f.write_str("("),
            TokenKind::CloseParen => f.write_str(")"),
            TokenKind::OpenBlock => f.write_str("{"),
            TokenKind::CloseBlock => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Arithmetic(op) => f.write_str(op.symbol()),
            TokenKind::Compare(op) => f.write_str(op.symbol()),
            TokenKind::Assign(op) => f.write_str(op.symbol()),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Not => f.write_str("not"),
            TokenKind::Indexer(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// The type of a token, used for type checking
///
/// Types form a hierarchy, see [`TokenType::parent`].
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum TokenType {
    Any,
    Literal,
    Number,
    Integer,
    Decimal,
    String,
    Bool,
    Coordinate,
    Selector,
    Range,
    EnumConstant,
    Identifier,
    ValueRef,
    MacroRef,
    FunctionRef,
    BuilderField,
    UnresolvedPpv,
    Directive,
    Comment,
    Newline,
    OpenParen,
    CloseParen,
    OpenBlock,
    CloseBlock,
    Comma,
    Operator,
    Arithmetic,
    Compare,
    Assign,
    Logical,
    Indexer,
}

impl TokenType {
    /// Returns the direct supertype of this type, [`TokenType::Any`] has none.
    pub fn parent(self) -> Option<TokenType> {
        use TokenType::*;
        let parent = match self {
            Any => return None,
            Integer | Decimal => Number,
            Number | String | Bool | Coordinate | Selector | Range | EnumConstant => Literal,
            ValueRef | MacroRef | FunctionRef => Identifier,
            Arithmetic | Compare | Assign | Logical => Operator,
            _ => Any,
        };
        Some(parent)
    }

    /// Returns whether a value of this type can be used where `target` is expected
    /// without any conversion
    pub fn is_assignable_to(self, target: TokenType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == target {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    /// Returns the top-most type below [`TokenType::Any`]
    pub fn category(self) -> TokenType {
        let mut current = self;
        while let Some(parent) = current.parent() {
            if parent == TokenType::Any {
                return current;
            }
            current = parent;
        }
        current
    }

    pub fn name(self) -> &'static str {
        use TokenType::*;
        match self {
            Any => "any",
            Literal => "literal",
            Number => "number",
            Integer => "integer",
            Decimal => "decimal",
            String => "string",
            Bool => "bool",
            Coordinate => "coordinate",
            Selector => "selector",
            Range => "range",
            EnumConstant => "enum constant",
            Identifier => "identifier",
            ValueRef => "value",
            MacroRef => "macro",
            FunctionRef => "function",
            BuilderField => "builder field",
            UnresolvedPpv => "preprocessor variable",
            Directive => "directive",
            Comment => "comment",
            Newline => "newline",
            OpenParen => "'('",
            CloseParen => "')'",
            OpenBlock => "'{'",
            CloseBlock => "'}'",
            Comma => "','",
            Operator => "operator",
            Arithmetic => "arithmetic operator",
            Compare => "comparison operator",
            Assign => "assignment operator",
            Logical => "logical operator",
            Indexer => "indexer",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tokens that can be converted to other token types without an explicit cast
pub trait ImplicitConversion: Sized {
    /// The types this value can be converted into, in order of preference
    fn conversion_targets(&self) -> &'static [TokenType];

    /// Converts into the type at `index` of [`ImplicitConversion::conversion_targets`]
    fn convert_to(&self, index: usize) -> Option<Self>;
}

impl ImplicitConversion for Token {
    fn conversion_targets(&self) -> &'static [TokenType] {
        match &self.kind {
            TokenKind::Integer { .. } => &[
                TokenType::Decimal,
                TokenType::Coordinate,
                TokenType::Range,
                TokenType::Bool,
            ],
            TokenKind::Decimal { .. } => &[TokenType::Integer, TokenType::Coordinate],
            TokenKind::Bool(_) => &[TokenType::Integer],
            TokenKind::Identifier(_) => &[TokenType::String],
            TokenKind::EnumConstant(_) => &[TokenType::String, TokenType::Identifier],
            _ => &[],
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn convert_to(&self, index: usize) -> Option<Self> {
        let target = *self.conversion_targets().get(index)?;
        let kind = match (&self.kind, target) {
            (TokenKind::Integer { value, unit }, TokenType::Decimal) => TokenKind::Decimal {
                value: *value as f64,
                unit: *unit,
            },
            (TokenKind::Integer { value, .. }, TokenType::Coordinate) => {
                TokenKind::Coordinate(Coordinate::absolute(*value as f64))
            }
            (TokenKind::Integer { value, .. }, TokenType::Range) => TokenKind::Range(Range {
                min: Some(*value),
                max: Some(*value),
            }),
            (TokenKind::Integer { value, .. }, TokenType::Bool) => TokenKind::Bool(*value != 0),
            (TokenKind::Decimal { value, unit }, TokenType::Integer) => TokenKind::Integer {
                value: value.trunc() as i64,
                unit: *unit,
            },
            (TokenKind::Decimal { value, .. }, TokenType::Coordinate) => {
                TokenKind::Coordinate(Coordinate::absolute(*value))
            }
            (TokenKind::Bool(value), TokenType::Integer) => TokenKind::Integer {
                value: i64::from(*value),
                unit: None,
            },
            (TokenKind::Identifier(name), TokenType::String) => TokenKind::String(name.clone()),
            (TokenKind::EnumConstant(constant), TokenType::String) => {
                TokenKind::String(constant.value.clone())
            }
            (TokenKind::EnumConstant(constant), TokenType::Identifier) => {
                TokenKind::Identifier(constant.value.clone())
            }
            _ => return None,
        };
        Some(self.replaced(kind))
    }
}

/// A time unit suffix of a number literal
///
/// The values are game ticks.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Unit {
    Ticks,
    Seconds,
    Minutes,
    Hours,
}

impl Unit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix {
            "t" => Unit::Ticks,
            "s" => Unit::Seconds,
            "m" => Unit::Minutes,
            "h" => Unit::Hours,
            _ => return None,
        };
        Some(unit)
    }

    pub fn scale(self) -> i64 {
        match self {
            Unit::Ticks => 1,
            Unit::Seconds => 20,
            Unit::Minutes => 1200,
            Unit::Hours => 72000,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Ticks => "t",
            Unit::Seconds => "s",
            Unit::Minutes => "m",
            Unit::Hours => "h",
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum CoordinateKind {
    Absolute,
    /// `~`
    Relative,
    /// `^`
    Local,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Coordinate {
    pub kind: CoordinateKind,
    pub value: f64,
}

impl Coordinate {
    pub fn absolute(value: f64) -> Self {
        Coordinate {
            kind: CoordinateKind::Absolute,
            value,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            CoordinateKind::Absolute => return write!(f, "{}", self.value),
            CoordinateKind::Relative => '~',
            CoordinateKind::Local => '^',
        };
        if self.value == 0.0 {
            write!(f, "{prefix}")
        } else {
            write!(f, "{prefix}{}", self.value)
        }
    }
}

/// The part of a selector which specifies the entities to choose from
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum SelectorCore {
    NearestPlayer,
    AllPlayers,
    RandomPlayer,
    AllEntities,
    Executor,
}

impl SelectorCore {
    pub fn from_char(char: char) -> Option<Self> {
        let core = match char {
            'p' => SelectorCore::NearestPlayer,
            'a' => SelectorCore::AllPlayers,
            'r' => SelectorCore::RandomPlayer,
            'e' => SelectorCore::AllEntities,
            's' => SelectorCore::Executor,
            _ => return None,
        };
        Some(core)
    }

    pub fn as_char(self) -> char {
        match self {
            SelectorCore::NearestPlayer => 'p',
            SelectorCore::AllPlayers => 'a',
            SelectorCore::RandomPlayer => 'r',
            SelectorCore::AllEntities => 'e',
            SelectorCore::Executor => 's',
        }
    }
}

/// An entity selector like `@e[type=cow]`
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Selector {
    pub core: SelectorCore,
    /// The text between the brackets, if any
    pub arguments: Option<SmolStr>,
}

impl Selector {
    pub fn new(core: SelectorCore) -> Self {
        Selector {
            core,
            arguments: None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.core.as_char())?;
        if let Some(arguments) = &self.arguments {
            write!(f, "[{arguments}]")?;
        }
        Ok(())
    }
}

/// An inclusive integer range, open on the missing sides
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Range {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Range {
    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| min <= value) && self.max.map_or(true, |max| value <= max)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => write!(f, "{min}"),
            (Some(min), Some(max)) => write!(f, "{min}..{max}"),
            (Some(min), None) => write!(f, "{min}.."),
            (None, Some(max)) => write!(f, "..{max}"),
            (None, None) => f.write_str(".."),
        }
    }
}

/// A registered constant of a named enum, like `survival` of `GameMode`
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct EnumConstant {
    pub enum_name: SmolStr,
    pub value: SmolStr,
}

/// The index of a directive in its registry
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct DirectiveId(pub usize);

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
        }
    }

    /// Operators of a lower tier get evaluated first
    pub fn tier(self) -> u8 {
        match self {
            ArithmeticOp::Mul | ArithmeticOp::Div | ArithmeticOp::Mod => 0,
            ArithmeticOp::Add | ArithmeticOp::Sub => 1,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
        }
    }

    /// The arithmetic operation this assignment performs, `None` for a plain assignment
    pub fn arithmetic(self) -> Option<ArithmeticOp> {
        let op = match self {
            AssignOp::Set => return None,
            AssignOp::Add => ArithmeticOp::Add,
            AssignOp::Sub => ArithmeticOp::Sub,
            AssignOp::Mul => ArithmeticOp::Mul,
            AssignOp::Div => ArithmeticOp::Div,
            AssignOp::Mod => ArithmeticOp::Mod,
        };
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use mcc_common::Span;

    use super::{Coordinate, CoordinateKind, Range, Token, TokenKind, TokenType};

    fn token(kind: TokenKind) -> Token {
        Token::new(kind, Span::new(0, 1), 1)
    }

    #[test]
    fn type_hierarchy() {
        assert!(TokenType::Integer.is_assignable_to(TokenType::Number));
        assert!(TokenType::Integer.is_assignable_to(TokenType::Literal));
        assert!(TokenType::ValueRef.is_assignable_to(TokenType::Identifier));
        assert!(TokenType::Compare.is_assignable_to(TokenType::Any));
        assert!(!TokenType::Identifier.is_assignable_to(TokenType::Literal));
        assert!(!TokenType::Number.is_assignable_to(TokenType::Integer));
        assert_eq!(TokenType::Decimal.category(), TokenType::Literal);
    }

    #[test]
    fn implicit_conversions() {
        let int = token(TokenKind::Integer {
            value: 3,
            unit: None,
        });
        assert_eq!(
            int.coerce(TokenType::Range).map(|t| t.kind),
            Some(TokenKind::Range(Range {
                min: Some(3),
                max: Some(3)
            }))
        );
        assert_eq!(
            int.coerce(TokenType::Bool).map(|t| t.kind),
            Some(TokenKind::Bool(true))
        );
        assert_eq!(int.coerce(TokenType::String), None);

        let decimal = token(TokenKind::Decimal {
            value: 2.7,
            unit: None,
        });
        assert_eq!(decimal.as_integer(), Some(2));

        let ident = token(TokenKind::Identifier("abc".into()));
        assert_eq!(ident.as_text().as_deref(), Some("abc"));
    }

    #[test]
    fn coordinate_display() {
        let relative = Coordinate {
            kind: CoordinateKind::Relative,
            value: 0.0,
        };
        let local = Coordinate {
            kind: CoordinateKind::Local,
            value: 1.5,
        };
        assert_eq!(relative.to_string(), "~");
        assert_eq!(local.to_string(), "^1.5");
        assert_eq!(Coordinate::absolute(-4.0).to_string(), "-4");
    }

    #[test]
    fn string_display_escapes() {
        let string = token(TokenKind::String("say \"hi\"".into()));
        assert_eq!(string.to_string(), r#""say \"hi\"""#);
    }
}
