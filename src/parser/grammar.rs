use serde::{Deserialize, Serialize};

use crate::types::{StyleValue, ValueType};

/// The closed set of call operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Get,
    Has,
    Var,
    Id,
    GeometryType,
    Resolution,
    Zoom,
    Time,
    LineMetric,
    Concat,
    Not,
    All,
    Any,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Between,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Pow,
    Clamp,
    Abs,
    Floor,
    Ceil,
    Round,
    Sin,
    Cos,
    Sqrt,
    Atan,
    Case,
    MatchNumber,
    MatchString,
    Coalesce,
    Interpolate,
    In,
    Array,
    Color,
    Band,
    Palette,
    ToString,
}

impl Operator {
    /// Resolve an encoded operator symbol. The legacy `match` alias is
    /// resolved by the parser, not here.
    pub fn from_name(name: &str) -> Option<Operator> {
        let op = match name {
            "get" => Operator::Get,
            "has" => Operator::Has,
            "var" => Operator::Var,
            "id" => Operator::Id,
            "geometry-type" => Operator::GeometryType,
            "resolution" => Operator::Resolution,
            "zoom" => Operator::Zoom,
            "time" => Operator::Time,
            "line-metric" => Operator::LineMetric,
            "concat" => Operator::Concat,
            "!" => Operator::Not,
            "all" => Operator::All,
            "any" => Operator::Any,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<" => Operator::LessThan,
            "<=" => Operator::LessThanOrEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanOrEqual,
            "between" => Operator::Between,
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "%" => Operator::Modulo,
            "^" => Operator::Pow,
            "clamp" => Operator::Clamp,
            "abs" => Operator::Abs,
            "floor" => Operator::Floor,
            "ceil" => Operator::Ceil,
            "round" => Operator::Round,
            "sin" => Operator::Sin,
            "cos" => Operator::Cos,
            "sqrt" => Operator::Sqrt,
            "atan" => Operator::Atan,
            "case" => Operator::Case,
            "match-number" => Operator::MatchNumber,
            "match-string" => Operator::MatchString,
            "coalesce" => Operator::Coalesce,
            "interpolate" => Operator::Interpolate,
            "in" => Operator::In,
            "array" => Operator::Array,
            "color" => Operator::Color,
            "band" => Operator::Band,
            "palette" => Operator::Palette,
            "to-string" => Operator::ToString,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Get => "get",
            Operator::Has => "has",
            Operator::Var => "var",
            Operator::Id => "id",
            Operator::GeometryType => "geometry-type",
            Operator::Resolution => "resolution",
            Operator::Zoom => "zoom",
            Operator::Time => "time",
            Operator::LineMetric => "line-metric",
            Operator::Concat => "concat",
            Operator::Not => "!",
            Operator::All => "all",
            Operator::Any => "any",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Between => "between",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Pow => "^",
            Operator::Clamp => "clamp",
            Operator::Abs => "abs",
            Operator::Floor => "floor",
            Operator::Ceil => "ceil",
            Operator::Round => "round",
            Operator::Sin => "sin",
            Operator::Cos => "cos",
            Operator::Sqrt => "sqrt",
            Operator::Atan => "atan",
            Operator::Case => "case",
            Operator::MatchNumber => "match-number",
            Operator::MatchString => "match-string",
            Operator::Coalesce => "coalesce",
            Operator::Interpolate => "interpolate",
            Operator::In => "in",
            Operator::Array => "array",
            Operator::Color => "color",
            Operator::Band => "band",
            Operator::Palette => "palette",
            Operator::ToString => "to-string",
        }
    }
}

/// A typed expression node. The tree is strict: a call owns its
/// arguments, and `value_type` is the declared result type at that site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal {
        value_type: ValueType,
        value: StyleValue,
    },
    Call {
        value_type: ValueType,
        operator: Operator,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn literal(value_type: ValueType, value: StyleValue) -> Expression {
        Expression::Literal { value_type, value }
    }

    pub fn call(value_type: ValueType, operator: Operator, args: Vec<Expression>) -> Expression {
        Expression::Call {
            value_type,
            operator,
            args,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Expression::Literal { value_type, .. } => *value_type,
            Expression::Call { value_type, .. } => *value_type,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal { .. })
    }

    /// The literal value, if this node is a literal.
    pub fn literal_value<'a>(&'a self) -> Option<&'a StyleValue> {
        match self {
            Expression::Literal { value, .. } => Some(value),
            Expression::Call { .. } => None,
        }
    }
}
