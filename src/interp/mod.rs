mod interpolate;

use serde_json::Value;

use crate::context::{EvaluationContext, FeatureId, ParsingContext};
use crate::parser::{parse, Expression, Operator};
use crate::types::{Color, ExprError, ExprResult, StyleValue, ValueType};

/// A compiled evaluation closure. Pure: it captures only immutable state
/// and never mutates the context it reads.
pub type EvalFn = Box<dyn Fn(&EvaluationContext) -> StyleValue + Send + Sync>;

/// A typed expression compiled down to an evaluation closure.
pub struct Evaluator {
    root: EvalFn,
    value_type: ValueType,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    pub fn from_expression(expr: &Expression) -> ExprResult<Evaluator> {
        Ok(Evaluator {
            root: compile(expr)?,
            value_type: expr.value_type(),
        })
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn evaluate(&self, ctx: &EvaluationContext) -> StyleValue {
        (self.root)(ctx)
    }
}

/// Parse an encoded expression and compile it in one step.
pub fn build_expression(
    encoded: &Value,
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Evaluator> {
    let expr = parse(encoded, declared, ctx)?;
    Evaluator::from_expression(&expr)
}

fn compile(expr: &Expression) -> ExprResult<EvalFn> {
    match expr {
        Expression::Literal { value, .. } => {
            let value = value.clone();
            Ok(Box::new(move |_| value.clone()))
        }
        Expression::Call { operator, args, .. } => compile_call(*operator, args),
    }
}

fn compile_call(op: Operator, args: &[Expression]) -> ExprResult<EvalFn> {
    match op {
        Operator::Get => {
            let key = accessor_key_arg(op, args)?;
            Ok(Box::new(move |ctx| match ctx.property(&key) {
                Some(entry) => entry.value.clone(),
                None => StyleValue::Undefined,
            }))
        }
        Operator::Has => {
            let key = accessor_key_arg(op, args)?;
            Ok(Box::new(move |ctx| {
                StyleValue::Boolean(ctx.property(&key).is_some())
            }))
        }
        Operator::Var => {
            let key = accessor_key_arg(op, args)?;
            Ok(Box::new(move |ctx| match ctx.variable(&key) {
                Some(entry) => entry.value.clone(),
                None => StyleValue::Undefined,
            }))
        }
        Operator::Id => Ok(Box::new(|ctx| match ctx.feature_id() {
            Some(FeatureId::Number(id)) => StyleValue::Number(*id),
            Some(FeatureId::String(id)) => StyleValue::String(id.clone()),
            None => StyleValue::Undefined,
        })),
        Operator::GeometryType => Ok(Box::new(|ctx| match ctx.geometry_type() {
            Some(geometry_type) => StyleValue::String(geometry_type.to_owned()),
            None => StyleValue::Undefined,
        })),
        Operator::Resolution => Ok(Box::new(|ctx| match ctx.resolution() {
            Some(resolution) => StyleValue::Number(resolution),
            None => StyleValue::Undefined,
        })),
        Operator::Coalesce => {
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                for child in children.iter() {
                    let value = child(ctx);
                    if !value.is_undefined() {
                        return value;
                    }
                }
                StyleValue::Undefined
            }))
        }
        Operator::Concat => {
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                let mut out = String::new();
                for child in children.iter() {
                    out.push_str(&child(ctx).to_display_string());
                }
                StyleValue::String(out)
            }))
        }
        Operator::Not => {
            let child = compile(arg(op, args, 0)?)?;
            Ok(Box::new(move |ctx| {
                StyleValue::Boolean(!child(ctx).is_truthy())
            }))
        }
        Operator::All => {
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                StyleValue::Boolean(children.iter().all(|child| child(ctx).is_truthy()))
            }))
        }
        Operator::Any => {
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                StyleValue::Boolean(children.iter().any(|child| child(ctx).is_truthy()))
            }))
        }
        Operator::Equal => compile_compare(op, args, |lhs, rhs| lhs == rhs),
        Operator::NotEqual => compile_compare(op, args, |lhs, rhs| lhs != rhs),
        Operator::LessThan => compile_compare(op, args, |lhs, rhs| lhs < rhs),
        Operator::LessThanOrEqual => compile_compare(op, args, |lhs, rhs| lhs <= rhs),
        Operator::GreaterThan => compile_compare(op, args, |lhs, rhs| lhs > rhs),
        Operator::GreaterThanOrEqual => compile_compare(op, args, |lhs, rhs| lhs >= rhs),
        Operator::Between => {
            let value = compile(arg(op, args, 0)?)?;
            let low = compile(arg(op, args, 1)?)?;
            let high = compile(arg(op, args, 2)?)?;
            Ok(Box::new(move |ctx| {
                let x = value(ctx).as_number();
                StyleValue::Boolean(low(ctx).as_number() <= x && x <= high(ctx).as_number())
            }))
        }
        Operator::Add => compile_fold(args, 0.0, |acc, val| acc + val),
        Operator::Multiply => compile_fold(args, 1.0, |acc, val| acc * val),
        Operator::Subtract => compile_binary(op, args, |lhs, rhs| lhs - rhs),
        Operator::Divide => compile_binary(op, args, |lhs, rhs| lhs / rhs),
        Operator::Modulo => compile_binary(op, args, |lhs, rhs| lhs % rhs),
        Operator::Pow => compile_binary(op, args, f64::powf),
        Operator::Clamp => {
            let value = compile(arg(op, args, 0)?)?;
            let low = compile(arg(op, args, 1)?)?;
            let high = compile(arg(op, args, 2)?)?;
            Ok(Box::new(move |ctx| {
                let x = value(ctx).as_number();
                let lo = low(ctx).as_number();
                let hi = high(ctx).as_number();
                StyleValue::Number(if x < lo {
                    lo
                } else if x > hi {
                    hi
                } else {
                    x
                })
            }))
        }
        Operator::Abs => compile_unary(op, args, f64::abs),
        Operator::Floor => compile_unary(op, args, f64::floor),
        Operator::Ceil => compile_unary(op, args, f64::ceil),
        Operator::Round => compile_unary(op, args, f64::round),
        Operator::Sin => compile_unary(op, args, f64::sin),
        Operator::Cos => compile_unary(op, args, f64::cos),
        Operator::Sqrt => compile_unary(op, args, f64::sqrt),
        Operator::Atan => {
            if args.len() == 2 {
                compile_binary(op, args, f64::atan2)
            } else {
                compile_unary(op, args, f64::atan)
            }
        }
        Operator::Case => {
            arg(op, args, 2)?;
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                let mut i = 0;
                while i + 1 < children.len() {
                    if children[i](ctx).is_truthy() {
                        return children[i + 1](ctx);
                    }
                    i += 2;
                }
                children[children.len() - 1](ctx)
            }))
        }
        Operator::MatchNumber | Operator::MatchString => {
            arg(op, args, 3)?;
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                let input = children[0](ctx);
                let mut i = 1;
                while i + 1 < children.len() {
                    if children[i](ctx) == input {
                        return children[i + 1](ctx);
                    }
                    i += 2;
                }
                children[children.len() - 1](ctx)
            }))
        }
        Operator::In => {
            arg(op, args, 0)?;
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                let needle = children[0](ctx);
                StyleValue::Boolean(children[1..].iter().any(|item| item(ctx) == needle))
            }))
        }
        Operator::Interpolate => {
            let base = match arg(op, args, 0)?.literal_value() {
                Some(StyleValue::Number(base)) => *base,
                _ => {
                    return Err(ExprError::parse(
                        "expected a literal numeric base for interpolate expression",
                    ))
                }
            };
            arg(op, args, 5)?;
            let input = compile(arg(op, args, 1)?)?;
            let mut stops = Vec::with_capacity((args.len() - 2) / 2);
            let mut i = 2;
            while i + 1 < args.len() {
                stops.push((compile(&args[i])?, compile(&args[i + 1])?));
                i += 2;
            }
            Ok(Box::new(move |ctx| {
                let x = input(ctx).as_number();
                let resolved: Vec<(f64, StyleValue)> = stops
                    .iter()
                    .map(|(stop, output)| (stop(ctx).as_number(), output(ctx)))
                    .collect();
                interpolate::sample(base, x, &resolved)
            }))
        }
        Operator::Array => {
            arg(op, args, 0)?;
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                StyleValue::NumberArray(
                    children.iter().map(|child| child(ctx).as_number()).collect(),
                )
            }))
        }
        Operator::Color => {
            arg(op, args, 0)?;
            let children = compile_args(args)?;
            Ok(Box::new(move |ctx| {
                let channels: Vec<f64> =
                    children.iter().map(|child| child(ctx).as_number()).collect();
                // 1 arg is a shade, 2 shade + alpha, 3 rgb, 4 rgba.
                let color = match channels.len() {
                    1 => Color::opaque(channels[0], channels[0], channels[0]),
                    2 => Color::new(channels[0], channels[0], channels[0], channels[1]),
                    3 => Color::opaque(channels[0], channels[1], channels[2]),
                    _ => Color::new(channels[0], channels[1], channels[2], channels[3]),
                };
                StyleValue::Color(color)
            }))
        }
        Operator::ToString => {
            let child = compile(arg(op, args, 0)?)?;
            Ok(Box::new(move |ctx| match child(ctx) {
                StyleValue::Undefined => StyleValue::Undefined,
                value => StyleValue::String(value.to_display_string()),
            }))
        }
        Operator::Zoom
        | Operator::Time
        | Operator::LineMetric
        | Operator::Band
        | Operator::Palette => Err(ExprError::unsupported(&format!(
            "the {} operator is not supported by the cpu evaluator",
            op.name()
        ))),
    }
}

fn arg<'a>(op: Operator, args: &'a [Expression], i: usize) -> ExprResult<&'a Expression> {
    args.get(i).ok_or_else(|| {
        ExprError::parse(&format!(
            "missing argument {} for {} expression",
            i,
            op.name()
        ))
    })
}

fn accessor_key_arg(op: Operator, args: &[Expression]) -> ExprResult<String> {
    match arg(op, args, 0)?.literal_value() {
        Some(StyleValue::String(key)) => Ok(key.clone()),
        _ => Err(ExprError::parse(&format!(
            "expected an accessor key literal for {} expression",
            op.name()
        ))),
    }
}

fn compile_args(args: &[Expression]) -> ExprResult<Vec<EvalFn>> {
    args.iter().map(compile).collect()
}

fn compile_unary<F>(op: Operator, args: &[Expression], f: F) -> ExprResult<EvalFn>
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    let child = compile(arg(op, args, 0)?)?;
    Ok(Box::new(move |ctx| {
        StyleValue::Number(f(child(ctx).as_number()))
    }))
}

fn compile_binary<F>(op: Operator, args: &[Expression], f: F) -> ExprResult<EvalFn>
where
    F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
{
    let lhs = compile(arg(op, args, 0)?)?;
    let rhs = compile(arg(op, args, 1)?)?;
    Ok(Box::new(move |ctx| {
        StyleValue::Number(f(lhs(ctx).as_number(), rhs(ctx).as_number()))
    }))
}

fn compile_compare<F>(op: Operator, args: &[Expression], f: F) -> ExprResult<EvalFn>
where
    F: Fn(f64, f64) -> bool + Send + Sync + 'static,
{
    let lhs = compile(arg(op, args, 0)?)?;
    let rhs = compile(arg(op, args, 1)?)?;
    Ok(Box::new(move |ctx| {
        StyleValue::Boolean(f(lhs(ctx).as_number(), rhs(ctx).as_number()))
    }))
}

fn compile_fold<F>(args: &[Expression], init: f64, f: F) -> ExprResult<EvalFn>
where
    F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
{
    let children = compile_args(args)?;
    Ok(Box::new(move |ctx| {
        StyleValue::Number(
            children
                .iter()
                .fold(init, |acc, child| f(acc, child(ctx).as_number())),
        )
    }))
}
