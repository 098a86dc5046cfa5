use serde_json::Value;

use super::grammar::{Expression, Operator};
use crate::context::{ParsingContext, PathSegment};
use crate::types::{ExprError, ExprResult, StyleValue, ValueType};

/// Parse an encoded expression against a declared result type.
///
/// Arrays whose first element is a string are calls; everything else is
/// coerced into a literal of the declared type. Accessor metadata and
/// feature-id / geometry-type usage are accumulated on the context.
pub fn parse(
    encoded: &Value,
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    match encoded {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(ExprError::parse("empty expression"));
            }

            if let Some(name) = items[0].as_str() {
                return parse_call(name, &items[1..], declared, ctx);
            }

            Ok(Expression::literal(
                declared,
                StyleValue::coerce(encoded, declared)?,
            ))
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(Expression::literal(
            declared,
            StyleValue::coerce(encoded, declared)?,
        )),
        _ => Err(ExprError::parse(
            "expression must be an array or a primitive value",
        )),
    }
}

fn parse_call(
    name: &str,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    // The legacy `match` alias: try the whole expression as match-number
    // against a cloned context, falling back to match-string. The clone
    // keeps a failed attempt from leaking accessor registrations.
    if name == "match" {
        let mut probe = ctx.clone();
        return match parse_match(Operator::MatchNumber, args, declared, &mut probe) {
            Ok(expr) => {
                *ctx = probe;
                Ok(expr)
            }
            Err(_) => parse_match(Operator::MatchString, args, declared, ctx),
        };
    }

    let op = Operator::from_name(name)
        .ok_or_else(|| ExprError::parse(&format!("unknown operator: {}", name)))?;

    match op {
        Operator::Get | Operator::Var | Operator::Has => parse_accessor(op, args, declared, ctx),
        Operator::Id => {
            check_exact(op, args, 0)?;
            ctx.mark_feature_id();
            Ok(Expression::call(declared, op, Vec::new()))
        }
        Operator::GeometryType => {
            check_exact(op, args, 0)?;
            ctx.mark_geometry_type();
            Ok(Expression::call(declared, op, Vec::new()))
        }
        Operator::Resolution | Operator::Zoom | Operator::Time | Operator::LineMetric => {
            check_exact(op, args, 0)?;
            Ok(Expression::call(declared, op, Vec::new()))
        }
        Operator::Concat => {
            check_at_least(op, args, 2)?;
            let parsed = parse_args(op, args, ValueType::String, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Not => {
            check_exact(op, args, 1)?;
            let parsed = parse_args(op, args, ValueType::Boolean, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::All | Operator::Any => {
            check_at_least(op, args, 2)?;
            let parsed = parse_args(op, args, ValueType::Boolean, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Equal
        | Operator::NotEqual
        | Operator::LessThan
        | Operator::LessThanOrEqual
        | Operator::GreaterThan
        | Operator::GreaterThanOrEqual => {
            check_exact(op, args, 2)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Between => {
            check_exact(op, args, 3)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Add | Operator::Multiply => {
            check_at_least(op, args, 2)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Subtract | Operator::Divide | Operator::Modulo | Operator::Pow => {
            check_exact(op, args, 2)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Clamp => {
            check_exact(op, args, 3)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Abs
        | Operator::Floor
        | Operator::Ceil
        | Operator::Round
        | Operator::Sin
        | Operator::Cos
        | Operator::Sqrt => {
            check_exact(op, args, 1)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Atan => {
            check_range(op, args, 1, 2)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Case => parse_case(op, args, declared, ctx),
        Operator::MatchNumber | Operator::MatchString => parse_match(op, args, declared, ctx),
        Operator::Coalesce => {
            check_at_least(op, args, 2)?;
            let parsed = parse_args(op, args, declared, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Interpolate => parse_interpolate(op, args, declared, ctx),
        Operator::In => parse_in(op, args, declared, ctx),
        Operator::Array => {
            if declared != ValueType::NumberArray {
                return Err(ExprError::parse(
                    "invalid type for array expression, expected number[]",
                ));
            }
            check_at_least(op, args, 1)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Color => {
            if declared != ValueType::Color {
                return Err(ExprError::parse(
                    "invalid type for color expression, expected color",
                ));
            }
            check_range(op, args, 1, 4)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Band => {
            check_range(op, args, 1, 3)?;
            let parsed = parse_args(op, args, ValueType::Number, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
        Operator::Palette => parse_palette(op, args, declared, ctx),
        Operator::ToString => {
            check_exact(op, args, 1)?;
            let parsed = parse_args(op, args, ValueType::String, ctx)?;
            Ok(Expression::call(declared, op, parsed))
        }
    }
}

fn parse_accessor(
    op: Operator,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    check_at_least(op, args, 1)?;

    let (path_args, default) = match args.last() {
        Some(Value::Object(options)) => (&args[..args.len() - 1], parse_options(op, options)?),
        _ => (args, None),
    };

    if path_args.is_empty() {
        return Err(ExprError::parse(&format!(
            "expected a non-empty path for {} expression",
            op.name()
        )));
    }

    let mut path = Vec::with_capacity(path_args.len());
    for (i, segment) in path_args.iter().enumerate() {
        let segment = match segment {
            Value::String(key) => PathSegment::Key(key.clone()),
            Value::Number(idx) => match idx.as_u64() {
                Some(idx) => PathSegment::Index(idx as usize),
                None => return Err(bad_segment(op, i, segment)),
            },
            _ => return Err(bad_segment(op, i, segment)),
        };
        path.push(segment);
    }

    // `has` only ever tests presence; boolean coercion is total over the
    // primitives a feature can carry, so presence processing cannot fail.
    let registered = if op == Operator::Has {
        ValueType::Boolean
    } else {
        declared
    };

    let key = if op == Operator::Var {
        ctx.register_variable(path, registered, default)
    } else {
        ctx.register_property(path, registered, default)
    };

    Ok(Expression::call(
        declared,
        op,
        vec![Expression::literal(
            ValueType::String,
            StyleValue::String(key),
        )],
    ))
}

fn bad_segment(op: Operator, i: usize, segment: &Value) -> ExprError {
    ExprError::parse(&format!(
        "failed to parse argument {} of {} expression: expected a string key or non-negative integer index, got {}",
        i,
        op.name(),
        segment
    ))
}

fn parse_options(
    op: Operator,
    options: &serde_json::Map<String, Value>,
) -> ExprResult<Option<Value>> {
    let mut default = None;

    for (key, value) in options.iter() {
        if key == "default" {
            default = Some(value.clone());
        } else {
            return Err(ExprError::parse(&format!(
                "unexpected option \"{}\" for {} expression",
                key,
                op.name()
            )));
        }
    }

    Ok(default)
}

fn parse_case(
    op: Operator,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    check_at_least(op, args, 3)?;
    if args.len() % 2 == 0 {
        return Err(ExprError::parse(&format!(
            "expected an odd number of arguments for {}, got {}",
            op.name(),
            args.len()
        )));
    }

    let fallback = args.len() - 1;
    let mut parsed = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let ty = if i < fallback && i % 2 == 0 {
            ValueType::Boolean
        } else {
            declared
        };
        parsed.push(parse_arg(op, i, arg, ty, ctx)?);
    }

    Ok(Expression::call(declared, op, parsed))
}

fn parse_match(
    op: Operator,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    check_at_least(op, args, 4)?;
    if args.len() % 2 != 0 {
        return Err(ExprError::parse(&format!(
            "expected an even number of arguments for {}, got {}",
            op.name(),
            args.len()
        )));
    }

    let key_type = if op == Operator::MatchNumber {
        ValueType::Number
    } else {
        ValueType::String
    };

    let fallback = args.len() - 1;
    let mut parsed = Vec::with_capacity(args.len());
    parsed.push(parse_arg(op, 0, &args[0], key_type, ctx)?);
    for (i, arg) in args.iter().enumerate().skip(1) {
        let ty = if i < fallback && i % 2 == 1 {
            key_type
        } else {
            declared
        };
        parsed.push(parse_arg(op, i, arg, ty, ctx)?);
    }

    Ok(Expression::call(declared, op, parsed))
}

fn parse_interpolate(
    op: Operator,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    if declared != ValueType::Number && declared != ValueType::Color {
        return Err(ExprError::parse(
            "invalid type for interpolate expression, expected number or color",
        ));
    }

    check_at_least(op, args, 6)?;
    if args.len() % 2 != 0 {
        return Err(ExprError::parse(&format!(
            "expected an even number of arguments for {}, got {}",
            op.name(),
            args.len()
        )));
    }

    let base = parse_interpolation_method(&args[0])?;

    // The method is stored as a literal numeric base; linear is base 1.
    let mut parsed = Vec::with_capacity(args.len());
    parsed.push(Expression::literal(
        ValueType::Number,
        StyleValue::Number(base),
    ));
    parsed.push(parse_arg(op, 1, &args[1], ValueType::Number, ctx)?);

    let mut i = 2;
    while i < args.len() {
        parsed.push(parse_arg(op, i, &args[i], ValueType::Number, ctx)?);
        parsed.push(parse_arg(op, i + 1, &args[i + 1], declared, ctx)?);
        i += 2;
    }

    Ok(Expression::call(declared, op, parsed))
}

fn parse_interpolation_method(method: &Value) -> ExprResult<f64> {
    let items = match method.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(ExprError::parse(&format!(
                "invalid interpolation type: {}",
                method
            )))
        }
    };

    match items[0].as_str() {
        Some("linear") => Ok(1.0),
        Some("exponential") => {
            let base = items.get(1).cloned().unwrap_or(Value::Null);
            match base.as_f64() {
                Some(base) if base > 0.0 => Ok(base),
                _ => Err(ExprError::parse(&format!(
                    "expected a number base for exponential interpolation, got {} instead",
                    base
                ))),
            }
        }
        _ => Err(ExprError::parse(&format!(
            "invalid interpolation type: {}",
            method
        ))),
    }
}

fn parse_in(
    op: Operator,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    check_exact(op, args, 2)?;

    let haystack = match &args[1] {
        Value::Array(items) => items,
        _ => {
            return Err(ExprError::parse(
                "the second argument for the \"in\" operator must be an array",
            ))
        }
    };

    if haystack.first().and_then(|item| item.as_str()) == Some("literal") {
        let items = match haystack.get(1) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ExprError::parse(
                    "expected an array of strings after \"literal\" for the \"in\" operator",
                ))
            }
        };

        let mut parsed = Vec::with_capacity(items.len() + 1);
        parsed.push(parse_arg(op, 0, &args[0], ValueType::String, ctx)?);
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(item) => parsed.push(Expression::literal(
                    ValueType::String,
                    StyleValue::String(item.clone()),
                )),
                _ => {
                    return Err(ExprError::parse(&format!(
                        "failed to parse haystack item {} for \"in\" expression: expected a string, got {}",
                        i, item
                    )))
                }
            }
        }

        return Ok(Expression::call(declared, op, parsed));
    }

    if haystack.iter().any(|item| item.is_string()) {
        return Err(ExprError::parse(
            "for the \"in\" operator, a string array should be wrapped in a \"literal\" operator to disambiguate from expressions",
        ));
    }

    let mut parsed = Vec::with_capacity(haystack.len() + 1);
    parsed.push(parse_arg(op, 0, &args[0], ValueType::Number, ctx)?);
    for (i, item) in haystack.iter().enumerate() {
        let value = StyleValue::coerce(item, ValueType::Number).map_err(|err| {
            ExprError::parse(&format!(
                "failed to parse haystack item {} for \"in\" expression: {}",
                i,
                err.message()
            ))
        })?;
        parsed.push(Expression::literal(ValueType::Number, value));
    }

    Ok(Expression::call(declared, op, parsed))
}

fn parse_palette(
    op: Operator,
    args: &[Value],
    declared: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    check_exact(op, args, 2)?;

    let index = parse_arg(op, 0, &args[0], ValueType::Number, ctx)?;

    let colors = match &args[1] {
        Value::Array(items) => items,
        _ => {
            return Err(ExprError::parse(
                "the second argument for the \"palette\" operator must be an array",
            ))
        }
    };

    let mut parsed = Vec::with_capacity(colors.len() + 1);
    parsed.push(index);
    for (i, entry) in colors.iter().enumerate() {
        if is_call(entry) {
            return Err(ExprError::parse(&format!(
                "the palette color at index {} must be a literal value",
                i
            )));
        }
        let value = StyleValue::coerce(entry, ValueType::Color).map_err(|err| {
            ExprError::parse(&format!(
                "failed to parse color at index {} in palette expression: {}",
                i,
                err.message()
            ))
        })?;
        parsed.push(Expression::literal(ValueType::Color, value));
    }

    Ok(Expression::call(declared, op, parsed))
}

fn is_call(value: &Value) -> bool {
    match value {
        Value::Array(items) => items
            .first()
            .and_then(|head| head.as_str())
            .map_or(false, |name| Operator::from_name(name).is_some()),
        _ => false,
    }
}

fn parse_args(
    op: Operator,
    args: &[Value],
    ty: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Vec<Expression>> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| parse_arg(op, i, arg, ty, ctx))
        .collect()
}

fn parse_arg(
    op: Operator,
    i: usize,
    encoded: &Value,
    ty: ValueType,
    ctx: &mut ParsingContext,
) -> ExprResult<Expression> {
    parse(encoded, ty, ctx).map_err(|err| {
        ExprError::parse(&format!(
            "failed to parse argument {} of {} expression: {}",
            i,
            op.name(),
            err.message()
        ))
    })
}

fn check_exact(op: Operator, args: &[Value], count: usize) -> ExprResult<()> {
    if args.len() != count {
        return Err(ExprError::parse(&format!(
            "expected {} argument(s) for {}, got {}",
            count,
            op.name(),
            args.len()
        )));
    }
    Ok(())
}

fn check_at_least(op: Operator, args: &[Value], count: usize) -> ExprResult<()> {
    if args.len() < count {
        return Err(ExprError::parse(&format!(
            "expected at least {} argument(s) for {}, got {}",
            count,
            op.name(),
            args.len()
        )));
    }
    Ok(())
}

fn check_range(op: Operator, args: &[Value], min: usize, max: usize) -> ExprResult<()> {
    if args.len() < min || args.len() > max {
        return Err(ExprError::parse(&format!(
            "expected {} to {} argument(s) for {}, got {}",
            min,
            max,
            op.name(),
            args.len()
        )));
    }
    Ok(())
}
