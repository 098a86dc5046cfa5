//! Stylexpr is a small typed expression language used to drive
//! per-feature styling decisions (colors, sizes, classifications,
//! interpolations) in a mapping pipeline. Expressions are encoded as
//! JSON-compatible value trees where an array whose first element is a
//! string is a call, e.g. `["+", ["get", "population"], 100]`.
//!
//! Parsing produces a typed AST plus metadata about the feature
//! properties and style variables the expression reads; the cpu
//! evaluator compiles the AST into a pure closure over an evaluation
//! context.
//!
//! The basic example of how to use:
//! ```
//! use stylexpr::{
//!     build_expression, process_accessor_values, serde_json::json, EvaluationContext,
//!     ParsingContext, ValueType,
//! };
//!
//! let mut ctx = ParsingContext::new();
//! let evaluator =
//!     build_expression(&json!(["+", ["get", "a"], 3]), ValueType::Number, &mut ctx).unwrap();
//!
//! let mut eval_ctx = EvaluationContext::new();
//! eval_ctx.set_properties(process_accessor_values(&json!({"a": 4}), ctx.properties()));
//!
//! assert_eq!(evaluator.evaluate(&eval_ctx), 7.0.into());
//! ```
mod context;
mod interp;
mod parser;
mod types;

pub use context::{
    accessor_key, process_accessor_values, AccessorInfo, EvaluationContext, FeatureId,
    ParsingContext, PathSegment, ProcessedValue,
};
pub use interp::{build_expression, EvalFn, Evaluator};
pub use parser::{parse, Expression, Operator};
pub use types::{Color, ExprError, ExprResult, StyleValue, ValueType};

// Some re-exports to allow a consistent use of serde
pub use serde;
pub use serde_json;

#[cfg(test)]
mod tests;
