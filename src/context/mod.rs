mod accessors;
mod eval_context;
mod parse_context;

pub use accessors::{process_accessor_values, ProcessedValue};
pub use eval_context::{EvaluationContext, FeatureId};
pub use parse_context::{accessor_key, AccessorInfo, ParsingContext, PathSegment};
