pub mod color;
pub mod style_error;
pub mod style_value;

pub use color::Color;
pub use style_error::{ExprError, ExprResult};
pub use style_value::{StyleValue, ValueType};
