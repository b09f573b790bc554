//! Template interpolation (verb module)
//!
//! Resolves dashboard template variables inside query fields. Unknown
//! variables are left as written.

mod interpolator;
mod replace;
mod variables;

pub use interpolator::TemplateInterpolator;
pub use replace::{has_variables, replace, variable_names, VariableFormat};
pub use variables::{
    Layered, ScopedVars, TemplateVariable, TemplateVariables, VariableResolver, VariableValue, ALL_VALUE,
};
