//! Template variables and their resolution

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Value of the `All` option of a multi-value variable
pub const ALL_VALUE: &str = "$__all";

/// Current value of a variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Single(String),
    Multi(Vec<String>),
}

impl VariableValue {
    pub fn is_multi(&self) -> bool {
        matches!(self, VariableValue::Multi(_))
    }

    /// All values as a slice-like list
    pub fn values(&self) -> Vec<&str> {
        match self {
            VariableValue::Single(v) => vec![v.as_str()],
            VariableValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn is_all(&self) -> bool {
        match self {
            VariableValue::Single(v) => v == ALL_VALUE,
            VariableValue::Multi(vs) => vs.iter().any(|v| v == ALL_VALUE),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Single(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Single(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(values: Vec<String>) -> Self {
        VariableValue::Multi(values)
    }
}

impl From<Vec<&str>> for VariableValue {
    fn from(values: Vec<&str>) -> Self {
        VariableValue::Multi(values.into_iter().map(str::to_string).collect())
    }
}

/// Looks up the current value of a variable by name
pub trait VariableResolver {
    fn resolve(&self, name: &str) -> Option<VariableValue>;
}

/// A dashboard-level template variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    pub current: VariableValue,
    /// Every selectable value, used to expand `All`
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub include_all: bool,
    /// Custom value substituted for `All` instead of the option list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_value: Option<String>,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, current: impl Into<VariableValue>) -> Self {
        Self {
            name: name.into(),
            current: current.into(),
            options: Vec::new(),
            include_all: false,
            all_value: None,
        }
    }

    /// The current value with `All` expanded
    pub fn value(&self) -> VariableValue {
        if !self.current.is_all() {
            return self.current.clone();
        }
        match &self.all_value {
            Some(all) => VariableValue::Single(all.clone()),
            None => VariableValue::Multi(self.options.clone()),
        }
    }
}

/// The dashboard's template variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateVariables {
    variables: HashMap<String, TemplateVariable>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, variable: TemplateVariable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Builder form of [`TemplateVariables::add`]
    pub fn with(mut self, variable: TemplateVariable) -> Self {
        self.add(variable);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TemplateVariable> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl FromIterator<TemplateVariable> for TemplateVariables {
    fn from_iter<I: IntoIterator<Item = TemplateVariable>>(iter: I) -> Self {
        let mut variables = TemplateVariables::new();
        for variable in iter {
            variables.add(variable);
        }
        variables
    }
}

impl VariableResolver for TemplateVariables {
    fn resolve(&self, name: &str) -> Option<VariableValue> {
        self.variables.get(name).map(TemplateVariable::value)
    }
}

/// Per-execution variable bindings, consulted before dashboard variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopedVars(HashMap<String, VariableValue>);

impl ScopedVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<VariableValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        self.insert(name, value);
        self
    }
}

impl VariableResolver for ScopedVars {
    fn resolve(&self, name: &str) -> Option<VariableValue> {
        self.0.get(name).cloned()
    }
}

/// Scoped variables layered over another resolver
pub struct Layered<'a, R: VariableResolver + ?Sized> {
    scoped: &'a ScopedVars,
    inner: &'a R,
}

impl<'a, R: VariableResolver + ?Sized> Layered<'a, R> {
    pub fn new(scoped: &'a ScopedVars, inner: &'a R) -> Self {
        Self { scoped, inner }
    }
}

impl<R: VariableResolver + ?Sized> VariableResolver for Layered<'_, R> {
    fn resolve(&self, name: &str) -> Option<VariableValue> {
        self.scoped.resolve(name).or_else(|| self.inner.resolve(name))
    }
}
