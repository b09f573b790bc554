//! Variable reference substitution
//!
//! Recognised references: `$name`, `[[name]]`, `[[name:format]]`,
//! `${name}` and `${name:format}`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::variables::{VariableResolver, VariableValue};

static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\w+)|\[\[(\w+?)(?::(\w+))?\]\]|\$\{(\w+)(?:\.([^:^\}]+))?(?::([^\}]+))?\}")
        .expect("variable pattern is a valid regex")
});

/// How a resolved value is rendered into text
#[derive(Clone, Copy)]
pub enum VariableFormat<'a> {
    /// Single values as is, several values as a glob `{a,b}`
    Default,
    /// `a,b`
    Csv,
    /// `a|b`
    Pipe,
    /// Escaped for use in a regular expression, several values as `(a|b)`
    Regex,
    /// Values joined with `,` and nothing else
    Raw,
    /// Caller supplied rendering
    Custom(&'a dyn Fn(&VariableValue) -> String),
}

impl VariableFormat<'static> {
    /// Format named in a template reference such as `${zone:csv}`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "csv" => Some(VariableFormat::Csv),
            "pipe" => Some(VariableFormat::Pipe),
            "regex" => Some(VariableFormat::Regex),
            "raw" => Some(VariableFormat::Raw),
            "glob" => Some(VariableFormat::Default),
            _ => None,
        }
    }
}

impl std::fmt::Debug for VariableFormat<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VariableFormat::Default => "Default",
            VariableFormat::Csv => "Csv",
            VariableFormat::Pipe => "Pipe",
            VariableFormat::Regex => "Regex",
            VariableFormat::Raw => "Raw",
            VariableFormat::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

impl VariableFormat<'_> {
    /// Render a value in this format
    pub fn apply(&self, value: &VariableValue) -> String {
        let values = value.values();
        match self {
            VariableFormat::Default => match value {
                VariableValue::Single(v) => v.clone(),
                VariableValue::Multi(vs) if vs.len() == 1 => vs[0].clone(),
                VariableValue::Multi(vs) => format!("{{{}}}", vs.join(",")),
            },
            VariableFormat::Csv | VariableFormat::Raw => values.join(","),
            VariableFormat::Pipe => values.join("|"),
            VariableFormat::Regex => {
                let escaped: Vec<String> = values.iter().map(|v| escape_regex(v)).collect();
                match escaped.as_slice() {
                    [one] => one.clone(),
                    many => format!("({})", many.join("|")),
                }
            }
            VariableFormat::Custom(render) => render(value),
        }
    }
}

fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if "\\^$*+?.()|[]{}/".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Replace every resolvable reference in `template`
///
/// References whose variable is unknown are left as written. A format named
/// in the reference wins over `format`.
pub fn replace<R: VariableResolver + ?Sized>(template: &str, resolver: &R, format: VariableFormat<'_>) -> String {
    if !template.contains('$') && !template.contains("[[") {
        return template.to_string();
    }

    VARIABLE_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(4));
            let named_format = caps.get(3).or_else(|| caps.get(6));

            let Some(name) = name else {
                return caps[0].to_string();
            };
            let Some(value) = resolver.resolve(name.as_str()) else {
                return caps[0].to_string();
            };

            let format = named_format
                .and_then(|f| VariableFormat::from_name(f.as_str()))
                .unwrap_or(format);
            format.apply(&value)
        })
        .into_owned()
}

/// Whether `text` references any variable, resolvable or not
pub fn has_variables(text: &str) -> bool {
    VARIABLE_REGEX.is_match(text)
}

/// Names of the variables referenced in `text`, in order of appearance
pub fn variable_names(text: &str) -> Vec<&str> {
    VARIABLE_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(4)))
        .map(|m| m.as_str())
        .collect()
}
