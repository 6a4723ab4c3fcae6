//! Named helper functions available to the report template.

use std::collections::BTreeMap;

use minijinja::Environment;

use crate::core::parse_decimal;

/// A typed pure function callable from the template.
#[derive(Debug, Clone, Copy)]
pub enum Helper {
    /// text -> number
    Unary(fn(String) -> f64),
    /// number, number -> number
    Binary(fn(f64, f64) -> f64),
    /// integer -> integer
    IntUnary(fn(i64) -> i64),
    /// integer, integer -> integer
    IntBinary(fn(i64, i64) -> i64),
    /// text -> display string
    Format(fn(String) -> String),
    /// sequence of strings, separator -> string
    Join(fn(Vec<String>, String) -> String),
}

/// Mapping from helper name to helper function.
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<&'static str, Helper>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The helper set the stock report template is written against.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("toFloat", Helper::Unary(to_float));
        registry.register("multiply", Helper::Binary(multiply));
        registry.register("identity64", Helper::IntUnary(identity64));
        registry.register("formatDuration", Helper::Format(format_duration));
        registry.register("join", Helper::Join(join));
        registry.register("add", Helper::IntBinary(add));
        registry
    }

    /// Register a helper, replacing any previous one with the same name.
    pub fn register(&mut self, name: &'static str, helper: Helper) -> &mut Self {
        self.helpers.insert(name, helper);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.helpers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    /// Install every helper as a global function of `env`.
    pub(crate) fn install(&self, env: &mut Environment<'static>) {
        for (&name, &helper) in &self.helpers {
            match helper {
                Helper::Unary(f) => env.add_function(name, move |s: String| f(s)),
                Helper::Binary(f) => env.add_function(name, move |a: f64, b: f64| f(a, b)),
                Helper::IntUnary(f) => env.add_function(name, move |i: i64| f(i)),
                Helper::IntBinary(f) => env.add_function(name, move |a: i64, b: i64| f(a, b)),
                Helper::Format(f) => env.add_function(name, move |s: String| f(s)),
                Helper::Join(f) => {
                    env.add_function(name, move |items: Vec<String>, sep: String| f(items, sep))
                }
            }
        }
    }
}

pub fn to_float(text: String) -> f64 {
    parse_decimal(&text)
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

pub fn identity64(i: i64) -> i64 {
    i
}

pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

pub fn join(items: Vec<String>, sep: String) -> String {
    items.join(&sep)
}

/// Render a duration given in seconds as decimal text.
///
/// One second or more prints seconds with two decimals, one millisecond or
/// more prints whole milliseconds, anything smaller whole microseconds.
/// Rounding is half away from zero.
pub fn format_duration(text: String) -> String {
    let secs = parse_decimal(&text);
    if secs >= 1.0 {
        format!("{:.2}s", secs)
    } else if secs >= 0.001 {
        format!("{}ms", (secs * 1_000.0).round() as i64)
    } else {
        format!("{}μs", (secs * 1_000_000.0).round() as i64)
    }
}
