//! Generator parameters.

use std::collections::BTreeMap;
use std::sync::Arc;

use pf_graph::{Component, Port, Settings};
use pf_kernel::GeometryHandle;
use serde_json::{Value, json};

/// Deferred generator invocation: a component that has not been built yet.
#[derive(Debug, Clone)]
pub struct GeneratorCall {
    pub generator: String,
    pub args: Args,
}

impl GeneratorCall {
    pub fn new(generator: impl Into<String>, args: Args) -> Self {
        Self {
            generator: generator.into(),
            args,
        }
    }
}

/// One generator parameter.
///
/// `Pending` and `Built` are the two forms a nested component may take; they
/// fingerprint identically when the built component came from the call.
/// `Handle` is a live kernel handle and can never be fingerprinted.
#[derive(Debug, Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Arg>),
    /// Unordered collection; canonicalized sorted and deduplicated.
    Set(Vec<Arg>),
    Map(BTreeMap<String, Arg>),
    Port(Port),
    Pending(GeneratorCall),
    Built(Arc<Component>),
    Handle(GeometryHandle),
}

impl Arg {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Float(v) => Some(*v),
            Arg::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Arg::Int(v) => Some(*v),
            Arg::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arg]> {
        match self {
            Arg::List(items) | Arg::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Arc<Component>> {
        match self {
            Arg::Built(c) => Some(c),
            _ => None,
        }
    }

    /// True for `Pending` and `Built`.
    pub fn is_component(&self) -> bool {
        matches!(self, Arg::Pending(_) | Arg::Built(_))
    }

    /// Human-readable settings value. Unlike canonicalization this never
    /// fails and keeps floats unrounded.
    pub fn to_value(&self) -> Value {
        match self {
            Arg::Null => Value::Null,
            Arg::Bool(v) => json!(v),
            Arg::Int(v) => json!(v),
            Arg::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Arg::Str(s) => json!(s),
            Arg::List(items) | Arg::Set(items) => {
                Value::Array(items.iter().map(Arg::to_value).collect())
            }
            Arg::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Arg::Port(p) => serde_json::to_value(p).unwrap_or(Value::Null),
            Arg::Pending(call) => json!({
                "generator": call.generator,
                "settings": Value::Object(call.args.to_settings().into_iter().collect()),
            }),
            Arg::Built(c) => json!(c.name()),
            Arg::Handle(h) => json!(h.to_string()),
        }
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<u16> for Arg {
    fn from(v: u16) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<usize> for Arg {
    fn from(v: usize) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v)
    }
}

impl From<Port> for Arg {
    fn from(v: Port) -> Self {
        Arg::Port(v)
    }
}

impl From<GeneratorCall> for Arg {
    fn from(v: GeneratorCall) -> Self {
        Arg::Pending(v)
    }
}

impl From<Arc<Component>> for Arg {
    fn from(v: Arc<Component>) -> Self {
        Arg::Built(v)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Arg::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Arg::Null,
            Value::Bool(b) => Arg::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Arg::Int(i),
                None => Arg::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Arg::Str(s),
            Value::Array(items) => Arg::List(items.into_iter().map(Arg::from).collect()),
            Value::Object(map) => Arg::Map(map.into_iter().map(|(k, v)| (k, Arg::from(v))).collect()),
        }
    }
}

/// Named arguments (sorted by key) plus ordered positional arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    named: BTreeMap<String, Arg>,
    positional: Vec<Arg>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Builder-style positional push.
    pub fn with_positional(mut self, value: impl Into<Arg>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Arg>) -> Option<Arg> {
        self.named.insert(key.into(), value.into())
    }

    pub fn push_positional(&mut self, value: impl Into<Arg>) {
        self.positional.push(value.into());
    }

    /// Remove and return the positional argument at `index`.
    pub fn remove_positional(&mut self, index: usize) -> Option<Arg> {
        if index < self.positional.len() {
            Some(self.positional.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.named.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Arg> {
        self.named.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.named.contains_key(key)
    }

    pub fn named(&self) -> &BTreeMap<String, Arg> {
        &self.named
    }

    pub fn positional(&self) -> &[Arg] {
        &self.positional
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }

    /// `self` layered on top of `defaults`: named keys from `self` win,
    /// positional args come from `self` when it has any.
    pub fn merged_over(&self, defaults: &Args) -> Args {
        let mut named = defaults.named.clone();
        for (k, v) in &self.named {
            named.insert(k.clone(), v.clone());
        }
        let positional = if self.positional.is_empty() {
            defaults.positional.clone()
        } else {
            self.positional.clone()
        };
        Args { named, positional }
    }

    /// Settings record of these arguments.
    pub fn to_settings(&self) -> Settings {
        let mut settings: Settings = self
            .named
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect();
        if !self.positional.is_empty() {
            settings.insert(
                "$positional".to_string(),
                Value::Array(self.positional.iter().map(Arg::to_value).collect()),
            );
        }
        settings
    }
}

impl FromIterator<(String, Arg)> for Args {
    fn from_iter<I: IntoIterator<Item = (String, Arg)>>(iter: I) -> Self {
        Args {
            named: iter.into_iter().collect(),
            positional: Vec::new(),
        }
    }
}
