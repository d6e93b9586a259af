//! Core traits for parametric generators.

use std::sync::Arc;

use pf_cache::{Arg, Args};
use pf_graph::{Component, ComponentBuilder};
use pf_kernel::Layer;

use crate::error::{ComponentError, ComponentResult};
use crate::session::Session;

/// Resolved parameters handed to a generator.
///
/// Declared defaults are already merged in and every nested `Pending`
/// component has been built, so component parameters are always `Built`.
/// `name` is the name the result will be sealed under; builders should be
/// created with it so cycle checks see the real name.
#[derive(Debug, Clone)]
pub struct Params {
    generator: String,
    name: String,
    args: Args,
}

impl Params {
    /// Parameters for a result named after the generator itself.
    pub fn new(generator: impl Into<String>, args: Args) -> Self {
        let generator = generator.into();
        Self {
            name: generator.clone(),
            generator,
            args,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.args.get(key).filter(|a| !matches!(a, Arg::Null))
    }

    pub fn missing(&self, key: &str) -> ComponentError {
        ComponentError::MissingParam {
            generator: self.generator.clone(),
            param: key.to_string(),
        }
    }

    pub fn invalid(&self, key: &str, reason: impl Into<String>) -> ComponentError {
        ComponentError::InvalidParam {
            generator: self.generator.clone(),
            param: key.to_string(),
            reason: reason.into(),
        }
    }

    fn require(&self, key: &str) -> ComponentResult<&Arg> {
        self.get(key).ok_or_else(|| self.missing(key))
    }

    pub fn f64(&self, key: &str) -> ComponentResult<f64> {
        let v = self
            .require(key)?
            .as_f64()
            .ok_or_else(|| self.invalid(key, "expected a number"))?;
        pf_core::ensure_finite(v, "parameter").map_err(|e| self.invalid(key, e.to_string()))
    }

    /// Number that must be strictly positive.
    pub fn positive(&self, key: &str) -> ComponentResult<f64> {
        let v = self.f64(key)?;
        if v <= 0.0 {
            return Err(self.invalid(key, format!("must be > 0, got {v}")));
        }
        Ok(v)
    }

    pub fn f64_or(&self, key: &str, fallback: f64) -> ComponentResult<f64> {
        match self.get(key) {
            Some(_) => self.f64(key),
            None => Ok(fallback),
        }
    }

    pub fn usize(&self, key: &str) -> ComponentResult<usize> {
        let v = self
            .require(key)?
            .as_i64()
            .ok_or_else(|| self.invalid(key, "expected an integer"))?;
        usize::try_from(v).map_err(|_| self.invalid(key, format!("must be >= 0, got {v}")))
    }

    pub fn bool(&self, key: &str) -> ComponentResult<bool> {
        self.require(key)?
            .as_bool()
            .ok_or_else(|| self.invalid(key, "expected a boolean"))
    }

    pub fn str(&self, key: &str) -> ComponentResult<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| self.invalid(key, "expected a string"))
    }

    /// Two-number parameter such as a `size`.
    pub fn pair(&self, key: &str) -> ComponentResult<(f64, f64)> {
        let items = self
            .require(key)?
            .as_list()
            .ok_or_else(|| self.invalid(key, "expected a two-element list"))?;
        match items {
            [a, b] => {
                let a = a.as_f64().ok_or_else(|| self.invalid(key, "expected numbers"))?;
                let b = b.as_f64().ok_or_else(|| self.invalid(key, "expected numbers"))?;
                Ok((a, b))
            }
            _ => Err(self.invalid(key, "expected a two-element list")),
        }
    }

    /// Layer given as `[layer, datatype]` or `"layer/datatype"`.
    pub fn layer(&self, key: &str) -> ComponentResult<Layer> {
        let arg = self.require(key)?;
        let parsed = match arg {
            Arg::Str(s) => s.split_once('/').and_then(|(l, d)| {
                Some(Layer::new(l.trim().parse().ok()?, d.trim().parse().ok()?))
            }),
            Arg::List(items) => match items.as_slice() {
                [l, d] => l
                    .as_i64()
                    .zip(d.as_i64())
                    .and_then(|(l, d)| Some(Layer::new(u16::try_from(l).ok()?, u16::try_from(d).ok()?))),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(key, "expected [layer, datatype] or \"layer/datatype\""))
    }

    pub fn component(&self, key: &str) -> ComponentResult<Arc<Component>> {
        self.require(key)?
            .as_component()
            .cloned()
            .ok_or_else(|| self.invalid(key, "expected a component"))
    }
}

/// Pure parametric generator.
///
/// Generators are deterministic functions of their parameters: the session
/// caches their output by fingerprint and hands the same `Arc<Component>`
/// to every caller. Implementations must therefore not depend on anything
/// but `params` (and components obtained through `session`).
pub trait Generator: Send + Sync {
    /// Stable identifier, part of every fingerprint.
    fn id(&self) -> &str;

    /// Declared parameter defaults, merged under the supplied arguments.
    fn defaults(&self) -> Args {
        Args::new()
    }

    /// Produce the component's contents. The session names, fingerprints
    /// and seals the returned builder.
    fn generate(&self, session: &Session, params: &Params) -> ComponentResult<ComponentBuilder>;
}

type GenerateFn =
    dyn Fn(&Session, &Params) -> ComponentResult<ComponentBuilder> + Send + Sync + 'static;

/// Generator backed by a closure.
pub struct FnGenerator {
    id: String,
    defaults: Args,
    body: Box<GenerateFn>,
}

impl FnGenerator {
    pub fn new<F>(id: impl Into<String>, defaults: Args, body: F) -> Self
    where
        F: Fn(&Session, &Params) -> ComponentResult<ComponentBuilder> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            defaults,
            body: Box::new(body),
        }
    }
}

impl Generator for FnGenerator {
    fn id(&self) -> &str {
        &self.id
    }

    fn defaults(&self) -> Args {
        self.defaults.clone()
    }

    fn generate(&self, session: &Session, params: &Params) -> ComponentResult<ComponentBuilder> {
        (self.body)(session, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(args: Args) -> Params {
        Params::new("test", args)
    }

    #[test]
    fn numbers_and_missing() {
        let p = params(Args::new().with("length", 10).with("width", -1.0));
        assert_eq!(p.f64("length").unwrap(), 10.0);
        assert!(matches!(
            p.positive("width"),
            Err(ComponentError::InvalidParam { .. })
        ));
        assert!(matches!(
            p.f64("radius"),
            Err(ComponentError::MissingParam { .. })
        ));
        assert_eq!(p.f64_or("radius", 5.0).unwrap(), 5.0);
    }

    #[test]
    fn null_counts_as_missing() {
        let p = params(Args::new().with("width2", Arg::Null));
        assert!(p.get("width2").is_none());
        assert_eq!(p.f64_or("width2", 0.5).unwrap(), 0.5);
    }

    #[test]
    fn layer_forms() {
        let p = params(
            Args::new()
                .with("a", vec![49, 0])
                .with("b", "1/0")
                .with("c", "oops"),
        );
        assert_eq!(p.layer("a").unwrap(), Layer::M3);
        assert_eq!(p.layer("b").unwrap(), Layer::WG);
        assert!(p.layer("c").is_err());
    }

    #[test]
    fn pair_and_usize() {
        let p = params(Args::new().with("size", vec![100.0, 50.0]).with("n", 3).with("neg", -2));
        assert_eq!(p.pair("size").unwrap(), (100.0, 50.0));
        assert_eq!(p.usize("n").unwrap(), 3);
        assert!(p.usize("neg").is_err());
    }
}
