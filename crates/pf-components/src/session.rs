//! Process-scoped build state.

use std::sync::Arc;

use pf_cache::{Arg, Args, BuildCache, CacheError, GeneratorCall, fingerprint};
use pf_core::Fingerprint;
use pf_graph::{Component, ComponentBuilder, ModelError};
use pf_kernel::{GeometryKernel, MemoryKernel};
use rayon::prelude::*;
use serde_json::json;
use tracing::debug;

use crate::error::ComponentResult;
use crate::library::Library;
use crate::traits::Params;

/// Geometry kernel, build cache and generator library, passed explicitly to
/// every build and combinator.
///
/// A session is `Send + Sync`; independent builds may run on many threads
/// against one session and share its cache.
pub struct Session {
    kernel: Arc<dyn GeometryKernel>,
    cache: BuildCache,
    library: Library,
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Session {
    pub fn new(kernel: Arc<dyn GeometryKernel>, library: Library) -> Self {
        Self {
            kernel,
            cache: BuildCache::new(),
            library,
        }
    }

    /// In-memory kernel with the standard library.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKernel::new()), Library::standard())
    }

    pub fn kernel(&self) -> &dyn GeometryKernel {
        self.kernel.as_ref()
    }

    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Build (or fetch) `generator_id` invoked with `args`.
    ///
    /// Declared defaults are merged under `args` and nested `Pending`
    /// arguments are built before fingerprinting, so spelling out a default
    /// value does not create a second component. The result is named
    /// `{generator_id}_{short fingerprint}`.
    pub fn build(&self, generator_id: &str, args: Args) -> ComponentResult<Arc<Component>> {
        self.build_inner(generator_id, args, None)
    }

    /// Like [`Session::build`] with an explicit component name.
    ///
    /// The name takes part in the fingerprint: the same arguments built
    /// with and without a name give two distinct components.
    pub fn build_named(
        &self,
        generator_id: &str,
        args: Args,
        name: &str,
    ) -> ComponentResult<Arc<Component>> {
        self.build_inner(generator_id, args, Some(name))
    }

    pub fn build_call(&self, call: &GeneratorCall) -> ComponentResult<Arc<Component>> {
        self.build(&call.generator, call.args.clone())
    }

    /// Build independent calls in parallel. Results keep the input order.
    pub fn build_many(&self, calls: &[GeneratorCall]) -> Vec<ComponentResult<Arc<Component>>> {
        calls.par_iter().map(|c| self.build_call(c)).collect()
    }

    fn build_inner(
        &self,
        generator_id: &str,
        args: Args,
        name: Option<&str>,
    ) -> ComponentResult<Arc<Component>> {
        let generator = self.library.get(generator_id)?;
        // Nested components are built before hashing so that a pending call
        // and its built component always yield the same fingerprint.
        let resolved = self.resolve(&args.merged_over(&generator.defaults()))?;
        // An explicit name is part of the identity, so a named build never
        // aliases (or renames) the anonymous one.
        let mut key = resolved.clone();
        if let Some(n) = name {
            key.insert("$name", n);
        }
        let fp = fingerprint(generator_id, &key)?;
        let name = match name {
            Some(n) => n.to_string(),
            None => format!("{generator_id}_{}", fp.short()),
        };

        self.cached(fp, &name, || {
            debug!(generator = generator_id, name = %name, "running generator");
            let params = Params::new(generator_id, resolved).named(name.as_str());
            let mut b = generator.generate(self, &params)?;
            let derived = std::mem::take(b.settings_mut());
            let mut settings = params.args().to_settings();
            settings.extend(derived);
            *b.settings_mut() = settings;
            b.set_provenance("generator", json!(generator_id));
            Ok(b)
        })
    }

    /// Seal the builder produced by `build` under `fp` and `name`, at most
    /// once per fingerprint.
    ///
    /// This is the memoization entry point shared by generators and
    /// combinators.
    pub fn cached<E, F>(&self, fp: Fingerprint, name: &str, build: F) -> Result<Arc<Component>, E>
    where
        E: From<CacheError> + From<ModelError>,
        F: FnOnce() -> Result<ComponentBuilder, E>,
    {
        self.cache.get_or_build(fp, || {
            let mut b = build()?;
            b.rename(name)?;
            b.set_fingerprint(fp);
            Ok(b.build(self.kernel())?)
        })
    }

    /// Build every `Pending` argument, recursively.
    pub fn resolve(&self, args: &Args) -> ComponentResult<Args> {
        let mut out = Args::new();
        for (k, v) in args.named() {
            out.insert(k.clone(), self.resolve_arg(v)?);
        }
        for v in args.positional() {
            out.push_positional(self.resolve_arg(v)?);
        }
        Ok(out)
    }

    pub fn resolve_arg(&self, arg: &Arg) -> ComponentResult<Arg> {
        Ok(match arg {
            Arg::Pending(call) => Arg::Built(self.build_call(call)?),
            Arg::List(items) => Arg::List(
                items
                    .iter()
                    .map(|a| self.resolve_arg(a))
                    .collect::<ComponentResult<_>>()?,
            ),
            Arg::Set(items) => Arg::Set(
                items
                    .iter()
                    .map(|a| self.resolve_arg(a))
                    .collect::<ComponentResult<_>>()?,
            ),
            Arg::Map(map) => {
                let mut out = std::collections::BTreeMap::new();
                for (k, v) in map {
                    out.insert(k.clone(), self.resolve_arg(v)?);
                }
                Arg::Map(out)
            }
            other => other.clone(),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("kernel", &self.kernel.name())
            .field("cache", &self.cache.stats())
            .field("library", &self.library)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn session_is_send_sync() {
        assert_send_sync::<Session>();
    }

    #[test]
    fn defaults_do_not_split_the_cache() {
        let s = Session::in_memory();
        let a = s.build("straight", Args::new()).unwrap();
        let b = s.build("straight", Args::new().with("length", 10.0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.name().starts_with("straight_"));
        assert_eq!(s.cache().stats().builds, 1);
    }

    #[test]
    fn pending_args_are_built_first() {
        let s = Session::in_memory();
        let inner = GeneratorCall::new("straight", Args::new().with("length", 3.0));
        let resolved = s
            .resolve(&Args::new().with("component", inner.clone()))
            .unwrap();
        let built = resolved
            .get("component")
            .and_then(Arg::as_component)
            .unwrap();
        assert!(Arc::ptr_eq(built, &s.build_call(&inner).unwrap()));
    }
}
