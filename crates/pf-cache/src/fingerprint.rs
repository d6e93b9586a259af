//! Canonical serialization and content fingerprints.
//!
//! Canonical form rules:
//! - object keys are sorted (serde_json maps are ordered)
//! - floats are rounded to `FINGERPRINT_DIGITS` decimals, `-0.0` folds into
//!   `0.0`, and integral values hash like the equal integer
//! - sets are sorted and deduplicated
//! - nested components hash as `{"fingerprint": <hex>}`
//! - positional arguments sit under the reserved key `$positional`

use pf_core::{FINGERPRINT_DIGITS, Fingerprint, round_to_digits};
use pf_graph::Port;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

use crate::args::{Arg, Args};
use crate::{CacheError, CacheResult};

const POSITIONAL_KEY: &str = "$positional";

fn child(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn canon_float(v: f64, path: &str) -> CacheResult<Value> {
    if !v.is_finite() {
        return Err(CacheError::UnserializableArgument {
            path: path.to_string(),
            reason: format!("non-finite float {v}"),
        });
    }
    let r = round_to_digits(v, FINGERPRINT_DIGITS);
    if r.fract() == 0.0 && r.abs() < 1.0e15 {
        return Ok(json!(r as i64));
    }
    serde_json::Number::from_f64(r)
        .map(Value::Number)
        .ok_or_else(|| CacheError::UnserializableArgument {
            path: path.to_string(),
            reason: format!("float {v} has no JSON form"),
        })
}

fn canon_port(p: &Port, path: &str) -> CacheResult<Value> {
    Ok(json!({
        "name": p.name,
        "center": [canon_float(p.center.x, path)?, canon_float(p.center.y, path)?],
        "orientation": canon_float(p.orientation, path)?,
        "width": canon_float(p.width, path)?,
        "kind": p.kind.to_string(),
        "layer": [p.layer.layer, p.layer.datatype],
    }))
}

fn canon(arg: &Arg, path: &str) -> CacheResult<Value> {
    Ok(match arg {
        Arg::Null => Value::Null,
        Arg::Bool(v) => json!(v),
        Arg::Int(v) => json!(v),
        Arg::Float(v) => canon_float(*v, path)?,
        Arg::Str(s) => json!(s),
        Arg::List(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, a)| canon(a, &child(path, &i.to_string())))
                .collect::<CacheResult<Vec<_>>>()?,
        ),
        Arg::Set(items) => {
            let mut encoded = Vec::with_capacity(items.len());
            for (i, a) in items.iter().enumerate() {
                let v = canon(a, &child(path, &i.to_string()))?;
                encoded.push((serde_json::to_string(&v)?, v));
            }
            encoded.sort_by(|a, b| a.0.cmp(&b.0));
            encoded.dedup_by(|a, b| a.0 == b.0);
            Value::Array(encoded.into_iter().map(|(_, v)| v).collect())
        }
        Arg::Map(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), canon(v, &child(path, k))?);
            }
            Value::Object(out)
        }
        Arg::Port(p) => canon_port(p, path)?,
        Arg::Pending(call) => json!({
            "fingerprint": fingerprint(&call.generator, &call.args)?.to_hex()
        }),
        Arg::Built(c) => match c.fingerprint() {
            Some(fp) => json!({ "fingerprint": fp.to_hex() }),
            None => json!({ "component": c.name() }),
        },
        Arg::Handle(h) => {
            return Err(CacheError::UnserializableArgument {
                path: path.to_string(),
                reason: format!("live geometry handle {h}"),
            });
        }
    })
}

/// Canonical JSON value of a single argument.
pub fn canonicalize(arg: &Arg) -> CacheResult<Value> {
    canon(arg, "")
}

/// Canonical JSON object of an argument set.
pub fn canonical_value(args: &Args) -> CacheResult<Value> {
    let mut out = Map::new();
    for (k, v) in args.named() {
        out.insert(k.clone(), canon(v, k)?);
    }
    if !args.positional().is_empty() {
        let mut items = Vec::with_capacity(args.positional().len());
        for (i, a) in args.positional().iter().enumerate() {
            items.push(canon(a, &child(POSITIONAL_KEY, &i.to_string()))?);
        }
        out.insert(POSITIONAL_KEY.to_string(), Value::Array(items));
    }
    Ok(Value::Object(out))
}

/// Canonical bytes of an argument set.
pub fn canonical_bytes(args: &Args) -> CacheResult<Vec<u8>> {
    Ok(serde_json::to_vec(&canonical_value(args)?)?)
}

/// Fingerprint of `generator_id` invoked with `args`.
pub fn fingerprint(generator_id: &str, args: &Args) -> CacheResult<Fingerprint> {
    let bytes = canonical_bytes(args)?;

    let mut hasher = Sha256::new();
    hasher.update(generator_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(&bytes);

    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Ok(Fingerprint::from_digest(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::GeneratorCall;
    use pf_core::pt;
    use pf_kernel::GeometryHandle;

    #[test]
    fn fingerprint_stability() {
        let args = Args::new().with("length", 10.0).with("width", 0.5);
        let a = fingerprint("straight", &args).unwrap();
        let b = fingerprint("straight", &args).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, fingerprint("taper", &args).unwrap());
    }

    #[test]
    fn float_noise_is_absorbed() {
        let a = Args::new().with("x", 0.1 + 0.2);
        let b = Args::new().with("x", 0.3);
        assert_eq!(fingerprint("g", &a).unwrap(), fingerprint("g", &b).unwrap());
        let c = Args::new().with("x", 0.3 + 1e-6);
        assert_ne!(fingerprint("g", &a).unwrap(), fingerprint("g", &c).unwrap());
    }

    #[test]
    fn negative_zero_and_integers_fold() {
        let a = Args::new().with("x", -0.0).with("n", 2.0);
        let b = Args::new().with("x", 0.0).with("n", 2);
        assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
    }

    #[test]
    fn sets_ignore_order_and_duplicates() {
        let a = Args::new().with(
            "layers",
            Arg::Set(vec![Arg::from("wg"), Arg::from("m3"), Arg::from("wg")]),
        );
        let b = Args::new().with("layers", Arg::Set(vec![Arg::from("m3"), Arg::from("wg")]));
        assert_eq!(fingerprint("g", &a).unwrap(), fingerprint("g", &b).unwrap());
    }

    #[test]
    fn lists_keep_order() {
        let a = Args::new().with("xs", vec![1, 2]);
        let b = Args::new().with("xs", vec![2, 1]);
        assert_ne!(fingerprint("g", &a).unwrap(), fingerprint("g", &b).unwrap());
    }

    #[test]
    fn positional_differs_from_named() {
        let a = Args::new().with_positional(1.0);
        let b = Args::new().with("0", 1.0);
        assert_ne!(fingerprint("g", &a).unwrap(), fingerprint("g", &b).unwrap());
    }

    #[test]
    fn pending_call_hashes_as_its_fingerprint() {
        let call = GeneratorCall::new("straight", Args::new().with("length", 5.0));
        let expected = fingerprint("straight", &call.args).unwrap();
        let v = canonicalize(&Arg::Pending(call)).unwrap();
        assert_eq!(v, json!({ "fingerprint": expected.to_hex() }));
    }

    #[test]
    fn handle_is_rejected_with_path() {
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("shape".to_string(), Arg::Handle(GeometryHandle::from_raw(3)));
        let args = Args::new().with("opts", Arg::Map(inner));
        match fingerprint("g", &args).unwrap_err() {
            CacheError::UnserializableArgument { path, .. } => assert_eq!(path, "opts.shape"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn nan_is_rejected() {
        let args = Args::new().with_positional(vec![Arg::Float(f64::NAN)]);
        match canonical_bytes(&args).unwrap_err() {
            CacheError::UnserializableArgument { path, .. } => assert_eq!(path, "$positional.0.0"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn ports_canonicalize_rounded() {
        let p = Port::new("o1", pt(1.0000000001, 0.0), 0.0, 0.5);
        let v = canonicalize(&Arg::Port(p)).unwrap();
        assert_eq!(v["center"], json!([1, 0]));
        assert_eq!(v["kind"], json!("optical"));
    }
}
