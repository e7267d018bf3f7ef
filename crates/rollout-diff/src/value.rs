//! Deep structural comparison and excluded-path deletion over `serde_json::Value` trees.

use serde_json::{Number, Value};
use std::collections::BTreeSet;

/// `needsUpdate(old, new, excludedPaths)` from §4.A: deletes every excluded
/// path from deep clones of both sides, then deep-compares what remains.
#[must_use]
pub fn needs_update(old: &Value, new: &Value, excluded_paths: &[String]) -> bool {
    let mut old_pruned = old.clone();
    let mut new_pruned = new.clone();

    for path in excluded_paths {
        let segments = split_path(path);
        if segments.is_empty() {
            continue;
        }
        delete_path(&mut old_pruned, &segments);
        delete_path(&mut new_pruned, &segments);
    }

    !deep_equal(&old_pruned, &new_pruned)
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Deletes `path` from `value`. When traversal reaches an array before the
/// path is exhausted, the remaining path is applied to every element
/// (arrays carry no path segment of their own). A path whose prefix does
/// not exist is a no-op.
fn delete_path(value: &mut Value, path: &[&str]) {
    if path.is_empty() {
        return;
    }
    match value {
        Value::Array(items) => {
            for item in items {
                delete_path(item, path);
            }
        }
        Value::Object(map) => {
            if path.len() == 1 {
                map.remove(path[0]);
            } else if let Some(child) = map.get_mut(path[0]) {
                delete_path(child, &path[1..]);
            }
        }
        // Scalars have no subtree to delete into; the prefix is simply absent here.
        _ => {}
    }
}

/// Deep structural equality, modulo numeric representation (integer `5`
/// equals float `5.0`) and modulo key presence rules: a key missing on one
/// side is unequal to any present value on the other, and equal only when
/// absent on both (enforced implicitly by iterating the key union).
#[must_use]
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(xi, yi)| deep_equal(xi, yi))
        }
        (Value::Object(x), Value::Object(y)) => {
            let keys: BTreeSet<&String> = x.keys().chain(y.keys()).collect();
            keys.into_iter().all(|k| match (x.get(k), y.get(k)) {
                (Some(xv), Some(yv)) => deep_equal(xv, yv),
                (None, None) => true,
                _ => false,
            })
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
