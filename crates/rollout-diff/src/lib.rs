#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Path-diff engine: semantic equality of two nested structures modulo a
//! list of excluded paths (§4.A).
//!
//! `excluded_paths` are ordered, dot-separated, and may traverse into list
//! elements implicitly: when a path segment resolves to an array, the
//! remaining path is applied to every element of that array rather than to
//! the array itself. A path whose prefix does not exist anywhere in the
//! tree is a no-op, never an error.

mod metadata;
mod value;

pub use metadata::{metadata_needs_update, MANAGED_ANNOTATION_KEYS, MANAGED_LABEL_KEYS};
pub use value::{deep_equal, needs_update};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_values_never_need_update() {
        let v = json!({"a": 1, "b": [1, 2, {"c": "x"}]});
        assert!(!needs_update(&v, &v, &[]));
    }

    #[test]
    fn scalar_change_is_detected() {
        let old = json!({"interStepBufferServiceName": "a"});
        let new = json!({"interStepBufferServiceName": "b"});
        assert!(needs_update(&old, &new, &[]));
    }

    #[test]
    fn excluded_scalar_path_is_ignored() {
        let old = json!({"interStepBufferServiceName": "a"});
        let new = json!({"interStepBufferServiceName": "b"});
        assert!(!needs_update(&old, &new, &["interStepBufferServiceName".to_string()]));
    }

    #[test]
    fn excluded_path_inside_every_list_element() {
        let old = json!({"vertices": [{"name": "in", "scale": 1}, {"name": "out", "scale": 1}]});
        let new = json!({"vertices": [{"name": "in2", "scale": 1}, {"name": "out2", "scale": 1}]});
        assert!(needs_update(&old, &new, &[]));
        assert!(!needs_update(&old, &new, &["vertices.name".to_string()]));
    }

    #[test]
    fn excluded_path_survives_unrelated_change() {
        let old = json!({"interStepBufferServiceName": "a", "vertices": [{"name": "in"}]});
        let new = json!({"interStepBufferServiceName": "b", "vertices": [{"name": "in2"}]});
        // scenario 3: same exclusion as scenario 2, but another field also changed
        assert!(needs_update(&old, &new, &["interStepBufferServiceName".to_string()]));
    }

    #[test]
    fn missing_prefix_is_a_no_op_not_an_error() {
        let old = json!({"a": 1});
        let new = json!({"a": 2});
        assert!(needs_update(&old, &new, &["nonexistent.nested.path".to_string()]));
    }

    #[test]
    fn overlapping_exclusions_are_idempotent() {
        let old = json!({"a": {"b": 1, "c": 2}});
        let new = json!({"a": {"b": 9, "c": 9}});
        let paths = vec!["a.b".to_string(), "a".to_string()];
        // "a" alone already deletes the whole subtree; adding "a.b" first changes nothing.
        assert!(!needs_update(&old, &new, &paths));
    }

    #[test]
    fn integer_and_float_representations_compare_equal() {
        let old = json!({"scale": 5});
        let new = json!({"scale": 5.0});
        assert!(!needs_update(&old, &new, &[]));
    }

    #[test]
    fn missing_key_is_unequal_to_present_key() {
        let old = json!({"a": 1});
        let new = json!({"a": 1, "b": 2});
        assert!(needs_update(&old, &new, &[]));
    }

    #[test]
    fn monotonicity_more_exclusions_can_only_shrink_the_diff() {
        let old = json!({"a": 1, "b": 2});
        let new = json!({"a": 9, "b": 2});
        let q: Vec<String> = vec![];
        let p: Vec<String> = vec!["a".to_string()];
        // P excludes more than Q; if P still finds a diff, Q (seeing more) must too.
        if needs_update(&old, &new, &p) {
            assert!(needs_update(&old, &new, &q));
        }
    }
}
