//! Injection policy
//!
//! Decides from a pod's namespace and annotations whether the sidecar should be
//! injected. The exclusion set is fixed at startup; nothing here depends on
//! request state beyond the two inputs.

use std::collections::{BTreeMap, BTreeSet};

use crate::{INJECT_ANNOTATION, NAMESPACE_SYSTEM, STATUS_ANNOTATION, STATUS_INJECTED};

/// Trigger values accepted (after lower-casing) as an injection request
const TRIGGER_VALUES: [&str; 2] = ["enabled", "true"];

/// Namespace-and-annotation policy for sidecar injection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionPolicy {
    excluded_namespaces: BTreeSet<String>,
}

impl Default for InjectionPolicy {
    fn default() -> Self {
        Self::new([NAMESPACE_SYSTEM])
    }
}

impl InjectionPolicy {
    /// Create a policy that never mutates pods in the given namespaces
    pub fn new<I, S>(excluded_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_namespaces: excluded_namespaces.into_iter().map(Into::into).collect(),
        }
    }

    /// Namespaces this policy never mutates
    pub fn excluded_namespaces(&self) -> impl Iterator<Item = &str> {
        self.excluded_namespaces.iter().map(String::as_str)
    }

    /// Whether the namespace is on the exclusion list
    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.excluded_namespaces.contains(namespace)
    }

    /// Whether a pod in `namespace` carrying `annotations` should be mutated
    ///
    /// Excluded namespaces always yield `false`. Otherwise the trigger
    /// annotation must read `enabled` or `true`, compared case-insensitively.
    pub fn required(&self, namespace: &str, annotations: &BTreeMap<String, String>) -> bool {
        if self.is_excluded(namespace) {
            return false;
        }

        annotations
            .get(INJECT_ANNOTATION)
            .map(|value| value.to_lowercase())
            .is_some_and(|value| TRIGGER_VALUES.contains(&value.as_str()))
    }

    /// Whether the status annotation shows a previous injection
    pub fn already_injected(annotations: &BTreeMap<String, String>) -> bool {
        annotations
            .get(STATUS_ANNOTATION)
            .is_some_and(|value| value == STATUS_INJECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_excludes_kube_system() {
        let policy = InjectionPolicy::default();
        assert!(policy.is_excluded("kube-system"));
        assert!(!policy.is_excluded("default"));
        assert_eq!(policy.excluded_namespaces().collect::<Vec<_>>(), vec!["kube-system"]);
    }

    #[test]
    fn test_excluded_namespace_ignores_annotations() {
        let policy = InjectionPolicy::new(["kube-system", "kube-public"]);
        for value in ["true", "enabled", "TRUE", "Enabled"] {
            let ann = annotations(&[(INJECT_ANNOTATION, value)]);
            assert!(!policy.required("kube-system", &ann));
            assert!(!policy.required("kube-public", &ann));
        }
    }

    #[test]
    fn test_trigger_values_are_case_insensitive() {
        let policy = InjectionPolicy::default();
        for value in ["true", "TRUE", "True", "enabled", "ENABLED", "Enabled", "eNaBlEd"] {
            let ann = annotations(&[(INJECT_ANNOTATION, value)]);
            assert!(policy.required("default", &ann), "value {value:?} should trigger");
        }
    }

    #[test]
    fn test_other_values_do_not_trigger() {
        let policy = InjectionPolicy::default();
        for value in ["false", "disabled", "yes", "1", "", " true", "true "] {
            let ann = annotations(&[(INJECT_ANNOTATION, value)]);
            assert!(!policy.required("default", &ann), "value {value:?} should not trigger");
        }
    }

    #[test]
    fn test_absent_trigger_does_not_trigger() {
        let policy = InjectionPolicy::default();
        assert!(!policy.required("default", &BTreeMap::new()));

        let ann = annotations(&[("unrelated", "true"), (STATUS_ANNOTATION, "true")]);
        assert!(!policy.required("default", &ann));
    }

    #[test]
    fn test_empty_exclusion_set_allows_every_namespace() {
        let policy = InjectionPolicy::new(Vec::<String>::new());
        let ann = annotations(&[(INJECT_ANNOTATION, "true")]);
        assert!(policy.required("kube-system", &ann));
    }

    #[test]
    fn test_already_injected() {
        assert!(InjectionPolicy::already_injected(&annotations(&[(
            STATUS_ANNOTATION,
            STATUS_INJECTED
        )])));
        assert!(!InjectionPolicy::already_injected(&annotations(&[(
            STATUS_ANNOTATION,
            "pending"
        )])));
        assert!(!InjectionPolicy::already_injected(&BTreeMap::new()));
    }

    /// Story: the status annotation alone never changes the policy verdict
    #[test]
    fn story_required_does_not_consult_status() {
        let policy = InjectionPolicy::default();
        let ann = annotations(&[(INJECT_ANNOTATION, "true"), (STATUS_ANNOTATION, STATUS_INJECTED)]);
        assert!(policy.required("default", &ann));
    }

    /// Story: pods annotated for the existing deployment keep getting injected
    #[test]
    fn story_deployed_annotation_keys_are_honored() {
        let policy = InjectionPolicy::default();
        let ann = annotations(&[("thejasbabu.packetSniffer.inject", "enabled")]);
        assert!(policy.required("default", &ann));

        let other_scheme = annotations(&[("packet-sniffer.io/inject", "true")]);
        assert!(!policy.required("default", &other_scheme));

        assert!(InjectionPolicy::already_injected(&annotations(&[(
            "thejasbabu.packetSniffer.status",
            "injected"
        )])));
    }
}
