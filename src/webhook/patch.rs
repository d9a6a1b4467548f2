//! JSON patch construction
//!
//! Turns a rendered sidecar and the annotations to record into RFC 6902 `add`
//! operations. The container append always comes first, followed by one
//! operation per annotation in key order.

use std::collections::BTreeMap;

use json_patch::{AddOperation, PatchOperation};
use jsonptr::PointerBuf;
use tracing::warn;

use crate::workload::{has_image, ContainerSpec};

/// Build the patch that injects `container` and records `annotations`
///
/// A container without an image is skipped rather than appended empty.
/// Annotation keys are escaped as JSON Pointer tokens, so `a/b` lands at
/// `/metadata/annotations/a~1b`.
pub fn build_patch_operations(
    container: &ContainerSpec,
    annotations: &BTreeMap<String, String>,
) -> Result<Vec<PatchOperation>, serde_json::Error> {
    let mut ops = Vec::with_capacity(annotations.len() + 1);

    if has_image(container) {
        ops.push(PatchOperation::Add(AddOperation {
            path: PointerBuf::from_tokens(["spec", "containers", "-"]),
            value: serde_json::to_value(container)?,
        }));
    } else {
        warn!(container = %container.name, "sidecar has no image, skipping container patch");
    }

    for (key, value) in annotations {
        ops.push(PatchOperation::Add(AddOperation {
            path: PointerBuf::from_tokens(["metadata", "annotations", key.as_str()]),
            value: serde_json::Value::String(value.clone()),
        }));
    }

    Ok(ops)
}
