//! Sniffer Injector - mutating admission webhook for packet-capture sidecars
//!
//! Pods that opt in through an annotation get a traffic-capture sidecar appended
//! to their container list before they are persisted. The sidecar is rendered
//! from a startup-supplied template, parameterized per pod through annotations.
//!
//! # Decision pipeline
//!
//! Every admission request flows one way through:
//!
//! 1. [`workload`] - decode the reviewed object into a [`workload::WorkloadDescriptor`]
//! 2. [`policy`] - decide whether the pod asked for injection
//! 3. [`template`] - render the sidecar container from the template
//! 4. [`webhook::patch`] - emit the ordered JSON patch
//!
//! [`webhook::pod`] orchestrates the steps and composes the admission response.
//!
//! # Modules
//!
//! - [`config`] - Startup configuration (CLI flags and environment)
//! - [`telemetry`] - Logging initialization
//! - [`error`] - Error types for the injector

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod policy;
pub mod telemetry;
pub mod template;
pub mod webhook;
pub mod workload;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Annotation Keys
// =============================================================================
// The annotation schema read from (and written to) pod metadata.

/// Trigger annotation: `"enabled"` or `"true"` (case-insensitive) requests injection
pub const INJECT_ANNOTATION: &str = "thejasbabu.packetSniffer.inject";

/// Status annotation written into the patch once the sidecar is injected
pub const STATUS_ANNOTATION: &str = "thejasbabu.packetSniffer.status";

/// Optional override for the interface the sidecar captures on
pub const NETWORK_INTERFACE_ANNOTATION: &str = "thejasbabu.packetSniffer.networkInterface";

/// Optional override for the BPF filter expression
pub const BPF_EXPR_ANNOTATION: &str = "thejasbabu.packetSniffer.bpfExpr";

/// Value written to [`STATUS_ANNOTATION`] on injection
pub const STATUS_INJECTED: &str = "injected";

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Default port for the webhook HTTPS server
///
/// Port 8443 is used instead of 443 to avoid requiring root privileges.
pub const DEFAULT_WEBHOOK_PORT: u16 = 8443;

/// Default network interface when the pod does not override it
pub const DEFAULT_NETWORK_INTERFACE: &str = "eth0";

/// Default BPF filter expression when the pod does not override it
pub const DEFAULT_BPF_EXPR: &str = "tcp and dst port 80";

/// Namespace reserved for cluster components, never mutated by default
pub const NAMESPACE_SYSTEM: &str = "kube-system";
