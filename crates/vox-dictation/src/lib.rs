//! # vox-dictation
//!
//! The external processing collaborator consumed by the coordinator's work
//! forwarder.
//!
//! The coordinator is agnostic to how work is actually performed: it only
//! requires a [`WorkProcessor`] whose `process` call eventually resolves to
//! text or a human-readable error, and which can be invoked concurrently for
//! different payloads with no shared state between calls.
//!
//! [`HttpDictationClient`] is the production implementation: it POSTs the
//! opaque payload to the upstream transcription service and maps its JSON
//! response onto [`WorkOutput`] / [`ProcessError`].
//!
//! ## Crate Position
//!
//! Standalone (no vox crate dependencies).
//! Depended on by: vox-server, vox.

#![deny(unsafe_code)]

pub mod http;
pub mod processor;
pub mod types;

pub use http::HttpDictationClient;
pub use processor::WorkProcessor;
pub use types::{ProcessError, WorkOutput};
