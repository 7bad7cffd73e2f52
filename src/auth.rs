//! Auth-domain identifiers, call provenance, and redacted credential material.

pub mod id;
pub mod provenance;
pub mod secret;

pub use id::*;
pub use provenance::*;
pub use secret::*;
