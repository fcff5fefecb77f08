//! Declarative override seam for generated visual objects.
//!
//! Panels and marks describe which members they accept; `apply_extensions`
//! routes `extensionPoints` entries onto them without type-specific code.

pub mod extension_points;

pub use extension_points::{
    AppliedExtension, ExtensionDescriptor, ExtensionOutcome, ExtensionPoints, Extensible,
    MemberCapability, MemberKind, apply_extensions, extension,
};
