use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ChartResult;

/// Flat `prefix + member -> value` override map (`extensionPoints` option).
pub type ExtensionPoints = IndexMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Applied by invoking the target's setter with the configured value.
    Setter,
    /// Applied by plain assignment.
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberCapability {
    pub kind: MemberKind,
    pub locked: bool,
    pub intercepted: bool,
}

/// Declared overridable members of a visual object.
///
/// Members not declared here are assigned as plain properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionDescriptor {
    members: IndexMap<String, MemberCapability>,
}

impl ExtensionDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn setter(self, member: &str) -> Self {
        self.declare(member, MemberKind::Setter, false, false)
    }

    #[must_use]
    pub fn property(self, member: &str) -> Self {
        self.declare(member, MemberKind::Property, false, false)
    }

    /// Declares a member the object owns exclusively; overrides are ignored.
    #[must_use]
    pub fn locked(self, member: &str) -> Self {
        let kind = self.kind_of(member);
        self.declare(member, kind, true, false)
    }

    /// Declares a member whose value the chart controls; overrides are ignored.
    #[must_use]
    pub fn intercepted(self, member: &str) -> Self {
        let kind = self.kind_of(member);
        self.declare(member, kind, false, true)
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<MemberCapability> {
        self.members.get(name).copied()
    }

    fn kind_of(&self, member: &str) -> MemberKind {
        self.members
            .get(member)
            .map_or(MemberKind::Property, |capability| capability.kind)
    }

    fn declare(mut self, member: &str, kind: MemberKind, locked: bool, intercepted: bool) -> Self {
        let entry = self.members.entry(member.to_owned()).or_insert(MemberCapability {
            kind,
            locked: false,
            intercepted: false,
        });
        entry.kind = kind;
        entry.locked |= locked;
        entry.intercepted |= intercepted;
        self
    }
}

/// A visual object that accepts declarative overrides.
pub trait Extensible {
    fn extension_descriptor(&self) -> ExtensionDescriptor;

    /// Invokes the setter named `member` with `value`.
    fn call_setter(&mut self, member: &str, value: &Value) -> ChartResult<()>;

    /// Assigns `value` to the property named `member`.
    fn set_property(&mut self, member: &str, value: Value);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionOutcome {
    Called,
    Assigned,
    SkippedLocked,
    SkippedIntercepted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedExtension {
    pub member: String,
    pub outcome: ExtensionOutcome,
}

/// Applies every extension point starting with `prefix` onto `target`.
///
/// The rest of each matching key names a member of the target. Locked and
/// intercepted members are skipped; declared setters are invoked; anything
/// else is assigned as a property. A missing target is a no-op.
pub fn apply_extensions<T>(
    target: Option<&mut T>,
    prefix: &str,
    points: Option<&ExtensionPoints>,
) -> ChartResult<Vec<AppliedExtension>>
where
    T: Extensible + ?Sized,
{
    let Some(target) = target else {
        debug!(prefix, "extension target does not exist");
        return Ok(Vec::new());
    };
    let Some(points) = points else {
        return Ok(Vec::new());
    };

    let descriptor = target.extension_descriptor();
    let mut applied = Vec::new();
    for (key, value) in points {
        let Some(member) = key.strip_prefix(prefix) else {
            continue;
        };
        let capability = descriptor.member(member);
        let outcome = match capability {
            Some(capability) if capability.locked => {
                debug!(prefix, member, "locked extension point");
                ExtensionOutcome::SkippedLocked
            }
            Some(capability) if capability.intercepted => {
                debug!(prefix, member, value = %value, "intercepted extension point");
                ExtensionOutcome::SkippedIntercepted
            }
            Some(MemberCapability {
                kind: MemberKind::Setter,
                ..
            }) => {
                trace!(prefix, member, value = %value, "calling extension setter");
                target.call_setter(member, value)?;
                ExtensionOutcome::Called
            }
            _ => {
                trace!(prefix, member, value = %value, "assigning extension property");
                target.set_property(member, value.clone());
                ExtensionOutcome::Assigned
            }
        };
        applied.push(AppliedExtension {
            member: member.to_owned(),
            outcome,
        });
    }
    Ok(applied)
}

/// Looks up one extension point by its `_`-joined key parts.
#[must_use]
pub fn extension<'a>(points: Option<&'a ExtensionPoints>, parts: &[&str]) -> Option<&'a Value> {
    points?.get(&parts.join("_"))
}
