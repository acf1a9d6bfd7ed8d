//! Conformance checking for concrete types.
//!
//! Runs once per type, when the type is declared. Effective member sets
//! already include every ancestor's members, so checking each declared
//! interface covers the whole closure; marker interfaces contribute nothing.

use std::fmt;

use facet_ir::{Name, StringInterner};
use rustc_hash::FxHashSet;

use crate::{
    getter_name, setter_name, subscribe_name, unsubscribe_name, InterfaceDef, InterfaceRegistry,
};

/// The members a concrete type makes callable.
pub trait MemberTable {
    /// Check if `name` is a callable member.
    fn has_member(&self, name: Name) -> bool;
}

impl MemberTable for FxHashSet<Name> {
    fn has_member(&self, name: Name) -> bool {
        self.contains(&name)
    }
}

/// What role the missing member would have played.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Getter,
    Setter,
    Subscribe,
    Unsubscribe,
}

impl MemberKind {
    fn describe(self) -> &'static str {
        match self {
            MemberKind::Method => "implementation",
            MemberKind::Getter => "getter implementation",
            MemberKind::Setter => "setter implementation",
            MemberKind::Subscribe => "subscribe implementation",
            MemberKind::Unsubscribe => "unsubscribe implementation",
        }
    }
}

/// One required member a type failed to provide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingMember {
    /// Interface that requires the member.
    pub interface: String,
    /// Declared member: method, property or event name.
    pub declared: String,
    /// Member the type would have to define, e.g. `getValue`.
    pub member: String,
    pub kind: MemberKind,
}

impl fmt::Display for MissingMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no {} for \"{}.{}\"",
            self.kind.describe(),
            self.interface,
            self.declared
        )?;
        if self.kind != MemberKind::Method {
            write!(f, " (expected `{}`)", self.member)?;
        }
        Ok(())
    }
}

fn render_missing(type_name: &str, missing: &[MissingMember]) -> String {
    let mut out = format!("\"{type_name}\" does not conform: ");
    for (i, m) in missing.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        out.push_str(&m.to_string());
    }
    out
}

/// Errors raised when a declared type does not satisfy its interfaces.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConformanceError {
    /// The type declares an interface that was never defined.
    #[error("\"{type_name}\" declares interface \"{interface}\", which is not defined")]
    UnknownInterface { type_name: String, interface: String },

    /// The type lacks one or more required members. The first entry is the
    /// first violation found in declaration order.
    #[error("{}", render_missing(.type_name, .missing))]
    MissingImplementation {
        type_name: String,
        missing: Vec<MissingMember>,
    },
}

impl ConformanceError {
    /// The missing members, empty for `UnknownInterface`.
    pub fn missing(&self) -> &[MissingMember] {
        match self {
            ConformanceError::MissingImplementation { missing, .. } => missing,
            ConformanceError::UnknownInterface { .. } => &[],
        }
    }
}

struct Collector<'a, M: ?Sized> {
    interner: &'a StringInterner,
    members: &'a M,
    /// Members already reported, so a shared ancestor is reported once.
    reported: FxHashSet<Name>,
    missing: Vec<MissingMember>,
}

impl<M: MemberTable + ?Sized> Collector<'_, M> {
    fn require(&mut self, iface: &InterfaceDef, declared: Name, member: Name, kind: MemberKind) {
        if self.members.has_member(member) || !self.reported.insert(member) {
            return;
        }
        let missing = MissingMember {
            interface: self.interner.lookup(iface.name).to_owned(),
            declared: self.interner.lookup(declared).to_owned(),
            member: self.interner.lookup(member).to_owned(),
            kind,
        };
        tracing::warn!(%missing, "conformance violation");
        self.missing.push(missing);
    }

    fn check(&mut self, iface: &InterfaceDef) {
        for &method in &iface.methods {
            self.require(iface, method, method, MemberKind::Method);
        }
        for &event in &iface.events {
            let on = subscribe_name(self.interner, event);
            let un = unsubscribe_name(self.interner, event);
            self.require(iface, event, on, MemberKind::Subscribe);
            self.require(iface, event, un, MemberKind::Unsubscribe);
        }
        for property in &iface.properties {
            let getter = getter_name(self.interner, property.name);
            self.require(iface, property.name, getter, MemberKind::Getter);
            if !property.read_only {
                let setter = setter_name(self.interner, property.name);
                self.require(iface, property.name, setter, MemberKind::Setter);
            }
        }
    }
}

/// Check that `members` satisfies every interface in `declared`.
///
/// All violations are collected before failing. A type declaring no
/// interfaces is trivially valid.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(type_name = registry.interner().lookup(type_name), declared = declared.len())
)]
pub fn check_conformance<M: MemberTable + ?Sized>(
    registry: &InterfaceRegistry,
    type_name: Name,
    declared: &[Name],
    members: &M,
) -> Result<(), ConformanceError> {
    let interner: &StringInterner = registry.interner();
    let mut collector = Collector {
        interner,
        members,
        reported: FxHashSet::default(),
        missing: Vec::new(),
    };

    let mut checked = FxHashSet::default();
    for &name in declared {
        let Some(iface) = registry.get(name) else {
            return Err(ConformanceError::UnknownInterface {
                type_name: interner.lookup(type_name).to_owned(),
                interface: interner.lookup(name).to_owned(),
            });
        };
        if checked.insert(name) {
            collector.check(iface);
        }
    }

    if collector.missing.is_empty() {
        tracing::debug!("type conforms");
        Ok(())
    } else {
        Err(ConformanceError::MissingImplementation {
            type_name: interner.lookup(type_name).to_owned(),
            missing: collector.missing,
        })
    }
}
