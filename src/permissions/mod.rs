// permissions/mod.rs - Operator roles and permission resolution
//
// Resolution order, highest first:
//   1. SUPER_ADMIN is allowed everything
//   2. a token in the identity's `removed` overrides is denied
//   3. a token in the identity's `added` overrides is allowed
//   4. a token in the role's default set is allowed
//   5. anything else is denied

pub mod catalog;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Fixed set of operator roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Accountant,
    Support,
    FieldTech,
    Viewer,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::SuperAdmin,
        Role::Admin,
        Role::Manager,
        Role::Accountant,
        Role::Support,
        Role::FieldTech,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Accountant => "ACCOUNTANT",
            Role::Support => "SUPPORT",
            Role::FieldTech => "FIELD_TECH",
            Role::Viewer => "VIEWER",
        }
    }

    /// Default capability tokens owned by this role
    pub fn defaults(self) -> &'static HashSet<&'static str> {
        catalog::defaults(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Per-identity grants layered over the role defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverride {
    #[serde(default)]
    pub added: HashSet<String>,
    #[serde(default)]
    pub removed: HashSet<String>,
}

impl PermissionOverride {
    pub fn new<A, R>(added: A, removed: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            added: added.into_iter().map(Into::into).collect(),
            removed: removed.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn has_permission(
    role: Role,
    added: &HashSet<String>,
    removed: &HashSet<String>,
    permission: &str,
) -> bool {
    if role == Role::SuperAdmin {
        return true;
    }
    if removed.contains(permission) {
        return false;
    }
    if added.contains(permission) {
        return true;
    }
    role.defaults().contains(permission)
}

/// Role gating ignores overrides; SUPER_ADMIN always passes
pub fn has_any_role(role: Role, allowed: &[Role]) -> bool {
    role == Role::SuperAdmin || allowed.contains(&role)
}

/// Every token `has_permission` would allow for this role and override set
pub fn effective_permissions(
    role: Role,
    added: &HashSet<String>,
    removed: &HashSet<String>,
) -> BTreeSet<String> {
    let candidates = catalog::ALL
        .iter()
        .map(|token| token.to_string())
        .chain(added.iter().cloned());

    candidates
        .filter(|token| has_permission(role, added, removed, token))
        .collect()
}
