//! Request bodies for role endpoints.
//!
//! The wire format distinguishes an absent field from a field present with
//! its zero value. Creation bodies omit zero values so the server applies
//! its defaults; modification bodies carry `Option` fields that are skipped
//! entirely when unset.

use cordial_core::{Role, Snowflake};
use serde::{Deserialize, Serialize};

/// Body of `POST /guilds/{guild}/roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateRoleParams {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub permissions: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub color: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub hoist: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub mentionable: bool,
}

fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

impl From<&Role> for CreateRoleParams {
    fn from(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
            permissions: role.permissions,
            color: role.color,
            hoist: role.hoist,
            mentionable: role.mentionable,
        }
    }
}

/// Body of `PATCH /guilds/{guild}/roles/{role}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyRoleParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
}

impl ModifyRoleParams {
    /// Fields of `changes` that differ from the bound snapshot `current`.
    ///
    /// An empty name is treated as unset.
    pub fn diff(current: &Role, changes: &Role) -> Self {
        fn changed<T: PartialEq + Clone>(current: &T, next: &T) -> Option<T> {
            (current != next).then(|| next.clone())
        }

        Self {
            name: if changes.name.is_empty() {
                None
            } else {
                changed(&current.name, &changes.name)
            },
            permissions: changed(&current.permissions, &changes.permissions),
            color: changed(&current.color, &changes.color),
            hoist: changed(&current.hoist, &changes.hoist),
            mentionable: changed(&current.mentionable, &changes.mentionable),
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One element of the body of `PATCH /guilds/{guild}/roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePositionParams {
    pub id: Snowflake,
    pub position: u32,
}
