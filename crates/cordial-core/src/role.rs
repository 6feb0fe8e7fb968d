//! The guild role entity.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::entity::{downcast_mut, DeepCopy, Entity};
use crate::error::Result;
use crate::types::Snowflake;

/// A guild role.
///
/// `guild_id` is not part of the wire object; it addresses the REST
/// endpoints and must be set before the role can be persisted. `copy_of`
/// records which server role this value was derived from and is recomputed
/// on every copy, never copied.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub permissions: u64,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,

    #[serde(skip)]
    guild_id: Snowflake,
    #[serde(skip)]
    copy_of: Option<Snowflake>,
}

impl Role {
    /// A detached role with no guild.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a role that belongs to `guild_id`.
    pub fn builder(guild_id: Snowflake) -> RoleBuilder {
        RoleBuilder {
            role: Role {
                guild_id,
                ..Role::default()
            },
        }
    }

    pub fn guild_id(&self) -> Snowflake {
        self.guild_id
    }

    /// Link the role to a guild before persisting it.
    pub fn set_guild_id(&mut self, guild_id: Snowflake) {
        self.guild_id = guild_id;
    }

    /// The server role this value was derived from, if any.
    pub fn copy_of(&self) -> Option<Snowflake> {
        self.copy_of
    }

    /// Whether this value is bound to a server-side role.
    pub fn is_bound(&self) -> bool {
        self.copy_of.is_some()
    }

    /// Chat markup that renders as a mention of this role.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

impl DeepCopy for Role {
    const KIND: &'static str = "role";

    fn copy_into(&self, dest: &mut Self) {
        dest.id = self.id;
        dest.name.clone_from(&self.name);
        dest.color = self.color;
        dest.hoist = self.hoist;
        dest.position = self.position;
        dest.permissions = self.permissions;
        dest.managed = self.managed;
        dest.mentionable = self.mentionable;
        dest.guild_id = self.guild_id;

        dest.copy_of = (!self.id.is_empty()).then_some(self.id);
    }

    fn duplicate(&self) -> Self {
        let mut dup = Role::new();
        self.copy_into(&mut dup);
        dup
    }
}

impl Clone for Role {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

/// Equality over the role's fields; the copy marker is ignored.
impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.color == other.color
            && self.hoist == other.hoist
            && self.position == other.position
            && self.permissions == other.permissions
            && self.managed == other.managed
            && self.mentionable == other.mentionable
            && self.guild_id == other.guild_id
    }
}

impl Eq for Role {}

impl Entity for Role {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn entity_id(&self) -> Snowflake {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn copy_over_to(&self, other: &mut dyn Entity) -> Result<()> {
        let dest = downcast_mut::<Role>(other)?;
        self.copy_into(dest);
        Ok(())
    }

    fn is_copy_of(&self, other: &dyn Entity) -> bool {
        other.kind() == Self::KIND && self.copy_of == Some(other.entity_id())
    }
}

/// Builder for [`Role`] values.
#[derive(Debug)]
pub struct RoleBuilder {
    role: Role,
}

impl RoleBuilder {
    pub fn id(mut self, id: Snowflake) -> Self {
        self.role.id = id;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.role.name = name.into();
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.role.color = color;
        self
    }

    pub fn hoist(mut self, hoist: bool) -> Self {
        self.role.hoist = hoist;
        self
    }

    pub fn position(mut self, position: u32) -> Self {
        self.role.position = position;
        self
    }

    pub fn permissions(mut self, permissions: u64) -> Self {
        self.role.permissions = permissions;
        self
    }

    pub fn mentionable(mut self, mentionable: bool) -> Self {
        self.role.mentionable = mentionable;
        self
    }

    pub fn managed(mut self, managed: bool) -> Self {
        self.role.managed = managed;
        self
    }

    pub fn build(self) -> Role {
        self.role
    }
}
