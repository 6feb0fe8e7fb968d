//! Endpoint path builders.

use cordial_core::Snowflake;

/// `/guilds/{guild}/roles`: list, create and reorder roles.
pub fn guild_roles(guild_id: Snowflake) -> String {
    format!("/guilds/{guild_id}/roles")
}

/// `/guilds/{guild}/roles/{role}`: modify or delete one role.
pub fn guild_role(guild_id: Snowflake, role_id: Snowflake) -> String {
    format!("/guilds/{guild_id}/roles/{role_id}")
}
