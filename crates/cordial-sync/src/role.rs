//! Synchronization of guild roles.
//!
//! Every role request of a guild shares the bucket
//! [`BucketKey::guild_roles`], whatever its path.

use async_trait::async_trait;
use cordial_core::{downcast_ref, DeepCopy, Entity, Role, Snowflake};
use cordial_rest::{endpoint, BucketKey, Request, Requester, Response};

use crate::error::{Result, SyncError};
use crate::params::{CreateRoleParams, ModifyRoleParams, RolePositionParams};
use crate::syncable::{is_stale_copy_of, Syncable};

#[async_trait]
impl Syncable for Role {
    async fn persist(&mut self, rest: &dyn Requester, changes: Option<&dyn Entity>) -> Result<()> {
        if self.guild_id().is_empty() {
            return Err(SyncError::MissingIdentifier("role has no guild id"));
        }

        match changes {
            None => create(rest, self).await,
            Some(changes) => {
                let changes = downcast_ref::<Role>(changes)?;
                update(rest, self, changes).await
            }
        }
    }

    async fn remove(&self, rest: &dyn Requester) -> Result<()> {
        let guild_id = self.guild_id();
        if guild_id.is_empty() {
            return Err(SyncError::MissingIdentifier("role has no guild id"));
        }
        if self.id.is_empty() {
            return Err(SyncError::MissingIdentifier("role has no id"));
        }

        let request = Request::new(
            BucketKey::guild_roles(guild_id),
            endpoint::guild_role(guild_id, self.id),
        );
        let response = rest.delete(request).await?;
        ensure_success("delete role", &response)?;

        if !response.is_no_content() {
            return Err(SyncError::ProtocolViolation {
                operation: "delete role",
                reason: format!("expected 204 No Content, got {}", response.status()),
            });
        }

        tracing::debug!("deleted role {} in guild {}", self.id, guild_id);
        Ok(())
    }
}

/// Detached -> Bound.
async fn create(rest: &dyn Requester, role: &mut Role) -> Result<()> {
    let guild_id = role.guild_id();
    let params = CreateRoleParams::from(&*role);
    let request = Request::new(BucketKey::guild_roles(guild_id), endpoint::guild_roles(guild_id))
        .json(&params)?;

    let response = rest.post(request).await?;
    let mut created: Role = decode_body("create role", &response)?;
    if created.id.is_empty() {
        return Err(SyncError::ProtocolViolation {
            operation: "create role",
            reason: "response has no role id".into(),
        });
    }
    created.set_guild_id(guild_id);

    created.copy_into(role);
    tracing::debug!("created role {} in guild {}", role.id, guild_id);
    Ok(())
}

/// Sparse update of a bound role.
///
/// The result is assembled on a scratch copy and only written onto `role`
/// after every request succeeded.
async fn update(rest: &dyn Requester, role: &mut Role, changes: &Role) -> Result<()> {
    let guild_id = role.guild_id();
    if !role.is_bound() {
        return Err(SyncError::MissingIdentifier("role is not bound to a server role"));
    }

    let params = ModifyRoleParams::diff(role, changes);
    let reposition = changes.position != role.position;
    if params.is_empty() && !reposition {
        return Ok(());
    }

    let mut next = role.duplicate();

    if !params.is_empty() {
        let request = Request::new(
            BucketKey::guild_roles(guild_id),
            endpoint::guild_role(guild_id, role.id),
        )
        .json(&params)?;
        let response = rest.patch(request).await?;
        let modified: Role = decode_body("modify role", &response)?;
        if modified.id != role.id {
            return Err(SyncError::ProtocolViolation {
                operation: "modify role",
                reason: format!("response describes role {}, expected {}", modified.id, role.id),
            });
        }
        next = modified;
    }

    if reposition {
        let body = [RolePositionParams {
            id: role.id,
            position: changes.position,
        }];
        let request = Request::new(BucketKey::guild_roles(guild_id), endpoint::guild_roles(guild_id))
            .json(&body)?;
        let response = rest.patch(request).await?;
        let roles: Vec<Role> = decode_body("modify role positions", &response)?;
        let moved = roles
            .iter()
            .find(|r| r.id == role.id)
            .ok_or_else(|| SyncError::ProtocolViolation {
                operation: "modify role positions",
                reason: format!("role {} missing from response", role.id),
            })?;
        next.position = moved.position;
    }

    next.set_guild_id(guild_id);
    next.copy_into(role);
    tracing::debug!("updated role {} in guild {}", role.id, guild_id);
    Ok(())
}

/// Fetch every role of a guild. The returned roles carry `guild_id`.
pub async fn fetch_guild_roles(rest: &dyn Requester, guild_id: Snowflake) -> Result<Vec<Role>> {
    if guild_id.is_empty() {
        return Err(SyncError::MissingIdentifier("guild id"));
    }

    let request = Request::new(BucketKey::guild_roles(guild_id), endpoint::guild_roles(guild_id));
    let response = rest.get(request).await?;
    let mut roles: Vec<Role> = decode_body("list roles", &response)?;
    for role in &mut roles {
        role.set_guild_id(guild_id);
    }
    Ok(roles)
}

/// Re-fetch the server state of a bound role and copy it over `role`.
///
/// Returns `false`, leaving `role` untouched, when the server no longer
/// lists the role this value descends from.
pub async fn refresh_role(rest: &dyn Requester, role: &mut Role) -> Result<bool> {
    if !role.is_bound() {
        return Err(SyncError::MissingIdentifier("role is not bound to a server role"));
    }

    let roles = fetch_guild_roles(rest, role.guild_id()).await?;
    match roles.iter().find(|fetched| is_stale_copy_of(&*role, *fetched)) {
        Some(fetched) => {
            fetched.copy_into(role);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn ensure_success(operation: &'static str, response: &Response) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(SyncError::UnexpectedStatus {
        operation,
        status: response.status(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

fn decode_body<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    response: &Response,
) -> Result<T> {
    ensure_success(operation, response)?;
    if response.is_no_content() {
        return Err(SyncError::ProtocolViolation {
            operation,
            reason: "expected a response body, got 204 No Content".into(),
        });
    }
    Ok(response.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordial_rest::{MemoryRequester, Method, RestError, StatusCode};
    use serde_json::json;
    use std::time::Duration;

    const GUILD: Snowflake = Snowflake::new(244200618854580224);

    fn bound_role() -> Role {
        let server = Role::builder(GUILD)
            .id(Snowflake::new(42))
            .name("X")
            .color(0xff)
            .position(1)
            .build();
        server.duplicate()
    }

    #[tokio::test]
    async fn test_create_without_guild_fails_and_leaves_role_untouched() {
        let rest = MemoryRequester::new();
        let mut role = Role::new();
        role.name = "X".into();

        let err = role.persist(&rest, None).await.unwrap_err();

        assert!(matches!(err, SyncError::MissingIdentifier(_)));
        assert_eq!(role.name, "X");
        assert!(role.id.is_empty());
        assert!(!role.is_bound());
        assert!(rest.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_binds_role_to_server_id() {
        let rest = MemoryRequester::new();
        rest.respond_json(StatusCode::OK, &json!({"id": "42", "name": "X"}));

        let mut role = Role::builder(GUILD).name("X").build();
        role.persist(&rest, None).await.unwrap();

        assert_eq!(role.id, Snowflake::new(42));
        assert_eq!(role.name, "X");
        assert_eq!(role.copy_of(), Some(Snowflake::new(42)));
        assert_eq!(role.guild_id(), GUILD);

        let log = rest.requests();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, Method::Post);
        assert_eq!(log[0].1.endpoint, format!("/guilds/{GUILD}/roles"));
        assert_eq!(log[0].1.bucket, BucketKey::guild_roles(GUILD));
        let body: CreateRoleParams = log[0].1.body_json().unwrap().unwrap();
        assert_eq!(body.name, "X");
    }

    #[tokio::test]
    async fn test_create_response_without_id_does_not_mutate() {
        let rest = MemoryRequester::new();
        rest.respond_json(StatusCode::OK, &json!({"color": 5}));

        let mut role = Role::builder(GUILD).name("keepme").permissions(8).build();
        let err = role.persist(&rest, None).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::ProtocolViolation { operation: "create role", .. }
        ));
        assert_eq!(role.name, "keepme");
        assert_eq!(role.permissions, 8);
        assert_eq!(role.color, 0);
        assert!(role.id.is_empty());
        assert!(!role.is_bound());
    }

    #[tokio::test]
    async fn test_create_sends_only_set_fields() {
        let rest = MemoryRequester::new();
        rest.respond_json(StatusCode::OK, &json!({"id": "42", "name": "X", "hoist": true}));

        let mut role = Role::builder(GUILD).name("X").hoist(true).build();
        role.persist(&rest, None).await.unwrap();

        let body: serde_json::Value = rest.requests()[0].1.body_json().unwrap().unwrap();
        assert_eq!(body, json!({"name": "X", "hoist": true}));
    }

    #[tokio::test]
    async fn test_create_failure_does_not_mutate() {
        let rest = MemoryRequester::new();
        rest.respond(StatusCode::FORBIDDEN, r#"{"message":"Missing Permissions"}"#);

        let mut role = Role::builder(GUILD).name("X").build();
        let err = role.persist(&rest, None).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::UnexpectedStatus { status, .. } if status == StatusCode::FORBIDDEN
        ));
        assert!(role.id.is_empty());
        assert!(!role.is_bound());
    }

    #[tokio::test]
    async fn test_create_passes_rate_limit_through() {
        let rest = MemoryRequester::new();
        rest.fail(RestError::RateLimited {
            bucket: BucketKey::guild_roles(GUILD),
            retry_after: Duration::from_secs(1),
            global: false,
        });

        let mut role = Role::builder(GUILD).name("X").build();
        let err = role.persist(&rest, None).await.unwrap_err();

        assert!(matches!(err, SyncError::Transport(RestError::RateLimited { .. })));
        assert_eq!(rest.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let rest = MemoryRequester::new();
        rest.respond_json(
            StatusCode::OK,
            &json!({"id": "42", "name": "renamed", "color": 255, "position": 1}),
        );

        let mut role = bound_role();
        let mut changes = role.clone();
        changes.name = "renamed".into();

        role.persist(&rest, Some(&changes)).await.unwrap();

        assert_eq!(role.name, "renamed");
        assert_eq!(role.guild_id(), GUILD);
        assert_eq!(role.copy_of(), Some(Snowflake::new(42)));

        let log = rest.requests();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, Method::Patch);
        assert_eq!(log[0].1.endpoint, format!("/guilds/{GUILD}/roles/42"));
        let body: serde_json::Value = log[0].1.body_json().unwrap().unwrap();
        assert_eq!(body, json!({"name": "renamed"}));
    }

    #[tokio::test]
    async fn test_update_without_changes_sends_nothing() {
        let rest = MemoryRequester::new();
        let mut role = bound_role();
        let changes = role.clone();

        role.persist(&rest, Some(&changes)).await.unwrap();

        assert!(rest.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_position_uses_position_endpoint() {
        let rest = MemoryRequester::new();
        rest.respond_json(
            StatusCode::OK,
            &json!([{"id": "41", "position": 1}, {"id": "42", "position": 5}]),
        );

        let mut role = bound_role();
        let mut changes = role.clone();
        changes.position = 5;

        role.persist(&rest, Some(&changes)).await.unwrap();

        assert_eq!(role.position, 5);
        assert_eq!(role.name, "X");

        let log = rest.requests();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1.endpoint, format!("/guilds/{GUILD}/roles"));
        assert_eq!(log[0].1.bucket, BucketKey::guild_roles(GUILD));
    }

    #[tokio::test]
    async fn test_update_partial_failure_does_not_mutate() {
        let rest = MemoryRequester::new();
        rest.respond_json(StatusCode::OK, &json!({"id": "42", "name": "renamed"}))
            .fail(RestError::Network("connection reset".into()));

        let mut role = bound_role();
        let mut changes = role.clone();
        changes.name = "renamed".into();
        changes.position = 9;

        let err = role.persist(&rest, Some(&changes)).await.unwrap_err();

        assert!(matches!(err, SyncError::Transport(RestError::Network(_))));
        assert_eq!(role.name, "X");
        assert_eq!(role.position, 1);
    }

    #[tokio::test]
    async fn test_update_of_unbound_role_fails() {
        let rest = MemoryRequester::new();
        let mut role = Role::builder(GUILD).name("X").build();
        let mut changes = role.clone();
        changes.name = "Y".into();

        let err = role.persist(&rest, Some(&changes)).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::MissingIdentifier("role is not bound to a server role")
        ));
    }

    #[tokio::test]
    async fn test_update_of_hand_assigned_id_fails() {
        let rest = MemoryRequester::new();
        let mut role = Role::builder(GUILD).id(Snowflake::new(42)).name("X").build();
        let mut changes = role.clone();
        changes.name = "Y".into();
        // The clone above is bound; only the receiver matters.
        assert!(!role.is_bound());

        let err = role.persist(&rest, Some(&changes)).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::MissingIdentifier("role is not bound to a server role")
        ));
        assert_eq!(role.name, "X");
        assert!(rest.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_other_kind_is_unsupported() {
        struct Channel;
        impl Entity for Channel {
            fn kind(&self) -> &'static str {
                "channel"
            }
            fn entity_id(&self) -> Snowflake {
                Snowflake::EMPTY
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
            fn copy_over_to(&self, _other: &mut dyn Entity) -> cordial_core::Result<()> {
                Ok(())
            }
            fn is_copy_of(&self, _other: &dyn Entity) -> bool {
                false
            }
        }

        let rest = MemoryRequester::new();
        let mut role = bound_role();
        let err = role.persist(&rest, Some(&Channel)).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::UnsupportedOperand { expected: "role", actual: "channel" }
        ));
    }

    #[tokio::test]
    async fn test_remove_requires_both_ids() {
        let rest = MemoryRequester::new();

        let no_guild = Role::new();
        assert!(matches!(
            no_guild.remove(&rest).await,
            Err(SyncError::MissingIdentifier("role has no guild id"))
        ));

        let no_id = Role::builder(GUILD).build();
        assert!(matches!(
            no_id.remove(&rest).await,
            Err(SyncError::MissingIdentifier("role has no id"))
        ));
        assert!(rest.requests().is_empty());
    }

    #[tokio::test]
    async fn test_remove_expects_no_content() {
        let rest = MemoryRequester::new();
        rest.respond(StatusCode::NO_CONTENT, "");

        let role = bound_role();
        role.remove(&rest).await.unwrap();

        let log = rest.requests();
        assert_eq!(log[0].0, Method::Delete);
        assert_eq!(log[0].1.endpoint, format!("/guilds/{GUILD}/roles/42"));
    }

    #[tokio::test]
    async fn test_remove_with_ok_status_is_protocol_violation() {
        let rest = MemoryRequester::new();
        rest.respond(StatusCode::OK, "{}");

        let role = bound_role();
        let err = role.remove(&rest).await.unwrap_err();

        assert!(matches!(err, SyncError::ProtocolViolation { operation: "delete role", .. }));
    }

    #[tokio::test]
    async fn test_refresh_overwrites_bound_role() {
        let rest = MemoryRequester::new();
        rest.respond_json(
            StatusCode::OK,
            &json!([{"id": "7", "name": "other"}, {"id": "42", "name": "edited elsewhere", "color": 1}]),
        );

        let mut role = bound_role();
        assert!(refresh_role(&rest, &mut role).await.unwrap());

        assert_eq!(role.name, "edited elsewhere");
        assert_eq!(role.color, 1);
        assert_eq!(role.guild_id(), GUILD);
    }

    #[tokio::test]
    async fn test_refresh_of_deleted_role_leaves_value() {
        let rest = MemoryRequester::new();
        rest.respond_json(StatusCode::OK, &json!([{"id": "7", "name": "other"}]));

        let mut role = bound_role();
        assert!(!refresh_role(&rest, &mut role).await.unwrap());
        assert_eq!(role.name, "X");
    }

    #[tokio::test]
    async fn test_refresh_requires_bound_role() {
        let rest = MemoryRequester::new();
        let mut role = Role::builder(GUILD).build();
        assert!(matches!(
            refresh_role(&rest, &mut role).await,
            Err(SyncError::MissingIdentifier(_))
        ));
    }
}
