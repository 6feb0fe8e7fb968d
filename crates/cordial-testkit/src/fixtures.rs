//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cordial::{Client, ClientConfig};
use cordial_core::{names, DeepCopy, Event, Role, ShardId, Snowflake};
use cordial_gateway::memory::{memory_shard, Journal, ShardFeed};
use cordial_gateway::{Handler, ShardManagerConfig};
use cordial_rest::MemoryRequester;
use serde_json::{json, Value};

use crate::generators::LifecycleOp;

/// A client wired to a scripted REST transport, with a journal shared by
/// every shard it adds.
pub struct TestFixture {
    pub client: Client,
    pub rest: Arc<MemoryRequester>,
    pub journal: Journal,
}

impl TestFixture {
    /// Create a fixture with no shard connect delay.
    pub fn new() -> Self {
        let mut config = ClientConfig::new("test-token");
        config.shards = ShardManagerConfig {
            connect_delay: Duration::ZERO,
            ..ShardManagerConfig::default()
        };
        Self::with_config(config)
    }

    /// Create a fixture from `config`.
    ///
    /// # Panics
    ///
    /// When `config` is rejected by [`Client::new`].
    pub fn with_config(config: ClientConfig) -> Self {
        let rest = Arc::new(MemoryRequester::new());
        let client = match Client::new(config, Arc::clone(&rest) as _) {
            Ok(client) => client,
            Err(e) => panic!("fixture config rejected: {e}"),
        };
        Self {
            client,
            rest,
            journal: Journal::new(),
        }
    }

    /// Add a memory shard and return the feed that pushes its events.
    pub async fn add_shard(&self, id: ShardId, capacity: usize) -> cordial::Result<ShardFeed> {
        let (shard, feed) = memory_shard(id, capacity, &self.journal);
        self.client.add_shard(shard).await?;
        Ok(feed)
    }

    /// Dispatch the event for each operation on shard 0.
    pub fn replay(&self, ops: &[LifecycleOp]) {
        for op in ops {
            self.client.dispatch(ShardId(0), &op.event());
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A handler that counts its invocations into `hits`.
pub fn counting(hits: &Arc<AtomicUsize>) -> Handler<Client> {
    let hits = Arc::clone(hits);
    Handler::notify(move |_ctx| {
        hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn json_event(name: &str, value: Value) -> Event {
    Event::new(name, value.to_string())
}

/// `GUILD_CREATE` for guild `id`.
pub fn guild_create(id: Snowflake) -> Event {
    json_event(
        names::GUILD_CREATE,
        json!({ "id": id.to_string(), "name": format!("guild {id}") }),
    )
}

/// `GUILD_DELETE` for guild `id`.
pub fn guild_delete(id: Snowflake) -> Event {
    json_event(
        names::GUILD_DELETE,
        json!({ "id": id.to_string(), "unavailable": true }),
    )
}

/// `READY` listing `guilds` as unavailable.
pub fn ready(guilds: &[Snowflake]) -> Event {
    let guilds: Vec<Value> = guilds
        .iter()
        .map(|id| json!({ "id": id.to_string(), "unavailable": true }))
        .collect();
    json_event(
        names::READY,
        json!({ "v": 10, "session_id": "fixture", "guilds": guilds }),
    )
}

/// A role object as the REST surface returns it.
pub fn role_json(id: Snowflake, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "color": 0,
        "hoist": false,
        "position": 1,
        "permissions": 0,
        "managed": false,
        "mentionable": false,
    })
}

/// A role bound to server role `id` in `guild`.
pub fn bound_role(guild: Snowflake, id: Snowflake, name: &str) -> Role {
    Role::builder(guild).id(id).name(name).position(1).build().duplicate()
}
