//! Connected-guild tracking.
//!
//! The client registers three handlers on its own dispatcher, through the
//! same interface applications use:
//!
//! - `READY` seeds the set with the guilds the session starts in
//! - `GUILD_CREATE` adds a guild
//! - `GUILD_DELETE` removes it
//!
//! Adding a present guild and removing an absent one are no-ops, so
//! duplicate lifecycle events from reconnect races cannot corrupt the set.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::ensure;
use cordial_core::{names, GuildCreate, GuildDelete, PartialGuild, Ready, Snowflake};
use cordial_gateway::{Dispatcher, Handler, ListenerId};
use tracing::debug;

/// Guilds the client is currently connected to.
#[derive(Debug, Default)]
pub struct ConnectedGuilds {
    guilds: RwLock<BTreeMap<Snowflake, PartialGuild>>,
}

impl ConnectedGuilds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `guild`. Returns whether membership changed.
    ///
    /// A present guild is left alone, except that a placeholder seeded from
    /// `READY` is replaced by the first available snapshot.
    pub fn insert(&self, guild: PartialGuild) -> bool {
        match self.write().entry(guild.id) {
            Entry::Vacant(slot) => {
                debug!("guild {} connected", guild.id);
                slot.insert(guild);
                true
            }
            Entry::Occupied(mut slot) => {
                if slot.get().unavailable && !guild.unavailable {
                    slot.insert(guild);
                }
                false
            }
        }
    }

    /// Remove the guild with `id`. Returns whether it was present.
    pub fn remove(&self, id: Snowflake) -> bool {
        let removed = self.write().remove(&id).is_some();
        if removed {
            debug!("guild {} disconnected", id);
        }
        removed
    }

    /// Snapshot of the guild with `id`.
    pub fn get(&self, id: Snowflake) -> Option<PartialGuild> {
        self.read().get(&id).cloned()
    }

    pub fn contains(&self, id: Snowflake) -> bool {
        self.read().contains_key(&id)
    }

    /// Ids of every connected guild, ascending.
    pub fn ids(&self) -> Vec<Snowflake> {
        self.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Register the tracking handlers on `dispatcher`.
    pub fn attach<C: 'static>(self: &Arc<Self>, dispatcher: &Dispatcher<C>) -> [ListenerId; 3] {
        let cache = Arc::clone(self);
        let ready = dispatcher.on(
            names::READY,
            Handler::payload(move |_ctx, ready: Ready| {
                for guild in ready.guilds {
                    ensure!(!guild.id.is_empty(), "READY lists a guild without an id");
                    cache.insert(PartialGuild {
                        id: guild.id,
                        name: String::new(),
                        unavailable: true,
                    });
                }
                Ok(())
            }),
        );

        let cache = Arc::clone(self);
        let create = dispatcher.on(
            names::GUILD_CREATE,
            Handler::payload(move |_ctx, evt: GuildCreate| {
                ensure!(!evt.guild.id.is_empty(), "GUILD_CREATE without a guild id");
                cache.insert(evt.guild);
                Ok(())
            }),
        );

        let cache = Arc::clone(self);
        let delete = dispatcher.on(
            names::GUILD_DELETE,
            Handler::payload(move |_ctx, evt: GuildDelete| {
                ensure!(
                    !evt.unavailable_guild.id.is_empty(),
                    "GUILD_DELETE without a guild id"
                );
                cache.remove(evt.unavailable_guild.id);
                Ok(())
            }),
        );

        [ready, create, delete]
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Snowflake, PartialGuild>> {
        self.guilds.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Snowflake, PartialGuild>> {
        self.guilds.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordial_core::{Event, ShardId};
    use cordial_gateway::DispatcherConfig;
    use tokio::sync::mpsc::unbounded_channel;

    fn guild(id: u64) -> PartialGuild {
        PartialGuild::new(Snowflake::new(id))
    }

    #[test]
    fn test_insert_is_idempotent() {
        let cache = ConnectedGuilds::new();
        assert!(cache.insert(guild(1)));
        assert!(!cache.insert(guild(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_a_no_op() {
        let cache = ConnectedGuilds::new();
        cache.insert(guild(1));
        assert!(!cache.remove(Snowflake::new(2)));
        assert_eq!(cache.ids(), vec![Snowflake::new(1)]);

        assert!(cache.remove(Snowflake::new(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_placeholder_is_replaced_by_available_snapshot() {
        let cache = ConnectedGuilds::new();
        let mut placeholder = guild(5);
        placeholder.unavailable = true;
        cache.insert(placeholder);

        let mut full = guild(5);
        full.name = "five".into();
        assert!(!cache.insert(full.clone()));
        assert_eq!(cache.get(Snowflake::new(5)), Some(full));

        let mut renamed = guild(5);
        renamed.name = "other".into();
        cache.insert(renamed);
        assert_eq!(cache.get(Snowflake::new(5)).unwrap().name, "five");
    }

    #[test]
    fn test_handlers_track_lifecycle_events() {
        let (tx, mut rx) = unbounded_channel();
        let dispatcher: Dispatcher<()> = Dispatcher::new(DispatcherConfig::default(), tx);
        let cache = Arc::new(ConnectedGuilds::new());
        cache.attach(&dispatcher);

        let shard = ShardId(0);
        dispatcher.dispatch(
            shard,
            &Event::new(names::READY, r#"{"v":10,"session_id":"s","guilds":[{"id":"1","unavailable":true}]}"#),
            &(),
        );
        dispatcher.dispatch(shard, &Event::new(names::GUILD_CREATE, r#"{"id":"2","name":"two"}"#), &());
        assert_eq!(cache.ids(), vec![Snowflake::new(1), Snowflake::new(2)]);

        dispatcher.dispatch(shard, &Event::new(names::GUILD_DELETE, r#"{"id":"1","unavailable":true}"#), &());
        assert_eq!(cache.ids(), vec![Snowflake::new(2)]);

        let outcome = dispatcher.dispatch(shard, &Event::new(names::GUILD_CREATE, r#"{"name":"no id"}"#), &());
        assert_eq!(outcome.failed, 1);
        assert!(rx.try_recv().is_ok());
        assert_eq!(cache.len(), 1);
    }
}
