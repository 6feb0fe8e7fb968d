//! End-to-end behaviour of the client: guild tracking, shard forwarding,
//! shutdown and entity synchronization through one client value.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cordial::core::{names, DeepCopy, GuildCreate};
use cordial::gateway::memory::{memory_shard, Journal, Transition};
use cordial::gateway::{FailureKind, ShardManagerConfig};
use cordial::rest::{MemoryRequester, Method, StatusCode};
use cordial::sync::SyncError;
use cordial::{Client, ClientConfig, ClientError, Event, Handler, Role, ShardId, Snowflake};
use serde_json::json;

const GUILD: u64 = 244200618854580224;

fn client_with(rest: Arc<MemoryRequester>) -> Client {
    let _ = tracing_subscriber::fmt::try_init();
    let mut config = ClientConfig::new("test-token");
    config.shards = ShardManagerConfig {
        connect_delay: Duration::ZERO,
        ..ShardManagerConfig::default()
    };
    Client::new(config, rest).unwrap()
}

fn client() -> Client {
    client_with(Arc::new(MemoryRequester::new()))
}

fn guild_create(id: u64) -> Event {
    Event::json(names::GUILD_CREATE, &json!({ "id": id.to_string(), "name": "guild" })).unwrap()
}

fn guild_delete(id: u64) -> Event {
    Event::json(names::GUILD_DELETE, &json!({ "id": id.to_string(), "unavailable": true })).unwrap()
}

async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_connected_guild_lifecycle() {
    let client = client();
    assert!(client.shard_ids().await.is_empty());
    assert!(client.connected_guilds().is_empty());

    client.dispatch(ShardId(0), &guild_create(GUILD));
    client.dispatch(ShardId(0), &guild_create(GUILD));
    assert_eq!(client.connected_guilds(), vec![Snowflake::new(GUILD)]);

    client.dispatch(ShardId(0), &guild_delete(9999));
    assert_eq!(client.connected_guilds().len(), 1);

    client.dispatch(ShardId(0), &guild_delete(GUILD));
    assert!(client.connected_guilds().is_empty());
}

#[test]
fn test_empty_token_is_rejected() {
    let err = Client::new(ClientConfig::default(), Arc::new(MemoryRequester::new())).unwrap_err();
    assert!(matches!(err, ClientError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_shard_events_reach_cache_and_application_handlers() {
    let client = client();
    let journal = Journal::new();
    let (s0, f0) = memory_shard(ShardId(0), 16, &journal);
    let (s1, f1) = memory_shard(ShardId(1), 16, &journal);
    client.add_shard(s0).await.unwrap();
    client.add_shard(s1).await.unwrap();

    let joined = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&joined);
    client.on(
        names::GUILD_CREATE,
        Handler::<Client>::payload(move |ctx, evt: GuildCreate| {
            assert!(ctx.client.guilds().contains(evt.guild.id));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    let runner = tokio::spawn({
        let client = client.clone();
        async move { client.run().await }
    });

    f0.send(guild_create(1)).await.unwrap();
    f1.send(guild_create(2)).await.unwrap();
    f1.send(guild_create(2)).await.unwrap();
    wait_until(|| joined.load(Ordering::SeqCst) == 3).await;

    let report = client.shutdown().await;
    runner.await.unwrap().unwrap();

    assert_eq!(client.connected_guilds(), vec![Snowflake::new(1), Snowflake::new(2)]);
    assert_eq!(report.forwarded() + report.drained(), 3);
    assert_eq!(report.dropped(), 0);
    assert!(journal.entries().contains(&Transition::Disconnected(ShardId(1))));
}

#[tokio::test]
async fn test_handler_failures_reach_error_sink() {
    let client = client();
    let mut errors = client.take_errors().unwrap();
    assert!(client.take_errors().is_none());

    let id = client.on("BOOM", Handler::notify(|_ctx| anyhow::bail!("handler refused")));
    client.dispatch(ShardId(2), &Event::empty("BOOM"));

    let failure = errors.recv().await.unwrap();
    assert_eq!(failure.listener, id);
    assert_eq!(failure.shard, ShardId(2));
    assert!(matches!(failure.kind, FailureKind::Failed(_)));
}

#[tokio::test]
async fn test_once_handler_fires_once_through_client() {
    let client = client();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    client.once(
        names::RESUMED,
        Handler::notify(move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    client.dispatch(ShardId(0), &Event::empty(names::RESUMED));
    client.dispatch(ShardId(1), &Event::empty(names::RESUMED));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_calls_after_shutdown_are_ignored() {
    let client = client();
    client.shutdown().await;

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    client.on(
        names::GUILD_CREATE,
        Handler::notify(move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );
    let outcome = client.dispatch(ShardId(0), &guild_create(GUILD));

    assert_eq!(outcome.invoked, 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(client.connected_guilds().is_empty());

    let journal = Journal::new();
    let (shard, _feed) = memory_shard(ShardId(0), 4, &journal);
    assert!(matches!(
        client.add_shard(shard).await,
        Err(ClientError::Gateway(_))
    ));
}

#[tokio::test]
async fn test_role_round_trip_through_client() {
    let rest = Arc::new(MemoryRequester::new());
    let client = client_with(Arc::clone(&rest));

    rest.respond_json(StatusCode::OK, &json!({ "id": "42", "name": "X" }));
    let mut role = Role::builder(Snowflake::new(GUILD)).name("X").build();
    client.save(&mut role, None).await.unwrap();

    assert_eq!(role.id, Snowflake::new(42));
    assert_eq!(role.name, "X");
    assert_eq!(role.copy_of(), Some(Snowflake::new(42)));

    let local = role.duplicate();
    assert!(cordial::is_stale_copy_of(&local, &role));

    rest.respond(StatusCode::OK, "");
    let err = client.delete(&role).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Sync(SyncError::ProtocolViolation { .. })
    ));

    rest.respond(StatusCode::NO_CONTENT, "");
    client.delete(&role).await.unwrap();

    let methods: Vec<Method> = rest.requests().into_iter().map(|(m, _)| m).collect();
    assert_eq!(methods, vec![Method::Post, Method::Delete, Method::Delete]);
}

#[tokio::test]
async fn test_create_without_guild_leaves_role_untouched() {
    let rest = Arc::new(MemoryRequester::new());
    let client = client_with(Arc::clone(&rest));

    let mut role = Role::builder(Snowflake::EMPTY).name("orphan").build();
    let before = role.clone();
    let err = client.save(&mut role, None).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Sync(SyncError::MissingIdentifier(_))
    ));
    assert_eq!(role, before);
    assert!(rest.requests().is_empty());
}
