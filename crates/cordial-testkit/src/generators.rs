//! Proptest generators for property-based testing.

use std::collections::BTreeSet;

use proptest::prelude::*;

use cordial_core::{Event, Role, Snowflake};

use crate::fixtures::{guild_create, guild_delete};

/// Generate a non-empty Snowflake.
pub fn snowflake() -> impl Strategy<Value = Snowflake> {
    (1u64..=u64::MAX).prop_map(Snowflake::new)
}

/// Generate a guild id from a small pool, so operations collide often.
pub fn pooled_guild_id() -> impl Strategy<Value = Snowflake> {
    (1u64..=8).prop_map(Snowflake::new)
}

/// Generate an event name.
pub fn event_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Z_]{0,23}".prop_map(String::from)
}

/// Generate two distinct event names.
pub fn distinct_event_names() -> impl Strategy<Value = (String, String)> {
    (event_name(), event_name()).prop_filter("names must differ", |(a, b)| a != b)
}

/// One guild lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Create(Snowflake),
    Delete(Snowflake),
}

impl LifecycleOp {
    pub fn event(&self) -> Event {
        match *self {
            LifecycleOp::Create(id) => guild_create(id),
            LifecycleOp::Delete(id) => guild_delete(id),
        }
    }
}

impl Arbitrary for LifecycleOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            pooled_guild_id().prop_map(LifecycleOp::Create),
            pooled_guild_id().prop_map(LifecycleOp::Delete),
        ]
        .boxed()
    }
}

/// Generate up to `max_len` lifecycle operations.
pub fn lifecycle_ops(max_len: usize) -> impl Strategy<Value = Vec<LifecycleOp>> {
    prop::collection::vec(any::<LifecycleOp>(), 0..=max_len)
}

/// The connected set a correct cache holds after `ops`, ascending.
pub fn connected_after(ops: &[LifecycleOp]) -> Vec<Snowflake> {
    let mut set = BTreeSet::new();
    for op in ops {
        match *op {
            LifecycleOp::Create(id) => {
                set.insert(id);
            }
            LifecycleOp::Delete(id) => {
                set.remove(&id);
            }
        }
    }
    set.into_iter().collect()
}

/// Generate a role of `guild` with arbitrary mutable fields.
pub fn role(guild: Snowflake) -> impl Strategy<Value = Role> {
    (
        snowflake(),
        "[a-z][a-z0-9 -]{0,31}",
        any::<u32>(),
        any::<bool>(),
        0u32..250,
        any::<u64>(),
        any::<bool>(),
    )
        .prop_map(move |(id, name, color, hoist, position, permissions, mentionable)| {
            Role::builder(guild)
                .id(id)
                .name(name)
                .color(color)
                .hoist(hoist)
                .position(position)
                .permissions(permissions)
                .mentionable(mentionable)
                .build()
        })
}
