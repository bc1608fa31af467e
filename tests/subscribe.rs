//! End-to-end behaviour of `/subscribe` sessions.

#![allow(clippy::panic)]

mod common;

use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

use common::{expect_silence, next_json, spawn_server, subscribe, wait_for_live};
use world_sync::config::SyncConfig;
use world_sync::domain::{EntityId, EntityRecord};

fn record(value: serde_json::Value) -> EntityRecord {
    let serde_json::Value::Object(map) = value else {
        panic!("expected object");
    };
    map
}

#[tokio::test]
async fn subscriber_sees_set_then_update_in_order() {
    let (addr, state) = spawn_server(SyncConfig::default()).await;
    let mut ws = subscribe(addr).await;
    wait_for_live(&state, 1).await;

    let sprite = EntityId::from("sprite1");
    state.store.set(sprite.clone(), record(json!({"x": 1, "y": 2}))).await;
    state.store.update(&sprite, "colour", json!("red")).await;

    assert_eq!(next_json(&mut ws).await, json!({"sprite1": {"x": 1, "y": 2}}));
    assert_eq!(
        next_json(&mut ws).await,
        json!({"sprite1": {"x": 1, "y": 2, "colour": "red"}})
    );
    assert_eq!(
        state.store.get(&sprite).await,
        record(json!({"x": 1, "y": 2, "colour": "red"}))
    );
}

#[tokio::test]
async fn every_subscriber_gets_every_change() {
    let (addr, state) = spawn_server(SyncConfig::default()).await;
    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(subscribe(addr).await);
    }
    wait_for_live(&state, 4).await;

    state.store.set(EntityId::from("a"), record(json!({"n": 1}))).await;
    state.store.set(EntityId::from("b"), record(json!({"n": 2}))).await;

    for ws in &mut clients {
        assert_eq!(next_json(ws).await, json!({"a": {"n": 1}}));
        assert_eq!(next_json(ws).await, json!({"b": {"n": 2}}));
    }
}

#[tokio::test]
async fn edits_from_a_subscriber_are_echoed_to_everyone() {
    let (addr, state) = spawn_server(SyncConfig::default()).await;
    let mut author = subscribe(addr).await;
    let mut watcher = subscribe(addr).await;
    wait_for_live(&state, 2).await;

    let sent = author
        .send(Message::text(r#"{"ball": {"x": 3, "y": 4}}"#))
        .await;
    assert!(sent.is_ok());

    let expected = json!({"ball": {"x": 3, "y": 4}});
    assert_eq!(next_json(&mut author).await, expected);
    assert_eq!(next_json(&mut watcher).await, expected);
    assert_eq!(
        state.store.get(&EntityId::from("ball")).await,
        record(json!({"x": 3, "y": 4}))
    );
}

#[tokio::test]
async fn malformed_frames_are_ignored_and_session_survives() {
    let (addr, state) = spawn_server(SyncConfig::default()).await;
    let mut ws = subscribe(addr).await;
    wait_for_live(&state, 1).await;

    for bad in ["not json", "[1, 2, 3]", r#"{"a": {"x": 1}, "b": 2}"#] {
        assert!(ws.send(Message::text(bad)).await.is_ok());
    }
    expect_silence(&mut ws).await;
    assert!(state.store.is_empty().await);
    assert_eq!(state.broadcaster.live_count(), 1);

    assert!(ws.send(Message::text(r#"{"ok": {}}"#)).await.is_ok());
    assert_eq!(next_json(&mut ws).await, json!({"ok": {}}));
}

#[tokio::test]
async fn disconnecting_one_subscriber_does_not_affect_others() {
    let (addr, state) = spawn_server(SyncConfig::default()).await;
    let mut leaving = subscribe(addr).await;
    let mut staying = subscribe(addr).await;
    wait_for_live(&state, 2).await;

    assert!(leaving.close(None).await.is_ok());
    drop(leaving);
    wait_for_live(&state, 1).await;

    state.store.set(EntityId::from("after"), record(json!({"v": 1}))).await;
    assert_eq!(next_json(&mut staying).await, json!({"after": {"v": 1}}));
}

#[tokio::test]
async fn abrupt_disconnect_is_cleaned_up() {
    let (addr, state) = spawn_server(SyncConfig::default()).await;
    let ws = subscribe(addr).await;
    wait_for_live(&state, 1).await;

    drop(ws);
    wait_for_live(&state, 0).await;

    // Publishing with nobody listening is harmless.
    state.store.set(EntityId::from("x"), EntityRecord::new()).await;
    assert_eq!(state.broadcaster.live_count(), 0);
}

#[tokio::test]
async fn snapshot_on_connect_sends_world_first() {
    let config = SyncConfig {
        snapshot_on_connect: true,
        ..SyncConfig::default()
    };
    let (addr, state) = spawn_server(config).await;
    state.store.set(EntityId::from("a"), record(json!({"x": 1}))).await;
    state.store.set(EntityId::from("b"), record(json!({"y": 2}))).await;

    let mut ws = subscribe(addr).await;
    assert_eq!(
        next_json(&mut ws).await,
        json!({"a": {"x": 1}, "b": {"y": 2}})
    );

    wait_for_live(&state, 1).await;
    state.store.update(&EntityId::from("a"), "x", json!(5)).await;
    assert_eq!(next_json(&mut ws).await, json!({"a": {"x": 5}}));
}
