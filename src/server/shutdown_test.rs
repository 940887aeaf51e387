//! Tests for the listener stop channel

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::shutdown::*;
use std::time::Duration;

#[tokio::test]
async fn test_stop_channel_initially_not_triggered() {
    let (_trigger, signal) = stop_channel();

    assert!(!signal.is_triggered());
}

#[tokio::test]
async fn test_trigger_is_observed() {
    let (trigger, signal) = stop_channel();

    trigger.trigger();

    assert!(signal.is_triggered());
}

#[tokio::test]
async fn test_wait_completes_on_trigger() {
    let (trigger, signal) = stop_channel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    let result = tokio::time::timeout(Duration::from_secs(1), signal.wait()).await;

    assert!(result.is_ok(), "wait() should complete when triggered");
}

/// A dropped trigger (e.g. the probe server itself was dropped) must
/// release the listener rather than leave it serving forever.
#[tokio::test]
async fn test_wait_completes_when_trigger_dropped() {
    let (trigger, signal) = stop_channel();

    drop(trigger);

    let result = tokio::time::timeout(Duration::from_secs(1), signal.wait()).await;
    assert!(result.is_ok(), "wait() should complete when trigger dropped");
}

#[tokio::test]
async fn test_wait_pending_without_trigger() {
    let (_trigger, signal) = stop_channel();

    let result = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;

    assert!(result.is_err(), "wait() should not complete before a trigger");
}

#[tokio::test]
async fn test_trigger_after_receiver_gone_is_harmless() {
    let (trigger, signal) = stop_channel();
    drop(signal);

    trigger.trigger();
}
