//! Tests for the subscription registry

use std::sync::Arc;

use crate::observer::ObserverHandle;
use crate::registry::SubscriptionRegistry;

// ============================================================================
// Subscribe / unsubscribe
// ============================================================================

#[test]
fn test_subscribe_adds_observer() {
    let registry = SubscriptionRegistry::new();
    let (handle, _rx) = ObserverHandle::channel(8);
    let id = handle.id();

    assert!(registry.subscribe(7, handle));

    let observers = registry.observers(7);
    assert_eq!(observers.len(), 1);
    assert_eq!(observers[0].id(), id);
    assert!(registry.has_observers(7));
    assert!(registry.observers(8).is_empty());
}

#[test]
fn test_subscribe_is_idempotent() {
    let registry = SubscriptionRegistry::new();
    let (handle, _rx) = ObserverHandle::channel(8);

    assert!(registry.subscribe(7, handle.clone()));
    assert!(!registry.subscribe(7, handle));
    assert_eq!(registry.observer_count(), 1);
}

#[test]
fn test_same_observer_on_two_agents() {
    let registry = SubscriptionRegistry::new();
    let (handle, _rx) = ObserverHandle::channel(8);

    registry.subscribe(7, handle.clone());
    registry.subscribe(8, handle);

    assert_eq!(registry.agent_count(), 2);
    assert_eq!(registry.observer_count(), 2);
}

#[test]
fn test_unique_observer_ids() {
    let (a, _rx_a) = ObserverHandle::channel(8);
    let (b, _rx_b) = ObserverHandle::channel(8);
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_unsubscribe_prunes_empty_agent() {
    let registry = SubscriptionRegistry::new();
    let (handle, _rx) = ObserverHandle::channel(8);
    let id = handle.id();
    registry.subscribe(7, handle);

    assert!(registry.unsubscribe(7, id));
    assert!(!registry.has_observers(7));
    assert_eq!(registry.agent_count(), 0);
}

#[test]
fn test_unsubscribe_absent_is_noop() {
    let registry = SubscriptionRegistry::new();
    let (handle, _rx) = ObserverHandle::channel(8);
    registry.subscribe(7, handle);

    assert!(!registry.unsubscribe(7, 999_999));
    assert!(!registry.unsubscribe(42, 1));
    assert_eq!(registry.observer_count(), 1);
}

// ============================================================================
// Guards
// ============================================================================

#[test]
fn test_subscription_guard_deregisters_on_drop() {
    let registry = Arc::new(SubscriptionRegistry::new());
    let (handle, _rx) = ObserverHandle::channel(8);
    let id = handle.id();

    let subscription = registry.subscribe_guarded(7, handle);
    assert_eq!(subscription.agent_id(), 7);
    assert_eq!(subscription.observer_id(), id);
    assert_eq!(registry.observer_count(), 1);

    drop(subscription);
    assert_eq!(registry.observer_count(), 0);
}

#[test]
fn test_guard_after_explicit_unsubscribe() {
    let registry = Arc::new(SubscriptionRegistry::new());
    let (handle, _rx) = ObserverHandle::channel(8);
    let id = handle.id();

    let subscription = registry.subscribe_guarded(7, handle);
    assert!(registry.unsubscribe(7, id));

    // Dropping the guard now is a no-op
    drop(subscription);
    assert_eq!(registry.observer_count(), 0);
}

// ============================================================================
// Observer handles
// ============================================================================

#[tokio::test]
async fn test_handle_reports_disconnect() {
    let (handle, rx) = ObserverHandle::channel(8);
    assert!(handle.is_connected());

    drop(rx);
    assert!(!handle.is_connected());
}
