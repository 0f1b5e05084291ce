//! Concurrency tests for the plugin dependency resolution gate.
//!
//! Several build tasks may each believe they are the first to need the
//! resolved dependency view; the registry must serialize them so the
//! external resolution trigger fires exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use ij_config::{Error, PluginDependencyRegistry, PluginDescriptor};

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[test]
fn test_concurrent_callers_trigger_exactly_once() {
    init_tracing();

    let registry = Arc::new(PluginDependencyRegistry::new());
    registry.register(PluginDescriptor::bundled("java"));
    registry.register(PluginDescriptor::marketplace("org.intellij.scala", "2022.1.14"));

    let trigger_calls = Arc::new(AtomicUsize::new(0));
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let trigger_calls = Arc::clone(&trigger_calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry
                    .resolved_with(|| {
                        trigger_calls.fetch_add(1, Ordering::SeqCst);
                        // Keep the resolution in flight long enough that
                        // other callers arrive while it runs.
                        thread::sleep(Duration::from_millis(20));
                        Ok(())
                    })
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        // Every caller, winner or late arrival, sees the full resolved set.
        let resolved = handle.join().unwrap();
        assert_eq!(resolved.len(), 2);
    }

    assert_eq!(trigger_calls.load(Ordering::SeqCst), 1);
    assert!(registry.is_resolved());
    assert!(registry.unresolved().is_empty());
}

#[test]
fn test_late_arrivals_wait_for_in_flight_resolution() {
    init_tracing();

    let registry = Arc::new(PluginDependencyRegistry::new());
    registry.register(PluginDescriptor::bundled("java"));

    let barrier = Arc::new(Barrier::new(2));

    let winner = {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            registry
                .resolved_with(|| {
                    // Let the second caller start while we are resolving.
                    barrier.wait();
                    thread::sleep(Duration::from_millis(50));
                    Ok(())
                })
                .unwrap()
        })
    };

    let late = {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            // The winner is mid-trigger now; this call must block until it
            // finishes and then observe the resolved state without firing
            // the trigger again.
            registry
                .resolved_with(|| panic!("late arrival must not trigger resolution"))
                .unwrap()
        })
    };

    assert_eq!(winner.join().unwrap().len(), 1);
    assert_eq!(late.join().unwrap().len(), 1);
}

#[test]
fn test_failed_resolution_can_be_won_by_another_caller() {
    init_tracing();

    let registry = Arc::new(PluginDependencyRegistry::new());
    registry.register(PluginDescriptor::bundled("java"));

    let err = registry
        .resolved_with(|| {
            Err(Error::resolution(std::io::Error::other(
                "marketplace unreachable",
            )))
        })
        .unwrap_err();
    assert!(matches!(err, Error::Resolution(_)));
    assert!(!registry.is_resolved());

    // A fresh caller from another thread retries and succeeds.
    let trigger_calls = Arc::new(AtomicUsize::new(0));
    let handle = {
        let registry = Arc::clone(&registry);
        let trigger_calls = Arc::clone(&trigger_calls);
        thread::spawn(move || {
            registry
                .resolved_with(|| {
                    trigger_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap()
        })
    };

    assert_eq!(handle.join().unwrap().len(), 1);
    assert_eq!(trigger_calls.load(Ordering::SeqCst), 1);
    assert!(registry.is_resolved());
}

#[test]
fn test_registration_races_never_duplicate() {
    init_tracing();

    let registry = Arc::new(PluginDependencyRegistry::new());
    let workers = 4;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    registry.register(PluginDescriptor::bundled("java"));
                    registry.register(PluginDescriptor::marketplace("a", "1.0"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.unresolved().len(), 2);
}
