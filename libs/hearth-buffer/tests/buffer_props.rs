//! Range buffer behavior against a simulated device.
//!
//! Every test drives a real buffer through the transport contract; the
//! simulator's call counters prove which operations touched the wire.

use std::sync::Arc;
use std::time::Duration;
use tracing_test::traced_test;

use hearth_buffer::{CoilBuffer, RegisterBuffer};
use hearth_fieldbus::{FieldbusError, FixedTransport, LateTransport, SimDevice};

fn coil_buffer(sim: &Arc<SimDevice>, scan_interval: Option<Duration>) -> CoilBuffer {
    CoilBuffer::new("coils", 1, scan_interval, Arc::new(FixedTransport::new(sim.clone())))
}

fn register_buffer(sim: &Arc<SimDevice>, scan_interval: Option<Duration>) -> RegisterBuffer {
    RegisterBuffer::new(
        "registers",
        1,
        scan_interval,
        Arc::new(FixedTransport::new(sim.clone())),
    )
}

// ========== Range read tests ==========

#[tokio::test]
async fn range_read_serves_all_member_addresses() {
    let sim = Arc::new(SimDevice::new());
    sim.set_coil(1, 5, true).await;
    sim.set_coil(1, 6, false).await;
    sim.set_coil(1, 7, true).await;
    sim.set_coil(1, 8, true).await;

    let buffer = coil_buffer(&sim, None);
    buffer.register(5, 1).await;
    buffer.register(8, 1).await;

    buffer.read_full_range().await.unwrap();
    assert_eq!(sim.stats().coil_reads, 1);

    // Every address in [5, 8] is independently retrievable, with no new I/O
    assert_eq!(buffer.read_point(5, 1).await.unwrap(), vec![true]);
    assert_eq!(buffer.read_point(6, 1).await.unwrap(), vec![false]);
    assert_eq!(buffer.read_point(7, 1).await.unwrap(), vec![true]);
    assert_eq!(buffer.read_point(8, 1).await.unwrap(), vec![true]);
    assert_eq!(sim.stats().coil_reads, 1);
}

#[tokio::test]
async fn fresh_range_read_is_noop() {
    let sim = Arc::new(SimDevice::new());
    let buffer = register_buffer(&sim, Some(Duration::from_secs(30)));
    buffer.register(0, 4).await;

    buffer.read_full_range().await.unwrap();
    buffer.read_full_range().await.unwrap();
    buffer.read_full_range().await.unwrap();

    assert_eq!(sim.stats().register_reads, 1);
}

#[tokio::test]
async fn widening_range_dirties_the_snapshot() {
    let sim = Arc::new(SimDevice::new());
    let buffer = register_buffer(&sim, None);
    buffer.register(10, 1).await;
    buffer.read_full_range().await.unwrap();

    buffer.register(20, 1).await;
    buffer.read_full_range().await.unwrap();

    assert_eq!(sim.stats().register_reads, 2);
}

#[tokio::test]
async fn failed_range_read_keeps_prior_cache() {
    let sim = Arc::new(SimDevice::new());
    sim.set_register(1, 3, 42).await;

    let buffer = register_buffer(&sim, None);
    buffer.register(3, 1).await;
    buffer.read_full_range().await.unwrap();

    // A write dirties the snapshot; the next range read fails on the wire
    buffer.write_point(3, 42, false).await.unwrap();
    sim.set_fail_reads(true);
    assert!(buffer.read_full_range().await.is_err());

    // Last-known value still served rather than blocking the caller
    assert_eq!(buffer.read_point(3, 1).await.unwrap(), vec![42]);
}

// ========== Cache tests ==========

#[tokio::test]
async fn cache_hit_avoids_io() {
    let sim = Arc::new(SimDevice::new());
    sim.set_register(1, 100, 1234).await;

    let buffer = register_buffer(&sim, Some(Duration::from_secs(30)));
    buffer.register(100, 1).await;

    assert_eq!(buffer.read_point(100, 1).await.unwrap(), vec![1234]);
    let reads_after_first = sim.stats().register_reads;

    for _ in 0..5 {
        assert_eq!(buffer.read_point(100, 1).await.unwrap(), vec![1234]);
    }
    assert_eq!(sim.stats().register_reads, reads_after_first);
}

#[tokio::test]
async fn short_cache_entry_is_a_miss() {
    let sim = Arc::new(SimDevice::new());
    sim.set_register(1, 50, 1).await;
    sim.set_register(1, 51, 2).await;

    let buffer = register_buffer(&sim, None);
    buffer.register(50, 2).await;
    buffer.read_full_range().await.unwrap();

    // The range populate left one word per address; a two-word point must
    // not be served a truncated entry
    assert_eq!(buffer.read_point(50, 2).await.unwrap(), vec![1, 2]);
    assert_eq!(sim.stats().register_reads, 2);

    // The two-word single read is now cached under its start address
    assert_eq!(buffer.read_point(50, 2).await.unwrap(), vec![1, 2]);
    assert_eq!(sim.stats().register_reads, 2);
}

#[tokio::test]
async fn invalidate_single_entry_forces_reread() {
    let sim = Arc::new(SimDevice::new());
    sim.set_coil(1, 2, true).await;

    let buffer = coil_buffer(&sim, None);
    buffer.register(2, 1).await;
    buffer.read_point(2, 1).await.unwrap();

    sim.set_coil(1, 2, false).await;
    // Still cached: the device change is invisible
    assert_eq!(buffer.read_point(2, 1).await.unwrap(), vec![true]);

    buffer.invalidate(Some(2)).await;
    assert_eq!(buffer.read_point(2, 1).await.unwrap(), vec![false]);
}

// ========== Staleness tests ==========

#[tokio::test]
async fn staleness_triggers_refetch() {
    let sim = Arc::new(SimDevice::new());
    let buffer = register_buffer(&sim, Some(Duration::from_millis(50)));
    buffer.register(0, 2).await;

    buffer.read_full_range().await.unwrap();
    assert_eq!(sim.stats().register_reads, 1);
    assert!(!buffer.is_stale().await);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(buffer.is_stale().await);

    buffer.read_full_range().await.unwrap();
    assert_eq!(sim.stats().register_reads, 2);
}

#[tokio::test]
async fn stale_point_read_refetches_from_device() {
    let sim = Arc::new(SimDevice::new());
    sim.set_register(1, 7, 10).await;

    let buffer = register_buffer(&sim, Some(Duration::from_millis(50)));
    buffer.register(7, 1).await;
    buffer.read_full_range().await.unwrap();
    assert_eq!(buffer.read_point(7, 1).await.unwrap(), vec![10]);

    sim.set_register(1, 7, 20).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(buffer.read_point(7, 1).await.unwrap(), vec![20]);
}

#[tokio::test]
async fn buffer_without_interval_never_goes_stale() {
    let sim = Arc::new(SimDevice::new());
    let buffer = coil_buffer(&sim, None);
    buffer.register(0, 1).await;
    buffer.read_full_range().await.unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!buffer.is_stale().await);

    buffer.read_full_range().await.unwrap();
    assert_eq!(sim.stats().coil_reads, 1);
}

// ========== Write tests ==========

#[tokio::test]
async fn write_through_is_visible_without_io() {
    let sim = Arc::new(SimDevice::new());
    let buffer = coil_buffer(&sim, Some(Duration::from_secs(30)));
    buffer.register(12, 1).await;

    buffer.write_point(12, true, false).await.unwrap();
    assert_eq!(buffer.read_point(12, 1).await.unwrap(), vec![true]);
    assert_eq!(sim.stats().coil_reads, 0);

    buffer.write_point(12, false, false).await.unwrap();
    // Never a stale true after a successful write of false
    assert_eq!(buffer.read_point(12, 1).await.unwrap(), vec![false]);
    assert_eq!(sim.stats().coil_reads, 0);
}

#[tokio::test]
async fn verified_write_confirms_against_device() {
    let sim = Arc::new(SimDevice::new());
    let buffer = coil_buffer(&sim, None);
    buffer.register(3, 1).await;

    let outcome = buffer.write_point(3, true, true).await.unwrap();
    assert_eq!(outcome.verified, Some(true));
    assert_eq!(outcome.readback, Some(true));
    assert!(outcome.confirmed());
}

#[tokio::test]
#[traced_test]
async fn verify_mismatch_warns_and_keeps_commanded_value() {
    let sim = Arc::new(SimDevice::new());
    sim.set_coil(1, 9, false).await;
    sim.set_ignore_writes(true);

    let buffer = coil_buffer(&sim, None);
    buffer.register(9, 1).await;

    let outcome = buffer.write_point(9, true, true).await.unwrap();
    assert_eq!(outcome.verified, Some(false));
    assert_eq!(outcome.readback, Some(false));
    assert!(!outcome.confirmed());
    assert!(logs_contain("verify mismatch"));

    // Cache keeps the commanded value, not the readback
    assert_eq!(buffer.read_point(9, 1).await.unwrap(), vec![true]);
}

#[tokio::test]
async fn failed_write_reports_error_and_changes_nothing() {
    let sim = Arc::new(SimDevice::new());
    sim.set_register(1, 6, 100).await;

    let buffer = register_buffer(&sim, None);
    buffer.register(6, 1).await;
    buffer.read_full_range().await.unwrap();

    sim.set_fail_writes(true);
    assert!(buffer.write_point(6, 200, false).await.is_err());

    assert_eq!(buffer.read_point(6, 1).await.unwrap(), vec![100]);
    assert_eq!(sim.peek_register(1, 6).await, 100);
}

// ========== Error path tests ==========

#[tokio::test]
async fn unbound_transport_short_circuits() {
    let provider = Arc::new(LateTransport::new());
    let buffer = RegisterBuffer::new("late", 1, None, provider.clone());
    buffer.register(0, 1).await;

    assert!(matches!(
        buffer.read_full_range().await,
        Err(FieldbusError::TransportUnavailable)
    ));
    assert!(matches!(
        buffer.read_point(0, 1).await,
        Err(FieldbusError::TransportUnavailable)
    ));

    // Binding the transport recovers on the next cycle with no other action
    let sim = Arc::new(SimDevice::new());
    provider.bind(sim.clone());
    buffer.read_full_range().await.unwrap();
    assert_eq!(sim.stats().register_reads, 1);
}

#[tokio::test]
async fn short_response_is_an_error_and_never_cached() {
    let sim = Arc::new(SimDevice::new());
    sim.set_register(1, 0, 11).await;
    sim.set_register(1, 1, 22).await;

    let buffer = register_buffer(&sim, None);
    buffer.register(0, 2).await;

    sim.set_short_response(Some(1));
    assert!(matches!(
        buffer.read_point(0, 2).await,
        Err(FieldbusError::ShortResponse { expected: 2, got: 1 })
    ));

    // Nothing was cached from the failure; a healthy response reads through
    sim.set_short_response(None);
    assert_eq!(buffer.read_point(0, 2).await.unwrap(), vec![11, 22]);
}

#[tokio::test]
async fn failed_single_read_leaves_cache_untouched() {
    let sim = Arc::new(SimDevice::new());
    sim.set_coil(1, 4, true).await;

    let buffer = coil_buffer(&sim, None);
    buffer.register(4, 1).await;
    buffer.read_point(4, 1).await.unwrap();

    sim.set_fail_reads(true);
    // Cache hit still serves without touching the wire
    assert_eq!(buffer.read_point(4, 1).await.unwrap(), vec![true]);

    // Forced read hits the failing wire and reports it
    assert!(buffer.force_read_point(4, 1).await.is_err());
}

// ========== Concurrency tests ==========

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dirty_observations_collapse_into_one_read() {
    let sim = Arc::new(SimDevice::new());
    let buffer = Arc::new(register_buffer(&sim, Some(Duration::from_secs(30))));
    buffer.register(0, 8).await;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let buffer = buffer.clone();
        tasks.push(tokio::spawn(async move {
            buffer.read_full_range().await.unwrap();
            buffer.read_point(3, 1).await.unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // All sixteen pollers were served by a single wire transaction
    assert_eq!(sim.stats().register_reads, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn write_then_read_observes_written_value_across_tasks() {
    let sim = Arc::new(SimDevice::new());
    let buffer = Arc::new(coil_buffer(&sim, Some(Duration::from_secs(30))));
    buffer.register(1, 1).await;

    buffer.write_point(1, true, false).await.unwrap();

    let reader = {
        let buffer = buffer.clone();
        tokio::spawn(async move { buffer.read_point(1, 1).await.unwrap() })
    };
    assert_eq!(reader.await.unwrap(), vec![true]);
}
