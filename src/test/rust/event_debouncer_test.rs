mod support;

use std::time::Duration;

use tokio::sync::broadcast;

use pipeline_doorbell::{CameraEvent, CameraId, EventDebouncer, SensorFlag};
use support::MockMetrics;

const RESET: Duration = Duration::from_secs(10);

fn create_test_debouncer(delay: Option<Duration>) -> (EventDebouncer, broadcast::Receiver<CameraEvent>) {
    let (events, receiver) = broadcast::channel(16);
    let debouncer = EventDebouncer::new(CameraId::new("front-door").unwrap(), delay, events, MockMetrics::new());
    (debouncer, receiver)
}

fn sensor_changes(receiver: &mut broadcast::Receiver<CameraEvent>) -> Vec<(SensorFlag, bool)> {
    let mut changes = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        if let CameraEvent::SensorChanged { flag, active, .. } = event {
            changes.push((flag, active));
        }
    }
    changes
}

/// Let spawned timer tasks observe the advanced clock
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_trigger_sets_flag_and_resets_after_delay() {
    let (debouncer, mut events) = create_test_debouncer(Some(RESET));

    debouncer.trigger(SensorFlag::Motion);
    assert!(debouncer.is_active(SensorFlag::Motion));
    assert_eq!(sensor_changes(&mut events), vec![(SensorFlag::Motion, true)]);

    tokio::time::sleep(RESET - Duration::from_millis(1)).await;
    settle().await;
    assert!(debouncer.is_active(SensorFlag::Motion));

    tokio::time::sleep(Duration::from_millis(2)).await;
    settle().await;
    assert!(!debouncer.is_active(SensorFlag::Motion));
    assert_eq!(sensor_changes(&mut events), vec![(SensorFlag::Motion, false)]);
}

#[tokio::test(start_paused = true)]
async fn test_retrigger_rearms_from_second_trigger() {
    let (debouncer, mut events) = create_test_debouncer(Some(RESET));

    debouncer.trigger(SensorFlag::Doorbell);
    tokio::time::sleep(Duration::from_secs(6)).await;
    settle().await;
    debouncer.trigger(SensorFlag::Doorbell);

    // Ten seconds after the first trigger the flag is still held by the second
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert!(debouncer.is_active(SensorFlag::Doorbell));

    // Ten seconds after the second trigger it clears, exactly once
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert!(!debouncer.is_active(SensorFlag::Doorbell));

    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(
        sensor_changes(&mut events),
        vec![(SensorFlag::Doorbell, true), (SensorFlag::Doorbell, false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_flags_are_independent() {
    let (debouncer, _events) = create_test_debouncer(Some(RESET));

    debouncer.trigger(SensorFlag::Motion);
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    debouncer.trigger(SensorFlag::Doorbell);

    tokio::time::sleep(Duration::from_secs(6)).await;
    settle().await;
    assert!(!debouncer.is_active(SensorFlag::Motion));
    assert!(debouncer.is_active(SensorFlag::Doorbell));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_reset_keeps_flag_set() {
    let (debouncer, mut events) = create_test_debouncer(None);

    debouncer.trigger(SensorFlag::Motion);
    tokio::time::sleep(Duration::from_secs(3600)).await;
    settle().await;

    assert!(debouncer.is_active(SensorFlag::Motion));
    assert_eq!(sensor_changes(&mut events), vec![(SensorFlag::Motion, true)]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_reset() {
    let (debouncer, mut events) = create_test_debouncer(Some(RESET));

    debouncer.trigger(SensorFlag::Motion);
    debouncer.shutdown();

    tokio::time::sleep(RESET * 2).await;
    settle().await;

    assert!(debouncer.is_active(SensorFlag::Motion));
    assert_eq!(sensor_changes(&mut events), vec![(SensorFlag::Motion, true)]);
}

#[tokio::test(start_paused = true)]
async fn test_untriggered_flag_is_inactive() {
    let (debouncer, _events) = create_test_debouncer(Some(RESET));
    assert!(!debouncer.is_active(SensorFlag::Doorbell));
}
