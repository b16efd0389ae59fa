//! 探测循环测试
//!
//! 使用暂停的 tokio 时钟和 mock 探测器验证调度时序与关闭行为

use async_trait::async_trait;
use chrono::Utc;
use keepalive::ping::{LoopConfig, PingAttempt, PingLoop, PingOutcome, Pinger};
use keepalive::signal::shutdown_channel;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// 记录调用时间的 mock 探测器
#[derive(Default)]
struct RecordingPinger {
    /// 每次探测耗时
    delay: Duration,
    calls: Mutex<Vec<Instant>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingPinger {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pinger for RecordingPinger {
    async fn ping_once(&self, base_url: &str, _timeout: Duration) -> PingAttempt {
        self.calls.lock().unwrap().push(Instant::now());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        PingAttempt::new(
            format!("{base_url}/health"),
            Utc::now(),
            PingOutcome::Success {
                status_code: 200,
                latency: self.delay,
            },
        )
    }
}

fn loop_config(interval_ms: u64) -> LoopConfig {
    LoopConfig {
        target_url: "https://example.com".to_string(),
        interval: Duration::from_millis(interval_ms),
        timeout: Duration::from_secs(15),
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_ping_immediate_then_every_interval() {
    let pinger = Arc::new(RecordingPinger::default());
    let ping_loop = PingLoop::new(pinger.clone(), loop_config(100));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let start = Instant::now();
    let handle = tokio::spawn(async move { ping_loop.run(shutdown_rx).await });

    sleep(Duration::from_millis(350)).await;
    shutdown_tx.send(()).unwrap();
    let stats = handle.await.unwrap();

    let offsets: Vec<Duration> = pinger.calls().iter().map(|t| *t - start).collect();
    assert_eq!(offsets.len(), 4);
    for (i, offset) in offsets.iter().enumerate() {
        let expected = Duration::from_millis(100 * i as u64);
        assert!(
            *offset >= expected && *offset < expected + Duration::from_millis(5),
            "第 {i} 次探测时间偏差: {offset:?}"
        );
    }
    assert_eq!(stats.total_attempts, 4);
    assert_eq!(stats.successes, 4);
}

#[tokio::test(start_paused = true)]
async fn test_slow_pings_never_overlap() {
    let pinger = Arc::new(RecordingPinger::with_delay(Duration::from_millis(250)));
    let ping_loop = PingLoop::new(pinger.clone(), loop_config(100));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let handle = tokio::spawn(async move { ping_loop.run(shutdown_rx).await });

    sleep(Duration::from_millis(1_000)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(pinger.max_in_flight.load(Ordering::SeqCst), 1);

    let calls = pinger.calls();
    assert!(calls.len() >= 3);
    for pair in calls.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(250));
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_abandons_in_flight_ping() {
    let pinger = Arc::new(RecordingPinger::with_delay(Duration::from_secs(10)));
    let ping_loop = PingLoop::new(pinger.clone(), loop_config(60_000));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let start = Instant::now();
    let handle = tokio::spawn(async move { ping_loop.run(shutdown_rx).await });

    sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(()).unwrap();
    let stats = handle.await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(pinger.calls().len(), 1);
    assert_eq!(stats.total_attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_ping_after_shutdown() {
    let pinger = Arc::new(RecordingPinger::default());
    let ping_loop = PingLoop::new(pinger.clone(), loop_config(1_000));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let handle = tokio::spawn(async move { ping_loop.run(shutdown_rx).await });

    sleep(Duration::from_millis(1_500)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let calls_at_shutdown = pinger.calls().len();
    assert_eq!(calls_at_shutdown, 2);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(pinger.calls().len(), calls_at_shutdown);
}

#[tokio::test(start_paused = true)]
async fn test_observer_receives_every_attempt() {
    let pinger = Arc::new(RecordingPinger::default());
    let observed = Arc::new(AtomicUsize::new(0));
    let counter = observed.clone();

    let ping_loop = PingLoop::new(pinger, loop_config(100)).with_observer(Arc::new(
        move |attempt: &PingAttempt| {
            assert!(attempt.is_alive());
            counter.fetch_add(1, Ordering::SeqCst);
        },
    ));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let handle = tokio::spawn(async move { ping_loop.run(shutdown_rx).await });

    sleep(Duration::from_millis(250)).await;
    shutdown_tx.send(()).unwrap();
    let stats = handle.await.unwrap();

    assert_eq!(observed.load(Ordering::SeqCst), 3);
    assert_eq!(stats.total_attempts, 3);
}
