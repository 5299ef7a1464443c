use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::queue::DropOldestQueue;
use super::speech::SpeechError;

/// Failure reported by a worker's external call. Logged, then dropped.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("haptic actuator returned HTTP {0}")]
    HapticStatus(u16),
    #[error("haptic request failed: {0}")]
    HapticTransport(String),
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

/// The slow, fallible side of a feedback channel.
///
/// Built and used only on the worker thread, so it need not be `Send`.
pub trait Delivery<T> {
    fn deliver(&mut self, item: T) -> Result<(), DeliveryError>;
}

/// Queue and polling parameters for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSettings {
    pub capacity: usize,
    pub poll_interval: Duration,
}

/// How a shutdown request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    Joined,
    /// The worker was still busy when the wait expired and has been detached.
    TimedOut,
    AlreadyStopped,
}

enum Message<T> {
    Deliver(T),
    Stop,
}

/// A bounded drop-oldest queue drained by one dedicated worker thread.
pub struct FeedbackChannel<T> {
    name: &'static str,
    queue: Arc<DropOldestQueue<Message<T>>>,
    accepting: AtomicBool,
    dropped: AtomicU64,
    worker: Option<JoinHandle<()>>,
    finished: Receiver<()>,
}

impl<T: Send + 'static> FeedbackChannel<T> {
    /// Start the worker. `make_delivery` runs on the worker thread before the
    /// first item is taken, so slow setup never delays the caller.
    pub fn spawn<D, F>(
        name: &'static str,
        settings: ChannelSettings,
        make_delivery: F,
    ) -> Result<Self, std::io::Error>
    where
        D: Delivery<T>,
        F: FnOnce() -> D + Send + 'static,
    {
        let queue = Arc::new(DropOldestQueue::new(settings.capacity));
        let (finished_tx, finished) = mpsc::channel();
        let worker_queue = Arc::clone(&queue);
        let worker = thread::Builder::new()
            .name(format!("feedback-{name}"))
            .spawn(move || {
                let mut delivery = make_delivery();
                debug!(channel = name, "Feedback worker started");
                loop {
                    match worker_queue.pop_timeout(settings.poll_interval) {
                        None => continue,
                        Some(Message::Stop) => break,
                        Some(Message::Deliver(item)) => {
                            if let Err(err) = delivery.deliver(item) {
                                warn!(channel = name, "Feedback delivery failed: {err}");
                            }
                        }
                    }
                }
                debug!(channel = name, "Feedback worker stopped");
                let _ = finished_tx.send(());
            })?;
        Ok(Self {
            name,
            queue,
            accepting: AtomicBool::new(true),
            dropped: AtomicU64::new(0),
            worker: Some(worker),
            finished,
        })
    }
}

impl<T> FeedbackChannel<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Queue an item without blocking. Returns false once shutdown has begun.
    pub fn enqueue(&self, item: T) -> bool {
        if !self.accepting.load(Ordering::Acquire) {
            return false;
        }
        let evicted = self.queue.push(Message::Deliver(item));
        if !evicted.is_empty() {
            self.dropped.fetch_add(evicted.len() as u64, Ordering::Relaxed);
            debug!(
                channel = self.name,
                evicted = evicted.len(),
                "Feedback queue full; dropped oldest"
            );
        }
        true
    }

    /// Items waiting for the worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Items evicted so far under backpressure.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting items, post the stop token and wait up to `timeout`.
    pub fn shutdown(&mut self, timeout: Duration) -> ShutdownOutcome {
        self.accepting.store(false, Ordering::Release);
        let Some(worker) = self.worker.take() else {
            return ShutdownOutcome::AlreadyStopped;
        };
        self.queue.push(Message::Stop);
        match self.finished.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.join();
                ShutdownOutcome::Joined
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    channel = self.name,
                    "Feedback worker still busy after {:?}; detaching", timeout
                );
                ShutdownOutcome::TimedOut
            }
        }
    }
}

impl<T> Drop for FeedbackChannel<T> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.accepting.store(false, Ordering::Release);
            self.queue.push(Message::Stop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    struct Recorder {
        seen: Arc<Mutex<Vec<u32>>>,
        delay: Duration,
    }

    impl Delivery<u32> for Recorder {
        fn deliver(&mut self, item: u32) -> Result<(), DeliveryError> {
            thread::sleep(self.delay);
            self.seen.lock().unwrap().push(item);
            if item % 2 == 1 {
                return Err(DeliveryError::HapticStatus(503));
            }
            Ok(())
        }
    }

    fn settings(capacity: usize) -> ChannelSettings {
        ChannelSettings {
            capacity,
            poll_interval: Duration::from_millis(5),
        }
    }

    fn recorder_channel(
        capacity: usize,
        delay: Duration,
    ) -> (FeedbackChannel<u32>, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let channel = FeedbackChannel::spawn("test", settings(capacity), move || Recorder {
            seen: sink,
            delay,
        })
        .unwrap();
        (channel, seen)
    }

    fn wait_for(seen: &Arc<Mutex<Vec<u32>>>, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while seen.lock().unwrap().len() < count && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn delivers_in_order_and_survives_errors() {
        let (mut channel, seen) = recorder_channel(8, Duration::ZERO);
        for item in 1..=4 {
            assert!(channel.enqueue(item));
        }
        wait_for(&seen, 4);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(channel.shutdown(Duration::from_secs(1)), ShutdownOutcome::Joined);
    }

    #[test]
    fn burst_beyond_capacity_keeps_newest_and_preserves_order() {
        let (mut channel, seen) = recorder_channel(3, Duration::from_millis(30));
        for item in 0..20 {
            channel.enqueue(item);
            assert!(channel.pending() <= 3);
        }
        wait_for(&seen, 1);
        let deadline = Instant::now() + Duration::from_secs(3);
        while !seen.lock().unwrap().contains(&19) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        let delivered = seen.lock().unwrap().clone();
        assert_eq!(delivered.last(), Some(&19));
        assert!(delivered.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(channel.dropped() > 0);
        channel.shutdown(Duration::from_secs(1));
    }

    #[test]
    fn shutdown_rejects_new_items_and_is_idempotent() {
        let (mut channel, _seen) = recorder_channel(2, Duration::ZERO);
        assert_eq!(channel.shutdown(Duration::from_secs(1)), ShutdownOutcome::Joined);
        assert!(!channel.enqueue(7));
        assert_eq!(
            channel.shutdown(Duration::from_secs(1)),
            ShutdownOutcome::AlreadyStopped
        );
    }

    #[test]
    fn shutdown_wait_is_bounded_when_worker_is_stuck() {
        let (mut channel, _seen) = recorder_channel(2, Duration::from_millis(800));
        channel.enqueue(2);
        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        assert_eq!(
            channel.shutdown(Duration::from_millis(100)),
            ShutdownOutcome::TimedOut
        );
        assert!(started.elapsed() < Duration::from_millis(600));
    }
}
