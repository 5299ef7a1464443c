use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Bounded FIFO where a push never blocks: when full, the oldest pending
/// entries are evicted to admit the newest.
pub struct DropOldestQueue<T> {
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
    capacity: usize,
}

impl<T> DropOldestQueue<T> {
    /// Creates a queue holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `item`, evicting from the front as needed. Returns the evictions.
    pub fn push(&self, item: T) -> Vec<T> {
        let mut guard = self.lock();
        let mut evicted = Vec::new();
        while guard.len() >= self.capacity {
            match guard.pop_front() {
                Some(old) => evicted.push(old),
                None => break,
            }
        }
        guard.push_back(item);
        drop(guard);
        self.ready.notify_one();
        evicted
    }

    /// Removes the oldest entry, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let guard = self.lock();
        let (mut guard, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |items| items.is_empty())
            .unwrap_or_else(|err| err.into_inner());
        guard.pop_front()
    }

    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(|err| err.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn full_queue_evicts_oldest_first() {
        let queue = DropOldestQueue::new(3);
        for value in 0..3 {
            assert!(queue.push(value).is_empty());
        }
        assert_eq!(queue.push(3), vec![0]);
        assert_eq!(queue.len(), 3);
        let drained: Vec<_> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(drained, vec![1, 2, 3]);
    }

    #[test]
    fn length_never_exceeds_capacity_and_newest_survives() {
        let queue = DropOldestQueue::new(50);
        for value in 0..500u32 {
            queue.push(value);
            assert!(queue.len() <= 50);
        }
        let drained: Vec<_> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(drained.len(), 50);
        assert_eq!(drained.first(), Some(&450));
        assert_eq!(drained.last(), Some(&499));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let queue = DropOldestQueue::new(0);
        queue.push("a");
        assert_eq!(queue.push("b"), vec!["a"]);
        assert_eq!(queue.capacity(), 1);
    }

    #[test]
    fn pop_timeout_returns_none_when_idle() {
        let queue = DropOldestQueue::<u8>::new(2);
        let started = Instant::now();
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn pop_timeout_wakes_on_push_from_another_thread() {
        let queue = Arc::new(DropOldestQueue::new(2));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.push(42);
            })
        };
        assert_eq!(queue.pop_timeout(Duration::from_secs(2)), Some(42));
        producer.join().unwrap();
    }
}
