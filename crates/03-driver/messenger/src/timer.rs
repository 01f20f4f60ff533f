//! Deadline timer thread backing per-request timeouts.
//!
//! The messenger arms one deadline per request. The heap is append-only from
//! the messenger's point of view: entries cancelled by a terminal envelope
//! stay in the heap and simply expire against an id that is no longer in the
//! request table, which is a no-op. Table removal is therefore the single
//! cancellation point, and no race between a firing timer and a landing
//! terminal can terminate a request twice.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::thread;
use std::time::Instant;

use channel::RequestId;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

struct Arm {
    id: RequestId,
    deadline: Instant,
}

/// Owning handle for the timer thread; dropping it stops the thread.
pub(crate) struct TimerHandle {
    tx: Option<Sender<Arm>>,
    join: Option<thread::JoinHandle<()>>,
}

impl TimerHandle {
    /// Spawns the timer thread. `expire` runs on that thread for every lapsed
    /// deadline.
    pub fn spawn(expire: impl Fn(RequestId) + Send + 'static) -> Self {
        let (tx, rx) = unbounded();
        let join = thread::Builder::new()
            .name("messenger-timer".into())
            .spawn(move || run(rx, expire))
            .expect("spawn timer thread");
        Self {
            tx: Some(tx),
            join: Some(join),
        }
    }

    /// Schedules `id` to expire at `deadline`.
    pub fn arm(&self, id: RequestId, deadline: Instant) {
        if let Some(tx) = &self.tx {
            // Send can only fail during shutdown, when expiry is moot.
            let _ = tx.send(Arm { id, deadline });
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        // Disconnect first so the thread observes shutdown instead of
        // blocking forever on an empty heap.
        self.tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn run(rx: Receiver<Arm>, expire: impl Fn(RequestId)) {
    let mut heap: BinaryHeap<Reverse<(Instant, RequestId)>> = BinaryHeap::new();
    loop {
        match heap.peek().map(|Reverse((deadline, _))| *deadline) {
            None => match rx.recv() {
                Ok(arm) => heap.push(Reverse((arm.deadline, arm.id))),
                Err(_) => break,
            },
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    if let Some(Reverse((_, id))) = heap.pop() {
                        expire(id);
                    }
                    continue;
                }
                match rx.recv_timeout(deadline - now) {
                    Ok(arm) => heap.push(Reverse((arm.deadline, arm.id))),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }
    }
}
