//! A process group simulated with threads.

use std::sync::{Arc, Barrier, Mutex, PoisonError};

use visu_reader::Communicator;

/// A collective call, as seen by one rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommEvent {
    Barrier,
    AllOk { local: bool, global: bool },
}

#[derive(Debug)]
struct Vote {
    acc: bool,
    result: bool,
}

#[derive(Debug)]
struct Shared {
    barrier: Barrier,
    vote: Mutex<Vote>,
}

/// One rank of a thread-backed group.
///
/// Every collective is recorded, so tests can check all ranks went through
/// the same sequence.
#[derive(Debug)]
pub struct ThreadCommunicator {
    rank: usize,
    size: usize,
    handle: i32,
    shared: Arc<Shared>,
    events: Mutex<Vec<CommEvent>>,
}

impl ThreadCommunicator {
    /// `size` ranks of one group, rank order.
    pub fn group(size: usize) -> Vec<Self> {
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size),
            vote: Mutex::new(Vote {
                acc: true,
                result: true,
            }),
        });
        (0..size)
            .map(|rank| Self {
                rank,
                size,
                handle: 91,
                shared: Arc::clone(&shared),
                events: Mutex::new(Vec::new()),
            })
            .collect()
    }

    /// A group of one.
    pub fn solo() -> Self {
        Self::group(1).remove(0)
    }

    /// Collectives entered so far.
    pub fn events(&self) -> Vec<CommEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Barriers entered so far.
    pub fn barrier_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CommEvent::Barrier))
            .count()
    }

    fn record(&self, event: CommEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Communicator for ThreadCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn handle(&self) -> i32 {
        self.handle
    }

    fn barrier(&self) {
        self.record(CommEvent::Barrier);
        self.shared.barrier.wait();
    }

    fn all_ok(&self, local: bool) -> bool {
        {
            let mut vote = self.shared.vote.lock().unwrap_or_else(PoisonError::into_inner);
            vote.acc &= local;
        }
        // The leader publishes and resets; nobody votes again before every
        // rank has read the published result.
        if self.shared.barrier.wait().is_leader() {
            let mut vote = self.shared.vote.lock().unwrap_or_else(PoisonError::into_inner);
            vote.result = vote.acc;
            vote.acc = true;
        }
        self.shared.barrier.wait();
        let global = self
            .shared
            .vote
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .result;
        self.record(CommEvent::AllOk { local, global });
        global
    }
}
