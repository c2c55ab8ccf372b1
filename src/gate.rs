//! Single-use start gate for k-way actor rendezvous.
//!
//! The gate holds every actor thread at the top of its critical section and
//! releases all of them when the last one arrives. Without it, thread-spawn
//! latency would bias nearly every trial toward "first actor finishes before
//! second begins" and the run would explore almost no interleavings.
//!
//! The release is best-effort simultaneity, not a guarantee: waiters spin on
//! an atomic flag so wakeup does not go through the scheduler, which keeps
//! the release window as tight as real hardware allows.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Spinning rendezvous point for the actor threads of one trial.
///
/// Unlike a generational barrier this gate trips exactly once; each trial
/// constructs its own.
#[derive(Debug)]
pub struct StartGate {
    parties: usize,
    arrived: AtomicUsize,
    released: AtomicBool,
}

impl StartGate {
    /// Creates a gate that releases when `parties` threads have arrived.
    ///
    /// # Panics
    /// Panics if `parties == 0`.
    #[must_use]
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "start gate requires at least 1 party");
        Self {
            parties,
            arrived: AtomicUsize::new(0),
            released: AtomicBool::new(false),
        }
    }

    /// Returns the number of parties required to release the gate.
    #[must_use]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Arrives at the gate and spins until every party has arrived.
    ///
    /// The last arrival releases all waiters and returns immediately.
    pub fn wait(&self) {
        let arrived = self.arrived.fetch_add(1, Ordering::AcqRel) + 1;
        if arrived == self.parties {
            self.released.store(true, Ordering::Release);
            return;
        }

        while !self.released.load(Ordering::Acquire) {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn gate_releases_all_parties() {
        let gate = Arc::new(StartGate::new(3));
        let passed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let gate = Arc::clone(&gate);
            let passed = Arc::clone(&passed);
            handles.push(std::thread::spawn(move || {
                gate.wait();
                passed.fetch_add(1, Ordering::SeqCst);
            }));
        }

        gate.wait();
        passed.fetch_add(1, Ordering::SeqCst);

        for handle in handles {
            handle.join().expect("thread failed");
        }

        assert_eq!(passed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn single_party_gate_passes_through() {
        let gate = StartGate::new(1);
        gate.wait();
        assert_eq!(gate.parties(), 1);
    }

    #[test]
    #[should_panic(expected = "at least 1 party")]
    fn zero_parties_rejected() {
        let _ = StartGate::new(0);
    }
}
