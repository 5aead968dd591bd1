//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Fail-fast single-writer guard.
//!
//! A run is meant to be driven from one thread at a time. Instead of a
//! blocking mutex, [`ConcurrencyGuard`] detects contract violations and
//! reports them immediately: a second writer, or a writer re-entering its
//! own operation, gets a [`ConcurrencyViolation`] and nothing waits.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::error;

const UNLOCKED: u64 = 0;

static NEXT_THREAD_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TOKEN: u64 = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
}

fn current_thread_token() -> u64 {
    THREAD_TOKEN.with(|token| *token)
}

/// Misuse of a run detected by its [`ConcurrencyGuard`]. Always a programming error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConcurrencyViolation {
    #[error("{requested} attempted while {held} is in progress on another thread")]
    Concurrent {
        requested: &'static str,
        held: &'static str,
    },
    #[error("{requested} re-entered while {held} is in progress on the same thread")]
    Reentrant {
        requested: &'static str,
        held: &'static str,
    },
}

/// Non-blocking, non-reentrant single-writer guard.
#[derive(Debug, Default)]
pub struct ConcurrencyGuard {
    owner: AtomicU64,
    operation: Mutex<Option<&'static str>>,
}

impl ConcurrencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-mode check: succeeds unless another thread holds the write lock.
    ///
    /// The thread currently holding the write lock may read freely, which lets
    /// change listeners query a run while it notifies them.
    pub fn verify(&self) -> Result<(), ConcurrencyViolation> {
        let owner = self.owner.load(Ordering::Acquire);
        if owner == UNLOCKED || owner == current_thread_token() {
            return Ok(());
        }
        let violation = ConcurrencyViolation::Concurrent {
            requested: "read",
            held: self.held_label(),
        };
        error!(%violation, "concurrent read of simulation run");
        Err(violation)
    }

    /// Acquire exclusive write mode for `operation`.
    pub fn lock(&self, operation: &'static str) -> Result<WriteGuard<'_>, ConcurrencyViolation> {
        let me = current_thread_token();
        match self
            .owner
            .compare_exchange(UNLOCKED, me, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                *self.operation.lock() = Some(operation);
                Ok(WriteGuard {
                    guard: self,
                    operation,
                })
            }
            Err(owner) => {
                let held = self.held_label();
                let violation = if owner == me {
                    ConcurrencyViolation::Reentrant {
                        requested: operation,
                        held,
                    }
                } else {
                    ConcurrencyViolation::Concurrent {
                        requested: operation,
                        held,
                    }
                };
                error!(%violation, "simulation run write lock refused");
                Err(violation)
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        self.owner.load(Ordering::Acquire) != UNLOCKED
    }

    /// Tag of the operation currently holding the write lock.
    pub fn held_operation(&self) -> Option<&'static str> {
        *self.operation.lock()
    }

    fn held_label(&self) -> &'static str {
        // The holder may release between the owner check and this read.
        self.held_operation().unwrap_or("<released>")
    }
}

/// Write-mode acquisition; released on drop, including during unwinding.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    guard: &'a ConcurrencyGuard,
    operation: &'static str,
}

impl WriteGuard<'_> {
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        *self.guard.operation.lock() = None;
        self.guard.owner.store(UNLOCKED, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Barrier;
    use std::thread;

    use super::*;

    #[test]
    fn write_lock_is_released_on_drop() {
        let guard = ConcurrencyGuard::new();
        {
            let write = guard.lock("setName").expect("first lock");
            assert_eq!(write.operation(), "setName");
            assert!(guard.is_locked());
            assert_eq!(guard.held_operation(), Some("setName"));
        }
        assert!(!guard.is_locked());
        assert_eq!(guard.held_operation(), None);
        guard.lock("simulate").expect("lock after release");
    }

    #[test]
    fn recursive_write_fails_fast() {
        let guard = ConcurrencyGuard::new();
        let _outer = guard.lock("simulate").expect("outer lock");
        let err = guard.lock("setName").expect_err("recursive lock");
        assert_eq!(
            err,
            ConcurrencyViolation::Reentrant {
                requested: "setName",
                held: "simulate"
            }
        );
        assert_eq!(guard.held_operation(), Some("simulate"));
    }

    #[test]
    fn owner_thread_may_read_while_writing() {
        let guard = ConcurrencyGuard::new();
        let _write = guard.lock("simulate").expect("lock");
        guard.verify().expect("same-thread read");
    }

    #[test]
    fn other_thread_is_rejected_without_blocking() {
        let guard = ConcurrencyGuard::new();
        let held = Barrier::new(2);
        let checked = Barrier::new(2);
        thread::scope(|scope| {
            scope.spawn(|| {
                let _write = guard.lock("simulate").expect("writer lock");
                held.wait();
                checked.wait();
            });
            held.wait();
            let write_err = guard.lock("copy").expect_err("concurrent write");
            assert_eq!(
                write_err,
                ConcurrencyViolation::Concurrent {
                    requested: "copy",
                    held: "simulate"
                }
            );
            let read_err = guard.verify().expect_err("concurrent read");
            assert!(matches!(
                read_err,
                ConcurrencyViolation::Concurrent { requested: "read", .. }
            ));
            checked.wait();
        });
        assert!(!guard.is_locked());
        guard.verify().expect("free after writer finished");
    }

    #[test]
    fn write_lock_released_when_operation_panics() {
        let guard = ConcurrencyGuard::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _write = guard.lock("simulate").expect("lock");
            panic!("engine exploded");
        }));
        assert!(result.is_err());
        assert!(!guard.is_locked());
    }
}
