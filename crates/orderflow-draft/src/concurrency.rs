// SPDX-License-Identifier: MIT OR Apache-2.0
//! Optimistic concurrency for draft updates: a bounded compare-and-swap
//! retry loop over the version field rather than network I/O (§4.11).

use orderflow_error::{ErrorCode, OrderFlowError};

/// Maximum number of retries before surfacing [`ErrorCode::OptimisticConflict`].
pub const MAX_RETRIES: u32 = 3;

/// Current stored version plus the value it guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The optimistic version.
    pub version: u64,
    /// The guarded value.
    pub value: T,
}

/// Caller-supplied conflict: the version read no longer matches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionConflict {
    /// The version this attempt was based on.
    pub expected: u64,
    /// The version actually found in storage.
    pub actual: u64,
}

/// Retry a versioned read-modify-write up to [`MAX_RETRIES`] times.
///
/// `attempt` is given the current stored state and must return either the
/// new state to write (on success) or a [`VersionConflict`] (when another
/// writer raced it) — `read` re-fetches the current state before each
/// retry. After [`MAX_RETRIES`] conflicts, returns
/// [`ErrorCode::OptimisticConflict`].
pub fn retry_on_conflict<T, ReadFn, AttemptFn>(
    mut read: ReadFn,
    mut attempt: AttemptFn,
) -> Result<Versioned<T>, OrderFlowError>
where
    ReadFn: FnMut() -> Versioned<T>,
    AttemptFn: FnMut(&Versioned<T>) -> Result<T, VersionConflict>,
{
    for retry in 0..=MAX_RETRIES {
        let current = read();
        match attempt(&current) {
            Ok(new_value) => {
                return Ok(Versioned { version: current.version + 1, value: new_value });
            }
            Err(conflict) => {
                tracing::warn!(
                    target: "orderflow.draft.concurrency",
                    retry,
                    expected = conflict.expected,
                    actual = conflict.actual,
                    "optimistic version conflict, retrying"
                );
            }
        }
    }
    Err(OrderFlowError::new(ErrorCode::OptimisticConflict, "exhausted retries on versioned update")
        .with_context("max_retries", MAX_RETRIES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn succeeds_on_first_attempt_when_uncontended() {
        let result = retry_on_conflict(
            || Versioned { version: 1, value: 10 },
            |current| Ok(current.value + 1),
        )
        .unwrap();
        assert_eq!(result.value, 11);
        assert_eq!(result.version, 2);
    }

    #[test]
    fn retries_until_conflicts_stop() {
        let attempts = Cell::new(0);
        let result = retry_on_conflict(
            || Versioned { version: 1, value: 0 },
            |_| {
                let n = attempts.get() + 1;
                attempts.set(n);
                if n < 2 {
                    Err(VersionConflict { expected: 1, actual: 2 })
                } else {
                    Ok(42)
                }
            },
        )
        .unwrap();
        assert_eq!(result.value, 42);
    }

    #[test]
    fn gives_up_after_max_retries_with_optimistic_conflict() {
        let result = retry_on_conflict(
            || Versioned { version: 1, value: 0 },
            |_| Err::<i32, _>(VersionConflict { expected: 1, actual: 2 }),
        );
        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::OptimisticConflict);
    }
}
