//! Process-wide write locks keyed by storage location
//!
//! Two pools opened on the same location share one lock, so their
//! load-mutate-save sequences never interleave.
//!
//! The table lives in process memory. Separate processes writing the same
//! file (two `ladder` invocations, say) are not serialized against each other;
//! hosts that run the CLI concurrently must queue their calls.

use crate::error::{LadderError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

static LOCKS: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();

/// Get the shared lock for `location`, creating it on first use.
///
/// Only callers in this process see the lock. `location` should already be
/// normalized, as [`crate::registry::JsonFileStore`] does.
pub fn lock_for(location: &str) -> Result<Arc<Mutex<()>>> {
    let table = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut table = table.lock().map_err(|_| LadderError::LockPoisoned {
        location: location.to_string(),
    })?;
    Ok(table
        .entry(location.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_location_shares_lock() {
        let a = lock_for("/tmp/ladder-lock-test.json").unwrap();
        let b = lock_for("/tmp/ladder-lock-test.json").unwrap();
        let c = lock_for("/tmp/ladder-lock-other.json").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
