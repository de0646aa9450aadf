use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::sync::MutexGuard;

static POISON_RECOVERIES: AtomicUsize = AtomicUsize::new(0);

/// Number of times a poisoned lock has been recovered in this process.
pub fn poison_recovery_count() -> usize {
    POISON_RECOVERIES.load(Ordering::Relaxed)
}

/// Locks `lock`, taking the inner value back if a previous holder panicked.
///
/// Session state guarded this way is always left consistent between
/// statements, so a panic elsewhere must not wedge later callers.
pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_healthy_mutex() {
        let lock = Mutex::new(5);
        *mutex_lock_or_recover(&lock) += 1;
        assert_eq!(*mutex_lock_or_recover(&lock), 6);
    }

    #[test]
    fn test_recovers_poisoned_mutex() {
        let lock = Arc::new(Mutex::new(vec![1]));
        let poisoner = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        let before = poison_recovery_count();
        let guard = mutex_lock_or_recover(&lock);
        assert_eq!(*guard, vec![1]);
        assert!(poison_recovery_count() > before);
    }
}
