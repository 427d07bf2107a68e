//! Request-scoped memoization ("array cache").
//!
//! Values live only as long as the cache itself; create one per request and
//! drop it afterwards. Lookups that find nothing are cached as well, so a
//! missing row is queried at most once per request.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct ArrayCache {
    items: Mutex<HashMap<String, Box<dyn Any + Send>>>,
}

impl ArrayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn remember<T, F>(&self, key: &str, f: F) -> T
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.get::<T>(key) {
            return hit;
        }
        // Producer runs without the lock held so it may use the cache itself.
        let value = f();
        self.put(key, value.clone());
        value
    }

    /// The array cache has no expiry; kept for call-site readability.
    pub fn remember_forever<T, F>(&self, key: &str, f: F) -> T
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T,
    {
        self.remember(key, f)
    }

    /// Like `remember` for fallible producers. Errors are not cached.
    pub fn try_remember<T, E, F>(&self, key: &str, f: F) -> Result<T, E>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.get::<T>(key) {
            return Ok(hit);
        }
        let value = f()?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn forget(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop every key starting with `prefix`.
    pub fn forget_prefix(&self, prefix: &str) {
        self.lock().retain(|k, _| !k.starts_with(prefix));
    }

    pub fn flush(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.lock()
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    fn put<T: Send + 'static>(&self, key: &str, value: T) {
        self.lock().insert(key.to_string(), Box::new(value));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Box<dyn Any + Send>>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn remember_computes_once() {
        let cache = ArrayCache::new();
        let calls = Cell::new(0);
        let a = cache.remember("k", || {
            calls.set(calls.get() + 1);
            42
        });
        let b = cache.remember("k", || {
            calls.set(calls.get() + 1);
            7
        });
        assert_eq!((a, b), (42, 42));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn misses_are_cached() {
        let cache = ArrayCache::new();
        let first: Option<String> = cache.remember("user1", || None);
        let second: Option<String> = cache.remember("user1", || Some("late".into()));
        assert_eq!(first, None);
        assert_eq!(second, None);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ArrayCache::new();
        let err: Result<i32, &str> = cache.try_remember("k", || Err("boom"));
        assert!(err.is_err());
        let ok: Result<i32, &str> = cache.try_remember("k", || Ok(3));
        assert_eq!(ok, Ok(3));
    }

    #[test]
    fn forget_and_flush() {
        let cache = ArrayCache::new();
        cache.remember("a1", || 1);
        cache.remember("a2", || 2);
        cache.remember("b", || 3);
        assert!(cache.forget("b"));
        assert!(!cache.forget("b"));
        cache.forget_prefix("a");
        assert!(cache.is_empty());
        cache.remember("c", || 4);
        cache.flush();
        assert_eq!(cache.len(), 0);
    }
}
