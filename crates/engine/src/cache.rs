//! Cache Layer (spec §4.6): two bounded, LRU-evicted caches keyed by
//! `(ScopeId, key)` and `(ScopeId, value)`, guarded by
//! `parking_lot::Mutex` since cache mutation never spans a suspension
//! point (no lock is ever held across a store call).
//!
//! Shared via an `Arc<CacheLayer>` passed into every
//! [`crate::engine::ResolverEngine`] constructed over the same scope —
//! this is the "explicit context object" spec §9 asks for in place of
//! global factory state, and it's what lets two distinct resolver
//! objects over the same byte prefix share cache entries.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use resolver_core::{ResolverResult, ScopeId};

type ForwardKey = (ScopeId, String);
type ReverseKey = (ScopeId, u64);

pub struct CacheLayer {
    forward: Mutex<LruCache<ForwardKey, ResolverResult>>,
    reverse: Mutex<LruCache<ReverseKey, String>>,
}

impl CacheLayer {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        CacheLayer {
            forward: Mutex::new(LruCache::new(cap)),
            reverse: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get_forward(&self, scope: &ScopeId, key: &str) -> Option<ResolverResult> {
        self.forward.lock().get(&(scope.clone(), key.to_string())).cloned()
    }

    pub fn put_forward(&self, scope: &ScopeId, key: &str, result: ResolverResult) {
        self.forward.lock().put((scope.clone(), key.to_string()), result);
    }

    pub fn get_reverse(&self, scope: &ScopeId, value: u64) -> Option<String> {
        self.reverse.lock().get(&(scope.clone(), value)).cloned()
    }

    pub fn put_reverse(&self, scope: &ScopeId, value: u64, key: String) {
        self.reverse.lock().put((scope.clone(), value), key);
    }

    /// Evicts every entry for `scope` from both caches. Called whenever
    /// the locally-observed state version for that scope advances
    /// (spec §4.6: "any version bump invalidates both caches for that
    /// scope" — not a whole-cache clear, so unrelated scopes sharing
    /// this same context object are left untouched).
    pub fn invalidate_scope(&self, scope: &ScopeId) {
        {
            let mut forward = self.forward.lock();
            let stale: Vec<ForwardKey> = forward
                .iter()
                .filter(|((s, _), _)| s == scope)
                .map(|(k, _)| k.clone())
                .collect();
            for key in stale {
                forward.pop(&key);
            }
        }
        {
            let mut reverse = self.reverse.lock();
            let stale: Vec<ReverseKey> = reverse
                .iter()
                .filter(|((s, _), _)| s == scope)
                .map(|(k, _)| k.clone())
                .collect();
            for key in stale {
                reverse.pop(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn put_then_get_forward_hits() {
        let cache = CacheLayer::new(10);
        let scope = ScopeId::new(b"s".to_vec());
        cache.put_forward(&scope, "k", ResolverResult::new(1, None));
        assert_eq!(cache.get_forward(&scope, "k"), Some(ResolverResult::new(1, None)));
    }

    #[test]
    fn put_then_get_reverse_hits() {
        let cache = CacheLayer::new(10);
        let scope = ScopeId::new(b"s".to_vec());
        cache.put_reverse(&scope, 1, "k".to_string());
        assert_eq!(cache.get_reverse(&scope, 1), Some("k".to_string()));
    }

    #[test]
    fn invalidate_scope_clears_only_that_scope() {
        let cache = CacheLayer::new(10);
        let a = ScopeId::new(b"a".to_vec());
        let b = ScopeId::new(b"b".to_vec());
        cache.put_forward(&a, "k", ResolverResult::new(1, None));
        cache.put_forward(&b, "k", ResolverResult::new(2, None));
        cache.put_reverse(&a, 1, "k".to_string());
        cache.put_reverse(&b, 2, "k".to_string());

        cache.invalidate_scope(&a);

        assert_eq!(cache.get_forward(&a, "k"), None);
        assert_eq!(cache.get_reverse(&a, 1), None);
        assert_eq!(cache.get_forward(&b, "k"), Some(ResolverResult::new(2, None)));
        assert_eq!(cache.get_reverse(&b, 2), Some("k".to_string()));
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = CacheLayer::new(1);
        let scope = ScopeId::new(b"s".to_vec());
        cache.put_forward(&scope, "a", ResolverResult::new(1, None));
        cache.put_forward(&scope, "b", ResolverResult::new(2, None));
        assert_eq!(cache.get_forward(&scope, "a"), None);
        assert_eq!(cache.get_forward(&scope, "b"), Some(ResolverResult::new(2, None)));
    }

    proptest! {
        /// Whatever sequence of puts lands, a subsequent get for the most
        /// recently put value of a key always hits — cache capacity never
        /// drops the one entry that matters unless something else for the
        /// same scope crowded it out.
        #[test]
        fn last_write_for_a_key_is_always_readable_with_headroom(
            values in proptest::collection::vec(0u64..1000, 1..20),
        ) {
            let cache = CacheLayer::new(values.len() + 1);
            let scope = ScopeId::new(b"prop-cache".to_vec());
            let mut last = None;
            for v in values {
                cache.put_forward(&scope, "k", ResolverResult::new(v, None));
                last = Some(v);
            }
            prop_assert_eq!(cache.get_forward(&scope, "k").map(|r| r.value), last);
        }

        /// Invalidating one scope never disturbs entries recorded under a
        /// different scope, regardless of how many scopes or keys are
        /// interleaved first (spec §4.6: invalidation is per-scope).
        #[test]
        fn invalidate_scope_is_scope_local(
            scopes in proptest::collection::vec("[a-z]{1,4}", 2..6),
        ) {
            let cache = CacheLayer::new(100);
            let ids: Vec<ScopeId> = scopes.iter().map(|s| ScopeId::new(s.as_bytes().to_vec())).collect();
            for (i, id) in ids.iter().enumerate() {
                cache.put_forward(id, "k", ResolverResult::new(i as u64, None));
            }

            cache.invalidate_scope(&ids[0]);

            prop_assert_eq!(cache.get_forward(&ids[0], "k"), None);
            for (i, id) in ids.iter().enumerate().skip(1) {
                // Distinct scope strings may still collide by value; only
                // assert survival for scopes whose id differs from ids[0].
                if id != &ids[0] {
                    prop_assert_eq!(cache.get_forward(id, "k"), Some(ResolverResult::new(i as u64, None)));
                }
            }
        }
    }
}
