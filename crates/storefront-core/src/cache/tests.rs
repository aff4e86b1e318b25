use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicUsize;
use std::sync::{Mutex, mpsc};
use std::thread;

use super::*;

#[derive(Default)]
struct FakeSource {
    codes: Mutex<HashMap<String, Vec<CodeEntry>>>,
    failing: Mutex<HashSet<String>>,
    loads: AtomicUsize,
}

impl FakeSource {
    fn with_codes(pairs: &[(&str, &str)]) -> Arc<Self> {
        let source = Self::default();
        {
            let mut codes = source.codes.lock().expect("codes");
            for (type_key, code) in pairs {
                codes
                    .entry((*type_key).to_string())
                    .or_insert_with(Vec::new)
                    .push(CodeEntry::new(*type_key, *code, format!("label {code}")));
            }
        }
        Arc::new(source)
    }

    fn put(&self, type_key: &str, code: &str, label: &str) {
        let mut codes = self.codes.lock().expect("codes");
        let list = codes.entry(type_key.to_string()).or_default();
        list.retain(|entry| entry.code != code);
        list.push(CodeEntry::new(type_key, code, label));
    }

    fn fail(&self, type_key: &str) {
        self.failing
            .lock()
            .expect("failing")
            .insert(type_key.to_string());
    }

    fn heal(&self, type_key: &str) {
        self.failing.lock().expect("failing").remove(type_key);
    }

    fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl CodeSource for FakeSource {
    fn active_type_keys(&self) -> Result<Vec<String>> {
        let mut keys = self
            .codes
            .lock()
            .expect("codes")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        keys.sort();
        Ok(keys)
    }

    fn load_codes(&self, type_key: &str) -> Result<Vec<CodeEntry>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().expect("failing").contains(type_key) {
            return Err(StorefrontError::Internal(format!("store offline for {type_key}")));
        }
        Ok(self
            .codes
            .lock()
            .expect("codes")
            .get(type_key)
            .cloned()
            .unwrap_or_default())
    }
}

/// Wraps a [`FakeSource`]; the first load snapshots the codes, reports that it
/// started, then holds its result until released.
struct GatedSource {
    inner: Arc<FakeSource>,
    gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

struct Gate {
    started: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl GatedSource {
    fn wrap(inner: Arc<FakeSource>) -> (Arc<Self>, Gate) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let source = Arc::new(Self {
            inner,
            gate: Mutex::new(Some((started_tx, release_rx))),
        });
        let gate = Gate {
            started: started_rx,
            release: release_tx,
        };
        (source, gate)
    }
}

impl CodeSource for GatedSource {
    fn active_type_keys(&self) -> Result<Vec<String>> {
        self.inner.active_type_keys()
    }

    fn load_codes(&self, type_key: &str) -> Result<Vec<CodeEntry>> {
        let snapshot = self.inner.load_codes(type_key);
        let gate = self.gate.lock().expect("gate").take();
        if let Some((started, release)) = gate {
            started.send(()).expect("signal load started");
            release.recv().expect("wait for release");
        }
        snapshot
    }
}

fn labels(codes: &[CodeEntry]) -> Vec<&str> {
    codes.iter().map(|c| c.label.as_str()).collect()
}

#[test]
fn repeated_get_is_served_from_cache() {
    let source = FakeSource::with_codes(&[("X", "0"), ("X", "1")]);
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::PerType);

    let first = cache.get("X").expect("first");
    let second = cache.get("X").expect("second");

    assert_eq!(&*first, &*second);
    assert_eq!(source.load_count(), 1);
    assert!(cache.contains("X"));
}

#[test]
fn invalidating_a_type_makes_next_get_see_new_data() {
    let source = FakeSource::with_codes(&[("X", "0")]);
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::PerType);
    let before = cache.get("X").expect("before");
    assert_eq!(labels(&before), vec!["label 0"]);

    source.put("X", "0", "renamed");
    // no invalidation yet: cache still serves the old snapshot
    assert_eq!(labels(&cache.get("X").expect("stale")), vec!["label 0"]);

    cache
        .invalidate(&InvalidationScope::for_type("X"))
        .expect("invalidate");
    assert_eq!(labels(&cache.get("X").expect("after")), vec!["renamed"]);
    assert_eq!(source.load_count(), 2);
}

#[test]
fn per_type_policy_keeps_other_types_cached() {
    let source = FakeSource::with_codes(&[("X", "0"), ("Y", "0")]);
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::PerType);
    cache.get("X").expect("x");
    cache.get("Y").expect("y");

    cache
        .invalidate(&InvalidationScope::for_type("X"))
        .expect("invalidate");

    assert!(!cache.contains("X"));
    assert!(cache.contains("Y"));
}

#[test]
fn coarse_policy_drops_everything_on_a_single_type_write() {
    let source = FakeSource::with_codes(&[("X", "0"), ("Y", "0")]);
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::All);
    cache.get("X").expect("x");
    cache.get("Y").expect("y");

    cache
        .invalidate(&InvalidationScope::for_type("X"))
        .expect("invalidate");

    assert!(cache.is_empty());
}

#[test]
fn load_failure_propagates_and_caches_nothing() {
    let source = FakeSource::with_codes(&[("X", "0")]);
    source.fail("X");
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::PerType);

    let err = cache.get("X").expect_err("load should fail");
    assert!(matches!(err, StorefrontError::Internal(_)));
    assert!(!cache.contains("X"));

    source.heal("X");
    assert_eq!(cache.get("X").expect("healed").len(), 1);
    assert_eq!(source.load_count(), 2);
}

#[test]
fn refresh_all_continues_past_a_failing_type() {
    let source = FakeSource::with_codes(&[("A", "0"), ("B", "0"), ("C", "0"), ("C", "1")]);
    source.fail("B");
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::PerType);

    let report = cache.refresh_all().expect("refresh");

    assert_eq!(report.refreshed, vec!["A".to_string(), "C".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].type_key, "B");
    assert!(cache.contains("A"));
    assert!(!cache.contains("B"));
    assert!(cache.contains("C"));

    let snapshot = cache.entries().expect("entries");
    let sizes = snapshot
        .iter()
        .map(|e| (e.key.as_str(), e.value))
        .collect::<Vec<_>>();
    assert_eq!(sizes, vec![("A", 1), ("C", 2)]);
}

#[test]
fn refresh_all_drops_types_that_are_no_longer_active() {
    let source = FakeSource::with_codes(&[("A", "0")]);
    let cache = TypeCache::new(source.clone(), InvalidationPolicy::PerType);
    cache.get("GONE").expect("unknown type loads empty");
    assert!(cache.contains("GONE"));

    cache.refresh_all().expect("refresh");

    assert!(cache.contains("A"));
    assert!(!cache.contains("GONE"));
}

#[test]
fn clear_empties_the_cache() {
    let source = FakeSource::with_codes(&[("A", "0")]);
    let cache = TypeCache::new(source, InvalidationPolicy::PerType);
    cache.refresh_all().expect("refresh");
    assert_eq!(cache.len(), 1);

    cache.clear().expect("clear");
    assert!(cache.is_empty());
}

#[test]
fn concurrent_readers_and_invalidators_observe_latest_write() {
    let source = FakeSource::with_codes(&[("X", "0")]);
    let cache = Arc::new(TypeCache::new(source.clone(), InvalidationPolicy::PerType));

    let handles = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..50 {
                    if i % 4 == 0 {
                        cache
                            .invalidate(&InvalidationScope::for_type("X"))
                            .expect("invalidate");
                    } else {
                        cache.get("X").expect("get");
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().expect("join");
    }

    source.put("X", "0", "final");
    cache
        .invalidate(&InvalidationScope::for_type("X"))
        .expect("invalidate");
    assert_eq!(labels(&cache.get("X").expect("final")), vec!["final"]);
}

#[test]
fn load_overlapping_an_invalidation_is_not_published() {
    let fake = FakeSource::with_codes(&[("X", "0")]);
    let (source, gate) = GatedSource::wrap(Arc::clone(&fake));
    let cache = Arc::new(TypeCache::new(source, InvalidationPolicy::PerType));

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.get("X").expect("racing get"))
    };
    gate.started.recv().expect("load started");

    // A write lands while the reader holds a snapshot from before it.
    fake.put("X", "0", "written");
    cache
        .invalidate(&InvalidationScope::for_type("X"))
        .expect("invalidate");
    gate.release.send(()).expect("release load");

    let stale = reader.join().expect("join reader");
    assert_eq!(labels(&stale), vec!["label 0"]);
    assert!(!cache.contains("X"));
    assert_eq!(labels(&cache.get("X").expect("fresh")), vec!["written"]);
}

#[test]
fn refresh_overlapping_an_invalidation_publishes_nothing() {
    let fake = FakeSource::with_codes(&[("X", "0")]);
    let (source, gate) = GatedSource::wrap(Arc::clone(&fake));
    let cache = Arc::new(TypeCache::new(source, InvalidationPolicy::PerType));

    let refresher = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.refresh_all().expect("racing refresh"))
    };
    gate.started.recv().expect("refresh load started");

    fake.put("X", "0", "written");
    cache
        .invalidate(&InvalidationScope::for_type("X"))
        .expect("invalidate");
    gate.release.send(()).expect("release refresh");

    let report = refresher.join().expect("join refresher");
    assert_eq!(report.refreshed, vec!["X".to_string()]);
    assert!(!cache.contains("X"));
    assert!(cache.is_empty());
    assert_eq!(labels(&cache.get("X").expect("fresh")), vec!["written"]);
}
