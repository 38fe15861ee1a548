//! Behaviour of the paged window cache against a scripted catalogue.

mod support;

use std::sync::Arc;

use marquee_core::WindowError;
use marquee_core::model::PageIndex;
use marquee_core::window::{
    Advance, Bootstrap, FetchState, PageFetch, PageWindowCache, Phase,
    WindowConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use support::{ScriptedSource, item, page_of};

fn config() -> WindowConfig {
    WindowConfig::new(12, 3).expect("valid config")
}

fn page(n: u32) -> PageIndex {
    PageIndex::new(n).expect("non-zero page")
}

fn cache(source: &Arc<ScriptedSource>) -> PageWindowCache<Arc<ScriptedSource>> {
    PageWindowCache::new(source.clone(), config())
}

async fn advance_to(cache: &PageWindowCache<Arc<ScriptedSource>>, cursor: usize) {
    while cache.cursor() < cursor {
        cache.advance().await.expect("advance");
    }
    assert_eq!(cache.cursor(), cursor);
}

#[tokio::test]
async fn bootstrap_then_three_advances_stay_local() {
    let source = ScriptedSource::full_pages(10, 12);
    let cache = cache(&source);

    assert_eq!(cache.bootstrap().await.unwrap(), Bootstrap::Loaded { items: 24 });
    assert_eq!(cache.current_window(), vec![item(1, 0), item(1, 1), item(1, 2)]);

    for expected in [3, 6, 9] {
        let outcome = cache.advance().await.unwrap();
        assert_eq!(
            outcome,
            Advance::Moved {
                cursor: expected,
                fetch: PageFetch::NotNeeded
            }
        );
    }
    assert_eq!(source.calls(), vec![1, 2]);
}

#[tokio::test]
async fn reaching_the_tail_fetches_the_next_page() {
    let source = ScriptedSource::full_pages(10, 12);
    let cache = cache(&source);
    cache.bootstrap().await.unwrap();

    // 12 < 21: plain move
    advance_to(&cache, 12).await;
    advance_to(&cache, 18).await;
    assert_eq!(source.calls().len(), 2);

    let outcome = cache.advance().await.unwrap();
    assert_eq!(
        outcome,
        Advance::Moved {
            cursor: 21,
            fetch: PageFetch::Fetched {
                page: page(3),
                items: 12
            }
        }
    );
    assert_eq!(cache.len(), 36);
    assert_eq!(source.calls(), vec![1, 2, 3]);
    assert_eq!(
        cache.current_window(),
        vec![item(2, 9), item(2, 10), item(2, 11)]
    );
}

#[tokio::test]
async fn concurrent_advances_share_one_fetch() {
    let source = ScriptedSource::full_pages(10, 12);
    let gate = source.gate(3);
    let cache = Arc::new(cache(&source));
    cache.bootstrap().await.unwrap();
    advance_to(&cache, 18).await;

    let first = tokio::spawn({
        let cache = cache.clone();
        async move { cache.advance().await }
    });
    source.wait_for_calls(3).await;
    assert_eq!(
        cache.fetch_state(),
        FetchState::FetchingPage(page(3))
    );

    // The second call sees the slot taken and clamps against 24 items.
    let second = cache.advance().await.unwrap();
    assert!(matches!(
        second,
        Advance::Moved {
            cursor: 21,
            fetch: PageFetch::InFlight(_)
        }
    ));

    gate.notify_one();
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, Advance::Moved { cursor: 21, .. }));
    assert_eq!(source.calls_for(3), 1);
    assert_eq!(cache.len(), 36);
    assert_eq!(cache.fetch_state(), FetchState::Idle);
}

#[tokio::test]
async fn bootstrap_failure_leaves_cache_empty() {
    let source = ScriptedSource::full_pages(10, 12);
    source.fail_once(1, "API error: 500");
    let cache = cache(&source);

    let err = cache.bootstrap().await.unwrap_err();
    assert!(matches!(err, WindowError::Bootstrap { .. }));
    assert!(cache.is_empty());
    assert_eq!(cache.cursor(), 0);
    assert!(cache.fetched_pages().is_empty());

    let snapshot = cache.snapshot();
    assert_eq!(snapshot.error.as_deref(), Some("API error: 500"));
    assert!(!snapshot.loading);
    assert!(snapshot.items.is_empty());

    // Explicit re-invocation retries.
    assert_eq!(cache.bootstrap().await.unwrap(), Bootstrap::Loaded { items: 24 });
    assert_eq!(cache.phase(), Phase::Ready);
}

#[tokio::test]
async fn late_second_page_failure_drops_the_first_page() {
    let source = ScriptedSource::full_pages(10, 12);
    let gate = source.gate(2);
    source.fail_once(2, "API error: 503");
    let cache = Arc::new(cache(&source));

    let task = tokio::spawn({
        let cache = cache.clone();
        async move { cache.bootstrap().await }
    });
    // Page 1 resolves while page 2 is held.
    source.wait_for_calls(2).await;
    tokio::task::yield_now().await;
    assert!(cache.is_empty());
    gate.notify_one();

    let err = task.await.unwrap().unwrap_err();
    match err {
        WindowError::Bootstrap { page: failed, .. } => assert_eq!(failed, page(2)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(cache.items().is_empty());
    assert!(cache.fetched_pages().is_empty());
    assert_eq!(cache.cursor(), 0);
    assert_eq!(cache.phase(), Phase::Failed("API error: 503".to_string()));
    assert_eq!(source.calls(), vec![1, 2]);
}

#[tokio::test]
async fn bootstrap_merges_by_page_not_by_arrival() {
    let source = ScriptedSource::full_pages(10, 12);
    let gate = source.gate(1);
    let cache = Arc::new(cache(&source));

    let task = tokio::spawn({
        let cache = cache.clone();
        async move { cache.bootstrap().await }
    });
    // Page 2 completes while page 1 is still held.
    source.wait_for_calls(2).await;
    tokio::task::yield_now().await;
    gate.notify_one();
    task.await.unwrap().unwrap();

    let items = cache.items();
    let boundary = items.iter().position(|i| page_of(*i) == 2).unwrap();
    assert_eq!(boundary, 12);
    assert!(items[..12].iter().all(|i| page_of(*i) == 1));
    assert!(items[12..].iter().all(|i| page_of(*i) == 2));
}

#[tokio::test]
async fn bootstrap_runs_once() {
    let source = ScriptedSource::full_pages(10, 12);
    let gate = source.gate(2);
    let cache = Arc::new(cache(&source));

    let task = tokio::spawn({
        let cache = cache.clone();
        async move { cache.bootstrap().await }
    });
    source.wait_for_calls(2).await;
    assert!(cache.snapshot().loading);
    assert!(matches!(
        cache.bootstrap().await,
        Err(WindowError::BootstrapInFlight)
    ));

    gate.notify_one();
    task.await.unwrap().unwrap();
    assert_eq!(cache.bootstrap().await.unwrap(), Bootstrap::AlreadyLoaded);
    assert_eq!(source.calls(), vec![1, 2]);
}

#[tokio::test]
async fn advance_failure_releases_the_slot_and_retries_later() {
    let source = ScriptedSource::full_pages(10, 12);
    source.fail_once(3, "API error: 502");
    let cache = cache(&source);
    cache.bootstrap().await.unwrap();
    advance_to(&cache, 18).await;

    let err = cache.advance().await.unwrap_err();
    assert!(matches!(err, WindowError::PageFetch { .. }));
    assert_eq!(cache.fetch_state(), FetchState::Idle);
    assert_eq!(cache.cursor(), 21);
    assert_eq!(cache.len(), 24);
    assert_eq!(
        cache.snapshot().advance_error.as_deref(),
        Some("API error: 502")
    );

    // Still at the tail, page 3 was never marked, so it is requested again.
    let outcome = cache.advance().await.unwrap();
    assert!(matches!(
        outcome,
        Advance::Moved {
            fetch: PageFetch::Fetched { items: 12, .. },
            ..
        }
    ));
    assert_eq!(source.calls_for(3), 2);
    assert_eq!(cache.snapshot().advance_error, None);
}

#[tokio::test]
async fn short_final_page_stops_growth() {
    let source = ScriptedSource::full_pages(2, 12);
    source.set_page_len(3, 5);
    let cache = cache(&source);
    cache.bootstrap().await.unwrap();

    for _ in 0..20 {
        cache.advance().await.unwrap();
    }
    assert_eq!(cache.len(), 29);
    assert_eq!(cache.cursor(), 26);
    assert_eq!(cache.current_window().len(), 3);
    assert_eq!(source.calls(), vec![1, 2, 3]);
}

#[tokio::test]
async fn advance_before_bootstrap_is_inert() {
    let source = ScriptedSource::full_pages(10, 12);
    let cache = cache(&source);

    assert_eq!(cache.advance().await.unwrap(), Advance::Empty);
    assert_eq!(cache.retreat(), 0);
    assert!(cache.current_window().is_empty());
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn retreat_never_fetches() {
    let source = ScriptedSource::full_pages(10, 12);
    let cache = cache(&source);
    cache.bootstrap().await.unwrap();
    advance_to(&cache, 9).await;

    assert_eq!(cache.retreat(), 6);
    assert_eq!(cache.retreat(), 3);
    for _ in 0..10 {
        assert_eq!(cache.retreat(), 0);
    }
    assert_eq!(source.calls(), vec![1, 2]);
    assert!(!cache.snapshot().can_retreat);
}

#[tokio::test]
async fn teardown_discards_in_flight_page() {
    let source = ScriptedSource::full_pages(10, 12);
    let gate = source.gate(3);
    let cache = Arc::new(cache(&source));
    cache.bootstrap().await.unwrap();
    advance_to(&cache, 18).await;

    let task = tokio::spawn({
        let cache = cache.clone();
        async move { cache.advance().await }
    });
    source.wait_for_calls(3).await;
    cache.teardown();
    gate.notify_one();

    assert_eq!(task.await.unwrap().unwrap(), Advance::Discarded);
    assert_eq!(cache.len(), 24);
    assert!(cache.is_detached());
    assert_eq!(cache.advance().await.unwrap(), Advance::Discarded);
    assert_eq!(cache.bootstrap().await.unwrap(), Bootstrap::Discarded);
}

#[tokio::test]
async fn reset_discards_pending_bootstrap_and_allows_a_new_one() {
    let source = ScriptedSource::full_pages(10, 12);
    let gate = source.gate(1);
    let cache = Arc::new(cache(&source));

    let task = tokio::spawn({
        let cache = cache.clone();
        async move { cache.bootstrap().await }
    });
    source.wait_for_calls(2).await;
    cache.reset();
    assert_eq!(cache.phase(), Phase::Idle);

    gate.notify_one();
    assert_eq!(task.await.unwrap().unwrap(), Bootstrap::Discarded);
    assert!(cache.is_empty());

    // The gate's single wakeup was consumed above; a fresh one releases the
    // second bootstrap.
    let gate = source.gate(1);
    gate.notify_one();
    assert_eq!(cache.bootstrap().await.unwrap(), Bootstrap::Loaded { items: 24 });
}

#[tokio::test]
async fn random_walks_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..16 {
        let source = ScriptedSource::full_pages(rng.random_range(2..8), 4);
        let cache = PageWindowCache::new(
            source.clone(),
            WindowConfig::new(4, 3).expect("valid config"),
        );
        cache.bootstrap().await.unwrap();
        let mut previous = cache.items();

        for _ in 0..60 {
            if rng.random_bool(0.7) {
                let _ = cache.advance().await.unwrap();
            } else {
                cache.retreat();
            }

            let items = cache.items();
            assert!(items.starts_with(&previous), "items must only grow");
            previous = items;

            let max = cache.len().saturating_sub(3);
            assert!(cache.cursor() <= max);
        }

        let calls = source.calls();
        let mut unique = calls.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(calls.len(), unique.len(), "page fetched twice: {calls:?}");
    }
}
