//! Concurrency Tests
//!
//! Tests for:
//! - Batch atomicity: a locked reader never sees part of a batch
//! - Streaming: assets added from a loader thread while a render thread reads
//! - Independence: a held lock on one scene never blocks another scene
//! - No deadlocks under mixed add/remove/asset traffic

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

use scene_membership::{AssetRegistry, LoadedAsset, MemoryEngine, SceneManager, SceneMembership};

const ROUNDS: usize = 2_000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_no_deadlocks() {
    let deadlocks = parking_lot::deadlock::check_deadlock();
    assert!(deadlocks.is_empty(), "{} deadlock cycles detected", deadlocks.len());
}

// ============================================================================
// Batch Atomicity
// ============================================================================

#[test]
fn locked_count_never_observes_partial_batch() {
    init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let scene = engine.create_scene();
    let membership = Arc::new(SceneMembership::new(
        scene,
        Arc::clone(&engine),
        Arc::new(AssetRegistry::new()),
    ));
    let batch = engine.create_entities(3);
    let done = Arc::new(AtomicBool::new(false));
    let start = Arc::new(Barrier::new(3));

    let adder = {
        let membership = Arc::clone(&membership);
        let batch = batch.clone();
        let start = Arc::clone(&start);
        thread::spawn(move || {
            start.wait();
            for _ in 0..ROUNDS {
                membership.add_entities(batch.iter().copied()).unwrap();
            }
        })
    };

    let remover = {
        let membership = Arc::clone(&membership);
        let batch = batch.clone();
        let start = Arc::clone(&start);
        thread::spawn(move || {
            start.wait();
            for _ in 0..ROUNDS {
                membership.remove_entities(batch.iter().copied()).unwrap();
            }
        })
    };

    let sampler = {
        let membership = Arc::clone(&membership);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut samples = 0usize;
            while !done.load(Ordering::Acquire) {
                let count = membership.entity_count_consistent().unwrap();
                assert!(count == 0 || count == 3, "observed partial batch: {count}");
                samples += 1;
            }
            samples
        })
    };

    start.wait();
    adder.join().unwrap();
    remover.join().unwrap();
    done.store(true, Ordering::Release);
    let samples = sampler.join().unwrap();

    assert!(samples > 0);
    let final_count = membership.entity_count().unwrap();
    assert!(final_count == 0 || final_count == 3);
    assert_eq!(membership.stats().batches, (ROUNDS * 2) as u64);
    assert_no_deadlocks();
}

#[test]
fn guard_reader_sees_whole_assets_only() {
    init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let assets = Arc::new(AssetRegistry::new());
    let scene = engine.create_scene();
    let membership = Arc::new(SceneMembership::new(
        scene,
        Arc::clone(&engine),
        Arc::clone(&assets),
    ));

    const ASSETS: usize = 50;
    const PER_ASSET: usize = 4;

    // Loader thread: registers assets and streams them into the scene.
    let loader = {
        let engine = Arc::clone(&engine);
        let assets = Arc::clone(&assets);
        let membership = Arc::clone(&membership);
        thread::spawn(move || {
            for i in 0..ASSETS {
                let asset = assets.register(
                    LoadedAsset::new(engine.create_entities(PER_ASSET)).with_name(format!("chunk_{i}")),
                );
                membership.add_asset_entities(asset).unwrap();
            }
        })
    };

    // Render thread: reads the scene every "frame" through the guard.
    let mut last = 0;
    loop {
        let count = {
            let scene = membership.lock();
            scene.entity_count().unwrap()
        };
        assert_eq!(count % PER_ASSET, 0, "asset observed half-added");
        assert!(count >= last, "count went backwards");
        last = count;
        if count == ASSETS * PER_ASSET || loader.is_finished() {
            break;
        }
        thread::yield_now();
    }

    loader.join().unwrap();
    assert_eq!(membership.entity_count_consistent().unwrap(), ASSETS * PER_ASSET);
    assert_eq!(assets.len(), ASSETS);
    assert_eq!(membership.stats().added, (ASSETS * PER_ASSET) as u64);
}

// ============================================================================
// Independence Between Scenes
// ============================================================================

#[test]
fn held_scene_does_not_block_other_scene() {
    init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let manager = Arc::new(SceneManager::new(
        Arc::clone(&engine),
        Arc::new(AssetRegistry::new()),
    ));
    let busy = manager.attach(engine.create_scene()).unwrap();
    let free = manager.attach(engine.create_scene()).unwrap();
    let entity = engine.create_entity();

    let held = busy.lock();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let free = Arc::clone(&free);
        thread::spawn(move || {
            free.add_entity(entity).unwrap();
            tx.send(free.entity_count_consistent().unwrap()).unwrap();
        })
    };

    let count = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("other scene was blocked by a held lock");
    assert_eq!(count, 1);
    drop(held);
    worker.join().unwrap();
}

#[test]
fn blocked_writer_proceeds_after_guard_drops() {
    init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let scene = engine.create_scene();
    let membership = Arc::new(SceneMembership::new(
        scene,
        Arc::clone(&engine),
        Arc::new(AssetRegistry::new()),
    ));
    let entity = engine.create_entity();

    let held = membership.lock();
    let (tx, rx) = mpsc::channel();
    let writer = {
        let membership = Arc::clone(&membership);
        thread::spawn(move || {
            membership.add_entity(entity).unwrap();
            tx.send(()).unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert_eq!(membership.entity_count().unwrap(), 0);

    drop(held);
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    writer.join().unwrap();
    assert_eq!(membership.entity_count().unwrap(), 1);
}

// ============================================================================
// Mixed Traffic
// ============================================================================

#[test]
fn mixed_traffic_settles_consistently() {
    init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let assets = Arc::new(AssetRegistry::new());
    let scene = engine.create_scene();
    let membership = Arc::new(SceneMembership::new(
        scene,
        Arc::clone(&engine),
        Arc::clone(&assets),
    ));

    let asset = assets.register(LoadedAsset::new(engine.create_entities(8)));
    let loose = engine.create_entities(8);

    let threads: Vec<_> = (0..4)
        .map(|i| {
            let membership = Arc::clone(&membership);
            let loose = loose.clone();
            thread::spawn(move || {
                for round in 0..200 {
                    if (i + round) % 2 == 0 {
                        membership.add_asset_entities(asset).unwrap();
                        membership.add_entity(loose[i]).unwrap();
                    } else {
                        membership.remove_asset_entities(asset).unwrap();
                        membership.remove_entity(loose[i]).unwrap();
                    }
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    // Settle into a known state and check nothing leaked or duplicated.
    membership.remove_asset_entities(asset).unwrap();
    membership.remove_entities(loose.iter().copied()).unwrap();
    assert_eq!(membership.entity_count().unwrap(), 0);

    membership.add_asset_entities(asset).unwrap();
    assert_eq!(membership.entity_count().unwrap(), 8);
    assert_no_deadlocks();
}
