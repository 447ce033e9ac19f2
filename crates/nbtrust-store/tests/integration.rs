use nbtrust_store::{SignatureStore, StoreError, StoreOptions};
use tempfile::TempDir;

const ALG: &str = "sha256";

fn sig(n: usize) -> String {
    format!("{n:064x}")
}

async fn open_temp(options: StoreOptions) -> (TempDir, SignatureStore) {
    let dir = TempDir::new().unwrap();
    let store = SignatureStore::open(dir.path().join("nbsignatures.db"), options)
        .await
        .unwrap();
    (dir, store)
}

#[tokio::test]
async fn store_then_check() {
    let (_dir, store) = open_temp(StoreOptions::create()).await;

    assert!(!store.check(&sig(1), ALG).await.unwrap());
    assert!(store.store(&sig(1), ALG).await.unwrap());
    assert!(store.check(&sig(1), ALG).await.unwrap());

    // Same digest under another algorithm is a different key.
    assert!(!store.check(&sig(1), "sha512").await.unwrap());

    // Duplicate store refreshes instead of inserting.
    assert!(!store.store(&sig(1), ALG).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
    store.close().await.unwrap();
}

#[tokio::test]
async fn remove_drops_record() {
    let (_dir, store) = open_temp(StoreOptions::create()).await;
    store.store(&sig(1), ALG).await.unwrap();

    assert!(store.remove(&sig(1), ALG).await.unwrap());
    assert!(!store.check(&sig(1), ALG).await.unwrap());
    assert!(!store.remove(&sig(1), ALG).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn records_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("nbsignatures.db");

    let store = SignatureStore::open(&path, StoreOptions::create()).await.unwrap();
    store.store(&sig(7), ALG).await.unwrap();
    store.close().await.unwrap();

    let store = SignatureStore::open(&path, StoreOptions::default()).await.unwrap();
    assert!(store.check(&sig(7), ALG).await.unwrap());
    store.close().await.unwrap();
}

#[tokio::test]
async fn manual_cull_keeps_three_quarters() {
    let (_dir, store) = open_temp(StoreOptions {
        cull: false,
        cache_size: 8,
        ..StoreOptions::create()
    })
    .await;

    for n in 0..12 {
        store.store(&sig(n), ALG).await.unwrap();
    }
    assert_eq!(store.count().await.unwrap(), 12);

    assert!(store.cull().await.unwrap());
    assert_eq!(store.count().await.unwrap(), 6);
    for n in 6..12 {
        assert!(store.check(&sig(n), ALG).await.unwrap(), "sig {n} should survive");
    }
    for n in 0..6 {
        assert!(!store.check(&sig(n), ALG).await.unwrap(), "sig {n} should be culled");
    }

    // Nothing left to drop.
    assert!(!store.cull().await.unwrap());
}

#[tokio::test]
async fn store_past_capacity_culls_automatically() {
    let (_dir, store) = open_temp(StoreOptions {
        cache_size: 8,
        ..StoreOptions::create()
    })
    .await;

    for n in 0..8 {
        store.store(&sig(n), ALG).await.unwrap();
    }
    assert_eq!(store.count().await.unwrap(), 8);

    store.store(&sig(8), ALG).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 6);
    for n in 3..9 {
        assert!(store.check(&sig(n), ALG).await.unwrap(), "sig {n} should survive");
    }
}

#[tokio::test]
async fn checked_record_survives_cull() {
    let (_dir, store) = open_temp(StoreOptions {
        cull: false,
        cache_size: 4,
        ..StoreOptions::create()
    })
    .await;

    for n in 0..5 {
        store.store(&sig(n), ALG).await.unwrap();
    }
    assert!(store.check(&sig(0), ALG).await.unwrap());

    store.cull().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 3);
    assert!(store.check(&sig(0), ALG).await.unwrap());
    assert!(store.check(&sig(4), ALG).await.unwrap());
    assert!(store.check(&sig(3), ALG).await.unwrap());
    assert!(!store.check(&sig(1), ALG).await.unwrap());
}

#[tokio::test]
async fn readonly_store_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nbsignatures.db");
    let writer = SignatureStore::open(&path, StoreOptions::create()).await.unwrap();
    writer.store(&sig(1), ALG).await.unwrap();
    writer.close().await.unwrap();

    let store = SignatureStore::open(&path, StoreOptions::readonly()).await.unwrap();
    assert!(matches!(store.store(&sig(2), ALG).await, Err(StoreError::Readonly)));
    assert!(matches!(store.remove(&sig(1), ALG).await, Err(StoreError::Readonly)));
    assert!(matches!(store.cull().await, Err(StoreError::Readonly)));

    assert!(store.check(&sig(1), ALG).await.unwrap());
    assert!(!store.check(&sig(2), ALG).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_database_without_create_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.db");

    let err = SignatureStore::open(&path, StoreOptions::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::NotFound(p) if p == path));

    let err = SignatureStore::open(&path, StoreOptions::readonly())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn invalid_options_rejected_before_touching_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nbsignatures.db");
    let options = StoreOptions {
        readonly: true,
        create: true,
        ..StoreOptions::default()
    };
    assert!(matches!(
        SignatureStore::open(&path, options).await,
        Err(StoreError::InvalidOptions(_))
    ));
    assert!(!path.exists());
}

#[tokio::test]
async fn record_carries_path_and_refreshed_last_seen() {
    let store = SignatureStore::open_in_memory(StoreOptions::default())
        .await
        .unwrap();
    store
        .store_with_path(&sig(1), ALG, Some("analysis/report.ipynb"))
        .await
        .unwrap();

    let first = store.record(&sig(1), ALG).await.unwrap().unwrap();
    assert_eq!(first.algorithm, ALG);
    assert_eq!(first.signature, sig(1));
    assert_eq!(first.path.as_deref(), Some("analysis/report.ipynb"));

    assert!(store.check(&sig(1), ALG).await.unwrap());
    let second = store.record(&sig(1), ALG).await.unwrap().unwrap();
    assert_eq!(second.id, first.id);
    assert!(second.last_seen > first.last_seen);

    assert!(store.record(&sig(2), ALG).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_checks_on_shared_handle() {
    let store = std::sync::Arc::new(
        SignatureStore::open_in_memory(StoreOptions::default())
            .await
            .unwrap(),
    );
    for n in 0..4 {
        store.store(&sig(n), ALG).await.unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move { store.check(&sig(n), ALG).await.unwrap() })
        })
        .collect();
    let mut hits = 0;
    for handle in handles {
        if handle.await.unwrap() {
            hits += 1;
        }
    }
    assert_eq!(hits, 4);
}
