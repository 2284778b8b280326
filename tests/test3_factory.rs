mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use sql_scope::prelude::*;

use common::{NamedClient, counting_factory, whoami};

#[tokio::test]
async fn factory_runs_once_per_scope() {
    let db = Db::scoped();
    let calls = Arc::new(AtomicUsize::new(0));

    let names = db
        .run(counting_factory("lazy", Arc::clone(&calls)), || async {
            let mut names = Vec::new();
            for _ in 0..5 {
                names.push(whoami(&db).await?);
            }
            Ok::<_, SqlScopeError>(names)
        })
        .await
        .unwrap();

    assert_eq!(names, vec!["lazy"; 5]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn factory_is_not_called_without_queries() {
    let db = Db::scoped();
    let calls = Arc::new(AtomicUsize::new(0));

    db.run(counting_factory("idle", Arc::clone(&calls)), || async {
        Ok::<_, SqlScopeError>(())
    })
    .await
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_first_queries_share_one_factory_call() {
    let db = Db::scoped();
    let calls = Arc::new(AtomicUsize::new(0));
    let factory_calls = Arc::clone(&calls);
    let factory = ClientFactory::shared(move || {
        factory_calls.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let client: SharedClient = NamedClient::new("slow-start");
            Ok::<_, SqlScopeError>(client)
        }
    });

    let names = db
        .run(factory, || async {
            join_all((0..8).map(|_| whoami(&db)))
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .unwrap();

    assert_eq!(names.len(), 8);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_scope_gets_its_own_factory_result() {
    let db = Db::scoped();
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory("shared-factory", Arc::clone(&calls));

    for _ in 0..3 {
        db.run(factory.clone(), || async {
            whoami(&db).await?;
            whoami(&db).await
        })
        .await
        .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_factory_is_retried_on_next_query() {
    let db = Db::scoped();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let source = ClientSource::factory(move || {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt == 0 {
                Err(SqlScopeError::factory("credentials service unavailable"))
            } else {
                Ok(NamedClient::new("recovered"))
            }
        }
    });

    let (first, second, third) = db
        .run(source, || async {
            let first = whoami(&db).await;
            let second = whoami(&db).await;
            let third = whoami(&db).await;
            Ok::<_, SqlScopeError>((first, second, third))
        })
        .await
        .unwrap();

    match first {
        Err(SqlScopeError::FactoryFailure(msg)) => {
            assert_eq!(msg, "credentials service unavailable");
        }
        other => panic!("expected factory failure, got {other:?}"),
    }
    assert_eq!(second.unwrap(), "recovered");
    assert_eq!(third.unwrap(), "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn factory_error_reaches_caller_unchanged() {
    let db = Db::scoped();
    let source = ClientSource::factory(|| async {
        Err::<PooledClient, _>(SqlScopeError::ConnectionError("tenant offline".into()))
    });

    let out = db
        .run(source, || async { db.query("SELECT 1").select().await })
        .await;
    assert!(matches!(out, Err(SqlScopeError::ConnectionError(msg)) if msg == "tenant offline"));
}
