#![cfg(feature = "sqlite")]

use std::path::Path;

use futures_util::future::join_all;

use sql_scope::prelude::*;
use tempfile::TempDir;

fn descriptor(dir: &TempDir, name: &str) -> String {
    let path: &Path = &dir.path().join(name);
    format!("sqlite://{}", path.display())
}

async fn seed(db: &Db, label: &str) -> Result<(), SqlScopeError> {
    db.query("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, active INTEGER NOT NULL)")
        .dml()
        .await?;
    let inserted = db
        .query("INSERT INTO users (name, active) VALUES (?1, ?2), (?3, ?4)")
        .params(&[
            RowValues::Text(format!("{label}-alice")),
            RowValues::Bool(true),
            RowValues::Text(format!("{label}-bob")),
            RowValues::Bool(false),
        ])
        .dml()
        .await?;
    assert_eq!(inserted, 2);
    Ok(())
}

async fn active_names(db: &Db) -> Result<Vec<String>, SqlScopeError> {
    let rs = db
        .query("SELECT name FROM users WHERE active = ?1 ORDER BY id")
        .params(&[RowValues::Bool(true)])
        .select()
        .await?;
    Ok(rs
        .results
        .iter()
        .filter_map(|row| row.get("name").and_then(RowValues::as_text).map(str::to_string))
        .collect())
}

#[test]
fn descriptor_scope_runs_real_queries() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let url = descriptor(&dir, "tenant.db");
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let db = Db::scoped();
        let names = db
            .run(url.as_str(), || async {
                seed(&db, "t").await?;
                let touched = db
                    .query("UPDATE users SET active = 1 WHERE name = ?1")
                    .params(&[RowValues::Text("t-bob".into())])
                    .dml()
                    .await?;
                assert_eq!(touched, 1);
                active_names(&db).await
            })
            .await?;
        assert_eq!(names, vec!["t-alice", "t-bob"]);
        Ok::<_, SqlScopeError>(())
    })?;
    Ok(())
}

#[test]
fn descriptor_matches_prebuilt_client() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let url = descriptor(&dir, "shared.db");
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let db = Db::scoped();

        db.run(url.clone(), || async { seed(&db, "s").await }).await?;
        let via_descriptor = db.run(url.clone(), || async { active_names(&db).await }).await?;

        let prebuilt = PooledClient::connect(&url, &PoolOptions::default())?;
        let via_client = db
            .run(prebuilt, || async { active_names(&db).await })
            .await?;

        assert_eq!(via_descriptor, vec!["s-alice"]);
        assert_eq!(via_descriptor, via_client);
        Ok::<_, SqlScopeError>(())
    })?;
    Ok(())
}

#[test]
fn concurrent_descriptors_never_share_a_database() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let tenants: Vec<(String, String)> = (0..4)
        .map(|i| (format!("tenant{i}"), descriptor(&dir, &format!("tenant{i}.db"))))
        .collect();
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let db = Db::scoped_with_options(PoolOptions::default().with_max_size(2));
        assert_eq!(db.pool_options().max_size, 2);
        let mut handles = Vec::new();
        for (label, url) in tenants {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let names = db
                    .run(url, || async {
                        seed(&db, &label).await?;
                        tokio::task::yield_now().await;
                        active_names(&db).await
                    })
                    .await?;
                Ok::<_, SqlScopeError>((label, names))
            }));
        }

        for handle in handles {
            let (label, names) = handle
                .await
                .map_err(|e| SqlScopeError::Other(e.to_string()))??;
            assert_eq!(names, vec![format!("{label}-alice")]);
        }
        Ok::<_, SqlScopeError>(())
    })?;
    Ok(())
}

#[tokio::test]
async fn driver_errors_pass_through() {
    let db = Db::scoped();
    let err = db
        .run("sqlite::memory:", || async {
            db.query("SELECT * FROM no_such_table").select().await
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SqlScopeError::SqliteError(_)));
}

#[tokio::test]
async fn factory_can_build_a_pooled_client() {
    let db = Db::scoped();
    let source = ClientSource::factory(|| async {
        PooledClient::connect("sqlite::memory:", &PoolOptions::default().with_max_size(1))
    });

    let rs = db
        .run(source, || async {
            db.query("CREATE TABLE kv (k TEXT, v BLOB)").dml().await?;
            db.query("INSERT INTO kv VALUES (?1, ?2)")
                .params(&[RowValues::Text("key".into()), RowValues::Blob(vec![1, 2, 3])])
                .dml()
                .await?;
            db.query("SELECT k, v FROM kv").select().await
        })
        .await
        .unwrap();

    assert_eq!(rs.results.len(), 1);
    assert_eq!(rs.results[0].get("v").and_then(RowValues::as_blob), Some(&[1u8, 2, 3][..]));
}

#[test]
fn in_memory_descriptor_is_one_database_per_scope() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?;

    rt.block_on(async {
        // a large pool must not split an in-memory scope across databases
        let db = Db::scoped_with_options(PoolOptions::default().with_max_size(8).with_min_idle(Some(4)));
        let seen = db
            .run("sqlite::memory:", || async {
                db.query("CREATE TABLE t (x INTEGER)").dml().await?;
                db.query("INSERT INTO t (x) VALUES (?1)")
                    .params_owned(vec![RowValues::Int(1)])
                    .dml()
                    .await?;

                let reads = (0..8).map(|_| {
                    let db = db.clone();
                    scope::spawn(async move {
                        db.query("SELECT x FROM t").first().await.map(|row| {
                            row.and_then(|row| row.get("x").and_then(RowValues::as_int).copied())
                        })
                    })
                });
                let mut seen = Vec::new();
                for joined in join_all(reads).await {
                    seen.push(joined.map_err(|e| SqlScopeError::Other(e.to_string()))??);
                }
                Ok::<_, SqlScopeError>(seen)
            })
            .await?;

        assert_eq!(seen, vec![Some(1); 8]);
        Ok::<_, SqlScopeError>(())
    })?;
    Ok(())
}

#[tokio::test]
async fn in_memory_prebuilt_client_keeps_one_connection() {
    let client = PooledClient::connect(":memory:", &PoolOptions::default()).unwrap();
    let db = Db::scoped();
    let reads = db
        .run(client.clone(), || async {
            db.query("CREATE TABLE t (x INTEGER)").dml().await?;
            let reads = join_all((0..4).map(|_| db.query("SELECT count(*) AS n FROM t").select())).await;
            Ok::<_, SqlScopeError>(reads)
        })
        .await
        .unwrap();

    assert!(reads.iter().all(Result::is_ok));
    assert_eq!(client.connections(), 1);
}
