//! Generated sqlx impls against an in-memory SQLite database.
//!
//! Run with `cargo test -p prefixid --features sqlx`.

#![cfg(feature = "sqlx")]

use prefixid::prefixed_id;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool, Type};

#[prefixed_id("usr")]
pub struct UserId;

#[prefixed_id("org")]
pub struct OrgId;

async fn pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

#[test]
fn test_type_matches_text() {
    assert_eq!(
        <UserId as Type<Sqlite>>::type_info(),
        <String as Type<Sqlite>>::type_info()
    );
    assert!(<UserId as Type<Sqlite>>::compatible(
        &<String as Type<Sqlite>>::type_info()
    ));
}

#[tokio::test]
async fn test_bind_encodes_canonical_text() {
    let pool = pool().await;
    let id = UserId::new();

    let (text, decoded): (String, UserId) = sqlx::query_as("SELECT ?1, ?1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(text, id.to_string());
    assert_eq!(decoded, id);
}

#[tokio::test]
async fn test_table_roundtrip() {
    let pool = pool().await;
    sqlx::query("CREATE TABLE members (user_id TEXT PRIMARY KEY, org_id TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    let user = UserId::new();
    let org = OrgId::new();
    sqlx::query("INSERT INTO members (user_id, org_id) VALUES (?1, ?2), (?3, NULL)")
        .bind(user)
        .bind(org)
        .bind(UserId::EMPTY)
        .execute(&pool)
        .await
        .unwrap();

    let found: Option<OrgId> = sqlx::query_scalar("SELECT org_id FROM members WHERE user_id = ?1")
        .bind(user)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(found, Some(org));

    let (empty, missing): (UserId, Option<OrgId>) =
        sqlx::query_as("SELECT user_id, org_id FROM members WHERE org_id IS NULL")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(empty.is_empty());
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_decode_rejects_foreign_prefix() {
    let pool = pool().await;
    let err = sqlx::query_scalar::<_, UserId>("SELECT 'org_01hv4z2wqxkjnm8gpqy6vbkc3d'")
        .fetch_one(&pool)
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::ColumnDecode { .. }));

    let err = sqlx::query_scalar::<_, UserId>("SELECT 'usr_nope'")
        .fetch_one(&pool)
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::ColumnDecode { .. }));
}
