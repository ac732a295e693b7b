//! tests/database_tests.rs

#[cfg(test)]
mod tests {
    use crate::database::setup_database;

    #[actix_rt::test]
    async fn creates_file_and_runs_migrations_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.db");
        let url = format!("sqlite:{}", path.display());

        let db_pool = setup_database(&url).await.unwrap();
        assert!(path.exists());

        let seeded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM global_attributes")
            .fetch_one(&db_pool)
            .await
            .unwrap();
        assert!(seeded > 0);
        db_pool.close().await;

        // reabrir no vuelve a sembrar
        let db_pool = setup_database(&url).await.unwrap();
        let again: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM global_attributes")
            .fetch_one(&db_pool)
            .await
            .unwrap();
        assert_eq!(again, seeded);

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&db_pool)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
        db_pool.close().await;
    }
}
