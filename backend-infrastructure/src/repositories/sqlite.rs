// SQLite-backed ledger store
// Implements both repository ports over one connection pool.

use std::path::Path;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;

use backend_domain::ports::{ContainerRepository, ScanEventRepository};
use backend_domain::{
    Container, ContainerId, ContainerMode, ContainerStatus, ContainerSummary, EventId,
    ManifestBlob, ScanEvent,
};

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Open or create the ledger database at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        info!(path = %path.display(), "ledger database opened");
        Ok(Self { pool })
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_container(&self, row: &SqliteRow) -> Result<Container> {
        let mode: String = row.get("mode");
        let status: String = row.get("status");
        let manifest_json: Option<String> = row.get("manifest_json");
        let manifest: Option<ManifestBlob> = match manifest_json {
            Some(json) if !json.is_empty() => Some(serde_json::from_str(&json)?),
            _ => None,
        };
        Ok(Container {
            id: ContainerId(row.get("id")),
            container_no: row.get("container_no"),
            description: row.get("description"),
            dock_no: row.get("dock_no"),
            mode: ContainerMode::parse(&mode)
                .ok_or_else(|| anyhow!("corrupt container mode '{}'", mode))?,
            status: ContainerStatus::parse(&status)
                .ok_or_else(|| anyhow!("corrupt container status '{}'", status))?,
            manifest,
            created_by: row.get("created_by"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_event(&self, row: &SqliteRow) -> ScanEvent {
        ScanEvent {
            id: EventId(row.get("id")),
            container_id: ContainerId(row.get("container_id")),
            sku: row.get("sku"),
            raw_code: row.get("raw_code"),
            qty: row.get("qty"),
            pallet_no: row.get("pallet_no"),
            box_no: row.get("box_no"),
            operator: row.get("operator"),
            created_at: row.get("created_at"),
        }
    }

    fn manifest_to_json(manifest: &Option<ManifestBlob>) -> Result<Option<String>> {
        manifest
            .as_ref()
            .map(|blob| serde_json::to_string(blob).map_err(Into::into))
            .transpose()
    }
}

#[async_trait]
impl ContainerRepository for SqliteRepo {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS containers (
                id TEXT PRIMARY KEY,
                container_no TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                dock_no TEXT NOT NULL DEFAULT '',
                mode TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'ACTIVE',
                manifest_json TEXT,
                created_by TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS scan_events (
                id TEXT PRIMARY KEY,
                container_id TEXT NOT NULL REFERENCES containers(id),
                sku TEXT NOT NULL,
                raw_code TEXT NOT NULL DEFAULT '',
                qty INTEGER NOT NULL DEFAULT 1,
                pallet_no TEXT NOT NULL DEFAULT '',
                box_no TEXT NOT NULL DEFAULT '',
                operator TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_scan_events_container ON scan_events(container_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        info!("ledger schema verified");
        Ok(())
    }

    async fn insert(&self, container: &Container) -> Result<()> {
        let manifest_json = Self::manifest_to_json(&container.manifest)?;
        sqlx::query(
            r#"
            INSERT INTO containers (id, container_no, description, dock_no, mode, status, manifest_json, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(container.id.as_str())
        .bind(&container.container_no)
        .bind(&container.description)
        .bind(&container.dock_no)
        .bind(container.mode.as_str())
        .bind(container.status.as_str())
        .bind(manifest_json)
        .bind(&container.created_by)
        .bind(container.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, container: &Container) -> Result<()> {
        let manifest_json = Self::manifest_to_json(&container.manifest)?;
        sqlx::query(
            r#"
            UPDATE containers
            SET description = ?, dock_no = ?, status = ?, manifest_json = ?
            WHERE id = ?
            "#,
        )
        .bind(&container.description)
        .bind(&container.dock_no)
        .bind(container.status.as_str())
        .bind(manifest_json)
        .bind(container.id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &ContainerId) -> Result<()> {
        // Events first, then the container itself.
        sqlx::query("DELETE FROM scan_events WHERE container_id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM containers WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ContainerId) -> Result<Option<Container>> {
        let row = sqlx::query("SELECT * FROM containers WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.row_to_container(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_number(&self, container_no: &str) -> Result<Option<Container>> {
        let row = sqlx::query("SELECT * FROM containers WHERE container_no = ?")
            .bind(container_no)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.row_to_container(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        status: Option<ContainerStatus>,
        container_no: Option<&str>,
    ) -> Result<Vec<ContainerSummary>> {
        let mut sql = String::from(
            "SELECT c.*, \
             (SELECT COUNT(*) FROM scan_events e WHERE e.container_id = c.id) AS scan_count \
             FROM containers c WHERE 1=1",
        );
        if status.is_some() {
            sql.push_str(" AND c.status = ?");
        }
        if container_no.is_some() {
            sql.push_str(" AND c.container_no LIKE ?");
        }
        sql.push_str(" ORDER BY c.created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        if let Some(container_no) = container_no {
            query = query.bind(format!("%{}%", container_no));
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                Ok(ContainerSummary {
                    container: self.row_to_container(row)?,
                    scan_count: row.get("scan_count"),
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ScanEventRepository for SqliteRepo {
    async fn insert(&self, event: &ScanEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scan_events (id, container_id, sku, raw_code, qty, pallet_no, box_no, operator, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.as_str())
        .bind(event.container_id.as_str())
        .bind(&event.sku)
        .bind(&event.raw_code)
        .bind(event.qty)
        .bind(&event.pallet_no)
        .bind(&event.box_no)
        .bind(&event.operator)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_container(&self, id: &ContainerId) -> Result<Vec<ScanEvent>> {
        let rows = sqlx::query(
            "SELECT * FROM scan_events WHERE container_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|row| self.row_to_event(row)).collect())
    }

    async fn find(&self, id: &EventId) -> Result<Option<ScanEvent>> {
        let row = sqlx::query("SELECT * FROM scan_events WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| self.row_to_event(&row)))
    }

    async fn update(&self, event: &ScanEvent) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE scan_events
            SET qty = ?, pallet_no = ?, box_no = ?, operator = ?
            WHERE id = ?
            "#,
        )
        .bind(event.qty)
        .bind(&event.pallet_no)
        .bind(&event.box_no)
        .bind(&event.operator)
        .bind(event.id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &EventId) -> Result<()> {
        sqlx::query("DELETE FROM scan_events WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::current_millis;

    async fn repo() -> SqliteRepo {
        let repo = SqliteRepo::open_in_memory().await.expect("open");
        ContainerRepository::ensure_schema(&repo)
            .await
            .expect("schema");
        repo
    }

    fn container(container_no: &str, mode: ContainerMode) -> Container {
        Container {
            id: ContainerId::generate(),
            container_no: container_no.to_string(),
            description: String::new(),
            dock_no: "D1".to_string(),
            mode,
            status: ContainerStatus::Active,
            manifest: None,
            created_by: "alice".to_string(),
            created_at: current_millis(),
        }
    }

    fn event(container_id: &ContainerId, sku: &str, qty: i64) -> ScanEvent {
        ScanEvent {
            id: EventId::generate(),
            container_id: container_id.clone(),
            sku: sku.to_string(),
            raw_code: sku.to_string(),
            qty,
            pallet_no: String::new(),
            box_no: String::new(),
            operator: "alice".to_string(),
            created_at: current_millis(),
        }
    }

    #[tokio::test]
    async fn container_round_trip() {
        let repo = repo().await;
        let container = container("CNT-1", ContainerMode::Manifest);
        ContainerRepository::insert(&repo, &container).await.unwrap();

        let loaded = repo.find_by_number("CNT-1").await.unwrap().unwrap();
        assert_eq!(loaded.id, container.id);
        assert_eq!(loaded.mode, ContainerMode::Manifest);
        assert!(loaded.manifest.is_none());
    }

    #[tokio::test]
    async fn duplicate_container_number_is_rejected() {
        let repo = repo().await;
        ContainerRepository::insert(&repo, &container("CNT-1", ContainerMode::Manual))
            .await
            .unwrap();
        let err =
            ContainerRepository::insert(&repo, &container("CNT-1", ContainerMode::Manual)).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn events_list_oldest_first_and_delete_cascades() {
        let repo = repo().await;
        let container = container("CNT-2", ContainerMode::Manual);
        ContainerRepository::insert(&repo, &container).await.unwrap();

        let mut first = event(&container.id, "SKU1", 1);
        first.created_at = 100;
        let mut second = event(&container.id, "SKU2", 2);
        second.created_at = 200;
        ScanEventRepository::insert(&repo, &second).await.unwrap();
        ScanEventRepository::insert(&repo, &first).await.unwrap();

        let events = repo.list_for_container(&container.id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sku, "SKU1");
        assert_eq!(events[1].sku, "SKU2");

        ContainerRepository::delete(&repo, &container.id)
            .await
            .unwrap();
        let events = repo.list_for_container(&container.id).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn correction_updates_exactly_one_event() {
        let repo = repo().await;
        let container = container("CNT-3", ContainerMode::Manual);
        ContainerRepository::insert(&repo, &container).await.unwrap();

        let first = event(&container.id, "SKU1", 1);
        let second = event(&container.id, "SKU1", 1);
        ScanEventRepository::insert(&repo, &first).await.unwrap();
        ScanEventRepository::insert(&repo, &second).await.unwrap();

        let mut corrected = repo.find(&first.id).await.unwrap().unwrap();
        corrected.qty = 10;
        corrected.pallet_no = "P-2".to_string();
        ScanEventRepository::update(&repo, &corrected).await.unwrap();

        let reloaded = repo.find(&first.id).await.unwrap().unwrap();
        assert_eq!(reloaded.qty, 10);
        assert_eq!(reloaded.pallet_no, "P-2");
        let untouched = repo.find(&second.id).await.unwrap().unwrap();
        assert_eq!(untouched.qty, 1);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_number() {
        let repo = repo().await;
        let mut active = container("CNT-10", ContainerMode::Manual);
        active.created_at = 100;
        let mut archived = container("CNT-11", ContainerMode::Manual);
        archived.status = ContainerStatus::Archived;
        archived.created_at = 200;
        ContainerRepository::insert(&repo, &active).await.unwrap();
        ContainerRepository::insert(&repo, &archived).await.unwrap();
        ScanEventRepository::insert(&repo, &event(&active.id, "SKU1", 3))
            .await
            .unwrap();

        let all = repo.list(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Newest container first.
        assert_eq!(all[0].container.container_no, "CNT-11");

        let active_only = repo.list(Some(ContainerStatus::Active), None).await.unwrap();
        assert_eq!(active_only.len(), 1);
        assert_eq!(active_only[0].scan_count, 1);

        let by_number = repo.list(None, Some("T-11")).await.unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].container.container_no, "CNT-11");
    }

    #[tokio::test]
    async fn manifest_blob_survives_round_trip() {
        let repo = repo().await;
        let mut container = container("CNT-20", ContainerMode::Manifest);
        container.manifest = Some(ManifestBlob {
            headers: vec!["SKU".to_string()],
            rows: vec![[("SKU".to_string(), "ABC123".to_string())].into_iter().collect()],
            sku_column_key: "SKU".to_string(),
            qty_column_key: None,
            file_name: "m.csv".to_string(),
        });
        ContainerRepository::insert(&repo, &container).await.unwrap();

        let loaded = repo.find_by_id(&container.id).await.unwrap().unwrap();
        let blob = loaded.manifest.expect("blob");
        assert_eq!(blob.rows.len(), 1);
        assert_eq!(blob.sku_column_key, "SKU");
    }
}
