use async_trait::async_trait;

use crate::entities::{Container, ContainerStatus, ContainerSummary, ScanEvent};
use crate::value_objects::{ContainerId, EventId};

#[async_trait]
pub trait ContainerRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn insert(&self, container: &Container) -> anyhow::Result<()>;
    async fn update(&self, container: &Container) -> anyhow::Result<()>;
    async fn delete(&self, id: &ContainerId) -> anyhow::Result<()>;
    async fn find_by_id(&self, id: &ContainerId) -> anyhow::Result<Option<Container>>;
    async fn find_by_number(&self, container_no: &str) -> anyhow::Result<Option<Container>>;
    async fn list(
        &self,
        status: Option<ContainerStatus>,
        container_no: Option<&str>,
    ) -> anyhow::Result<Vec<ContainerSummary>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ScanEventRepository: Send + Sync {
    async fn insert(&self, event: &ScanEvent) -> anyhow::Result<()>;
    /// All events for a container, oldest first.
    async fn list_for_container(&self, id: &ContainerId) -> anyhow::Result<Vec<ScanEvent>>;
    async fn find(&self, id: &EventId) -> anyhow::Result<Option<ScanEvent>>;
    async fn update(&self, event: &ScanEvent) -> anyhow::Result<()>;
    async fn delete(&self, id: &EventId) -> anyhow::Result<()>;
}
