//! Status port
//!
//! Read-only, best-effort snapshot of external state. Absence is never
//! fatal.

use async_trait::async_trait;
use helm_domain::StatusSnapshot;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait StatusReader: Send + Sync {
    async fn read_status(&self, cancel: &CancellationToken) -> Option<StatusSnapshot>;
}

/// Reader for setups without a status source.
pub struct NoStatus;

#[async_trait]
impl StatusReader for NoStatus {
    async fn read_status(&self, _cancel: &CancellationToken) -> Option<StatusSnapshot> {
        None
    }
}
