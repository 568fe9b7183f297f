use async_trait::async_trait;

use crate::errors::CheckoutError;

/// Bridge to host-provided conveniences: clipboard and desktop notifications.
///
/// Used only for the "copy payment link" action; failures here never affect
/// payment state.
#[async_trait]
pub trait HostBridge: Send + Sync {
    async fn write_clipboard(&self, text: &str) -> Result<(), CheckoutError>;

    /// Shows a notification if the host grants permission; denial is not an
    /// error.
    async fn notify(&self, title: &str, body: &str) -> Result<(), CheckoutError>;
}

/// Host bridge that silently drops everything, for headless embedding and
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

#[async_trait]
impl HostBridge for NoopHost {
    async fn write_clipboard(&self, _text: &str) -> Result<(), CheckoutError> {
        Ok(())
    }

    async fn notify(&self, _title: &str, _body: &str) -> Result<(), CheckoutError> {
        Ok(())
    }
}
