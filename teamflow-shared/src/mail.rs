/// Outbound mail seam
///
/// Email delivery is an external collaborator: the application only needs
/// two messages (password-reset link, admin-created account credentials),
/// so the seam is a small trait object injected into the server state.
/// The default implementation logs instead of sending, which is what
/// development and tests use; a real transport implements the same trait.

use async_trait::async_trait;

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport-level failure
    #[error("Failed to deliver mail: {0}")]
    DeliveryError(String),
}

/// Outbound transactional mail
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a password-reset link containing the raw reset credential
    async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), MailError>;

    /// Sends login instructions with a generated temporary password
    async fn send_temporary_password(&self, to: &str, password: &str) -> Result<(), MailError>;
}

/// Mailer that logs instead of delivering
///
/// Used in development and tests. The reset token is logged at debug so a
/// developer can complete the flow locally without an SMTP server.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), MailError> {
        tracing::info!(to, "Password reset requested");
        tracing::debug!(to, token, "Reset link (log transport)");
        Ok(())
    }

    async fn send_temporary_password(&self, to: &str, password: &str) -> Result<(), MailError> {
        tracing::info!(to, "Temporary password issued");
        tracing::debug!(to, password, "Temporary credentials (log transport)");
        Ok(())
    }
}
