use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
}

/// Outbound mail seam. Implementations are best-effort: callers commit
/// state first and treat a send failure as a logged side-effect failure,
/// never as a failure of the triggering operation.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        message: &EmailMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
