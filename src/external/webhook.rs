use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// 转人工时推送给外部系统的内容
#[derive(Debug, Clone, Serialize)]
pub struct EscalationNotice {
    pub event: &'static str,
    pub session_id: Uuid,
    pub phone: String,
    pub customer_name: Option<String>,
    pub reason: String,
    pub priority: i32,
    pub queue_position: u64,
    pub escalated_at: DateTime<Utc>,
}

impl EscalationNotice {
    pub const EVENT: &'static str = "chat.escalated";
}

#[derive(Clone)]
pub struct WebhookService {
    client: Client,
}

impl Default for WebhookService {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookService {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub async fn send_escalation(&self, url: &str, notice: &EscalationNotice) -> AppResult<()> {
        let response = self.client.post(url).json(notice).send().await?;

        if response.status().is_success() {
            log::info!(
                "Escalation webhook delivered: session={} url={}",
                notice.session_id,
                url
            );
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!(
                "Escalation webhook failed: session={} status={} body={}",
                notice.session_id,
                status,
                error_text
            );
            Err(AppError::ExternalApiError(format!(
                "Webhook returned {status}: {error_text}"
            )))
        }
    }

    /// 后台发送，失败只记录日志
    pub fn spawn_escalation(&self, url: String, notice: EscalationNotice) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.send_escalation(&url, &notice).await {
                log::warn!("Escalation webhook for session {} not delivered: {}", notice.session_id, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_serializes_event_name() {
        let notice = EscalationNotice {
            event: EscalationNotice::EVENT,
            session_id: Uuid::nil(),
            phone: "010-1234-5678".into(),
            customer_name: None,
            reason: "상담원 요청".into(),
            priority: 1,
            queue_position: 2,
            escalated_at: Utc::now(),
        };
        let v = serde_json::to_value(&notice).unwrap();
        assert_eq!(v["event"], "chat.escalated");
        assert_eq!(v["queue_position"], 2);
    }
}
