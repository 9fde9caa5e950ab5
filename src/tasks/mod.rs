//! Background scheduled tasks for the application.
//!
//! Call `spawn_all` once during startup to launch them.

use crate::config::ChatConfig;
use crate::services::ChatService;

/// Spawn all background tasks.
///
/// Tasks are detached via `tokio::spawn`; this function does not block.
pub fn spawn_all(chat_service: ChatService, chat_config: &ChatConfig) {
    // 按机器人配置的保留天数清理已结束的聊天会话
    {
        let svc = chat_service.clone();
        let interval = std::time::Duration::from_secs(chat_config.retention_sweep_interval_secs.max(60));
        tokio::spawn(async move {
            loop {
                match svc.purge_expired().await {
                    Ok(n) if n > 0 => log::info!("Expired chat sessions purged: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to purge expired chat sessions: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
