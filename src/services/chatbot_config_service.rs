use crate::entities::{chatbot_config_entity as configs, prompt_template_entity as templates};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde_json::json;

pub const DEFAULT_NAME: &str = "AI 고객상담";
pub const DEFAULT_WELCOME_MESSAGE: &str = "안녕하세요! 고객 서비스입니다.\n\n주문 시 사용하신 전화번호를 입력해주세요.\n(예: 010-1234-5678)\n\n전화번호 인증 후 주문 조회, 배송 확인 등을 이용하실 수 있습니다.";
pub const DEFAULT_SYSTEM_PROMPT: &str = "당신은 고객 상담 AI입니다.\n\n핵심 역할:\n- 고객의 주문/배송 문의에 친절하게 응대\n- 제품 관련 질문에 정확한 정보 제공\n- 필요시 상담원 연결 안내\n\n응대 원칙:\n1. 항상 존댓말을 사용\n2. 정확한 정보만 제공\n3. 복잡한 문의는 상담원 연결 권유";
pub const DEFAULT_BRAND_VOICE: &str = "친근함";
pub const DEFAULT_OUT_OF_HOURS_MESSAGE: &str = "현재 업무시간 외입니다. 업무시간(평일 09:00~18:00)에 다시 문의해 주세요.";
pub const DEFAULT_ESCALATION_KEYWORDS: &[&str] = &["상담원", "사람", "담당자", "연결", "전화", "직접"];

fn default_config() -> configs::ActiveModel {
    let now = Utc::now();
    configs::ActiveModel {
        name: Set(DEFAULT_NAME.to_string()),
        is_active: Set(true),
        welcome_message: Set(DEFAULT_WELCOME_MESSAGE.to_string()),
        system_prompt: Set(DEFAULT_SYSTEM_PROMPT.to_string()),
        brand_voice: Set(DEFAULT_BRAND_VOICE.to_string()),
        response_style: Set("BALANCED".to_string()),
        max_tokens: Set(1000),
        temperature: Set(0.7),
        require_phone_auth: Set(true),
        auto_greeting: Set(true),
        show_suggestions: Set(true),
        max_conversation_length: Set(50),
        enable_escalation: Set(true),
        escalation_keywords: Set(json!(DEFAULT_ESCALATION_KEYWORDS)),
        auto_escalate_on_fail: Set(true),
        max_fail_before_escalate: Set(3),
        business_hours_only: Set(false),
        business_hours_start: Set("09:00".to_string()),
        business_hours_end: Set("18:00".to_string()),
        business_days: Set("1,2,3,4,5".to_string()),
        out_of_hours_message: Set(DEFAULT_OUT_OF_HOURS_MESSAGE.to_string()),
        default_language: Set("ko".to_string()),
        supported_languages: Set("ko".to_string()),
        timezone: Set("Asia/Seoul".to_string()),
        theme_color: Set("#3B82F6".to_string()),
        chat_position: Set("bottom-right".to_string()),
        avatar_url: Set(None),
        data_retention_days: Set(90),
        blocked_keywords: Set(json!([])),
        sensitive_data_filter: Set(true),
        webhook_url: Set(None),
        notification_email: Set(None),
        version: Set(1),
        published_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

fn parse_hhmm(field: &str, raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AppError::ValidationError(format!("{field} must be HH:MM")))
}

/// 更新请求校验
pub fn validate_update(req: &UpdateChatbotConfigRequest) -> AppResult<()> {
    if let Some(style) = &req.response_style
        && !RESPONSE_STYLES.contains(&style.as_str())
    {
        return Err(AppError::ValidationError(format!(
            "response_style must be one of {}",
            RESPONSE_STYLES.join(", ")
        )));
    }
    if let Some(pos) = &req.chat_position
        && !CHAT_POSITIONS.contains(&pos.as_str())
    {
        return Err(AppError::ValidationError(format!(
            "chat_position must be one of {}",
            CHAT_POSITIONS.join(", ")
        )));
    }
    if req.temperature.is_some_and(|t| !(0.0..=2.0).contains(&t)) {
        return Err(AppError::ValidationError(
            "temperature must be between 0 and 2".into(),
        ));
    }
    if req.max_tokens.is_some_and(|t| t <= 0) {
        return Err(AppError::ValidationError("max_tokens must be positive".into()));
    }
    if req.max_conversation_length.is_some_and(|n| n <= 0) {
        return Err(AppError::ValidationError(
            "max_conversation_length must be positive".into(),
        ));
    }
    if req.max_fail_before_escalate.is_some_and(|n| n < 1) {
        return Err(AppError::ValidationError(
            "max_fail_before_escalate must be at least 1".into(),
        ));
    }
    if req.data_retention_days.is_some_and(|d| d < 1) {
        return Err(AppError::ValidationError(
            "data_retention_days must be at least 1".into(),
        ));
    }
    if let Some(start) = &req.business_hours_start {
        parse_hhmm("business_hours_start", start)?;
    }
    if let Some(end) = &req.business_hours_end {
        parse_hhmm("business_hours_end", end)?;
    }
    if let Some(days) = &req.business_days {
        if days.iter().any(|d| *d > 6) {
            return Err(AppError::ValidationError(
                "business_days must be between 0 (Sunday) and 6".into(),
            ));
        }
    }
    if req.supported_languages.as_ref().is_some_and(|l| l.is_empty()) {
        return Err(AppError::ValidationError(
            "supported_languages must not be empty".into(),
        ));
    }
    Ok(())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional_text(v: String) -> Option<String> {
    let v = v.trim().to_string();
    if v.is_empty() { None } else { Some(v) }
}

/// 把部分更新写入 ActiveModel（不含 version）
fn apply_update(am: &mut configs::ActiveModel, req: UpdateChatbotConfigRequest) {
    macro_rules! set_opt {
        ($($field:ident),* $(,)?) => {
            $(if let Some(v) = req.$field { am.$field = Set(v); })*
        };
    }
    set_opt!(
        name,
        is_active,
        welcome_message,
        system_prompt,
        brand_voice,
        response_style,
        max_tokens,
        temperature,
        require_phone_auth,
        auto_greeting,
        show_suggestions,
        max_conversation_length,
        enable_escalation,
        auto_escalate_on_fail,
        max_fail_before_escalate,
        business_hours_only,
        out_of_hours_message,
        default_language,
        timezone,
        theme_color,
        chat_position,
        data_retention_days,
        sensitive_data_filter,
    );
    if let Some(v) = req.business_hours_start {
        am.business_hours_start = Set(v.trim().to_string());
    }
    if let Some(v) = req.business_hours_end {
        am.business_hours_end = Set(v.trim().to_string());
    }
    if let Some(keywords) = req.escalation_keywords {
        am.escalation_keywords = Set(json!(clean_list(keywords)));
    }
    if let Some(keywords) = req.blocked_keywords {
        am.blocked_keywords = Set(json!(clean_list(keywords)));
    }
    if let Some(mut days) = req.business_days {
        days.sort_unstable();
        days.dedup();
        let joined = days.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        am.business_days = Set(joined);
    }
    if let Some(langs) = req.supported_languages {
        am.supported_languages = Set(clean_list(langs).join(","));
    }
    if let Some(url) = req.avatar_url {
        am.avatar_url = Set(optional_text(url));
    }
    if let Some(url) = req.webhook_url {
        am.webhook_url = Set(optional_text(url));
    }
    if let Some(email) = req.notification_email {
        am.notification_email = Set(optional_text(email));
    }
}

#[derive(Clone)]
pub struct ChatbotConfigService {
    pool: DatabaseConnection,
}

impl ChatbotConfigService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 当前配置（按创建时间取最新一行），不存在时按默认值创建
    pub async fn current(&self) -> AppResult<configs::Model> {
        let existing = configs::Entity::find()
            .order_by_desc(configs::Column::CreatedAt)
            .order_by_desc(configs::Column::Id)
            .one(&self.pool)
            .await?;
        match existing {
            Some(config) => Ok(config),
            None => {
                let config = default_config().insert(&self.pool).await?;
                log::info!("Chatbot config created from defaults (id={})", config.id);
                Ok(config)
            }
        }
    }

    pub async fn get(&self) -> AppResult<ChatbotConfigResponse> {
        Ok(self.current().await?.into())
    }

    pub async fn update(&self, req: UpdateChatbotConfigRequest) -> AppResult<ChatbotConfigResponse> {
        validate_update(&req)?;
        let config = self.current().await?;
        let version = config.version;
        let mut am = config.into_active_model();
        apply_update(&mut am, req);
        am.version = Set(version + 1);
        am.updated_at = Set(Utc::now());
        let config = am.update(&self.pool).await?;
        log::info!("Chatbot config updated to version {}", config.version);
        Ok(config.into())
    }

    pub async fn publish(&self) -> AppResult<ChatbotConfigResponse> {
        let config = self.current().await?;
        let mut am = config.into_active_model();
        let now = Utc::now();
        am.published_at = Set(Some(now));
        am.updated_at = Set(now);
        Ok(am.update(&self.pool).await?.into())
    }

    /// 只切换 is_active，不改版本号
    pub async fn toggle(&self) -> AppResult<ToggleChatbotResponse> {
        let config = self.current().await?;
        let is_active = !config.is_active;
        let mut am = config.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        Ok(ToggleChatbotResponse { is_active })
    }

    /// 恢复对话相关的默认值，业务时间/外观等设置保持不变
    pub async fn reset(&self) -> AppResult<ChatbotConfigResponse> {
        let config = self.current().await?;
        let version = config.version;
        let defaults = default_config();
        let mut am = config.into_active_model();
        am.name = defaults.name;
        am.welcome_message = defaults.welcome_message;
        am.system_prompt = defaults.system_prompt;
        am.brand_voice = defaults.brand_voice;
        am.response_style = defaults.response_style;
        am.max_tokens = defaults.max_tokens;
        am.temperature = defaults.temperature;
        am.require_phone_auth = defaults.require_phone_auth;
        am.auto_greeting = defaults.auto_greeting;
        am.show_suggestions = defaults.show_suggestions;
        am.max_conversation_length = defaults.max_conversation_length;
        am.enable_escalation = defaults.enable_escalation;
        am.escalation_keywords = defaults.escalation_keywords;
        am.auto_escalate_on_fail = defaults.auto_escalate_on_fail;
        am.max_fail_before_escalate = defaults.max_fail_before_escalate;
        am.version = Set(version + 1);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn list_templates(&self) -> AppResult<Vec<PromptTemplateResponse>> {
        let list = templates::Entity::find()
            .filter(templates::Column::IsActive.eq(true))
            .order_by_asc(templates::Column::Category)
            .order_by_asc(templates::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create_template(
        &self,
        req: CreatePromptTemplateRequest,
    ) -> AppResult<PromptTemplateResponse> {
        let name = req.name.trim();
        let category = req.category.trim();
        let content = req.content.trim();
        if name.is_empty() || category.is_empty() || content.is_empty() {
            return Err(AppError::ValidationError(
                "Name, category and content are required".into(),
            ));
        }
        let template = templates::ActiveModel {
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            content: Set(content.to_string()),
            variables: Set(req.variables.map(|v| json!(clean_list(v)))),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(template.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn test_validate_update_rejects_bad_values() {
        let ok = UpdateChatbotConfigRequest {
            response_style: Some("CONCISE".into()),
            temperature: Some(2.0),
            business_hours_start: Some("08:30".into()),
            business_days: Some(vec![0, 6]),
            ..Default::default()
        };
        assert!(validate_update(&ok).is_ok());

        let cases = [
            UpdateChatbotConfigRequest {
                response_style: Some("VERBOSE".into()),
                ..Default::default()
            },
            UpdateChatbotConfigRequest {
                temperature: Some(2.5),
                ..Default::default()
            },
            UpdateChatbotConfigRequest {
                max_tokens: Some(0),
                ..Default::default()
            },
            UpdateChatbotConfigRequest {
                business_hours_end: Some("25:00".into()),
                ..Default::default()
            },
            UpdateChatbotConfigRequest {
                business_days: Some(vec![1, 7]),
                ..Default::default()
            },
            UpdateChatbotConfigRequest {
                chat_position: Some("center".into()),
                ..Default::default()
            },
        ];
        for req in cases {
            assert!(validate_update(&req).is_err(), "{req:?}");
        }
    }

    #[test]
    fn test_apply_update_only_touches_supplied_fields() {
        let mut am = default_config();
        let before_prompt = am.system_prompt.clone();
        apply_update(
            &mut am,
            UpdateChatbotConfigRequest {
                name: Some("상담봇".into()),
                business_days: Some(vec![5, 1, 1, 3]),
                blocked_keywords: Some(vec![" 욕설 ".into(), "".into()]),
                webhook_url: Some("  ".into()),
                ..Default::default()
            },
        );
        assert_eq!(am.name, ActiveValue::Set("상담봇".to_string()));
        assert_eq!(am.business_days, ActiveValue::Set("1,3,5".to_string()));
        assert_eq!(am.blocked_keywords, ActiveValue::Set(json!(["욕설"])));
        assert_eq!(am.webhook_url, ActiveValue::Set(None));
        assert_eq!(am.system_prompt, before_prompt);
    }

    #[test]
    fn test_list_helpers() {
        assert_eq!(parse_business_days("1, 2,x,5"), vec![1, 2, 5]);
        assert_eq!(split_languages("ko,en,"), vec!["ko", "en"]);
        assert_eq!(json_string_list(&json!(["a", 1, "b"])), vec!["a", "b"]);
        assert!(json_string_list(&json!({"a": 1})).is_empty());
    }
}
