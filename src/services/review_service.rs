use crate::entities::{ReviewAlertStatus, review_entity as reviews};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 三星评价中出现这些词时视为投诉
const COMPLAINT_KEYWORDS: &[&str] = &[
    "불만", "환불", "반품", "교환", "불량", "고장", "망가", "깨진", "파손", "늦은", "지연", "안와",
    "안옴", "배송", "느림", "최악", "별로", "후회", "실망", "화남", "짜증", "불쾌", "사기", "가짜",
    "품질", "조잡", "싸구려", "소음", "시끄", "고객센터", "응대", "무시", "답변", "연락", "전화",
];

/// 1~2 星一律为投诉；3 星只有内容带负面关键词时才算
pub fn detect_complaint(content: &str, rating: i16) -> bool {
    match rating {
        ..=2 => true,
        3 => {
            let lower = content.to_lowercase();
            COMPLAINT_KEYWORDS.iter().any(|k| lower.contains(k))
        }
        _ => false,
    }
}

/// 处理完成时记录时间（已记录则保留），回到未完成状态时清空
pub fn next_resolved_at(
    current: Option<DateTime<Utc>>,
    status: ReviewAlertStatus,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        ReviewAlertStatus::Resolved => Some(current.unwrap_or(now)),
        _ => None,
    }
}

fn validate_rating(rating: i16) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::ValidationError(
            "Rating must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[derive(Clone)]
pub struct ReviewService {
    pool: DatabaseConnection,
}

impl ReviewService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &ReviewListQuery) -> AppResult<PaginatedResponse<ReviewResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = reviews::Entity::find();
        if let Some(source) = query.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(reviews::Column::Source.eq(source));
        }
        if let Some(sentiment) = query.sentiment {
            select = select.filter(reviews::Column::Sentiment.eq(sentiment));
        }
        if let Some(min) = query.min_rating {
            select = select.filter(reviews::Column::Rating.gte(min));
        }
        if let Some(max) = query.max_rating {
            select = select.filter(reviews::Column::Rating.lte(max));
        }
        if let Some(alerted) = query.alerted {
            select = select.filter(reviews::Column::IsAlerted.eq(alerted));
        }
        if let Some(status) = query.alert_status {
            select = select.filter(reviews::Column::AlertStatus.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(reviews::Column::ReviewDate)
            .order_by_desc(reviews::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;
        Ok(PaginatedResponse::new(
            list.into_iter().map(ReviewResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn stats(&self) -> AppResult<ReviewStatsResponse> {
        let pool = &self.pool;
        let count = move |status: ReviewAlertStatus| {
            reviews::Entity::find()
                .filter(reviews::Column::IsAlerted.eq(true))
                .filter(reviews::Column::AlertStatus.eq(status))
                .count(pool)
        };
        let ratings: Vec<i16> = reviews::Entity::find()
            .select_only()
            .column(reviews::Column::Rating)
            .into_tuple()
            .all(&self.pool)
            .await?;
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
            (sum / ratings.len() as f64 * 100.0).round() / 100.0
        };

        Ok(ReviewStatsResponse {
            total: ratings.len() as u64,
            average_rating,
            alerted: reviews::Entity::find()
                .filter(reviews::Column::IsAlerted.eq(true))
                .count(&self.pool)
                .await?,
            new_alerts: count(ReviewAlertStatus::New).await?,
            in_progress_alerts: count(ReviewAlertStatus::InProgress).await?,
            resolved_alerts: count(ReviewAlertStatus::Resolved).await?,
        })
    }

    pub async fn get(&self, id: i64) -> AppResult<ReviewResponse> {
        Ok(self.find(id).await?.into())
    }

    async fn find(&self, id: i64) -> AppResult<reviews::Model> {
        reviews::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".into()))
    }

    pub async fn create(&self, req: CreateReviewRequest) -> AppResult<ReviewResponse> {
        validate_rating(req.rating)?;
        let source = required(&req.source, "Source")?;
        let author = required(&req.author, "Author")?;
        let content = required(&req.content, "Content")?;

        let external_id = req.external_id.filter(|s| !s.trim().is_empty());
        if let Some(external_id) = external_id.as_deref() {
            let exists = reviews::Entity::find()
                .filter(reviews::Column::Source.eq(source.as_str()))
                .filter(reviews::Column::ExternalId.eq(external_id))
                .count(&self.pool)
                .await?;
            if exists > 0 {
                return Err(AppError::Conflict(
                    "Review already exists for this source".into(),
                ));
            }
        }

        let complaint = detect_complaint(&content, req.rating);
        let now = Utc::now();
        let review = reviews::ActiveModel {
            source: Set(source),
            author: Set(author),
            rating: Set(req.rating),
            review_date: Set(req.review_date.unwrap_or(now)),
            sentiment: Set(req.sentiment),
            topics: Set(req.topics),
            external_id: Set(external_id),
            option_text: Set(req.option_text),
            images: Set(req.images.map(serde_json::to_value).transpose()?),
            product_url: Set(req.product_url),
            is_alerted: Set(complaint),
            alert_status: Set(complaint.then_some(ReviewAlertStatus::New)),
            content: Set(content),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        if complaint {
            log::info!("Review {} flagged as complaint (rating {})", review.id, review.rating);
        }
        Ok(review.into())
    }

    pub async fn update(&self, id: i64, req: UpdateReviewRequest) -> AppResult<ReviewResponse> {
        if let Some(rating) = req.rating {
            validate_rating(rating)?;
        }
        let review = self.find(id).await?;
        let rating = req.rating.unwrap_or(review.rating);
        let content = match req.content.as_deref() {
            Some(c) => required(c, "Content")?,
            None => review.content.clone(),
        };
        let rescan = rating != review.rating || content != review.content;
        // 只会新增投诉标记，已标记的评价保留处理进度
        let raise = rescan && !review.is_alerted && detect_complaint(&content, rating);

        let mut am = review.into_active_model();
        if let Some(source) = req.source.as_deref() {
            am.source = Set(required(source, "Source")?);
        }
        if let Some(author) = req.author.as_deref() {
            am.author = Set(required(author, "Author")?);
        }
        if let Some(date) = req.review_date {
            am.review_date = Set(date);
        }
        if let Some(v) = req.sentiment {
            am.sentiment = Set(v);
        }
        if let Some(v) = req.topics {
            am.topics = Set(v);
        }
        if let Some(v) = req.option_text {
            am.option_text = Set(v);
        }
        if let Some(images) = req.images {
            am.images = Set(Some(serde_json::to_value(images)?));
        }
        if let Some(v) = req.product_url {
            am.product_url = Set(v);
        }
        if raise {
            am.is_alerted = Set(true);
            am.alert_status = Set(Some(ReviewAlertStatus::New));
        }
        am.rating = Set(rating);
        am.content = Set(content);
        am.updated_at = Set(Utc::now());
        let review = am.update(&self.pool).await?;
        if raise {
            log::info!("Review {} flagged as complaint after edit", review.id);
        }
        Ok(review.into())
    }

    pub async fn update_alert(
        &self,
        id: i64,
        req: UpdateReviewAlertRequest,
    ) -> AppResult<ReviewResponse> {
        let review = self.find(id).await?;
        if !review.is_alerted {
            return Err(AppError::ValidationError(
                "Review is not flagged as a complaint".into(),
            ));
        }
        let now = Utc::now();
        let resolved = req.alert_status == ReviewAlertStatus::Resolved;
        let resolved_at = next_resolved_at(review.resolved_at, req.alert_status, now);

        let mut am = review.into_active_model();
        am.alert_status = Set(Some(req.alert_status));
        if let Some(note) = req.alert_note {
            am.alert_note = Set(Some(note).filter(|n| !n.trim().is_empty()));
        }
        if resolved {
            if let Some(kind) = req.resolved_type.filter(|t| !t.trim().is_empty()) {
                am.resolved_type = Set(Some(kind.trim().to_uppercase()));
            }
        } else {
            am.resolved_type = Set(None);
        }
        am.resolved_at = Set(resolved_at);
        am.updated_at = Set(now);
        let review = am.update(&self.pool).await?;
        log::info!("Review {} alert status -> {:?}", review.id, req.alert_status);
        Ok(review.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let res = reviews::Entity::delete_by_id(id).exec(&self.pool).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Review not found".into()));
        }
        log::info!("Review {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_low_ratings_are_always_complaints() {
        assert!(detect_complaint("좋아요", 1));
        assert!(detect_complaint("", 2));
        assert!(!detect_complaint("배송이 빨라요 최고", 4));
        assert!(!detect_complaint("환불 받았지만 만족", 5));
    }

    #[test]
    fn test_three_star_needs_negative_keyword() {
        assert!(detect_complaint("포장은 괜찮은데 배송 지연이 심해요", 3));
        assert!(detect_complaint("고객센터 응대가 아쉬움", 3));
        assert!(!detect_complaint("그냥 무난합니다", 3));
    }

    #[test]
    fn test_next_resolved_at() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();

        assert_eq!(next_resolved_at(None, ReviewAlertStatus::Resolved, now), Some(now));
        assert_eq!(
            next_resolved_at(Some(earlier), ReviewAlertStatus::Resolved, now),
            Some(earlier)
        );
        assert_eq!(next_resolved_at(Some(earlier), ReviewAlertStatus::InProgress, now), None);
        assert_eq!(next_resolved_at(None, ReviewAlertStatus::New, now), None);
    }

    #[test]
    fn test_rating_range() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(matches!(validate_rating(0), Err(AppError::ValidationError(_))));
        assert!(matches!(validate_rating(6), Err(AppError::ValidationError(_))));
    }
}
