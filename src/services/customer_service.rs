use crate::entities::customer_entity as customers;
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::ValidationError(format!(
            "Invalid email address: {raw}"
        )));
    }
    Ok(email)
}

/// 导入/创建时的 upsert 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Clone)]
pub struct CustomerService {
    pool: DatabaseConnection,
}

impl CustomerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &CustomerListQuery,
    ) -> AppResult<PaginatedResponse<CustomerResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = customers::Entity::find();
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(customers::Column::Name.contains(term))
                    .add(customers::Column::Email.contains(term))
                    .add(customers::Column::Phone.contains(term))
                    .add(customers::Column::Company.contains(term)),
            );
        }
        if let Some(grade) = non_empty(query.grade.clone()) {
            select = select.filter(customers::Column::Grade.eq(grade.to_uppercase()));
        }
        if let Some(segment) = non_empty(query.segment.clone()) {
            select = select.filter(customers::Column::Segment.eq(segment));
        }

        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(customers::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;
        Ok(PaginatedResponse::new(
            list.into_iter().map(CustomerResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn get(&self, id: i64) -> AppResult<CustomerResponse> {
        Ok(self.find(id).await?.into())
    }

    pub(crate) async fn find(&self, id: i64) -> AppResult<customers::Model> {
        customers::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))
    }

    pub async fn create(&self, req: CreateCustomerRequest) -> AppResult<CustomerResponse> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }
        let email = normalize_email(&req.email)?;
        let exists = customers::Entity::find()
            .filter(customers::Column::Email.eq(email.clone()))
            .count(&self.pool)
            .await?;
        if exists > 0 {
            return Err(AppError::Conflict("Customer email already exists".into()));
        }
        Ok(self.insert(email, req).await?.into())
    }

    async fn insert(&self, email: String, req: CreateCustomerRequest) -> AppResult<customers::Model> {
        let now = Utc::now();
        Ok(customers::ActiveModel {
            name: Set(req.name.trim().to_string()),
            email: Set(email),
            phone: Set(non_empty(req.phone)),
            company: Set(non_empty(req.company)),
            grade: Set(non_empty(req.grade)
                .map(|g| g.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CUSTOMER_GRADE.to_string())),
            segment: Set(non_empty(req.segment)),
            status: Set(non_empty(req.status)
                .map(|s| s.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CUSTOMER_STATUS.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?)
    }

    pub async fn update(&self, id: i64, req: UpdateCustomerRequest) -> AppResult<CustomerResponse> {
        let customer = self.find(id).await?;
        Ok(self.apply_update(customer, req).await?.into())
    }

    async fn apply_update(
        &self,
        customer: customers::Model,
        req: UpdateCustomerRequest,
    ) -> AppResult<customers::Model> {
        let mut am = customer.into_active_model();
        if let Some(name) = non_empty(req.name) {
            am.name = Set(name);
        }
        if req.phone.is_some() {
            am.phone = Set(non_empty(req.phone));
        }
        if req.company.is_some() {
            am.company = Set(non_empty(req.company));
        }
        if let Some(grade) = non_empty(req.grade) {
            am.grade = Set(grade.to_uppercase());
        }
        if req.segment.is_some() {
            am.segment = Set(non_empty(req.segment));
        }
        if let Some(status) = non_empty(req.status) {
            am.status = Set(status.to_uppercase());
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    /// 按邮箱新增或更新（表格导入用）
    pub async fn upsert_by_email(&self, req: CreateCustomerRequest) -> AppResult<UpsertOutcome> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }
        let email = normalize_email(&req.email)?;
        let existing = customers::Entity::find()
            .filter(customers::Column::Email.eq(email.clone()))
            .one(&self.pool)
            .await?;
        match existing {
            Some(customer) => {
                let update = UpdateCustomerRequest {
                    name: Some(req.name),
                    phone: req.phone,
                    company: req.company,
                    grade: req.grade,
                    segment: req.segment,
                    status: req.status,
                };
                self.apply_update(customer, update).await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.insert(email, req).await?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com ").unwrap(), "a@b.com");
        assert!(normalize_email("no-at-sign").is_err());
    }
}
