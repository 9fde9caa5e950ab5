use crate::entities::mall_product_entity as products;
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

fn validate_numbers(price: Option<i64>, original_price: Option<i64>, stock: Option<i32>) -> AppResult<()> {
    if [price, original_price].iter().flatten().any(|v| *v < 0) {
        return Err(AppError::ValidationError("Prices must be >= 0".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::ValidationError("Stock must be >= 0".into()));
    }
    Ok(())
}

fn product_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("Product name is required".into()));
    }
    Ok(name.to_string())
}

fn filter_catalog(
    mut select: Select<products::Entity>,
    category: Option<&str>,
    search: Option<&str>,
) -> Select<products::Entity> {
    if let Some(category) = category.map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(products::Column::Category.eq(category));
    }
    if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(products::Column::Name.contains(term))
                .add(products::Column::Description.contains(term))
                .add(products::Column::Tags.contains(term)),
        );
    }
    select
}

fn sort_catalog(select: Select<products::Entity>, sort: ProductSort) -> Select<products::Entity> {
    let select = match sort {
        ProductSort::Newest => select.order_by_desc(products::Column::CreatedAt),
        ProductSort::PriceAsc => select.order_by_asc(products::Column::Price),
        ProductSort::PriceDesc => select.order_by_desc(products::Column::Price),
        ProductSort::Rating => select.order_by_desc(products::Column::Rating),
        ProductSort::Popular => select.order_by_desc(products::Column::SoldCount),
    };
    select.order_by_desc(products::Column::Id)
}

#[derive(Clone)]
pub struct MallProductService {
    pool: DatabaseConnection,
}

impl MallProductService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn page(
        &self,
        select: Select<products::Entity>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<MallProductResponse>> {
        let total = select.clone().count(&self.pool).await?;
        let list = select
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;
        Ok(PaginatedResponse::new(
            list.into_iter().map(MallProductResponse::from).collect(),
            params,
            total,
        ))
    }

    /// 前台目录：只含上架商品
    pub async fn list_public(
        &self,
        query: &ProductListQuery,
    ) -> AppResult<PaginatedResponse<MallProductResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = products::Entity::find().filter(products::Column::IsActive.eq(true));
        select = filter_catalog(select, query.category.as_deref(), query.search.as_deref());
        if let Some(featured) = query.featured {
            select = select.filter(products::Column::IsFeatured.eq(featured));
        }
        select = sort_catalog(select, query.sort.unwrap_or_default());
        self.page(select, &params).await
    }

    /// 前台详情，同时累加浏览次数
    pub async fn view_public(&self, id: i64) -> AppResult<MallProductResponse> {
        let res = products::Entity::update_many()
            .col_expr(
                products::Column::ViewCount,
                Expr::col(products::Column::ViewCount).add(1),
            )
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::IsActive.eq(true))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Product not found".into()));
        }
        Ok(self.find(id).await?.into())
    }

    pub async fn list_admin(
        &self,
        query: &AdminProductListQuery,
    ) -> AppResult<PaginatedResponse<MallProductResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = filter_catalog(
            products::Entity::find(),
            query.category.as_deref(),
            query.search.as_deref(),
        );
        if let Some(active) = query.is_active {
            select = select.filter(products::Column::IsActive.eq(active));
        }
        select = sort_catalog(select, ProductSort::Newest);
        self.page(select, &params).await
    }

    pub async fn get(&self, id: i64) -> AppResult<MallProductResponse> {
        Ok(self.find(id).await?.into())
    }

    async fn find(&self, id: i64) -> AppResult<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    pub async fn create(&self, req: CreateMallProductRequest) -> AppResult<MallProductResponse> {
        validate_numbers(Some(req.price), req.original_price, req.stock)?;
        let now = Utc::now();
        let product = products::ActiveModel {
            name: Set(product_name(&req.name)?),
            description: Set(req.description),
            price: Set(req.price),
            original_price: Set(req.original_price),
            stock: Set(req.stock.unwrap_or(0)),
            category: Set(req.category.filter(|c| !c.trim().is_empty())),
            tags: Set(req.tags),
            images: Set(req.images.map(serde_json::to_value).transpose()?),
            options: Set(req.options),
            is_active: Set(req.is_active.unwrap_or(true)),
            is_featured: Set(req.is_featured.unwrap_or(false)),
            sold_count: Set(0),
            view_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        log::info!("Mall product {} created: {}", product.id, product.name);
        Ok(product.into())
    }

    pub async fn update(
        &self,
        id: i64,
        req: UpdateMallProductRequest,
    ) -> AppResult<MallProductResponse> {
        validate_numbers(req.price, req.original_price.flatten(), req.stock)?;
        let product = self.find(id).await?;
        let mut am = product.into_active_model();
        if let Some(name) = req.name.as_deref() {
            am.name = Set(product_name(name)?);
        }
        if let Some(v) = req.description {
            am.description = Set(v);
        }
        if let Some(v) = req.price {
            am.price = Set(v);
        }
        if let Some(v) = req.original_price {
            am.original_price = Set(v);
        }
        if let Some(v) = req.stock {
            am.stock = Set(v);
        }
        if let Some(v) = req.category {
            am.category = Set(v.filter(|c| !c.trim().is_empty()));
        }
        if let Some(v) = req.tags {
            am.tags = Set(v);
        }
        if let Some(images) = req.images {
            am.images = Set(Some(serde_json::to_value(images)?));
        }
        if let Some(v) = req.options {
            am.options = Set(v);
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        if let Some(v) = req.is_featured {
            am.is_featured = Set(v);
        }
        am.updated_at = Set(Utc::now());
        let product = am.update(&self.pool).await?;
        log::info!("Mall product {} updated", product.id);
        Ok(product.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let res = products::Entity::delete_by_id(id).exec(&self.pool).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Product not found".into()));
        }
        log::info!("Mall product {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, original_price: Option<i64>) -> products::Model {
        let now = Utc::now();
        products::Model {
            id: 1,
            name: "텀블러".to_string(),
            description: None,
            price,
            original_price,
            stock: 10,
            category: None,
            tags: None,
            images: None,
            options: None,
            is_active: true,
            is_featured: false,
            rating: None,
            sold_count: 0,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_discount_rate() {
        assert_eq!(product(7_000, Some(10_000)).discount_rate(), 30);
        assert_eq!(product(19_900, Some(29_900)).discount_rate(), 33);
        assert_eq!(product(10_000, Some(10_000)).discount_rate(), 0);
        assert_eq!(product(12_000, Some(10_000)).discount_rate(), 0);
        assert_eq!(product(0, Some(0)).discount_rate(), 0);
        assert_eq!(product(5_000, None).discount_rate(), 0);
    }

    #[test]
    fn test_product_validation() {
        assert!(validate_numbers(Some(0), None, Some(0)).is_ok());
        assert!(validate_numbers(Some(-1), None, None).is_err());
        assert!(validate_numbers(Some(100), Some(-5), None).is_err());
        assert!(validate_numbers(None, None, Some(-1)).is_err());
        assert_eq!(product_name("  머그컵 ").unwrap(), "머그컵");
        assert!(matches!(product_name("   "), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_response_parses_images_and_discount() {
        let mut p = product(8_000, Some(10_000));
        p.images = Some(serde_json::json!(["/uploads/a.jpg", "/uploads/b.jpg"]));
        let resp = MallProductResponse::from(p);
        assert_eq!(resp.discount_rate, 20);
        assert_eq!(resp.images, vec!["/uploads/a.jpg", "/uploads/b.jpg"]);
    }
}
