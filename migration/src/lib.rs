pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_enum_types;
mod m20251001_000002_create_staff_tables;
mod m20251001_000003_create_order_tables;
mod m20251001_000004_create_support_tables;
mod m20251001_000005_create_marketing_tables;
mod m20251001_000006_create_mall_tables;
mod m20251001_000007_create_base_products;
mod m20251001_000008_create_reviews;
mod m20251001_000009_create_mall_products;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_enum_types::Migration),
            Box::new(m20251001_000002_create_staff_tables::Migration),
            Box::new(m20251001_000003_create_order_tables::Migration),
            Box::new(m20251001_000004_create_support_tables::Migration),
            Box::new(m20251001_000005_create_marketing_tables::Migration),
            Box::new(m20251001_000006_create_mall_tables::Migration),
            Box::new(m20251001_000007_create_base_products::Migration),
            Box::new(m20251001_000008_create_reviews::Migration),
            Box::new(m20251001_000009_create_mall_products::Migration),
        ]
    }
}
