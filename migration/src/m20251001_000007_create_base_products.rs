use sea_orm_migration::prelude::*;

/// 基础商品 (KPI 计算参数)
#[derive(DeriveIden)]
enum BaseProducts {
    Table,
    Id,
    Name,
    PartnerCode,
    UnitPrice,
    KpiSupplyPrice,
    KpiCostPrice,
    KpiCommissionRate,
    KpiUnitCount,
    KpiCountEnabled,
    KpiSalesEnabled,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BaseProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BaseProducts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BaseProducts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(BaseProducts::PartnerCode).string_len(64).null())
                    .col(
                        ColumnDef::new(BaseProducts::UnitPrice)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(BaseProducts::KpiSupplyPrice).big_integer().null())
                    .col(ColumnDef::new(BaseProducts::KpiCostPrice).big_integer().null())
                    .col(ColumnDef::new(BaseProducts::KpiCommissionRate).double().null())
                    .col(
                        ColumnDef::new(BaseProducts::KpiUnitCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(BaseProducts::KpiCountEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BaseProducts::KpiSalesEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BaseProducts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BaseProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(BaseProducts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_base_products_partner")
                    .table(BaseProducts::Table)
                    .col(BaseProducts::PartnerCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(BaseProducts::Table).to_owned())
            .await?;
        Ok(())
    }
}
