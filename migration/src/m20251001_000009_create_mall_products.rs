use sea_orm_migration::prelude::*;

/// 商城商品目录
#[derive(DeriveIden)]
enum MallProducts {
    Table,
    Id,
    Name,
    Description,
    Price,
    OriginalPrice,
    Stock,
    Category,
    Tags,
    Images,
    Options,
    IsActive,
    IsFeatured,
    Rating,
    SoldCount,
    ViewCount,
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
                    .table(MallProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MallProducts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MallProducts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(MallProducts::Description).text().null())
                    .col(ColumnDef::new(MallProducts::Price).big_integer().not_null())
                    .col(ColumnDef::new(MallProducts::OriginalPrice).big_integer().null())
                    .col(
                        ColumnDef::new(MallProducts::Stock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MallProducts::Category).string_len(64).null())
                    .col(ColumnDef::new(MallProducts::Tags).string_len(255).null())
                    .col(ColumnDef::new(MallProducts::Images).json_binary().null())
                    .col(ColumnDef::new(MallProducts::Options).json_binary().null())
                    .col(
                        ColumnDef::new(MallProducts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(MallProducts::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(MallProducts::Rating).double().null())
                    .col(
                        ColumnDef::new(MallProducts::SoldCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MallProducts::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MallProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(MallProducts::UpdatedAt)
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
                    .name("idx_mall_products_category")
                    .table(MallProducts::Table)
                    .col(MallProducts::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(MallProducts::Table).to_owned())
            .await?;
        Ok(())
    }
}
