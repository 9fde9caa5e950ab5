use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

/// 各渠道收集的商品评价，低分评价会被标记为投诉
#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Source,
    Author,
    Content,
    Rating,
    ReviewDate,
    Sentiment,
    Topics,
    ExternalId,
    OptionText,
    Images,
    ProductUrl,
    IsAlerted,
    AlertStatus,
    AlertNote,
    ResolvedType,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}

const ENUM_TYPES: &[(&str, &[&str])] = &[
    ("review_sentiment", &["POSITIVE", "NEUTRAL", "NEGATIVE"]),
    ("review_alert_status", &["NEW", "IN_PROGRESS", "RESOLVED"]),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, values) in ENUM_TYPES {
            manager
                .create_type(
                    Type::create()
                        .as_enum(Alias::new(*name))
                        .values(values.iter().map(|v| Alias::new(*v)))
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::Source).string_len(64).not_null())
                    .col(ColumnDef::new(Reviews::Author).string_len(100).not_null())
                    .col(ColumnDef::new(Reviews::Content).text().not_null())
                    .col(ColumnDef::new(Reviews::Rating).small_integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::ReviewDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::Sentiment)
                            .custom(Alias::new("review_sentiment"))
                            .null(),
                    )
                    .col(ColumnDef::new(Reviews::Topics).text().null())
                    .col(ColumnDef::new(Reviews::ExternalId).string_len(128).null())
                    .col(ColumnDef::new(Reviews::OptionText).string_len(255).null())
                    .col(ColumnDef::new(Reviews::Images).json_binary().null())
                    .col(ColumnDef::new(Reviews::ProductUrl).string_len(512).null())
                    .col(
                        ColumnDef::new(Reviews::IsAlerted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Reviews::AlertStatus)
                            .custom(Alias::new("review_alert_status"))
                            .null(),
                    )
                    .col(ColumnDef::new(Reviews::AlertNote).text().null())
                    .col(ColumnDef::new(Reviews::ResolvedType).string_len(64).null())
                    .col(
                        ColumnDef::new(Reviews::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一渠道的外部评价只导入一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reviews_source_external_unique")
                    .table(Reviews::Table)
                    .col(Reviews::Source)
                    .col(Reviews::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reviews_alert")
                    .table(Reviews::Table)
                    .col(Reviews::IsAlerted)
                    .col(Reviews::AlertStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Reviews::Table).to_owned())
            .await?;
        for (name, _) in ENUM_TYPES.iter().rev() {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(*name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
