use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum MallUsers {
    Table,
    Id,
    Name,
    Email,
    Phone,
    PasswordHash,
    TotalSpent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MallUserCoupons {
    Table,
    Id,
    UserId,
    CouponId,
    IsUsed,
    UsedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MallOrders {
    Table,
    Id,
    OrderNumber,
    UserId,
    CustomerName,
    CustomerEmail,
    RecipientName,
    RecipientPhone,
    RecipientZip,
    RecipientAddr,
    DeliveryMsg,
    Status,
    Items,
    Subtotal,
    ShippingFee,
    DiscountAmount,
    TotalAmount,
    UserCouponId,
    Courier,
    TrackingNumber,
    PaidAt,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MallQna {
    Table,
    Id,
    UserId,
    ProductId,
    Title,
    Content,
    Category,
    Answer,
    AnsweredBy,
    AnsweredAt,
    IsAnswered,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MallUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MallUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MallUsers::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(MallUsers::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MallUsers::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(MallUsers::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(MallUsers::TotalSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MallUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(MallUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MallUserCoupons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MallUserCoupons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MallUserCoupons::UserId).big_integer().not_null())
                    .col(ColumnDef::new(MallUserCoupons::CouponId).big_integer().not_null())
                    .col(
                        ColumnDef::new(MallUserCoupons::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MallUserCoupons::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MallUserCoupons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mall_user_coupons_user")
                            .from(MallUserCoupons::Table, MallUserCoupons::UserId)
                            .to(MallUsers::Table, MallUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mall_user_coupons_coupon")
                            .from(MallUserCoupons::Table, MallUserCoupons::CouponId)
                            .to(Coupons::Table, Coupons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一会员同一券只发放一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mall_user_coupons_user_coupon_unique")
                    .table(MallUserCoupons::Table)
                    .col(MallUserCoupons::UserId)
                    .col(MallUserCoupons::CouponId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MallOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MallOrders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MallOrders::OrderNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MallOrders::UserId).big_integer().not_null())
                    .col(ColumnDef::new(MallOrders::CustomerName).string_len(100).not_null())
                    .col(ColumnDef::new(MallOrders::CustomerEmail).string_len(255).not_null())
                    .col(ColumnDef::new(MallOrders::RecipientName).string_len(100).not_null())
                    .col(ColumnDef::new(MallOrders::RecipientPhone).string_len(32).null())
                    .col(ColumnDef::new(MallOrders::RecipientZip).string_len(16).not_null())
                    .col(ColumnDef::new(MallOrders::RecipientAddr).text().not_null())
                    .col(ColumnDef::new(MallOrders::DeliveryMsg).text().null())
                    .col(
                        ColumnDef::new(MallOrders::Status)
                            .custom(Alias::new("mall_order_status"))
                            .not_null()
                            .default(Expr::cust("'PENDING'::mall_order_status")),
                    )
                    .col(ColumnDef::new(MallOrders::Items).json_binary().not_null())
                    .col(ColumnDef::new(MallOrders::Subtotal).big_integer().not_null())
                    .col(ColumnDef::new(MallOrders::ShippingFee).big_integer().not_null())
                    .col(
                        ColumnDef::new(MallOrders::DiscountAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MallOrders::TotalAmount).big_integer().not_null())
                    .col(ColumnDef::new(MallOrders::UserCouponId).big_integer().null())
                    .col(ColumnDef::new(MallOrders::Courier).string_len(64).null())
                    .col(ColumnDef::new(MallOrders::TrackingNumber).string_len(64).null())
                    .col(
                        ColumnDef::new(MallOrders::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MallOrders::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MallOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(MallOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mall_orders_user")
                            .from(MallOrders::Table, MallOrders::UserId)
                            .to(MallUsers::Table, MallUsers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mall_orders_user")
                    .table(MallOrders::Table)
                    .col(MallOrders::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MallQna::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MallQna::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MallQna::UserId).big_integer().not_null())
                    .col(ColumnDef::new(MallQna::ProductId).big_integer().null())
                    .col(ColumnDef::new(MallQna::Title).string_len(255).not_null())
                    .col(ColumnDef::new(MallQna::Content).text().not_null())
                    .col(
                        ColumnDef::new(MallQna::Category)
                            .string_len(32)
                            .not_null()
                            .default("GENERAL"),
                    )
                    .col(ColumnDef::new(MallQna::Answer).text().null())
                    .col(ColumnDef::new(MallQna::AnsweredBy).big_integer().null())
                    .col(
                        ColumnDef::new(MallQna::AnsweredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MallQna::IsAnswered)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MallQna::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(MallQna::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mall_qna_user")
                            .from(MallQna::Table, MallQna::UserId)
                            .to(MallUsers::Table, MallUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(MallQna::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(MallOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(MallUserCoupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(MallUsers::Table).to_owned())
            .await?;
        Ok(())
    }
}
