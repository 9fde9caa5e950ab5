use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (类型名, 取值) - 与 entities 中 DeriveActiveEnum 的 string_value 一一对应
const ENUM_TYPES: &[(&str, &[&str])] = &[
    (
        "order_status",
        &["PENDING", "CONFIRMED", "SHIPPED", "DELIVERED", "CANCELLED"],
    ),
    ("ticket_status", &["OPEN", "IN_PROGRESS", "RESOLVED", "CLOSED"]),
    ("ticket_priority", &["LOW", "MEDIUM", "HIGH", "URGENT"]),
    (
        "chat_session_status",
        &["ACTIVE", "ESCALATED", "ASSIGNED", "CLOSED"],
    ),
    ("chat_sender_type", &["USER", "BOT", "AGENT", "SYSTEM"]),
    ("campaign_type", &["COUPON", "EMAIL", "SMS", "PUSH"]),
    ("campaign_status", &["DRAFT", "ACTIVE", "PAUSED", "COMPLETED"]),
    ("discount_type", &["PERCENT", "FIXED"]),
    (
        "mall_order_status",
        &[
            "PENDING",
            "PAID",
            "PREPARING",
            "SHIPPED",
            "DELIVERED",
            "CANCELLED",
        ],
    ),
];

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
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in ENUM_TYPES.iter().rev() {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(*name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
