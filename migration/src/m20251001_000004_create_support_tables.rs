use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    Subject,
    Description,
    Status,
    Priority,
    CustomerId,
    AssignedToId,
    ClosedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TicketComments {
    Table,
    Id,
    TicketId,
    AuthorId,
    Content,
    IsInternal,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatSessions {
    Table,
    Id,
    Phone,
    CustomerName,
    CustomerId,
    Status,
    IsEscalated,
    EscalatedAt,
    EscalateReason,
    Priority,
    AssignedToId,
    AssignedAt,
    Summary,
    EndedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    Id,
    SessionId,
    SenderType,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatbotConfigs {
    Table,
    Id,
    Name,
    IsActive,
    WelcomeMessage,
    SystemPrompt,
    BrandVoice,
    ResponseStyle,
    MaxTokens,
    Temperature,
    RequirePhoneAuth,
    AutoGreeting,
    ShowSuggestions,
    MaxConversationLength,
    EnableEscalation,
    EscalationKeywords,
    AutoEscalateOnFail,
    MaxFailBeforeEscalate,
    BusinessHoursOnly,
    BusinessHoursStart,
    BusinessHoursEnd,
    BusinessDays,
    OutOfHoursMessage,
    DefaultLanguage,
    SupportedLanguages,
    Timezone,
    ThemeColor,
    ChatPosition,
    AvatarUrl,
    DataRetentionDays,
    BlockedKeywords,
    SensitiveDataFilter,
    WebhookUrl,
    NotificationEmail,
    Version,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChatbotPromptTemplates {
    Table,
    Id,
    Name,
    Category,
    Content,
    Variables,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 工单
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::Subject).string_len(255).not_null())
                    .col(ColumnDef::new(Tickets::Description).text().null())
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .custom(Alias::new("ticket_status"))
                            .not_null()
                            .default(Expr::cust("'OPEN'::ticket_status")),
                    )
                    .col(
                        ColumnDef::new(Tickets::Priority)
                            .custom(Alias::new("ticket_priority"))
                            .not_null()
                            .default(Expr::cust("'MEDIUM'::ticket_priority")),
                    )
                    .col(ColumnDef::new(Tickets::CustomerId).big_integer().null())
                    .col(ColumnDef::new(Tickets::AssignedToId).big_integer().null())
                    .col(
                        ColumnDef::new(Tickets::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_customer")
                            .from(Tickets::Table, Tickets::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_assignee")
                            .from(Tickets::Table, Tickets::AssignedToId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketComments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketComments::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(TicketComments::AuthorId).big_integer().null())
                    .col(ColumnDef::new(TicketComments::Content).text().not_null())
                    .col(
                        ColumnDef::new(TicketComments::IsInternal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TicketComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_comments_ticket")
                            .from(TicketComments::Table, TicketComments::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 聊天会话与消息
        manager
            .create_table(
                Table::create()
                    .table(ChatSessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChatSessions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ChatSessions::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(ChatSessions::CustomerName).string_len(100).null())
                    .col(ColumnDef::new(ChatSessions::CustomerId).big_integer().null())
                    .col(
                        ColumnDef::new(ChatSessions::Status)
                            .custom(Alias::new("chat_session_status"))
                            .not_null()
                            .default(Expr::cust("'ACTIVE'::chat_session_status")),
                    )
                    .col(
                        ColumnDef::new(ChatSessions::IsEscalated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatSessions::EscalatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ChatSessions::EscalateReason).text().null())
                    .col(
                        ColumnDef::new(ChatSessions::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ChatSessions::AssignedToId).big_integer().null())
                    .col(
                        ColumnDef::new(ChatSessions::AssignedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ChatSessions::Summary).text().null())
                    .col(
                        ColumnDef::new(ChatSessions::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ChatSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(ChatSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_sessions_assignee")
                            .from(ChatSessions::Table, ChatSessions::AssignedToId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_chat_sessions_phone")
                    .table(ChatSessions::Table)
                    .col(ChatSessions::Phone)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMessages::SessionId).uuid().not_null())
                    .col(
                        ColumnDef::new(ChatMessages::SenderType)
                            .custom(Alias::new("chat_sender_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatMessages::Content).text().not_null())
                    .col(
                        ColumnDef::new(ChatMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_messages_session")
                            .from(ChatMessages::Table, ChatMessages::SessionId)
                            .to(ChatSessions::Table, ChatSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_chat_messages_session")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::SessionId)
                    .to_owned(),
            )
            .await?;

        // 聊天机器人配置，取值由服务层默认值填充
        manager
            .create_table(
                Table::create()
                    .table(ChatbotConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatbotConfigs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatbotConfigs::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ChatbotConfigs::IsActive).boolean().not_null())
                    .col(ColumnDef::new(ChatbotConfigs::WelcomeMessage).text().not_null())
                    .col(ColumnDef::new(ChatbotConfigs::SystemPrompt).text().not_null())
                    .col(ColumnDef::new(ChatbotConfigs::BrandVoice).text().not_null())
                    .col(
                        ColumnDef::new(ChatbotConfigs::ResponseStyle)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatbotConfigs::MaxTokens).integer().not_null())
                    .col(ColumnDef::new(ChatbotConfigs::Temperature).double().not_null())
                    .col(
                        ColumnDef::new(ChatbotConfigs::RequirePhoneAuth)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatbotConfigs::AutoGreeting).boolean().not_null())
                    .col(
                        ColumnDef::new(ChatbotConfigs::ShowSuggestions)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::MaxConversationLength)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::EnableEscalation)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::EscalationKeywords)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::AutoEscalateOnFail)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::MaxFailBeforeEscalate)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::BusinessHoursOnly)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::BusinessHoursStart)
                            .string_len(5)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::BusinessHoursEnd)
                            .string_len(5)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::BusinessDays)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::OutOfHoursMessage)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::DefaultLanguage)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::SupportedLanguages)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatbotConfigs::Timezone).string_len(64).not_null())
                    .col(ColumnDef::new(ChatbotConfigs::ThemeColor).string_len(16).not_null())
                    .col(
                        ColumnDef::new(ChatbotConfigs::ChatPosition)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatbotConfigs::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(ChatbotConfigs::DataRetentionDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::BlockedKeywords)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::SensitiveDataFilter)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatbotConfigs::WebhookUrl).text().null())
                    .col(
                        ColumnDef::new(ChatbotConfigs::NotificationEmail)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(ChatbotConfigs::UpdatedAt)
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
                    .table(ChatbotPromptTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatbotPromptTemplates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChatbotPromptTemplates::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatbotPromptTemplates::Category)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatbotPromptTemplates::Content).text().not_null())
                    .col(ColumnDef::new(ChatbotPromptTemplates::Variables).json_binary().null())
                    .col(
                        ColumnDef::new(ChatbotPromptTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChatbotPromptTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：子表 -> 主表
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ChatbotPromptTemplates::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ChatbotConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ChatMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ChatSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(TicketComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Tickets::Table).to_owned())
            .await?;
        Ok(())
    }
}
