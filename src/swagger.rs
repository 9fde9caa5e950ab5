use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    CampaignStatus, CampaignType, ChatSenderType, ChatSessionStatus, DiscountType,
    MallOrderStatus, OrderStatus, ReviewAlertStatus, ReviewSentiment, TicketPriority, TicketStatus,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::auth::change_password,
        handlers::auth::logout,
        handlers::user::list_users,
        handlers::user::create_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::user::list_roles,
        handlers::user::create_role,
        handlers::user::update_role,
        handlers::user::delete_role,
        handlers::user::list_permissions,
        handlers::dashboard::kpis,
        handlers::order::list_orders,
        handlers::order::order_stats,
        handlers::order::get_order,
        handlers::order::create_order,
        handlers::order::update_order,
        handlers::order::update_order_status,
        handlers::order::update_tracking,
        handlers::order::clear_tracking,
        handlers::order::duplicate_orders,
        handlers::order::bulk_delete_orders,
        handlers::order::delete_order,
        handlers::order::import_orders,
        handlers::order::export_orders,
        handlers::order::order_template,
        handlers::customer::list_customers,
        handlers::customer::get_customer,
        handlers::customer::create_customer,
        handlers::customer::update_customer,
        handlers::customer::import_customers,
        handlers::ticket::list_tickets,
        handlers::ticket::ticket_stats,
        handlers::ticket::get_ticket,
        handlers::ticket::create_ticket,
        handlers::ticket::update_ticket_status,
        handlers::ticket::assign_ticket,
        handlers::ticket::add_ticket_comment,
        handlers::review::list_reviews,
        handlers::review::review_stats,
        handlers::review::get_review,
        handlers::review::create_review,
        handlers::review::update_review,
        handlers::review::update_review_alert,
        handlers::review::delete_review,
        handlers::chat::start_session,
        handlers::chat::add_message,
        handlers::chat::escalate,
        handlers::chat::end_session,
        handlers::chat::list_sessions,
        handlers::chat::escalated_sessions,
        handlers::chat::session_detail,
        handlers::chat::assign_session,
        handlers::chat::start_consultation,
        handlers::chat::complete_session,
        handlers::chat::agent_message,
        handlers::chat::list_agents,
        handlers::chat::set_online,
        handlers::chat::queue_stats,
        handlers::chatbot::get_config,
        handlers::chatbot::update_config,
        handlers::chatbot::publish_config,
        handlers::chatbot::toggle_config,
        handlers::chatbot::reset_config,
        handlers::chatbot::list_templates,
        handlers::chatbot::create_template,
        handlers::chatbot::chatbot_stats,
        handlers::campaign::list_campaigns,
        handlers::campaign::campaign_summary,
        handlers::campaign::get_campaign,
        handlers::campaign::create_campaign,
        handlers::campaign::update_campaign,
        handlers::campaign::update_campaign_status,
        handlers::campaign::record_metrics,
        handlers::campaign::delete_campaign,
        handlers::coupon::list_coupons,
        handlers::coupon::create_coupon,
        handlers::coupon::toggle_coupon,
        handlers::coupon::delete_coupon,
        handlers::coupon::validate_coupon,
        handlers::coupon::redeem_coupon,
        handlers::coupon::issue_coupon,
        handlers::mall::signup,
        handlers::mall::login,
        handlers::mall::get_profile,
        handlers::mall::update_profile,
        handlers::mall::my_stats,
        handlers::mall::my_coupons,
        handlers::mall::checkout,
        handlers::mall::my_orders,
        handlers::mall::my_order,
        handlers::mall::cancel_order,
        handlers::product::list_mall_products,
        handlers::product::get_mall_product,
        handlers::mall::public_qna,
        handlers::mall::create_qna,
        handlers::mall::admin_orders,
        handlers::mall::admin_update_order,
        handlers::mall::admin_users,
        handlers::mall::admin_qna,
        handlers::mall::answer_qna,
        handlers::product::admin_list_products,
        handlers::product::admin_get_product,
        handlers::product::admin_create_product,
        handlers::product::admin_update_product,
        handlers::product::admin_delete_product,
        handlers::performance::list_products,
        handlers::performance::create_product,
        handlers::performance::update_product,
        handlers::performance::delete_product,
        handlers::performance::integrated_dashboard,
        handlers::performance::get_margin_formula,
        handlers::performance::update_margin_formula,
        handlers::performance::margin_details,
        handlers::performance::sales_statistics,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshTokenRequest,
            ChangePasswordRequest,
            AuthResponse,
            AccessTokenResponse,
            StaffUserResponse,
            CreateStaffUserRequest,
            UpdateStaffUserRequest,
            Permission,
            PermissionInfo,
            RoleResponse,
            CreateRoleRequest,
            UpdateRoleRequest,
            OrderStatus,
            OrderResponse,
            OrderFilter,
            OrderListQuery,
            CreateOrderRequest,
            UpdateOrderRequest,
            UpdateOrderStatusRequest,
            UpdateTrackingRequest,
            ClearTrackingRequest,
            ClearTrackingResponse,
            DuplicateOrderGroup,
            DuplicateOrdersResponse,
            BulkDeleteOrdersRequest,
            BulkDeleteOrdersResponse,
            DeliveryBuckets,
            OrderStatsResponse,
            CustomerResponse,
            CustomerListQuery,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            ImportFailure,
            ImportResult,
            TicketStatus,
            TicketPriority,
            TicketResponse,
            TicketCommentResponse,
            TicketDetailResponse,
            TicketListQuery,
            TicketStatsResponse,
            CreateTicketRequest,
            UpdateTicketStatusRequest,
            AssignTicketRequest,
            AddTicketCommentRequest,
            ReviewSentiment,
            ReviewAlertStatus,
            ReviewResponse,
            ReviewListQuery,
            CreateReviewRequest,
            UpdateReviewRequest,
            UpdateReviewAlertRequest,
            ReviewStatsResponse,
            ChatSenderType,
            ChatSessionStatus,
            StartChatRequest,
            StartChatResponse,
            ChatMessageResponse,
            AddChatMessageRequest,
            AddChatMessageResponse,
            EscalateChatRequest,
            EscalateChatResponse,
            TranscriptEntry,
            EndChatRequest,
            ChatSessionSummary,
            ChatSessionDetail,
            ChatAgentResponse,
            AssignChatRequest,
            CompleteChatRequest,
            AgentMessageRequest,
            SetOnlineRequest,
            QueueStatsResponse,
            ChatbotConfigResponse,
            UpdateChatbotConfigRequest,
            ToggleChatbotResponse,
            PromptTemplateResponse,
            CreatePromptTemplateRequest,
            ChatbotStatsResponse,
            CampaignType,
            CampaignStatus,
            CampaignResponse,
            CampaignListQuery,
            CreateCampaignRequest,
            UpdateCampaignRequest,
            UpdateCampaignStatusRequest,
            CampaignMetricsRequest,
            CampaignSummaryResponse,
            DiscountType,
            CouponResponse,
            CouponStatusFilter,
            CouponListQuery,
            CreateCouponRequest,
            ValidateCouponRequest,
            CouponBrief,
            CouponValidationResponse,
            RedeemCouponRequest,
            RedeemCouponResponse,
            IssueCouponRequest,
            IssueCouponResponse,
            UserCouponFilter,
            UserCouponQuery,
            UserCouponResponse,
            RevenueKpi,
            OrderKpi,
            CustomerKpi,
            TicketKpi,
            DashboardKpiResponse,
            MallOrderStatus,
            MallSignupRequest,
            MallLoginRequest,
            MallUserResponse,
            MallAuthResponse,
            UpdateMallProfileRequest,
            CheckoutItem,
            ShippingAddress,
            CheckoutRequest,
            MallOrderResponse,
            MallStatsResponse,
            MallOrderListQuery,
            UpdateMallOrderRequest,
            MallUserListQuery,
            CreateQnaRequest,
            QnaListQuery,
            AnswerQnaRequest,
            QnaResponse,
            MallProductResponse,
            ProductSort,
            ProductListQuery,
            AdminProductListQuery,
            CreateMallProductRequest,
            UpdateMallProductRequest,
            BaseProductResponse,
            CreateBaseProductRequest,
            UpdateBaseProductRequest,
            DateRangeQuery,
            PartnerKpi,
            KpiTotals,
            PeriodKpi,
            IntegratedDashboardResponse,
            MarginBase,
            DeductionType,
            DeductionValueType,
            DeductionOperator,
            MarginDeduction,
            MarginFormula,
            MarginFormulaConfig,
            UpdateMarginFormulaRequest,
            CustomDeductionLine,
            MarginLine,
            MarginSubtotal,
            PartnerMarginDetail,
            MarginDetailsResponse,
            DailySales,
            SalesStatisticsResponse,
            ApiError,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Staff authentication API"),
        (name = "user", description = "Staff, role and permission management API"),
        (name = "dashboard", description = "Dashboard KPI API"),
        (name = "order", description = "Order management API"),
        (name = "customer", description = "Customer management API"),
        (name = "ticket", description = "Support ticket API"),
        (name = "review", description = "Marketplace review and complaint alert API"),
        (name = "chat", description = "Live chat widget and agent console API"),
        (name = "chatbot", description = "Chatbot configuration API"),
        (name = "marketing", description = "Campaign and coupon API"),
        (name = "mall", description = "Shopping mall storefront API"),
        (name = "mall-admin", description = "Shopping mall back-office API"),
        (name = "performance", description = "Partner performance analytics API"),
    ),
    info(
        title = "CRM Backend API",
        version = "1.0.0",
        description = "Multi-tenant e-commerce back-office REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
