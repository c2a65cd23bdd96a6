use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::complaints::{
    dtos as complaints_dtos, handlers as complaints_handlers, models as complaints_models,
};
use crate::features::feedback::{dtos as feedback_dtos, handlers as feedback_handlers};
use crate::features::staff::{
    dtos as staff_dtos, handlers as staff_handlers, models as staff_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        // Complaints
        complaints_handlers::file_complaint,
        complaints_handlers::list_complaints,
        complaints_handlers::list_user_complaints,
        complaints_handlers::get_complaint,
        complaints_handlers::update_complaint,
        complaints_handlers::list_notifications,
        // Staff
        staff_handlers::list_staff,
        staff_handlers::create_staff,
        staff_handlers::get_staff,
        staff_handlers::update_staff,
        staff_handlers::delete_staff,
        // Feedback
        feedback_handlers::create_feedback,
        feedback_handlers::submit_feedback,
        feedback_handlers::list_feedback,
        // Admin
        admin_handlers::get_profile,
        admin_handlers::get_summary,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            auth::dtos::AuthUserDto,
            ApiResponse<auth::dtos::LoginResponseDto>,
            // Complaints
            complaints_models::ComplaintStatus,
            complaints_models::ComplaintSeverity,
            complaints_models::Complaint,
            complaints_dtos::FileComplaintDto,
            complaints_dtos::UpdateComplaintDto,
            complaints_dtos::FiledComplaintDto,
            complaints_dtos::ComplaintResponseDto,
            complaints_dtos::NotificationResponseDto,
            ApiResponse<complaints_dtos::FiledComplaintDto>,
            ApiResponse<complaints_dtos::ComplaintResponseDto>,
            ApiResponse<Vec<complaints_dtos::ComplaintResponseDto>>,
            ApiResponse<Vec<complaints_dtos::NotificationResponseDto>>,
            // Staff
            staff_models::StaffStatus,
            staff_dtos::StaffFormDto,
            staff_dtos::StaffResponseDto,
            ApiResponse<staff_dtos::StaffResponseDto>,
            ApiResponse<Vec<staff_dtos::StaffResponseDto>>,
            // Feedback
            feedback_dtos::CreateFeedbackDto,
            feedback_dtos::SubmitFeedbackDto,
            feedback_dtos::FeedbackResponseDto,
            feedback_dtos::SubmittedFeedbackDto,
            ApiResponse<feedback_dtos::FeedbackResponseDto>,
            ApiResponse<feedback_dtos::SubmittedFeedbackDto>,
            ApiResponse<Vec<feedback_dtos::FeedbackResponseDto>>,
            // Admin
            admin_dtos::AdminProfileDto,
            admin_dtos::StatusCountsDto,
            admin_dtos::SeverityCountsDto,
            admin_dtos::AdminSummaryDto,
            ApiResponse<admin_dtos::AdminProfileDto>,
            ApiResponse<admin_dtos::AdminSummaryDto>,
        )
    ),
    tags(
        (name = "auth", description = "Admin login"),
        (name = "complaints", description = "Filing, tracking and updating complaints"),
        (name = "staff", description = "Staff directory (staff only)"),
        (name = "feedback", description = "Passenger feedback on complaints"),
        (name = "admin", description = "Admin profile and dashboard counts (staff only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Rail Madad API",
        version = "0.1.0",
        description = "Complaint management backend for Rail Madad",
    )
)]
pub struct ApiDoc;

/// Adds the `Authorization: Token <key>` scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Send the login token as `Token <key>`",
                ))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
