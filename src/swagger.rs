use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::ping::ping_handler,
        crate::handlers::default::default_route_handler,
        crate::handlers::otp::send::send_otp_handler,
        crate::handlers::otp::send::resend_otp_handler,
        crate::handlers::otp::verify::verify_otp_handler,
        crate::handlers::otp::check::check_otp_handler,
        crate::handlers::auth::register::register_handler,
        crate::handlers::auth::login::login_handler,
        crate::handlers::auth::login::purok_leader_login_handler,
        crate::handlers::auth::refresh::refresh_token_handler,
        crate::handlers::auth::reset_password::reset_password_handler,
        crate::handlers::punishment::available::available_punishments_handler,
        crate::handlers::punishment::suspend::suspend_user_handler,
        crate::handlers::punishment::history::punishment_history_handler,
        crate::handlers::punishment::revoke::revoke_suspension_handler,
    ),
    components(
        schemas(
            crate::models::SendOtpReq,
            crate::models::VerifyOtpReq,
            crate::models::CheckOtpReq,
            crate::models::ResetPasswordReq,
            crate::models::RegisterReq,
            crate::models::LoginReq,
            crate::models::RefreshTokenReq,
            crate::models::SuspendUserReq,

            crate::models::GenericResponse,
            crate::models::ErrorResponse,
            crate::models::OtpSentResponse,
            crate::models::OtpVerifiedResponse,
            crate::models::OtpCheckResponse,
            crate::models::AuthResponse,
            crate::models::AvailablePunishmentsResponse,
            crate::models::PunishmentResponse,
            crate::models::PunishmentHistoryResponse,

            crate::models::OtpSentData,
            crate::models::OtpVerifiedData,
            crate::models::OtpCheckData,
            crate::models::AuthData,
            crate::models::AvailablePunishmentsData,
            crate::models::UserProfile,
            crate::models::PunishmentRecord,

            crate::models::OtpPurpose,
            crate::models::Role,
            crate::models::PunishmentType,
            crate::models::PunishmentStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Debugging API", description = "API for debugging purposes"),
        (name = "OTP API", description = "API for one time codes sent by mail"),
        (name = "Auth API", description = "API for registration, login and passwords"),
        (name = "Punishment API", description = "API for warnings and suspensions, operators and admins only")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "authorization",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("authorization"))),
            )
        }
    }
}
