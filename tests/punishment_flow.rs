use axum::http::StatusCode;

use crate::helper::{build_get_request, build_post_request, call, get_app, insert_user, login};
use purok_incident_backend::models::{
    AvailablePunishmentsResponse, GenericResponse, PunishmentHistoryResponse, PunishmentResponse,
    PunishmentStatus, PunishmentType, Role,
};

mod helper;

const PASSWORD: &str = "password123";

#[tokio::test]
async fn test_escalation_over_http() {
    let (app, store) = get_app();
    let operator = insert_user(&store, "operator@example.com", PASSWORD, Role::Operator).await;
    let citizen = insert_user(&store, "citizen@example.com", PASSWORD, Role::Citizen).await;
    let op_token = login(&app, "/login", "operator@example.com", PASSWORD).await.data.token;
    let citizen_session = login(&app, "/login", "citizen@example.com", PASSWORD).await;
    let available_path = format!("/user/{}/available-punishments", citizen.id);
    let suspend_path = format!("/user/{}/suspend", citizen.id);
    {
        let req = build_get_request(&available_path, Some(&op_token));
        let (status, res): (_, AvailablePunishmentsResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            res.data.available,
            vec![
                PunishmentType::Warning1,
                PunishmentType::Warning2,
                PunishmentType::Suspension
            ]
        );
        assert!(res.data.active_suspension.is_none());
    }
    {
        let body = r#"{"punishment_type": "warning_1", "reason": "false reports"}"#;
        let req = build_post_request(&suspend_path, body, Some(&op_token));
        let (status, res): (_, PunishmentResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res.data.user_id, citizen.id);
        assert_eq!(res.data.issued_by, operator.id);
        assert_eq!(res.data.status, PunishmentStatus::Active);
        assert_eq!(res.data.expires_at, Some(res.data.suspended_at + 3 * 24 * 3600));
    }
    {
        let body = r#"{"punishment_type": "warning_2"}"#;
        let req = build_post_request(&suspend_path, body, Some(&op_token));
        let (status, res): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.message, "User already has an active punishment");
    }
    {
        let req = build_get_request(&available_path, Some(&op_token));
        let (_, res): (_, AvailablePunishmentsResponse) = call(&app, req).await;
        assert!(res.data.available.is_empty());
        let active = res.data.active_suspension.unwrap();
        assert_eq!(active.punishment_type, PunishmentType::Warning1);
    }
    {
        // punished user is logged out and cannot log in again
        let req = build_get_request(&available_path, Some(&citizen_session.data.token));
        let (status, _): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body = format!(r#"{{"email": "citizen@example.com", "password": "{PASSWORD}"}}"#);
        let (status, res): (_, GenericResponse) =
            call(&app, build_post_request("/login", &body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.message.starts_with("Your account is suspended until"));
    }
    {
        let path = format!("/user/{}/revoke-suspension", citizen.id);
        let req = build_post_request(&path, "", Some(&op_token));
        let (status, res): (_, PunishmentResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res.data.status, PunishmentStatus::Revoked);
        assert_eq!(res.data.revoked_by, Some(operator.id));
    }
    {
        // history is permanent, warning_1 is never offered again
        let req = build_get_request(&available_path, Some(&op_token));
        let (_, res): (_, AvailablePunishmentsResponse) = call(&app, req).await;
        assert_eq!(
            res.data.available,
            vec![PunishmentType::Warning2, PunishmentType::Suspension]
        );
        let body = r#"{"punishment_type": "warning_1"}"#;
        let req = build_post_request(&suspend_path, body, Some(&op_token));
        let (status, _): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    {
        let body = r#"{"punishment_type": "suspension"}"#;
        let req = build_post_request(&suspend_path, body, Some(&op_token));
        let (status, res): (_, PunishmentResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res.data.expires_at, None);
        let path = format!("/user/{}/suspensions", citizen.id);
        let req = build_get_request(&path, Some(&op_token));
        let (status, res): (_, PunishmentHistoryResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        let types: Vec<_> = res.data.iter().map(|r| r.punishment_type).collect();
        assert_eq!(types, vec![PunishmentType::Suspension, PunishmentType::Warning1]);
        let body = format!(r#"{{"email": "citizen@example.com", "password": "{PASSWORD}"}}"#);
        let (status, res): (_, GenericResponse) =
            call(&app, build_post_request("/login", &body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.message, "Your account has been permanently suspended.");
    }
}

#[tokio::test]
async fn test_punishment_routes_need_moderator() {
    let (app, store) = get_app();
    let citizen = insert_user(&store, "citizen@example.com", PASSWORD, Role::Citizen).await;
    let leader = insert_user(&store, "leader@example.com", PASSWORD, Role::PurokLeader).await;
    let admin = insert_user(&store, "admin@example.com", PASSWORD, Role::Admin).await;
    let path = format!("/user/{}/available-punishments", leader.id);
    {
        let (status, _): (_, GenericResponse) = call(&app, build_get_request(&path, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    {
        let token = login(&app, "/login", "citizen@example.com", PASSWORD).await.data.token;
        let req = build_get_request(&path, Some(&token));
        let (status, _): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let admin_token = login(&app, "/login", "admin@example.com", PASSWORD).await.data.token;
    {
        let req = build_get_request(&path, Some(&admin_token));
        let (status, _): (_, AvailablePunishmentsResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
    }
    {
        let req = build_get_request("/user/999/available-punishments", Some(&admin_token));
        let (status, _): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    {
        let path = format!("/user/{}/suspend", admin.id);
        let body = r#"{"punishment_type": "warning_1"}"#;
        let req = build_post_request(&path, body, Some(&admin_token));
        let (status, res): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.message, "You cannot punish yourself.");
    }
    {
        let operator = insert_user(&store, "operator@example.com", PASSWORD, Role::Operator).await;
        let path = format!("/user/{}/suspend", operator.id);
        let body = r#"{"punishment_type": "warning_1"}"#;
        let req = build_post_request(&path, body, Some(&admin_token));
        let (status, res): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.message, "Operators and administrators cannot be punished.");
    }
    {
        let path = format!("/user/{}/suspend", citizen.id);
        let body = r#"{"punishment_type": "warning_9"}"#;
        let req = build_post_request(&path, body, Some(&admin_token));
        let (status, _): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
    {
        let path = format!("/user/{}/revoke-suspension", citizen.id);
        let req = build_post_request(&path, "", Some(&admin_token));
        let (status, res): (_, GenericResponse) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.message, "User has no active punishment");
    }
}
