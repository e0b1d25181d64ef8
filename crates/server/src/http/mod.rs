use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

mod auth;

pub use auth::SessionToken;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::users::router(&state))
        .merge(routes::teams::router(&state))
        .merge(routes::projects::router(&state))
        .merge(routes::tasks::router(&state))
        .merge(routes::todos::router(&state))
        .merge(routes::dashboard::router())
        .merge(routes::auth::session_router())
        .layer(from_fn_with_state(state.clone(), auth::require_session));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/auth", routes::auth::public_router())
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use db::{
        DbService,
        models::user::{CreateUser, User},
        types::UserRole,
    };
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::AppState;

    async fn setup_state() -> AppState {
        let db = DbService::connect("sqlite::memory:").await.unwrap();
        AppState::new(db)
    }

    async fn seed_admin(state: &AppState) -> (User, String) {
        let user = User::create(
            &state.db().pool,
            &CreateUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: UserRole::Admin,
                credential: "s3cret".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let (_, token) = services::services::auth::login(
            &state.db().pool,
            "ada@example.com",
            "s3cret",
            chrono::Duration::hours(1),
        )
        .await
        .unwrap();
        (user, token)
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_remains_public() {
        let state = setup_state().await;
        let app = super::router(state);

        let response = app.oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_requires_a_session() {
        let state = setup_state().await;
        let app = super::router(state);

        let response = app
            .oneshot(get_request("/api/projects", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            json.get("message").and_then(|v| v.as_str()),
            Some("Unauthorized")
        );
    }

    #[tokio::test]
    async fn login_issues_a_working_token() {
        let state = setup_state().await;
        seed_admin(&state).await;
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({"email": "ada@example.com", "credential": "s3cret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let token = json
            .pointer("/data/token")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let response = app
            .oneshot(get_request("/api/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data/email").and_then(|v| v.as_str()),
            Some("ada@example.com")
        );
    }

    #[tokio::test]
    async fn wrong_credential_is_rejected() {
        let state = setup_state().await;
        seed_admin(&state).await;
        let app = super::router(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({"email": "ada@example.com", "credential": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_task_returns_not_found() {
        let state = setup_state().await;
        let (_, token) = seed_admin(&state).await;
        let app = super::router(state);

        let response = app
            .oneshot(get_request(
                &format!("/api/tasks/{}", Uuid::new_v4()),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn checklists_are_open_to_any_signed_in_user() {
        let state = setup_state().await;
        let (admin, admin_token) = seed_admin(&state).await;

        User::create(
            &state.db().pool,
            &CreateUser {
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                role: UserRole::Staff,
                credential: "pass".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let (_, staff_token) = services::services::auth::login(
            &state.db().pool,
            "sam@example.com",
            "pass",
            chrono::Duration::hours(1),
        )
        .await
        .unwrap();

        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/teams",
                Some(&admin_token),
                json!({
                    "name": "Platform",
                    "members": [{"user_id": admin.id, "kind": "pm"}]
                }),
            ))
            .await
            .unwrap();
        let team_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/projects",
                Some(&admin_token),
                json!({
                    "name": "Launch",
                    "deadline": "2026-12-31",
                    "team_ids": [team_id]
                }),
            ))
            .await
            .unwrap();
        let project_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        // Task belongs to the admin; the staff caller is not its assignee.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                Some(&admin_token),
                json!({
                    "project_id": project_id,
                    "title": "Ship it",
                    "assignee_user_id": admin.id
                }),
            ))
            .await
            .unwrap();
        let task_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/tasks/{task_id}/todos"),
                Some(&staff_token),
                json!({"title": "collect sign-offs"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let todo_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/todos/{todo_id}/toggle"),
                Some(&staff_token),
                json!({"checked": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data/status").and_then(|v| v.as_str()),
            Some("done")
        );
    }

    #[tokio::test]
    async fn board_flow_over_http() {
        let state = setup_state().await;
        let (admin, token) = seed_admin(&state).await;
        let app = super::router(state);

        // Team with its PM, then a project assigned to that team.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/teams",
                Some(&token),
                json!({
                    "name": "Platform",
                    "members": [{"user_id": admin.id, "kind": "pm"}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let team_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/projects",
                Some(&token),
                json!({
                    "name": "Launch",
                    "deadline": "2026-12-31",
                    "team_ids": [team_id]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let project_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        // Task picks up the project's default team.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                Some(&token),
                json!({"project_id": project_id, "title": "Ship it"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let task = body_json(response).await;
        let task_id = task
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();
        assert_eq!(
            task.pointer("/data/team_id").and_then(|v| v.as_str()),
            Some(team_id.as_str())
        );

        // Drag to another column.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/tasks/{task_id}/move"),
                Some(&token),
                json!({"status": "inprogress"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data/status").and_then(|v| v.as_str()),
            Some("inprogress")
        );

        // Checklist: add, toggle, list.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/tasks/{task_id}/todos"),
                Some(&token),
                json!({"title": "write release notes"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let todo_id = body_json(response)
            .await
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/todos/{todo_id}/toggle"),
                Some(&token),
                json!({"checked": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/api/tasks/{task_id}/todos"),
                Some(&token),
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data/0/status").and_then(|v| v.as_str()),
            Some("done")
        );

        // Deleting the task takes its checklist with it.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/tasks/{task_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(
                &format!("/api/tasks/{task_id}/todos"),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
