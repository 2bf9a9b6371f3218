// Login, session cookie and route guards
// Run with: cargo test -p clinic-server --test session_gate_test

mod common;

use axum::http::{header, StatusCode};
use common::{json_body, location, session_cookie, TestApp, ADMIN_PASSWORD, ADMIN_USERNAME};

#[tokio::test]
async fn test_anonymous_requests_redirect_to_login() {
    let app = TestApp::new();

    for uri in [
        "/inicio",
        "/agenda",
        "/mi-perfil",
        "/paciente",
        "/paciente/agregar",
        "/usuarios",
        "/medicos",
        "/admin/crear",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login", "{}", uri);
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::with_admin().await;

    let unknown = app
        .post_form(
            "/login",
            &[("username", "nobody"), ("password", "whatever")],
            None,
        )
        .await;
    let wrong_password = app
        .post_form(
            "/login",
            &[("username", ADMIN_USERNAME), ("password", "not-it")],
            None,
        )
        .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&unknown).is_none());
    assert!(session_cookie(&wrong_password).is_none());
    assert_eq!(json_body(unknown).await, json_body(wrong_password).await);
}

#[tokio::test]
async fn test_login_sets_http_only_cookie_and_opens_home() {
    let app = TestApp::with_admin().await;

    let response = app
        .post_form(
            "/login",
            &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    let cookie = session_cookie(&response).unwrap();

    let response = app.get("/inicio", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let home = json_body(response).await;
    assert_eq!(home["user"]["username"], ADMIN_USERNAME);
    assert_eq!(home["user"]["is_admin"], true);
    assert_eq!(home["user"]["display_name"], "System Administrator");

    // Logged-in users skip the landing page
    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inicio");
}

#[tokio::test]
async fn test_forged_cookie_is_anonymous() {
    let app = TestApp::with_admin().await;

    let response = app
        .get("/inicio", Some("clinic_session=deadbeef"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_non_admin_is_sent_home_from_admin_routes() {
    let app = TestApp::with_admin().await;
    app.register_patient("Ana", "Gomez", "30111222", "ana@example.com")
        .await;
    let patient = app.login("ana@example.com", "patient-pass").await;

    for uri in [
        "/usuarios",
        "/medicos",
        "/medicos/profesionales",
        "/medicos/especialidades",
        "/admin/crear",
    ] {
        let response = app.get(uri, Some(&patient)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/inicio", "{}", uri);
    }

    // Session-only routes stay open
    let response = app.get("/mi-perfil", Some(&patient)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = json_body(response).await;
    assert_eq!(profile["is_patient"], true);
    assert_eq!(profile["display_name"], "Ana Gomez");
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestApp::with_admin().await;
    let cookie = app.login_admin().await;
    let sessions = app.counts().auth_sessions;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(app.counts().auth_sessions, sessions - 1);

    let response = app.get("/inicio", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_deactivated_account_loses_access() {
    let app = TestApp::with_admin().await;
    let admin = app.login_admin().await;
    app.register_patient("Ana", "Gomez", "30111222", "ana@example.com")
        .await;
    let patient = app.login("ana@example.com", "patient-pass").await;

    let response = app.get("/usuarios?role=patient", Some(&admin)).await;
    let users = json_body(response).await;
    let id = users["data"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .post_empty(&format!("/usuarios/toggle-status/{}", id), Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["active"], false);

    // Existing session no longer resolves
    let response = app.get("/inicio", Some(&patient)).await;
    assert_eq!(location(&response), "/login");

    // Same answer as a wrong password
    let response = app
        .post_form(
            "/login",
            &[("username", "ana@example.com"), ("password", "patient-pass")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_password_change() {
    let app = TestApp::new();
    app.register_patient("Ana", "Gomez", "30111222", "ana@example.com")
        .await;
    let cookie = app.login("ana@example.com", "patient-pass").await;

    let response = app
        .post_form(
            "/mi-perfil",
            &[("password", "new-pass"), ("confirm_password", "typo")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["field"], "confirm_password");

    let response = app
        .post_form(
            "/mi-perfil",
            &[("password", "new-pass"), ("confirm_password", "new-pass")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/mi-perfil");

    app.login("ana@example.com", "new-pass").await;
}

#[tokio::test]
async fn test_form_pages_follow_their_guards() {
    let app = TestApp::with_admin().await;
    app.register_patient("Ana", "Gomez", "30111222", "ana@example.com")
        .await;
    let patient = app.login("ana@example.com", "patient-pass").await;
    let admin = app.login_admin().await;

    let response = app.get("/agenda", Some(&patient)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let agenda = json_body(response).await;
    assert_eq!(agenda["title"], "Agenda");
    assert_eq!(agenda["user"]["username"], "ana@example.com");

    let response = app.get("/paciente/agregar", Some(&patient)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "Add patient");

    let response = app.get("/admin/crear", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "Create administrator");
}
