//! HTTP API tests against the full router wired to in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use community_onboarding::adapters::http::{
    api_router, AuthState, CommunityAppState, HttpOptions, OnboardingAppState,
};
use community_onboarding::adapters::memory::{
    InMemoryAuth, InMemoryPostRepository, InMemoryProfileRepository, InMemoryRealtime,
    InMemorySurveyRepository,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    auth: InMemoryAuth,
}

impl TestApp {
    fn new() -> Self {
        let auth = InMemoryAuth::new();
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let posts = Arc::new(InMemoryPostRepository::with_profiles(profiles.clone()));

        let onboarding = OnboardingAppState::new(
            Arc::new(auth.clone()),
            profiles.clone(),
            Arc::new(InMemorySurveyRepository::new()),
            Duration::from_secs(1),
        );
        let community = CommunityAppState::new(
            profiles,
            posts,
            Arc::new(InMemoryRealtime::new()),
            Arc::new(auth.clone()),
        );
        let validator: AuthState = Arc::new(auth.clone());

        Self {
            router: api_router(onboarding, community, validator, &HttpOptions::default()),
            auth,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Registers, signs in and completes onboarding. Returns the token.
    async fn onboard(&self, email: &str, gender: &str) -> (String, Value) {
        let (status, registered) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(registration(email, gender)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", registered);
        let token = registered["session"]["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, completed) = self
            .call(
                Method::POST,
                "/api/onboarding/complete",
                Some(&token),
                Some(json!({ "pending_registration": registered["pending_registration"] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", completed);
        (token, completed)
    }
}

fn registration(email: &str, gender: &str) -> Value {
    json!({
        "email": email,
        "password": "secret123",
        "confirm_password": "secret123",
        "first_name": "Hala",
        "last_name": "Nasser",
        "age": 31,
        "gender": gender,
        "origin_city": "Zarqa"
    })
}

fn survey() -> Value {
    json!({
        "pregnancy": {
            "is_first_pregnancy": false,
            "living_children_count": 2,
            "delivery_type": "cesarean",
            "birth_place": "private_hospital"
        },
        "answers": {
            "told_about_cynto": true,
            "gave_consent": true,
            "knew_why_cynto": false,
            "strong_contractions": true,
            "more_pain_than_expected": false,
            "asked_to_stop": false,
            "problems_after_delivery": false,
            "felt_respected": true,
            "too_much_cynto_used": false
        }
    })
}

// =============================================================================
// Health & Auth
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn invalid_registration_is_rejected_before_sign_up() {
    let app = TestApp::new();
    let mut form = registration("bad@example.com", "male");
    form["confirm_password"] = json!("different");

    let (status, body) = app
        .call(Method::POST, "/api/auth/register", None, Some(form))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");

    // The account was never created.
    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "bad@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sign_in_returns_a_usable_token() {
    let app = TestApp::new();
    app.onboard("sami@example.com", "male").await;

    let (status, session) = app
        .call(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "sami@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = session["access_token"].as_str().unwrap();

    let (status, profile) = app
        .call(Method::GET, "/api/onboarding/profile", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["gender"], "male");
    assert_eq!(profile["form_completed"], true);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.onboard("nour@example.com", "male").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "nour@example.com", "password": "nope-nope" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .call(Method::GET, "/api/posts", Some("not-a-token"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Onboarding
// =============================================================================

#[tokio::test]
async fn anonymous_destination_is_login() {
    let app = TestApp::new();

    let (status, body) = app
        .call(Method::GET, "/api/onboarding/destination?path=/posts", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["destination"], "login");
    assert_eq!(body["allowed"], false);
    assert_eq!(body["redirect_to"], "/auth/login");
}

#[tokio::test]
async fn unknown_screen_path_is_a_validation_error() {
    let app = TestApp::new();

    let (status, _) = app
        .call(Method::GET, "/api/onboarding/destination?path=/nowhere", None, None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn male_registration_completes_to_posts() {
    let app = TestApp::new();

    let (token, completed) = app.onboard("tariq@example.com", "male").await;

    assert_eq!(completed["destination"], "posts");
    assert_eq!(completed["path"], "/posts");
    assert_eq!(completed["profile"]["first_name"], "Hala");

    let (status, destination) = app
        .call(Method::GET, "/api/onboarding/destination", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(destination["destination"], "posts");
}

#[tokio::test]
async fn female_user_is_gated_until_survey_is_submitted() {
    let app = TestApp::new();
    let (token, completed) = app.onboard("rima@example.com", "female").await;
    assert_eq!(completed["destination"], "survey");

    let (status, body) = app.call(Method::GET, "/api/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"]["redirect"], "/survey");

    let (status, next) = app
        .call(Method::POST, "/api/onboarding/survey", Some(&token), Some(survey()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", next);
    assert_eq!(next["destination"], "posts");

    let (status, page) = app.call(Method::GET, "/api/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 0);
    assert_eq!(page["posts"], json!([]));
}

#[tokio::test]
async fn complete_profile_chooses_gender_for_federated_user() {
    let app = TestApp::new();
    let identity = community_onboarding::domain::foundation::Identity::new(
        community_onboarding::domain::foundation::UserId::new("federated-1").unwrap(),
    )
    .with_display_name("Yara Odeh");
    let token = app.auth.issue_token(identity).await;

    let (status, destination) = app
        .call(Method::GET, "/api/onboarding/destination", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(destination["destination"], "complete_profile");

    let (status, next) = app
        .call(
            Method::POST,
            "/api/onboarding/complete-profile",
            Some(&token),
            Some(json!({ "gender": "female" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", next);
    assert_eq!(next["destination"], "survey");
}

#[tokio::test]
async fn complete_profile_cannot_skip_pending_survey() {
    let app = TestApp::new();
    let (token, completed) = app.onboard("lubna@example.com", "female").await;
    assert_eq!(completed["destination"], "survey");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/onboarding/complete-profile",
            Some(&token),
            Some(json!({ "gender": "male" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    assert_eq!(body["details"]["redirect"], "/survey");

    let (_, destination) = app
        .call(Method::GET, "/api/onboarding/destination", Some(&token), None)
        .await;
    assert_eq!(destination["destination"], "survey");
    let (status, _) = app.call(Method::GET, "/api/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn other_gender_is_chosen_on_complete_profile() {
    let app = TestApp::new();
    let identity = community_onboarding::domain::foundation::Identity::new(
        community_onboarding::domain::foundation::UserId::new("federated-2").unwrap(),
    );
    let token = app.auth.issue_token(identity).await;

    let (status, next) = app
        .call(
            Method::POST,
            "/api/onboarding/complete-profile",
            Some(&token),
            Some(json!({ "gender": "other" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", next);
    assert_eq!(next["destination"], "posts");

    let (status, _) = app.call(Method::GET, "/api/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_endpoints_require_a_session() {
    let app = TestApp::new();

    let (status, _) = app
        .call(Method::GET, "/api/onboarding/profile", None, None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Community
// =============================================================================

#[tokio::test]
async fn post_like_and_comment_round_trip() {
    let app = TestApp::new();
    let (author, _) = app.onboard("author@example.com", "male").await;
    let (reader, _) = app.onboard("reader@example.com", "male").await;

    let (status, post) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&author),
            Some(json!({ "title": "First steps", "content": "Hello everyone" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", post);
    assert_eq!(post["author"]["display_name"], "Hala Nasser");
    let post_id = post["id"].as_str().unwrap().to_string();

    let like_uri = format!("/api/posts/{}/like", post_id);
    let (status, like) = app.call(Method::POST, &like_uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like, json!({ "liked": true, "like_count": 1 }));

    let (_, unlike) = app.call(Method::POST, &like_uri, Some(&reader), None).await;
    assert_eq!(unlike, json!({ "liked": false, "like_count": 0 }));

    let comments_uri = format!("/api/posts/{}/comments", post_id);
    let (status, comment) = app
        .call(
            Method::POST,
            &comments_uri,
            Some(&reader),
            Some(json!({ "content": "Welcome!", "is_anonymous": true })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", comment);
    assert_eq!(comment["author"]["display_name"], "Anonymous");

    let (status, comments) = app.call(Method::GET, &comments_uri, Some(&author), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 1);

    let (status, detail) = app
        .call(Method::GET, &format!("/api/posts/{}", post_id), Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["comments_count"], 1);
    assert_eq!(detail["liked_by_me"], false);
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let app = TestApp::new();
    let (token, _) = app.onboard("lost@example.com", "male").await;
    let uri = format!("/api/posts/{}", uuid::Uuid::new_v4());

    let (status, body) = app.call(Method::GET, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn empty_post_title_is_rejected() {
    let app = TestApp::new();
    let (token, _) = app.onboard("blank@example.com", "male").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({ "title": "   ", "content": "body" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
