//! Feedback submission and review.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use pawmilya_core::FeedbackStatus;
use pawmilya_integration_tests::TestApp;

#[tokio::test]
async fn test_anonymous_feedback_is_stored() {
    let mut app = TestApp::local();

    let form = app.get("/feedback").await;
    assert_eq!(form.status, StatusCode::OK);

    app.post_form(
        "/feedback",
        &[
            ("rating", "5"),
            ("category", "grooming"),
            ("message", "Mochi came back fluffy!"),
        ],
    )
    .await
    .assert_redirect("/feedback");
    let thanks = app.get("/feedback").await;
    assert!(thanks.body.contains("Thank you!"));

    let entries = app.state().local().list_feedback().await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = entries.first().unwrap();
    assert_eq!(entry.rating.stars(), 5);
    assert_eq!(entry.status, FeedbackStatus::New);
    assert_eq!(entry.submitter(), "Anonymous");
}

#[tokio::test]
async fn test_invalid_feedback_is_rejected() {
    let mut app = TestApp::local();
    let response = app
        .post_form(
            "/feedback",
            &[("rating", "7"), ("category", "grooming"), ("message", " ")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Please choose a rating from 1 to 5 stars."));
    assert!(app.state().local().list_feedback().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_reviews_signed_in_feedback() {
    let mut app = TestApp::local();
    app.signup("Ana Reyes", "ana@example.com", "paw-secret").await;
    app.post_form(
        "/feedback",
        &[
            ("rating", "2"),
            ("category", "appointment"),
            ("message", "The wait was long."),
        ],
    )
    .await
    .assert_redirect("/feedback");
    app.post_form("/logout", &[]).await;

    app.signup("Clinic Admin", "admin@example.com", "admin-secret").await;
    let page = app.get("/admin/feedback").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("The wait was long."));
    assert!(page.body.contains("Ana Reyes"));

    let id = app.state().local().list_feedback().await.unwrap().first().unwrap().id.clone();
    app.post_form(
        &format!("/admin/feedback/{id}/status"),
        &[("status", "resolved")],
    )
    .await
    .assert_redirect("/admin/feedback");
    let entry = app.state().local().list_feedback().await.unwrap();
    assert_eq!(entry.first().unwrap().status, FeedbackStatus::Resolved);

    let filtered = app.get("/admin/feedback?status=new").await;
    assert!(!filtered.body.contains("The wait was long."));

    app.post_form(&format!("/admin/feedback/{id}/delete"), &[])
        .await
        .assert_redirect("/admin/feedback");
    assert!(app.state().local().list_feedback().await.unwrap().is_empty());
}
