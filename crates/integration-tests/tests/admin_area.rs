//! Back-office access control and management pages on the local store.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::Local;

use pawmilya_core::Role;
use pawmilya_integration_tests::{TestApp, as_pairs, booking_fields, tomorrow};

/// A customer with one booking and one pet, then an admin signed in.
async fn populated() -> TestApp {
    let mut app = TestApp::local();
    app.signup("Ana Reyes", "ana@example.com", "paw-secret").await;
    app.book(&as_pairs(&booking_fields(&tomorrow()))).await;
    let birth = (Local::now().date_naive() - chrono::Days::new(400)).to_string();
    app.post_form(
        "/my-pets",
        &[
            ("name", "Rex"),
            ("species", "dog"),
            ("breed", "Beagle"),
            ("birth_date", &birth),
            ("gender", "male"),
        ],
    )
    .await
    .assert_redirect("/my-pets");
    app.post_form("/logout", &[]).await;

    app.signup("Clinic Admin", "admin@example.com", "admin-secret")
        .await
        .assert_redirect("/");
    app
}

#[tokio::test]
async fn test_admin_requires_admin_role() {
    let mut app = TestApp::local();
    app.get("/admin").await.assert_redirect("/login?next=%2Fadmin");

    app.signup("Ana Reyes", "ana@example.com", "paw-secret").await;
    assert_eq!(app.get("/admin").await.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.get("/admin/feedback").await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_admin_pages_show_clinic_data() {
    let mut app = populated().await;

    let dashboard = app.get("/admin").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("Mochi"));

    let appointments = app.get("/admin/appointments?search=mochi").await;
    assert_eq!(appointments.status, StatusCode::OK);
    assert!(appointments.body.contains("Ana Reyes"));

    let filtered = app.get("/admin/appointments?status=cancelled").await;
    assert!(!filtered.body.contains("Mochi"));

    let records = app.get("/admin/booking-records").await;
    assert_eq!(records.status, StatusCode::OK);
    assert!(records.body.contains("Mochi"));
    assert!(records.body.contains("local storage"));

    let pets = app.get("/admin/pets").await;
    assert_eq!(pets.status, StatusCode::OK);
    assert!(pets.body.contains("Rex"));
    assert!(pets.body.contains("ana@example.com"));
}

#[tokio::test]
async fn test_admin_manages_users() {
    let mut app = populated().await;
    let local = app.state().local().clone();
    let admin = local.find_user_by_email("admin@example.com").await.unwrap().unwrap();
    let ana = local.find_user_by_email("ana@example.com").await.unwrap().unwrap();

    let users = app.get("/admin/users").await;
    assert_eq!(users.status, StatusCode::OK);
    assert!(users.body.contains("ana@example.com"));
    assert!(users.body.contains("admin@example.com"));

    app.post_form(&format!("/admin/users/{}/delete", admin.id), &[])
        .await
        .assert_redirect("/admin/users");
    let refused = app.get("/admin/users").await;
    assert!(refused.body.contains("You cannot delete your own account."));
    assert!(local.get_user(&admin.id).await.unwrap().is_some());

    app.post_form(&format!("/admin/users/{}/role", ana.id), &[("role", "Admin")])
        .await
        .assert_redirect("/admin/users");
    let promoted = local.get_user(&ana.id).await.unwrap().unwrap();
    assert_eq!(promoted.role, Role::Admin);

    app.post_form(&format!("/admin/users/{}/delete", ana.id), &[])
        .await
        .assert_redirect("/admin/users");
    assert!(local.get_user(&ana.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_updates_appointment() {
    let mut app = populated().await;
    let id = app.state().local().local_appointments().await.unwrap().first().unwrap().id.clone();

    app.post_form(
        &format!("/admin/appointments/{id}/status"),
        &[("status", "completed")],
    )
    .await
    .assert_redirect("/admin/appointments");
    app.post_form(
        &format!("/admin/appointments/{id}/notes"),
        &[("notes", "Follow-up in two weeks")],
    )
    .await
    .assert_redirect("/admin/appointments");

    let stored = app.state().local().local_appointments().await.unwrap();
    let record = stored.first().unwrap();
    assert_eq!(record.status.as_str(), "completed");
    assert_eq!(record.user_notes.as_deref(), Some("Follow-up in two weeks"));

    app.post_form(
        &format!("/admin/appointments/{id}/status"),
        &[("status", "archived")],
    )
    .await;
    let rejected = app.get("/admin/appointments").await;
    assert!(rejected.body.contains("Unknown appointment status."));

    app.post_form(&format!("/admin/appointments/{id}/delete"), &[])
        .await
        .assert_redirect("/admin/appointments");
    assert!(app.state().local().local_appointments().await.unwrap().is_empty());
}
