//! Pets, booking autofill and the upcoming appointments list.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{Local, Months, NaiveDate};

use pawmilya_integration_tests::{TestApp, as_pairs, booking_fields, tomorrow};
use pawmilya_site::store::ClinicStore;

fn months_ago(months: u32) -> NaiveDate {
    Local::now()
        .date_naive()
        .checked_sub_months(Months::new(months))
        .unwrap()
}

async fn add_pet(app: &mut TestApp, fields: &[(&str, &str)]) {
    app.post_form("/my-pets", fields)
        .await
        .assert_redirect("/my-pets");
}

async fn signed_in() -> TestApp {
    let mut app = TestApp::local();
    app.signup("Ana Reyes", "ana@example.com", "paw-secret")
        .await
        .assert_redirect("/");
    app
}

#[tokio::test]
async fn test_pet_list_shows_species_and_age() {
    let mut app = signed_in().await;
    let year_ago = months_ago(12).to_string();
    let eleven_months = months_ago(11).to_string();

    add_pet(
        &mut app,
        &[
            ("name", "Rex"),
            ("species", "reptile"),
            ("reptile_type", "iguana"),
            ("birth_date", &year_ago),
            ("gender", "male"),
        ],
    )
    .await;
    add_pet(
        &mut app,
        &[
            ("name", "Luna"),
            ("species", "cat"),
            ("breed", "Persian"),
            ("birth_date", &eleven_months),
            ("gender", "female"),
        ],
    )
    .await;

    let page = app.get("/my-pets").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Reptile (Iguana)"));
    assert!(page.body.contains("<dd>1 year</dd>"));
    assert!(page.body.contains("<dd>11 months</dd>"));
}

#[tokio::test]
async fn test_invalid_pet_is_rejected() {
    let mut app = signed_in().await;
    let response = app
        .post_form("/my-pets", &[("name", ""), ("species", "dog"), ("gender", "male")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Pet name is required"));
}

#[tokio::test]
async fn test_booking_form_autofills_from_registered_pet() {
    let mut app = signed_in().await;
    let birth = months_ago(24).to_string();
    add_pet(
        &mut app,
        &[
            ("name", "Rex"),
            ("species", "reptile"),
            ("reptile_type", "iguana"),
            ("weight", "2 kg"),
            ("birth_date", &birth),
            ("gender", "male"),
        ],
    )
    .await;
    add_pet(
        &mut app,
        &[
            ("name", "Biscuit"),
            ("species", "dog"),
            ("breed", "Other"),
            ("breed_other", "Aspin mix"),
            ("weight", "8 kg"),
            ("birth_date", &birth),
            ("gender", "female"),
        ],
    )
    .await;

    let pets = app.state().local().list_pets().await.unwrap();
    let id_of = |name: &str| {
        pets.iter()
            .find(|p| p.name == name)
            .map(|p| p.id.to_string())
            .unwrap()
    };

    let reptile = app.get(&format!("/appointment?pet={}", id_of("Rex"))).await;
    assert_eq!(reptile.status, StatusCode::OK);
    assert!(reptile.body.contains("value=\"Rex\""));
    assert!(reptile.body.contains("value=\"reptile\" selected"));
    assert!(reptile.body.contains("value=\"iguana\" selected"));
    assert!(reptile.body.contains("value=\"2 kg\""));

    let dog = app.get(&format!("/appointment?pet={}", id_of("Biscuit"))).await;
    assert!(dog.body.contains("value=\"dog\" selected"));
    assert!(dog.body.contains("value=\"Aspin mix\""));
    assert!(dog.body.contains("value=\"8 kg\""));
}

#[tokio::test]
async fn test_other_owners_pet_is_not_autofilled() {
    let mut app = signed_in().await;
    let birth = months_ago(24).to_string();
    add_pet(
        &mut app,
        &[
            ("name", "Rex"),
            ("species", "dog"),
            ("birth_date", &birth),
            ("gender", "male"),
        ],
    )
    .await;
    let pet_id = app.state().local().list_pets().await.unwrap().first().unwrap().id.to_string();

    app.post_form("/logout", &[]).await;
    app.signup("Ben Cruz", "ben@example.com", "paw-secret").await;
    let form = app.get(&format!("/appointment?pet={pet_id}")).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(!form.body.contains("value=\"Rex\""));
    assert!(app.get(&format!("/my-pets/{pet_id}/edit")).await.status == StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_closed_appointments_leave_the_upcoming_list() {
    let mut app = signed_in().await;
    app.book(&as_pairs(&booking_fields(&tomorrow())))
        .await
        .assert_redirect("/appointment/success");

    let before = app.get("/my-appointments").await;
    let (upcoming, past) = before.body.split_once("Past &amp; Closed").unwrap();
    assert!(upcoming.contains("Vaccination for Mochi"));
    assert!(!past.contains("Vaccination for Mochi"));

    let id = app.state().local().local_appointments().await.unwrap().first().unwrap().id.clone();
    app.post_form(
        &format!("/my-appointments/{id}/notes"),
        &[("notes", "Bring vaccine card")],
    )
    .await
    .assert_redirect("/my-appointments");

    // A future visit that was cancelled is no longer upcoming.
    app.post_form("/logout", &[]).await;
    app.signup("Clinic Admin", "admin@example.com", "paw-secret").await;
    app.post_form(
        &format!("/admin/appointments/{id}/status"),
        &[("status", "cancelled")],
    )
    .await
    .assert_redirect("/admin/appointments");

    app.post_form("/logout", &[]).await;
    app.login("ana@example.com", "paw-secret").await;
    let after = app.get("/my-appointments").await;
    let (upcoming, past) = after.body.split_once("Past &amp; Closed").unwrap();
    assert!(!upcoming.contains("Vaccination for Mochi"));
    assert!(past.contains("Vaccination for Mochi"));
    assert!(past.contains("Bring vaccine card"));
}
