mod common;

use axum::http::{Method, StatusCode};
use chrono::{Days, Utc};
use serde_json::json;

use common::TestApp;

async fn hotel(app: &TestApp, staff: &str, nightly: &str) -> (String, String) {
    let accommodation_id = app
        .create(
            staff,
            "/api/accommodations",
            json!({
                "name": "Harbour Inn",
                "location": "Split",
                "star_rating": 4,
                "total_rooms": 20,
                "accommodation_type": "Hotel",
            }),
        )
        .await;
    let room_type_id = app
        .create(
            staff,
            "/api/room-types",
            json!({
                "accommodation_id": accommodation_id,
                "name": "Double",
                "price_per_night": nightly,
                "max_occupancy": 2,
            }),
        )
        .await;
    (accommodation_id, room_type_id)
}

#[tokio::test]
async fn test_room_booking_is_priced_per_night() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, user_id) = app.user("guest@example.com").await;
    let (accommodation_id, room_type_id) = hotel(&app, &staff, "100.00").await;

    let response = app
        .post(
            "/api/room-bookings",
            Some(&token),
            json!({
                "accommodation_id": accommodation_id,
                "room_type_id": room_type_id,
                "check_in_date": "2024-06-01",
                "check_out_date": "2024-06-03",
                "total_price": "1.00",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    let body = response.json();
    assert_eq!(body["code"], 201);
    assert_eq!(body["msg"], "success");
    assert_eq!(body["data"]["total_price"], "200.00");
    assert_eq!(body["data"]["user_id"], user_id.as_str());
    assert_eq!(body["data"]["booking_status"], false);
    assert_eq!(body["data"]["payment_status"], false);

    // Moving the check-out date reprices the stay.
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let response = app
        .patch(
            &format!("/api/room-bookings/{}", id),
            Some(&token),
            json!({ "check_out_date": "2024-06-05", "payment_status": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.data()["total_price"], "400.00");
    assert_eq!(response.data()["payment_status"], true);
    assert_eq!(response.data()["booking_status"], false);
}

#[tokio::test]
async fn test_room_booking_rejects_inverted_dates() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, _) = app.user("guest@example.com").await;
    let (accommodation_id, room_type_id) = hotel(&app, &staff, "100.00").await;

    let response = app
        .post(
            "/api/room-bookings",
            Some(&token),
            json!({
                "accommodation_id": accommodation_id,
                "room_type_id": room_type_id,
                "check_in_date": "2024-06-03",
                "check_out_date": "2024-06-03",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["code"], 400);
    assert!(body["msg"]["check_out_date"].is_array());
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_room_quote_is_anonymous() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (accommodation_id, room_type_id) = hotel(&app, &staff, "85.50").await;

    let response = app
        .post(
            "/api/room-bookings/calculate-price",
            None,
            json!({
                "accommodation_id": accommodation_id,
                "room_type_id": room_type_id,
                "number_of_days": 3,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.data()["total_price"], "256.50");
    assert_eq!(response.data()["room_type_name"], "Double");
}

#[tokio::test]
async fn test_venue_booking_applies_best_promotion() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, _) = app.user("fan@example.com").await;

    let today = Utc::now().date_naive();
    let event_id = app
        .create(
            &staff,
            "/api/events",
            json!({
                "name": "Summer Festival",
                "venue": "Main Square",
                "event_date": (today + Days::new(30)).to_string(),
                "entry_fee": "20.00",
                "max_participants": 8,
            }),
        )
        .await;
    for (discount, starts, ends) in [
        ("0.1", today - Days::new(5), today + Days::new(5)),
        ("0.2", today - Days::new(1), today + Days::new(1)),
        ("0.5", today + Days::new(2), today + Days::new(9)),
    ] {
        app.create(
            &staff,
            "/api/event-promotions",
            json!({
                "event_id": event_id,
                "promotion_start_date": starts.to_string(),
                "promotion_end_date": ends.to_string(),
                "discount": discount,
            }),
        )
        .await;
    }

    let quote = app
        .post(
            "/api/venue-bookings/calculate-price",
            Some(&token),
            json!({ "event_id": event_id, "number_of_tickets": 5 }),
        )
        .await;
    assert_eq!(quote.status, StatusCode::OK, "{}", quote.text());

    let response = app
        .post(
            "/api/venue-bookings",
            Some(&token),
            json!({ "event_id": event_id, "number_of_tickets": 5, "discount_amount": "0.00" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());

    let booking = response.data();
    assert_eq!(booking["base_amount"], "100.00");
    assert_eq!(booking["discount_amount"], "20.00");
    assert_eq!(booking["total_amount"], "80.00");

    let quoted = quote.data();
    assert_eq!(quoted["discount"], "0.2");
    assert_eq!(quoted["total_amount"], booking["total_amount"]);
    assert_eq!(quoted["promotion_id"], booking["promotion_id"]);

    // Only three seats remain.
    let response = app
        .post(
            "/api/venue-bookings",
            Some(&token),
            json!({ "event_id": event_id, "number_of_tickets": 4 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["msg"], "Only 3 tickets available");
}

#[tokio::test]
async fn test_online_order_totals_live_menu_prices() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, _) = app.user("diner@example.com").await;

    let restaurant_id = app
        .create(
            &staff,
            "/api/restaurants",
            json!({ "name": "Konoba", "location": "Hvar", "cuisine_type": "Dalmatian" }),
        )
        .await;
    let soup = app
        .create(
            &staff,
            "/api/menus",
            json!({ "restaurant_id": restaurant_id, "item_name": "Fish soup", "price": "10.00" }),
        )
        .await;
    let risotto = app
        .create(
            &staff,
            "/api/menus",
            json!({
                "restaurant_id": restaurant_id,
                "item_name": "Black risotto",
                "price": "15.00",
            }),
        )
        .await;

    let items = json!([
        { "menu_item_id": soup, "quantity": 2 },
        { "menu_item_id": risotto, "quantity": 1 },
    ]);

    let quote = app
        .post(
            "/api/online-orders/calculate-price",
            Some(&token),
            json!({ "items": items }),
        )
        .await;
    assert_eq!(quote.status, StatusCode::OK, "{}", quote.text());
    assert_eq!(quote.data()["total_amount"], "35.00");
    assert_eq!(quote.data()["items"][0]["subtotal"], "20.00");

    let response = app
        .post(
            "/api/online-orders",
            Some(&token),
            json!({ "restaurant_id": restaurant_id, "items": items }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    let order = response.data();
    assert_eq!(order["total_amount"], "35.00");
    assert_eq!(order["order_status"], "Pending");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    let response = app
        .post(
            "/api/online-orders",
            Some(&token),
            json!({ "restaurant_id": restaurant_id, "items": [] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["msg"]["items"].is_array());
}

#[tokio::test]
async fn test_tour_booking_respects_capacity() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, _) = app.user("hiker@example.com").await;

    let destination_id = app
        .create(
            &staff,
            "/api/destinations",
            json!({ "name": "Krka", "category": "National park", "location": "Šibenik" }),
        )
        .await;
    let tour_id = app
        .create(
            &staff,
            "/api/tours",
            json!({
                "destination_id": destination_id,
                "name": "Waterfalls walk",
                "tour_type": "Walking",
                "duration": "4h",
                "price_per_person": "45.00",
                "max_capacity": 4,
                "tour_date": "2030-05-01",
            }),
        )
        .await;

    let response = app
        .post(
            "/api/tour-bookings",
            Some(&token),
            json!({ "tour_id": tour_id, "persons": 3 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    assert_eq!(response.data()["total_price"], "135.00");

    let response = app
        .post(
            "/api/tour-bookings",
            Some(&token),
            json!({ "tour_id": tour_id, "persons": 2 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["msg"], "Only 1 places available");

    let response = app
        .post(
            "/api/tour-bookings/calculate-price",
            Some(&token),
            json!({ "tour_id": tour_id, "persons": 0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["msg"]["persons"].is_array());
}

#[tokio::test]
async fn test_new_bookings_start_pending_and_unpaid() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, _) = app.user("guest@example.com").await;
    let (accommodation_id, room_type_id) = hotel(&app, &staff, "100.00").await;

    let destination_id = app
        .create(
            &staff,
            "/api/destinations",
            json!({ "name": "Krka", "category": "National park", "location": "Šibenik" }),
        )
        .await;
    let tour_id = app
        .create(
            &staff,
            "/api/tours",
            json!({
                "destination_id": destination_id,
                "name": "Waterfalls walk",
                "tour_type": "Walking",
                "duration": "4h",
                "price_per_person": "45.00",
                "max_capacity": 10,
                "tour_date": "2030-05-01",
            }),
        )
        .await;
    let event_id = app
        .create(
            &staff,
            "/api/events",
            json!({
                "name": "Jazz night",
                "venue": "Fortress",
                "event_date": "2030-07-01",
                "entry_fee": "15.00",
                "max_participants": 50,
            }),
        )
        .await;

    let paid_up = json!({ "booking_status": true, "payment_status": true });
    for (uri, mut body) in [
        (
            "/api/room-bookings",
            json!({
                "accommodation_id": accommodation_id,
                "room_type_id": room_type_id,
                "check_in_date": "2024-06-01",
                "check_out_date": "2024-06-02",
            }),
        ),
        ("/api/tour-bookings", json!({ "tour_id": tour_id, "persons": 2 })),
        (
            "/api/venue-bookings",
            json!({ "event_id": event_id, "number_of_tickets": 2 }),
        ),
    ] {
        body["booking_status"] = json!(true);
        body["payment_status"] = json!(true);

        let response = app.post(uri, Some(&token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        let created = response.data();
        assert_eq!(created["booking_status"], false, "{uri}");
        assert_eq!(created["payment_status"], false, "{uri}");

        // Only an update moves the flags.
        let detail = format!("{}/{}", uri, created["id"].as_str().unwrap());
        let response = app.patch(&detail, Some(&token), paid_up.clone()).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        assert_eq!(response.data()["booking_status"], true);
        assert_eq!(response.data()["payment_status"], true);
    }
}

#[tokio::test]
async fn test_ride_fare_follows_provider_rates() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (token, _) = app.user("rider@example.com").await;
    let (other, _) = app.user("other@example.com").await;

    let provider = json!({
        "name": "Blue Cabs",
        "service_type": "Taxi",
        "base_fare": "3.50",
        "price_per_km": "1.20",
        "contact_info": "+385 1 000 000",
    });
    let response = app
        .post("/api/transportation-providers", Some(&token), provider.clone())
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let provider_id = app
        .create(&staff, "/api/transportation-providers", provider)
        .await;

    let response = app
        .post(
            "/api/ride-bookings",
            Some(&token),
            json!({
                "provider_id": provider_id,
                "pickup_location": "Airport",
                "drop_off_location": "Old Town",
                "ride_date": "2030-05-01",
                "pickup_time": "09:30:00",
                "distance_km": "12.5",
                "estimated_fare": "1.00",
                "booking_status": true,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    let ride = response.data();
    assert_eq!(ride["estimated_fare"], "18.50");
    assert_eq!(ride["distance_km"], "12.5");
    assert_eq!(ride["booking_status"], false);

    let detail = format!("/api/ride-bookings/{}", ride["id"].as_str().unwrap());
    assert_eq!(app.get(&detail, Some(&other)).await.status, StatusCode::NOT_FOUND);

    // A rate change applies on the next write.
    let response = app
        .send(
            Method::PUT,
            &format!("/api/transportation-providers/{}", provider_id),
            Some(&staff),
            Some(json!({
                "name": "Blue Cabs",
                "service_type": "Taxi",
                "base_fare": "3.50",
                "price_per_km": "2.00",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());

    let response = app
        .patch(
            &detail,
            Some(&token),
            json!({ "distance_km": "10", "booking_status": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.data()["estimated_fare"], "23.50");
    assert_eq!(response.data()["booking_status"], true);
    assert_eq!(response.data()["pickup_location"], "Airport");

    let response = app
        .patch(&detail, Some(&token), json!({ "distance_km": "0" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["msg"]["distance_km"].is_array());

    let listed = app.get("/api/ride-bookings", Some(&other)).await;
    assert_eq!(listed.data().as_array().unwrap().len(), 0);
    assert_eq!(app.delete(&detail, Some(&token)).await.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_bookings_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let staff = app.staff("staff@example.com").await;
    let (owner, _) = app.user("owner@example.com").await;
    let (other, _) = app.user("other@example.com").await;
    let (accommodation_id, room_type_id) = hotel(&app, &staff, "100.00").await;

    let response = app
        .post(
            "/api/room-bookings",
            Some(&owner),
            json!({
                "accommodation_id": accommodation_id,
                "room_type_id": room_type_id,
                "check_in_date": "2024-06-01",
                "check_out_date": "2024-06-02",
            }),
        )
        .await;
    let id = response.data()["id"].as_str().unwrap().to_string();
    let detail = format!("/api/room-bookings/{}", id);

    assert_eq!(app.get(&detail, Some(&other)).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&detail, Some(&other)).await.status, StatusCode::NOT_FOUND);

    let listed = app.get("/api/room-bookings", Some(&other)).await;
    assert_eq!(listed.data().as_array().unwrap().len(), 0);
    let listed = app.get("/api/room-bookings", Some(&staff)).await;
    assert_eq!(listed.data().as_array().unwrap().len(), 1);

    assert_eq!(app.get(&detail, Some(&staff)).await.status, StatusCode::OK);
    assert_eq!(app.delete(&detail, Some(&owner)).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&detail, Some(&owner)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guards() {
    let app = TestApp::new().await;
    let (token, _) = app.user("guest@example.com").await;

    let response = app.get("/api/room-bookings", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], 401);

    let response = app
        .post(
            "/api/restaurants",
            Some(&token),
            json!({ "name": "Nope", "location": "Zadar", "cuisine_type": "Any" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.get("/api/restaurants", None).await.status, StatusCode::OK);
    assert_eq!(
        app.get("/api/event-logs", Some(&token)).await.status,
        StatusCode::FORBIDDEN
    );

    let response = app.get("/api/does-not-exist", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["code"], 404);
    assert!(response.json()["data"].is_null());
}
