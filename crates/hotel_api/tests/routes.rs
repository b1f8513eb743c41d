use hotel_api::{ApiConfig, ApiRequest, ApiResponse, Method, Router};
use serde_json::{json, Value};

fn router() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(ApiConfig::new(dir.path().join("routes.sqlite3")));
    (dir, router)
}

fn send(router: &Router, request: ApiRequest) -> ApiResponse {
    router.handle(&request)
}

fn create_hotel(router: &Router) -> Value {
    let response = send(
        router,
        ApiRequest::post(
            "/api/hotels",
            json!({
                "name": "Forward Operating Base Comfort",
                "address": "Hellscape",
                "phoneNumber": "1-800-289-8234"
            })
            .to_string(),
        ),
    );
    assert_eq!(response.status, 201);
    response.body.unwrap()
}

fn room_body(hotel_id: i64, room_number: i64) -> String {
    json!({
        "roomNumber": room_number,
        "hotelId": hotel_id,
        "nightlyRate": 99.50,
        "numberOfBeds": 2,
        "roomTypeId": 1,
        "bedTypeId": 1
    })
    .to_string()
}

#[test]
fn hotel_lifecycle_over_routes() {
    let (_dir, router) = router();

    let created = create_hotel(&router);
    assert_eq!(created["id"], 1);
    assert_eq!(created["version"], 1);
    assert_eq!(created["phoneNumber"], "1-800-289-8234");

    let listed = send(&router, ApiRequest::get("/api/hotels"));
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body.unwrap().as_array().unwrap().len(), 1);

    let mut updated = created.clone();
    updated["address"] = json!("Somewhere quieter");
    let put = send(
        &router,
        ApiRequest::put("/api/hotels/1", updated.to_string()),
    );
    assert_eq!(put.status, 204);
    assert!(put.body.is_none());

    let fetched = send(&router, ApiRequest::get("/api/hotels/1")).body.unwrap();
    assert_eq!(fetched["address"], "Somewhere quieter");
    assert_eq!(fetched["version"], 2);

    let stale = send(
        &router,
        ApiRequest::put("/api/hotels/1", updated.to_string()),
    );
    assert_eq!(stale.status, 409);
    assert_eq!(stale.body.unwrap()["error"], "conflict");

    let deleted = send(&router, ApiRequest::delete("/api/hotels/1"));
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.body.unwrap()["address"], "Somewhere quieter");

    assert_eq!(send(&router, ApiRequest::get("/api/hotels/1")).status, 404);
}

#[test]
fn cascade_is_visible_through_routes() {
    let (_dir, router) = router();
    create_hotel(&router);

    let room = send(&router, ApiRequest::post("/api/hotel-rooms", room_body(1, 101)));
    assert_eq!(room.status, 201);

    let reservation = send(
        &router,
        ApiRequest::post(
            "/api/room-reservations",
            json!({
                "hotelId": 1,
                "roomNumber": 101,
                "startDate": 1_735_689_600_000_i64,
                "endDate": 1_735_862_400_000_i64
            })
            .to_string(),
        ),
    );
    assert_eq!(reservation.status, 201);
    let reservation_id = reservation.body.unwrap()["reservationId"].as_i64().unwrap();

    let nested = send(&router, ApiRequest::get("/api/hotel-rooms/1/101/reservations"));
    assert_eq!(nested.status, 200);
    assert_eq!(nested.body.unwrap().as_array().unwrap().len(), 1);

    assert_eq!(send(&router, ApiRequest::delete("/api/hotels/1")).status, 200);
    assert_eq!(
        send(&router, ApiRequest::get("/api/hotel-rooms/1/101")).status,
        404
    );
    assert_eq!(
        send(
            &router,
            ApiRequest::get(format!("/api/room-reservations/{reservation_id}"))
        )
        .status,
        404
    );
}

#[test]
fn duplicate_room_is_conflict() {
    let (_dir, router) = router();
    create_hotel(&router);

    assert_eq!(
        send(&router, ApiRequest::post("/api/hotel-rooms", room_body(1, 101))).status,
        201
    );
    let duplicate = send(&router, ApiRequest::post("/api/hotel-rooms", room_body(1, 101)));
    assert_eq!(duplicate.status, 409);

    let rooms = send(&router, ApiRequest::get("/api/hotels/1/rooms"));
    assert_eq!(rooms.body.unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn bad_input_maps_to_client_errors() {
    let (_dir, router) = router();
    create_hotel(&router);

    let too_long = send(
        &router,
        ApiRequest::post(
            "/api/hotels",
            json!({
                "name": "x".repeat(101),
                "address": "a",
                "phoneNumber": "1"
            })
            .to_string(),
        ),
    );
    assert_eq!(too_long.status, 400);
    let body = too_long.body.unwrap();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "name");

    let mismatch = send(
        &router,
        ApiRequest::put(
            "/api/hotels/1",
            json!({
                "id": 2,
                "name": "n",
                "address": "a",
                "phoneNumber": "p",
                "version": 1
            })
            .to_string(),
        ),
    );
    assert_eq!(mismatch.status, 400);
    assert_eq!(mismatch.body.unwrap()["error"], "key_mismatch");

    let missing_parent = send(&router, ApiRequest::post("/api/hotel-rooms", room_body(9, 1)));
    assert_eq!(missing_parent.status, 400);
    assert_eq!(missing_parent.body.unwrap()["error"], "missing_reference");

    let garbage = send(&router, ApiRequest::post("/api/hotels", "{not json"));
    assert_eq!(garbage.status, 400);
    assert_eq!(garbage.body.unwrap()["error"], "malformed_body");

    let no_body = send(&router, ApiRequest::new(Method::Post, "/api/hotels", None));
    assert_eq!(no_body.status, 400);

    assert_eq!(send(&router, ApiRequest::get("/api/hotels/one")).status, 400);
}

#[test]
fn absent_or_null_required_fields_are_validation_errors() {
    let (_dir, router) = router();
    create_hotel(&router);

    let no_name = send(
        &router,
        ApiRequest::post(
            "/api/hotels",
            json!({"address": "Hellscape", "phoneNumber": "1"}).to_string(),
        ),
    );
    assert_eq!(no_name.status, 400);
    let body = no_name.body.unwrap();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "name");

    let null_name = send(
        &router,
        ApiRequest::post(
            "/api/hotels",
            json!({"name": null, "address": "Hellscape", "phoneNumber": "1"}).to_string(),
        ),
    );
    assert_eq!(null_name.status, 400);
    assert_eq!(null_name.body.unwrap()["field"], "name");

    let mut room = json!({
        "roomNumber": 101,
        "hotelId": 1,
        "numberOfBeds": 2,
        "roomTypeId": 1,
        "bedTypeId": 1
    });
    let no_rate = send(&router, ApiRequest::post("/api/hotel-rooms", room.to_string()));
    assert_eq!(no_rate.status, 400);
    let body = no_rate.body.unwrap();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "nightlyRate");

    room["nightlyRate"] = json!("cheap");
    let wrong_type = send(&router, ApiRequest::post("/api/hotel-rooms", room.to_string()));
    assert_eq!(wrong_type.status, 400);
    assert_eq!(wrong_type.body.unwrap()["error"], "malformed_body");

    let rooms = send(&router, ApiRequest::get("/api/hotels/1/rooms"));
    assert!(rooms.body.unwrap().as_array().unwrap().is_empty());
}

#[test]
fn unknown_routes_and_methods() {
    let (_dir, router) = router();

    let missing = send(&router, ApiRequest::get("/api/guests"));
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body.unwrap()["error"], "route_not_found");

    let wrong_method = send(&router, ApiRequest::delete("/api/hotels"));
    assert_eq!(wrong_method.status, 405);

    let read_only = send(&router, ApiRequest::post("/api/room-types", "{}"));
    assert_eq!(read_only.status, 405);
}

#[test]
fn nested_lists_of_missing_parents_are_not_found() {
    let (_dir, router) = router();

    assert_eq!(send(&router, ApiRequest::get("/api/hotels/5/rooms")).status, 404);
    assert_eq!(
        send(&router, ApiRequest::get("/api/hotel-rooms/5/1/reservations")).status,
        404
    );
}

#[test]
fn lookup_lists_are_served() {
    let (_dir, router) = router();

    let room_types = send(&router, ApiRequest::get("/api/room-types"));
    assert_eq!(room_types.status, 200);
    assert_eq!(
        room_types.body.unwrap(),
        json!([
            {"id": 1, "name": "Standard"},
            {"id": 2, "name": "Deluxe"},
            {"id": 3, "name": "Suite"}
        ])
    );

    let bed_types = send(&router, ApiRequest::get("/api/bed-types"));
    assert_eq!(bed_types.body.unwrap().as_array().unwrap().len(), 3);
}

#[test]
fn unopenable_database_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(ApiConfig::new(dir.path().join("missing").join("db.sqlite3")));

    let response = router.handle(&ApiRequest::get("/api/hotels"));
    assert_eq!(response.status, 500);
    assert!(!response.is_success());
    assert_eq!(response.body.unwrap()["message"], "internal server error");
}
