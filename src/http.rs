use crate::backend::{AvailabilityBackend, BookingBackend, Directory};
use crate::booking::BookingEngine;
use crate::context::RequestContext;
use crate::error::BookingError;
use crate::ledger::AvailabilityLedger;
use crate::notification::Notifier;
use crate::types::{AvailabilitySlot, NewBooking, Occupancy};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Json, Router,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref TIME_SLOT_RE: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

#[derive(Clone)]
pub struct AppState<S, N> {
    ledger: AvailabilityLedger<S>,
    engine: BookingEngine<S, N>,
    operation_timeout: Duration,
}

impl<S, N> AppState<S, N>
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    pub fn new(
        ledger: AvailabilityLedger<S>,
        engine: BookingEngine<S, N>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            engine,
            operation_timeout,
        }
    }

    /// Honors an inbound `x-request-id` header, otherwise assigns one.
    fn context(&self, headers: &HeaderMap) -> RequestContext {
        headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .map(RequestContext::with_request_id)
            .unwrap_or_default()
            .with_deadline(self.operation_timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct PublishSlotRequest {
    date: NaiveDate,
    #[validate(regex(path = *TIME_SLOT_RE))]
    time_slot: String,
    #[validate(range(min = 1))]
    capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AvailabilityQuery {
    date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdjustSeatsRequest {
    delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckAvailabilityQuery {
    date: NaiveDate,
    time_slot: String,
    guests_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct CreateBookingRequest {
    restaurant_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    #[validate(regex(path = *TIME_SLOT_RE))]
    time: String,
    #[validate(range(min = 1))]
    duration_minutes: i32,
    #[validate(range(min = 1))]
    guests_count: i32,
    #[serde(default)]
    #[validate(length(max = 500))]
    comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct RejectBookingRequest {
    #[serde(default)]
    #[validate(length(max = 500))]
    reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct SuggestAlternativeRequest {
    date: NaiveDate,
    #[validate(regex(path = *TIME_SLOT_RE))]
    time: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotResponse {
    #[serde(flatten)]
    slot: AvailabilitySlot,
    available_seats: i32,
    occupancy: Occupancy,
}

impl From<AvailabilitySlot> for SlotResponse {
    fn from(slot: AvailabilitySlot) -> Self {
        let available_seats = slot.available_seats();
        let occupancy = slot.occupancy();
        Self {
            slot,
            available_seats,
            occupancy,
        }
    }
}

pub fn router<S, N>(state: AppState<S, N>) -> Router
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/restaurants/:id/availability",
            get(get_availability::<S, N>).post(publish_slot::<S, N>),
        )
        .route(
            "/restaurants/:id/availability/check",
            get(check_availability::<S, N>),
        )
        .route(
            "/availability/:slot_id/adjust",
            post(adjust_reserved_seats::<S, N>),
        )
        .route("/restaurants/:id/bookings", get(restaurant_bookings::<S, N>))
        .route("/users/:id/bookings", get(user_bookings::<S, N>))
        .route("/bookings", post(create_booking::<S, N>))
        .route("/bookings/:id", get(get_booking::<S, N>))
        .route("/bookings/:id/confirm", post(confirm_booking::<S, N>))
        .route("/bookings/:id/reject", post(reject_booking::<S, N>))
        .route("/bookings/:id/cancel", post(cancel_booking::<S, N>))
        .route("/bookings/:id/complete", post(complete_booking::<S, N>))
        .route("/bookings/:id/alternatives", post(suggest_alternative::<S, N>))
        .route("/alternatives/:id/accept", post(accept_alternative::<S, N>))
        .route("/alternatives/:id/reject", post(reject_alternative::<S, N>))
        .with_state(state)
        .layer(cors)
}

pub async fn serve<S, N>(state: AppState<S, N>, listener: TcpListener)
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    axum::serve(listener, router(state)).await.unwrap();
}

/// One stable status per error kind; adapters never inspect messages.
fn error_response(err: BookingError) -> (StatusCode, String) {
    let status = match &err {
        BookingError::RestaurantNotFound(_)
        | BookingError::UserNotFound(_)
        | BookingError::BookingNotFound(_)
        | BookingError::SlotNotFound(_)
        | BookingError::AlternativeNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::InvalidBookingStatus { .. }
        | BookingError::NoAvailability { .. }
        | BookingError::InsufficientCapacity { .. }
        | BookingError::Conflict => StatusCode::CONFLICT,
        BookingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

async fn get_availability<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.ledger.slots_for_date(&ctx, restaurant_id, query.date) {
        Ok(slots) => {
            let slots: Vec<SlotResponse> = slots.into_iter().map(SlotResponse::from).collect();
            Json(slots).into_response()
        }
        Err(err) => error_response(err).into_response(),
    }
}

async fn publish_slot<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<PublishSlotRequest>>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.ledger.publish_slot(
        &ctx,
        restaurant_id,
        request.date,
        &request.time_slot,
        request.capacity,
    ) {
        Ok(slot) => Json(SlotResponse::from(slot)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn adjust_reserved_seats<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<AdjustSeatsRequest>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.ledger.adjust_reserved_seats(&ctx, slot_id, request.delta) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn check_availability<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<CheckAvailabilityQuery>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.ledger.check_availability(
        &ctx,
        restaurant_id,
        query.date,
        &query.time_slot,
        query.guests_count,
    ) {
        Ok(available) => Json(serde_json::json!({ "available": available })).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn restaurant_bookings<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.bookings_for_restaurant(&ctx, restaurant_id) {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn user_bookings<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.bookings_for_user(&ctx, user_id) {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn create_booking<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Valid(Json(request)): Valid<Json<CreateBookingRequest>>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    let new = NewBooking {
        restaurant_id: request.restaurant_id,
        user_id: request.user_id,
        date: request.date,
        time: request.time,
        duration_minutes: request.duration_minutes,
        guests_count: request.guests_count,
        comment: request.comment,
    };
    match state.engine.create_booking(&ctx, new) {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn get_booking<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.booking(&ctx, id) {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn confirm_booking<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.confirm_booking(&ctx, id) {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn reject_booking<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<RejectBookingRequest>>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.reject_booking(&ctx, id, &request.reason) {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn cancel_booking<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.cancel_booking(&ctx, id) {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn complete_booking<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.complete_booking(&ctx, id) {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn suggest_alternative<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<SuggestAlternativeRequest>>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state
        .engine
        .suggest_alternative_time(&ctx, id, request.date, &request.time, &request.message)
    {
        Ok(alternative) => (StatusCode::CREATED, Json(alternative)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn accept_alternative<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.accept_alternative(&ctx, id) {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn reject_alternative<S, N>(
    State(state): State<AppState<S, N>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    let ctx = state.context(&headers);
    match state.engine.reject_alternative(&ctx, id) {
        Ok(alternative) => Json(alternative).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_store::LocalStore;
    use crate::testutils::RecordingNotifier;
    use crate::types::BookingStatus;
    use futures::future::join_all;
    use reqwest::Client;
    use std::net::SocketAddr;
    use tokio::task::JoinHandle;

    struct TestServer {
        addr: SocketAddr,
        handle: JoinHandle<()>,
        store: LocalStore,
        restaurant_id: Uuid,
        user_id: Uuid,
    }

    async fn init() -> TestServer {
        let store = LocalStore::default();
        let notifier = RecordingNotifier::new();
        let restaurant_id = store.register_restaurant();
        let user_id = store.register_user();

        let state = AppState::new(
            AvailabilityLedger::new(store.clone()),
            BookingEngine::new(store.clone(), notifier),
            Duration::from_secs(5),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(serve(state, listener));

        TestServer {
            addr,
            handle,
            store,
            restaurant_id,
            user_id,
        }
    }

    fn publish_body(capacity: i32) -> serde_json::Value {
        serde_json::json!({
            "date": "2025-04-15",
            "time_slot": "19:00",
            "capacity": capacity,
        })
    }

    fn booking_body(server: &TestServer, guests_count: i32) -> serde_json::Value {
        serde_json::json!({
            "restaurant_id": server.restaurant_id,
            "user_id": server.user_id,
            "date": "2025-04-15",
            "time": "19:00",
            "duration_minutes": 120,
            "guests_count": guests_count,
            "comment": "window table",
        })
    }

    async fn create_booking(client: &Client, server: &TestServer, guests_count: i32) -> Uuid {
        let response = client
            .post(format!("http://{}/bookings", server.addr))
            .json(&booking_body(server, guests_count))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED.as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn publish_and_list_availability() {
        let server = init().await;
        let client = Client::new();

        let response = client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(20))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());

        let response = client
            .get(format!(
                "http://{}/restaurants/{}/availability?date=2025-04-15",
                server.addr, server.restaurant_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        let slots: serde_json::Value = response.json().await.unwrap();
        assert_eq!(slots.as_array().unwrap().len(), 1);
        assert_eq!(slots[0]["time_slot"], "19:00");
        assert_eq!(slots[0]["available_seats"], 20);
        assert_eq!(slots[0]["occupancy"], "available");

        server.handle.abort();
    }

    #[tokio::test]
    async fn booking_lifecycle_over_http() {
        let server = init().await;
        let client = Client::new();
        client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(20))
            .send()
            .await
            .unwrap();

        let booking_id = create_booking(&client, &server, 4).await;

        let response = client
            .post(format!("http://{}/bookings/{}/confirm", server.addr, booking_id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "confirmed");

        assert_eq!(
            server.store.booking(booking_id).unwrap().status,
            BookingStatus::Confirmed
        );
        server.handle.abort();
    }

    #[tokio::test]
    async fn error_kinds_map_to_stable_statuses() {
        let server = init().await;
        let client = Client::new();
        client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(20))
            .send()
            .await
            .unwrap();

        // unknown booking -> 404
        let response = client
            .post(format!("http://{}/bookings/{}/confirm", server.addr, Uuid::new_v4()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        // illegal transition -> 409
        let booking_id = create_booking(&client, &server, 2).await;
        client
            .post(format!("http://{}/bookings/{}/confirm", server.addr, booking_id))
            .send()
            .await
            .unwrap();
        let response = client
            .post(format!("http://{}/bookings/{}/confirm", server.addr, booking_id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT.as_u16());

        // exhausted capacity -> 409
        let response = client
            .post(format!("http://{}/bookings", server.addr))
            .json(&booking_body(&server, 19))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT.as_u16());

        // unknown restaurant publishing -> 404
        let response = client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr,
                Uuid::new_v4()
            ))
            .json(&publish_body(20))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        server.handle.abort();
    }

    #[test_case::test_case(serde_json::json!({
        "date": "2025-04-15", "time_slot": "25:00", "capacity": 10
    }); "malformed time slot")]
    #[test_case::test_case(serde_json::json!({
        "date": "2025-04-15", "time_slot": "19:00", "capacity": 0
    }); "zero capacity")]
    #[tokio::test]
    async fn invalid_publish_payloads_never_reach_the_ledger(body: serde_json::Value) {
        let server = init().await;
        let client = Client::new();

        let response = client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST.as_u16());

        let slots = server
            .store
            .slots_by_restaurant_and_date(
                server.restaurant_id,
                NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            )
            .unwrap();
        assert!(slots.is_empty());
        server.handle.abort();
    }

    #[tokio::test]
    async fn check_availability_reports_free_seats() {
        let server = init().await;
        let client = Client::new();
        client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(4))
            .send()
            .await
            .unwrap();

        let url = format!(
            "http://{}/restaurants/{}/availability/check?date=2025-04-15&time_slot=19:00&guests_count=4",
            server.addr, server.restaurant_id
        );
        let body: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
        assert_eq!(body["available"], true);

        let url = format!(
            "http://{}/restaurants/{}/availability/check?date=2025-04-15&time_slot=21:00&guests_count=1",
            server.addr, server.restaurant_id
        );
        let body: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
        assert_eq!(body["available"], false);

        server.handle.abort();
    }

    #[tokio::test]
    async fn seat_adjustments_over_http() {
        let server = init().await;
        let client = Client::new();
        let response = client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(20))
            .send()
            .await
            .unwrap();
        let slot: serde_json::Value = response.json().await.unwrap();
        let slot_id = slot["id"].as_str().unwrap();

        let response = client
            .post(format!("http://{}/availability/{}/adjust", server.addr, slot_id))
            .json(&serde_json::json!({ "delta": 4 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT.as_u16());

        let response = client
            .get(format!(
                "http://{}/restaurants/{}/availability?date=2025-04-15",
                server.addr, server.restaurant_id
            ))
            .send()
            .await
            .unwrap();
        let slots: serde_json::Value = response.json().await.unwrap();
        assert_eq!(slots[0]["reserved"], 4);

        // unknown slot -> 404
        let response = client
            .post(format!(
                "http://{}/availability/{}/adjust",
                server.addr,
                Uuid::new_v4()
            ))
            .json(&serde_json::json!({ "delta": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        server.handle.abort();
    }

    #[tokio::test]
    async fn alternative_negotiation_over_http() {
        let server = init().await;
        let client = Client::new();
        client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(20))
            .send()
            .await
            .unwrap();
        let booking_id = create_booking(&client, &server, 2).await;

        let response = client
            .post(format!(
                "http://{}/bookings/{}/alternatives",
                server.addr, booking_id
            ))
            .json(&serde_json::json!({
                "date": "2025-04-16", "time": "20:30", "message": "evening is full"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED.as_u16());
        let alternative: serde_json::Value = response.json().await.unwrap();
        let alternative_id = alternative["id"].as_str().unwrap();

        let response = client
            .post(format!(
                "http://{}/alternatives/{}/accept",
                server.addr, alternative_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        let booking: serde_json::Value = response.json().await.unwrap();
        assert_eq!(booking["status"], "confirmed");
        assert_eq!(booking["date"], "2025-04-16");
        assert_eq!(booking["time"], "20:30");

        // second decision on the same offer -> 404
        let response = client
            .post(format!(
                "http://{}/alternatives/{}/reject",
                server.addr, alternative_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        server.handle.abort();
    }

    #[tokio::test]
    async fn concurrent_requests_for_the_last_seat() {
        let server = init().await;
        let client = Client::new();
        client
            .post(format!(
                "http://{}/restaurants/{}/availability",
                server.addr, server.restaurant_id
            ))
            .json(&publish_body(1))
            .send()
            .await
            .unwrap();

        let requests = (0..2).map(|_| {
            let client = client.clone();
            let url = format!("http://{}/bookings", server.addr);
            let body = booking_body(&server, 1);
            async move { client.post(url).json(&body).send().await.unwrap().status() }
        });
        let statuses: Vec<_> = join_all(requests).await;

        let created = statuses
            .iter()
            .filter(|s| s.as_u16() == StatusCode::CREATED.as_u16())
            .count();
        let conflicted = statuses
            .iter()
            .filter(|s| s.as_u16() == StatusCode::CONFLICT.as_u16())
            .count();
        assert_eq!(created, 1);
        assert_eq!(conflicted, 1);

        server.handle.abort();
    }
}
