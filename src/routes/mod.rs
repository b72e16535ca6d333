use std::any::Any;

use axum::{
    http::Method,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::audit::{self, Action, ActivityRegistry, Resource};
use crate::error::AppError;
use crate::handlers::{
    accommodation, dining, event_logs, events, online_orders, ride_bookings, room_bookings,
    tour_bookings, tours, transport, users, venue_bookings,
};
use crate::middleware::auth::{admin_or_read_only, identify, require_admin, require_auth};
use crate::middleware::envelope::wrap_response;
use crate::AppState;

const USERS: &str = "/api/users";
const USER_TOKEN: &str = "/api/users/token";
const USER_ME: &str = "/api/users/me";
const USER_LOGOUT: &str = "/api/users/logout";

const ACCOMMODATIONS: &str = "/api/accommodations";
const ACCOMMODATION: &str = "/api/accommodations/{id}";
const ROOM_TYPES: &str = "/api/room-types";
const ROOM_TYPE: &str = "/api/room-types/{id}";
const EVENTS: &str = "/api/events";
const EVENT: &str = "/api/events/{id}";
const PROMOTIONS: &str = "/api/event-promotions";
const PROMOTION: &str = "/api/event-promotions/{id}";
const RESTAURANTS: &str = "/api/restaurants";
const RESTAURANT: &str = "/api/restaurants/{id}";
const MENUS: &str = "/api/menus";
const MENU: &str = "/api/menus/{id}";
const DESTINATIONS: &str = "/api/destinations";
const DESTINATION: &str = "/api/destinations/{id}";
const TOURS: &str = "/api/tours";
const TOUR: &str = "/api/tours/{id}";
const PROVIDERS: &str = "/api/transportation-providers";
const PROVIDER: &str = "/api/transportation-providers/{id}";

const ROOM_BOOKINGS: &str = "/api/room-bookings";
const ROOM_BOOKING: &str = "/api/room-bookings/{id}";
const ROOM_QUOTE: &str = "/api/room-bookings/calculate-price";
const VENUE_BOOKINGS: &str = "/api/venue-bookings";
const VENUE_BOOKING: &str = "/api/venue-bookings/{id}";
const VENUE_QUOTE: &str = "/api/venue-bookings/calculate-price";
const ONLINE_ORDERS: &str = "/api/online-orders";
const ONLINE_ORDER: &str = "/api/online-orders/{id}";
const ORDER_QUOTE: &str = "/api/online-orders/calculate-price";
const TOUR_BOOKINGS: &str = "/api/tour-bookings";
const TOUR_BOOKING: &str = "/api/tour-bookings/{id}";
const TOUR_QUOTE: &str = "/api/tour-bookings/calculate-price";
const RIDE_BOOKINGS: &str = "/api/ride-bookings";
const RIDE_BOOKING: &str = "/api/ride-bookings/{id}";

const EVENT_LOGS: &str = "/api/event-logs";
const EVENT_LOGS_CSV: &str = "/api/event-logs/export/csv";
const EVENT_LOGS_XES: &str = "/api/event-logs/export/xes";

const USER: Resource = Resource::named("UserResource");
const ACCOMMODATION_RESOURCE: Resource = Resource::named("AccommodationResource");
const ROOM_TYPE_RESOURCE: Resource = Resource::named("RoomTypeResource").display_as("Room Type");
const EVENT_RESOURCE: Resource = Resource::named("EventResource");
const PROMOTION_RESOURCE: Resource =
    Resource::named("EventPromotionResource").display_as("Event Promotion");
const RESTAURANT_RESOURCE: Resource = Resource::named("RestaurantResource");
const MENU_RESOURCE: Resource = Resource::named("MenuResource");
const DESTINATION_RESOURCE: Resource = Resource::named("DestinationResource");
const TOUR_RESOURCE: Resource = Resource::named("TourResource");
const PROVIDER_RESOURCE: Resource =
    Resource::named("TransportationProviderResource").display_as("Transportation Provider");
const ROOM_BOOKING_RESOURCE: Resource =
    Resource::named("RoomBookingResource").display_as("Room Booking");
const VENUE_BOOKING_RESOURCE: Resource =
    Resource::named("VenueBookingResource").display_as("Venue Booking");
const ONLINE_ORDER_RESOURCE: Resource =
    Resource::named("OnlineOrderResource").display_as("Online Order");
const TOUR_BOOKING_RESOURCE: Resource =
    Resource::named("TourBookingResource").display_as("Tour Booking");
const RIDE_BOOKING_RESOURCE: Resource =
    Resource::named("RideBookingResource").display_as("Ride Booking");
const EVENT_LOG_RESOURCE: Resource = Resource::named("EventLogResource").display_as("Event Log");

/// Audit names for every routed endpoint. Paths are the route templates
/// registered in [`api_routes`].
pub fn activity_registry() -> ActivityRegistry {
    let mut registry = ActivityRegistry::new();
    let calculate_price = Action::Custom("calculate_price");

    registry
        .register(Method::POST, USERS, USER, Action::Create)
        .register(Method::POST, USER_TOKEN, USER, Action::Custom("login"))
        .register(Method::GET, USER_ME, USER, Action::Custom("me"))
        .register(Method::POST, USER_LOGOUT, USER, Action::Custom("logout"));

    for (collection, detail, resource) in [
        (ACCOMMODATIONS, ACCOMMODATION, ACCOMMODATION_RESOURCE),
        (ROOM_TYPES, ROOM_TYPE, ROOM_TYPE_RESOURCE),
        (EVENTS, EVENT, EVENT_RESOURCE),
        (PROMOTIONS, PROMOTION, PROMOTION_RESOURCE),
        (RESTAURANTS, RESTAURANT, RESTAURANT_RESOURCE),
        (MENUS, MENU, MENU_RESOURCE),
        (DESTINATIONS, DESTINATION, DESTINATION_RESOURCE),
        (TOURS, TOUR, TOUR_RESOURCE),
        (PROVIDERS, PROVIDER, PROVIDER_RESOURCE),
        (ROOM_BOOKINGS, ROOM_BOOKING, ROOM_BOOKING_RESOURCE),
        (VENUE_BOOKINGS, VENUE_BOOKING, VENUE_BOOKING_RESOURCE),
        (ONLINE_ORDERS, ONLINE_ORDER, ONLINE_ORDER_RESOURCE),
        (TOUR_BOOKINGS, TOUR_BOOKING, TOUR_BOOKING_RESOURCE),
        (RIDE_BOOKINGS, RIDE_BOOKING, RIDE_BOOKING_RESOURCE),
    ] {
        registry.collection(collection, resource).detail(detail, resource);
    }

    for (path, resource) in [
        (ROOM_QUOTE, ROOM_BOOKING_RESOURCE),
        (VENUE_QUOTE, VENUE_BOOKING_RESOURCE),
        (ORDER_QUOTE, ONLINE_ORDER_RESOURCE),
        (TOUR_QUOTE, TOUR_BOOKING_RESOURCE),
    ] {
        registry.register(Method::POST, path, resource, calculate_price);
    }

    registry
        .register(Method::GET, EVENT_LOGS, EVENT_LOG_RESOURCE, Action::List)
        .register(Method::DELETE, EVENT_LOGS, EVENT_LOG_RESOURCE, Action::Custom("clear"))
        .register(Method::GET, EVENT_LOGS_CSV, EVENT_LOG_RESOURCE, Action::Custom("export_csv"))
        .register(Method::GET, EVENT_LOGS_XES, EVENT_LOG_RESOURCE, Action::Custom("export_xes"));

    registry
}

fn handler_panicked(_: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Internal("Handler panicked".to_string()).into_response()
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found.".to_string())
}

pub fn create_router(state: AppState) -> Router {
    with_app_layers(api_routes(), state)
}

/// Every endpoint with its guard, before the global layers are applied.
pub fn api_routes() -> Router<AppState> {
    // Registration and login
    let public_routes = Router::new()
        .route(USERS, post(users::register))
        .route(USER_TOKEN, post(users::login))
        .route(ROOM_QUOTE, post(room_bookings::calculate_price));

    let account_routes = Router::new()
        .route(USER_ME, get(users::me))
        .route(USER_LOGOUT, post(users::logout))
        .route_layer(middleware::from_fn(require_auth));

    // Catalog: anyone may read, staff may write
    let catalog_routes = Router::new()
        .route(
            ACCOMMODATIONS,
            get(accommodation::list_accommodations).post(accommodation::create_accommodation),
        )
        .route(
            ACCOMMODATION,
            get(accommodation::get_accommodation)
                .put(accommodation::update_accommodation)
                .delete(accommodation::delete_accommodation),
        )
        .route(
            ROOM_TYPES,
            get(accommodation::list_room_types).post(accommodation::create_room_type),
        )
        .route(
            ROOM_TYPE,
            get(accommodation::get_room_type)
                .put(accommodation::update_room_type)
                .delete(accommodation::delete_room_type),
        )
        .route(EVENTS, get(events::list_events).post(events::create_event))
        .route(
            EVENT,
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            PROMOTIONS,
            get(events::list_promotions).post(events::create_promotion),
        )
        .route(
            PROMOTION,
            get(events::get_promotion)
                .put(events::update_promotion)
                .delete(events::delete_promotion),
        )
        .route(
            RESTAURANTS,
            get(dining::list_restaurants).post(dining::create_restaurant),
        )
        .route(
            RESTAURANT,
            get(dining::get_restaurant)
                .put(dining::update_restaurant)
                .delete(dining::delete_restaurant),
        )
        .route(MENUS, get(dining::list_menus).post(dining::create_menu))
        .route(
            MENU,
            get(dining::get_menu)
                .put(dining::update_menu)
                .delete(dining::delete_menu),
        )
        .route(
            DESTINATIONS,
            get(tours::list_destinations).post(tours::create_destination),
        )
        .route(
            DESTINATION,
            get(tours::get_destination)
                .put(tours::update_destination)
                .delete(tours::delete_destination),
        )
        .route(TOURS, get(tours::list_tours).post(tours::create_tour))
        .route(
            TOUR,
            get(tours::get_tour)
                .put(tours::update_tour)
                .delete(tours::delete_tour),
        )
        .route(
            PROVIDERS,
            get(transport::list_providers).post(transport::create_provider),
        )
        .route(
            PROVIDER,
            get(transport::get_provider)
                .put(transport::update_provider)
                .delete(transport::delete_provider),
        )
        .route_layer(middleware::from_fn(admin_or_read_only));

    // Bookings: owners and staff only
    let booking_routes = Router::new()
        .route(
            ROOM_BOOKINGS,
            get(room_bookings::list_bookings).post(room_bookings::create_booking),
        )
        .route(
            ROOM_BOOKING,
            get(room_bookings::get_booking)
                .put(room_bookings::update_booking)
                .patch(room_bookings::update_booking)
                .delete(room_bookings::delete_booking),
        )
        .route(
            VENUE_BOOKINGS,
            get(venue_bookings::list_bookings).post(venue_bookings::create_booking),
        )
        .route(
            VENUE_BOOKING,
            get(venue_bookings::get_booking)
                .put(venue_bookings::update_booking)
                .patch(venue_bookings::update_booking)
                .delete(venue_bookings::delete_booking),
        )
        .route(VENUE_QUOTE, post(venue_bookings::calculate_price))
        .route(
            ONLINE_ORDERS,
            get(online_orders::list_orders).post(online_orders::create_order),
        )
        .route(
            ONLINE_ORDER,
            get(online_orders::get_order)
                .put(online_orders::update_order)
                .patch(online_orders::update_order)
                .delete(online_orders::delete_order),
        )
        .route(ORDER_QUOTE, post(online_orders::calculate_price))
        .route(
            TOUR_BOOKINGS,
            get(tour_bookings::list_bookings).post(tour_bookings::create_booking),
        )
        .route(
            TOUR_BOOKING,
            get(tour_bookings::get_booking)
                .put(tour_bookings::update_booking)
                .patch(tour_bookings::update_booking)
                .delete(tour_bookings::delete_booking),
        )
        .route(TOUR_QUOTE, post(tour_bookings::calculate_price))
        .route(
            RIDE_BOOKINGS,
            get(ride_bookings::list_bookings).post(ride_bookings::create_booking),
        )
        .route(
            RIDE_BOOKING,
            get(ride_bookings::get_booking)
                .put(ride_bookings::update_booking)
                .patch(ride_bookings::update_booking)
                .delete(ride_bookings::delete_booking),
        )
        .route_layer(middleware::from_fn(require_auth));

    let admin_routes = Router::new()
        .route(
            EVENT_LOGS,
            get(event_logs::list_event_logs).delete(event_logs::clear_event_logs),
        )
        .route(EVENT_LOGS_CSV, get(event_logs::export_csv))
        .route(EVENT_LOGS_XES, get(event_logs::export_xes))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(catalog_routes)
        .merge(booking_routes)
        .merge(admin_routes)
}

/// Wraps `routes` in the identity, audit and envelope layers and binds the state.
pub fn with_app_layers(routes: Router<AppState>, state: AppState) -> Router {
    // Layers run bottom-up: identity, then audit, then the envelope around
    // the handler, with panics turned into 500s inside the audit boundary.
    routes
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handler_panicked))
        .layer(middleware::from_fn(wrap_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            audit::record_activity,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), identify))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names() {
        let registry = activity_registry();

        assert_eq!(
            registry.resolve(&Method::POST, Some(ROOM_QUOTE)).name,
            "Room Booking Calculate_price"
        );
        assert_eq!(
            registry.resolve(&Method::PATCH, Some(VENUE_BOOKING)).name,
            "Venue Booking Partial Update"
        );
        assert_eq!(
            registry.resolve(&Method::GET, Some(ACCOMMODATIONS)).name,
            "Accommodation List"
        );
        assert_eq!(
            registry.resolve(&Method::GET, Some(EVENT_LOGS_XES)).name,
            "Event Log Export_xes"
        );
        assert_eq!(
            registry.resolve(&Method::DELETE, Some(RIDE_BOOKING)).name,
            "Ride Booking Delete"
        );
        assert_eq!(
            registry.resolve(&Method::GET, Some(PROVIDERS)).name,
            "Transportation Provider List"
        );
        assert!(registry.resolve(&Method::POST, Some(USER_LOGOUT)).terminal);
        assert_eq!(
            registry.resolve(&Method::GET, None).name,
            "Unknown Activity GET"
        );
    }
}
