pub mod accommodation;
pub mod auth_token;
pub mod destination;
pub mod event;
pub mod event_log;
pub mod event_promotion;
pub mod menu;
pub mod online_order;
pub mod order_item;
pub mod restaurant;
pub mod ride_booking;
pub mod room_booking;
pub mod room_type;
pub mod tour;
pub mod tour_booking;
pub mod transportation_provider;
pub mod user;
pub mod venue_booking;
