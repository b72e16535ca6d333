//! Pricing engine.
//!
//! Pure functions that derive every monetary field of a booking. The quote
//! endpoints and the create/update paths call the same functions, so a quote
//! and the persisted booking can never disagree.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Serialize;
use uuid::Uuid;

use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("check-out date {check_out} must be after check-in date {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("{field} must be a positive integer, got {value}")]
    InvalidQuantity { field: &'static str, value: i64 },
    #[error("discount {0} must be a fraction between 0 and 1")]
    InvalidDiscount(Decimal),
    #[error("distance {0} km must be positive with at most 3 decimal places")]
    InvalidDistance(Decimal),
    #[error("menu items {} do not exist", format_ids(.ids))]
    UnknownMenuItem { ids: Vec<Uuid> },
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ")
}

fn positive_count(field: &'static str, value: i64) -> Result<u32, PricingError> {
    u32::try_from(value)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(PricingError::InvalidQuantity { field, value })
}

// ============ Rooms ============

/// `nightly × nights` for an explicit night count (the "number of days" quote).
pub fn price_nights(nightly_price: Money, nights: i64) -> Result<Money, PricingError> {
    let nights = positive_count("number_of_days", nights)?;
    Ok(nightly_price.times(nights))
}

/// `nightly × (check_out − check_in).days`; check-out must be strictly later.
pub fn price_room_stay(
    nightly_price: Money,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Money, PricingError> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(PricingError::InvalidDateRange {
            check_in,
            check_out,
        });
    }

    price_nights(nightly_price, nights)
}

// ============ Event tickets ============

/// A promotion as seen by the pricing engine. `discount` is the fraction removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub id: Uuid,
    pub discount: Decimal,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl Promotion {
    /// The validity window is inclusive on both ends.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }
}

/// Picks the promotion with the largest discount among those active on `date`.
/// Ties go to the lowest id so the choice is deterministic.
pub fn select_promotion(promotions: &[Promotion], date: NaiveDate) -> Option<&Promotion> {
    promotions
        .iter()
        .filter(|p| p.is_active_on(date))
        .min_by(|a, b| b.discount.cmp(&a.discount).then_with(|| a.id.cmp(&b.id)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketQuote {
    pub tickets: u32,
    pub base_amount: Money,
    pub discount: Decimal,
    pub discount_amount: Money,
    pub total_amount: Money,
}

pub fn price_event_tickets(
    entry_fee: Money,
    tickets: i64,
    promotion: Option<&Promotion>,
) -> Result<TicketQuote, PricingError> {
    let tickets = positive_count("number_of_tickets", tickets)?;
    let base_amount = entry_fee.times(tickets).round();

    let discount = match promotion {
        Some(p) if p.discount < Decimal::ZERO || p.discount > Decimal::ONE => {
            return Err(PricingError::InvalidDiscount(p.discount));
        }
        Some(p) => p.discount,
        None => Decimal::ZERO,
    };

    // The total is rounded once; the discount amount is whatever it removed.
    let total_amount = base_amount.scale(Decimal::ONE - discount).round();

    Ok(TicketQuote {
        tickets,
        base_amount,
        discount,
        discount_amount: base_amount - total_amount,
        total_amount,
    })
}

// ============ Restaurant orders ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogItem {
    pub price: Money,
    pub restaurant_id: Uuid,
}

/// Live menu prices keyed by menu item id.
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: HashMap<Uuid, CatalogItem>,
}

impl MenuCatalog {
    pub fn insert(&mut self, menu_item_id: Uuid, item: CatalogItem) {
        self.items.insert(menu_item_id, item);
    }

    pub fn get(&self, menu_item_id: &Uuid) -> Option<&CatalogItem> {
        self.items.get(menu_item_id)
    }
}

impl FromIterator<(Uuid, CatalogItem)> for MenuCatalog {
    fn from_iter<I: IntoIterator<Item = (Uuid, CatalogItem)>>(iter: I) -> Self {
        MenuCatalog {
            items: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub menu_item_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineResult {
    pub menu_item_id: Uuid,
    pub restaurant_id: Uuid,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderQuote {
    pub lines: Vec<LineResult>,
    pub total_amount: Money,
}

/// Prices every line against the catalog. Quantities are validated first;
/// then every missing menu item is reported at once, sorted.
pub fn price_order(items: &[OrderLine], catalog: &MenuCatalog) -> Result<OrderQuote, PricingError> {
    let quantities = items
        .iter()
        .map(|line| positive_count("quantity", line.quantity))
        .collect::<Result<Vec<_>, _>>()?;

    let missing: BTreeSet<Uuid> = items
        .iter()
        .filter(|line| catalog.get(&line.menu_item_id).is_none())
        .map(|line| line.menu_item_id)
        .collect();
    if !missing.is_empty() {
        return Err(PricingError::UnknownMenuItem {
            ids: missing.into_iter().collect(),
        });
    }

    let mut lines = Vec::with_capacity(items.len());
    for (line, quantity) in items.iter().zip(quantities) {
        let Some(item) = catalog.get(&line.menu_item_id) else {
            continue;
        };
        lines.push(LineResult {
            menu_item_id: line.menu_item_id,
            restaurant_id: item.restaurant_id,
            unit_price: item.price,
            quantity,
            subtotal: item.price.times(quantity),
        });
    }

    let total_amount = lines.iter().map(|l| l.subtotal).sum::<Money>().round();
    Ok(OrderQuote {
        lines,
        total_amount,
    })
}

// ============ Tours ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourQuote {
    pub persons: u32,
    pub total_price: Money,
}

pub fn price_tour(price_per_person: Money, persons: i64) -> Result<TourQuote, PricingError> {
    let persons = positive_count("persons", persons)?;
    Ok(TourQuote {
        persons,
        total_price: price_per_person.times(persons).round(),
    })
}

// ============ Rides ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideQuote {
    pub distance_m: u32,
    pub estimated_fare: Money,
}

/// `base_fare + price_per_km × distance`, with the distance resolved to whole
/// metres.
pub fn price_ride(
    base_fare: Money,
    price_per_km: Money,
    distance_km: Decimal,
) -> Result<RideQuote, PricingError> {
    let metres = distance_km * Decimal::ONE_THOUSAND;
    let distance_m = Some(metres)
        .filter(|m| *m > Decimal::ZERO && m.fract().is_zero())
        .and_then(|m| m.to_u32())
        .ok_or(PricingError::InvalidDistance(distance_km))?;

    Ok(RideQuote {
        distance_m,
        estimated_fare: (base_fare + price_per_km.scale(distance_km)).round(),
    })
}

/// Kilometres for a stored metre count, without trailing zeros.
pub fn distance_km(distance_m: u32) -> Decimal {
    Decimal::new(i64::from(distance_m), 3).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn promotion(id: u128, discount: &str, starts: &str, ends: &str) -> Promotion {
        Promotion {
            id: Uuid::from_u128(id),
            discount: discount.parse().unwrap(),
            starts_on: date(starts),
            ends_on: date(ends),
        }
    }

    #[test]
    fn test_room_stay_two_nights() {
        let total = price_room_stay(money("100.00"), date("2024-03-01"), date("2024-03-03"));
        assert_eq!(total, Ok(money("200.00")));
    }

    #[test]
    fn test_room_stay_rejects_empty_or_inverted_range() {
        let same_day = price_room_stay(money("100.00"), date("2024-03-01"), date("2024-03-01"));
        assert!(matches!(same_day, Err(PricingError::InvalidDateRange { .. })));

        let inverted = price_room_stay(money("100.00"), date("2024-03-05"), date("2024-03-01"));
        assert!(matches!(inverted, Err(PricingError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_room_stay_across_month_boundary() {
        let total = price_room_stay(money("89.90"), date("2024-02-27"), date("2024-03-02"));
        // 2024 is a leap year: 27, 28, 29 Feb and 1 Mar.
        assert_eq!(total, Ok(money("359.60")));
    }

    #[test]
    fn test_price_nights_requires_positive_count() {
        assert_eq!(
            price_nights(money("50"), 0),
            Err(PricingError::InvalidQuantity {
                field: "number_of_days",
                value: 0
            })
        );
        assert_eq!(price_nights(money("50"), 3), Ok(money("150")));
    }

    #[test]
    fn test_tickets_without_promotion() {
        let quote = price_event_tickets(money("50.00"), 2, None).unwrap();
        assert_eq!(quote.base_amount, money("100.00"));
        assert_eq!(quote.discount_amount, Money::ZERO);
        assert_eq!(quote.total_amount, money("100.00"));
    }

    #[test]
    fn test_tickets_with_promotion() {
        let promo = promotion(1, "0.20", "2024-01-01", "2024-12-31");
        let quote = price_event_tickets(money("50.00"), 2, Some(&promo)).unwrap();
        assert_eq!(quote.base_amount, money("100.00"));
        assert_eq!(quote.discount_amount, money("20.00"));
        assert_eq!(quote.total_amount, money("80.00"));
    }

    #[test]
    fn test_tickets_total_rounds_half_up() {
        let promo = promotion(1, "0.125", "2024-01-01", "2024-12-31");
        let quote = price_event_tickets(money("0.20"), 1, Some(&promo)).unwrap();
        // 0.20 * 0.875 = 0.175 -> 0.18
        assert_eq!(quote.total_amount, money("0.18"));
        assert_eq!(quote.discount_amount, money("0.02"));
    }

    #[test]
    fn test_tickets_total_is_rounded_discounted_base() {
        for (fee, tickets, discount) in [
            ("0.20", 1u32, "0.125"),
            ("19.99", 7, "0.33"),
            ("0.05", 3, "0.5"),
            ("12.34", 2, "0.0375"),
        ] {
            let promo = promotion(1, discount, "2024-01-01", "2024-12-31");
            let quote =
                price_event_tickets(money(fee), i64::from(tickets), Some(&promo)).unwrap();
            let expected = money(fee)
                .times(tickets)
                .scale(Decimal::ONE - promo.discount)
                .round();
            assert_eq!(quote.total_amount, expected, "fee {fee} x {tickets} at {discount}");
            assert_eq!(quote.discount_amount + quote.total_amount, quote.base_amount);
            assert_eq!(quote.tickets, tickets);
        }
    }

    #[test]
    fn test_tickets_reject_bad_inputs() {
        assert!(matches!(
            price_event_tickets(money("50.00"), 0, None),
            Err(PricingError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            price_event_tickets(money("50.00"), -5, None),
            Err(PricingError::InvalidQuantity { .. })
        ));

        let too_big = promotion(1, "1.50", "2024-01-01", "2024-12-31");
        assert_eq!(
            price_event_tickets(money("50.00"), 1, Some(&too_big)),
            Err(PricingError::InvalidDiscount("1.50".parse().unwrap()))
        );
    }

    #[test]
    fn test_tickets_are_stable_across_runs() {
        let promo = promotion(1, "0.33", "2024-01-01", "2024-12-31");
        let first = price_event_tickets(money("19.99"), 7, Some(&promo)).unwrap();
        for _ in 0..100 {
            assert_eq!(price_event_tickets(money("19.99"), 7, Some(&promo)).unwrap(), first);
        }
    }

    #[test]
    fn test_select_promotion_window_is_inclusive() {
        let promos = vec![promotion(1, "0.10", "2024-03-01", "2024-03-10")];
        assert!(select_promotion(&promos, date("2024-03-01")).is_some());
        assert!(select_promotion(&promos, date("2024-03-10")).is_some());
        assert!(select_promotion(&promos, date("2024-02-29")).is_none());
        assert!(select_promotion(&promos, date("2024-03-11")).is_none());
    }

    #[test]
    fn test_select_promotion_prefers_largest_then_lowest_id() {
        let promos = vec![
            promotion(3, "0.25", "2024-03-01", "2024-03-31"),
            promotion(2, "0.25", "2024-03-01", "2024-03-31"),
            promotion(1, "0.10", "2024-03-01", "2024-03-31"),
            promotion(4, "0.50", "2024-04-01", "2024-04-30"),
        ];
        let chosen = select_promotion(&promos, date("2024-03-15")).unwrap();
        assert_eq!(chosen.id, Uuid::from_u128(2));
    }

    fn catalog() -> MenuCatalog {
        let restaurant = Uuid::from_u128(100);
        [
            (
                Uuid::from_u128(1),
                CatalogItem {
                    price: money("10.00"),
                    restaurant_id: restaurant,
                },
            ),
            (
                Uuid::from_u128(2),
                CatalogItem {
                    price: money("5.00"),
                    restaurant_id: restaurant,
                },
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_order_total() {
        let items = [
            OrderLine {
                menu_item_id: Uuid::from_u128(1),
                quantity: 2,
            },
            OrderLine {
                menu_item_id: Uuid::from_u128(2),
                quantity: 3,
            },
        ];
        let quote = price_order(&items, &catalog()).unwrap();
        assert_eq!(quote.total_amount, money("35.00"));
        assert_eq!(quote.lines[0].subtotal, money("20.00"));
        assert_eq!(quote.lines[1].subtotal, money("15.00"));
    }

    #[test]
    fn test_order_is_commutative() {
        let items = [
            OrderLine {
                menu_item_id: Uuid::from_u128(2),
                quantity: 3,
            },
            OrderLine {
                menu_item_id: Uuid::from_u128(9),
                quantity: 1,
            },
            OrderLine {
                menu_item_id: Uuid::from_u128(1),
                quantity: 2,
            },
            OrderLine {
                menu_item_id: Uuid::from_u128(7),
                quantity: 1,
            },
        ];
        let mut reversed = items;
        reversed.reverse();

        let forward = price_order(&items, &catalog()).unwrap_err();
        let backward = price_order(&reversed, &catalog()).unwrap_err();
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            PricingError::UnknownMenuItem {
                ids: vec![Uuid::from_u128(7), Uuid::from_u128(9)]
            }
        );

        let known = [items[0], items[2]];
        let mut known_reversed = known;
        known_reversed.reverse();
        assert_eq!(
            price_order(&known, &catalog()).unwrap().total_amount,
            price_order(&known_reversed, &catalog()).unwrap().total_amount
        );
    }

    #[test]
    fn test_order_rejects_non_positive_quantity() {
        let items = [
            OrderLine {
                menu_item_id: Uuid::from_u128(1),
                quantity: 2,
            },
            OrderLine {
                menu_item_id: Uuid::from_u128(2),
                quantity: 0,
            },
        ];
        assert_eq!(
            price_order(&items, &catalog()),
            Err(PricingError::InvalidQuantity {
                field: "quantity",
                value: 0
            })
        );
    }

    #[test]
    fn test_empty_order_costs_nothing() {
        let quote = price_order(&[], &catalog()).unwrap();
        assert!(quote.lines.is_empty());
        assert_eq!(quote.total_amount, Money::ZERO);
    }

    #[test]
    fn test_tour_price() {
        assert_eq!(
            price_tour(money("45.50"), 4),
            Ok(TourQuote {
                persons: 4,
                total_price: money("182.00"),
            })
        );
        assert!(matches!(
            price_tour(money("45.50"), 0),
            Err(PricingError::InvalidQuantity { field: "persons", .. })
        ));
    }

    #[test]
    fn test_ride_fare_adds_base_and_distance() {
        let quote = price_ride(money("3.50"), money("1.20"), "12.5".parse().unwrap()).unwrap();
        assert_eq!(quote.distance_m, 12_500);
        assert_eq!(quote.estimated_fare, money("18.50"));

        // 2.10 + 0.85 * 3.333 = 4.93305
        let quote = price_ride(money("2.10"), money("0.85"), "3.333".parse().unwrap()).unwrap();
        assert_eq!(quote.estimated_fare, money("4.93"));
        assert_eq!(distance_km(quote.distance_m), "3.333".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_ride_rejects_bad_distances() {
        for distance in ["0", "-1", "0.0005", "1.2345"] {
            let distance: Decimal = distance.parse().unwrap();
            assert_eq!(
                price_ride(money("3.50"), money("1.20"), distance),
                Err(PricingError::InvalidDistance(distance))
            );
        }
    }
}
