use crate::schema::{
    addresses, cart_items, categories, coupons, delivery_status_updates, delivery_tracking,
    order_items, orders, products, users,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = addresses)]
pub struct Address {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Category))]
#[diesel(table_name = products)]
pub struct Product {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub is_trending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Discounted price when one is set, list price otherwise.
    pub fn current_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }

    /// Percent saved against the list price, truncated to a whole number.
    pub fn discount_percentage(&self) -> i32 {
        match self.discount_price {
            Some(discounted) if !self.price.is_zero() => {
                (((self.price - discounted) / self.price) * Decimal::ONE_HUNDRED)
                    .trunc()
                    .to_i32()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = cart_items)]
pub struct CartItem {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = coupons)]
pub struct Coupon {
    pub id: i32,
    pub code: String,
    pub discount_percent: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
}

impl Coupon {
    /// A coupon applies only while active and inside its validity window.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_to
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Address))]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i32,
    pub order_number: String,
    pub user_id: i32,
    pub address_id: i32,
    pub status: String,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub coupon_code: Option<String>,
    pub estimated_delivery: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = delivery_tracking)]
pub struct DeliveryTracking {
    pub id: i32,
    pub order_id: i32,
    pub current_location: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(DeliveryTracking, foreign_key = tracking_id))]
#[diesel(table_name = delivery_status_updates)]
pub struct DeliveryStatusUpdate {
    pub id: i32,
    pub tracking_id: i32,
    pub status: String,
    pub location: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// Order lifecycle states, stored as their uppercase wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(price: Decimal, discount_price: Option<Decimal>) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: 1,
            category_id: 1,
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            description: String::new(),
            price,
            discount_price,
            stock: 10,
            is_trending: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn current_price_prefers_discount() {
        let p = product(Decimal::new(1000, 2), Some(Decimal::new(750, 2)));
        assert_eq!(p.current_price(), Decimal::new(750, 2));
    }

    #[test]
    fn current_price_falls_back_to_list_price() {
        let p = product(Decimal::new(1000, 2), None);
        assert_eq!(p.current_price(), Decimal::new(1000, 2));
    }

    #[test]
    fn discount_percentage_truncates() {
        // 10.00 -> 7.50 is a 25% saving
        let p = product(Decimal::new(1000, 2), Some(Decimal::new(750, 2)));
        assert_eq!(p.discount_percentage(), 25);

        // 29.99 -> 19.99 saves 33.34%, truncated to 33
        let p = product(Decimal::new(2999, 2), Some(Decimal::new(1999, 2)));
        assert_eq!(p.discount_percentage(), 33);
    }

    #[test]
    fn discount_percentage_without_discount_is_zero() {
        let p = product(Decimal::new(1000, 2), None);
        assert_eq!(p.discount_percentage(), 0);

        let p = product(Decimal::ZERO, Some(Decimal::ZERO));
        assert_eq!(p.discount_percentage(), 0);
    }

    #[test]
    fn coupon_window_edges() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let coupon = Coupon {
            id: 1,
            code: "SAVE10".to_string(),
            discount_percent: 10,
            valid_from: from,
            valid_to: to,
            is_active: true,
        };

        assert!(coupon.is_usable_at(from));
        assert!(coupon.is_usable_at(to));
        assert!(!coupon.is_usable_at(from - chrono::Duration::seconds(1)));
        assert!(!coupon.is_usable_at(to + chrono::Duration::seconds(1)));

        let inactive = Coupon {
            is_active: false,
            ..coupon
        };
        assert!(!inactive.is_usable_at(from));
    }

    #[test]
    fn order_status_round_trips() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("LOST_IN_TRANSIT"), None);
    }
}
