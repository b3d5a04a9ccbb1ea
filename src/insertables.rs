use chrono::{DateTime, NaiveDate, Utc};
use diesel::Insertable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_api::schema::{
    addresses, cart_items, categories, coupons, delivery_status_updates, delivery_tracking,
    order_items, orders, products, users,
};

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = addresses)]
pub struct NewAddress {
    pub user_id: i32,
    pub full_name: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub is_trending: bool,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = cart_items)]
pub struct NewCartItem {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = coupons)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percent: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: i32,
    pub address_id: i32,
    pub status: String,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub coupon_code: Option<String>,
    pub estimated_delivery: NaiveDate,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = delivery_tracking)]
pub struct NewDeliveryTracking {
    pub order_id: i32,
    pub current_location: String,
    pub notes: String,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = delivery_status_updates)]
pub struct NewDeliveryStatusUpdate {
    pub tracking_id: i32,
    pub status: String,
    pub location: String,
    pub notes: String,
}
