use chrono::{DateTime, Utc};
use diesel::insert_into;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use storefront_api::establish_connection;
use storefront_api::schema;
use schema::categories;
use schema::categories::dsl::*;
use schema::coupons;
use schema::coupons::dsl::*;
use schema::products;
use schema::products::dsl::*;
use schema::users;
use schema::users::dsl::*;

#[derive(Deserialize, Insertable)]
#[diesel(table_name = categories)]
struct Category {
    name: String,
    slug: String,
    description: String,
    icon: String,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = products)]
struct Product {
    category_id: i32,
    name: String,
    slug: String,
    description: String,
    price: Decimal,
    discount_price: Option<Decimal>,
    stock: i32,
    is_trending: bool,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = coupons)]
struct Coupon {
    code: String,
    discount_percent: i32,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    is_active: bool,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = users)]
struct User {
    username: String,
}

fn main() -> std::io::Result<()> {
    let connection = &mut establish_connection();
    let mut categories_json = String::new();
    let mut products_json = String::new();
    let mut coupons_json = String::new();
    let mut users_json = String::new();
    fs::File::open("src/bin/categories.json")
        .expect("can't open")
        .read_to_string(&mut categories_json)
        .unwrap();
    fs::File::open("src/bin/products.json")
        .expect("can't open")
        .read_to_string(&mut products_json)
        .unwrap();
    fs::File::open("src/bin/coupons.json")
        .expect("can't open")
        .read_to_string(&mut coupons_json)
        .unwrap();
    fs::File::open("src/bin/users.json")
        .expect("can't open")
        .read_to_string(&mut users_json)
        .unwrap();

    insert_into(categories)
        .values(serde_json::from_str::<Vec<Category>>(&categories_json).unwrap())
        .execute(connection)
        .unwrap();

    insert_into(products)
        .values(serde_json::from_str::<Vec<Product>>(&products_json).unwrap())
        .execute(connection)
        .unwrap();

    insert_into(coupons)
        .values(serde_json::from_str::<Vec<Coupon>>(&coupons_json).unwrap())
        .execute(connection)
        .unwrap();

    insert_into(users)
        .values(serde_json::from_str::<Vec<User>>(&users_json).unwrap())
        .execute(connection)
        .unwrap();
    Ok(())
}
