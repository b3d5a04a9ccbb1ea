use crate::insertables::{NewAddress, NewUser};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, Result};
use diesel::{prelude::*, r2d2};
use schema::users::dsl::*;
use serde::Deserialize;
use storefront_api::error::StoreError;
use storefront_api::models::{Address, User};
use storefront_api::schema;
use storefront_api::schema::addresses;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub user_id: i32,
}

pub fn get_all_users(conn: &mut PgConnection) -> Result<Vec<User>, StoreError> {
    let all_users = users.select(User::as_select()).load(conn)?;
    Ok(all_users)
}

pub fn get_user_by_id(conn: &mut PgConnection, _user_id: i32) -> Result<User, StoreError> {
    users
        .filter(id.eq(_user_id))
        .first::<User>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("user"))
}

pub fn insert_new_user(conn: &mut PgConnection, _username: &str) -> Result<User, StoreError> {
    let new_user = NewUser {
        username: _username.to_owned(),
    };
    let created = diesel::insert_into(users)
        .values(&new_user)
        .get_result(conn)?;
    Ok(created)
}

pub fn delete_user_by_id(conn: &mut PgConnection, _user_id: i32) -> Result<String, StoreError> {
    let deleted = diesel::delete(users.filter(id.eq(_user_id))).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("user"));
    }
    Ok("User deleted".to_string())
}

pub fn get_user_addresses(
    conn: &mut PgConnection,
    _user_id: i32,
) -> Result<Vec<Address>, StoreError> {
    let user_addresses = addresses::table
        .filter(addresses::user_id.eq(_user_id))
        .order(addresses::is_default.desc())
        .select(Address::as_select())
        .load(conn)?;
    Ok(user_addresses)
}

pub fn insert_new_address(
    conn: &mut PgConnection,
    form: &NewAddress,
) -> Result<Address, StoreError> {
    get_user_by_id(conn, form.user_id)?;
    let created = diesel::insert_into(addresses::table)
        .values(form)
        .get_result(conn)?;
    Ok(created)
}

pub fn update_address_by_id(
    conn: &mut PgConnection,
    _address_id: i32,
    form: &NewAddress,
) -> Result<Address, StoreError> {
    let address = addresses::table
        .filter(addresses::id.eq(_address_id).and(addresses::user_id.eq(form.user_id)))
        .first::<Address>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("address"))?;
    let updated = diesel::update(&address)
        .set((
            addresses::full_name.eq(&form.full_name),
            addresses::phone.eq(&form.phone),
            addresses::street_address.eq(&form.street_address),
            addresses::city.eq(&form.city),
            addresses::state.eq(&form.state),
            addresses::postal_code.eq(&form.postal_code),
            addresses::country.eq(&form.country),
            addresses::is_default.eq(form.is_default),
        ))
        .get_result(conn)?;
    Ok(updated)
}

pub fn delete_address_by_id(
    conn: &mut PgConnection,
    _user_id: i32,
    _address_id: i32,
) -> Result<String, StoreError> {
    let deleted = diesel::delete(
        addresses::table
            .filter(addresses::id.eq(_address_id).and(addresses::user_id.eq(_user_id))),
    )
    .execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("address"));
    }
    Ok("Address deleted".to_string())
}

#[get("/api/users")]
async fn get_users(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let all_users = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_all_users(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(all_users))
}

#[get("/api/users/{user_id}")]
async fn get_user(pool: web::Data<DbPool>, user_id: web::Path<i32>) -> Result<impl Responder> {
    let user = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_user_by_id(&mut conn, *user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(user))
}

#[post("/api/users")]
async fn create_user(pool: web::Data<DbPool>, form: web::Json<NewUser>) -> Result<impl Responder> {
    let user = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        insert_new_user(&mut conn, &form.username)
    })
    .await??;
    Ok(HttpResponse::Created().json(user))
}

#[delete("/api/users/{user_id}")]
async fn delete_user(pool: web::Data<DbPool>, user_id: web::Path<i32>) -> Result<impl Responder> {
    let user = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        delete_user_by_id(&mut conn, *user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/api/users/{user_id}/addresses")]
async fn get_addresses(pool: web::Data<DbPool>, user_id: web::Path<i32>) -> Result<impl Responder> {
    let user_addresses = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_user_addresses(&mut conn, *user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(user_addresses))
}

#[post("/api/addresses")]
async fn create_address(
    pool: web::Data<DbPool>,
    form: web::Json<NewAddress>,
) -> Result<impl Responder> {
    let address = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        insert_new_address(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Created().json(address))
}

#[put("/api/addresses/{address_id}")]
async fn update_address(
    pool: web::Data<DbPool>,
    address_id: web::Path<i32>,
    form: web::Json<NewAddress>,
) -> Result<impl Responder> {
    let address = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        update_address_by_id(&mut conn, *address_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(address))
}

#[delete("/api/addresses/{address_id}")]
async fn delete_address(
    pool: web::Data<DbPool>,
    address_id: web::Path<i32>,
    params: web::Query<OwnerQuery>,
) -> Result<impl Responder> {
    let address = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        delete_address_by_id(&mut conn, params.user_id, *address_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(address))
}
