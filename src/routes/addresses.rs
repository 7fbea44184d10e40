use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use diesel::{prelude::*, PgConnection};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Address, NewAddress};
use crate::schema::addresses;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::nullable;

use super::{created, found, row_id};

#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = addresses)]
pub struct UpdateAddressRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub house_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub street: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub town: Option<Option<String>>,
}

pub async fn list_addresses(State(state): State<AppState>) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<Address> = addresses::table
        .order(addresses::member_user_id.asc())
        .load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_address(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewAddress>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let address: Address = diesel::insert_into(addresses::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(member_user_id = address.member_user_id, "created address");
    created(&address)
}

pub async fn get_address(
    State(state): State<AppState>,
    WithRejection(Path(member_user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Record>> {
    let member_user_id = row_id::<Address>(member_user_id)?;
    let mut conn = state.db()?;
    let address = load_address(&mut conn, member_user_id)?;
    Ok(Json(to_record(&address)?))
}

pub async fn update_address(
    State(state): State<AppState>,
    WithRejection(Path(member_user_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateAddressRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let member_user_id = row_id::<Address>(member_user_id)?;
    let mut conn = state.db()?;
    let existing = load_address(&mut conn, member_user_id)?;

    if changes == UpdateAddressRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: Address = diesel::update(&existing)
        .set(&changes)
        .get_result(&mut conn)?;

    info!(member_user_id, "updated address");
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_address(
    State(state): State<AppState>,
    WithRejection(Path(member_user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let member_user_id = row_id::<Address>(member_user_id)?;
    let mut conn = state.db()?;
    let deleted = diesel::delete(addresses::table.find(member_user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(Address::LABEL));
    }

    info!(member_user_id, "deleted address");
    Ok(StatusCode::NO_CONTENT)
}

fn load_address(conn: &mut PgConnection, member_user_id: i32) -> AppResult<Address> {
    found(
        addresses::table
            .find(member_user_id)
            .first::<Address>(conn)
            .optional()?,
    )
}
