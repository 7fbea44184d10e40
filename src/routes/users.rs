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
use crate::models::{NewUser, User};
use crate::schema::users;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::{nullable, present};

use super::{created, found, row_id};

#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = users)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "present")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub given_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub surname: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub profile_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<String>,
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<User> = users::table.order(users::user_id.asc()).load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUser>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let user: User = diesel::insert_into(users::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(user_id = user.user_id, "created user");
    created(&user)
}

pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Record>> {
    let user_id = row_id::<User>(user_id)?;
    let mut conn = state.db()?;
    let user = load_user(&mut conn, user_id)?;
    Ok(Json(to_record(&user)?))
}

pub async fn update_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateUserRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let user_id = row_id::<User>(user_id)?;
    let mut conn = state.db()?;
    let existing = load_user(&mut conn, user_id)?;

    if changes == UpdateUserRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: User = diesel::update(&existing)
        .set(&changes)
        .get_result(&mut conn)?;

    info!(user_id, "updated user");
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let user_id = row_id::<User>(user_id)?;
    let mut conn = state.db()?;
    let deleted = diesel::delete(users::table.find(user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(User::LABEL));
    }

    info!(user_id, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}

fn load_user(conn: &mut PgConnection, user_id: i32) -> AppResult<User> {
    found(users::table.find(user_id).first::<User>(conn).optional()?)
}
