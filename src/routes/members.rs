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
use crate::models::{Member, NewMember};
use crate::schema::members;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::nullable;

use super::{created, found, row_id};

#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = members)]
pub struct UpdateMemberRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub house_rules: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub dependent_description: Option<Option<String>>,
}

pub async fn list_members(State(state): State<AppState>) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<Member> = members::table
        .order(members::member_user_id.asc())
        .load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_member(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewMember>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let member: Member = diesel::insert_into(members::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(member_user_id = member.member_user_id, "created member");
    created(&member)
}

pub async fn get_member(
    State(state): State<AppState>,
    WithRejection(Path(member_user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Record>> {
    let member_user_id = row_id::<Member>(member_user_id)?;
    let mut conn = state.db()?;
    let member = load_member(&mut conn, member_user_id)?;
    Ok(Json(to_record(&member)?))
}

pub async fn update_member(
    State(state): State<AppState>,
    WithRejection(Path(member_user_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateMemberRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let member_user_id = row_id::<Member>(member_user_id)?;
    let mut conn = state.db()?;
    let existing = load_member(&mut conn, member_user_id)?;

    if changes == UpdateMemberRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: Member = diesel::update(&existing)
        .set(&changes)
        .get_result(&mut conn)?;

    info!(member_user_id, "updated member");
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_member(
    State(state): State<AppState>,
    WithRejection(Path(member_user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let member_user_id = row_id::<Member>(member_user_id)?;
    let mut conn = state.db()?;
    let deleted = diesel::delete(members::table.find(member_user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(Member::LABEL));
    }

    info!(member_user_id, "deleted member");
    Ok(StatusCode::NO_CONTENT)
}

fn load_member(conn: &mut PgConnection, member_user_id: i32) -> AppResult<Member> {
    found(
        members::table
            .find(member_user_id)
            .first::<Member>(conn)
            .optional()?,
    )
}
