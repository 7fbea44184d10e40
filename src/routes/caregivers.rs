use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use bigdecimal::BigDecimal;
use diesel::{prelude::*, PgConnection};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Caregiver, CaregivingType, NewCaregiver};
use crate::schema::caregivers;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::{nullable, nullable_decimal, present};

use super::{created, found, row_id};

#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = caregivers)]
pub struct UpdateCaregiverRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub photo: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub caregiving_type: Option<CaregivingType>,
    #[serde(default, deserialize_with = "nullable_decimal")]
    pub hourly_rate: Option<Option<BigDecimal>>,
}

pub async fn list_caregivers(State(state): State<AppState>) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<Caregiver> = caregivers::table
        .order(caregivers::caregiver_user_id.asc())
        .load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_caregiver(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewCaregiver>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let caregiver: Caregiver = diesel::insert_into(caregivers::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(
        caregiver_user_id = caregiver.caregiver_user_id,
        caregiving_type = %caregiver.caregiving_type,
        "created caregiver"
    );
    created(&caregiver)
}

pub async fn get_caregiver(
    State(state): State<AppState>,
    WithRejection(Path(caregiver_user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Record>> {
    let caregiver_user_id = row_id::<Caregiver>(caregiver_user_id)?;
    let mut conn = state.db()?;
    let caregiver = load_caregiver(&mut conn, caregiver_user_id)?;
    Ok(Json(to_record(&caregiver)?))
}

pub async fn update_caregiver(
    State(state): State<AppState>,
    WithRejection(Path(caregiver_user_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateCaregiverRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let caregiver_user_id = row_id::<Caregiver>(caregiver_user_id)?;
    let mut conn = state.db()?;
    let existing = load_caregiver(&mut conn, caregiver_user_id)?;

    if changes == UpdateCaregiverRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: Caregiver = diesel::update(&existing)
        .set(&changes)
        .get_result(&mut conn)?;

    info!(caregiver_user_id, "updated caregiver");
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_caregiver(
    State(state): State<AppState>,
    WithRejection(Path(caregiver_user_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let caregiver_user_id = row_id::<Caregiver>(caregiver_user_id)?;
    let mut conn = state.db()?;
    let deleted =
        diesel::delete(caregivers::table.find(caregiver_user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(Caregiver::LABEL));
    }

    info!(caregiver_user_id, "deleted caregiver");
    Ok(StatusCode::NO_CONTENT)
}

fn load_caregiver(conn: &mut PgConnection, caregiver_user_id: i32) -> AppResult<Caregiver> {
    found(
        caregivers::table
            .find(caregiver_user_id)
            .first::<Caregiver>(conn)
            .optional()?,
    )
}
