use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use diesel::{prelude::*, PgConnection};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{JobApplication, NewJobApplication};
use crate::schema::job_applications;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::nullable;

use super::{created, found, row_id};

/// Both key columns live in the path, so only the application date is editable.
#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = job_applications)]
pub struct UpdateJobApplicationRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub date_applied: Option<Option<NaiveDate>>,
}

pub async fn list_job_applications(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<JobApplication> = job_applications::table
        .order((
            job_applications::caregiver_user_id.asc(),
            job_applications::job_id.asc(),
        ))
        .load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_job_application(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewJobApplication>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let application: JobApplication = diesel::insert_into(job_applications::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(
        caregiver_user_id = application.caregiver_user_id,
        job_id = application.job_id,
        "created job application"
    );
    created(&application)
}

pub async fn get_job_application(
    State(state): State<AppState>,
    WithRejection(Path((caregiver_user_id, job_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
) -> AppResult<Json<Record>> {
    let caregiver_user_id = row_id::<JobApplication>(caregiver_user_id)?;
    let job_id = row_id::<JobApplication>(job_id)?;
    let mut conn = state.db()?;
    let application = load_job_application(&mut conn, caregiver_user_id, job_id)?;
    Ok(Json(to_record(&application)?))
}

pub async fn update_job_application(
    State(state): State<AppState>,
    WithRejection(Path((caregiver_user_id, job_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateJobApplicationRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let caregiver_user_id = row_id::<JobApplication>(caregiver_user_id)?;
    let job_id = row_id::<JobApplication>(job_id)?;
    let mut conn = state.db()?;
    let existing = load_job_application(&mut conn, caregiver_user_id, job_id)?;

    if changes == UpdateJobApplicationRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: JobApplication =
        diesel::update(job_applications::table.find((caregiver_user_id, job_id)))
            .set(&changes)
            .get_result(&mut conn)?;

    info!(caregiver_user_id, job_id, "updated job application");
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_job_application(
    State(state): State<AppState>,
    WithRejection(Path((caregiver_user_id, job_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
) -> AppResult<StatusCode> {
    let caregiver_user_id = row_id::<JobApplication>(caregiver_user_id)?;
    let job_id = row_id::<JobApplication>(job_id)?;
    let mut conn = state.db()?;
    let deleted = diesel::delete(job_applications::table.find((caregiver_user_id, job_id)))
        .execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(JobApplication::LABEL));
    }

    info!(caregiver_user_id, job_id, "deleted job application");
    Ok(StatusCode::NO_CONTENT)
}

fn load_job_application(
    conn: &mut PgConnection,
    caregiver_user_id: i32,
    job_id: i32,
) -> AppResult<JobApplication> {
    found(
        job_applications::table
            .find((caregiver_user_id, job_id))
            .first::<JobApplication>(conn)
            .optional()?,
    )
}
