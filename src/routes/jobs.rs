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
use crate::models::{CaregivingType, Job, NewJob};
use crate::schema::jobs;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::{nullable, present};

use super::{created, found, row_id};

#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = jobs)]
pub struct UpdateJobRequest {
    #[serde(default, deserialize_with = "present")]
    pub member_user_id: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub required_caregiving_type: Option<CaregivingType>,
    #[serde(default, deserialize_with = "nullable")]
    pub other_requirements: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_posted: Option<Option<NaiveDate>>,
}

pub async fn list_jobs(State(state): State<AppState>) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<Job> = jobs::table.order(jobs::job_id.asc()).load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_job(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewJob>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let job: Job = diesel::insert_into(jobs::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(
        job_id = job.job_id,
        member_user_id = job.member_user_id,
        required_caregiving_type = %job.required_caregiving_type,
        "created job"
    );
    created(&job)
}

pub async fn get_job(
    State(state): State<AppState>,
    WithRejection(Path(job_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Record>> {
    let job_id = row_id::<Job>(job_id)?;
    let mut conn = state.db()?;
    let job = load_job(&mut conn, job_id)?;
    Ok(Json(to_record(&job)?))
}

pub async fn update_job(
    State(state): State<AppState>,
    WithRejection(Path(job_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateJobRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let job_id = row_id::<Job>(job_id)?;
    let mut conn = state.db()?;
    let existing = load_job(&mut conn, job_id)?;

    if changes == UpdateJobRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: Job = diesel::update(&existing)
        .set(&changes)
        .get_result(&mut conn)?;

    info!(job_id, "updated job");
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_job(
    State(state): State<AppState>,
    WithRejection(Path(job_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let job_id = row_id::<Job>(job_id)?;
    let mut conn = state.db()?;
    let deleted = diesel::delete(jobs::table.find(job_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(Job::LABEL));
    }

    info!(job_id, "deleted job");
    Ok(StatusCode::NO_CONTENT)
}

fn load_job(conn: &mut PgConnection, job_id: i32) -> AppResult<Job> {
    found(jobs::table.find(job_id).first::<Job>(conn).optional()?)
}
