use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use diesel::{prelude::*, PgConnection};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Appointment, AppointmentStatus, NewAppointment};
use crate::schema::appointments;
use crate::serializers::{to_record, to_records, Record, Resource};
use crate::state::AppState;
use crate::utils::json::{present, present_decimal};

use super::{created, found, row_id};

#[derive(Debug, Default, PartialEq, Deserialize, AsChangeset)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = appointments)]
pub struct UpdateAppointmentRequest {
    #[serde(default, deserialize_with = "present")]
    pub caregiver_user_id: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub member_user_id: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub appointment_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "present_decimal")]
    pub work_hours: Option<BigDecimal>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<AppointmentStatus>,
}

pub async fn list_appointments(State(state): State<AppState>) -> AppResult<Json<Vec<Record>>> {
    let mut conn = state.db()?;
    let rows: Vec<Appointment> = appointments::table
        .order(appointments::appointment_id.asc())
        .load(&mut conn)?;
    Ok(Json(to_records(&rows)?))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewAppointment>, AppError>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let mut conn = state.db()?;
    let appointment: Appointment = diesel::insert_into(appointments::table)
        .values(&payload)
        .get_result(&mut conn)?;

    info!(
        appointment_id = appointment.appointment_id,
        caregiver_user_id = appointment.caregiver_user_id,
        member_user_id = appointment.member_user_id,
        status = %appointment.status,
        "created appointment"
    );
    created(&appointment)
}

pub async fn get_appointment(
    State(state): State<AppState>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Record>> {
    let appointment_id = row_id::<Appointment>(appointment_id)?;
    let mut conn = state.db()?;
    let appointment = load_appointment(&mut conn, appointment_id)?;
    Ok(Json(to_record(&appointment)?))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateAppointmentRequest>, AppError>,
) -> AppResult<Json<Record>> {
    let appointment_id = row_id::<Appointment>(appointment_id)?;
    let mut conn = state.db()?;
    let existing = load_appointment(&mut conn, appointment_id)?;

    if changes == UpdateAppointmentRequest::default() {
        return Ok(Json(to_record(&existing)?));
    }

    let updated: Appointment = diesel::update(&existing)
        .set(&changes)
        .get_result(&mut conn)?;

    if updated.status != existing.status {
        info!(
            appointment_id,
            from = %existing.status,
            to = %updated.status,
            "appointment status changed"
        );
    } else {
        info!(appointment_id, "updated appointment");
    }
    Ok(Json(to_record(&updated)?))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let appointment_id = row_id::<Appointment>(appointment_id)?;
    let mut conn = state.db()?;
    let deleted = diesel::delete(appointments::table.find(appointment_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(Appointment::LABEL));
    }

    info!(appointment_id, "deleted appointment");
    Ok(StatusCode::NO_CONTENT)
}

fn load_appointment(conn: &mut PgConnection, appointment_id: i32) -> AppResult<Appointment> {
    found(
        appointments::table
            .find(appointment_id)
            .first::<Appointment>(conn)
            .optional()?,
    )
}
