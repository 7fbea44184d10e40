use std::fmt;
use std::io::Write;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::*;
use crate::serializers::Resource;
use crate::utils::json::{decimal, optional_decimal};

#[derive(Debug, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Kind of care a caregiver offers or a job requires.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum CaregivingType {
    #[serde(rename = "babysitter")]
    Babysitter,
    #[serde(rename = "caregiver for elderly")]
    ElderlyCare,
    #[serde(rename = "playmate for children")]
    Playmate,
}

impl CaregivingType {
    pub const ALL: [CaregivingType; 3] = [
        CaregivingType::Babysitter,
        CaregivingType::ElderlyCare,
        CaregivingType::Playmate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CaregivingType::Babysitter => "babysitter",
            CaregivingType::ElderlyCare => "caregiver for elderly",
            CaregivingType::Playmate => "playmate for children",
        }
    }
}

impl fmt::Display for CaregivingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaregivingType {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CaregivingType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| ParseEnumError {
                kind: "caregiving type",
                value: value.to_string(),
            })
    }
}

impl ToSql<Text, Pg> for CaregivingType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CaregivingType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(raw.parse()?)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Declined,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Declined => "Declined",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| ParseEnumError {
                kind: "appointment status",
                value: value.to_string(),
            })
    }
}

impl ToSql<Text, Pg> for AppointmentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for AppointmentStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
#[diesel(primary_key(user_id))]
pub struct User {
    pub user_id: i32,
    pub email: String,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub profile_description: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub profile_description: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = caregivers)]
#[diesel(primary_key(caregiver_user_id))]
pub struct Caregiver {
    pub caregiver_user_id: i32,
    pub photo: Option<String>,
    pub gender: Option<String>,
    pub caregiving_type: CaregivingType,
    pub hourly_rate: Option<BigDecimal>,
}

#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = caregivers)]
pub struct NewCaregiver {
    pub caregiver_user_id: i32,
    pub photo: Option<String>,
    pub gender: Option<String>,
    pub caregiving_type: CaregivingType,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub hourly_rate: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = members)]
#[diesel(primary_key(member_user_id))]
pub struct Member {
    pub member_user_id: i32,
    pub house_rules: Option<String>,
    pub dependent_description: Option<String>,
}

#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = members)]
pub struct NewMember {
    pub member_user_id: i32,
    pub house_rules: Option<String>,
    pub dependent_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = addresses)]
#[diesel(primary_key(member_user_id))]
pub struct Address {
    pub member_user_id: i32,
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub town: Option<String>,
}

#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = addresses)]
pub struct NewAddress {
    pub member_user_id: i32,
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub town: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = jobs)]
#[diesel(primary_key(job_id))]
pub struct Job {
    pub job_id: i32,
    pub member_user_id: i32,
    pub required_caregiving_type: CaregivingType,
    pub other_requirements: Option<String>,
    pub date_posted: Option<NaiveDate>,
}

/// `date_posted` falls back to the column default (the current date) when omitted.
#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub member_user_id: i32,
    pub required_caregiving_type: CaregivingType,
    pub other_requirements: Option<String>,
    pub date_posted: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = job_applications)]
#[diesel(primary_key(caregiver_user_id, job_id))]
pub struct JobApplication {
    pub caregiver_user_id: i32,
    pub job_id: i32,
    pub date_applied: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = job_applications)]
pub struct NewJobApplication {
    pub caregiver_user_id: i32,
    pub job_id: i32,
    pub date_applied: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = appointments)]
#[diesel(primary_key(appointment_id))]
pub struct Appointment {
    pub appointment_id: i32,
    pub caregiver_user_id: i32,
    pub member_user_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub work_hours: BigDecimal,
    pub status: AppointmentStatus,
}

/// Leaving `status` out stores the column default, `Pending`.
#[derive(Debug, Deserialize, Insertable)]
#[serde(deny_unknown_fields)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub caregiver_user_id: i32,
    pub member_user_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    #[serde(deserialize_with = "decimal")]
    pub work_hours: BigDecimal,
    pub status: Option<AppointmentStatus>,
}

impl Resource for User {
    const LABEL: &'static str = "User";
}

impl Resource for Caregiver {
    const LABEL: &'static str = "Caregiver";
}

impl Resource for Member {
    const LABEL: &'static str = "Member";
}

impl Resource for Address {
    const LABEL: &'static str = "Address";
}

impl Resource for Job {
    const LABEL: &'static str = "Job";
}

impl Resource for JobApplication {
    const LABEL: &'static str = "Job application";
}

impl Resource for Appointment {
    const LABEL: &'static str = "Appointment";
}
