use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: AppointmentStatus,
    pub provider_id: Option<i64>,
    pub provider_name: Option<String>,
}
