#![allow(dead_code)]

use std::collections::BTreeMap;

use serde_json::{json, Value};
use shift_schedule_optimizer::{
    Day, Schedule, ScheduleRequest, ShiftType, SolveOutcome, SolverSettings, StaffId,
};

pub fn settings() -> SolverSettings {
    SolverSettings {
        time_limit_seconds: 30.0,
        ..SolverSettings::default()
    }
}

/// 12:00-19:00 and an evening running to 02:00, seven hours each.
pub fn restaurant_shifts() -> Value {
    json!({
        "HALF_DAY_AM": {"start": "12:00", "end": "19:00", "hours": 7},
        "HALF_DAY_PM": {"start": "19:00", "end": "02:00", "hours": 7}
    })
}

pub fn with_full_day(mut shifts: Value) -> Value {
    shifts["FULL_DAY"] = json!({"start": "12:00", "end": "02:00", "hours": 14});
    shifts
}

pub fn request(value: Value) -> ScheduleRequest {
    let mut value = value;
    let defaults = [
        ("unavailabilityList", json!([])),
        ("weeklyNeeds", json!({})),
        ("shiftDefinitions", restaurant_shifts()),
        ("shiftPreference", json!("NONE")),
    ];
    for (key, default) in defaults {
        if value.get(key).is_none() {
            value[key] = default;
        }
    }
    serde_json::from_value(value).unwrap()
}

pub fn solved_schedule(outcome: &SolveOutcome) -> &Schedule {
    outcome
        .schedule
        .as_ref()
        .unwrap_or_else(|| panic!("no schedule: {:?}", outcome.warnings))
}

pub fn assigned<'a>(schedule: &'a Schedule, day: Day, shift: ShiftType, role: &str) -> &'a [StaffId] {
    schedule
        .get(&day)
        .and_then(|shifts| shifts.get(&shift))
        .and_then(|roles| roles.get(role))
        .map_or(&[][..], Vec::as_slice)
}

/// Every (staff, day, shift, role) tuple in the schedule.
pub fn assignments(schedule: &Schedule) -> Vec<(StaffId, Day, ShiftType, String)> {
    let mut all = Vec::new();
    for (day, shifts) in schedule {
        for (shift, roles) in shifts {
            for (role, staff) in roles {
                for id in staff {
                    all.push((id.clone(), *day, *shift, role.as_str().to_owned()));
                }
            }
        }
    }
    all
}

/// `(day, shift, role) -> missing` parsed from the shortage warnings.
pub fn shortages(outcome: &SolveOutcome) -> BTreeMap<(String, String, String), i64> {
    outcome
        .warnings
        .iter()
        .filter_map(|warning| {
            let rest = warning.strip_prefix("Shortage of ")?.strip_suffix('.')?;
            let (count, rest) = rest.split_once(" for ")?;
            let (role, rest) = rest.split_once(" on ")?;
            let (day, shift) = rest.split_once(' ')?;
            Some(((day.to_owned(), shift.to_owned(), role.to_owned()), count.parse().ok()?))
        })
        .collect()
}
