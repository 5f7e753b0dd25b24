//! Reads a schedule and its diagnostics out of solved variable values.

use alloc::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::{Schedule, StaffId};
use crate::model::VariableIndex;
use crate::preprocess::Instance;
use crate::shifts::ShiftSchema;
use crate::solver::SolvedValues;
use crate::time::Tenths;

/// Values above this count as a true binary.
const TRUE_THRESHOLD: f64 = 0.5;
const MIN_HOURS_TOLERANCE: f64 = 0.01;

/// Every assignment solved true, grouped by day, shift and role. Levels
/// without staff never appear.
#[must_use]
pub fn extract_schedule(instance: &Instance, index: &VariableIndex, values: &SolvedValues) -> Schedule {
    let mut schedule = Schedule::new();
    for (key, variable) in &index.assign {
        if values.value(*variable) <= TRUE_THRESHOLD {
            continue;
        }
        let assigned = schedule
            .entry(key.day)
            .or_default()
            .entry(key.shift)
            .or_default()
            .entry(instance.roles.name(key.role).clone())
            .or_default();
        let id = &instance.staff[key.staff].id;
        if !assigned.contains(id) {
            assigned.push(id.clone());
        }
    }
    schedule
}

/// One warning per understaffed (day, shift, role), with the total shortfall.
#[must_use]
pub fn shortage_warnings(
    instance: &Instance,
    index: &VariableIndex,
    values: &SolvedValues,
) -> (Vec<String>, i64) {
    let mut total = 0;
    let warnings = index
        .shortage
        .iter()
        .filter_map(|(key, variable)| {
            let missing = values.value(*variable).round() as i64;
            (missing > 0).then(|| {
                total += missing;
                format!(
                    "Shortage of {missing} for {} on {} {}.",
                    instance.roles.name(key.role),
                    key.day,
                    key.shift
                )
            })
        })
        .collect();
    (warnings, total)
}

/// Weekly tenths per staff member, recomputed from the schedule alone.
#[must_use]
pub fn scheduled_hours(schedule: &Schedule, schema: &ShiftSchema) -> BTreeMap<StaffId, Tenths> {
    let mut hours: BTreeMap<StaffId, Tenths> = BTreeMap::new();
    for shifts in schedule.values() {
        for (shift, roles) in shifts {
            for id in roles.values().flatten() {
                *hours.entry(id.clone()).or_default() += schema.tenths(*shift);
            }
        }
    }
    hours
}

/// Staff who work some hours but fewer than their minimum.
#[must_use]
pub fn min_hours_warnings(
    instance: &Instance,
    schedule: &Schedule,
    index: &VariableIndex,
    values: &SolvedValues,
) -> Vec<String> {
    let scheduled = scheduled_hours(schedule, &instance.schema);
    let mut warnings = Vec::new();
    for (member, total) in instance.staff.iter().zip(&index.total_tenths) {
        let tenths = scheduled.get(&member.id).copied().unwrap_or(0);
        let solved = values.value(*total);
        if (solved - tenths as f64).abs() > 0.1 {
            warn!(staff = %member.id, solved, recomputed = tenths, "weekly hours disagree with the solver");
        }
        let Some(min_hours) = member.min_hours else {
            continue;
        };
        let hours = tenths as f64 / 10.0;
        if hours > 0.0 && hours < min_hours - MIN_HOURS_TOLERANCE {
            warnings.push(format!(
                "Staff {} scheduled for {hours:.1}h, below minimum {min_hours}h.",
                member.display_name
            ));
        }
    }
    warnings
}

/// Schedule plus every soft-constraint warning, shortages first.
#[must_use]
pub fn extract(instance: &Instance, index: &VariableIndex, values: &SolvedValues) -> (Schedule, Vec<String>) {
    let schedule = extract_schedule(instance, index, values);
    let (mut warnings, total_shortage) = shortage_warnings(instance, index, values);
    if total_shortage > 0 {
        info!(total_shortage, "demand left uncovered");
    } else {
        debug!("no shortages");
    }
    warnings.extend(min_hours_warnings(instance, &schedule, index, values));
    (schedule, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Day, ScheduleRequest, ShiftDefinition, ShiftDefinitions, ShiftPreference, ShiftType, Staff,
    };
    use crate::model::{DemandKey, Formulation};
    use crate::settings::SolverSettings;

    fn instance() -> Instance {
        let definition = |start: &str, end: &str| ShiftDefinition {
            start: start.to_owned(),
            end: end.to_owned(),
            hours: 5.5,
        };
        let staff = |id: &str, name: &str, min: Option<f64>| Staff {
            id: id.into(),
            name: name.to_owned(),
            assigned_roles_in_priority: vec!["Server".into()],
            min_hours_per_week: min,
            max_hours_per_week: None,
        };
        let request = ScheduleRequest {
            weekly_needs: BTreeMap::new(),
            staff_list: vec![
                staff("a", "Ann", Some(20.0)),
                staff("b", "", Some(8.0)),
                staff("c", "Cy", Some(30.0)),
            ],
            unavailability_list: Vec::new(),
            shift_definitions: ShiftDefinitions::from([
                (ShiftType::HalfDayAm, definition("09:00", "14:30")),
                (ShiftType::HalfDayPm, definition("14:30", "20:00")),
            ]),
            shift_preference: ShiftPreference::None,
            staff_priority: Vec::new(),
        };
        Instance::from_request(&request, &SolverSettings::default()).unwrap()
    }

    fn solved(instance: &Instance, formulation: &Formulation) -> SolvedValues {
        let mut values = SolvedValues::default();
        let mut totals = vec![0; instance.staff.len()];
        for (key, variable) in &formulation.index.assign {
            let on = key.day == Day::Monday || (key.staff == 1 && key.day == Day::Friday);
            if on {
                values.insert(*variable, 0.999_999);
                totals[key.staff] += instance.schema.tenths(key.shift);
            } else {
                values.insert(*variable, 1e-7);
            }
        }
        for (total, tenths) in formulation.index.total_tenths.iter().zip(totals) {
            values.insert(*total, tenths as f64);
        }
        let key = DemandKey {
            day: Day::Sunday,
            shift: ShiftType::HalfDayPm,
            role: 0,
        };
        values.insert(formulation.index.shortage[&key], 2.000_001);
        values
    }

    #[test]
    fn extraction_is_idempotent() {
        let instance = instance();
        let formulation = Formulation::build(&instance);
        let values = solved(&instance, &formulation);
        let first = extract(&instance, &formulation.index, &values);
        let second = extract(&instance, &formulation.index, &values);
        assert_eq!(
            serde_json::to_string(&first.0).unwrap(),
            serde_json::to_string(&second.0).unwrap()
        );
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn groups_true_assignments_only() {
        let instance = instance();
        let formulation = Formulation::build(&instance);
        let schedule = extract_schedule(&instance, &formulation.index, &solved(&instance, &formulation));
        assert_eq!(schedule.len(), 2);
        let monday_am = &schedule[&Day::Monday][&ShiftType::HalfDayAm];
        assert_eq!(
            monday_am["Server"],
            vec![StaffId::from("a"), StaffId::from("b"), StaffId::from("c")]
        );
        assert_eq!(
            schedule[&Day::Friday][&ShiftType::HalfDayPm]["Server"],
            vec![StaffId::from("b")]
        );
        assert!(!schedule.contains_key(&Day::Tuesday));
    }

    #[test]
    fn reports_shortages_and_short_hours() {
        let instance = instance();
        let formulation = Formulation::build(&instance);
        let (schedule, warnings) = extract(&instance, &formulation.index, &solved(&instance, &formulation));
        let hours = scheduled_hours(&schedule, &instance.schema);
        assert_eq!(hours[&StaffId::from("a")], 110);
        assert_eq!(hours[&StaffId::from("b")], 220);
        assert_eq!(
            warnings,
            [
                "Shortage of 2 for Server on Sunday HALF_DAY_PM.",
                "Staff Ann scheduled for 11.0h, below minimum 20h.",
                "Staff Cy scheduled for 11.0h, below minimum 30h.",
            ]
        );
    }
}
