//! Turns a [`ScheduleRequest`] into an [`Instance`]: validated, indexed and
//! with every derived table the model builder needs.

use alloc::collections::{BTreeMap, BTreeSet};
use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::domain::{
    Day, RoleName, ScheduleRequest, ShiftPreference, ShiftType, Staff, StaffId,
    UnavailabilityEntry, WeeklyNeeds,
};
use crate::error::InputError;
use crate::settings::SolverSettings;
use crate::shifts::{validate_shift_definitions, ShiftSchema};
use crate::time::{hours_to_tenths_ceil, hours_to_tenths_floor, Tenths, TimeWindow};

/// Sorted, deduplicated role names. Positions are the role indices used in
/// variable keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    roles: Vec<RoleName>,
}

impl RoleTable {
    #[must_use]
    pub fn index_of(&self, role: &str) -> Option<usize> {
        self.roles
            .binary_search_by(|candidate| candidate.as_str().cmp(role))
            .ok()
    }

    #[must_use]
    pub fn name(&self, index: usize) -> &RoleName {
        &self.roles[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &RoleName)> {
        self.roles.iter().enumerate()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<RoleName> for RoleTable {
    fn from_iter<T: IntoIterator<Item = RoleName>>(iter: T) -> Self {
        let roles: BTreeSet<RoleName> = iter.into_iter().collect();
        Self {
            roles: roles.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub id: StaffId,
    pub display_name: String,
    /// Qualified role indices, most preferred first.
    pub roles: Vec<usize>,
    pub min_hours: Option<f64>,
    pub min_tenths: Tenths,
    pub max_tenths: Option<Tenths>,
    /// `list length - rank` for staff named in the priority list, otherwise 0.
    pub priority_weight: u64,
}

/// One (staff, day, shift) cell of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub staff: usize,
    pub day: Day,
    pub shift: ShiftType,
}

/// Everything one model is built from.
#[derive(Debug, Clone)]
pub struct Instance {
    pub staff: Vec<StaffMember>,
    pub roles: RoleTable,
    pub schema: ShiftSchema,
    /// Clamped headcount for every (day, shift, role) of the run, zero included.
    pub demand: BTreeMap<(Day, ShiftType, usize), i64>,
    /// `rolePriorityScore` keyed by (staff index, role index); only scores > 0.
    pub role_scores: BTreeMap<(usize, usize), i64>,
    pub blocked: BTreeSet<Slot>,
    pub preference: ShiftPreference,
}

impl Instance {
    pub fn from_request(
        request: &ScheduleRequest,
        settings: &SolverSettings,
    ) -> Result<Self, InputError> {
        if request.staff_list.is_empty() {
            return Err(InputError::EmptyStaffList);
        }
        let valid_staff: Vec<&Staff> = request
            .staff_list
            .iter()
            .filter(|staff| !staff.id.as_str().trim().is_empty())
            .collect();
        if valid_staff.is_empty() {
            return Err(InputError::NoValidStaffIds);
        }
        if let Some(duplicate) = valid_staff.iter().map(|staff| &staff.id).duplicates().next() {
            return Err(InputError::DuplicateStaffId(duplicate.clone()));
        }
        for staff in &valid_staff {
            check_hours(staff)?;
        }

        let schema = validate_shift_definitions(&request.shift_definitions)?;
        let roles = active_roles(&valid_staff, &request.weekly_needs);
        if roles.is_empty() {
            warn!("no active roles found, solving an empty model");
        }

        let variables = assignment_variable_count(&valid_staff, &schema);
        if variables > settings.max_decision_variables {
            return Err(InputError::TooLarge {
                variables,
                limit: settings.max_decision_variables,
            });
        }

        let priority = staff_priority_weights(&request.staff_priority);
        let staff: Vec<StaffMember> = valid_staff
            .iter()
            .map(|staff| StaffMember {
                id: staff.id.clone(),
                display_name: staff.display_name().to_owned(),
                roles: staff
                    .assigned_roles_in_priority
                    .iter()
                    .filter_map(|role| roles.index_of(role.as_str()))
                    .unique()
                    .collect(),
                min_hours: staff.min_hours_per_week.filter(|hours| *hours > 0.0),
                min_tenths: staff
                    .min_hours_per_week
                    .map_or(0, hours_to_tenths_ceil)
                    .max(0),
                max_tenths: staff.max_hours_per_week.map(hours_to_tenths_floor),
                priority_weight: priority.get(&staff.id).copied().unwrap_or(0),
            })
            .collect();

        let role_scores = role_priority_scores(&valid_staff, &roles);
        let demand = clamped_demand(&request.weekly_needs, &schema, &roles);
        let blocked = blocked_slots(&staff, &request.unavailability_list, &schema);

        debug!(
            staff = staff.len(),
            roles = roles.len(),
            shift_types = schema.len(),
            assignment_variables = variables,
            blocked = blocked.len(),
            "preprocessed request"
        );

        Ok(Self {
            staff,
            roles,
            schema,
            demand,
            role_scores,
            blocked,
            preference: request.shift_preference,
        })
    }

    #[must_use]
    pub fn is_blocked(&self, staff: usize, day: Day, shift: ShiftType) -> bool {
        self.blocked.contains(&Slot { staff, day, shift })
    }
}

fn check_hours(staff: &Staff) -> Result<(), InputError> {
    let fields = [
        ("minHoursPerWeek", staff.min_hours_per_week),
        ("maxHoursPerWeek", staff.max_hours_per_week),
    ];
    for (field, hours) in fields {
        if let Some(hours) = hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(InputError::InvalidHours {
                    id: staff.id.clone(),
                    field,
                });
            }
        }
    }
    Ok(())
}

/// Roles any staff member is qualified for, plus every role with a demand entry.
#[must_use]
pub fn active_roles(staff: &[&Staff], needs: &WeeklyNeeds) -> RoleTable {
    let qualified = staff
        .iter()
        .flat_map(|staff| staff.assigned_roles_in_priority.iter().cloned());
    let demanded = needs
        .values()
        .flat_map(BTreeMap::values)
        .flat_map(BTreeMap::keys)
        .cloned();
    qualified.chain(demanded).collect()
}

/// `len(roles) - rank` per (staff index, role index). A role listed twice keeps
/// the score of its first position.
#[must_use]
pub fn role_priority_scores(staff: &[&Staff], roles: &RoleTable) -> BTreeMap<(usize, usize), i64> {
    let mut scores = BTreeMap::new();
    for (staff_index, staff) in staff.iter().enumerate() {
        let ranked = &staff.assigned_roles_in_priority;
        let len = ranked.len() as i64;
        for (rank, role) in ranked.iter().enumerate() {
            let score = len - rank as i64;
            if let Some(role_index) = roles.index_of(role.as_str()) {
                if score > 0 {
                    scores.entry((staff_index, role_index)).or_insert(score);
                }
            }
        }
    }
    scores
}

/// Earlier entries weigh more. Repeated ids keep their first weight.
#[must_use]
pub fn staff_priority_weights(priority: &[StaffId]) -> HashMap<StaffId, u64> {
    let len = priority.len() as u64;
    let mut weights = HashMap::new();
    for (rank, id) in priority.iter().enumerate() {
        weights.entry(id.clone()).or_insert(len - rank as u64);
    }
    weights
}

fn clamped_demand(
    needs: &WeeklyNeeds,
    schema: &ShiftSchema,
    roles: &RoleTable,
) -> BTreeMap<(Day, ShiftType, usize), i64> {
    for (day, shifts) in needs {
        for shift in shifts.keys().filter(|shift| !schema.contains(**shift)) {
            debug!(%day, %shift, "ignoring demand for an undefined shift type");
        }
    }
    let mut demand = BTreeMap::new();
    for day in Day::ALL {
        for shift in schema.shift_types() {
            for (role_index, role) in roles.iter() {
                let needed = needs
                    .get(&day)
                    .and_then(|shifts| shifts.get(&shift))
                    .and_then(|roles| roles.get(role))
                    .copied()
                    .unwrap_or(0)
                    .max(0);
                demand.insert((day, shift, role_index), needed);
            }
        }
    }
    demand
}

/// Slots in which a staff member cannot work.
///
/// A window is tested against the shifts of its own day. When it runs past
/// midnight its remainder is also tested against the following day, and the
/// after-midnight part of a cross-day shift is tested against the windows of
/// the day it spills into. Nothing spills beyond Sunday.
#[must_use]
pub fn blocked_slots(
    staff: &[StaffMember],
    unavailability: &[UnavailabilityEntry],
    schema: &ShiftSchema,
) -> BTreeSet<Slot> {
    let index: HashMap<&StaffId, usize> = staff
        .iter()
        .enumerate()
        .map(|(position, member)| (&member.id, position))
        .collect();

    let mut blocked = BTreeSet::new();
    for entry in unavailability {
        let Some(&staff_index) = index.get(&entry.employee_id) else {
            debug!(employee = %entry.employee_id, "skipping unavailability of unknown staff");
            continue;
        };
        for span in &entry.shifts {
            let window = match TimeWindow::parse(&span.start, &span.end) {
                Ok(window) => window,
                Err(error) => {
                    warn!(employee = %entry.employee_id, %error, "skipping unavailability window");
                    continue;
                }
            };
            for shift in schema.iter() {
                if shift.window.is_blocked_by(&window) {
                    blocked.insert(Slot {
                        staff: staff_index,
                        day: entry.day_of_week,
                        shift: shift.shift_type,
                    });
                }
                if let (Some(spill), Some(next)) = (window.spill_over(), entry.day_of_week.next()) {
                    if shift.window.is_blocked_by(&spill) {
                        blocked.insert(Slot {
                            staff: staff_index,
                            day: next,
                            shift: shift.shift_type,
                        });
                    }
                }
                if let (Some(spill), Some(previous)) =
                    (shift.window.spill_over(), entry.day_of_week.previous())
                {
                    if spill.is_blocked_by(&window) {
                        blocked.insert(Slot {
                            staff: staff_index,
                            day: previous,
                            shift: shift.shift_type,
                        });
                    }
                }
            }
        }
    }
    blocked
}

/// Number of assignment variables a model for these staff would declare.
fn assignment_variable_count(staff: &[&Staff], schema: &ShiftSchema) -> usize {
    let qualified: usize = staff
        .iter()
        .map(|staff| staff.assigned_roles_in_priority.iter().unique().count())
        .sum();
    qualified
        .saturating_mul(Day::ALL.len())
        .saturating_mul(schema.len())
}
