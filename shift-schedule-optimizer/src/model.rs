//! Decision variables and hard constraints of the weekly assignment problem.

use alloc::collections::BTreeMap;

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use tracing::debug;

use crate::domain::{Day, ShiftType};
use crate::preprocess::{Instance, Slot};
use crate::time::Tenths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignKey {
    pub staff: usize,
    pub day: Day,
    pub shift: ShiftType,
    pub role: usize,
}

impl AssignKey {
    #[must_use]
    pub const fn slot(&self) -> Slot {
        Slot {
            staff: self.staff,
            day: self.day,
            shift: self.shift,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DemandKey {
    pub day: Day,
    pub shift: ShiftType,
    pub role: usize,
}

/// Handles to every variable the objective and the extraction read back.
#[derive(Debug, Default)]
pub struct VariableIndex {
    pub assign: BTreeMap<AssignKey, Variable>,
    pub shortage: BTreeMap<DemandKey, Variable>,
    /// 1 exactly when the staff member holds any role in the slot.
    pub works: BTreeMap<Slot, Variable>,
    /// Weekly hours in tenths, per staff index.
    pub total_tenths: Vec<Variable>,
    /// Largest value `total_tenths` can take, per staff index.
    pub upper_tenths: Vec<Tenths>,
    /// Missing hour units below the weekly minimum, per staff index.
    pub min_shortage: Vec<Option<Variable>>,
    /// Nonzero values of the schedule that assigns nobody. Every variable
    /// not listed is 0. Always feasible.
    pub empty_schedule: Vec<(Variable, f64)>,
}

/// A model without an objective yet.
pub struct Formulation {
    pub variables: ProblemVariables,
    pub constraints: Vec<Constraint>,
    pub index: VariableIndex,
}

impl Formulation {
    /// Declares the variables and posts every hard constraint.
    ///
    /// The model is feasible for any instance: unmet demand is absorbed by
    /// the shortage variables.
    #[must_use]
    pub fn build(instance: &Instance) -> Self {
        let mut builder = Self {
            variables: ProblemVariables::new(),
            constraints: Vec::new(),
            index: VariableIndex::default(),
        };
        builder.add_assignments(instance);
        builder.add_demand(instance);
        builder.add_exclusivity(instance);
        builder.add_unavailability(instance);
        builder.add_weekly_hours(instance);
        debug!(
            assignments = builder.index.assign.len(),
            shortages = builder.index.shortage.len(),
            constraints = builder.constraints.len(),
            "built constraint model"
        );
        builder
    }

    pub fn assignments_in(&self, slot: Slot) -> impl Iterator<Item = (&AssignKey, &Variable)> {
        let first = AssignKey {
            staff: slot.staff,
            day: slot.day,
            shift: slot.shift,
            role: 0,
        };
        self.index
            .assign
            .range(first..)
            .take_while(move |(key, _)| key.slot() == slot)
    }

    fn add_assignments(&mut self, instance: &Instance) {
        for (staff, member) in instance.staff.iter().enumerate() {
            for day in Day::ALL {
                for shift in instance.schema.shift_types() {
                    for &role in &member.roles {
                        let name = format!(
                            "assign_{}_{day}_{shift}_{}",
                            member.id,
                            instance.roles.name(role)
                        );
                        let var = self.variables.add(variable().binary().name(name));
                        self.index.assign.insert(
                            AssignKey {
                                staff,
                                day,
                                shift,
                                role,
                            },
                            var,
                        );
                    }
                }
            }
        }
    }

    fn add_demand(&mut self, instance: &Instance) {
        let staff_count = instance.staff.len() as i64;
        let mut covering: BTreeMap<DemandKey, Expression> = BTreeMap::new();
        for (key, var) in &self.index.assign {
            covering
                .entry(DemandKey {
                    day: key.day,
                    shift: key.shift,
                    role: key.role,
                })
                .or_insert_with(|| Expression::from(0.0))
                .add_mul(1.0, *var);
        }

        for (&(day, shift, role), &needed) in &instance.demand {
            let key = DemandKey { day, shift, role };
            let bound = needed.max(staff_count + 1);
            let shortage = self.variables.add(
                variable()
                    .integer()
                    .min(0.0)
                    .max(bound as f64)
                    .name(format!("shortage_{day}_{shift}_{}", instance.roles.name(role))),
            );
            let assigned = covering.remove(&key).unwrap_or_else(|| Expression::from(0.0));
            self.constraints
                .push(constraint!(assigned + shortage == needed as f64));
            self.index.shortage.insert(key, shortage);
            if needed > 0 {
                self.index.empty_schedule.push((shortage, needed as f64));
            }
        }
    }

    /// One role per slot, and a full day excludes both half days.
    fn add_exclusivity(&mut self, instance: &Instance) {
        for staff in 0..instance.staff.len() {
            for day in Day::ALL {
                for shift in instance.schema.shift_types() {
                    let slot = Slot { staff, day, shift };
                    let mut held = Expression::from(0.0);
                    let mut any = false;
                    for (_, var) in self.assignments_in(slot) {
                        held.add_mul(1.0, *var);
                        any = true;
                    }
                    if !any {
                        continue;
                    }
                    let works = self.variables.add(
                        variable()
                            .binary()
                            .name(format!("works_{}_{day}_{shift}", instance.staff[staff].id)),
                    );
                    self.constraints.push(constraint!(works == held));
                    self.index.works.insert(slot, works);
                }

                let full = self.index.works.get(&Slot {
                    staff,
                    day,
                    shift: ShiftType::FullDay,
                });
                if let Some(&full) = full {
                    for half in [ShiftType::HalfDayAm, ShiftType::HalfDayPm] {
                        if let Some(&half) = self.index.works.get(&Slot {
                            staff,
                            day,
                            shift: half,
                        }) {
                            self.constraints.push(constraint!(full + half <= 1.0));
                        }
                    }
                }
            }
        }
    }

    fn add_unavailability(&mut self, instance: &Instance) {
        let blocked: Vec<Variable> = self
            .index
            .assign
            .iter()
            .filter(|(key, _)| instance.is_blocked(key.staff, key.day, key.shift))
            .map(|(_, var)| *var)
            .collect();
        debug!(count = blocked.len(), "fixing unavailable assignments");
        self.constraints
            .extend(blocked.into_iter().map(|var| constraint!(var == 0.0)));
    }

    /// Weekly totals, the maximum bound and the minimum-hour shortfall.
    ///
    /// The shortfall counts whole hour units. Totals are multiples of the
    /// unit, so fewer missing units always means fewer missing hours.
    fn add_weekly_hours(&mut self, instance: &Instance) {
        let per_day = instance.schema.tenths(ShiftType::FullDay).max(
            instance.schema.tenths(ShiftType::HalfDayAm) + instance.schema.tenths(ShiftType::HalfDayPm),
        );
        let week = per_day * Day::ALL.len() as Tenths;
        let unit = instance.schema.hour_unit();

        for (staff, member) in instance.staff.iter().enumerate() {
            let week_of_staff = Slot {
                staff,
                day: Day::Monday,
                shift: ShiftType::HalfDayAm,
            }..=Slot {
                staff,
                day: Day::Sunday,
                shift: ShiftType::FullDay,
            };
            let mut worked = Expression::from(0.0);
            let mut reachable = 0;
            for (slot, var) in self.index.works.range(week_of_staff) {
                worked.add_mul(instance.schema.tenths(slot.shift) as f64, *var);
                reachable = week;
            }

            let total = self.variables.add(
                variable()
                    .integer()
                    .min(0.0)
                    .max(reachable as f64)
                    .name(format!("total_tenths_{}", member.id)),
            );
            self.constraints.push(constraint!(total == worked));
            if let Some(max_tenths) = member.max_tenths {
                self.constraints.push(constraint!(total <= max_tenths as f64));
            }

            let min_shortage = (member.min_tenths > 0).then(|| {
                let units = instance.schema.units_to_cover(member.min_tenths) as f64;
                let shortfall = self.variables.add(
                    variable()
                        .integer()
                        .min(0.0)
                        .max(units)
                        .name(format!("min_short_{}", member.id)),
                );
                let mut covered = Expression::from(0.0);
                covered.add_mul(unit as f64, shortfall);
                covered.add_mul(1.0, total);
                self.constraints
                    .push(constraint!(covered >= member.min_tenths as f64));
                self.index.empty_schedule.push((shortfall, units));
                shortfall
            });

            self.index.total_tenths.push(total);
            self.index.upper_tenths.push(
                member
                    .max_tenths
                    .map_or(reachable, |max_tenths| reachable.min(max_tenths)),
            );
            self.index.min_shortage.push(min_shortage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScheduleRequest, ShiftDefinition, ShiftDefinitions, ShiftPreference, Staff};
    use crate::settings::SolverSettings;

    fn instance(with_full_day: bool, max_hours: Option<f64>) -> Instance {
        let definition = |start: &str, end: &str, hours: f64| ShiftDefinition {
            start: start.to_owned(),
            end: end.to_owned(),
            hours,
        };
        let mut shift_definitions = ShiftDefinitions::from([
            (ShiftType::HalfDayAm, definition("11:00", "16:00", 5.0)),
            (ShiftType::HalfDayPm, definition("16:00", "21:00", 5.0)),
        ]);
        if with_full_day {
            shift_definitions.insert(ShiftType::FullDay, definition("11:00", "21:00", 10.0));
        }
        let request = ScheduleRequest {
            weekly_needs: BTreeMap::new(),
            staff_list: vec![
                Staff {
                    id: "a".into(),
                    name: "Ann".to_owned(),
                    assigned_roles_in_priority: vec!["Server".into(), "Cook".into()],
                    min_hours_per_week: Some(12.0),
                    max_hours_per_week: max_hours,
                },
                Staff {
                    id: "b".into(),
                    name: String::new(),
                    assigned_roles_in_priority: Vec::new(),
                    min_hours_per_week: None,
                    max_hours_per_week: None,
                },
            ],
            unavailability_list: Vec::new(),
            shift_definitions,
            shift_preference: ShiftPreference::None,
            staff_priority: Vec::new(),
        };
        Instance::from_request(&request, &SolverSettings::default()).unwrap()
    }

    #[test]
    fn declares_only_qualified_assignments() {
        let formulation = Formulation::build(&instance(false, None));
        assert_eq!(formulation.index.assign.len(), 2 * 7 * 2);
        assert!(formulation.index.assign.keys().all(|key| key.staff == 0));
        assert_eq!(formulation.index.shortage.len(), 7 * 2 * 2);
        assert_eq!(formulation.index.works.len(), 7 * 2);
    }

    #[test]
    fn slot_lookup_is_exact() {
        let formulation = Formulation::build(&instance(true, None));
        let slot = Slot {
            staff: 0,
            day: Day::Tuesday,
            shift: ShiftType::HalfDayPm,
        };
        let keys: Vec<_> = formulation.assignments_in(slot).map(|(key, _)| *key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|key| key.slot() == slot));
    }

    #[test]
    fn empty_schedule_leaves_all_demand_short() {
        let mut instance = instance(false, None);
        let key = (Day::Wednesday, ShiftType::HalfDayAm, 0);
        instance.demand.insert(key, 3);
        let formulation = Formulation::build(&instance);
        let shortage = formulation.index.shortage[&DemandKey {
            day: key.0,
            shift: key.1,
            role: key.2,
        }];
        let shortfall = formulation.index.min_shortage[0].unwrap();
        assert_eq!(
            formulation.index.empty_schedule,
            [(shortage, 3.0), (shortfall, 3.0)]
        );
    }

    #[test]
    fn weekly_bounds_follow_schema_and_maximum() {
        let open = Formulation::build(&instance(true, None));
        assert_eq!(open.index.upper_tenths, [700, 0]);
        assert!(open.index.min_shortage[0].is_some());
        assert!(open.index.min_shortage[1].is_none());

        let capped = Formulation::build(&instance(false, Some(12.34)));
        assert_eq!(capped.index.upper_tenths, [123, 0]);
    }
}
