//! Lexicographic objective approximated by one weighted sum.
//!
//! Tiers, most important first: demand shortage, minimum-hour shortfall,
//! shift pattern preference, staff priority and role preference. Each weight
//! is larger than the largest value all lower tiers together can reach, so a
//! unit of a higher tier is never traded for any amount of lower ones.
//!
//! Hours enter the two hour-based tiers in hour units (see
//! [`crate::shifts::ShiftSchema::hour_unit`]) rather than tenths, which keeps
//! the weights small enough for the solver's tolerances.

use good_lp::{constraint, variable, Expression, Variable};
use tracing::debug;

use crate::domain::{Day, ShiftPreference, ShiftType};
use crate::model::{AssignKey, Formulation};
use crate::preprocess::{Instance, Slot};

/// Largest magnitude each tier below the shortage tier can reach in one
/// instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierRanges {
    pub min_hours: u64,
    pub shift_pattern: u64,
    pub staff_priority: u64,
    pub role_preference: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierWeights {
    pub shortage: u64,
    pub min_hours: u64,
    pub shift_pattern: u64,
    pub staff_priority: u64,
    pub role_preference: u64,
}

impl TierWeights {
    /// Smallest integral weights where every tier outweighs all lower tiers.
    #[must_use]
    pub const fn dominating(ranges: TierRanges) -> Self {
        let role_preference = 1;
        let below_priority = role_preference * ranges.role_preference;
        let staff_priority = below_priority.saturating_add(1);
        let below_pattern = staff_priority
            .saturating_mul(ranges.staff_priority)
            .saturating_add(below_priority);
        let shift_pattern = below_pattern.saturating_add(1);
        let below_min_hours = shift_pattern
            .saturating_mul(ranges.shift_pattern)
            .saturating_add(below_pattern);
        let min_hours = below_min_hours.saturating_add(1);
        let below_shortage = min_hours
            .saturating_mul(ranges.min_hours)
            .saturating_add(below_min_hours);
        Self {
            shortage: below_shortage.saturating_add(1),
            min_hours,
            shift_pattern,
            staff_priority,
            role_preference,
        }
    }
}

pub struct Objective {
    pub expression: Expression,
    pub weights: TierWeights,
}

impl Objective {
    /// Adds the pattern auxiliaries to `formulation` and assembles the sum.
    #[must_use]
    pub fn build(instance: &Instance, formulation: &mut Formulation) -> Self {
        let pattern_terms = match instance.preference {
            ShiftPreference::PrioritizeFullDays => full_day_terms(instance, formulation),
            ShiftPreference::PrioritizeHalfDays => half_day_terms(instance, formulation),
            ShiftPreference::None => Vec::new(),
        };

        let index = &formulation.index;
        let unit = instance.schema.hour_unit();
        let ranges = TierRanges {
            min_hours: instance
                .staff
                .iter()
                .map(|member| instance.schema.units_to_cover(member.min_tenths).unsigned_abs())
                .sum(),
            shift_pattern: pattern_terms.len() as u64,
            staff_priority: instance
                .staff
                .iter()
                .zip(&index.upper_tenths)
                .map(|(member, upper)| {
                    member
                        .priority_weight
                        .saturating_mul(((*upper).max(0) / unit).unsigned_abs())
                })
                .fold(0, u64::saturating_add),
            role_preference: best_role_scores(instance, formulation),
        };
        let weights = TierWeights::dominating(ranges);
        debug!(?ranges, "objective tier ranges");

        let mut expression = Expression::from(0.0);
        for shortage in index.shortage.values() {
            expression.add_mul(-(weights.shortage as f64), *shortage);
        }
        for shortfall in index.min_shortage.iter().flatten() {
            expression.add_mul(-(weights.min_hours as f64), *shortfall);
        }
        for term in &pattern_terms {
            expression.add_mul(weights.shift_pattern as f64, *term);
        }
        for (slot, works) in &index.works {
            let priority = instance.staff[slot.staff].priority_weight;
            if priority > 0 {
                let units = (instance.schema.tenths(slot.shift) / unit).unsigned_abs();
                expression.add_mul(
                    weights
                        .staff_priority
                        .saturating_mul(priority)
                        .saturating_mul(units) as f64,
                    *works,
                );
            }
        }
        for (key, assign) in &index.assign {
            if let Some(score) = instance.role_scores.get(&(key.staff, key.role)) {
                expression.add_mul(weights.role_preference as f64 * *score as f64, *assign);
            }
        }

        Self { expression, weights }
    }
}

/// Sum over slots of the best role score reachable in that slot.
fn best_role_scores(instance: &Instance, formulation: &Formulation) -> u64 {
    formulation
        .index
        .works
        .keys()
        .map(|slot| {
            formulation
                .assignments_in(*slot)
                .filter_map(|(key, _)| instance.role_scores.get(&(key.staff, key.role)))
                .max()
                .copied()
                .unwrap_or(0)
                .unsigned_abs()
        })
        .fold(0, u64::saturating_add)
}

/// One boolean per (staff, day, role) that holds both half days in the role,
/// plus every full day assignment as it is.
fn full_day_terms(instance: &Instance, formulation: &mut Formulation) -> Vec<Variable> {
    let mut terms = Vec::new();
    for (staff, member) in instance.staff.iter().enumerate() {
        for day in Day::ALL {
            for &role in &member.roles {
                let key = |shift| AssignKey {
                    staff,
                    day,
                    shift,
                    role,
                };
                if let Some(&full) = formulation.index.assign.get(&key(ShiftType::FullDay)) {
                    terms.push(full);
                }
                let (Some(&am), Some(&pm)) = (
                    formulation.index.assign.get(&key(ShiftType::HalfDayAm)),
                    formulation.index.assign.get(&key(ShiftType::HalfDayPm)),
                ) else {
                    continue;
                };
                let both = formulation.variables.add(variable().binary().name(format!(
                    "full_day_{}_{day}_{}",
                    member.id,
                    instance.roles.name(role)
                )));
                formulation.constraints.extend([
                    constraint!(both <= am),
                    constraint!(both <= pm),
                    constraint!(am + pm - both <= 1.0),
                ]);
                terms.push(both);
            }
        }
    }
    terms
}

/// One boolean per (staff, day) that is 1 exactly when one half day is worked.
fn half_day_terms(instance: &Instance, formulation: &mut Formulation) -> Vec<Variable> {
    let mut terms = Vec::new();
    for staff in 0..instance.staff.len() {
        for day in Day::ALL {
            let works = |shift| formulation.index.works.get(&Slot { staff, day, shift }).copied();
            match (works(ShiftType::HalfDayAm), works(ShiftType::HalfDayPm)) {
                (Some(am), Some(pm)) => {
                    let exactly_one = formulation.variables.add(variable().binary().name(format!(
                        "half_day_{}_{day}",
                        instance.staff[staff].id
                    )));
                    formulation.constraints.extend([
                        constraint!(exactly_one <= am + pm),
                        constraint!(exactly_one >= am - pm),
                        constraint!(exactly_one >= pm - am),
                        constraint!(exactly_one + am + pm <= 2.0),
                    ]);
                    terms.push(exactly_one);
                }
                (Some(single), None) | (None, Some(single)) => terms.push(single),
                (None, None) => {}
            }
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_dominate_lower_tiers() {
        let ranges = TierRanges {
            min_hours: 300,
            shift_pattern: 14,
            staff_priority: 2 * 700,
            role_preference: 28,
        };
        let weights = TierWeights::dominating(ranges);
        assert_eq!(weights.role_preference, 1);
        assert_eq!(weights.staff_priority, 29);

        let below = |weights: &TierWeights, from: usize| {
            let tiers = [
                (weights.min_hours, ranges.min_hours),
                (weights.shift_pattern, ranges.shift_pattern),
                (weights.staff_priority, ranges.staff_priority),
                (weights.role_preference, ranges.role_preference),
            ];
            tiers[from..].iter().map(|(weight, range)| weight * range).sum::<u64>()
        };
        assert!(weights.shortage > below(&weights, 0));
        assert!(weights.min_hours > below(&weights, 1));
        assert!(weights.shift_pattern > below(&weights, 2));
        assert!(weights.staff_priority > below(&weights, 3));
    }

    #[test]
    fn empty_ranges_give_unit_steps() {
        let weights = TierWeights::dominating(TierRanges::default());
        assert_eq!(
            weights,
            TierWeights {
                shortage: 1,
                min_hours: 1,
                shift_pattern: 1,
                staff_priority: 1,
                role_preference: 1,
            }
        );
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let weights = TierWeights::dominating(TierRanges {
            min_hours: u64::MAX,
            shift_pattern: u64::MAX,
            staff_priority: u64::MAX,
            role_preference: u64::MAX,
        });
        assert_eq!(weights.shortage, u64::MAX);
    }
}
