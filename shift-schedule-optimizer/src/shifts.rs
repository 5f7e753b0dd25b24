use thiserror::Error;

use crate::domain::{ShiftDefinitions, ShiftType};
use crate::time::{hours_to_tenths, is_hh_mm, Tenths, TimeWindow};

/// Longest evening shift that may run past midnight.
const MAX_CROSS_DAY_MINUTES: u32 = 12 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftDefinitionError {
    #[error("Missing required shift types (HALF_DAY_AM, HALF_DAY_PM).")]
    MissingShiftTypes,
    #[error("Invalid time format (must be HH:MM).")]
    InvalidTimeFormat,
    #[error("Invalid time value in shift definitions.")]
    InvalidTimeValue,
    #[error("AM start must be before AM end.")]
    AmNotOrdered,
    #[error("AM shift end must equal PM shift start.")]
    Discontinuous,
    #[error("Cross-day PM shift must last more than 0 and at most 12 hours.")]
    CrossDayDuration,
    #[error("Full day time must match AM start and PM end.")]
    FullDayMismatch,
    #[error("Shift hours for {0} must be a positive number.")]
    InvalidHours(ShiftType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSpec {
    pub shift_type: ShiftType,
    pub window: TimeWindow,
    /// Paid duration, taken from the caller's `hours` rather than the window.
    pub tenths: Tenths,
}

/// Validated shift types of one run, ordered AM, PM, full day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSchema {
    shifts: Vec<ShiftSpec>,
}

impl ShiftSchema {
    #[must_use]
    pub fn get(&self, shift_type: ShiftType) -> Option<&ShiftSpec> {
        self.shifts.iter().find(|spec| spec.shift_type == shift_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShiftSpec> {
        self.shifts.iter()
    }

    pub fn shift_types(&self) -> impl Iterator<Item = ShiftType> + '_ {
        self.shifts.iter().map(|spec| spec.shift_type)
    }

    #[must_use]
    pub fn contains(&self, shift_type: ShiftType) -> bool {
        self.get(shift_type).is_some()
    }

    #[must_use]
    pub fn has_full_day(&self) -> bool {
        self.contains(ShiftType::FullDay)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    #[must_use]
    pub fn tenths(&self, shift_type: ShiftType) -> Tenths {
        self.get(shift_type).map_or(0, |spec| spec.tenths)
    }

    /// Largest duration every shift is a whole multiple of. Weekly totals
    /// only ever move in steps of this size.
    #[must_use]
    pub fn hour_unit(&self) -> Tenths {
        self.shifts
            .iter()
            .map(|spec| spec.tenths)
            .fold(0, gcd)
            .max(1)
    }

    /// Whole hour units needed to cover `tenths`, rounded up.
    #[must_use]
    pub fn units_to_cover(&self, tenths: Tenths) -> Tenths {
        let unit = self.hour_unit();
        (tenths.max(0) + unit - 1) / unit
    }
}

const fn gcd(a: Tenths, b: Tenths) -> Tenths {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Checks the caller's shift definitions and turns them into minute offsets.
///
/// The checks run in a fixed order and stop at the first failure:
/// required keys, `HH:MM` syntax, clock range, AM ordering, PM continuity (or a
/// bounded cross-day PM), full day bounds and finally positive hours.
///
/// The PM shift may wrap past midnight. In that case it is not required to
/// start where AM ends.
pub fn validate_shift_definitions(
    definitions: &ShiftDefinitions,
) -> Result<ShiftSchema, ShiftDefinitionError> {
    let (Some(am), Some(pm)) = (
        definitions.get(&ShiftType::HalfDayAm),
        definitions.get(&ShiftType::HalfDayPm),
    ) else {
        return Err(ShiftDefinitionError::MissingShiftTypes);
    };
    let full = definitions.get(&ShiftType::FullDay);

    let mut all_times = [&am.start, &am.end, &pm.start, &pm.end]
        .into_iter()
        .chain(full.into_iter().flat_map(|full| [&full.start, &full.end]));
    if !all_times.all(|time| is_hh_mm(time)) {
        return Err(ShiftDefinitionError::InvalidTimeFormat);
    }

    let parse = |start: &str, end: &str| {
        TimeWindow::parse(start, end).map_err(|_| ShiftDefinitionError::InvalidTimeValue)
    };
    let am_window = parse(&am.start, &am.end)?;
    let pm_window = parse(&pm.start, &pm.end)?;
    let full_window = full
        .map(|full| parse(&full.start, &full.end))
        .transpose()?;

    if am_window.start >= am_window.end {
        return Err(ShiftDefinitionError::AmNotOrdered);
    }

    if pm_window.start < pm_window.end {
        if am_window.end != pm_window.start {
            return Err(ShiftDefinitionError::Discontinuous);
        }
    } else {
        let wrapped = pm_window.duration_minutes();
        if wrapped == 0 || wrapped > MAX_CROSS_DAY_MINUTES {
            return Err(ShiftDefinitionError::CrossDayDuration);
        }
    }

    if let Some(full_window) = full_window {
        if full_window.start != am_window.start || full_window.end != pm_window.end {
            return Err(ShiftDefinitionError::FullDayMismatch);
        }
    }

    let spec = |shift_type: ShiftType, window: TimeWindow, hours: f64| {
        let tenths = if hours.is_finite() {
            hours_to_tenths(hours)
        } else {
            0
        };
        if tenths <= 0 {
            return Err(ShiftDefinitionError::InvalidHours(shift_type));
        }
        Ok(ShiftSpec {
            shift_type,
            window,
            tenths,
        })
    };

    let mut shifts = vec![
        spec(ShiftType::HalfDayAm, am_window, am.hours)?,
        spec(ShiftType::HalfDayPm, pm_window, pm.hours)?,
    ];
    if let (Some(full), Some(full_window)) = (full, full_window) {
        shifts.push(spec(ShiftType::FullDay, full_window, full.hours)?);
    }
    Ok(ShiftSchema { shifts })
}
