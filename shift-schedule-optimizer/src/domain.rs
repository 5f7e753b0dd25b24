//! Request-scoped input and output types of a weekly scheduling run.
//!
//! Everything in here is plain data that round-trips through JSON with the
//! camelCase field names the request boundary speaks.

use alloc::collections::BTreeMap;
use core::borrow::Borrow;
use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// The following day within the same week. Sunday has none.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Monday => Some(Self::Tuesday),
            Self::Tuesday => Some(Self::Wednesday),
            Self::Wednesday => Some(Self::Thursday),
            Self::Thursday => Some(Self::Friday),
            Self::Friday => Some(Self::Saturday),
            Self::Saturday => Some(Self::Sunday),
            Self::Sunday => None,
        }
    }

    /// The preceding day within the same week. Monday has none.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Monday => None,
            Self::Tuesday => Some(Self::Monday),
            Self::Wednesday => Some(Self::Tuesday),
            Self::Thursday => Some(Self::Wednesday),
            Self::Friday => Some(Self::Thursday),
            Self::Saturday => Some(Self::Friday),
            Self::Sunday => Some(Self::Saturday),
        }
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named time-of-day work block.
///
/// Which of these exist in a run is decided by the caller's shift definitions:
/// the two half days are mandatory, the full day is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftType {
    HalfDayAm,
    HalfDayPm,
    FullDay,
}

impl ShiftType {
    pub const ALL: [Self; 3] = [Self::HalfDayAm, Self::HalfDayPm, Self::FullDay];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HalfDayAm => "HALF_DAY_AM",
            Self::HalfDayPm => "HALF_DAY_PM",
            Self::FullDay => "FULL_DAY",
        }
    }

    #[must_use]
    pub const fn is_half_day(self) -> bool {
        matches!(self, Self::HalfDayAm | Self::HalfDayPm)
    }
}

impl Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(
    /// Unique identifier of a staff member.
    StaffId
);
string_newtype!(
    /// A job function such as `Server` or `Cashier`.
    RoleName
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: StaffId,
    #[serde(default)]
    pub name: String,
    /// Qualified roles, most preferred first.
    pub assigned_roles_in_priority: Vec<RoleName>,
    #[serde(default)]
    pub min_hours_per_week: Option<f64>,
    #[serde(default)]
    pub max_hours_per_week: Option<f64>,
}

impl Staff {
    /// Name used in human readable warnings, falls back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

/// Raw `HH:MM` bounds as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub start: String,
    pub end: String,
    pub hours: f64,
}

pub type ShiftDefinitions = BTreeMap<ShiftType, ShiftDefinition>;

/// Day -> shift type -> role -> required headcount. Missing entries mean zero.
pub type WeeklyNeeds = BTreeMap<Day, BTreeMap<ShiftType, BTreeMap<RoleName, i64>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailabilityEntry {
    pub employee_id: StaffId,
    pub day_of_week: Day,
    #[serde(default)]
    pub shifts: Vec<TimeSpan>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftPreference {
    #[default]
    PrioritizeFullDays,
    PrioritizeHalfDays,
    None,
}

/// Everything one solve consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub weekly_needs: WeeklyNeeds,
    pub staff_list: Vec<Staff>,
    pub unavailability_list: Vec<UnavailabilityEntry>,
    pub shift_definitions: ShiftDefinitions,
    #[serde(default)]
    pub shift_preference: ShiftPreference,
    /// Staff ids, highest priority first.
    #[serde(default)]
    pub staff_priority: Vec<StaffId>,
}

/// Day -> shift type -> role -> assigned staff. Empty levels are never present.
pub type Schedule = BTreeMap<Day, BTreeMap<ShiftType, BTreeMap<RoleName, Vec<StaffId>>>>;
