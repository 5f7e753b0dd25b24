use serde_json::json;
use shift_schedule_optimizer::ScheduleRequest;

/// A small restaurant week: five staff, three roles and an evening shift that
/// closes after midnight.
pub fn week() -> Result<ScheduleRequest, serde_json::Error> {
    let weekday = json!({
        "HALF_DAY_AM": {"Server": 1, "Cook": 1},
        "HALF_DAY_PM": {"Server": 2, "Cook": 1, "Cashier": 1}
    });
    let weekend = json!({
        "HALF_DAY_AM": {"Server": 2, "Cook": 1, "Cashier": 1},
        "HALF_DAY_PM": {"Server": 2, "Cook": 2, "Cashier": 1}
    });
    serde_json::from_value(json!({
        "staffList": [
            {"id": "emp1", "name": "Alice", "assignedRolesInPriority": ["Server", "Cashier"],
             "minHoursPerWeek": 21, "maxHoursPerWeek": 35},
            {"id": "emp2", "name": "Bob", "assignedRolesInPriority": ["Cook"],
             "minHoursPerWeek": 28, "maxHoursPerWeek": 42},
            {"id": "emp3", "name": "Chiara", "assignedRolesInPriority": ["Cashier", "Server"],
             "maxHoursPerWeek": 28},
            {"id": "emp4", "name": "Dmitri", "assignedRolesInPriority": ["Cook", "Server"],
             "minHoursPerWeek": 14, "maxHoursPerWeek": 35},
            {"id": "emp5", "name": "Eun-ji", "assignedRolesInPriority": ["Server"],
             "maxHoursPerWeek": 21}
        ],
        "unavailabilityList": [
            {"employeeId": "emp1", "dayOfWeek": "Monday",
             "shifts": [{"start": "00:00", "end": "23:59"}]},
            {"employeeId": "emp3", "dayOfWeek": "Friday",
             "shifts": [{"start": "19:00", "end": "02:00"}]},
            {"employeeId": "emp4", "dayOfWeek": "Sunday",
             "shifts": [{"start": "01:00", "end": "09:00"}]}
        ],
        "weeklyNeeds": {
            "Monday": weekday,
            "Tuesday": weekday,
            "Wednesday": weekday,
            "Thursday": weekday,
            "Friday": weekend,
            "Saturday": weekend,
            "Sunday": weekday
        },
        "shiftDefinitions": {
            "HALF_DAY_AM": {"start": "12:00", "end": "19:00", "hours": 7},
            "HALF_DAY_PM": {"start": "19:00", "end": "02:00", "hours": 7},
            "FULL_DAY": {"start": "12:00", "end": "02:00", "hours": 14}
        },
        "shiftPreference": "PRIORITIZE_FULL_DAYS",
        "staffPriority": ["emp2", "emp1"]
    }))
}
