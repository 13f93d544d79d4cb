/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const CALENDAR_ROUTE_COMPONENT: &str = "calendar";
pub const MEETS_ROUTE_COMPONENT: &str = "meets";

/// Number of availability slots in one calendar day (half-hour granularity).
pub const SLOTS_PER_DAY: usize = 30;

/// Width of the packed on-disk form of one day's slots.
pub const PACKED_DAY_LEN: usize = 4;

/// Number of calendar dates in a week window.
pub const DAYS_PER_WEEK: usize = 7;
