mod calendar;
mod healthcheck;
mod meets;

use chrono::NaiveDate;
use salvo::Router;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthMiddleware;
use huddle_core::constants::API_ROUTE_COMPONENT;
use huddle_service::error::ServiceError;
use huddle_service::schedule::DayAvailability;

/// ## Summary
/// Constructs the main API router. The healthcheck stays outside the
/// identity middleware; everything else requires a resolved user.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(
            Router::new()
                .hoop(AuthMiddleware)
                .push(calendar::routes())
                .push(meets::routes()),
        )
}

/// One day of a week in wire form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPayload {
    pub date: NaiveDate,
    pub slots: Vec<bool>,
}

impl From<DayAvailability> for DayPayload {
    fn from(day: DayAvailability) -> Self {
        Self {
            date: day.date,
            slots: day.slots.as_array().to_vec(),
        }
    }
}

/// ## Summary
/// Parses a calendar date from wire form (`YYYY-MM-DD`).
///
/// ## Errors
/// Returns a validation error (HTTP 400) for anything unparseable.
pub(crate) fn parse_date(value: &str) -> AppResult<NaiveDate> {
    value.parse::<NaiveDate>().map_err(|_| {
        ServiceError::ValidationError(format!("'{value}' is not a calendar date")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2025-12-16").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 16).unwrap()
        );
    }

    #[test_log::test]
    fn test_parse_date_rejects_garbage() {
        for bad in ["not-a-date", "2025-13-01", "2025-02-30", ""] {
            assert!(parse_date(bad).is_err(), "'{bad}' should not parse");
        }
    }

    #[test_log::test]
    fn test_day_payload_keeps_slot_order() {
        use huddle_core::constants::SLOTS_PER_DAY;
        use huddle_core::slots::DaySlots;

        let mut slots = [false; SLOTS_PER_DAY];
        slots[2] = true;
        let payload = DayPayload::from(DayAvailability {
            date: NaiveDate::from_ymd_opt(2025, 12, 16).unwrap(),
            slots: DaySlots::new(slots),
        });

        assert_eq!(payload.slots.len(), SLOTS_PER_DAY);
        assert!(payload.slots[2]);
        assert_eq!(payload.slots.iter().filter(|s| **s).count(), 1);
    }
}
