// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::PersistenceError;

/// Fixed-width UTC form, so lexical order in SQLite matches time order.
pub(crate) fn format(dt: DateTime<Utc>) -> String {
	dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse(value: &str, field: &str) -> Result<DateTime<Utc>, PersistenceError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| PersistenceError::Internal(format!("Invalid {field}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn format_is_fixed_width_and_sortable() {
		let early = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
		let late = early + chrono::Duration::milliseconds(1500);
		let (a, b) = (format(early), format(late));
		assert_eq!(a, "2025-01-02T03:04:05.000Z");
		assert_eq!(a.len(), b.len());
		assert!(a < b);
	}

	#[test]
	fn parse_rejects_garbage() {
		assert!(parse("yesterday", "finished_at").is_err());
		let dt = parse("2025-01-02T03:04:05.000Z", "finished_at").unwrap();
		assert_eq!(format(dt), "2025-01-02T03:04:05.000Z");
	}
}
