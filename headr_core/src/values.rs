use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Smallest year a header can carry (four digits).
pub const MIN_YEAR: u32 = 1000;
/// Largest year a header can carry (four digits).
pub const MAX_YEAR: u32 = 9999;

const SECONDS_PER_DAY: i64 = 86_400;

/// Values that change over time and are supplied by the caller at the moment
/// a header is matched or rendered.
///
/// The engine never reads the clock itself. Hosts build this from wall-clock
/// time with [`DynamicValues::now`] and tests pass a fixed year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DynamicValues {
	current_year: u32,
}

impl DynamicValues {
	/// Create dynamic values for the given year.
	///
	/// # Panics
	///
	/// Panics when `current_year` is outside `1000..=9999`. Use
	/// [`DynamicValues::try_new`] for untrusted input.
	pub fn new(current_year: u32) -> Self {
		assert!(
			(MIN_YEAR..=MAX_YEAR).contains(&current_year),
			"current year must be between {MIN_YEAR} and {MAX_YEAR}, inclusive (got \
			 {current_year})"
		);

		Self { current_year }
	}

	/// Create dynamic values, returning `None` when the year is not four
	/// digits.
	pub fn try_new(current_year: i64) -> Option<Self> {
		u32::try_from(current_year)
			.ok()
			.filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
			.map(|current_year| Self { current_year })
	}

	/// Derive dynamic values from the current wall-clock time (UTC).
	pub fn now() -> Self {
		Self::from_system_time(SystemTime::now())
	}

	/// Derive dynamic values from a point in time (UTC). Times outside the
	/// four digit range are clamped to it.
	pub fn from_system_time(time: SystemTime) -> Self {
		let seconds = match time.duration_since(UNIX_EPOCH) {
			Ok(duration) => i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
			Err(err) => -i64::try_from(err.duration().as_secs()).unwrap_or(i64::MAX),
		};
		let year = year_from_days(seconds.div_euclid(SECONDS_PER_DAY));
		let current_year =
			u32::try_from(year.clamp(i64::from(MIN_YEAR), i64::from(MAX_YEAR))).unwrap_or(MAX_YEAR);

		Self { current_year }
	}

	pub fn current_year(&self) -> u32 {
		self.current_year
	}
}

/// Convert days since 1970-01-01 into a proleptic Gregorian year.
fn year_from_days(days: i64) -> i64 {
	let shifted = days + 719_468;
	let era = shifted.div_euclid(146_097);
	let day_of_era = shifted - era * 146_097;
	let year_of_era =
		(day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
	let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
	let month_index = (5 * day_of_year + 2) / 153;
	let year = year_of_era + era * 400;

	// Years start in March in this calendar; January and February belong to
	// the following civil year.
	if month_index >= 10 { year + 1 } else { year }
}
