use time::{Date, Month};

use crate::{Error, Result};

/// Comparison operator as written in an `age_numerical` criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgeComparison {
	Gt,
	Gte,
	Lt,
	Lte,
}

/// Direction of the equivalent birth-date comparison. Being older than a
/// threshold age means being born on or before the threshold date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateComparison {
	Before,
	OnOrBefore,
	After,
	OnOrAfter,
}
impl DateComparison {
	pub fn matches(self, birth_date: Date, threshold: Date) -> bool {
		match self {
			Self::Before => birth_date < threshold,
			Self::OnOrBefore => birth_date <= threshold,
			Self::After => birth_date > threshold,
			Self::OnOrAfter => birth_date >= threshold,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgeCriterion {
	pub comparison: AgeComparison,
	pub years: i32,
	pub months: i32,
	pub raw: String,
}
impl AgeCriterion {
	/// Parse an age criterion such as ">=18", "<12" or ">=0.5". The fractional
	/// part denotes months: ".5" is six months, ".25" is three.
	pub fn parse(raw: &str) -> Result<Self> {
		let (comparison, rest) = if let Some(rest) = raw.strip_prefix(">=") {
			(AgeComparison::Gte, rest)
		} else if let Some(rest) = raw.strip_prefix("<=") {
			(AgeComparison::Lte, rest)
		} else if let Some(rest) = raw.strip_prefix('>') {
			(AgeComparison::Gt, rest)
		} else if let Some(rest) = raw.strip_prefix('<') {
			(AgeComparison::Lt, rest)
		} else {
			return Err(Error::UnrecognizedCriteria {
				message: format!("age criterion {raw:?} must begin with >=, <=, > or <"),
			});
		};
		let (year_part, month_part) = match rest.split_once('.') {
			Some((years, fraction)) => (years, Some(fraction)),
			None => (rest, None),
		};
		let years: i32 = if year_part.is_empty() {
			0
		} else {
			year_part.parse().map_err(|_| Error::UnrecognizedCriteria {
				message: format!("age criterion {raw:?} has a non-numeric year component"),
			})?
		};
		let months = match month_part {
			Some(fraction) if !fraction.is_empty() => {
				let digits: u32 = fraction.parse().map_err(|_| Error::UnrecognizedCriteria {
					message: format!("age criterion {raw:?} has a non-numeric month fraction"),
				})?;
				let scale = 10_u32.pow(fraction.len() as u32);

				((digits * 12) / scale) as i32
			},
			_ => 0,
		};

		Ok(Self { comparison, years, months, raw: raw.to_string() })
	}

	/// The birth date exactly `years` + `months` before `today`, handling
	/// month subtraction across a year boundary. The day of month is clamped
	/// to the target month's length.
	pub fn birth_date_threshold(&self, today: Date) -> Result<Date> {
		let mut year = today.year() - self.years;
		let mut month = today.month() as i32 - self.months;

		if month <= 0 {
			month += 12;
			year -= 1;
		}

		let month = Month::try_from(month as u8).map_err(|_| Error::UnrecognizedCriteria {
			message: format!("age criterion {:?} produced an invalid month", self.raw),
		})?;
		let day = today.day().min(month.length(year));

		Date::from_calendar_date(year, month, day).map_err(|_| Error::UnrecognizedCriteria {
			message: format!("age criterion {:?} produced an invalid date", self.raw),
		})
	}

	/// Invert the age comparison into its birth-date direction: an earlier
	/// birth date means an older patient.
	pub fn birth_date_comparison(&self) -> DateComparison {
		match self.comparison {
			AgeComparison::Gte => DateComparison::OnOrBefore,
			AgeComparison::Lte => DateComparison::OnOrAfter,
			AgeComparison::Gt => DateComparison::Before,
			AgeComparison::Lt => DateComparison::After,
		}
	}
}
