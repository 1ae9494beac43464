//! Semester date ranges.
//!
//! An academic year `2025/2026` has two semesters: the first runs from July to December of the
//! start year, the second from January to June of the end year.

use crate::models::AcademicYear;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    pub fn number(self) -> u8 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::First),
            2 => Ok(Semester::Second),
            other => Err(format!("semester must be 1 or 2, got {other}")),
        }
    }
}

impl FromStr for Semester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("semester must be 1 or 2, got '{s}'"))?;

        Semester::try_from(number)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Semester {}", self.number())
    }
}

/// The inclusive date range covered by one semester of an academic year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterRange {
    pub semester: Semester,
    pub academic_year: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SemesterRange {
    /// Derives the range from the academic year's `start_year` (first semester) or `end_year`
    /// (second semester). The two years are not checked against each other.
    ///
    /// Returns `None` only if the year is outside the range [`NaiveDate`] can represent.
    pub fn for_year(year: &AcademicYear, semester: Semester) -> Option<Self> {
        let (start, end) = match semester {
            Semester::First => (
                NaiveDate::from_ymd_opt(year.start_year, 7, 1)?,
                NaiveDate::from_ymd_opt(year.start_year, 12, 31)?,
            ),
            Semester::Second => (
                NaiveDate::from_ymd_opt(year.end_year, 1, 1)?,
                NaiveDate::from_ymd_opt(year.end_year, 6, 30)?,
            ),
        };

        Some(Self {
            semester,
            academic_year: year.name.clone(),
            start,
            end,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `Semester 1 (2025/2026)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.semester, self.academic_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year() -> AcademicYear {
        AcademicYear {
            id: 1,
            name: "2025/2026".to_string(),
            start_year: 2025,
            end_year: 2026,
            is_active: true,
        }
    }

    #[test]
    fn first_semester_covers_july_to_december_of_start_year() {
        let range = SemesterRange::for_year(&year(), Semester::First).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(range.label(), "Semester 1 (2025/2026)");
    }

    #[test]
    fn second_semester_covers_january_to_june_of_end_year() {
        let range = SemesterRange::for_year(&year(), Semester::Second).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());
        assert!(range.contains(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()));
    }

    #[test]
    fn semester_numbers_outside_one_and_two_are_rejected() {
        assert_eq!("2".parse::<Semester>(), Ok(Semester::Second));
        assert!("3".parse::<Semester>().is_err());
        assert!("".parse::<Semester>().is_err());
        assert!(Semester::try_from(0).is_err());
    }
}
