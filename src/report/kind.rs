//! The four fixed reports and the periods they cover.

use std::{fmt::Display, str::FromStr};

use time::{Date, Month};

use crate::Error;

/// One of the aggregate views that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Total volume per agent for one calendar month.
    MonthlyVolume,
    /// Number of transactions per agent for one calendar month.
    MonthlyTransactions,
    /// Total volume per agent for the current calendar year.
    YtdVolume,
    /// Number of transactions per agent for the current calendar year.
    YtdTransactions,
}

impl ReportKind {
    /// Every report kind, in the order they are shown on the landing page.
    pub const ALL: [ReportKind; 4] = [
        ReportKind::MonthlyVolume,
        ReportKind::MonthlyTransactions,
        ReportKind::YtdVolume,
        ReportKind::YtdTransactions,
    ];

    /// The report shown when a request does not name one.
    pub const DEFAULT: ReportKind = ReportKind::MonthlyVolume;

    /// The name used in URLs and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::MonthlyVolume => "monthly_volume",
            ReportKind::MonthlyTransactions => "monthly_transactions",
            ReportKind::YtdVolume => "ytd_volume",
            ReportKind::YtdTransactions => "ytd_transactions",
        }
    }

    /// Whether the report sums dollar volume rather than counting transactions.
    pub fn is_volume(self) -> bool {
        matches!(self, ReportKind::MonthlyVolume | ReportKind::YtdVolume)
    }

    /// Whether the report covers the current year rather than a chosen month.
    pub fn is_year_to_date(self) -> bool {
        matches!(self, ReportKind::YtdVolume | ReportKind::YtdTransactions)
    }

    /// The distance between ticks on the value axis.
    pub fn tick_step(self) -> f64 {
        match self {
            ReportKind::MonthlyVolume => 200_000.0,
            ReportKind::MonthlyTransactions => 1.0,
            ReportKind::YtdVolume => 1_000_000.0,
            ReportKind::YtdTransactions => 5.0,
        }
    }

    /// The label for the value axis.
    pub fn value_axis_name(self) -> &'static str {
        match self {
            ReportKind::MonthlyVolume => "Volume ($)",
            ReportKind::YtdVolume => "Volume (Millions $)",
            ReportKind::MonthlyTransactions | ReportKind::YtdTransactions => "Transactions",
        }
    }

    /// The chart title for this report over `period`.
    pub fn title(self, period: &Period) -> String {
        let label = match period {
            Period::Month { month, .. } => month.to_string(),
            Period::Year(year) => year.to_string(),
        };

        match self {
            ReportKind::MonthlyVolume => format!("Monthly Volume - {label}"),
            ReportKind::MonthlyTransactions => format!("Monthly Transactions - {label}"),
            ReportKind::YtdVolume => format!("YTD Volume ({label})"),
            ReportKind::YtdTransactions => format!("YTD Transactions ({label})"),
        }
    }

    /// Work out the period this report covers.
    ///
    /// Monthly reports parse `month` as `YYYY-MM`. Year-to-date reports
    /// ignore `month` and use the year of `today`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if a monthly report gets a malformed month.
    pub fn period(self, month: &str, today: Date) -> Result<Period, Error> {
        if self.is_year_to_date() {
            Ok(Period::Year(today.year()))
        } else {
            month.parse()
        }
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedReportKind(s.to_owned()))
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The window of time a report aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// A calendar month, displayed as `YYYY-MM`.
    Month {
        /// The year of the month.
        year: i32,
        /// The month of the year.
        month: Month,
    },
    /// A calendar year, displayed as `YYYY`.
    Year(i32),
}

impl Period {
    /// The month containing `date`.
    pub fn month_of(date: Date) -> Self {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The SQLite `strftime` format that turns a transaction date into a
    /// string comparable with this period's display form.
    pub fn strftime_format(&self) -> &'static str {
        match self {
            Period::Month { .. } => "%Y-%m",
            Period::Year(_) => "%Y",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Month { year, month } => write!(f, "{year:04}-{:02}", *month as u8),
            Period::Year(year) => write!(f, "{year:04}"),
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Parse a month in the format `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPeriod(s.to_owned());

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;

        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Period::Month { year, month })
    }
}
