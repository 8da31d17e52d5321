//! Rule-based public holiday calendars.
//!
//! Calendars list fixed-date holidays, Easter-relative holidays (Gregorian or
//! Orthodox computus) and nth-weekday holidays. Observed-day shifts for
//! holidays falling on weekends are not modelled.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use derive_more::Display;
use std::collections::HashSet;

/// A named public holiday on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    /// Date of the holiday
    pub date: NaiveDate,
    /// Holiday name
    pub name: &'static str,
}

/// Countries with a built-in holiday calendar.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
    /// Netherlands
    Netherlands,
    /// Italy
    Italy,
    /// Romania
    Romania,
    /// United States (federal holidays)
    #[display("United States")]
    UnitedStates,
}

impl Country {
    /// Every country with a calendar.
    pub const ALL: [Self; 4] = [
        Self::Netherlands,
        Self::Italy,
        Self::Romania,
        Self::UnitedStates,
    ];

    /// Resolve a country by name, ignoring case, spaces and underscores.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "netherlands" | "nl" => Some(Self::Netherlands),
            "italy" | "it" => Some(Self::Italy),
            "romania" | "ro" => Some(Self::Romania),
            "unitedstates" | "usa" | "us" => Some(Self::UnitedStates),
            _ => None,
        }
    }

    /// Holidays in `year`, sorted by date.
    ///
    /// When two holidays share a date only the first listed one is kept.
    pub fn holidays(self, year: i32) -> Vec<Holiday> {
        let mut list = Vec::new();
        let mut push = |date: Option<NaiveDate>, name: &'static str| {
            if let Some(date) = date {
                list.push(Holiday { date, name });
            }
        };
        let fixed = |month, day| NaiveDate::from_ymd_opt(year, month, day);

        match self {
            Self::Netherlands => {
                let easter = gregorian_easter(year);
                push(fixed(1, 1), "New year");
                push(offset(easter, -2), "Good Friday");
                push(easter, "Easter Sunday");
                push(offset(easter, 1), "Easter Monday");
                push(kings_day(year), "King's day");
                push(fixed(5, 5), "Liberation Day");
                push(offset(easter, 39), "Ascension Thursday");
                push(offset(easter, 49), "Whit Sunday");
                push(offset(easter, 50), "Whit Monday");
                push(fixed(12, 25), "Christmas Day");
                push(fixed(12, 26), "Boxing Day");
            }
            Self::Italy => {
                let easter = gregorian_easter(year);
                push(fixed(1, 1), "New year");
                push(fixed(1, 6), "Epiphany");
                push(easter, "Easter Sunday");
                push(offset(easter, 1), "Easter Monday");
                push(fixed(4, 25), "Liberation Day");
                push(fixed(5, 1), "International Workers' Day");
                push(fixed(6, 2), "Republic Day");
                push(fixed(8, 15), "Assumption of Mary to Heaven");
                push(fixed(11, 1), "All Saints Day");
                push(fixed(12, 8), "Immaculate Conception");
                push(fixed(12, 25), "Christmas Day");
                push(fixed(12, 26), "St Stephen's Day");
            }
            Self::Romania => {
                let easter = orthodox_easter(year);
                push(fixed(1, 1), "New year");
                push(fixed(1, 2), "Day After New Year");
                push(fixed(1, 24), "Union Day");
                if year >= 2018 {
                    push(offset(easter, -2), "Good Friday");
                }
                push(easter, "Easter Sunday");
                push(offset(easter, 1), "Easter Monday");
                push(fixed(5, 1), "Labour Day");
                if year >= 2017 {
                    push(fixed(6, 1), "Children's Day");
                }
                push(offset(easter, 49), "Pentecost");
                push(offset(easter, 50), "Whit Monday");
                push(fixed(8, 15), "Dormition of the Theotokos");
                push(fixed(11, 30), "St. Andrew's Day");
                push(fixed(12, 1), "National Day");
                push(fixed(12, 25), "Christmas Day");
                push(fixed(12, 26), "Second Day of Christmas");
            }
            Self::UnitedStates => {
                push(fixed(1, 1), "New year");
                push(nth_weekday(year, 1, Weekday::Mon, 3), "Birthday of Martin Luther King, Jr.");
                push(nth_weekday(year, 2, Weekday::Mon, 3), "Washington's Birthday");
                push(last_weekday(year, 5, Weekday::Mon), "Memorial Day");
                push(fixed(7, 4), "Independence Day");
                push(nth_weekday(year, 9, Weekday::Mon, 1), "Labor Day");
                push(nth_weekday(year, 10, Weekday::Mon, 2), "Columbus Day");
                push(fixed(11, 11), "Veterans Day");
                push(thanksgiving(year), "Thanksgiving Day");
                push(fixed(12, 25), "Christmas Day");
            }
        }

        let mut seen = HashSet::new();
        list.retain(|h| seen.insert(h.date));
        list.sort_by_key(|h| h.date);
        list
    }
}

fn offset(date: Option<NaiveDate>, days: i64) -> Option<NaiveDate> {
    let date = date?;
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn kings_day(year: i32) -> Option<NaiveDate> {
    let (month, day) = if year >= 2014 { (4, 27) } else { (4, 30) };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if date.weekday() == Weekday::Sun {
        date.pred_opt()
    } else {
        Some(date)
    }
}

/// Easter Sunday in the Gregorian calendar (anonymous Gregorian algorithm).
pub fn gregorian_easter(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let n = h + l - 7 * m + 114;
    NaiveDate::from_ymd_opt(year, (n / 31) as u32, (n % 31 + 1) as u32)
}

/// Orthodox Easter Sunday, expressed as a Gregorian date.
///
/// Uses the Julian computus and the 13-day calendar offset valid for
/// 1900-2099.
pub fn orthodox_easter(year: i32) -> Option<NaiveDate> {
    let a = year % 4;
    let b = year % 7;
    let c = year % 19;
    let d = (19 * c + 15) % 30;
    let e = (2 * a + 4 * b - d + 34) % 7;
    let n = d + e + 114;
    let julian = NaiveDate::from_ymd_opt(year, (n / 31) as u32, (n % 31 + 1) as u32)?;
    julian.checked_add_days(Days::new(13))
}

/// The `n`-th given weekday of a month (1-based).
pub fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// The last given weekday of a month.
pub fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = first_of_next.pred_opt()?;
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last.checked_sub_days(Days::new(u64::from(back)))
}

/// US Thanksgiving: fourth Thursday of November.
pub fn thanksgiving(year: i32) -> Option<NaiveDate> {
    nth_weekday(year, 11, Weekday::Thu, 4)
}
