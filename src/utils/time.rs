use chrono::{DateTime, Local, NaiveDate, Utc};

/// Decides which calendar a moment belongs to when it's turned into a log date.
///
/// Near midnight the two options disagree, so an entry logged at 00:30 local time on a machine
/// east of UTC lands on a different day depending on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    #[default]
    Local,
    Utc,
}

impl CalendarZone {
    pub fn date_of(self, moment: DateTime<Utc>) -> NaiveDate {
        match self {
            CalendarZone::Local => moment.with_timezone(&Local).date_naive(),
            CalendarZone::Utc => moment.date_naive(),
        }
    }
}

/// This is the standard way of converting a date to a string in pointlog.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
