use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{cut, ExtractionResult, FieldExtractor};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

// Indexed like chrono's `num_days_from_sunday`.
const WEEKDAYS: [&[&str]; 7] = [
    &["domingo"],
    &["lunes"],
    &["martes"],
    &["miércoles", "miercoles"],
    &["jueves"],
    &["viernes"],
    &["sábado", "sabado"],
];

static CALENDAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:el\s+)?(\d{1,2})\s*(?:del|de|/|-)\s*(\d{1,2}|enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\b(?:\s*(?:del|de|/|-)\s*(\d{4}|\d{2})\b)?",
    )
    .expect("valid calendar date regex")
});
static DAY_AFTER_TOMORROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpasado\s+mañana\b").expect("valid relative date regex"));
static TOMORROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bmañana\b").expect("valid relative date regex"));
static TODAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bhoy\b").expect("valid relative date regex"));
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:el\s+)?(domingo|lunes|martes|miércoles|miercoles|jueves|viernes|sábado|sabado)\b")
        .expect("valid weekday regex")
});

/// Resolves a start date relative to `today`.
///
/// Rules are tried in order and the first one that yields a real date wins:
/// calendar dates ("el 5 de marzo", "5/3/25"), relative keywords
/// ("pasado mañana", "mañana", "hoy"), then weekday names. A weekday always
/// resolves to its next occurrence, one to seven days ahead.
#[derive(Debug, Clone, Copy)]
pub struct DateExtractor {
    today: NaiveDate,
}

impl DateExtractor {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    fn calendar(&self, text: &str) -> Option<ExtractionResult<NaiveDate>> {
        let caps = CALENDAR_RE.captures(text)?;
        let date = self.calendar_date(&caps)?;
        let span = caps.get(0)?.range();
        Some(ExtractionResult::found(date, cut(text, span)))
    }

    fn calendar_date(&self, caps: &Captures) -> Option<NaiveDate> {
        let day: u32 = caps[1].parse().ok()?;
        let month_raw = &caps[2];
        let month_index = match month_raw.parse::<u32>() {
            Ok(number) => number.checked_sub(1)?,
            Err(_) if month_raw == "setiembre" => 8,
            Err(_) => MONTHS.iter().position(|m| *m == month_raw)? as u32,
        };
        if month_index > 11 {
            return None;
        }
        let year = match caps.get(3) {
            Some(m) => {
                let year: i32 = m.as_str().parse().ok()?;
                if m.as_str().len() == 2 {
                    year + 2000
                } else {
                    year
                }
            }
            None => self.today.year(),
        };
        NaiveDate::from_ymd_opt(year, month_index + 1, day)
    }

    fn relative(&self, text: &str) -> Option<ExtractionResult<NaiveDate>> {
        [(&*DAY_AFTER_TOMORROW_RE, 2), (&*TOMORROW_RE, 1), (&*TODAY_RE, 0)]
            .into_iter()
            .find_map(|(re, offset)| {
                let m = re.find(text)?;
                let date = self.today.checked_add_days(Days::new(offset))?;
                Some(ExtractionResult::found(date, cut(text, m.range())))
            })
    }

    fn weekday(&self, text: &str) -> Option<ExtractionResult<NaiveDate>> {
        let caps = WEEKDAY_RE.captures(text)?;
        let name = caps.get(1)?.as_str();
        let target = WEEKDAYS.iter().position(|names| names.contains(&name))? as i64;
        let current = self.today.weekday().num_days_from_sunday() as i64;
        let mut days = (target - current).rem_euclid(7);
        if days <= 0 {
            days = 7;
        }
        let date = self.today.checked_add_days(Days::new(days as u64))?;
        Some(ExtractionResult::found(date, cut(text, caps.get(0)?.range())))
    }
}

impl FieldExtractor for DateExtractor {
    type Output = NaiveDate;

    fn extract(&self, text: &str) -> ExtractionResult<NaiveDate> {
        self.calendar(text)
            .or_else(|| self.relative(text))
            .or_else(|| self.weekday(text))
            .unwrap_or_else(|| ExtractionResult::miss(text))
    }
}
