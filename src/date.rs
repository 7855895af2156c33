//! Conversion between calendar dates and the two wire shapes the platform
//! uses: locale-formatted strings going out, `[year, month, day]` arrays
//! coming back.
use super::error::{Error, Result};
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;

/// A Java-style date pattern (`dd MMMM yyyy`) paired with a locale tag
/// (`en`, `en_GB`, `fr-FR`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pub pattern: String,
    pub locale: String,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            locale: locale.into(),
        }
    }

    pub fn format(&self, date: NaiveDate) -> Result<String> {
        format_date(date, &self.pattern, &self.locale)
    }

    pub fn parse(&self, text: &str) -> Result<NaiveDate> {
        parse_date(text, &self.pattern, &self.locale)
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new("dd MMMM yyyy", "en")
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Day(usize),
    Month(usize),
    Year(usize),
    Literal(String),
}

fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            // '' is an escaped quote, otherwise read up to the closing quote
            if chars.get(i + 1) == Some(&'\'') {
                tokens.push(Token::Literal("'".into()));
                i += 2;
                continue;
            }
            let start = i + 1;
            let end = chars[start..]
                .iter()
                .position(|&ch| ch == '\'')
                .map(|p| start + p)
                .ok_or_else(|| Error::InvalidDate(format!("unterminated quote in `{pattern}`")))?;
            tokens.push(Token::Literal(chars[start..end].iter().collect()));
            i = end + 1;
        } else if c.is_ascii_alphabetic() {
            let run = chars[i..].iter().take_while(|&&ch| ch == c).count();
            let token = match c {
                'd' if run > 2 => {
                    return Err(Error::InvalidDate(format!(
                        "day field wider than `dd` in `{pattern}`"
                    )));
                }
                'd' => Token::Day(run),
                'M' => Token::Month(run),
                'y' => Token::Year(run),
                other => {
                    return Err(Error::InvalidDate(format!(
                        "unsupported pattern letter `{other}` in `{pattern}`"
                    )));
                }
            };
            tokens.push(token);
            i += run;
        } else {
            tokens.push(Token::Literal(c.to_string()));
            i += 1;
        }
    }

    if tokens.is_empty() {
        return Err(Error::InvalidDate("empty date pattern".into()));
    }
    Ok(tokens)
}

fn language(locale: &str) -> String {
    locale
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

struct MonthNames {
    full: [&'static str; 12],
    short: [&'static str; 12],
}

static EN: MonthNames = MonthNames {
    full: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ],
    short: ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
};
static FR: MonthNames = MonthNames {
    full: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    short: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
};
static DE: MonthNames = MonthNames {
    full: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
        "Oktober", "November", "Dezember",
    ],
    short: ["Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez"],
};
static ES: MonthNames = MonthNames {
    full: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    short: ["ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic"],
};
static PT: MonthNames = MonthNames {
    full: [
        "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
        "outubro", "novembro", "dezembro",
    ],
    short: ["jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez"],
};
static IT: MonthNames = MonthNames {
    full: [
        "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
        "settembre", "ottobre", "novembre", "dicembre",
    ],
    short: ["gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic"],
};
static NL: MonthNames = MonthNames {
    full: [
        "januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september",
        "oktober", "november", "december",
    ],
    short: ["jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec"],
};

fn month_names(locale: &str) -> Result<&'static MonthNames> {
    match language(locale).as_str() {
        "en" => Ok(&EN),
        "fr" => Ok(&FR),
        "de" => Ok(&DE),
        "es" => Ok(&ES),
        "pt" => Ok(&PT),
        "it" => Ok(&IT),
        "nl" => Ok(&NL),
        _ => Err(Error::InvalidDate(format!(
            "no month names for locale `{locale}`"
        ))),
    }
}

/// Formats `date` with a Java-style `pattern` under `locale`.
pub fn format_date(date: NaiveDate, pattern: &str, locale: &str) -> Result<String> {
    let mut out = String::new();
    for token in tokenize(pattern)? {
        match token {
            Token::Day(1) => out.push_str(&date.day().to_string()),
            Token::Day(2) => out.push_str(&format!("{:02}", date.day())),
            Token::Month(1) => out.push_str(&date.month().to_string()),
            Token::Month(2) => out.push_str(&format!("{:02}", date.month())),
            Token::Month(n) if n >= 3 => {
                let names = month_names(locale)?;
                let table = if n == 3 { &names.short } else { &names.full };
                out.push_str(table[date.month0() as usize]);
            }
            Token::Year(2) => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
            Token::Year(_) => out.push_str(&format!("{:04}", date.year())),
            Token::Literal(text) => out.push_str(&text),
            other => {
                return Err(Error::InvalidDate(format!(
                    "cannot format {other:?} in `{pattern}`"
                )));
            }
        }
    }
    Ok(out)
}

fn take_digits(input: &str, max: usize) -> Option<(u32, &str)> {
    let len = input
        .char_indices()
        .take(max)
        .take_while(|(_, c)| c.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let value = input[..len].parse().ok()?;
    Some((value, &input[len..]))
}

/// Strips `name` from the front of `input`, comparing case-insensitively
/// one character at a time.
fn strip_name<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    let mut chars = input.chars();
    for expected in name.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

fn take_month_name<'a>(input: &'a str, names: &[&str; 12]) -> Option<(u32, &'a str)> {
    // longest candidate first so a shorter name never shadows a longer one
    let mut candidates: Vec<(usize, &str)> = names.iter().copied().enumerate().collect();
    candidates.sort_by_key(|(_, name)| std::cmp::Reverse(name.chars().count()));

    candidates
        .into_iter()
        .find_map(|(i, name)| strip_name(input, name).map(|rest| (i as u32 + 1, rest)))
}

/// Places a two-digit year in the hundred years starting 80 years before
/// `current_year`, the window Java date patterns use.
fn resolve_two_digit_year(yy: u32, current_year: i32) -> i32 {
    let start = current_year - 80;
    let year = start - start.rem_euclid(100) + yy as i32;
    if year < start { year + 100 } else { year }
}

/// Parses `text` with a Java-style `pattern` under `locale`.
pub fn parse_date(text: &str, pattern: &str, locale: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate(format!("`{text}` does not match `{pattern}`"));
    let (mut day, mut month, mut year) = (None, None, None);
    let mut rest = text;

    for token in tokenize(pattern)? {
        match token {
            Token::Day(_) => {
                let (value, tail) = take_digits(rest, 2).ok_or_else(invalid)?;
                day = Some(value);
                rest = tail;
            }
            Token::Month(n) if n <= 2 => {
                let (value, tail) = take_digits(rest, 2).ok_or_else(invalid)?;
                month = Some(value);
                rest = tail;
            }
            Token::Month(n) => {
                let names = month_names(locale)?;
                let table = if n == 3 { &names.short } else { &names.full };
                let (value, tail) = take_month_name(rest, table).ok_or_else(invalid)?;
                month = Some(value);
                rest = tail;
            }
            Token::Year(2) => {
                let (value, tail) = take_digits(rest, 2).ok_or_else(invalid)?;
                year = Some(resolve_two_digit_year(value, Utc::now().year()));
                rest = tail;
            }
            Token::Year(_) => {
                let (value, tail) = take_digits(rest, 4).ok_or_else(invalid)?;
                year = Some(value as i32);
                rest = tail;
            }
            Token::Literal(lit) => {
                rest = rest.strip_prefix(lit.as_str()).ok_or_else(invalid)?;
            }
        }
    }

    if !rest.is_empty() {
        return Err(invalid());
    }
    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid),
        _ => Err(Error::InvalidDate(format!(
            "pattern `{pattern}` does not carry a full date"
        ))),
    }
}

/// Builder-time check: rejects a date string before an entity exists.
pub fn validate_date(text: &str, pattern: &str, locale: &str) -> Result<()> {
    parse_date(text, pattern, locale)
        .map(|_| ())
        .map_err(|e| Error::InvalidArgument(e.to_string()))
}

fn array_part(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes the inbound `[year, month, day]` shape. Month is 1-based.
pub fn decode_date_array(value: &Value) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate(format!("expected [year, month, day], got {value}"));
    let parts = value.as_array().filter(|a| a.len() == 3).ok_or_else(invalid)?;
    let year = array_part(&parts[0]).and_then(|y| i32::try_from(y).ok());
    let month = array_part(&parts[1]).and_then(|m| u32::try_from(m).ok());
    let day = array_part(&parts[2]).and_then(|d| u32::try_from(d).ok());

    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

pub fn encode_date_array(date: NaiveDate) -> Value {
    Value::from(vec![
        i64::from(date.year()),
        i64::from(date.month()),
        i64::from(date.day()),
    ])
}
