//! Spanish <-> English month and weekday names, so dates can be parsed and
//! formatted without depending on the host locale.
use std::{borrow::Cow, str::FromStr, sync::OnceLock};

use chrono::Month;
use regex::{Captures, Regex, RegexBuilder};

static MONTHS: [(&str, &str); 12] = [
    ("enero", "january"),
    ("febrero", "february"),
    ("marzo", "march"),
    ("abril", "april"),
    ("mayo", "may"),
    ("junio", "june"),
    ("julio", "july"),
    ("agosto", "august"),
    ("septiembre", "september"),
    ("octubre", "october"),
    ("noviembre", "november"),
    ("diciembre", "december"),
];

static WEEKDAYS: [(&str, &str); 7] = [
    ("lunes", "monday"),
    ("martes", "tuesday"),
    ("miércoles", "wednesday"),
    ("jueves", "thursday"),
    ("viernes", "friday"),
    ("sábado", "saturday"),
    ("domingo", "sunday"),
];

// spellings seen on the blog without the accent
static UNACCENTED: [(&str, &str); 2] = [("miercoles", "wednesday"), ("sabado", "saturday")];

fn word_regex<'a>(words: impl Iterator<Item = &'a str>) -> Regex {
    let alternation = words.map(regex::escape).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
        .case_insensitive(true)
        .build()
        .expect("word list should form a valid regex")
}

fn all_pairs() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    MONTHS.iter().chain(WEEKDAYS.iter())
}

pub fn spanish_to_english(text: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        word_regex(all_pairs().chain(UNACCENTED.iter()).map(|(es, _)| *es))
    });
    re.replace_all(text, |caps: &Captures| {
        let word = caps[0].to_lowercase();
        all_pairs()
            .chain(UNACCENTED.iter())
            .find(|(es, _)| *es == word)
            .map_or(word.clone(), |(_, en)| (*en).to_string())
    })
}

pub fn english_to_spanish(text: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| word_regex(all_pairs().map(|(_, en)| *en)));
    re.replace_all(text, |caps: &Captures| {
        let word = caps[0].to_lowercase();
        all_pairs()
            .find(|(_, en)| *en == word)
            .map_or(word.clone(), |(es, _)| (*es).to_string())
    })
}

/// Month number (1-12) of a Spanish month name.
pub fn month_number(name: &str) -> Option<u32> {
    Month::from_str(spanish_to_english(name.trim()).as_ref())
        .ok()
        .map(|month| month.number_from_month())
}
