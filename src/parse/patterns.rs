//! Regular expressions recognising date headers, broken date fragments,
//! dish markers and noise lines in the residence's blog posts.
//!
//! The posts are hand edited, so dates get wrapped and spaced in many ways.
//! The `FIX_DATES_*` patterns repair the text first and `DAY` then matches
//! the canonical `día: <d> de <month> de <yyyy> (<weekday>)` form.
//! Every pattern is case-insensitive.
use crate::static_regex;

static_regex!(pub DAY <- r"día\s*:\s*(?P<day>\d+)\s*de\s*(?P<month>\w+)\s*de\s*(?P<year>\d{4})\s*\((?P<weekday>\w+)\)");

// "día: 23 de diciembre" / "de 2018 (martes)" when a header wraps
static_regex!(pub SEMI_DAY_1 <- r"día:\s*(?P<day>\d*)\s*de\s*(?P<month>\w+)$");
static_regex!(pub SEMI_DAY_2 <- r"(?P<year>\d{4})\s*\(\s*(?P<weekday>\w+)\s*\)");

static_regex!(pub FIX_DATES_1 <- r"(\w+)\s*(\d{4})");
static_regex!(pub FIX_DATES_2 <- r"(día:)\s*(\d+)");
static_regex!(pub FIX_DATES_3 <- r"d[íi]a\s*:\s*(\d+)\s*de\s*(\w+)\s*de\s*(\d{4})[ \t]*\(?[ \t]*(\w+)[ \t]*\)?");

static_regex!(pub FIRST_PLATE <- r"\b1\s*(?:er|ro|º|°|o)?\s*plato\s*:");
static_regex!(pub SECOND_PLATE <- r"\b2\s*(?:º|°|o|do)?\s*plato\s*:");

static_regex!(pub DESSERT <- r"(\w+)[ \t]+(postre:)");

// "12. semana 2019"; the dot is gone once a line is normalised
static_regex!(NUMBERED_WEEK <- r"^\d+\.?\s+\w+\s+\d+$");
static_regex!(WEEK_RANGE <- r"semana del \d+ al \d+ de \w+");
static_regex!(WEEK_RANGE_LONG <- r"semana del \d+ de \w+ al \d+ de \w+ \d+");

/// Whether the line contains a complete day header.
pub fn has_day(line: &str) -> bool {
    DAY.is_match(line)
}

/// Known noise lines: week numbers and "semana del X al Y" banners.
pub fn is_ignored(line: &str) -> bool {
    [&NUMBERED_WEEK, &WEEK_RANGE, &WEEK_RANGE_LONG]
        .iter()
        .any(|re| re.is_match(line))
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    fn full_match(re: &Regex, s: &str) -> bool {
        re.find(s).map_or(false, |m| m.as_str() == s)
    }

    #[test]
    fn test_has_day() {
        let data = [
            ("Día: 25 de diciembre de 2017 (martes)", true),
            ("Día: 07 de enero de 2019 (viernes)", true),
            ("Día: 1 de junio de 2000 (sábado)", true),
            ("Día:    1 de junio de 2000 (sábado)", true),
            ("Día: 1    de junio de 2000 (sábado)", true),
            ("Día: 1 de junio de    2000 (sábado)", true),
            ("Día: 1  de  junio  de 2000 (sábado)", true),
            ("Día   : 1 de junio de 2000 (sábado)", true),
            ("Día: 1 de enero de 0001 (lunes)", true),
            ("Día: 1 de enero de 1 (lunes)", false),
            ("1 de enero de 1998 (jueves)", false),
            ("1 de marzo de 1930", false),
        ];
        for (line, expected) in data {
            assert_eq!(has_day(line), expected, "{line}");
        }
    }

    #[test]
    fn test_day_pattern() {
        let data = [
            ("día: 23 de diciembre de 1998 (martes)", true),
            ("día: 05 de marzo de 2019 (martes)", true),
            ("día: 04 de 2019 de marzo (martes", false),
            ("día:04 de marzo de 2019 (martes)", true),
            ("día:04demarzode2019(martes)", true),
            ("day: 15 of 1562, june", false),
            ("día: 06 de marzo de 2019 (miercoles)", true),
            ("día: 07 de marzo\nde 2019 (jueves)", true),
            ("1er plato: ensalada tropical", false),
            ("cena:\n\n\n \n\ncóctel español", false),
        ];
        for (line, expected) in data {
            assert_eq!(full_match(&DAY, line), expected, "{line}");
        }
        let caps = DAY
            .captures("día: 11 de marzo de 2019 (lunes)")
            .expect("header should match");
        assert_eq!(&caps["day"], "11");
        assert_eq!(&caps["month"], "marzo");
        assert_eq!(&caps["year"], "2019");
        assert_eq!(&caps["weekday"], "lunes");
    }

    #[test]
    fn test_semi_day_patterns() {
        for line in [
            "día: 25 de diciembre",
            "Día: 31 de octubre",
            "Día:    12   \t  de    octubre",
            "Día:\t1\tde\tagosto",
            "día:12deoctubre",
        ] {
            assert!(full_match(&SEMI_DAY_1, line), "{line}");
        }
        assert!(SEMI_DAY_1.find("cena: cóctel español").is_none());

        for line in ["2019 (martes)", "2019 (  martes  )", "2019(martes)", "2019\t\t(martes)"] {
            assert!(full_match(&SEMI_DAY_2, line), "{line}");
        }
        assert!(SEMI_DAY_2.find("cóctel").is_none());
    }

    #[test]
    fn test_fix_dates_patterns() {
        assert_eq!(FIX_DATES_1.replace_all("febrero\n2019", "$1 $2"), "febrero 2019");
        assert_eq!(FIX_DATES_1.replace_all("febrero \n 2019", "$1 $2"), "febrero 2019");
        assert_eq!(FIX_DATES_1.replace_all("febrero2019", "$1 $2"), "febrero 2019");
        assert!(FIX_DATES_1.find("febrerode\n201").is_none());

        assert_eq!(FIX_DATES_2.replace_all("día:     20", "$1 $2"), "día: 20");
        assert_eq!(FIX_DATES_2.replace_all("día:\n\t\n\t20", "$1 $2"), "día: 20");
        assert!(FIX_DATES_2.find("day: 20").is_none());

        assert_eq!(
            FIX_DATES_3.replace_all("día: 25 de abril de 2020 (viernes", "día: $1 de $2 de $3 ($4)"),
            "día: 25 de abril de 2020 (viernes)"
        );
        // the weekday never spills over a line break
        assert_eq!(
            FIX_DATES_3.replace_all("Día: 6 de marzo de 2019\nComida:", "día: $1 de $2 de $3 ($4)"),
            "Día: 6 de marzo de 2019\nComida:"
        );
    }

    #[test]
    fn test_plate_markers() {
        assert_eq!(FIRST_PLATE.replace("1 plato: sopa", "1er plato:"), "1er plato: sopa");
        assert_eq!(FIRST_PLATE.replace("1er plato: sopa", "1er plato:"), "1er plato: sopa");
        assert_eq!(SECOND_PLATE.replace("2o plato: pollo", "2º plato:"), "2º plato: pollo");
        assert_eq!(SECOND_PLATE.replace("2 plato: pollo", "2º plato:"), "2º plato: pollo");
        assert!(!FIRST_PLATE.is_match("día: 21 plato"));
    }

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored("semana del 4 al 10 de marzo"));
        assert!(is_ignored("semana del 28 de febrero al 6 de marzo 2019"));
        assert!(is_ignored("12. semana 2019"));
        assert!(is_ignored("12 semana 2019"));
        assert!(!is_ignored("2º plato: 3 de 4"));
        assert!(!is_ignored("1er plato: sopa de fideos"));
    }
}
