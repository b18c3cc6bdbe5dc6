use std::fmt::{self, Display, Formatter};

use chrono::{Datelike, Local, NaiveDate};
use url::Url;

use super::{index::MealState, meal::Meal};
use crate::parse::{self, patterns::DAY, Error};
use crate::translate;

pub const PRINCIPAL_URL: &str = "https://www.residenciasantiago.es/menus-1/";

pub fn principal_url() -> Url {
    Url::parse(PRINCIPAL_URL).expect("principal url should be valid!")
}

/// The menu served on one calendar day.
#[derive(Debug, Clone)]
pub struct DailyMenu {
    date: NaiveDate,
    lunch: Meal,
    dinner: Meal,
    url: Url,
    weekday: String,
    is_today: bool,
}

/// Changes applied by [`DailyMenu::update`]. A non-empty whole meal wins over
/// the per-plate fields of the same meal.
#[derive(Debug, Default)]
pub struct MenuUpdate<'a> {
    pub lunch: Option<Meal>,
    pub dinner: Option<Meal>,
    pub lunch1: Option<&'a str>,
    pub lunch2: Option<&'a str>,
    pub dinner1: Option<&'a str>,
    pub dinner2: Option<&'a str>,
}

impl PartialEq for DailyMenu {
    fn eq(&self, other: &Self) -> bool {
        // url and the derived fields are intentionally ignored
        self.date == other.date && self.lunch == other.lunch && self.dinner == other.dinner
    }
}

impl Eq for DailyMenu {}

impl DailyMenu {
    pub fn new(
        day: u32,
        month: u32,
        year: i32,
        lunch: Meal,
        dinner: Meal,
        url: Option<Url>,
    ) -> parse::Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::InvalidDate(format!("{year:04}-{month:02}-{day:02} is not a valid date"))
        })?;
        Ok(Self::with_meals(date, lunch, dinner, url))
    }

    fn with_meals(date: NaiveDate, lunch: Meal, dinner: Meal, url: Option<Url>) -> Self {
        let weekday = translate::english_to_spanish(&date.format("%A").to_string()).into_owned();
        Self {
            date,
            lunch,
            dinner,
            url: url.unwrap_or_else(principal_url),
            weekday,
            is_today: date == Local::now().date_naive(),
        }
    }

    pub fn from_datetime(date: NaiveDate) -> Self {
        Self::with_meals(date, Meal::default(), Meal::default(), None)
    }

    /// Builds an empty menu from a `día: <d> de <month> de <yyyy> (<weekday>)` header.
    pub fn from_header(header: &str) -> parse::Result<Self> {
        Self::parse_header(header).map(Self::from_datetime)
    }

    /// Extracts the date of a day header. The weekday written in the header is
    /// not checked against the date, the blog gets it wrong sometimes.
    fn parse_header(header: &str) -> parse::Result<NaiveDate> {
        let header = header.to_lowercase();
        let caps = DAY
            .captures(&header)
            .ok_or_else(|| Error::InvalidDate(format!("not a day header: {header:?}")))?;

        let day: u32 = caps["day"]
            .parse()
            .map_err(|_| Error::invalid_date_error("day is not a number"))?;
        let month = translate::month_number(&caps["month"])
            .ok_or_else(|| Error::InvalidDate(format!("unknown month {:?}", &caps["month"])))?;
        let year: i32 = caps["year"]
            .parse()
            .map_err(|_| Error::invalid_date_error("year is not a number"))?;

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::InvalidDate(format!("{year:04}-{month:02}-{day:02} is not a valid date"))
        })
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// `YYYYMMDD` as a number, the natural key of a menu.
    pub fn id(&self) -> i64 {
        i64::from(self.year()) * 10_000 + i64::from(self.month()) * 100 + i64::from(self.day())
    }

    /// Spanish weekday name, lower case.
    pub fn weekday(&self) -> &str {
        &self.weekday
    }

    pub const fn is_today(&self) -> bool {
        self.is_today
    }

    pub const fn lunch(&self) -> &Meal {
        &self.lunch
    }

    pub const fn dinner(&self) -> &Meal {
        &self.dinner
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    pub const fn is_empty(&self) -> bool {
        self.lunch.is_empty() && self.dinner.is_empty()
    }

    pub fn update(&mut self, changes: MenuUpdate<'_>) {
        match changes.lunch {
            Some(lunch) if !lunch.is_empty() => self.lunch = lunch,
            _ => self.lunch.update(changes.lunch1, changes.lunch2),
        }
        match changes.dinner {
            Some(dinner) if !dinner.is_empty() => self.dinner = dinner,
            _ => self.dinner.update(changes.dinner1, changes.dinner2),
        }
    }

    pub fn format_date(&self, long: bool) -> String {
        if !long {
            return self.date.to_string();
        }
        translate::english_to_spanish(&self.date.format("%d de %B de %Y (%A)").to_string())
            .into_owned()
    }

    pub fn to_html(&self) -> String {
        self.to_string().replace('\n', "<br>")
    }

    /// A copy with only `meal` left; [`MealState::None`] keeps both.
    pub fn only(&self, meal: MealState) -> Self {
        let mut menu = self.clone();
        match meal {
            MealState::Lunch => menu.dinner = Meal::default(),
            MealState::Dinner => menu.lunch = Meal::default(),
            MealState::None => {}
        }
        menu
    }
}

fn write_meal(f: &mut Formatter<'_>, title: &str, meal: &Meal) -> fmt::Result {
    if meal.is_empty() {
        return Ok(());
    }
    writeln!(f, " - {title}")?;
    for plate in [meal.p1(), meal.p2()].into_iter().flatten() {
        writeln!(f, "   - {plate}")?;
    }
    Ok(())
}

impl Display for DailyMenu {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.format_date(true))?;
        write_meal(f, "Comida", &self.lunch)?;
        write_meal(f, "Cena", &self.dinner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_6() -> DailyMenu {
        DailyMenu::new(
            6,
            3,
            2019,
            Meal::new(Some("sopa"), Some("pollo")),
            Meal::new(Some("pescado"), None),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_id() {
        assert_eq!(march_6().id(), 20190306);
        let menu = DailyMenu::from_datetime(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
        assert_eq!(menu.id(), 20201231);
    }

    #[test]
    fn test_invalid_date() {
        let err = DailyMenu::new(30, 2, 2019, Meal::default(), Meal::default(), None).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
        assert!(DailyMenu::new(1, 13, 2019, Meal::default(), Meal::default(), None).is_err());
    }

    #[test]
    fn test_from_datetime_round_trip() {
        let mut date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        while date.year() == 2019 {
            assert_eq!(DailyMenu::from_datetime(date).date(), date);
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_from_header() {
        let menu = DailyMenu::from_header("Día: 06 de Marzo de 2019 (Miércoles)").unwrap();
        assert_eq!(menu.date(), NaiveDate::from_ymd_opt(2019, 3, 6).unwrap());
        assert_eq!(menu.weekday(), "miércoles");
        assert!(menu.is_empty());

        // unaccented weekday and a wrong weekday are both tolerated
        assert!(DailyMenu::from_header("día: 06 de marzo de 2019 (miercoles)").is_ok());
        assert!(DailyMenu::from_header("día: 06 de marzo de 2019 (lunes)").is_ok());

        assert!(DailyMenu::from_header("día: 31 de febrero de 2019 (jueves)").is_err());
        assert!(DailyMenu::from_header("día: 3 de brumario de 2019 (lunes)").is_err());
        assert!(DailyMenu::from_header("1er plato: sopa").is_err());
    }

    #[test]
    fn test_equality_ignores_url() {
        let mut other = march_6();
        other.set_url(Url::parse("https://www.residenciasantiago.es/2019/03/04/x/").unwrap());
        assert_eq!(march_6(), other);
        other.update(MenuUpdate {
            dinner2: Some("fruta"),
            ..Default::default()
        });
        assert_ne!(march_6(), other);
    }

    #[test]
    fn test_format_date() {
        let menu = march_6();
        assert_eq!(menu.format_date(true), "06 de marzo de 2019 (miércoles)");
        assert_eq!(menu.format_date(false), "2019-03-06");
    }

    #[test]
    fn test_to_string() {
        assert_eq!(
            march_6().to_string(),
            "06 de marzo de 2019 (miércoles)\n - Comida\n   - sopa\n   - pollo\n - Cena\n   - pescado\n"
        );
        let empty = DailyMenu::from_datetime(NaiveDate::from_ymd_opt(2019, 5, 4).unwrap());
        assert_eq!(empty.to_string(), "04 de mayo de 2019 (sábado)\n");
    }

    #[test]
    fn test_only() {
        assert_eq!(
            march_6().only(MealState::Dinner).to_string(),
            "06 de marzo de 2019 (miércoles)\n - Cena\n   - pescado\n"
        );
        assert_eq!(march_6().only(MealState::Lunch).dinner(), &Meal::default());
        assert_eq!(march_6().only(MealState::None), march_6());
    }

    #[test]
    fn test_to_html() {
        assert!(march_6()
            .to_html()
            .starts_with("06 de marzo de 2019 (miércoles)<br> - Comida<br>"));
        assert!(!march_6().to_html().contains('\n'));
    }

    #[test]
    fn test_update() {
        let mut menu = DailyMenu::from_datetime(NaiveDate::from_ymd_opt(2019, 3, 6).unwrap());
        menu.update(MenuUpdate {
            lunch: Some(Meal::new(Some("Sopa"), Some("Pollo"))),
            dinner1: Some("pescado"),
            ..Default::default()
        });
        assert_eq!(menu, march_6());

        // an empty whole meal falls back to the per-plate fields
        menu.update(MenuUpdate {
            lunch: Some(Meal::default()),
            lunch2: Some("ternera"),
            ..Default::default()
        });
        assert_eq!(menu.lunch(), &Meal::new(Some("sopa"), Some("ternera")));
    }

    #[test]
    fn test_is_today() {
        let today = Local::now().date_naive();
        assert!(DailyMenu::from_datetime(today).is_today());
        assert!(!march_6().is_today());
    }
}
