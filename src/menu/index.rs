use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use url::Url;

use super::daily_menu::{DailyMenu, MenuUpdate};
use super::meal::Meal;
use crate::parse::{self, Error};

/// Which meal of the day the text being read belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MealState {
    Lunch,
    Dinner,
    #[default]
    None,
}

impl MealState {
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for MealState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LUNCH" | "COMIDA" => Ok(Self::Lunch),
            "DINNER" | "CENA" => Ok(Self::Dinner),
            "NONE" => Ok(Self::None),
            _ => Err(Error::InvalidState(format!("Invalid state: {s}"))),
        }
    }
}

impl Display for MealState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lunch => write!(f, "LUNCH"),
            Self::Dinner => write!(f, "DINNER"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Accumulates the plates of one day while its lines are read, one day at a
/// time. Call [`Index::publish`] (or check [`Index::commit`]) before
/// [`Index::reset`] when a new day header shows up.
#[derive(Debug, Default, Clone)]
pub struct Index {
    date: Option<NaiveDate>,
    lunch: Meal,
    dinner: Meal,
    state: MealState,
    meal_combined: Option<MealState>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> MealState {
        self.state
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }

    pub fn set_state(&mut self, state: MealState) -> parse::Result<()> {
        if !state.is_set() {
            return Err(Error::InvalidState(format!("Invalid state: {state}")));
        }
        self.state = state;
        Ok(())
    }

    pub fn set_combined(&mut self, meal: MealState) -> parse::Result<()> {
        if !meal.is_set() {
            return Err(Error::Meal(format!("Invalid meal: {meal}")));
        }
        self.meal_combined = Some(meal);
        Ok(())
    }

    fn current_meal(&self) -> Option<&Meal> {
        match self.state {
            MealState::Lunch => Some(&self.lunch),
            MealState::Dinner => Some(&self.dinner),
            MealState::None => None,
        }
    }

    fn current_meal_mut(&mut self) -> parse::Result<&mut Meal> {
        match self.state {
            MealState::Lunch => Ok(&mut self.lunch),
            MealState::Dinner => Ok(&mut self.dinner),
            MealState::None => Err(Error::internal_error("State not set")),
        }
    }

    pub fn set_first(&mut self, text: &str) -> parse::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.current_meal_mut()?.set_p1(text);
        Ok(())
    }

    pub fn set_second(&mut self, text: &str) -> parse::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.current_meal_mut()?.set_p2(text);
        Ok(())
    }

    pub fn get_first(&self) -> Option<&str> {
        self.current_meal().and_then(Meal::p1)
    }

    /// Places a line no marker recognised. It becomes the first plate when
    /// that slot is still free; otherwise the line is dropped with a warning
    /// and `false` is returned.
    pub fn decide(&mut self, text: &str) -> parse::Result<bool> {
        if self.current_meal().is_none() {
            return Err(Error::meal_error(
                "state not set while checking for emptiness",
            ));
        }
        if self.get_first().is_none() {
            self.set_first(text)?;
            return Ok(true);
        }
        log::warn!("Could not decide: {text}");
        Ok(false)
    }

    /// Whether the accumulated data makes a publishable menu: a date, a meal
    /// context and at least one non-empty meal.
    pub const fn commit(&self) -> bool {
        self.date.is_some()
            && self.state.is_set()
            && (!self.lunch.is_empty() || !self.dinner.is_empty())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The menu accumulated so far, if [`Index::commit`] allows it.
    pub fn publish(&self, url: Option<&Url>) -> Option<DailyMenu> {
        let date = self.date.filter(|_| self.commit())?;
        let (mut lunch, mut dinner) = (self.lunch.clone(), self.dinner.clone());
        let combine = |meal: Meal| {
            let combined = meal.combine();
            if combined.is_empty() {
                log::warn!("{date}: combined meal without a plate");
            }
            Meal::from(combined)
        };
        match self.meal_combined {
            Some(MealState::Lunch) => lunch = combine(lunch),
            Some(MealState::Dinner) => dinner = combine(dinner),
            _ => {}
        }

        let mut menu = DailyMenu::from_datetime(date);
        menu.update(MenuUpdate {
            lunch: Some(lunch),
            dinner: Some(dinner),
            ..Default::default()
        });
        if let Some(url) = url {
            menu.set_url(url.clone());
        }
        Some(menu)
    }
}
