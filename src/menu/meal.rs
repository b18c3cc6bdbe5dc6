use serde::{Deserialize, Serialize};

// plates are stored trimmed and lower-cased, blanks count as absent
fn normalize(plate: Option<&str>) -> Option<String> {
    plate
        .map(str::trim)
        .filter(|plate| !plate.is_empty())
        .map(str::to_lowercase)
}

/// A meal of two plates, either of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredMeal")]
pub struct Meal {
    p1: Option<String>,
    p2: Option<String>,
}

// deserialized plates go through `Meal::new` like any other
#[derive(Deserialize)]
struct StoredMeal {
    p1: Option<String>,
    p2: Option<String>,
}

impl From<StoredMeal> for Meal {
    fn from(stored: StoredMeal) -> Self {
        Self::new(stored.p1.as_deref(), stored.p2.as_deref())
    }
}

impl Meal {
    pub fn new(p1: Option<&str>, p2: Option<&str>) -> Self {
        Self {
            p1: normalize(p1),
            p2: normalize(p2),
        }
    }

    pub fn p1(&self) -> Option<&str> {
        self.p1.as_deref()
    }

    pub fn p2(&self) -> Option<&str> {
        self.p2.as_deref()
    }

    pub const fn is_empty(&self) -> bool {
        self.p1.is_none() && self.p2.is_none()
    }

    pub fn set_p1(&mut self, plate: &str) {
        self.p1 = normalize(Some(plate));
    }

    pub fn set_p2(&mut self, plate: &str) {
        self.p2 = normalize(Some(plate));
    }

    /// Overwrites each plate only when the new value is not blank.
    pub fn update(&mut self, p1: Option<&str>, p2: Option<&str>) {
        if let Some(p1) = normalize(p1) {
            self.p1 = Some(p1);
        }
        if let Some(p2) = normalize(p2) {
            self.p2 = Some(p2);
        }
    }

    /// Collapses the meal into a combined plate, discarding the second plate.
    pub fn combine(self) -> Combined {
        Combined { p1: self.p1 }
    }
}

/// A single plate standing in for both courses of a meal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combined {
    p1: Option<String>,
}

impl Combined {
    pub fn p1(&self) -> Option<&str> {
        self.p1.as_deref()
    }

    pub const fn is_empty(&self) -> bool {
        self.p1.is_none()
    }
}

impl From<Combined> for Meal {
    fn from(combined: Combined) -> Self {
        Self::new(combined.p1(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(Meal::default().is_empty());
        assert!(Meal::new(None, None).is_empty());
        assert!(!Meal::new(Some("x"), None).is_empty());
        assert!(!Meal::new(None, Some("x")).is_empty());
        assert!(Meal::new(Some("   "), Some("")).is_empty());
    }

    #[test]
    fn test_plates_are_normalized() {
        let meal = Meal::new(Some("  Sopa de Fideos "), Some("POLLO\t"));
        assert_eq!(meal.p1(), Some("sopa de fideos"));
        assert_eq!(meal.p2(), Some("pollo"));
    }

    #[test]
    fn test_update_never_erases() {
        let mut meal = Meal::new(Some("sopa"), Some("pollo"));
        meal.update(Some("  "), None);
        assert_eq!(meal, Meal::new(Some("sopa"), Some("pollo")));
        meal.update(None, Some("Merluza"));
        assert_eq!(meal.p2(), Some("merluza"));
    }

    #[test]
    fn test_direct_set_overwrites() {
        let mut meal = Meal::new(Some("sopa"), Some("pollo"));
        meal.set_p1("Lentejas");
        meal.set_p2("");
        assert_eq!(meal.p1(), Some("lentejas"));
        assert_eq!(meal.p2(), None);
    }

    #[test]
    fn test_combined() {
        assert!(Combined::default().is_empty());
        assert!(Meal::new(None, Some("pollo")).combine().is_empty());

        let combined = Meal::new(Some("PC: Huevos"), Some("postre")).combine();
        assert_eq!(combined.p1(), Some("pc: huevos"));
        assert_eq!(Meal::from(combined), Meal::new(Some("pc: huevos"), None));
    }

    #[test]
    fn test_serde() {
        let meal = Meal::new(Some("sopa"), None);
        let serialized = serde_json::to_string(&meal).unwrap();
        assert_eq!(serialized, r#"{"p1":"sopa","p2":null}"#);
        let deserialized: Meal = serde_json::from_str(&serialized).unwrap();
        assert_eq!(meal, deserialized);

        let deserialized: Meal =
            serde_json::from_str(r#"{"p1":"  Sopa de AJO ","p2":"   "}"#).unwrap();
        assert_eq!(deserialized, Meal::new(Some("sopa de ajo"), None));
    }
}
