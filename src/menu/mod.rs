mod daily_menu;
mod index;
mod manager;
mod meal;

pub use daily_menu::{principal_url, DailyMenu, MenuUpdate, PRINCIPAL_URL};
pub use index::{Index, MealState};
pub use manager::{read_menus, DailyMenusManager, MergePolicy};
pub use meal::{Combined, Meal};
