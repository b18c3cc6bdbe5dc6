use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::Arc,
};

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use futures_locks::Mutex;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use url::Url;

use super::{daily_menu::DailyMenu, index::Index, MealState};
use crate::{
    config::Config,
    fetch::Downloader,
    parse::{self, filter_data, patterns, Error, Parsers},
    store::{MenuRow, Store, UpdateControl},
};

/// What happens when a menu arrives for a date that is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The stored menu is kept, the newcomer dropped.
    #[default]
    FirstWins,
    /// The newcomer replaces the stored menu.
    LastWins,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-wins" => Ok(Self::FirstWins),
            "last" | "last-wins" => Ok(Self::LastWins),
            other => Err(format!("unknown merge policy {other:?}")),
        }
    }
}

/// At most one [`DailyMenu`] per date, newest first once sorted.
#[derive(Debug, Default)]
pub struct DailyMenusManager {
    menus: Vec<DailyMenu>,
    policy: MergePolicy,
}

impl DailyMenusManager {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            menus: Vec::new(),
            policy,
        }
    }

    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Merges `menus` in, returning how many were inserted or replaced.
    pub fn add(&mut self, menus: impl IntoIterator<Item = DailyMenu>) -> usize {
        let mut added = 0;
        for menu in menus {
            match self.menus.iter().position(|m| m.date() == menu.date()) {
                None => self.menus.push(menu),
                Some(i) if self.policy == MergePolicy::LastWins => self.menus[i] = menu,
                Some(_) => continue,
            }
            added += 1;
        }
        added
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.menus.iter().any(|m| m.date() == date)
    }

    pub fn get(&self, date: NaiveDate) -> parse::Result<&DailyMenu> {
        self.menus
            .iter()
            .find(|m| m.date() == date)
            .ok_or_else(|| Error::NotFound(format!("no menu for {date}")))
    }

    pub fn today(&self) -> Option<&DailyMenu> {
        self.menus.iter().find(|m| m.is_today())
    }

    /// Most recent first.
    pub fn sort(&mut self) {
        self.menus.sort_by(|a, b| b.date().cmp(&a.date()));
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyMenu> {
        self.menus.iter()
    }

    pub fn to_html(&self) -> String {
        self.menus
            .iter()
            .map(DailyMenu::to_html)
            .collect::<Vec<_>>()
            .join("<br>")
    }

    pub fn to_json(&self) -> Value {
        self.menus
            .iter()
            .map(|menu| {
                json!({
                    "id": menu.id(),
                    "day": format!("{} {}", capitalize(menu.weekday()), menu.day()),
                    "lunch": menu.lunch(),
                    "dinner": menu.dinner(),
                    "url": menu.url().as_str(),
                })
            })
            .collect()
    }

    /// Filters and reads one page of plain text, merging what it finds.
    pub fn process_page(&mut self, raw_text: &str, url: Option<&Url>) -> usize {
        let lines = filter_data(raw_text.lines().collect::<Vec<_>>());
        self.add(read_menus(&lines, url))
    }

    /// Runs an HTML page through the parser chain and merges its menus.
    pub fn process_html(&mut self, html: &str, url: &Url) -> parse::Result<usize> {
        let menus = Parsers::default().parse(html, url)?;
        Ok(self.add(menus))
    }

    /// Stored menus, plus a live fetch when today's menu is missing or when
    /// `force` (or `parse_all` in `config`) asks for one. Fresh menus are
    /// written back if the write throttle allows it.
    pub async fn load(
        store: &Store,
        downloader: &Downloader,
        config: &Config,
        force: bool,
    ) -> crate::Result<Self> {
        let mut manager = Self::new(config.merge_policy);
        for row in store.load_all().await? {
            match DailyMenu::try_from(row) {
                Ok(menu) => {
                    manager.add([menu]);
                }
                Err(e) => log::warn!("Skipping stored menu: {e}"),
            }
        }

        let missing_today = !manager.contains(Local::now().date_naive());
        let control = UpdateControl::new(config.write_cooldown);
        let write = control.should_write(store).await?;
        let fetch = missing_today || force || config.parse_all;
        log::info!(
            "Delivering: [missing today: {missing_today}|force: {force}|write allowed: {write}] -> {}",
            if fetch { "fetching" } else { "stored" }
        );

        if fetch {
            let urls = if config.offline {
                Vec::new()
            } else {
                downloader.menus_urls(config.parse_all).await
            };
            manager = manager
                .process_urls(downloader, urls, config.max_workers)
                .await;
            if write {
                let saved = manager.save(store).await?;
                control.mark_written(store).await?;
                log::info!("Saved {saved} new menus");
            }
        }

        manager.sort();
        Ok(manager)
    }

    /// One worker per url, at most `max_workers` at a time.
    async fn process_urls(self, downloader: &Downloader, urls: Vec<Url>, max_workers: usize) -> Self {
        let policy = self.policy();
        let shared = Mutex::new(self);
        let permits = Arc::new(Semaphore::new(max_workers.max(1)));

        let workers = urls.into_iter().map(|url| {
            let shared = shared.clone();
            let permits = Arc::clone(&permits);
            let downloader = downloader.clone();
            tokio::spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                match downloader.fetch(&url).await {
                    Ok(raw) => Self::merge_page(&shared, policy, &raw, &url).await,
                    Err(e) => tracing::warn!("Giving up on {url}: {e}"),
                }
            })
        });
        for result in join_all(workers).await {
            if let Err(e) = result {
                tracing::warn!("Page worker failed: {e}");
            }
        }

        let mut guard = shared.lock().await;
        std::mem::take(&mut *guard)
    }

    /// Parses into a manager of its own; only the merge holds the lock.
    async fn merge_page(shared: &Mutex<Self>, policy: MergePolicy, raw: &str, url: &Url) {
        let mut page = Self::new(policy);
        match page.process_html(raw, url) {
            Ok(found) => {
                let added = shared.lock().await.add(page.menus);
                log::debug!("{url}: {added} of {found} menus merged");
            }
            Err(e) => tracing::warn!("Could not parse {url}: {e}"),
        }
    }

    /// Saves every menu, returning how many rows were written. With
    /// [`MergePolicy::LastWins`] a stored row of the same date is replaced.
    pub async fn save(&self, store: &Store) -> crate::Result<usize> {
        let mut saved = 0;
        for menu in &self.menus {
            let row = MenuRow::from(menu);
            let written = store.save(&row).await?
                || (self.policy == MergePolicy::LastWins
                    && store.remove(row.id).await?
                    && store.save(&row).await?);
            if written {
                saved += 1;
            }
        }
        Ok(saved)
    }
}

impl Display for DailyMenusManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.menus.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

impl<'a> IntoIterator for &'a DailyMenusManager {
    type Item = &'a DailyMenu;
    type IntoIter = std::slice::Iter<'a, DailyMenu>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// text after the first ':'; the whole line when there is none
fn after_colon(line: &str) -> &str {
    line.split_once(':').map_or(line, |(_, rest)| rest)
}

fn read_line(index: &mut Index, line: &str) -> parse::Result<()> {
    if line.contains("combinado") {
        index.set_combined(index.state())?;
        let dish = line.rsplit(':').next().unwrap_or_default().trim();
        index.set_first(&format!("PC: {dish}"))
    } else if line.contains("coctel") || line.contains("cóctel") {
        index.set_first("cóctel")
    } else if line.contains("comida") {
        index.set_state(MealState::Lunch)
    } else if line.contains("cena") {
        index.set_state(MealState::Dinner)
    } else if line.contains("1er") {
        index.set_first(after_colon(line))
    } else if line.contains("2º") {
        index.set_second(after_colon(line))
    } else if patterns::is_ignored(line) {
        Ok(())
    } else {
        index.decide(line).map(|_| ())
    }
}

/// Reads filtered lines in order, emitting a menu every time a day is
/// complete. A line that fails is logged and skipped.
pub fn read_menus<S: AsRef<str>>(lines: &[S], url: Option<&Url>) -> Vec<DailyMenu> {
    let mut index = Index::new();
    let mut menus = Vec::new();
    for line in lines {
        let line = line.as_ref().replace('_', " ").to_lowercase();
        if patterns::has_day(&line) {
            menus.extend(index.publish(url));
            index.reset();
            match DailyMenu::from_header(&line) {
                Ok(menu) => index.set_date(menu.date()),
                Err(e) => log::warn!("Skipping day header {line:?}: {e}"),
            }
            continue;
        }
        if let Err(e) = read_line(&mut index, &line) {
            log::warn!("Skipping line {line:?}: {e}");
        }
    }
    menus.extend(index.publish(url));
    menus
}
