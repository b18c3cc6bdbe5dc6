#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod config;
mod error;
mod fetch;
mod menu;
mod parse;
mod store;
mod translate;

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, on, MethodFilter},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tower_http::{compression::CompressionLayer, cors::Any};

use crate::{
    config::Config,
    fetch::{make_client, Downloader},
    menu::{DailyMenu, DailyMenusManager, MealState},
    store::{Store, UpdateControl},
};

pub use error::Result;

// menus shown by /menus unless ?all is given
const HTML_MENUS: usize = 15;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Debug)]
struct AppState {
    store: Store,
    downloader: Downloader,
    config: Config,
}

impl AppState {
    async fn load(&self, force: bool) -> Result<DailyMenusManager> {
        DailyMenusManager::load(&self.store, &self.downloader, &self.config, force).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct MenusQuery {
    all: Option<String>,
    force: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TodayQuery {
    meal: Option<String>,
}

async fn menus_html(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MenusQuery>,
) -> Result<Html<String>> {
    let manager = state.load(query.force.is_some()).await?;
    if query.all.is_some() {
        return Ok(Html(manager.to_html()));
    }
    let page: Vec<String> = manager.iter().take(HTML_MENUS).map(DailyMenu::to_html).collect();
    Ok(Html(page.join("<br>")))
}

async fn menus_text(State(state): State<Arc<AppState>>) -> Result<String> {
    Ok(state.load(false).await?.to_string())
}

async fn menus_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MenusQuery>,
) -> Result<axum::Json<serde_json::Value>> {
    let manager = state.load(query.force.is_some()).await?;
    Ok(axum::Json(manager.to_json()))
}

/// Today's menu; `?meal=comida|cena` keeps one meal.
async fn today(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TodayQuery>,
) -> Result<String> {
    let meal = match query.meal.as_deref() {
        Some(meal) => meal.parse::<MealState>()?,
        None => MealState::None,
    };
    let manager = state.load(false).await?;
    let today = Local::now().date_naive();
    manager
        .today()
        .map(|menu| menu.only(meal).to_string())
        .ok_or_else(|| parse::Error::NotFound(format!("no menu for {today}")).into())
}

/// Reads a menus post sent as plain text and stores its menus.
async fn replay(State(state): State<Arc<AppState>>, body: String) -> Result<impl IntoResponse> {
    let mut manager = DailyMenusManager::new(state.config.merge_policy);
    let found = manager.process_page(&body, None);
    let saved = manager.save(&state.store).await?;
    log::info!("Replayed {found} menus, {saved} written");
    Ok((StatusCode::CREATED, format!("Menus: {found}\nSaved: {saved}")))
}

async fn refresh(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let start = Instant::now();
    let manager = state.load(true).await?;
    let control = UpdateControl::new(state.config.write_cooldown);
    let next_write = match state.store.last_update().await? {
        Some(last) => format!("{} minutes", control.time_until_write(last).num_minutes().max(0)),
        None => "now".to_owned(),
    };
    Ok((
        StatusCode::CREATED,
        format!(
            "Menus: {}\nTook: {:?}\nNext write: {next_write}",
            manager.len(),
            start.elapsed()
        ),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
    }
    log::info!("shutting down");
}

#[tokio::main]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env()?;
    let store = Store::open(&config).await?;
    log::debug!("{store:?}");
    let downloader = Downloader::new(&config)?;
    let addr = config.addr()?;
    let state = Arc::new(AppState {
        store,
        downloader,
        config,
    });

    let comression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET]) // intentionally excludes request-refresh/PUT and replay/POST
        .allow_origin(Any);

    let app = Router::new()
        .route("/menus", get(menus_html))
        .route("/menus.txt", get(menus_text))
        .route("/api/menus", get(menus_json).post(replay))
        .route("/hoy", get(today))
        .route("/request-refresh", on(MethodFilter::PUT, refresh))
        .with_state(Arc::clone(&state))
        .layer(cors_layer)
        .layer(comression_layer);

    tokio::spawn(async move {
        let Ok(client) = make_client() else {
            return;
        };
        log::info!("Forcing refresh");
        let start = Instant::now();
        let _res = client
            .put(format!("http://{addr}/request-refresh"))
            .send()
            .await;
        log::info!("Forcing refresh done, took {:?}", start.elapsed());
    });

    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
