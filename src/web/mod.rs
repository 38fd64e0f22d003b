//! HTTP front-end: routes, handlers and error pages.

mod address;
pub mod pages;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use derive_more::Display;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::{GameError, GameService};
use pages::{HINT_DELAY_MS, REDIRECT_DELAY_MS, titles};

pub use address::ClientAddress;

/// Builds the application router.
#[instrument(skip(service))]
pub fn router(service: GameService) -> Router {
    info!("Building router");
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/logout", get(logout))
        .route("/mine", get(mine))
        .route("/scoreboard", get(scoreboard))
        .route("/shop", get(shop))
        .route("/shop/{item}", get(shop_item))
        .with_state(service)
}

/// Failure that ends a request with an error page.
#[derive(Debug, Display)]
pub enum WebError {
    /// A game action failed in a way the pages do not handle.
    #[display("{}", _0)]
    Game(GameError),
    /// The blocking task running the action did not complete.
    #[display("Worker task failed: {}", _0)]
    Worker(String),
}

impl std::error::Error for WebError {}

impl From<GameError> for WebError {
    fn from(err: GameError) -> Self {
        Self::Game(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::page(
                titles::ERROR,
                "Something went wrong. Please try again later.",
            )),
        )
            .into_response()
    }
}

/// Runs a store-bound action on the blocking pool.
async fn blocking<T, F>(service: &GameService, action: F) -> Result<Result<T, GameError>, WebError>
where
    F: FnOnce(&GameService) -> Result<T, GameError> + Send + 'static,
    T: Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || action(&service))
        .await
        .map_err(|e| WebError::Worker(e.to_string()))
}

/// Shop index from the leading digits of `item`; 0 (never valid) otherwise.
fn item_index(item: &str) -> usize {
    let item = item.trim_start();
    let end = item
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(item.len());
    item[..end].parse().unwrap_or(0)
}

fn redirect(title: &str, message: &str, target: &str) -> Response {
    Html(pages::redirect_page(title, message, target, REDIRECT_DELAY_MS)).into_response()
}

#[instrument(skip(service))]
async fn home(
    State(service): State<GameService>,
    ClientAddress(address): ClientAddress,
) -> Result<Response, WebError> {
    let account = blocking(&service, move |s| s.current_account(&address)).await??;
    let text = if account.exists() {
        pages::home_text(&account)
    } else {
        pages::WELCOME_TEXT.to_string()
    };
    Ok(Html(pages::page(titles::HOME, &text)).into_response())
}

/// Query of `/login`.
#[derive(Debug, Deserialize)]
struct LoginQuery {
    #[serde(default)]
    username: String,
}

#[instrument(skip(service))]
async fn login(
    State(service): State<GameService>,
    ClientAddress(address): ClientAddress,
    Query(query): Query<LoginQuery>,
) -> Result<Response, WebError> {
    let username = query.username;
    match blocking(&service, move |s| s.login(&username, &address)).await? {
        Ok(record) => Ok(redirect(
            titles::LOGIN,
            &format!("Logged in as {}", record.name),
            "/",
        )),
        Err(GameError::MissingUsername) => Ok(Html(pages::redirect_page(
            titles::LOGIN,
            "No username provided. \nExample: /login?username=admin",
            "/",
            HINT_DELAY_MS,
        ))
        .into_response()),
        Err(other) => Err(other.into()),
    }
}

#[instrument(skip(service))]
async fn logout(
    State(service): State<GameService>,
    ClientAddress(address): ClientAddress,
) -> Result<Response, WebError> {
    match blocking(&service, move |s| s.logout(&address)).await? {
        Ok(_) => Ok(redirect(titles::LOGOUT, "Logged out. See you soon!", "/")),
        Err(GameError::NotLoggedIn) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, "/")]).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

#[instrument(skip(service))]
async fn mine(
    State(service): State<GameService>,
    ClientAddress(address): ClientAddress,
) -> Result<Response, WebError> {
    let result = blocking(&service, move |s| s.mine(&address, &mut rand::thread_rng())).await?;
    match result {
        Ok(outcome) => {
            let text = pages::mine_text(
                outcome.record().gold,
                *outcome.gold_mined(),
                *outcome.diamond_mined() > 0,
            );
            if *outcome.auto_mine() {
                Ok(redirect(titles::MINE, &text, "/mine"))
            } else {
                Ok(Html(pages::page(titles::MINE, &text)).into_response())
            }
        }
        Err(GameError::NotLoggedIn) => Ok(redirect(
            titles::MINE,
            "You need to be logged in to mine!",
            "/",
        )),
        Err(other) => Err(other.into()),
    }
}

#[instrument(skip(service))]
async fn scoreboard(State(service): State<GameService>) -> Result<Response, WebError> {
    let scores = blocking(&service, |s| s.scoreboard()).await??;
    Ok(Html(pages::page(titles::SCOREBOARD, &pages::scoreboard_text(&scores))).into_response())
}

#[instrument(skip(service))]
async fn shop(
    State(service): State<GameService>,
    ClientAddress(address): ClientAddress,
) -> Result<Response, WebError> {
    let account = blocking(&service, move |s| s.current_account(&address)).await??;
    if !account.exists() {
        return Ok(redirect(
            titles::SHOP,
            "You need to be logged in to check out the shop!",
            "/",
        ));
    }
    let text = pages::shop_text(&account, service.catalog());
    Ok(Html(pages::page(titles::SHOP, &text)).into_response())
}

#[instrument(skip(service))]
async fn shop_item(
    State(service): State<GameService>,
    ClientAddress(address): ClientAddress,
    Path(item): Path<String>,
) -> Result<Response, WebError> {
    let index = item_index(&item);

    match blocking(&service, move |s| s.purchase(&address, index)).await? {
        Ok(receipt) => Ok(redirect(
            titles::SHOP,
            &format!("You have successfully bought {}!", receipt.item_name()),
            "/shop",
        )),
        Err(GameError::NotLoggedIn) => Ok(redirect(
            titles::SHOP,
            "You need to be logged in to buy an item!",
            "/",
        )),
        Err(GameError::InvalidItem(_)) => {
            warn!(item = %item, "Invalid shop item");
            Ok(redirect(titles::SHOP, "Invalid item number!", "/shop"))
        }
        Err(GameError::Purchase(mining_economy::PurchaseError::InsufficientGold { .. })) => Ok(
            redirect(
                titles::SHOP,
                "You don't have enough gold to buy that item!",
                "/shop",
            ),
        ),
        Err(GameError::Purchase(mining_economy::PurchaseError::InsufficientDiamonds { .. })) => {
            Ok(redirect(
                titles::SHOP,
                "You don't have enough diamonds to buy that item!",
                "/shop",
            ))
        }
        Err(other) => Err(other.into()),
    }
}
