//! HTTP routing shim: pre-built pages, embedded assets and a small JSON API.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{
        AuctionQuote, BidAnalysis, CraftRequest, CraftingReport, Inventory, Mission, MissionBoard,
        MissionSort, PriceTable, RankedMission, RecentTools, ReportOrder, Tool, ToolVisit,
        DEFAULT_PARTY_SIZE,
    },
    infra::recent_store::{load_recent, save_recent, RecentToolsStore},
    util::{
        assets::{self, Asset},
        format::now_millis,
        input::{lenient, or_default, Field},
        version::version_label,
    },
};

pub const NOT_FOUND_BODY: &str = "<h1>404 - Page not found</h1>";

pub struct AppState {
    recent: Mutex<RecentTools>,
    store: Arc<dyn RecentToolsStore>,
}

impl AppState {
    /// Reads (and prunes) the persisted list once at startup.
    pub fn new(store: Arc<dyn RecentToolsStore>) -> Self {
        let recent = load_recent(store.as_ref(), now_millis());
        Self {
            recent: Mutex::new(recent),
            store,
        }
    }

    pub async fn record_visit(&self, tool: Tool) {
        let snapshot = {
            let mut recent = self.recent.lock().await;
            recent.visit(tool.visit(now_millis()));
            recent.clone()
        };
        self.persist(snapshot).await;
    }

    pub async fn recent_tools(&self) -> Vec<ToolVisit> {
        let (entries, pruned) = {
            let mut recent = self.recent.lock().await;
            let pruned = recent.prune(now_millis()).then(|| recent.clone());
            (recent.entries().to_vec(), pruned)
        };
        if let Some(snapshot) = pruned {
            self.persist(snapshot).await;
        }
        entries
    }

    /// File stores block, so saves run on the blocking pool.
    async fn persist(&self, snapshot: RecentTools) {
        let store = Arc::clone(&self.store);
        let saved =
            tokio::task::spawn_blocking(move || save_recent(store.as_ref(), &snapshot)).await;
        if let Err(err) = saved {
            tracing::warn!(target: "recent_tools", error = %err, "save task failed");
        }
    }
}

type SharedState = Arc<AppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/abidoscalculator", get(abidos_page))
        .route("/dispatch", get(dispatch_page))
        .route("/auction", get(auction_page))
        .route("/health", get(health))
        .route("/api/crafting", post(api_crafting))
        .route("/api/auction", post(api_auction))
        .route("/api/dispatch", post(api_dispatch))
        .route("/api/recent-tools", get(api_recent_tools))
        .fallback(static_asset)
        .with_state(Arc::new(state))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "server", addr = %listener.local_addr()?, version = %version_label(), "server is running");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(target: "server", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "server", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "ok"
}

fn asset_response(asset: Asset) -> Response {
    ([(header::CONTENT_TYPE, asset.mime)], asset.data).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response()
}

fn page_response(route: &str) -> Response {
    assets::page(route).map(asset_response).unwrap_or_else(not_found)
}

async fn home_page() -> Response {
    page_response("/")
}

async fn tool_page(state: &AppState, tool: Tool) -> Response {
    state.record_visit(tool).await;
    page_response(tool.url())
}

async fn abidos_page(State(state): State<SharedState>) -> Response {
    tool_page(&state, Tool::Abidos).await
}

async fn dispatch_page(State(state): State<SharedState>) -> Response {
    tool_page(&state, Tool::Dispatch).await
}

async fn auction_page(State(state): State<SharedState>) -> Response {
    tool_page(&state, Tool::Auction).await
}

async fn static_asset(uri: Uri) -> Response {
    assets::lookup(uri.path())
        .map(asset_response)
        .unwrap_or_else(not_found)
}

async fn api_recent_tools(State(state): State<SharedState>) -> Json<Vec<ToolVisit>> {
    Json(state.recent_tools().await)
}

fn quantity(field: &Option<Field>) -> u64 {
    field.as_ref().map(Field::quantity).unwrap_or(0)
}

fn amount(field: &Option<Field>) -> f64 {
    field.as_ref().and_then(Field::amount).unwrap_or(0.0)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialFields {
    #[serde(deserialize_with = "lenient")]
    pub wood: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub soft_wood: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub sturdy_wood: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub abidos_wood: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub dust: Option<Field>,
}

impl MaterialFields {
    fn prices(&self) -> PriceTable {
        PriceTable {
            wood: amount(&self.wood),
            soft_wood: amount(&self.soft_wood),
            sturdy_wood: amount(&self.sturdy_wood),
            abidos_wood: amount(&self.abidos_wood),
        }
    }

    fn inventory(&self) -> Inventory {
        Inventory {
            wood: quantity(&self.wood),
            soft_wood: quantity(&self.soft_wood),
            sturdy_wood: quantity(&self.sturdy_wood),
            abidos_wood: quantity(&self.abidos_wood),
            dust: quantity(&self.dust),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CraftingInput {
    #[serde(deserialize_with = "lenient")]
    pub count: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub bonus_rate: Option<Field>,
    #[serde(deserialize_with = "or_default")]
    pub prices: MaterialFields,
    #[serde(deserialize_with = "or_default")]
    pub inventory: MaterialFields,
    #[serde(deserialize_with = "or_default")]
    pub order: ReportOrder,
}

async fn api_crafting(Json(input): Json<CraftingInput>) -> Json<CraftingReport> {
    let count = u32::try_from(quantity(&input.count)).unwrap_or(u32::MAX);
    let request = CraftRequest::new(count, amount(&input.bonus_rate));
    Json(CraftingReport::build_ordered(
        request,
        input.inventory.inventory(),
        &input.prices.prices(),
        input.order,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuctionInput {
    #[serde(deserialize_with = "lenient")]
    pub price: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub party_size: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub bid: Option<Field>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionOutput {
    pub quote: Option<AuctionQuote>,
    pub bid: Option<BidAnalysis>,
}

async fn api_auction(Json(input): Json<AuctionInput>) -> Json<AuctionOutput> {
    let party_size = match quantity(&input.party_size) {
        0 => DEFAULT_PARTY_SIZE,
        size => u32::try_from(size).unwrap_or(u32::MAX),
    };
    let quote = AuctionQuote::new(amount(&input.price), party_size);
    let bid = quote
        .as_ref()
        .and_then(|q| q.analyze_bid(amount(&input.bid)));
    Json(AuctionOutput { quote, bid })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MissionInput {
    #[serde(deserialize_with = "or_default")]
    pub id: Option<Uuid>,
    #[serde(deserialize_with = "lenient")]
    pub reward: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub activity: Option<Field>,
    #[serde(deserialize_with = "lenient")]
    pub time: Option<Field>,
}

impl MissionInput {
    fn into_mission(self) -> Mission {
        Mission {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            reward: self.reward.as_ref().and_then(Field::amount),
            activity: self.activity.as_ref().and_then(Field::amount),
            time: self.time.as_ref().and_then(Field::amount),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchInput {
    #[serde(deserialize_with = "or_default")]
    pub missions: Vec<MissionInput>,
    #[serde(deserialize_with = "or_default")]
    pub sort_by: MissionSort,
}

async fn api_dispatch(Json(input): Json<DispatchInput>) -> Json<Vec<RankedMission>> {
    let board = MissionBoard::from_missions(
        input
            .missions
            .into_iter()
            .map(MissionInput::into_mission)
            .collect(),
    );
    Json(board.ranked(input.sort_by))
}
