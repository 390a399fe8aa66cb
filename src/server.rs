//! JSON HTTP server.
//!
//! Thin axum layer over the content services. Each request builds its
//! services from the shared [`SqliteStore`] and an auditor for the acting
//! user, taken from the `x-board-actor` header or `[audit].default_actor`.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/health` | Liveness |
//! | GET | `/articles` | Search and page articles |
//! | GET | `/articles/search-hashtag` | Browse one hashtag |
//! | GET | `/articles/{id}` | Article with comments |
//! | POST | `/articles` | Create an article |
//! | PUT | `/articles/{id}` | Partial update |
//! | DELETE | `/articles/{id}` | Delete with comments |
//! | GET | `/hashtags` | Hashtags in use |
//! | POST | `/articles/{id}/comments` | Add a comment |
//! | DELETE | `/comments/{id}` | Delete a comment |
//! | POST | `/accounts` | Register an account |
//!
//! Errors use the envelope `{"error": {"code", "message"}}`.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use project_board_core::audit::ActorAuditor;
use project_board_core::error::BoardError;
use project_board_core::pagination::{Direction, Page, PageRequest, Sort, SortField};
use project_board_core::search::SearchType;
use project_board_core::service::{
    AccountService, ArticlePatch, ArticleService, CommentService, NewAccount, NewArticle,
};
use project_board_core::store::CascadeOutcome;
use project_board_core::views::{AccountSummary, ArticleDetail, ArticleSummary, CommentView};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Header naming the acting user.
pub const ACTOR_HEADER: &str = "x-board-actor";

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<SqliteStore>,
}

impl AppState {
    fn auditor(&self, headers: &HeaderMap) -> ActorAuditor {
        let requested = headers.get(ACTOR_HEADER).and_then(|v| v.to_str().ok());
        ActorAuditor::new(self.config.actor(requested))
    }

    fn articles<'a>(&'a self, auditor: &'a ActorAuditor) -> ArticleService<'a, SqliteStore> {
        ArticleService::new(self.store.as_ref(), auditor)
            .with_bar_length(self.config.pagination.bar_length)
    }
}

pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let store = SqliteStore::connect(config).await?;
    let app = router(config.clone(), store);

    println!("Board server listening on http://{}", bind_addr);
    info!(bind = %bind_addr, "server started");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router over an open store.
pub fn router(config: Config, store: SqliteStore) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/articles", get(handle_list).post(handle_create))
        .route("/articles/search-hashtag", get(handle_search_hashtag))
        .route(
            "/articles/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/articles/{id}/comments", post(handle_add_comment))
        .route("/comments/{id}", delete(handle_delete_comment))
        .route("/hashtags", get(handle_hashtags))
        .route("/accounts", post(handle_register))
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "conflict".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<BoardError> for AppError {
    fn from(err: BoardError) -> Self {
        let message = err.to_string();
        match err {
            BoardError::NotFound { .. } => not_found(message),
            BoardError::Invalid { .. } => bad_request(message),
            BoardError::Conflict { .. } => conflict(message),
            BoardError::Storage(e) => {
                error!(error = %e, "storage failure");
                internal("storage failure")
            }
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Query string for listing endpoints. The camelCase aliases accept the
/// parameter names of the classic board UI.
#[derive(Debug, Deserialize, Default)]
struct ListQuery {
    #[serde(default, alias = "searchType")]
    search_type: Option<String>,
    #[serde(default, alias = "searchValue")]
    keyword: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    size: Option<usize>,
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    direction: Option<String>,
}

impl ListQuery {
    fn page_request(&self, default_size: usize) -> Result<PageRequest, AppError> {
        let mut sort = Sort::default();
        if let Some(field) = &self.sort {
            sort.field = field.parse::<SortField>().map_err(bad_request)?;
        }
        if let Some(direction) = &self.direction {
            sort.direction = direction.parse::<Direction>().map_err(bad_request)?;
        }
        Ok(PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(default_size),
            sort,
        ))
    }

    fn search_type(&self) -> Result<Option<SearchType>, AppError> {
        match self.search_type.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.parse().map(Some).map_err(bad_request),
            _ => Ok(None),
        }
    }
}

#[derive(Serialize)]
struct ListResponse {
    articles: Page<ArticleSummary>,
    pagination_bar: Vec<usize>,
}

async fn handle_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let request = query.page_request(state.config.pagination.page_size)?;
    let search_type = query.search_type()?;
    let auditor = state.auditor(&headers);
    let service = state.articles(&auditor);

    let articles = service
        .list(search_type, query.keyword.as_deref(), &request)
        .await?;
    let pagination_bar = service.pagination_bar(&articles);
    Ok(Json(ListResponse {
        articles,
        pagination_bar,
    }))
}

#[derive(Serialize)]
struct HashtagSearchResponse {
    articles: Page<ArticleSummary>,
    pagination_bar: Vec<usize>,
    hashtags: Vec<String>,
}

async fn handle_search_hashtag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<HashtagSearchResponse>, AppError> {
    let request = query.page_request(state.config.pagination.page_size)?;
    let auditor = state.auditor(&headers);
    let service = state.articles(&auditor);

    let articles = service
        .list_by_hashtag(query.keyword.as_deref(), &request)
        .await?;
    let pagination_bar = service.pagination_bar(&articles);
    let mut hashtags = service.distinct_hashtags().await?;
    hashtags.sort();
    Ok(Json(HashtagSearchResponse {
        articles,
        pagination_bar,
        hashtags,
    }))
}

async fn handle_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ArticleDetail>, AppError> {
    let auditor = state.auditor(&headers);
    Ok(Json(state.articles(&auditor).get(id).await?))
}

#[derive(Debug, Deserialize)]
struct ArticleBody {
    title: String,
    content: String,
    #[serde(default)]
    hashtag: Option<String>,
}

async fn handle_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ArticleBody>,
) -> Result<(StatusCode, Json<ArticleSummary>), AppError> {
    let auditor = state.auditor(&headers);
    let post = NewArticle {
        title: body.title,
        content: body.content,
        hashtag: body.hashtag,
    };
    let created = state
        .articles(&auditor)
        .create(auditor.actor(), post)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct PatchBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    hashtag: Option<String>,
}

async fn handle_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<PatchBody>,
) -> Result<StatusCode, AppError> {
    let auditor = state.auditor(&headers);
    let patch = ArticlePatch {
        title: body.title,
        content: body.content,
        hashtag: body.hashtag,
    };
    state.articles(&auditor).update(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<CascadeOutcome>, AppError> {
    let auditor = state.auditor(&headers);
    Ok(Json(state.articles(&auditor).delete(id).await?))
}

#[derive(Serialize)]
struct HashtagsResponse {
    hashtags: Vec<String>,
}

async fn handle_hashtags(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HashtagsResponse>, AppError> {
    let auditor = state.auditor(&headers);
    let mut hashtags = state.articles(&auditor).distinct_hashtags().await?;
    hashtags.sort();
    Ok(Json(HashtagsResponse { hashtags }))
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    content: String,
}

async fn handle_add_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(article_id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let auditor = state.auditor(&headers);
    let created = CommentService::new(state.store.as_ref(), &auditor)
        .create(article_id, auditor.actor(), &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Serialize)]
struct DeleteCommentResponse {
    removed: bool,
}

async fn handle_delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<DeleteCommentResponse>, AppError> {
    let auditor = state.auditor(&headers);
    let removed = CommentService::new(state.store.as_ref(), &auditor)
        .delete(id)
        .await?;
    Ok(Json(DeleteCommentResponse { removed }))
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    user_id: String,
    credential_hash: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    memo: Option<String>,
}

async fn handle_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AccountBody>,
) -> Result<(StatusCode, Json<AccountSummary>), AppError> {
    let auditor = state.auditor(&headers);
    let account = NewAccount {
        user_id: body.user_id,
        credential_hash: body.credential_hash,
        email: body.email,
        nickname: body.nickname,
        memo: body.memo,
    };
    let saved = AccountService::new(state.store.as_ref(), &auditor)
        .register(account)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
