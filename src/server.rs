use std::io;
use std::sync::Arc;

use ntex::web;
use ntex::web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};
use spdlog::{error, info};

use crate::admin::ContentManager;
use crate::config::Config;
use crate::content::{ContentChanges, ContentId, NewContent};
use crate::content_query::ContentQuery;
use crate::error::StoreError;
use crate::newsletter::{Newsletter, SubscribeOutcome, SubscribeResponse};
use crate::paginator::{Page, Paginator};
use crate::store::{open_stores, ContentStore, Stores};
use crate::sync::{ContentSync, SyncResponse};

pub struct AppState {
    content: Arc<dyn ContentStore>,
    sync: ContentSync,
    manager: ContentManager,
    newsletter: Newsletter,
    page_size: u32,
}

impl AppState {
    pub fn new(stores: Stores, sync: ContentSync, page_size: u32) -> Self {
        AppState {
            content: stores.content.clone(),
            sync,
            manager: ContentManager::new(stores.content),
            newsletter: Newsletter::new(stores.subscribers),
            page_size,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn json_body<T: Serialize>(mut builder: HttpResponseBuilder, body: &T) -> HttpResponse {
    match serde_json::to_string(body) {
        Ok(body) => builder
            .content_type("application/json")
            .body(body),
        Err(e) => HttpResponse::InternalServerError()
            .body(format!("Error serializing response: {}", e)),
    }
}

fn error_body(builder: HttpResponseBuilder, error: String) -> HttpResponse {
    json_body(builder, &ErrorBody { error })
}

fn store_error(e: StoreError) -> HttpResponse {
    let builder = match e {
        StoreError::NotFound { .. } => HttpResponse::NotFound(),
        StoreError::Duplicate { .. } => HttpResponse::Conflict(),
        _ => {
            error!("Store error: {}", e);
            HttpResponse::InternalServerError()
        }
    };
    error_body(builder, e.to_string())
}

fn parse_id(id: &str) -> Result<ContentId, HttpResponse> {
    id.parse()
        .map_err(|_| error_body(HttpResponse::BadRequest(), format!("Invalid content id {}", id)))
}

fn with_cors(mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "authorization, x-client-info, apikey, content-type");
    builder
}

// Begin: Sync trigger region --------
#[web::options("/functions/wordpress-scraper")]
async fn sync_preflight() -> HttpResponse {
    with_cors(HttpResponse::Ok()).body("ok")
}

#[web::post("/functions/wordpress-scraper")]
async fn sync_trigger(state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let result = state.sync.run().await;
    if let Err(ref e) = result {
        error!("Content sync failed: {}", e);
    }

    let response = SyncResponse::from(result);
    let builder = if response.success {
        HttpResponse::Ok()
    } else {
        HttpResponse::InternalServerError()
    };
    json_body(with_cors(builder), &response)
}
// End: Sync trigger region --------

#[web::get("/api/content")]
async fn list_content(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let query = ContentQuery::from(req.uri().query().unwrap_or(""));
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return error_body(HttpResponse::BadRequest(), e),
    };

    let items = match state.content.list(&filter).await {
        Ok(items) => items,
        Err(e) => return store_error(e),
    };

    match query.page() {
        Some(page) => json_body(HttpResponse::Ok(), &Paginator::from(&items, state.page_size).page(page)),
        None => json_body(HttpResponse::Ok(), &Page::all(&items)),
    }
}

// Begin: Admin region --------
#[web::get("/api/admin/content")]
async fn admin_list(state: web::types::State<Arc<AppState>>) -> HttpResponse {
    match state.manager.list_all().await {
        Ok(items) => json_body(HttpResponse::Ok(), &items),
        Err(e) => store_error(e),
    }
}

#[web::post("/api/admin/content")]
async fn admin_create(new: web::types::Json<NewContent>, state: web::types::State<Arc<AppState>>) -> HttpResponse {
    match state.manager.create(new.into_inner()).await {
        Ok(item) => json_body(HttpResponse::Created(), &item),
        Err(e) => store_error(e),
    }
}

#[web::put("/api/admin/content/{id}")]
async fn admin_update(
    path: web::types::Path<String>,
    changes: web::types::Json<ContentChanges>,
    state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let id = match parse_id(&path.into_inner()) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.manager.update(id, changes.into_inner()).await {
        Ok(item) => json_body(HttpResponse::Ok(), &item),
        Err(e) => store_error(e),
    }
}

#[web::delete("/api/admin/content/{id}")]
async fn admin_delete(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let id = match parse_id(&path.into_inner()) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.manager.delete(id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => error_body(HttpResponse::NotFound(), format!("content not found: {}", id)),
        Err(e) => store_error(e),
    }
}

#[web::post("/api/admin/content/{id}/{action}")]
async fn admin_action(path: web::types::Path<(String, String)>, state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let (id, action) = path.into_inner();
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let res = match action.as_str() {
        "publish" => state.manager.publish(id).await,
        "archive" => state.manager.archive(id).await,
        "duplicate" => state.manager.duplicate(id).await,
        other => return error_body(HttpResponse::NotFound(), format!("Unknown action {}", other)),
    };

    match res {
        Ok(item) => json_body(HttpResponse::Ok(), &item),
        Err(e) => store_error(e),
    }
}
// End: Admin region --------

#[derive(Deserialize)]
struct SubscribeRequest {
    #[serde(default)]
    email: String,
}

#[web::post("/api/newsletter")]
async fn subscribe(body: web::types::Json<SubscribeRequest>, state: web::types::State<Arc<AppState>>) -> HttpResponse {
    let outcome = state.newsletter.subscribe(&body.email).await;
    let builder = match outcome {
        SubscribeOutcome::Subscribed => HttpResponse::Ok(),
        SubscribeOutcome::AlreadySubscribed => HttpResponse::Conflict(),
        SubscribeOutcome::InvalidEmail => HttpResponse::BadRequest(),
        SubscribeOutcome::Failed => HttpResponse::InternalServerError(),
    };
    json_body(builder, &SubscribeResponse::from(outcome))
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(sync_preflight)
        .service(sync_trigger)
        .service(list_content)
        .service(admin_list)
        .service(admin_create)
        .service(admin_update)
        .service(admin_delete)
        .service(admin_action)
        .service(subscribe);
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let stores = open_stores(&config.store).map_err(io::Error::other)?;
    let sync = ContentSync::from_config(&config.source, stores.content.clone()).map_err(io::Error::other)?;

    match config.store.data_file {
        Some(ref path) => info!("Content is kept in {}", path.display()),
        None => info!("No data file configured. Content is kept in memory"),
    }

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState::new(stores, sync, config.defaults.page_size));

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .configure(configure)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
