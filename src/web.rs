use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::MoveCatalog;
use crate::config::Config;
use crate::error::FormError;
use crate::form::{
    apply_multi_event, apply_single_event, render_multi, render_single, MultiEvent,
    MultiFormState, SingleEvent, SingleFormState,
};

pub const SESSION_COOKIE: &str = "move_helper_session";
const SINGLE_FORM_KEY: &str = "single_form";
const MULTI_FORM_KEY: &str = "multi_form";
const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Shared by every worker; the catalog never changes after startup
pub struct AppState {
    pub catalog: &'static MoveCatalog,
}

#[derive(Deserialize)]
pub struct MoveQuery {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub struct MoveNamesResponse<'a> {
    names: Vec<&'a str>,
}

/// Reads a form state from the session. A missing or unreadable entry starts
/// the form over instead of failing the request.
fn load_form<T: DeserializeOwned + Default>(session: &Session, key: &str) -> T {
    match session.get::<T>(key) {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            log::warn!("discarding unreadable session entry `{}`: {}", key, e);
            T::default()
        }
    }
}

fn rejected(err: FormError) -> HttpResponse {
    log::warn!("rejected form event: {}", err);
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": err.to_string()
    }))
}

// Move search endpoint
async fn get_moves(
    query: web::Query<MoveQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let names = state.catalog.search(
        query.q.as_deref().unwrap_or(""),
        query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    );
    Ok(HttpResponse::Ok().json(MoveNamesResponse { names }))
}

// Single-action form endpoints
async fn get_single(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let form: SingleFormState = load_form(&session, SINGLE_FORM_KEY);
    Ok(HttpResponse::Ok().json(render_single(&form, state.catalog)))
}

async fn post_single_event(
    event: web::Json<SingleEvent>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut form: SingleFormState = load_form(&session, SINGLE_FORM_KEY);
    let event = event.into_inner();
    log::debug!("single form event: {:?}", event);

    if let Err(err) = apply_single_event(&mut form, state.catalog, event) {
        return Ok(rejected(err));
    }
    session.insert(SINGLE_FORM_KEY, &form)?;

    Ok(HttpResponse::Ok().json(render_single(&form, state.catalog)))
}

// Multi-action form endpoints
async fn get_multi(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let form: MultiFormState = load_form(&session, MULTI_FORM_KEY);
    Ok(HttpResponse::Ok().json(render_multi(&form, state.catalog)))
}

async fn post_multi_event(
    event: web::Json<MultiEvent>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut form: MultiFormState = load_form(&session, MULTI_FORM_KEY);
    let event = event.into_inner();
    log::debug!("multi form event: {:?}", event);

    if let Err(err) = apply_multi_event(&mut form, state.catalog, event) {
        return Ok(rejected(err));
    }
    session.insert(MULTI_FORM_KEY, &form)?;

    Ok(HttpResponse::Ok().json(render_multi(&form, state.catalog)))
}

// HTML page handlers
async fn single_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/single.html");
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html))
}

async fn multi_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/multi.html");
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(single_page))
        .route("/multi", web::get().to(multi_page))
        .route("/api/moves", web::get().to(get_moves))
        .route("/api/single", web::get().to(get_single))
        .route("/api/single/event", web::post().to(post_single_event))
        .route("/api/multi", web::get().to(get_multi))
        .route("/api/multi/event", web::post().to(post_multi_event));
}

fn session_key(config: &Config) -> Key {
    match &config.session_secret {
        Some(secret) => Key::from(secret.as_slice()),
        None => {
            log::warn!("SESSION_SECRET not set, sessions will not survive a restart");
            Key::generate()
        }
    }
}

pub async fn start_server(config: Config, catalog: &'static MoveCatalog) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { catalog });
    let key = session_key(&config);
    let secure_cookies = config.secure_cookies;

    log::info!("listening on http://{}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_name(SESSION_COOKIE.to_string())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(routes)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;
    use crate::form::MAX_SWITCH_NAME_CHARS;
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    fn catalog() -> &'static MoveCatalog {
        Box::leak(Box::new(test_catalog()))
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState { catalog: catalog() }))
                    .wrap(
                        SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                            .cookie_name(SESSION_COOKIE.to_string())
                            .cookie_secure(false)
                            .build(),
                    )
                    .configure(routes),
            )
            .await
        };
    }

    fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
    }

    fn event(uri: &str, cookie: Option<&Cookie<'static>>, body: Value) -> test::TestRequest {
        let req = test::TestRequest::post().uri(uri).set_json(body);
        match cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    #[actix_web::test]
    async fn pages_are_served() {
        let app = test_app!();
        for uri in ["/", "/multi"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
    }

    #[actix_web::test]
    async fn move_search() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/moves?q=quick").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "names": ["でんこうせっか"] }));

        let req = test::TestRequest::get().uri("/api/moves?limit=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["names"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn fresh_session_shows_empty_forms() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/single").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["body"], Value::Null);

        let req = test::TestRequest::get().uri("/api/multi").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["output"], "");
        assert_eq!(body["placeholder"], "入力された行動はありません");
    }

    #[actix_web::test]
    async fn single_form_state_follows_the_session() {
        let app = test_app!();

        let body = json!({"type": "select_move", "name": "でんこうせっか"});
        let req = event("/api/single/event", None, body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp).expect("session cookie");

        let body = json!({"type": "toggle", "group": "user", "label": "1"});
        let req = event("/api/single/event", Some(&cookie), body).to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = session_cookie(&resp).expect("session cookie");

        let body = json!({"type": "toggle", "group": "target", "label": "イ"});
        let req = event("/api/single/event", Some(&cookie), body).to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = session_cookie(&resp).expect("session cookie");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["body"]["output"], "1でんこうせっかイ");

        let body = json!({"type": "toggle", "group": "target", "label": "エ"});
        let req = event("/api/single/event", Some(&cookie), body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let req = test::TestRequest::get().uri("/api/single").cookie(cookie).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["body"]["output"], "1でんこうせっかイ");
        assert_eq!(body["body"]["target"]["kind"], "choose");
    }

    #[actix_web::test]
    async fn multi_form_builds_joined_command() {
        let app = test_app!();
        let events = [
            json!({"type": "select_move", "slot": 1, "name": "つるぎのまい"}),
            json!({"type": "set_no_mega", "slot": 1, "value": true}),
            json!({"type": "set_kind", "slot": 2, "kind": "generic"}),
            json!({"type": "set_kind", "slot": 3, "kind": "switch"}),
            json!({"type": "set_switch_name", "slot": 3, "name": "モロバレル"}),
        ];

        let mut cookie: Option<Cookie<'static>> = None;
        for body in events {
            let req = event("/api/multi/event", cookie.as_ref(), body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            cookie = session_cookie(&resp).or(cookie);
        }

        let req = test::TestRequest::get()
            .uri("/api/multi")
            .cookie(cookie.expect("session cookie"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["output"], "1？つるぎのまい 2ムーブ 3モロバレル");
        assert_eq!(body["placeholder"], Value::Null);
        assert_eq!(body["name_suggestions"], json!(["モロバレル"]));
    }

    #[actix_web::test]
    async fn multi_form_rejects_bad_slot() {
        let app = test_app!();
        let body = json!({"type": "set_kind", "slot": 5, "kind": "move"});
        let req = event("/api/multi/event", None, body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(session_cookie(&resp).is_none());
    }

    #[actix_web::test]
    async fn overlong_switch_name_is_rejected_and_session_kept() {
        let app = test_app!();
        let longest = "モ".repeat(MAX_SWITCH_NAME_CHARS);
        let body = json!({"type": "set_switch_name", "slot": 1, "name": longest});
        let req = event("/api/multi/event", None, body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp).expect("session cookie");

        let body = json!({"type": "set_switch_name", "slot": 1, "name": "モ".repeat(1500)});
        let req = event("/api/multi/event", Some(&cookie), body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(session_cookie(&resp).is_none());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let req = test::TestRequest::get()
            .uri("/api/multi")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name_suggestions"], json!([longest]));
    }
}
