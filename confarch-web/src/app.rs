//! HTTP pipeline of the site
//!
//! Outermost to innermost: request tracing, panic handling, HSTS (production
//! only), static files, routing, authentication, authorization, handlers.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, Uri, header},
    middleware::{from_fn, from_fn_with_state},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use askama::Template;
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    LatencyUnit,
    catch_panic::CatchPanicLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use confarch_auth_axum::{AuthState, account_router, authenticate, require_authenticated};

use crate::config::{AppEnvironment, WebConfig};
use crate::handlers::{self, ErrorTemplate};

pub const ERROR_PATH: &str = "/home/error";

const HSTS_VALUE: &str = "max-age=2592000";

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Assembles the application served on the HTTPS listener
pub fn build_app(state: AuthState, config: &WebConfig) -> Router {
    // Deny by default: everything merged here sits behind require_authenticated
    let protected = Router::new()
        .route("/", get(handlers::index))
        .route_layer(from_fn(require_authenticated));

    let app = protected
        .merge(account_router(state.clone()))
        .route(ERROR_PATH, get(handlers::error_page))
        .layer(from_fn_with_state(state, authenticate))
        .nest_service("/static", ServeDir::new(&config.static_dir));

    let app = match config.environment {
        AppEnvironment::Production => app.layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        )),
        AppEnvironment::Development => app,
    };

    app.layer(panic_layer(config.environment)).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Turns handler panics into a response instead of a dropped connection.
///
/// Development shows the panic message; production redirects to the error page.
pub fn panic_layer(environment: AppEnvironment) -> CatchPanicLayer<PanicHandler> {
    let handler: PanicHandler = match environment {
        AppEnvironment::Development => show_panic_details,
        AppEnvironment::Production => redirect_to_error_page,
    };
    CatchPanicLayer::custom(handler)
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic payload".to_string()
    }
}

fn show_panic_details(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic_message(err.as_ref());
    tracing::error!("Handler panicked: {}", details);

    let template = ErrorTemplate {
        details: Some(details.as_str()),
    };
    match template.render() {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, details).into_response(),
    }
}

fn redirect_to_error_page(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked: {}", panic_message(err.as_ref()));

    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, ERROR_PATH)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[derive(Clone)]
struct HttpsOrigin(Arc<str>);

/// App for the plain-HTTP listener: every request is sent to the same path on `origin`
pub fn https_redirect_app(origin: &str) -> Router {
    Router::new()
        .fallback(redirect_to_https)
        .with_state(HttpsOrigin(Arc::from(origin.trim_end_matches('/'))))
}

async fn redirect_to_https(State(HttpsOrigin(origin)): State<HttpsOrigin>, uri: Uri) -> Redirect {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    tracing::debug!("Redirecting {} to HTTPS", path);
    Redirect::permanent(&format!("{origin}{path}"))
}
