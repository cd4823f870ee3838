use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use confarch_auth::{CoordinationError, LoginForm};

use super::{LOGIN_WITH_GOOGLE_PATH, found};
use crate::error::{ErrorPage, IntoResponseError};
use crate::state::AuthState;

#[derive(Deserialize)]
pub(super) struct ReturnUrlQuery {
    #[serde(rename = "returnUrl")]
    pub(super) return_url: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(rename = "rememberLogin")]
    remember_login: Option<String>,
    #[serde(rename = "returnUrl")]
    return_url: Option<String>,
}

impl LoginRequest {
    /// Checkbox values as browsers and the form send them
    fn remember_login(&self) -> bool {
        matches!(
            self.remember_login.as_deref(),
            Some("true" | "on" | "1")
        )
    }
}

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate<'a> {
    form_action: &'a str,
    return_url: &'a str,
    username: &'a str,
    error: Option<&'a str>,
    external_provider: Option<&'a str>,
    external_login_url: String,
}

fn render_login(
    state: &AuthState,
    form: &LoginForm,
    username: &str,
    error: Option<&str>,
) -> Result<Html<String>, ErrorPage> {
    let template = LoginTemplate {
        form_action: &state.login_path,
        return_url: &form.return_url,
        username,
        error,
        external_provider: form.external_provider.as_deref(),
        external_login_url: format!(
            "{}?returnUrl={}",
            LOGIN_WITH_GOOGLE_PATH,
            urlencoding::encode(&form.return_url)
        ),
    };
    Ok(Html(template.render().into_response_error()?))
}

pub(super) async fn show_login_form(
    State(state): State<AuthState>,
    Query(query): Query<ReturnUrlQuery>,
) -> Result<Html<String>, ErrorPage> {
    let form = state.coordinator.login_form(query.return_url.as_deref());
    render_login(&state, &form, "", None)
}

pub(super) async fn submit_login(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Form(request): Form<LoginRequest>,
) -> Result<Response, ErrorPage> {
    let result = state
        .coordinator
        .submit_login(
            &headers,
            &request.username,
            &request.password,
            request.remember_login(),
            request.return_url.as_deref(),
        )
        .await;

    match result {
        Ok(outcome) => Ok(found(outcome.headers, &outcome.redirect_to)),
        Err(CoordinationError::InvalidCredentials) => {
            let form = state.coordinator.login_form(request.return_url.as_deref());
            let page = render_login(
                &state,
                &form,
                &request.username,
                Some("Invalid username or password."),
            )?;
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
