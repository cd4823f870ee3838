use askama::Template;
use axum::{http::StatusCode, response::Html};

use confarch_auth_axum::{AuthUser, IntoResponseError};

#[derive(Template)]
#[template(path = "index.j2", escape = "html")]
struct IndexTemplate<'a> {
    name: &'a str,
    claims: [(&'static str, &'a str); 4],
}

#[derive(Template)]
#[template(path = "error.j2", escape = "html")]
pub(crate) struct ErrorTemplate<'a> {
    pub(crate) details: Option<&'a str>,
}

/// Landing page listing the claims of the signed-in user
pub(crate) async fn index(user: AuthUser) -> Result<Html<String>, (StatusCode, String)> {
    let template = IndexTemplate {
        name: &user.name,
        claims: user.claims(),
    };
    let html = template.render().into_response_error()?;
    Ok(Html(html))
}

pub(crate) async fn error_page() -> Result<Html<String>, (StatusCode, String)> {
    let html = ErrorTemplate { details: None }
        .render()
        .into_response_error()?;
    Ok(Html(html))
}
