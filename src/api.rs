use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract,
    http::StatusCode,
    response::{self, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    indexes::Backend,
    render::{form_line, form_text, search_header, VIEW_ALL_HEADER},
    timing::timed_search,
    Result,
};

pub type SharedBackend = Arc<dyn Backend>;

/// Serve the search form for `backend` until the process is stopped.
pub async fn run(backend: SharedBackend, addr: SocketAddr) -> Result<()> {
    log::info!(
        "{} search form listening on http://{addr}",
        backend.name()
    );
    axum::Server::try_bind(&addr)
        .map_err(|err| Error::Server(err.into()))?
        .serve(router(backend).into_make_service())
        .await
        .map_err(|err| Error::Server(err.into()))
}

pub fn router(backend: SharedBackend) -> Router {
    Router::new()
        .route("/", get(form))
        .route("/search", get(search))
        .route("/documents", get(get_documents))
        .layer(extract::Extension(backend))
}

async fn form() -> response::Html<&'static str> {
    response::Html(include_str!("form.html"))
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub q: String,
}

/// What the form shows after a button press.
#[derive(Debug, Serialize)]
pub struct Page {
    pub header: String,
    pub lines: Vec<String>,
    pub count: usize,
    pub elapsed_secs: Option<f64>,
    /// `header` and `lines` laid out for the output area.
    pub text: String,
}

impl Page {
    fn new(header: String, lines: Vec<String>, elapsed_secs: Option<f64>) -> Self {
        Self {
            text: form_text(&header, &lines),
            count: lines.len(),
            header,
            lines,
            elapsed_secs,
        }
    }
}

/// A message the form shows in a dialog instead of results.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub title: String,
    pub message: String,
}

#[derive(Debug)]
pub enum FormError {
    Warning(Warning),
    Backend(Error),
}

impl FormError {
    fn input_required() -> Self {
        FormError::Warning(Warning {
            title: "Input Required".to_string(),
            message: "Please enter a keyword to search.".to_string(),
        })
    }
}

impl From<Error> for FormError {
    fn from(err: Error) -> Self {
        FormError::Backend(err)
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        match self {
            FormError::Warning(warning) => {
                (StatusCode::BAD_REQUEST, response::Json(warning)).into_response()
            }
            FormError::Backend(err) => {
                log::error!("search form request failed: {err}");
                let warning = Warning {
                    title: "Search Failed".to_string(),
                    message: err.to_string(),
                };
                (StatusCode::BAD_GATEWAY, response::Json(warning)).into_response()
            }
        }
    }
}

/// "Search" button. A blank keyword is refused before the backend is queried.
pub async fn search(
    extract::Extension(backend): extract::Extension<SharedBackend>,
    extract::Query(query): extract::Query<Query>,
) -> Result<response::Json<Page>, FormError> {
    let keyword = query.q.trim();
    if keyword.is_empty() {
        return Err(FormError::input_required());
    }

    let hits = timed_search(backend.as_ref(), keyword).await?;
    let lines = hits.value.iter().map(|hit| form_line(&hit.product)).collect();
    Ok(response::Json(Page::new(
        search_header(keyword, hits.secs()),
        lines,
        Some(hits.secs()),
    )))
}

/// "View All" button.
pub async fn get_documents(
    extract::Extension(backend): extract::Extension<SharedBackend>,
) -> Result<response::Json<Page>, FormError> {
    let products = backend.get_documents().await?;
    let lines = products.iter().map(form_line).collect();
    Ok(response::Json(Page::new(
        VIEW_ALL_HEADER.to_string(),
        lines,
        None,
    )))
}
