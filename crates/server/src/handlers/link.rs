//! `GET|POST /down`: fetch a remote link and store it.

use crate::error::{ApiError, ApiResult, FetchError};
use crate::state::AppState;
use axum::Form;
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use tracing::Instrument;

/// Raw form values in the order they were sent.
type Pairs = Vec<(String, String)>;

/// Form values accepted by `/down`.
#[derive(Debug, Default)]
pub struct LinkParams {
    /// Remote resource to fetch.
    pub url: Option<String>,
    /// Name whose extension the stored object gets. Nothing else of it is used.
    pub filename: Option<String>,
}

impl LinkParams {
    /// Collect known keys from `pairs`. A repeated key keeps its first value.
    fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.set_first(&key, value);
        }
        params
    }

    fn set_first(&mut self, key: &str, value: String) {
        let slot = match key {
            "url" => &mut self.url,
            "filename" => &mut self.filename,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Fill values missing here from `fallback`.
    fn or(self, fallback: LinkParams) -> LinkParams {
        LinkParams {
            url: self.url.or(fallback.url),
            filename: self.filename.or(fallback.filename),
        }
    }
}

/// GET|POST /down - Fetch `url`, store it, and return its public URL.
///
/// Values come from the query string and the request body. A urlencoded
/// body wins over the query string; the query string wins over multipart
/// form values.
///
/// The fetch and the copy run on their own task and finish even if the
/// client disconnects first.
#[tracing::instrument(skip_all)]
pub async fn fetch_link(
    State(state): State<AppState>,
    query: Result<Query<Pairs>, QueryRejection>,
    request: Request,
) -> ApiResult<String> {
    let query = LinkParams::from_pairs(query.map(|Query(pairs)| pairs).unwrap_or_default());

    let params = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| FetchError::Multipart(e.body_text()))?;
        query.or(multipart_params(multipart).await?)
    } else if request.method() == Method::POST {
        let body = Form::<Pairs>::from_request(request, &state)
            .await
            .map(|Form(pairs)| pairs)
            .unwrap_or_default();
        LinkParams::from_pairs(body).or(query)
    } else {
        query
    };

    let url = params
        .url
        .filter(|url| !url.is_empty())
        .ok_or(FetchError::MissingUrl)?;
    let original_filename = params.filename.unwrap_or_default();

    tracing::debug!(url = %url, filename = %original_filename, "Fetching link");
    let task = async move {
        let stream = state.fetcher.fetch(&url).await?;
        let filename = state.store.store(stream, &original_filename).await?;
        Ok::<_, ApiError>(state.public_url(&filename))
    };
    tokio::spawn(task.in_current_span()).await?
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// Text values of a multipart form. File parts are skipped.
async fn multipart_params(mut multipart: Multipart) -> Result<LinkParams, FetchError> {
    let mut params = LinkParams::default();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some_and(|name| !name.is_empty()) {
            continue;
        }
        let name = match field.name() {
            Some(name @ ("url" | "filename")) => name.to_string(),
            _ => continue,
        };
        let value = field.text().await?;
        params.set_first(&name, value);
    }
    Ok(params)
}
