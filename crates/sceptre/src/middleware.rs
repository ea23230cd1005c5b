//! axum middleware for Inertia applications.
//!
//! ## Example
//! ```rs
//! use axum::{Router, middleware};
//! use sceptre::middleware::version_check;
//!
//! let router = Router::new()
//!     // .route(...)
//!     .layer(middleware::from_fn_with_state(inertia.clone(), version_check))
//!     .with_state(inertia);
//! ```
use axum::extract::{OriginalUri, Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::debug;

use crate::inertia::Inertia;
use crate::props::Props;
use crate::protocol::{InertiaRequest, RequestProps, headers};

/// Rejects visits made with outdated assets, and advertises the current asset version on every response.
///
/// When the client-side router sends a `GET` with a version that differs from the current one, it is answered with
/// `409 Conflict` and an `X-Inertia-Location` header pointing at the same URL, which makes the client do a full page load.
pub async fn version_check(State(inertia): State<Inertia>, request: Request, next: Next) -> Response {
    let uri = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri,
        None => request.uri(),
    };
    let inertia_request = InertiaRequest::from_parts(request.method(), uri, request.headers());

    let Ok(version) = HeaderValue::from_str(inertia.version()) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    if inertia_request.method == Method::GET
        && inertia_request.is_inertia
        && inertia_request.version.as_deref() != Some(inertia.version())
    {
        debug!(
            name: "inertia",
            "asset version mismatch for {} (client: {:?}, server: {})",
            inertia_request.url,
            inertia_request.version,
            inertia.version()
        );

        let mut response = inertia.location(&inertia_request, inertia_request.url.clone()).into_response();
        response
            .headers_mut()
            .insert(headers::X_INERTIA_VERSION, version);
        return response;
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(headers::X_INERTIA_VERSION, version);
    response
}

/// Adds a prop to the page rendered for this request only.
///
/// Meant to be called from middleware, e.g. to expose the current user or the request time to every page.
pub fn add_prop(request: &mut Request, key: impl Into<String>, value: impl Into<Value>) {
    let extensions = request.extensions_mut();

    if let Some(RequestProps(props)) = extensions.get_mut::<RequestProps>() {
        props.insert(key, value);
        return;
    }

    let mut props = Props::new();
    props.insert(key, value);
    extensions.insert(RequestProps(props));
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::Request;

    use super::add_prop;
    use crate::protocol::RequestProps;

    #[test]
    fn test_add_prop_accumulates() {
        let mut request = Request::new(Body::empty());

        add_prop(&mut request, "req", "now");
        add_prop(&mut request, "user", "ada");
        add_prop(&mut request, "req", "later");

        let RequestProps(props) = request.extensions().get::<RequestProps>().unwrap();
        assert_eq!(props.get_str("req"), Some("later"));
        assert_eq!(props.get_str("user"), Some("ada"));
        assert_eq!(props.len(), 2);
    }
}
