//! Wire-level pieces of the Inertia protocol: header names, the page object, and what an incoming request asks for.
use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::props::Props;

pub mod headers {
    pub const X_INERTIA: &str = "x-inertia";
    pub const X_INERTIA_VERSION: &str = "x-inertia-version";
    pub const X_INERTIA_LOCATION: &str = "x-inertia-location";
    pub const X_INERTIA_PARTIAL_COMPONENT: &str = "x-inertia-partial-component";
    pub const X_INERTIA_PARTIAL_DATA: &str = "x-inertia-partial-data";
    pub const X_REQUESTED_WITH: &str = "x-requested-with";
}

/// The JSON document describing a page to the client-side router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageObject {
    pub component: String,
    pub props: Props,
    pub url: String,
    pub version: String,
}

/// Props added to a request by middleware, merged into the page object after shared props.
///
/// See [`add_prop`](crate::middleware::add_prop).
#[derive(Debug, Clone, Default)]
pub struct RequestProps(pub Props);

/// What an incoming request expects from the server, as far as Inertia is concerned.
///
/// Can be used directly as an axum extractor.
#[derive(Debug, Clone)]
pub struct InertiaRequest {
    pub method: Method,
    /// Path and query of the request, as sent by the client, nest prefixes included.
    pub url: String,
    /// Whether the request was sent by the client-side router and expects a JSON page object.
    pub is_inertia: bool,
    pub is_xhr: bool,
    pub version: Option<String>,
    pub partial_component: Option<String>,
    pub partial_data: Vec<String>,
    pub props: Props,
}

/// Parses booleans the same way Go's `strconv.ParseBool` does, which Inertia adapters have historically accepted.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl InertiaRequest {
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let is_inertia = match header_str(headers, headers::X_INERTIA) {
            Some(value) => parse_bool(value.trim()).unwrap_or_else(|| {
                warn!(name: "inertia", "ignoring unparsable {} header: {:?}", headers::X_INERTIA, value);
                false
            }),
            None => false,
        };

        let is_xhr = header_str(headers, headers::X_REQUESTED_WITH)
            .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"));

        let partial_data = header_str(headers, headers::X_INERTIA_PARTIAL_DATA)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method: method.clone(),
            url: uri
                .path_and_query()
                .map(|path| path.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string()),
            is_inertia,
            is_xhr,
            version: header_str(headers, headers::X_INERTIA_VERSION).map(String::from),
            partial_component: header_str(headers, headers::X_INERTIA_PARTIAL_COMPONENT)
                .map(String::from),
            partial_data,
            props: Props::new(),
        }
    }

    /// Keys to keep when rendering `component`, if this request is a partial reload of that very component.
    pub fn partial_keys_for(&self, component: &str) -> Option<&[String]> {
        match &self.partial_component {
            Some(partial) if partial == component => Some(&self.partial_data),
            _ => None,
        }
    }
}

impl<S> FromRequestParts<S> for InertiaRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`
        let uri = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri,
            None => &parts.uri,
        };
        let mut request = InertiaRequest::from_parts(&parts.method, uri, &parts.headers);

        if let Some(RequestProps(props)) = parts.extensions.get::<RequestProps>() {
            request.props = props.clone();
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, Method, Uri};

    use super::{InertiaRequest, PageObject, headers, parse_bool};
    use crate::props;

    fn request(pairs: &[(&'static str, &'static str)]) -> InertiaRequest {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }

        InertiaRequest::from_parts(&Method::GET, &Uri::from_static("/users?page=2"), &map)
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("F"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_plain_request() {
        let request = request(&[]);

        assert!(!request.is_inertia);
        assert!(!request.is_xhr);
        assert_eq!(request.url, "/users?page=2");
        assert_eq!(request.version, None);
        assert!(request.partial_data.is_empty());
    }

    #[test]
    fn test_inertia_request() {
        let request = request(&[
            (headers::X_INERTIA, "true"),
            (headers::X_REQUESTED_WITH, "XMLHttpRequest"),
            (headers::X_INERTIA_VERSION, "abc"),
        ]);

        assert!(request.is_inertia);
        assert!(request.is_xhr);
        assert_eq!(request.version.as_deref(), Some("abc"));
    }

    #[test]
    fn test_unparsable_inertia_header_is_false() {
        let request = request(&[(headers::X_INERTIA, "sure")]);

        assert!(!request.is_inertia);
    }

    #[test]
    fn test_partial_keys() {
        let request = request(&[
            (headers::X_INERTIA, "true"),
            (headers::X_INERTIA_PARTIAL_COMPONENT, "Index"),
            (headers::X_INERTIA_PARTIAL_DATA, "name, req,"),
        ]);

        assert_eq!(
            request.partial_keys_for("Index"),
            Some(&["name".to_string(), "req".to_string()][..])
        );
        assert_eq!(request.partial_keys_for("Other"), None);
    }

    #[test]
    fn test_page_object_shape() {
        let page = PageObject {
            component: "Index".into(),
            props: props! { "name" => "World" },
            url: "/".into(),
            version: "abc".into(),
        };

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({
                "component": "Index",
                "props": { "name": "World" },
                "url": "/",
                "version": "abc"
            })
        );
    }
}
