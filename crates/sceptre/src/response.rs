use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::protocol::{PageObject, headers};

/// What [`Inertia`](crate::Inertia) answers with. Implements [`IntoResponse`], so it can be returned from handlers as-is.
#[derive(Debug, Clone)]
pub enum InertiaResponse {
    /// A page object, for requests made by the client-side router.
    Page(PageObject),
    /// A full HTML document with the page mounted, for first visits and plain requests.
    Document(String),
    /// A redirect to a location the client-side router cannot visit on its own.
    Location { url: String, inertia: bool },
}

fn vary_on_inertia(response: &mut Response) {
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("X-Inertia"));
}

impl IntoResponse for InertiaResponse {
    fn into_response(self) -> Response {
        match self {
            InertiaResponse::Page(page) => {
                let mut response = Json(page).into_response();
                response
                    .headers_mut()
                    .insert(headers::X_INERTIA, HeaderValue::from_static("true"));
                vary_on_inertia(&mut response);
                response
            }
            InertiaResponse::Document(html) => {
                let mut response = Html(html).into_response();
                vary_on_inertia(&mut response);
                response
            }
            InertiaResponse::Location { url, inertia: true } => {
                match HeaderValue::from_str(&url) {
                    Ok(location) => {
                        (StatusCode::CONFLICT, [(headers::X_INERTIA_LOCATION, location)])
                            .into_response()
                    }
                    Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                }
            }
            InertiaResponse::Location {
                url,
                inertia: false,
            } => Redirect::to(&url).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    use super::InertiaResponse;
    use crate::props;
    use crate::protocol::{PageObject, headers};

    #[test]
    fn test_page_response_headers() {
        let response = InertiaResponse::Page(PageObject {
            component: "Index".into(),
            props: props! {},
            url: "/".into(),
            version: "1".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[headers::X_INERTIA], "true");
        assert_eq!(response.headers()[header::VARY], "X-Inertia");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_document_response() {
        let response = InertiaResponse::Document("<html></html>".into()).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(headers::X_INERTIA).is_none());
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_location_responses() {
        let inertia = InertiaResponse::Location {
            url: "https://example.com/login".into(),
            inertia: true,
        }
        .into_response();

        assert_eq!(inertia.status(), StatusCode::CONFLICT);
        assert_eq!(
            inertia.headers()[headers::X_INERTIA_LOCATION],
            "https://example.com/login"
        );

        let plain = InertiaResponse::Location {
            url: "https://example.com/login".into(),
            inertia: false,
        }
        .into_response();

        assert_eq!(plain.status(), StatusCode::SEE_OTHER);
        assert_eq!(plain.headers()[header::LOCATION], "https://example.com/login");
    }
}
