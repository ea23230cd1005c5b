//! The Inertia engine, shared by every handler of an application.
use std::fs;
use std::sync::Arc;

use maud::{DOCTYPE, Markup, html};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::{InertiaError, TemplateError};
use crate::mount::{AttachmentPoint, mount};
use crate::options::InertiaOptions;
use crate::pages::{Page, PageRegistry, PageRegistryBuilder, PageTemplate};
use crate::props::Props;
use crate::protocol::{InertiaRequest, PageObject};
use crate::response::InertiaResponse;
use crate::template::Template;
use crate::GENERATOR;
use crate::version::hash_assets;

struct InertiaInner {
    registry: PageRegistry,
    root: Template,
    attachment: AttachmentPoint,
    shared: Props,
    params: Props,
    version: String,
}

/// Resolves pages, and renders them either as a full HTML document or as a JSON page object depending on the request.
///
/// Cloning is cheap, and everything inside is immutable once built, which makes it a good fit for axum's state.
///
/// ## Example
/// ```rs
/// use axum::{Router, extract::State, routing::get};
/// use sceptre::{Inertia, InertiaError, InertiaOptions, InertiaRequest, InertiaResponse, props};
///
/// async fn index(
///     State(inertia): State<Inertia>,
///     request: InertiaRequest,
/// ) -> Result<InertiaResponse, InertiaError> {
///     inertia.render(&request, "Index", props! { "name" => "world" })
/// }
///
/// let inertia = Inertia::builder(InertiaOptions::default())
///     .share("start", "now")
///     .param("Title", "Example App")
///     .build()?;
///
/// let router: Router = Router::new().route("/", get(index)).with_state(inertia);
/// ```
#[derive(Clone)]
pub struct Inertia {
    inner: Arc<InertiaInner>,
}

pub struct InertiaBuilder {
    options: InertiaOptions,
    pages: Vec<(String, Box<dyn Page>)>,
    shared: Props,
    params: Props,
}

impl InertiaBuilder {
    /// Shares a prop with every page rendered by the engine.
    pub fn share(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.shared.insert(key, value);
        self
    }

    /// Sets a value interpolated into the root document only, e.g. `{Title}`. Params are never sent to the client.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Registers a page written in Rust, next to the ones discovered in the pages directory.
    pub fn page(mut self, name: impl Into<String>, page: impl Page + 'static) -> Self {
        self.pages.push((name.into(), Box::new(page)));
        self
    }

    /// Discovers pages, loads the root document and computes the asset version. Any failure here is a configuration error.
    pub fn build(self) -> Result<Inertia, InertiaError> {
        let options = self.options;
        let attachment = AttachmentPoint::new(options.attachment_id.clone())?;

        let mut builder: PageRegistryBuilder = PageRegistry::builder();
        let pages_path = options.pages_path();
        builder = builder.discover(&pages_path, &options.page_extension)?;
        for (name, page) in self.pages {
            builder = builder.boxed_page(name, page)?;
        }
        let registry = builder.build();

        info!(name: "pages", "loaded {} page(s) from {}", registry.len(), pages_path.display());

        let root_path = options.root_template_path();
        let root = if root_path.is_file() {
            let source = fs::read_to_string(&root_path).map_err(|source| {
                TemplateError::ReadFailed {
                    path: root_path.clone(),
                    source,
                }
            })?;
            Template::parse(options.root_template.clone(), &source)
        } else {
            debug!(name: "inertia", "no root template at {}, using the default document", root_path.display());
            Template::parse(
                options.root_template.clone(),
                &default_root_document(&attachment, &options.scripts).into_string(),
            )
        };

        if !attachment.is_present(&root.render(&self.params).into_string())? {
            return Err(TemplateError::MissingAttachmentPoint {
                template: root.name().to_string(),
                id: attachment.id().to_string(),
            }
            .into());
        }

        let version = hash_assets(&options.assets_path())?;
        debug!(name: "inertia", "asset version is {}", version);

        Ok(Inertia {
            inner: Arc::new(InertiaInner {
                registry,
                root,
                attachment,
                shared: self.shared,
                params: self.params,
                version,
            }),
        })
    }
}

fn default_root_document(attachment: &AttachmentPoint, scripts: &[String]) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="generator" content=(GENERATOR);
                title { "{Title}" }
                @for script in scripts {
                    script src=(script) type="module" {}
                }
            }
            body {
                div id=(attachment.id()) {}
            }
        }
    }
}

impl Inertia {
    pub fn builder(options: InertiaOptions) -> InertiaBuilder {
        InertiaBuilder {
            options,
            pages: Vec::new(),
            shared: Props::new(),
            params: Props::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.inner.registry
    }

    pub fn resolve(&self, component: &str) -> Option<&PageTemplate> {
        self.inner.registry.resolve(component)
    }

    /// Builds the page object for `component`.
    ///
    /// Props are merged in order: shared props, then props added to the request by middleware, then `props`. Later values win.
    /// When the request is a partial reload of this very component, only the requested props are kept.
    pub fn page_object(&self, request: &InertiaRequest, component: &str, props: Props) -> PageObject {
        let mut merged = self.inner.shared.clone();
        merged.merge(&request.props);
        merged.merge(&props);

        if let Some(keys) = request.partial_keys_for(component) {
            merged.retain_keys(keys);
        }

        PageObject {
            component: component.to_string(),
            props: merged,
            url: request.url.clone(),
            version: self.inner.version.clone(),
        }
    }

    /// Renders `component` with `props` for `request`.
    ///
    /// Requests coming from the client-side router get a JSON page object, any other request gets the root document with the page mounted into it.
    pub fn render(
        &self,
        request: &InertiaRequest,
        component: &str,
        props: Props,
    ) -> Result<InertiaResponse, InertiaError> {
        let template = self
            .resolve(component)
            .ok_or_else(|| InertiaError::PageNotFound {
                component: component.to_string(),
            })?;

        let page = self.page_object(request, component, props);

        if request.is_inertia {
            return Ok(InertiaResponse::Page(page));
        }

        let document = self.inner.root.render(&self.inner.params).into_string();
        let html = mount(template, &page, &self.inner.attachment, &document)?;

        Ok(InertiaResponse::Document(html))
    }

    /// Redirects to `url`, which may live outside of the application.
    ///
    /// The client-side router cannot follow such redirects by itself, so it is told to do a full visit instead.
    pub fn location(&self, request: &InertiaRequest, url: impl Into<String>) -> InertiaResponse {
        InertiaResponse::Location {
            url: url.into(),
            inertia: request.is_inertia,
        }
    }
}
