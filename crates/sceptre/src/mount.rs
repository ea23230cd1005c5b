//! Mounting rendered pages into the attachment point of the root document.
use std::cell::Cell;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, Selector, element, rewrite_str};
use maud::{Markup, html};

use crate::errors::{InertiaError, TemplateError};
use crate::pages::PageTemplate;
use crate::protocol::PageObject;

/// The single element of the root document that pages are mounted into, e.g. `<div id="app"></div>`.
///
/// The element is owned by the mount: every mount replaces it entirely, attributes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPoint {
    id: String,
}

impl Default for AttachmentPoint {
    fn default() -> Self {
        Self { id: "app".into() }
    }
}

impl AttachmentPoint {
    pub fn new(id: impl Into<String>) -> Result<Self, TemplateError> {
        let id = id.into();

        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && !id.starts_with(|c: char| c.is_ascii_digit())
            && format!("#{id}").parse::<Selector>().is_ok();

        if !valid {
            return Err(TemplateError::InvalidAttachmentId { id });
        }

        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn selector(&self) -> String {
        format!("#{}", self.id)
    }

    /// The element holding `content`, with the page object serialized in its `data-page` attribute for the client-side router to pick up.
    pub fn markup(&self, page: &PageObject, content: Markup) -> Result<Markup, serde_json::Error> {
        let page_json = serde_json::to_string(page)?;

        Ok(html! {
            div id=(self.id) data-page=(page_json) { (content) }
        })
    }

    /// Whether `document` contains this attachment point.
    pub fn is_present(&self, document: &str) -> Result<bool, InertiaError> {
        let found = Cell::new(false);

        rewrite_str(
            document,
            RewriteStrSettings {
                element_content_handlers: vec![element!(self.selector(), |_el| {
                    found.set(true);
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;

        Ok(found.get())
    }
}

/// Renders `template` with the props of `page`, and replaces the attachment point of `document` with the result.
///
/// Mounting into a document that already holds a mounted page replaces the previous page, so there is always exactly one page per document.
pub fn mount(
    template: &PageTemplate,
    page: &PageObject,
    attachment: &AttachmentPoint,
    document: &str,
) -> Result<String, InertiaError> {
    let mounted = attachment
        .markup(page, template.render(&page.props))?
        .into_string();
    let replaced = Cell::new(false);

    let output = rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: vec![element!(attachment.selector(), |el| {
                // Only the first match is the attachment point, ids are expected to be unique anyway.
                if replaced.replace(true) {
                    el.remove();
                } else {
                    el.replace(&mounted, ContentType::Html);
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;

    if !replaced.get() {
        return Err(TemplateError::MissingAttachmentPoint {
            template: template.name().to_string(),
            id: attachment.id().to_string(),
        }
        .into());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use maud::html;

    use super::{AttachmentPoint, mount};
    use crate::errors::{InertiaError, TemplateError};
    use crate::pages::{PageRegistry, PageTemplate};
    use crate::props;
    use crate::props::Props;
    use crate::protocol::PageObject;

    const DOCUMENT: &str = r#"<html><head><title>Example</title></head><body><div id="app"></div></body></html>"#;

    fn registry() -> PageRegistry {
        PageRegistry::builder()
            .page("Index", |props: &Props| {
                html! {
                    div {
                        h1 { "Hello, " (props.get_str("name").unwrap_or_default()) "!" }
                        p { "Server started at: " (props.get_str("start").unwrap_or_default()) }
                        p { "Page requested at: " (props.get_str("req").unwrap_or_default()) }
                    }
                }
            })
            .unwrap()
            .build()
    }

    fn page(name: &str) -> PageObject {
        PageObject {
            component: "Index".into(),
            props: props! {
                "name" => name,
                "req" => "2024-01-01T00:00:00Z",
                "start" => "2024-01-01T00:00:00Z"
            },
            url: "/".into(),
            version: "1".into(),
        }
    }

    fn index(registry: &PageRegistry) -> &PageTemplate {
        registry.resolve("Index").unwrap()
    }

    #[test]
    fn test_mount_renders_props() {
        let registry = registry();

        let output = mount(index(&registry), &page("World"), &AttachmentPoint::default(), DOCUMENT)
            .unwrap();

        assert!(output.contains("Hello, World!"));
        assert!(output.contains("Server started at: 2024-01-01T00:00:00Z"));
        assert!(output.contains("Page requested at: 2024-01-01T00:00:00Z"));
        assert!(output.contains("data-page=\"{&quot;component&quot;:&quot;Index&quot;"));
        assert!(output.starts_with("<html><head><title>Example</title></head><body><div id=\"app\""));
    }

    #[test]
    fn test_mount_twice_replaces_previous_page() {
        let registry = registry();
        let attachment = AttachmentPoint::default();

        let first = mount(index(&registry), &page("First"), &attachment, DOCUMENT).unwrap();
        let second = mount(index(&registry), &page("Second"), &attachment, &first).unwrap();

        assert!(!second.contains("Hello, First!"));
        assert_eq!(second.matches("Hello, Second!").count(), 1);
        assert_eq!(second.matches("id=\"app\"").count(), 1);
    }

    #[test]
    fn test_mount_without_attachment_point() {
        let registry = registry();

        let result = mount(
            index(&registry),
            &page("World"),
            &AttachmentPoint::default(),
            "<html><body><main></main></body></html>",
        );

        assert!(matches!(
            result,
            Err(InertiaError::Template(TemplateError::MissingAttachmentPoint { .. }))
        ));
    }

    #[test]
    fn test_custom_attachment_point() {
        let registry = registry();
        let attachment = AttachmentPoint::new("root").unwrap();

        assert!(attachment.is_present(r#"<div id="root"></div>"#).unwrap());
        assert!(!attachment.is_present(DOCUMENT).unwrap());

        let output = mount(
            index(&registry),
            &page("World"),
            &attachment,
            r#"<body><div id="root">Loading...</div></body>"#,
        )
        .unwrap();

        assert!(!output.contains("Loading..."));
        assert!(output.contains("Hello, World!"));
    }

    #[test]
    fn test_invalid_attachment_ids() {
        assert!(AttachmentPoint::new("").is_err());
        assert!(AttachmentPoint::new("app root").is_err());
        assert!(AttachmentPoint::new("#app").is_err());
        assert!(AttachmentPoint::new("1app").is_err());
        assert!(AttachmentPoint::new("-1").is_err());
        assert!(AttachmentPoint::new("my-app_2").is_ok());
    }
}
