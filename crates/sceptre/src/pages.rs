//! Core traits and structs to define the pages of your application.
//!
//! Pages are discovered once at startup from a directory, and can be complemented by pages written in Rust implementing the [`Page`] trait.
//! The resulting [`PageRegistry`] never changes afterwards, and resolves the component names sent by handlers into templates.
use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::{Pattern, glob};
use maud::Markup;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::errors::DiscoveryError;
use crate::props::Props;
use crate::template::Template;

/// A renderable unit of UI, bound to a logical name in the [`PageRegistry`].
///
/// Closures taking [`Props`] and returning [`Markup`] implement this trait, which makes it easy to write pages using [maud](https://maud.lambda.xyz).
///
/// ## Example
/// ```rs
/// use maud::html;
/// use sceptre::pages::PageRegistry;
///
/// let registry = PageRegistry::builder()
///     .page("Hello", |props: &Props| html! { h1 { "Hello, " (props.get_str("name").unwrap_or("you")) } })?
///     .build();
/// ```
pub trait Page: Send + Sync {
    fn render(&self, props: &Props) -> Markup;
}

impl<F> Page for F
where
    F: Fn(&Props) -> Markup + Send + Sync,
{
    fn render(&self, props: &Props) -> Markup {
        self(props)
    }
}

enum PageSource {
    File { path: PathBuf, template: Template },
    Native(Box<dyn Page>),
}

/// A page known to the registry.
pub struct PageTemplate {
    name: String,
    source: PageSource,
}

impl PageTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the file this page was loaded from, `None` for pages registered from Rust.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            PageSource::File { path, .. } => Some(path),
            PageSource::Native(_) => None,
        }
    }

    pub fn render(&self, props: &Props) -> Markup {
        match &self.source {
            PageSource::File { template, .. } => template.render(props),
            PageSource::Native(page) => page.render(props),
        }
    }
}

impl std::fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTemplate")
            .field("name", &self.name)
            .field("path", &self.path())
            .finish()
    }
}

/// Immutable mapping from logical page names to page templates.
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: FxHashMap<String, PageTemplate>,
}

impl PageRegistry {
    pub fn builder() -> PageRegistryBuilder {
        PageRegistryBuilder::default()
    }

    /// Loads every `*.{extension}` file found under `dir`. See [`PageRegistryBuilder::discover`].
    pub fn discover(dir: impl AsRef<Path>, extension: &str) -> Result<Self, DiscoveryError> {
        Ok(Self::builder().discover(dir, extension)?.build())
    }

    pub fn resolve(&self, name: &str) -> Option<&PageTemplate> {
        self.pages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }

    /// Every registered page name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.pages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Default)]
pub struct PageRegistryBuilder {
    pages: FxHashMap<String, PageTemplate>,
}

impl PageRegistryBuilder {
    /// Eagerly loads every `*.{extension}` file found under `dir`, recursively.
    ///
    /// Each page is named after its path relative to `dir`, without extension and using `/` as separator, e.g. `pages/Users/Show.html` is named `Users/Show`.
    pub fn discover(
        mut self,
        dir: impl AsRef<Path>,
        extension: &str,
    ) -> Result<Self, DiscoveryError> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(DiscoveryError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }

        let pattern = format!(
            "{}/**/*.{}",
            Pattern::escape(&dir.to_string_lossy()),
            Pattern::escape(extension)
        );
        let entries = glob(&pattern).map_err(|source| DiscoveryError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in entries {
            let path = entry?;

            if !path.is_file() {
                continue;
            }

            let name = page_name(dir, &path)?;
            let source = fs::read_to_string(&path).map_err(|source| DiscoveryError::ReadFailed {
                path: path.clone(),
                source,
            })?;

            debug!(name: "pages", "discovered `{}` at {}", name, path.display());

            let template = Template::parse(name.clone(), &source);
            self.insert(PageTemplate {
                name,
                source: PageSource::File { path, template },
            })?;
        }

        Ok(self)
    }

    /// Registers a page written in Rust under `name`.
    pub fn page(
        self,
        name: impl Into<String>,
        page: impl Page + 'static,
    ) -> Result<Self, DiscoveryError> {
        self.boxed_page(name, Box::new(page))
    }

    pub(crate) fn boxed_page(
        mut self,
        name: impl Into<String>,
        page: Box<dyn Page>,
    ) -> Result<Self, DiscoveryError> {
        self.insert(PageTemplate {
            name: name.into(),
            source: PageSource::Native(page),
        })?;

        Ok(self)
    }

    pub fn build(self) -> PageRegistry {
        PageRegistry { pages: self.pages }
    }

    fn insert(&mut self, page: PageTemplate) -> Result<(), DiscoveryError> {
        if self.pages.contains_key(&page.name) {
            return Err(DiscoveryError::DuplicatePage { name: page.name });
        }

        self.pages.insert(page.name.clone(), page);
        Ok(())
    }
}

/// Logical name of the page at `path`, relative to `root`, e.g. `Users/Show` for `root/Users/Show.html`.
fn page_name(root: &Path, path: &Path) -> Result<String, DiscoveryError> {
    let invalid = || DiscoveryError::InvalidName {
        path: path.to_path_buf(),
    };

    let relative = path.strip_prefix(root).map_err(|_| invalid())?;
    let relative = relative.with_extension("");

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?),
            _ => return Err(invalid()),
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }

    Ok(parts.join("/"))
}
