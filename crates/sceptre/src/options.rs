use std::path::PathBuf;

/// Sceptre options. Should be passed to [`Inertia::builder()`](crate::Inertia::builder).
///
/// Relative paths are resolved against `root_dir`.
///
/// ## Examples
/// Default values:
/// ```rs
/// use sceptre::{Inertia, InertiaOptions};
///
/// let inertia = Inertia::builder(InertiaOptions::default()).build()?;
/// ```
/// Custom values:
/// ```rs
/// use sceptre::{Inertia, InertiaOptions};
///
/// let inertia = Inertia::builder(InertiaOptions {
///     root_dir: "frontend".into(),
///     pages_dir: "src/pages".into(),
///     assets_dir: "dist".into(),
///     scripts: vec!["/dist/main.js".into()],
///     ..Default::default()
/// })
/// .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct InertiaOptions {
    pub root_dir: PathBuf,

    /// Name of the root document, without extension. It is looked up as `{root_dir}/{root_template}.html`.
    ///
    /// If the file does not exist, a minimal document containing the attachment point and `scripts` is used instead.
    pub root_template: String,

    /// Directory scanned at startup for page templates.
    pub pages_dir: PathBuf,
    pub page_extension: String,

    /// Directory whose content determines the asset version. Must exist.
    pub assets_dir: PathBuf,

    /// Id of the element pages are mounted into.
    pub attachment_id: String,

    /// Module scripts included by the fallback root document.
    pub scripts: Vec<String>,
}

impl Default for InertiaOptions {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            root_template: "index".into(),
            pages_dir: PathBuf::from("pages"),
            page_extension: "html".into(),
            assets_dir: PathBuf::from("assets"),
            attachment_id: "app".into(),
            scripts: Vec::new(),
        }
    }
}

impl InertiaOptions {
    pub fn pages_path(&self) -> PathBuf {
        self.root_dir.join(&self.pages_dir)
    }

    pub fn assets_path(&self) -> PathBuf {
        self.root_dir.join(&self.assets_dir)
    }

    pub fn root_template_path(&self) -> PathBuf {
        self.root_dir.join(format!("{}.html", self.root_template))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::InertiaOptions;

    #[test]
    fn test_paths_are_relative_to_root() {
        let options = InertiaOptions {
            root_dir: "app".into(),
            ..Default::default()
        };

        assert_eq!(options.pages_path(), PathBuf::from("app/pages"));
        assert_eq!(options.assets_path(), PathBuf::from("app/assets"));
        assert_eq!(options.root_template_path(), PathBuf::from("app/index.html"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let options = InertiaOptions {
            root_dir: "app".into(),
            assets_dir: "/srv/assets".into(),
            ..Default::default()
        };

        assert_eq!(options.assets_path(), PathBuf::from("/srv/assets"));
    }
}
