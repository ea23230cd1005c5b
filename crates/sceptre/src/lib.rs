#![doc = include_str!("../README.md")]

// Modules the end-user will interact directly or indirectly with
pub mod errors;
pub mod middleware;
pub mod mount;
pub mod pages;
pub mod props;
pub mod protocol;
pub mod server;
pub mod template;
pub mod version;

mod inertia;
mod logging;
mod options;
mod response;

// Exports for end-users
pub use errors::InertiaError;
pub use inertia::{Inertia, InertiaBuilder};
pub use logging::{FormatElapsedTimeOptions, format_elapsed_time, init_logging};
pub use options::InertiaOptions;
pub use props::Props;
pub use protocol::{InertiaRequest, PageObject};
pub use response::InertiaResponse;

/// The version of Sceptre being used.
///
/// Used in the generator tag of the default root document.
pub const GENERATOR: &str = concat!("Sceptre v", env!("CARGO_PKG_VERSION"));
