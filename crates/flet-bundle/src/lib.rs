//! Static web bundle builder for Flet apps.
//!
//! Packages an app's source tree into `app.tar.gz` next to a copy of the prebuilt
//! web runtime, and patches the runtime's `index.html` for the chosen options.

pub mod archive;
pub mod builder;
pub mod index;
pub mod options;
pub mod paths;
pub mod requirements;
pub mod templates;

pub use builder::{BundleBuilder, BundleConfig, BundleError, BundleResult};
pub use options::{RouteUrlStrategy, WebRenderer};
pub use requirements::Requirements;
