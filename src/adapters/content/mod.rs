//! Content Adapters
//!
//! Implementations of the ContentProvider port.
//!
//! - **HttpContentProvider** - fetches tooltips and descriptions from the CMS
//! - **StaticContentProvider** - fixed in-memory content

mod http_cms;
mod static_content;

pub use http_cms::HttpContentProvider;
pub use static_content::StaticContentProvider;
