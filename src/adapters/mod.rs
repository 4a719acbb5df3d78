//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `xml` - Questionnaire XML codec (parse, canonical write, graph bridge)
//! - `source` - Questionnaire sources (file, HTTP)
//! - `content` - Content providers (HTTP CMS, static)
//! - `storage` - Key-value stores (file, in-memory)

pub mod content;
pub mod source;
pub mod storage;
pub mod xml;
