// src/checker/mod.rs
// =============================================================================
// This module contains the building blocks of a page analysis.
//
// Submodules:
// - html: Parses a page body and extracts metadata and hrefs
// - resolve: Resolves hrefs to absolute addresses, internal vs external
// - http: Checks links concurrently with HEAD requests
//
// The analyze module strings these together; this file only re-exports the
// pieces it (and the CLI) need.
// =============================================================================

mod html;
mod http;
pub(crate) mod resolve;

pub use html::{parse_document, ParsedDocument};
pub use http::{probe_all, verify_all, LinkVerdict, PendingLink, VerifyOptions, NO_RESPONSE};
pub use resolve::{classify, resolve};
