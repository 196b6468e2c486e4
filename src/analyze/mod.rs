// src/analyze/mod.rs
// =============================================================================
// This module runs a complete analysis of one page.
//
// Steps:
// 1. Fetch the page (the only step allowed to fail the whole analysis,
//    together with parsing)
// 2. Parse it for metadata and hrefs
// 3. Resolve and classify every href
// 4. Check every resolved link concurrently
// 5. Assemble the PageAnalysis in document order
// =============================================================================

mod page;

pub use page::Analyzer;
