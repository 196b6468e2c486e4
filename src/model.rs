// src/model.rs
// =============================================================================
// The values an analysis produces.
//
// PageAnalysis is built once, by `PageAnalysis::assemble`, and never mutated
// afterwards. Assembling derives the counts from the link lists so the counts
// and the lists cannot disagree.
// =============================================================================

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Document version, as guessed from the doctype declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentVersion {
    #[serde(rename = "HTML5")]
    Html5,
    #[serde(rename = "HTML4")]
    Html4,
    Unknown,
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            DocumentVersion::Html5 => "HTML5",
            DocumentVersion::Html4 => "HTML4",
            DocumentVersion::Unknown => "Unknown",
        };
        f.write_str(tag)
    }
}

/// Number of `<h1>`..`<h6>` elements. Every level is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingCounts([usize; 6]);

impl HeadingCounts {
    pub const TAGS: [&'static str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

    pub fn from_counts(counts: [usize; 6]) -> Self {
        HeadingCounts(counts)
    }

    /// Count for heading level 1..=6. Out-of-range levels have no headings.
    pub fn get(&self, level: usize) -> usize {
        match level {
            1..=6 => self.0[level - 1],
            _ => 0,
        }
    }

    /// (tag, count) pairs, h1 first
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        Self::TAGS.iter().copied().zip(self.0.iter().copied())
    }
}

// Serialized as {"h1": n, ..., "h6": n}
impl Serialize for HeadingCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        for (tag, count) in self.iter() {
            map.serialize_entry(tag, &count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Internal,
    External,
}

/// A link that failed verification. `status_code` 0 means no response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheckResult {
    pub address: String,
    pub status_code: u16,
}

/// Every counted link, with what its probe found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub address: String,
    pub kind: LinkKind,
    pub status_code: u16,
    pub inaccessible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAnalysis {
    pub url: String,
    pub document_version: DocumentVersion,
    pub title: String,
    pub heading_counts: HeadingCounts,
    pub internal_link_count: usize,
    pub external_link_count: usize,
    pub inaccessible_count: usize,
    pub has_login_form: bool,
    pub broken_links: Vec<LinkCheckResult>,
    pub links: Vec<LinkRecord>,
}

/// Metadata pulled out of the document, independent of the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub document_version: DocumentVersion,
    pub title: String,
    pub heading_counts: HeadingCounts,
    pub has_login_form: bool,
}

impl PageAnalysis {
    /// Builds the result from the page metadata and the per-link records,
    /// which must already be in discovery order.
    pub fn assemble(url: String, metadata: PageMetadata, links: Vec<LinkRecord>) -> Self {
        let internal_link_count = links.iter().filter(|l| l.kind == LinkKind::Internal).count();
        let external_link_count = links.len() - internal_link_count;

        let broken_links: Vec<LinkCheckResult> = links
            .iter()
            .filter(|l| l.inaccessible)
            .map(|l| LinkCheckResult {
                address: l.address.clone(),
                status_code: l.status_code,
            })
            .collect();

        PageAnalysis {
            url,
            document_version: metadata.document_version,
            title: metadata.title,
            heading_counts: metadata.heading_counts,
            internal_link_count,
            external_link_count,
            inaccessible_count: broken_links.len(),
            has_login_form: metadata.has_login_form,
            broken_links,
            links,
        }
    }

    pub fn total_links(&self) -> usize {
        self.internal_link_count + self.external_link_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str, kind: LinkKind, status_code: u16) -> LinkRecord {
        LinkRecord {
            address: address.to_string(),
            kind,
            status_code,
            inaccessible: status_code == 0 || status_code >= 400,
        }
    }

    fn metadata() -> PageMetadata {
        PageMetadata {
            document_version: DocumentVersion::Html5,
            title: "T".to_string(),
            heading_counts: HeadingCounts::from_counts([1, 0, 0, 0, 0, 0]),
            has_login_form: false,
        }
    }

    #[test]
    fn test_assemble_keeps_counts_consistent() {
        let links = vec![
            record("https://example.com/a", LinkKind::Internal, 200),
            record("https://other.com/b", LinkKind::External, 404),
            record("https://example.com/c", LinkKind::Internal, 0),
        ];
        let analysis = PageAnalysis::assemble("https://example.com/".into(), metadata(), links);

        assert_eq!(analysis.internal_link_count, 2);
        assert_eq!(analysis.external_link_count, 1);
        assert_eq!(analysis.inaccessible_count, analysis.broken_links.len());
        assert_eq!(analysis.broken_links[0].address, "https://other.com/b");
        assert_eq!(analysis.broken_links[1].status_code, 0);
    }

    #[test]
    fn test_heading_counts_serialize_all_levels() {
        let json = serde_json::to_value(HeadingCounts::from_counts([2, 0, 1, 0, 0, 0])).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 6);
        assert_eq!(map["h1"], 2);
        assert_eq!(map["h6"], 0);
    }

    #[test]
    fn test_version_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&DocumentVersion::Html5).unwrap(), "\"HTML5\"");
        assert_eq!(serde_json::to_string(&DocumentVersion::Unknown).unwrap(), "\"Unknown\"");
    }
}
