//! Notice data structure.

use serde::{Deserialize, Serialize};

/// A procurement notice normalized from either source.
///
/// Serialized in camelCase because the dashboard frontend consumes these
/// records directly. Every scalar field is optional: both sources leave gaps,
/// and a gap is data, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    /// Notice title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Short description / ingress text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Absolute URL to the notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Publication date in display format `dd.mm.yyyy`, kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,

    /// Contracting authority; multiple entries joined with " / "
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,

    /// Winning or listed supplier, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Free-text place of performance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// NUTS region code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuts_code: Option<String>,

    /// ISO country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// 8-digit CPV classification codes; duplicates are tolerated
    #[serde(default)]
    pub cpv_codes: Vec<String>,

    /// Estimated contract value, left unparsed (source formatting varies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<String>,

    /// Submission deadline in display format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    /// Announcement type (first chip on the listing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_type: Option<String>,

    /// Announcement subtype (second chip, when present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_subtype: Option<String>,

    /// EØS notification flag, sourced from a title attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eoes_flag: Option<String>,

    /// Present only when field extraction failed for this record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_skips_gaps() {
        let notice = Notice {
            title: Some("Rammeavtale vintervedlikehold".to_string()),
            publication_date: Some("15.01.2024".to_string()),
            cpv_codes: vec!["45000000".to_string()],
            ..Notice::default()
        };

        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["publicationDate"], "15.01.2024");
        assert_eq!(json["cpvCodes"][0], "45000000");
        assert!(json.get("sourceError").is_none());
        assert!(json.get("buyer").is_none());
    }
}
