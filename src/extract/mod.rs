//! Field normalizers for the two source shapes.
//!
//! - `xml`: eForms/UBL notice documents fetched per record on the API path
//! - `dom`: list-item nodes on the browser-driven listing

pub mod dom;
pub mod xml;

pub use dom::ListingExtractor;
pub use xml::{PartyInfo, XmlFields, XmlNode, extract_fields};
