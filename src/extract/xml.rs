// src/extract/xml.rs

//! Field extraction from eForms/UBL notice documents.
//!
//! The source XML nests commodity classifications and location blocks inside
//! several optional containers: the notice root, `ProcurementProject` blocks
//! that may appear once or repeated, and `ProcurementProjectLot` blocks that
//! carry nested project blocks of their own. The document is first read into a
//! small generic element tree; [`XmlNode::list`] then returns same-named
//! children uniformly, so a lone element and a repeated element descend
//! identically and no call site branches on shape.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{AppError, Result};

/// Known root elements of a notice document.
const NOTICE_ROOTS: &[&str] = &[
    "ContractNotice",
    "ContractAwardNotice",
    "PriorInformationNotice",
];

/// The two classification blocks a project-level scope can carry.
const CLASSIFICATION_BLOCKS: &[&str] = &[
    "MainCommodityClassification",
    "AdditionalCommodityClassification",
];

/// A parsed XML element: local name, accumulated text, child elements.
///
/// Namespace prefixes are stripped on read, and attributes are dropped. An
/// element that carries its value as bare text and one that wraps it alongside
/// attributes read the same through [`XmlNode::text_content`].
#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse a document into a synthetic root node wrapping the top-level
    /// elements.
    pub fn parse(xml: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlNode> = vec![XmlNode::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(XmlNode {
                        name: local_name(e.name().as_ref()),
                        ..XmlNode::default()
                    });
                }
                Ok(Event::Empty(e)) => {
                    let node = XmlNode {
                        name: local_name(e.name().as_ref()),
                        ..XmlNode::default()
                    };
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(AppError::document)?;
                    append_text(stack.last_mut(), text.trim());
                }
                Ok(Event::CData(e)) => {
                    let raw = String::from_utf8_lossy(&e.into_inner()).to_string();
                    append_text(stack.last_mut(), raw.trim());
                }
                Ok(Event::End(_)) => {
                    // The synthetic root never receives an End event, so the
                    // stack holds at least the popped node's parent.
                    if stack.len() > 1 {
                        let node = stack.pop().unwrap_or_default();
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(AppError::document(e)),
            }
        }

        if stack.len() != 1 {
            return Err(AppError::document("unbalanced XML document"));
        }
        Ok(stack.remove(0))
    }

    /// All children with the given local name.
    ///
    /// This is the single list-normalization point used at every descent
    /// step: a document that writes one `ProcurementProject` and one that
    /// repeats it walk identically.
    pub fn list(&self, name: &str) -> Vec<&XmlNode> {
        self.children.iter().filter(|c| c.name == name).collect()
    }

    /// First child with the given local name.
    pub fn first(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed element text, `None` when empty.
    pub fn text_content(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Node reached by walking first-children along `path`.
    pub fn path_node(&self, path: &[&str]) -> Option<&XmlNode> {
        let mut node = self;
        for name in path {
            node = node.first(name)?;
        }
        Some(node)
    }

    /// Text of the element reached by walking first-children along `path`.
    pub fn path_text(&self, path: &[&str]) -> Option<&str> {
        self.path_node(path)?.text_content()
    }

    /// Depth-first search for the first descendant with the given name.
    pub fn find_descendant(&self, name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

fn local_name(qname: &[u8]) -> String {
    let raw = String::from_utf8_lossy(qname);
    match raw.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => raw.to_string(),
    }
}

fn append_text(node: Option<&mut XmlNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(node) = node {
        if !node.text.is_empty() {
            node.text.push(' ');
        }
        node.text.push_str(text);
    }
}

/// One party (buyer or provider) as named in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyInfo {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
}

impl PartyInfo {
    /// Human-readable "name, street, city" with gaps omitted.
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.name, &self.street, &self.city]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.street.is_none() && self.city.is_none()
    }
}

/// Fields extracted from one notice document.
#[derive(Debug, Clone, Default)]
pub struct XmlFields {
    /// Flat CPV code list; duplicates across scopes are tolerated
    pub cpv_codes: Vec<String>,
    /// First NUTS region code encountered during the walk
    pub nuts_code: Option<String>,
    /// First ISO country code encountered during the walk
    pub country: Option<String>,
    pub buyer: Option<PartyInfo>,
    pub provider: Option<PartyInfo>,
}

/// Extract classification, location and party fields from a parsed document.
///
/// A document without a recognized notice root yields empty fields. That is
/// a recoverable condition the caller records, not an error.
pub fn extract_fields(doc: &XmlNode) -> XmlFields {
    let Some(root) = notice_root(doc) else {
        return XmlFields::default();
    };

    let mut fields = XmlFields::default();

    // Project-level scopes are walked before lot-level scopes. With the
    // first-wins location assignment below, the coarser project location
    // takes precedence when both are present and differ.
    collect_scope(root, &mut fields);
    for project in root.list("ProcurementProject") {
        collect_scope(project, &mut fields);
    }
    for lot in root.list("ProcurementProjectLot") {
        for project in lot.list("ProcurementProject") {
            collect_scope(project, &mut fields);
        }
    }

    extract_parties(root, &mut fields);
    fields
}

fn notice_root<'a>(doc: &'a XmlNode) -> Option<&'a XmlNode> {
    if NOTICE_ROOTS.contains(&doc.name.as_str()) {
        return Some(doc);
    }
    doc.children
        .iter()
        .find(|c| NOTICE_ROOTS.contains(&c.name.as_str()))
}

/// Collect classification codes and location from one scope (the root, a
/// project, or a lot's nested project).
fn collect_scope(scope: &XmlNode, fields: &mut XmlFields) {
    for &block in CLASSIFICATION_BLOCKS {
        for class in scope.list(block) {
            for code in class.list("ItemClassificationCode") {
                if let Some(value) = code.text_content() {
                    fields.cpv_codes.push(value.to_string());
                }
            }
        }
    }

    for realized in scope.list("RealizedLocation") {
        for address in realized.list("Address") {
            set_if_empty(
                &mut fields.nuts_code,
                address.path_text(&["CountrySubentityCode"]),
            );
            set_if_empty(
                &mut fields.country,
                address.path_text(&["Country", "IdentificationCode"]),
            );
        }
    }
}

/// First non-null wins; never overwritten once set.
fn set_if_empty(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        if let Some(value) = value {
            *slot = Some(value.to_string());
        }
    }
}

/// The organizations block lists parties in order: first buyer, then
/// provider. The legacy `ContractingParty` block fills the buyer when the
/// richer block is absent or incomplete.
fn extract_parties(root: &XmlNode, fields: &mut XmlFields) {
    if let Some(orgs) = root.find_descendant("Organizations") {
        let mut parties = orgs
            .list("Organization")
            .into_iter()
            .map(|org| party_from(org.first("Company").unwrap_or(org)));
        fields.buyer = parties.next().filter(|p| !p.is_empty());
        fields.provider = parties.next().filter(|p| !p.is_empty());
    }

    let buyer_incomplete = fields
        .buyer
        .as_ref()
        .map_or(true, |buyer| buyer.name.is_none());
    if buyer_incomplete {
        if let Some(party) = root.path_node(&["ContractingParty", "Party"]) {
            let legacy = party_from(party);
            if !legacy.is_empty() {
                fields.buyer = Some(legacy);
            }
        }
    }
}

fn party_from(node: &XmlNode) -> PartyInfo {
    PartyInfo {
        name: node
            .path_text(&["PartyName", "Name"])
            .map(str::to_string),
        street: node
            .path_text(&["PostalAddress", "StreetName"])
            .map(str::to_string),
        city: node
            .path_text(&["PostalAddress", "CityName"])
            .map(str::to_string),
    }
}
