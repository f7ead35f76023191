//! XML → [`DocumentNode`] parsing on top of `quick-xml`.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use eo_tracker_shared::{EoTrackerError, Result};

use crate::node::DocumentNode;

/// Parse a full-text XML document into a tree.
///
/// Declarations, comments, and processing instructions are skipped. The
/// DOCTYPE is read only for general entities declared in its internal subset;
/// those, the predefined entities, and character references are resolved.
/// CDATA sections are kept verbatim. Anything that is not a single well-formed element tree
/// fails with [`EoTrackerError::Parse`].
pub fn parse_document(xml: &str) -> Result<DocumentNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<DocumentNode> = Vec::new();
    let mut root: Option<DocumentNode> = None;
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            EoTrackerError::parse(format!(
                "malformed XML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(multiple_roots(&start));
                }
                stack.push(element_from(&start, &entities)?);
            }
            Event::Empty(start) => {
                let node = element_from(&start, &entities)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| EoTrackerError::parse("closing tag without an open element"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                let data = text
                    .unescape_with(|name| resolve_entity(&entities, name))
                    .map_err(|e| EoTrackerError::parse(format!("bad character data: {e}")))?;
                push_text(&mut stack, &data)?;
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&bytes))?;
            }
            Event::DocType(doctype) => {
                entities.extend(internal_entities(&String::from_utf8_lossy(&doctype)));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(EoTrackerError::parse(format!(
            "unexpected end of document inside <{}>",
            open.tag.as_deref().unwrap_or_default()
        )));
    }

    root.ok_or_else(|| EoTrackerError::parse("document has no root element"))
}

/// Predefined XML entities, then entities declared in the DOCTYPE.
fn resolve_entity<'a>(entities: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => entities.get(name).map(String::as_str),
    }
}

/// General entities with literal values from a DOCTYPE internal subset.
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are ignored.
/// Values are taken as written; references inside a value are not expanded.
fn internal_entities(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = doctype;

    while let Some(pos) = rest.find("<!ENTITY") {
        rest = rest[pos + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(close) = rest[1..].find(quote) else {
            break;
        };
        if !name.is_empty() {
            entities
                .entry(name.to_string())
                .or_insert_with(|| rest[1..=close].to_string());
        }
        rest = &rest[close + 2..];
    }

    entities
}

fn element_from(
    start: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> Result<DocumentNode> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = DocumentNode::element(tag);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| EoTrackerError::parse(format!("bad attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value_with(|name| resolve_entity(entities, name))
            .map_err(|e| EoTrackerError::parse(format!("bad attribute value: {e}")))?;
        node.attributes.push((key, value.into_owned()));
    }

    Ok(node)
}

fn attach(
    stack: &mut [DocumentNode],
    root: &mut Option<DocumentNode>,
    node: DocumentNode,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(EoTrackerError::parse(format!(
                "second root element <{}>",
                node.tag.as_deref().unwrap_or_default()
            )));
        }
    }
    Ok(())
}

fn push_text(stack: &mut [DocumentNode], data: &str) -> Result<()> {
    match stack.last_mut() {
        Some(node) => node.push_text(data),
        None if data.trim().is_empty() => {}
        None => return Err(EoTrackerError::parse("text outside the root element")),
    }
    Ok(())
}

fn multiple_roots(start: &BytesStart<'_>) -> EoTrackerError {
    EoTrackerError::parse(format!(
        "second root element <{}>",
        String::from_utf8_lossy(start.name().as_ref())
    ))
}
