use crate::codec::FactCodec;
use crate::error::FactError;
use crate::fact::{part_order, Fact, FactPart};
use crate::word::tokenize;
use std::path::Path;

pub const XML_DOCUMENT_EXTENSION: &str = "xml";

const FACT_ELEMENT: &str = "fact";
const FACTS_ELEMENT: &str = "facts";
// Documents are a bare sequence of `<fact>` elements; wrap them so they parse as XML.
const WRAPPER_ELEMENT: &str = "sage-document";

/// Fact documents in the XML format:
///
/// ```xml
/// <fact>
///   <subject>the cat</subject>
///   <verb>likes</verb>
///   <object>milk</object>
/// </fact>
/// ```
///
/// A document is a sequence of `<fact>` elements, optionally wrapped in a `<facts>`
/// root and optionally preceded by an XML declaration. Every child element of
/// `<fact>` is one part; its text content is tokenized into words.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlFactCodec;

impl FactCodec for XmlFactCodec {
    fn document_extension(&self) -> &str {
        XML_DOCUMENT_EXTENSION
    }

    fn canonicalize(&self, text: &str) -> Result<String, FactError> {
        let mut out = String::with_capacity(text.len());
        for mut fact in parse_raw_facts(text)? {
            fact.parts.sort_by(|a, b| part_order(&a.name, &b.name));
            write_fact(
                &mut out,
                fact.parts
                    .iter()
                    .map(|part| (part.name.as_str(), part.text.trim())),
            );
        }
        Ok(out)
    }

    fn decode(&self, text: &str, origin: Option<&Path>) -> Result<Vec<Fact>, FactError> {
        let facts = parse_raw_facts(text)?
            .into_iter()
            .map(|raw| {
                let parts = raw
                    .parts
                    .into_iter()
                    .map(|part| FactPart::new(part.name, tokenize(&part.text)))
                    .collect();
                let fact = Fact::new(parts);
                match origin {
                    Some(origin) => fact.with_origin(origin),
                    None => fact,
                }
            })
            .collect();
        Ok(facts)
    }

    fn encode(&self, fact: &Fact) -> String {
        let mut out = String::new();
        write_fact(
            &mut out,
            fact.parts().iter().map(|part| (part.name(), part.text())),
        );
        out
    }
}

struct RawFact {
    parts: Vec<RawPart>,
}

struct RawPart {
    name: String,
    text: String,
}

fn parse_raw_facts(text: &str) -> Result<Vec<RawFact>, FactError> {
    let body = strip_xml_declaration(text);
    let wrapped = format!("<{WRAPPER_ELEMENT}>{body}</{WRAPPER_ELEMENT}>");
    let doc = roxmltree::Document::parse(&wrapped)?;

    let mut facts = Vec::new();
    collect_facts(doc.root_element(), &mut facts)?;
    Ok(facts)
}

fn collect_facts(
    container: roxmltree::Node<'_, '_>,
    out: &mut Vec<RawFact>,
) -> Result<(), FactError> {
    for child in container.children() {
        if child.is_element() {
            match child.tag_name().name() {
                FACT_ELEMENT => out.push(parse_fact(child)?),
                FACTS_ELEMENT => collect_facts(child, out)?,
                other => {
                    return Err(FactError::UnexpectedElement {
                        name: other.to_string(),
                    })
                }
            }
        } else if is_stray_text(&child) {
            return Err(FactError::StrayText);
        }
    }
    Ok(())
}

fn parse_fact(node: roxmltree::Node<'_, '_>) -> Result<RawFact, FactError> {
    let mut parts = Vec::new();
    for child in node.children() {
        if child.is_element() {
            parts.push(RawPart {
                name: child.tag_name().name().to_string(),
                text: element_text(child),
            });
        } else if is_stray_text(&child) {
            return Err(FactError::StrayText);
        }
    }
    Ok(RawFact { parts })
}

fn element_text(node: roxmltree::Node<'_, '_>) -> String {
    let mut out = String::new();
    for text in node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

fn is_stray_text(node: &roxmltree::Node<'_, '_>) -> bool {
    node.is_text() && node.text().is_some_and(|text| !text.trim().is_empty())
}

fn strip_xml_declaration(text: &str) -> &str {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("<?xml") {
        if let Some(end) = text.find("?>") {
            return &text[end + 2..];
        }
    }
    text
}

fn write_fact<'a, T: AsRef<str>>(out: &mut String, parts: impl Iterator<Item = (&'a str, T)>) {
    out.push_str("<fact>\n");
    for (name, text) in parts {
        out.push_str("  <");
        out.push_str(name);
        out.push('>');
        escape_text_into(out, text.as_ref());
        out.push_str("</");
        out.push_str(name);
        out.push_str(">\n");
    }
    out.push_str("</fact>\n");
}

fn escape_text_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}
