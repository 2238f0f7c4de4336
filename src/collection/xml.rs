use serde_json::Value;

use super::mapping::{FieldMapping, COLLECTION_FIELDS, LISTING_ENTRY_FIELDS};
use super::types::CollectionData;
use crate::wire::{escape_xml, XML_NAMESPACE};

/// Build XML for a collection representation
pub fn collection_xml(data: &CollectionData) -> Result<String, serde_json::Error> {
  let value = serde_json::to_value(data)?;

  let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
  xml.push_str(&format!("<collection xmlns=\"{}\">\n", XML_NAMESPACE));
  push_fields(&mut xml, &value, COLLECTION_FIELDS, 1);

  let children = value["children"].as_array().map(Vec::as_slice).unwrap_or(&[]);
  if children.is_empty() {
    xml.push_str("  <children/>\n");
  } else {
    xml.push_str("  <children>\n");
    for child in children {
      xml.push_str("    <listingEntry>\n");
      push_fields(&mut xml, child, LISTING_ENTRY_FIELDS, 3);
      xml.push_str("    </listingEntry>\n");
    }
    xml.push_str("  </children>\n");
  }

  xml.push_str("</collection>");
  Ok(xml)
}

fn push_fields(xml: &mut String, value: &Value, table: &[FieldMapping], depth: usize) {
  let indent = "  ".repeat(depth);
  for mapping in table {
    let text = match &value[mapping.target] {
      Value::Null => continue,
      Value::String(s) => escape_xml(s),
      other => other.to_string(),
    };
    xml.push_str(&format!(
      "{}<{tag}>{}</{tag}>\n",
      indent,
      text,
      tag = mapping.target
    ));
  }
}
