use std::collections::BTreeMap;

/// Vendor extensions (`x-...`) captured from the document.
///
/// Unknown fields land here and are rejected at validation time unless they carry the `x-`
/// prefix.
pub type Extensions = BTreeMap<String, serde_json::Value>;
