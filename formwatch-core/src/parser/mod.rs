use crate::error::ParseError;
use crate::types::MonitorDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: MonitorDocument,
    pub format: DocumentFormat,
}

pub fn parse_document_str(input: &str, format: DocumentFormat) -> Result<ParsedDocument, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedDocument {
            document: serde_json::from_str(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedDocument {
            document: serde_yaml::from_str(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

fn parse_document_auto(input: &str) -> Result<ParsedDocument, ParseError> {
    // JSON documents start with `{`; anything else is tried as YAML first.
    let looks_like_json = input.trim_start().starts_with('{');

    if looks_like_json {
        return match serde_json::from_str::<MonitorDocument>(input) {
            Ok(document) => Ok(ParsedDocument {
                document,
                format: DocumentFormat::Json,
            }),
            // YAML is a superset of JSON, so a lenient retry can still succeed.
            Err(e) => serde_yaml::from_str::<MonitorDocument>(input)
                .map(|document| ParsedDocument {
                    document,
                    format: DocumentFormat::Yaml,
                })
                .map_err(|_| ParseError::Json(e)),
        };
    }

    match serde_yaml::from_str::<MonitorDocument>(input) {
        Ok(document) => Ok(ParsedDocument {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => serde_json::from_str::<MonitorDocument>(input)
            .map(|document| ParsedDocument {
                document,
                format: DocumentFormat::Json,
            })
            .map_err(|_| ParseError::Yaml(e)),
    }
}
