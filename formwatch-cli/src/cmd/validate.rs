use std::path::Path;

use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::{load_document, LoadError};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    journeys: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    match load_document(path) {
        Ok((doc, format)) => {
            let result = ValidateResult {
                valid: true,
                format: Some(format!("{format:?}").to_lowercase()),
                journeys: Some(doc.journeys.len()),
                errors: vec![],
            };
            if output.format == OutputFormat::Text && !output.quiet {
                println!(
                    "ok: valid journey document ({:?}, {} journeys)",
                    format,
                    doc.journeys.len()
                );
            } else {
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(LoadError::Invalid(err)) => {
            let errors: Vec<String> = err.violations.iter().map(ToString::to_string).collect();
            if output.format == OutputFormat::Text && !output.quiet {
                eprintln!("error: validation failed");
                for e in &errors {
                    eprintln!("- {e}");
                }
            } else {
                let result = ValidateResult {
                    valid: false,
                    format: None,
                    journeys: None,
                    errors,
                };
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::INVALID_DOCUMENT
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            e.exit_code()
        }
    }
}
