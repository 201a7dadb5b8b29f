//! SPICE `.MODEL` card parsing for N-channel JFETs
//!
//! Accepts cards of the form
//!
//! ```text
//! .MODEL 2N3819 NJF(Beta=1.304m Vto=-3 Lambda=2.25m Rd=1 Rs=1)
//! + Vtotc=-2.5m Betatce=-.5
//! ```
//!
//! Parameters may be separated by spaces or commas and the parentheses are
//! optional. Parameters the static model does not use are ignored.

use std::collections::HashMap;
use std::sync::LazyLock;

use thiserror::Error;

use super::params::{JfetParams, ParamError};
use super::{build_jfet_params, parse_number, KNOWN_KEYS};

static JFET_MODELS_SRC: &str = include_str!("../../models/jfets.model");

/// Models parsed from the embedded jfets.model file.
pub static JFET_MODELS: LazyLock<ModelLibrary> =
    LazyLock::new(|| parse_model_library(JFET_MODELS_SRC));

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("not a .model card")]
    NotAModel,

    #[error("model card has no name")]
    MissingName,

    #[error("model {0}: P-channel devices are not supported")]
    UnsupportedPolarity(String),

    #[error("model {name}: type {kind} is not a JFET")]
    NotJfet { name: String, kind: String },

    #[error("bad value for {key}: {value}")]
    BadValue { key: String, value: String },

    #[error(transparent)]
    Invalid(#[from] ParamError),
}

/// A named parameter set from a model card.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedJfetModel {
    pub name: String,
    pub params: JfetParams,
}

#[derive(Debug, Clone)]
pub struct ModelLibraryError {
    pub line: usize,
    pub error: ModelError,
}

#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    pub models: Vec<NamedJfetModel>,
    pub errors: Vec<ModelLibraryError>,
}

impl ModelLibrary {
    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&NamedJfetModel> {
        self.models
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Parse a single (already joined) `.MODEL` card.
pub fn parse_model_card(line: &str) -> Result<NamedJfetModel, ModelError> {
    let trimmed = line.trim();
    let rest = match trimmed.get(..6) {
        Some(head) if head.eq_ignore_ascii_case(".model") => trimmed[6..].trim_start(),
        _ => return Err(ModelError::NotAModel),
    };

    let (name, rest) = match rest.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None if !rest.is_empty() => (rest, ""),
        None => return Err(ModelError::MissingName),
    };

    let kind_end = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let kind = &rest[..kind_end];
    match kind.to_ascii_uppercase().as_str() {
        "NJF" => {}
        "PJF" => return Err(ModelError::UnsupportedPolarity(name.to_string())),
        _ => {
            return Err(ModelError::NotJfet {
                name: name.to_string(),
                kind: kind.to_string(),
            })
        }
    }

    let block: String = rest[kind_end..]
        .chars()
        .map(|c| match c {
            '(' | ')' | ',' => ' ',
            other => other,
        })
        .collect();

    let mut map = HashMap::new();
    for pair in join_assignments(&block) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if KNOWN_KEYS.contains(&key.as_str()) && parse_number(value).is_none() {
            return Err(ModelError::BadValue {
                key,
                value: value.to_string(),
            });
        }
        map.insert(key, value.trim().to_string());
    }

    let params = build_jfet_params(&map);
    params.validate()?;
    Ok(NamedJfetModel {
        name: name.to_string(),
        params,
    })
}

/// Parse every card in a model file. `*` comment lines are skipped, `+`
/// lines continue the previous card, and cards for other device types are
/// ignored. Malformed JFET cards are collected in `errors` with the line
/// where the card starts.
pub fn parse_model_library(src: &str) -> ModelLibrary {
    let mut library = ModelLibrary::default();
    let mut cards: Vec<(usize, String)> = Vec::new();

    for (idx, raw) in src.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        if let Some(cont) = line.strip_prefix('+') {
            if let Some((_, card)) = cards.last_mut() {
                card.push(' ');
                card.push_str(cont.trim());
            }
            continue;
        }
        cards.push((idx + 1, line.to_string()));
    }

    for (line, card) in cards {
        match parse_model_card(&card) {
            Ok(model) => library.models.push(model),
            Err(ModelError::NotAModel) | Err(ModelError::NotJfet { .. }) => {}
            Err(error) => library.errors.push(ModelLibraryError { line, error }),
        }
    }
    library
}

/// Look up an embedded model by name (case-insensitive).
pub fn jfet_by_name(name: &str) -> Option<&'static NamedJfetModel> {
    JFET_MODELS.get(name)
}

/// List all embedded model names.
pub fn jfet_model_names() -> Vec<&'static str> {
    JFET_MODELS.names()
}

// "Vto = -3" and "Vto= -3" become "Vto=-3"
fn join_assignments(block: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in block.split_whitespace() {
        let join = token.starts_with('=') || out.last().is_some_and(|p| p.ends_with('='));
        if join {
            if let Some(prev) = out.last_mut() {
                prev.push_str(token);
                continue;
            }
        }
        out.push(token.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_njf_card() {
        let m = parse_model_card(
            ".MODEL J1 NJF(Beta=1.304m Vto=-3 Lambda=2.25m Rd=1 Rs=1 Vtotc=-2.5m Betatce=-.5)",
        )
        .unwrap();
        assert_eq!(m.name, "J1");
        assert_eq!(m.params, JfetParams::n2n3819());
    }

    #[test]
    fn parse_space_separated_without_parens() {
        let m = parse_model_card(".model jx njf beta = 2m vto=-1.5, lambda=0").unwrap();
        assert!((m.params.beta - 2e-3).abs() < 1e-15);
        assert!((m.params.vto + 1.5).abs() < 1e-12);
        assert_eq!(m.params.lambda, 0.0);
    }

    #[test]
    fn reject_pjf() {
        let err = parse_model_card(".MODEL 2N5460 PJF(Beta=1m Vto=2)").unwrap_err();
        assert_eq!(err, ModelError::UnsupportedPolarity("2N5460".to_string()));
    }

    #[test]
    fn reject_bad_value() {
        let err = parse_model_card(".MODEL J1 NJF(Beta=abc)").unwrap_err();
        assert!(matches!(err, ModelError::BadValue { .. }));
    }

    #[test]
    fn reject_invalid_params() {
        let err = parse_model_card(".MODEL J1 NJF(Beta=0)").unwrap_err();
        assert_eq!(err, ModelError::Invalid(ParamError::NonPositiveBeta(0.0)));
    }

    #[test]
    fn library_skips_other_devices_and_reports_errors() {
        let src = "* header\n\
                   .model Q1 NPN(IS=1f)\n\
                   .model J1 NJF(Beta=1m\n\
                   + Vto=-2)\n\
                   .model J2 NJF(Beta=-1m)\n";
        let lib = parse_model_library(src);
        assert_eq!(lib.names(), vec!["J1"]);
        assert!((lib.get("j1").unwrap().params.vto + 2.0).abs() < 1e-12);
        assert_eq!(lib.errors.len(), 1);
        assert_eq!(lib.errors[0].line, 5);
    }

    #[test]
    fn embedded_models_load() {
        assert!(JFET_MODELS.errors.is_empty());
        for name in ["2N3819", "2N5457", "GENERIC_NJF"] {
            assert!(jfet_by_name(name).is_some(), "model '{}' missing", name);
        }
        assert_eq!(jfet_by_name("2n3819").unwrap().params, JfetParams::n2n3819());
    }
}
