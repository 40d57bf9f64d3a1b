//! Parser for the descriptor configuration language.
//!
//! The language is a brace-block format with two top-level blocks:
//! `Enums` (optional) declaring flat and hierarchical value sets, and
//! `Attributes` (required) with one `name qualifier [type [params]]`
//! line per column. Commas and newlines separate sibling blocks; `#`
//! starts a comment line.

use chrono::NaiveDate;
use tracing::info;
use veil_attribute::{
    DEFAULT_DATE_FORMAT, DateAttribute, EnumAttribute, HierarchicAttribute, Hierarchy,
    IntAttribute, NodeId, QuasiType, StringAttribute,
};

use crate::descriptor::{Attribute, AttributeRole, RecordDescriptor};
use crate::error::ConfigError;

/// A node of the raw block tree: a name and its nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    name: String,
    children: Vec<Block>,
}

impl Block {
    fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// Parses descriptor text into a [`RecordDescriptor`].
pub fn parse_descriptor(text: &str) -> Result<RecordDescriptor, ConfigError> {
    // Comment lines never reach the block parser.
    let cleaned: String = text
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let blocks = parse_block_list(&cleaned)?;

    let enums = blocks
        .iter()
        .find(|b| b.name == "Enums")
        .map(|b| b.children.as_slice())
        .unwrap_or_default();

    // An enum whose declaration has any grandchildren is hierarchical.
    let (hierarchic, flat): (Vec<&Block>, Vec<&Block>) = enums
        .iter()
        .partition(|e| e.children.iter().any(|c| !c.children.is_empty()));

    info!(
        hierarchic = hierarchic.len(),
        flat = flat.len(),
        "parsed enum declarations"
    );

    let attributes_block = blocks
        .iter()
        .find(|b| b.name == "Attributes")
        .ok_or(ConfigError::MissingAttributes)?;

    let mut attributes = Vec::with_capacity(attributes_block.children.len());
    for (position, line_block) in attributes_block.children.iter().enumerate() {
        attributes.push(parse_attribute_line(
            position,
            &line_block.name,
            &hierarchic,
            &flat,
        )?);
    }

    Ok(RecordDescriptor::new(attributes))
}

// ============================================================================
// Block tree parsing
// ============================================================================

/// Splits sibling blocks at depth-zero commas and newlines, then parses
/// each into a [`Block`] recursively.
fn parse_block_list(text: &str) -> Result<Vec<Block>, ConfigError> {
    let mut blocks = Vec::new();
    for piece in split_top_level(text) {
        if piece.trim().is_empty() {
            continue;
        }
        blocks.push(parse_block(piece)?);
    }
    Ok(blocks)
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' | '\n' if depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn parse_block(text: &str) -> Result<Block, ConfigError> {
    let cleaned = text.trim();

    if !cleaned.ends_with('}') {
        if cleaned.contains('{') || cleaned.is_empty() {
            return Err(ConfigError::InvalidBlock {
                context: cleaned.to_string(),
            });
        }
        return Ok(Block::leaf(cleaned));
    }

    let body = &cleaned[..cleaned.len() - 1];
    let Some(opening) = body.find('{') else {
        return Err(ConfigError::InvalidBlock {
            context: cleaned.to_string(),
        });
    };

    let name = body[..opening].trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidBlock {
            context: cleaned.to_string(),
        });
    }

    Ok(Block {
        name: name.to_string(),
        children: parse_block_list(&body[opening + 1..])?,
    })
}

// ============================================================================
// Attribute lines
// ============================================================================

fn parse_attribute_line(
    position: usize,
    line: &str,
    hierarchic: &[&Block],
    flat: &[&Block],
) -> Result<Attribute, ConfigError> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or_else(|| ConfigError::MissingQualifier {
        line: line.to_string(),
    })?;
    let qualifier = tokens.next().ok_or_else(|| ConfigError::MissingQualifier {
        line: line.to_string(),
    })?;

    let role = match qualifier {
        "passthrough" => AttributeRole::Passthrough,
        "secret" => AttributeRole::Secret,
        "secret-id" => AttributeRole::SecretIdentity,
        "quasi" => {
            let type_name = tokens.next().ok_or_else(|| ConfigError::UnknownType {
                type_name: String::new(),
                line: line.to_string(),
            })?;
            let params: String = tokens.collect();
            AttributeRole::Quasi(parse_quasi_type(type_name, &params, line, hierarchic, flat)?)
        }
        other => {
            return Err(ConfigError::UnknownQualifier {
                qualifier: other.to_string(),
                line: line.to_string(),
            });
        }
    };

    Ok(Attribute {
        position,
        name: name.to_string(),
        role,
    })
}

fn parse_quasi_type(
    type_name: &str,
    params: &str,
    line: &str,
    hierarchic: &[&Block],
    flat: &[&Block],
) -> Result<QuasiType, ConfigError> {
    match type_name {
        "Int" => parse_int_type(params),
        "String" => parse_string_type(params),
        "Date" => parse_date_type(params),
        other => {
            if let Some(block) = hierarchic.iter().find(|b| b.name == other) {
                let tree = build_hierarchy(block);
                return Ok(QuasiType::Hierarchy(HierarchicAttribute::new(
                    other.to_string(),
                    tree,
                )));
            }
            if let Some(block) = flat.iter().find(|b| b.name == other) {
                let members = block.children.iter().map(|c| c.name.clone()).collect();
                return Ok(QuasiType::Enum(EnumAttribute::new(other.to_string(), members)));
            }
            Err(ConfigError::UnknownType {
                type_name: other.to_string(),
                line: line.to_string(),
            })
        }
    }
}

fn build_hierarchy(block: &Block) -> Hierarchy {
    fn add_children(tree: &mut Hierarchy, parent: NodeId, blocks: &[Block]) {
        for child in blocks {
            let id = tree.add_child(parent, child.name.clone());
            add_children(tree, id, &child.children);
        }
    }

    let mut tree = Hierarchy::new(block.name.clone());
    let root = tree.root();
    add_children(&mut tree, root, &block.children);
    tree
}

// ============================================================================
// Bracketed type parameters
// ============================================================================

/// Optional endpoints of a `[lo;hi]` parameter; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bounds<T> {
    Open,
    Left(T),
    Right(T),
    Both(T, T),
}

fn parse_brackets<T>(
    params: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Bounds<T>, ConfigError> {
    let mut cleaned = params.trim();
    cleaned = cleaned.strip_prefix('[').unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix(']').unwrap_or(cleaned);
    let cleaned = cleaned.trim();

    let bad = || ConfigError::BadTypeParameter {
        params: params.to_string(),
    };

    if cleaned.is_empty() {
        return Ok(Bounds::Open);
    }
    if let Some(rest) = cleaned.strip_prefix(';') {
        return Ok(Bounds::Right(parse(rest.trim()).ok_or_else(bad)?));
    }
    if let Some(rest) = cleaned.strip_suffix(';') {
        return Ok(Bounds::Left(parse(rest.trim()).ok_or_else(bad)?));
    }

    let tokens: Vec<&str> = cleaned.split(';').map(str::trim).collect();
    if tokens.len() == 2 {
        let lo = parse(tokens[0]).ok_or_else(bad)?;
        let hi = parse(tokens[1]).ok_or_else(bad)?;
        return Ok(Bounds::Both(lo, hi));
    }
    Err(bad())
}

fn parse_int_type(params: &str) -> Result<QuasiType, ConfigError> {
    let attr = match parse_brackets(params, |t| t.parse::<i64>().ok())? {
        Bounds::Open => IntAttribute::default(),
        Bounds::Left(lo) => IntAttribute::with_min(lo),
        Bounds::Right(hi) => IntAttribute::with_max(hi),
        Bounds::Both(lo, hi) => IntAttribute::new(lo, hi),
    };
    Ok(QuasiType::Int(attr))
}

fn parse_string_type(params: &str) -> Result<QuasiType, ConfigError> {
    let attr = match parse_brackets(params, |t| t.parse::<usize>().ok())? {
        Bounds::Open => StringAttribute::default(),
        Bounds::Left(lo) => StringAttribute::with_min(lo),
        Bounds::Right(hi) => StringAttribute::with_max(hi),
        Bounds::Both(lo, hi) => StringAttribute::new(lo, hi),
    };
    Ok(QuasiType::Text(attr))
}

fn parse_date_type(params: &str) -> Result<QuasiType, ConfigError> {
    // An optional format string precedes the bracket: `%d/%m/%Y[lo;hi]`.
    let (format, bracket) = match params.find('[') {
        Some(i) if i > 0 => (&params[..i], &params[i..]),
        Some(i) => (DEFAULT_DATE_FORMAT, &params[i..]),
        None if params.trim().is_empty() => (DEFAULT_DATE_FORMAT, ""),
        None => (params.trim(), ""),
    };

    let parse_day = |t: &str| NaiveDate::parse_from_str(t, format).ok();
    let attr = match parse_brackets(bracket, parse_day)? {
        Bounds::Open => DateAttribute::new(format, None, None),
        Bounds::Left(lo) => DateAttribute::new(format, Some(lo), None),
        Bounds::Right(hi) => DateAttribute::new(format, None, Some(hi)),
        Bounds::Both(lo, hi) => DateAttribute::new(format, Some(lo), Some(hi)),
    };
    Ok(QuasiType::Date(attr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::AttributeRole;
    use test_case::test_case;

    const DESCRIPTOR: &str = "\
# patient schema
Enums {
    illness { cardiovascular { embolism, infarction }, viral { flu, pox } },
    job { engineer, teacher, nurse }
}
Attributes {
    name      secret
    patient   secret-id
    city      passthrough
    age       quasi Int [0;120]
    admitted  quasi Date [2000-01-01;]
    work      quasi job
    diagnosis quasi illness
}";

    #[test]
    fn parses_full_descriptor() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        assert_eq!(d.arity(), 7);
        assert_eq!(d.quasi_positions(), &[3, 4, 5, 6]);

        assert!(matches!(d.attributes()[0].role, AttributeRole::Secret));
        assert!(matches!(d.attributes()[1].role, AttributeRole::SecretIdentity));
        assert!(matches!(d.attributes()[2].role, AttributeRole::Passthrough));
        assert!(matches!(d.quasi_type(3), Some(QuasiType::Int(_))));
        assert!(matches!(d.quasi_type(4), Some(QuasiType::Date(_))));
        assert!(matches!(d.quasi_type(5), Some(QuasiType::Enum(_))));
        assert!(matches!(d.quasi_type(6), Some(QuasiType::Hierarchy(_))));
    }

    #[test]
    fn hierarchy_structure_survives_parsing() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        let Some(QuasiType::Hierarchy(illness)) = d.quasi_type(6) else {
            panic!("expected hierarchical enum");
        };
        let flu = illness.parse("flu").unwrap();
        assert_eq!(illness.show(&flu), "illness.viral.flu");
    }

    #[test]
    fn flat_enum_membership_enforced() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        let Some(ty) = d.quasi_type(5) else { panic!() };
        assert!(ty.parse("nurse").is_ok());
        assert!(ty.parse("pilot").is_err());
    }

    #[test]
    fn missing_attributes_block_is_an_error() {
        assert!(matches!(
            parse_descriptor("Enums { job { a, b } }"),
            Err(ConfigError::MissingAttributes)
        ));
    }

    #[test]
    fn unknown_qualifier_is_an_error() {
        let err = parse_descriptor("Attributes { age hidden Int }");
        assert!(matches!(err, Err(ConfigError::UnknownQualifier { .. })));
    }

    #[test]
    fn unknown_quasi_type_is_an_error() {
        let err = parse_descriptor("Attributes { pet quasi Animal }");
        assert!(matches!(err, Err(ConfigError::UnknownType { .. })));
    }

    #[test]
    fn unbalanced_block_is_an_error() {
        assert!(parse_block_list("Enums { job { a, b }").is_err());
    }

    #[test_case("[0;120]", Bounds::Both(0, 120); "both ends")]
    #[test_case("[0;]", Bounds::Left(0); "left only")]
    #[test_case("[;120]", Bounds::Right(120); "right only")]
    #[test_case("", Bounds::Open; "no brackets")]
    #[test_case("[]", Bounds::Open; "empty brackets")]
    fn bracket_bounds(params: &str, expected: Bounds<i64>) {
        let got = parse_brackets(params, |t| t.parse::<i64>().ok()).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn bad_bracket_bounds_rejected() {
        assert!(parse_brackets("[a;b]", |t| t.parse::<i64>().ok()).is_err());
        assert!(parse_brackets("[1;2;3]", |t| t.parse::<i64>().ok()).is_err());
    }

    #[test]
    fn date_format_prefix_is_honored() {
        let ty = parse_date_type("%d/%m/%Y[01/01/2000;]").unwrap();
        let QuasiType::Date(attr) = ty else { panic!() };
        assert_eq!(attr.format(), "%d/%m/%Y");
        assert!(attr.parse("20/05/2001").is_ok());
        assert!(attr.parse("20/05/1999").is_err());
    }
}
