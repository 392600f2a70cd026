//! `maximum`/`minimum`/`exclusiveMaximum`/`exclusiveMinimum`/`multipleOf` (§4.G).
//!
//! Draft 4 treats `exclusiveMaximum`/`exclusiveMinimum` as boolean modifiers of their
//! `maximum`/`minimum` sibling; Draft 6 onward redefines them as standalone numeric assertion
//! keywords. Both forms are resolved here, against `maximum`/`minimum`'s own handler for the
//! boolean form so the standalone keyword never double-compiles it.
use schema_frame::{Dialect, Pointer};
use serde_json::Value;

use crate::compiler::type_condition;
use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};
use crate::primitive_type::PrimitiveType;

fn number(value: &Value, pointer: &Pointer, keyword: &'static str) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::compile(pointer.clone(), format!("{keyword} must be a number")))
}

fn is_draft4_exclusive(node: &serde_json::Map<String, Value>, keyword: &'static str) -> bool {
    matches!(node.get(keyword), Some(Value::Bool(true)))
}

pub(crate) fn compile_maximum(
    node: &serde_json::Map<String, Value>,
    pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let value = node.get("maximum").expect("dispatch only called when present");
    let bound = number(value, pointer, "maximum")?;
    let draft4_exclusive = dialect == Dialect::Draft4 && is_draft4_exclusive(node, "exclusiveMaximum");
    let kind = if draft4_exclusive { StepKind::Less(bound) } else { StepKind::LessEqual(bound) };
    let condition = type_condition(pointer, "maximum", &[PrimitiveType::Number]);
    Ok(vec![Step::leaf(kind, Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "maximum"))])
}

pub(crate) fn compile_minimum(
    node: &serde_json::Map<String, Value>,
    pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let value = node.get("minimum").expect("dispatch only called when present");
    let bound = number(value, pointer, "minimum")?;
    let draft4_exclusive = dialect == Dialect::Draft4 && is_draft4_exclusive(node, "exclusiveMinimum");
    let kind = if draft4_exclusive { StepKind::Greater(bound) } else { StepKind::GreaterEqual(bound) };
    let condition = type_condition(pointer, "minimum", &[PrimitiveType::Number]);
    Ok(vec![Step::leaf(kind, Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "minimum"))])
}

pub(crate) fn compile_exclusive_maximum(value: &Value, pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    if dialect == Dialect::Draft4 {
        // Boolean modifier, already folded into `maximum`'s own handler.
        return Ok(Vec::new());
    }
    let bound = number(value, pointer, "exclusiveMaximum")?;
    let condition = type_condition(pointer, "exclusiveMaximum", &[PrimitiveType::Number]);
    Ok(vec![Step::leaf(StepKind::Less(bound), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "exclusiveMaximum"))])
}

pub(crate) fn compile_exclusive_minimum(value: &Value, pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    if dialect == Dialect::Draft4 {
        return Ok(Vec::new());
    }
    let bound = number(value, pointer, "exclusiveMinimum")?;
    let condition = type_condition(pointer, "exclusiveMinimum", &[PrimitiveType::Number]);
    Ok(vec![Step::leaf(StepKind::Greater(bound), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "exclusiveMinimum"))])
}

pub(crate) fn compile_multiple_of(value: &Value, pointer: &Pointer) -> Result<Template> {
    let divisor = number(value, pointer, "multipleOf")?;
    if divisor <= 0.0 {
        return Err(Error::InvalidMultipleOf(pointer.clone()));
    }
    let condition = type_condition(pointer, "multipleOf", &[PrimitiveType::Number]);
    Ok(vec![Step::leaf(StepKind::Divisible(divisor), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "multipleOf"))])
}
