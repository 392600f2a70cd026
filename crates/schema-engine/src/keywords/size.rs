//! `uniqueItems`, `pattern`, and the length/size-bound keyword family (§4.G).
//!
//! Length/size bounds compile to strict `SizeLess`/`SizeGreater` assertions, shifting the
//! inclusive bound by one at compile time rather than carrying an inclusive variant through
//! the IR.
use std::sync::Arc;

use fancy_regex::Regex;
use schema_frame::Pointer;
use serde_json::Value;

use crate::compiler::type_condition;
use crate::error::{Error, Result};
use crate::ir::{CompiledRegex, Step, StepKind, StepLocation, Target, Template};
use crate::primitive_type::PrimitiveType;

fn bound(value: &Value, pointer: &Pointer, keyword: &'static str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| Error::compile(pointer.clone(), format!("{keyword} must be a non-negative integer")))
}

fn min_bound(value: &Value, pointer: &Pointer, keyword: &'static str, kind_type: PrimitiveType) -> Result<Template> {
    let n = bound(value, pointer, keyword)?;
    let Some(exclusive) = n.checked_sub(1) else {
        return Ok(Vec::new()); // a bound of 0 holds for every instance of that type
    };
    let condition = type_condition(pointer, keyword, &[kind_type]);
    Ok(vec![Step::leaf(StepKind::SizeGreater(exclusive), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), keyword))])
}

fn max_bound(value: &Value, pointer: &Pointer, keyword: &'static str, kind_type: PrimitiveType) -> Result<Template> {
    let n = bound(value, pointer, keyword)?;
    let condition = type_condition(pointer, keyword, &[kind_type]);
    Ok(vec![Step::leaf(StepKind::SizeLess(n + 1), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), keyword))])
}

pub(crate) fn compile_min_length(value: &Value, pointer: &Pointer) -> Result<Template> {
    min_bound(value, pointer, "minLength", PrimitiveType::String)
}

pub(crate) fn compile_max_length(value: &Value, pointer: &Pointer) -> Result<Template> {
    max_bound(value, pointer, "maxLength", PrimitiveType::String)
}

pub(crate) fn compile_min_items(value: &Value, pointer: &Pointer) -> Result<Template> {
    min_bound(value, pointer, "minItems", PrimitiveType::Array)
}

pub(crate) fn compile_max_items(value: &Value, pointer: &Pointer) -> Result<Template> {
    max_bound(value, pointer, "maxItems", PrimitiveType::Array)
}

pub(crate) fn compile_min_properties(value: &Value, pointer: &Pointer) -> Result<Template> {
    min_bound(value, pointer, "minProperties", PrimitiveType::Object)
}

pub(crate) fn compile_max_properties(value: &Value, pointer: &Pointer) -> Result<Template> {
    max_bound(value, pointer, "maxProperties", PrimitiveType::Object)
}

pub(crate) fn compile_unique_items(value: &Value, pointer: &Pointer) -> Result<Template> {
    if value != &Value::Bool(true) {
        return Ok(Vec::new());
    }
    let condition = type_condition(pointer, "uniqueItems", &[PrimitiveType::Array]);
    Ok(vec![Step::leaf(StepKind::Unique, Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "uniqueItems"))])
}

pub(crate) fn compile_pattern(value: &Value, pointer: &Pointer) -> Result<Template> {
    let Value::String(pattern) = value else {
        return Err(Error::compile(pointer.clone(), "pattern must be a string"));
    };
    let regex = Regex::new(pattern)
        .map_err(|_| Error::InvalidPattern { pointer: pointer.clone(), pattern: pattern.clone() })?;
    let condition = type_condition(pointer, "pattern", &[PrimitiveType::String]);
    let compiled = CompiledRegex { source: pattern.clone(), regex: Arc::new(regex) };
    Ok(vec![Step::leaf(StepKind::Regex(compiled), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "pattern"))])
}
