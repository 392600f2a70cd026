//! `required` (§4.G, §8 property 5: `required: []` compiles to the empty Template).
use schema_frame::Pointer;
use serde_json::Value;

use crate::compiler::type_condition;
use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};
use crate::primitive_type::PrimitiveType;

pub(crate) fn compile(value: &Value, pointer: &Pointer) -> Result<Template> {
    let Value::Array(items) = value else {
        return Err(Error::compile(pointer.clone(), "required must be an array"));
    };
    let mut keys = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(key) => keys.push(key.clone()),
            _ => return Err(Error::compile(pointer.clone(), "required entries must be strings")),
        }
    }
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let condition = type_condition(pointer, "required", &[PrimitiveType::Object]);
    let location = StepLocation::new(pointer.clone(), "required");
    let kind = match keys.as_slice() {
        [single] => StepKind::Defines(single.clone()),
        _ => StepKind::DefinesAll(keys),
    };
    Ok(vec![Step::leaf(kind, Target::Instance, Some(condition), location)])
}
