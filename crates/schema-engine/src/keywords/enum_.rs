//! `enum` and `const` (§4.G, §8 property 4: `enum: [v]` and `const: v` are equivalent).
use schema_frame::Pointer;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};

pub(crate) fn compile_enum(value: &Value, pointer: &Pointer) -> Result<Template> {
    let Value::Array(values) = value else {
        return Err(Error::compile(pointer.clone(), "enum must be an array"));
    };
    let location = StepLocation::new(pointer.clone(), "enum");
    let kind = match values.as_slice() {
        [single] => StepKind::Equal(single.clone()),
        many => StepKind::EqualsAny(many.to_vec()),
    };
    Ok(vec![Step::leaf(kind, Target::Instance, None, location)])
}

pub(crate) fn compile_const(value: &Value, pointer: &Pointer) -> Result<Template> {
    let location = StepLocation::new(pointer.clone(), "const");
    Ok(vec![Step::leaf(StepKind::Equal(value.clone()), Target::Instance, None, location)])
}
