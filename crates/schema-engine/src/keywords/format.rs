//! `format` (§4.G, Non-goals): every format value is recorded as a public annotation; only
//! `uri` and `ipv4` additionally compile to an assertion step.
use schema_frame::Pointer;
use serde_json::Value;

use crate::compiler::type_condition;
use crate::ir::{Step, StepKind, StepLocation, StringFormat, Target, Template};
use crate::primitive_type::PrimitiveType;

/// Infallible: an unrecognized or non-string `format` value is still a valid annotation,
/// just one that never asserts anything.
#[must_use]
pub(crate) fn compile(value: &Value, pointer: &Pointer) -> Template {
    let mut steps = vec![Step::leaf(
        StepKind::AnnotationPublic(value.clone()),
        Target::Instance,
        None,
        StepLocation::new(pointer.clone(), "format"),
    )];
    let Value::String(name) = value else {
        return steps;
    };
    let format = match name.as_str() {
        "uri" => StringFormat::Uri,
        "ipv4" => StringFormat::Ipv4,
        _ => return steps,
    };
    let condition = type_condition(pointer, "format", &[PrimitiveType::String]);
    steps.push(Step::leaf(StepKind::StringFormat(format), Target::Instance, Some(condition), StepLocation::new(pointer.clone(), "format")));
    steps
}
