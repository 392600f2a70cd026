//! `type` (§4.G).
use std::convert::TryFrom;

use schema_frame::Pointer;
use serde_json::Value;

use crate::compiler::type_condition;
use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};
use crate::options::CompilationOptions;
use crate::primitive_type::PrimitiveType;

pub(crate) fn compile(value: &Value, pointer: &Pointer, options: &CompilationOptions) -> Result<Template> {
    let names = match value {
        Value::String(name) => std::slice::from_ref(name).to_vec(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok(name.clone()),
                _ => Err(Error::compile(pointer.clone(), "type array must contain only strings")),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(Error::compile(pointer.clone(), "type must be a string or an array of strings")),
    };

    let mut types = Vec::new();
    for name in &names {
        match expand(name) {
            Some(expanded) => {
                for t in expanded {
                    if !types.contains(&t) {
                        types.push(t);
                    }
                }
            }
            None if options.reject_unknown_types => {
                return Err(Error::compile(pointer.clone(), format!("unknown type name {name:?}")))
            }
            None => {}
        }
    }

    if types.is_empty() {
        return Ok(Vec::new());
    }
    let location = StepLocation::new(pointer.clone(), "type");
    let kind = match types.as_slice() {
        [single] => StepKind::TypeStrict(*single),
        _ => StepKind::TypeStrictAny(types),
    };
    Ok(vec![Step::leaf(kind, Target::Instance, None, location)])
}

fn expand(name: &str) -> Option<Vec<PrimitiveType>> {
    if name == "number" {
        return Some(vec![PrimitiveType::Number, PrimitiveType::Integer]);
    }
    PrimitiveType::try_from(name).ok().map(|t| vec![t])
}

/// Build the condition most other keywords gate themselves on: the instance is one of `types`.
pub(crate) fn condition(pointer: &Pointer, keyword: &str, types: &[PrimitiveType]) -> Template {
    type_condition(pointer, keyword, types)
}
