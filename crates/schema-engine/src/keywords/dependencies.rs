//! `dependencies` and its 2019-09+ split successors `dependentRequired`/`dependentSchemas` (§4.G).
use schema_frame::{Dialect, Pointer};
use serde_json::Value;

use crate::compiler::{compile_value, CompileCtx};
use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};

pub(crate) fn compile_dependencies(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Value::Object(map) = value else {
        return Err(Error::compile(schema_pointer.clone(), "dependencies must be an object"));
    };
    let pointer = schema_pointer.with_key("dependencies");
    let mut steps = Vec::with_capacity(map.len());
    for (key, entry) in map {
        let child_pointer = pointer.with_key(key.clone());
        let defines = defines_condition(schema_pointer, key, "dependencies");
        match entry {
            Value::Array(names) => {
                let keys = string_array(names, &child_pointer)?;
                steps.push(Step::leaf(
                    StepKind::InternalDefinesAll(keys),
                    Target::Instance,
                    Some(vec![defines]),
                    StepLocation::new(child_pointer, "dependencies"),
                ));
            }
            _ => {
                let body = compile_value(ctx, entry, child_pointer.clone(), dialect)?;
                steps.push(Step::with_children(
                    StepKind::InternalContainer,
                    Target::Instance,
                    Some(vec![defines]),
                    body,
                    StepLocation::new(child_pointer, "dependencies"),
                ));
            }
        }
    }
    Ok(steps)
}

pub(crate) fn compile_dependent_required(value: &Value, pointer: &Pointer) -> Result<Template> {
    let Value::Object(map) = value else {
        return Err(Error::compile(pointer.clone(), "dependentRequired must be an object"));
    };
    let mut steps = Vec::with_capacity(map.len());
    for (key, names) in map {
        let Value::Array(names) = names else {
            return Err(Error::compile(pointer.clone(), "dependentRequired entries must be arrays"));
        };
        let child_pointer = pointer.with_key(key.clone());
        let keys = string_array(names, &child_pointer)?;
        let defines = defines_condition(pointer, key, "dependentRequired");
        steps.push(Step::leaf(
            StepKind::InternalDefinesAll(keys),
            Target::Instance,
            Some(vec![defines]),
            StepLocation::new(child_pointer, "dependentRequired"),
        ));
    }
    Ok(steps)
}

pub(crate) fn compile_dependent_schemas(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Value::Object(map) = value else {
        return Err(Error::compile(schema_pointer.clone(), "dependentSchemas must be an object"));
    };
    let pointer = schema_pointer.with_key("dependentSchemas");
    let mut steps = Vec::with_capacity(map.len());
    for (key, subschema) in map {
        let child_pointer = pointer.with_key(key.clone());
        let defines = defines_condition(schema_pointer, key, "dependentSchemas");
        let body = compile_value(ctx, subschema, child_pointer.clone(), dialect)?;
        steps.push(Step::with_children(
            StepKind::InternalContainer,
            Target::Instance,
            Some(vec![defines]),
            body,
            StepLocation::new(child_pointer, "dependentSchemas"),
        ));
    }
    Ok(steps)
}

fn defines_condition(pointer: &Pointer, key: &str, keyword: &'static str) -> Step {
    Step::leaf(
        StepKind::Defines(key.to_string()),
        Target::Instance,
        None,
        StepLocation::new(pointer.clone(), keyword),
    )
}

fn string_array(items: &[Value], pointer: &Pointer) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(Error::compile(pointer.clone(), "expected an array of strings")),
        })
        .collect()
}
