//! `items`, `additionalItems`, `prefixItems`, `contains`/`minContains`/`maxContains` (§4.G).
use schema_frame::{Dialect, Pointer};
use serde_json::Value;

use crate::compiler::{compile_value, CompileCtx};
use crate::error::{Error, Result};
use crate::ir::{DescendInto, Step, StepKind, StepLocation, Target, Template};

pub(crate) fn compile_items(
    ctx: &CompileCtx,
    node: &serde_json::Map<String, Value>,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let items_pointer = schema_pointer.with_key("items");
    match value {
        Value::Array(items) if dialect != Dialect::Draft202012 => {
            compile_tuple(ctx, items, &items_pointer, dialect)
        }
        _ => {
            let start = if dialect == Dialect::Draft202012 {
                node.get("prefixItems").and_then(Value::as_array).map_or(0, Vec::len)
            } else {
                0
            };
            let body = compile_value(ctx, value, items_pointer.clone(), dialect)?;
            Ok(vec![Step::with_children(
                StepKind::LoopItems(start),
                Target::Instance,
                None,
                body,
                StepLocation::new(items_pointer, "items"),
            )])
        }
    }
}

pub(crate) fn compile_prefix_items(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Value::Array(items) = value else {
        return Err(Error::compile(schema_pointer.clone(), "prefixItems must be an array"));
    };
    let pointer = schema_pointer.with_key("prefixItems");
    compile_tuple(ctx, items, &pointer, dialect)
}

fn compile_tuple(ctx: &CompileCtx, items: &[Value], pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    let mut steps = Vec::with_capacity(items.len());
    for (index, subschema) in items.iter().enumerate() {
        let child_pointer = pointer.with_index(index);
        let body = compile_value(ctx, subschema, child_pointer.clone(), dialect)?;
        let exists = Step::leaf(
            StepKind::SizeGreater(index as u64),
            Target::Instance,
            None,
            StepLocation::new(pointer.clone(), "items"),
        );
        steps.push(Step::with_children(
            StepKind::Descend(DescendInto::Item(index)),
            Target::Instance,
            Some(vec![exists]),
            body,
            StepLocation::new(child_pointer, "items"),
        ));
    }
    Ok(steps)
}

pub(crate) fn compile_additional_items(
    ctx: &CompileCtx,
    node: &serde_json::Map<String, Value>,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Some(Value::Array(tuple)) = node.get("items") else {
        return Ok(Vec::new());
    };
    let pointer = schema_pointer.with_key("additionalItems");
    let body = compile_value(ctx, value, pointer.clone(), dialect)?;
    Ok(vec![Step::with_children(
        StepKind::LoopItems(tuple.len()),
        Target::Instance,
        None,
        body,
        StepLocation::new(pointer, "additionalItems"),
    )])
}

pub(crate) fn compile_contains(
    ctx: &CompileCtx,
    node: &serde_json::Map<String, Value>,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let pointer = schema_pointer.with_key("contains");
    let min = node.get("minContains").and_then(Value::as_u64).unwrap_or(1);
    let max = node.get("maxContains").and_then(Value::as_u64);
    let body = compile_value(ctx, value, pointer.clone(), dialect)?;
    Ok(vec![Step::with_children(
        StepKind::Contains { min, max },
        Target::Instance,
        None,
        body,
        StepLocation::new(pointer, "contains"),
    )])
}
