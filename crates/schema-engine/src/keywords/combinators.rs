//! `allOf`/`anyOf`/`oneOf`/`not`/`if`-`then`-`else` (§4.G).
use schema_frame::{Dialect, Pointer};
use serde_json::Value;

use crate::compiler::{compile_value, CompileCtx};
use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};

fn compile_subschema_array(
    ctx: &CompileCtx,
    items: &[Value],
    pointer: &Pointer,
    keyword: &'static str,
    dialect: Dialect,
) -> Result<Vec<Step>> {
    items
        .iter()
        .enumerate()
        .map(|(index, sub)| {
            let child_pointer = pointer.with_index(index);
            let body = compile_value(ctx, sub, child_pointer.clone(), dialect)?;
            Ok(Step::with_children(
                StepKind::InternalContainer,
                Target::Instance,
                None,
                body,
                StepLocation::new(child_pointer, keyword),
            ))
        })
        .collect()
}

fn compile_combinator(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
    keyword: &'static str,
    kind: StepKind,
) -> Result<Template> {
    let Value::Array(items) = value else {
        return Err(Error::compile(schema_pointer.clone(), format!("{keyword} must be an array")));
    };
    let pointer = schema_pointer.with_key(keyword);
    let children = compile_subschema_array(ctx, items, &pointer, keyword, dialect)?;
    Ok(vec![Step::with_children(kind, Target::Instance, None, children, StepLocation::new(pointer, keyword))])
}

pub(crate) fn compile_all_of(ctx: &CompileCtx, value: &Value, schema_pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    compile_combinator(ctx, value, schema_pointer, dialect, "allOf", StepKind::And)
}

pub(crate) fn compile_any_of(ctx: &CompileCtx, value: &Value, schema_pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    compile_combinator(ctx, value, schema_pointer, dialect, "anyOf", StepKind::Or)
}

pub(crate) fn compile_one_of(ctx: &CompileCtx, value: &Value, schema_pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    compile_combinator(ctx, value, schema_pointer, dialect, "oneOf", StepKind::Xor)
}

pub(crate) fn compile_not(ctx: &CompileCtx, value: &Value, schema_pointer: &Pointer, dialect: Dialect) -> Result<Template> {
    let pointer = schema_pointer.with_key("not");
    let body = compile_value(ctx, value, pointer.clone(), dialect)?;
    Ok(vec![Step::with_children(StepKind::Not, Target::Instance, None, body, StepLocation::new(pointer, "not"))])
}

/// Supplemental (Draft 7+): dropped by the distilled spec's keyword list but present in every
/// dialect from Draft 7 onward and in the original implementation's default compiler.
pub(crate) fn compile_if(
    ctx: &CompileCtx,
    node: &serde_json::Map<String, Value>,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Some(if_value) = node.get("if") else {
        return Ok(Vec::new());
    };
    let if_pointer = schema_pointer.with_key("if");
    let if_body = compile_value(ctx, if_value, if_pointer.clone(), dialect)?;

    let mut steps = Vec::new();
    if let Some(then_value) = node.get("then") {
        let then_pointer = schema_pointer.with_key("then");
        let then_body = compile_value(ctx, then_value, then_pointer.clone(), dialect)?;
        steps.push(Step::with_children(
            StepKind::InternalContainer,
            Target::Instance,
            Some(if_body.clone()),
            then_body,
            StepLocation::new(then_pointer, "then"),
        ));
    }
    if let Some(else_value) = node.get("else") {
        let else_pointer = schema_pointer.with_key("else");
        let else_body = compile_value(ctx, else_value, else_pointer.clone(), dialect)?;
        let if_fails = Step::with_children(
            StepKind::Not,
            Target::Instance,
            None,
            if_body,
            StepLocation::new(if_pointer, "if"),
        );
        steps.push(Step::with_children(
            StepKind::InternalContainer,
            Target::Instance,
            Some(vec![if_fails]),
            else_body,
            StepLocation::new(else_pointer, "else"),
        ));
    }
    Ok(steps)
}
