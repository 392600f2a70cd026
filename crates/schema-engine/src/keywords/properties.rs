//! `properties`, `patternProperties`, `additionalProperties`, `propertyNames` (§4.G).
use fancy_regex::Regex;
use schema_frame::{Dialect, Pointer};
use serde_json::Value;

use crate::compiler::{compile_value, CompileCtx};
use crate::error::{Error, Result};
use crate::ir::{DescendInto, Step, StepKind, StepLocation, Target, Template};

pub(crate) fn compile_properties(
    ctx: &CompileCtx,
    _node: &serde_json::Map<String, Value>,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Value::Object(map) = value else {
        return Err(Error::compile(schema_pointer.clone(), "properties must be an object"));
    };
    let properties_pointer = schema_pointer.with_key("properties");
    let mut steps = Vec::with_capacity(map.len());
    for (key, subschema) in map {
        let child_pointer = properties_pointer.with_key(key.clone());
        let mut children = compile_value(ctx, subschema, child_pointer.clone(), dialect)?;
        children.push(Step::leaf(
            StepKind::AnnotationPrivate(Value::Bool(true)),
            Target::Instance,
            None,
            StepLocation::new(properties_pointer.clone(), "properties"),
        ));
        let defines = Step::leaf(
            StepKind::Defines(key.clone()),
            Target::Instance,
            None,
            StepLocation::new(schema_pointer.clone(), "properties"),
        );
        steps.push(Step::with_children(
            StepKind::Descend(DescendInto::Property(key.clone())),
            Target::Instance,
            Some(vec![defines]),
            children,
            StepLocation::new(child_pointer, "properties"),
        ));
    }
    Ok(steps)
}

pub(crate) fn compile_pattern_properties(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let Value::Object(map) = value else {
        return Err(Error::compile(schema_pointer.clone(), "patternProperties must be an object"));
    };
    let pattern_properties_pointer = schema_pointer.with_key("patternProperties");
    let mut steps = Vec::with_capacity(map.len());
    for (pattern, subschema) in map {
        let child_pointer = pattern_properties_pointer.with_key(pattern.clone());
        let regex = Regex::new(pattern)
            .map_err(|_| Error::InvalidPattern { pointer: child_pointer.clone(), pattern: pattern.clone() })?;
        let mut body = compile_value(ctx, subschema, child_pointer.clone(), dialect)?;
        body.push(Step::leaf(
            StepKind::AnnotationPrivate(Value::Bool(true)),
            Target::Instance,
            None,
            StepLocation::new(pattern_properties_pointer.clone(), "patternProperties"),
        ));
        let matches = Step::leaf(
            StepKind::Regex(crate::ir::CompiledRegex { source: pattern.clone(), regex: std::sync::Arc::new(regex) }),
            Target::InstanceBasename,
            None,
            StepLocation::new(child_pointer.clone(), "patternProperties"),
        );
        let gated = Step::with_children(
            StepKind::InternalContainer,
            Target::Instance,
            Some(vec![matches]),
            body,
            StepLocation::new(child_pointer, "patternProperties"),
        );
        steps.push(Step::with_children(
            StepKind::LoopProperties,
            Target::Instance,
            None,
            vec![gated],
            StepLocation::new(pattern_properties_pointer.clone(), "patternProperties"),
        ));
    }
    Ok(steps)
}

pub(crate) fn compile_additional_properties(
    ctx: &CompileCtx,
    _node: &serde_json::Map<String, Value>,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let ap_pointer = schema_pointer.with_key("additionalProperties");
    let body = compile_value(ctx, value, ap_pointer.clone(), dialect)?;
    let not_in_properties = Step::leaf(
        StepKind::InternalNoAnnotation,
        Target::ParentAdjacentAnnotations,
        None,
        StepLocation::new(schema_pointer.with_key("properties"), "properties"),
    );
    let not_in_pattern_properties = Step::leaf(
        StepKind::InternalNoAnnotation,
        Target::ParentAdjacentAnnotations,
        None,
        StepLocation::new(schema_pointer.with_key("patternProperties"), "patternProperties"),
    );
    let gated = Step::with_children(
        StepKind::InternalContainer,
        Target::Instance,
        Some(vec![not_in_properties, not_in_pattern_properties]),
        body,
        StepLocation::new(ap_pointer.clone(), "additionalProperties"),
    );
    Ok(vec![Step::with_children(
        StepKind::LoopProperties,
        Target::Instance,
        None,
        vec![gated],
        StepLocation::new(ap_pointer, "additionalProperties"),
    )])
}

pub(crate) fn compile_property_names(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let pn_pointer = schema_pointer.with_key("propertyNames");
    let body = compile_value(ctx, value, pn_pointer.clone(), dialect)?;
    let descend = Step::with_children(
        StepKind::Descend(DescendInto::BasenameAsInstance),
        Target::Instance,
        None,
        body,
        StepLocation::new(pn_pointer.clone(), "propertyNames"),
    );
    Ok(vec![Step::with_children(
        StepKind::LoopProperties,
        Target::Instance,
        None,
        vec![descend],
        StepLocation::new(pn_pointer, "propertyNames"),
    )])
}
