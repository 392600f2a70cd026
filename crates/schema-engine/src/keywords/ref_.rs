//! `$ref` / `$dynamicRef` / `$recursiveRef` (§4.G, §9 "Recursion through references").
//!
//! Recursion is unrolled exactly once: the first textual occurrence of a reference
//! destination compiles the destination's schema inline under a `ControlLabel`; every
//! subsequent occurrence of the same destination emits a `ControlJump` instead. This is the
//! crate's sole mechanism for handling schema self-reference; no other keyword needs to know
//! about cycles.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use schema_frame::Pointer;

use crate::compiler::{compile_value, CompileCtx};
use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};

pub(crate) fn compile(ctx: &CompileCtx, schema_pointer: &Pointer, keyword: &'static str) -> Result<Template> {
    let origin = schema_pointer.with_key(keyword);
    let reference = ctx
        .frame
        .references()
        .iter()
        .find(|candidate| candidate.origin == origin)
        .ok_or_else(|| {
            Error::compile(
                schema_pointer.clone(),
                format!("no reference recorded at {origin} by the frame indexer"),
            )
        })?;

    let label = label_id(&reference.destination);
    let location = StepLocation::new(schema_pointer.clone(), keyword);

    let first_occurrence = ctx.labels.borrow_mut().insert(label);
    if !first_occurrence {
        return Ok(vec![Step::leaf(StepKind::ControlJump(label), Target::Instance, None, location)]);
    }

    let entry = ctx.frame.entry_for_destination(&reference.destination).ok_or_else(|| {
        Error::compile(
            schema_pointer.clone(),
            format!("reference destination {} is not an indexed location", reference.destination),
        )
    })?;
    let document = ctx.frame.document(&entry.document_uri).ok_or_else(|| {
        Error::compile(schema_pointer.clone(), format!("document {} is not resident", entry.document_uri))
    })?;
    let target_value = entry.pointer.resolve(&document).ok_or_else(|| {
        Error::compile(schema_pointer.clone(), format!("pointer {} does not resolve in its document", entry.pointer))
    })?;

    let body = compile_value(ctx, target_value, entry.pointer.clone(), entry.dialect)?;
    Ok(vec![Step::with_children(
        StepKind::ControlLabel(label),
        Target::Instance,
        None,
        body,
        location,
    )])
}

/// A label id derived purely from the destination string, so two compiles of the same schema
/// (and two references to the same destination within one compile) agree on it (§3 invariant).
fn label_id(destination: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    destination.hash(&mut hasher);
    hasher.finish()
}
