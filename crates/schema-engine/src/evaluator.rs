//! The bounded interpreter (§4.H): walks a compiled [`Template`] against a JSON instance,
//! knowing nothing about JSON Schema keywords, only about the primitive step vocabulary in
//! [`crate::ir`].
use std::borrow::Cow;
use std::collections::HashMap;

use schema_frame::{PathChunk, Pointer};
use serde_json::{Number, Value};

use crate::diagnostics::describe_step;
use crate::equal::equal;
use crate::error::{Error, Result};
use crate::formats;
use crate::ir::{DescendInto, Step, StepKind, Target, Template};
use crate::options::{EvaluationOptions, Mode};
use crate::primitive_type::PrimitiveType;
use crate::unique::is_unique;

/// Cooperative cancellation, checked at every step boundary (§5).
pub trait CancellationToken: Send + Sync {
    /// Returns `true` once evaluation should stop.
    fn is_cancelled(&self) -> bool;
}

/// A token that never cancels, for callers with nothing to cooperate with.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// The diagnostic callback contract (§6): invoked once per step, after it runs, with the
/// step's verdict, its schema-side path, the instance location it ran against, the value it
/// read, and the annotation it produced (if any).
pub type DiagnosticCallback<'a> = dyn FnMut(bool, &Step, &Pointer, &Pointer, &Value, Option<&Value>) + 'a;

/// Evaluate `template` against `instance`.
///
/// # Errors
///
/// Returns [`Error::RecursionLimitExceeded`] if following `ControlJump` steps exceeds
/// `options`'s recursion limit, and [`Error::Cancelled`] if `cancellation` fires mid-evaluation.
pub fn evaluate<'i>(
    template: &Template,
    instance: &'i Value,
    options: &EvaluationOptions,
    cancellation: &dyn CancellationToken,
    callback: &mut DiagnosticCallback<'_>,
) -> Result<bool> {
    let _span = tracing::trace_span!("evaluate").entered();
    let mut evaluator = Evaluator {
        options,
        cancellation,
        root: instance,
        annotations: HashMap::new(),
        label_stack: HashMap::new(),
        depth: 0,
    };
    evaluator.run_all(template, instance, &Pointer::root(), callback)
}

struct Evaluator<'t, 'i> {
    options: &'t EvaluationOptions,
    cancellation: &'t dyn CancellationToken,
    root: &'i Value,
    annotations: HashMap<(Pointer, Pointer), Vec<Value>>,
    label_stack: HashMap<u64, &'t Template>,
    depth: usize,
}

impl<'t, 'i> Evaluator<'t, 'i> {
    /// Run an implicit `AND` over sibling steps: a [`Template`] and a logical `And`'s
    /// children are evaluated identically (§4.H).
    fn run_all(
        &mut self,
        steps: &'t [Step],
        current: &Value,
        instance_location: &Pointer,
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        let mut overall = true;
        for step in steps {
            let ok = self.run_step(step, current, instance_location, callback)?;
            if !ok {
                overall = false;
                if self.options.mode == Mode::Fast {
                    return Ok(false);
                }
            }
        }
        Ok(overall)
    }

    fn run_any(
        &mut self,
        steps: &'t [Step],
        current: &Value,
        instance_location: &Pointer,
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        let mut any = false;
        for step in steps {
            if self.run_step(step, current, instance_location, callback)? {
                any = true;
                if self.options.mode == Mode::Fast {
                    return Ok(true);
                }
            }
        }
        Ok(any)
    }

    fn run_exactly_one(
        &mut self,
        steps: &'t [Step],
        current: &Value,
        instance_location: &Pointer,
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        let mut count = 0u32;
        for step in steps {
            if self.run_step(step, current, instance_location, callback)? {
                count += 1;
                if self.options.mode == Mode::Fast && count > 1 {
                    return Ok(false);
                }
            }
        }
        Ok(count == 1)
    }

    /// Evaluate a condition Template without invoking the caller's callback: conditions are
    /// compiler-internal gates, not author-facing assertions (§4.H step 1).
    fn run_silent(&mut self, steps: &'t [Step], current: &Value, instance_location: &Pointer) -> Result<bool> {
        self.run_all(steps, current, instance_location, &mut |_, _, _, _, _, _| {})
    }

    fn check_cancellation(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    fn parent_value(&self, instance_location: &Pointer) -> &'i Value {
        let depth = instance_location.iter().count();
        if depth == 0 {
            return self.root;
        }
        let parent_pointer: Pointer = instance_location.iter().take(depth - 1).cloned().collect();
        parent_pointer.resolve(self.root).unwrap_or(self.root)
    }

    fn resolve_target<'v>(&self, target: &Target, current: &'v Value, instance_location: &Pointer) -> Cow<'v, Value>
    where
        'i: 'v,
    {
        match target {
            Target::Instance | Target::ParentAdjacentAnnotations => Cow::Borrowed(current),
            Target::InstanceBasename => match instance_location.last() {
                Some(PathChunk::Key(key)) => Cow::Owned(Value::String(key.clone())),
                Some(PathChunk::Index(index)) => Cow::Owned(Value::Number((*index as u64).into())),
                Some(PathChunk::Keyword(keyword)) => Cow::Owned(Value::String((*keyword).to_string())),
                None => Cow::Borrowed(current),
            },
            Target::InstanceParent => Cow::Borrowed(self.parent_value(instance_location)),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn run_step(
        &mut self,
        step: &'t Step,
        current: &Value,
        instance_location: &Pointer,
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        self.check_cancellation()?;

        if let Some(condition) = &step.condition {
            if !self.run_silent(condition, current, instance_location)? {
                return Ok(true);
            }
        }

        let resolved = self.resolve_target(&step.target, current, instance_location);
        let value: &Value = &resolved;

        let mut annotation: Option<Value> = None;
        let result = match &step.kind {
            StepKind::TypeStrict(t) => matches_type(value, *t),
            StepKind::TypeStrictAny(ts) => ts.iter().any(|t| matches_type(value, *t)),
            StepKind::Equal(v) => equal(value, v),
            StepKind::EqualsAny(vs) => vs.iter().any(|v| equal(value, v)),
            StepKind::Defines(key) => value.as_object().is_some_and(|o| o.contains_key(key)),
            StepKind::DefinesAll(keys) => value.as_object().is_some_and(|o| keys.iter().all(|k| o.contains_key(k))),
            StepKind::Less(n) => value.as_f64().is_some_and(|v| v < *n),
            StepKind::LessEqual(n) => value.as_f64().is_some_and(|v| v <= *n),
            StepKind::Greater(n) => value.as_f64().is_some_and(|v| v > *n),
            StepKind::GreaterEqual(n) => value.as_f64().is_some_and(|v| v >= *n),
            StepKind::Divisible(n) => value.as_f64().is_some_and(|v| is_divisible(v, *n)),
            StepKind::SizeLess(n) => size_of(value).is_some_and(|s| s < *n),
            StepKind::SizeGreater(n) => size_of(value).is_some_and(|s| s > *n),
            StepKind::Unique => value.as_array().is_some_and(|items| is_unique(items)),
            StepKind::Regex(re) => value.as_str().is_some_and(|s| re.regex.is_match(s).unwrap_or(false)),
            StepKind::StringFormat(f) => value.as_str().is_some_and(|s| formats::conforms(*f, s)),
            StepKind::Never => false,

            StepKind::And => self.run_all(children_of(step), current, instance_location, callback)?,
            StepKind::Or => self.run_any(children_of(step), current, instance_location, callback)?,
            StepKind::Xor => self.run_exactly_one(children_of(step), current, instance_location, callback)?,
            StepKind::Not => !self.run_silent(children_of(step), current, instance_location)?,

            StepKind::LoopItems(start) => {
                self.loop_items(*start, value, instance_location, children_of(step), callback)?
            }
            StepKind::LoopProperties => {
                self.loop_properties(value, instance_location, children_of(step), callback)?
            }
            StepKind::Contains { min, max } => self.contains(*min, *max, value, instance_location, children_of(step))?,

            StepKind::AnnotationPublic(v) => {
                self.record_annotation(step, instance_location, v.clone());
                annotation = Some(v.clone());
                true
            }
            StepKind::AnnotationPrivate(v) => {
                // Recorded for `InternalNoAnnotation` to observe; stripped before reaching the
                // caller's callback (§9 "Private vs public annotations").
                self.record_annotation(step, instance_location, v.clone());
                true
            }

            StepKind::ControlLabel(id) => {
                let body = step.children.as_ref().expect("ControlLabel always carries a body");
                self.label_stack.insert(*id, body);
                self.run_all(children_of(step), current, instance_location, callback)?
            }
            StepKind::ControlJump(id) => self.run_jump(*id, current, instance_location, callback)?,

            StepKind::InternalContainer => self.run_all(children_of(step), current, instance_location, callback)?,
            StepKind::InternalNoAnnotation => {
                !self.annotations.contains_key(&(step.location.schema_pointer.clone(), instance_location.clone()))
            }
            StepKind::InternalDefinesAll(keys) => {
                value.as_object().is_some_and(|o| keys.iter().all(|k| o.contains_key(k)))
            }
            StepKind::Descend(into) => self.descend(into, value, instance_location, children_of(step), callback)?,
        };

        callback(result, step, &step.location.schema_pointer, instance_location, value, annotation.as_ref());
        tracing::trace!(
            result,
            evaluate_path = %step.location.schema_pointer,
            instance_location = %instance_location,
            description = %describe_step(step),
            "step evaluated"
        );
        Ok(result)
    }

    fn run_jump(
        &mut self,
        id: u64,
        current: &Value,
        instance_location: &Pointer,
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        self.depth += 1;
        if self.depth > self.options.recursion_limit {
            return Err(Error::RecursionLimitExceeded(self.options.recursion_limit));
        }
        let body = *self
            .label_stack
            .get(&id)
            .expect("ControlJump only ever targets a label the compiler already registered");
        let result = self.run_all(body, current, instance_location, callback);
        self.depth -= 1;
        result
    }

    fn loop_items(
        &mut self,
        start: usize,
        value: &Value,
        instance_location: &Pointer,
        children: &'t [Step],
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        let Some(items) = value.as_array() else {
            return Ok(true);
        };
        let mut overall = true;
        for (index, item) in items.iter().enumerate().skip(start) {
            let item_location = instance_location.with_index(index);
            if !self.run_all(children, item, &item_location, callback)? {
                overall = false;
                if self.options.mode == Mode::Fast {
                    return Ok(false);
                }
            }
        }
        Ok(overall)
    }

    fn loop_properties(
        &mut self,
        value: &Value,
        instance_location: &Pointer,
        children: &'t [Step],
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        let Some(map) = value.as_object() else {
            return Ok(true);
        };
        let mut overall = true;
        for (key, prop_value) in map {
            let prop_location = instance_location.with_key(key.clone());
            if !self.run_all(children, prop_value, &prop_location, callback)? {
                overall = false;
                if self.options.mode == Mode::Fast {
                    return Ok(false);
                }
            }
        }
        Ok(overall)
    }

    /// Count how many array items satisfy `children`, silently (contains is an aggregate,
    /// not a per-item assertion).
    fn contains(
        &mut self,
        min: u64,
        max: Option<u64>,
        value: &Value,
        instance_location: &Pointer,
        children: &'t [Step],
    ) -> Result<bool> {
        let Some(items) = value.as_array() else {
            return Ok(min == 0);
        };
        let mut count = 0u64;
        for item in items {
            if self.run_silent(children, item, instance_location)? {
                count += 1;
            }
        }
        Ok(count >= min && max.is_none_or(|m| count <= m))
    }

    fn descend(
        &mut self,
        into: &DescendInto,
        value: &Value,
        instance_location: &Pointer,
        children: &'t [Step],
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        match into {
            DescendInto::Property(key) => {
                let Some(nested) = value.as_object().and_then(|o| o.get(key)) else {
                    return Ok(true);
                };
                let nested_location = instance_location.with_key(key.clone());
                self.run_all(children, nested, &nested_location, callback)
            }
            DescendInto::Item(index) => {
                let Some(nested) = value.as_array().and_then(|a| a.get(*index)) else {
                    return Ok(true);
                };
                let nested_location = instance_location.with_index(*index);
                self.run_all(children, nested, &nested_location, callback)
            }
            DescendInto::BasenameAsInstance => {
                let basename = match instance_location.last() {
                    Some(PathChunk::Key(key)) => Value::String(key.clone()),
                    Some(PathChunk::Index(index)) => Value::Number((*index as u64).into()),
                    _ => return Ok(true),
                };
                self.run_all(children, &basename, instance_location, callback)
            }
        }
    }

    fn record_annotation(&mut self, step: &Step, instance_location: &Pointer, value: Value) {
        let key = (step.location.schema_pointer.clone(), instance_location.clone());
        self.annotations.entry(key).or_default().push(value);
    }
}

fn children_of(step: &Step) -> &[Step] {
    step.children.as_deref().unwrap_or(&[])
}

fn matches_type(value: &Value, expected: PrimitiveType) -> bool {
    match (value, expected) {
        (Value::Array(_), PrimitiveType::Array)
        | (Value::Bool(_), PrimitiveType::Boolean)
        | (Value::Null, PrimitiveType::Null)
        | (Value::Number(_), PrimitiveType::Number)
        | (Value::Object(_), PrimitiveType::Object)
        | (Value::String(_), PrimitiveType::String) => true,
        (Value::Number(n), PrimitiveType::Integer) => is_integer(n),
        _ => false,
    }
}

fn is_integer(num: &Number) -> bool {
    num.is_u64() || num.is_i64() || num.as_f64().expect("Always valid").fract() == 0.
}

fn is_divisible(value: f64, divisor: f64) -> bool {
    if divisor.fract() == 0. {
        value.fract() == 0. && (value % divisor) == 0.
    } else {
        let remainder = (value / divisor) % 1.;
        remainder < f64::EPSILON
    }
}

fn size_of(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => Some(bytecount::num_chars(s.as_bytes()) as u64),
        Value::Array(items) => Some(items.len() as u64),
        Value::Object(map) => Some(map.len() as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CompiledRegex, StepLocation};
    use serde_json::json;

    fn loc(keyword: &'static str) -> StepLocation {
        StepLocation::new(Pointer::root().with_key(keyword), keyword)
    }

    #[test]
    fn type_strict_distinguishes_integer_from_number() {
        let template = vec![Step::leaf(StepKind::TypeStrict(PrimitiveType::Integer), Target::Instance, None, loc("type"))];
        let options = EvaluationOptions::new();
        let mut noop = |_: bool, _: &Step, _: &Pointer, _: &Pointer, _: &Value, _: Option<&Value>| {};
        assert!(evaluate(&template, &json!(4), &options, &NeverCancelled, &mut noop).unwrap());
        assert!(!evaluate(&template, &json!(4.5), &options, &NeverCancelled, &mut noop).unwrap());
        assert!(evaluate(&template, &json!(4.0), &options, &NeverCancelled, &mut noop).unwrap());
    }

    #[test]
    fn and_short_circuits_in_fast_mode() {
        let template = vec![
            Step::leaf(StepKind::Never, Target::Instance, None, loc("x")),
            Step::leaf(StepKind::Never, Target::Instance, None, loc("y")),
        ];
        let options = EvaluationOptions::new();
        let mut calls = 0u32;
        let mut count = |_: bool, _: &Step, _: &Pointer, _: &Pointer, _: &Value, _: Option<&Value>| calls += 1;
        assert!(!evaluate(&template, &json!(1), &options, &NeverCancelled, &mut count).unwrap());
        assert_eq!(calls, 1);
    }

    #[test]
    fn exhaustive_mode_visits_every_step() {
        let template = vec![
            Step::leaf(StepKind::Never, Target::Instance, None, loc("x")),
            Step::leaf(StepKind::Never, Target::Instance, None, loc("y")),
        ];
        let options = EvaluationOptions::new().mode(Mode::Exhaustive);
        let mut calls = 0u32;
        let mut count = |_: bool, _: &Step, _: &Pointer, _: &Pointer, _: &Value, _: Option<&Value>| calls += 1;
        assert!(!evaluate(&template, &json!(1), &options, &NeverCancelled, &mut count).unwrap());
        assert_eq!(calls, 2);
    }

    #[test]
    fn control_jump_reenters_the_labeled_body() {
        let label_body = vec![Step::leaf(StepKind::TypeStrict(PrimitiveType::Object), Target::Instance, None, loc("$ref"))];
        let template = vec![
            Step::with_children(StepKind::ControlLabel(1), Target::Instance, None, label_body, loc("$ref")),
            Step::leaf(StepKind::ControlJump(1), Target::Instance, None, loc("$ref")),
        ];
        let options = EvaluationOptions::new();
        let mut noop = |_: bool, _: &Step, _: &Pointer, _: &Pointer, _: &Value, _: Option<&Value>| {};
        assert!(evaluate(&template, &json!({}), &options, &NeverCancelled, &mut noop).unwrap());
        assert!(!evaluate(&template, &json!([]), &options, &NeverCancelled, &mut noop).unwrap());
    }

    #[test]
    fn regex_step_matches_basename_for_pattern_properties() {
        let regex = CompiledRegex { source: "^x".to_string(), regex: std::sync::Arc::new(fancy_regex::Regex::new("^x").unwrap()) };
        let gated = Step::leaf(StepKind::Regex(regex), Target::InstanceBasename, None, loc("patternProperties"));
        let loop_step = Step::with_children(StepKind::LoopProperties, Target::Instance, None, vec![gated], loc("patternProperties"));
        let options = EvaluationOptions::new();
        let mut noop = |_: bool, _: &Step, _: &Pointer, _: &Pointer, _: &Value, _: Option<&Value>| {};
        assert!(evaluate(&[loop_step], &json!({"xyz": 1}), &options, &NeverCancelled, &mut noop).unwrap());
    }
}
