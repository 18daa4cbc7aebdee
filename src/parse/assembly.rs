//! Model assembly: walks `<ink>` in document order and builds [`Ink`]
//!
//! A `<context>` or `<traceFormat>` directly under `<ink>` replaces the
//! current context for the traces after it. Trace groups push their own
//! context for their members. A `<traceView>` may only select traces,
//! groups and views that come before it.

use crate::models::{Continuation, Ink, Trace, TraceDataKind, TraceGroup, TraceType, TraceView};
use crate::parse::decoder::{decode_trace, DecodeOptions};
use crate::parse::definitions::{read_annotations, read_context, read_trace_format};
use crate::parse::errors::{InkError, InkResult, TraceRef};
use crate::parse::resolver::{Resolver, Scope};
use crate::parse::tree::XmlElement;
use std::collections::HashSet;

/// Traces, groups and views read from one container element
#[derive(Default)]
struct Members {
    traces: Vec<usize>,
    groups: Vec<TraceGroup>,
    views: Vec<TraceView>,
}

pub struct Assembler<'a> {
    resolver: &'a Resolver,
    options: DecodeOptions,
    traces: Vec<Trace>,
    /// Ids of every trace read so far, `<definitions>` included
    seen_ids: HashSet<String>,
    /// Ids of groups and views read so far, for `traceDataRef`
    group_ids: HashSet<String>,
    view_ids: HashSet<String>,
    /// Position of the next trace element in the document
    position: usize,
}

impl<'a> Assembler<'a> {
    pub fn new(resolver: &'a Resolver, options: DecodeOptions) -> Self {
        Self {
            resolver,
            options,
            traces: Vec::new(),
            seen_ids: HashSet::new(),
            group_ids: HashSet::new(),
            view_ids: HashSet::new(),
            position: 0,
        }
    }

    /// Build the document model from the `<ink>` element
    pub fn assemble(mut self, root: &XmlElement) -> InkResult<Ink> {
        let mut current = self.resolver.default_scope();
        let mut groups = Vec::new();
        let mut views = Vec::new();

        for element in root.elements() {
            match element.name.as_str() {
                "trace" => {
                    self.read_trace(element, &current, true)?;
                }
                "traceGroup" => groups.push(self.read_group(element, &current, true)?),
                "context" => {
                    let decl = read_context(element);
                    current = self.resolver.streaming_context(&decl, &current);
                }
                "traceFormat" => {
                    let tf = read_trace_format(element);
                    current = current.map(|c| c.with_trace_format(tf));
                }
                "definitions" => {
                    // Traces here are addressable (priorRef) but not part of the ink
                    let scope = self.resolver.default_scope();
                    self.read_members(element, &scope, false)?;
                }
                "traceView" => views.extend(self.read_trace_view(element)),
                _ => {}
            }
        }

        log::debug!(
            "Assembled {} traces in {} top-level groups, {} top-level views",
            self.traces.len(),
            groups.len(),
            views.len()
        );

        Ok(Ink {
            traces: self.traces,
            groups,
            views,
            annotations: read_annotations(root),
            definitions: self.resolver.definitions(),
        })
    }

    fn read_members(&mut self, container: &XmlElement, scope: &Scope, keep: bool) -> InkResult<Members> {
        let mut members = Members::default();

        for element in container.elements() {
            match element.name.as_str() {
                "trace" => {
                    if let Some(index) = self.read_trace(element, scope, keep)? {
                        members.traces.push(index);
                    }
                }
                "traceGroup" => {
                    let group = self.read_group(element, scope, keep)?;
                    if keep {
                        members.groups.push(group);
                    }
                }
                "traceView" => {
                    if let Some(view) = self.read_trace_view(element) {
                        if keep {
                            members.views.push(view);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(members)
    }

    fn read_group(&mut self, element: &XmlElement, outer: &Scope, keep: bool) -> InkResult<TraceGroup> {
        let context_ref = element.attr_non_empty("contextRef");
        let mut scope = match context_ref {
            Some(r) => self.resolver.context(r),
            None => outer.clone(),
        };

        let brush_id = element.attr_non_empty("brushRef").map(|r| self.resolver.brush_id(r));
        if let Some(brush) = &brush_id {
            scope = scope.map(|c| c.with_brush(brush.clone()));
        }

        let members = self.read_members(element, &scope, keep)?;

        let id = element.id().map(str::to_string);
        if let Some(id) = &id {
            self.group_ids.insert(id.clone());
        }

        Ok(TraceGroup {
            id,
            context_id: context_ref.and_then(|_| scope.as_ref().ok()).and_then(|c| c.id.clone()),
            brush_id,
            traces: members.traces,
            groups: members.groups,
            views: members.views,
            annotations: read_annotations(element),
        })
    }

    /// Decode one `<trace>`; returns its index in `Ink::traces` when kept
    fn read_trace(&mut self, element: &XmlElement, outer: &Scope, keep: bool) -> InkResult<Option<usize>> {
        let id = element.id().map(str::to_string);
        let trace_ref = TraceRef::new(id.as_deref(), self.position);
        self.position += 1;

        let scope = match element.attr_non_empty("contextRef") {
            Some(r) => self.resolver.context(r),
            None => outer.clone(),
        };

        let schema = self
            .resolver
            .schema(&scope, element.attr_non_empty("traceFormatRef"))
            .map_err(|reason| InkError::UnresolvedTraceFormat { trace: trace_ref.clone(), reason })?;

        let decoded = decode_trace(&element.text(), &schema.trace_format, self.options)
            .map_err(|e| e.into_ink_error(trace_ref.clone()))?;

        let brush_id = match element.attr_non_empty("brushRef") {
            Some(r) => Some(self.resolver.brush_id(r)),
            None => schema.brush_id.clone(),
        };

        let trace_type = match element.attr("type") {
            Some(t) => TraceType::from_attr(t).unwrap_or_else(|| {
                log::warn!("Unexpected trace type \"{}\" for trace {}", t, trace_ref);
                TraceType::default()
            }),
            None => TraceType::default(),
        };

        let continuation = element.attr("continuation").and_then(|c| {
            let parsed = Continuation::from_attr(c);
            if parsed.is_none() {
                log::warn!("Unexpected continuation \"{}\" for trace {}", c, trace_ref);
            }
            parsed
        });

        let prior = self.read_prior(element, continuation, &trace_ref);

        if id.is_none() && matches!(continuation, Some(Continuation::Begin | Continuation::Middle)) {
            log::warn!("Trace {} continues in another trace but has no xml:id", trace_ref);
        }

        if let Some(id) = &id {
            self.seen_ids.insert(id.clone());
        }

        if !keep {
            return Ok(None);
        }

        self.traces.push(Trace {
            id,
            context_id: schema.context_id,
            trace_format_id: schema.trace_format.id.clone(),
            brush_id,
            channels: decoded.regular,
            intermittent_channels: decoded.intermittent,
            trace_type,
            continuation,
            prior,
            duration: read_decimal(element, "duration"),
            time_offset: read_decimal(element, "timeOffset"),
        });

        Ok(Some(self.traces.len() - 1))
    }

    /// Read a `<traceView>`; `None` (with a warning) when its `traceDataRef`
    /// is missing or names nothing read so far
    fn read_trace_view(&mut self, element: &XmlElement) -> Option<TraceView> {
        let reference = match element.attr_non_empty("traceDataRef") {
            Some(r) => r,
            None => {
                log::warn!("Skipping traceView without traceDataRef (line {})", element.line);
                return None;
            }
        };

        let target = match self.resolver.local_id(reference) {
            Ok(id) => id,
            Err(reason) => {
                log::warn!("Skipping traceView (line {}): {}", element.line, reason);
                return None;
            }
        };

        let kind = if self.seen_ids.contains(target) {
            TraceDataKind::Trace
        } else if self.group_ids.contains(target) {
            TraceDataKind::TraceGroup
        } else if self.view_ids.contains(target) {
            TraceDataKind::TraceView
        } else {
            log::warn!("Could not find trace data \"{}\" of traceView (line {})", reference, element.line);
            return None;
        };

        let id = element.id().map(str::to_string);
        if let Some(id) = &id {
            self.view_ids.insert(id.clone());
        }

        Some(TraceView {
            id,
            trace_data: target.to_string(),
            trace_data_kind: kind,
            from: read_index_path(element, "from"),
            to: read_index_path(element, "to"),
        })
    }

    /// `priorRef` of a continued trace; it must name an earlier trace
    fn read_prior(&self, element: &XmlElement, continuation: Option<Continuation>, trace_ref: &TraceRef) -> Option<String> {
        let prior_ref = element.attr_non_empty("priorRef");

        match (continuation, prior_ref) {
            (Some(c), None) if c.requires_prior() => {
                log::warn!("Trace {} is a continuation but has no priorRef", trace_ref);
                None
            }
            (_, Some(r)) => match self.resolver.local_id(r) {
                Ok(prior_id) => {
                    if !self.seen_ids.contains(prior_id) {
                        log::warn!("Could not find prior trace \"{}\" of trace {}", r, trace_ref);
                    }
                    Some(prior_id.to_string())
                }
                Err(reason) => {
                    log::warn!("Ignoring priorRef of trace {}: {}", trace_ref, reason);
                    None
                }
            },
            _ => None,
        }
    }
}

/// `:`-separated integers of a traceView bound; empty when absent or invalid
fn read_index_path(element: &XmlElement, attr: &str) -> Vec<i64> {
    let value = match element.attr_non_empty(attr) {
        Some(v) => v,
        None => return Vec::new(),
    };
    match value.split(':').map(|v| v.trim().parse::<i64>()).collect::<Result<Vec<_>, _>>() {
        Ok(path) => path,
        Err(_) => {
            log::warn!("Could not read \"{}\" of traceView as integers: {}", attr, value);
            Vec::new()
        }
    }
}

fn read_decimal(element: &XmlElement, attr: &str) -> Option<f64> {
    let value = element.attr_non_empty(attr)?;
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Attribute \"{}\" is expected to be a number, got \"{}\"", attr, value);
    }
    parsed
}
