//! Definition resolver
//!
//! Collects every named definition of a document, resolves `#id`
//! references between them, and works out the channel schema each trace is
//! decoded under.
//!
//! Reference failures are not reported while collecting. A broken context
//! only matters once a trace is decoded under it, so resolution results are
//! `Result<_, String>` and the caller attributes the reason to the trace.

use crate::models::{
    Brush, Context, Definitions, InkSource, Timestamp, TraceFormat, DEFAULT_BRUSH_ID, DEFAULT_CONTEXT_ID,
    DEFAULT_TRACE_FORMAT_ID,
};
use crate::parse::definitions::{
    read_brush, read_context, read_ink_source, read_timestamp, read_trace_format, Binding, ContextDecl,
};
use crate::parse::tree::XmlElement;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Definitions keyed by id, in declaration order
#[derive(Debug, Clone)]
struct Named<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Named<T> {
    fn new() -> Self {
        Self { items: Vec::new(), index: HashMap::new() }
    }

    /// Insert a definition; a repeated id replaces the earlier one
    fn insert(&mut self, kind: &str, id: &str, item: T) {
        match self.index.get(id) {
            Some(&i) => {
                log::warn!("Duplicate {} id \"{}\", the later definition wins", kind, id);
                self.items[i] = item;
            }
            None => {
                self.index.insert(id.to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Insert unless the id is already taken
    fn insert_new(&mut self, id: &str, item: T) {
        if !self.index.contains_key(id) {
            self.index.insert(id.to_string(), self.items.len());
            self.items.push(item);
        }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

/// The context a trace is decoded under, with inheritance already applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveContext {
    /// Id of the innermost named context; `None` for the built-in default
    pub id: Option<String>,
    pub trace_format: Option<Rc<TraceFormat>>,
    pub ink_source: Option<Rc<InkSource>>,
    pub brush: Option<String>,
}

impl ActiveContext {
    /// Same context with a different trace format (a `<traceFormat>` in stream)
    pub fn with_trace_format(&self, trace_format: TraceFormat) -> Self {
        Self { trace_format: Some(Rc::new(trace_format)), ..self.clone() }
    }

    pub fn with_brush(&self, brush: String) -> Self {
        Self { brush: Some(brush), ..self.clone() }
    }
}

/// Declarations met while collecting
#[derive(Default)]
struct Declared {
    /// Every context, in document order
    contexts: Vec<ContextDecl>,
    /// Contexts under `<definitions>`; top-level ones only apply from their
    /// position in the trace stream
    definition_contexts: Vec<ContextDecl>,
    /// Ids of trace formats declared under `<definitions>`
    definition_formats: Vec<String>,
}

/// Context resolution outcome; the error is a reason to report against a trace
pub type Scope = Result<ActiveContext, String>;

/// Everything needed to decode one trace
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSchema {
    pub context_id: Option<String>,
    pub trace_format: Rc<TraceFormat>,
    pub brush_id: Option<String>,
}

pub struct Resolver {
    assume_local_refs: bool,
    trace_formats: Named<Rc<TraceFormat>>,
    ink_sources: Named<Rc<InkSource>>,
    brushes: Named<Brush>,
    timestamps: Named<Timestamp>,
    contexts: Named<ContextDecl>,
    /// Context declaration that becomes the default context
    default_decl: Option<ContextDecl>,
    /// Trace format used when no context supplies one
    fallback_format: Rc<TraceFormat>,
}

impl Resolver {
    /// Collect the definitions of a document rooted at `<ink>`
    pub fn collect(root: &XmlElement, assume_local_refs: bool) -> Self {
        let mut resolver = Self {
            assume_local_refs,
            trace_formats: Named::new(),
            ink_sources: Named::new(),
            brushes: Named::new(),
            timestamps: Named::new(),
            contexts: Named::new(),
            default_decl: None,
            fallback_format: Rc::new(TraceFormat::default_format()),
        };

        let mut declared = Declared::default();
        for element in root.elements() {
            match element.name.as_str() {
                "definitions" => {
                    for item in element.elements() {
                        resolver.collect_item(item, true, &mut declared);
                    }
                }
                "context" | "traceFormat" => resolver.collect_item(element, false, &mut declared),
                _ => {}
            }
        }

        // Inline items with ids are addressable from elsewhere too
        for decl in &declared.contexts {
            if let Some(Binding::Inline(tf)) = &decl.trace_format {
                if let Some(id) = &tf.id {
                    resolver.trace_formats.insert_new(id, Rc::new(tf.clone()));
                }
            }
            if let Some(Binding::Inline(source)) = &decl.ink_source {
                resolver.register_ink_source(source.clone(), false);
            }
            if let Some(Binding::Inline(brush)) = &decl.brush {
                if let Some(id) = &brush.id {
                    resolver.brushes.insert_new(id, brush.clone());
                }
            }
            if let Some(Binding::Inline(ts)) = &decl.timestamp {
                resolver.timestamps.insert_new(&ts.id, ts.clone());
            }
        }

        resolver.resolve_brush_parents();
        resolver.resolve_timestamp_parents();

        let defined = &declared.definition_contexts;
        resolver.default_decl = defined
            .iter()
            .rev()
            .find(|decl| decl.id.as_deref() == Some(DEFAULT_CONTEXT_ID))
            .or_else(|| defined.first())
            .cloned();

        resolver.fallback_format = resolver.pick_fallback_format(&declared);

        log::debug!(
            "Collected {} trace formats, {} ink sources, {} contexts, {} brushes, {} timestamps",
            resolver.trace_formats.items.len(),
            resolver.ink_sources.items.len(),
            resolver.contexts.items.len(),
            resolver.brushes.items.len(),
            resolver.timestamps.items.len()
        );

        resolver
    }

    fn collect_item(&mut self, element: &XmlElement, in_definitions: bool, declared: &mut Declared) {
        match element.name.as_str() {
            "traceFormat" => {
                let tf = read_trace_format(element);
                if let Some(id) = tf.id.clone() {
                    if in_definitions {
                        declared.definition_formats.push(id.clone());
                    }
                    self.trace_formats.insert("traceFormat", &id, Rc::new(tf));
                }
            }
            "inkSource" => {
                if let Some(source) = read_ink_source(element) {
                    if let Some(id) = source.trace_format.id.clone() {
                        declared.definition_formats.push(id);
                    }
                    self.register_ink_source(source, true);
                }
            }
            "brush" => {
                let brush = read_brush(element);
                match brush.id.clone() {
                    Some(id) => self.brushes.insert("brush", &id, brush),
                    None => log::warn!("Skipping brush without xml:id (line {})", element.line),
                }
            }
            "timestamp" => {
                if let Some(ts) = read_timestamp(element) {
                    let id = ts.id.clone();
                    self.timestamps.insert("timestamp", &id, ts);
                }
            }
            "context" => {
                let decl = read_context(element);
                if let Some(id) = decl.id.clone() {
                    self.contexts.insert("context", &id, decl.clone());
                }
                if in_definitions {
                    declared.definition_contexts.push(decl.clone());
                }
                declared.contexts.push(decl);
            }
            _ => {}
        }
    }

    /// An ink source's trace format is addressable by its own id as well
    fn register_ink_source(&mut self, source: InkSource, replace: bool) {
        if let Some(tf_id) = source.trace_format.id.clone() {
            self.trace_formats.insert_new(&tf_id, Rc::new(source.trace_format.clone()));
        }
        let id = source.id.clone();
        if replace {
            self.ink_sources.insert("inkSource", &id, Rc::new(source));
        } else {
            self.ink_sources.insert_new(&id, Rc::new(source));
        }
    }

    /// `DefaultTraceFormat` if defined, else the only trace format under
    /// `<definitions>` when no context is defined there, else decimal X and Y
    fn pick_fallback_format(&self, declared: &Declared) -> Rc<TraceFormat> {
        let mut ids: Vec<&str> = declared.definition_formats.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();

        let chosen = if ids.contains(&DEFAULT_TRACE_FORMAT_ID) {
            Some(DEFAULT_TRACE_FORMAT_ID)
        } else if declared.definition_contexts.is_empty() && ids.len() == 1 {
            Some(ids[0])
        } else {
            None
        };

        chosen
            .and_then(|id| self.trace_formats.get(id))
            .map(Rc::clone)
            .unwrap_or_else(|| Rc::new(TraceFormat::default_format()))
    }

    // ========================================================================
    // References
    // ========================================================================

    /// Local id of a reference: `#id`, or a bare id when local refs are assumed
    pub fn local_id<'a>(&self, reference: &'a str) -> Result<&'a str, String> {
        match reference.strip_prefix('#') {
            Some(id) if !id.is_empty() => Ok(id),
            _ if self.assume_local_refs && !reference.is_empty() && !reference.contains('#') => Ok(reference),
            _ => Err(format!("external reference \"{}\" is not supported", reference)),
        }
    }

    /// Normalized id for a reference kept in the model; unresolvable
    /// references are kept as written
    fn normalized(&self, reference: &str) -> String {
        self.local_id(reference).unwrap_or(reference).to_string()
    }

    pub fn trace_format(&self, reference: &str) -> Result<Rc<TraceFormat>, String> {
        let id = self.local_id(reference)?;
        self.trace_formats
            .get(id)
            .cloned()
            .ok_or_else(|| format!("trace format \"{}\" is not defined", reference))
    }

    fn ink_source(&self, reference: &str) -> Result<Rc<InkSource>, String> {
        let id = self.local_id(reference)?;
        self.ink_sources
            .get(id)
            .cloned()
            .ok_or_else(|| format!("ink source \"{}\" is not defined", reference))
    }

    /// Brush id of a `brushRef`; unknown brushes are logged and kept as written
    pub fn brush_id(&self, reference: &str) -> String {
        match self.local_id(reference) {
            Ok(id) if self.brushes.contains(id) || id == DEFAULT_BRUSH_ID => id.to_string(),
            _ => {
                log::warn!("Could not find brush \"{}\"", reference);
                reference.to_string()
            }
        }
    }

    // ========================================================================
    // Contexts
    // ========================================================================

    /// The context traces use when nothing else applies
    pub fn default_scope(&self) -> Scope {
        match &self.default_decl {
            Some(decl) => self.resolve_decl(decl, None, &mut Vec::new()),
            None => Ok(ActiveContext::default()),
        }
    }

    /// Resolve a `contextRef`
    pub fn context(&self, reference: &str) -> Scope {
        self.resolve_ref(reference, &mut Vec::new())
    }

    /// Resolve a `<context>` met while streaming: without `contextRef` it
    /// modifies the current context
    pub fn streaming_context(&self, decl: &ContextDecl, current: &Scope) -> Scope {
        if decl.parent_ref.is_some() {
            return self.resolve_decl(decl, None, &mut Vec::new());
        }
        match current {
            Ok(base) => self.resolve_decl(decl, Some(base), &mut Vec::new()),
            Err(reason) => Err(reason.clone()),
        }
    }

    fn resolve_ref(&self, reference: &str, visiting: &mut Vec<String>) -> Scope {
        let id = self.local_id(reference)?;

        if id == DEFAULT_CONTEXT_ID && !self.contexts.contains(id) {
            return Ok(ActiveContext::default());
        }
        if visiting.iter().any(|v| v == id) {
            return Err(format!("context \"{}\" inherits from itself", reference));
        }

        let decl = self
            .contexts
            .get(id)
            .ok_or_else(|| format!("context \"{}\" is not defined", reference))?;

        visiting.push(id.to_string());
        self.resolve_decl(decl, None, visiting)
    }

    fn resolve_decl(&self, decl: &ContextDecl, inherited: Option<&ActiveContext>, visiting: &mut Vec<String>) -> Scope {
        let base = match &decl.parent_ref {
            Some(parent) => self.resolve_ref(parent, visiting)?,
            None => inherited.cloned().unwrap_or_default(),
        };

        let trace_format = match &decl.trace_format {
            Some(Binding::Inline(tf)) => Some(Rc::new(tf.clone())),
            Some(Binding::Ref(r)) => Some(self.trace_format(r)?),
            None => base.trace_format,
        };

        let ink_source = match &decl.ink_source {
            Some(Binding::Inline(source)) => Some(Rc::new(source.clone())),
            Some(Binding::Ref(r)) => Some(self.ink_source(r)?),
            None => base.ink_source,
        };

        let brush = match &decl.brush {
            Some(Binding::Inline(brush)) => brush.id.clone().or(base.brush),
            Some(Binding::Ref(r)) => Some(self.brush_id(r)),
            None => base.brush,
        };

        Ok(ActiveContext {
            id: decl.id.clone().or(base.id),
            trace_format,
            ink_source,
            brush,
        })
    }

    /// Schema of a trace decoded under `scope`, with an optional
    /// `traceFormatRef` on the trace itself
    pub fn schema(&self, scope: &Scope, trace_format_ref: Option<&str>) -> Result<TraceSchema, String> {
        let context = scope.as_ref().map_err(|reason| reason.clone())?;

        let trace_format = match trace_format_ref {
            Some(r) => self.trace_format(r)?,
            None => context
                .trace_format
                .clone()
                .or_else(|| context.ink_source.as_ref().map(|s| Rc::new(s.trace_format.clone())))
                .unwrap_or_else(|| Rc::clone(&self.fallback_format)),
        };

        if trace_format.channel_count() == 0 {
            return Err(match &trace_format.id {
                Some(id) => format!("trace format \"#{}\" declares no channels", id),
                None => "trace format declares no channels".to_string(),
            });
        }

        Ok(TraceSchema {
            context_id: context.id.clone(),
            trace_format,
            brush_id: context.brush.clone(),
        })
    }

    // ========================================================================
    // Brush and timestamp inheritance
    // ========================================================================

    /// Point brush parents at local ids; broken or cyclic parents are dropped
    fn resolve_brush_parents(&mut self) {
        let resolved: Vec<Option<String>> = self
            .brushes
            .items
            .iter()
            .map(|brush| {
                let parent = brush.parent.as_deref()?;
                self.resolve_parent(
                    "brush",
                    brush.id.as_deref().unwrap_or_default(),
                    parent,
                    |b| self.brushes.get(b).and_then(|brush| brush.parent.clone()),
                    |b| self.brushes.contains(b) || b == DEFAULT_BRUSH_ID,
                )
            })
            .collect();

        for (brush, parent) in self.brushes.items.iter_mut().zip(resolved) {
            brush.parent = parent;
        }
    }

    fn resolve_timestamp_parents(&mut self) {
        let resolved: Vec<Option<String>> = self
            .timestamps
            .items
            .iter()
            .map(|ts| {
                let parent = ts.parent.as_deref()?;
                self.resolve_parent(
                    "timestamp",
                    &ts.id,
                    parent,
                    |t| self.timestamps.get(t).and_then(|ts| ts.parent.clone()),
                    |t| self.timestamps.contains(t),
                )
            })
            .collect();

        for (ts, parent) in self.timestamps.items.iter_mut().zip(resolved) {
            ts.parent = parent;
        }
    }

    /// Follow a parent chain from `reference`; `None` (with a warning) if it
    /// is broken or loops back
    fn resolve_parent(
        &self,
        kind: &str,
        own_id: &str,
        reference: &str,
        parent_of: impl Fn(&str) -> Option<String>,
        exists: impl Fn(&str) -> bool,
    ) -> Option<String> {
        let first = match self.local_id(reference) {
            Ok(id) if exists(id) => id.to_string(),
            _ => {
                log::warn!("Ignoring unresolved parent \"{}\" of {} \"{}\"", reference, kind, own_id);
                return None;
            }
        };

        let mut seen = HashSet::new();
        seen.insert(own_id.to_string());
        let mut current = first.clone();
        loop {
            if !seen.insert(current.clone()) {
                log::warn!("Ignoring cyclic parent \"{}\" of {} \"{}\"", reference, kind, own_id);
                return None;
            }
            match parent_of(&current).and_then(|p| self.local_id(&p).ok().map(str::to_string)) {
                Some(next) if exists(&next) => current = next,
                _ => return Some(first),
            }
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Named definitions for the decoded model
    pub fn definitions(&self) -> Definitions {
        let contexts = self
            .contexts
            .items
            .iter()
            .map(|decl| Context {
                id: decl.id.clone(),
                parent: decl.parent_ref.as_deref().map(|r| self.normalized(r)),
                trace_format: decl.trace_format.as_ref().and_then(|b| match b {
                    Binding::Inline(tf) => tf.id.clone(),
                    Binding::Ref(r) => Some(self.normalized(r)),
                }),
                ink_source: decl.ink_source.as_ref().map(|b| match b {
                    Binding::Inline(source) => source.id.clone(),
                    Binding::Ref(r) => self.normalized(r),
                }),
                brush: decl.brush.as_ref().and_then(|b| match b {
                    Binding::Inline(brush) => brush.id.clone(),
                    Binding::Ref(r) => Some(self.normalized(r)),
                }),
                timestamp: decl.timestamp.as_ref().map(|b| match b {
                    Binding::Inline(ts) => ts.id.clone(),
                    Binding::Ref(r) => self.normalized(r),
                }),
            })
            .collect();

        Definitions {
            trace_formats: self.trace_formats.items.iter().map(|tf| TraceFormat::clone(tf)).collect(),
            contexts,
            ink_sources: self.ink_sources.items.iter().map(|s| InkSource::clone(s)).collect(),
            brushes: self.brushes.items.clone(),
            timestamps: self.timestamps.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tree::build_tree;

    fn resolver(xml: &str) -> Resolver {
        Resolver::collect(&build_tree(xml, true).unwrap(), true)
    }

    fn channel_names(schema: &TraceSchema) -> Vec<String> {
        schema.trace_format.regular_channels.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_builtin_default_context() {
        let r = resolver("<ink/>");
        let schema = r.schema(&r.default_scope(), None).unwrap();
        assert_eq!(schema.context_id, None);
        assert_eq!(channel_names(&schema), vec!["X", "Y"]);
    }

    #[test]
    fn test_single_trace_format_governs_default() {
        let r = resolver(
            r#"<ink><definitions>
                 <traceFormat xml:id="tf"><channel name="X"/><channel name="Y"/><channel name="T"/></traceFormat>
               </definitions></ink>"#,
        );
        let schema = r.schema(&r.default_scope(), None).unwrap();
        assert_eq!(channel_names(&schema), vec!["X", "Y", "T"]);
    }

    #[test]
    fn test_context_chain_inherits_format_and_brush() {
        let r = resolver(
            r##"<ink><definitions>
                 <traceFormat xml:id="xyt"><channel name="X"/><channel name="Y"/><channel name="T"/></traceFormat>
                 <brush xml:id="pen"/>
                 <context xml:id="base" traceFormatRef="#xyt" brushRef="#pen"/>
                 <context xml:id="child" contextRef="#base"/>
               </definitions></ink>"##,
        );
        let schema = r.schema(&r.context("#child"), None).unwrap();
        assert_eq!(schema.context_id.as_deref(), Some("child"));
        assert_eq!(schema.brush_id.as_deref(), Some("pen"));
        assert_eq!(channel_names(&schema), vec!["X", "Y", "T"]);
    }

    #[test]
    fn test_ink_source_format_is_second_choice() {
        let r = resolver(
            r##"<ink><definitions>
                 <inkSource xml:id="tablet"><traceFormat><channel name="X"/><channel name="Y"/><channel name="F"/></traceFormat></inkSource>
                 <traceFormat xml:id="xy"><channel name="X"/><channel name="Y"/></traceFormat>
                 <context xml:id="src" inkSourceRef="#tablet"/>
                 <context xml:id="both" contextRef="#src" traceFormatRef="#xy"/>
               </definitions></ink>"##,
        );
        assert_eq!(channel_names(&r.schema(&r.context("#src"), None).unwrap()), vec!["X", "Y", "F"]);
        assert_eq!(channel_names(&r.schema(&r.context("#both"), None).unwrap()), vec!["X", "Y"]);
    }

    #[test]
    fn test_trace_format_ref_overrides_context() {
        let r = resolver(
            r##"<ink><definitions>
                 <traceFormat xml:id="xyz"><channel name="X"/><channel name="Y"/><channel name="Z"/></traceFormat>
               </definitions></ink>"##,
        );
        let schema = r.schema(&r.default_scope(), Some("#xyz")).unwrap();
        assert_eq!(schema.trace_format.id.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_unresolved_references() {
        let r = resolver(
            r##"<ink><definitions>
                 <context xml:id="a" contextRef="#b"/>
                 <context xml:id="b" contextRef="#a"/>
                 <context xml:id="broken" traceFormatRef="#missing"/>
               </definitions></ink>"##,
        );

        assert!(r.context("#a").unwrap_err().contains("inherits from itself"));
        assert!(r.context("#nope").unwrap_err().contains("not defined"));
        assert!(r.context("#broken").unwrap_err().contains("#missing"));
        assert!(r.schema(&r.default_scope(), Some("other.xml#tf")).is_err());
    }

    #[test]
    fn test_bare_ids_need_local_assumption() {
        let xml = r#"<ink><definitions><traceFormat xml:id="tf"><channel name="X"/></traceFormat></definitions></ink>"#;
        assert!(resolver(xml).trace_format("tf").is_ok());

        let strict = Resolver::collect(&build_tree(xml, true).unwrap(), false);
        assert!(strict.trace_format("tf").is_err());
        assert!(strict.trace_format("#tf").is_ok());
    }

    #[test]
    fn test_named_default_context() {
        let r = resolver(
            r##"<ink><definitions>
                 <context xml:id="first"><traceFormat><channel name="A"/></traceFormat></context>
                 <context xml:id="DefaultContext"><traceFormat><channel name="B"/></traceFormat></context>
               </definitions></ink>"##,
        );
        let schema = r.schema(&r.default_scope(), None).unwrap();
        assert_eq!(schema.context_id.as_deref(), Some("DefaultContext"));
        assert_eq!(channel_names(&schema), vec!["B"]);
    }

    #[test]
    fn test_streaming_context_inherits_current() {
        let r = resolver(
            r##"<ink><definitions>
                 <context xml:id="c1"><traceFormat><channel name="X"/><channel name="Y"/></traceFormat></context>
               </definitions></ink>"##,
        );
        let current = r.default_scope();
        let decl = read_context(&build_tree(r##"<context brushRef="#thin"/>"##, true).unwrap());
        let scope = r.streaming_context(&decl, &current).unwrap();

        assert_eq!(scope.id.as_deref(), Some("c1"));
        assert_eq!(scope.brush.as_deref(), Some("#thin"));
        assert_eq!(scope.trace_format, current.unwrap().trace_format);
    }

    #[test]
    fn test_top_level_context_is_not_the_default() {
        let r = resolver(
            r##"<ink>
                 <trace>1 2</trace>
                 <context xml:id="later"><traceFormat><channel name="X"/><channel name="Y"/><channel name="T"/></traceFormat></context>
               </ink>"##,
        );
        let schema = r.schema(&r.default_scope(), None).unwrap();
        assert_eq!(schema.context_id, None);
        assert_eq!(channel_names(&schema), vec!["X", "Y"]);

        // Still addressable by id
        assert_eq!(channel_names(&r.schema(&r.context("#later"), None).unwrap()), vec!["X", "Y", "T"]);
    }

    #[test]
    fn test_top_level_trace_format_is_not_the_fallback() {
        let r = resolver(
            r##"<ink>
                 <trace>1 2</trace>
                 <traceFormat xml:id="a"><channel name="A"/></traceFormat>
               </ink>"##,
        );
        assert_eq!(channel_names(&r.schema(&r.default_scope(), None).unwrap()), vec!["X", "Y"]);
        assert_eq!(channel_names(&r.schema(&r.default_scope(), Some("#a")).unwrap()), vec!["A"]);
    }

    #[test]
    fn test_empty_format_is_rejected() {
        let r = resolver(r##"<ink><definitions><traceFormat xml:id="none"/></definitions></ink>"##);
        assert!(r.schema(&r.default_scope(), Some("#none")).unwrap_err().contains("no channels"));
    }

    #[test]
    fn test_brush_parents() {
        let r = resolver(
            r##"<ink><definitions>
                 <brush xml:id="base"/>
                 <brush xml:id="fine" brushRef="#base"/>
                 <brush xml:id="lost" brushRef="#nowhere"/>
                 <brush xml:id="loop1" brushRef="#loop2"/>
                 <brush xml:id="loop2" brushRef="#loop1"/>
               </definitions></ink>"##,
        );
        let defs = r.definitions();
        let parent = |id: &str| defs.brush(id).unwrap().parent.clone();

        assert_eq!(parent("fine").as_deref(), Some("base"));
        assert_eq!(parent("lost"), None);
        assert_eq!(parent("loop1"), None);
    }

    #[test]
    fn test_definitions_output() {
        let r = resolver(
            r##"<ink><definitions>
                 <timestamp xml:id="ts0" time="0"/>
                 <context xml:id="ctx" traceFormatRef="#fmt" timestampRef="#ts0">
                   <inkSource xml:id="pad"><traceFormat xml:id="fmt"><channel name="X"/></traceFormat></inkSource>
                 </context>
               </definitions></ink>"##,
        );
        let defs = r.definitions();

        assert!(defs.trace_format("fmt").is_some());
        assert!(defs.ink_source("pad").is_some());
        let ctx = defs.context("ctx").unwrap();
        assert_eq!(ctx.trace_format.as_deref(), Some("fmt"));
        assert_eq!(ctx.ink_source.as_deref(), Some("pad"));
        assert_eq!(ctx.timestamp.as_deref(), Some("ts0"));
    }
}
