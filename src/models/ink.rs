//! Decoded ink model
//!
//! `Ink` is the document-scoped aggregate returned by the reader. It owns
//! every trace, group and definition; nothing refers back into the parsed
//! XML text.

use super::definitions::{Annotation, Definitions};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Ordered mapping from channel name to channel data
///
/// Keeps the order of the governing trace format, which a plain hash map
/// would lose.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> ChannelMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace the data of a channel
    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for ChannelMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<&str> for ChannelMap<V> {
    type Output = V;

    fn index(&self, name: &str) -> &V {
        match self.get(name) {
            Some(v) => v,
            None => panic!("no channel named '{}'", name),
        }
    }
}

impl<V> FromIterator<(String, V)> for ChannelMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = ChannelMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// A value of an intermittent channel, tied to the sample it was given at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedValue {
    pub index: usize,
    pub value: f64,
}

/// Pen state a trace was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TraceType {
    #[default]
    PenDown,
    PenUp,
    Indeterminate,
}

impl TraceType {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "penDown" => Some(TraceType::PenDown),
            "penUp" => Some(TraceType::PenUp),
            "indeterminate" => Some(TraceType::Indeterminate),
            _ => None,
        }
    }
}

/// Position of a trace inside a stroke split over several `<trace>` elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Continuation {
    Begin,
    Middle,
    End,
}

impl Continuation {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "begin" => Some(Continuation::Begin),
            "middle" => Some(Continuation::Middle),
            "end" => Some(Continuation::End),
            _ => None,
        }
    }

    /// Middle and end parts must name the trace they continue
    pub fn requires_prior(self) -> bool {
        matches!(self, Continuation::Middle | Continuation::End)
    }
}

/// One decoded `<trace>`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: Option<String>,
    /// Context the trace was decoded under, `None` for the InkML default context
    pub context_id: Option<String>,
    pub trace_format_id: Option<String>,
    pub brush_id: Option<String>,
    /// Absolute, scaled values per regular channel; all of equal length
    pub channels: ChannelMap<Vec<f64>>,
    pub intermittent_channels: ChannelMap<Vec<IndexedValue>>,
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    pub continuation: Option<Continuation>,
    /// Id of the trace this one continues
    pub prior: Option<String>,
    pub duration: Option<f64>,
    pub time_offset: Option<f64>,
}

impl Trace {
    /// Number of samples (length of every regular channel sequence)
    pub fn sample_count(&self) -> usize {
        self.channels.iter().next().map(|(_, v)| v.len()).unwrap_or(0)
    }

    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.channels.get(name).map(|v| v.as_slice())
    }
}

/// One `<traceGroup>`; members are indices into `Ink::traces`
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TraceGroup {
    pub id: Option<String>,
    pub context_id: Option<String>,
    pub brush_id: Option<String>,
    pub traces: Vec<usize>,
    pub groups: Vec<TraceGroup>,
    pub views: Vec<TraceView>,
    pub annotations: Vec<Annotation>,
}

impl TraceGroup {
    /// Indices of all traces in this group and its nested groups, in document order
    pub fn all_traces(&self) -> Vec<usize> {
        let mut indices = self.traces.clone();
        for group in &self.groups {
            indices.extend(group.all_traces());
        }
        indices.sort_unstable();
        indices
    }
}

/// Kind of element a `<traceView>` selects from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraceDataKind {
    Trace,
    TraceGroup,
    TraceView,
}

/// One `<traceView>`: a selection from an earlier trace, group or view
///
/// `from` and `to` are `:`-separated index paths into the selected data,
/// empty when not given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceView {
    pub id: Option<String>,
    /// Id of the selected element
    pub trace_data: String,
    pub trace_data_kind: TraceDataKind,
    pub from: Vec<i64>,
    pub to: Vec<i64>,
}

/// A parsed InkML document
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Ink {
    /// Every trace in document order, group members included
    pub traces: Vec<Trace>,
    /// Top-level trace groups
    pub groups: Vec<TraceGroup>,
    /// Top-level trace views
    pub views: Vec<TraceView>,
    pub annotations: Vec<Annotation>,
    pub definitions: Definitions,
}

impl Ink {
    pub fn trace(&self, id: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.id.as_deref() == Some(id))
    }

    /// Serialize the whole document model to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
