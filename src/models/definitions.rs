//! Definition entities: channels, trace formats, ink sources, brushes,
//! timestamps and contexts.
//!
//! These are produced by the definition reader and are immutable once the
//! document has been parsed. Cross-references between entities are kept as
//! ids (without the leading `#`) so the whole model stays tree-shaped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Id of the trace format InkML assigns to the default context
pub const DEFAULT_TRACE_FORMAT_ID: &str = "DefaultTraceFormat";

/// Id of the InkML default context
pub const DEFAULT_CONTEXT_ID: &str = "DefaultContext";

/// Id of the InkML default brush
pub const DEFAULT_BRUSH_ID: &str = "DefaultBrush";

/// Value type of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Integer,
    #[default]
    Decimal,
    Double,
    Boolean,
}

impl ChannelType {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "integer" => Some(ChannelType::Integer),
            "decimal" => Some(ChannelType::Decimal),
            "double" => Some(ChannelType::Double),
            "boolean" => Some(ChannelType::Boolean),
            _ => None,
        }
    }
}

/// Direction in which channel values increase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChannelOrientation {
    #[default]
    #[serde(rename = "+ve")]
    Positive,
    #[serde(rename = "-ve")]
    Negative,
}

/// Named value with optional units (`<sourceProperty>`, `<channelProperty>`,
/// `<brushProperty>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub value: String,
    pub units: Option<String>,
}

impl Property {
    /// Numeric interpretation of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }
}

/// One `<channel>` of a trace format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDef {
    pub id: Option<String>,
    /// Case sensitive channel name, unique within its trace format
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// Stored values are divided by this to obtain physical values (1 when absent)
    pub resolution: Option<f64>,
    /// Value assumed before the first sample
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub orientation: ChannelOrientation,
    pub respect_to: Option<String>,
    pub units: Option<String>,
    /// Channel properties supplied by the owning ink source
    pub properties: BTreeMap<String, Property>,
}

impl ChannelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            channel_type: ChannelType::Decimal,
            resolution: None,
            default: 0.0,
            min: None,
            max: None,
            orientation: ChannelOrientation::Positive,
            respect_to: None,
            units: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_type = channel_type;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Convert a stored raw value into its physical value
    pub fn scale(&self, raw: f64) -> f64 {
        match self.resolution {
            Some(resolution) if self.channel_type != ChannelType::Boolean => raw / resolution,
            _ => raw,
        }
    }
}

/// Ordered channel declaration governing how trace text is decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TraceFormat {
    pub id: Option<String>,
    pub regular_channels: Vec<ChannelDef>,
    pub intermittent_channels: Vec<ChannelDef>,
}

impl TraceFormat {
    /// The trace format of the InkML default context: decimal X and Y
    pub fn default_format() -> Self {
        Self {
            id: Some(DEFAULT_TRACE_FORMAT_ID.to_string()),
            regular_channels: vec![ChannelDef::new("X"), ChannelDef::new("Y")],
            intermittent_channels: Vec::new(),
        }
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelDef> {
        self.regular_channels
            .iter()
            .chain(self.intermittent_channels.iter())
            .find(|c| c.name == name)
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut ChannelDef> {
        self.regular_channels
            .iter_mut()
            .chain(self.intermittent_channels.iter_mut())
            .find(|c| c.name == name)
    }

    pub fn channel_count(&self) -> usize {
        self.regular_channels.len() + self.intermittent_channels.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRate {
    /// Samples per second
    pub value: f64,
    /// False when points may have been dropped
    pub uniform: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveArea {
    pub width: f64,
    pub height: f64,
    /// ISO paper size such as `A4`
    pub size: Option<String>,
    pub units: Option<String>,
}

/// Capture device description (`<inkSource>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkSource {
    pub id: String,
    pub trace_format: TraceFormat,
    pub sample_rate: Option<SampleRate>,
    /// Milliseconds
    pub latency: Option<f64>,
    pub active_area: Option<ActiveArea>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_no: Option<String>,
    pub specification_ref: Option<String>,
    pub description: Option<String>,
    pub properties: BTreeMap<String, Property>,
}

impl InkSource {
    pub fn new(id: impl Into<String>, trace_format: TraceFormat) -> Self {
        Self {
            id: id.into(),
            trace_format,
            sample_rate: None,
            latency: None,
            active_area: None,
            manufacturer: None,
            model: None,
            serial_no: None,
            specification_ref: None,
            description: None,
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Text,
    Xml,
    Href,
}

/// `<annotation>` or `<annotationXML>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub content: String,
    pub kind: AnnotationKind,
    #[serde(rename = "type")]
    pub annotation_type: Option<String>,
    pub encoding: Option<String>,
    /// Non-standard attributes, kept as written
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Brush {
    pub id: Option<String>,
    /// Brush this one inherits properties from
    pub parent: Option<String>,
    pub properties: BTreeMap<String, Property>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamp {
    pub id: String,
    /// Milliseconds since 1970-01-01T00:00:00Z
    pub time: Option<f64>,
    pub time_string: Option<String>,
    /// Timestamp this one is relative to
    pub parent: Option<String>,
    /// Milliseconds relative to `parent`
    pub time_offset: f64,
}

/// A resolved `<context>`
///
/// Only ids are stored here; the trace format a context finally applies is
/// computed by the resolver, which walks the `parent` chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: Option<String>,
    pub parent: Option<String>,
    pub trace_format: Option<String>,
    pub ink_source: Option<String>,
    pub brush: Option<String>,
    pub timestamp: Option<String>,
}

/// All named definitions of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Definitions {
    pub trace_formats: Vec<TraceFormat>,
    pub contexts: Vec<Context>,
    pub ink_sources: Vec<InkSource>,
    pub brushes: Vec<Brush>,
    pub timestamps: Vec<Timestamp>,
}

impl Definitions {
    pub fn trace_format(&self, id: &str) -> Option<&TraceFormat> {
        self.trace_formats.iter().find(|f| f.id.as_deref() == Some(id))
    }

    pub fn context(&self, id: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.id.as_deref() == Some(id))
    }

    pub fn ink_source(&self, id: &str) -> Option<&InkSource> {
        self.ink_sources.iter().find(|s| s.id == id)
    }

    pub fn brush(&self, id: &str) -> Option<&Brush> {
        self.brushes.iter().find(|b| b.id.as_deref() == Some(id))
    }

    pub fn timestamp(&self, id: &str) -> Option<&Timestamp> {
        self.timestamps.iter().find(|t| t.id == id)
    }
}
