//! Readers for InkML definition elements
//!
//! Each function turns one element of the generic tree into a model value.
//! Optional metadata that cannot be read is skipped with a warning; only
//! problems that affect trace decoding are errors, and those are raised by
//! the resolver.

use crate::models::{
    ActiveArea, Annotation, AnnotationKind, Brush, ChannelDef, ChannelOrientation, ChannelType, InkSource, Property,
    SampleRate, Timestamp, TraceFormat,
};
use crate::parse::tree::XmlElement;
use std::collections::BTreeMap;

/// A definition given either inline or by reference
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<T> {
    Inline(T),
    /// Reference as written in the attribute (usually `#id`)
    Ref(String),
}

/// A `<context>` as written, before references are resolved
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextDecl {
    pub id: Option<String>,
    /// `contextRef`: the context this one modifies
    pub parent_ref: Option<String>,
    pub trace_format: Option<Binding<TraceFormat>>,
    pub ink_source: Option<Binding<InkSource>>,
    pub brush: Option<Binding<Brush>>,
    pub timestamp: Option<Binding<Timestamp>>,
}

/// Read a `<traceFormat>` element
pub fn read_trace_format(element: &XmlElement) -> TraceFormat {
    let regular_channels = element.children_named("channel").filter_map(read_channel).collect();

    let intermittent_channels = element
        .child("intermittentChannels")
        .map(|ic| ic.children_named("channel").filter_map(read_channel).collect())
        .unwrap_or_default();

    TraceFormat {
        id: element.id().map(str::to_string),
        regular_channels,
        intermittent_channels,
    }
}

/// Read a `<channel>` element; `None` when the required name is missing
pub fn read_channel(element: &XmlElement) -> Option<ChannelDef> {
    let name = match element.attr_non_empty("name") {
        Some(name) => name,
        None => {
            log::warn!("Attribute \"name\" is required for channel element (line {})", element.line);
            return None;
        }
    };

    let mut channel = ChannelDef::new(name);
    channel.id = element.id().map(str::to_string);

    if let Some(type_attr) = element.attr("type") {
        match ChannelType::from_attr(type_attr) {
            Some(t) => channel.channel_type = t,
            None => log::warn!("Unknown type \"{}\" for channel \"{}\", using decimal", type_attr, name),
        }
    }

    if let Some(default) = element.attr("default") {
        channel.default = if channel.channel_type == ChannelType::Boolean {
            parse_bool(default) as u8 as f64
        } else {
            parse_decimal(default).unwrap_or_else(|| {
                log::warn!("Invalid default \"{}\" for channel \"{}\"", default, name);
                0.0
            })
        };
    }

    if let Some(resolution) = element.attr("resolution") {
        channel.resolution = parse_resolution(resolution, name);
    }

    channel.min = element.attr("min").and_then(parse_decimal);
    channel.max = element.attr("max").and_then(parse_decimal);

    match element.attr("orientation") {
        Some("-ve") => channel.orientation = ChannelOrientation::Negative,
        Some("+ve") | None => {}
        Some(other) => log::warn!("Unknown orientation \"{}\" for channel \"{}\"", other, name),
    }

    channel.respect_to = element.attr_non_empty("respectTo").map(str::to_string);
    channel.units = element.attr_non_empty("units").map(str::to_string);

    Some(channel)
}

/// Resolutions must be positive and finite
fn parse_resolution(value: &str, channel: &str) -> Option<f64> {
    match parse_decimal(value) {
        Some(r) if r > 0.0 && r.is_finite() => Some(r),
        _ => {
            log::warn!("Ignoring invalid resolution \"{}\" for channel \"{}\"", value, channel);
            None
        }
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "t" | "1")
}

/// Read an `<inkSource>` element; `None` without the required id or trace format
pub fn read_ink_source(element: &XmlElement) -> Option<InkSource> {
    let id = match element.id() {
        Some(id) => id,
        None => {
            log::warn!("Attribute \"xml:id\" is required for inkSource element (line {})", element.line);
            return None;
        }
    };

    let mut trace_format = match element.child("traceFormat") {
        Some(tf) => read_trace_format(tf),
        None => {
            log::warn!("Nested traceFormat element is required for inkSource \"{}\"", id);
            return None;
        }
    };

    // Channel properties: a "resolution" property fills in a resolution the
    // channel element itself leaves out
    if let Some(props) = element.child("channelProperties") {
        for prop in props.children_named("channelProperty") {
            let (channel_name, name, value) = match (prop.attr("channel"), prop.attr("name"), prop.attr("value")) {
                (Some(c), Some(n), Some(v)) => (c, n, v),
                _ => {
                    log::warn!("Attributes \"channel\", \"name\" and \"value\" are required for channelProperty");
                    continue;
                }
            };

            let property = Property {
                value: value.to_string(),
                units: prop.attr("units").map(str::to_string),
            };

            match trace_format.channel_mut(channel_name) {
                Some(channel) => {
                    if name == "resolution" && channel.resolution.is_none() {
                        channel.resolution = parse_resolution(value, channel_name);
                    }
                    channel.properties.insert(name.to_string(), property);
                }
                None => log::warn!("channelProperty refers to unknown channel \"{}\" in inkSource \"{}\"", channel_name, id),
            }
        }
    }

    let mut source = InkSource::new(id, trace_format);
    source.sample_rate = element.child("sampleRate").and_then(read_sample_rate);
    source.latency = element.child("latency").and_then(|e| read_required_decimal(e, "value"));
    source.active_area = element.child("activeArea").and_then(read_active_area);
    source.properties = read_properties(element, "sourceProperty");
    source.manufacturer = element.attr("manufacturer").map(str::to_string);
    source.model = element.attr("model").map(str::to_string);
    source.serial_no = element.attr("serialNo").map(str::to_string);
    source.specification_ref = element.attr("specificationRef").map(str::to_string);
    source.description = element.attr("description").map(str::to_string);

    Some(source)
}

fn read_required_decimal(element: &XmlElement, attr: &str) -> Option<f64> {
    match element.attr(attr) {
        Some(value) => {
            let parsed = parse_decimal(value);
            if parsed.is_none() {
                log::warn!("Attribute \"{}\" of {} element is expected to be decimal", attr, element.name);
            }
            parsed
        }
        None => {
            log::warn!("Attribute \"{}\" is required for {} element", attr, element.name);
            None
        }
    }
}

fn read_sample_rate(element: &XmlElement) -> Option<SampleRate> {
    let value = read_required_decimal(element, "value")?;
    // uniform defaults to true
    let uniform = element.attr("uniform").map_or(true, |u| u == "true");
    Some(SampleRate { value, uniform })
}

fn read_active_area(element: &XmlElement) -> Option<ActiveArea> {
    let width = read_required_decimal(element, "width")?;
    let height = read_required_decimal(element, "height")?;
    Some(ActiveArea {
        width,
        height,
        size: element.attr("size").map(str::to_string),
        units: element.attr("units").map(str::to_string),
    })
}

/// Read `name`/`value`/`units` property children such as `<sourceProperty>`
fn read_properties(element: &XmlElement, tag: &str) -> BTreeMap<String, Property> {
    let mut properties = BTreeMap::new();
    for prop in element.children_named(tag) {
        match (prop.attr("name"), prop.attr("value")) {
            (Some(name), Some(value)) => {
                properties.insert(
                    name.to_string(),
                    Property {
                        value: value.to_string(),
                        units: prop.attr("units").map(str::to_string),
                    },
                );
            }
            _ => log::warn!("Attributes \"name\" and \"value\" are required for {} element", tag),
        }
    }
    properties
}

/// Read a `<brush>` element
pub fn read_brush(element: &XmlElement) -> Brush {
    Brush {
        id: element.id().map(str::to_string),
        parent: element.attr_non_empty("brushRef").map(str::to_string),
        properties: read_properties(element, "brushProperty"),
        annotations: read_annotations(element),
    }
}

/// Read a `<timestamp>` element; `None` without the required id
///
/// An absolute `time` or `timeString` makes the other attributes irrelevant.
pub fn read_timestamp(element: &XmlElement) -> Option<Timestamp> {
    let id = match element.id() {
        Some(id) => id,
        None => {
            log::warn!("Attribute \"xml:id\" is required for timestamp element (line {})", element.line);
            return None;
        }
    };

    let mut timestamp = Timestamp {
        id: id.to_string(),
        time: None,
        time_string: None,
        parent: None,
        time_offset: 0.0,
    };

    if let Some(time) = element.attr("time").and_then(parse_decimal) {
        timestamp.time = Some(time);
        return Some(timestamp);
    }

    if let Some(time_string) = element.attr("timeString") {
        timestamp.time_string = Some(time_string.to_string());
        return Some(timestamp);
    }

    timestamp.parent = element.attr_non_empty("timestampRef").map(str::to_string);
    if let Some(offset) = element.attr("timeOffset").and_then(parse_decimal) {
        timestamp.time_offset = offset;
    }

    Some(timestamp)
}

/// Read a `<context>` element; nested elements take precedence over `*Ref` attributes
pub fn read_context(element: &XmlElement) -> ContextDecl {
    let trace_format = element
        .child("traceFormat")
        .map(|tf| Binding::Inline(read_trace_format(tf)))
        .or_else(|| reference(element, "traceFormatRef"));

    let ink_source = element
        .child("inkSource")
        .and_then(read_ink_source)
        .map(Binding::Inline)
        .or_else(|| reference(element, "inkSourceRef"));

    let brush = element
        .child("brush")
        .map(|b| Binding::Inline(read_brush(b)))
        .or_else(|| reference(element, "brushRef"));

    let timestamp = element
        .child("timestamp")
        .and_then(read_timestamp)
        .map(Binding::Inline)
        .or_else(|| reference(element, "timestampRef"));

    ContextDecl {
        id: element.id().map(str::to_string),
        parent_ref: element.attr_non_empty("contextRef").map(str::to_string),
        trace_format,
        ink_source,
        brush,
        timestamp,
    }
}

fn reference<T>(element: &XmlElement, attr: &str) -> Option<Binding<T>> {
    element.attr_non_empty(attr).map(|r| Binding::Ref(r.to_string()))
}

/// Read the `<annotation>` and `<annotationXML>` children of an element
pub fn read_annotations(container: &XmlElement) -> Vec<Annotation> {
    container
        .elements()
        .filter(|e| e.name == "annotation" || e.name == "annotationXML")
        .filter_map(read_annotation)
        .collect()
}

fn read_annotation(element: &XmlElement) -> Option<Annotation> {
    let (content, kind) = if element.name == "annotation" {
        (element.text(), AnnotationKind::Text)
    } else {
        let inner = element.inner_text();
        if !inner.trim().is_empty() {
            (inner, AnnotationKind::Xml)
        } else if let Some(href) = element.attr("href") {
            (href.to_string(), AnnotationKind::Href)
        } else {
            log::warn!("Neither content, nor href is provided for annotationXML element (line {})", element.line);
            return None;
        }
    };

    let attributes = element
        .attributes
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "href" | "type" | "encoding"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(Annotation {
        content,
        kind,
        annotation_type: element.attr("type").map(str::to_string),
        encoding: element.attr("encoding").map(str::to_string),
        attributes,
    })
}
