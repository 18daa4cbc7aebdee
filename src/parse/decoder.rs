//! Channel decoder: trace text → per-channel value sequences
//!
//! Samples are separated by `,`. Within a sample, the values map to the
//! regular channels of the trace format by position, followed by optional
//! values for the intermittent channels.
//!
//! Each regular channel threads an [`Accumulator`] through the samples. The
//! accumulator holds raw (unscaled) values; resolution scaling is applied to
//! each absolute value as it is emitted.

use crate::models::{ChannelDef, ChannelMap, ChannelType, IndexedValue, TraceFormat};
use crate::parse::errors::SampleError;
use crate::parse::tokens::{tokenize_sample, Qualifier, Token};

/// Output of [`decode_trace`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedChannels {
    pub regular: ChannelMap<Vec<f64>>,
    pub intermittent: ChannelMap<Vec<IndexedValue>>,
    pub sample_count: usize,
}

/// Per-channel decoding state
#[derive(Debug, Clone)]
struct Accumulator {
    /// Last absolute raw value
    value: f64,
    /// Last first difference
    difference: f64,
    /// Qualifier in force; persists until another one is written
    qualifier: Qualifier,
    started: bool,
}

impl Accumulator {
    fn new(channel: &ChannelDef) -> Self {
        Self {
            value: channel.default,
            difference: 0.0,
            qualifier: Qualifier::Explicit,
            started: false,
        }
    }

    /// Record the next absolute value
    fn push(&mut self, value: f64) -> f64 {
        self.difference = if self.started { value - self.value } else { 0.0 };
        self.value = value;
        self.started = true;
        value
    }
}

/// Decoder options
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Divide values by their channel resolution
    pub apply_resolution: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { apply_resolution: true }
    }
}

/// Decode the text of one trace under its resolved trace format
pub fn decode_trace(text: &str, format: &TraceFormat, options: DecodeOptions) -> Result<DecodedChannels, SampleError> {
    let regular = &format.regular_channels;
    let intermittent = &format.intermittent_channels;

    let mut accumulators: Vec<Accumulator> = regular.iter().map(Accumulator::new).collect();
    let mut regular_values: Vec<Vec<f64>> = vec![Vec::new(); regular.len()];
    let mut intermittent_values: Vec<Vec<IndexedValue>> = vec![Vec::new(); intermittent.len()];

    let samples = split_samples(text);

    for (index, sample) in samples.iter().enumerate() {
        let tokens = tokenize_sample(sample).map_err(|e| match channel_at(format, e.position) {
            Some(channel) => SampleError::InvalidValue {
                sample: index,
                channel: channel.name.clone(),
                value: e.text.to_string(),
            },
            None => SampleError::Malformed {
                sample: index,
                reason: format!("unexpected text '{}' after the last channel", e.text),
            },
        })?;

        check_token_count(index, tokens.len(), regular.len(), intermittent.len())?;

        for (j, channel) in regular.iter().enumerate() {
            let raw = decode_regular(&tokens[j], channel, &mut accumulators[j])
                .ok_or_else(|| invalid_value(index, channel, &tokens[j]))?;
            let value = if options.apply_resolution { channel.scale(raw) } else { raw };
            regular_values[j].push(value);
        }

        for (j, token) in tokens.iter().enumerate().skip(regular.len()) {
            let k = j - regular.len();
            let channel = &intermittent[k];
            let previous = intermittent_values[k].last().map(|v| v.value);
            if let Some(value) = decode_intermittent(token, channel, previous, options)
                .ok_or_else(|| invalid_value(index, channel, token))?
            {
                intermittent_values[k].push(IndexedValue { index, value });
            }
        }
    }

    log::debug!(
        "Decoded {} samples over {} regular and {} intermittent channels",
        samples.len(),
        regular.len(),
        intermittent.len()
    );

    Ok(DecodedChannels {
        regular: regular.iter().map(|c| c.name.clone()).zip(regular_values).collect(),
        intermittent: intermittent.iter().map(|c| c.name.clone()).zip(intermittent_values).collect(),
        sample_count: samples.len(),
    })
}

/// Split trace text at `,`; blank text has no samples and one trailing comma is tolerated
fn split_samples(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut samples: Vec<&str> = text.split(',').collect();
    if samples.len() > 1 && samples.last().map_or(false, |s| s.trim().is_empty()) {
        samples.pop();
    }
    samples
}

fn check_token_count(sample: usize, found: usize, regular: usize, intermittent: usize) -> Result<(), SampleError> {
    let max = regular + intermittent;
    if found >= regular && found <= max {
        return Ok(());
    }

    let expected = if intermittent == 0 {
        format!("{}", regular)
    } else {
        format!("between {} and {}", regular, max)
    };
    Err(SampleError::Malformed {
        sample,
        reason: format!("expected {} values, found {}", expected, found),
    })
}

fn channel_at(format: &TraceFormat, position: usize) -> Option<&ChannelDef> {
    format
        .regular_channels
        .iter()
        .chain(format.intermittent_channels.iter())
        .nth(position)
}

fn invalid_value(sample: usize, channel: &ChannelDef, token: &Token) -> SampleError {
    SampleError::InvalidValue {
        sample,
        channel: channel.name.clone(),
        value: token.text().to_string(),
    }
}

/// Absolute raw value of a regular channel, `None` when the token does not fit the channel
fn decode_regular(token: &Token, channel: &ChannelDef, acc: &mut Accumulator) -> Option<f64> {
    if let Token::Repeat = token {
        return Some(acc.push(acc.value));
    }

    if channel.channel_type == ChannelType::Boolean {
        return boolean_value(token).map(|v| acc.push(v));
    }

    let (qualifier, number) = match token {
        Token::Number { qualifier, value, .. } => (*qualifier, *value),
        _ => return None,
    };

    if let Some(q) = qualifier {
        acc.qualifier = q;
    }

    let value = match acc.qualifier {
        Qualifier::Explicit => number,
        Qualifier::Difference => acc.value + number,
        Qualifier::SecondDifference => acc.value + acc.difference + number,
    };

    let value = if channel.channel_type == ChannelType::Integer { value.round() } else { value };
    Some(acc.push(value))
}

/// Value of an intermittent channel
///
/// `Some(None)` means the sample carries no value for the channel.
fn decode_intermittent(
    token: &Token,
    channel: &ChannelDef,
    previous: Option<f64>,
    options: DecodeOptions,
) -> Option<Option<f64>> {
    let scale = |raw: f64| if options.apply_resolution { channel.scale(raw) } else { raw };

    match token {
        Token::Absent => Some(None),
        Token::Repeat => Some(Some(previous.unwrap_or_else(|| scale(channel.default)))),
        _ if channel.channel_type == ChannelType::Boolean => boolean_value(token).map(Some),
        Token::Number { qualifier: None, value, .. } => {
            let raw = if channel.channel_type == ChannelType::Integer { value.round() } else { *value };
            Some(Some(scale(raw)))
        }
        _ => None,
    }
}

fn boolean_value(token: &Token) -> Option<f64> {
    match token {
        Token::Bool(true) => Some(1.0),
        Token::Bool(false) => Some(0.0),
        Token::Number { qualifier: None, value, .. } if *value == 1.0 || *value == 0.0 => Some(*value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy() -> TraceFormat {
        TraceFormat::default_format()
    }

    fn decode(text: &str, format: &TraceFormat) -> DecodedChannels {
        decode_trace(text, format, DecodeOptions::default()).unwrap()
    }

    #[test]
    fn test_explicit_values() {
        let decoded = decode("0 0, 1 1, 2 4", &xy());
        assert_eq!(decoded.sample_count, 3);
        assert_eq!(decoded.regular["X"], vec![0.0, 1.0, 2.0]);
        assert_eq!(decoded.regular["Y"], vec![0.0, 1.0, 4.0]);
    }

    #[test]
    fn test_repeat_shorthand() {
        let decoded = decode("10 20, 0.. 25", &xy());
        assert_eq!(decoded.regular["X"], vec![10.0, 10.0]);
        assert_eq!(decoded.regular["Y"], vec![20.0, 25.0]);

        let decoded = decode("10 20, * 25", &xy());
        assert_eq!(decoded.regular["X"], vec![10.0, 10.0]);
    }

    #[test]
    fn test_first_differences_persist() {
        // Qualifier on the second sample stays in force for the third
        let decoded = decode("10 20, '1 '-2, 3 -2", &xy());
        assert_eq!(decoded.regular["X"], vec![10.0, 11.0, 14.0]);
        assert_eq!(decoded.regular["Y"], vec![20.0, 18.0, 16.0]);
    }

    #[test]
    fn test_second_differences() {
        // differences 2, 3, 4 → second differences 1, 1
        let decoded = decode("0 0, '2 0, \"1 0, 1 0", &xy());
        assert_eq!(decoded.regular["X"], vec![0.0, 2.0, 5.0, 9.0]);
    }

    #[test]
    fn test_explicit_qualifier_resets_mode() {
        let decoded = decode("0 0, '5 0, !100 0, 7 0", &xy());
        assert_eq!(decoded.regular["X"], vec![0.0, 5.0, 100.0, 7.0]);
    }

    #[test]
    fn test_difference_on_first_sample_starts_from_default() {
        let mut format = xy();
        format.regular_channels[0].default = 100.0;
        let decoded = decode("'5 0, '5 0", &format);
        assert_eq!(decoded.regular["X"], vec![105.0, 110.0]);
    }

    #[test]
    fn test_resolution_scaling() {
        let mut format = xy();
        format.regular_channels[0].resolution = Some(2.0);
        let decoded = decode("10 10", &format);
        assert_eq!(decoded.regular["X"], vec![5.0]);
        assert_eq!(decoded.regular["Y"], vec![10.0]);

        let raw = decode_trace("10 10", &format, DecodeOptions { apply_resolution: false }).unwrap();
        assert_eq!(raw.regular["X"], vec![10.0]);
    }

    #[test]
    fn test_differences_accumulate_before_scaling() {
        let mut format = xy();
        format.regular_channels[0].resolution = Some(10.0);
        let decoded = decode("10 0, '5 0, 5 0", &format);
        assert_eq!(decoded.regular["X"], vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_integer_channel_rounds() {
        let format = TraceFormat {
            id: None,
            regular_channels: vec![ChannelDef::new("T").with_type(ChannelType::Integer)],
            intermittent_channels: Vec::new(),
        };
        let decoded = decode("1.4, '1.4, 2.6", &format);
        assert_eq!(decoded.regular["T"], vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_boolean_channel() {
        let format = TraceFormat {
            id: None,
            regular_channels: vec![ChannelDef::new("X"), ChannelDef::new("B").with_type(ChannelType::Boolean)],
            intermittent_channels: Vec::new(),
        };
        let decoded = decode("1 T, 2 F, 3 *", &format);
        assert_eq!(decoded.regular["B"], vec![1.0, 0.0, 0.0]);

        let err = decode_trace("1 2", &format, DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            SampleError::InvalidValue { sample: 0, channel: "B".to_string(), value: "2".to_string() }
        );
    }

    #[test]
    fn test_intermittent_channels() {
        let format = TraceFormat {
            id: None,
            regular_channels: vec![ChannelDef::new("X"), ChannelDef::new("Y")],
            intermittent_channels: vec![ChannelDef::new("F")],
        };
        let decoded = decode("0 0 5, 1 1, 2 2 ?, 3 3 *, 4 4 7", &format);
        assert_eq!(decoded.sample_count, 5);
        assert_eq!(
            decoded.intermittent["F"],
            vec![
                IndexedValue { index: 0, value: 5.0 },
                IndexedValue { index: 3, value: 5.0 },
                IndexedValue { index: 4, value: 7.0 },
            ]
        );
    }

    #[test]
    fn test_too_many_values() {
        let err = decode_trace("1 2 3", &xy(), DecodeOptions::default()).unwrap_err();
        assert_eq!(err, SampleError::Malformed { sample: 0, reason: "expected 2 values, found 3".to_string() });
    }

    #[test]
    fn test_too_few_values() {
        let err = decode_trace("1 2, 3", &xy(), DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, SampleError::Malformed { sample: 1, .. }));
    }

    #[test]
    fn test_stray_text_names_channel() {
        let err = decode_trace("1 2, 3 y", &xy(), DecodeOptions::default()).unwrap_err();
        assert_eq!(err, SampleError::InvalidValue { sample: 1, channel: "Y".to_string(), value: "y".to_string() });
    }

    #[test]
    fn test_glued_stray_text_names_its_channel() {
        let err = decode_trace("10abc 0", &xy(), DecodeOptions::default()).unwrap_err();
        assert_eq!(err, SampleError::InvalidValue { sample: 0, channel: "X".to_string(), value: "abc".to_string() });
    }

    #[test]
    fn test_overflowing_value_is_invalid() {
        let err = decode_trace("1 2, 1e999 0", &xy(), DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            SampleError::InvalidValue { sample: 1, channel: "X".to_string(), value: "1e999".to_string() }
        );
    }

    #[test]
    fn test_absent_marker_in_regular_channel() {
        let err = decode_trace("1 ?", &xy(), DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, SampleError::InvalidValue { ref channel, .. } if channel == "Y"));
    }

    #[test]
    fn test_blank_text_and_trailing_comma() {
        assert_eq!(decode("  \n ", &xy()).sample_count, 0);
        assert_eq!(decode("1 2, 3 4,", &xy()).sample_count, 2);
    }

    #[test]
    fn test_equal_lengths() {
        let decoded = decode("1 2, '1 '1, \"0 \"0, * *", &xy());
        let lengths: Vec<usize> = decoded.regular.iter().map(|(_, v)| v.len()).collect();
        assert_eq!(lengths, vec![4, 4]);
    }
}
