//! Pipeline description parser using winnow.
//!
//! Parses gst-launch-style pipeline descriptions:
//!
//! ```text
//! appsrc caps=video/x-raw,format=RGB,width=640,height=480 ! queue ! videoconvert ! autovideosink
//! ```
//!
//! # Syntax
//!
//! - Elements are separated by `!`
//! - Properties are specified as `name=value` after the element name
//! - Values can be quoted strings, numbers, booleans, or bare tokens; a
//!   bare token runs to the next whitespace or `!`, so structured values
//!   like a caps string (`video/x-raw,format=RGB,...`) survive intact
//! - Whitespace is optional around `!` and `=`
//!
//! Only the element/property structure is interpreted here; the meaning of
//! individual properties (like `caps`) belongs to the caller.

use crate::error::{Error, Result};
use winnow::ascii::{alpha1, digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, repeat, separated};
use winnow::error::ContextError;
use winnow::token::{take_till, take_while};
use winnow::Parser;

type WResult<T> = std::result::Result<T, ContextError>;

/// A parsed element with its name and properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedElement {
    /// The element type name (e.g. "appsrc", "queue").
    pub name: String,
    /// Properties as key-value pairs, in source order.
    pub properties: Vec<(String, PropertyValue)>,
}

impl ParsedElement {
    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// A property value in the pipeline description.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A string value (quoted or bare).
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl PropertyValue {
    /// Get as a string, converting if necessary.
    pub fn as_string(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Float(f) => f.to_string(),
            PropertyValue::Bool(b) => b.to_string(),
        }
    }

    /// Try to get as a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PropertyValue::Integer(i) => u64::try_from(*i).ok(),
            PropertyValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            PropertyValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

/// A parsed pipeline description.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPipeline {
    /// The elements in order from source to sink.
    pub elements: Vec<ParsedElement>,
}

/// Parse a pipeline description string.
///
/// # Example
///
/// ```rust
/// use synthsrc::parser::parse_pipeline;
///
/// let pipeline = parse_pipeline("appsrc is-live=true ! queue ! autovideosink").unwrap();
/// assert_eq!(pipeline.elements.len(), 3);
/// assert_eq!(pipeline.elements[0].name, "appsrc");
/// ```
pub fn parse_pipeline(input: &str) -> Result<ParsedPipeline> {
    pipeline
        .parse(input.trim())
        .map_err(|e| Error::Parse(e.to_string()))
}

/// Parse a complete pipeline.
fn pipeline(input: &mut &str) -> WResult<ParsedPipeline> {
    let elements = separated(1.., element, link_separator).parse_next(input)?;

    // Ensure we consumed all input
    multispace0.parse_next(input)?;
    if !input.is_empty() {
        return Err(ContextError::new());
    }

    Ok(ParsedPipeline { elements })
}

/// Parse an element (name + optional properties).
fn element(input: &mut &str) -> WResult<ParsedElement> {
    let _ = multispace0.parse_next(input)?;
    let name: &str = identifier.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    let properties: Vec<(String, PropertyValue)> = repeat(0.., property).parse_next(input)?;

    Ok(ParsedElement {
        name: name.to_string(),
        properties,
    })
}

/// Parse the link separator `!`.
fn link_separator(input: &mut &str) -> WResult<()> {
    let _ = multispace0.parse_next(input)?;
    let _ = '!'.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    Ok(())
}

/// Parse an identifier (element name or property name).
fn identifier<'a>(input: &mut &'a str) -> WResult<&'a str> {
    (
        alt((alpha1::<_, ContextError>, "_")),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    )
        .take()
        .parse_next(input)
}

/// Parse a property (key=value).
fn property(input: &mut &str) -> WResult<(String, PropertyValue)> {
    let _ = multispace0.parse_next(input)?;

    // Check if this looks like a property (identifier followed by =)
    // If not, don't consume anything
    let checkpoint = *input;

    let key: &str = match identifier.parse_next(input) {
        Ok(k) => k,
        Err(_) => {
            *input = checkpoint;
            return Err(ContextError::new());
        }
    };

    let _ = multispace0.parse_next(input)?;

    if input.starts_with('=') {
        let _ = '='.parse_next(input)?;
    } else {
        // Not a property, backtrack
        *input = checkpoint;
        return Err(ContextError::new());
    }

    let _ = multispace0.parse_next(input)?;
    let value = property_value.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    Ok((key.to_string(), value))
}

/// Parse a property value.
fn property_value(input: &mut &str) -> WResult<PropertyValue> {
    alt((
        quoted_string.map(PropertyValue::String),
        terminated_boolean.map(PropertyValue::Bool),
        terminated_float.map(PropertyValue::Float),
        terminated_integer.map(PropertyValue::Integer),
        bare_string.map(PropertyValue::String),
    ))
    .parse_next(input)
}

/// Parse a quoted string.
fn quoted_string(input: &mut &str) -> WResult<String> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .map(|s: &str| s.to_string())
    .parse_next(input)
}

/// True when the value token ends here (whitespace, `!`, or end of input).
fn at_value_end(input: &str) -> bool {
    input
        .chars()
        .next()
        .map_or(true, |c| c.is_whitespace() || c == '!')
}

/// Parse a boolean, only if it is the whole value token.
fn terminated_boolean(input: &mut &str) -> WResult<bool> {
    let checkpoint = *input;
    let value = alt((
        "true".map(|_| true),
        "false".map(|_| false),
        "yes".map(|_| true),
        "no".map(|_| false),
    ))
    .parse_next(input)?;

    if at_value_end(input) {
        Ok(value)
    } else {
        *input = checkpoint;
        Err(ContextError::new())
    }
}

/// Parse an integer, only if it is the whole value token.
fn terminated_integer(input: &mut &str) -> WResult<i64> {
    let checkpoint = *input;
    let negative = opt('-').parse_next(input)?;
    let digits: &str = digit1.parse_next(input)?;

    if !at_value_end(input) {
        *input = checkpoint;
        return Err(ContextError::new());
    }

    let value: i64 = digits.parse().map_err(|_| ContextError::new())?;
    Ok(if negative.is_some() { -value } else { value })
}

/// Parse a float, only if it is the whole value token.
fn terminated_float(input: &mut &str) -> WResult<f64> {
    let checkpoint = *input;
    let negative = opt('-').parse_next(input)?;
    let int_part: &str = digit1.parse_next(input)?;
    let _ = '.'.parse_next(input)?;
    let frac_part: &str = digit1.parse_next(input)?;

    if !at_value_end(input) {
        *input = checkpoint;
        return Err(ContextError::new());
    }

    let s = format!(
        "{}{}.{}",
        if negative.is_some() { "-" } else { "" },
        int_part,
        frac_part
    );
    s.parse().map_err(|_| ContextError::new())
}

/// Parse a bare (unquoted) value token.
///
/// Runs to the next whitespace or `!`. Unlike identifiers, a bare value may
/// contain `=`, `,`, and `/` so that embedded caps strings
/// (`video/x-raw,format=RGB,...`) parse as a single value.
fn bare_string(input: &mut &str) -> WResult<String> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '!')
        .map(|s: &str| s.to_string())
        .parse_next(input)
}
