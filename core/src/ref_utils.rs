#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Builds and parses local `#/components/{section}/{name}` references.
//! Names are JSON Pointer encoded and then percent-encoded as a URI fragment,
//! so any component name survives a round trip.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that may not appear verbatim in a URI fragment, plus `%` itself.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Component section holding schemas.
pub const SCHEMAS: &str = "schemas";

/// Component section holding reusable parameters.
pub const PARAMETERS: &str = "parameters";

/// Builds a local reference to a component.
pub fn component_pointer(section: &str, name: &str) -> String {
    format!("#/components/{}/{}", section, encode_pointer_segment(name))
}

/// Builds a local reference to a schema component.
pub fn schema_pointer(name: &str) -> String {
    component_pointer(SCHEMAS, name)
}

/// Builds a local reference to a parameter component.
pub fn parameter_pointer(name: &str) -> String {
    component_pointer(PARAMETERS, name)
}

/// Splits a local reference into `(section, name)`.
///
/// Returns `None` for external references and pointers outside `components`.
pub fn parse_component_ref(ref_str: &str) -> Option<(String, String)> {
    let pointer = ref_str.strip_prefix("#/")?;
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 || segments[0] != "components" {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() {
        None
    } else {
        Some((segments[1].to_string(), name))
    }
}

/// Encodes a pointer segment for use in a `$ref` fragment
/// (`~` -> `~0`, `/` -> `~1`, then percent-encoding).
pub fn encode_pointer_segment(segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    utf8_percent_encode(&escaped, FRAGMENT).to_string()
}

/// Reverses [`encode_pointer_segment`]: percent-decoding first, then `~1` and `~0`.
pub fn decode_pointer_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8_lossy()
        .replace("~1", "/")
        .replace("~0", "~")
}
