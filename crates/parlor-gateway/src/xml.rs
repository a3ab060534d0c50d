// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat-XML element extraction for webhook payloads.
//!
//! Callback bodies are shallow documents of CDATA-wrapped elements; full
//! deserialization buys nothing over pulling the few named elements out.

use quick_xml::events::Event;
use quick_xml::Reader;

/// First text or CDATA content of the named element, if present.
pub fn extract_element(xml: &str, name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == name.as_bytes() => {
                inside = true;
            }
            Ok(Event::Text(t)) if inside => {
                return t.unescape().ok().map(|s| s.into_owned());
            }
            Ok(Event::CData(c)) if inside => {
                return String::from_utf8(c.into_inner().into_owned()).ok();
            }
            Ok(Event::End(_)) if inside => {
                // Element was empty.
                return None;
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}
