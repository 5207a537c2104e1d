use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::RenderError;

const MAX_WIDTH: &str = "max-width: 100%";

/// Rewrites the root element of rendered markup so it spans its container:
/// `width="100%"`, `height="auto"` and a `max-width: 100%` style. Everything
/// below the root is copied through untouched.
pub fn make_responsive(markup: &str) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len() + 64));
    let mut root_seen = false;

    loop {
        let event = reader.read_event().map_err(markup_error)?;
        let written = match event {
            Event::Eof => break,
            Event::Start(start) if !root_seen => {
                root_seen = true;
                writer.write_event(Event::Start(responsive_root(&start)?))
            }
            Event::Empty(start) if !root_seen => {
                root_seen = true;
                writer.write_event(Event::Empty(responsive_root(&start)?))
            }
            other => writer.write_event(other),
        };
        written.map_err(markup_error)?;
    }

    if !root_seen {
        return Err(RenderError::Markup("no root element".into()));
    }
    String::from_utf8(writer.into_inner()).map_err(|err| RenderError::Markup(err.to_string()))
}

fn responsive_root(start: &BytesStart<'_>) -> Result<BytesStart<'static>, RenderError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut root = BytesStart::new(name);
    let mut style = None;
    for attr in start.attributes() {
        let attr = attr.map_err(|err| RenderError::Markup(err.to_string()))?;
        match attr.key.as_ref() {
            b"width" | b"height" => {}
            b"style" => {
                style = Some(attr.unescape_value().map_err(markup_error)?.into_owned());
            }
            _ => root.push_attribute(attr),
        }
    }
    let style = match style.as_deref().map(|s| s.trim().trim_end_matches(';')) {
        Some(existing) if !existing.is_empty() => format!("{existing}; {MAX_WIDTH}"),
        _ => MAX_WIDTH.to_string(),
    };
    root.push_attribute(("width", "100%"));
    root.push_attribute(("height", "auto"));
    root.push_attribute(("style", style.as_str()));
    Ok(root)
}

fn markup_error(err: quick_xml::Error) -> RenderError {
    RenderError::Markup(err.to_string())
}
