use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{Footer, NotationRenderer, RenderError, RenderOptions, RendererHandle};

const PAGE_WIDTH: u32 = 2100;
const PAGE_HEIGHT: u32 = 2970;
const LINE_HEIGHT: u32 = 60;
const DEFAULT_MARGIN: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartOutline {
    pub id: String,
    pub name: String,
    pub measures: usize,
}

/// Title and per-part measure counts of a score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreOutline {
    pub title: Option<String>,
    pub parts: Vec<PartOutline>,
}

impl ScoreOutline {
    /// Reads a MusicXML document, partwise or timewise.
    pub fn from_musicxml(text: &str) -> Result<Self, RenderError> {
        let mut reader = Reader::from_str(text);
        let mut outline = ScoreOutline::default();
        let mut root_checked = false;
        let mut current_part: Option<String> = None;
        let mut in_measure = false;
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut pending_id: Option<String> = None;

        loop {
            let event = reader.read_event().map_err(load_error)?;
            match event {
                Event::Start(ref start) | Event::Empty(ref start) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let name = start.local_name();
                    if !root_checked {
                        root_checked = true;
                        if !matches!(name.as_ref(), b"score-partwise" | b"score-timewise") {
                            return Err(RenderError::Load(format!(
                                "unsupported root element <{}>",
                                String::from_utf8_lossy(name.as_ref())
                            )));
                        }
                        continue;
                    }
                    match name.as_ref() {
                        b"score-part" => pending_id = attribute(start, b"id")?,
                        b"part-name" if !is_empty => {
                            let text = reader.read_text(start.name()).map_err(load_error)?;
                            let part_name = unescape(&text).map_err(load_error)?.trim().to_string();
                            if let Some(id) = pending_id.take() {
                                outline.parts.push(PartOutline {
                                    id,
                                    name: part_name,
                                    measures: 0,
                                });
                            }
                        }
                        b"work-title" | b"movement-title" if !is_empty && outline.title.is_none() => {
                            let text = reader.read_text(start.name()).map_err(load_error)?;
                            let title = unescape(&text).map_err(load_error)?.trim().to_string();
                            if !title.is_empty() {
                                outline.title = Some(title);
                            }
                        }
                        b"part" => {
                            let id = attribute(start, b"id")?.unwrap_or_default();
                            if in_measure {
                                *counts.entry(id).or_default() += 1;
                            } else if !is_empty {
                                current_part = Some(id);
                            }
                        }
                        b"measure" => {
                            if let Some(part) = &current_part {
                                *counts.entry(part.clone()).or_default() += 1;
                            }
                            in_measure = !is_empty;
                        }
                        _ => {}
                    }
                }
                Event::End(ref end) => match end.local_name().as_ref() {
                    b"measure" => in_measure = false,
                    b"part" if !in_measure => current_part = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_checked {
            return Err(RenderError::Load("document is empty".into()));
        }
        for part in &mut outline.parts {
            part.measures = counts.get(&part.id).copied().unwrap_or(0);
        }
        Ok(outline)
    }

    fn to_svg(&self, options: &RenderOptions) -> String {
        let scale = options.scale.unwrap_or(100).max(1);
        let top = options.page_margin_top.unwrap_or(DEFAULT_MARGIN);
        let left = options.page_margin_left.unwrap_or(DEFAULT_MARGIN);
        let right = options.page_margin_right.unwrap_or(DEFAULT_MARGIN);
        let bottom = options.page_margin_bottom.unwrap_or(DEFAULT_MARGIN);

        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(format!(r#"<text class="title">{}</text>"#, escape(title)));
        }
        for part in &self.parts {
            lines.push(format!(
                r#"<text class="part" data-part="{}">{} ({} measures)</text>"#,
                escape(&part.id),
                escape(&part.name),
                part.measures
            ));
        }
        if options.footer != Some(Footer::None) {
            lines.push(format!(
                r#"<text class="footer">{} parts</text>"#,
                self.parts.len()
            ));
        }

        let content_height = lines.len() as u32 * LINE_HEIGHT;
        let page_height = if options.adjust_page_height.unwrap_or(false) {
            top + content_height + bottom
        } else {
            PAGE_HEIGHT.max(top + content_height + bottom)
        };
        let gap = if options.justify_vertically.unwrap_or(false) && !lines.is_empty() {
            (page_height - top - bottom) / lines.len() as u32
        } else {
            LINE_HEIGHT
        };

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}px" height="{h}px" viewBox="0 0 {vw} {vh}">"#,
            w = PAGE_WIDTH * scale / 100,
            h = page_height * scale / 100,
            vw = PAGE_WIDTH,
            vh = page_height,
        );
        svg.push_str(&format!(
            r#"<g class="page-margin" transform="translate({left}, {top})" data-right="{right}">"#
        ));
        for (index, line) in lines.iter().enumerate() {
            let y = (index as u32 + 1) * gap;
            svg.push_str(&line.replacen("<text ", &format!(r#"<text x="0" y="{y}" "#), 1));
        }
        svg.push_str("</g></svg>");
        svg
    }
}

fn attribute(start: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, RenderError> {
    match start.try_get_attribute(key).map_err(load_error)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(load_error)?.into_owned())),
        None => Ok(None),
    }
}

fn load_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Load(err.to_string())
}

/// Renders MusicXML as a one-page outline listing the title and each part's
/// measure count. Used where no engraving engine is available.
#[derive(Debug, Default)]
pub struct OutlineRenderer {
    next_id: AtomicU64,
    documents: Mutex<HashMap<u64, ScoreOutline>>,
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outline(&self, handle: &RendererHandle) -> Option<ScoreOutline> {
        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(&handle.id).cloned())
    }

    /// Number of documents currently held.
    pub fn loaded(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }
}

#[async_trait]
impl NotationRenderer for OutlineRenderer {
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    async fn load_markup(&self, text: &str) -> Result<RendererHandle, RenderError> {
        let outline = ScoreOutline::from_musicxml(text)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, parts = outline.parts.len(), "loaded score outline");
        self.documents
            .lock()
            .map_err(|_| RenderError::Load("renderer state poisoned".into()))?
            .insert(id, outline);
        Ok(RendererHandle { id, pages: 1 })
    }

    fn render(
        &self,
        handle: &RendererHandle,
        page: u32,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        if page == 0 || page > handle.pages {
            return Err(RenderError::Page {
                page,
                pages: handle.pages,
            });
        }
        let outline = self
            .outline(handle)
            .ok_or(RenderError::UnknownHandle(handle.id))?;
        Ok(outline.to_svg(options))
    }

    fn release(&self, handle: &RendererHandle) {
        if let Ok(mut docs) = self.documents.lock() {
            if docs.remove(&handle.id).is_some() {
                debug!(id = handle.id, "released score outline");
            }
        }
    }
}
