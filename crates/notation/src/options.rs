use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Footer {
    Auto,
    Encoded,
    Always,
    None,
}

/// Renderer options. Every key is optional; unset keys fall back to the
/// renderer's own defaults and are left out of the serialized form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_margin_left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_margin_right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_margin_bottom: Option<u32>,
    /// Percent of the renderer's natural size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjust_page_height: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_vertically: Option<bool>,
}

impl RenderOptions {
    /// Options used for the tabbed score view.
    pub fn score_view() -> Self {
        Self {
            page_margin_top: Some(50),
            page_margin_left: Some(50),
            page_margin_right: Some(50),
            page_margin_bottom: Some(50),
            scale: Some(40),
            adjust_page_height: Some(true),
            footer: Some(Footer::None),
            justify_vertically: Some(false),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
