//! Per-item preview resolution.
//!
//! [`resolve`] is a pure mapping from a result item to a [`RenderPlan`]. The
//! click-to-play state of a video lives in the view-model as a [`VideoStage`].

use serde::Serialize;

use crate::types::{LinkRef, MediaType, ResultItem};

pub const IMAGE_UNAVAILABLE: &str = "Image preview not available";
pub const VIDEO_UNAVAILABLE: &str = "Video unavailable";
pub const VIDEO_PREVIEW_UNAVAILABLE: &str = "Video preview unavailable";
pub const AUDIO_UNAVAILABLE: &str = "Audio not available";
pub const PREVIEW_UNAVAILABLE: &str = "Preview not available";

/// Direct media the player can open.
const PLAYABLE_EXTENSIONS: &[&str] = &[".mp4", ".m4v", ".mov", ".webm"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".m4a", ".wav", ".ogg"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderPlan {
    Image { url: String },
    Video { thumbnail_url: Option<String>, video_url: String },
    Audio { url: String },
    Unavailable { message: &'static str },
}

/// How a video plan is presented before playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reveal {
    /// No thumbnail; the player is shown straight away.
    Immediate,
    /// Thumbnail first, swapped for the player on click.
    OnClick,
}

impl RenderPlan {
    pub fn unavailable(message: &'static str) -> Self { RenderPlan::Unavailable { message } }

    pub fn is_available(&self) -> bool { !matches!(self, RenderPlan::Unavailable { .. }) }

    /// `None` for anything that is not a video.
    pub fn reveal(&self) -> Option<Reveal> {
        match self {
            RenderPlan::Video { thumbnail_url: Some(_), .. } => Some(Reveal::OnClick),
            RenderPlan::Video { thumbnail_url: None, .. } => Some(Reveal::Immediate),
            _ => None,
        }
    }
}

pub fn resolve(item: &ResultItem) -> RenderPlan {
    match item.media_type() {
        Some(MediaType::Image) => resolve_image(item),
        Some(MediaType::Video) => resolve_video(item),
        Some(MediaType::Audio) => resolve_audio(item),
        None => RenderPlan::unavailable(PREVIEW_UNAVAILABLE),
    }
}

fn resolve_image(item: &ResultItem) -> RenderPlan {
    match item.links().first().and_then(LinkRef::url) {
        Some(url) => RenderPlan::Image { url: url.to_string() },
        None => RenderPlan::unavailable(IMAGE_UNAVAILABLE),
    }
}

fn resolve_video(item: &ResultItem) -> RenderPlan {
    let links = item.links();
    if links.is_empty() {
        return RenderPlan::unavailable(VIDEO_PREVIEW_UNAVAILABLE);
    }
    let thumbnail = links
        .iter()
        .filter(|l| l.render.as_deref() == Some("image"))
        .find_map(LinkRef::url);
    let video = links
        .iter()
        .filter_map(LinkRef::url)
        .find(|u| has_extension(u, PLAYABLE_EXTENSIONS));

    match video {
        Some(v) => RenderPlan::Video { thumbnail_url: thumbnail.map(str::to_string), video_url: v.to_string() },
        None => RenderPlan::unavailable(VIDEO_UNAVAILABLE),
    }
}

fn resolve_audio(item: &ResultItem) -> RenderPlan {
    let direct = item
        .links()
        .iter()
        .filter_map(LinkRef::url)
        .find(|u| has_extension(u, AUDIO_EXTENSIONS))
        .or_else(|| item.href.as_deref().filter(|h| !h.is_empty()));
    match direct {
        Some(url) => RenderPlan::Audio { url: url.to_string() },
        None => RenderPlan::unavailable(AUDIO_UNAVAILABLE),
    }
}

fn has_extension(url: &str, exts: &[&str]) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    exts.iter().any(|e| path.ends_with(e))
}

/// Click-to-play state of one video item. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStage {
    Thumbnail,
    Playing,
}

impl VideoStage {
    /// Starting stage for a plan, `None` when the plan is not a video.
    pub fn initial(plan: &RenderPlan) -> Option<Self> {
        plan.reveal().map(|r| match r {
            Reveal::OnClick => VideoStage::Thumbnail,
            Reveal::Immediate => VideoStage::Playing,
        })
    }

    pub fn reveal(self) -> Self { VideoStage::Playing }
}
