//! Terminal and JSON rendering of a [`ResultsView`].

use std::fmt;

use serde::Serialize;

use crate::media::{RenderPlan, VideoStage};
use crate::search::SearchState;
use crate::view::{ItemView, ResultsView};

/// Plain-text page. Renders nothing while idle.
pub struct TextPage<'a> {
    pub view: &'a ResultsView,
}

impl fmt::Display for TextPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        if let Some(msg) = view.state().message() {
            writeln!(f, "{}", msg)?;
        }
        if matches!(view.state(), SearchState::Ready(_)) {
            let page = view.visible();
            if page.page_items.is_empty() {
                writeln!(f, "Page {} is past the last page ({}).", view.page.current_page, view.page_count())?;
            } else {
                writeln!(
                    f,
                    "Showing {} - {} out of {} for: {}",
                    page.start_index + 1,
                    page.end_index,
                    page.total_items,
                    view.keywords().unwrap_or_default()
                )?;
            }
            for item in page.page_items {
                writeln!(f)?;
                write_item(f, item)?;
            }
            if view.show_controls() {
                writeln!(f)?;
                write_pager(f, view)?;
            }
        }
        if let Some(notice) = &view.notice {
            writeln!(f, "! {}", notice)?;
        }
        Ok(())
    }
}

fn write_item(f: &mut fmt::Formatter<'_>, item: &ItemView) -> fmt::Result {
    writeln!(f, "{}. {}", item.number, item.title)?;
    match (&item.nasa_id, &item.date) {
        (Some(id), Some(date)) => writeln!(f, "   {} | {}", id, date)?,
        (Some(only), None) | (None, Some(only)) => writeln!(f, "   {}", only)?,
        (None, None) => {}
    }
    match (&item.plan, item.video) {
        (RenderPlan::Image { url }, _) => writeln!(f, "   [image] {}", url)?,
        (RenderPlan::Video { thumbnail_url: Some(thumb), .. }, Some(VideoStage::Thumbnail)) => {
            writeln!(f, "   [video] thumbnail {} (v {} to play)", thumb, item.number)?
        }
        (RenderPlan::Video { video_url, .. }, _) => writeln!(f, "   [video] playing {}", video_url)?,
        (RenderPlan::Audio { url }, _) => writeln!(f, "   [audio] {}", url)?,
        (RenderPlan::Unavailable { message }, _) => writeln!(f, "   {}", message)?,
    }
    let Some(desc) = &item.description else { return Ok(()) };
    if desc.expanded {
        for seg in &desc.segments {
            if seg.speaker.is_empty() {
                writeln!(f, "   {}", seg.content)?;
            } else {
                writeln!(f, "   {}: {}", seg.speaker, seg.content)?;
            }
        }
    } else if !desc.preview.is_empty() {
        writeln!(f, "   {}", desc.preview)?;
    }
    if let Some(label) = desc.toggle_label() {
        writeln!(f, "   [{}: d {}]", label, item.number)?;
    }
    Ok(())
}

fn write_pager(f: &mut fmt::Formatter<'_>, view: &ResultsView) -> fmt::Result {
    let current = view.page.current_page;
    let last = view.page_count();
    write!(f, "Page {} of {}", current, last)?;
    if current > 1 {
        write!(f, "  < Prev (p)")?;
    }
    if current < last {
        write!(f, "  Next (n) >")?;
    }
    writeln!(f)
}

/// Machine-readable page for `--json`.
#[derive(Debug, Serialize)]
pub struct PageReport<'a> {
    pub keywords: Option<&'a str>,
    pub status: &'static str,
    pub message: Option<&'static str>,
    pub page: usize,
    pub page_count: usize,
    pub start: usize,
    pub end: usize,
    pub total: usize,
    pub items: &'a [ItemView],
}

impl<'a> PageReport<'a> {
    pub fn new(view: &'a ResultsView) -> Self {
        let page = view.visible();
        let status = match view.state() {
            SearchState::Idle => "idle",
            SearchState::Loading => "loading",
            SearchState::Error(_) => "error",
            SearchState::Ready(_) => "ready",
        };
        Self {
            keywords: view.keywords(),
            status,
            message: view.state().message(),
            page: view.page.current_page,
            page_count: view.page_count(),
            start: page.start_index + 1,
            end: page.end_index,
            total: page.total_items,
            items: page.page_items,
        }
    }
}
