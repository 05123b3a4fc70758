//! Presentation view-model.
//!
//! [`ResultsView`] owns everything the presentation layer mutates: the page
//! pointer, per-item video stages and description toggles. All changes go
//! through [`ResultsView::reduce`].

use serde::Serialize;

use crate::describe::DescriptionView;
use crate::media::{resolve, RenderPlan, VideoStage};
use crate::pager::{page_count, PageSlice, PageState};
use crate::search::{Snapshot, SearchState};
use crate::types::{MediaType, ResultItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    /// 1-based position in the full result set.
    pub number: usize,
    pub title: String,
    pub media_type: Option<MediaType>,
    pub nasa_id: Option<String>,
    /// Calendar date part of `date_created`.
    pub date: Option<String>,
    pub plan: RenderPlan,
    pub video: Option<VideoStage>,
    pub description: Option<DescriptionView>,
}

impl ItemView {
    pub fn new(number: usize, item: &ResultItem, preview_length: usize) -> Self {
        let media_type = item.media_type();
        let plan = resolve(item);
        let description = match (item.description(), media_type) {
            (Some(text), _) => Some(DescriptionView::new(text, media_type, preview_length)),
            // audio always gets a transcript block, even an empty one
            (None, Some(MediaType::Audio)) => Some(DescriptionView::new("", media_type, preview_length)),
            (None, _) => None,
        };
        let meta = item.metadata();
        Self {
            number,
            title: item.title().to_string(),
            media_type,
            nasa_id: meta.and_then(|m| m.nasa_id.clone()),
            date: meta.and_then(|m| m.date_created.as_deref()).and_then(|d| d.split('T').next()).map(str::to_string),
            video: VideoStage::initial(&plan),
            plan,
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    /// Adopt the orchestrator's latest snapshot.
    Sync(Snapshot),
    NextPage,
    PrevPage,
    GoToPage(usize),
    /// Item number as shown (1-based).
    RevealVideo(usize),
    ToggleDescription(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub page: PageState,
    pub preview_length: usize,
    /// Inline notice for the last action, e.g. an unknown item number.
    pub notice: Option<String>,
    snapshot: Option<Snapshot>,
    items: Vec<ItemView>,
}

impl ResultsView {
    pub fn new(page: PageState, preview_length: usize) -> Self {
        Self { page, preview_length, notice: None, snapshot: None, items: Vec::new() }
    }

    pub fn reduce(mut self, action: ViewAction) -> Self {
        self.notice = None;
        match action {
            ViewAction::Sync(snapshot) => {
                if self.snapshot.as_ref() != Some(&snapshot) {
                    if let Some(sub) = &snapshot.submission {
                        self.page.observe(sub.id);
                    }
                    self.items = snapshot
                        .state
                        .items()
                        .iter()
                        .enumerate()
                        .map(|(i, item)| ItemView::new(i + 1, item, self.preview_length))
                        .collect();
                    self.snapshot = Some(snapshot);
                }
            }
            ViewAction::NextPage => self.page.next(self.items.len()),
            ViewAction::PrevPage => self.page.prev(),
            ViewAction::GoToPage(n) => self.page.go_to(n),
            ViewAction::RevealVideo(n) => match self.item_mut(n) {
                Some(ItemView { video: Some(stage), .. }) => *stage = stage.reveal(),
                Some(_) => self.notice = Some(format!("Item {} has no video to play", n)),
                None => self.notice = Some(format!("No item {} on this search", n)),
            },
            ViewAction::ToggleDescription(n) => match self.item_mut(n) {
                Some(item) => match item.description.take() {
                    Some(d) => item.description = Some(d.toggle()),
                    None => self.notice = Some(format!("Item {} has no description", n)),
                },
                None => self.notice = Some(format!("No item {} on this search", n)),
            },
        }
        self
    }

    fn item_mut(&mut self, number: usize) -> Option<&mut ItemView> {
        number.checked_sub(1).and_then(|i| self.items.get_mut(i))
    }

    pub fn state(&self) -> &SearchState {
        self.snapshot.as_ref().map(|s| &s.state).unwrap_or(&SearchState::Idle)
    }

    pub fn keywords(&self) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.submission.as_ref()).map(|s| s.params.keywords.as_str())
    }

    pub fn items(&self) -> &[ItemView] { &self.items }

    pub fn visible(&self) -> PageSlice<'_, ItemView> { self.page.slice(&self.items) }

    pub fn page_count(&self) -> usize { page_count(self.items.len(), self.page.page_size) }

    pub fn show_controls(&self) -> bool { self.page.show_controls(self.items.len()) }
}
