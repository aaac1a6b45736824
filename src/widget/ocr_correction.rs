//! OCR correction view: lists every transcribed cell with its image, the
//! current text and a corrected/pending indicator.
//!
//! Data points are fetched once per mounted view. Each mount gets a fresh
//! [`ViewId`] so a response that arrives after the view was unmounted (or
//! replaced) can be recognised and dropped.

use std::collections::BTreeMap;

use crate::config::{AnnotatorConfig, ShapeColor};
use crate::ocr::{CellKey, CorrectionStatus, OcrDataPoint};

pub const LOADING_MESSAGE: &str = "Loading";
pub const EMPTY_MESSAGE: &str = "There are no data points yet";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ocr-view-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded(Vec<OcrDataPoint>),
    Failed(String),
}

/// One row of the rendered list
#[derive(Clone, Debug, PartialEq)]
pub struct OcrItemView {
    pub key: CellKey,
    pub image_url: String,
    pub image_width: u32,
    pub image_height: u32,
    pub text: String,
    pub status: CorrectionStatus,
    pub indicator: ShapeColor,
    /// The operator changed the text locally
    pub edited: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OcrViewContent {
    Loading,
    Empty,
    Items(Vec<OcrItemView>),
    Failed(String),
}

impl OcrViewContent {
    /// Placeholder text shown instead of the list
    pub fn message(&self) -> Option<&str> {
        match self {
            OcrViewContent::Loading => Some(LOADING_MESSAGE),
            OcrViewContent::Empty => Some(EMPTY_MESSAGE),
            OcrViewContent::Failed(err) => Some(err),
            OcrViewContent::Items(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OcrCorrectionView {
    id: ViewId,
    state: LoadState,
    drafts: BTreeMap<CellKey, String>,
}

impl OcrCorrectionView {
    pub fn new(id: ViewId) -> Self {
        Self {
            id,
            state: LoadState::NotLoaded,
            drafts: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Move to `Loading` if nothing was requested yet.
    ///
    /// Returns `true` exactly once per load cycle; the caller issues the
    /// fetch. A failed load stays failed until [`Self::retry`].
    pub fn request_load(&mut self) -> bool {
        if self.state != LoadState::NotLoaded {
            return false;
        }
        log::debug!("{}: requesting data points", self.id);
        self.state = LoadState::Loading;
        true
    }

    /// Apply a fetch result. Ignored unless a load is in flight.
    pub fn on_loaded(&mut self, result: Result<Vec<OcrDataPoint>, String>) -> bool {
        if self.state != LoadState::Loading {
            log::debug!("{}: unexpected data points, ignoring", self.id);
            return false;
        }
        self.state = match result {
            Ok(points) => {
                log::info!("{}: loaded {} data points", self.id, points.len());
                LoadState::Loaded(points)
            }
            Err(err) => {
                log::error!("{}: failed to load data points: {err}", self.id);
                LoadState::Failed(err)
            }
        };
        true
    }

    /// Allow a new fetch after a failure
    pub fn retry(&mut self) -> bool {
        if matches!(self.state, LoadState::Failed(_)) {
            self.state = LoadState::NotLoaded;
            true
        } else {
            false
        }
    }

    /// Keep a local edit of a cell's text; unknown cells are rejected
    pub fn edit(&mut self, key: CellKey, text: String) -> bool {
        let LoadState::Loaded(points) = &self.state else {
            return false;
        };
        let Some(point) = points.iter().find(|point| point.key() == key) else {
            log::warn!("{}: edit for unknown cell {key:?}", self.id);
            return false;
        };
        if point.display_text() == text {
            self.drafts.remove(&key);
        } else {
            self.drafts.insert(key, text);
        }
        true
    }

    pub fn drafts(&self) -> &BTreeMap<CellKey, String> {
        &self.drafts
    }

    pub fn render(&self, config: &AnnotatorConfig) -> OcrViewContent {
        match &self.state {
            LoadState::NotLoaded | LoadState::Loading => OcrViewContent::Loading,
            LoadState::Failed(err) => OcrViewContent::Failed(err.clone()),
            LoadState::Loaded(points) if points.is_empty() => OcrViewContent::Empty,
            LoadState::Loaded(points) => OcrViewContent::Items(
                points
                    .iter()
                    .map(|point| self.item(point, config))
                    .collect(),
            ),
        }
    }

    fn item(&self, point: &OcrDataPoint, config: &AnnotatorConfig) -> OcrItemView {
        let key = point.key();
        let draft = self.drafts.get(&key);
        let status = point.status();
        OcrItemView {
            image_url: point.image_path.clone(),
            image_width: point.image_width,
            image_height: point.image_height,
            text: draft.cloned().unwrap_or_else(|| point.display_text().to_string()),
            indicator: match status {
                CorrectionStatus::Corrected => config.corrected_color,
                CorrectionStatus::Pending => config.pending_color,
            },
            status,
            edited: draft.is_some(),
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(cell_id: u32, human_text: Option<&str>) -> OcrDataPoint {
        OcrDataPoint {
            image_name: "p1.jpg".into(),
            table_idx: 0,
            cell_id,
            ocr_text: format!("ocr {cell_id}"),
            human_text: human_text.map(str::to_string),
            image_path: format!("/cells/p1_0_{cell_id}.jpg"),
            image_width: 80,
            image_height: 20,
        }
    }

    fn loaded(points: Vec<OcrDataPoint>) -> OcrCorrectionView {
        let mut view = OcrCorrectionView::new(ViewId(1));
        assert!(view.request_load());
        assert!(view.on_loaded(Ok(points)));
        view
    }

    #[test]
    fn test_loads_once() {
        let mut view = OcrCorrectionView::new(ViewId(1));
        assert_eq!(view.render(&AnnotatorConfig::default()), OcrViewContent::Loading);
        assert!(view.request_load());
        assert!(!view.request_load());
        view.on_loaded(Ok(vec![point(0, None)]));
        assert!(!view.request_load());
    }

    #[test]
    fn test_empty_message() {
        let view = loaded(Vec::new());
        let content = view.render(&AnnotatorConfig::default());
        assert_eq!(content, OcrViewContent::Empty);
        assert_eq!(content.message(), Some("There are no data points yet"));
    }

    #[test]
    fn test_status_colors() {
        let config = AnnotatorConfig::default();
        let view = loaded(vec![point(0, Some("1913")), point(1, None), point(2, Some(""))]);
        let OcrViewContent::Items(items) = view.render(&config) else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].indicator, config.corrected_color);
        assert_eq!(items[0].text, "1913");
        assert_eq!(items[1].indicator, config.pending_color);
        assert_eq!(items[1].text, "ocr 1");
        assert_eq!(items[2].status, CorrectionStatus::Corrected);
        assert_eq!(items[1].image_url, "/cells/p1_0_1.jpg");
    }

    #[test]
    fn test_failure_needs_retry() {
        let mut view = OcrCorrectionView::new(ViewId(1));
        view.request_load();
        view.on_loaded(Err("connection refused".into()));
        assert_eq!(
            view.render(&AnnotatorConfig::default()),
            OcrViewContent::Failed("connection refused".into())
        );
        assert!(!view.request_load());
        assert!(view.retry());
        assert!(view.request_load());
    }

    #[test]
    fn test_result_without_request_is_ignored() {
        let mut view = OcrCorrectionView::new(ViewId(1));
        assert!(!view.on_loaded(Ok(vec![point(0, None)])));
        assert_eq!(view.state(), &LoadState::NotLoaded);
    }

    #[test]
    fn test_edit_keeps_status() {
        let config = AnnotatorConfig::default();
        let mut view = loaded(vec![point(0, None)]);
        let key = point(0, None).key();
        assert!(view.edit(key.clone(), "1914".into()));
        let OcrViewContent::Items(items) = view.render(&config) else {
            panic!("expected items");
        };
        assert_eq!(items[0].text, "1914");
        assert!(items[0].edited);
        assert_eq!(items[0].status, CorrectionStatus::Pending);

        // Typing the OCR text back drops the draft
        assert!(view.edit(key, "ocr 0".into()));
        assert!(view.drafts().is_empty());
    }

    #[test]
    fn test_edit_unknown_cell() {
        let mut view = loaded(vec![point(0, None)]);
        assert!(!view.edit(point(7, None).key(), "x".into()));
    }
}
