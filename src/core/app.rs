use image::RgbaImage;

use crate::config::AnnotatorConfig;
use crate::domain::{PageImage, Point, TableRecord};
use crate::render::image::predict_next_row_position;
use crate::session::messages::{BackendMsg, Msg, OcrMsg, PageMsg, TableMsg};
use crate::session::shortcuts;
use crate::session::state::AnnotationStore;
use crate::widget::event::PointerEvent;
use crate::widget::ocr_correction::{OcrCorrectionView, OcrViewContent, ViewId};
use crate::widget::page_image::{PageAction, TableOutlineController};
use crate::widget::row_knobs::{KnobAction, RowKnobController};

/// Effects requested by [`App::update`]; the runtime turns each finished
/// effect back into a [`Msg`].
#[derive(Debug, Clone)]
pub enum Task {
    None,
    FetchDataPoints { view: ViewId },
    FetchTables { image: String },
    StoreTables { image: String, tables: Vec<TableRecord> },
    FetchImages,
    Batch(Vec<Task>),
}

impl Task {
    pub fn none() -> Self {
        Task::None
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|task| !matches!(task, Task::None))
            .collect();
        match tasks.len() {
            0 => Task::None,
            1 => tasks.remove(0),
            _ => Task::Batch(tasks),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Task::None)
    }
}

pub struct App {
    config: AnnotatorConfig,
    /// Mounted page, if any
    store: Option<AnnotationStore>,
    /// Decoded pixels of the mounted page, used for row prediction
    raster: Option<RgbaImage>,
    outline: TableOutlineController,
    knobs: RowKnobController,
    ocr_view: Option<OcrCorrectionView>,
    next_view_id: u64,
    images: Vec<PageImage>,
    last_pointer: Option<Point>,
    last_error: Option<String>,
}

impl App {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self {
            config,
            store: None,
            raster: None,
            outline: TableOutlineController,
            knobs: RowKnobController::default(),
            ocr_view: None,
            next_view_id: 1,
            images: Vec::new(),
            last_pointer: None,
            last_error: None,
        }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&AnnotationStore> {
        self.store.as_ref()
    }

    pub fn raster(&self) -> Option<&RgbaImage> {
        self.raster.as_ref()
    }

    pub fn images(&self) -> &[PageImage] {
        &self.images
    }

    pub fn ocr_view(&self) -> Option<&OcrCorrectionView> {
        self.ocr_view.as_ref()
    }

    pub fn ocr_content(&self) -> Option<OcrViewContent> {
        self.ocr_view.as_ref().map(|view| view.render(&self.config))
    }

    /// Most recent failed effect, for display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Pixels of the mounted page. Dropped when the page unmounts.
    ///
    /// The raster must match the page's listed size, otherwise table
    /// coordinates would not line up with its pixels.
    pub fn attach_raster(&mut self, raster: RgbaImage) -> anyhow::Result<()> {
        let Some(store) = self.store.as_ref() else {
            log::debug!("No page mounted, dropping raster");
            return Ok(());
        };
        let page = store.page();
        if raster.dimensions() != (page.width, page.height) {
            anyhow::bail!(
                "Raster is {}x{} but {} is {}x{}",
                raster.width(),
                raster.height(),
                page.name,
                page.width,
                page.height
            );
        }
        self.raster = Some(raster);
        Ok(())
    }

    pub fn update(&mut self, msg: Msg) -> Task {
        match msg {
            Msg::Page(msg) => self.update_page(msg),
            Msg::Pointer(event) => {
                self.on_pointer(event);
                Task::none()
            }
            Msg::Key(key, modifiers) => {
                let Some(store) = self.store.as_ref() else {
                    return Task::none();
                };
                match shortcuts::handle_key_event(store, &self.config, &key, modifiers) {
                    Some(msg) => self.update(msg),
                    None => Task::none(),
                }
            }
            Msg::Table(msg) => self.update_table(msg),
            Msg::Ocr(msg) => self.update_ocr(msg),
            Msg::Backend(msg) => self.update_backend(msg),
            Msg::ListImages => Task::FetchImages,
            Msg::Batch(msgs) => {
                let tasks: Vec<Task> = msgs.into_iter().map(|msg| self.update(msg)).collect();
                Task::batch(tasks)
            }
        }
    }

    // ========================================================================
    // Page
    // ========================================================================

    fn update_page(&mut self, msg: PageMsg) -> Task {
        match msg {
            PageMsg::Mount(page) => {
                log::info!("Mounting page {}", page.name);
                self.unmount_page();
                self.store = Some(AnnotationStore::new(page));
                Task::none()
            }
            PageMsg::Measured(position) => {
                if let Some(store) = self.store.as_mut() {
                    store.set_document_position(position);
                }
                Task::none()
            }
            PageMsg::LoadTables => match self.store.as_ref() {
                Some(store) => Task::FetchTables {
                    image: store.page().name.clone(),
                },
                None => Task::none(),
            },
            PageMsg::Unmount => {
                self.unmount_page();
                Task::none()
            }
        }
    }

    fn unmount_page(&mut self) {
        if let Some(mut store) = self.store.take() {
            store.reset_tables();
            log::debug!("Unmounted page {}", store.page().name);
        }
        self.raster = None;
        self.knobs.reset();
        self.last_pointer = None;
    }

    fn on_pointer(&mut self, mut event: PointerEvent) {
        self.last_pointer = Some(event.position);
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match self.knobs.on_pointer(store, &mut event) {
            KnobAction::None => {}
            action => log::debug!("Knob: {action:?}"),
        }
        if event.is_propagation_stopped() {
            return;
        }
        match self.outline.on_pointer(store, &mut event) {
            PageAction::None => {}
            action => log::debug!("Page: {action:?}"),
        }
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn update_table(&mut self, msg: TableMsg) -> Task {
        let Some(store) = self.store.as_mut() else {
            log::debug!("{msg:?} without a mounted page");
            return Task::none();
        };
        match msg {
            TableMsg::Rotate(degrees) => store.rotate(degrees),
            TableMsg::CancelOutline => {
                store.cancel_outline();
            }
            TableMsg::Deselect => {
                store.select_table(None);
            }
            TableMsg::DeleteSelectedRow => {
                store.delete_selected_row();
            }
            TableMsg::AddRowAtPointer => {
                if let Some(pointer) = self.last_pointer {
                    store.add_row(pointer);
                }
            }
            TableMsg::PredictNextRow => {
                let predicted = self
                    .raster
                    .as_ref()
                    .zip(store.selected_table_outline())
                    .and_then(|(raster, table)| predict_next_row_position(raster, table));
                match predicted {
                    Some(y) => {
                        store.insert_row_at(y);
                    }
                    None => log::debug!("No row prediction available"),
                }
            }
            TableMsg::Save => {
                return Task::StoreTables {
                    image: store.page().name.clone(),
                    tables: store.table_records(),
                };
            }
        }
        Task::none()
    }

    // ========================================================================
    // OCR correction
    // ========================================================================

    fn update_ocr(&mut self, msg: OcrMsg) -> Task {
        match msg {
            OcrMsg::Mount => {
                let id = ViewId(self.next_view_id);
                self.next_view_id += 1;
                self.ocr_view = Some(OcrCorrectionView::new(id));
                self.request_data_points()
            }
            OcrMsg::Unmount => {
                self.ocr_view = None;
                Task::none()
            }
            OcrMsg::Loaded { view, result } => {
                match self.ocr_view.as_mut() {
                    Some(current) if current.id() == view => {
                        if let Err(err) = &result {
                            self.last_error = Some(err.clone());
                        }
                        current.on_loaded(result);
                    }
                    _ => log::debug!("Discarding data points for unmounted {view}"),
                }
                Task::none()
            }
            OcrMsg::Edit { key, text } => {
                if let Some(view) = self.ocr_view.as_mut() {
                    view.edit(key, text);
                }
                Task::none()
            }
            OcrMsg::Retry => {
                if self.ocr_view.as_mut().is_some_and(|view| view.retry()) {
                    self.request_data_points()
                } else {
                    Task::none()
                }
            }
        }
    }

    fn request_data_points(&mut self) -> Task {
        if let Some(view) = self.ocr_view.as_mut() {
            if view.request_load() {
                return Task::FetchDataPoints { view: view.id() };
            }
        }
        Task::none()
    }

    // ========================================================================
    // Backend responses
    // ========================================================================

    fn update_backend(&mut self, msg: BackendMsg) -> Task {
        match msg {
            BackendMsg::TablesLoaded { image, result } => {
                let Some(store) = self
                    .store
                    .as_mut()
                    .filter(|store| store.page().name == image)
                else {
                    log::debug!("Discarding tables for {image}, page not mounted");
                    return Task::none();
                };
                match result {
                    Ok(records) => store.load_tables(&records),
                    Err(err) => {
                        log::error!("Failed to load tables for {image}: {err}");
                        self.last_error = Some(err);
                    }
                }
            }
            BackendMsg::TablesStored { image, result } => match result {
                Ok(msg) => log::info!("Stored tables for {image}: {msg}"),
                Err(err) => {
                    log::error!("Failed to store tables for {image}: {err}");
                    self.last_error = Some(err);
                }
            },
            BackendMsg::ImagesListed(result) => match result {
                Ok(images) => {
                    log::info!("Backend lists {} images", images.len());
                    self.images = images;
                }
                Err(err) => {
                    log::error!("Failed to list images: {err}");
                    self.last_error = Some(err);
                }
            },
        }
        Task::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Selection, TableRecord};
    use crate::ocr::OcrDataPoint;
    use crate::session::shortcuts::{Key, Named};
    use crate::widget::event::{Modifiers, PointerKind};

    fn mounted() -> App {
        let mut app = App::new(AnnotatorConfig::default());
        app.update(Msg::mount(PageImage::new("p1.jpg", "p1.jpg", 800, 600)));
        app.update(Msg::measured(Point::new(100.0, 50.0)));
        app
    }

    fn click(app: &mut App, x: f32, y: f32) {
        app.update(Msg::Pointer(PointerEvent::click(Point::new(x, y))));
    }

    fn key(app: &mut App, key: Key) -> Task {
        app.update(Msg::Key(key, Modifiers::NONE))
    }

    fn selection(app: &App) -> Selection {
        app.store().unwrap().selection()
    }

    #[test]
    fn test_outline_then_deselect() {
        let mut app = mounted();
        click(&mut app, 150.0, 120.0);
        assert!(app.store().unwrap().interaction().is_outlining());
        click(&mut app, 400.0, 300.0);
        assert!(matches!(selection(&app), Selection::TableSelected(_)));
        click(&mut app, 700.0, 600.0);
        assert_eq!(selection(&app), Selection::NoSelection);
        assert_eq!(app.store().unwrap().tables().len(), 1);
    }

    #[test]
    fn test_knob_click_does_not_deselect() {
        let mut app = mounted();
        click(&mut app, 150.0, 120.0);
        click(&mut app, 400.0, 300.0);
        // Shift+click inside the table adds a row boundary at frame y 150
        app.update(Msg::Pointer(
            PointerEvent::click(Point::new(200.0, 200.0)).with_modifiers(Modifiers {
                shift: true,
                control: false,
            }),
        ));
        let knob = crate::widget::row_knobs::layout(app.store().unwrap())[0];
        click(&mut app, knob.center.x, knob.center.y);
        assert!(matches!(selection(&app), Selection::RowSelected(_, 0)));
    }

    #[test]
    fn test_keyboard_row_workflow() {
        let mut app = mounted();
        click(&mut app, 150.0, 120.0);
        click(&mut app, 400.0, 300.0);
        app.update(Msg::Pointer(PointerEvent::new(
            PointerKind::Move,
            Point::new(200.0, 220.0),
        )));
        key(&mut app, Key::character("a"));
        assert_eq!(app.store().unwrap().selected_table_outline().unwrap().rows(), &[170.0]);

        let knob = crate::widget::row_knobs::layout(app.store().unwrap())[0];
        click(&mut app, knob.center.x, knob.center.y);
        key(&mut app, Key::Named(Named::Delete));
        assert!(matches!(selection(&app), Selection::TableSelected(_)));
        assert!(app.store().unwrap().selected_table_outline().unwrap().rows().is_empty());

        key(&mut app, Key::Named(Named::Escape));
        assert_eq!(selection(&app), Selection::NoSelection);
    }

    #[test]
    fn test_escape_cancels_outline() {
        let mut app = mounted();
        click(&mut app, 150.0, 120.0);
        key(&mut app, Key::Named(Named::Escape));
        assert!(!app.store().unwrap().interaction().is_outlining());
        assert!(app.store().unwrap().tables().is_empty());
    }

    #[test]
    fn test_rotation_shortcut() {
        let mut app = mounted();
        key(&mut app, Key::character("r"));
        assert_eq!(app.store().unwrap().rotation().degrees(), 90.0);
        key(&mut app, Key::character("R"));
        assert_eq!(app.store().unwrap().rotation().degrees(), 0.0);
    }

    #[test]
    fn test_save_requests_store() {
        let mut app = mounted();
        click(&mut app, 150.0, 120.0);
        click(&mut app, 400.0, 300.0);
        match app.update(Msg::save()) {
            Task::StoreTables { image, tables } => {
                assert_eq!(image, "p1.jpg");
                assert_eq!(tables.len(), 1);
            }
            other => panic!("expected store task, got {other:?}"),
        }
    }

    #[test]
    fn test_tables_for_other_page_are_discarded() {
        let mut app = mounted();
        let record: TableRecord = serde_json::from_str(
            r#"{"outline": {"topLeft": {"x": 10, "y": 20}, "bottomRight": {"x": 110, "y": 220}},
                "rows": [50], "columns": [], "rotationDegrees": 0}"#,
        )
        .unwrap();
        app.update(Msg::Backend(BackendMsg::TablesLoaded {
            image: "p2.jpg".into(),
            result: Ok(vec![record.clone()]),
        }));
        assert!(app.store().unwrap().tables().is_empty());

        app.update(Msg::Backend(BackendMsg::TablesLoaded {
            image: "p1.jpg".into(),
            result: Ok(vec![record]),
        }));
        assert_eq!(app.store().unwrap().tables().len(), 1);
    }

    #[test]
    fn test_ocr_mount_fetches_once() {
        let mut app = App::new(AnnotatorConfig::default());
        let Task::FetchDataPoints { view } = app.update(Msg::Ocr(OcrMsg::Mount)) else {
            panic!("expected a fetch");
        };
        assert!(app.update(Msg::Ocr(OcrMsg::Retry)).is_none());
        app.update(Msg::Ocr(OcrMsg::Loaded {
            view,
            result: Ok(Vec::<OcrDataPoint>::new()),
        }));
        assert_eq!(app.ocr_content(), Some(OcrViewContent::Empty));
    }

    #[test]
    fn test_ocr_retry_after_failure_fetches_again() {
        let mut app = App::new(AnnotatorConfig::default());
        let Task::FetchDataPoints { view } = app.update(Msg::Ocr(OcrMsg::Mount)) else {
            panic!("expected a fetch");
        };
        app.update(Msg::Ocr(OcrMsg::Loaded {
            view,
            result: Err("connection refused".into()),
        }));
        assert_eq!(
            app.ocr_content(),
            Some(OcrViewContent::Failed("connection refused".into()))
        );
        assert!(matches!(
            app.update(Msg::Ocr(OcrMsg::Retry)),
            Task::FetchDataPoints { view: retried } if retried == view
        ));
        assert_eq!(app.ocr_content(), Some(OcrViewContent::Loading));
        assert!(app.update(Msg::Ocr(OcrMsg::Retry)).is_none());
    }

    #[test]
    fn test_background_click_after_knob_drag_deselects() {
        let mut app = mounted();
        click(&mut app, 150.0, 120.0);
        click(&mut app, 400.0, 300.0);
        app.update(Msg::Pointer(
            PointerEvent::click(Point::new(200.0, 200.0)).with_modifiers(Modifiers {
                shift: true,
                control: false,
            }),
        ));
        let knob = crate::widget::row_knobs::layout(app.store().unwrap())[0];
        let release = Point::new(knob.center.x, 250.0);
        for (kind, at) in [
            (PointerKind::Down, knob.center),
            (PointerKind::Move, release),
            (PointerKind::Up, release),
        ] {
            app.update(Msg::Pointer(PointerEvent::new(kind, at)));
        }
        assert_eq!(app.store().unwrap().selected_table_outline().unwrap().rows(), &[200.0]);

        click(&mut app, 700.0, 600.0);
        assert_eq!(selection(&app), Selection::NoSelection);
    }

    #[test]
    fn test_raster_must_match_page() {
        let mut app = mounted();
        assert!(app.attach_raster(RgbaImage::new(400, 300)).is_err());
        assert!(app.raster().is_none());
        app.attach_raster(RgbaImage::new(800, 600)).unwrap();
        assert!(app.raster().is_some());
    }

    #[test]
    fn test_batch_collapses() {
        assert!(Task::batch([Task::None, Task::None]).is_none());
        assert!(matches!(Task::batch([Task::None, Task::FetchImages]), Task::FetchImages));
        assert!(matches!(
            Task::batch([Task::FetchImages, Task::FetchImages]),
            Task::Batch(tasks) if tasks.len() == 2
        ));
    }

    #[test]
    fn test_unmount_drops_page() {
        let mut app = mounted();
        app.attach_raster(RgbaImage::new(800, 600)).unwrap();
        app.update(Msg::Page(PageMsg::Unmount));
        assert!(app.store().is_none());
        assert!(app.raster().is_none());
        assert!(app.update(Msg::save()).is_none());
    }
}
