//! Subcommand implementations

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::backend::BackendClient;
use crate::cli::ReplayArgs;
use crate::config::AnnotatorConfig;
use crate::core::app::App;
use crate::core::route::AssetPaths;
use crate::core::runtime::Runtime;
use crate::domain::cells::{cell_grid_to_list, drop_columns, drop_rows, list_to_cell_grid};
use crate::domain::{PageImage, Rect, TableId, TableOutline, TableRecord};
use crate::ocr::{CellKey, CorrectionStatus};
use crate::render::geometry::page_offset;
use crate::render::image::{cell_images, render_overlay};
use crate::replay::parse_script;
use crate::session::messages::{Msg, OcrMsg, PageMsg};
use crate::widget::ocr_correction::OcrViewContent;
use crate::widget::page_image::PageImageElement;
use crate::widget::row_knobs;

fn open_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(img.to_rgba8())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

// ============================================================================
// replay
// ============================================================================

pub async fn replay(config: AnnotatorConfig, args: ReplayArgs) -> Result<()> {
    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;
    let events = parse_script(&script)?;
    let raster = args.image_file.as_deref().map(open_image).transpose()?;

    let mut runtime = Runtime::new(BackendClient::new(&config)?);
    let mut app = App::new(config);

    let page = match (&args.image, &raster, &args.image_file) {
        (Some(name), Some(raster), _) => {
            PageImage::new(name.clone(), name.clone(), raster.width(), raster.height())
        }
        (None, Some(raster), Some(path)) => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            PageImage::new(name.clone(), name, raster.width(), raster.height())
        }
        (Some(name), None, _) => {
            runtime.dispatch(&mut app, Msg::ListImages).await;
            app.images()
                .iter()
                .find(|page| &page.name == name)
                .cloned()
                .ok_or_else(|| anyhow!("Backend has no image named {name}"))?
        }
        _ => bail!("Either --image or --image-file is required"),
    };

    let size = page.size();
    runtime.send(&mut app, Msg::mount(page));
    if let Some(raster) = raster {
        app.attach_raster(raster)?;
    }
    let element = PageImageElement {
        layout: Some(Rect::new(
            args.position.x,
            args.position.y,
            args.position.x + size.width,
            args.position.y + size.height,
        )),
    };
    if let Some(position) = page_offset(&element) {
        runtime.send(&mut app, Msg::measured(position));
    }
    if args.load {
        runtime.dispatch(&mut app, Msg::Page(PageMsg::LoadTables)).await;
        if let Some(err) = app.last_error() {
            bail!("Failed to load tables: {err}");
        }
    }

    for event in events {
        runtime.dispatch(&mut app, event.into_msg()).await;
    }

    let store = app
        .store()
        .ok_or_else(|| anyhow!("Page was unmounted by the script"))?;
    let records = store.table_records();
    println!(
        "{}",
        serde_json::to_string_pretty(&records).context("Failed to serialize tables")?
    );
    for knob in row_knobs::layout(store) {
        log::info!(
            "Row knob {} at ({:.0}, {:.0}), cursor {:?}: {}",
            knob.index,
            knob.center.x,
            knob.center.y,
            knob.cursor(),
            knob.hint()
        );
    }

    if let Some(path) = &args.preview {
        let raster = app
            .raster()
            .ok_or_else(|| anyhow!("--preview needs --image-file"))?;
        render_overlay(raster, store, app.config())
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Preview written to {}", path.display());
    }

    if args.save {
        runtime.dispatch(&mut app, Msg::save()).await;
        if let Some(err) = app.last_error() {
            bail!("Failed to store tables: {err}");
        }
    }
    Ok(())
}

// ============================================================================
// ocr
// ============================================================================

#[derive(Debug, Deserialize)]
struct CellEdit {
    #[serde(flatten)]
    key: CellKey,
    text: String,
}

#[derive(Debug, Serialize)]
struct CellDraft<'a> {
    #[serde(flatten)]
    key: &'a CellKey,
    text: &'a str,
}

pub async fn ocr(config: AnnotatorConfig, edits: Option<&Path>) -> Result<()> {
    let edits: Vec<CellEdit> = match edits {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let mut runtime = Runtime::new(BackendClient::new(&config)?);
    let mut app = App::new(config);
    runtime.dispatch(&mut app, Msg::Ocr(OcrMsg::Mount)).await;
    for edit in edits {
        runtime.send(
            &mut app,
            Msg::Ocr(OcrMsg::Edit {
                key: edit.key,
                text: edit.text,
            }),
        );
    }

    match app.ocr_content() {
        Some(OcrViewContent::Items(items)) => {
            for item in items {
                let status = match item.status {
                    CorrectionStatus::Corrected => "corrected",
                    CorrectionStatus::Pending => "pending",
                };
                let marker = if item.edited { "*" } else { " " };
                println!(
                    "{} {status:<9}{marker} {}/{}/{} {:?} {}",
                    item.indicator.to_hex(),
                    item.key.image_name,
                    item.key.table_idx,
                    item.key.cell_id,
                    item.text,
                    item.image_url,
                );
            }
        }
        Some(OcrViewContent::Failed(err)) => bail!("Failed to load data points: {err}"),
        Some(content) => {
            if let Some(message) = content.message() {
                println!("{message}");
            }
        }
        None => {}
    }

    if let Some(view) = app.ocr_view() {
        let drafts: Vec<CellDraft> = view
            .drafts()
            .iter()
            .map(|(key, text)| CellDraft { key, text })
            .collect();
        if !drafts.is_empty() {
            println!(
                "{}",
                serde_json::to_string_pretty(&drafts).context("Failed to serialize drafts")?
            );
        }
    }
    Ok(())
}

// ============================================================================
// cells
// ============================================================================

#[derive(Debug, Serialize)]
struct CellManifest {
    table_idx: usize,
    /// File name of every cell, `[row][column]`
    cells: Vec<Vec<String>>,
}

pub fn cells(
    image: &Path,
    tables: &Path,
    out: &Path,
    skip_rows: &[usize],
    skip_columns: &[usize],
) -> Result<()> {
    let page = open_image(image)?;
    let records: Vec<TableRecord> = read_json(tables)?;
    std::fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());

    let mut manifest = Vec::new();
    for (table_idx, record) in records.iter().enumerate() {
        let table = TableOutline::from_record(TableId(table_idx as u64), record);
        let grid = drop_columns(&drop_rows(&cell_images(&page, &table), skip_rows), skip_columns);
        let (images, mapping) = cell_grid_to_list(grid);

        let mut names = Vec::with_capacity(images.len());
        for (cell_id, cell) in images.iter().enumerate() {
            let name = format!("{stem}_{table_idx}_{cell_id}.png");
            let path = out.join(&name);
            cell.save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            names.push(name);
        }
        log::info!("{}: wrote {} cells", table.id, names.len());
        manifest.push(CellManifest {
            table_idx,
            cells: list_to_cell_grid(&names, &mapping),
        });
    }

    let path = out.join("cells.json");
    let raw = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    std::fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

// ============================================================================
// images
// ============================================================================

pub async fn images(config: AnnotatorConfig, route: &str) -> Result<()> {
    let assets = AssetPaths::from_route(route);
    if assets.data_dir().is_none() {
        log::warn!("No data directory in route {route:?}, asset URLs are omitted");
    }

    let mut runtime = Runtime::new(BackendClient::new(&config)?);
    let mut app = App::new(config);
    runtime.dispatch(&mut app, Msg::ListImages).await;
    if let Some(err) = app.last_error() {
        bail!("Failed to list images: {err}");
    }

    let by_name: BTreeMap<&str, &PageImage> =
        app.images().iter().map(|page| (page.name.as_str(), page)).collect();
    for (name, page) in by_name {
        let url = assets.page_image(&page.src).unwrap_or_else(|| "-".to_string());
        println!("{name}\t{}x{}\t{url}", page.width, page.height);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_cells_writes_grid() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("p1.png");
        RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]))
            .save(&image_path)
            .unwrap();
        let tables_path = dir.path().join("tables.json");
        std::fs::write(
            &tables_path,
            r#"[{"outline": {"topLeft": {"x": 10, "y": 10}, "bottomRight": {"x": 110, "y": 70}},
                "rows": [20, 40], "columns": [50], "rotationDegrees": 0}]"#,
        )
        .unwrap();
        let out = dir.path().join("cells");

        cells(&image_path, &tables_path, &out, &[0], &[]).unwrap();

        // Three rows minus the header, two columns
        let cell = image::open(out.join("p1_0_0.png")).unwrap();
        assert_eq!((cell.width(), cell.height()), (50, 20));
        assert!(out.join("p1_0_3.png").exists());
        assert!(!out.join("p1_0_4.png").exists());
        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("cells.json")).unwrap())
                .unwrap();
        assert_eq!(manifest[0]["cells"][1][1], "p1_0_3.png");
    }

    #[test]
    fn test_edit_file_shape() {
        let edits: Vec<CellEdit> = serde_json::from_str(
            r#"[{"image_name": "p1.jpg", "table_idx": 0, "cell_id": 3, "text": "1914"}]"#,
        )
        .unwrap();
        assert_eq!(edits[0].key.cell_id, 3);
        assert_eq!(edits[0].text, "1914");
    }
}
