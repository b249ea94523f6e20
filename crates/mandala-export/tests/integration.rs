//! Integration tests for mandala-export.
//!
//! Drive the full path from an edited session to a saved PNG and decode the
//! result to check what actually landed in the image.

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::poll;
use mandala_core::{Message, Session, CORE_GOAL_INDEX};
use mandala_dom::{render, Document, NodeId, RenderedApp, Renderer};
use mandala_export::{
    decode_data_uri, decode_png, Bitmap, DirectorySaver, ExportConfig, ExportError, ExportFailure,
    ExportOutcome, ExportPipeline, ExportReport, ExportState, MemorySaver, RasterError,
    RasterOptions, Rasterizer, SoftwareRasterizer,
};
use std::cell::{Cell, RefCell};
use std::pin::pin;

fn forest_chart() -> Session {
    let mut session = Session::new();
    for msg in [
        Message::ThemeSelected("Forest".into()),
        Message::CellChanged {
            index: CORE_GOAL_INDEX,
            text: "Learn Rust".into(),
        },
        Message::CellChanged {
            index: 4,
            text: "Exercise".into(),
        },
    ] {
        session.update(msg).unwrap();
    }
    session
}

fn export(app: &RenderedApp, saver: &mut MemorySaver) -> Result<ExportReport, ExportError> {
    block_on(ExportPipeline::default().export(
        Some(app.target()),
        &SoftwareRasterizer::new(),
        saver,
    ))
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_forest_export_pixels() {
    let app = render(&forest_chart()).unwrap();
    let mut saver = MemorySaver::new();
    let report = export(&app, &mut saver).unwrap();

    let saved = saver.last().unwrap();
    assert_eq!(saved.filename, "mandala-chart.png");
    let image = decode_png(&decode_data_uri(&saved.data_uri).unwrap()).unwrap();
    assert_eq!((image.width(), image.height()), (report.width, report.height));
    assert_eq!(report.bytes, decode_data_uri(&saved.data_uri).unwrap().len());

    // 2x scale: cells start at layout 321 (core), 87 (cell 4), 13 (cell 0);
    // sample inside the padding, clear of the centered text
    assert_eq!(image.get_pixel(660, 660).0, [0x18, 0x64, 0x29, 255]);
    assert_eq!(image.get_pixel(192, 192).0, [0x28, 0xa7, 0x45, 255]);
    assert_eq!(image.get_pixel(98, 98).0, [255, 255, 255, 255]);
    // grid border takes the theme color, gaps stay transparent
    assert_eq!(image.get_pixel(0, 0).0, [0x28, 0xa7, 0x45, 255]);
    assert_eq!(image.get_pixel(480, 200).0, [0, 0, 0, 0]);
}

fn colors_in(image: &image::RgbaImage, from: u32, to: u32) -> Vec<[u8; 4]> {
    (from..to)
        .flat_map(|y| (from..to).map(move |x| (x, y)))
        .map(|(x, y)| image.get_pixel(x, y).0)
        .collect()
}

#[test]
fn test_forest_export_draws_cell_text() {
    let app = render(&forest_chart()).unwrap();
    let mut saver = MemorySaver::new();
    export(&app, &mut saver).unwrap();
    let saved = decode_data_uri(&saver.last().unwrap().data_uri).unwrap();
    let image = decode_png(&saved).unwrap();

    // core cell spans 642..786 at 2x; white glyphs over the dark green
    let core = colors_in(&image, 650, 778);
    assert!(core.contains(&[0x18, 0x64, 0x29, 255]));
    assert!(core.contains(&[255, 255, 255, 255]));

    // cell 4 spans 174..318; dark text over the theme color
    let sub = colors_in(&image, 182, 310);
    assert!(sub.iter().any(|p| p[0] < 0x28 && p[1] < 0x60 && p[3] == 255));

    let mut blank = forest_chart();
    blank
        .update(Message::CellChanged {
            index: CORE_GOAL_INDEX,
            text: String::new(),
        })
        .unwrap();
    let blank_app = render(&blank).unwrap();
    let mut blank_saver = MemorySaver::new();
    export(&blank_app, &mut blank_saver).unwrap();
    assert_ne!(saver.last(), blank_saver.last());
    let blank_image =
        decode_png(&decode_data_uri(&blank_saver.last().unwrap().data_uri).unwrap()).unwrap();
    assert!(!colors_in(&blank_image, 650, 778).contains(&[255, 255, 255, 255]));
}

#[derive(Default)]
struct Recording {
    inner: SoftwareRasterizer,
    last: RefCell<Option<Bitmap>>,
}

impl Rasterizer for Recording {
    async fn rasterize(
        &self,
        live: &Document,
        target: NodeId,
        options: &RasterOptions,
        on_clone: &mut dyn FnMut(&mut Document) -> Result<(), RasterError>,
    ) -> Result<Bitmap, RasterError> {
        let bitmap = self.inner.rasterize(live, target, options, on_clone).await?;
        *self.last.borrow_mut() = Some(bitmap.clone());
        Ok(bitmap)
    }
}

#[test]
fn test_forest_export_text() {
    let app = render(&forest_chart()).unwrap();
    let rasterizer = Recording::default();
    block_on(ExportPipeline::default().export(
        Some(app.target()),
        &rasterizer,
        &mut MemorySaver::new(),
    ))
    .unwrap();

    let bitmap = rasterizer.last.borrow().clone().unwrap();
    let core = bitmap.find_text("Learn Rust").unwrap();
    assert_eq!(core.color.to_hex(), "#ffffff");
    assert_eq!(core.weight, 700);
    assert_eq!(core.font_size, 28.0);
    assert_eq!(core.lines, vec!["Learn", "Rust"]);
    assert!(core.rect.center().x > 642.0 && core.rect.center().x < 786.0);

    let sub = bitmap.find_text("Exercise").unwrap();
    assert_eq!(sub.color.to_hex(), "#212529");
    assert_eq!(sub.lines, vec!["Exercise"]);
    assert!(bitmap.find_text("Core Goal").is_none());
}

#[test]
fn test_live_document_unchanged_by_export() {
    let app = render(&forest_chart()).unwrap();
    let before = app.document().clone();
    export(&app, &mut MemorySaver::new()).unwrap();
    assert_eq!(app.document(), &before);
}

#[test]
fn test_directory_saver_end_to_end() {
    let dir = std::env::temp_dir().join(format!("mandala-export-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let app = render(&forest_chart()).unwrap();
    let config = ExportConfig {
        scale: 1.0,
        ..ExportConfig::default()
    };
    let report = block_on(ExportPipeline::new(config).unwrap().export(
        Some(app.target()),
        &SoftwareRasterizer::new(),
        &mut DirectorySaver::new(&dir),
    ))
    .unwrap();
    let bytes = std::fs::read(dir.join("mandala-chart.png")).unwrap();
    let image = decode_png(&bytes).unwrap();
    assert_eq!((image.width(), image.height()), (714, 714));
    assert_eq!(report.bytes, bytes.len());
    std::fs::remove_dir_all(&dir).unwrap();
}

// =============================================================================
// Guard
// =============================================================================

struct Gated {
    inner: SoftwareRasterizer,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    calls: Cell<usize>,
}

impl Rasterizer for Gated {
    async fn rasterize(
        &self,
        live: &Document,
        target: NodeId,
        options: &RasterOptions,
        on_clone: &mut dyn FnMut(&mut Document) -> Result<(), RasterError>,
    ) -> Result<Bitmap, RasterError> {
        self.calls.set(self.calls.get() + 1);
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.rasterize(live, target, options, on_clone).await
    }
}

#[test]
fn test_second_export_rejected_while_capturing() {
    let app = render(&forest_chart()).unwrap();
    let (open, gate) = oneshot::channel();
    let rasterizer = Gated {
        inner: SoftwareRasterizer::new(),
        gate: RefCell::new(Some(gate)),
        calls: Cell::new(0),
    };
    let pipeline = ExportPipeline::default();
    let mut first_saver = MemorySaver::new();
    let mut second_saver = MemorySaver::new();

    block_on(async {
        let mut first = pin!(pipeline.export(Some(app.target()), &rasterizer, &mut first_saver));
        assert!(poll!(first.as_mut()).is_pending());
        assert_eq!(pipeline.state(), ExportState::Capturing);

        let second = pipeline
            .export(Some(app.target()), &rasterizer, &mut second_saver)
            .await;
        assert!(matches!(second, Err(ExportError::ExportBusy)));
        assert_eq!(rasterizer.calls.get(), 1);

        open.send(()).unwrap();
        assert!(first.await.is_ok());
    });

    assert_eq!(rasterizer.calls.get(), 1);
    assert_eq!(pipeline.state(), ExportState::Idle);
    assert_eq!(first_saver.saved().len(), 1);
    assert!(second_saver.saved().is_empty());

    // the guard is released, so a new export goes through
    let retry = pipeline.export(Some(app.target()), &rasterizer, &mut second_saver);
    assert!(block_on(retry).is_ok());
    assert_eq!(rasterizer.calls.get(), 2);
}

// =============================================================================
// Failures
// =============================================================================

struct Rejecting;

impl Rasterizer for Rejecting {
    async fn rasterize(
        &self,
        _live: &Document,
        _target: NodeId,
        options: &RasterOptions,
        _on_clone: &mut dyn FnMut(&mut Document) -> Result<(), RasterError>,
    ) -> Result<Bitmap, RasterError> {
        assert!(options.allow_cross_origin);
        assert_eq!(options.background, None);
        Err(RasterError::Tainted("https://fonts.example.com/inter.woff2".into()))
    }
}

#[test]
fn test_failure_leaves_session_editable() {
    let mut session = forest_chart();
    let mut renderer = Renderer::new();
    renderer.render(&session).unwrap();
    let before = session.clone();
    let pipeline = ExportPipeline::default();
    let mut saver = MemorySaver::new();

    let result = block_on(pipeline.export(renderer.grid_target(), &Rejecting, &mut saver));
    assert!(matches!(
        result,
        Err(ExportError::ExportFailed(ExportFailure::Raster(RasterError::Tainted(_))))
    ));
    assert!(result.as_ref().is_err_and(ExportError::is_recoverable));
    assert_eq!(session, before);
    assert_eq!(pipeline.last_outcome(), Some(ExportOutcome::Failed));
    assert_eq!(pipeline.state(), ExportState::Idle);
    assert!(saver.saved().is_empty());

    session
        .update(Message::CellChanged {
            index: 0,
            text: "still editable".into(),
        })
        .unwrap();
    session.update(Message::ThemeSelected("Mint".into())).unwrap();
    renderer.render(&session).unwrap();
    let rasterizer = SoftwareRasterizer::new();
    let retry = pipeline.export(renderer.grid_target(), &rasterizer, &mut saver);
    assert!(block_on(retry).is_ok());
    assert_eq!(pipeline.last_outcome(), Some(ExportOutcome::Succeeded));
}

#[test]
fn test_export_before_render() {
    let renderer = Renderer::new();
    let result = block_on(ExportPipeline::default().export(
        renderer.grid_target(),
        &SoftwareRasterizer::new(),
        &mut MemorySaver::new(),
    ));
    assert!(matches!(result, Err(ExportError::ExportTargetMissing)));
}

#[test]
fn test_strict_origin_config_taints_remote_images() {
    let app = render(&forest_chart()).unwrap();
    let mut doc = app.document().clone();
    let grid = doc.resolve(app.grid()).unwrap();
    let img = doc.create_element("img");
    doc.set_attr(img, "src", "https://cdn.example.com/badge.png").unwrap();
    doc.append_child(grid, img).unwrap();
    let target = mandala_dom::GridTarget {
        document: &doc,
        grid: app.grid(),
    };
    let config = ExportConfig {
        allow_cross_origin: false,
        ..ExportConfig::default()
    };
    let result = block_on(ExportPipeline::new(config).unwrap().export(
        Some(target),
        &SoftwareRasterizer::new(),
        &mut MemorySaver::new(),
    ));
    assert!(matches!(
        result,
        Err(ExportError::ExportFailed(ExportFailure::Raster(RasterError::Tainted(_))))
    ));
}
