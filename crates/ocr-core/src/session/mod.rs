//! `Session`: the façade orchestrating one page (or page sequence) through
//! the collaborator pipeline end to end (§4.1).
//!
//! The concrete thresholder/layout-analyzer/classifier/paragraph-detector/
//! orientation-detector are out of scope (§1); `Session` is generic over a
//! single [`Backend`] that supplies all five, so it can be driven by a
//! fake in tests and by a real recognizer alike, the same role
//! `RenderableSession` plays for renderers.

pub mod monitor;

use crate::collaborators::{Classifier, ImageView, LayoutAnalyzer, OrientationDetector, OsdResult, ParagraphDetector, Rectangle, Thresholder};
use crate::config::{ConfigStore, ParamConstraint, ParamValue, StorePhase};
use crate::enums::{OcrEngineMode, PageSegMode, WritingDirection};
use crate::error::{OcrError, Result, Status};
use crate::grapheme::{ValidatorOptions, normalize_clean_and_segment_utf8};
use crate::iterator::reading_order::ReadingOrderIterator;
use crate::iterator::{CoordinateFrame, K_MAX_CREDIBLE_RESOLUTION, K_MIN_CREDIBLE_RESOLUTION, LinearIterator};
use crate::page_result::PageResult;
use crate::renderer::box_file::BoxFileRenderer;
use crate::renderer::hocr::HocrRenderer;
use crate::renderer::plain_text::TextRenderer;
use crate::renderer::unlv::UnlvRenderer;
use crate::renderer::{RenderableSession, RendererHandler, RendererNode};
use crate::unicharset::UnicharSet;
use monitor::Monitor;

/// Everything a concrete recognition backend must supply to drive a
/// `Session` (§1): thresholding, layout analysis, recognition, paragraph
/// detection, and orientation/script detection. The last is consulted
/// only by the OSD sub-session (§4.1 "OSD coupling"); a single backend
/// type ordinarily implements all five.
pub trait Backend: Thresholder + LayoutAnalyzer + Classifier + ParagraphDetector + OrientationDetector {}

impl<T> Backend for T where T: Thresholder + LayoutAnalyzer + Classifier + ParagraphDetector + OrientationDetector {}

/// A driver's view of a multi-page input: a TIFF multipage document, a
/// single image, or a newline-separated filelist (§4.1 "Multi-page
/// driver"). Opening the underlying image bytes is out of scope (§1),
/// exactly like `Thresholder`/`LayoutAnalyzer`; `process_pages` drives
/// through this seam instead of touching a codec directly.
pub trait PageSource {
    fn page_count(&self) -> usize;
    fn open_page(&mut self, index: usize) -> Result<ImageView>;
    fn filename(&self) -> &str;
}

/// Identifies the (datapath, language, engine_mode) triple an `init` call
/// was last given, for the idempotence rule (§4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
struct InitKey {
    datapath: String,
    language: String,
    engine_mode: OcrEngineMode,
}

fn register_parameters(store: &mut ConfigStore) {
    store.register("tessedit_pageseg_mode", ParamValue::Int(PageSegMode::default() as i32), ParamConstraint::Unrestricted);
    store.register("tessedit_ocr_engine_mode", ParamValue::Int(OcrEngineMode::default() as i32), ParamConstraint::InitOnly);
    store.register("preserve_interword_spaces", ParamValue::Bool(false), ParamConstraint::Unrestricted);
    store.register("user_words_suffix", ParamValue::Str(String::new()), ParamConstraint::InitOnly);
    store.register("user_patterns_suffix", ParamValue::Str(String::new()), ParamConstraint::InitOnly);
    store.register("bidi_debug", ParamValue::Bool(false), ParamConstraint::Unrestricted);
}

/// Orchestrates a single recognized page (§3.1, §3.3 lifecycle): an
/// initialized `Session` owns the current `PageResult` exclusively and is
/// driven one page at a time through `set_image`/`recognize` or through
/// the `process_pages` multi-page driver.
pub struct Session<B: Backend> {
    backend: B,
    init_key: Option<InitKey>,
    config: ConfigStore,
    page_seg_mode: PageSegMode,
    image: Option<ImageView>,
    rectangle: Rectangle,
    source_resolution: u32,
    page_result: PageResult,
    unicharset: UnicharSet,
    osd_result: Option<OsdResult>,
    page_number: i32,
    preserve_interword_spaces: bool,
    recognized: bool,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B) -> Self {
        let mut config = ConfigStore::new();
        register_parameters(&mut config);
        Session {
            backend,
            init_key: None,
            config,
            page_seg_mode: PageSegMode::default(),
            image: None,
            rectangle: Rectangle {
                left: 0,
                top: 0,
                width: 0,
                height: 0,
            },
            source_resolution: K_MIN_CREDIBLE_RESOLUTION,
            page_result: PageResult::new(),
            unicharset: UnicharSet::new(),
            osd_result: None,
            page_number: 0,
            preserve_interword_spaces: false,
            recognized: false,
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Mutable access for applying config-file contents or `-c` overrides
    /// before or after `init` (§4.5); each assignment still goes through
    /// `ConfigStore::set`'s constraint filter.
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn page_number(&self) -> i32 {
        self.page_number
    }

    pub fn set_page_number(&mut self, page_number: i32) {
        self.page_number = page_number;
    }

    /// `init(datapath, language, engine_mode, config_files, var_overrides,
    /// only_non_debug)` (§4.1). Re-entering with the same
    /// (datapath, language, engine_mode) only resets the adaptive
    /// classifier (here: clears the recognized-page state); anything else
    /// tears down and rebuilds the parameter registry from scratch.
    /// `only_non_debug` relies on `ConfigStore`'s existing `DebugOnly`
    /// constraint gate rather than a separate filter pass.
    pub fn init(
        &mut self,
        datapath: &str,
        language: &str,
        engine_mode: OcrEngineMode,
        config_files: &[String],
        var_overrides: &[(String, String)],
        only_non_debug: bool,
    ) -> Status {
        let _ = only_non_debug;
        let key = InitKey {
            datapath: datapath.to_string(),
            language: language.to_string(),
            engine_mode,
        };
        if self.init_key.as_ref() == Some(&key) {
            self.clear();
            return Status::Ok;
        }

        let mut config = ConfigStore::new();
        register_parameters(&mut config);
        for path in config_files {
            match std::fs::read_to_string(path) {
                Ok(contents) => config.apply_file_contents(&contents),
                Err(_) => return Status::InitFailed,
            }
        }
        for (name, value) in var_overrides {
            config.apply_cli_override(&format!("{name}={value}"));
        }
        config.set_phase(StorePhase::PostInit);

        self.config = config;
        self.unicharset = UnicharSet::new();
        self.init_key = Some(key);
        self.page_seg_mode = PageSegMode::default();
        self.clear();
        Status::Ok
    }

    /// Default single-block; overrideable from `config_files`/
    /// `var_overrides` through `tessedit_pageseg_mode` (§4.1).
    pub fn set_page_segmentation_mode(&mut self, mode: PageSegMode) {
        self.page_seg_mode = mode;
        self.config.set("tessedit_pageseg_mode", ParamValue::Int(mode as i32));
    }

    pub fn page_segmentation_mode(&self) -> PageSegMode {
        self.page_seg_mode
    }

    /// Clears `PageResult` and resets the rectangle-of-interest to the
    /// full image. Does not copy the image buffer; the caller keeps
    /// `image` alive until the next `set_image`/`clear` (§5 shared-resource
    /// policy).
    pub fn set_image(&mut self, image: ImageView) {
        self.image = Some(image);
        self.rectangle = Rectangle::full_image(image);
        self.page_result = PageResult::new();
        self.osd_result = None;
        self.recognized = false;
    }

    pub fn set_rectangle(&mut self, left: i32, top: i32, width: i32, height: i32) {
        self.rectangle = Rectangle { left, top, width, height };
        self.page_result = PageResult::new();
        self.recognized = false;
    }

    /// Clamps into `[kMinCredibleResolution, kMaxCredibleResolution]`;
    /// out-of-range values fall back to the lower bound, since
    /// under-estimating resolution is the safer failure mode (§4.1).
    pub fn set_source_resolution(&mut self, ppi: u32) {
        self.source_resolution = if (K_MIN_CREDIBLE_RESOLUTION..=K_MAX_CREDIBLE_RESOLUTION).contains(&ppi) {
            ppi
        } else {
            K_MIN_CREDIBLE_RESOLUTION
        };
    }

    pub fn source_resolution(&self) -> u32 {
        self.source_resolution
    }

    pub fn set_preserve_interword_spaces(&mut self, preserve: bool) {
        self.preserve_interword_spaces = preserve;
        self.config.set("preserve_interword_spaces", ParamValue::Bool(preserve));
    }

    /// `recognize()` with no deadline/cancellation (§4.1).
    pub fn recognize(&mut self) -> Result<Status> {
        let mut monitor = Monitor::new();
        self.recognize_with_monitor(&mut monitor)
    }

    /// Drives thresholding -> `find_lines` (layout analysis) -> optional
    /// OSD sub-session -> segmentation -> main classifier pass ->
    /// paragraph detection (§4.1). An empty page yields an empty
    /// `PageResult` and `Ok`; already-recognized pages are a no-op.
    ///
    /// Cooperative cancellation is polled before and after the classifier
    /// call rather than between individual words: `Classifier` (§1, out
    /// of scope) recognizes a whole page per call, so per-word polling
    /// would require a finer hook the core does not define. A backend
    /// that wants true per-word granularity polls the monitor itself from
    /// inside `recognize_all_words`.
    pub fn recognize_with_monitor(&mut self, monitor: &mut Monitor) -> Result<Status> {
        if self.recognized {
            return Ok(Status::Ok);
        }
        let image = self.image.ok_or_else(|| OcrError::input("set_image must be called before recognize"))?;

        self.backend.threshold(image, self.rectangle)?;
        let blocks = self.backend.segment_page(image, self.rectangle)?;

        if self.page_seg_mode.requires_osd() && self.unicharset_language_is_not_osd() {
            self.osd_result = Some(self.backend.detect_orientation_script(image, self.rectangle)?);
        }

        if self.page_seg_mode.layout_only() {
            self.page_result = PageResult::new();
            self.recognized = true;
            return Ok(Status::Ok);
        }

        if blocks.is_empty() {
            self.page_result = PageResult::new();
            self.recognized = true;
            return Ok(Status::Ok);
        }

        if monitor.is_cancelled(0) {
            return Err(OcrError::recognition("cancelled before recognition began"));
        }

        let mut page = self.backend.recognize_all_words(image, &blocks, &self.config)?;
        let words_done = page.all_word_confidences().len() as u32;
        monitor.report_progress(100);
        if monitor.deadline_exceeded() {
            return Err(OcrError::Timeout { words_done });
        }
        if monitor.is_cancelled(words_done) {
            return Err(OcrError::recognition("cancelled after recognition"));
        }

        self.backend.detect_paragraphs(&mut page)?;
        self.page_result = page;
        self.recognized = true;
        Ok(Status::Ok)
    }

    /// `init_key`'s language drives the OSD-coupling check (§4.1): an "osd"
    /// session recognizing itself never recurses into a sub-session.
    fn unicharset_language_is_not_osd(&self) -> bool {
        self.init_key.as_ref().is_none_or(|k| k.language != "osd")
    }

    fn ensure_recognized(&mut self) -> Result<()> {
        self.recognize()?;
        Ok(())
    }

    pub fn get_utf8_text(&mut self) -> Result<String> {
        self.ensure_recognized()?;
        let mut renderer = TextRenderer::new();
        renderer.on_add_image(self)?;
        Ok(renderer.buffer().to_string())
    }

    /// `page_number` is accepted for the §4.1 signature but this `Session`
    /// only ever holds the current page's `PageResult` (§3.1); a mismatch
    /// against the page currently loaded is a caller error, not recognized
    /// here to avoid a second, redundant page-identity concept.
    pub fn get_hocr(&mut self, page_number: i32) -> Result<String> {
        self.ensure_recognized()?;
        let saved = self.page_number;
        self.page_number = page_number;
        let mut renderer = HocrRenderer::new();
        renderer.on_begin_document("ocr")?;
        let result = renderer.on_add_image(self);
        renderer.on_end_document()?;
        self.page_number = saved;
        result?;
        Ok(renderer.buffer().to_string())
    }

    pub fn get_box_text(&mut self, page_number: i32) -> Result<String> {
        self.ensure_recognized()?;
        let saved = self.page_number;
        self.page_number = page_number;
        let mut renderer = BoxFileRenderer::new();
        let result = renderer.on_add_image(self);
        self.page_number = saved;
        result?;
        Ok(renderer.buffer().to_string())
    }

    pub fn get_unlv_text(&mut self) -> Result<String> {
        self.ensure_recognized()?;
        let mut renderer = UnlvRenderer::new();
        renderer.on_add_image(self)?;
        Ok(renderer.buffer().to_string())
    }

    /// `clamp(round(100 + 5c), 0, 100)`, averaged over every word (§4.1).
    pub fn mean_text_confidence(&mut self) -> Result<u8> {
        self.ensure_recognized()?;
        Ok(self.page_result.mean_text_confidence())
    }

    /// Word confidences in `LinearIterator` order (§5 ordering guarantee).
    pub fn all_word_confidences(&mut self) -> Result<Vec<u8>> {
        self.ensure_recognized()?;
        Ok(self.page_result.all_word_confidences())
    }

    /// Training hook (§4.1, §10.7): temporarily switches segmentation
    /// mode, re-recognizes, and reports whether the recognized text
    /// matches `space_delimited_truth` ignoring whitespace. Adaptive
    /// classifier feeding itself is a training-only concern excluded by
    /// §1's Non-goals, so a match only yields `Ok(true)` with no further
    /// side effect.
    pub fn adapt_to_word(&mut self, mode: PageSegMode, space_delimited_truth: &str) -> Result<bool> {
        let saved_mode = self.page_seg_mode;
        self.page_seg_mode = mode;
        self.recognized = false;
        let outcome = self.recognize();
        self.page_seg_mode = saved_mode;
        outcome?;

        let recognized: String = self.recognized_text_no_whitespace();
        let truth: String = space_delimited_truth.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(recognized == truth)
    }

    fn recognized_text_no_whitespace(&self) -> String {
        let page = &self.page_result;
        let mut out = String::new();
        for &block_h in &page.blocks_order {
            for &para_h in &page.block(block_h).paragraphs {
                for &row_h in &page.paragraph(para_h).rows {
                    for &word_h in &page.row(row_h).words {
                        out.push_str(&page.word(word_h).text(&self.unicharset));
                    }
                }
            }
        }
        out
    }

    /// Per-page teardown: drops the current image reference and
    /// `PageResult`, leaving the `Session` ready for the next `set_image`
    /// (§5 cancellation invariant).
    pub fn clear(&mut self) {
        self.image = None;
        self.page_result = PageResult::new();
        self.osd_result = None;
        self.recognized = false;
    }

    /// Per-session teardown (§4.1): also forgets `init`'s identity so the
    /// next `init` always rebuilds, never treating it as idempotent.
    pub fn end(&mut self) {
        self.clear();
        self.init_key = None;
    }

    /// Per-process teardown (§4.1, §5): frees the global dictionary cache.
    /// `ocr-core` holds no such global state itself (§5 "process-wide
    /// state" is the responsibility of a real dictionary-backed backend),
    /// so this is a documented no-op seam callers can still invoke
    /// unconditionally.
    pub fn clear_persistent_cache() {}

    /// `IsValidWord` (§10.7): checks `word` against the active grapheme
    /// grammar. Dictionary lookup itself stays with the out-of-scope
    /// classifier (§1); this only validates grapheme-cluster well-formedness.
    pub fn is_valid_word(&self, word: &str) -> bool {
        normalize_clean_and_segment_utf8(word, ValidatorOptions::default()).is_ok()
    }

    /// `GetTextDirection` (§10.7): the dominant writing direction and the
    /// baseline slope/intercept of the page's first textline, derived from
    /// the same inputs `ReadingOrderIterator` uses for paragraph-direction
    /// inference (§4.2.1). `None` for an empty page.
    pub fn get_text_direction(&self) -> Option<(WritingDirection, (f32, f32))> {
        if self.page_result.is_empty() {
            return None;
        }
        let frame = self.coordinate_frame();
        let linear = LinearIterator::begin(&self.page_result, frame);
        let it = ReadingOrderIterator::new(linear, &self.unicharset);
        let direction = if it.paragraph_is_ltr() {
            WritingDirection::LeftToRight
        } else {
            WritingDirection::RightToLeft
        };

        let first_block = self.page_result.block(self.page_result.blocks_order[0]);
        let first_para = self.page_result.paragraph(first_block.paragraphs[0]);
        let first_row = self.page_result.row(first_para.rows[0]);
        let (m, c) = first_row.baseline.slope_intercept(0.0, 0.0);
        Some((direction, (m, c)))
    }

    fn coordinate_frame(&self) -> CoordinateFrame {
        let scale = self.source_resolution as f32 / 72.0;
        CoordinateFrame {
            scale: if scale.abs() < f32::EPSILON { 1.0 } else { scale },
            scaled_y_resolution: self.source_resolution as f32,
            rect_left: self.rectangle.left,
            rect_top: self.rectangle.top,
            rect_width: self.rectangle.width,
            rect_height: self.rectangle.height,
        }
    }

    fn snapshot_variables(&self) -> String {
        let mut tabbed = String::new();
        self.config.print_variables(&mut tabbed);
        tabbed
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect()
    }

    /// Retry-on-failure (§4.1): snapshots current variables, loads
    /// `retry_config_path`, re-runs `recognize` once, then restores the
    /// snapshot regardless of the retry's outcome.
    fn retry_once(&mut self, retry_config_path: &str, monitor: &mut Monitor) -> Result<Status> {
        let snapshot = self.snapshot_variables();
        let retry_contents = std::fs::read_to_string(retry_config_path)?;
        self.config.apply_file_contents(&retry_contents);
        self.recognized = false;
        let outcome = self.recognize_with_monitor(monitor);
        self.config.apply_file_contents(&snapshot);
        outcome
    }

    /// `process_page(pix, page_index, filename, retry_config, timeout_ms,
    /// renderer)` (§4.1): loads the page, recognizes it (with one retry if
    /// `retry_config_path` is given and the first attempt fails), then
    /// feeds the renderer chain unless the segmentation mode is
    /// layout-only.
    pub fn process_page(
        &mut self,
        image: ImageView,
        page_index: usize,
        retry_config_path: Option<&str>,
        timeout_ms: u64,
        renderer: &mut RendererNode,
    ) -> Result<()> {
        self.page_number = page_index as i32;
        self.set_image(image);
        let mut monitor = Monitor::with_deadline_msecs(timeout_ms);
        let outcome = self.recognize_with_monitor(&mut monitor);
        let outcome = match (outcome, retry_config_path) {
            (Err(_), Some(path)) => self.retry_once(path, &mut monitor),
            (other, _) => other,
        };
        outcome?;

        if self.page_seg_mode.layout_only() {
            return Ok(());
        }
        renderer.add_image(self)
    }

    /// `process_pages(path, retry_config, timeout_ms, renderer_chain)`
    /// (§4.1): the multi-page driver. `source` hides whether the input is
    /// a TIFF multipage document, a single image, or a filelist (§1, out
    /// of scope to decode here). Per-page failures do not abort the run;
    /// only `begin_document`/`end_document` failing surfaces as this
    /// call's error, per the "at most one document-level failure"
    /// contract. Failure to *open* a page does abort, since the original
    /// source for the page sequence is unusable past that point.
    pub fn process_pages(
        &mut self,
        source: &mut dyn PageSource,
        retry_config_path: Option<&str>,
        timeout_ms: u64,
        renderer: &mut RendererNode,
    ) -> Result<()> {
        renderer.begin_document(source.filename())?;

        let start_page = self.page_number.max(0) as usize;
        for index in start_page..source.page_count() {
            let image = source.open_page(index)?;
            let _ = self.process_page(image, index, retry_config_path, timeout_ms, renderer);
        }

        renderer.end_document()
    }
}

impl<B: Backend> RenderableSession for Session<B> {
    fn page_result(&self) -> &PageResult {
        &self.page_result
    }

    fn unicharset(&self) -> &UnicharSet {
        &self.unicharset
    }

    fn coordinate_frame(&self) -> CoordinateFrame {
        Session::coordinate_frame(self)
    }

    fn preserve_interword_spaces(&self) -> bool {
        self.preserve_interword_spaces
    }

    fn source_resolution(&self) -> u32 {
        self.source_resolution
    }

    fn page_number(&self) -> i32 {
        self.page_number
    }

    fn osd_result(&self) -> Option<OsdResult> {
        self.osd_result
    }
}
