//! `ocr`: command-line front end for the `ocr-core` recognition pipeline.
//!
//! # Architecture
//!
//! `ocr-core` deliberately stops short of supplying a concrete thresholder,
//! layout analyzer, classifier, paragraph detector, or image codec (that
//! boundary is the crate's whole point). This binary wires up the part of
//! the pipeline that doesn't cross that boundary -- argument parsing,
//! config-file/`-c` override handling, the renderer chain, `--list-langs`/
//! `--print-parameters`/`--help-psm`/`--help-oem` introspection -- against a
//! [`NullBackend`] that reports a clear recognition error for the
//! collaborator calls a real build would satisfy with a linked recognizer.
//!
//! # Exit codes
//!
//! - `0`: success
//! - `1`: fatal error (argument, init, processing)
//! - `2`: cannot open the input image

use anyhow::{Context, Result, bail};
use clap::Parser;
use ocr_core::collaborators::{ImageView, LayoutBlock, OsdResult, Rectangle, Thresholder};
use ocr_core::config::{ConfigStore, engine_config::EngineConfig};
use ocr_core::enums::{OcrEngineMode, PageSegMode};
use ocr_core::error::OcrError;
use ocr_core::page_result::PageResult;
use ocr_core::renderer::plain_text::TextRenderer;
use ocr_core::renderer::{RendererHandler, RendererNode};
use ocr_core::session::{PageSource, Session};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// `ocr [options] image output_base [configfile...]` (the §6.2 CLI
/// contract). `image`/`output_base` are optional at the clap level, the
/// same way the reference recognizer's CLI allows `--list-langs` and
/// `--print-parameters` to run without them; [`run`] enforces they're
/// present for an actual recognition pass.
#[derive(Parser, Debug)]
#[command(name = "ocr", version, about = "Recognize text in an image", disable_version_flag = true)]
struct Cli {
    /// Input image path.
    image: Option<PathBuf>,

    /// Output basename; writer extensions are appended per renderer.
    /// `-` or `stdout` streams to stdout and suppresses the banner.
    output_base: Option<String>,

    /// Extra tesseract-style config files, applied in order.
    configfile: Vec<String>,

    /// Language(s), `+`-joined (e.g. `eng+deu`).
    #[arg(short = 'l', long = "lang", default_value = "eng")]
    lang: String,

    #[arg(long = "tessdata-dir")]
    tessdata_dir: Option<PathBuf>,

    #[arg(long = "user-words")]
    user_words: Option<PathBuf>,

    #[arg(long = "user-patterns")]
    user_patterns: Option<PathBuf>,

    #[arg(long = "dpi")]
    dpi: Option<u32>,

    /// `key=value`, repeatable.
    #[arg(short = 'c', value_name = "KEY=VALUE")]
    vars: Vec<String>,

    #[arg(long = "psm", value_name = "NUM")]
    psm: Option<u8>,

    #[arg(long = "oem", value_name = "NUM")]
    oem: Option<u8>,

    #[arg(long = "list-langs")]
    list_langs: bool,

    #[arg(long = "print-parameters")]
    print_parameters: bool,

    #[arg(short = 'v', long = "version")]
    version: bool,

    #[arg(long = "help-psm")]
    help_psm: bool,

    #[arg(long = "help-oem")]
    help_oem: bool,

    #[arg(long = "help-extra")]
    help_extra: bool,
}

/// Distinguishes the two fatal-exit-code buckets of §6.2 from an otherwise
/// uniform `anyhow::Error` chain.
enum CliOutcome {
    Success,
    Fatal(anyhow::Error),
    CannotOpenImage(anyhow::Error),
}

/// Validates that `path` exists and is a regular file, per §7 "Input
/// error: image open/read failure" mapping to exit code 2.
///
/// # Errors
///
/// Returns an error if `path` does not exist or is not a regular file.
fn validate_image_path(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("image not found: '{}'", path.display());
    }
    if !path.is_file() {
        bail!("not a regular file: '{}'", path.display());
    }
    Ok(())
}

/// Parses a numeric PSM argument into [`PageSegMode`].
///
/// # Errors
///
/// Returns an error if `value` is outside `0..=13`.
fn parse_psm(value: u8) -> Result<PageSegMode> {
    Ok(match value {
        0 => PageSegMode::OsdOnly,
        1 => PageSegMode::AutoOsd,
        2 => PageSegMode::AutoOnly,
        3 => PageSegMode::Auto,
        4 => PageSegMode::SingleColumn,
        5 => PageSegMode::SingleBlockVertText,
        6 => PageSegMode::SingleBlock,
        7 => PageSegMode::SingleLine,
        8 => PageSegMode::SingleWord,
        9 => PageSegMode::CircleWord,
        10 => PageSegMode::SingleChar,
        11 => PageSegMode::SparseText,
        12 => PageSegMode::SparseTextOsd,
        13 => PageSegMode::RawLine,
        other => bail!("invalid --psm value: {other}. Use --help-psm to list valid values."),
    })
}

/// Parses a numeric OEM argument into [`OcrEngineMode`].
///
/// # Errors
///
/// Returns an error if `value` is outside `0..=3`.
fn parse_oem(value: u8) -> Result<OcrEngineMode> {
    Ok(match value {
        0 => OcrEngineMode::TesseractOnly,
        1 => OcrEngineMode::LstmOnly,
        2 => OcrEngineMode::TesseractLstmCombined,
        3 => OcrEngineMode::Default,
        other => bail!("invalid --oem value: {other}. Use --help-oem to list valid values."),
    })
}

/// Builds the effective [`EngineConfig`]: auto-discovered `ocr.toml` (if
/// any) as a base, overridden field-by-field by CLI flags, matching the
/// explicit-beats-discovered-beats-default precedence of §4.5.
fn build_engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::discover().context("searching for ocr.toml")?.unwrap_or_default();

    config.languages = cli.lang.split('+').map(str::to_string).collect();
    if let Some(dir) = &cli.tessdata_dir {
        config.tessdata_dir = Some(dir.display().to_string());
    }
    if let Some(words) = &cli.user_words {
        config.user_words_file = Some(words.display().to_string());
    }
    if let Some(patterns) = &cli.user_patterns {
        config.user_patterns_file = Some(patterns.display().to_string());
    }
    if let Some(dpi) = cli.dpi {
        config.dpi = Some(dpi);
    }
    if let Some(psm) = cli.psm {
        config.page_seg_mode = parse_psm(psm)?;
    }
    if let Some(oem) = cli.oem {
        config.engine_mode = parse_oem(oem)?;
    }
    Ok(config)
}

const PSM_HELP: &str = "\
Page segmentation modes:
  0    Orientation and script detection (OSD) only.
  1    Automatic page segmentation with OSD.
  2    Automatic page segmentation, but no OSD, or OCR.
  3    Fully automatic page segmentation, but no OSD. (Default)
  4    Assume a single column of text of variable sizes.
  5    Assume a single uniform block of vertically aligned text.
  6    Assume a single uniform block of text.
  7    Treat the image as a single text line.
  8    Treat the image as a single word.
  9    Treat the image as a single word in a circle.
  10   Treat the image as a single character.
  11   Sparse text. Find as much text as possible in no particular order.
  12   Sparse text with OSD.
  13   Raw line. Treat the image as a single text line, bypassing layout.";

const OEM_HELP: &str = "\
OCR Engine modes:
  0    Legacy engine only.
  1    Neural nets LSTM engine only.
  2    Legacy + LSTM engines.
  3    Default, based on what is available.";

const EXTRA_HELP: &str = "\
Additional configuration via config files or -c key=value overrides:
  -c preserve_interword_spaces=1   Keep original interword spacing.
  -c bidi_debug=1                  Trace bidi reordering decisions.
See individual renderer output formats in the project documentation.";

/// Stand-in for a linked recognizer: every collaborator call fails with a
/// recognition error naming the boundary, since `ocr-core` intentionally
/// ships no thresholder/layout-analyzer/classifier/paragraph-detector/
/// orientation-detector of its own (§1).
struct NullBackend;

impl Thresholder for NullBackend {
    fn threshold(&mut self, _image: ImageView, _rect: Rectangle) -> ocr_core::Result<()> {
        Ok(())
    }
}

impl ocr_core::collaborators::LayoutAnalyzer for NullBackend {
    fn segment_page(&mut self, _image: ImageView, _rect: Rectangle) -> ocr_core::Result<Vec<LayoutBlock>> {
        Err(OcrError::recognition(
            "no recognition backend is linked into this binary; ocr-core's layout analyzer and classifier are supplied by the integrator",
        ))
    }
}

impl ocr_core::collaborators::Classifier for NullBackend {
    fn recognize_all_words(&mut self, _image: ImageView, _blocks: &[LayoutBlock], _config: &ConfigStore) -> ocr_core::Result<PageResult> {
        Err(OcrError::recognition("no recognition backend is linked into this binary"))
    }
}

impl ocr_core::collaborators::ParagraphDetector for NullBackend {
    fn detect_paragraphs(&mut self, _page: &mut PageResult) -> ocr_core::Result<()> {
        Ok(())
    }
}

impl ocr_core::collaborators::OrientationDetector for NullBackend {
    fn detect_orientation_script(&mut self, _image: ImageView, _rect: Rectangle) -> ocr_core::Result<OsdResult> {
        Err(OcrError::recognition("no recognition backend is linked into this binary"))
    }
}

/// A single already-validated image file, standing in for the TIFF
/// multipage/filelist drivers `process_pages` also supports; deciding
/// *which* driver applies and decoding pixels from it is the image-I/O
/// layer §1 puts out of scope, so this always reports one page with
/// placeholder dimensions.
struct SingleImageSource {
    path: PathBuf,
    opened: bool,
}

impl PageSource for SingleImageSource {
    fn page_count(&self) -> usize {
        1
    }

    fn open_page(&mut self, index: usize) -> ocr_core::Result<ImageView> {
        if index != 0 || self.opened {
            return Err(OcrError::input("no such page"));
        }
        self.opened = true;
        Ok(ImageView { width: 1, height: 1 })
    }

    fn filename(&self) -> &str {
        self.path.to_str().unwrap_or("<non-utf8 path>")
    }
}

fn run(cli: Cli) -> CliOutcome {
    if cli.version {
        println!("ocr {}", env!("CARGO_PKG_VERSION"));
        return CliOutcome::Success;
    }
    if cli.help_psm {
        println!("{PSM_HELP}");
        return CliOutcome::Success;
    }
    if cli.help_oem {
        println!("{OEM_HELP}");
        return CliOutcome::Success;
    }
    if cli.help_extra {
        println!("{EXTRA_HELP}");
        return CliOutcome::Success;
    }

    let engine_config = match build_engine_config(&cli) {
        Ok(c) => c,
        Err(e) => return CliOutcome::Fatal(e),
    };

    let mut session = Session::new(NullBackend);
    engine_config.apply_to(session.config_mut());
    for assignment in &cli.vars {
        if !session.config_mut().apply_cli_override(assignment) {
            return CliOutcome::Fatal(anyhow::anyhow!("rejected -c override: {assignment}"));
        }
    }

    if cli.list_langs {
        for lang in &engine_config.languages {
            println!("{lang}");
        }
        return CliOutcome::Success;
    }

    if cli.print_parameters {
        let mut out = String::new();
        session.config().print_variables(&mut out);
        print!("{out}");
        return CliOutcome::Success;
    }

    let (Some(image_path), Some(output_base)) = (cli.image.clone(), cli.output_base.clone()) else {
        return CliOutcome::Fatal(anyhow::anyhow!(
            "missing required arguments: ocr [options] image output_base [configfile...]"
        ));
    };

    if let Err(e) = validate_image_path(&image_path) {
        return CliOutcome::CannotOpenImage(e);
    }

    for path in &cli.configfile {
        match std::fs::read_to_string(path) {
            Ok(contents) => session.config_mut().apply_file_contents(&contents),
            Err(e) => return CliOutcome::Fatal(anyhow::anyhow!("reading config file '{path}': {e}")),
        }
    }

    session.set_page_segmentation_mode(engine_config.page_seg_mode);

    let streaming_to_stdout = output_base == "-" || output_base == "stdout";
    if !streaming_to_stdout {
        eprintln!("ocr: recognizing '{}'", image_path.display());
    }

    let mut chain = RendererNode::new(Box::new(TextRenderer::new()));
    let mut source = SingleImageSource {
        path: image_path,
        opened: false,
    };

    if let Err(e) = session.process_pages(&mut source, None, 0, &mut chain) {
        return CliOutcome::Fatal(anyhow::anyhow!(e.one_line()));
    }

    // `process_pages` only surfaces a `begin_document`/`end_document`
    // failure (§4.1); a per-page recognition failure is swallowed there so
    // a multi-page run keeps going. For a single-image invocation that
    // swallowed failure is still this run's only outcome, so re-check it
    // explicitly through `get_utf8_text` rather than trusting `Ok(())`.
    let text = match session.get_utf8_text() {
        Ok(text) => text,
        Err(e) => return CliOutcome::Fatal(anyhow::anyhow!(e.one_line())),
    };

    if streaming_to_stdout {
        print!("{text}");
    } else if let Err(e) = std::fs::write(format!("{output_base}.txt"), &text) {
        return CliOutcome::Fatal(anyhow::anyhow!("writing output: {e}"));
    }
    CliOutcome::Success
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match run(cli) {
        CliOutcome::Success => ExitCode::SUCCESS,
        CliOutcome::Fatal(e) => {
            eprintln!("ocr: {e:#}");
            ExitCode::from(1)
        }
        CliOutcome::CannotOpenImage(e) => {
            eprintln!("ocr: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_positional_and_flags() {
        let cli = Cli::parse_from([
            "ocr",
            "-l",
            "eng+deu",
            "--psm",
            "6",
            "-c",
            "preserve_interword_spaces=1",
            "input.png",
            "out",
            "configfile1",
        ]);
        assert_eq!(cli.lang, "eng+deu");
        assert_eq!(cli.psm, Some(6));
        assert_eq!(cli.vars, vec!["preserve_interword_spaces=1".to_string()]);
        assert_eq!(cli.image, Some(PathBuf::from("input.png")));
        assert_eq!(cli.output_base, Some("out".to_string()));
        assert_eq!(cli.configfile, vec!["configfile1".to_string()]);
    }

    #[test]
    fn cli_allows_no_positional_args_for_introspection_flags() {
        let cli = Cli::parse_from(["ocr", "--list-langs"]);
        assert!(cli.list_langs);
        assert!(cli.image.is_none());
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_psm_rejects_out_of_range() {
        assert!(parse_psm(14).is_err());
        assert!(parse_psm(3).is_ok());
    }

    #[test]
    fn parse_oem_rejects_out_of_range() {
        assert!(parse_oem(4).is_err());
        assert!(parse_oem(0).is_ok());
    }

    #[test]
    fn validate_image_path_rejects_missing_file() {
        let missing = PathBuf::from("/nonexistent/path/image.png");
        assert!(validate_image_path(&missing).is_err());
    }

    #[test]
    fn validate_image_path_accepts_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_image_path(file.path()).is_ok());
    }

    #[test]
    fn missing_image_arg_produces_fatal_not_cannot_open() {
        let cli = Cli::parse_from(["ocr", "--dpi", "300"]);
        match run(cli) {
            CliOutcome::Fatal(_) => {}
            _ => panic!("expected a fatal argument error"),
        }
    }

    #[test]
    fn nonexistent_image_is_cannot_open_not_fatal() {
        let cli = Cli::parse_from(["ocr", "/nonexistent/image.png", "out"]);
        match run(cli) {
            CliOutcome::CannotOpenImage(_) => {}
            _ => panic!("expected exit code 2 path"),
        }
    }
}
