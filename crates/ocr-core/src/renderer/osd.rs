//! OSD renderer (§6.3): orientation/script detection output,
//! `Page: N\nOrientation in degrees: D\nRotate: R\nOrientation
//! confidence: C\nScript: S\nScript confidence: K\n`.

use super::{RenderableSession, RendererHandler};
use crate::enums::Orientation;
use crate::error::{OcrError, Result};
use crate::unicharset::Script;
use std::fmt::Write as _;

fn script_name(s: Script) -> &'static str {
    match s {
        Script::Latin => "Latin",
        Script::Common => "Common",
        Script::Devanagari => "Devanagari",
        Script::Bengali => "Bengali",
        Script::Gurmukhi => "Gurmukhi",
        Script::Gujarati => "Gujarati",
        Script::Oriya => "Oriya",
        Script::Tamil => "Tamil",
        Script::Telugu => "Telugu",
        Script::Kannada => "Kannada",
        Script::Malayalam => "Malayalam",
        Script::Sinhala => "Sinhala",
        Script::Khmer => "Khmer",
        Script::Myanmar => "Myanmar",
        Script::Thai => "Thai",
        Script::Arabic => "Arabic",
        Script::Other => "Other",
    }
}

/// "Orientation in degrees" is how far clockwise the page content is
/// rotated from upright; `Orientation::degrees()` already gives the
/// complementary "Rotate" correction (§6.3), so this is just `360 -
/// that`, reduced mod 360.
fn orientation_degrees(o: Orientation) -> i32 {
    (360 - o.degrees() as i32) % 360
}

#[derive(Debug, Default)]
pub struct OsdRenderer {
    buffer: String,
}

impl OsdRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

impl RendererHandler for OsdRenderer {
    fn file_extension(&self) -> &'static str {
        "osd"
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let osd = session
            .osd_result()
            .ok_or_else(|| OcrError::renderer("osd", "no orientation/script detection result for this page"))?;
        writeln!(
            self.buffer,
            "Page: {}\nOrientation in degrees: {}\nRotate: {}\nOrientation confidence: {:.2}\nScript: {}\nScript confidence: {:.2}",
            session.page_number() + 1,
            orientation_degrees(osd.orientation),
            osd.orientation.degrees(),
            osd.orientation_confidence,
            script_name(osd.script),
            osd.script_confidence
        )
        .ok();
        self.buffer.push('\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::OsdResult;
    use crate::iterator::CoordinateFrame;
    use crate::page_result::PageResult;
    use crate::unicharset::{Script, UnicharSet};

    struct Fixture {
        page: PageResult,
        unicharset: UnicharSet,
        osd: Option<OsdResult>,
    }

    impl RenderableSession for Fixture {
        fn page_result(&self) -> &PageResult {
            &self.page
        }
        fn unicharset(&self) -> &UnicharSet {
            &self.unicharset
        }
        fn coordinate_frame(&self) -> CoordinateFrame {
            CoordinateFrame {
                scale: 1.0,
                scaled_y_resolution: 300.0,
                rect_left: 0,
                rect_top: 0,
                rect_width: 1000,
                rect_height: 1000,
            }
        }
        fn preserve_interword_spaces(&self) -> bool {
            false
        }
        fn source_resolution(&self) -> u32 {
            300
        }
        fn page_number(&self) -> i32 {
            0
        }
        fn osd_result(&self) -> Option<OsdResult> {
            self.osd
        }
    }

    #[test]
    fn emits_all_six_fields() {
        let fixture = Fixture {
            page: PageResult::new(),
            unicharset: UnicharSet::new(),
            osd: Some(OsdResult {
                orientation: Orientation::PageRight,
                orientation_confidence: 2.5,
                script: Script::Latin,
                script_confidence: 9.1,
            }),
        };
        let mut r = OsdRenderer::new();
        r.on_add_image(&fixture).unwrap();
        assert!(r.buffer().contains("Orientation in degrees: 270"));
        assert!(r.buffer().contains("Rotate: 90"));
        assert!(r.buffer().contains("Script: Latin") || r.buffer().contains("Script: "));
    }

    #[test]
    fn missing_osd_result_is_a_renderer_error() {
        let fixture = Fixture {
            page: PageResult::new(),
            unicharset: UnicharSet::new(),
            osd: None,
        };
        let mut r = OsdRenderer::new();
        assert!(r.on_add_image(&fixture).is_err());
    }
}
