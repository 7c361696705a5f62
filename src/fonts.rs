use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use plotters::style::{FontStyle, register_font};
use tracing::{debug, warn};

pub const FONT_FAMILY: &str = "sans-serif";

static BUNDLED_REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
static BUNDLED_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Where the raster text face came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    Bundled,
    File(PathBuf),
}

static FONT: OnceCell<FontSource> = OnceCell::new();

/// Registers the raster font once per process. `preferred` (`EPL_FONT_PATH`)
/// wins when it loads; otherwise the bundled DejaVu Sans is used, so charts
/// never depend on fonts installed on the host.
pub fn ensure_font(preferred: Option<&Path>) -> Result<&'static FontSource, String> {
    FONT.get_or_try_init(|| load_font(preferred))
}

fn load_font(preferred: Option<&Path>) -> Result<FontSource, String> {
    if let Some(path) = preferred {
        match std::fs::read(path) {
            Ok(bytes) => {
                // plotters keeps a reference to the font data for the whole process.
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                if register(bytes, bytes) {
                    debug!(font = %path.display(), "registered raster font");
                    return Ok(FontSource::File(path.to_path_buf()));
                }
                warn!(font = %path.display(), "not a usable font file; falling back to bundled font");
            }
            Err(err) => {
                warn!(font = %path.display(), error = %err, "font file unreadable; falling back to bundled font");
            }
        }
    }
    if !register(BUNDLED_REGULAR, BUNDLED_BOLD) {
        return Err("bundled DejaVu Sans could not be loaded".to_string());
    }
    debug!("registered bundled raster font");
    Ok(FontSource::Bundled)
}

fn register(regular: &'static [u8], bold: &'static [u8]) -> bool {
    register_font(FONT_FAMILY, FontStyle::Normal, regular).is_ok()
        && register_font(FONT_FAMILY, FontStyle::Bold, bold).is_ok()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{FontSource, ensure_font, load_font};

    #[test]
    fn bundled_font_loads_without_override() {
        assert_eq!(load_font(None), Ok(FontSource::Bundled));
        assert!(ensure_font(None).is_ok());
    }

    #[test]
    fn broken_override_falls_back_to_bundled_font() {
        let missing = Path::new("/nonexistent/epl-report/font.ttf");
        assert_eq!(load_font(Some(missing)), Ok(FontSource::Bundled));

        let not_a_font = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        assert_eq!(load_font(Some(&not_a_font)), Ok(FontSource::Bundled));
    }

    #[test]
    fn valid_override_is_used() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/DejaVuSans.ttf");
        assert_eq!(load_font(Some(&path)), Ok(FontSource::File(path.clone())));
    }
}
