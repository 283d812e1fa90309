//! Translation of [`ImageConfig`] into rendering tool flags.
//!
//! [`build_arguments`] is pure: the same config always yields the same
//! ordered token list, and nothing here touches the filesystem or spawns
//! anything.
//!
//! # Flag Order
//!
//! | Field | Flag | Emitted when |
//! |-------|------|--------------|
//! | `format` | `-f <format>` | non-empty |
//! | `width` | `--width <n>` | non-zero |
//! | `height` | `--height <n>` | non-zero |
//! | `disableSmartWidth` | `--disable-smart-width` | `true` |
//! | `encoding` | `--encoding <e>` | non-empty |
//! | `quality` | `--quality <n>` | non-zero |
//! | `transparent` | `--transparent` | `true` |
//! | `crop.x` | `--crop-x <n>` | non-zero |
//! | `crop.y` | `--crop-y <n>` | non-zero |
//! | `crop.h` | `--crop-h <n>` | non-zero |
//! | `crop.w` | `--crop-w <n>` | non-zero |
//! | `cookies[i]` | `--cookie key=value` | per cookie, input order |

use std::borrow::Cow;

use crate::service::types::{ImageConfig, ImageServiceError};

/// Output formats the rendering tool is allowed to produce.
pub const VALID_FORMATS: [&str; 5] = ["png", "jpg", "jpeg", "svg", "bmp"];

/// Returns `true` if `format` is one of [`VALID_FORMATS`].
///
/// ```rust
/// use html2image_api::service::is_valid_format;
///
/// assert!(is_valid_format("jpeg"));
/// assert!(!is_valid_format("tiff"));
/// assert!(!is_valid_format("PNG"));
/// ```
pub fn is_valid_format(format: &str) -> bool {
    VALID_FORMATS.contains(&format)
}

/// Build the rendering tool's argument list from a request config.
///
/// The trailing `-` `-` tokens for stdin/stdout are not included; the
/// invoker appends them.
///
/// # Errors
///
/// Returns [`ImageServiceError::InvalidFormat`] when `format` is non-empty
/// and not in [`VALID_FORMATS`]. An empty format is accepted and simply
/// emits no `-f` flag.
///
/// # Example
///
/// ```rust
/// use html2image_api::service::{build_arguments, ImageConfig};
///
/// let config = ImageConfig {
///     format: "png".to_string(),
///     width: 800,
///     transparent: true,
///     ..Default::default()
/// };
///
/// assert_eq!(
///     build_arguments(&config).unwrap(),
///     vec!["-f", "png", "--width", "800", "--transparent"]
/// );
/// ```
pub fn build_arguments(config: &ImageConfig) -> Result<Vec<String>, ImageServiceError> {
    if !config.format.is_empty() && !is_valid_format(&config.format) {
        log::debug!("Rejected unsupported format: {:?}", config.format);
        return Err(ImageServiceError::InvalidFormat(config.format.clone()));
    }

    let mut arguments = Vec::new();

    if !config.format.is_empty() {
        push_pair(&mut arguments, "-f", config.format.clone());
    }
    push_number(&mut arguments, "--width", config.width);
    push_number(&mut arguments, "--height", config.height);
    if config.disable_smart_width {
        arguments.push("--disable-smart-width".to_string());
    }
    if !config.encoding.is_empty() {
        push_pair(&mut arguments, "--encoding", config.encoding.clone());
    }
    push_number(&mut arguments, "--quality", config.quality);
    if config.transparent {
        arguments.push("--transparent".to_string());
    }

    // Height is emitted before width for crops.
    push_number(&mut arguments, "--crop-x", config.crop.x);
    push_number(&mut arguments, "--crop-y", config.crop.y);
    push_number(&mut arguments, "--crop-h", config.crop.h);
    push_number(&mut arguments, "--crop-w", config.crop.w);

    for cookie in &config.cookies {
        push_pair(
            &mut arguments,
            "--cookie",
            format!("{}={}", cookie.key, query_escape(&cookie.value)),
        );
    }

    log::trace!("Built {} tool arguments", arguments.len());

    Ok(arguments)
}

/// Escape a value the way HTML form/query components are escaped: ASCII
/// alphanumerics and `-_.~` are kept, space becomes `+`, every other byte
/// becomes `%XX`.
///
/// ```rust
/// use html2image_api::service::query_escape;
///
/// assert_eq!(query_escape("b c"), "b+c");
/// assert_eq!(query_escape("a=b&c"), "a%3Db%26c");
/// ```
pub fn query_escape(value: &str) -> Cow<'_, str> {
    let encoded = urlencoding::encode(value);
    if encoded.contains("%20") {
        Cow::Owned(encoded.replace("%20", "+"))
    } else {
        encoded
    }
}

fn push_pair(arguments: &mut Vec<String>, flag: &str, value: String) {
    arguments.push(flag.to_string());
    arguments.push(value);
}

// Zero doubles as "unset", so an explicit zero can never be emitted.
fn push_number(arguments: &mut Vec<String>, flag: &str, value: i64) {
    if value != 0 {
        push_pair(arguments, flag, value.to_string());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
