//! Core image generation: one rendering subprocess per request.
//!
//! [`generate_image`] validates the request config, builds the argument
//! list and hands both to [`run_tool`], which owns the child process for
//! its whole life:
//!
//! ```text
//! spawn ──► ┌ write html → stdin, close ┐
//!           ├ drain stdout              ├─ joined ──► exit status
//!           └ drain stderr              ┘
//!      ▲                                       │
//!      └──────── timeout_at(deadline) ─────────┘
//!                     │ expired
//!                     ▼
//!               kill + reap ──► Timeout
//! ```
//!
//! The deadline and the child's completion are raced by a single
//! `timeout_at`, and the child is spawned with `kill_on_drop` so any outer
//! cancellation (request timeout middleware, client disconnect) also
//! terminates it.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::time::Instant;

use crate::service::arguments::build_arguments;
use crate::service::types::{GenerateImageRequest, ImageResponse, ImageServiceError};

// ============================================================================
// Constants
// ============================================================================

/// Default deadline for one conversion, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default rendering executable, resolved through `PATH`.
pub const DEFAULT_TOOL: &str = "wkhtmltoimage";

/// Positional tokens telling the tool to read stdin and write stdout.
const STDIO_TOKENS: [&str; 2] = ["-", "-"];

// ============================================================================
// Public API
// ============================================================================

/// Where the tool lives and how long it may run.
#[derive(Debug, Clone)]
pub struct ToolSettings<'a> {
    /// Executable to spawn.
    pub tool: &'a Path,
    /// Absolute budget for spawn + run + teardown.
    pub timeout: Duration,
}

/// Convert the request's HTML into an image.
///
/// # Errors
///
/// - [`ImageServiceError::InvalidFormat`] if the format is unsupported
///   (no process is spawned)
/// - [`ImageServiceError::Timeout`] if the tool exceeded the deadline
/// - [`ImageServiceError::ToolSpawn`] / [`ImageServiceError::ToolFailed`]
///   if the tool could not start or exited non-zero
///
/// # Example
///
/// ```rust,no_run
/// use html2image_api::service::{generate_image, GenerateImageRequest, ToolSettings};
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let request: GenerateImageRequest =
///     serde_json::from_str(r#"{"html":"<p>hi</p>","config":{"format":"png"}}"#)?;
/// let settings = ToolSettings {
///     tool: Path::new("wkhtmltoimage"),
///     timeout: Duration::from_secs(5),
/// };
///
/// let image = generate_image(&settings, &request).await?;
/// assert_eq!(image.content_type(), "image/png");
/// # Ok(())
/// # }
/// ```
pub async fn generate_image(
    settings: &ToolSettings<'_>,
    request: &GenerateImageRequest,
) -> Result<ImageResponse, ImageServiceError> {
    let arguments = build_arguments(&request.config)?;

    log::debug!(
        "Generating image from HTML ({} bytes, format={:?}, {} arguments)",
        request.html.len(),
        request.config.format,
        arguments.len()
    );

    let data = run_tool(settings.tool, &request.html, &arguments, settings.timeout).await?;

    log::info!(
        "✅ Image generated successfully ({} bytes input → {} bytes output)",
        request.html.len(),
        data.len()
    );

    Ok(ImageResponse::new(data, request.config.format.clone()))
}

/// Run the rendering tool once and collect its standard output.
///
/// `arguments` are passed first, followed by `-` `-`. The HTML is written to
/// the child's stdin while stdout and stderr are drained concurrently, so
/// the child never blocks on a full pipe.
///
/// # Errors
///
/// - [`ImageServiceError::Timeout`] when `timeout` elapses; the child is
///   killed and reaped before this returns
/// - [`ImageServiceError::ToolSpawn`] when the executable cannot be started
/// - [`ImageServiceError::ToolFailed`] on a non-zero exit
/// - [`ImageServiceError::Internal`] when reading the child's pipes fails
pub async fn run_tool(
    tool: &Path,
    html: &str,
    arguments: &[String],
    timeout: Duration,
) -> Result<Vec<u8>, ImageServiceError> {
    let deadline = Instant::now() + timeout;
    let started_at = Instant::now();

    let mut child = Command::new(tool)
        .args(arguments)
        .args(STDIO_TOKENS)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            log::error!("❌ Failed to spawn {}: {}", tool.display(), e);
            ImageServiceError::ToolSpawn(e.to_string())
        })?;

    log::trace!(
        "Spawned {} (pid {:?}) with {} arguments",
        tool.display(),
        child.id(),
        arguments.len()
    );

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let outcome = tokio::time::timeout_at(deadline, async {
        let (written, stdout, stderr, status) = tokio::join!(
            feed_stdin(stdin, html.as_bytes()),
            drain(stdout),
            drain(stderr),
            child.wait(),
        );
        (written, stdout, stderr, status)
    })
    .await;

    let (written, stdout, stderr, status) = match outcome {
        Ok(finished) => finished,
        Err(_elapsed) => {
            log::warn!(
                "⏱️ {} exceeded {:?}, killing pid {:?}",
                tool.display(),
                timeout,
                child.id()
            );
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill timed out rendering process: {}", e);
            }
            return Err(ImageServiceError::Timeout(format!(
                "rendering tool did not finish within {:?}",
                timeout
            )));
        }
    };

    let status = status.map_err(|e| {
        log::error!("❌ Failed to wait for {}: {}", tool.display(), e);
        ImageServiceError::Internal(e.to_string())
    })?;

    if let Err(e) = written {
        // The tool may exit before reading all input; its status decides.
        log::debug!("Writing HTML to rendering tool stdin failed: {}", e);
    }

    let stderr = String::from_utf8_lossy(&stderr.unwrap_or_default()).into_owned();

    if !status.success() {
        let error = ImageServiceError::ToolFailed {
            exit_code: status.code(),
            stderr,
        };
        log::error!(
            "❌ Rendering tool failed after {:?}: {}",
            started_at.elapsed(),
            error
        );
        return Err(error);
    }

    if !stderr.trim().is_empty() {
        log::debug!("Rendering tool stderr: {}", stderr.trim());
    }

    let stdout = stdout.map_err(|e| {
        log::error!("❌ Failed to read rendering tool output: {}", e);
        ImageServiceError::Internal(e.to_string())
    })?;

    log::debug!(
        "Rendering tool finished in {:?} ({} bytes)",
        started_at.elapsed(),
        stdout.len()
    );

    Ok(stdout)
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Write all input, then drop the handle so the child sees EOF.
async fn feed_stdin(stdin: Option<ChildStdin>, input: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    stdin.write_all(input).await?;
    stdin.shutdown().await
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

// ============================================================================
// Unit Tests
// ============================================================================
