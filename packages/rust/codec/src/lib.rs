//! Inline content embedding for bootstrap documents.
//!
//! Payloads are carried inside the document as RFC 2397 `data:` URLs so the
//! first-boot interpreter never needs network access to materialize a file.
//! [`encode`] always emits the percent-escaped form (`data:,<body>`);
//! [`decode`] also accepts media types and `;base64` bodies.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};
use tracing::{debug, instrument};

use bootcfg_shared::{BootcfgError, DEFAULT_FILE_MODE, File, FileContents, IgnitionConfig, Result};

/// Scheme prefix of every encoded payload.
pub const DATA_URL_PREFIX: &str = "data:,";

/// Header suffix selecting a base64 body.
const BASE64_FLAG: &str = ";base64";

/// Bytes left as-is: RFC 2396 unreserved and reserved characters.
/// Everything else, including all non-ASCII bytes, becomes `%XX`.
const ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@');

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encode `payload` as a `data:` URL. Total and deterministic.
pub fn encode(payload: &[u8]) -> String {
    let mut out = String::with_capacity(DATA_URL_PREFIX.len() + payload.len());
    out.push_str(DATA_URL_PREFIX);
    out.extend(percent_encode(payload, ESCAPE_SET));
    out
}

/// Decode a `data:` URL back into its bytes.
///
/// Accepts `data:[<mediatype>][;base64],<body>`. The media type is ignored.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let rest = match input.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &input[5..],
        _ => return Err(BootcfgError::malformed("missing data: scheme prefix")),
    };

    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| BootcfgError::malformed("missing ',' between header and body"))?;

    check_escapes(body)?;
    let raw: Vec<u8> = percent_decode_str(body).collect();

    // Only a trailing `;base64` parameter marks the body as base64; a bare
    // `base64` header is a media type.
    let is_base64 = header
        .len()
        .checked_sub(BASE64_FLAG.len())
        .and_then(|start| header.get(start..))
        .is_some_and(|flag| flag.eq_ignore_ascii_case(BASE64_FLAG));
    if !is_base64 {
        return Ok(raw);
    }

    BASE64_STANDARD
        .decode(&raw)
        .map_err(|e| BootcfgError::malformed(format!("invalid base64 body: {e}")))
}

/// Decode a `data:` URL whose payload must be UTF-8 text.
pub fn decode_to_string(input: &str) -> Result<String> {
    let bytes = decode(input)?;
    String::from_utf8(bytes)
        .map_err(|e| BootcfgError::malformed(format!("payload is not UTF-8: {e}")))
}

/// `percent_decode_str` passes bad escapes through verbatim; reject them instead.
fn check_escapes(body: &str) -> Result<()> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or_else(|| {
                BootcfgError::malformed(format!("truncated escape at offset {i}"))
            })?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return Err(BootcfgError::malformed(format!(
                    "invalid escape {:?} at offset {i}",
                    String::from_utf8_lossy(hex)
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

/// Embed `contents` at `path` with the default `0644` mode.
pub fn append_file(config: &mut IgnitionConfig, path: &str, contents: &[u8]) {
    append_file_with_mode(config, path, contents, DEFAULT_FILE_MODE);
}

/// Embed `contents` at `path` with explicit permission bits.
///
/// Duplicate paths are not checked; the node applies the last entry.
pub fn append_file_with_mode(config: &mut IgnitionConfig, path: &str, contents: &[u8], mode: u32) {
    config.storage.files.push(File {
        path: path.to_string(),
        contents: FileContents {
            source: encode(contents),
        },
        mode,
    });
    debug!(path, size = contents.len(), mode = format_args!("{mode:o}"), "embedded file");
}

/// Read a local file and embed it at `out_path`.
#[instrument(skip(config), fields(src = %src_path.display()))]
pub fn copy_file(config: &mut IgnitionConfig, out_path: &str, src_path: &Path) -> Result<()> {
    let contents = std::fs::read(src_path).map_err(|e| BootcfgError::io(src_path, e))?;
    append_file(config, out_path, &contents);
    Ok(())
}
