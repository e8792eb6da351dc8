use crate::error_helpers;
use crate::pattern::Pattern;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// What a single patch run did to its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The fragment was found and replaced; `span` is its byte range in the old text
    Replaced { span: Range<usize> },
    /// The fragment was found but the replacement is identical to it
    Unchanged,
    /// The pattern did not match anywhere
    NotMatched,
}

impl PatchOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, PatchOutcome::Replaced { .. })
    }
}

/// Outcome plus the before/after text, used for previews
#[derive(Debug)]
pub struct PatchPreview {
    pub outcome: PatchOutcome,
    pub old_text: String,
    pub new_text: String,
}

/// Replace the first match of `pattern` in `text` with the literal `replacement`
///
/// The replacement takes on the line ending of the text it replaces, so a
/// CRLF file stays CRLF. Returns the new text and the byte range of the
/// replaced fragment, or `None` if the pattern does not match.
pub fn apply_once(
    text: &str,
    pattern: &Pattern,
    replacement: &str,
) -> Option<(String, Range<usize>)> {
    let span = pattern.as_regex().find(text)?.range();

    let uses_crlf = crlf_line_endings(&text[span.clone()])
        .or_else(|| crlf_line_endings(text))
        .unwrap_or(false);
    let replacement = if uses_crlf {
        to_crlf(replacement)
    } else {
        Cow::Borrowed(replacement)
    };

    let mut new_text = String::with_capacity(text.len() - span.len() + replacement.len());
    new_text.push_str(&text[..span.start]);
    new_text.push_str(&replacement);
    new_text.push_str(&text[span.end..]);

    Some((new_text, span))
}

/// `Some(true)` if the first line break in `text` is CRLF, `None` if there is none
fn crlf_line_endings(text: &str) -> Option<bool> {
    let newline = text.find('\n')?;
    Some(text[..newline].ends_with('\r'))
}

/// Turn every bare `\n` into `\r\n`
fn to_crlf(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }

    let mut converted = String::with_capacity(text.len() + text.len() / 32);
    let mut previous = None;
    for c in text.chars() {
        if c == '\n' && previous != Some('\r') {
            converted.push('\r');
        }
        converted.push(c);
        previous = Some(c);
    }
    Cow::Owned(converted)
}

/// Compute what `patch` would do without touching the file
pub fn preview(file_path: &Path, pattern: &Pattern, replacement: &str) -> Result<PatchPreview> {
    let old_text = read_text(file_path)?;

    let (outcome, new_text) = match apply_once(&old_text, pattern, replacement) {
        Some((new_text, _)) if new_text == old_text => (PatchOutcome::Unchanged, new_text),
        Some((new_text, span)) => (PatchOutcome::Replaced { span }, new_text),
        None => (PatchOutcome::NotMatched, old_text.clone()),
    };

    debug!(path = %file_path.display(), ?outcome, "computed patch");

    Ok(PatchPreview {
        outcome,
        old_text,
        new_text,
    })
}

/// Replace the first occurrence of `pattern` in the file, in place
///
/// The file is written only when its text actually changes.
pub fn patch(file_path: &Path, pattern: &Pattern, replacement: &str) -> Result<PatchOutcome> {
    let preview = preview(file_path, pattern, replacement)?;

    if preview.outcome.is_replaced() {
        write_atomically(file_path, &preview.new_text)?;
        info!(
            path = %file_path.display(),
            old_len = preview.old_text.len(),
            new_len = preview.new_text.len(),
            "fragment replaced"
        );
    } else {
        info!(path = %file_path.display(), outcome = ?preview.outcome, "file left untouched");
    }

    Ok(preview.outcome)
}

fn read_text(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(text) => {
            debug!(path = %file_path.display(), bytes = text.len(), "read target");
            Ok(text)
        }
        Err(e) if error_helpers::is_not_found(&e) => Err(anyhow::anyhow!(
            error_helpers::not_found_error(file_path, "reading patch target")
        )),
        Err(e) if error_helpers::is_permission_denied(&e) => Err(anyhow::anyhow!(
            error_helpers::permission_error(file_path, "reading")
        )),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(anyhow::anyhow!(
            error_helpers::not_text_error(file_path)
        )),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read file: {}", file_path.display()))
        }
    }
}

/// Write `text` to a temp file beside `file_path`, then rename it over the original
fn write_atomically(file_path: &Path, text: &str) -> Result<()> {
    let parent_dir = match file_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let permissions = fs::metadata(file_path)
        .with_context(|| format!("Failed to read file metadata: {}", file_path.display()))?
        .permissions();

    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| {
        if error_helpers::is_permission_denied(&e) {
            anyhow::anyhow!(error_helpers::permission_error(file_path, "writing"))
        } else {
            anyhow::Error::new(e)
                .context(format!("Failed to create temp file in {}", parent_dir.display()))
        }
    })?;

    temp_file
        .write_all(text.as_bytes())
        .with_context(|| format!("Failed to write temp file for {}", file_path.display()))?;
    temp_file
        .as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush temp file for {}", file_path.display()))?;

    fs::set_permissions(temp_file.path(), permissions)
        .with_context(|| format!("Failed to copy permissions for {}", file_path.display()))?;

    temp_file
        .persist(file_path)
        .with_context(|| format!("Failed to persist temp file to {}", file_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_apply_once_replaces_first_match_only() {
        let pattern = Pattern::tolerant("foo").unwrap();
        let (new_text, span) = apply_once("foo bar foo", &pattern, "baz").unwrap();
        assert_eq!(new_text, "baz bar foo");
        assert_eq!(span, 0..3);
    }

    #[test]
    fn test_apply_once_replacement_is_literal() {
        let pattern = Pattern::regex("(a)(b)").unwrap();
        let (new_text, _) = apply_once("xaby", &pattern, r#"$1 \"$2\""#).unwrap();
        assert_eq!(new_text, r#"x$1 \"$2\"y"#);
    }

    #[test]
    fn test_apply_once_keeps_crlf_endings() {
        let pattern = Pattern::tolerant("<Grid>\n  <A/>\n</Grid>").unwrap();
        let text = "<Root>\r\n<Grid>\r\n  <A/>\r\n</Grid>\r\n</Root>\r\n";

        let (new_text, _) = apply_once(text, &pattern, "<Grid>\n  <B/>\n</Grid>").unwrap();
        assert_eq!(new_text, "<Root>\r\n<Grid>\r\n  <B/>\r\n</Grid>\r\n</Root>\r\n");
    }

    #[test]
    fn test_apply_once_single_line_match_uses_file_endings() {
        let pattern = Pattern::tolerant("<A/>").unwrap();
        let text = "<Root>\r\n<A/>\r\n</Root>";

        let (new_text, _) = apply_once(text, &pattern, "<B/>\n<C/>").unwrap();
        assert_eq!(new_text, "<Root>\r\n<B/>\r\n<C/>\r\n</Root>");
    }

    #[test]
    fn test_apply_once_keeps_lf_endings() {
        let pattern = Pattern::tolerant("a\nb").unwrap();
        let (new_text, _) = apply_once("x\na\nb\ny\n", &pattern, "c\nd").unwrap();
        assert_eq!(new_text, "x\nc\nd\ny\n");
    }

    #[test]
    fn test_to_crlf_leaves_existing_crlf_alone() {
        assert_eq!(to_crlf("a\r\nb\nc"), "a\r\nb\r\nc");
        assert!(matches!(to_crlf("no breaks"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_apply_once_no_match() {
        let pattern = Pattern::tolerant("missing").unwrap();
        assert!(apply_once("nothing here", &pattern, "x").is_none());
    }

    #[test]
    fn test_patch_replaces_and_writes() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", "head\n  old   value\ntail\n");
        let pattern = Pattern::tolerant("old value").unwrap();

        let outcome = patch(&path, &pattern, "new value").unwrap();
        assert!(outcome.is_replaced());
        assert_eq!(fs::read_to_string(&path).unwrap(), "head\n  new value\ntail\n");
    }

    #[test]
    fn test_patch_no_match_does_not_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", "unrelated\n");
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        let pattern = Pattern::tolerant("old value").unwrap();

        let outcome = patch(&path, &pattern, "new value").unwrap();
        assert_eq!(outcome, PatchOutcome::NotMatched);
        assert_eq!(fs::read_to_string(&path).unwrap(), "unrelated\n");
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_patch_identical_replacement_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", "keep me\n");
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        let pattern = Pattern::tolerant("keep me").unwrap();

        let outcome = patch(&path, &pattern, "keep me").unwrap();
        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_patch_second_run_is_no_match() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", "Width=\"8\"\n");
        let pattern = Pattern::tolerant("Width=\"8\"").unwrap();

        assert!(patch(&path, &pattern, "Width=\"Auto\"").unwrap().is_replaced());
        let after_first = fs::read_to_string(&path).unwrap();
        assert_eq!(patch(&path, &pattern, "Width=\"Auto\"").unwrap(), PatchOutcome::NotMatched);
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_patch_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let pattern = Pattern::tolerant("x").unwrap();
        let err = patch(&dir.path().join("nope.txt"), &pattern, "y").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_patch_non_utf8_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.dat");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let pattern = Pattern::tolerant("x").unwrap();
        let err = patch(&path, &pattern, "y").unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    #[cfg(unix)]
    fn test_patch_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "script.sh", "echo old\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let pattern = Pattern::tolerant("echo old").unwrap();
        patch(&path, &pattern, "echo new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_preview_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", "alpha beta\n");
        let pattern = Pattern::tolerant("beta").unwrap();

        let preview = preview(&path, &pattern, "gamma").unwrap();
        assert_eq!(preview.outcome, PatchOutcome::Replaced { span: 6..10 });
        assert_eq!(preview.new_text, "alpha gamma\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "alpha beta\n");
    }
}
