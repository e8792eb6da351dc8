//! Error helper functions for creating actionable error messages

use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Create an enhanced error message for file permission issues
pub fn permission_error(path: &Path, operation: &str) -> String {
    let parent_dir = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    format!(
        "Permission denied when {} '{}'\n\n\
         Possible fixes:\n\
         1. Check file permissions: ls -l '{}'\n\
         2. The file is replaced through a temp file, so '{}' must be writable too\n\
         3. Make sure no other program holds the file open or locked",
        operation,
        path.display(),
        path.display(),
        parent_dir
    )
}

/// Create an enhanced error message for file not found issues
pub fn not_found_error(path: &Path, context: &str) -> String {
    format!(
        "File not found: '{}'\n\n\
         Context: {}\n\n\
         Possible fixes:\n\
         1. Run fragpatch from the repository root, or pass --root <DIR>\n\
         2. Check the recipe target with: fragpatch list\n\
         3. Check if the file was moved or renamed",
        path.display(),
        context
    )
}

/// Create an enhanced error message for files that are not UTF-8 text
pub fn not_text_error(path: &Path) -> String {
    format!(
        "File is not valid UTF-8 text: '{}'\n\n\
         Possible fixes:\n\
         1. Check the recipe points at a source file, not a binary\n\
         2. Re-save the file as UTF-8 (e.g. iconv -t UTF-8)",
        path.display()
    )
}

/// Create an enhanced error message for directory creation failures
pub fn dir_create_error(path: &Path, underlying_err: &io::Error) -> String {
    let base = format!("Failed to create directory: '{}'", path.display());

    if is_permission_denied(underlying_err) {
        format!(
            "{}\n\n\
             Cause: Permission denied\n\n\
             Possible fixes:\n\
             1. Check write permissions on '{}'\n\
             2. Pass --config <FILE> to keep the configuration elsewhere",
            base,
            path.parent()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ".".to_string())
        )
    } else {
        format!("{}\n\nUnderlying error: {}", base, underlying_err)
    }
}
