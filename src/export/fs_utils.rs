use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use std::io::{self, Write};
use std::path::Path;

/// Ask a yes/no question on the terminal. Anything but y/yes is a no.
pub(crate) fn confirm(question: &str) -> AppResult<bool> {
    print!("{question} [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let ans = answer.trim().to_ascii_lowercase();
    Ok(ans == "y" || ans == "yes")
}

/// Whether `path` may be (over)written.
///
/// - missing file → true
/// - existing file with `force` → true
/// - existing file otherwise → asks the user
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<bool> {
    if !path.exists() || force {
        return Ok(true);
    }

    warning(format!("The file '{}' already exists.", path.display()));
    if confirm("Overwrite?")? {
        info("Existing file will be overwritten.");
        Ok(true)
    } else {
        info("Cancelled: existing file not overwritten.");
        Ok(false)
    }
}

pub(crate) fn require_absolute(path: &Path) -> AppResult<()> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(AppError::Export(format!(
            "output path must be absolute: {}",
            path.display()
        )))
    }
}
