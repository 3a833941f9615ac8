use anyhow::{anyhow, Result};
use std::fs::File;
use std::path::Path;

/// Opens `path`, naming the `kind` of file in the error message.
pub fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))
}

/// Reads `path` into a string, naming the `kind` of file in the error message.
pub fn read_text(path: &Path, kind: &str) -> Result<String> {
    use std::io::Read;
    let mut contents = String::new();
    open(path, kind)?
        .read_to_string(&mut contents)
        .map_err(|e| anyhow!("Reading {} file `{}`: {}", kind, path.display(), e))?;
    Ok(contents)
}
