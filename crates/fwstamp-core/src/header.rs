//! Generated C header, for toolchains that prefer an include over `-D`.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::flag::MacroDefinition;
use crate::version::DescribeParts;

/// Render an include-guarded header defining the version macro.
///
/// When the describe output parsed, `<NAME>_TAG`, `<NAME>_DISTANCE`,
/// `<NAME>_HASH` and `<NAME>_DIRTY` are defined as well.
pub fn render_header(definition: &MacroDefinition, parts: Option<&DescribeParts>) -> String {
    let name = definition.name();
    let guard = format!("FWSTAMP_{name}_H");

    let mut out = String::new();
    let _ = writeln!(out, "/* Generated by fwstamp. Do not edit. */");
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(out, "#define {guard}");
    let _ = writeln!(out);
    let _ = writeln!(out, "#define {name} {}", definition.c_string_literal());

    if let Some(parts) = parts {
        let tag = MacroDefinition::new(name, parts.tag.as_str());
        let _ = writeln!(out, "#define {name}_TAG {}", tag.c_string_literal());
        let _ = writeln!(out, "#define {name}_DISTANCE {}", parts.distance);
        let _ = writeln!(out, "#define {name}_HASH \"{}\"", parts.hash);
        let _ = writeln!(out, "#define {name}_DIRTY {}", u8::from(parts.dirty));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "#endif /* {guard} */");
    out
}

/// Write `contents` to `path` unless the file already holds exactly that.
///
/// Returns whether the file was written. Leaving an unchanged header alone
/// keeps its mtime, so incremental firmware builds skip recompilation.
pub async fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    match tokio::fs::read_to_string(path).await {
        Ok(existing) if existing == contents => {
            debug!(path = %path.display(), "Header unchanged");
            return Ok(false);
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, contents).await?;
    info!(path = %path.display(), "Wrote version header");
    Ok(true)
}
