//! The `results.bin` codec: encodes an ordered output-file list as
//! workspace-relative tokens and decodes it back.

use std::path::{Path, PathBuf};

use transform_model::{Result, TransformError};

/// Encodes `outputs` as the text that should be written to `results.bin`.
///
/// Each file is classified against two roots, `output_dir` (always
/// `workspace/transformed/`) and `input_artifact`:
/// - equals `output_dir` exactly → `"o/"`.
/// - equals `input_artifact` exactly → `"i/"`.
/// - descendant of `output_dir` → `"o/" + relative path, forward-slash separated`.
/// - descendant of `input_artifact` → `"i/" + relative path, forward-slash separated`.
/// - anything else → `TransformError::InvalidResultPath`.
pub fn encode(outputs: &[PathBuf], output_dir: &Path, input_artifact: &Path) -> Result<String> {
    let mut text = String::new();
    for output in outputs {
        let token = classify(output, output_dir, input_artifact)
            .ok_or_else(|| TransformError::InvalidResultPath(output.clone()))?;
        text.push_str(&token);
        text.push('\n');
    }
    Ok(text)
}

fn classify(output: &Path, output_dir: &Path, input_artifact: &Path) -> Option<String> {
    if output == output_dir {
        return Some("o/".to_string());
    }
    if output == input_artifact {
        return Some("i/".to_string());
    }
    if let Some(rel) = relative_to(output, output_dir) {
        return Some(format!("o/{rel}"));
    }
    if let Some(rel) = relative_to(output, input_artifact) {
        return Some(format!("i/{rel}"));
    }
    None
}

fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            std::path::Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Decodes previously-written `results.bin` text back into absolute paths.
///
/// `"o/<rest>"` resolves under `workspace/transformed/`, `"i/<rest>"`
/// resolves under `input_artifact`. A trailing newline is tolerated but not
/// required; blank lines are skipped.
pub fn decode(text: &str, output_dir: &Path, input_artifact: &Path) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let path = if line == "o/" {
            output_dir.to_path_buf()
        } else if line == "i/" {
            input_artifact.to_path_buf()
        } else if let Some(rest) = line.strip_prefix("o/") {
            join_wire_path(output_dir, rest)
        } else if let Some(rest) = line.strip_prefix("i/") {
            join_wire_path(input_artifact, rest)
        } else {
            return Err(TransformError::UnparseableResultLine(line.to_string()));
        };
        outputs.push(path);
    }
    Ok(outputs)
}

fn join_wire_path(root: &Path, rest: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in rest.split('/') {
        path.push(part);
    }
    path
}
