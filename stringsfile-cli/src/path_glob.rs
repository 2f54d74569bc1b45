use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Directory part of `pattern` before its first glob meta-character.
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let idx = pattern
        .find(|c| matches!(c, '*' | '?' | '[' | '{'))
        .unwrap_or(pattern.len());
    let prefix = Path::new(&pattern[..idx]);
    if prefix.is_dir() {
        prefix.to_path_buf()
    } else {
        match prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn build_glob_set(patterns: &[&String]) -> Result<GlobSet, String> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let pat = pat.as_str();
        let pat = pat.strip_prefix("./").unwrap_or(pat);
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pat, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))
}

/// Expand the source arguments of `scan` into files.
///
/// Plain paths are kept as given. Patterns such as `src/**/*.c` are matched
/// with a .gitignore-aware walk; roots are walked in parallel and each
/// root's matches are sorted so the scan order is stable. A pattern that
/// matches nothing is an error.
pub fn expand_source_globs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    let patterns: Vec<&String> = inputs.iter().filter(|s| has_glob_meta(s)).collect();

    let mut matched: Vec<PathBuf> = Vec::new();
    if !patterns.is_empty() {
        let set = build_glob_set(&patterns)?;

        let mut roots: Vec<PathBuf> = Vec::new();
        for pat in &patterns {
            let root = static_prefix_dir(pat);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        matched = roots
            .par_iter()
            .map(|root| {
                let walker = WalkBuilder::new(root)
                    .git_ignore(true)
                    .git_global(true)
                    .git_exclude(true)
                    .hidden(false)
                    .ignore(true)
                    .parents(true)
                    .build();

                let mut out: Vec<PathBuf> = walker
                    .filter_map(Result::ok)
                    .filter(|dent| dent.file_type().is_some_and(|t| t.is_file()))
                    .map(|dent| dent.into_path())
                    .filter(|path| {
                        let relative = path.strip_prefix(".").unwrap_or(path);
                        set.is_match(relative)
                    })
                    .collect();
                out.sort();
                out
            })
            .flatten()
            .collect();

        if matched.is_empty() {
            let names: Vec<&str> = patterns.iter().map(|p| p.as_str()).collect();
            return Err(format!("No source files match: {}", names.join(", ")));
        }
    }

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut results: Vec<PathBuf> = Vec::with_capacity(inputs.len() + matched.len());
    let mut matched = matched.into_iter();
    for input in inputs {
        if has_glob_meta(input) {
            // All glob matches are placed at the first pattern's position.
            for path in matched.by_ref() {
                if seen.insert(path.clone()) {
                    results.push(path);
                }
            }
        } else {
            let path = PathBuf::from(input);
            if seen.insert(path.clone()) {
                results.push(path);
            }
        }
    }
    Ok(results)
}
