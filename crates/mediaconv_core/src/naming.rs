use std::collections::HashSet;

use percent_encoding::percent_decode_str;

use crate::{ResultLocation, TargetFormat};

const MAX_STEM_CHARS: usize = 120;

/// Output name for a converted file: the input name with its final extension
/// replaced by `target`. Directory components are dropped.
pub fn output_file_name(display_name: &str, target: &TargetFormat) -> String {
    let base = display_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(display_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => base,
    };
    sanitize_file_name(&format!("{stem}.{target}"))
}

/// Name of a server-named output: the last path segment of its location,
/// falling back to `fallback` when the location has none.
pub fn name_from_location(location: &ResultLocation, fallback: &str) -> String {
    let from_url = url::Url::parse(location.as_str()).ok().and_then(|url| {
        url.path_segments()
            .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
    });
    sanitize_file_name(from_url.as_deref().unwrap_or(fallback))
}

/// Makes a name safe to use as a file or archive entry name on any platform.
pub fn sanitize_file_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&[' ', '.'][..]);

    // Collapse runs of underscores left by replaced characters.
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let (stem, ext) = split_extension(&compacted);
    let mut stem: String = stem.chars().take(MAX_STEM_CHARS).collect();
    if stem.is_empty() || stem.chars().all(|c| c == '_') {
        stem = "output".to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Hands out archive entry names, disambiguating repeats as `stem (2).ext`.
///
/// Names are compared case-insensitively so archives extract cleanly on
/// case-insensitive filesystems.
#[derive(Debug, Default)]
pub struct EntryNamer {
    used: HashSet<String>,
}

impl EntryNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) -> String {
        if self.used.insert(name.to_lowercase()) {
            return name.to_string();
        }
        let (stem, ext) = split_extension(name);
        (2..)
            .map(|n| match ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            })
            .find(|candidate| self.used.insert(candidate.to_lowercase()))
            .unwrap_or_else(|| name.to_string())
    }
}
