//! Path algebra
//!
//! Pure string functions used to resolve operator input against a working
//! directory. Both backends use `/` as the separator, so paths are handled as
//! plain strings instead of `std::path::Path`.

/// Path separator shared by both backends
pub const SEPARATOR: char = '/';

/// Whether the path is absolute
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Lexically normalize a path
///
/// Collapses repeated separators, drops `.` elements and resolves `..`
/// against the preceding element. `..` above the root is dropped; leading
/// `..` elements of a relative path are kept. An empty result becomes `.`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = is_absolute(path);
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(SEPARATOR) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Resolve `name` against `base`
///
/// An absolute `name` is returned unchanged. Otherwise the two are joined and
/// normalized; a trailing separator on `name` survives normalization so it can
/// still act as a directory hint.
pub fn join(base: &str, name: &str) -> String {
    if is_absolute(name) {
        return name.to_string();
    }

    let joined = if base.is_empty() {
        clean(name)
    } else if name.is_empty() {
        clean(base)
    } else {
        clean(&format!("{base}/{name}"))
    };

    if name.ends_with(SEPARATOR) && !joined.ends_with(SEPARATOR) {
        format!("{joined}/")
    } else {
        joined
    }
}

/// Last element of a path
///
/// Trailing separators are ignored. The root yields the empty string, which
/// callers use as a "no name" sentinel.
pub fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return String::new();
    }
    match trimmed.rfind(SEPARATOR) {
        Some(pos) => trimmed[pos + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Everything but the last element of a path, normalized
pub fn parent(path: &str) -> String {
    match path.rfind(SEPARATOR) {
        Some(0) => "/".to_string(),
        Some(pos) => clean(&path[..pos]),
        None => ".".to_string(),
    }
}

/// Express `target` relative to `base`
///
/// Both paths are normalized first. Returns `None` when one path is absolute
/// and the other is not, or when `base` climbs above what `target` can reach.
pub fn relative(base: &str, target: &str) -> Option<String> {
    let base = clean(base);
    let target = clean(target);

    if base == target {
        return Some(".".to_string());
    }
    if is_absolute(&base) != is_absolute(&target) {
        return None;
    }

    let split = |p: &str| -> Vec<String> {
        p.split(SEPARATOR)
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string)
            .collect()
    };
    let base_parts = split(&base);
    let target_parts = split(&target);

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if base_parts[common..].iter().any(|p| p == "..") {
        return None;
    }

    let mut out: Vec<&str> = vec![".."; base_parts.len() - common];
    out.extend(target_parts[common..].iter().map(String::as_str));

    if out.is_empty() {
        Some(".".to_string())
    } else {
        Some(out.join("/"))
    }
}

/// Split partially typed input into completion parts
///
/// Returns `(candidate, directory, display_prefix)`: the name prefix to
/// complete, the directory whose entries should be listed, and the directory
/// to prepend to each completion. The display prefix stays relative to `wd`
/// unless the input was absolute.
pub fn candidate(wd: &str, input: &str) -> (String, String, String) {
    if input.is_empty() {
        return (String::new(), wd.to_string(), String::new());
    }

    let (cand, dirname) = if input.ends_with(SEPARATOR) {
        (String::new(), join(wd, input))
    } else {
        (base(input), parent(&join(wd, input)))
    };

    let display = if is_absolute(input) {
        dirname.clone()
    } else {
        relative(wd, &dirname).unwrap_or_else(|| dirname.clone())
    };

    (cand, dirname, display)
}
