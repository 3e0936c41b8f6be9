use regex::Regex;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use std::sync::OnceLock;

fn sanitize(part: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

    let joined = part.split_whitespace().collect::<Vec<_>>().join("_");
    unsafe_chars.replace_all(&joined, "").into_owned()
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed, and leading dots/underscores are stripped.
/// The extension is cleaned on its own and kept; when nothing of the stem
/// survives, `fallback_stem` takes its place. An empty result means the name
/// carried nothing usable at all.
pub fn secure_filename(name: &str, fallback_stem: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default();
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.trim_start_matches('.').is_empty() => (stem, sanitize(ext)),
        _ => (base, String::new()),
    };
    let stem = sanitize(stem);
    let stem = stem.trim_start_matches(['.', '_']);

    match (stem.is_empty(), ext.is_empty()) {
        (false, true) => stem.to_string(),
        (false, false) => format!("{stem}.{ext}"),
        (true, false) => format!("{fallback_stem}.{ext}"),
        (true, true) => String::new(),
    }
}

/// Stem used for uploads whose name has no safe characters: `upload_` and the
/// first 8 hex digits of the content's sha256.
pub fn fallback_stem(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex = format!("{:x}", digest);
    format!("upload_{}", &hex[..8])
}

pub async fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(filename), bytes).await
}

#[cfg(test)]
mod tests {
    use super::{fallback_stem, secure_filename};

    #[test]
    fn strips_directories_and_unsafe_characters() {
        assert_eq!(secure_filename("../../etc/passwd", "x"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\my script.py", "x"), "my_script.py");
        assert_eq!(secure_filename("sample (1).py", "x"), "sample_1.py");
        assert_eq!(secure_filename("...", "x"), "");
        assert_eq!(secure_filename(".hidden.py", "x"), "hidden.py");
        assert_eq!(secure_filename(".bashrc", "x"), "bashrc");
    }

    #[test]
    fn keeps_extension_when_stem_is_lost() {
        assert_eq!(secure_filename("тест.py", "upload_1234abcd"), "upload_1234abcd.py");
        assert_eq!(secure_filename("../日本.rs", "upload_1234abcd"), "upload_1234abcd.rs");
        assert_eq!(secure_filename("тест", "upload_1234abcd"), "");
    }

    #[test]
    fn fallback_stem_follows_content() {
        let stem = fallback_stem(b"print('hi')\n");
        assert!(stem.starts_with("upload_"));
        assert_eq!(stem.len(), "upload_".len() + 8);
        assert_eq!(stem, fallback_stem(b"print('hi')\n"));
        assert_ne!(stem, fallback_stem(b"print('bye')\n"));
    }
}
