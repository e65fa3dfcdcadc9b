/// Tolerant reader for `appmanifest_<id>.acf` files.
///
/// Manifests are KeyValues text: whitespace-separated `"key" "value"` pairs
/// nested in `{ }` blocks. Only `name` and `installdir` are read, and the
/// first occurrence of each key anywhere in the file wins. A missing key is
/// a normal outcome, never an error; the only failure is not being able to
/// read the file at all.
use crate::error::ManifestError;
use crate::model::{ManifestRecord, RootId};
use std::fs;
use std::path::Path;

pub const MANIFEST_PREFIX: &str = "appmanifest_";
pub const MANIFEST_SUFFIX: &str = ".acf";

const NAME_KEY: &str = "name";
const INSTALL_DIR_KEY: &str = "installdir";

/// Returns `true` for file names of the form `appmanifest_<id>.acf`.
pub fn is_manifest_file_name(file_name: &str) -> bool {
    app_id_from_file_name(file_name).is_some()
}

/// Extract `<id>` from `appmanifest_<id>.acf`, verbatim.
pub fn app_id_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(MANIFEST_PREFIX)?
        .strip_suffix(MANIFEST_SUFFIX)
}

/// The fields libsweep cares about, before the file name and root are attached.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManifestFields {
    pub display_name: Option<String>,
    pub install_dir: Option<String>,
}

/// Parse `name` / `installdir` out of manifest text.
///
/// `display_name` falls back to `install_dir` when the file has no `name`.
pub fn parse_fields(contents: &str) -> ManifestFields {
    let install_dir = extract_field(contents, INSTALL_DIR_KEY);
    let display_name = extract_field(contents, NAME_KEY).or_else(|| install_dir.clone());
    ManifestFields {
        display_name,
        install_dir,
    }
}

/// Value of the first `"key" "value"` pair whose key equals `key` exactly.
///
/// Keys that open a `{ }` block are not pairs and never match.
pub fn extract_field(contents: &str, key: &str) -> Option<String> {
    let mut pending_key: Option<String> = None;

    for token in Tokens::new(contents) {
        match token {
            Token::Str(s) => match pending_key.take() {
                None => pending_key = Some(s),
                Some(k) => {
                    if k == key {
                        return Some(s);
                    }
                }
            },
            Token::Open | Token::Close => pending_key = None,
        }
    }

    None
}

/// Read a manifest file into a [`ManifestRecord`].
pub fn read_manifest(path: &Path, root: RootId) -> Result<ManifestRecord, ManifestError> {
    let contents = read_contents(path)?;
    let fields = parse_fields(&contents);
    let app_id = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(app_id_from_file_name)
        .unwrap_or_default()
        .to_string();

    Ok(ManifestRecord {
        app_id,
        display_name: fields.display_name,
        install_dir: fields.install_dir,
        root,
        file_path: path.to_path_buf(),
    })
}

/// Read only the `installdir` value of a manifest.
pub fn read_install_dir(path: &Path) -> Result<Option<String>, ManifestError> {
    let contents = read_contents(path)?;
    Ok(extract_field(&contents, INSTALL_DIR_KEY))
}

/// Manifests are UTF-8 in practice; stray invalid bytes are replaced
/// rather than failing the whole file.
fn read_contents(path: &Path) -> Result<String, ManifestError> {
    let bytes = fs::read(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ── Tokenizer ────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Str(String),
    Open,
    Close,
}

/// Splits KeyValues text into quoted strings and braces.
///
/// Unquoted text outside strings is ignored, as are `//` line comments.
struct Tokens<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
        }
    }

    fn read_quoted(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '"' => break,
                '\\' => match self.chars.next() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                _ => out.push(c),
            }
        }
        out
    }

    fn skip_line(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                break;
            }
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Some(Token::Str(self.read_quoted())),
                '{' => return Some(Token::Open),
                '}' => return Some(Token::Close),
                '/' if self.chars.peek() == Some(&'/') => self.skip_line(),
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
"AppState"
{
	"appid"		"500"
	"Universe"		"1"
	"name"		"Ghost Game"
	"StateFlags"		"4"
	"installdir"		"GhostGame"
	"UserConfig"
	{
		"language"		"english"
	}
}
"#;

    #[test]
    fn app_id_is_taken_verbatim() {
        assert_eq!(app_id_from_file_name("appmanifest_500.acf"), Some("500"));
        assert_eq!(app_id_from_file_name("appmanifest_0042.acf"), Some("0042"));
        assert_eq!(app_id_from_file_name("appmanifest_abc.acf"), Some("abc"));
        assert_eq!(app_id_from_file_name("libraryfolders.vdf"), None);
        assert_eq!(app_id_from_file_name("appmanifest_500.acf.bak"), None);
        assert!(!is_manifest_file_name("500.acf"));
    }

    #[test]
    fn extracts_name_and_installdir() {
        let fields = parse_fields(SAMPLE);
        assert_eq!(fields.display_name.as_deref(), Some("Ghost Game"));
        assert_eq!(fields.install_dir.as_deref(), Some("GhostGame"));
    }

    #[test]
    fn display_name_falls_back_to_installdir() {
        let fields = parse_fields(r#""AppState" { "installdir" "GhostGame" }"#);
        assert_eq!(fields.display_name.as_deref(), Some("GhostGame"));
        assert_eq!(fields.install_dir.as_deref(), Some("GhostGame"));
    }

    #[test]
    fn missing_fields_are_none() {
        let fields = parse_fields(r#""AppState" { "appid" "7" }"#);
        assert_eq!(fields, ManifestFields::default());
        assert_eq!(parse_fields(""), ManifestFields::default());
    }

    #[test]
    fn first_match_wins() {
        let text = r#""installdir" "First" "installdir" "Second""#;
        assert_eq!(extract_field(text, "installdir").as_deref(), Some("First"));
    }

    #[test]
    fn value_equal_to_key_is_not_a_key() {
        let text = r#""name" "installdir" "installdir" "Real""#;
        assert_eq!(extract_field(text, "installdir").as_deref(), Some("Real"));
        assert_eq!(extract_field(text, "name").as_deref(), Some("installdir"));
    }

    #[test]
    fn block_keys_never_match() {
        let text = r#""name" { "x" "y" } "name" "Flat""#;
        assert_eq!(extract_field(text, "name").as_deref(), Some("Flat"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let text = r#""InstallDir" "Upper""#;
        assert_eq!(extract_field(text, "installdir"), None);
    }

    #[test]
    fn escapes_and_comments() {
        let text = "// header comment \"name\" \"nope\"\n\"name\" \"Say \\\"Hi\\\"\"";
        assert_eq!(extract_field(text, "name").as_deref(), Some("Say \"Hi\""));
    }

    #[test]
    fn read_manifest_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("appmanifest_500.acf");
        fs::write(&path, SAMPLE).unwrap();

        let record = read_manifest(&path, RootId(3)).unwrap();
        assert_eq!(record.app_id, "500");
        assert_eq!(record.install_dir.as_deref(), Some("GhostGame"));
        assert_eq!(record.root, RootId(3));
        assert_eq!(record.file_path, path);
        assert_eq!(read_install_dir(&path).unwrap().as_deref(), Some("GhostGame"));
    }

    #[test]
    fn unreadable_manifest_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("appmanifest_1.acf");
        assert!(matches!(
            read_manifest(&missing, RootId(0)),
            Err(ManifestError::Read { .. })
        ));
    }
}
