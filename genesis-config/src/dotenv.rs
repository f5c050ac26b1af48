//! Minimal `.env` parser. No overwrite of existing env here; applied by the
//! caller.

use std::collections::HashMap;
use std::path::Path;

fn dotenv_path(override_dir: Option<&Path>) -> Option<std::path::PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    if path.exists() && path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Lines as `KEY=VALUE`; skips empty lines and `#`-prefixed comments; strips
/// matching surrounding quotes (double-quoted values unescape `\"`).
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim().to_string();
        let value = v.trim().to_string();
        let value = if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
            value[1..value.len() - 1].replace("\\\"", "\"")
        } else {
            value
        };
        let value = value
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .map(|s| s.to_string())
            .unwrap_or(value);
        if !key.is_empty() {
            out.insert(key, value);
        }
    }
    out
}

/// Loads `.env` from `override_dir` or the current directory. Missing file
/// returns an empty map.
pub(crate) fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    let path = match dotenv_path(override_dir) {
        Some(p) => p,
        None => return Ok(HashMap::new()),
    };
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_dotenv(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_assignments() {
        let m = parse_dotenv("FOO=bar\nBAZ=quux\n");
        assert_eq!(m.get("FOO"), Some(&"bar".to_string()));
        assert_eq!(m.get("BAZ"), Some(&"quux".to_string()));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let m = parse_dotenv("\n# comment\nKEY=val\n  \n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("KEY"), Some(&"val".to_string()));
    }

    #[test]
    fn strips_matching_quotes() {
        let m = parse_dotenv("A=\"quoted value\"\nB='single quoted'\n");
        assert_eq!(m.get("A"), Some(&"quoted value".to_string()));
        assert_eq!(m.get("B"), Some(&"single quoted".to_string()));
    }

    #[test]
    fn load_env_map_missing_file_returns_empty() {
        let dir = std::env::temp_dir().join(format!("genesis-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let m = load_env_map(Some(&dir)).unwrap();
        assert!(m.is_empty());
        let _ = std::fs::remove_dir(&dir);
    }
}
