//! Decoding of JSON, YAML and TOML text into configuration values
//!
//! JSON input may carry `//` line comments and `/* */` block comments; they
//! are stripped before parsing. TOML datetimes have no counterpart in
//! [`Value`] and are kept as their string form.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// A supported configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Determine the format from a file extension, ignoring case
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            _ => Err(Error::file_type(path.display().to_string())),
        }
    }
}

/// Decode `text` in the given format
pub fn decode(format: Format, text: &str) -> Result<Value> {
    match format {
        Format::Json => {
            let stripped = strip_json_comments(text)?;
            serde_json::from_str(&stripped).map_err(|e| Error::parse(e.to_string()))
        }
        Format::Yaml => {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            let document: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| Error::parse(e.to_string()))?;
            from_yaml(document)
        }
        Format::Toml => {
            let table: toml::Value =
                toml::from_str(text).map_err(|e| Error::parse(e.to_string()))?;
            Ok(from_toml(table))
        }
    }
}

/// Read and decode a file, choosing the format by its extension
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(path.display().to_string(), &e))?;
    let format = Format::from_path(path)?;

    log::debug!("Decoding {} as {:?}", path.display(), format);
    decode(format, &text).map_err(|e| {
        let cause = e.cause.clone().unwrap_or_default();
        Error {
            cause: Some(format!("{}: {}", path.display(), cause)),
            ..e
        }
    })
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (k, from_toml(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut out = IndexMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                out.insert(yaml_key(key)?, from_yaml(value)?);
            }
            Value::Mapping(out)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

/// Scalar mapping keys are kept in their string form
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => {
            let shown = serde_yaml::to_string(&other).unwrap_or_default();
            Err(Error::parse(format!(
                "unsupported mapping key: {}",
                shown.trim_end()
            )))
        }
    }
}

/// Remove `//` and `/* */` comments that appear outside string literals.
///
/// Line breaks inside comments are kept so parser positions stay accurate.
pub fn strip_json_comments(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut closed = false;
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    if c == '\n' {
                        out.push('\n');
                    }
                    previous = c;
                }
                if !closed {
                    return Err(Error::parse("unterminated block comment in JSON input"));
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("a.json").unwrap(), Format::Json);
        assert_eq!(Format::from_path("a.YAML").unwrap(), Format::Yaml);
        assert_eq!(Format::from_path("dir/a.yml").unwrap(), Format::Yaml);
        assert_eq!(Format::from_path("a.Toml").unwrap(), Format::Toml);

        let err = Format::from_path("app.conf").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::FileType {
                extension: ".conf".into()
            }
        );
        assert!(Format::from_path("noextension").is_err());
    }

    #[test]
    fn test_strip_line_and_block_comments() {
        let text = "{\n  // a comment\n  \"a\": 1, /* inline */ \"b\": 2\n}";
        let stripped = strip_json_comments(text).unwrap();

        assert!(!stripped.contains("comment"));
        assert!(!stripped.contains("inline"));
        assert_eq!(stripped.lines().count(), text.lines().count());
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let text = r#"{"url": "http://example.com/*x*/", "q": "say \"//hi\""}"#;
        assert_eq!(strip_json_comments(text).unwrap(), text);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = strip_json_comments("{\"a\": 1 /* open").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_decode_json_with_comments() {
        let value = decode(
            Format::Json,
            r#"{
                // listen address
                "host": "localhost",
                /* port
                   number */
                "port": 8080
            }"#,
        )
        .unwrap();

        assert_eq!(value.get_path("host").unwrap().as_str(), Some("localhost"));
        assert_eq!(value.get_path("port").unwrap().as_i64(), Some(8080));
    }

    #[test]
    fn test_decode_yaml() {
        let value = decode(Format::Yaml, "a:\n  b: [1, 2.5, x]\n").unwrap();

        assert_eq!(value.get_path("a.b.0").unwrap(), &Value::Integer(1));
        assert_eq!(value.get_path("a.b.1").unwrap(), &Value::Float(2.5));
        assert_eq!(value.get_path("a.b.2").unwrap().as_str(), Some("x"));
        assert_eq!(decode(Format::Yaml, "").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_yaml_scalar_keys() {
        let value = decode(Format::Yaml, "ports:\n  80: http\nflags:\n  true: on\n").unwrap();

        assert_eq!(value.get_path("ports.80").unwrap().as_str(), Some("http"));
        assert_eq!(value.get_path("flags.true").unwrap().as_str(), Some("on"));

        let err = decode(Format::Yaml, "? [a, b]\n: 1\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.cause.unwrap().contains("unsupported mapping key"));
    }

    #[test]
    fn test_decode_toml() {
        let value = decode(
            Format::Toml,
            "title = \"t\"\nwhen = 1979-05-27T07:32:00Z\n\n[server]\nport = 80\nratio = 0.5\nenabled = true\n",
        )
        .unwrap();

        assert_eq!(value.get_path("title").unwrap().as_str(), Some("t"));
        assert_eq!(value.get_path("server.port").unwrap(), &Value::Integer(80));
        assert_eq!(value.get_path("server.ratio").unwrap(), &Value::Float(0.5));
        assert_eq!(value.get_path("server.enabled").unwrap(), &Value::Bool(true));
        assert_eq!(
            value.get_path("when").unwrap().as_str(),
            Some("1979-05-27T07:32:00Z")
        );
    }

    #[test]
    fn test_decode_errors_are_parse_errors() {
        assert_eq!(decode(Format::Json, "{").unwrap_err().kind, ErrorKind::Parse);
        assert_eq!(
            decode(Format::Toml, "a = = 1").unwrap_err().kind,
            ErrorKind::Parse
        );
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"a\": [1, 2]}} // trailing").unwrap();

        let value = load_file(file.path()).unwrap();
        assert_eq!(value.get_path("a.1").unwrap(), &Value::Integer(2));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        write!(file, "a=1").unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FileType { .. }));
    }
}
