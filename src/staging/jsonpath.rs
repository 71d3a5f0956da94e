//! The small JSONPath subset accepted in COPY JSONPaths files.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A path such as `$.song`, `$['firstName']`, `$["a"]["b"]` or `$.tags[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        let rest = expr
            .strip_prefix('$')
            .ok_or_else(|| format!("JSONPath must start with '$': {}", expr))?;
        let chars: Vec<char> = rest.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
                        end += 1;
                    }
                    if end == start {
                        return Err(format!("empty key in JSONPath: {}", expr));
                    }
                    segments.push(Segment::Key(chars[start..end].iter().collect()));
                    i = end;
                }
                '[' => {
                    let close = chars[i..]
                        .iter()
                        .position(|c| *c == ']')
                        .map(|offset| i + offset)
                        .ok_or_else(|| format!("unterminated '[' in JSONPath: {}", expr))?;
                    let inner: String = chars[i + 1..close].iter().collect();
                    let inner = inner.trim();
                    let quoted = inner.len() >= 2
                        && ((inner.starts_with('\'') && inner.ends_with('\''))
                            || (inner.starts_with('"') && inner.ends_with('"')));
                    if quoted {
                        segments.push(Segment::Key(inner[1..inner.len() - 1].to_string()));
                    } else {
                        let index = inner
                            .parse::<usize>()
                            .map_err(|_| format!("invalid index '{}' in JSONPath: {}", inner, expr))?;
                        segments.push(Segment::Index(index));
                    }
                    i = close + 1;
                }
                other => {
                    return Err(format!("unexpected '{}' in JSONPath: {}", other, expr));
                }
            }
        }

        if segments.is_empty() {
            return Err(format!("JSONPath selects the whole record: {}", expr));
        }
        Ok(JsonPath { segments })
    }

    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                Segment::Key(key) => current.get(key.as_str()),
                Segment::Index(index) => current.get(*index),
            })
    }
}

/// Parse the contents of a JSONPaths file: `{"jsonpaths": ["$['a']", ...]}`.
pub fn parse_jsonpaths_file(content: &str) -> Result<Vec<JsonPath>, String> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| format!("invalid JSONPaths file: {}", e))?;
    let paths = document
        .get("jsonpaths")
        .and_then(Value::as_array)
        .ok_or_else(|| "JSONPaths file has no \"jsonpaths\" array".to_string())?;
    paths
        .iter()
        .map(|path| {
            path.as_str()
                .ok_or_else(|| format!("JSONPath is not a string: {}", path))
                .and_then(JsonPath::parse)
        })
        .collect()
}
