use serde_json::{Map, Value as JsonValue};

/// Numeric segments above this are object keys, so `a[99999999]` cannot force a huge array.
const MAX_ARRAY_INDEX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn classify(raw: &str) -> Segment {
        let digits = raw.bytes().all(|b| b.is_ascii_digit());
        let canonical = raw == "0" || (digits && !raw.starts_with('0'));
        match raw.parse::<usize>() {
            Ok(index) if canonical && index <= MAX_ARRAY_INDEX => Segment::Index(index),
            _ => Segment::Key(raw.to_string()),
        }
    }

    fn to_key(&self) -> String {
        match self {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }

    fn empty_container(&self) -> JsonValue {
        match self {
            Segment::Key(_) => JsonValue::Object(Map::new()),
            Segment::Index(_) => JsonValue::Array(Vec::new()),
        }
    }
}

/// Splits `a.b[0][c]` into `a`, `b`, `0`, `c`. Empty segments are dropped.
fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    let flush = |current: &mut String, segments: &mut Vec<Segment>| {
        if !current.is_empty() {
            segments.push(Segment::classify(current));
            current.clear();
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut current, &mut segments),
            '[' => {
                flush(&mut current, &mut segments);
                let rest = chars.as_str();
                match rest.find(']') {
                    Some(end) => {
                        current.push_str(&rest[..end]);
                        flush(&mut current, &mut segments);
                        chars = rest[end + 1..].chars();
                    }
                    // unterminated bracket: keep the remainder as a literal key
                    None => {
                        current.push('[');
                        current.push_str(rest);
                        break;
                    }
                }
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut segments);

    segments
}

fn child_slot<'a>(slot: &'a mut JsonValue, segment: &Segment) -> &'a mut JsonValue {
    match (segment, slot) {
        (Segment::Index(index), JsonValue::Array(items)) => {
            if items.len() <= *index {
                items.resize(*index + 1, JsonValue::Null);
            }
            &mut items[*index]
        }
        (segment, JsonValue::Object(map)) => map.entry(segment.to_key()).or_insert(JsonValue::Null),
        (segment, slot) => {
            *slot = segment.empty_container();
            child_slot(slot, segment)
        }
    }
}

/// Assigns `value` at a dotted/bracketed `path` inside `root`, creating
/// intermediate objects and arrays and overwriting whatever is in the way.
///
/// Returns `false` when the path has no usable segment.
pub(crate) fn assign(root: &mut Map<String, JsonValue>, path: &str, value: JsonValue) -> bool {
    let segments = parse_path(path);
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };

    let mut slot = root.entry(first.to_key()).or_insert(JsonValue::Null);
    for segment in rest {
        slot = child_slot(slot, segment);
    }
    *slot = value;

    true
}
