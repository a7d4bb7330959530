//! Purpose: Parse `--path` lookup expressions and resolve them against a node.
//! Exports: `LookupPath`, `Segment`.
//! Role: CLI-only helper; the library takes one key or index per lookup step.
//! Invariants: The empty path resolves to the starting node itself.
//! Invariants: Numeric segments index arrays and fall back to keys on objects.
//! Notes: `\.` is a literal dot and any escaped segment is always a key.

use jsonview::api::{Node, NodeKind, Tree};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn from_raw(raw: String, escaped: bool) -> Self {
        match raw.parse::<usize>() {
            Ok(index) if !escaped && index.to_string() == raw => Segment::Index(index),
            _ => Segment::Key(raw),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct LookupPath {
    segments: Vec<Segment>,
}

impl LookupPath {
    pub(crate) fn parse(input: &str) -> Self {
        if input.is_empty() {
            return Self::default();
        }
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut escaped = false;
        let mut chars = input.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    escaped = true;
                    current.push(chars.next().unwrap_or('\\'));
                }
                '.' => {
                    segments.push(Segment::from_raw(std::mem::take(&mut current), escaped));
                    escaped = false;
                }
                other => current.push(other),
            }
        }
        segments.push(Segment::from_raw(current, escaped));
        Self { segments }
    }

    #[cfg(test)]
    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn resolve<'a, T: Tree + ?Sized>(&self, start: Node<'a, T>) -> Node<'a, T> {
        self.segments
            .iter()
            .fold(start, |node, segment| match segment {
                Segment::Key(key) => node.get(key),
                Segment::Index(index) => match node.kind() {
                    Some(NodeKind::Object) => node.get(index.to_string()),
                    _ => node.get(*index),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupPath, Segment};
    use jsonview::api::parse;

    #[test]
    fn splits_on_dots_and_types_segments() {
        let path = LookupPath::parse("list.0.id");
        assert_eq!(
            path.segments(),
            [
                Segment::Key("list".to_string()),
                Segment::Index(0),
                Segment::Key("id".to_string()),
            ]
        );
        assert!(LookupPath::parse("").segments().is_empty());
    }

    #[test]
    fn escapes_keep_dots_and_force_keys() {
        let path = LookupPath::parse(r"a\.b.\7.007");
        assert_eq!(
            path.segments(),
            [
                Segment::Key("a.b".to_string()),
                Segment::Key("7".to_string()),
                Segment::Key("007".to_string()),
            ]
        );
    }

    #[test]
    fn resolves_through_arrays_and_objects() {
        let doc = parse(r#"{"list":[{"id":"1234"},{"id":"abcd"}],"0":"zero","a.b":true}"#);
        let found = LookupPath::parse("list.1.id").resolve(doc.root());
        assert_eq!(found.extract_opt::<&str>(), Some("abcd"));
        let numeric_key = LookupPath::parse("0").resolve(doc.root());
        assert_eq!(numeric_key.extract_opt::<&str>(), Some("zero"));
        assert!(LookupPath::parse(r"a\.b").resolve(doc.root()).truthy());
        assert!(LookupPath::parse("list.9.id").resolve(doc.root()).is_absent());
        assert_eq!(LookupPath::parse("").resolve(doc.root()), doc.root());
    }
}
