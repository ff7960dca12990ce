use crate::style::{Color, Length};
use crate::tree::NodeId;
use smol_str::SmolStr;

/// A property value. Scalars stay textual until the slot that reads them
/// parses them; `Node` is an already-resolved reference; `Group` nests a
/// whole property bag (a CSS rule body, for instance).
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    String(String),
    Number(f64),
    Color(Color),
    Length(Length),
    Node(NodeId),
    Group(Props),
}

impl PropValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Color(_) => "color",
            Self::Length(_) => "length",
            Self::Node(_) => "node reference",
            Self::Group(_) => "property group",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Props> {
        match self {
            Self::Group(v) => Some(v),
            _ => None,
        }
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::String(v) => format!("string `{v}`"),
            Self::Number(v) => format!("number {v}"),
            other => other.kind_name().to_string(),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<Color> for PropValue {
    fn from(value: Color) -> Self {
        PropValue::Color(value)
    }
}

impl From<Length> for PropValue {
    fn from(value: Length) -> Self {
        PropValue::Length(value)
    }
}

impl From<NodeId> for PropValue {
    fn from(value: NodeId) -> Self {
        PropValue::Node(value)
    }
}

impl From<Props> for PropValue {
    fn from(value: Props) -> Self {
        PropValue::Group(value)
    }
}

/// Insertion-ordered property bag. Setting an existing key replaces its
/// value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(SmolStr, PropValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<SmolStr>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<SmolStr>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        let (_, value) = self.entries.remove(index);
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<SmolStr>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::{PropValue, Props};

    #[test]
    fn set_replaces_in_place_and_keeps_order() {
        let mut props = Props::new().with("fill", "red").with("stroke", "blue");
        props.set("fill", "green");
        let keys: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["fill", "stroke"]);
        assert_eq!(props.get("fill").and_then(PropValue::as_str), Some("green"));
    }

    #[test]
    fn remove_returns_value() {
        let mut props: Props = [("a", 1.0f64), ("b", 2.0)].into_iter().collect();
        assert_eq!(props.remove("a"), Some(PropValue::Number(1.0)));
        assert_eq!(props.remove("a"), None);
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn groups_nest() {
        let css = Props::new().with(".g1", Props::new().with("fill", "blue"));
        let group = css.get(".g1").and_then(PropValue::as_group).expect("group");
        assert_eq!(group.get("fill").and_then(PropValue::as_str), Some("blue"));
    }
}
