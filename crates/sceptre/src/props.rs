//! Named values handed to a page when it is rendered.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An unordered bag of named values passed verbatim to a page.
///
/// Props are serialized as a plain JSON object, and are typically built through the [`props!`](crate::props) macro.
///
/// ## Example
/// ```rs
/// use sceptre::props;
///
/// let props = props! { "name" => "world", "count" => 3 };
/// assert_eq!(props.get_str("name"), Some("world"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies every value of `other` into `self`. Values of `other` win on conflicting keys.
    pub fn merge(&mut self, other: &Props) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Keeps only the props whose key is listed in `keys`.
    pub fn retain_keys<S: AsRef<str>>(&mut self, keys: &[S]) {
        self.0
            .retain(|key, _| keys.iter().any(|wanted| wanted.as_ref() == key));
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Props
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Builds [`Props`] from `key => value` pairs. Values can be anything convertible into a [`serde_json::Value`].
///
/// ## Example
/// ```rs
/// use sceptre::props;
///
/// let props = props! { "name" => "world" };
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::props::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::props::Props::new();
        $(props.insert($key, $value);)+
        props
    }};
}
