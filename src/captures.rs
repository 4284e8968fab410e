//! Named output fields produced by a scan.

/// Insertion-ordered mapping from field name to captured bytes.
///
/// Values are the exact bytes the scan passed over. A field written twice
/// keeps its original position and takes the newer value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    fields: Vec<(String, Vec<u8>)>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of `field`, if a rule has written it.
    pub fn get_bytes(&self, field: &str) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_slice())
    }

    /// Value of `field` as text.
    ///
    /// Returns `None` if the field was never written or if its bytes are not
    /// valid UTF-8; use [`get_bytes`](Self::get_bytes) for those.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.get_bytes(field)
            .and_then(|value| std::str::from_utf8(value).ok())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get_bytes(field).is_some()
    }

    /// Store `value` under `field`, replacing any earlier value.
    pub fn insert(&mut self, field: &str, value: impl Into<Vec<u8>>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Iterate `(field, value)` pairs in the order fields were first written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl IntoIterator for Captures {
    type Item = (String, Vec<u8>);
    type IntoIter = std::vec::IntoIter<(String, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
