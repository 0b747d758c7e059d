//! Ordered list of live asset identifiers.

/// Asset identifiers in insertion order
///
/// Order is significant: the matcher walks it front to back and the first
/// satisfying asset wins. Removal is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    ids: Vec<String>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|entry| entry == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|entry| entry == id)
    }

    /// Append `id` unless already listed; returns whether it was appended
    pub fn push_unique(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Remove the first occurrence of `id`, returning its position
    pub fn remove_first(&mut self, id: &str) -> Option<usize> {
        let position = self.position(id)?;
        self.ids.remove(position);
        Some(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl From<Vec<String>> for AssetIndex {
    fn from(ids: Vec<String>) -> Self {
        Self { ids }
    }
}
