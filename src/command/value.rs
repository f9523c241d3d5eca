/// A runtime value bound to a tool input.
///
/// The variant is chosen at construction and never changes; `Multiple`
/// keeps insertion order because it defines argument order on the command
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandValue {
    Single(String),
    Multiple(Vec<String>),
}

impl CommandValue {
    pub fn single(value: impl Into<String>) -> Self {
        Self::Single(value.into())
    }

    pub fn multiple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multiple(values.into_iter().map(Into::into).collect())
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// Applies `f` to every contained token, keeping the variant.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        match self {
            Self::Single(value) => Self::Single(f(value)),
            Self::Multiple(values) => Self::Multiple(values.iter().map(|v| f(v)).collect()),
        }
    }
}

impl From<String> for CommandValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for CommandValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for CommandValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_values_keep_insertion_order() {
        let value = CommandValue::multiple(["b.tif", "a.tif", "c.tif"]);
        assert_eq!(value.values(), vec!["b.tif", "a.tif", "c.tif"]);
        assert_eq!(value.len(), 3);
        assert!(value.is_multiple());
    }

    #[test]
    fn map_values_preserves_variant() {
        let single = CommandValue::single("a\\b").map_values(|v| v.replace('\\', "/"));
        assert_eq!(single, CommandValue::single("a/b"));

        let empty = CommandValue::multiple(Vec::<String>::new()).map_values(str::to_string);
        assert!(empty.is_multiple());
        assert!(empty.is_empty());
    }
}
