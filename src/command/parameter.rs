/// One `name value` pair on a command line.
///
/// An empty name makes the entry positional, an empty value makes it a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandParameter {
    pub name: String,
    pub value: String,
}

impl CommandParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn positional(value: impl Into<String>) -> Self {
        Self::new(String::new(), value)
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.value.trim().is_empty()
    }

    /// Tokens in argv order: the name if set, then the value if set.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(2);
        if !self.name.trim().is_empty() {
            tokens.push(self.name.clone());
        }
        if !self.value.trim().is_empty() {
            tokens.push(self.value.clone());
        }
        tokens
    }
}

impl std::fmt::Display for CommandParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = format!("{} {}", self.name, self.value);
        f.write_str(rendered.trim())
    }
}
