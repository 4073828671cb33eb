//! Append-only text buffer that every generator writes shader source through.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceBuilder {
    text: String,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Formatted append; pair with `format_args!`.
    ///
    /// Format strings are internal to the crate, so a formatting failure is not a reachable
    /// state: writing into a `String` only fails if a `Display` impl itself errors.
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = fmt::Write::write_fmt(&mut self.text, args);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Write for SourceBuilder {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.push_str(s);
        Ok(())
    }
}

impl fmt::Display for SourceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<SourceBuilder> for String {
    fn from(builder: SourceBuilder) -> Self {
        builder.text
    }
}
