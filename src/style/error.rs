use std::fmt;
use std::path::PathBuf;

/// A stylesheet failed to compile. Fatal for the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCompileError {
    pub file: PathBuf,
    /// 1-based line, when the compiler reported one.
    pub line: Option<u32>,
    pub message: String,
}

impl StyleCompileError {
    pub fn new(file: impl Into<PathBuf>, line: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for StyleCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for StyleCompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StyleCompileError::new("src/scss/main.scss", Some(3), "expected \";\".");
        assert_eq!(err.to_string(), "src/scss/main.scss:3: expected \";\".");

        let err = StyleCompileError::new("main.css", None, "bad");
        assert_eq!(err.to_string(), "main.css: bad");
    }
}
