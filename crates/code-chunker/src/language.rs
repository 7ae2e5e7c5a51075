use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source language of a chunk, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Swift,
    Kotlin,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            "py" | "pyw" => Self::Python,
            "js" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "go" => Self::Go,
            "java" => Self::Java,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "cs" => Self::CSharp,
            "rb" => Self::Ruby,
            "swift" => Self::Swift,
            "kt" | "kts" => Self::Kotlin,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Ruby => "ruby",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Line comment prefixes; lines starting with one of these carry no references
    pub fn comment_prefixes(self) -> Vec<&'static str> {
        match self {
            Self::Rust
            | Self::JavaScript
            | Self::TypeScript
            | Self::Go
            | Self::Java
            | Self::C
            | Self::Cpp
            | Self::CSharp
            | Self::Swift
            | Self::Kotlin => vec!["//", "/*", "* "],
            Self::Python | Self::Ruby => vec!["#"],
            Self::Unknown => vec![],
        }
    }

    /// Keywords that introduce a named definition (the following identifier is the symbol)
    pub fn definition_keywords(self) -> Vec<&'static str> {
        match self {
            Self::Rust => vec!["fn", "struct", "enum", "trait", "type", "mod", "const", "static"],
            Self::Python => vec!["def", "class"],
            Self::JavaScript => vec!["function", "class"],
            Self::TypeScript => vec!["function", "class", "interface", "type", "enum"],
            Self::Go => vec!["func", "type"],
            Self::Java | Self::CSharp => vec!["class", "interface", "enum", "record", "struct"],
            Self::C | Self::Cpp => vec!["struct", "class", "enum", "union", "typedef"],
            Self::Ruby => vec!["def", "class", "module"],
            Self::Swift => vec!["func", "class", "struct", "enum", "protocol"],
            Self::Kotlin => vec!["fun", "class", "interface", "object"],
            Self::Unknown => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Language;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("RS"), Language::Rust);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("cs"), Language::CSharp);
        assert_eq!(Language::from_extension("unknown"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("test.rs"), Language::Rust);
        assert_eq!(Language::from_path("src/main.py"), Language::Python);
        assert_eq!(Language::from_path("no_extension"), Language::Unknown);
    }

    #[test]
    fn test_definition_keywords() {
        assert!(Language::Rust.definition_keywords().contains(&"fn"));
        assert!(Language::CSharp.definition_keywords().contains(&"class"));
        assert!(Language::Unknown.definition_keywords().is_empty());
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&Language::CSharp).unwrap();
        assert_eq!(json, "\"c_sharp\"");
    }
}
