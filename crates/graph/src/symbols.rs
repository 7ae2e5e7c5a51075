use crate::error::{GraphError, Result};
use coderag_chunker::{ChunkRecord, Language};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

const MIN_IDENT_LEN: usize = 2;

/// Symbols a chunk defines and identifiers it mentions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSymbols {
    pub defines: BTreeSet<String>,
    pub references: BTreeSet<String>,
}

/// Regex-based definition/reference extraction, one pattern per language
pub struct SymbolExtractor {
    definitions: HashMap<Language, Regex>,
    identifier: Regex,
}

impl SymbolExtractor {
    pub fn new() -> Result<Self> {
        let languages = [
            Language::Rust,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Go,
            Language::Java,
            Language::C,
            Language::Cpp,
            Language::CSharp,
            Language::Ruby,
            Language::Swift,
            Language::Kotlin,
        ];

        let mut definitions = HashMap::new();
        for language in languages {
            let keywords = language.definition_keywords().join("|");
            let pattern = format!(r"\b(?:{keywords})\s+([A-Za-z_][A-Za-z0-9_]*)");
            let regex = Regex::new(&pattern)
                .map_err(|e| GraphError::BuildError(format!("bad definition pattern: {e}")))?;
            definitions.insert(language, regex);
        }

        let identifier = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*")
            .map_err(|e| GraphError::BuildError(format!("bad identifier pattern: {e}")))?;

        Ok(Self {
            definitions,
            identifier,
        })
    }

    pub fn extract(&self, chunk: &ChunkRecord) -> ChunkSymbols {
        let mut symbols = ChunkSymbols::default();
        let definition = self.definitions.get(&chunk.language);
        let comments = chunk.language.comment_prefixes();
        let keywords = chunk.language.definition_keywords();

        for line in chunk.content.lines() {
            let trimmed = line.trim_start();
            if comments.iter().any(|prefix| trimmed.starts_with(prefix)) {
                continue;
            }

            if let Some(definition) = definition {
                for caps in definition.captures_iter(line) {
                    if let Some(name) = caps.get(1) {
                        symbols.defines.insert(name.as_str().to_string());
                    }
                }
            }

            for ident in self.identifier.find_iter(line) {
                let ident = ident.as_str();
                if ident.len() >= MIN_IDENT_LEN && !keywords.contains(&ident) {
                    symbols.references.insert(ident.to_string());
                }
            }
        }

        for defined in &symbols.defines {
            symbols.references.remove(defined);
        }
        symbols
    }
}
