//! # CodeRAG Lexical Index
//!
//! Full-text inverted index over chunk records.
//!
//! ## Layout
//!
//! ```text
//! <dir>/
//!     docs.jsonl      one stored LexicalDoc per line, doc_id = line number
//!     postings.json   term -> [doc_id]
//!     meta.json       format version, counts, commit time
//! ```

mod error;
mod tokenizer;
mod writer;

pub use error::{LexicalError, Result};
pub use tokenizer::tokenize;
pub use writer::{
    read_lexical_meta, LexicalDoc, LexicalMeta, LexicalWriter, DOCS_FILE_NAME,
    LEXICAL_FORMAT_VERSION, META_FILE_NAME, POSTINGS_FILE_NAME,
};

use std::path::Path;

/// An index "exists" when its directory holds at least one file
pub fn lexical_index_exists(dir: impl AsRef<Path>) -> bool {
    let Ok(entries) = std::fs::read_dir(dir.as_ref()) else {
        return false;
    };
    entries
        .filter_map(std::result::Result::ok)
        .any(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
}
