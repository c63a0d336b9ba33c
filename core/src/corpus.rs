use crate::tokenizer::{normalize_document, simple_terms};
use crate::DocId;
use anyhow::{anyhow, bail, Context, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Tokens(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Text,
    Tokens,
}

impl Content {
    pub fn representation(&self) -> Representation {
        match self {
            Content::Text(_) => Representation::Text,
            Content::Tokens(_) => Representation::Tokens,
        }
    }

    /// Index terms of this document. Raw text goes through the plain word splitter.
    pub fn terms(&self) -> Cow<'_, [String]> {
        match self {
            Content::Tokens(tokens) => Cow::Borrowed(tokens.as_slice()),
            Content::Text(text) => Cow::Owned(simple_terms(text)),
        }
    }

    /// Text form used for snippets.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            Content::Text(text) => Cow::Borrowed(text.as_str()),
            Content::Tokens(tokens) => Cow::Owned(tokens.join(" ")),
        }
    }
}

/// Accessor the retrieval models read documents through.
pub trait DocumentSource {
    fn list_document_ids(&self) -> Vec<DocId>;
    fn get_content(&self, doc_id: &str) -> Option<&Content>;

    /// Listed documents paired with their content, in listing order. Ids the
    /// source lists but cannot resolve are dropped.
    fn documents(&self) -> Vec<(DocId, &Content)> {
        self.list_document_ids()
            .into_iter()
            .filter_map(|id| {
                let content = self.get_content(&id)?;
                Some((id, content))
            })
            .collect()
    }
}

/// Ordered, single-representation document collection.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    ids: Vec<DocId>,
    contents: Vec<Content>,
    positions: HashMap<DocId, usize>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens<I, S, T>(docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<T>)>,
        S: Into<DocId>,
        T: Into<String>,
    {
        let mut collection = Self::new();
        for (id, tokens) in docs {
            collection.insert(id, Content::Tokens(tokens.into_iter().map(Into::into).collect()))?;
        }
        Ok(collection)
    }

    pub fn from_texts<I, S, T>(docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<DocId>,
        T: Into<String>,
    {
        let mut collection = Self::new();
        for (id, text) in docs {
            collection.insert(id, Content::Text(text.into()))?;
        }
        Ok(collection)
    }

    pub fn insert(&mut self, id: impl Into<DocId>, content: Content) -> Result<()> {
        let id = id.into();
        if self.positions.contains_key(&id) {
            bail!("duplicate document id {id}");
        }
        if let Some(expected) = self.representation() {
            if expected != content.representation() {
                bail!("document {id} is {:?} but the collection holds {:?}", content.representation(), expected);
            }
        }
        self.positions.insert(id.clone(), self.ids.len());
        self.ids.push(id);
        self.contents.push(content);
        Ok(())
    }

    pub fn representation(&self) -> Option<Representation> {
        self.contents.first().map(Content::representation)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Document ids in insertion order.
    pub fn ids(&self) -> &[DocId] {
        &self.ids
    }

    pub fn get(&self, doc_id: &str) -> Option<&Content> {
        self.positions.get(doc_id).map(|&i| &self.contents[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocId, &Content)> {
        self.ids.iter().zip(self.contents.iter())
    }
}

impl DocumentSource for Collection {
    fn list_document_ids(&self) -> Vec<DocId> {
        self.ids.clone()
    }

    fn get_content(&self, doc_id: &str) -> Option<&Content> {
        self.get(doc_id)
    }
}

/// Load every `*.txt` file directly under `dir`, ordered by file name.
/// Files that are empty after normalization are skipped.
pub fn load_dir(dir: &Path, representation: Representation) -> Result<Collection> {
    if !dir.is_dir() {
        return Err(anyhow!("document folder {} not found", dir.display()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("reading {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("txt") {
            files.push(path.to_path_buf());
        }
    }

    let mut collection = Collection::new();
    for path in files {
        let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let text = normalize_document(&raw);
        if text.is_empty() {
            tracing::debug!(path = %path.display(), "skipping empty document");
            continue;
        }
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("non UTF-8 file name {}", path.display()))?
            .to_string();
        let content = match representation {
            Representation::Text => Content::Text(text),
            Representation::Tokens => Content::Tokens(text.split_whitespace().map(str::to_lowercase).collect()),
        };
        collection.insert(name, content)?;
    }
    tracing::info!(dir = %dir.display(), num_docs = collection.len(), "loaded collection");
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mixed_representation() {
        let mut c = Collection::new();
        c.insert("a.txt", Content::Tokens(vec!["pedang".into()])).unwrap();
        assert!(c.insert("b.txt", Content::Text("cinta".into())).is_err());
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn rejects_duplicate_id() {
        let mut c = Collection::from_texts([("a.txt", "pedang")]).unwrap();
        assert!(c.insert("a.txt", Content::Text("hutan".into())).is_err());
    }

    #[test]
    fn keeps_insertion_order() {
        let c = Collection::from_tokens([("z.txt", vec!["x"]), ("a.txt", vec!["y"])]).unwrap();
        assert_eq!(c.list_document_ids(), vec!["z.txt".to_string(), "a.txt".to_string()]);
        assert_eq!(c.get_content("a.txt"), Some(&Content::Tokens(vec!["y".into()])));
    }

    #[test]
    fn text_terms_are_split() {
        let content = Content::Text("Pedang di Hutan".into());
        assert_eq!(&*content.terms(), ["pedang", "di", "hutan"]);
    }

    #[test]
    fn load_dir_sorted_and_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "cinta").unwrap();
        fs::write(dir.path().join("a.txt"), "['pedang', 'hutan']").unwrap();
        fs::write(dir.path().join("empty.txt"), "  \n").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        let c = load_dir(dir.path(), Representation::Tokens).unwrap();
        assert_eq!(c.ids(), ["a.txt", "b.txt"]);
        assert_eq!(c.get("a.txt"), Some(&Content::Tokens(vec!["pedang".into(), "hutan".into()])));
    }

    #[test]
    fn load_dir_missing_folder_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dir(&dir.path().join("nope"), Representation::Text).is_err());
    }
}
