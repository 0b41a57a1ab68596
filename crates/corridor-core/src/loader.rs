//! Corpus loader: turns a file or directory into `Document`s.
//!
//! PDFs become one document per page (`page` metadata, 1-based); `.txt` and
//! `.md` files become one document each. Anything else is ignored, and a
//! file that cannot be read is skipped with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{Document, Meta, META_PAGE, META_SOURCE};

const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

pub fn load(source_path: &Path) -> Result<Vec<Document>> {
    if !source_path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("corpus path {} does not exist", source_path.display()),
        )));
    }
    let files = list_corpus_files(source_path);
    info!(path = %source_path.display(), files = files.len(), "Loading documents");

    let mut documents = Vec::new();
    for file in &files {
        match extension(file).as_deref() {
            Some("pdf") => match load_pdf(file) {
                Ok(pages) => documents.extend(pages),
                Err(e) => warn!(file = %file.display(), error = %e, "Skipping unreadable PDF"),
            },
            Some(_) => match load_text(file) {
                Ok(document) => documents.push(document),
                Err(e) => warn!(file = %file.display(), error = %e, "Skipping unreadable file"),
            },
            None => {}
        }
    }
    info!(documents = documents.len(), "Loaded document pages/sections");
    Ok(documents)
}

fn list_corpus_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| extension(p).is_some_and(|ext| ext == "pdf" || TEXT_EXTENSIONS.contains(&ext.as_str())))
        .collect();
    files.sort();
    files
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase)
}

fn source_meta(path: &Path) -> Meta {
    let mut meta = Meta::new();
    meta.insert(META_SOURCE.to_string(), path.to_string_lossy().to_string());
    meta
}

fn load_text(path: &Path) -> Result<Document> {
    let text = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => String::from_utf8_lossy(&fs::read(path)?).to_string(),
    };
    let meta = source_meta(path);
    Ok(Document::new(path.to_string_lossy(), text, meta))
}

fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let pdf = lopdf::Document::load(path).map_err(|e| Error::parse(path.display().to_string(), e))?;
    let mut pages = Vec::new();
    for page_number in pdf.get_pages().keys().copied() {
        let text = match pdf.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(file = %path.display(), page = page_number, error = %e, "No extractable text on page");
                String::new()
            }
        };
        let mut meta = source_meta(path);
        meta.insert(META_PAGE.to_string(), page_number.to_string());
        pages.push(Document::new(format!("{}#p{}", path.display(), page_number), text, meta));
    }
    Ok(pages)
}
