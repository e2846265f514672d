use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SyncError;

/// Site layout: where transcripts, reading pages, exported word timing, and
/// calibration sidecars live relative to the project root. File-name
/// conventions (`chapter-NN-...`) match the rest of the production pipeline.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub root: PathBuf,
    pub transcript_dir: PathBuf,
    pub read_dir: PathBuf,
    pub words_dir: PathBuf,
    pub calibration_dir: PathBuf,
}

impl SiteConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            transcript_dir: root.join("output").join("timing"),
            read_dir: root.join("site").join("read"),
            words_dir: root.join("site").join("js").join("words"),
            calibration_dir: root.join("site").join("js").join("words"),
            root,
        }
    }

    /// Transcript path for a chapter. A `-fixed-` transcript, when present,
    /// supersedes the original.
    pub fn transcript_path(&self, chapter: u32) -> PathBuf {
        let fixed = self
            .transcript_dir
            .join(format!("chapter-{chapter:02}-fixed-transcript.json"));
        if fixed.exists() {
            return fixed;
        }
        self.transcript_dir
            .join(format!("chapter-{chapter:02}-transcript.json"))
    }

    pub fn words_path(&self, chapter: u32) -> PathBuf {
        self.words_dir
            .join(format!("chapter-{chapter:02}-words.json"))
    }

    pub fn calibration_path(&self, chapter: u32) -> PathBuf {
        self.calibration_dir
            .join(format!("chapter-{chapter:02}-calibration.json"))
    }

    /// Reading page for a chapter: the first `chapter-NN*.html` file.
    pub fn read_page_path(&self, chapter: u32) -> Result<PathBuf, SyncError> {
        let prefix = format!("chapter-{chapter:02}");
        let entries = std::fs::read_dir(&self.read_dir)
            .map_err(|e| SyncError::io("list reading pages", e))?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "html")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        candidates.sort();
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::missing_input(chapter, "reading page"))
    }

    /// All chapter numbers with a transcript on disk, ascending.
    pub fn discover_chapters(&self) -> Result<Vec<u32>, SyncError> {
        static CHAPTER_RE: OnceLock<Regex> = OnceLock::new();
        let re = CHAPTER_RE
            .get_or_init(|| Regex::new(r"chapter-(\d+)").expect("chapter regex is valid"));

        let entries = std::fs::read_dir(&self.transcript_dir)
            .map_err(|e| SyncError::io("list transcripts", e))?;
        let mut chapters: Vec<u32> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name();
                let name = name.to_str()?;
                if !name.ends_with("-transcript.json") {
                    return None;
                }
                re.captures(name)?.get(1)?.as_str().parse().ok()
            })
            .collect();
        chapters.sort_unstable();
        chapters.dedup();
        Ok(chapters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_paths_are_zero_padded() {
        let cfg = SiteConfig::new("/project");
        assert!(cfg
            .words_path(3)
            .ends_with("site/js/words/chapter-03-words.json"));
        assert!(cfg
            .calibration_path(12)
            .ends_with("site/js/words/chapter-12-calibration.json"));
    }

    #[test]
    fn discovers_chapters_from_transcript_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SiteConfig::new(dir.path());
        cfg.transcript_dir = dir.path().to_path_buf();
        for name in [
            "chapter-01-transcript.json",
            "chapter-03-transcript.json",
            "chapter-03-fixed-transcript.json",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(cfg.discover_chapters().unwrap(), vec![1, 3]);
    }

    #[test]
    fn fixed_transcript_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = SiteConfig::new(dir.path());
        cfg.transcript_dir = dir.path().to_path_buf();
        std::fs::write(dir.path().join("chapter-02-transcript.json"), "{}").unwrap();
        assert!(cfg
            .transcript_path(2)
            .ends_with("chapter-02-transcript.json"));
        std::fs::write(dir.path().join("chapter-02-fixed-transcript.json"), "{}").unwrap();
        assert!(cfg
            .transcript_path(2)
            .ends_with("chapter-02-fixed-transcript.json"));
    }
}
