use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use crate::core::pipeline::ScheduleDocument;

pub const SUMMARIES_FILE: &str = "summaries.txt";
pub const SCHEDULE_FILE: &str = "tts_ready.json";

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Lower-case slug with runs of anything but `[a-z0-9]` collapsed to `-`.
pub fn topic_slug(topic: &str) -> String {
    let lowered = topic.to_lowercase();
    let slug = NON_SLUG.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "topic".to_string()
    } else {
        slug.to_string()
    }
}

/// Per-topic directory layout under a common root.
pub struct TopicStore {
    root: PathBuf,
}

impl TopicStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn topic_dir(&self, topic: &str) -> PathBuf {
        self.root.join(topic_slug(topic))
    }

    pub fn ensure_topic_dir(&self, topic: &str) -> Result<PathBuf> {
        let dir = self.topic_dir(topic);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating topic directory {}", dir.display()))?;
        Ok(dir)
    }

    pub fn topic_file(&self, topic: &str, name: &str) -> PathBuf {
        self.topic_dir(topic).join(name)
    }

    pub fn summaries_path(&self, topic: &str) -> PathBuf {
        self.topic_file(topic, SUMMARIES_FILE)
    }

    pub fn schedule_path(&self, topic: &str) -> PathBuf {
        self.topic_file(topic, SCHEDULE_FILE)
    }

    pub fn read_blob(&self, topic: &str) -> Result<String> {
        read_blob(&self.summaries_path(topic))
    }

    pub fn save_schedule(&self, document: &ScheduleDocument) -> Result<PathBuf> {
        self.ensure_topic_dir(&document.topic)?;
        let path = self.schedule_path(&document.topic);
        write_schedule(&path, document)?;
        Ok(path)
    }

    pub fn load_schedule(&self, topic: &str) -> Result<Option<ScheduleDocument>> {
        let path = self.schedule_path(topic);
        if !path.exists() {
            return Ok(None);
        }
        read_schedule(&path).map(Some)
    }
}

pub fn read_blob(path: &Path) -> Result<String> {
    log::info!("Reading source records from {}", path.display());
    std::fs::read_to_string(path).with_context(|| format!("reading records file {}", path.display()))
}

pub fn write_schedule(path: &Path, document: &ScheduleDocument) -> Result<()> {
    log::info!("Writing schedule with {} episode(s) to {}", document.episode_count, path.display());
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json).with_context(|| format!("writing schedule {}", path.display()))?;
    Ok(())
}

pub fn read_schedule(path: &Path) -> Result<ScheduleDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading schedule {}", path.display()))?;
    let document = serde_json::from_str(&content)
        .with_context(|| format!("parsing schedule {}", path.display()))?;
    Ok(document)
}
