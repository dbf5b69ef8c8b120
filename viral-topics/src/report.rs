//! What a run shows to the user.
//!
//! The pipeline only appends ordered [`Block`]s to a [`Report`]. How they look is up to the
//! surface: the web page turns them into HTML, the CLI into markdown.

use std::fmt;

/// Longest description shown for a video, in characters.
pub const DESCRIPTION_LIMIT: usize = 200;

/// A video that made it through the subscriber filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub title: String,
    /// Already truncated to [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
    pub url: String,
    pub views: u64,
    pub subscribers: u64,
}

impl ResultRecord {
    pub fn new(
        title: String,
        description: &str,
        video_id: &str,
        views: u64,
        subscribers: u64,
    ) -> Self {
        Self {
            title,
            description: truncate_description(description),
            url: watch_url(video_id),
            views,
            subscribers,
        }
    }
}

/// Canonical watch page of a video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Keeps the first [`DESCRIPTION_LIMIT`] characters of `description`.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_LIMIT).collect()
}

/// One unit of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(String),
    Success(String),
    Warning(String),
    Error(String),
    Record(ResultRecord),
    Divider,
}

/// Ordered output of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    blocks: Vec<Block>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, message: impl Into<String>) {
        self.blocks.push(Block::Text(message.into()));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.blocks.push(Block::Success(message.into()));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.blocks.push(Block::Warning(message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.blocks.push(Block::Error(message.into()));
    }

    pub fn record(&mut self, record: ResultRecord) {
        self.blocks.push(Block::Record(record));
    }

    pub fn divider(&mut self) {
        self.blocks.push(Block::Divider);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// Renders the report as markdown, one block per paragraph.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            match block {
                Block::Text(m) => writeln!(f, "{m}")?,
                Block::Success(m) => writeln!(f, "✅ {m}")?,
                Block::Warning(m) => writeln!(f, "⚠️ {m}")?,
                Block::Error(m) => writeln!(f, "❌ {m}")?,
                Block::Record(record) => write!(f, "{record}")?,
                Block::Divider => writeln!(f, "---")?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // two trailing spaces force a markdown line break
        writeln!(f, "**Title:** {}  ", self.title)?;
        writeln!(f, "**Description:** {}  ", self.description)?;
        writeln!(f, "**URL:** [Watch Video]({})  ", self.url)?;
        writeln!(f, "**Views:** {}  ", self.views)?;
        writeln!(f, "**Subscribers:** {}", self.subscribers)
    }
}
