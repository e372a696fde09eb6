// src/crawl/record.rs
// =============================================================================
// The data that flows through the crawler.
//
// A LinkRecord is both the unit of work (it sits in the frontier) and the
// unit of output (it is printed as one JSON line once its page is parsed).
//
// TraversalMode is the 0/1/2 selector the parent process passes us.
// =============================================================================

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// One link candidate / one crawled page
//
// Only url, parent_url and level are known when the record is created.
// keyword and title are filled in by the worker right before it is emitted,
// so they stay None (and are left out of the JSON) until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    /// Absolute address of the page
    pub url: String,
    /// Page that discovered this link (None only for the seed)
    pub parent_url: Option<String>,
    /// Hops from the seed (seed = 0)
    pub level: u32,
    /// Did the page text contain the keyword?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<bool>,
    /// Text of the page's <title> element(s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<String>>,
}

impl LinkRecord {
    /// The root of a crawl: level 0, no parent
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_url: None,
            level: 0,
            keyword: None,
            title: None,
        }
    }

    /// A link found on `self`, one level deeper
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_url: Some(self.url.clone()),
            level: self.level + 1,
            keyword: None,
            title: None,
        }
    }
}

// Which end of the frontier workers take from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// First in, first out (breadth-first)
    Fifo,
    /// Last in, first out (depth-first)
    Lifo,
}

// The traversal selector from the command line
//
// 0 = depth-first with the full worker pool
// 1 = breadth-first with the full worker pool
// 2 = depth-first with exactly one worker that stops at the first page
//     sitting at max level ("single path")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    DepthFirst,
    BreadthFirst,
    SinglePath,
}

impl TraversalMode {
    pub fn discipline(self) -> Discipline {
        match self {
            TraversalMode::BreadthFirst => Discipline::Fifo,
            TraversalMode::DepthFirst | TraversalMode::SinglePath => Discipline::Lifo,
        }
    }

    // Single path always runs one worker, whatever was asked for
    pub fn worker_count(self, requested: usize) -> usize {
        match self {
            TraversalMode::SinglePath => 1,
            _ => requested.max(1),
        }
    }

    pub fn is_single_path(self) -> bool {
        self == TraversalMode::SinglePath
    }
}

impl TryFrom<u8> for TraversalMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TraversalMode::DepthFirst),
            1 => Ok(TraversalMode::BreadthFirst),
            2 => Ok(TraversalMode::SinglePath),
            other => Err(format!(
                "unknown search type {other} (expected 0 = DFS, 1 = BFS, 2 = single path)"
            )),
        }
    }
}

impl FromStr for TraversalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("search type must be 0, 1 or 2, got '{s}'"))?;
        TraversalMode::try_from(value)
    }
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraversalMode::DepthFirst => "depth-first",
            TraversalMode::BreadthFirst => "breadth-first",
            TraversalMode::SinglePath => "single-path",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_is_one_level_deeper() {
        let seed = LinkRecord::seed("https://a.test");
        let child = seed.child("https://a.test/x");
        let grandchild = child.child("https://a.test/y");

        assert_eq!(seed.level, 0);
        assert_eq!(seed.parent_url, None);
        assert_eq!(child.level, 1);
        assert_eq!(child.parent_url.as_deref(), Some("https://a.test"));
        assert_eq!(grandchild.level, 2);
        assert_eq!(grandchild.parent_url.as_deref(), Some("https://a.test/x"));
    }

    #[test]
    fn test_unenriched_record_json_omits_keyword_and_title() {
        let json = serde_json::to_value(LinkRecord::seed("https://a.test")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "https://a.test", "parent_url": null, "level": 0})
        );
    }

    #[test]
    fn test_emitted_record_json_shape() {
        let mut record = LinkRecord::seed("https://a.test").child("https://a.test/b");
        record.keyword = Some(true);
        record.title = Some(vec!["B".to_string()]);

        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["parent_url"], "https://a.test");
        assert_eq!(json["level"], 1);
        assert_eq!(json["keyword"], true);
        assert_eq!(json["title"], serde_json::json!(["B"]));
    }

    #[test]
    fn test_mode_selector() {
        assert_eq!("0".parse::<TraversalMode>(), Ok(TraversalMode::DepthFirst));
        assert_eq!("1".parse::<TraversalMode>(), Ok(TraversalMode::BreadthFirst));
        assert_eq!("2".parse::<TraversalMode>(), Ok(TraversalMode::SinglePath));
        assert!("3".parse::<TraversalMode>().is_err());
        assert!("bfs".parse::<TraversalMode>().is_err());
    }

    #[test]
    fn test_mode_discipline_and_pool_size() {
        assert_eq!(TraversalMode::DepthFirst.discipline(), Discipline::Lifo);
        assert_eq!(TraversalMode::BreadthFirst.discipline(), Discipline::Fifo);
        assert_eq!(TraversalMode::SinglePath.discipline(), Discipline::Lifo);

        assert_eq!(TraversalMode::BreadthFirst.worker_count(50), 50);
        assert_eq!(TraversalMode::SinglePath.worker_count(50), 1);
        assert_eq!(TraversalMode::DepthFirst.worker_count(0), 1);
    }
}
