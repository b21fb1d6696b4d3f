use async_trait::async_trait;
use humor_core::caption::{CaptionItem, CaptionRepository};
use humor_core::error::{HumorError, Result};
use humor_core::vote::{VoteRecord, VoteRepository};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEMO_CAPTIONS: &[(&str, &str)] = &[
    ("When the standup is longer than the sprint", "A very tired office cat"),
    ("Me explaining my code to the rubber duck", "A rubber duck wearing glasses"),
    ("It works on my machine", "A laptop on fire in a meadow"),
    ("Deploying on a Friday afternoon", "A dog sipping coffee in a burning room"),
    ("The intern found the production password", "A raccoon holding a sticky note"),
    ("Monday morning inbox", "An avalanche approaching a tiny cabin"),
    ("When the tests pass but you changed nothing", "A suspicious owl"),
    ("Code review at 4:59 pm", "A sloth reading a very long scroll"),
];

#[derive(Default)]
struct Tables {
    captions: Vec<CaptionItem>,
    votes: Vec<VoteRecord>,
    /// (profile_id, caption_id)
    voted: HashSet<(String, String)>,
}

/// Caption and vote tables held in memory.
///
/// Enforces one vote per (profile, caption) pair the same way the hosted
/// table's unique key does. Cloning shares the tables.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with captions.
    pub fn with_captions(captions: Vec<CaptionItem>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                captions,
                ..Tables::default()
            })),
        }
    }

    /// Creates a store seeded with a small set of public demo captions.
    pub fn with_demo_captions() -> Self {
        let captions = DEMO_CAPTIONS
            .iter()
            .enumerate()
            .map(|(i, (content, description))| {
                CaptionItem::new(Uuid::new_v4().to_string(), *content).with_image(
                    format!("https://picsum.photos/seed/humor-{}/640/480", i),
                    Some(description.to_string()),
                )
            })
            .collect();
        Self::with_captions(captions)
    }

    /// Adds a caption and returns its id.
    pub async fn add_caption(&self, content: impl Into<String>, is_public: bool) -> String {
        let id = Uuid::new_v4().to_string();
        let mut caption = CaptionItem::new(id.clone(), content);
        if !is_public {
            caption = caption.private();
        }
        self.tables.write().await.captions.push(caption);
        id
    }

    /// Every vote inserted so far, oldest first.
    pub async fn votes(&self) -> Vec<VoteRecord> {
        self.tables.read().await.votes.clone()
    }
}

#[async_trait]
impl CaptionRepository for InMemoryRecordStore {
    async fn list_public_captions(&self) -> Result<Vec<CaptionItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .captions
            .iter()
            .filter(|c| c.is_public)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VoteRepository for InMemoryRecordStore {
    async fn insert_vote(&self, vote: &VoteRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        let key = (vote.profile_id.clone(), vote.caption_id.clone());
        if !tables.voted.insert(key) {
            return Err(HumorError::constraint(format!(
                "duplicate vote for caption {} by {}",
                vote.caption_id, vote.profile_id
            )));
        }
        tables.votes.push(vote.clone());
        Ok(())
    }
}
