/// A news item, event or announcement published under a sector.
///
/// # Sync Framework
/// [`News`] implements [`SyncResource`], so a
/// [`SyncController<News>`](sync_framework::SyncController) keeps a page of these in
/// step with the `news` endpoint.
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use sync_framework::SyncResource;

/// Type-safe identifier for news items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsId(pub u64);

impl From<u64> for NewsId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for NewsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "news_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    News,
    Event,
    Announcement,
}

impl NewsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::News => "news",
            NewsCategory::Event => "event",
            NewsCategory::Announcement => "announcement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: NewsId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub category: NewsCategory,
    pub status: PublishStatus,
    #[serde(default)]
    pub sector_id: Option<u64>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: String,
}

/// Aggregates the server reports next to a news page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsStats {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
    pub archived: u64,
}

/// The `news` endpoint.
pub struct News;

impl SyncResource for News {
    type Record = NewsItem;
    type Stats = NewsStats;

    fn endpoint() -> &'static str {
        "news"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sync_framework::ResourcePage;

    #[test]
    fn test_decode_news_page() {
        let page = ResourcePage::<News>::decode(json!({
            "news": [{
                "id": 12,
                "title": "Open day",
                "category": "event",
                "status": "published",
                "sector_id": 3,
                "created_at": "2024-05-02T10:00:00Z"
            }],
            "stats": { "total": 40, "published": 31 },
            "pagination": { "currentPage": 2, "totalPages": 4, "totalCount": 40 }
        }))
        .unwrap();

        let item = &page.records[0];
        assert_eq!(item.id, NewsId(12));
        assert_eq!(item.category, NewsCategory::Event);
        assert_eq!(item.status, PublishStatus::Published);
        assert_eq!(item.summary, None);
        assert_eq!(item.sector_id, Some(3));

        let stats = page.stats.unwrap();
        assert_eq!(stats.published, 31);
        assert_eq!(stats.draft, 0);
        assert_eq!(page.pagination.unwrap().total_pages, 4);
    }

    #[test]
    fn test_unknown_category_fails_decode() {
        let result = ResourcePage::<News>::decode(json!({
            "news": [{
                "id": 1,
                "title": "x",
                "category": "podcast",
                "status": "draft",
                "created_at": "2024-01-01"
            }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(NewsId::from(7).to_string(), "news_7");
    }
}
