//! Competition list: newest first, one page at a time

use std::sync::Arc;
use tracing::{info, warn};

use bmj_common::config::TomlConfig;
use bmj_common::models::{Competition, CompetitionDraft};
use bmj_common::pagination::DEFAULT_PAGE_SIZE;
use bmj_common::{Page, Result};

use crate::gateway::Gateway;

pub struct CompetitionCatalog<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    page_size: u32,
    current: Option<Page<Competition>>,
}

impl<G: Gateway + ?Sized> CompetitionCatalog<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_page_size(gateway, DEFAULT_PAGE_SIZE)
    }

    /// Catalog paged by `[client] page_size`
    pub fn from_config(gateway: Arc<G>, config: &TomlConfig) -> Self {
        Self::with_page_size(gateway, config.client.page_size)
    }

    pub fn with_page_size(gateway: Arc<G>, page_size: u32) -> Self {
        Self {
            gateway,
            page_size,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Page<Competition>> {
        self.current.as_ref()
    }

    /// Load page `page` (0-indexed); a failure keeps the page already shown
    pub async fn load(&mut self, page: u32) -> Result<&Page<Competition>> {
        match self.gateway.list_competitions(page, self.page_size).await {
            Ok(loaded) => Ok(&*self.current.insert(loaded)),
            Err(e) => {
                warn!(page, error = %e, "Failed to load competitions");
                Err(e)
            }
        }
    }

    pub async fn next_page(&mut self) -> Result<&Page<Competition>> {
        let page = match &self.current {
            Some(current) if !current.is_last() => current.number + 1,
            Some(current) => current.number,
            None => 0,
        };
        self.load(page).await
    }

    pub async fn prev_page(&mut self) -> Result<&Page<Competition>> {
        let page = self
            .current
            .as_ref()
            .map(|c| c.number.saturating_sub(1))
            .unwrap_or(0);
        self.load(page).await
    }

    /// Validate and create, then reload the first page where it will appear
    pub async fn create(&mut self, draft: CompetitionDraft) -> Result<Competition> {
        let draft = draft.normalized();
        draft.validate()?;

        let created = self.gateway.create_competition(draft).await?;
        info!(competition_id = created.id, name = %created.name, "Competition created");
        let _ = self.load(0).await;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use chrono::NaiveDate;

    fn draft(name: &str, day: u32) -> CompetitionDraft {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        CompetitionDraft {
            name: name.to_string(),
            start_date: date,
            end_date: date,
            city: "Hangzhou".to_string(),
            venue: None,
            result: None,
            coach_comment: None,
            self_summary: None,
        }
    }

    #[tokio::test]
    async fn test_pages_forward_and_back() {
        let gateway = Arc::new(InMemoryGateway::new());
        let mut catalog = CompetitionCatalog::with_page_size(Arc::clone(&gateway), 2);
        for day in 1..=3 {
            catalog.create(draft(&format!("Cup {}", day), day)).await.unwrap();
        }

        let first = catalog.load(0).await.unwrap();
        assert_eq!(first.content[0].name, "Cup 3");
        assert_eq!(first.total_pages, 2);

        let second = catalog.next_page().await.unwrap();
        assert_eq!(second.number, 1);
        assert_eq!(second.content.len(), 1);
        assert!(second.is_last());

        // Stays on the last page
        assert_eq!(catalog.next_page().await.unwrap().number, 1);
        assert_eq!(catalog.prev_page().await.unwrap().number, 0);
    }

    #[tokio::test]
    async fn test_page_size_from_config() {
        let gateway = Arc::new(InMemoryGateway::new());
        let mut config = TomlConfig::default();
        config.client.page_size = 1;
        let mut catalog = CompetitionCatalog::from_config(Arc::clone(&gateway), &config);
        catalog.create(draft("Cup A", 1)).await.unwrap();
        catalog.create(draft("Cup B", 2)).await.unwrap();

        let page = catalog.current().unwrap();
        assert_eq!(page.size, 1);
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_gateway() {
        let gateway = Arc::new(InMemoryGateway::new());
        let mut catalog = CompetitionCatalog::new(Arc::clone(&gateway));

        let err = catalog.create(draft("   ", 1)).await.unwrap_err();
        assert_eq!(err.field(), Some("competitionName"));
        assert_eq!(gateway.store().read().await.competition_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_current_page() {
        let gateway = Arc::new(InMemoryGateway::new());
        let mut catalog = CompetitionCatalog::new(Arc::clone(&gateway));
        catalog.create(draft("Spring Cup", 4)).await.unwrap();

        gateway.set_offline(true);
        assert!(catalog.load(0).await.is_err());
        assert_eq!(catalog.current().unwrap().content.len(), 1);
    }
}
