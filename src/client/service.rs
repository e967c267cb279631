//! High-level homework check operations

use tracing::{debug, info, instrument};

use super::{api::HomeworkSource, error::Result};
use crate::domain::{StatusUpdate, extract_homeworks, parse_status};

/// Runs the fetch, validate and render steps of one poll cycle
#[derive(Debug)]
pub struct HomeworkService<A> {
    api: A,
}

impl<A: HomeworkSource> HomeworkService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Fetch statuses since `from_date` and render the most recent homework.
    ///
    /// Returns `None` when the API has nothing new.
    #[instrument(name = "check_homework", skip(self))]
    pub async fn check(&self, from_date: i64) -> Result<Option<StatusUpdate>> {
        let response = self.api.fetch(from_date).await?;
        let homeworks = extract_homeworks(&response)?;

        let Some(latest) = homeworks.first() else {
            debug!("No homework updates");
            return Ok(None);
        };

        let update = parse_status(latest)?;
        info!(
            homework_count = homeworks.len(),
            homework = %update.homework_name,
            status = %update.status,
            "Fetched latest homework status"
        );
        Ok(Some(update))
    }
}
