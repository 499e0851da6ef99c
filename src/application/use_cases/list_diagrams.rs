use crate::ports::outbound::ThreatModelApi;
use crate::shared::Result;
use crate::threat_model::domain::DiagramSummary;

/// ListDiagramsUseCase - fetches the account's diagrams for display.
pub struct ListDiagramsUseCase<A> {
    api: A,
}

impl<A> ListDiagramsUseCase<A>
where
    A: ThreatModelApi,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn execute(&self) -> Result<Vec<DiagramSummary>> {
        self.api.list_diagrams().await
    }
}
