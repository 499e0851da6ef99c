/// Network adapters for the remote threat-modelling service
mod event_stream;
mod graphql_client;

pub use event_stream::SseDiagramEvents;
pub use graphql_client::GraphQlThreatModelApi;
