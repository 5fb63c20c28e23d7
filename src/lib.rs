//! SOAP client for Campaign Management shared lists
//!
//! Translates typed shared-list operations into SOAP 1.1 envelopes for the
//! Campaign Management v13 service, and decodes responses, faults and per-item
//! partial errors back into typed results.
//!
//! # Features
//!
//! - Closed registries of wire tags (list kinds, item kinds, scopes, actions)
//! - Schema-driven envelope encoding with `i:type` discrimination
//! - Two-pass response decoding where a SOAP fault always wins
//! - Batch results returned alongside their partial errors
//! - Pluggable async transport with a reqwest implementation
//!
//! # Example
//!
//! ```ignore
//! use bingads_shared_lists::{
//!     AuthConfig, CampaignManagementClient, ClientConfig, EntityScope, SharedEntityType,
//!     SharedListInput, SharedListItem,
//! };
//!
//! let config = ClientConfig::new(AuthConfig::new(dev_token, access_token, customer, account));
//! let client = CampaignManagementClient::new(config)?;
//! let outcome = client
//!     .shared_lists()
//!     .add_list_items_to_shared_list(
//!         SharedListInput::by_id(SharedEntityType::PlacementExclusionList, 123),
//!         vec![SharedListItem::negative_site("example.com")],
//!         EntityScope::Account,
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod model;
pub mod registry;
pub mod request;
pub mod response;
mod schema;
pub mod service;
pub mod transport;
pub mod xml;

pub use config::{ApiConfig, AuthConfig, ClientConfig, Environment};
pub use envelope::{decode_envelope, decode_response, encode_request, RequestEnvelope, ResponseEnvelope};
pub use error::{ClientError, ErrorKind, Result, SoapFault};
pub use model::{
    BatchError, KeyValuePair, ListItem, SharedEntity, SharedEntityAssociation, SharedList,
    SharedListItem,
};
pub use registry::{EntityScope, EntityType, MatchType, SharedEntityType, SharedListItemType, SoapAction};
pub use request::{RequestBody, SharedListInput};
pub use response::BatchOutcome;
pub use schema::CAMPAIGN_MANAGEMENT_NS;
pub use service::{CampaignManagementClient, SharedListService};
pub use transport::{HttpTransport, Transport};
