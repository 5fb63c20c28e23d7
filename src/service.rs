//! Campaign Management client and its shared-list operations.

use crate::config::ClientConfig;
use crate::envelope::{decode_response, encode_request, RequestEnvelope, ResponseEnvelope};
use crate::error::{ClientError, Result};
use crate::model::{BatchError, SharedEntity, SharedEntityAssociation, SharedListItem};
use crate::registry::{EntityScope, EntityType, SharedEntityType};
use crate::request::{self, RequestBody, SharedListInput};
use crate::response::{self, BatchOutcome, SoapResponse};
use crate::transport::{HttpTransport, Transport};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the Campaign Management service.
///
/// Holds no per-call state; one client can serve any number of concurrent
/// calls.
pub struct CampaignManagementClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl CampaignManagementClient<HttpTransport> {
    /// Create a client posting over HTTP with the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.api.timeout_secs))?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> CampaignManagementClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        info!(
            environment = ?config.api.environment,
            endpoint = config.endpoint(),
            customer_id = %config.auth.customer_id,
            "Campaign Management client created"
        );
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared-list operations.
    pub fn shared_lists(&self) -> SharedListService<'_, T> {
        SharedListService { client: self }
    }

    /// Encode, post and decode one call.
    pub async fn invoke<R: SoapResponse>(&self, body: RequestBody) -> Result<ResponseEnvelope<R>> {
        let action = body.action();
        if action != R::ACTION {
            return Err(ClientError::Serialization(format!(
                "{} body sent for a {} response",
                action,
                R::ACTION
            )));
        }

        let endpoint = self.config.endpoint();
        let payload = encode_request(&RequestEnvelope::new(body, &self.config.auth))?;
        debug!(action = %action, endpoint, bytes = payload.len(), "Sending SOAP request");
        if self.config.api.debug {
            debug!(body = %String::from_utf8_lossy(&payload), "Request envelope");
        }

        let data = match self.transport.post(endpoint, action.as_str(), payload).await {
            Ok(data) => data,
            Err(err) => {
                match err.transport_fault() {
                    Some(fault) => warn!(
                        action = %action,
                        code = %fault.code,
                        tracking_id = %fault.tracking_id,
                        "SOAP fault on failed HTTP exchange: {}",
                        fault
                    ),
                    None => warn!(action = %action, error = %err, "Transport failure"),
                }
                return Err(err);
            }
        };

        if self.config.api.debug {
            debug!(body = %String::from_utf8_lossy(&data), "Response envelope");
        }

        match decode_response::<R>(&data) {
            Ok(envelope) => {
                debug!(
                    action = %action,
                    tracking_id = %envelope.header.tracking_id,
                    bytes = data.len(),
                    "SOAP response decoded"
                );
                Ok(envelope)
            }
            Err(err) => {
                if let Some(fault) = err.fault() {
                    warn!(
                        action = %action,
                        code = %fault.code,
                        tracking_id = %fault.tracking_id,
                        "SOAP fault: {}",
                        fault
                    );
                }
                Err(err)
            }
        }
    }
}

/// Shared-list operations of a [`CampaignManagementClient`].
pub struct SharedListService<'a, T> {
    client: &'a CampaignManagementClient<T>,
}

impl<T: Transport> SharedListService<'_, T> {
    pub async fn get_list_items_by_shared_list(
        &self,
        list: impl Into<SharedListInput>,
        scope: EntityScope,
    ) -> Result<Vec<SharedListItem>> {
        let body = request::list_items_by_shared_list(list, scope)?;
        response::list_items(self.client.invoke(body).await?)
    }

    pub async fn get_shared_entities(
        &self,
        shared_entity_type: SharedEntityType,
        scope: EntityScope,
    ) -> Result<Vec<SharedEntity>> {
        let body = request::shared_entities(shared_entity_type, scope);
        response::shared_entities(self.client.invoke(body).await?)
    }

    pub async fn get_shared_entity_associations(
        &self,
        entity_type: EntityType,
        shared_entity_ids: Vec<i64>,
        shared_entity_type: SharedEntityType,
        scope: EntityScope,
    ) -> Result<BatchOutcome<Vec<SharedEntityAssociation>>> {
        let body = request::shared_entity_associations(
            entity_type,
            shared_entity_ids,
            shared_entity_type,
            scope,
        );
        let outcome = response::associations(self.client.invoke(body).await?)?;
        log_partial_errors("GetSharedEntityAssociationsBySharedEntityIds", &outcome.partial_errors);
        Ok(outcome)
    }

    pub async fn add_list_items_to_shared_list(
        &self,
        list: impl Into<SharedListInput>,
        items: Vec<SharedListItem>,
        scope: EntityScope,
    ) -> Result<BatchOutcome<Vec<Option<i64>>>> {
        let body = request::add_list_items(list, items, scope)?;
        let outcome = response::added_item_ids(self.client.invoke(body).await?)?;
        log_partial_errors("AddListItemsToSharedList", &outcome.partial_errors);
        Ok(outcome)
    }

    pub async fn delete_list_items_from_shared_list(
        &self,
        list: impl Into<SharedListInput>,
        list_item_ids: Vec<i64>,
        scope: EntityScope,
    ) -> Result<Vec<BatchError>> {
        let body = request::delete_list_items(list, list_item_ids, scope)?;
        let errors = response::deletion_errors(self.client.invoke(body).await?)?;
        log_partial_errors("DeleteListItemsFromSharedList", &errors);
        Ok(errors)
    }
}

fn log_partial_errors(action: &str, errors: &[BatchError]) {
    if errors.is_empty() {
        return;
    }
    warn!(
        action,
        count = errors.len(),
        first = %errors[0].error_code,
        "Batch call returned partial errors"
    );
}
