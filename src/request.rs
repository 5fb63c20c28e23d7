//! Request messages and their builders.
//!
//! Builders resolve the caller's list kind through the registry, stamp the
//! canonical discriminator onto the list and its items, and return a
//! [`RequestBody`] ready for the envelope encoder.

use crate::error::{ClientError, Result};
use crate::model::{SharedList, SharedListItem};
use crate::registry::{EntityScope, EntityType, SharedEntityType, SharedListItemType, SoapAction};
use crate::schema;
use crate::xml::Element;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetListItemsBySharedListRequest {
    pub shared_list: SharedList,
    pub scope: EntityScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSharedEntitiesRequest {
    pub shared_entity_type: SharedEntityType,
    pub scope: EntityScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSharedEntityAssociationsBySharedEntityIdsRequest {
    pub entity_type: EntityType,
    pub shared_entity_ids: Vec<i64>,
    pub shared_entity_type: SharedEntityType,
    pub scope: EntityScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddListItemsToSharedListRequest {
    pub list_items: Vec<SharedListItem>,
    pub shared_list: SharedList,
    pub scope: EntityScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteListItemsFromSharedListRequest {
    pub list_item_ids: Vec<i64>,
    pub shared_list: SharedList,
    pub scope: EntityScope,
}

/// Exactly one operation per envelope body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    GetListItemsBySharedList(GetListItemsBySharedListRequest),
    GetSharedEntities(GetSharedEntitiesRequest),
    GetSharedEntityAssociationsBySharedEntityIds(GetSharedEntityAssociationsBySharedEntityIdsRequest),
    AddListItemsToSharedList(AddListItemsToSharedListRequest),
    DeleteListItemsFromSharedList(DeleteListItemsFromSharedListRequest),
}

impl RequestBody {
    pub fn action(&self) -> SoapAction {
        match self {
            Self::GetListItemsBySharedList(_) => SoapAction::GetListItemsBySharedList,
            Self::GetSharedEntities(_) => SoapAction::GetSharedEntities,
            Self::GetSharedEntityAssociationsBySharedEntityIds(_) => {
                SoapAction::GetSharedEntityAssociationsBySharedEntityIds
            }
            Self::AddListItemsToSharedList(_) => SoapAction::AddListItemsToSharedList,
            Self::DeleteListItemsFromSharedList(_) => SoapAction::DeleteListItemsFromSharedList,
        }
    }

    /// The operation element, as placed inside `s:Body`.
    pub fn to_element(&self) -> Element {
        match self {
            Self::GetListItemsBySharedList(r) => schema::GET_LIST_ITEMS_BY_SHARED_LIST.encode(r),
            Self::GetSharedEntities(r) => schema::GET_SHARED_ENTITIES.encode(r),
            Self::GetSharedEntityAssociationsBySharedEntityIds(r) => {
                schema::GET_SHARED_ENTITY_ASSOCIATIONS.encode(r)
            }
            Self::AddListItemsToSharedList(r) => schema::ADD_LIST_ITEMS_TO_SHARED_LIST.encode(r),
            Self::DeleteListItemsFromSharedList(r) => {
                schema::DELETE_LIST_ITEMS_FROM_SHARED_LIST.encode(r)
            }
        }
    }
}

/// How the caller names the kind of the list it passes in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedListInput {
    /// Kind given explicitly; overrides any tag the record carries.
    Typed {
        kind: SharedEntityType,
        list: SharedList,
    },
    /// The record carries its own tag in `entity_type`.
    /// An empty or unknown tag is rejected with `UnsupportedVariant`.
    Raw(SharedList),
}

impl SharedListInput {
    pub fn typed(kind: SharedEntityType, list: SharedList) -> Self {
        Self::Typed { kind, list }
    }

    /// An existing list addressed by id.
    pub fn by_id(kind: SharedEntityType, id: i64) -> Self {
        Self::Typed {
            kind,
            list: SharedList::with_id(id),
        }
    }

    /// Resolve the kind and stamp its canonical tag onto the record.
    pub fn resolve(self) -> Result<SharedList> {
        let (kind, mut list) = match self {
            Self::Typed { kind, list } => (kind, list),
            Self::Raw(list) => (list.entity_type.parse::<SharedEntityType>()?, list),
        };
        kind.as_str().clone_into(&mut list.entity_type);
        Ok(list)
    }
}

impl From<SharedList> for SharedListInput {
    fn from(list: SharedList) -> Self {
        Self::Raw(list)
    }
}

/// Fill blank item tags from the variant; reject tags that disagree with it
/// or are unknown.
fn stamp_items(items: Vec<SharedListItem>) -> Result<Vec<SharedListItem>> {
    items
        .into_iter()
        .map(|mut item| {
            let kind = item.item_type();
            if item.type_tag.is_empty() {
                kind.as_str().clone_into(&mut item.type_tag);
            } else {
                let declared: SharedListItemType = item.type_tag.parse()?;
                if declared != kind {
                    return Err(ClientError::unsupported(
                        "shared list item type",
                        format!("{} for a {} item", item.type_tag, kind),
                    ));
                }
            }
            Ok(item)
        })
        .collect()
}

pub fn list_items_by_shared_list(
    list: impl Into<SharedListInput>,
    scope: EntityScope,
) -> Result<RequestBody> {
    let shared_list = list.into().resolve()?;
    trace!(id = shared_list.id, kind = %shared_list.entity_type, "Built GetListItemsBySharedList");
    Ok(RequestBody::GetListItemsBySharedList(
        GetListItemsBySharedListRequest { shared_list, scope },
    ))
}

pub fn shared_entities(shared_entity_type: SharedEntityType, scope: EntityScope) -> RequestBody {
    RequestBody::GetSharedEntities(GetSharedEntitiesRequest {
        shared_entity_type,
        scope,
    })
}

pub fn shared_entity_associations(
    entity_type: EntityType,
    shared_entity_ids: Vec<i64>,
    shared_entity_type: SharedEntityType,
    scope: EntityScope,
) -> RequestBody {
    RequestBody::GetSharedEntityAssociationsBySharedEntityIds(
        GetSharedEntityAssociationsBySharedEntityIdsRequest {
            entity_type,
            shared_entity_ids,
            shared_entity_type,
            scope,
        },
    )
}

pub fn add_list_items(
    list: impl Into<SharedListInput>,
    items: Vec<SharedListItem>,
    scope: EntityScope,
) -> Result<RequestBody> {
    let shared_list = list.into().resolve()?;
    let list_items = stamp_items(items)?;
    trace!(
        id = shared_list.id,
        kind = %shared_list.entity_type,
        items = list_items.len(),
        "Built AddListItemsToSharedList"
    );
    Ok(RequestBody::AddListItemsToSharedList(
        AddListItemsToSharedListRequest {
            list_items,
            shared_list,
            scope,
        },
    ))
}

pub fn delete_list_items(
    list: impl Into<SharedListInput>,
    list_item_ids: Vec<i64>,
    scope: EntityScope,
) -> Result<RequestBody> {
    let shared_list = list.into().resolve()?;
    Ok(RequestBody::DeleteListItemsFromSharedList(
        DeleteListItemsFromSharedListRequest {
            list_item_ids,
            shared_list,
            scope,
        },
    ))
}
