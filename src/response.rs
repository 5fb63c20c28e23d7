//! Typed response payloads and the projectors that extract operation results.
//!
//! Payloads are decoded from the generic tree built by
//! [`crate::envelope::decode_envelope`]. Anything that does not fit the
//! expected shape is a [`ClientError::MalformedResponse`]; nothing is silently
//! dropped.

use crate::envelope::ResponseEnvelope;
use crate::error::{ClientError, Result};
use crate::model::{
    BatchError, KeyValuePair, ListItem, SharedEntity, SharedEntityAssociation, SharedListItem,
};
use crate::registry::{SharedListItemType, SoapAction};
use crate::xml::XmlNode;
use std::str::FromStr;

/// A response payload bound to its operation.
pub trait SoapResponse: Sized {
    const ACTION: SoapAction;

    /// Decode the payload element (`<Action>Response`).
    fn from_node(node: &XmlNode) -> Result<Self>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetListItemsBySharedListResponse {
    pub list_items: Vec<SharedListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSharedEntitiesResponse {
    pub shared_entities: Vec<SharedEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSharedEntityAssociationsBySharedEntityIdsResponse {
    pub associations: Vec<SharedEntityAssociation>,
    pub partial_errors: Vec<BatchError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddListItemsToSharedListResponse {
    /// Index-aligned with the submitted items; `None` where nothing was added
    pub list_item_ids: Vec<Option<i64>>,
    pub partial_errors: Vec<BatchError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteListItemsFromSharedListResponse {
    pub partial_errors: Vec<BatchError>,
}

impl SoapResponse for GetListItemsBySharedListResponse {
    const ACTION: SoapAction = SoapAction::GetListItemsBySharedList;

    fn from_node(node: &XmlNode) -> Result<Self> {
        let list_items = records(node, "ListItems", "SharedListItem", decode_list_item)?;
        Ok(Self { list_items })
    }
}

impl SoapResponse for GetSharedEntitiesResponse {
    const ACTION: SoapAction = SoapAction::GetSharedEntities;

    fn from_node(node: &XmlNode) -> Result<Self> {
        let shared_entities = records(node, "SharedEntities", "SharedEntity", decode_shared_entity)?;
        Ok(Self { shared_entities })
    }
}

impl SoapResponse for GetSharedEntityAssociationsBySharedEntityIdsResponse {
    const ACTION: SoapAction = SoapAction::GetSharedEntityAssociationsBySharedEntityIds;

    fn from_node(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            associations: records(
                node,
                "Associations",
                "SharedEntityAssociation",
                decode_association,
            )?,
            partial_errors: partial_errors(node)?,
        })
    }
}

impl SoapResponse for AddListItemsToSharedListResponse {
    const ACTION: SoapAction = SoapAction::AddListItemsToSharedList;

    fn from_node(node: &XmlNode) -> Result<Self> {
        let list_item_ids = match node.child("ListItemIds") {
            Some(ids) => ids
                .children_named("long")
                .map(|id| {
                    if id.is_nil() || id.text.is_empty() {
                        Ok(None)
                    } else {
                        parse("ListItemIds", &id.text).map(Some)
                    }
                })
                .collect::<Result<_>>()?,
            None => Vec::new(),
        };
        Ok(Self {
            list_item_ids,
            partial_errors: partial_errors(node)?,
        })
    }
}

impl SoapResponse for DeleteListItemsFromSharedListResponse {
    const ACTION: SoapAction = SoapAction::DeleteListItemsFromSharedList;

    fn from_node(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            partial_errors: partial_errors(node)?,
        })
    }
}

/// Results of a batch call next to the per-item failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome<T> {
    pub results: T,
    pub partial_errors: Vec<BatchError>,
}

impl<T> BatchOutcome<T> {
    pub fn has_partial_errors(&self) -> bool {
        !self.partial_errors.is_empty()
    }
}

pub fn list_items(
    envelope: ResponseEnvelope<GetListItemsBySharedListResponse>,
) -> Result<Vec<SharedListItem>> {
    Ok(envelope.into_body()?.list_items)
}

pub fn shared_entities(
    envelope: ResponseEnvelope<GetSharedEntitiesResponse>,
) -> Result<Vec<SharedEntity>> {
    Ok(envelope.into_body()?.shared_entities)
}

pub fn associations(
    envelope: ResponseEnvelope<GetSharedEntityAssociationsBySharedEntityIdsResponse>,
) -> Result<BatchOutcome<Vec<SharedEntityAssociation>>> {
    let body = envelope.into_body()?;
    Ok(BatchOutcome {
        results: body.associations,
        partial_errors: body.partial_errors,
    })
}

pub fn added_item_ids(
    envelope: ResponseEnvelope<AddListItemsToSharedListResponse>,
) -> Result<BatchOutcome<Vec<Option<i64>>>> {
    let body = envelope.into_body()?;
    Ok(BatchOutcome {
        results: body.list_item_ids,
        partial_errors: body.partial_errors,
    })
}

/// Delete has no result beyond its per-item failures.
pub fn deletion_errors(
    envelope: ResponseEnvelope<DeleteListItemsFromSharedListResponse>,
) -> Result<Vec<BatchError>> {
    Ok(envelope.into_body()?.partial_errors)
}

fn parse<T: FromStr>(field: &str, text: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse()
        .map_err(|e| ClientError::malformed(format!("{field}: {e} ({text:?})")))
}

/// Optional numeric child. Missing, nil and empty are all `None`.
fn number<T: FromStr>(node: &XmlNode, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match node.child_text(name) {
        Some(text) if !text.is_empty() => parse(name, text).map(Some),
        _ => Ok(None),
    }
}

fn text(node: &XmlNode, name: &str) -> String {
    node.child_text(name).unwrap_or_default().to_string()
}

fn optional_text(node: &XmlNode, name: &str) -> Option<String> {
    node.child_text(name)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Discriminator of a record: `i:type`, else its `Type` child.
fn type_tag<'a>(node: &'a XmlNode) -> Option<&'a str> {
    node.xsi_type()
        .or_else(|| node.child_text("Type"))
        .filter(|t| !t.is_empty())
}

fn records<T>(
    node: &XmlNode,
    container: &str,
    item: &str,
    decode: fn(&XmlNode) -> Result<T>,
) -> Result<Vec<T>> {
    let Some(list) = node.child(container).filter(|c| !c.is_nil()) else {
        return Ok(Vec::new());
    };
    list.children
        .iter()
        .map(|child| {
            if child.is(item) {
                decode(child)
            } else {
                Err(ClientError::malformed(format!(
                    "unexpected {} in {}",
                    child.local_name, container
                )))
            }
        })
        .collect()
}

fn forward_compatibility_map(node: &XmlNode) -> Vec<KeyValuePair> {
    node.child("ForwardCompatibilityMap")
        .map(|map| {
            map.children_named("KeyValuePairOfstringstring")
                .map(|pair| KeyValuePair::new(text(pair, "key"), text(pair, "value")))
                .collect()
        })
        .unwrap_or_default()
}

fn partial_errors(node: &XmlNode) -> Result<Vec<BatchError>> {
    records(node, "PartialErrors", "BatchError", decode_batch_error)
}

fn decode_batch_error(node: &XmlNode) -> Result<BatchError> {
    let code = number(node, "Code")?.unwrap_or_default();
    let index = number(node, "Index")?.unwrap_or_default();
    Ok(batch_error(node, code, index))
}

/// Batch errors inside a fault detail. A number that does not parse reads as
/// 0 so the fault itself is still reported.
pub(crate) fn decode_fault_batch_error(node: &XmlNode) -> BatchError {
    batch_error(
        node,
        lenient_number(node, "Code"),
        lenient_number(node, "Index"),
    )
}

pub(crate) fn lenient_number(node: &XmlNode, name: &str) -> i32 {
    node.child_text(name)
        .and_then(|text| text.trim().parse().ok())
        .unwrap_or_default()
}

fn batch_error(node: &XmlNode, code: i32, index: i32) -> BatchError {
    BatchError {
        code,
        index,
        error_code: text(node, "ErrorCode"),
        message: text(node, "Message"),
        details: optional_text(node, "Details"),
        field_path: optional_text(node, "FieldPath"),
        error_type: text(node, "Type"),
        forward_compatibility_map: forward_compatibility_map(node),
    }
}

fn decode_shared_entity(node: &XmlNode) -> Result<SharedEntity> {
    Ok(SharedEntity {
        id: number(node, "Id")?.unwrap_or_default(),
        name: text(node, "Name"),
        association_count: number(node, "AssociationCount")?.unwrap_or_default(),
        item_count: number(node, "ItemCount")?.unwrap_or_default(),
        forward_compatibility_map: forward_compatibility_map(node),
        entity_type: type_tag(node).unwrap_or_default().to_string(),
    })
}

fn decode_list_item(node: &XmlNode) -> Result<SharedListItem> {
    let tag = type_tag(node).ok_or_else(|| ClientError::malformed("list item without a type"))?;
    let kind: SharedListItemType = tag
        .parse()
        .map_err(|e| ClientError::malformed(format!("list item: {e}")))?;
    let id = number(node, "Id")?.unwrap_or_default();

    let item = match kind {
        SharedListItemType::NegativeKeyword => ListItem::NegativeKeyword {
            id,
            match_type: optional_text(node, "MatchType")
                .map(|m| m.parse())
                .transpose()
                .map_err(|e| ClientError::malformed(format!("negative keyword: {e}")))?,
            text: text(node, "Text"),
        },
        SharedListItemType::NegativeSite => ListItem::NegativeSite {
            id,
            url: text(node, "Url"),
        },
        SharedListItemType::BrandItem => ListItem::BrandItem {
            id,
            brand_id: number(node, "BrandId")?.unwrap_or_default(),
        },
    };

    Ok(SharedListItem {
        item,
        forward_compatibility_map: forward_compatibility_map(node),
        type_tag: tag.to_string(),
    })
}

fn decode_association(node: &XmlNode) -> Result<SharedEntityAssociation> {
    let required = |name: &str| {
        node.child_text(name)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::malformed(format!("association without {name}")))
    };
    let tag = |name: &str| -> Result<String> { required(name).map(str::to_string) };

    Ok(SharedEntityAssociation {
        entity_id: parse("EntityId", required("EntityId")?)?,
        entity_type: tag("EntityType")?
            .parse()
            .map_err(|e| ClientError::malformed(format!("association: {e}")))?,
        shared_entity_customer_id: number(node, "SharedEntityCustomerId")?,
        shared_entity_id: parse("SharedEntityId", required("SharedEntityId")?)?,
        shared_entity_type: tag("SharedEntityType")?
            .parse()
            .map_err(|e| ClientError::malformed(format!("association: {e}")))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::envelope::ResponseHeader;
    use crate::registry::{EntityType, MatchType, SharedEntityType};
    use crate::xml::parse_document;

    const NS: &str = r#"xmlns="https://bingads.microsoft.com/CampaignManagement/v13" xmlns:i="http://www.w3.org/2001/XMLSchema-instance""#;

    fn node(xml: &str) -> XmlNode {
        parse_document(xml.replace("{NS}", NS).as_bytes()).unwrap()
    }

    fn envelope<R>(body: Option<R>) -> ResponseEnvelope<R> {
        ResponseEnvelope {
            header: ResponseHeader::default(),
            body,
        }
    }

    #[test]
    fn test_decode_list_items_of_every_kind() {
        let payload = node(
            r#"<GetListItemsBySharedListResponse {NS}>
                 <ListItems>
                   <SharedListItem i:type="NegativeKeyword">
                     <Type>NegativeKeyword</Type><Id>1</Id><MatchType>Phrase</MatchType><Text>free</Text>
                   </SharedListItem>
                   <SharedListItem i:type="NegativeSite"><Id>2</Id><Url>example.com</Url></SharedListItem>
                   <SharedListItem i:type="BrandItem"><Id>3</Id><BrandId>44</BrandId></SharedListItem>
                 </ListItems>
               </GetListItemsBySharedListResponse>"#,
        );
        let response = GetListItemsBySharedListResponse::from_node(&payload).unwrap();
        let items: Vec<ListItem> = response.list_items.into_iter().map(|i| i.item).collect();
        assert_eq!(
            items,
            vec![
                ListItem::NegativeKeyword {
                    id: 1,
                    match_type: Some(MatchType::Phrase),
                    text: "free".to_string()
                },
                ListItem::NegativeSite {
                    id: 2,
                    url: "example.com".to_string()
                },
                ListItem::BrandItem { id: 3, brand_id: 44 },
            ]
        );
    }

    #[test]
    fn test_unknown_item_kind_is_malformed() {
        let payload = node(
            r#"<GetListItemsBySharedListResponse {NS}>
                 <ListItems><SharedListItem i:type="NegativeApp"><Id>1</Id></SharedListItem></ListItems>
               </GetListItemsBySharedListResponse>"#,
        );
        let err = GetListItemsBySharedListResponse::from_node(&payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_nil_list_is_empty() {
        let payload = node(
            r#"<GetSharedEntitiesResponse {NS}><SharedEntities i:nil="true"/></GetSharedEntitiesResponse>"#,
        );
        let response = GetSharedEntitiesResponse::from_node(&payload).unwrap();
        assert!(response.shared_entities.is_empty());
    }

    #[test]
    fn test_decode_shared_entities() {
        let payload = node(
            r#"<GetSharedEntitiesResponse {NS}>
                 <SharedEntities>
                   <SharedEntity i:type="NegativeKeywordList">
                     <AssociationCount>2</AssociationCount>
                     <ForwardCompatibilityMap i:nil="true"/>
                     <Id>77</Id><Name>Brand safety</Name><Type>NegativeKeywordList</Type>
                     <ItemCount>12</ItemCount>
                   </SharedEntity>
                 </SharedEntities>
               </GetSharedEntitiesResponse>"#,
        );
        let response = GetSharedEntitiesResponse::from_node(&payload).unwrap();
        let entity = &response.shared_entities[0];
        assert_eq!(entity.id, 77);
        assert_eq!(entity.association_count, 2);
        assert_eq!(entity.item_count, 12);
        assert_eq!(entity.kind().unwrap(), SharedEntityType::NegativeKeywordList);
    }

    #[test]
    fn test_add_items_ids_keep_positions() {
        let payload = node(
            r#"<AddListItemsToSharedListResponse {NS}>
                 <ListItemIds xmlns:a="http://schemas.microsoft.com/2003/10/Serialization/Arrays">
                   <a:long>901</a:long><a:long i:nil="true"/><a:long>903</a:long>
                 </ListItemIds>
                 <PartialErrors>
                   <BatchError>
                     <Code>1001</Code><Details i:nil="true"/><ErrorCode>DuplicateItem</ErrorCode>
                     <FieldPath i:nil="true"/><Index>1</Index><Message>Duplicate.</Message><Type>BatchError</Type>
                   </BatchError>
                 </PartialErrors>
               </AddListItemsToSharedListResponse>"#,
        );
        let outcome = added_item_ids(envelope(Some(
            AddListItemsToSharedListResponse::from_node(&payload).unwrap(),
        )))
        .unwrap();
        assert_eq!(outcome.results, vec![Some(901), None, Some(903)]);
        assert!(outcome.has_partial_errors());
        let error = &outcome.partial_errors[0];
        assert_eq!(error.index, 1);
        assert_eq!(error.code, 1001);
        assert_eq!(error.details, None);
        assert_eq!(error.error_type, "BatchError");
    }

    #[test]
    fn test_decode_associations() {
        let payload = node(
            r#"<GetSharedEntityAssociationsBySharedEntityIdsResponse {NS}>
                 <Associations>
                   <SharedEntityAssociation>
                     <EntityId>555</EntityId><EntityType>Campaign</EntityType>
                     <SharedEntityCustomerId i:nil="true"/>
                     <SharedEntityId>123</SharedEntityId><SharedEntityType>NegativeKeywordList</SharedEntityType>
                   </SharedEntityAssociation>
                 </Associations>
                 <PartialErrors i:nil="true"/>
               </GetSharedEntityAssociationsBySharedEntityIdsResponse>"#,
        );
        let response =
            GetSharedEntityAssociationsBySharedEntityIdsResponse::from_node(&payload).unwrap();
        assert_eq!(
            response.associations,
            vec![SharedEntityAssociation {
                entity_id: 555,
                entity_type: EntityType::Campaign,
                shared_entity_customer_id: None,
                shared_entity_id: 123,
                shared_entity_type: SharedEntityType::NegativeKeywordList,
            }]
        );
        assert!(response.partial_errors.is_empty());
    }

    #[test]
    fn test_bad_number_is_malformed() {
        let payload = node(
            r#"<DeleteListItemsFromSharedListResponse {NS}>
                 <PartialErrors><BatchError><Index>first</Index></BatchError></PartialErrors>
               </DeleteListItemsFromSharedListResponse>"#,
        );
        let err = DeleteListItemsFromSharedListResponse::from_node(&payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.to_string().contains("Index"));
    }

    #[test]
    fn test_projector_requires_body() {
        let err = deletion_errors(envelope::<DeleteListItemsFromSharedListResponse>(None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let errors = deletion_errors(envelope(Some(DeleteListItemsFromSharedListResponse::default())))
            .unwrap();
        assert!(errors.is_empty());
    }
}
