//! Declarative wire schema of every request message.
//!
//! Each message is a [`Schema`]: element name, default namespace declaration,
//! discriminator rule and an ordered table of [`Field`]s (wire name, namespace,
//! omit rule, accessor). One engine, [`Schema::encode`], turns any of them into
//! an [`Element`] tree.

use crate::model::{KeyValuePair, ListItem, SharedEntity, SharedListItem};
use crate::request::{
    AddListItemsToSharedListRequest, DeleteListItemsFromSharedListRequest,
    GetListItemsBySharedListRequest, GetSharedEntitiesRequest,
    GetSharedEntityAssociationsBySharedEntityIdsRequest,
};
use crate::xml::{Element, ARRAYS_NS};

/// Versioned namespace of the Campaign Management API.
pub const CAMPAIGN_MANAGEMENT_NS: &str = "https://bingads.microsoft.com/CampaignManagement/v13";

/// Discriminator attribute. The `i` prefix is bound on the envelope root only.
const TYPE_ATTR: &str = "i:type";
const ARRAY_PREFIX: &str = "a1";

/// Value of one field, as produced by a field accessor.
pub(crate) enum Value {
    /// Field does not apply to this record
    Absent,
    Text(String),
    Int(i64),
    Longs(Vec<i64>),
    Pairs(Vec<KeyValuePair>),
    Record(Element),
    Records(Vec<Element>),
}

impl Value {
    fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.is_empty(),
            Self::Int(n) => *n == 0,
            Self::Longs(items) => items.is_empty(),
            Self::Pairs(pairs) => pairs.is_empty(),
            Self::Record(_) => false,
            Self::Records(items) => items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Omit {
    /// Emitted even when zero or empty
    Never,
    IfEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ns {
    /// Inherits the enclosing default namespace
    Inherit,
    /// Array items are qualified with the serialization-arrays namespace
    Arrays,
}

pub(crate) struct Field<T: 'static> {
    pub wire: &'static str,
    pub ns: Ns,
    pub omit: Omit,
    pub value: fn(&T) -> Value,
}

pub(crate) struct Schema<T: 'static> {
    pub element: &'static str,
    /// Default namespace declared on the element itself
    pub namespace: Option<&'static str>,
    pub discriminator: Option<fn(&T) -> &str>,
    pub fields: &'static [Field<T>],
}

impl<T: 'static> Schema<T> {
    pub fn encode(&self, record: &T) -> Element {
        let mut element = Element::new(self.element);
        if let Some(namespace) = self.namespace {
            element = element.attr("xmlns", namespace);
        }
        if let Some(discriminator) = self.discriminator {
            let tag = discriminator(record);
            if !tag.is_empty() {
                element = element.attr(TYPE_ATTR, tag);
            }
        }
        for field in self.fields {
            if let Some(child) = field.encode(record) {
                element.push(child);
            }
        }
        element
    }
}

impl<T: 'static> Field<T> {
    fn encode(&self, record: &T) -> Option<Element> {
        let value = (self.value)(record);
        if matches!(value, Value::Absent) || (self.omit == Omit::IfEmpty && value.is_empty()) {
            return None;
        }

        let element = match value {
            Value::Absent => return None,
            Value::Text(text) => Element::leaf(self.wire, text),
            Value::Int(n) => Element::leaf(self.wire, n.to_string()),
            Value::Longs(items) => {
                let (container, item_name) = match self.ns {
                    Ns::Arrays => (
                        Element::new(self.wire).attr(format!("xmlns:{ARRAY_PREFIX}"), ARRAYS_NS),
                        format!("{ARRAY_PREFIX}:long"),
                    ),
                    Ns::Inherit => (Element::new(self.wire), "long".to_string()),
                };
                items.iter().fold(container, |array, n| {
                    array.child(Element::leaf(item_name.as_str(), n.to_string()))
                })
            }
            Value::Pairs(pairs) => pairs.iter().fold(Element::new(self.wire), |map, pair| {
                map.child(
                    Element::new("KeyValuePairOfstringstring")
                        .child(Element::leaf("key", pair.key.as_str()))
                        .child(Element::leaf("value", pair.value.as_str())),
                )
            }),
            Value::Record(mut record) => {
                self.wire.clone_into(&mut record.name);
                record
            }
            Value::Records(records) => records
                .into_iter()
                .fold(Element::new(self.wire), |list, record| list.child(record)),
        };
        Some(element)
    }
}

fn shared_entity_tag(list: &SharedEntity) -> &str {
    &list.entity_type
}

fn list_item_tag(item: &SharedListItem) -> &str {
    &item.type_tag
}

pub(crate) static SHARED_LIST: Schema<SharedEntity> = Schema {
    element: "SharedList",
    namespace: None,
    discriminator: Some(shared_entity_tag),
    fields: &[
        Field {
            wire: "AssociationCount",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |l: &SharedEntity| Value::Int(l.association_count.into()),
        },
        Field {
            wire: "ForwardCompatibilityMap",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |l: &SharedEntity| Value::Pairs(l.forward_compatibility_map.clone()),
        },
        // The service requires Id even for lists it resolves by other means.
        Field {
            wire: "Id",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |l: &SharedEntity| Value::Int(l.id),
        },
        Field {
            wire: "Name",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |l: &SharedEntity| Value::Text(l.name.clone()),
        },
        Field {
            wire: "ItemCount",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |l: &SharedEntity| Value::Int(l.item_count.into()),
        },
    ],
};

pub(crate) static SHARED_LIST_ITEM: Schema<SharedListItem> = Schema {
    element: "SharedListItem",
    namespace: None,
    discriminator: Some(list_item_tag),
    fields: &[
        Field {
            wire: "ForwardCompatibilityMap",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |i: &SharedListItem| Value::Pairs(i.forward_compatibility_map.clone()),
        },
        Field {
            wire: "Type",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |i: &SharedListItem| Value::Text(i.item_type().as_str().to_string()),
        },
        Field {
            wire: "Id",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |i: &SharedListItem| Value::Int(i.item.id()),
        },
        Field {
            wire: "MatchType",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |i: &SharedListItem| match &i.item {
                ListItem::NegativeKeyword {
                    match_type: Some(match_type),
                    ..
                } => Value::Text(match_type.as_str().to_string()),
                _ => Value::Absent,
            },
        },
        Field {
            wire: "Text",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |i: &SharedListItem| match &i.item {
                ListItem::NegativeKeyword { text, .. } => Value::Text(text.clone()),
                _ => Value::Absent,
            },
        },
        Field {
            wire: "Url",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |i: &SharedListItem| match &i.item {
                ListItem::NegativeSite { url, .. } => Value::Text(url.clone()),
                _ => Value::Absent,
            },
        },
        Field {
            wire: "BrandId",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |i: &SharedListItem| match &i.item {
                ListItem::BrandItem { brand_id, .. } => Value::Int(*brand_id),
                _ => Value::Absent,
            },
        },
    ],
};

pub(crate) static GET_LIST_ITEMS_BY_SHARED_LIST: Schema<GetListItemsBySharedListRequest> = Schema {
    element: "GetListItemsBySharedListRequest",
    namespace: Some(CAMPAIGN_MANAGEMENT_NS),
    discriminator: None,
    fields: &[
        Field {
            wire: "SharedList",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetListItemsBySharedListRequest| {
                Value::Record(SHARED_LIST.encode(&r.shared_list))
            },
        },
        Field {
            wire: "SharedEntityScope",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetListItemsBySharedListRequest| Value::Text(r.scope.as_str().to_string()),
        },
    ],
};

pub(crate) static GET_SHARED_ENTITIES: Schema<GetSharedEntitiesRequest> = Schema {
    element: "GetSharedEntitiesRequest",
    namespace: Some(CAMPAIGN_MANAGEMENT_NS),
    discriminator: None,
    fields: &[
        Field {
            wire: "SharedEntityType",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetSharedEntitiesRequest| {
                Value::Text(r.shared_entity_type.as_str().to_string())
            },
        },
        Field {
            wire: "SharedEntityScope",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetSharedEntitiesRequest| Value::Text(r.scope.as_str().to_string()),
        },
    ],
};

pub(crate) static GET_SHARED_ENTITY_ASSOCIATIONS: Schema<
    GetSharedEntityAssociationsBySharedEntityIdsRequest,
> = Schema {
    element: "GetSharedEntityAssociationsBySharedEntityIdsRequest",
    namespace: Some(CAMPAIGN_MANAGEMENT_NS),
    discriminator: None,
    fields: &[
        Field {
            wire: "EntityType",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetSharedEntityAssociationsBySharedEntityIdsRequest| {
                Value::Text(r.entity_type.as_str().to_string())
            },
        },
        Field {
            wire: "SharedEntityIds",
            ns: Ns::Arrays,
            omit: Omit::IfEmpty,
            value: |r: &GetSharedEntityAssociationsBySharedEntityIdsRequest| {
                Value::Longs(r.shared_entity_ids.clone())
            },
        },
        Field {
            wire: "SharedEntityType",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetSharedEntityAssociationsBySharedEntityIdsRequest| {
                Value::Text(r.shared_entity_type.as_str().to_string())
            },
        },
        Field {
            wire: "SharedEntityScope",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &GetSharedEntityAssociationsBySharedEntityIdsRequest| {
                Value::Text(r.scope.as_str().to_string())
            },
        },
    ],
};

pub(crate) static ADD_LIST_ITEMS_TO_SHARED_LIST: Schema<AddListItemsToSharedListRequest> = Schema {
    element: "AddListItemsToSharedListRequest",
    namespace: Some(CAMPAIGN_MANAGEMENT_NS),
    discriminator: None,
    fields: &[
        Field {
            wire: "ListItems",
            ns: Ns::Inherit,
            omit: Omit::IfEmpty,
            value: |r: &AddListItemsToSharedListRequest| {
                Value::Records(r.list_items.iter().map(|i| SHARED_LIST_ITEM.encode(i)).collect())
            },
        },
        Field {
            wire: "SharedList",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &AddListItemsToSharedListRequest| {
                Value::Record(SHARED_LIST.encode(&r.shared_list))
            },
        },
        Field {
            wire: "SharedEntityScope",
            ns: Ns::Inherit,
            omit: Omit::Never,
            value: |r: &AddListItemsToSharedListRequest| Value::Text(r.scope.as_str().to_string()),
        },
    ],
};

pub(crate) static DELETE_LIST_ITEMS_FROM_SHARED_LIST: Schema<DeleteListItemsFromSharedListRequest> =
    Schema {
        element: "DeleteListItemsFromSharedListRequest",
        namespace: Some(CAMPAIGN_MANAGEMENT_NS),
        discriminator: None,
        fields: &[
            Field {
                wire: "ListItemIds",
                ns: Ns::Arrays,
                omit: Omit::IfEmpty,
                value: |r: &DeleteListItemsFromSharedListRequest| {
                    Value::Longs(r.list_item_ids.clone())
                },
            },
            Field {
                wire: "SharedList",
                ns: Ns::Inherit,
                omit: Omit::Never,
                value: |r: &DeleteListItemsFromSharedListRequest| {
                    Value::Record(SHARED_LIST.encode(&r.shared_list))
                },
            },
            Field {
                wire: "SharedEntityScope",
                ns: Ns::Inherit,
                omit: Omit::Never,
                value: |r: &DeleteListItemsFromSharedListRequest| {
                    Value::Text(r.scope.as_str().to_string())
                },
            },
        ],
    };

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MatchType, SharedEntityType};
    use crate::xml::Content;

    fn child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
        match &element.content {
            Content::Children(children) => children.iter().find(|c| c.name == name),
            Content::Text(_) => None,
        }
    }

    fn child_names(element: &Element) -> Vec<&str> {
        match &element.content {
            Content::Children(children) => children.iter().map(|c| c.name.as_str()).collect(),
            Content::Text(_) => Vec::new(),
        }
    }

    #[test]
    fn test_shared_list_always_has_id() {
        let element = SHARED_LIST.encode(&SharedEntity::default());
        assert_eq!(child_names(&element), vec!["Id"]);
        assert_eq!(child(&element, "Id").unwrap().content, Content::Text("0".to_string()));
        assert!(element.attributes.is_empty());
    }

    #[test]
    fn test_shared_list_discriminator_and_optional_fields() {
        let list = SharedEntity {
            id: 9,
            name: "Blocked sites".to_string(),
            entity_type: SharedEntityType::PlacementExclusionList.as_str().to_string(),
            forward_compatibility_map: vec![KeyValuePair::new("k", "v")],
            ..Default::default()
        };
        let element = SHARED_LIST.encode(&list);
        assert_eq!(
            element.attributes,
            vec![("i:type".to_string(), "PlacementExclusionList".to_string())]
        );
        assert_eq!(
            child_names(&element),
            vec!["ForwardCompatibilityMap", "Id", "Name"]
        );
        let map = child(&element, "ForwardCompatibilityMap").unwrap();
        assert_eq!(child_names(map), vec!["KeyValuePairOfstringstring"]);
    }

    #[test]
    fn test_item_fields_follow_variant() {
        let mut keyword = SharedListItem::negative_keyword("cheap", MatchType::Phrase);
        keyword.type_tag = "NegativeKeyword".to_string();
        assert_eq!(
            child_names(&SHARED_LIST_ITEM.encode(&keyword)),
            vec!["Type", "MatchType", "Text"]
        );

        let site = SharedListItem::negative_site("example.com");
        let element = SHARED_LIST_ITEM.encode(&site);
        assert_eq!(child_names(&element), vec!["Type", "Url"]);
        // Blank tag suppresses the discriminator.
        assert!(element.attributes.is_empty());

        let brand = SharedListItem::new(ListItem::BrandItem { id: 5, brand_id: 77 });
        assert_eq!(
            child_names(&SHARED_LIST_ITEM.encode(&brand)),
            vec!["Type", "Id", "BrandId"]
        );
    }

    #[test]
    fn test_empty_long_array_is_omitted() {
        let request = DeleteListItemsFromSharedListRequest {
            list_item_ids: Vec::new(),
            shared_list: SharedEntity::with_id(1),
            scope: crate::registry::EntityScope::Account,
        };
        let element = DELETE_LIST_ITEMS_FROM_SHARED_LIST.encode(&request);
        assert_eq!(child_names(&element), vec!["SharedList", "SharedEntityScope"]);
    }

    #[test]
    fn test_long_array_uses_arrays_namespace() {
        let request = DeleteListItemsFromSharedListRequest {
            list_item_ids: vec![10, 11],
            shared_list: SharedEntity::with_id(1),
            scope: crate::registry::EntityScope::Customer,
        };
        let element = DELETE_LIST_ITEMS_FROM_SHARED_LIST.encode(&request);
        let ids = child(&element, "ListItemIds").unwrap();
        assert_eq!(
            ids.attributes,
            vec![("xmlns:a1".to_string(), ARRAYS_NS.to_string())]
        );
        assert_eq!(child_names(ids), vec!["a1:long", "a1:long"]);
    }
}
