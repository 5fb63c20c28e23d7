//! Value records exchanged with the shared-list operations.

use crate::error::Result;
use crate::registry::{EntityType, MatchType, SharedEntityType, SharedListItemType};
use serde::{Deserialize, Serialize};

/// Entry of a forward-compatibility map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A shared entity (negative keyword list, placement exclusion list, ...).
///
/// The concrete kinds differ only in `entity_type`, which travels as the
/// element's `i:type` attribute. An empty tag means "not discriminated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedEntity {
    pub id: i64,
    pub name: String,
    pub association_count: i32,
    pub item_count: i32,
    pub forward_compatibility_map: Vec<KeyValuePair>,
    pub entity_type: String,
}

/// Shared lists are shared entities; the record is the same.
pub type SharedList = SharedEntity;

impl SharedEntity {
    /// A record addressing an existing list by id.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Resolve the kind tag against the registry.
    pub fn kind(&self) -> Result<SharedEntityType> {
        self.entity_type.parse()
    }
}

/// Fields specific to each kind of shared list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListItem {
    NegativeKeyword {
        id: i64,
        match_type: Option<MatchType>,
        text: String,
    },
    NegativeSite {
        id: i64,
        url: String,
    },
    BrandItem {
        id: i64,
        brand_id: i64,
    },
}

impl ListItem {
    pub fn item_type(&self) -> SharedListItemType {
        match self {
            Self::NegativeKeyword { .. } => SharedListItemType::NegativeKeyword,
            Self::NegativeSite { .. } => SharedListItemType::NegativeSite,
            Self::BrandItem { .. } => SharedListItemType::BrandItem,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::NegativeKeyword { id, .. }
            | Self::NegativeSite { id, .. }
            | Self::BrandItem { id, .. } => *id,
        }
    }
}

/// An item of a shared list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedListItem {
    pub item: ListItem,
    pub forward_compatibility_map: Vec<KeyValuePair>,
    /// Discriminator written as `i:type`. Request builders fill it from
    /// `item` when left empty.
    pub type_tag: String,
}

impl SharedListItem {
    pub fn new(item: ListItem) -> Self {
        Self {
            item,
            forward_compatibility_map: Vec::new(),
            type_tag: String::new(),
        }
    }

    pub fn negative_keyword(text: impl Into<String>, match_type: MatchType) -> Self {
        Self::new(ListItem::NegativeKeyword {
            id: 0,
            match_type: Some(match_type),
            text: text.into(),
        })
    }

    pub fn negative_site(url: impl Into<String>) -> Self {
        Self::new(ListItem::NegativeSite {
            id: 0,
            url: url.into(),
        })
    }

    pub fn brand_item(brand_id: i64) -> Self {
        Self::new(ListItem::BrandItem { id: 0, brand_id })
    }

    pub fn item_type(&self) -> SharedListItemType {
        self.item.item_type()
    }
}

/// Per-item failure of a batch call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    pub code: i32,
    /// Position of the failed item in the request
    pub index: i32,
    pub error_code: String,
    pub message: String,
    pub details: Option<String>,
    pub field_path: Option<String>,
    pub error_type: String,
    pub forward_compatibility_map: Vec<KeyValuePair>,
}

/// Link between a shared entity and a campaign or account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedEntityAssociation {
    pub entity_id: i64,
    pub entity_type: EntityType,
    pub shared_entity_customer_id: Option<i64>,
    pub shared_entity_id: i64,
    pub shared_entity_type: SharedEntityType,
}
