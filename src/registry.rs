//! Closed sets of wire tags.
//!
//! Every polymorphic value on the wire is discriminated by a string tag. Each
//! family below maps its variants to those tags and back; an unknown tag is an
//! [`ClientError::UnsupportedVariant`].

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! wire_tags {
    (
        $(#[$meta:meta])*
        $name:ident, $family:literal {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $tag)] $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Wire tag for this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ClientError;

            fn from_str(tag: &str) -> Result<Self, Self::Err> {
                match tag {
                    $($tag => Ok($name::$variant),)+
                    other => Err(ClientError::unsupported($family, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_tags! {
    /// Concrete kinds of shared entity. All share one record shape.
    SharedEntityType, "shared entity type" {
        NegativeKeywordList => "NegativeKeywordList",
        PlacementExclusionList => "PlacementExclusionList",
        AccountNegativeKeywordList => "AccountNegativeKeywordList",
        BrandList => "BrandList",
        AccountPlacementExclusionList => "AccountPlacementExclusionList",
        AccountPlacementInclusionList => "AccountPlacementInclusionList",
    }
}

wire_tags! {
    /// Kinds of shared list item.
    SharedListItemType, "shared list item type" {
        NegativeKeyword => "NegativeKeyword",
        NegativeSite => "NegativeSite",
        BrandItem => "BrandItem",
    }
}

wire_tags! {
    /// Ownership scope of a shared entity.
    EntityScope, "entity scope" {
        Account => "Account",
        Customer => "Customer",
    }
}

wire_tags! {
    /// Entity a shared list can be associated with.
    EntityType, "entity type" {
        Campaign => "Campaign",
        Account => "Account",
    }
}

wire_tags! {
    /// Keyword match type.
    MatchType, "match type" {
        Exact => "Exact",
        Phrase => "Phrase",
        Broad => "Broad",
    }
}

wire_tags! {
    /// The operations this client can call. The tag is the `SOAPAction`.
    SoapAction, "SOAP action" {
        GetListItemsBySharedList => "GetListItemsBySharedList",
        GetSharedEntities => "GetSharedEntities",
        GetSharedEntityAssociationsBySharedEntityIds => "GetSharedEntityAssociationsBySharedEntityIds",
        AddListItemsToSharedList => "AddListItemsToSharedList",
        DeleteListItemsFromSharedList => "DeleteListItemsFromSharedList",
    }
}

impl SoapAction {
    /// Name of the operation element in a request body.
    pub fn request_element(&self) -> &'static str {
        match self {
            Self::GetListItemsBySharedList => "GetListItemsBySharedListRequest",
            Self::GetSharedEntities => "GetSharedEntitiesRequest",
            Self::GetSharedEntityAssociationsBySharedEntityIds => {
                "GetSharedEntityAssociationsBySharedEntityIdsRequest"
            }
            Self::AddListItemsToSharedList => "AddListItemsToSharedListRequest",
            Self::DeleteListItemsFromSharedList => "DeleteListItemsFromSharedListRequest",
        }
    }

    /// Name of the payload element in a response body.
    pub fn response_element(&self) -> &'static str {
        match self {
            Self::GetListItemsBySharedList => "GetListItemsBySharedListResponse",
            Self::GetSharedEntities => "GetSharedEntitiesResponse",
            Self::GetSharedEntityAssociationsBySharedEntityIds => {
                "GetSharedEntityAssociationsBySharedEntityIdsResponse"
            }
            Self::AddListItemsToSharedList => "AddListItemsToSharedListResponse",
            Self::DeleteListItemsFromSharedList => "DeleteListItemsFromSharedListResponse",
        }
    }
}
