//! Value types shared by the ordering core, the backends and the REST API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::OrderError;

/// Storage-assigned identifier of an item within its collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ItemId)
    }
}

/// Identity of a manually ordered collection.
///
/// Every collection is ordered independently; an item's `order` is only
/// meaningful relative to other items of the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Homepage carousel slides
    Carousel,
    /// Featured products shown on the homepage
    Products,
}

impl Scope {
    /// All scopes, in the order they appear on the homepage.
    pub const ALL: [Scope; 2] = [Scope::Carousel, Scope::Products];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Carousel => "carousel",
            Scope::Products => "products",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carousel" => Ok(Scope::Carousel),
            "products" => Ok(Scope::Products),
            other => Err(OrderError::UnknownScope {
                name: other.to_string(),
            }),
        }
    }
}

/// Content carried by an item. Opaque to the ordering algorithm.
///
/// Serialized untagged so the wire form is the flat object the storefront uses:
/// a featured product is recognised by its `product_id`, anything else is a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Link to a catalog product
    Product { product_id: i64 },
    /// Carousel slide with desktop and mobile image references
    Slide {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        image_mobile_url: Option<String>,
    },
}

impl Payload {
    /// The collection this kind of payload belongs to.
    pub fn scope(&self) -> Scope {
        match self {
            Payload::Product { .. } => Scope::Products,
            Payload::Slide { .. } => Scope::Carousel,
        }
    }

    /// Shorthand for a slide payload.
    pub fn slide(
        title: impl Into<String>,
        image_url: Option<&str>,
        image_mobile_url: Option<&str>,
    ) -> Self {
        Payload::Slide {
            title: Some(title.into()),
            image_url: image_url.map(str::to_string),
            image_mobile_url: image_mobile_url.map(str::to_string),
        }
    }

    /// Shorthand for a featured product payload.
    pub fn product(product_id: i64) -> Self {
        Payload::Product { product_id }
    }
}

fn default_active() -> bool {
    true
}

/// One sortable row: a carousel slide or a featured-product link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: ItemId,
    /// Display position, 1-based
    pub order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl OrderedItem {
    pub fn new(id: impl Into<ItemId>, order: u32, payload: Payload) -> Self {
        Self {
            id: id.into(),
            order,
            active: true,
            payload,
        }
    }

    /// The `{id, order}` pair persisted by bulk updates.
    pub fn update(&self) -> OrderUpdate {
        OrderUpdate {
            id: self.id,
            order: self.order,
        }
    }
}

/// The unit of a bulk order update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: ItemId,
    pub order: u32,
}

impl OrderUpdate {
    pub fn new(id: impl Into<ItemId>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }
}

/// Request to create an item.
///
/// `order` of `None` or `Some(0)` means "append": storage assigns
/// [`next_order`](super::next_order) of the current collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl NewItem {
    pub fn new(payload: Payload) -> Self {
        Self {
            order: None,
            payload,
        }
    }

    pub fn at(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// The explicit position requested, if any.
    pub fn requested_order(&self) -> Option<u32> {
        self.order.filter(|order| *order > 0)
    }
}

/// Partial edit of a stored item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_mobile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.order.is_none()
            && self.title.is_none()
            && self.image_url.is_none()
            && self.image_mobile_url.is_none()
            && self.product_id.is_none()
    }
}

/// Image reference of a slide that can be cleared without deleting the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageField {
    ImageUrl,
    ImageMobileUrl,
}

impl ImageField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageField::ImageUrl => "image_url",
            ImageField::ImageMobileUrl => "image_mobile_url",
        }
    }
}
