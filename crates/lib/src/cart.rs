//! Shopping cart kept by the storefront client.
//!
//! Lines are keyed by product id and selected size, so the same product in
//! two sizes occupies two lines. Quantities never exceed the stock recorded
//! on the line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;

/// Errors raised by cart operations.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product has no stock at all.
    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: i64 },

    /// The requested quantity would exceed the available stock.
    #[error("Not enough stock for product {product_id}: {available} available, {in_cart} already in cart")]
    InsufficientStock {
        product_id: i64,
        available: u32,
        in_cart: u32,
    },
}

impl CartError {
    /// The product the error is about.
    pub fn product_id(&self) -> i64 {
        match self {
            CartError::OutOfStock { product_id }
            | CartError::InsufficientStock { product_id, .. } => *product_id,
        }
    }
}

impl From<CartError> for crate::Error {
    fn from(err: CartError) -> Self {
        crate::Error::Cart(err)
    }
}

fn one() -> u32 {
    1
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
}

impl CartItem {
    /// A line for `quantity` units of a catalog product.
    pub fn from_product(product: &Product, size: Option<&str>, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            size: size.map(str::to_string),
            quantity,
        }
    }

    fn is(&self, product_id: i64, size: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size
    }

    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// The cart contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: i64, size: Option<&str>) -> Option<&CartItem> {
        self.items.iter().find(|line| line.is(product_id, size))
    }

    /// Add a product, merging with an existing line of the same size.
    ///
    /// A quantity of 0 counts as 1. On error the cart is unchanged.
    pub fn add(&mut self, mut item: CartItem) -> Result<(), CartError> {
        if item.stock == 0 {
            return Err(CartError::OutOfStock {
                product_id: item.product_id,
            });
        }
        item.quantity = item.quantity.max(1);

        let size = item.size.clone();
        match self
            .items
            .iter_mut()
            .find(|line| line.is(item.product_id, size.as_deref()))
        {
            Some(line) => {
                let total = line.quantity.saturating_add(item.quantity);
                if total > item.stock {
                    return Err(CartError::InsufficientStock {
                        product_id: item.product_id,
                        available: item.stock,
                        in_cart: line.quantity,
                    });
                }
                line.quantity = total;
            }
            None => {
                if item.quantity > item.stock {
                    return Err(CartError::InsufficientStock {
                        product_id: item.product_id,
                        available: item.stock,
                        in_cart: 0,
                    });
                }
                self.items.push(item);
            }
        }
        Ok(())
    }

    /// Drop a line entirely. Unknown lines are ignored.
    pub fn remove(&mut self, product_id: i64, size: Option<&str>) {
        self.items.retain(|line| !line.is(product_id, size));
    }

    /// One more unit of a line, up to its stock. Unknown lines are ignored.
    pub fn increase(&mut self, product_id: i64, size: Option<&str>) -> Result<(), CartError> {
        if let Some(line) = self.items.iter_mut().find(|line| line.is(product_id, size)) {
            if line.quantity >= line.stock {
                return Err(CartError::InsufficientStock {
                    product_id,
                    available: line.stock,
                    in_cart: line.quantity,
                });
            }
            line.quantity += 1;
        }
        Ok(())
    }

    /// One less unit of a line; the line goes away when it reaches zero.
    pub fn decrease(&mut self, product_id: i64, size: Option<&str>) {
        for line in self.items.iter_mut().filter(|line| line.is(product_id, size)) {
            line.quantity = line.quantity.saturating_sub(1);
        }
        self.items.retain(|line| line.quantity > 0);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Units across all lines.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Serialize for client-side storage.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a stored cart. Anything unreadable yields an empty cart.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored cart");
                Self::new()
            }
        }
    }
}
