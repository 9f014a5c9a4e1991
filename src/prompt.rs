//! Prompt assembly: system prompt and conversation messages.
//!
//! DESIGN
//! ======
//! Pure string building over the catalog, the shopper's cart, and stored
//! history. Catalog and cart records come from the storefront frontend and
//! a static JSON file, so every field is optional and numbers may arrive as
//! strings; rendering never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::{ChatTurn, Role};
use crate::llm::types::Message;

// =============================================================================
// CATALOG / CART TYPES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub title: Option<Value>,
    /// Original price.
    pub price: Option<Value>,
    /// Selling price after discount.
    pub discount: Option<Value>,
    pub stok: Option<Value>,
    pub description: Option<Value>,
    /// Colour variants, normally `[{"name": ...}]`.
    pub styles: Option<Value>,
    pub image: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItem {
    pub name: Option<Value>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
}

/// Render a loosely-typed JSON scalar for prompt text.
fn scalar(value: Option<&Value>) -> String {
    text(value).unwrap_or_else(|| "-".to_string())
}

/// Non-blank text of a JSON value; `None` for null, missing, or blank.
fn text(value: Option<&Value>) -> Option<String> {
    let rendered = match value? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!rendered.trim().is_empty()).then_some(rendered)
}

fn style_names(styles: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = styles else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|style| match style {
            Value::Object(_) => text(style.get("name")),
            other => text(Some(other)),
        })
        .collect()
}

// =============================================================================
// SYSTEM PROMPT
// =============================================================================

const CART_ACTIONS: &str = r#"3. **Cart actions:** when the shopper wants to change their cart, include exactly one JSON block:
   * Add a product:
     ```json
     {"action": "addToCart", "productName": "Product Name", "price": Price, "quantity": Quantity, "image": "[original_image_url]", "warna": "Colour", "ukuran": "Size", "berat": Weight}
     ```
   * Remove a product:
     ```json
     {"action": "removeFromCart", "productName": "Product Name"}
     ```
   * Change a quantity:
     ```json
     {"action": "updateCartQuantity", "productName": "Product Name", "quantity": NewQuantity}
     ```
   * Empty the cart:
     ```json
     {"action": "emptyCart"}
     ```
   * Show the cart (also describe its contents in prose):
     ```json
     {"action": "viewCart"}
     ```
   * Go to checkout, only after the shopper confirms:
     ```json
     {"action": "checkout", "redirectUrl": "/checkout"}
     ```"#;

fn render_product(p: &Product) -> String {
    let selling = scalar(p.discount.as_ref().or(p.price.as_ref()));
    let original = match (&p.price, &p.discount) {
        (Some(price), Some(discount)) if price != discount && !price.is_null() => {
            format!(" (original price: Rp {})", scalar(Some(price)))
        }
        _ => String::new(),
    };
    let description = text(p.description.as_ref()).unwrap_or_else(|| "No description.".to_string());
    let styles = style_names(p.styles.as_ref());
    let styles = if styles.is_empty() { "None".to_string() } else { styles.join(", ") };

    format!(
        "- Name: {}\n  Price: Rp {selling}{original}\n  Stock: {}\n  Description: {description}\n  Colour variants: {styles}\n  Image: {}",
        scalar(p.title.as_ref()),
        scalar(p.stok.as_ref()),
        scalar(p.image.as_ref()),
    )
}

fn render_cart(cart: &[CartItem]) -> String {
    if cart.is_empty() {
        return "The cart is empty.".to_string();
    }
    cart.iter()
        .map(|item| {
            format!(
                "- {} (Qty: {}, Price: {})",
                scalar(item.name.as_ref()),
                scalar(item.quantity.as_ref()),
                scalar(item.price.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system prompt describing the store, its catalog, and the cart.
#[must_use]
pub fn build_system_prompt(store_name: &str, products: &[Product], cart: &[CartItem]) -> String {
    let catalog = if products.is_empty() {
        "(The catalog is currently unavailable.)".to_string()
    } else {
        products
            .iter()
            .map(render_product)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "You are the AI assistant of the online store \"{store_name}\". You help shoppers with product questions, \
shopping, managing their cart, and checking out.

Products available in the store:
{catalog}

Current shopping cart:
{cart}

Instructions:
1. **Greet and help:** always greet the shopper warmly and ask how you can help.
2. **Product information:** answer only from the product list above.
   * When quoting a price, lead with the discounted price, for example \"only Rp 15.600!\".
   * Describe stock as \"available\", \"out of stock\", or \"limited stock\"; never print \"undefined\".
   * When asked for specific details, describe the product fully in prose.
{CART_ACTIONS}
4. **Other questions:** answer briefly or point the shopper to the help page.
   * Do not append a stray JSON string at the end of your reply.",
        cart = render_cart(cart),
    )
}

// =============================================================================
// CONVERSATION
// =============================================================================

/// Stored user turns that were a product-detail click are replaced with a
/// readable sentence before being sent upstream.
fn readable_user_text(text: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(text) else {
        return text.to_string();
    };
    if parsed.get("type").and_then(Value::as_str) != Some("product_detail") {
        return text.to_string();
    }
    match parsed
        .get("data")
        .and_then(|d| d.get("title"))
        .and_then(Value::as_str)
    {
        Some(title) if !title.is_empty() => format!("User asked for product details: {title}"),
        _ => text.to_string(),
    }
}

/// Map stored history plus the new turn to upstream chat messages.
///
/// Truncation can leave an `ai` turn at the front of stored history; those
/// are skipped because the conversation must open with a user message. The
/// new turn is `structured_input` serialised as JSON when present, otherwise
/// the plain `message`.
#[must_use]
pub fn build_conversation(history: &[ChatTurn], message: &str, structured_input: Option<&Value>) -> Vec<Message> {
    let mut out: Vec<Message> = history
        .iter()
        .skip_while(|turn| turn.role == Role::Ai)
        .map(|turn| match turn.role {
            Role::User => Message::user(readable_user_text(&turn.text)),
            Role::Ai => Message::assistant(turn.text.clone()),
        })
        .collect();

    let latest = match structured_input {
        Some(value) if !value.is_null() => value.to_string(),
        _ => message.to_string(),
    };
    out.push(Message::user(latest));
    out
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
