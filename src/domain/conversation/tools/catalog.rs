//! The fixed tool catalog.
//!
//! Each tool wraps exactly one commerce or knowledge operation. Names are
//! shared between the registry (schemas bound to the model) and the
//! executor (dispatch), so they live here as constants.

use serde_json::json;

use super::{ToolDefinition, ToolRegistry};

/// Tool name constants.
pub mod names {
    // catalog
    pub const SEARCH_PRODUCTS: &str = "search_products";
    pub const GET_PRODUCTS: &str = "get_products";
    pub const GET_PRODUCT_DETAILS: &str = "get_product_details";
    pub const GET_PRODUCT_CATEGORIES: &str = "get_product_categories";
    pub const GET_PRODUCTS_BY_CATEGORY: &str = "get_products_by_category";
    pub const GET_FEATURED_PRODUCTS: &str = "get_featured_products";
    pub const GET_PRICE_RANGE: &str = "get_price_range";
    pub const GET_LOW_STOCK_PRODUCTS: &str = "get_low_stock_products";

    // cart
    pub const ADD_TO_CART: &str = "add_to_cart";
    pub const GET_CART_SUMMARY: &str = "get_cart_summary";
    pub const GET_CART_ITEMS: &str = "get_cart_items";
    pub const REMOVE_FROM_CART: &str = "remove_from_cart";
    pub const SET_CART_QUANTITY: &str = "set_cart_quantity";
    pub const INCREASE_QUANTITY: &str = "increase_quantity";
    pub const DECREASE_QUANTITY: &str = "decrease_quantity";
    pub const EMPTY_CART: &str = "empty_cart";
    pub const UPDATE_QUANTITY_BY_PRODUCT: &str = "update_cart_quantity_by_product";

    // orders
    pub const GET_ORDERS: &str = "get_orders";
    pub const GET_ORDER_DETAILS: &str = "get_order_details";
    pub const TRACK_ORDER: &str = "track_order";
    pub const CANCEL_ORDER: &str = "cancel_order";
    pub const CREATE_ORDER: &str = "create_order";

    // shipping
    pub const GET_SHIPPING_ADDRESSES: &str = "get_shipping_addresses";
    pub const ADD_SHIPPING_ADDRESS: &str = "add_shipping_address";

    // coupons
    pub const VALIDATE_COUPON: &str = "validate_coupon";
    pub const GET_AVAILABLE_COUPONS: &str = "get_available_coupons";

    // knowledge
    pub const SEARCH_KNOWLEDGE_BASE: &str = "search_knowledge_base";
    pub const GET_PRODUCT_INFORMATION: &str = "get_product_information";
}

/// Tools whose raw output the reasoning loop captures for the empty-cart
/// hallucination guard.
const CART_TOOLS: [&str; 9] = [
    names::ADD_TO_CART,
    names::GET_CART_SUMMARY,
    names::GET_CART_ITEMS,
    names::REMOVE_FROM_CART,
    names::SET_CART_QUANTITY,
    names::INCREASE_QUANTITY,
    names::DECREASE_QUANTITY,
    names::EMPTY_CART,
    names::UPDATE_QUANTITY_BY_PRODUCT,
];

/// True for tools that touch cart contents; their output feeds the
/// empty-cart hallucination guard.
pub fn is_cart_tool(name: &str) -> bool {
    CART_TOOLS.contains(&name)
}

fn limit_property() -> serde_json::Value {
    json!({"type": "integer", "minimum": 1, "description": "Maximum results to return"})
}

/// Builds the complete tool catalog.
pub fn default_catalog() -> ToolRegistry {
    let tools = vec![
        // --- catalog ---
        ToolDefinition::new(
            names::SEARCH_PRODUCTS,
            "Search products by name or description.",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {"type": "string", "description": "Search terms"},
                    "limit": limit_property(),
                }
            }),
        ),
        ToolDefinition::new(
            names::GET_PRODUCTS,
            "Get products with optional filtering and sorting. sort_by options: \
             price_asc, price_desc, name_asc, rating_desc",
            json!({
                "type": "object",
                "properties": {
                    "limit": limit_property(),
                    "category": {"type": "string"},
                    "min_price": {"type": "number"},
                    "max_price": {"type": "number"},
                    "sort_by": {
                        "type": "string",
                        "enum": ["price_asc", "price_desc", "name_asc", "rating_desc"]
                    },
                }
            }),
        ),
        ToolDefinition::new(
            names::GET_PRODUCT_DETAILS,
            "Get detailed information about a specific product by its ID.",
            json!({
                "type": "object",
                "required": ["product_id"],
                "properties": {"product_id": {"type": "string"}}
            }),
        ),
        ToolDefinition::no_args(
            names::GET_PRODUCT_CATEGORIES,
            "Get all available product categories in the store.",
        ),
        ToolDefinition::new(
            names::GET_PRODUCTS_BY_CATEGORY,
            "Get products in a specific category.",
            json!({
                "type": "object",
                "required": ["category"],
                "properties": {
                    "category": {"type": "string"},
                    "limit": limit_property(),
                }
            }),
        ),
        ToolDefinition::new(
            names::GET_FEATURED_PRODUCTS,
            "Get featured products (highest rated).",
            json!({
                "type": "object",
                "properties": {"limit": limit_property()}
            }),
        ),
        ToolDefinition::no_args(
            names::GET_PRICE_RANGE,
            "Get the price range information for all products in the store.",
        ),
        ToolDefinition::new(
            names::GET_LOW_STOCK_PRODUCTS,
            "Get products with low stock (useful for inventory questions).",
            json!({
                "type": "object",
                "properties": {"threshold": {"type": "integer", "minimum": 0}}
            }),
        ),
        // --- cart ---
        ToolDefinition::new(
            names::ADD_TO_CART,
            "Add a product to the user's cart. Requires the user to be logged in.",
            json!({
                "type": "object",
                "required": ["product_id"],
                "properties": {
                    "product_id": {"type": "string"},
                    "quantity": {"type": "integer", "minimum": 1, "default": 1},
                }
            }),
        ),
        ToolDefinition::no_args(
            names::GET_CART_SUMMARY,
            "Get the user's cart summary including total items and price. \
             Requires the user to be logged in.",
        ),
        ToolDefinition::no_args(
            names::GET_CART_ITEMS,
            "Get the detailed list of items in the user's cart with their cart item ids. \
             Useful for finding specific items to modify. Requires the user to be logged in.",
        ),
        ToolDefinition::new(
            names::REMOVE_FROM_CART,
            "Remove a single item from the cart by its cart_item_id.",
            json!({
                "type": "object",
                "required": ["cart_item_id"],
                "properties": {"cart_item_id": {"type": "string"}}
            }),
        ),
        ToolDefinition::new(
            names::SET_CART_QUANTITY,
            "Set the quantity of a cart item to a specific number.",
            json!({
                "type": "object",
                "required": ["cart_item_id", "quantity"],
                "properties": {
                    "cart_item_id": {"type": "string"},
                    "quantity": {"type": "integer", "minimum": 1},
                }
            }),
        ),
        ToolDefinition::new(
            names::INCREASE_QUANTITY,
            "Increase the quantity of a cart item by 1.",
            json!({
                "type": "object",
                "required": ["cart_item_id"],
                "properties": {"cart_item_id": {"type": "string"}}
            }),
        ),
        ToolDefinition::new(
            names::DECREASE_QUANTITY,
            "Decrease the quantity of a cart item by 1. At zero the item is removed.",
            json!({
                "type": "object",
                "required": ["cart_item_id"],
                "properties": {"cart_item_id": {"type": "string"}}
            }),
        ),
        ToolDefinition::no_args(
            names::EMPTY_CART,
            "Remove all items from the user's cart. Also handles 'flush', 'clear' and \
             'empty' commands. Requires the user to be logged in.",
        ),
        ToolDefinition::new(
            names::UPDATE_QUANTITY_BY_PRODUCT,
            "Update the quantity of a cart item by searching for it by product name. \
             More user-friendly than using cart_item_id. Requires the user to be logged in.",
            json!({
                "type": "object",
                "required": ["product_name", "quantity"],
                "properties": {
                    "product_name": {"type": "string"},
                    "quantity": {"type": "integer", "minimum": 1},
                }
            }),
        ),
        // --- orders ---
        ToolDefinition::no_args(
            names::GET_ORDERS,
            "Get all orders for the current user. Requires the user to be logged in.",
        ),
        ToolDefinition::new(
            names::GET_ORDER_DETAILS,
            "Get detailed information about a specific order by order id.",
            json!({
                "type": "object",
                "required": ["order_id"],
                "properties": {"order_id": {"type": "string"}}
            }),
        ),
        ToolDefinition::new(
            names::TRACK_ORDER,
            "Track an order by order number or tracking number. \
             User-friendly way to look up orders.",
            json!({
                "type": "object",
                "required": ["order_number"],
                "properties": {"order_number": {"type": "string"}}
            }),
        ),
        ToolDefinition::new(
            names::CANCEL_ORDER,
            "Cancel an order if it's still eligible for cancellation.",
            json!({
                "type": "object",
                "required": ["order_id"],
                "properties": {"order_id": {"type": "string"}}
            }),
        ),
        ToolDefinition::new(
            names::CREATE_ORDER,
            "Create a new order from the user's cart items with an optional coupon code. \
             Requires the user to be logged in.",
            json!({
                "type": "object",
                "required": ["full_name", "address", "city", "postal_code"],
                "properties": {
                    "full_name": {"type": "string"},
                    "address": {"type": "string"},
                    "city": {"type": "string"},
                    "postal_code": {"type": "string"},
                    "country": {"type": "string", "default": "Pakistan"},
                    "coupon_code": {"type": "string"},
                }
            }),
        ),
        // --- shipping ---
        ToolDefinition::no_args(
            names::GET_SHIPPING_ADDRESSES,
            "Get all shipping addresses for the user. Requires the user to be logged in.",
        ),
        ToolDefinition::new(
            names::ADD_SHIPPING_ADDRESS,
            "Add a new shipping address for the user. Requires the user to be logged in.",
            json!({
                "type": "object",
                "required": ["full_name", "address", "city", "postal_code"],
                "properties": {
                    "full_name": {"type": "string"},
                    "address": {"type": "string"},
                    "city": {"type": "string"},
                    "postal_code": {"type": "string"},
                    "country": {"type": "string", "default": "Pakistan"},
                }
            }),
        ),
        // --- coupons ---
        ToolDefinition::new(
            names::VALIDATE_COUPON,
            "Validate a coupon code and calculate the discount for the given cart total. \
             Requires the user to be logged in.",
            json!({
                "type": "object",
                "required": ["coupon_code", "cart_total"],
                "properties": {
                    "coupon_code": {"type": "string"},
                    "cart_total": {"type": "number", "minimum": 0},
                }
            }),
        ),
        ToolDefinition::no_args(
            names::GET_AVAILABLE_COUPONS,
            "Get all active and valid coupon codes that users can apply.",
        ),
        // --- knowledge ---
        ToolDefinition::new(
            names::SEARCH_KNOWLEDGE_BASE,
            "Search the knowledge base for information about products, policies, \
             shipping, returns, etc.",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {"query": {"type": "string"}}
            }),
        ),
        ToolDefinition::new(
            names::GET_PRODUCT_INFORMATION,
            "Get detailed information about products, features, specifications, \
             or general product inquiries.",
            json!({
                "type": "object",
                "required": ["product_query"],
                "properties": {"product_query": {"type": "string"}}
            }),
        ),
    ];

    ToolRegistry::new(tools)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_expected_size() {
        let registry = default_catalog();
        assert_eq!(registry.tool_count(), 28);
    }

    #[test]
    fn catalog_names_are_unique() {
        let registry = default_catalog();
        let mut names = registry.tool_names();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn cart_tools_are_all_registered() {
        let registry = default_catalog();
        for name in CART_TOOLS {
            assert!(registry.has_tool(name), "{name} missing from catalog");
        }
    }

    #[test]
    fn openai_schema_covers_whole_catalog() {
        let registry = default_catalog();
        let tools = registry.to_openai_tools();
        assert_eq!(tools.len(), registry.tool_count());
        for tool in tools {
            assert_eq!(tool["type"], "function");
            assert!(tool["function"]["name"].is_string());
            assert!(tool["function"]["parameters"].is_object());
        }
    }
}
