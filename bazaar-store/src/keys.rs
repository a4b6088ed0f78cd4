//! Collection keys. User-scoped collections are suffixed with the user id.

pub const PRODUCTS: &str = "products";
pub const BARGAINS: &str = "bargains";
pub const USERS: &str = "users";

pub fn cart(user_id: &str) -> String {
    format!("cart_{}", user_id)
}

pub fn orders(user_id: &str) -> String {
    format!("orders_{}", user_id)
}

pub fn notifications(user_id: &str) -> String {
    format!("notifications_{}", user_id)
}

pub fn view_history(user_id: &str) -> String {
    format!("view_history_{}", user_id)
}
