pub mod cart;
pub mod checkout;
pub mod models;
pub mod notifications;

pub use cart::{CartError, CartLine, CartService};
pub use checkout::{CheckoutError, CheckoutService};
pub use models::{CartItem, Notification, NotificationKind, Order, OrderItem, OrderStatus};
pub use notifications::NotificationService;
