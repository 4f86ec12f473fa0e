pub mod inventory_transaction;
pub mod item;
pub mod purchase_order;
pub mod purchase_order_line;
pub mod stock_level;
pub mod storage_location;
pub mod supplier;

pub use inventory_transaction::TransactionType;
pub use purchase_order::PurchaseOrderStatus;
