//! Bulletin board notifications: categories, payloads, the board and the
//! receiver contract.

pub mod board;
pub mod category;
pub mod item;
pub mod receiver;

pub use board::{Blackboard, BoardPhase, SharedBoard};
pub use category::Category;
pub use item::{BbItem, BbValue};
pub use receiver::NotificationReceiver;
