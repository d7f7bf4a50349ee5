//! Row models for the server database.

pub mod address;
pub mod order;
pub mod partner;
pub mod payment;
pub mod tracking;
pub mod user;

pub use address::Address;
pub use order::{Order, OrderLog};
pub use partner::CourierPartner;
pub use payment::Payment;
pub use tracking::TrackingRow;
pub use user::User;
