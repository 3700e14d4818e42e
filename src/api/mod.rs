//! Typed helpers for back-office endpoints that are not plain CRUD.

pub mod channels;
pub mod models;
pub mod promo_cats;
pub mod users;

pub use channels::{ChannelQuery, ChannelsApi};
pub use promo_cats::PromoCatsApi;
pub use users::UsersApi;
