pub mod entries;
pub mod slug;
