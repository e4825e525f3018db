pub mod entries;
pub mod lifecycle;
pub mod lookup;
pub mod patterns;
pub mod populate;
pub mod slug;
