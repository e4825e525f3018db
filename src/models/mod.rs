mod entry;
mod populate;
mod schema;

pub use entry::*;
pub use populate::*;
pub use schema::*;
