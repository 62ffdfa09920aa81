mod memory;
mod post;

pub use memory::MemoryPostRepository;
pub use post::{PgPostRepository, PostRepository};
