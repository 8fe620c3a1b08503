pub mod postgres;
pub mod repository;

pub use postgres::{create_pool, run_migrations};
pub use repository::{MemberRepository, PgStore, PostRepository};
