pub mod members;
pub mod movies;
pub mod posts;
pub mod providers;
pub mod storage;

pub use members::MemberService;
pub use movies::MovieService;
pub use posts::PostService;
