//! Domain values, database rows and request/response bodies.

pub mod member;
pub mod movie;
pub mod post;
pub mod tag;

pub use member::{CreateMember, Member};
pub use movie::{
    BoxOfficeEntry, KobisBoxOfficeItem, KobisMovieInfo, MovieDetail, MovieListResponse,
};
pub use post::{
    CreatePostRequest, NewPost, Post, PostInfo, PostList, PostWithTags, UpdatePostRequest,
};
pub use tag::{normalize_tag_names, Tag};
