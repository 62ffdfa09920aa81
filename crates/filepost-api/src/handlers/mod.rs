pub mod post_delete;
pub mod post_upload;
pub mod posts_list;
