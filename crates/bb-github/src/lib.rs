mod client;
mod link;
mod pulls;

pub use crate::client::GithubClient;
pub use crate::link::next_page;
