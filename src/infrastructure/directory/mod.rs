//! Directory infrastructure - GitHub organization client

mod github;
mod pagination;

pub use github::{GithubClientConfig, GithubDirectoryClient};
pub use pagination::next_link;
