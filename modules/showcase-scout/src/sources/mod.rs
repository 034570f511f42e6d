pub mod linkedin;
pub mod serp;
pub mod youtube;

pub use linkedin::LinkedInApi;
pub use serp::{creator_from_post_url, SerpSearcher};
pub use youtube::YouTubeSearcher;
