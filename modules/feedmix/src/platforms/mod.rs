pub mod instagram;
pub mod twitter;
pub mod youtube;

pub use instagram::InstagramOEmbed;
pub use twitter::{TwitterCredentials, TwitterTimeline};
pub use youtube::{YoutubeChannel, YoutubePlaylist};
