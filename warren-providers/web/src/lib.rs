//! Web providers backed by the platform's public pages: the watch-page
//! recommendation source, the oEmbed identity resolver, and the uploads
//! listing used for channel-seeded explorations.

mod client;
mod errors;
mod resolver;
mod source;
mod uploads;

pub use client::{WebClient, WebClientConfig};
pub use errors::WebProviderError;
pub use resolver::OembedResolver;
pub use source::WatchPageSource;
pub use uploads::UploadsLister;
