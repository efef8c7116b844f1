//! Build, share and validate [Google Analytics 4 Measurement Protocol] events.
//!
//! [Google Analytics 4 Measurement Protocol]: https://developers.google.com/analytics/devguides/collection/protocol/ga4
//!
//! # Usage
//!
//! Build an event. Events are immutable values; every update returns a new event:
//!
//! ```
//! use ga4_event_builder::{MpEvent, MpEventType};
//!
//! let event = MpEvent::empty(MpEventType::AddToCart)
//!     .update_parameter("currency", "USD")?
//!     .update_parameter("value", 7.99)?;
//! assert_eq!("add_to_cart", event.get_event_name());
//! # Ok::<(), ga4_event_builder::Error>(())
//! ```
//!
//! Validate it against the debug endpoint, then send it:
//!
//! ```no_run
//! # #[cfg(feature = "reqwest-client")]
//! # async fn run(event: ga4_event_builder::MpEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! use ga4_event_builder::{new_client_from_connection_string, ClientIds};
//!
//! let client = new_client_from_connection_string(
//!     "MeasurementId=G-XXXXXXXX;ApiSecret=...",
//!     reqwest::Client::new(),
//! )?;
//! let ids = ClientIds::Web {
//!     client_id: Some("123.456".into()),
//!     user_id: None,
//! };
//! let messages = client.validate_hit(&ids, &[event.clone()], &[]).await?;
//! if messages.is_empty() {
//!     client.send_event(&ids, &[event], &[]).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! A [`Client`] needs the stream that receives the events and the stream's Measurement Protocol
//! API secret. Both can be given as a connection string, either directly or through the
//! `GA_MP_CONNECTION_STRING` environment variable:
//!
//! | Key             | Meaning                                                        |
//! | --------------- | -------------------------------------------------------------- |
//! | `MeasurementId` | Web stream id, e.g. `G-XXXXXXXX`                               |
//! | `FirebaseAppId` | App stream id. Takes precedence over `MeasurementId`           |
//! | `ApiSecret`     | Required                                                       |
//! | `Endpoint`      | Defaults to `https://www.google-analytics.com`                 |
//!
//! # HTTP client
//!
//! Requests go through the [`opentelemetry_http::HttpClient`] trait. Enable one of the
//! `reqwest-client*` features to use [`reqwest`](https://docs.rs/reqwest), or implement the trait
//! for any other client.
//!
//! # Sharing
//!
//! [`parameterized_url`] and [`un_parameterize_url`] store the whole builder state in a URL. See
//! [`url_codec`] for the format.
#![doc(html_root_url = "https://docs.rs/ga4-event-builder/0.1.0")]
#![deny(missing_docs, unreachable_pub, missing_debug_implementations)]

mod client;
mod connection_string;
mod error;
mod models;
mod uploader;
pub mod url_codec;

pub use client::{new_client_from_connection_string, new_client_from_env, Client, CONNECTION_STRING_ENV};
pub use error::Error;
pub use models::*;
pub use opentelemetry_http::HttpClient;
pub use url_codec::{parameterized_url, un_parameterize_url, UrlParts};
