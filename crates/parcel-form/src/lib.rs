//! parcel-form: Form data model and its wire codecs
//!
//! Shared by parcel-core's parser registry, but usable on its own.
//!
//! ## Codecs
//! - `multipart` - `multipart/form-data` bodies (RFC 7578), text fields and files
//! - `urlencoded` - `application/x-www-form-urlencoded` bodies
//!
//! ## Example
//! ```
//! use parcel_form::{multipart, FileEntry, FormData};
//!
//! let mut form = FormData::new();
//! form.insert_text("a", "1");
//! form.insert_file("f", FileEntry::new("x.txt", mime::TEXT_PLAIN, "hi"));
//!
//! let body = multipart::serialize(&form, "XyZ");
//! let parsed = multipart::parse(&body, "XyZ").unwrap();
//! assert_eq!(parsed, form);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod data;
pub mod error;
pub mod multipart;
pub mod urlencoded;

pub use data::{FileEntry, FormData, FormEntry};
pub use error::{FormError, MultipartError};
