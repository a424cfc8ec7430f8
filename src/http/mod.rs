pub mod content;
pub mod date;
pub mod dispatch;
pub mod headers;
pub mod mime;
pub mod multipart;
pub mod printer;
pub mod result;
pub mod url;

// Re-exports for convenience
pub use content::{Content, ContentData, Single};
pub use headers::Headers;
pub use mime::{ContentDisposition, ContentType};
pub use multipart::{MultipartSource, MultipartSurface};
pub use printer::{LogConfig, Printer};
pub use result::HttpResult;
pub use url::HttpUrl;
