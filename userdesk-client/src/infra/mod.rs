pub mod api_client;
pub mod transport;

pub use api_client::{Access, ApiClient};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
