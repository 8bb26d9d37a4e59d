//! HTTP/1.1 request/response handling, deliberately permissive framing,
//! and request-smuggling payload construction. Grounded on
//! `original_source/include/haquests/http/*.hpp` and the corresponding
//! `.cpp` files under `original_source/src/http/`.

pub mod chunked;
pub mod headers;
pub mod request;
pub mod response;
pub mod smuggling;

pub use headers::Headers;
pub use request::Request;
pub use response::Response;
pub use smuggling::{build_malformed, create_cl_te, create_te_cl, create_te_te, SmugglingType};
