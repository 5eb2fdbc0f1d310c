pub mod pagination;
pub mod response;

pub use pagination::{PaginationInfo, PaginationQuery, clamp_page};
pub(crate) use pagination::deserialize_string_to_i64;
pub use response::ApiResponse;
