//! Page break computation

mod pagination;

pub use pagination::{paginate, paginate_with_map, PageBreak, PageSpan, PaginationResult};
