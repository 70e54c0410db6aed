//! CLI output: schema-versioned JSON responses and terminal rendering

pub mod command;
pub mod human;

pub use command::{
    generate_execution_id, output_json, ChildrenResponse, ErrorResponse, FindMatch, FindResponse,
    ImportResponse, JsonResponse, ListResponse, OutputFormat, ReindexResponse, RootsResponse,
    ShowResponse, StatusResponse, ValidationResponse,
};
pub use human::{format_percentage, format_time};
