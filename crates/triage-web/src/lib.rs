//! # 分诊 Web 接口
//!
//! 以 HTTP/JSON 形式暴露分诊引擎的读写操作，记录均按值返回。

pub mod handlers;
pub mod server;

pub use handlers::ApiError;
pub use server::{create_app, WebServer};
