//! 核心模块 - 配置
//!
//! - [`Config`] - 厨房屏幕配置

pub mod config;

pub use config::Config;
