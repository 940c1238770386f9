//! Kitchen Screen - POS 厨房显示端
//!
//! # 架构概述
//!
//! POS 端每次送厨都会发送整单快照；厨房端只显示相对上一版本的变化：
//!
//! - **消息总线** (`message`): 进程内频道总线 (`waiter-{id}` / `kitchen-{id}`)
//! - **订单聚合** (`orders`): 单号归一化、差异计算、显示单与计数器
//! - **厨房屏幕** (`screen`): 接收快照、出餐确认
//! - **服务员端** (`waiter`): 发送快照、展示厨房通知
//! - **外部转发** (`forward`): 订单 JSON POST 到外部 API
//!
//! # 模块结构
//!
//! ```text
//! kitchen-screen/src/
//! ├── core/          # 配置
//! ├── message/       # 消息总线、订阅
//! ├── orders/        # 差异引擎、状态存储
//! ├── screen/        # 厨房屏幕
//! ├── waiter/        # 服务员端
//! ├── forward/       # 外部 API
//! ├── notify.rs      # 用户通知
//! └── utils/         # 错误、日志
//! ```

pub mod core;
pub mod forward;
pub mod message;
pub mod notify;
pub mod orders;
pub mod screen;
pub mod utils;
pub mod waiter;

// Re-export 公共类型
pub use crate::core::Config;
pub use forward::{ApiForwarder, ForwardOutcome};
pub use message::{BusMessage, Channel, MessageBus, Subscription};
pub use notify::{TracingNotifier, UserNotifier};
pub use orders::{ApplyOutcome, KitchenCounters, OrderStateStore};
pub use screen::KitchenScreen;
pub use utils::{AppError, AppResult};
pub use waiter::WaiterStation;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 `.env`、读取配置并初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    // .env 不存在时忽略
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_dir.as_deref())?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    __ __ _ __       __
   / //_/(_) /______/ /_  ___  ____
  / ,<  / / __/ ___/ __ \/ _ \/ __ \
 / /| |/ / /_/ /__/ / / /  __/ / / /
/_/ |_/_/\__/\___/_/ /_/\___/_/ /_/
    "#
    );
}
