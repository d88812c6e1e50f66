//! ports - 抽象 trait 层
//!
//! 定义领域层依赖的外部能力接口：时钟、当前操作人、角色目录、通知发送

mod actor;
mod clock;
mod notifier;
mod role_directory;

pub use actor::*;
pub use clock::*;
pub use notifier::*;
pub use role_directory::*;
