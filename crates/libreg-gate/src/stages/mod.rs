//! Built-in gate stages.

pub mod condition;
pub mod custody;
pub mod existence;
pub mod role;

pub use condition::ConditionStage;
pub use custody::CustodyStage;
pub use existence::ExistenceStage;
pub use role::RoleStage;
