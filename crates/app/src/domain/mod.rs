//! ScholarLink Domain Concerns

pub mod academic;
pub mod accounts;
pub mod audit;
pub mod courses;
pub mod invites;
pub mod pagination;
pub mod results;
pub mod schools;
pub mod subscriptions;
pub mod users;
