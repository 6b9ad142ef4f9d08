pub mod activity;
pub mod audit;
pub mod auth;
pub mod company;
pub mod contact;
pub mod dashboard;
pub mod opportunity;
pub mod rbac;
pub mod task;
