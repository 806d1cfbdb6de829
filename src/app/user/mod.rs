//! 用户模块：注册、登录、资料与推荐关系

pub mod handler;
pub mod model;
pub mod service;
