//! 分佣模块：两级推荐分佣的计算、查询与确认

pub mod handler;
pub mod model;
pub mod service;
