//! SIAKAD 成绩服务
//!
//! 职业高中教务系统的成绩账本：三项成绩换算总评与等级，按
//! (student_id, subject_id, semester, year) 批量 upsert，并提供带科目名称的成绩查询。
//!
//! # 架构
//! - `cache`: 对象缓存（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `ledger`: 成绩账本
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM / 内存）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod ledger;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
