pub mod cli;
pub mod config;
pub mod domain;
pub mod draft;
pub mod http;
pub mod publish;
pub mod review;
pub mod session;
pub mod storage;
pub mod workspace;
