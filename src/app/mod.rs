pub mod controller;
pub mod error;
pub mod events;
pub mod filter;
pub mod models;
pub mod source;
pub mod storage;
pub mod task_edit;
pub mod task_list;
pub mod ui;
pub mod view;
