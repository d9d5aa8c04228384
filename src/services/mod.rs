pub mod change_feed;
pub mod gallery_service;
pub mod storage_service;
