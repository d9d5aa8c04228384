pub mod event_handlers;
pub mod health_handlers;
pub mod photo_handlers;
pub mod storage_handlers;
pub mod subscription_handlers;
pub mod viewer_handlers;
