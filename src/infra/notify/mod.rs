pub mod http_push_service;
pub mod queued_notifier;
