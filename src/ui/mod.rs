pub mod controls;
pub mod notify;
pub mod popup;
pub mod widget;
