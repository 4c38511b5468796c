pub mod app;
pub mod images;
pub mod theme;
pub mod wheel;
pub mod window;
