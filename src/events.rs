use crate::gui::images::ImageId;
use gdk_pixbuf::Pixbuf;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Spin,
    ConfigReload,
    ImageReady(ImageId, Pixbuf),
}
