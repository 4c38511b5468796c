use gtk::prelude::*;
use gtk4 as gtk;

/// Per-frame callback driven by the widget's frame clock. The widget is redrawn after every
/// callback, so a draw always sees the state produced by the tick of the same frame.
///
/// Dropping or stopping the loop unregisters the callback; no tick runs after teardown.
#[derive(Default)]
pub struct FrameLoop {
    id: Option<gtk::TickCallbackId>,
}

impl FrameLoop {
    pub fn start<W, F>(widget: &W, on_frame: F) -> Self
    where
        W: IsA<gtk::Widget>,
        F: Fn() + 'static,
    {
        let id = widget.add_tick_callback(move |widget, _clock| {
            on_frame();
            widget.queue_draw();
            glib::ControlFlow::Continue
        });
        Self { id: Some(id) }
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.id.take() {
            id.remove();
            log::debug!("Frame loop stopped");
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
