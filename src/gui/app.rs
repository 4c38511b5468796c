use crate::config;
use crate::events::AppEvent;
use crate::gui::images::{ImageCache, ImageId};
use crate::gui::theme::{self, WheelColors};
use crate::gui::wheel::{self, Sector, SectorContent, SpinOutcome, WHEEL_SIZE, Wheel};
use crate::gui::window::FrameLoop;
use crate::sys::loader::BackgroundLoader;
use gdk_pixbuf::Pixbuf;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::RelmWidgetExt;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub struct AppModel {
    pub wheel: Rc<RefCell<Wheel>>,
    pub images: Rc<RefCell<ImageCache<Pixbuf>>>,
    pub loader: BackgroundLoader,
    pub spinning: bool,
    pub sector_count: usize,
    pub result: Option<SpinOutcome>,
    pub frame_loop: FrameLoop,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Spin,
    Finished(SpinOutcome),
    ConfigReload,
    ImageReady(ImageId, Pixbuf),
    Quit,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Spin => AppMsg::Spin,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
            AppEvent::ImageReady(id, pixbuf) => AppMsg::ImageReady(id, pixbuf),
        }
    }
}

impl AppModel {
    fn can_spin(&self) -> bool {
        !self.spinning && self.sector_count > 0
    }

    fn winner(&self) -> Option<&Sector> {
        self.result.as_ref().and_then(|r| r.winner.as_ref())
    }

    fn result_text(&self) -> String {
        match self.winner() {
            Some(sector) if matches!(sector.content, SectorContent::Text(_)) => sector.summary(),
            Some(_) => "Image selected!".to_string(),
            None => "Nothing to pick".to_string(),
        }
    }

    fn winner_image(&self) -> Option<Pixbuf> {
        let id = self.winner()?.image_id()?;
        self.images.borrow().get(id).cloned()
    }

    fn apply_config(&mut self, config: &config::Config) {
        let sectors = config.sectors();
        self.images.borrow_mut().preload(&sectors, &self.loader);

        let mut wheel = self.wheel.borrow_mut();
        // the old winner may be gone; the canvas highlight follows the new wedges on its own
        if wheel.set_sectors(sectors) {
            self.result = None;
        }
        wheel.set_tuning(config.spin);
        self.sector_count = wheel.sectors().len();
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        Wheel,
        BackgroundLoader,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Fortuna"),
            set_default_size: (560, 760),

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    match key {
                        gtk::gdk::Key::Escape => {
                            sender.input(AppMsg::Quit);
                            glib::Propagation::Stop
                        }
                        gtk::gdk::Key::space | gtk::gdk::Key::Return | gtk::gdk::Key::KP_Enter => {
                            sender.input(AppMsg::Spin);
                            glib::Propagation::Stop
                        }
                        _ => glib::Propagation::Proceed,
                    }
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 16,
                set_margin_all: 16,
                set_valign: gtk::Align::Center,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_content_width: WHEEL_SIZE as i32,
                    set_content_height: WHEEL_SIZE as i32,
                    set_halign: gtk::Align::Center,
                },

                gtk::Button {
                    set_halign: gtk::Align::Center,
                    add_css_class: "fortuna-spin",
                    add_css_class: "suggested-action",
                    #[watch]
                    set_label: if model.spinning { "Spinning..." } else { "START" },
                    #[watch]
                    set_sensitive: model.can_spin(),
                    connect_clicked => AppMsg::Spin,
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    set_spacing: 4,
                    set_halign: gtk::Align::Center,
                    #[watch]
                    set_visible: model.result.is_some() && !model.spinning,

                    gtk::Label {
                        set_label: "RESULT",
                        add_css_class: "fortuna-result-caption",
                    },

                    gtk::Label {
                        add_css_class: "fortuna-result",
                        #[watch]
                        set_label: &model.result_text(),
                    },

                    gtk::Picture {
                        set_can_shrink: true,
                        set_size_request: (96, 96),
                        #[watch]
                        set_visible: model.winner_image().is_some(),
                        #[watch]
                        set_pixbuf: model.winner_image().as_ref(),
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (wheel, loader, rx) = init;

        theme::load_css();

        let sector_count = wheel.sectors().len();
        let mut images = ImageCache::new();
        images.preload(wheel.sectors(), &loader);

        let model = AppModel {
            wheel: Rc::new(RefCell::new(wheel)),
            images: Rc::new(RefCell::new(images)),
            loader,
            spinning: false,
            sector_count,
            result: None,
            frame_loop: FrameLoop::default(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let wheel_draw = model.wheel.clone();
        let images_draw = model.images.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = WheelColors::from_context(&style_context);
                let wheel = wheel_draw.borrow();
                if let Err(e) = wheel::draw(cr, &wheel.frame(), &images_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let wheel_tick = model.wheel.clone();
        let tick_sender = sender.clone();
        model.frame_loop = FrameLoop::start(&widgets.drawing_area, move || {
            let outcome = wheel_tick.borrow_mut().advance();
            if let Some(outcome) = outcome {
                tick_sender.input(AppMsg::Finished(outcome));
            }
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Spin => {
                if self.wheel.borrow_mut().start_spin() {
                    self.spinning = true;
                    self.result = None;
                }
            }
            AppMsg::Finished(outcome) => {
                self.spinning = false;
                self.result = Some(outcome);
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.apply_config(&new_config);
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::ImageReady(id, pixbuf) => {
                if self.images.borrow_mut().complete(id, pixbuf) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Quit => {
                self.frame_loop.stop();
                relm4::main_application().quit();
            }
        }
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        self.frame_loop.stop();
    }
}
