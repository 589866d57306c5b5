use crate::config::{self, Config};
use crate::entries;
use crate::events::AppEvent;
use crate::gui::theme;
use crate::spin::{self, SpinAnimation};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use rondel::{
    DetailPolicy, DeviceProfile, FrameScheduler, IMAGE_SETTLE_DELAY, Palette, RenderState,
    Segment, WheelCanvas,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub struct AppModel {
    pub state: Rc<RefCell<RenderState>>,
    pub canvas: Rc<RefCell<WheelCanvas>>,
    pub scheduler: Rc<RefCell<FrameScheduler>>,
    pub config: Config,
    spin: Option<SpinAnimation>,
    tick: Option<gtk::TickCallbackId>,
    debounce: Option<DebounceGuard>,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

/// A pending `glib` timeout that can be cancelled unless it already fired.
struct DebounceGuard {
    id: glib::SourceId,
    fired: Rc<Cell<bool>>,
}

impl DebounceGuard {
    fn cancel(self) {
        if !self.fired.get() {
            self.id.remove();
        }
    }
}

#[derive(Debug)]
pub enum AppMsg {
    Spin(Option<usize>),
    SpinTick(i64),
    Resized,
    ConfigReload,
    Teardown,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Spin { winner } => AppMsg::Spin(winner),
            AppEvent::Reload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Tombola"),
            set_default_width: model.config.window.width as i32,
            set_default_height: model.config.window.height as i32,
            add_css_class: "tombola-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::space {
                        sender.input(AppMsg::Spin(None));
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "tombola-drawing-area",

                connect_resize[sender] => move |_, _, _| {
                    sender.input(AppMsg::Resized);
                },

                connect_unrealize[sender] => move |_| {
                    sender.input(AppMsg::Teardown);
                },

                add_controller = gtk::GestureClick {
                    connect_released[sender] => move |_, _, _, _| {
                        sender.input(AppMsg::Spin(None));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, rx) = init;

        theme::load_css();

        let render_state = build_render_state(&config);
        let policy = DetailPolicy::for_segments(render_state.segments.len());

        let state = Rc::new(RefCell::new(render_state));
        let canvas = Rc::new(RefCell::new(WheelCanvas::new()));
        let scheduler = Rc::new(RefCell::new(FrameScheduler::new(&policy)));

        let model = AppModel {
            state: state.clone(),
            canvas: canvas.clone(),
            scheduler: scheduler.clone(),
            config,
            spin: None,
            tick: None,
            debounce: None,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        widgets
            .drawing_area
            .set_draw_func(move |area, cr, width, height| {
                if scheduler.borrow_mut().frame_fired(Instant::now()) {
                    let state = state.borrow();
                    let profile =
                        DeviceProfile::new(f64::from(area.scale_factor()), f64::from(width));
                    canvas
                        .borrow_mut()
                        .render(&state, &profile, f64::from(width), f64::from(height));
                }
                if let Err(e) = canvas.borrow().paint_onto(cr) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let freshly_decoded = {
            let state = model.state.borrow();
            model
                .canvas
                .borrow_mut()
                .sync_center_image(state.center_image.as_deref())
        };
        if freshly_decoded {
            model.schedule_settle_redraw();
        }
        model.request_redraw();

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Spin(fixed) => self.start_spin(fixed, &sender),
            AppMsg::SpinTick(frame_time) => {
                let Some(animation) = self.spin.as_mut() else {
                    return;
                };
                let sample = animation.sample(frame_time);
                self.state.borrow_mut().rotation_degrees = sample.rotation;
                if self.scheduler.borrow_mut().request_redraw() {
                    self.drawing_area.queue_draw();
                }
                if sample.finished {
                    let winner = animation.winner();
                    self.finish_spin(winner);
                }
            }
            AppMsg::Resized => self.debounce_resize(),
            AppMsg::ConfigReload => self.reload_config(),
            AppMsg::Teardown => {
                self.scheduler.borrow_mut().teardown();
                if let Some(tick) = self.tick.take() {
                    tick.remove();
                }
                if let Some(debounce) = self.debounce.take() {
                    debounce.cancel();
                }
                self.spin = None;
            }
        }
    }
}

impl AppModel {
    fn start_spin(&mut self, fixed: Option<usize>, sender: &ComponentSender<Self>) {
        if self.spin.is_some() {
            log::debug!("Spin already in progress");
            return;
        }
        let segment_count = self.state.borrow().segments.len();
        if let Some(index) = fixed
            && index >= segment_count
        {
            log::warn!(
                "Requested winner {} out of range for {} segments",
                index,
                segment_count
            );
            return;
        }
        let Some(winner) = fixed.or_else(|| spin::pick_winner(segment_count)) else {
            log::warn!("Cannot spin an empty wheel");
            return;
        };

        let rotation = self.state.borrow().rotation_degrees;
        let animation = SpinAnimation::new(
            rotation,
            segment_count,
            winner,
            self.config.spin.turns,
            Duration::from_millis(self.config.spin.duration_ms),
        );
        log::info!("Spinning {} segments", segment_count);
        self.spin = Some(animation);

        let sender = sender.clone();
        self.tick = Some(self.drawing_area.add_tick_callback(move |_, clock| {
            sender.input(AppMsg::SpinTick(clock.frame_time()));
            glib::ControlFlow::Continue
        }));
    }

    fn finish_spin(&mut self, winner: usize) {
        {
            let state = self.state.borrow();
            if let Some(segment) = state.segments.get(winner) {
                log::info!("Winner: {}", segment.label);
                self.root
                    .set_title(Some(&format!("Tombola: {}", segment.label)));
            }
        }
        self.spin = None;
        if let Some(tick) = self.tick.take() {
            tick.remove();
        }
        // one settled frame at the final angle
        self.request_redraw();
    }

    fn debounce_resize(&mut self) {
        let delay = {
            let mut scheduler = self.scheduler.borrow_mut();
            if scheduler.resize_observed(Instant::now()).is_none() {
                return;
            }
            scheduler.debounce_delay()
        };

        if let Some(previous) = self.debounce.take() {
            previous.cancel();
        }

        let fired = Rc::new(Cell::new(false));
        let scheduler = self.scheduler.clone();
        let area = self.drawing_area.clone();
        let id = glib::timeout_add_local_once(delay, {
            let fired = fired.clone();
            move || {
                fired.set(true);
                if scheduler.borrow_mut().debounce_fired(Instant::now()) {
                    area.queue_draw();
                }
            }
        });
        self.debounce = Some(DebounceGuard { id, fired });
    }

    fn reload_config(&mut self) {
        match config::load_config() {
            Ok(new_config) => {
                let new_state = build_render_state(&new_config);
                let policy = DetailPolicy::for_segments(new_state.segments.len());

                {
                    // rotation survives a reload so the wheel does not jump
                    let mut state = self.state.borrow_mut();
                    let rotation = state.rotation_degrees;
                    *state = new_state;
                    state.rotation_degrees = rotation;
                }
                if !self.scheduler.borrow().is_torn_down() {
                    *self.scheduler.borrow_mut() = FrameScheduler::new(&policy);
                }

                let freshly_decoded = {
                    let state = self.state.borrow();
                    self.canvas
                        .borrow_mut()
                        .sync_center_image(state.center_image.as_deref())
                };
                if freshly_decoded {
                    self.schedule_settle_redraw();
                }

                self.config = new_config;
                self.request_redraw();
                log::info!("Configuration reloaded");
            }
            Err(e) => log::error!("Failed to reload config: {}", e),
        }
    }

    fn request_redraw(&self) {
        if self.scheduler.borrow_mut().request_redraw() {
            self.drawing_area.queue_draw();
        }
    }

    // let the surface settle before compositing a freshly decoded image
    fn schedule_settle_redraw(&self) {
        let scheduler = self.scheduler.clone();
        let area = self.drawing_area.clone();
        glib::timeout_add_local_once(IMAGE_SETTLE_DELAY, move || {
            if scheduler.borrow_mut().request_redraw() {
                area.queue_draw();
            }
        });
    }
}

fn build_render_state(config: &Config) -> RenderState {
    let entries = match &config.entries_file {
        Some(path) => match entries::load_entries(path) {
            Ok(list) => list,
            Err(e) => {
                log::error!("Failed to load entries: {}", e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let segments = if entries.is_empty() {
        vec![Segment::new("No entries loaded")]
    } else {
        entries::segments(&entries)
    };

    let palette = Palette::from_hex(&config.palette).unwrap_or_else(|e| {
        log::error!("Invalid palette, falling back to defaults: {}", e);
        Palette::from_hex(&config::default_palette()).expect("default palette is valid")
    });

    let mut state = RenderState::new(
        segments,
        palette,
        f64::from(config.window.width),
        f64::from(config.window.height),
    );
    state.center_image = config.center_image.clone();
    state.center_image_size = config.center_image_size;
    state
}
