//! Screen composition.
//!
//! A frame is drawn in a fixed order into the [`Canvas`] and flushed once:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ [icon]   wifi gps 22.5C 85% 12:34  │  header (status bar)
//! ├────────────────────────────────────┤
//! │                                    │
//! │            module body             │
//! │          ┌────────────┐            │
//! │          │   modal    │            │  modal, drawn last
//! │          └────────────┘            │
//! ├────────────────────────────────────┤
//! │ menu          select         enter │  footer (status bar)
//! └────────────────────────────────────┘
//! ```
//!
//! The composer reads everything it draws from [`FrameParams`], a snapshot
//! the scheduler builds per frame; it never touches scheduler state.

pub mod bodies;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use kleine_common::config::{FOOTER_HEIGHT, HEADER_HEIGHT, PADDING};
use kleine_common::styles::{LARGE_YELLOW, SMALL_FONT, SMALL_WHITE};
use kleine_common::widgets::{
    BatteryStatus, HeaderData, draw_centered_text, draw_divider, draw_footer, draw_header, draw_modal, draw_text_block,
};
use kleine_common::wrap::wrap_or_unwrapped;
use kleine_common::{BatteryLevel, Icon};

use crate::canvas::Canvas;
use crate::config::StatusBarConfig;
use crate::drivers::DisplayDevice;
use crate::error::DisplayError;
use crate::registry::{ModuleId, OptionId};
use crate::state::{GatheredState, ModalMessage};
use bodies::{BodyParams, SystemInfo, draw_body};

/// Everything one frame shows.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams<'a> {
    pub module: &'a ModuleId,
    pub options: &'a [OptionId],
    pub selected_option: Option<usize>,
    pub state: &'a GatheredState,
    pub statusbar: StatusBarConfig,
    /// Hours and minutes for the header clock.
    pub clock: (u32, u32),
    pub modal: Option<&'a ModalMessage>,
    /// Draw nothing at all (screen asleep or shutting down).
    pub blank: bool,
}

/// What a rendered frame contained.
#[derive(Clone, PartialEq, Debug)]
pub struct FrameSummary {
    pub module: ModuleId,
    pub icon: Icon,
    pub modal_shown: bool,
    pub statusbar_drawn: bool,
    /// Battery color class, when the battery item was in the header.
    pub battery_level: Option<BatteryLevel>,
}

pub struct Screen {
    canvas: Canvas,
    system: SystemInfo,
}

impl Screen {
    pub fn new(size: Size) -> Self {
        Self::with_system(size, SystemInfo::detect())
    }

    pub fn with_system(size: Size, system: SystemInfo) -> Self {
        Self {
            canvas: Canvas::new(size),
            system,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Compose one frame and flush it to `display`.
    pub fn render(&mut self, display: &mut dyn DisplayDevice, params: &FrameParams<'_>) -> Result<FrameSummary, DisplayError> {
        let mut summary = FrameSummary {
            module: params.module.clone(),
            icon: params.module.icon(),
            modal_shown: false,
            statusbar_drawn: false,
            battery_level: None,
        };

        let mut frame = self.canvas.begin_frame();
        if !params.blank {
            let screen = frame.bounding_box();
            let body_area = if params.statusbar.active {
                summary.battery_level = draw_header(&mut frame, &header_data(params));
                draw_footer(&mut frame, !params.options.is_empty());
                summary.statusbar_drawn = true;
                let height = screen.size.height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT);
                Rectangle::new(Point::new(0, HEADER_HEIGHT as i32), Size::new(screen.size.width, height))
            } else {
                screen
            };

            let body = BodyParams {
                module: params.module,
                options: params.options,
                selected_option: params.selected_option,
                state: params.state,
                system: &self.system,
            };
            draw_body(&mut frame.cropped(&body_area), &body);

            if let Some(modal) = params.modal {
                summary.modal_shown = draw_modal(&mut frame, &modal.text);
            }
        }
        display.flush(frame.finish())?;

        log::trace!(
            "frame {}: {} modal={} statusbar={}",
            self.canvas.frames(),
            summary.module,
            summary.modal_shown,
            summary.statusbar_drawn
        );
        Ok(summary)
    }

    /// Title and version over a divider, with the wrapped `subtitle` below.
    pub fn render_splash(&mut self, display: &mut dyn DisplayDevice, title: &str, subtitle: &str) -> Result<(), DisplayError> {
        let mut frame = self.canvas.begin_frame();
        let size = frame.bounding_box().size;

        let title = format!("{} v{}", title, self.system.version);
        let divider_y = size.height as i32 / 2;
        draw_centered_text(&mut frame, &title, Point::new(size.width as i32 / 2, divider_y - 24), LARGE_YELLOW);
        draw_divider(&mut frame, divider_y);

        let wrapped = wrap_or_unwrapped(subtitle, SMALL_FONT, size.width.saturating_sub(2 * PADDING as u32));
        draw_text_block(&mut frame, &wrapped, Point::new(PADDING, divider_y + PADDING * 2), SMALL_WHITE);

        display.flush(frame.finish())
    }

    /// Flush an all-black frame.
    pub fn render_blank(&mut self, display: &mut dyn DisplayDevice) -> Result<(), DisplayError> {
        let frame = self.canvas.begin_frame();
        display.flush(frame.finish())
    }
}

fn header_data(params: &FrameParams<'_>) -> HeaderData {
    let bar = params.statusbar;
    let state = params.state;
    let battery = state.battery_percentage.map(|percentage| BatteryStatus {
        percentage,
        charging: state.battery_is_charging,
    });
    HeaderData {
        icon: params.module.icon(),
        clock: bar.show_time.then_some(params.clock),
        battery: battery.filter(|_| bar.show_battery),
        temperature: state.temperature.filter(|_| bar.show_temperature),
        gps: bar.show_gps.then(|| state.gps_quality()),
        wifi: bar.show_wifi.then_some(state.wifi_quality),
    }
}
