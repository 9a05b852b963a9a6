//! Module bodies.
//!
//! Each body draws into the area between header and footer (or the whole
//! screen with the status bar off). The target's bounding box is that area,
//! so bodies lay out against their own origin.
//!
//! | Module        | Body                                          |
//! |---------------|-----------------------------------------------|
//! | temperature   | large value, humidity and pressure underneath |
//! | cockpit       | large speed, altitude and heading underneath  |
//! | accelerometer | text block                                    |
//! | gps           | text block                                    |
//! | info          | text block                                    |
//! | power         | icon over the option list                     |
//! | other         | "Not implemented"                             |

use std::env;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use kleine_common::config::{BODY_ICON_SIZE, LIST_ROW_HEIGHT, PADDING};
use kleine_common::icons::draw_icon;
use kleine_common::styles::{LARGE_WHITE, LARGE_YELLOW, MEDIUM_WHITE, SMALL_FONT, SMALL_HINT, SMALL_WHITE};
use kleine_common::widgets::{draw_centered_text, draw_option_list, draw_text_block};
use kleine_common::wrap::wrap_or_unwrapped;
use kleine_common::{SignalQuality, WHITE};
use sysinfo::System;

use crate::registry::{ModuleId, OptionId};
use crate::state::{GatheredState, Vector3};

/// Static facts shown by the info module, gathered once.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SystemInfo {
    pub version: &'static str,
    pub os: String,
    pub arch: &'static str,
    pub hostname: String,
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            os: System::long_os_version().unwrap_or_else(|| env::consts::OS.to_string()),
            arch: env::consts::ARCH,
            hostname: System::host_name().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// Everything a body may show.
pub struct BodyParams<'a> {
    pub module: &'a ModuleId,
    pub options: &'a [OptionId],
    pub selected_option: Option<usize>,
    pub state: &'a GatheredState,
    pub system: &'a SystemInfo,
}

pub fn draw_body<D>(display: &mut D, params: &BodyParams<'_>)
where
    D: DrawTarget<Color = Rgb565>,
{
    match params.module {
        ModuleId::Temperature => draw_temperature(display, params.state),
        ModuleId::Cockpit => draw_cockpit(display, params.state),
        ModuleId::Accelerometer => draw_accelerometer(display, params.state),
        ModuleId::Gps => draw_gps(display, params.state),
        ModuleId::Info => draw_info(display, params.state, params.system),
        ModuleId::Power => draw_power(display, params),
        ModuleId::Settings | ModuleId::Unknown(_) => draw_not_implemented(display, params.module),
    }
}

// =============================================================================
// Formatting
// =============================================================================

const NOT_AVAILABLE: &str = "N/A";

fn value_or_na(value: Option<f32>, precision: usize, unit: &str) -> String {
    value.map_or_else(|| format!("{} {}", NOT_AVAILABLE, unit), |v| format!("{:.*} {}", precision, v, unit))
}

fn vector(v: Vector3) -> String {
    format!("{:>6.1} {:>6.1} {:>6.1}", v.0, v.1, v.2)
}

fn center(size: Size) -> Point {
    Point::new(size.width as i32 / 2, size.height as i32 / 2)
}

fn text_block<D>(display: &mut D, text: &str)
where
    D: DrawTarget<Color = Rgb565>,
{
    let width = display.bounding_box().size.width.saturating_sub(2 * PADDING as u32);
    let text = wrap_or_unwrapped(text, SMALL_FONT, width);
    draw_text_block(display, &text, Point::new(PADDING, PADDING * 2), SMALL_WHITE);
}

// =============================================================================
// Bodies
// =============================================================================

fn draw_temperature<D>(display: &mut D, state: &GatheredState)
where
    D: DrawTarget<Color = Rgb565>,
{
    let mid = center(display.bounding_box().size);
    draw_centered_text(display, &value_or_na(state.temperature, 1, "C"), mid - Point::new(0, 16), LARGE_YELLOW);

    let details = format!(
        "Humidity {}   Pressure {}",
        value_or_na(state.humidity, 1, "%"),
        value_or_na(state.air_pressure, 1, "hPa")
    );
    draw_centered_text(display, &details, mid + Point::new(0, 24), SMALL_WHITE);
}

fn draw_cockpit<D>(display: &mut D, state: &GatheredState)
where
    D: DrawTarget<Color = Rgb565>,
{
    let mid = center(display.bounding_box().size);
    let gps = state.gps.as_ref();

    let speed = value_or_na(gps.and_then(|g| g.speed_kmh), 0, "km/h");
    draw_centered_text(display, &speed, mid - Point::new(0, 16), LARGE_WHITE);

    let altitude = gps.and_then(|g| g.altitude.map(|alt| format!("{:.0} {}", alt, g.altitude_units)));
    let heading = gps.and_then(|g| g.heading).map(|h| format!("{:.0} deg", h));
    let details = format!(
        "Alt {}   Heading {}",
        altitude.as_deref().unwrap_or(NOT_AVAILABLE),
        heading.as_deref().unwrap_or(NOT_AVAILABLE)
    );
    draw_centered_text(display, &details, mid + Point::new(0, 24), SMALL_WHITE);
}

fn draw_accelerometer<D>(display: &mut D, state: &GatheredState)
where
    D: DrawTarget<Color = Rgb565>,
{
    let text = match &state.orientation {
        Some(o) => format!(
            "Accel  {}\nGyro   {}\nMag    {}\n\nPitch {:.1}  Roll {:.1}  Yaw {:.1}",
            vector(o.acceleration),
            vector(o.gyroscope),
            vector(o.magnetometer),
            o.attitude.0,
            o.attitude.1,
            o.attitude.2,
        ),
        None => format!("Motion sensor {}", NOT_AVAILABLE),
    };
    text_block(display, &text);
}

fn draw_gps<D>(display: &mut D, state: &GatheredState)
where
    D: DrawTarget<Color = Rgb565>,
{
    let Some(gps) = &state.gps else {
        text_block(display, "Waiting for GPS fix...");
        return;
    };

    let altitude = gps
        .altitude
        .map_or_else(|| NOT_AVAILABLE.to_string(), |alt| format!("{:.1} {}", alt, gps.altitude_units));
    let satellites = gps.satellites.map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string());
    let text = format!(
        "Lat  {:.5} {}\nLon  {:.5} {}\nAlt  {}\nTime {}   Status {}\nSatellites {}   Signal {}",
        gps.latitude.abs(),
        gps.latitude_dir,
        gps.longitude.abs(),
        gps.longitude_dir,
        altitude,
        gps.timestamp.as_deref().unwrap_or(NOT_AVAILABLE),
        gps.status.unwrap_or('-'),
        satellites,
        gps.signal_quality.as_str(),
    );
    text_block(display, &text);
}

fn draw_info<D>(display: &mut D, state: &GatheredState, system: &SystemInfo)
where
    D: DrawTarget<Color = Rgb565>,
{
    text_block(display, &info_text(state, system));
}

fn info_text(state: &GatheredState, system: &SystemInfo) -> String {
    let network = &state.network;
    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let signal = match (network.signal, state.wifi_quality) {
        (Some(percent), _) => format!("{}%", percent),
        (None, SignalQuality::Unknown) => NOT_AVAILABLE.to_string(),
        (None, quality) => quality.as_str().to_string(),
    };
    format!(
        "Version {}\nOS & arch: {} / {}\nHost: {}\nIP address: {}\nMAC address: {}\nWifi SSID: {}\nWifi Sec: {}\nWifi Signal: {}",
        system.version,
        system.os,
        system.arch,
        system.hostname,
        or_na(&network.ip),
        or_na(&network.mac),
        or_na(&network.ssid),
        or_na(&network.security),
        signal,
    )
}

fn draw_power<D>(display: &mut D, params: &BodyParams<'_>)
where
    D: DrawTarget<Color = Rgb565>,
{
    let width = display.bounding_box().size.width;
    let icon_left = (width.saturating_sub(BODY_ICON_SIZE) / 2) as i32;
    draw_icon(display, params.module.icon(), Point::new(icon_left, PADDING), BODY_ICON_SIZE, WHITE);

    let labels: Vec<&str> = params.options.iter().map(OptionId::label).collect();
    let list_top = PADDING * 2 + BODY_ICON_SIZE as i32;
    draw_option_list(display, &labels, params.selected_option, list_top);

    if params.options.is_empty() {
        let y = list_top + LIST_ROW_HEIGHT as i32 / 2;
        draw_centered_text(display, "No options", Point::new(width as i32 / 2, y), SMALL_HINT);
    }
}

fn draw_not_implemented<D>(display: &mut D, module: &ModuleId)
where
    D: DrawTarget<Color = Rgb565>,
{
    let mid = center(display.bounding_box().size);
    draw_centered_text(display, "Not implemented", mid - Point::new(0, 10), MEDIUM_WHITE);
    draw_centered_text(display, module.label(), mid + Point::new(0, 14), SMALL_HINT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::state::NetworkInfo;
    use kleine_common::BLACK;

    const BODY_SIZE: Size = Size::new(320, 198);

    fn system() -> SystemInfo {
        SystemInfo {
            version: "0.0.0",
            os: "Linux 12 Debian GNU/Linux".to_string(),
            arch: "aarch64",
            hostname: "kiosk".to_string(),
        }
    }

    fn draw(canvas: &mut Canvas, module: &ModuleId, options: &[OptionId], selected_option: Option<usize>) {
        let state = GatheredState::default();
        let system = system();
        let mut frame = canvas.begin_frame();
        draw_body(
            &mut frame,
            &BodyParams {
                module,
                options,
                selected_option,
                state: &state,
                system: &system,
            },
        );
        frame.finish();
    }

    #[test]
    fn test_every_module_draws_something() {
        let mut canvas = Canvas::new(BODY_SIZE);
        for module in [
            ModuleId::Temperature,
            ModuleId::Accelerometer,
            ModuleId::Gps,
            ModuleId::Cockpit,
            ModuleId::Info,
            ModuleId::Settings,
            ModuleId::Power,
            ModuleId::Unknown("radar".to_string()),
        ] {
            draw(&mut canvas, &module, &[], None);
            let lit = canvas.pixels().iter().filter(|p| **p != BLACK).count();
            assert!(lit > 0, "{} body drew nothing", module);
        }
    }

    #[test]
    fn test_info_shows_network_details() {
        let mut state = GatheredState::default();
        state.update_network(NetworkInfo {
            interface: Some("wlan0".to_string()),
            ip: Some("192.168.1.20".to_string()),
            mac: Some("b8:27:eb:12:34:56".to_string()),
            ssid: Some("Home".to_string()),
            security: Some("WPA2".to_string()),
            signal: Some(78),
        });
        let text = info_text(&state, &system());
        for line in [
            "OS & arch: Linux 12 Debian GNU/Linux / aarch64",
            "Host: kiosk",
            "IP address: 192.168.1.20",
            "MAC address: b8:27:eb:12:34:56",
            "Wifi SSID: Home",
            "Wifi Sec: WPA2",
            "Wifi Signal: 78%",
        ] {
            assert!(text.lines().any(|l| l == line), "missing {:?} in\n{}", line, text);
        }
    }

    #[test]
    fn test_info_falls_back_to_na() {
        let text = info_text(&GatheredState::default(), &system());
        for line in ["IP address: N/A", "MAC address: N/A", "Wifi SSID: N/A", "Wifi Sec: N/A", "Wifi Signal: N/A"] {
            assert!(text.lines().any(|l| l == line), "missing {:?} in\n{}", line, text);
        }

        let mut state = GatheredState::default();
        state.update_wifi(SignalQuality::Weak);
        let text = info_text(&state, &system());
        assert!(text.ends_with("Wifi Signal: weak"), "link quality without nmcli: {}", text);
    }

    #[test]
    fn test_value_or_na() {
        assert_eq!(value_or_na(Some(22.46), 1, "C"), "22.5 C");
        assert_eq!(value_or_na(None, 1, "C"), "N/A C");
        assert_eq!(value_or_na(Some(87.6), 0, "km/h"), "88 km/h");
    }

    #[test]
    fn test_power_body_inverts_selected_row() {
        let mut canvas = Canvas::new(BODY_SIZE);
        draw(&mut canvas, &ModuleId::Power, &[OptionId::Sleep, OptionId::Reboot], Some(1));

        let list_top = PADDING * 2 + BODY_ICON_SIZE as i32;
        let x = PADDING * 4 + 1;
        let second_row = list_top + LIST_ROW_HEIGHT as i32;
        assert_eq!(canvas.pixel(Point::new(x, second_row + 1)), Some(WHITE), "selected row is filled");
        assert_eq!(canvas.pixel(Point::new(x, list_top + 1)), Some(BLACK), "unselected row is not");
    }
}
