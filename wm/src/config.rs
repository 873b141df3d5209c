//! Window manager tunables, read from the kernel command line.
//!
//! Recognized tokens (all optional, unknown or malformed ones are ignored):
//!
//! | token                  | meaning                                    |
//! |------------------------|--------------------------------------------|
//! | `wm.desktop=0xAARRGGBB`| desktop fill color                         |
//! | `wm.refresh=<ticks>`   | minimum ticks between compositor passes    |
//! | `wm.mouse_ipc=<ticks>` | minimum ticks between forwarded pointer events |
//! | `wm.cursor_ticks=<n>`  | minimum ticks between cursor redraws       |
//! | `wm.drag_threshold=<px>` | movement before a press becomes a drag   |
//! | `wm.cursor=on\|off`    | draw the software cursor                   |
//! | `wm.log=<level>`       | klog level while the window manager runs   |

use unios_abi::Color32;
use unios_lib::KlogLevel;

const DEFAULT_REFRESH_TICKS: u64 = 16;
const DEFAULT_MOUSE_IPC_TICKS: u64 = 8;
const DEFAULT_CURSOR_TICKS: u64 = 1;
const DEFAULT_DRAG_THRESHOLD: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WmConfig {
    pub desktop_color: Color32,
    pub refresh_ticks: u64,
    pub mouse_ipc_ticks: u64,
    pub cursor_ticks: u64,
    pub drag_threshold: i32,
    pub cursor: bool,
    pub log_level: Option<KlogLevel>,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            desktop_color: Color32::DESKTOP,
            refresh_ticks: DEFAULT_REFRESH_TICKS,
            mouse_ipc_ticks: DEFAULT_MOUSE_IPC_TICKS,
            cursor_ticks: DEFAULT_CURSOR_TICKS,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            cursor: true,
            log_level: None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("on")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value == "1"
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value == "0"
    {
        Some(false)
    } else {
        None
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

impl WmConfig {
    pub fn from_cmdline(cmdline: &str) -> Self {
        let mut cfg = Self::default();
        for token in cmdline.split_whitespace() {
            let Some((key, value)) = token
                .strip_prefix("wm.")
                .and_then(|rest| rest.split_once('='))
            else {
                continue;
            };
            match key {
                "desktop" => {
                    if let Some(raw) = parse_u64(value).and_then(|v| u32::try_from(v).ok()) {
                        cfg.desktop_color = Color32(raw);
                    }
                }
                "refresh" => {
                    if let Some(ticks) = parse_u64(value) {
                        cfg.refresh_ticks = ticks;
                    }
                }
                "mouse_ipc" => {
                    if let Some(ticks) = parse_u64(value) {
                        cfg.mouse_ipc_ticks = ticks;
                    }
                }
                "cursor_ticks" => {
                    if let Some(ticks) = parse_u64(value) {
                        cfg.cursor_ticks = ticks;
                    }
                }
                "drag_threshold" => {
                    if let Some(px) = parse_u64(value).and_then(|v| i32::try_from(v).ok()) {
                        cfg.drag_threshold = px;
                    }
                }
                "cursor" => {
                    if let Some(on) = parse_bool(value) {
                        cfg.cursor = on;
                    }
                }
                "log" => {
                    if let Some(level) = KlogLevel::from_name(value) {
                        cfg.log_level = Some(level);
                    }
                }
                _ => {}
            }
        }
        cfg
    }
}
