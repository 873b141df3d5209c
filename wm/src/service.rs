//! The window manager task.
//!
//! One cooperative task drains the input mailbox, drives the gesture
//! machine, forwards input to window owners and recomposes at a bounded
//! rate. Syscalls from other tasks reach the same [`WindowManager`] through
//! the shared lock; interrupt handlers never touch it.

use spin::Mutex;

use unios_abi::ipc::{IPC_INTERRUPT, NO_OWNER, Pid};
use unios_abi::{KeyEvent, Message, MouseButtons, PointerEvent, Rect};
use unios_lib::{klog_debug, klog_info};

use crate::display::FramebufferProvider;
use crate::error::{WmError, WmResult};
use crate::input::InputMailbox;
use crate::ipc::MessageBus;
use crate::manager::WindowManager;

/// The window manager as shared between its task and the syscall path.
pub type SharedWm<D> = Mutex<WindowManager<D>>;

pub trait Clock {
    /// Monotonic timer ticks.
    fn ticks(&self) -> u64;

    /// Give up the CPU until the scheduler comes back to us.
    fn yield_now(&self);
}

/// True once `interval` ticks have passed since `last`, or if never run.
#[inline]
fn due(now: u64, last: Option<u64>, interval: u64) -> bool {
    last.is_none_or(|last| now.wrapping_sub(last) >= interval)
}

pub struct WmService<'a, D, B> {
    wm: &'a SharedWm<D>,
    input: &'a InputMailbox,
    bus: B,
    last_compose: Option<u64>,
    last_mouse_ipc: Option<u64>,
    last_cursor: Option<u64>,
    /// Button mask in the last pointer message sent to a client.
    forwarded_buttons: MouseButtons,
    /// Latest pointer report not yet forwarded because of the rate limit.
    unsent_pointer: Option<PointerEvent>,
}

impl<'a, D: FramebufferProvider, B: MessageBus> WmService<'a, D, B> {
    pub fn new(wm: &'a SharedWm<D>, input: &'a InputMailbox, bus: B) -> Self {
        Self {
            wm,
            input,
            bus,
            last_compose: None,
            last_mouse_ipc: None,
            last_cursor: None,
            forwarded_buttons: MouseButtons::empty(),
            unsent_pointer: None,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn send(&mut self, dest: Pid, mut msg: Message) -> WmResult<()> {
        msg.source = IPC_INTERRUPT;
        self.bus.send(dest, msg).map_err(WmError::from)
    }

    fn deliver(&mut self, dest: Pid, msg: Message) {
        if dest == NO_OWNER {
            return;
        }
        if let Err(err) = self.send(dest, msg) {
            klog_debug!("wm: dropped message {} for {}: {}", msg.kind, dest, err);
        }
    }

    fn dispatch_key(&mut self, wm: &WindowManager<D>, key: KeyEvent) {
        let dest = wm
            .focused()
            .and_then(|id| wm.window(id))
            .map(|w| w.owner())
            .filter(|&owner| owner != NO_OWNER)
            .unwrap_or_else(|| wm.root_owner());
        self.deliver(dest, Message::key(key.code));
    }

    fn dispatch_pointer(&mut self, wm: &mut WindowManager<D>, event: PointerEvent) {
        wm.handle_pointer(event);
        self.unsent_pointer = Some(event);
    }

    /// Send the held pointer report to the window under the cursor once
    /// the buttons changed or the forwarding interval has passed.
    fn forward_pointer(&mut self, wm: &WindowManager<D>, now: u64) {
        let Some(event) = self.unsent_pointer else {
            return;
        };
        let changed = event.buttons != self.forwarded_buttons;
        if !changed && !due(now, self.last_mouse_ipc, wm.config().mouse_ipc_ticks) {
            return;
        }
        self.unsent_pointer = None;
        let (x, y) = wm.cursor_position();
        let target = wm.from_point(x, y);
        let Some((ox, oy)) = wm.tree().origin(target) else {
            return;
        };
        let owner = wm.window(target).map_or(NO_OWNER, |w| w.owner());
        self.last_mouse_ipc = Some(now);
        self.forwarded_buttons = event.buttons;
        self.deliver(owner, Message::mouse(x.saturating_sub(ox), y.saturating_sub(oy), event.buttons.bits()));
    }

    /// One iteration of the loop at time `now`. Returns the region
    /// repainted, if a compositor pass ran.
    pub fn run_once(&mut self, now: u64) -> Option<Rect> {
        let wm_lock = self.wm;
        let mut wm = wm_lock.lock();

        if let Some(key) = self.input.take_key() {
            self.dispatch_key(&wm, key);
        }
        if let Some(event) = self.input.take_pointer() {
            self.dispatch_pointer(&mut wm, event);
        }
        self.forward_pointer(&wm, now);

        let mut composed = None;
        if wm.pending_damage().is_some() && due(now, self.last_compose, wm.config().refresh_ticks) {
            composed = wm.composite();
            self.last_compose = Some(now);
        }
        if due(now, self.last_cursor, wm.config().cursor_ticks) {
            wm.render_cursor();
            self.last_cursor = Some(now);
        }
        composed
    }

    pub fn run<C: Clock + ?Sized>(&mut self, clock: &C) -> ! {
        klog_info!("wm: service loop running");
        loop {
            self.run_once(clock.ticks());
            clock.yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WmConfig;
    use crate::display::MemoryFramebuffer;
    use crate::ipc::LocalBus;
    use unios_abi::Color32;
    use unios_abi::ipc::{IPC_ANY, MSG_GUI_KEY, MSG_GUI_MOUSE_EVENT};

    fn shared() -> SharedWm<MemoryFramebuffer> {
        let fb = MemoryFramebuffer::new(320, 240).unwrap();
        Mutex::new(WindowManager::new(fb, WmConfig::default()).unwrap())
    }

    fn bus() -> LocalBus {
        let mut bus = LocalBus::new();
        bus.register(1);
        bus.register(7);
        bus
    }

    #[test]
    fn test_due() {
        assert!(due(0, None, 16));
        assert!(!due(10, Some(0), 16));
        assert!(due(16, Some(0), 16));
        assert!(due(3, Some(u64::MAX - 20), 16));
    }

    #[test]
    fn test_compose_rate_limited() {
        let wm = shared();
        let input = InputMailbox::new();
        let mut svc = WmService::new(&wm, &input, bus());
        assert!(svc.run_once(0).is_some());
        wm.lock().refresh_all();
        assert!(svc.run_once(5).is_none());
        assert!(wm.lock().pending_damage().is_some());
        assert!(svc.run_once(16).is_some());
        assert!(svc.run_once(40).is_none());
    }

    #[test]
    fn test_key_goes_to_root_owner_without_focus() {
        let wm = shared();
        wm.lock().sys_set_root_window_owner(1);
        let input = InputMailbox::new();
        let mut svc = WmService::new(&wm, &input, bus());
        input.post_key(KeyEvent { code: 0x1E });
        svc.run_once(0);
        let msg = svc.bus_mut().receive(1, IPC_ANY).unwrap();
        assert_eq!(msg.kind, MSG_GUI_KEY);
        assert_eq!(msg.words[0], 0x1E);
        assert_eq!(msg.source, IPC_INTERRUPT);
    }

    #[test]
    fn test_key_goes_to_focused_owner() {
        let wm = shared();
        {
            let mut wm = wm.lock();
            wm.sys_set_root_window_owner(1);
            let h = wm.sys_open_window(7, 50, 50, 100, 100, 0, "editor");
            let id = wm.lookup(h).unwrap();
            wm.focus(id);
        }
        let input = InputMailbox::new();
        let mut svc = WmService::new(&wm, &input, bus());
        input.post_key(KeyEvent { code: 0x10 });
        svc.run_once(0);
        assert_eq!(svc.bus().pending(1), 0);
        assert_eq!(svc.bus_mut().receive(7, IPC_ANY).unwrap().words[0], 0x10);
    }

    #[test]
    fn test_pointer_forwarded_in_window_coordinates() {
        let wm = shared();
        {
            let mut wm = wm.lock();
            wm.sys_set_root_window_owner(1);
            wm.sys_open_window(7, 50, 40, 100, 100, Color32::WHITE.to_u32(), "");
        }
        let input = InputMailbox::new();
        let mut svc = WmService::new(&wm, &input, bus());

        input.post_pointer(PointerEvent::new(60, 70, MouseButtons::empty()));
        svc.run_once(0);
        let msg = svc.bus_mut().receive(7, IPC_ANY).unwrap();
        assert_eq!(msg.kind, MSG_GUI_MOUSE_EVENT);
        assert_eq!(msg.words[..3], [10, 30, 0]);

        // Same buttons, too soon: throttled.
        input.post_pointer(PointerEvent::new(61, 70, MouseButtons::empty()));
        svc.run_once(2);
        assert_eq!(svc.bus().pending(7), 0);

        // Button change goes through at once.
        input.post_pointer(PointerEvent::new(61, 70, MouseButtons::LEFT));
        svc.run_once(3);
        let msg = svc.bus_mut().receive(7, IPC_ANY).unwrap();
        assert_eq!(msg.words[..3], [11, 30, MouseButtons::LEFT.bits() as i32]);

        // Over the desktop the root owner hears about it.
        input.post_pointer(PointerEvent::new(5, 5, MouseButtons::empty()));
        svc.run_once(4);
        assert_eq!(svc.bus_mut().receive(1, IPC_ANY).unwrap().words[..2], [5, 5]);
    }

    #[test]
    fn test_throttled_pointer_sent_when_due() {
        let wm = shared();
        wm.lock().sys_open_window(7, 50, 40, 100, 100, 0, "");
        let input = InputMailbox::new();
        let mut svc = WmService::new(&wm, &input, bus());

        input.post_pointer(PointerEvent::new(60, 70, MouseButtons::empty()));
        svc.run_once(0);
        assert_eq!(svc.bus_mut().receive(7, IPC_ANY).unwrap().words[..2], [10, 30]);

        input.post_pointer(PointerEvent::new(90, 100, MouseButtons::empty()));
        svc.run_once(2);
        for now in 3..8 {
            svc.run_once(now);
        }
        assert_eq!(svc.bus().pending(7), 0);

        // Where the pointer came to rest arrives once the interval is up,
        // and only once.
        for now in 8..40 {
            svc.run_once(now);
        }
        assert_eq!(svc.bus().pending(7), 1);
        assert_eq!(svc.bus_mut().receive(7, IPC_ANY).unwrap().words[..2], [40, 60]);
    }

    #[test]
    fn test_unowned_target_drops_event() {
        let wm = shared();
        let input = InputMailbox::new();
        let mut svc = WmService::new(&wm, &input, bus());
        input.post_pointer(PointerEvent::new(5, 5, MouseButtons::empty()));
        svc.run_once(0);
        assert_eq!(svc.bus().pending(1), 0);
        assert_eq!(svc.bus().pending(7), 0);
    }
}
