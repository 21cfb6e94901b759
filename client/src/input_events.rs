/// Events this client would receive from the windowing system's compositor;
/// the compositor itself is out of scope (§1), so this is the thin shim a
/// real integration plugs events into via the channel returned by [`channel`].
#[derive(Debug, Clone, Copy)]
pub enum CompositorEvent {
    Key { evdev_code: u16, pressed: bool },
    MouseButton { button: u8, pressed: bool },
    MouseMove { dx: i16, dy: i16 },
    MouseWheel { delta: i8 },
    FocusLost,
}

pub fn channel() -> (tokio::sync::mpsc::Sender<CompositorEvent>, tokio::sync::mpsc::Receiver<CompositorEvent>) {
    tokio::sync::mpsc::channel(256)
}
