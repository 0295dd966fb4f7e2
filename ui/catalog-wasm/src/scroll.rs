use md_app_core::ScrollLock;

/// Toggles `overflow: hidden` on `<body>` while the detail modal is open.
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyScrollLock;

fn set_body_overflow(value: &str) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        return;
    };
    let _ = body.style().set_property("overflow", value);
}

impl ScrollLock for BodyScrollLock {
    fn suspend(&self) {
        set_body_overflow("hidden");
    }

    fn resume(&self) {
        set_body_overflow("");
    }
}
