mod core;

pub use self::core::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_area() {
        assert_eq!(Rect::new(0.0, 0.0, 640.0, 360.0).area(), 230_400.0);
        assert_eq!(Rect::new(10.0, 10.0, 0.0, 360.0).area(), 0.0);
        assert_eq!(Rect::new(10.0, 10.0, -5.0, 20.0).area(), 0.0);
    }

    #[test]
    fn rect_intersects_viewport() {
        let viewport = Rect::new(0.0, 0.0, 1280.0, 720.0);
        assert!(Rect::new(100.0, 100.0, 320.0, 180.0).intersects(&viewport));
        assert!(Rect::new(-100.0, -100.0, 150.0, 150.0).intersects(&viewport));
    }

    #[test]
    fn rect_outside_viewport_does_not_intersect() {
        let viewport = Rect::new(0.0, 0.0, 1280.0, 720.0);
        // Scrolled below the fold
        assert!(!Rect::new(0.0, 900.0, 640.0, 360.0).intersects(&viewport));
        // Touching the edge is not an overlap
        assert!(!Rect::new(1280.0, 0.0, 10.0, 10.0).intersects(&viewport));
        // Zero-size element
        assert!(!Rect::new(10.0, 10.0, 0.0, 0.0).intersects(&viewport));
    }

    #[test]
    fn tab_id_display() {
        assert_eq!(TabId(42).to_string(), "tab-42");
        assert_eq!(WindowId(3).to_string(), "window-3");
    }

    #[test]
    fn tab_id_serializes_as_number() {
        let json = serde_json::to_string(&TabId(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: TabId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, TabId(7));
    }

    #[test]
    fn top_frame() {
        assert!(FrameId::TOP.is_top());
        assert!(FrameId::default().is_top());
        assert!(!FrameId(4).is_top());
    }

    #[test]
    fn scriptable_tabs() {
        let mut tab = TabInfo {
            id: TabId(1),
            window: WindowId(1),
            active: true,
            url: "https://video.example/watch".into(),
        };
        assert!(tab.is_scriptable());
        tab.url = "chrome://extensions".into();
        assert!(!tab.is_scriptable());
        tab.url = "http://localhost:8080".into();
        assert!(tab.is_scriptable());
    }
}
