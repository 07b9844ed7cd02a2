//! Simulated browser layout: windows, tabs and the videos on each page.
//!
//! Loaded from TOML. Without `--scenario` the built-in layout is used.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use pip_agent::sim::{SimDocument, SimPolicy, VideoSetup};
use pip_common::{FrameId, Rect, TabId, WindowId};
use serde::Deserialize;

const BUILTIN: &str = r#"
focused_window = 1

[[tabs]]
id = 1
window = 1
url = "https://video.example/watch?v=intro"
active = true

[[tabs.videos]]
rect = [0.0, 80.0, 960.0, 540.0]
muted = true

[[tabs.videos]]
rect = [980.0, 80.0, 280.0, 158.0]
muted = true

[[tabs]]
id = 2
window = 1
url = "https://news.example/live"

[[tabs.videos]]
rect = [0.0, 900.0, 640.0, 360.0]

[[tabs]]
id = 3
window = 2
url = "https://docs.example/"
active = true

[[tabs]]
id = 4
window = 2
url = "about:blank"
"#;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// `[width, height]` of every page's viewport.
    pub viewport: [f64; 2],
    pub focused_window: Option<u32>,
    pub tabs: Vec<TabScenario>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            viewport: [1280.0, 720.0],
            focused_window: None,
            tabs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabScenario {
    pub id: u32,
    pub window: u32,
    pub url: String,
    #[serde(default)]
    pub active: bool,
    /// The page already saw a click or key press.
    #[serde(default)]
    pub user_activation: bool,
    #[serde(default = "default_true")]
    pub autoplay_requires_gesture: bool,
    #[serde(default)]
    pub pip_requires_gesture: bool,
    #[serde(default)]
    pub videos: Vec<VideoScenario>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoScenario {
    /// `[x, y, width, height]` in CSS pixels, relative to the viewport.
    pub rect: [f64; 4],
    #[serde(default)]
    pub playing: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub frame: u32,
    #[serde(default)]
    pub pip_disabled: bool,
    #[serde(default)]
    pub stalls: bool,
    #[serde(default)]
    pub requires_playing_for_pip: bool,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    pub fn builtin() -> Self {
        // The built-in text is covered by tests.
        Self::parse(BUILTIN).unwrap_or_default()
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        let mut scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        scenario.normalize();
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.viewport.iter().any(|&v| v <= 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "viewport must be positive, got {:?}",
                self.viewport
            )));
        }

        let mut seen = HashSet::new();
        for tab in &self.tabs {
            if !seen.insert(tab.id) {
                return Err(ScenarioError::Invalid(format!("duplicate tab id {}", tab.id)));
            }
        }

        if let Some(window) = self.focused_window {
            if !self.tabs.iter().any(|t| t.window == window) {
                return Err(ScenarioError::Invalid(format!(
                    "focused_window {window} has no tabs"
                )));
            }
        }
        Ok(())
    }

    /// Exactly one active tab per window; focus defaults to the first window.
    fn normalize(&mut self) {
        let mut active: BTreeMap<u32, usize> = BTreeMap::new();
        for (index, tab) in self.tabs.iter().enumerate() {
            if tab.active {
                active.entry(tab.window).or_insert(index);
            }
        }
        for (index, tab) in self.tabs.iter().enumerate() {
            active.entry(tab.window).or_insert(index);
        }
        for (index, tab) in self.tabs.iter_mut().enumerate() {
            tab.active = active.get(&tab.window) == Some(&index);
        }

        if self.focused_window.is_none() {
            self.focused_window = self.tabs.first().map(|t| t.window);
        }
    }

    pub fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport[0], self.viewport[1])
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.focused_window.map(WindowId)
    }

    pub fn tab(&self, id: TabId) -> Option<&TabScenario> {
        self.tabs.iter().find(|t| t.id == id.0)
    }
}

impl TabScenario {
    pub fn tab_id(&self) -> TabId {
        TabId(self.id)
    }

    pub fn window_id(&self) -> WindowId {
        WindowId(self.window)
    }

    fn policy(&self) -> SimPolicy {
        SimPolicy {
            autoplay_requires_gesture: self.autoplay_requires_gesture,
            pip_requires_gesture: self.pip_requires_gesture,
        }
    }

    /// Build a fresh page for this tab, as it looks right after loading.
    pub fn build_document(&self, viewport: Rect) -> SimDocument {
        let document = SimDocument::new(viewport, self.policy());
        for video in &self.videos {
            document.add_video(video.setup());
        }
        if self.user_activation {
            document.grant_user_activation();
        }
        document
    }
}

impl VideoScenario {
    fn setup(&self) -> VideoSetup {
        let [x, y, width, height] = self.rect;
        let mut setup = VideoSetup::new(Rect::new(x, y, width, height));
        if self.playing {
            setup = setup.playing();
        }
        if self.muted {
            setup = setup.muted();
        }
        if self.frame != 0 {
            setup = setup.in_frame(FrameId(self.frame));
        }
        if self.pip_disabled {
            setup = setup.pip_disabled();
        }
        if self.stalls {
            setup = setup.stalls();
        }
        if self.requires_playing_for_pip {
            setup = setup.requires_playing_for_pip();
        }
        setup
    }
}
