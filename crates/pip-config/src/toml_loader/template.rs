//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# pipkeeper configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[selection]
# visible_weight = 4.0       # must be >= playing_weight + 1
# playing_weight = 2.0       # must be >= 1
# area_scale_px = 250000     # area at which size counts half
# include_frames = true      # look inside nested frames

[activation]
# play_wait_ms = 1000        # 100-10000, wait for playback before retrying PiP
# muted_autoplay_recovery = true

[coordinator]
# verify_owner = true        # re-check the cached owner before toggling
# scan_when_idle = true      # look for stray PiP windows when idle
# query_timeout_ms = 1500    # 100-30000
# auto_pip_on_switch = true  # hand PiP to the playing tab when switching away
# persist_owner = true       # survive coordinator restarts within a session

[badge]
# gesture_text = "👆"
# no_video_text = "0"
# color = "#F44336"
# ttl_ms = 2000              # 0-60000

[commands]
# toggle = "toggle-pip"

[logging]
# level = "INFO"             # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
