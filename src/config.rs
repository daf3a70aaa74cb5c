use std::path::PathBuf;

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::input::KeyCode;

/// Viewer settings, read from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub textures: PathBuf,
    pub projection: ProjectionConfig,
    pub camera: CameraConfig,
    pub keys: KeyNames,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            textures: PathBuf::from("textures"),
            projection: ProjectionConfig::default(),
            camera: CameraConfig::default(),
            keys: KeyNames::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.keys.resolve()?;
        Ok(config)
    }

    /// Applies a `WIDTHxHEIGHT` override such as `1280x720`.
    pub fn set_window_size(&mut self, size: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::WindowSize(size.to_string());
        let (width, height) = size.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        self.window.width = width;
        self.window.height = height;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            title: "Desk Scene".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
    /// Half the visible height in orthographic mode, in world units.
    pub ortho_half_height: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
            ortho_half_height: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub zoom: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 12.0),
            front: Vec3::new(0.0, -0.5, -2.0),
            up: Vec3::Y,
            zoom: 80.0,
            movement_speed: crate::camera::DEFAULT_MOVEMENT_SPEED,
            mouse_sensitivity: crate::camera::DEFAULT_MOUSE_SENSITIVITY,
        }
    }
}

/// Key bindings as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyNames {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub perspective: String,
    pub orthographic: String,
    pub close: String,
}

impl Default for KeyNames {
    fn default() -> Self {
        Self {
            forward: "W".to_string(),
            backward: "S".to_string(),
            left: "A".to_string(),
            right: "D".to_string(),
            up: "Q".to_string(),
            down: "E".to_string(),
            perspective: "P".to_string(),
            orthographic: "O".to_string(),
            close: "Escape".to_string(),
        }
    }
}

impl KeyNames {
    pub fn resolve(&self) -> Result<KeyBindings, ConfigError> {
        let key = |action: &'static str, name: &str| {
            KeyCode::from_name(name).ok_or_else(|| ConfigError::UnknownKey {
                action,
                name: name.to_string(),
            })
        };
        Ok(KeyBindings {
            forward: key("forward", &self.forward)?,
            backward: key("backward", &self.backward)?,
            left: key("left", &self.left)?,
            right: key("right", &self.right)?,
            up: key("up", &self.up)?,
            down: key("down", &self.down)?,
            perspective: key("perspective", &self.perspective)?,
            orthographic: key("orthographic", &self.orthographic)?,
            close: key("close", &self.close)?,
        })
    }
}

/// Resolved key bindings used by the render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    pub perspective: KeyCode,
    pub orthographic: KeyCode,
    pub close: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use crate::input::NamedKey;
        Self {
            forward: KeyCode::Character('W'),
            backward: KeyCode::Character('S'),
            left: KeyCode::Character('A'),
            right: KeyCode::Character('D'),
            up: KeyCode::Character('Q'),
            down: KeyCode::Character('E'),
            perspective: KeyCode::Character('P'),
            orthographic: KeyCode::Character('O'),
            close: KeyCode::Named(NamedKey::Escape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.keys.resolve().unwrap(), KeyBindings::default());
        assert_eq!((config.window.width, config.window.height), (1000, 800));
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
textures = "assets/textures"

[projection]
ortho_half_height = 6.0

[camera]
position = [1.0, 2.0, 3.0]
zoom = 45.0

[keys]
forward = "Up"
close = "q"
"#,
        )
        .unwrap();
        assert_eq!(config.textures, PathBuf::from("assets/textures"));
        assert_eq!(config.projection.ortho_half_height, 6.0);
        assert_eq!(config.projection.far, 100.0);
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.front, Vec3::new(0.0, -0.5, -2.0));

        let keys = config.keys.resolve().unwrap();
        assert_eq!(keys.forward, KeyCode::Named(crate::input::NamedKey::Up));
        assert_eq!(keys.close, KeyCode::Character('Q'));
        assert_eq!(keys.backward, KeyCode::Character('S'));
    }

    #[test]
    fn unknown_key_names_are_rejected() {
        let err = ViewerConfig::from_toml_str("[keys]\northographic = \"Hyper\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownKey { action: "orthographic", ref name } if name == "Hyper"
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ViewerConfig::from_toml_str("[window\nwidth = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn window_size_override() {
        let mut config = ViewerConfig::default();
        config.set_window_size("1280x720").unwrap();
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert!(config.set_window_size("1280").is_err());
        assert!(config.set_window_size("0x720").is_err());
        assert!(config.set_window_size("axb").is_err());
    }
}
