use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use se_core::config::GlobeConfig;
use se_render::{MaterialPaths, DEFAULT_DIVISIONS};

pub const CONFIG_PATH: &str = "assets/config/client.json";
/// Largest map edge accepted from config; matches the default wgpu 2D texture limit.
pub const MAX_MAP_DIMENSION: u32 = 8192;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    pub diffuse_map: String,
    pub normal_map: String,
    pub specular_map: String,
    pub map_width: u32,
    pub map_height: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            diffuse_map: "assets/textures/DIFFUSE_MAP.jpg".to_string(),
            normal_map: "assets/textures/NORMAL_MAP.jpg".to_string(),
            specular_map: "assets/textures/SPEC_MAP.jpg".to_string(),
            map_width: 8192 / 2,
            map_height: 4092 / 2,
        }
    }
}

impl TextureConfig {
    pub fn material_paths(&self) -> MaterialPaths {
        MaterialPaths {
            diffuse: PathBuf::from(&self.diffuse_map),
            normal: PathBuf::from(&self.normal_map),
            specular: PathBuf::from(&self.specular_map),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub globe: GlobeConfig,
    pub textures: TextureConfig,
    pub sphere_divisions: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            globe: GlobeConfig::default(),
            textures: TextureConfig::default(),
            sphere_divisions: DEFAULT_DIVISIONS,
        }
    }
}

/// Load the client config. A missing file means defaults; anything else
/// that goes wrong is an error.
pub fn load_client_config(path: &Path) -> Result<ClientConfig, String> {
    if !path.exists() {
        log::info!(
            "Config '{}' not found, using built-in defaults",
            path.display()
        );
        return Ok(ClientConfig::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    parse_client_config(&raw)
        .map_err(|e| format!("Config file {}: {e}", path.display()))
}

pub fn parse_client_config(raw: &str) -> Result<ClientConfig, String> {
    let config: ClientConfig =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse config JSON: {e}"))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ClientConfig) -> Result<(), String> {
    config.globe.validate()?;

    let textures = &config.textures;
    for (name, path) in [
        ("diffuse_map", &textures.diffuse_map),
        ("normal_map", &textures.normal_map),
        ("specular_map", &textures.specular_map),
    ] {
        if path.trim().is_empty() {
            return Err(format!("Config validation failed: {name} is empty"));
        }
    }
    for (name, size) in [
        ("map_width", textures.map_width),
        ("map_height", textures.map_height),
    ] {
        if size == 0 || size > MAX_MAP_DIMENSION {
            return Err(format!(
                "Config validation failed: {name} must be in 1..={MAX_MAP_DIMENSION}, got {size}"
            ));
        }
    }
    if !(4..=1024).contains(&config.sphere_divisions) {
        return Err(format!(
            "Config validation failed: sphere_divisions must be in 4..=1024, got {}",
            config.sphere_divisions
        ));
    }
    Ok(())
}

/// Polls a file's mtime so edits can be picked up at frame boundaries.
pub struct ConfigWatcher {
    path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&path);
        Self {
            path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use se_core::config::DragAxisPolicy;
    use std::time::{Duration, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "se_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = temp_file_path("missing");
        let config = load_client_config(&path).expect("defaults");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.textures.map_width, 4096);
        assert_eq!(config.textures.map_height, 2046);
        assert_eq!(config.sphere_divisions, 64);
    }

    #[test]
    fn parses_partial_file() {
        let path = temp_file_path("partial");
        let json = r#"
        {
          "globe": {
            "mini_radius": 5,
            "large_radius": 50,
            "interaction": { "drag_axis_policy": "independent" }
          },
          "textures": { "diffuse_map": "maps/day.jpg" }
        }
        "#;
        fs::write(&path, json).expect("write temp file");

        let config = load_client_config(&path).expect("should parse");
        assert_eq!(config.globe.mini_radius, 5.0);
        assert_eq!(config.globe.large_radius, 50.0);
        assert_eq!(
            config.globe.interaction.drag_axis_policy,
            DragAxisPolicy::Independent
        );
        assert_eq!(config.textures.diffuse_map, "maps/day.jpg");
        assert_eq!(config.textures.normal_map, TextureConfig::default().normal_map);
        assert_eq!(
            config.textures.material_paths().diffuse,
            PathBuf::from("maps/day.jpg")
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let raw = include_str!("../../../assets/config/client.json");
        let config = parse_client_config(raw).expect("shipped config parses");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ \"globe\": ").expect("write temp file");
        let err = load_client_config(&path).expect_err("malformed should fail");
        assert!(err.contains("Failed to parse"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = parse_client_config(r#"{ "globe": { "mini_radius": -1 } }"#)
            .expect_err("negative radius");
        assert!(err.contains("mini_radius"));

        let err = parse_client_config(r#"{ "textures": { "map_width": 16384 } }"#)
            .expect_err("oversized map");
        assert!(err.contains("map_width"));

        let err = parse_client_config(r#"{ "textures": { "specular_map": " " } }"#)
            .expect_err("empty path");
        assert!(err.contains("specular_map"));

        let err = parse_client_config(r#"{ "sphere_divisions": 2 }"#)
            .expect_err("too few divisions");
        assert!(err.contains("sphere_divisions"));

        let err = parse_client_config(
            r#"{ "globe": { "interaction": { "zoom_min": 10, "zoom_max": 5 } } }"#,
        )
        .expect_err("inverted zoom range");
        assert!(err.contains("zoom_min"));
    }

    #[test]
    fn watcher_fires_on_creation_and_change() {
        let path = temp_file_path("watch");
        let mut watcher = ConfigWatcher::new(path.clone());
        assert!(!watcher.should_reload());

        fs::write(&path, "{}").expect("write temp file");
        assert!(watcher.should_reload());
        assert!(!watcher.should_reload());

        // Push the mtime forward explicitly; filesystem timestamp
        // granularity can hide two quick writes.
        let file = fs::File::options()
            .write(true)
            .open(&path)
            .expect("open temp file");
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .expect("set mtime");
        assert!(watcher.should_reload());
        assert_eq!(watcher.path(), path.as_path());

        let _ = fs::remove_file(path);
    }
}
